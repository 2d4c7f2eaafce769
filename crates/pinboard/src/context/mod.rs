//! Request-scoped context module.
//!
//! Provides the `RequestContext` extractor (request id plus the optional
//! acting user) and the `CurrentUser` extractor for endpoints that require
//! an acting user. Both complement application-scoped `AppState`.

mod extractor;
mod types;

pub use extractor::{user_id_from_headers, USER_ID_HEADER};
pub use types::{CurrentUser, RequestContext};
