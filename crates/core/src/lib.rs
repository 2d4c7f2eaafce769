//! Functional core for pinboard.
//!
//! Pure types and functions shared by the server: cache ports and key
//! builders, pagination math, response envelopes, domain entities with
//! their validation rules, and the repository traits implemented by the
//! storage backends. Nothing in this crate performs I/O.

pub mod cache;
pub mod domain;
pub mod pagination;
pub mod response;
pub mod serde;
pub mod storage;
