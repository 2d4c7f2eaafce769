mod error;
mod keys;
mod patterns;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    comments_key, comments_pattern, image_variant_key, image_variants_pattern, interactions_key,
    interactions_pattern, pin_key, pins_key, pins_pattern, rate_limit_key, response_key,
    user_boards_response_pattern, BOARDS_RESPONSE_PREFIX,
};
pub use patterns::pattern_matches;
pub use serialization::{deserialize, serialize};
pub use traits::Cache;
