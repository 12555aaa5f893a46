//! Static fallback tables
//!
//! Compile-time data used by the last two tiers:
//! - `curated`: destination name → known-good image
//! - `category`: category → default image, plus keyword inference

pub mod category;
pub mod curated;

pub use category::{Category, DEFAULT_IMAGE, category_fallback};
pub use curated::{CURATED_IMAGES, curated_match};
