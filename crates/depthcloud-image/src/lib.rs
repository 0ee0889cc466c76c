#![deny(missing_docs)]
//! Image types for depth, color and normal maps

/// image representation for depth, color and normal maps.
pub mod image;

/// Error types for the image module.
pub mod error;

/// Operations on images.
pub mod ops;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageSize};
