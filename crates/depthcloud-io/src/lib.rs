#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for I/O operations.
///
/// Defines [`IoError`] variants for file access, decoding and encoding failures.
pub mod error;

/// RGB-D frame sources.
///
/// See [`frame::FrameSource`] for the trait and [`frame::FileFrameSource`] for
/// a source backed by PNG files on disk.
pub mod frame;

/// PNG image encoding and decoding.
///
/// Read and write 8-bit color and 16-bit depth PNG images.
pub mod png;

mod conv_utils;

pub use crate::error::IoError;
