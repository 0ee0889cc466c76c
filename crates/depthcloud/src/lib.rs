#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! Re-exports the image types, the frame and PNG I/O, and the 3D
//! back-projection and PLY serialization under one crate.

#[doc(inline)]
pub use depthcloud_image as image;

#[doc(inline)]
pub use depthcloud_io as io;

#[doc(inline)]
pub use depthcloud_3d as k3d;
