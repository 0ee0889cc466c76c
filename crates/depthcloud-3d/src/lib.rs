#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Pinhole camera intrinsics and the named camera registry.
pub mod camera;

/// I/O utilities for reading and writing 3D data.
pub mod io;

/// Point cloud container.
pub mod pointcloud;

/// Rigid camera poses.
pub mod pose;

/// Back-projection of RGB-D frames into point clouds.
pub mod rgbd;
