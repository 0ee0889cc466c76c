/// PLY reader and writer module.
pub mod ply;

/// Camera pose file reader module.
pub mod poses;
