mod parser;
mod properties;
mod writer;

pub use parser::*;
pub use properties::*;
pub use writer::*;

/// Error types for the PLY module.
#[derive(Debug, thiserror::Error)]
pub enum PlyError {
    /// Failed to read or write the PLY file
    #[error("Failed to read or write PLY file. {0}")]
    Io(#[from] std::io::Error),

    /// Unsupported PLY property or property layout
    #[error("Unsupported PLY property: {0}")]
    UnsupportedProperty(String),

    /// The header is not a valid PLY header
    #[error("Malformed PLY header: {0}")]
    MalformedHeader(String),

    /// A vertex line could not be parsed
    #[error("Failed to parse PLY data: {0}")]
    ParseError(String),
}
