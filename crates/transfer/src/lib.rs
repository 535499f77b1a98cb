//! Local side of an upload: validating the source file and reading it
//! back as a sequence of fixed-size payload chunks.

mod chunked;
mod types;
mod validation;

pub use chunked::{ChunkReader, checksum_bytes};
pub use types::SourceInfo;
pub use validation::{inspect_source, validate_chunk_size};

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("source not found: {0}")]
    NotFound(String),

    #[error("source is not a regular file: {0}")]
    NotAFile(String),

    #[error("source has no file name: {0}")]
    MissingFileName(String),
}
