use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::TransferError;
use crate::validation::validate_chunk_size;

// ---------------------------------------------------------------------------
// Checksum helpers
// ---------------------------------------------------------------------------

/// Computes SHA-256 of `data` and returns the hex-encoded digest.
pub fn checksum_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

// ---------------------------------------------------------------------------
// ChunkReader
// ---------------------------------------------------------------------------

/// Upper bound on the buffer reserved up front for one chunk.
const INITIAL_BUFFER: usize = 64 * 1024;

/// Reads a file sequentially in fixed-size chunks.
///
/// Every chunk except the last is exactly `chunk_size` bytes; reading stops
/// at end of input rather than at the size seen during inspection. A running
/// SHA-256 of everything handed out is kept for the upload report.
pub struct ChunkReader {
    file: tokio::fs::File,
    chunk_size: usize,
    offset: u64,
    chunks: u64,
    hasher: Sha256,
    eof: bool,
}

impl ChunkReader {
    /// Opens `path` for chunked reading.
    pub async fn open(path: &Path, chunk_size: usize) -> Result<Self, TransferError> {
        validate_chunk_size(chunk_size)?;
        let file = tokio::fs::File::open(path).await?;
        Ok(Self {
            file,
            chunk_size,
            offset: 0,
            chunks: 0,
            hasher: Sha256::new(),
            eof: false,
        })
    }

    /// Reads the next chunk. Returns `None` at EOF.
    pub async fn next_chunk(&mut self) -> Result<Option<Vec<u8>>, TransferError> {
        if self.eof {
            return Ok(None);
        }

        // `chunk_size` may far exceed the file; only what is read is allocated.
        let limit = u64::try_from(self.chunk_size).unwrap_or(u64::MAX);
        let mut buf = Vec::with_capacity(self.chunk_size.min(INITIAL_BUFFER));
        let filled = (&mut self.file).take(limit).read_to_end(&mut buf).await?;
        if (filled as u64) < limit {
            self.eof = true;
        }

        if filled == 0 {
            return Ok(None);
        }

        self.hasher.update(&buf);
        self.offset += filled as u64;
        self.chunks += 1;
        Ok(Some(buf))
    }

    /// Bytes handed out so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Chunks handed out so far.
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    /// Hex SHA-256 of every byte handed out so far.
    pub fn digest(&self) -> String {
        hex::encode(self.hasher.clone().finalize())
    }
}
