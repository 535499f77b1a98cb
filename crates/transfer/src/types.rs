use std::path::PathBuf;

/// What the handshake needs to know about a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    /// Path the payload is read from.
    pub path: PathBuf,
    /// Size in bytes at inspection time.
    pub size: u64,
    /// Base name announced to the device.
    pub filename: String,
}

impl SourceInfo {
    /// Number of payload frames needed at the given chunk size.
    pub fn frame_count(&self, chunk_size: usize) -> u64 {
        if chunk_size == 0 {
            return 0;
        }
        self.size.div_ceil(chunk_size as u64)
    }
}
