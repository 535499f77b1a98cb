use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use crate::TransferError;
use crate::types::SourceInfo;

/// Rejects a zero chunk size.
pub fn validate_chunk_size(chunk_size: usize) -> Result<(), TransferError> {
    if chunk_size == 0 {
        return Err(TransferError::InvalidChunkSize);
    }
    Ok(())
}

/// Checks that `path` is a readable regular file and collects its size
/// and base name.
///
/// Rejects:
/// - Missing paths
/// - Directories and other non-regular files
/// - Paths without a final name component (`/`, `..`)
/// - Files that cannot be opened for reading
pub async fn inspect_source(path: &Path) -> Result<SourceInfo, TransferError> {
    let shown = path.display().to_string();

    let filename = match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => return Err(TransferError::MissingFileName(shown)),
    };

    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(TransferError::NotFound(shown));
        }
        Err(e) => return Err(e.into()),
    };

    if !metadata.is_file() {
        return Err(TransferError::NotAFile(shown));
    }

    // Metadata alone does not prove read permission.
    drop(tokio::fs::File::open(path).await?);

    debug!(path = %shown, size = metadata.len(), "source inspected");

    Ok(SourceInfo {
        path: path.to_path_buf(),
        size: metadata.len(),
        filename,
    })
}
