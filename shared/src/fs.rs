//! Filesystem helpers shared across the scanner and its consumers.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Maximum allowed descriptor size for reading into memory.
pub const MAX_DESCRIPTOR_BYTES: u64 = 64 * 1024 * 1024; // 64 MiB

/// Read a file into memory with a size cap.
pub fn read_file_with_limit(path: &Path, max_bytes: u64) -> Result<Vec<u8>> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;
    let len = metadata.len();
    if len > max_bytes {
        anyhow::bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            len,
            max_bytes
        );
    }
    std::fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Drain a reader into memory, failing once more than `max_bytes` arrive.
///
/// Used for archive entries, whose declared size cannot be trusted.
pub fn read_to_end_with_limit(reader: impl Read, max_bytes: u64) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader
        .take(max_bytes + 1)
        .read_to_end(&mut bytes)
        .context("Failed to read stream")?;
    if bytes.len() as u64 > max_bytes {
        anyhow::bail!("Stream too large (max {} bytes)", max_bytes);
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_read_file_within_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("game.xml");
        std::fs::write(&path, b"<game/>").unwrap();

        let bytes = read_file_with_limit(&path, 1024).unwrap();
        assert_eq!(bytes, b"<game/>");
    }

    #[test]
    fn test_read_file_over_limit() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("big.xml");
        std::fs::write(&path, vec![b'x'; 64]).unwrap();

        let err = read_file_with_limit(&path, 16).unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(read_file_with_limit(&dir.path().join("missing.xml"), 16).is_err());
    }

    #[test]
    fn test_read_stream_limit() {
        assert_eq!(read_to_end_with_limit(&b"abcd"[..], 4).unwrap(), b"abcd");
        assert!(read_to_end_with_limit(&b"abcde"[..], 4).is_err());
    }
}
