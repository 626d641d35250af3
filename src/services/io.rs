//! Byte-level input/output for the CLI
//!
//! `-` stands for stdin on input and stdout on output.

use crate::error::{Result, StickerError};
use std::io::{Read, Write};
use std::path::Path;

/// Path value meaning stdin/stdout
pub const STDIO_PATH: &str = "-";

/// Service for reading uploads and writing encoded stickers
pub struct ImageIOService;

impl ImageIOService {
    /// Read all bytes from a file, or stdin for `-`
    ///
    /// # Errors
    /// - File missing or unreadable
    pub fn read_input(path: &str) -> Result<Vec<u8>> {
        if path == STDIO_PATH {
            let mut buffer = Vec::new();
            std::io::stdin().lock().read_to_end(&mut buffer)?;
            log::debug!("Read {} bytes from stdin", buffer.len());
            return Ok(buffer);
        }

        let path_ref = Path::new(path);
        if !path_ref.exists() {
            return Err(StickerError::invalid_input(format!(
                "Input file '{}' does not exist",
                path_ref.display()
            )));
        }

        let bytes = std::fs::read(path_ref).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to read '{}': {}", path_ref.display(), e),
            )
        })?;
        log::debug!("Read {} bytes from {}", bytes.len(), path_ref.display());
        Ok(bytes)
    }

    /// Write bytes to a file (creating parent directories), or stdout for `-`
    ///
    /// # Errors
    /// - Directory creation or write failure
    pub fn write_output(path: &str, bytes: &[u8]) -> Result<()> {
        if path == STDIO_PATH {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(bytes)?;
            stdout.flush()?;
            return Ok(());
        }

        let path_ref = Path::new(path);
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        std::fs::write(path_ref, bytes).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("Failed to write '{}': {}", path_ref.display(), e),
            )
        })?;
        log::debug!("Wrote {} bytes to {}", bytes.len(), path_ref.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.png");
        let path_str = path.to_str().unwrap();

        ImageIOService::write_output(path_str, b"\x89PNG fake").unwrap();
        let bytes = ImageIOService::read_input(path_str).unwrap();
        assert_eq!(bytes, b"\x89PNG fake");
    }

    #[test]
    fn test_missing_input() {
        let err = ImageIOService::read_input("/definitely/not/here.png").unwrap_err();
        assert!(matches!(err, StickerError::InvalidInput(_)));
    }
}
