use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use sha2::{Digest, Sha256};
use crate::error::{AuditError, Result};

pub const CHUNK_SIZE: usize = 1024 * 1024;

/// Streaming SHA-256 over files and readers. Memory use is bounded by
/// [`CHUNK_SIZE`] regardless of input length.
pub struct HashEngine;

impl HashEngine {
    pub fn hash_file(path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => AuditError::not_found("File", path),
            _ => AuditError::Io(e),
        })?;
        Self::hash_reader(file)
    }

    pub fn hash_reader(mut reader: impl Read) -> Result<String> {
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];

        loop {
            let n = match reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            hasher.update(&buf[..n]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    }

    pub fn hash_bytes(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sha256_known_vector() {
        assert_eq!(
            HashEngine::hash_bytes(b"hello world"),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(
            HashEngine::hash_reader(Cursor::new(Vec::<u8>::new())).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_reader_matches_bytes_across_chunk_boundary() {
        let data: Vec<u8> = (0..CHUNK_SIZE * 2 + 17).map(|i| (i % 251) as u8).collect();
        let streamed = HashEngine::hash_reader(Cursor::new(data.clone())).unwrap();
        assert_eq!(streamed, HashEngine::hash_bytes(&data));
    }

    #[test]
    fn test_missing_file() {
        let err = HashEngine::hash_file("/definitely/not/here.bin").unwrap_err();
        assert!(matches!(err, AuditError::NotFound { .. }));
    }
}
