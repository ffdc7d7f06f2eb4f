//! Streaming content digests
//!
//! The dedup ledger keys on a SHA-256 digest of the full byte stream, never
//! a partial sample: two files dedup only when every byte matches.

use std::io;
use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Read buffer size for digest streaming
const CHUNK_SIZE: usize = 64 * 1024;

/// Computes the hex-encoded SHA-256 digest of a file's full contents
///
/// Streams the file in fixed-size chunks so arbitrarily large photos and
/// videos never need to fit in memory.
pub async fn content_digest(path: &Path) -> io::Result<String> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buf).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    let digest = hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut out, byte| {
            use std::fmt::Write;
            let _ = write!(out, "{byte:02x}");
            out
        });

    debug!(path = %path.display(), digest, "Computed content digest");
    Ok(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_digest_of_known_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hello.txt");
        tokio::fs::write(&path, b"hello world").await.unwrap();

        let digest = content_digest(&path).await.unwrap();
        // SHA-256 of "hello world"
        assert_eq!(
            digest,
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[tokio::test]
    async fn test_identical_bytes_same_digest_regardless_of_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("b.jpg");
        tokio::fs::write(&a, b"same bytes").await.unwrap();
        tokio::fs::write(&b, b"same bytes").await.unwrap();

        assert_eq!(
            content_digest(&a).await.unwrap(),
            content_digest(&b).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_digest_covers_full_stream() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.bin");
        let b = dir.path().join("b.bin");

        // Identical first chunk, difference only past the buffer boundary.
        let mut content_a = vec![0u8; CHUNK_SIZE + 16];
        let mut content_b = content_a.clone();
        content_a[CHUNK_SIZE + 8] = 1;
        content_b[CHUNK_SIZE + 8] = 2;
        tokio::fs::write(&a, &content_a).await.unwrap();
        tokio::fs::write(&b, &content_b).await.unwrap();

        assert_ne!(
            content_digest(&a).await.unwrap(),
            content_digest(&b).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let err = content_digest(Path::new("/nonexistent/x.jpg"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
