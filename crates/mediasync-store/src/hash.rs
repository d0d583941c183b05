//! Content hashing of downloaded originals.

use std::path::Path;

use mediasync_core::Result;
use tokio::fs::File;
use tokio::io::AsyncReadExt;

const READ_CHUNK: usize = 64 * 1024;

/// MD5 of a file's contents as lowercase hex, read in chunks.
pub async fn hash_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).await?;
    let mut context = md5::Context::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        context.consume(&buf[..n]);
    }
    Ok(format!("{:x}", context.compute()))
}

/// MD5 of an in-memory buffer as lowercase hex.
pub fn hash_bytes(data: &[u8]) -> String {
    format!("{:x}", md5::compute(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_bytes_known_digest() {
        assert_eq!(hash_bytes(b"hello"), "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(hash_bytes(b""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[tokio::test]
    async fn test_hash_file_matches_buffer_hash() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blob.bin");
        let data: Vec<u8> = (0..200_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&path, &data).unwrap();

        assert_eq!(hash_file(&path).await.unwrap(), hash_bytes(&data));
    }
}
