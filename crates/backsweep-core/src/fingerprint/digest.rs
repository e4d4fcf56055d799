use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::error::Error;

const CHUNK_SIZE: usize = 64 * 1024;

/// Hex-encoded BLAKE3 content digest.
pub type Digest = String;

/// Hash a file's content in chunks, under a wall-clock budget.
///
/// The deadline is checked between chunk reads, which bounds every loop
/// iteration to at most one chunk of I/O past the budget. A path that is
/// gone at open, or vanishes mid-read, reports `NotFound`; everything else
/// unreadable reports `Io`.
pub fn digest_file(path: &Path, timeout: Duration) -> Result<Digest, Error> {
    let deadline = Instant::now() + timeout;

    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(Error::NotFound(path.to_path_buf()))
        }
        Err(e) => return Err(Error::Io(e)),
    };

    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        if Instant::now() > deadline {
            return Err(Error::Timeout {
                path: path.to_path_buf(),
                budget_secs: timeout.as_secs(),
            });
        }

        let bytes_read = match file.read(&mut buffer) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(path.to_path_buf()))
            }
            Err(e) => return Err(Error::Io(e)),
        };

        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(hasher.finalize().to_hex().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const BUDGET: Duration = Duration::from_secs(60);

    #[test]
    fn test_identical_content_same_digest() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.dat");
        let b = tmp.path().join("sub").join("b.dat");
        fs::create_dir_all(b.parent().unwrap()).unwrap();
        fs::write(&a, b"same bytes").unwrap();
        fs::write(&b, b"same bytes").unwrap();

        assert_eq!(
            digest_file(&a, BUDGET).unwrap(),
            digest_file(&b, BUDGET).unwrap()
        );
    }

    #[test]
    fn test_different_content_different_digest() {
        let tmp = tempdir().unwrap();
        let a = tmp.path().join("a.dat");
        let b = tmp.path().join("b.dat");
        fs::write(&a, b"x").unwrap();
        fs::write(&b, b"y").unwrap();

        assert_ne!(
            digest_file(&a, BUDGET).unwrap(),
            digest_file(&b, BUDGET).unwrap()
        );
    }

    #[test]
    fn test_matches_reference_hasher() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("ref.dat");
        let content = vec![0xA5u8; 200_000]; // spans multiple chunks
        fs::write(&path, &content).unwrap();

        let expected = blake3::hash(&content).to_hex().to_string();
        assert_eq!(digest_file(&path, BUDGET).unwrap(), expected);
    }

    #[test]
    fn test_missing_path_is_not_found() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nope.dat");
        match digest_file(&path, BUDGET) {
            Err(Error::NotFound(p)) => assert_eq!(p, path),
            other => panic!("expected NotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_directory_is_io_error() {
        let tmp = tempdir().unwrap();
        match digest_file(tmp.path(), BUDGET) {
            Err(Error::Io(_)) => {}
            other => panic!("expected Io, got {:?}", other.map(|_| ())),
        }
    }
}
