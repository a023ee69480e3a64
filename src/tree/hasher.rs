//! Content fingerprinting for files on disk
//!
//! Files are streamed through the digest in fixed-size chunks so arbitrarily
//! large files never have to fit in memory. The fingerprint depends only on
//! the byte content, never on the path.

use crate::error::StorageError;
use crate::types::{Fingerprint, FingerprintAlgorithm};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// Read buffer size for streaming digests.
pub const CHUNK_SIZE: usize = 64 * 1024;

enum StreamingDigest {
    Blake3(blake3::Hasher),
    Sha256(Sha256),
}

impl StreamingDigest {
    fn new(algorithm: FingerprintAlgorithm) -> Self {
        match algorithm {
            FingerprintAlgorithm::Blake3 => StreamingDigest::Blake3(blake3::Hasher::new()),
            FingerprintAlgorithm::Sha256 => StreamingDigest::Sha256(Sha256::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            StreamingDigest::Blake3(h) => {
                h.update(data);
            }
            StreamingDigest::Sha256(h) => h.update(data),
        }
    }

    fn finish(self) -> Fingerprint {
        match self {
            StreamingDigest::Blake3(h) => Fingerprint::from_digest(h.finalize().as_bytes()),
            StreamingDigest::Sha256(h) => Fingerprint::from_digest(&h.finalize()),
        }
    }
}

/// Compute the fingerprint of a file by streaming its content.
///
/// Fails with `StorageError::Io` if the file cannot be opened or read
/// (permissions, removed mid-walk). No retries.
pub fn fingerprint_file(
    path: &Path,
    algorithm: FingerprintAlgorithm,
) -> Result<Fingerprint, StorageError> {
    let mut file = File::open(path).map_err(|e| StorageError::io(path, e))?;
    let mut digest = StreamingDigest::new(algorithm);
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(StorageError::io(path, e)),
        };
        digest.update(&buffer[..read]);
    }

    Ok(digest.finish())
}

/// Compute the fingerprint of in-memory content.
pub fn fingerprint_bytes(data: &[u8], algorithm: FingerprintAlgorithm) -> Fingerprint {
    let mut digest = StreamingDigest::new(algorithm);
    digest.update(data);
    digest.finish()
}
