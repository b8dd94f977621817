//! SHA-256 digests over buffers and over byte ranges of open files.

use std::io::{self, Read, Seek, SeekFrom};

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use crate::errors::Result;

/// Size of a SHA-256 digest in bytes.
pub const HASH_LEN: usize = 32;

/// Hash an in-memory buffer.
pub fn hash_bytes(data: &[u8]) -> [u8; HASH_LEN] {
    Sha256::digest(data).into()
}

/// Hash bytes `[start, end)` of an open file.
///
/// The file's cursor is put back where it was before the call, whether
/// hashing succeeds or not.
pub fn hash_file_range<F: Read + Seek>(file: &mut F, start: u64, end: u64) -> Result<[u8; HASH_LEN]> {
    let saved = file.stream_position()?;
    let digest = hash_range_inner(file, start, end);
    let restored = file.seek(SeekFrom::Start(saved));

    let digest = digest?;
    restored?;
    Ok(digest)
}

fn hash_range_inner<F: Read + Seek>(file: &mut F, start: u64, end: u64) -> Result<[u8; HASH_LEN]> {
    if end < start {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("hash range end {end} precedes start {start}"),
        )
        .into());
    }

    file.seek(SeekFrom::Start(start))?;

    let len = end - start;
    let mut hasher = Sha256::new();
    let copied = io::copy(&mut file.by_ref().take(len), &mut hasher)?;
    if copied != len {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {len} bytes to hash, file ended after {copied}"),
        )
        .into());
    }

    Ok(hasher.finalize().into())
}

/// Compare two digests in constant time.
pub fn digests_match(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}
