//! SHA-256 content hasher with streaming support.
//!
//! # Overview
//!
//! This module provides [`Fingerprint`], the duplicate-detection key, and
//! [`hash_file`], which computes it by streaming the whole file through
//! SHA-256. Files are never partially hashed.
//!
//! # Example
//!
//! ```no_run
//! use dupecache::scanner::hash_file;
//! use std::path::Path;
//!
//! match hash_file(Path::new("photo.png")) {
//!     Ok(fingerprint) => println!("{fingerprint}"),
//!     Err(e) => eprintln!("Skipping: {e}"),
//! }
//! ```

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use super::HashError;

/// Read buffer size used while streaming file content (64 KiB).
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Length of a rendered fingerprint in hex characters.
pub const FINGERPRINT_HEX_LEN: usize = 64;

/// SHA-256 digest of a file's full content.
///
/// Two files are considered to have the same content iff their
/// fingerprints are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Render as 64 lower-case hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut out = String::with_capacity(FINGERPRINT_HEX_LEN);
        for byte in self.0 {
            out.push(hex_digit(byte >> 4));
            out.push(hex_digit(byte & 0x0f));
        }
        out
    }

    /// Parse a 64-character hex string.
    ///
    /// Upper-case digits are accepted; anything else returns `None`.
    #[must_use]
    pub fn from_hex(hex: &str) -> Option<Self> {
        let bytes = hex.as_bytes();
        if bytes.len() != FINGERPRINT_HEX_LEN {
            return None;
        }

        let mut out = [0u8; 32];
        for (slot, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
            *slot = (hex_value(pair[0])? << 4) | hex_value(pair[1])?;
        }
        Some(Self(out))
    }

    /// Compute the fingerprint of an in-memory buffer.
    #[must_use]
    pub fn of_bytes(data: &[u8]) -> Self {
        Self(Sha256::digest(data).into())
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Fingerprint {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s).ok_or_else(|| format!("Invalid fingerprint: '{s}'"))
    }
}

fn hex_digit(nibble: u8) -> char {
    char::from(b"0123456789abcdef"[usize::from(nibble)])
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Compute the fingerprint of a file's entire content.
///
/// The file handle is dropped before returning on every path.
///
/// # Errors
///
/// Returns [`HashError`] if the file cannot be opened or read. Callers in
/// the index treat this as "not available" and skip the file.
pub fn hash_file(path: &Path) -> Result<Fingerprint, HashError> {
    let file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
    let mut reader = BufReader::with_capacity(HASH_BUFFER_SIZE, file);
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];

    loop {
        let read = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(HashError::from_io(path, e)),
        };
        hasher.update(&buffer[..read]);
    }

    Ok(Fingerprint(hasher.finalize().into()))
}
