//! Binary encoding of cache files.
//!
//! # Layout
//!
//! ```text
//! string   version            ("1.0")
//! int32    entryCount
//! repeat entryCount times:
//!     string  fingerprint      (64 lower-case hex characters)
//!     int32   pathCount
//!     repeat pathCount times:
//!         string  absolutePath
//! ```
//!
//! `int32` values are 4 bytes little-endian. A `string` is its UTF-8 byte
//! length as an unsigned LEB128 varint (at most 5 bytes) followed by the
//! bytes themselves. This is the layout produced by .NET's `BinaryWriter`,
//! so caches written by other tools using it can be read back unchanged.
//!
//! Decoding never trusts a length for pre-allocation; a truncated or
//! malformed stream yields a [`CodecError`] instead of a panic.

use std::io::{self, Read, Write};

use thiserror::Error;

/// Version tag written at the start of every cache file.
pub const CACHE_VERSION: &str = "1.0";

/// Maximum number of bytes in a 7-bit encoded 32-bit length.
const MAX_VARINT_BYTES: usize = 5;

/// Errors raised while encoding or decoding a cache stream.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The version tag does not match the one this reader understands.
    #[error("Cache version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Version this reader expects
        expected: String,
        /// Version found in the stream
        found: String,
    },

    /// The stream ended in the middle of a value.
    #[error("Unexpected end of cache data")]
    Truncated,

    /// A string length prefix is not a valid 7-bit encoded integer.
    #[error("Malformed string length prefix")]
    BadLength,

    /// A count field is negative.
    #[error("Negative count in cache data: {0}")]
    NegativeCount(i32),

    /// An entry key is not a 64-character hex fingerprint.
    #[error("Invalid fingerprint in cache data: '{0}'")]
    BadFingerprint(String),

    /// A string is not valid UTF-8.
    #[error("Cache string is not valid UTF-8")]
    InvalidUtf8,

    /// Any other I/O failure on the underlying stream.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for CodecError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Self::Truncated
        } else {
            Self::Io(e)
        }
    }
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Writes primitive cache values to a byte stream.
pub struct CacheWriter<W: Write> {
    inner: W,
}

impl<W: Write> CacheWriter<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Write the version tag followed by the entry count.
    pub fn write_header(&mut self, version: &str, entry_count: usize) -> CodecResult<()> {
        self.write_string(version)?;
        self.write_count(entry_count)
    }

    /// Write a count as an `int32`.
    ///
    /// # Errors
    ///
    /// Counts above `i32::MAX` cannot be represented and return
    /// [`CodecError::Io`] with `InvalidInput`.
    pub fn write_count(&mut self, count: usize) -> CodecResult<()> {
        let value = i32::try_from(count).map_err(|_| {
            CodecError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("count {count} exceeds int32 range"),
            ))
        })?;
        self.write_i32(value)
    }

    /// Write a little-endian `int32`.
    pub fn write_i32(&mut self, value: i32) -> CodecResult<()> {
        self.inner.write_all(&value.to_le_bytes())?;
        Ok(())
    }

    /// Write a length-prefixed UTF-8 string.
    pub fn write_string(&mut self, value: &str) -> CodecResult<()> {
        let bytes = value.as_bytes();
        let mut len = u32::try_from(bytes.len()).map_err(|_| {
            CodecError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                "string too long for cache format",
            ))
        })?;

        let mut prefix = [0u8; MAX_VARINT_BYTES];
        let mut used = 0;
        loop {
            let byte = (len & 0x7f) as u8;
            len >>= 7;
            if len == 0 {
                prefix[used] = byte;
                used += 1;
                break;
            }
            prefix[used] = byte | 0x80;
            used += 1;
        }

        self.inner.write_all(&prefix[..used])?;
        self.inner.write_all(bytes)?;
        Ok(())
    }

    /// Flush and return the wrapped writer.
    pub fn finish(mut self) -> CodecResult<W> {
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Reads primitive cache values from a byte stream.
pub struct CacheReader<R: Read> {
    inner: R,
}

impl<R: Read> CacheReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read and check the version tag, then return the entry count.
    pub fn read_header(&mut self, expected_version: &str) -> CodecResult<usize> {
        let found = self.read_string()?;
        if found != expected_version {
            return Err(CodecError::VersionMismatch {
                expected: expected_version.to_string(),
                found,
            });
        }
        self.read_count()
    }

    /// Read an `int32` that must not be negative.
    pub fn read_count(&mut self) -> CodecResult<usize> {
        let value = self.read_i32()?;
        usize::try_from(value).map_err(|_| CodecError::NegativeCount(value))
    }

    /// Read a little-endian `int32`.
    pub fn read_i32(&mut self) -> CodecResult<i32> {
        let mut buf = [0u8; 4];
        self.inner.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }

    /// Read a length-prefixed UTF-8 string.
    pub fn read_string(&mut self) -> CodecResult<String> {
        let len = self.read_length()?;

        let mut bytes = Vec::new();
        let read = (&mut self.inner).take(len as u64).read_to_end(&mut bytes)?;
        if read != len {
            return Err(CodecError::Truncated);
        }

        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }

    fn read_length(&mut self) -> CodecResult<usize> {
        let mut value: u32 = 0;
        for index in 0..MAX_VARINT_BYTES {
            let mut byte = [0u8; 1];
            self.inner.read_exact(&mut byte)?;
            let byte = byte[0];

            // The fifth byte may only carry the top 4 bits of a u32.
            if index == MAX_VARINT_BYTES - 1 && byte > 0x0f {
                return Err(CodecError::BadLength);
            }

            value |= u32::from(byte & 0x7f) << (7 * index);
            if byte & 0x80 == 0 {
                return i32::try_from(value)
                    .map(|v| v as usize)
                    .map_err(|_| CodecError::BadLength);
            }
        }
        Err(CodecError::BadLength)
    }
}
