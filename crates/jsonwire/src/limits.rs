//! Body size limits and the size-limited reader used for decoding.
//!
//! The ceiling is enforced while reading: [`LimitReader`] hands out at most
//! `max_body_bytes` bytes, then probes the source for a single extra byte to
//! tell a clean end of stream apart from an oversized body.

use std::fmt;
use std::io::{ErrorKind, Read};

use serde::Deserialize;

use crate::error::{CodecError, CodecResult};

/// Default request body ceiling (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: u64 = 1_048_576;

/// Environment variable overriding [`JsonLimits::max_body_bytes`].
pub const MAX_BODY_BYTES_ENV: &str = "JSONWIRE_MAX_BODY_BYTES";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * 1024;

/// A byte count rendered the way error messages show buffer sizes.
///
/// Whole mebibytes print as `1MB`, whole kibibytes as `64KB`, anything else
/// as `1000 bytes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteSize(pub u64);

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.0;
        if n != 0 && n % MIB == 0 {
            write!(f, "{}MB", n / MIB)
        } else if n != 0 && n % KIB == 0 {
            write!(f, "{}KB", n / KIB)
        } else {
            write!(f, "{} bytes", n)
        }
    }
}

/// Resource limits for request body decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonLimits {
    /// Maximum number of body bytes read while decoding.
    pub max_body_bytes: u64,
}

impl Default for JsonLimits {
    fn default() -> Self {
        Self {
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Partial overrides for `JsonLimits`. Used for config file parsing.
/// Unknown keys cause deserialization to fail (deny_unknown_fields).
/// Merge with `JsonLimits::default().apply(overrides)`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JsonLimitsOverrides {
    pub max_body_bytes: Option<u64>,
}

impl JsonLimits {
    /// Limits with a custom body ceiling.
    pub fn with_max_body_bytes(mut self, max_body_bytes: u64) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Apply overrides onto these limits. Only `Some` values override.
    pub fn apply(self, overrides: JsonLimitsOverrides) -> Self {
        Self {
            max_body_bytes: overrides.max_body_bytes.unwrap_or(self.max_body_bytes),
        }
    }

    /// Create limits from environment variables.
    ///
    /// | Variable | Description |
    /// |----------|-------------|
    /// | `JSONWIRE_MAX_BODY_BYTES` | Request body ceiling in bytes (default: 1048576) |
    ///
    /// Values that do not parse as a positive integer are ignored.
    pub fn from_env() -> Self {
        let max_body_bytes = std::env::var(MAX_BODY_BYTES_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|&v| v > 0);

        let limits = Self::default().apply(JsonLimitsOverrides { max_body_bytes });
        tracing::debug!(
            max_body_bytes = limits.max_body_bytes,
            "resolved JSON body limits"
        );
        limits
    }

    /// Reject limits that would refuse every request.
    pub fn validate(&self) -> CodecResult<()> {
        if self.max_body_bytes == 0 {
            return Err(CodecError::InvalidLimits {
                message: "max_body_bytes must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// The body ceiling as a display-friendly size.
    pub fn max_body_size(&self) -> ByteSize {
        ByteSize(self.max_body_bytes)
    }
}

/// A reader that limits the total number of bytes read and fails explicitly on overflow.
///
/// Once `limit` bytes have been handed out, the next read probes the source for
/// one more byte. End of stream is reported as `Ok(0)`; anything else marks the
/// reader as exceeded and fails the read.
pub(crate) struct LimitReader<R> {
    inner: R,
    limit: u64,
    read: u64,
    exceeded: bool,
}

impl<R: Read> LimitReader<R> {
    pub(crate) fn new(inner: R, limit: u64) -> Self {
        Self {
            inner,
            limit,
            read: 0,
            exceeded: false,
        }
    }

    /// Whether the source held more than `limit` bytes.
    pub(crate) fn exceeded(&self) -> bool {
        self.exceeded
    }

    pub(crate) fn bytes_read(&self) -> u64 {
        self.read
    }

    fn overflow_error(&self) -> std::io::Error {
        std::io::Error::other(format!(
            "request body exceeded limit of {} bytes",
            self.limit
        ))
    }

    fn probe_end_of_stream(&mut self) -> std::io::Result<bool> {
        let mut probe = [0u8; 1];
        loop {
            match self.inner.read(&mut probe) {
                Ok(n) => return Ok(n == 0),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: Read> Read for LimitReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.exceeded {
            return Err(self.overflow_error());
        }

        if self.read >= self.limit {
            if self.probe_end_of_stream()? {
                return Ok(0);
            }
            self.exceeded = true;
            return Err(self.overflow_error());
        }

        let max_to_read = (self.limit - self.read).min(buf.len() as u64) as usize;
        let n = self.inner.read(&mut buf[..max_to_read])?;
        self.read += n as u64;

        Ok(n)
    }
}
