//! Error types for the binary codec.

use std::fmt;
use std::io;

/// Errors that can occur while encoding or decoding a message.
#[derive(Debug)]
pub enum CodecError {
    /// An I/O error other than end-of-input occurred in the underlying sink or source.
    Io(io::Error),
    /// The input ended before the message was complete.
    Truncated,
    /// The message tag does not match the requested type.
    UnexpectedTag {
        /// Tag of the requested type.
        expected: u8,
        /// Tag found in the input.
        found: u8,
    },
    /// The format version is not supported by this build.
    UnsupportedVersion {
        /// The version found in the input.
        found: u8,
    },
    /// An enum discriminant is out of range.
    InvalidEnum {
        /// Name of the enum being decoded.
        name: &'static str,
        /// The unrecognized discriminant.
        value: u8,
    },
    /// A boolean byte is neither 0 nor 1.
    InvalidBool {
        /// The offending byte.
        value: u8,
    },
    /// A string is not valid UTF-8.
    InvalidUtf8 {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// Bytes remain after a complete message.
    TrailingBytes {
        /// Number of unread bytes.
        count: usize,
    },
    /// A string or sequence is too long for its `u32` length prefix.
    LengthOverflow {
        /// The length that did not fit.
        len: usize,
    },
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Truncated => write!(f, "truncated message"),
            Self::UnexpectedTag { expected, found } => {
                write!(f, "unexpected message tag {found} (expected {expected})")
            }
            Self::UnsupportedVersion { found } => {
                write!(f, "unsupported format version {found}")
            }
            Self::InvalidEnum { name, value } => {
                write!(f, "invalid {name} discriminant {value}")
            }
            Self::InvalidBool { value } => write!(f, "invalid bool byte {value}"),
            Self::InvalidUtf8 { detail } => write!(f, "invalid UTF-8 string: {detail}"),
            Self::TrailingBytes { count } => {
                write!(f, "{count} trailing bytes after message")
            }
            Self::LengthOverflow { len } => {
                write!(f, "length {len} exceeds u32::MAX")
            }
        }
    }
}

impl std::error::Error for CodecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
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
