//! Deterministic binary encoding for the Phyre data model.
//!
//! Tasks, scenes, bodies, user input and simulation results cross the
//! host boundary as opaque byte strings. This crate turns them into bytes
//! and back.
//!
//! # Format
//!
//! ```text
//! [TAG u8] [VERSION u8] [body]
//! ```
//!
//! The tag identifies the message type, so a scene can never be decoded
//! as a task by accident. Bodies are built from the primitives in
//! [`codec`]: little-endian integers and floats, strictly 0/1 booleans,
//! `u32`-length-prefixed strings and sequences. Floats are stored
//! bit-exact and every value has exactly one encoding, so
//! `encode(decode(bytes)) == bytes` for any accepted input.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod message;

pub use error::CodecError;
pub use message::Wire;

/// Current binary format version.
pub const FORMAT_VERSION: u8 = 1;

/// Message tag for [`Scene`](phyre_core::Scene).
pub const TAG_SCENE: u8 = 1;
/// Message tag for [`Task`](phyre_core::Task).
pub const TAG_TASK: u8 = 2;
/// Message tag for [`UserInput`](phyre_core::UserInput).
pub const TAG_USER_INPUT: u8 = 3;
/// Message tag for [`TaskSimulation`](phyre_core::TaskSimulation).
pub const TAG_TASK_SIMULATION: u8 = 4;
/// Message tag for [`Body`](phyre_core::Body).
pub const TAG_BODY: u8 = 5;

/// Encode a message, header included.
///
/// Fails only when a string or sequence is longer than `u32::MAX`.
pub fn encode<T: Wire>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::with_capacity(64);
    codec::write_u8(&mut buf, T::TAG)?;
    codec::write_u8(&mut buf, FORMAT_VERSION)?;
    value.write_body(&mut buf)?;
    Ok(buf)
}

/// Decode a message, validating its header and rejecting trailing bytes.
pub fn decode<T: Wire>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut cursor = bytes;
    let tag = codec::read_u8(&mut cursor)?;
    if tag != T::TAG {
        return Err(CodecError::UnexpectedTag {
            expected: T::TAG,
            found: tag,
        });
    }
    let version = codec::read_u8(&mut cursor)?;
    if version != FORMAT_VERSION {
        return Err(CodecError::UnsupportedVersion { found: version });
    }
    let value = T::read_body(&mut cursor)?;
    if !cursor.is_empty() {
        return Err(CodecError::TrailingBytes {
            count: cursor.len(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use phyre_core::{Scene, Task};

    #[test]
    fn header_carries_tag_and_version() {
        let bytes = encode(&Scene::new(8, 4)).unwrap();
        assert_eq!(bytes[0], TAG_SCENE);
        assert_eq!(bytes[1], FORMAT_VERSION);
    }

    #[test]
    fn mistagged_input_rejected() {
        let bytes = encode(&Scene::new(8, 4)).unwrap();
        let result = decode::<Task>(&bytes);
        assert!(matches!(
            result,
            Err(CodecError::UnexpectedTag {
                expected: TAG_TASK,
                found: TAG_SCENE
            })
        ));
    }

    #[test]
    fn bad_version_rejected() {
        let mut bytes = encode(&Scene::new(8, 4)).unwrap();
        bytes[1] = 99;
        assert!(matches!(
            decode::<Scene>(&bytes),
            Err(CodecError::UnsupportedVersion { found: 99 })
        ));
    }

    #[test]
    fn trailing_bytes_rejected() {
        let mut bytes = encode(&Scene::new(8, 4)).unwrap();
        bytes.extend_from_slice(&[0, 0]);
        assert!(matches!(
            decode::<Scene>(&bytes),
            Err(CodecError::TrailingBytes { count: 2 })
        ));
    }

    #[test]
    fn empty_input_is_truncated() {
        assert!(matches!(decode::<Scene>(&[]), Err(CodecError::Truncated)));
    }
}
