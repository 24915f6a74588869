//! Primitive encode/decode helpers.
//!
//! All integers and floats are little-endian. Strings and sequences are
//! prefixed with a `u32` length. The format is intentionally simple: no
//! compression, no alignment padding, no self-describing schema.

use std::io::{Read, Write};

use crate::error::CodecError;

/// Upper bound on elements pre-allocated from an untrusted length prefix.
const MAX_PREALLOC: usize = 1024;

// ── Primitive writers ───────────────────────────────────────────

/// Write a single byte.
pub fn write_u8(w: &mut dyn Write, v: u8) -> Result<(), CodecError> {
    w.write_all(&[v])?;
    Ok(())
}

/// Write a boolean as a 0/1 byte.
pub fn write_bool(w: &mut dyn Write, v: bool) -> Result<(), CodecError> {
    write_u8(w, u8::from(v))
}

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i32.
pub fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f32, bit-exact.
pub fn write_f32_le(w: &mut dyn Write, v: f32) -> Result<(), CodecError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a `u32` length prefix.
pub fn write_len(w: &mut dyn Write, len: usize) -> Result<(), CodecError> {
    let len = u32::try_from(len).map_err(|_| CodecError::LengthOverflow { len })?;
    write_u32_le(w, len)
}

/// Write a length-prefixed UTF-8 string.
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), CodecError> {
    write_len(w, s.len())?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

/// Write a length-prefixed sequence, encoding each item with `f`.
pub fn write_seq<T>(
    w: &mut dyn Write,
    items: &[T],
    mut f: impl FnMut(&mut dyn Write, &T) -> Result<(), CodecError>,
) -> Result<(), CodecError> {
    write_len(w, items.len())?;
    for item in items {
        f(w, item)?;
    }
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a single byte.
pub fn read_u8(r: &mut dyn Read) -> Result<u8, CodecError> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(buf[0])
}

/// Read a boolean, rejecting bytes other than 0 and 1.
pub fn read_bool(r: &mut dyn Read) -> Result<bool, CodecError> {
    match read_u8(r)? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(CodecError::InvalidBool { value }),
    }
}

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, CodecError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian i32.
pub fn read_i32_le(r: &mut dyn Read) -> Result<i32, CodecError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read a little-endian f32, bit-exact.
pub fn read_f32_le(r: &mut dyn Read) -> Result<f32, CodecError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(f32::from_le_bytes(buf))
}

/// Read a `u32` length prefix.
pub fn read_len(r: &mut dyn Read) -> Result<usize, CodecError> {
    Ok(read_u32_le(r)? as usize)
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, CodecError> {
    let len = read_len(r)?;
    let mut buf = Vec::with_capacity(len.min(MAX_PREALLOC));
    let read = (&mut *r).take(len as u64).read_to_end(&mut buf)?;
    if read != len {
        return Err(CodecError::Truncated);
    }
    String::from_utf8(buf).map_err(|e| CodecError::InvalidUtf8 {
        detail: e.to_string(),
    })
}

/// Read a length-prefixed sequence, decoding each item with `f`.
///
/// Pre-allocation is capped so a corrupt length prefix fails with
/// [`CodecError::Truncated`] instead of exhausting memory.
pub fn read_seq<T>(
    r: &mut dyn Read,
    mut f: impl FnMut(&mut dyn Read) -> Result<T, CodecError>,
) -> Result<Vec<T>, CodecError> {
    let len = read_len(r)?;
    let mut items = Vec::with_capacity(len.min(MAX_PREALLOC));
    for _ in 0..len {
        items.push(f(r)?);
    }
    Ok(items)
}
