//! Low-level XDR serialization utilities for Stellar transactions
//!
//! This module provides manual byte-level encoding and decoding of the
//! External Data Representation used by the ledger: big-endian integers,
//! 4-byte alignment, length-prefixed opaques and discriminated unions.
//! Everything that gets hashed or signed goes through these functions.

use crate::error::{Result, TxAsmError};
use std::io::{Cursor, Write};

/// Trait for types that can be serialized at the byte level
pub trait ByteSerialize {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()>;

    /// Serialize into a fresh buffer
    fn to_xdr(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.serialize_bytes(&mut bytes)?;
        Ok(bytes)
    }
}

/// Trait for types that can be deserialized from bytes
pub trait ByteDeserialize: Sized {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self>;

    /// Decode a complete value, rejecting trailing bytes
    fn from_xdr(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        let value = Self::deserialize_bytes(&mut cursor)?;
        let consumed = cursor.position() as usize;
        if consumed != bytes.len() {
            return Err(TxAsmError::DeserializationError(format!(
                "{} trailing bytes after value",
                bytes.len() - consumed
            )));
        }
        Ok(value)
    }
}

/// Number of zero bytes needed to pad `len` to a 4-byte boundary
pub fn padding_len(len: usize) -> usize {
    (4 - len % 4) % 4
}

fn take<'a>(cursor: &mut Cursor<&'a [u8]>, len: usize) -> Result<&'a [u8]> {
    let position = cursor.position() as usize;
    let data: &'a [u8] = cursor.get_ref();

    if position + len > data.len() {
        return Err(TxAsmError::BufferTooSmall {
            needed: position + len,
            available: data.len(),
        });
    }

    cursor.set_position((position + len) as u64);
    Ok(&data[position..position + len])
}

fn skip_padding(cursor: &mut Cursor<&[u8]>, len: usize) -> Result<()> {
    let padding = take(cursor, padding_len(len))?;
    if padding.iter().any(|&b| b != 0) {
        return Err(TxAsmError::DeserializationError(
            "Non-zero padding bytes".to_string(),
        ));
    }
    Ok(())
}

/// Encode a u32 in big-endian format
pub fn encode_u32(value: u32, writer: &mut Vec<u8>) -> Result<()> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

/// Decode a big-endian u32
pub fn decode_u32(cursor: &mut Cursor<&[u8]>) -> Result<u32> {
    let bytes = take(cursor, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Encode an i32 in big-endian format
pub fn encode_i32(value: i32, writer: &mut Vec<u8>) -> Result<()> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

/// Decode a big-endian i32
pub fn decode_i32(cursor: &mut Cursor<&[u8]>) -> Result<i32> {
    Ok(decode_u32(cursor)? as i32)
}

/// Encode a u64 in big-endian format
pub fn encode_u64(value: u64, writer: &mut Vec<u8>) -> Result<()> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

/// Decode a big-endian u64
pub fn decode_u64(cursor: &mut Cursor<&[u8]>) -> Result<u64> {
    let bytes = take(cursor, 8)?;
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    Ok(u64::from_be_bytes(buf))
}

/// Encode an i64 in big-endian format
pub fn encode_i64(value: i64, writer: &mut Vec<u8>) -> Result<()> {
    writer.write_all(&value.to_be_bytes())?;
    Ok(())
}

/// Decode a big-endian i64
pub fn decode_i64(cursor: &mut Cursor<&[u8]>) -> Result<i64> {
    Ok(decode_u64(cursor)? as i64)
}

/// Encode a bool as a 4-byte 0/1 word
pub fn encode_bool(value: bool, writer: &mut Vec<u8>) -> Result<()> {
    encode_u32(u32::from(value), writer)
}

/// Decode a bool, rejecting anything but 0 and 1
pub fn decode_bool(cursor: &mut Cursor<&[u8]>) -> Result<bool> {
    match decode_u32(cursor)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(TxAsmError::DeserializationError(format!(
            "Invalid bool value {}",
            other
        ))),
    }
}

/// Encode fixed-length opaque data, padded to a 4-byte boundary
pub fn encode_fixed_opaque(data: &[u8], writer: &mut Vec<u8>) -> Result<()> {
    writer.write_all(data)?;
    writer.write_all(&[0u8; 3][..padding_len(data.len())])?;
    Ok(())
}

/// Decode fixed-length opaque data of `N` bytes
pub fn decode_fixed_opaque<const N: usize>(cursor: &mut Cursor<&[u8]>) -> Result<[u8; N]> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(cursor, N)?);
    skip_padding(cursor, N)?;
    Ok(out)
}

/// Encode variable-length opaque data: u32 length, bytes, padding
pub fn encode_var_opaque(data: &[u8], max_len: usize, writer: &mut Vec<u8>) -> Result<()> {
    if data.len() > max_len {
        return Err(TxAsmError::SerializationError(format!(
            "Opaque of {} bytes exceeds limit of {}",
            data.len(),
            max_len
        )));
    }
    encode_u32(data.len() as u32, writer)?;
    encode_fixed_opaque(data, writer)
}

/// Decode variable-length opaque data
pub fn decode_var_opaque(cursor: &mut Cursor<&[u8]>, max_len: usize) -> Result<Vec<u8>> {
    let len = decode_u32(cursor)? as usize;
    if len > max_len {
        return Err(TxAsmError::DeserializationError(format!(
            "Opaque of {} bytes exceeds limit of {}",
            len, max_len
        )));
    }
    let data = take(cursor, len)?.to_vec();
    skip_padding(cursor, len)?;
    Ok(data)
}

/// Encode an XDR string (same layout as variable opaque)
pub fn encode_string(value: &str, max_len: usize, writer: &mut Vec<u8>) -> Result<()> {
    encode_var_opaque(value.as_bytes(), max_len, writer)
}

/// Decode an XDR string, requiring valid UTF-8
pub fn decode_string(cursor: &mut Cursor<&[u8]>, max_len: usize) -> Result<String> {
    let bytes = decode_var_opaque(cursor, max_len)?;
    String::from_utf8(bytes)
        .map_err(|e| TxAsmError::DeserializationError(format!("Invalid UTF-8 string: {}", e)))
}

/// Custom serialization helpers for composite XDR types
pub mod helpers {
    use super::*;

    /// Serialize a vector with a u32 count prefix
    pub fn serialize_vec<T: ByteSerialize>(items: &[T], writer: &mut Vec<u8>) -> Result<()> {
        encode_u32(items.len() as u32, writer)?;
        for item in items {
            item.serialize_bytes(writer)?;
        }
        Ok(())
    }

    /// Deserialize a counted vector of at most `max_len` items
    pub fn deserialize_vec<T: ByteDeserialize>(
        cursor: &mut Cursor<&[u8]>,
        max_len: usize,
    ) -> Result<Vec<T>> {
        let len = decode_u32(cursor)? as usize;
        if len > max_len {
            return Err(TxAsmError::DeserializationError(format!(
                "Array of {} items exceeds limit of {}",
                len, max_len
            )));
        }
        let mut items = Vec::with_capacity(len);
        for _ in 0..len {
            items.push(T::deserialize_bytes(cursor)?);
        }
        Ok(items)
    }

    /// Serialize an optional value as a presence flag followed by the value
    pub fn serialize_optional<T: ByteSerialize>(
        value: Option<&T>,
        writer: &mut Vec<u8>,
    ) -> Result<()> {
        match value {
            Some(inner) => {
                encode_bool(true, writer)?;
                inner.serialize_bytes(writer)
            }
            None => encode_bool(false, writer),
        }
    }

    /// Deserialize an optional value
    pub fn deserialize_optional<T: ByteDeserialize>(
        cursor: &mut Cursor<&[u8]>,
    ) -> Result<Option<T>> {
        if decode_bool(cursor)? {
            Ok(Some(T::deserialize_bytes(cursor)?))
        } else {
            Ok(None)
        }
    }

    /// Serialize an optional u32 (flags, weights, thresholds)
    pub fn serialize_optional_u32(value: Option<u32>, writer: &mut Vec<u8>) -> Result<()> {
        match value {
            Some(inner) => {
                encode_bool(true, writer)?;
                encode_u32(inner, writer)
            }
            None => encode_bool(false, writer),
        }
    }

    /// Deserialize an optional u32
    pub fn deserialize_optional_u32(cursor: &mut Cursor<&[u8]>) -> Result<Option<u32>> {
        if decode_bool(cursor)? {
            Ok(Some(decode_u32(cursor)?))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_are_big_endian() {
        let mut buf = Vec::new();
        encode_u32(100, &mut buf).unwrap();
        encode_i64(28515645087809561, &mut buf).unwrap();
        assert_eq!(hex::encode(&buf), "0000006400654ed400000019");

        let mut cursor = Cursor::new(buf.as_slice());
        assert_eq!(decode_u32(&mut cursor).unwrap(), 100);
        assert_eq!(decode_i64(&mut cursor).unwrap(), 28515645087809561);
    }

    #[test]
    fn test_var_opaque_is_padded() {
        let mut buf = Vec::new();
        encode_string("www.home-domain.com", 32, &mut buf).unwrap();
        // 4 length bytes + 19 data bytes + 1 padding byte
        assert_eq!(buf.len(), 24);
        assert_eq!(&buf[..4], &[0, 0, 0, 19]);
        assert_eq!(buf[23], 0);

        let mut cursor = Cursor::new(buf.as_slice());
        assert_eq!(decode_string(&mut cursor, 32).unwrap(), "www.home-domain.com");
    }

    #[test]
    fn test_var_opaque_limit() {
        let mut buf = Vec::new();
        assert!(encode_var_opaque(&[1u8; 65], 64, &mut buf).is_err());
    }

    #[test]
    fn test_non_zero_padding_rejected() {
        let bytes = [0u8, 0, 0, 1, 0xAA, 0, 0, 1];
        let mut cursor = Cursor::new(&bytes[..]);
        assert!(decode_var_opaque(&mut cursor, 8).is_err());
    }

    #[test]
    fn test_bool_rejects_other_values() {
        let bytes = [0u8, 0, 0, 2];
        let mut cursor = Cursor::new(&bytes[..]);
        assert!(decode_bool(&mut cursor).is_err());
    }

    #[test]
    fn test_truncated_input() {
        let bytes = [0u8, 0, 0];
        let mut cursor = Cursor::new(&bytes[..]);
        match decode_u32(&mut cursor) {
            Err(TxAsmError::BufferTooSmall { needed, available }) => {
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
