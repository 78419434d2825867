//! Transaction memo

use crate::error::{Result, TxAsmError};
use crate::serialization::{
    decode_fixed_opaque, decode_string, decode_u32, decode_u64, encode_fixed_opaque,
    encode_string, encode_u32, encode_u64,
};
use crate::serialization::{ByteDeserialize, ByteSerialize};
use std::io::Cursor;

/// Maximum memo text length in UTF-8 bytes
pub const MAX_MEMO_TEXT_LEN: usize = 28;

/// Exactly one memo representation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Memo {
    #[default]
    None,
    Text(String),
    Id(u64),
    Hash([u8; 32]),
    Return([u8; 32]),
}

impl Memo {
    pub fn text(text: &str) -> Result<Self> {
        if text.len() > MAX_MEMO_TEXT_LEN {
            return Err(TxAsmError::MemoTooLong { len: text.len() });
        }
        Ok(Memo::Text(text.to_string()))
    }

    pub fn id(id: u64) -> Self {
        Memo::Id(id)
    }

    /// Hash memo from 64 hex characters
    pub fn hash_hex(hex_text: &str) -> Result<Self> {
        Ok(Memo::Hash(decode_hash(hex_text)?))
    }

    /// Return-hash memo from 64 hex characters
    pub fn return_hex(hex_text: &str) -> Result<Self> {
        Ok(Memo::Return(decode_hash(hex_text)?))
    }

    fn discriminant(&self) -> u32 {
        match self {
            Memo::None => 0,
            Memo::Text(_) => 1,
            Memo::Id(_) => 2,
            Memo::Hash(_) => 3,
            Memo::Return(_) => 4,
        }
    }
}

fn decode_hash(hex_text: &str) -> Result<[u8; 32]> {
    let bytes = hex::decode(hex_text)
        .map_err(|e| TxAsmError::InvalidMemo(format!("{}: {}", hex_text, e)))?;
    <[u8; 32]>::try_from(bytes.as_slice()).map_err(|_| {
        TxAsmError::InvalidMemo(format!("expected 32 bytes, got {}", bytes.len()))
    })
}

/// Encode a memo to its wire form
pub fn encode_memo(memo: &Memo) -> Result<Vec<u8>> {
    memo.to_xdr()
}

impl ByteSerialize for Memo {
    fn serialize_bytes(&self, writer: &mut Vec<u8>) -> Result<()> {
        encode_u32(self.discriminant(), writer)?;
        match self {
            Memo::None => Ok(()),
            Memo::Text(text) => {
                if text.len() > MAX_MEMO_TEXT_LEN {
                    return Err(TxAsmError::MemoTooLong { len: text.len() });
                }
                encode_string(text, MAX_MEMO_TEXT_LEN, writer)
            }
            Memo::Id(id) => encode_u64(*id, writer),
            Memo::Hash(hash) | Memo::Return(hash) => encode_fixed_opaque(hash, writer),
        }
    }
}

impl ByteDeserialize for Memo {
    fn deserialize_bytes(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        match decode_u32(cursor)? {
            0 => Ok(Memo::None),
            1 => Ok(Memo::Text(decode_string(cursor, MAX_MEMO_TEXT_LEN)?)),
            2 => Ok(Memo::Id(decode_u64(cursor)?)),
            3 => Ok(Memo::Hash(decode_fixed_opaque::<32>(cursor)?)),
            4 => Ok(Memo::Return(decode_fixed_opaque::<32>(cursor)?)),
            other => Err(TxAsmError::DeserializationError(format!(
                "Unknown memo type {}",
                other
            ))),
        }
    }
}
