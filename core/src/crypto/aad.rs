//! crypto/aad.rs
//! Canonical encoding of structured associated data.
//!
//! Layout (v1, little-endian):
//!
//! ```text
//! [version:u8 = 0x01][count:u32]
//! repeated count times: [tag:u8][len:u32][payload: len bytes]
//! ```
//!
//! | tag  | value      | payload                                  |
//! |------|------------|------------------------------------------|
//! | 0x01 | Bytes      | raw bytes                                |
//! | 0x02 | Text       | UTF-8                                    |
//! | 0x03 | Int        | i64 LE                                   |
//! | 0x04 | UInt       | u64 LE                                   |
//! | 0x05 | Bool       | one byte, 0 or 1                         |
//! | 0x06 | Timestamp  | i64 LE, microseconds since the Unix epoch|
//! | 0x07 | Structured | canonical JSON, object keys sorted       |
//!
//! The encoding is order-sensitive and deterministic: encrypting and
//! decrypting sides produce identical bytes for the same sequence. A layout
//! change must bump the version byte, otherwise old envelopes fail
//! authentication as if tampered.

use byteorder::{ByteOrder, LittleEndian};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::constants::{aad_tags, aad_versions};
use crate::crypto::types::CryptoError;

/// One structured associated-data value.
///
/// Timestamps are bound at microsecond precision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AadValue {
    Bytes(Vec<u8>),
    Text(String),
    Int(i64),
    UInt(u64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    /// Canonical JSON text; build with [`AadValue::structured`].
    Structured(String),
}

impl AadValue {
    /// Render any `Serialize` value as canonical JSON (object keys sorted at
    /// every depth).
    ///
    /// Fails with `SerializationFailure` when serde cannot represent the value
    /// as JSON, e.g. a map keyed by tuples or a `Serialize` impl that errors.
    pub fn structured<T: Serialize + ?Sized>(value: &T) -> Result<Self, CryptoError> {
        let value = serde_json::to_value(value)
            .map_err(|e| CryptoError::serialization_caused_by("value is not representable as JSON", e))?;
        let text = serde_json::to_string(&canonicalize(value))
            .map_err(|e| CryptoError::serialization_caused_by("canonical JSON rendering failed", e))?;
        Ok(AadValue::Structured(text))
    }

    fn tag(&self) -> u8 {
        match self {
            AadValue::Bytes(_)      => aad_tags::BYTES,
            AadValue::Text(_)       => aad_tags::TEXT,
            AadValue::Int(_)        => aad_tags::INT,
            AadValue::UInt(_)       => aad_tags::UINT,
            AadValue::Bool(_)       => aad_tags::BOOL,
            AadValue::Timestamp(_)  => aad_tags::TIMESTAMP,
            AadValue::Structured(_) => aad_tags::STRUCTURED,
        }
    }

    fn payload(&self) -> Vec<u8> {
        match self {
            AadValue::Bytes(b)      => b.clone(),
            AadValue::Text(s)       => s.as_bytes().to_vec(),
            AadValue::Int(v)        => v.to_le_bytes().to_vec(),
            AadValue::UInt(v)       => v.to_le_bytes().to_vec(),
            AadValue::Bool(v)       => vec![u8::from(*v)],
            AadValue::Timestamp(t)  => t.timestamp_micros().to_le_bytes().to_vec(),
            AadValue::Structured(s) => s.as_bytes().to_vec(),
        }
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let mut sorted = Map::new();
            for (k, v) in entries {
                sorted.insert(k, canonicalize(v));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

impl From<&str> for AadValue {
    fn from(v: &str) -> Self { AadValue::Text(v.to_owned()) }
}
impl From<String> for AadValue {
    fn from(v: String) -> Self { AadValue::Text(v) }
}
impl From<&[u8]> for AadValue {
    fn from(v: &[u8]) -> Self { AadValue::Bytes(v.to_vec()) }
}
impl From<Vec<u8>> for AadValue {
    fn from(v: Vec<u8>) -> Self { AadValue::Bytes(v) }
}
impl From<i64> for AadValue {
    fn from(v: i64) -> Self { AadValue::Int(v) }
}
impl From<i32> for AadValue {
    fn from(v: i32) -> Self { AadValue::Int(i64::from(v)) }
}
impl From<u64> for AadValue {
    fn from(v: u64) -> Self { AadValue::UInt(v) }
}
impl From<u32> for AadValue {
    fn from(v: u32) -> Self { AadValue::UInt(u64::from(v)) }
}
impl From<bool> for AadValue {
    fn from(v: bool) -> Self { AadValue::Bool(v) }
}
impl From<DateTime<Utc>> for AadValue {
    fn from(v: DateTime<Utc>) -> Self { AadValue::Timestamp(v) }
}

/// Encode an ordered sequence of values into canonical AAD bytes.
pub fn encode_aad(values: &[AadValue]) -> Result<Vec<u8>, CryptoError> {
    fn put_u32(out: &mut Vec<u8>, v: u32) {
        let mut b = [0u8; 4];
        LittleEndian::write_u32(&mut b, v);
        out.extend_from_slice(&b);
    }

    let count = u32::try_from(values.len())
        .map_err(|_| CryptoError::serialization("too many associated-data values"))?;

    let mut out = Vec::with_capacity(5 + values.len() * 13);
    out.push(aad_versions::V1);
    put_u32(&mut out, count);

    for value in values {
        let payload = value.payload();
        let len = u32::try_from(payload.len())
            .map_err(|_| CryptoError::serialization("associated-data value exceeds 4 GiB"))?;
        out.push(value.tag());
        put_u32(&mut out, len);
        out.extend_from_slice(&payload);
    }

    Ok(out)
}

/// Canonical AAD binding a single instant.
pub fn timestamp_aad(at: DateTime<Utc>) -> Result<Vec<u8>, CryptoError> {
    encode_aad(&[AadValue::Timestamp(at)])
}

/// Parse canonical AAD bytes back into values.
///
/// AAD travels in the clear next to the envelope, so applications may
/// inspect it (for example to check a bound timestamp) before decrypting.
pub fn decode_aad(bytes: &[u8]) -> Result<Vec<AadValue>, CryptoError> {
    fn take<'a>(buf: &'a [u8], off: &mut usize, n: usize) -> Result<&'a [u8], CryptoError> {
        let end = off
            .checked_add(n)
            .filter(|&end| end <= buf.len())
            .ok_or_else(|| CryptoError::serialization("associated data truncated"))?;
        let s = &buf[*off..end];
        *off = end;
        Ok(s)
    }

    let mut off = 0usize;
    let version = take(bytes, &mut off, 1)?[0];
    if version != aad_versions::V1 {
        return Err(CryptoError::serialization(format!(
            "unsupported associated-data encoding version 0x{:02x}",
            version
        )));
    }
    let count = LittleEndian::read_u32(take(bytes, &mut off, 4)?) as usize;

    let mut values = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        let tag = take(bytes, &mut off, 1)?[0];
        let len = LittleEndian::read_u32(take(bytes, &mut off, 4)?) as usize;
        let payload = take(bytes, &mut off, len)?;
        values.push(decode_value(tag, payload)?);
    }

    if off != bytes.len() {
        return Err(CryptoError::serialization("trailing bytes after associated data"));
    }
    Ok(values)
}

fn decode_value(tag: u8, payload: &[u8]) -> Result<AadValue, CryptoError> {
    let fixed = |n: usize| {
        if payload.len() == n {
            Ok(payload)
        } else {
            Err(CryptoError::serialization(format!(
                "tag 0x{:02x} expects {} payload bytes, found {}",
                tag,
                n,
                payload.len()
            )))
        }
    };
    let utf8 = || {
        String::from_utf8(payload.to_vec())
            .map_err(|e| CryptoError::serialization_caused_by("text value is not UTF-8", e))
    };

    let value = match tag {
        aad_tags::BYTES      => AadValue::Bytes(payload.to_vec()),
        aad_tags::TEXT       => AadValue::Text(utf8()?),
        aad_tags::INT        => AadValue::Int(LittleEndian::read_i64(fixed(8)?)),
        aad_tags::UINT       => AadValue::UInt(LittleEndian::read_u64(fixed(8)?)),
        aad_tags::BOOL       => match fixed(1)?[0] {
            0 => AadValue::Bool(false),
            1 => AadValue::Bool(true),
            b => return Err(CryptoError::serialization(format!("invalid bool byte 0x{:02x}", b))),
        },
        aad_tags::TIMESTAMP  => {
            let micros = LittleEndian::read_i64(fixed(8)?);
            let at = DateTime::<Utc>::from_timestamp_micros(micros)
                .ok_or_else(|| CryptoError::serialization("timestamp out of range"))?;
            AadValue::Timestamp(at)
        }
        aad_tags::STRUCTURED => AadValue::Structured(utf8()?),
        other => {
            return Err(CryptoError::serialization(format!("unknown associated-data tag 0x{:02x}", other)))
        }
    };
    Ok(value)
}
