//! JSON (de)serialization against an already-open writer/reader.
//!
//! The codec never flushes or closes anything; the writer/reader chains in
//! `crate::io` own that.

use crate::config::FormatConfig;
use crate::error::BodyError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

mod escape;

pub use escape::AsciiEscaping;

/// Encode `value` as compact JSON **into the provided writer**.
pub fn encode_into<T, W>(value: &T, w: &mut W, cfg: &FormatConfig) -> Result<(), BodyError>
where
    T: Serialize + ?Sized,
    W: Write + ?Sized,
{
    let res = if cfg.escape_non_ascii {
        let mut ser = serde_json::Serializer::with_formatter(&mut *w, AsciiEscaping);
        value.serialize(&mut ser)
    } else {
        let mut ser = serde_json::Serializer::new(&mut *w);
        value.serialize(&mut ser)
    };
    res.map_err(BodyError::from_encode)
}

/// Decode exactly one JSON document **from the provided reader**.
///
/// Trailing whitespace is fine, anything else after the document is a decode error.
/// An empty body is not handled here: `crate::reader` maps it to `T::default()` before
/// the codec ever sees the stream.
pub fn decode_from<T, R>(r: R, _cfg: &FormatConfig) -> Result<T, BodyError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut de = serde_json::Deserializer::from_reader(r);
    let val = T::deserialize(&mut de).map_err(BodyError::from_decode)?;
    de.end().map_err(BodyError::from_decode)?;
    Ok(val)
}
