//! # Traits
//!
//! The storage layer keeps numeric payloads in typed buffers. [`Payload`] is implemented
//! for the two numeric types a mesh file stores (`f64` for coordinates, times and
//! variable values, `i64` for ids, connectivity and maps) and tells the store how to
//! reach the right buffer and how to encode a value for either on-disk encoding.
//!
//! Both encodings are lossless: binary words are the raw little endian bytes, and the
//! ascii form of a float is the shortest representation that parses back to the same
//! bits.

use crate::dataset::{ValueType, VarData};
use crate::utils;

pub trait Payload: Copy + PartialEq + std::fmt::Debug + num_traits::Zero {
    /// the tag written to the `type` attribute of a variable
    const VALUE_TYPE: ValueType;

    /// borrow the buffer of this type, if `data` holds one
    fn buffer(data: &VarData) -> Option<&Vec<Self>>;

    fn buffer_mut(data: &mut VarData) -> Option<&mut Vec<Self>>;

    /// wrap a buffer of this type into the untyped storage
    fn wrap(values: Vec<Self>) -> VarData;

    /// append the little endian bytes of `self`
    fn write_le(&self, bytes: &mut Vec<u8>);

    /// decode one 8 byte little endian word
    fn read_le(word: &[u8]) -> Self;

    /// append the ascii representation of `self`
    fn write_ascii(&self, out: &mut String);

    fn parse_ascii(text: &str) -> Option<Self>;
}

impl Payload for f64 {
    const VALUE_TYPE: ValueType = ValueType::Float64;

    fn buffer(data: &VarData) -> Option<&Vec<Self>> {
        match data {
            VarData::Float64(values) => Some(values),
            _ => None,
        }
    }

    fn buffer_mut(data: &mut VarData) -> Option<&mut Vec<Self>> {
        match data {
            VarData::Float64(values) => Some(values),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> VarData {
        VarData::Float64(values)
    }

    fn write_le(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(word: &[u8]) -> Self {
        utils::bytes_to_float(word)
    }

    fn write_ascii(&self, out: &mut String) {
        let mut buffer = ryu::Buffer::new();
        out.push_str(buffer.format(*self));
    }

    fn parse_ascii(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl Payload for i64 {
    const VALUE_TYPE: ValueType = ValueType::Int64;

    fn buffer(data: &VarData) -> Option<&Vec<Self>> {
        match data {
            VarData::Int64(values) => Some(values),
            _ => None,
        }
    }

    fn buffer_mut(data: &mut VarData) -> Option<&mut Vec<Self>> {
        match data {
            VarData::Int64(values) => Some(values),
            _ => None,
        }
    }

    fn wrap(values: Vec<Self>) -> VarData {
        VarData::Int64(values)
    }

    fn write_le(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.to_le_bytes());
    }

    fn read_le(word: &[u8]) -> Self {
        utils::bytes_to_int(word)
    }

    fn write_ascii(&self, out: &mut String) {
        out.push_str(&self.to_string());
    }

    fn parse_ascii(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}
