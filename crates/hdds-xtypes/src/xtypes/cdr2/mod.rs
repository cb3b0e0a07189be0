// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CDR2 (XCDR2, little-endian) encoding of identifiers and type objects.
//!
//! - [`cursor`] - `CdrWriter` / `CdrReader` with XCDR2 alignment (max 4)
//! - [`type_identifier`] - TypeIdentifier and its payloads
//! - [`type_object`] - TypeObject bodies and details
//! - [`type_information`] - TypeInformation / TypeMapping
//!
//! Encoding always writes into a growable buffer and cannot fail; decoding
//! is bounds-checked and reports the failing offset.
//!
//! ```ignore
//! use hdds_xtypes::xtypes::cdr2::{from_cdr2_bytes, to_cdr2_bytes};
//!
//! let bytes = to_cdr2_bytes(&type_object);
//! let decoded: TypeObject = from_cdr2_bytes(&bytes)?;
//! ```

pub mod cursor;
mod type_identifier;
mod type_information;
mod type_object;

pub use cursor::{CdrReader, CdrWriter};

use std::fmt;

/// Upper bound on any decoded sequence or string length.
pub const MAX_SEQUENCE_LENGTH: usize = 1 << 20;

/// Upper bound on nested collection identifiers in one decode.
pub const MAX_NESTING_DEPTH: usize = 64;

/// Codec-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdrError {
    /// Input ended before the value was complete.
    UnexpectedEof { offset: usize },
    /// Union discriminator or enum octet not known.
    InvalidDiscriminator { what: &'static str, value: u32 },
    /// Declared length larger than allowed or than the remaining input.
    SequenceTooLong { len: usize },
    /// String without terminating NUL or not valid UTF-8.
    InvalidUtf8 { offset: usize },
    /// Legal encoding this codec does not handle.
    Unsupported(&'static str),
    /// Collection identifiers nested past `MAX_NESTING_DEPTH`.
    NestingTooDeep { offset: usize },
}

impl fmt::Display for CdrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdrError::UnexpectedEof { offset } => {
                write!(f, "unexpected end of buffer at offset {}", offset)
            }
            CdrError::InvalidDiscriminator { what, value } => {
                write!(f, "invalid {} discriminator 0x{:02x}", what, value)
            }
            CdrError::SequenceTooLong { len } => write!(f, "sequence length {} too long", len),
            CdrError::InvalidUtf8 { offset } => write!(f, "invalid string at offset {}", offset),
            CdrError::Unsupported(what) => write!(f, "unsupported {}", what),
            CdrError::NestingTooDeep { offset } => {
                write!(f, "identifier nesting too deep at offset {}", offset)
            }
        }
    }
}

impl std::error::Error for CdrError {}

/// CDR2 encoding contract.
pub trait Cdr2Encode {
    fn encode_cdr2(&self, w: &mut CdrWriter);
}

/// CDR2 decoding contract.
pub trait Cdr2Decode: Sized {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError>;
}

/// Encode a value into a fresh buffer.
pub fn to_cdr2_bytes<T: Cdr2Encode + ?Sized>(value: &T) -> Vec<u8> {
    let mut w = CdrWriter::new();
    value.encode_cdr2(&mut w);
    w.into_bytes()
}

/// Decode a value from the start of `bytes`. Trailing padding is ignored.
pub fn from_cdr2_bytes<T: Cdr2Decode>(bytes: &[u8]) -> Result<T, CdrError> {
    let mut r = CdrReader::new(bytes);
    T::decode_cdr2(&mut r)
}

impl<T: Cdr2Encode> Cdr2Encode for Vec<T> {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_seq_len(self.len());
        for item in self {
            item.encode_cdr2(w);
        }
    }
}

impl<T: Cdr2Decode> Cdr2Decode for Vec<T> {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let len = r.read_seq_len()?;
        let mut items = Vec::with_capacity(len.min(64));
        for _ in 0..len {
            items.push(T::decode_cdr2(r)?);
        }
        Ok(items)
    }
}

impl Cdr2Encode for String {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_string(self);
    }
}

impl Cdr2Decode for String {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        r.read_string()
    }
}

impl Cdr2Encode for u32 {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u32(*self);
    }
}

impl Cdr2Decode for u32 {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        r.read_u32()
    }
}

impl Cdr2Encode for i32 {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_i32(*self);
    }
}

impl Cdr2Decode for i32 {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        r.read_i32()
    }
}
