// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Write/read cursors for XCDR2 little-endian buffers.
//!
//! Alignment is relative to the start of the buffer and capped at 4 bytes,
//! so 64-bit values are 4-byte aligned as XCDR2 requires.

use super::{CdrError, MAX_NESTING_DEPTH, MAX_SEQUENCE_LENGTH};

const MAX_ALIGN: usize = 4;

/// Generate aligned little-endian write methods.
macro_rules! impl_write_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self, value: $type) {
            self.align($size);
            self.buffer.extend_from_slice(&value.to_le_bytes());
        }
    };
}

/// Generate aligned, bounds-checked little-endian read methods.
macro_rules! impl_read_le {
    ($name:ident, $type:ty, $size:expr) => {
        pub fn $name(&mut self) -> Result<$type, CdrError> {
            self.align($size)?;
            let mut bytes = [0u8; $size];
            bytes.copy_from_slice(self.read_bytes($size)?);
            Ok(<$type>::from_le_bytes(bytes))
        }
    };
}

/// Growable output cursor.
#[derive(Debug, Default)]
pub struct CdrWriter {
    buffer: Vec<u8>,
}

impl CdrWriter {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn offset(&self) -> usize {
        self.buffer.len()
    }

    /// Pad with zeros up to `alignment` (capped at 4).
    pub fn align(&mut self, alignment: usize) {
        let alignment = alignment.min(MAX_ALIGN);
        if alignment <= 1 {
            return;
        }
        let padded = (self.buffer.len() + alignment - 1) & !(alignment - 1);
        self.buffer.resize(padded, 0);
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.buffer.push(u8::from(value));
    }

    impl_write_le!(write_u16, u16, 2);
    impl_write_le!(write_i16, i16, 2);
    impl_write_le!(write_u32, u32, 4);
    impl_write_le!(write_i32, i32, 4);
    impl_write_le!(write_u64, u64, 8);
    impl_write_le!(write_i64, i64, 8);

    pub fn write_bytes(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Sequence length prefix.
    pub fn write_seq_len(&mut self, len: usize) {
        self.write_u32(len as u32);
    }

    /// String: u32 length including the NUL terminator, bytes, NUL.
    pub fn write_string(&mut self, value: &str) {
        self.write_seq_len(value.len() + 1);
        self.buffer.extend_from_slice(value.as_bytes());
        self.buffer.push(0);
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

/// Bounds-checked input cursor.
pub struct CdrReader<'a> {
    buffer: &'a [u8],
    offset: usize,
    depth: usize,
}

impl<'a> CdrReader<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self {
            buffer,
            offset: 0,
            depth: 0,
        }
    }

    /// Decode one nesting level deeper, failing past `MAX_NESTING_DEPTH`.
    pub fn nested<T>(
        &mut self,
        decode: impl FnOnce(&mut Self) -> Result<T, CdrError>,
    ) -> Result<T, CdrError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(CdrError::NestingTooDeep {
                offset: self.offset,
            });
        }
        self.depth += 1;
        let value = decode(self);
        self.depth -= 1;
        value
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    pub fn is_eof(&self) -> bool {
        self.offset >= self.buffer.len()
    }

    pub fn align(&mut self, alignment: usize) -> Result<(), CdrError> {
        let alignment = alignment.min(MAX_ALIGN);
        if alignment <= 1 {
            return Ok(());
        }
        let aligned = (self.offset + alignment - 1) & !(alignment - 1);
        if aligned > self.buffer.len() {
            return Err(CdrError::UnexpectedEof {
                offset: self.offset,
            });
        }
        self.offset = aligned;
        Ok(())
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], CdrError> {
        if len > self.remaining() {
            return Err(CdrError::UnexpectedEof {
                offset: self.offset,
            });
        }
        let slice = &self.buffer[self.offset..self.offset + len];
        self.offset += len;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, CdrError> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_bool(&mut self) -> Result<bool, CdrError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => Err(CdrError::InvalidDiscriminator {
                what: "boolean",
                value: u32::from(value),
            }),
        }
    }

    impl_read_le!(read_u16, u16, 2);
    impl_read_le!(read_i16, i16, 2);
    impl_read_le!(read_u32, u32, 4);
    impl_read_le!(read_i32, i32, 4);
    impl_read_le!(read_u64, u64, 8);
    impl_read_le!(read_i64, i64, 8);

    /// Sequence length, rejected when absurd for the remaining input.
    pub fn read_seq_len(&mut self) -> Result<usize, CdrError> {
        let len = self.read_u32()? as usize;
        if len > MAX_SEQUENCE_LENGTH || len > self.remaining() {
            return Err(CdrError::SequenceTooLong { len });
        }
        Ok(len)
    }

    pub fn read_string(&mut self) -> Result<String, CdrError> {
        let len = self.read_seq_len()?;
        let start = self.offset;
        let bytes = self.read_bytes(len)?;
        match bytes.split_last() {
            Some((0, text)) => std::str::from_utf8(text)
                .map(str::to_string)
                .map_err(|_| CdrError::InvalidUtf8 { offset: start }),
            _ => Err(CdrError::InvalidUtf8 { offset: start }),
        }
    }
}
