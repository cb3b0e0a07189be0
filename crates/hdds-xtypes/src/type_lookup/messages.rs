// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeLookup request and reply samples.
//!
//! Wire layout (after the 4-byte encapsulation header, XCDR2 LE):
//!
//! ```text
//! Request: writer_id[16] seq_no:u64 ids:sequence<TypeIdentifier>
//! Reply:   writer_id[16] seq_no:u64 types:sequence<(TypeIdentifier, TypeObject)>
//! ```
//!
//! A reply carries the `writer_id` and `seq_no` of the request it answers.

use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::xtypes::cdr2::{Cdr2Decode, Cdr2Encode, CdrReader, CdrWriter};
use crate::xtypes::{TypeIdentifier, TypeObject};

/// CDR2 little-endian encapsulation identifier.
pub const CDR2_LE: [u8; 4] = [0x00, 0x07, 0x00, 0x00];

/// Ask a remote participant for the objects of `type_ids`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLookupRequest {
    /// Requesting TypeLookup writer.
    pub writer_id: Guid,
    pub seq_no: u64,
    pub type_ids: Vec<TypeIdentifier>,
}

/// Objects answering one request. Identifiers the replier could not
/// resolve are left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLookupReply {
    /// Writer of the request being answered.
    pub writer_id: Guid,
    pub seq_no: u64,
    pub types: Vec<(TypeIdentifier, TypeObject)>,
}

impl TypeLookupRequest {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        write_header(&mut w, &self.writer_id, self.seq_no);
        self.type_ids.encode_cdr2(&mut w);
        encapsulate(w)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = CdrReader::new(strip_encapsulation(bytes)?);
        let (writer_id, seq_no) = read_header(&mut r)?;
        let type_ids = Vec::<TypeIdentifier>::decode_cdr2(&mut r)?;
        Ok(Self {
            writer_id,
            seq_no,
            type_ids,
        })
    }
}

impl TypeLookupReply {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = CdrWriter::new();
        write_header(&mut w, &self.writer_id, self.seq_no);
        w.write_seq_len(self.types.len());
        for (id, obj) in &self.types {
            id.encode_cdr2(&mut w);
            obj.encode_cdr2(&mut w);
        }
        encapsulate(w)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = CdrReader::new(strip_encapsulation(bytes)?);
        let (writer_id, seq_no) = read_header(&mut r)?;
        let len = r.read_seq_len()?;
        let mut types = Vec::with_capacity(len.min(64));
        for _ in 0..len {
            let id = TypeIdentifier::decode_cdr2(&mut r)?;
            let obj = TypeObject::decode_cdr2(&mut r)?;
            types.push((id, obj));
        }
        Ok(Self {
            writer_id,
            seq_no,
            types,
        })
    }
}

fn write_header(w: &mut CdrWriter, writer_id: &Guid, seq_no: u64) {
    w.write_bytes(&writer_id.as_bytes());
    w.write_u64(seq_no);
}

fn read_header(r: &mut CdrReader<'_>) -> Result<(Guid, u64)> {
    let mut guid = [0u8; 16];
    guid.copy_from_slice(r.read_bytes(16)?);
    let seq_no = r.read_u64()?;
    Ok((Guid::from_bytes(guid), seq_no))
}

fn encapsulate(w: CdrWriter) -> Vec<u8> {
    let body = w.into_bytes();
    let mut out = Vec::with_capacity(CDR2_LE.len() + body.len());
    out.extend_from_slice(&CDR2_LE);
    out.extend_from_slice(&body);
    out
}

fn strip_encapsulation(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < CDR2_LE.len() {
        return Err(Error::BadParameter("TypeLookup sample too short".into()));
    }
    let (header, body) = bytes.split_at(CDR2_LE.len());
    if header[..2] != CDR2_LE[..2] {
        return Err(Error::BadParameter(format!(
            "unsupported encapsulation {:02x}{:02x}",
            header[0], header[1]
        )));
    }
    Ok(body)
}
