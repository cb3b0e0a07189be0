// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeInformation / TypeMapping encoding.

use super::{Cdr2Decode, Cdr2Encode, CdrError, CdrReader, CdrWriter};
use crate::xtypes::type_information::*;
use crate::xtypes::{TypeIdentifier, TypeObject};

impl Cdr2Encode for TypeIdentifierWithSize {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        self.type_id.encode_cdr2(w);
        w.write_u32(self.typeobject_serialized_size);
    }
}

impl Cdr2Decode for TypeIdentifierWithSize {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(TypeIdentifierWithSize {
            type_id: TypeIdentifier::decode_cdr2(r)?,
            typeobject_serialized_size: r.read_u32()?,
        })
    }
}

impl Cdr2Encode for TypeIdentifierWithDependencies {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        self.typeid_with_size.encode_cdr2(w);
        w.write_i32(self.dependent_typeid_count);
        self.dependent_typeids.encode_cdr2(w);
    }
}

impl Cdr2Decode for TypeIdentifierWithDependencies {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(TypeIdentifierWithDependencies {
            typeid_with_size: TypeIdentifierWithSize::decode_cdr2(r)?,
            dependent_typeid_count: r.read_i32()?,
            dependent_typeids: Vec::decode_cdr2(r)?,
        })
    }
}

impl Cdr2Encode for TypeInformation {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        self.minimal.encode_cdr2(w);
        self.complete.encode_cdr2(w);
    }
}

impl Cdr2Decode for TypeInformation {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(TypeInformation {
            minimal: TypeIdentifierWithDependencies::decode_cdr2(r)?,
            complete: TypeIdentifierWithDependencies::decode_cdr2(r)?,
        })
    }
}

fn encode_pairs(w: &mut CdrWriter, pairs: &[(TypeIdentifier, TypeObject)]) {
    w.write_seq_len(pairs.len());
    for (id, obj) in pairs {
        id.encode_cdr2(w);
        obj.encode_cdr2(w);
    }
}

fn decode_pairs(r: &mut CdrReader<'_>) -> Result<Vec<(TypeIdentifier, TypeObject)>, CdrError> {
    let len = r.read_seq_len()?;
    let mut pairs = Vec::with_capacity(len.min(64));
    for _ in 0..len {
        let id = TypeIdentifier::decode_cdr2(r)?;
        let obj = TypeObject::decode_cdr2(r)?;
        pairs.push((id, obj));
    }
    Ok(pairs)
}

impl Cdr2Encode for TypeMapping {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        encode_pairs(w, &self.identifier_object_pair_minimal);
        encode_pairs(w, &self.identifier_object_pair_complete);
        w.write_seq_len(self.identifier_complete_minimal.len());
        for (complete, minimal) in &self.identifier_complete_minimal {
            complete.encode_cdr2(w);
            minimal.encode_cdr2(w);
        }
    }
}

impl Cdr2Decode for TypeMapping {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let identifier_object_pair_minimal = decode_pairs(r)?;
        let identifier_object_pair_complete = decode_pairs(r)?;
        let len = r.read_seq_len()?;
        let mut identifier_complete_minimal = Vec::with_capacity(len.min(64));
        for _ in 0..len {
            let complete = TypeIdentifier::decode_cdr2(r)?;
            let minimal = TypeIdentifier::decode_cdr2(r)?;
            identifier_complete_minimal.push((complete, minimal));
        }
        Ok(TypeMapping {
            identifier_object_pair_minimal,
            identifier_object_pair_complete,
            identifier_complete_minimal,
        })
    }
}
