// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeIdentifier encoding: octet discriminator followed by the payload.

use super::{Cdr2Decode, Cdr2Encode, CdrError, CdrReader, CdrWriter};
use crate::xtypes::type_id::*;
use crate::xtypes::{EquivalenceHash, MemberFlag, NameHash, TypeFlag, TypeKind};

impl Cdr2Encode for EquivalenceHash {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_bytes(self.as_bytes());
    }
}

impl Cdr2Decode for EquivalenceHash {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let mut bytes = [0u8; 14];
        bytes.copy_from_slice(r.read_bytes(14)?);
        Ok(EquivalenceHash::from_bytes(bytes))
    }
}

impl Cdr2Encode for NameHash {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_bytes(&self.0);
    }
}

impl Cdr2Decode for NameHash {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(r.read_bytes(4)?);
        Ok(NameHash(bytes))
    }
}

impl Cdr2Encode for MemberFlag {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u16(self.0);
    }
}

impl Cdr2Decode for MemberFlag {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(MemberFlag(r.read_u16()?))
    }
}

impl Cdr2Encode for TypeFlag {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u16(self.0);
    }
}

impl Cdr2Decode for TypeFlag {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(TypeFlag(r.read_u16()?))
    }
}

impl Cdr2Encode for TypeKind {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u8(self.to_u8());
    }
}

impl Cdr2Decode for TypeKind {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let value = r.read_u8()?;
        TypeKind::from_u8(value).ok_or(CdrError::InvalidDiscriminator {
            what: "TypeKind",
            value: u32::from(value),
        })
    }
}

fn decode_equiv_kind(r: &mut CdrReader<'_>) -> Result<EquivalenceKind, CdrError> {
    let value = r.read_u8()?;
    EquivalenceKind::from_u8(value).ok_or(CdrError::InvalidDiscriminator {
        what: "EquivalenceKind",
        value: u32::from(value),
    })
}

impl Cdr2Encode for PlainCollectionHeader {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u8(self.equiv_kind.to_u8());
        self.element_flags.encode_cdr2(w);
    }
}

impl Cdr2Decode for PlainCollectionHeader {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(PlainCollectionHeader {
            equiv_kind: decode_equiv_kind(r)?,
            element_flags: MemberFlag::decode_cdr2(r)?,
        })
    }
}

impl Cdr2Encode for SccId {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u8(self.component.kind.to_u8());
        self.component.hash.encode_cdr2(w);
        w.write_i32(self.length);
        w.write_i32(self.index);
    }
}

impl Cdr2Decode for SccId {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let kind = decode_equiv_kind(r)?;
        if kind == EquivalenceKind::Both {
            return Err(CdrError::InvalidDiscriminator {
                what: "SCC hash kind",
                value: u32::from(EK_BOTH),
            });
        }
        let hash = EquivalenceHash::decode_cdr2(r)?;
        Ok(SccId {
            component: TypeObjectHashId { kind, hash },
            length: r.read_i32()?,
            index: r.read_i32()?,
        })
    }
}

impl Cdr2Encode for TypeIdentifier {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u8(self.discriminator());
        match self {
            TypeIdentifier::Primitive(_) => {}
            TypeIdentifier::String8Small { bound } | TypeIdentifier::String16Small { bound } => {
                w.write_u8(*bound);
            }
            TypeIdentifier::String8Large { bound } | TypeIdentifier::String16Large { bound } => {
                w.write_u32(*bound);
            }
            TypeIdentifier::PlainSequence(seq) => {
                seq.header.encode_cdr2(w);
                encode_bound(w, seq.bound);
                seq.element.encode_cdr2(w);
            }
            TypeIdentifier::PlainArray(arr) => {
                arr.header.encode_cdr2(w);
                match &arr.bounds {
                    ArrayBounds::Small(dims) => {
                        w.write_seq_len(dims.len());
                        w.write_bytes(dims);
                    }
                    ArrayBounds::Large(dims) => dims.encode_cdr2(w),
                }
                arr.element.encode_cdr2(w);
            }
            TypeIdentifier::PlainMap(map) => {
                map.header.encode_cdr2(w);
                encode_bound(w, map.bound);
                map.element.encode_cdr2(w);
                map.key_flags.encode_cdr2(w);
                map.key.encode_cdr2(w);
            }
            TypeIdentifier::StronglyConnected(scc) => scc.encode_cdr2(w),
            TypeIdentifier::Minimal(hash) | TypeIdentifier::Complete(hash) => {
                hash.encode_cdr2(w);
            }
        }
    }
}

fn encode_bound(w: &mut CdrWriter, bound: CollectionBound) {
    match bound {
        CollectionBound::Small(b) => w.write_u8(b),
        CollectionBound::Large(b) => w.write_u32(b),
    }
}

impl Cdr2Decode for TypeIdentifier {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let disc = r.read_u8()?;
        let id = match disc {
            TI_STRING8_SMALL => TypeIdentifier::String8Small {
                bound: r.read_u8()?,
            },
            TI_STRING8_LARGE => TypeIdentifier::String8Large {
                bound: r.read_u32()?,
            },
            TI_STRING16_SMALL => TypeIdentifier::String16Small {
                bound: r.read_u8()?,
            },
            TI_STRING16_LARGE => TypeIdentifier::String16Large {
                bound: r.read_u32()?,
            },
            TI_PLAIN_SEQUENCE_SMALL | TI_PLAIN_SEQUENCE_LARGE => {
                let header = PlainCollectionHeader::decode_cdr2(r)?;
                let bound = if disc == TI_PLAIN_SEQUENCE_SMALL {
                    CollectionBound::Small(r.read_u8()?)
                } else {
                    CollectionBound::Large(r.read_u32()?)
                };
                TypeIdentifier::PlainSequence(PlainSequence {
                    header,
                    bound,
                    element: Box::new(r.nested(TypeIdentifier::decode_cdr2)?),
                })
            }
            TI_PLAIN_ARRAY_SMALL | TI_PLAIN_ARRAY_LARGE => {
                let header = PlainCollectionHeader::decode_cdr2(r)?;
                let bounds = if disc == TI_PLAIN_ARRAY_SMALL {
                    let len = r.read_seq_len()?;
                    ArrayBounds::Small(r.read_bytes(len)?.to_vec())
                } else {
                    ArrayBounds::Large(Vec::<u32>::decode_cdr2(r)?)
                };
                TypeIdentifier::PlainArray(PlainArray {
                    header,
                    bounds,
                    element: Box::new(r.nested(TypeIdentifier::decode_cdr2)?),
                })
            }
            TI_PLAIN_MAP_SMALL | TI_PLAIN_MAP_LARGE => {
                let header = PlainCollectionHeader::decode_cdr2(r)?;
                let bound = if disc == TI_PLAIN_MAP_SMALL {
                    CollectionBound::Small(r.read_u8()?)
                } else {
                    CollectionBound::Large(r.read_u32()?)
                };
                let element = Box::new(r.nested(TypeIdentifier::decode_cdr2)?);
                let key_flags = MemberFlag::decode_cdr2(r)?;
                let key = Box::new(r.nested(TypeIdentifier::decode_cdr2)?);
                TypeIdentifier::PlainMap(PlainMap {
                    header,
                    bound,
                    element,
                    key_flags,
                    key,
                })
            }
            TI_STRONGLY_CONNECTED_COMPONENT => {
                TypeIdentifier::StronglyConnected(SccId::decode_cdr2(r)?)
            }
            EK_MINIMAL => TypeIdentifier::Minimal(EquivalenceHash::decode_cdr2(r)?),
            EK_COMPLETE => TypeIdentifier::Complete(EquivalenceHash::decode_cdr2(r)?),
            other => match TypeKind::from_u8(other) {
                Some(kind) if kind.is_primitive() || kind == TypeKind::TK_NONE => {
                    TypeIdentifier::Primitive(kind)
                }
                _ => {
                    return Err(CdrError::InvalidDiscriminator {
                        what: "TypeIdentifier",
                        value: u32::from(other),
                    })
                }
            },
        };
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{from_cdr2_bytes, to_cdr2_bytes, MAX_NESTING_DEPTH};
    use super::*;

    fn roundtrip(id: &TypeIdentifier) -> Vec<u8> {
        let bytes = to_cdr2_bytes(id);
        let decoded: TypeIdentifier = from_cdr2_bytes(&bytes).expect("decode");
        assert_eq!(&decoded, id);
        assert_eq!(to_cdr2_bytes(&decoded), bytes);
        bytes
    }

    #[test]
    fn test_primitive_is_single_octet() {
        let bytes = roundtrip(&TypeIdentifier::Primitive(TypeKind::TK_INT32));
        assert_eq!(bytes, vec![0x04]);
    }

    #[test]
    fn test_hash_layout() {
        let id = TypeIdentifier::Minimal(EquivalenceHash::from_bytes([7; 14]));
        let bytes = roundtrip(&id);
        assert_eq!(bytes.len(), 15);
        assert_eq!(bytes[0], EK_MINIMAL);
    }

    #[test]
    fn test_nested_plain_collections() {
        let inner = TypeIdentifier::sequence(TypeIdentifier::string8(300), 5);
        let outer = TypeIdentifier::array(inner, &[2, 1000]);
        roundtrip(&outer);
        let map = TypeIdentifier::map(
            TypeIdentifier::Primitive(TypeKind::TK_UINT16),
            TypeIdentifier::Complete(EquivalenceHash::from_bytes([1; 14])),
            512,
        );
        roundtrip(&map);
    }

    #[test]
    fn test_scc_roundtrip() {
        let id = TypeIdentifier::StronglyConnected(SccId {
            component: TypeObjectHashId {
                kind: EquivalenceKind::Complete,
                hash: EquivalenceHash::from_bytes([9; 14]),
            },
            length: 3,
            index: 2,
        });
        roundtrip(&id);
    }

    #[test]
    fn test_unknown_discriminator_rejected() {
        let err = from_cdr2_bytes::<TypeIdentifier>(&[0x51]).unwrap_err();
        assert_eq!(
            err,
            CdrError::InvalidDiscriminator {
                what: "TypeIdentifier",
                value: 0x51
            }
        );
    }

    #[test]
    fn test_truncated_hash_rejected() {
        let err = from_cdr2_bytes::<TypeIdentifier>(&[EK_COMPLETE, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, CdrError::UnexpectedEof { .. }));
    }

    fn nested_sequences(levels: usize) -> TypeIdentifier {
        (0..levels).fold(TypeIdentifier::Primitive(TypeKind::TK_INT32), |id, _| {
            TypeIdentifier::sequence(id, 4)
        })
    }

    #[test]
    fn test_nesting_limit() {
        roundtrip(&nested_sequences(MAX_NESTING_DEPTH));
        let bytes = to_cdr2_bytes(&nested_sequences(MAX_NESTING_DEPTH + 1));
        assert!(matches!(
            from_cdr2_bytes::<TypeIdentifier>(&bytes),
            Err(CdrError::NestingTooDeep { .. })
        ));
    }
}
