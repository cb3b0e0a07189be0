// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeObject encoding.
//!
//! Layout: equivalence-kind octet, TypeKind octet, then the body fields in
//! declaration order. Member lists are length-prefixed sequences.

use super::{Cdr2Decode, Cdr2Encode, CdrError, CdrReader, CdrWriter};
use crate::xtypes::type_id::{EK_COMPLETE, EK_MINIMAL};
use crate::xtypes::type_object::*;
use crate::xtypes::{MemberFlag, NameHash, TypeFlag, TypeIdentifier, TypeKind};

// ============================================================================
// Details
// ============================================================================

impl Cdr2Encode for MinimalTypeDetail {
    fn encode_cdr2(&self, _w: &mut CdrWriter) {}
}

impl Cdr2Decode for MinimalTypeDetail {
    fn decode_cdr2(_r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(MinimalTypeDetail)
    }
}

impl Cdr2Encode for CompleteTypeDetail {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_string(&self.type_name);
        self.ann_custom.encode_cdr2(w);
    }
}

impl Cdr2Decode for CompleteTypeDetail {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(CompleteTypeDetail {
            type_name: r.read_string()?,
            ann_custom: Vec::decode_cdr2(r)?,
        })
    }
}

impl Cdr2Encode for MinimalMemberDetail {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        self.name_hash.encode_cdr2(w);
    }
}

impl Cdr2Decode for MinimalMemberDetail {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(MinimalMemberDetail {
            name_hash: NameHash::decode_cdr2(r)?,
        })
    }
}

fn encode_optional_string(w: &mut CdrWriter, value: &Option<String>) {
    w.write_bool(value.is_some());
    if let Some(value) = value {
        w.write_string(value);
    }
}

fn decode_optional_string(r: &mut CdrReader<'_>) -> Result<Option<String>, CdrError> {
    if r.read_bool()? {
        Ok(Some(r.read_string()?))
    } else {
        Ok(None)
    }
}

impl Cdr2Encode for CompleteMemberDetail {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_string(&self.name);
        encode_optional_string(w, &self.ann_builtin.unit);
        encode_optional_string(w, &self.ann_builtin.hash_id);
        self.ann_custom.encode_cdr2(w);
    }
}

impl Cdr2Decode for CompleteMemberDetail {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let name = r.read_string()?;
        let unit = decode_optional_string(r)?;
        let hash_id = decode_optional_string(r)?;
        Ok(CompleteMemberDetail {
            name,
            ann_builtin: AppliedBuiltinMemberAnnotations { unit, hash_id },
            ann_custom: Vec::decode_cdr2(r)?,
        })
    }
}

impl Cdr2Encode for AppliedAnnotation {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        self.annotation_typeid.encode_cdr2(w);
        self.param_seq.encode_cdr2(w);
    }
}

impl Cdr2Decode for AppliedAnnotation {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(AppliedAnnotation {
            annotation_typeid: TypeIdentifier::decode_cdr2(r)?,
            param_seq: Vec::decode_cdr2(r)?,
        })
    }
}

impl Cdr2Encode for AppliedAnnotationParameter {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        self.paramname_hash.encode_cdr2(w);
        self.value.encode_cdr2(w);
    }
}

impl Cdr2Decode for AppliedAnnotationParameter {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(AppliedAnnotationParameter {
            paramname_hash: NameHash::decode_cdr2(r)?,
            value: AnnotationParameterValue::decode_cdr2(r)?,
        })
    }
}

impl Cdr2Encode for AnnotationParameterValue {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        match self {
            AnnotationParameterValue::Boolean(v) => {
                w.write_u8(TypeKind::TK_BOOLEAN.to_u8());
                w.write_bool(*v);
            }
            AnnotationParameterValue::Byte(v) => {
                w.write_u8(TypeKind::TK_BYTE.to_u8());
                w.write_u8(*v);
            }
            AnnotationParameterValue::Int16(v) => {
                w.write_u8(TypeKind::TK_INT16.to_u8());
                w.write_i16(*v);
            }
            AnnotationParameterValue::UInt16(v) => {
                w.write_u8(TypeKind::TK_UINT16.to_u8());
                w.write_u16(*v);
            }
            AnnotationParameterValue::Int32(v) => {
                w.write_u8(TypeKind::TK_INT32.to_u8());
                w.write_i32(*v);
            }
            AnnotationParameterValue::UInt32(v) => {
                w.write_u8(TypeKind::TK_UINT32.to_u8());
                w.write_u32(*v);
            }
            AnnotationParameterValue::Int64(v) => {
                w.write_u8(TypeKind::TK_INT64.to_u8());
                w.write_i64(*v);
            }
            AnnotationParameterValue::UInt64(v) => {
                w.write_u8(TypeKind::TK_UINT64.to_u8());
                w.write_u64(*v);
            }
            AnnotationParameterValue::Char8(v) => {
                w.write_u8(TypeKind::TK_CHAR8.to_u8());
                w.write_u8(*v);
            }
            AnnotationParameterValue::Enumerated(v) => {
                w.write_u8(TypeKind::TK_ENUM.to_u8());
                w.write_i32(*v);
            }
            AnnotationParameterValue::String8(v) => {
                w.write_u8(TypeKind::TK_STRING8.to_u8());
                w.write_string(v);
            }
        }
    }
}

impl Cdr2Decode for AnnotationParameterValue {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let kind = TypeKind::decode_cdr2(r)?;
        let value = match kind {
            TypeKind::TK_BOOLEAN => AnnotationParameterValue::Boolean(r.read_bool()?),
            TypeKind::TK_BYTE => AnnotationParameterValue::Byte(r.read_u8()?),
            TypeKind::TK_INT16 => AnnotationParameterValue::Int16(r.read_i16()?),
            TypeKind::TK_UINT16 => AnnotationParameterValue::UInt16(r.read_u16()?),
            TypeKind::TK_INT32 => AnnotationParameterValue::Int32(r.read_i32()?),
            TypeKind::TK_UINT32 => AnnotationParameterValue::UInt32(r.read_u32()?),
            TypeKind::TK_INT64 => AnnotationParameterValue::Int64(r.read_i64()?),
            TypeKind::TK_UINT64 => AnnotationParameterValue::UInt64(r.read_u64()?),
            TypeKind::TK_CHAR8 => AnnotationParameterValue::Char8(r.read_u8()?),
            TypeKind::TK_ENUM => AnnotationParameterValue::Enumerated(r.read_i32()?),
            TypeKind::TK_STRING8 => AnnotationParameterValue::String8(r.read_string()?),
            _ => return Err(CdrError::Unsupported("annotation parameter kind")),
        };
        Ok(value)
    }
}

// ============================================================================
// Members
// ============================================================================

impl<R: Representation> Cdr2Encode for StructMember<R> {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u32(self.member_id);
        self.member_flags.encode_cdr2(w);
        self.member_type_id.encode_cdr2(w);
        self.detail.encode_cdr2(w);
    }
}

impl<R: Representation> Cdr2Decode for StructMember<R> {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(StructMember {
            member_id: r.read_u32()?,
            member_flags: MemberFlag::decode_cdr2(r)?,
            member_type_id: TypeIdentifier::decode_cdr2(r)?,
            detail: R::MemberDetail::decode_cdr2(r)?,
        })
    }
}

impl<R: Representation> Cdr2Encode for UnionMember<R> {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u32(self.member_id);
        self.member_flags.encode_cdr2(w);
        self.type_id.encode_cdr2(w);
        self.label_seq.encode_cdr2(w);
        self.detail.encode_cdr2(w);
    }
}

impl<R: Representation> Cdr2Decode for UnionMember<R> {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(UnionMember {
            member_id: r.read_u32()?,
            member_flags: MemberFlag::decode_cdr2(r)?,
            type_id: TypeIdentifier::decode_cdr2(r)?,
            label_seq: Vec::decode_cdr2(r)?,
            detail: R::MemberDetail::decode_cdr2(r)?,
        })
    }
}

impl<R: Representation> Cdr2Encode for EnumeratedLiteral<R> {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_i32(self.value);
        self.flags.encode_cdr2(w);
        self.detail.encode_cdr2(w);
    }
}

impl<R: Representation> Cdr2Decode for EnumeratedLiteral<R> {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(EnumeratedLiteral {
            value: r.read_i32()?,
            flags: MemberFlag::decode_cdr2(r)?,
            detail: R::MemberDetail::decode_cdr2(r)?,
        })
    }
}

impl<R: Representation> Cdr2Encode for BitFlag<R> {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u16(self.position);
        self.flags.encode_cdr2(w);
        self.detail.encode_cdr2(w);
    }
}

impl<R: Representation> Cdr2Decode for BitFlag<R> {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(BitFlag {
            position: r.read_u16()?,
            flags: MemberFlag::decode_cdr2(r)?,
            detail: R::MemberDetail::decode_cdr2(r)?,
        })
    }
}

impl<R: Representation> Cdr2Encode for BitField<R> {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        w.write_u16(self.position);
        self.flags.encode_cdr2(w);
        w.write_u8(self.bitcount);
        self.holder_type.encode_cdr2(w);
        self.detail.encode_cdr2(w);
    }
}

impl<R: Representation> Cdr2Decode for BitField<R> {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(BitField {
            position: r.read_u16()?,
            flags: MemberFlag::decode_cdr2(r)?,
            bitcount: r.read_u8()?,
            holder_type: TypeKind::decode_cdr2(r)?,
            detail: R::MemberDetail::decode_cdr2(r)?,
        })
    }
}

impl Cdr2Encode for CollectionElement {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        self.element_flags.encode_cdr2(w);
        self.type_id.encode_cdr2(w);
    }
}

impl Cdr2Decode for CollectionElement {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        Ok(CollectionElement {
            element_flags: MemberFlag::decode_cdr2(r)?,
            type_id: TypeIdentifier::decode_cdr2(r)?,
        })
    }
}

// ============================================================================
// Bodies
// ============================================================================

impl<R: Representation> Cdr2Encode for TypeBody<R> {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        self.type_kind().encode_cdr2(w);
        self.flags().encode_cdr2(w);
        match self {
            TypeBody::Alias(t) => {
                t.detail.encode_cdr2(w);
                t.related_flags.encode_cdr2(w);
                t.related_type.encode_cdr2(w);
            }
            TypeBody::Struct(t) => {
                t.base_type
                    .as_ref()
                    .unwrap_or(&TypeIdentifier::NONE)
                    .encode_cdr2(w);
                t.detail.encode_cdr2(w);
                t.member_seq.encode_cdr2(w);
            }
            TypeBody::Union(t) => {
                t.detail.encode_cdr2(w);
                t.discriminator.member_flags.encode_cdr2(w);
                t.discriminator.type_id.encode_cdr2(w);
                t.member_seq.encode_cdr2(w);
            }
            TypeBody::Bitset(t) => {
                t.detail.encode_cdr2(w);
                t.field_seq.encode_cdr2(w);
            }
            TypeBody::Sequence(t) => {
                t.detail.encode_cdr2(w);
                w.write_u32(t.bound);
                t.element.encode_cdr2(w);
            }
            TypeBody::Array(t) => {
                t.detail.encode_cdr2(w);
                t.bound_seq.encode_cdr2(w);
                t.element.encode_cdr2(w);
            }
            TypeBody::Map(t) => {
                t.detail.encode_cdr2(w);
                w.write_u32(t.bound);
                t.key.encode_cdr2(w);
                t.element.encode_cdr2(w);
            }
            TypeBody::Enumerated(t) => {
                w.write_u16(t.bit_bound);
                t.detail.encode_cdr2(w);
                t.literal_seq.encode_cdr2(w);
            }
            TypeBody::Bitmask(t) => {
                w.write_u16(t.bit_bound);
                t.detail.encode_cdr2(w);
                t.flag_seq.encode_cdr2(w);
            }
        }
    }
}

impl<R: Representation> Cdr2Decode for TypeBody<R> {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        let kind = TypeKind::decode_cdr2(r)?;
        if kind == TypeKind::TK_ANNOTATION {
            return Err(CdrError::Unsupported("annotation type"));
        }
        let flags = TypeFlag::decode_cdr2(r)?;
        let body = match kind {
            TypeKind::TK_ALIAS => TypeBody::Alias(AliasType {
                alias_flags: flags,
                detail: R::TypeDetail::decode_cdr2(r)?,
                related_flags: MemberFlag::decode_cdr2(r)?,
                related_type: TypeIdentifier::decode_cdr2(r)?,
            }),
            TypeKind::TK_STRUCTURE => {
                let base = TypeIdentifier::decode_cdr2(r)?;
                TypeBody::Struct(StructType {
                    struct_flags: flags,
                    base_type: (!base.is_none()).then_some(base),
                    detail: R::TypeDetail::decode_cdr2(r)?,
                    member_seq: Vec::decode_cdr2(r)?,
                })
            }
            TypeKind::TK_UNION => TypeBody::Union(UnionType {
                union_flags: flags,
                detail: R::TypeDetail::decode_cdr2(r)?,
                discriminator: UnionDiscriminator {
                    member_flags: MemberFlag::decode_cdr2(r)?,
                    type_id: TypeIdentifier::decode_cdr2(r)?,
                },
                member_seq: Vec::decode_cdr2(r)?,
            }),
            TypeKind::TK_BITSET => TypeBody::Bitset(BitsetType {
                bitset_flags: flags,
                detail: R::TypeDetail::decode_cdr2(r)?,
                field_seq: Vec::decode_cdr2(r)?,
            }),
            TypeKind::TK_SEQUENCE => TypeBody::Sequence(SequenceType {
                collection_flag: flags,
                detail: R::TypeDetail::decode_cdr2(r)?,
                bound: r.read_u32()?,
                element: CollectionElement::decode_cdr2(r)?,
            }),
            TypeKind::TK_ARRAY => TypeBody::Array(ArrayType {
                collection_flag: flags,
                detail: R::TypeDetail::decode_cdr2(r)?,
                bound_seq: Vec::decode_cdr2(r)?,
                element: CollectionElement::decode_cdr2(r)?,
            }),
            TypeKind::TK_MAP => TypeBody::Map(MapType {
                collection_flag: flags,
                detail: R::TypeDetail::decode_cdr2(r)?,
                bound: r.read_u32()?,
                key: CollectionElement::decode_cdr2(r)?,
                element: CollectionElement::decode_cdr2(r)?,
            }),
            TypeKind::TK_ENUM => TypeBody::Enumerated(EnumeratedType {
                enum_flags: flags,
                bit_bound: r.read_u16()?,
                detail: R::TypeDetail::decode_cdr2(r)?,
                literal_seq: Vec::decode_cdr2(r)?,
            }),
            TypeKind::TK_BITMASK => TypeBody::Bitmask(BitmaskType {
                bitmask_flags: flags,
                bit_bound: r.read_u16()?,
                detail: R::TypeDetail::decode_cdr2(r)?,
                flag_seq: Vec::decode_cdr2(r)?,
            }),
            other => {
                return Err(CdrError::InvalidDiscriminator {
                    what: "TypeObject kind",
                    value: u32::from(other.to_u8()),
                })
            }
        };
        Ok(body)
    }
}

impl Cdr2Encode for TypeObject {
    fn encode_cdr2(&self, w: &mut CdrWriter) {
        match self {
            TypeObject::Minimal(body) => {
                w.write_u8(EK_MINIMAL);
                body.encode_cdr2(w);
            }
            TypeObject::Complete(body) => {
                w.write_u8(EK_COMPLETE);
                body.encode_cdr2(w);
            }
        }
    }
}

impl Cdr2Decode for TypeObject {
    fn decode_cdr2(r: &mut CdrReader<'_>) -> Result<Self, CdrError> {
        match r.read_u8()? {
            EK_MINIMAL => Ok(TypeObject::Minimal(TypeBody::decode_cdr2(r)?)),
            EK_COMPLETE => Ok(TypeObject::Complete(TypeBody::decode_cdr2(r)?)),
            other => Err(CdrError::InvalidDiscriminator {
                what: "TypeObject",
                value: u32::from(other),
            }),
        }
    }
}
