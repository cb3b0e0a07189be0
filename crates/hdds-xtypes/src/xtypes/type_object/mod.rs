// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeObject per OMG DDS-XTypes v1.3 (7.3.4.5).
//!
//! The MINIMAL and COMPLETE forms share one set of generic body types;
//! the [`Representation`] parameter decides what a type or member detail
//! carries (nothing / a name hash for MINIMAL, names and annotations for
//! COMPLETE).
//!
//! Ordering invariants: struct and union members keep declaration order,
//! enum literals are sorted by value and bitmask flags by position.

mod aggregates;
mod collections;
mod detail;
mod enums;

pub use aggregates::*;
pub use collections::*;
pub use detail::*;
pub use enums::*;

use super::cdr2::{self, Cdr2Decode, Cdr2Encode, CdrError};
use super::{EquivalenceHash, EquivalenceKind, TypeFlag, TypeIdentifier, TypeKind};
use std::fmt;

/// Selects what a detail carries in one of the two TypeObject forms.
pub trait Representation: fmt::Debug + Clone + Copy + PartialEq + Eq + 'static {
    const KIND: EquivalenceKind;

    type TypeDetail: fmt::Debug + Clone + PartialEq + Eq + TypeName + Cdr2Encode + Cdr2Decode;

    type MemberDetail: fmt::Debug
        + Clone
        + PartialEq
        + Eq
        + MemberName
        + Cdr2Encode
        + Cdr2Decode;

    /// Body of `obj` when it is in this form.
    fn body(obj: &TypeObject) -> Option<&TypeBody<Self>>;
}

/// MINIMAL form: name hashes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimalForm;

/// COMPLETE form: names and annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteForm;

impl Representation for MinimalForm {
    const KIND: EquivalenceKind = EquivalenceKind::Minimal;
    type TypeDetail = MinimalTypeDetail;
    type MemberDetail = MinimalMemberDetail;

    fn body(obj: &TypeObject) -> Option<&TypeBody<Self>> {
        match obj {
            TypeObject::Minimal(body) => Some(body),
            TypeObject::Complete(_) => None,
        }
    }
}

impl Representation for CompleteForm {
    const KIND: EquivalenceKind = EquivalenceKind::Complete;
    type TypeDetail = CompleteTypeDetail;
    type MemberDetail = CompleteMemberDetail;

    fn body(obj: &TypeObject) -> Option<&TypeBody<Self>> {
        match obj {
            TypeObject::Complete(body) => Some(body),
            TypeObject::Minimal(_) => None,
        }
    }
}

/// Body of a TypeObject, one variant per constructed kind.
///
/// Annotation types are not representable; decoding one yields
/// `CdrError::Unsupported`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeBody<R: Representation> {
    Alias(AliasType<R>),
    Struct(StructType<R>),
    Union(UnionType<R>),
    Bitset(BitsetType<R>),
    Sequence(SequenceType<R>),
    Array(ArrayType<R>),
    Map(MapType<R>),
    Enumerated(EnumeratedType<R>),
    Bitmask(BitmaskType<R>),
}

pub type MinimalTypeObject = TypeBody<MinimalForm>;
pub type CompleteTypeObject = TypeBody<CompleteForm>;

impl<R: Representation> TypeBody<R> {
    pub fn type_kind(&self) -> TypeKind {
        match self {
            TypeBody::Alias(_) => TypeKind::TK_ALIAS,
            TypeBody::Struct(_) => TypeKind::TK_STRUCTURE,
            TypeBody::Union(_) => TypeKind::TK_UNION,
            TypeBody::Bitset(_) => TypeKind::TK_BITSET,
            TypeBody::Sequence(_) => TypeKind::TK_SEQUENCE,
            TypeBody::Array(_) => TypeKind::TK_ARRAY,
            TypeBody::Map(_) => TypeKind::TK_MAP,
            TypeBody::Enumerated(_) => TypeKind::TK_ENUM,
            TypeBody::Bitmask(_) => TypeKind::TK_BITMASK,
        }
    }

    pub fn flags(&self) -> TypeFlag {
        match self {
            TypeBody::Alias(t) => t.alias_flags,
            TypeBody::Struct(t) => t.struct_flags,
            TypeBody::Union(t) => t.union_flags,
            TypeBody::Bitset(t) => t.bitset_flags,
            TypeBody::Sequence(t) => t.collection_flag,
            TypeBody::Array(t) => t.collection_flag,
            TypeBody::Map(t) => t.collection_flag,
            TypeBody::Enumerated(t) => t.enum_flags,
            TypeBody::Bitmask(t) => t.bitmask_flags,
        }
    }

    pub fn detail(&self) -> &R::TypeDetail {
        match self {
            TypeBody::Alias(t) => &t.detail,
            TypeBody::Struct(t) => &t.detail,
            TypeBody::Union(t) => &t.detail,
            TypeBody::Bitset(t) => &t.detail,
            TypeBody::Sequence(t) => &t.detail,
            TypeBody::Array(t) => &t.detail,
            TypeBody::Map(t) => &t.detail,
            TypeBody::Enumerated(t) => &t.detail,
            TypeBody::Bitmask(t) => &t.detail,
        }
    }

    /// Every type identifier this body refers to, in encoding order.
    pub fn referenced_ids(&self) -> Vec<&TypeIdentifier> {
        match self {
            TypeBody::Alias(t) => vec![&t.related_type],
            TypeBody::Struct(t) => t
                .base_type
                .iter()
                .chain(t.member_seq.iter().map(|m| &m.member_type_id))
                .collect(),
            TypeBody::Union(t) => std::iter::once(&t.discriminator.type_id)
                .chain(t.member_seq.iter().map(|m| &m.type_id))
                .collect(),
            TypeBody::Sequence(t) => vec![&t.element.type_id],
            TypeBody::Array(t) => vec![&t.element.type_id],
            TypeBody::Map(t) => vec![&t.key.type_id, &t.element.type_id],
            TypeBody::Bitset(_) | TypeBody::Enumerated(_) | TypeBody::Bitmask(_) => Vec::new(),
        }
    }
}

/// TypeObject - serializable structural description of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeObject {
    Minimal(MinimalTypeObject),
    Complete(CompleteTypeObject),
}

impl TypeObject {
    pub fn equivalence_kind(&self) -> EquivalenceKind {
        match self {
            TypeObject::Minimal(_) => EquivalenceKind::Minimal,
            TypeObject::Complete(_) => EquivalenceKind::Complete,
        }
    }

    pub fn type_kind(&self) -> TypeKind {
        match self {
            TypeObject::Minimal(body) => body.type_kind(),
            TypeObject::Complete(body) => body.type_kind(),
        }
    }

    /// Fully qualified type name (COMPLETE only).
    pub fn type_name(&self) -> Option<&str> {
        match self {
            TypeObject::Minimal(_) => None,
            TypeObject::Complete(body) => body.detail().type_name(),
        }
    }

    pub fn referenced_ids(&self) -> Vec<&TypeIdentifier> {
        match self {
            TypeObject::Minimal(body) => body.referenced_ids(),
            TypeObject::Complete(body) => body.referenced_ids(),
        }
    }

    pub fn to_cdr2_bytes(&self) -> Vec<u8> {
        cdr2::to_cdr2_bytes(self)
    }

    pub fn from_cdr2_bytes(bytes: &[u8]) -> Result<Self, CdrError> {
        cdr2::from_cdr2_bytes(bytes)
    }

    /// MD5 of the canonical encoding, truncated to 14 bytes.
    pub fn equivalence_hash(&self) -> EquivalenceHash {
        EquivalenceHash::compute(&self.to_cdr2_bytes())
    }

    /// Hash identifier this object is filed under.
    pub fn type_identifier(&self) -> TypeIdentifier {
        let hash = self.equivalence_hash();
        match self {
            TypeObject::Minimal(_) => TypeIdentifier::Minimal(hash),
            TypeObject::Complete(_) => TypeIdentifier::Complete(hash),
        }
    }
}

impl From<MinimalTypeObject> for TypeObject {
    fn from(body: MinimalTypeObject) -> Self {
        TypeObject::Minimal(body)
    }
}

impl From<CompleteTypeObject> for TypeObject {
    fn from(body: CompleteTypeObject) -> Self {
        TypeObject::Complete(body)
    }
}

/// Component hash of a strongly connected set of objects, given in part
/// order (part 1 first): MD5 over the encoded sequence, truncated.
pub fn scc_component_hash(objects: &[TypeObject]) -> EquivalenceHash {
    let mut w = cdr2::CdrWriter::new();
    w.write_seq_len(objects.len());
    for obj in objects {
        obj.encode_cdr2(&mut w);
    }
    EquivalenceHash::compute(w.as_bytes())
}
