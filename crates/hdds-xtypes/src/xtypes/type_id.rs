// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeIdentifier per OMG DDS-XTypes v1.3 (7.3.4.6).
//!
//! A TypeIdentifier is either fully descriptive (primitives, plain strings,
//! plain collections, which embed their element identifier) or a reference
//! to a TypeObject through an equivalence hash, possibly as a member of a
//! strongly connected component.

use super::{EquivalenceHash, MemberFlag, TypeKind};
use std::fmt;

/// Identifier discriminator octets.
pub const TI_STRING8_SMALL: u8 = 0x70;
pub const TI_STRING8_LARGE: u8 = 0x71;
pub const TI_STRING16_SMALL: u8 = 0x72;
pub const TI_STRING16_LARGE: u8 = 0x73;
pub const TI_PLAIN_SEQUENCE_SMALL: u8 = 0x80;
pub const TI_PLAIN_SEQUENCE_LARGE: u8 = 0x81;
pub const TI_PLAIN_ARRAY_SMALL: u8 = 0x90;
pub const TI_PLAIN_ARRAY_LARGE: u8 = 0x91;
pub const TI_PLAIN_MAP_SMALL: u8 = 0xA0;
pub const TI_PLAIN_MAP_LARGE: u8 = 0xA1;
pub const TI_STRONGLY_CONNECTED_COMPONENT: u8 = 0xB0;
pub const EK_MINIMAL: u8 = 0xF1;
pub const EK_COMPLETE: u8 = 0xF2;
pub const EK_BOTH: u8 = 0xF3;

/// Equivalence relation a hash (or plain collection) was computed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EquivalenceKind {
    Minimal,
    Complete,
    /// Plain collection whose element identifier is fully descriptive.
    Both,
}

impl EquivalenceKind {
    pub const fn to_u8(self) -> u8 {
        match self {
            EquivalenceKind::Minimal => EK_MINIMAL,
            EquivalenceKind::Complete => EK_COMPLETE,
            EquivalenceKind::Both => EK_BOTH,
        }
    }

    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            EK_MINIMAL => Some(EquivalenceKind::Minimal),
            EK_COMPLETE => Some(EquivalenceKind::Complete),
            EK_BOTH => Some(EquivalenceKind::Both),
            _ => None,
        }
    }
}

/// Header shared by all plain collection identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlainCollectionHeader {
    pub equiv_kind: EquivalenceKind,
    pub element_flags: MemberFlag,
}

impl PlainCollectionHeader {
    /// Header for a collection of `element`.
    pub fn for_element(element: &TypeIdentifier) -> Self {
        Self {
            equiv_kind: element.collection_equiv_kind(),
            element_flags: MemberFlag::empty(),
        }
    }
}

/// Single bound, kept in the width it was encoded with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionBound {
    Small(u8),
    Large(u32),
}

impl CollectionBound {
    /// Smallest encoding able to carry `bound` (0 = unbounded).
    pub fn new(bound: u32) -> Self {
        match u8::try_from(bound) {
            Ok(small) => CollectionBound::Small(small),
            Err(_) => CollectionBound::Large(bound),
        }
    }

    pub fn value(self) -> u32 {
        match self {
            CollectionBound::Small(b) => u32::from(b),
            CollectionBound::Large(b) => b,
        }
    }
}

/// Array dimensions, kept in the width they were encoded with.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrayBounds {
    Small(Vec<u8>),
    Large(Vec<u32>),
}

impl ArrayBounds {
    pub fn new(dims: &[u32]) -> Self {
        if dims.iter().all(|&d| d <= u32::from(u8::MAX)) {
            ArrayBounds::Small(dims.iter().map(|&d| d as u8).collect())
        } else {
            ArrayBounds::Large(dims.to_vec())
        }
    }

    pub fn dims(&self) -> Vec<u32> {
        match self {
            ArrayBounds::Small(dims) => dims.iter().map(|&d| u32::from(d)).collect(),
            ArrayBounds::Large(dims) => dims.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlainSequence {
    pub header: PlainCollectionHeader,
    pub bound: CollectionBound,
    pub element: Box<TypeIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlainArray {
    pub header: PlainCollectionHeader,
    pub bounds: ArrayBounds,
    pub element: Box<TypeIdentifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlainMap {
    pub header: PlainCollectionHeader,
    pub bound: CollectionBound,
    pub element: Box<TypeIdentifier>,
    pub key_flags: MemberFlag,
    pub key: Box<TypeIdentifier>,
}

/// Hash of a TypeObject (or of a whole SCC), with its equivalence kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeObjectHashId {
    pub kind: EquivalenceKind,
    pub hash: EquivalenceHash,
}

/// Member of a strongly connected component.
///
/// `index` runs from 1 to `length`. Index 0 is reserved for the component
/// root kept by the registry and never appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SccId {
    pub component: TypeObjectHashId,
    pub length: i32,
    pub index: i32,
}

impl SccId {
    /// Identifier of part `index` of the same component.
    pub fn part(&self, index: i32) -> Self {
        Self { index, ..*self }
    }

    pub fn root(&self) -> Self {
        self.part(0)
    }

    pub fn is_valid_part(&self) -> bool {
        self.length > 0 && self.index >= 1 && self.index <= self.length
    }
}

/// TypeIdentifier - uniquely identifies a type under an equivalence kind.
///
/// Equality is tag + payload. Hash identifiers compare by hash only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeIdentifier {
    /// Primitive type, the kind is the whole identifier.
    Primitive(TypeKind),
    String8Small { bound: u8 },
    String8Large { bound: u32 },
    String16Small { bound: u8 },
    String16Large { bound: u32 },
    PlainSequence(PlainSequence),
    PlainArray(PlainArray),
    PlainMap(PlainMap),
    StronglyConnected(SccId),
    /// Hash of a MINIMAL TypeObject.
    Minimal(EquivalenceHash),
    /// Hash of a COMPLETE TypeObject.
    Complete(EquivalenceHash),
}

impl TypeIdentifier {
    /// "No type", used for absent base types.
    pub const NONE: TypeIdentifier = TypeIdentifier::Primitive(TypeKind::TK_NONE);

    pub const fn primitive(kind: TypeKind) -> Self {
        TypeIdentifier::Primitive(kind)
    }

    /// 8-bit string, `bound == 0` means unbounded.
    pub fn string8(bound: u32) -> Self {
        match u8::try_from(bound) {
            Ok(bound) => TypeIdentifier::String8Small { bound },
            Err(_) => TypeIdentifier::String8Large { bound },
        }
    }

    pub fn string16(bound: u32) -> Self {
        match u8::try_from(bound) {
            Ok(bound) => TypeIdentifier::String16Small { bound },
            Err(_) => TypeIdentifier::String16Large { bound },
        }
    }

    pub fn sequence(element: TypeIdentifier, bound: u32) -> Self {
        TypeIdentifier::PlainSequence(PlainSequence {
            header: PlainCollectionHeader::for_element(&element),
            bound: CollectionBound::new(bound),
            element: Box::new(element),
        })
    }

    pub fn array(element: TypeIdentifier, dims: &[u32]) -> Self {
        TypeIdentifier::PlainArray(PlainArray {
            header: PlainCollectionHeader::for_element(&element),
            bounds: ArrayBounds::new(dims),
            element: Box::new(element),
        })
    }

    pub fn map(key: TypeIdentifier, element: TypeIdentifier, bound: u32) -> Self {
        let mut header = PlainCollectionHeader::for_element(&element);
        if header.equiv_kind == EquivalenceKind::Both {
            header.equiv_kind = key.collection_equiv_kind();
        }
        TypeIdentifier::PlainMap(PlainMap {
            header,
            bound: CollectionBound::new(bound),
            element: Box::new(element),
            key_flags: MemberFlag::empty(),
            key: Box::new(key),
        })
    }

    /// Wire discriminator octet.
    pub fn discriminator(&self) -> u8 {
        match self {
            TypeIdentifier::Primitive(kind) => kind.to_u8(),
            TypeIdentifier::String8Small { .. } => TI_STRING8_SMALL,
            TypeIdentifier::String8Large { .. } => TI_STRING8_LARGE,
            TypeIdentifier::String16Small { .. } => TI_STRING16_SMALL,
            TypeIdentifier::String16Large { .. } => TI_STRING16_LARGE,
            TypeIdentifier::PlainSequence(seq) => match seq.bound {
                CollectionBound::Small(_) => TI_PLAIN_SEQUENCE_SMALL,
                CollectionBound::Large(_) => TI_PLAIN_SEQUENCE_LARGE,
            },
            TypeIdentifier::PlainArray(arr) => match arr.bounds {
                ArrayBounds::Small(_) => TI_PLAIN_ARRAY_SMALL,
                ArrayBounds::Large(_) => TI_PLAIN_ARRAY_LARGE,
            },
            TypeIdentifier::PlainMap(map) => match map.bound {
                CollectionBound::Small(_) => TI_PLAIN_MAP_SMALL,
                CollectionBound::Large(_) => TI_PLAIN_MAP_LARGE,
            },
            TypeIdentifier::StronglyConnected(_) => TI_STRONGLY_CONNECTED_COMPONENT,
            TypeIdentifier::Minimal(_) => EK_MINIMAL,
            TypeIdentifier::Complete(_) => EK_COMPLETE,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, TypeIdentifier::Primitive(TypeKind::TK_NONE))
    }

    /// Minimal or complete hash reference.
    pub fn is_hashed(&self) -> bool {
        matches!(self, TypeIdentifier::Minimal(_) | TypeIdentifier::Complete(_))
    }

    pub fn is_scc(&self) -> bool {
        matches!(self, TypeIdentifier::StronglyConnected(_))
    }

    /// Identifier that describes its own shape (no TypeObject needed for
    /// the node itself; a plain collection may still embed a hashed element).
    pub fn is_plain(&self) -> bool {
        !self.is_hashed() && !self.is_scc()
    }

    /// Plain all the way down: no hash anywhere in the identifier tree.
    pub fn is_fully_descriptive(&self) -> bool {
        match self {
            TypeIdentifier::PlainSequence(seq) => seq.element.is_fully_descriptive(),
            TypeIdentifier::PlainArray(arr) => arr.element.is_fully_descriptive(),
            TypeIdentifier::PlainMap(map) => {
                map.key.is_fully_descriptive() && map.element.is_fully_descriptive()
            }
            other => other.is_plain(),
        }
    }

    pub fn equivalence_hash(&self) -> Option<&EquivalenceHash> {
        match self {
            TypeIdentifier::Minimal(hash) | TypeIdentifier::Complete(hash) => Some(hash),
            _ => None,
        }
    }

    /// Equivalence kind of a hashed/SCC identifier, `Both` for plain ones
    /// that embed no hash.
    pub fn equivalence_kind(&self) -> EquivalenceKind {
        match self {
            TypeIdentifier::Minimal(_) => EquivalenceKind::Minimal,
            TypeIdentifier::Complete(_) => EquivalenceKind::Complete,
            TypeIdentifier::StronglyConnected(scc) => scc.component.kind,
            TypeIdentifier::PlainSequence(seq) => seq.header.equiv_kind,
            TypeIdentifier::PlainArray(arr) => arr.header.equiv_kind,
            TypeIdentifier::PlainMap(map) => map.header.equiv_kind,
            _ => EquivalenceKind::Both,
        }
    }

    fn collection_equiv_kind(&self) -> EquivalenceKind {
        self.equivalence_kind()
    }

    /// Identifiers embedded in a plain collection identifier.
    pub fn embedded(&self) -> Vec<&TypeIdentifier> {
        match self {
            TypeIdentifier::PlainSequence(seq) => vec![&*seq.element],
            TypeIdentifier::PlainArray(arr) => vec![&*arr.element],
            TypeIdentifier::PlainMap(map) => vec![&*map.key, &*map.element],
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for TypeIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeIdentifier::Primitive(kind) => write!(f, "{:?}", kind),
            TypeIdentifier::String8Small { bound } => write!(f, "string<{}>", bound),
            TypeIdentifier::String8Large { bound } => write!(f, "string<{}>", bound),
            TypeIdentifier::String16Small { bound } => write!(f, "wstring<{}>", bound),
            TypeIdentifier::String16Large { bound } => write!(f, "wstring<{}>", bound),
            TypeIdentifier::PlainSequence(seq) => {
                write!(f, "sequence<{}, {}>", seq.element, seq.bound.value())
            }
            TypeIdentifier::PlainArray(arr) => write!(f, "{}{:?}", arr.element, arr.bounds.dims()),
            TypeIdentifier::PlainMap(map) => {
                write!(f, "map<{}, {}, {}>", map.key, map.element, map.bound.value())
            }
            TypeIdentifier::StronglyConnected(scc) => write!(
                f,
                "scc({:?}:{}, {}/{})",
                scc.component.kind, scc.component.hash, scc.index, scc.length
            ),
            TypeIdentifier::Minimal(hash) => write!(f, "m:{}", hash),
            TypeIdentifier::Complete(hash) => write!(f, "c:{}", hash),
        }
    }
}
