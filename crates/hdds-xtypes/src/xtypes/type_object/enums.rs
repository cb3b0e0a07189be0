// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enumerated, bitmask and bitset bodies.

use super::Representation;
use crate::xtypes::{MemberFlag, TypeFlag, TypeKind};

/// Enumeration. `literal_seq` is sorted by increasing value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedType<R: Representation> {
    pub enum_flags: TypeFlag,
    /// Number of bits used by the encoding (1..=32).
    pub bit_bound: u16,
    pub detail: R::TypeDetail,
    pub literal_seq: Vec<EnumeratedLiteral<R>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedLiteral<R: Representation> {
    pub value: i32,
    /// `IS_DEFAULT` marks the default literal.
    pub flags: MemberFlag,
    pub detail: R::MemberDetail,
}

impl<R: Representation> EnumeratedType<R> {
    pub fn literal(&self, value: i32) -> Option<&EnumeratedLiteral<R>> {
        self.literal_seq.iter().find(|l| l.value == value)
    }
}

/// Bitmask. `flag_seq` is sorted by increasing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitmaskType<R: Representation> {
    pub bitmask_flags: TypeFlag,
    /// Number of bits (1..=64).
    pub bit_bound: u16,
    pub detail: R::TypeDetail,
    pub flag_seq: Vec<BitFlag<R>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitFlag<R: Representation> {
    pub position: u16,
    pub flags: MemberFlag,
    pub detail: R::MemberDetail,
}

/// Bitset (IDL 4 bitfield struct). Carried by the data model only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitsetType<R: Representation> {
    pub bitset_flags: TypeFlag,
    pub detail: R::TypeDetail,
    pub field_seq: Vec<BitField<R>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitField<R: Representation> {
    pub position: u16,
    pub flags: MemberFlag,
    pub bitcount: u8,
    pub holder_type: TypeKind,
    pub detail: R::MemberDetail,
}
