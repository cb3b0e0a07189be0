// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Alias and collection bodies.

use super::Representation;
use crate::xtypes::{MemberFlag, TypeFlag, TypeIdentifier};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasType<R: Representation> {
    pub alias_flags: TypeFlag,
    pub detail: R::TypeDetail,
    pub related_flags: MemberFlag,
    pub related_type: TypeIdentifier,
}

/// Element (or key) of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionElement {
    pub element_flags: MemberFlag,
    pub type_id: TypeIdentifier,
}

impl CollectionElement {
    pub fn of(type_id: TypeIdentifier) -> Self {
        Self {
            element_flags: MemberFlag::empty(),
            type_id,
        }
    }
}

/// Sequence; `bound == 0` is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceType<R: Representation> {
    pub collection_flag: TypeFlag,
    pub detail: R::TypeDetail,
    pub bound: u32,
    pub element: CollectionElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayType<R: Representation> {
    pub collection_flag: TypeFlag,
    pub detail: R::TypeDetail,
    pub bound_seq: Vec<u32>,
    pub element: CollectionElement,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapType<R: Representation> {
    pub collection_flag: TypeFlag,
    pub detail: R::TypeDetail,
    pub bound: u32,
    pub key: CollectionElement,
    pub element: CollectionElement,
}
