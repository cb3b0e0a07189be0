// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Struct and union bodies.

use super::{MemberName, Representation};
use crate::xtypes::{MemberFlag, TypeFlag, TypeIdentifier};

/// Struct type. `member_seq` is in declaration order, not member id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType<R: Representation> {
    pub struct_flags: TypeFlag,
    /// Base type for inheritance, `None` encodes as TK_NONE.
    pub base_type: Option<TypeIdentifier>,
    pub detail: R::TypeDetail,
    pub member_seq: Vec<StructMember<R>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructMember<R: Representation> {
    pub member_id: u32,
    pub member_flags: MemberFlag,
    pub member_type_id: TypeIdentifier,
    pub detail: R::MemberDetail,
}

impl<R: Representation> StructType<R> {
    pub fn member_by_id(&self, member_id: u32) -> Option<&StructMember<R>> {
        self.member_seq.iter().find(|m| m.member_id == member_id)
    }

    pub fn key_members(&self) -> impl Iterator<Item = &StructMember<R>> {
        self.member_seq.iter().filter(|m| m.member_flags.is_key())
    }
}

/// Union discriminator: its type and whether it is a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionDiscriminator {
    pub member_flags: MemberFlag,
    pub type_id: TypeIdentifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionType<R: Representation> {
    pub union_flags: TypeFlag,
    pub detail: R::TypeDetail,
    pub discriminator: UnionDiscriminator,
    pub member_seq: Vec<UnionMember<R>>,
}

/// Union case. The default case carries `MemberFlag::IS_DEFAULT` and may
/// also list explicit labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnionMember<R: Representation> {
    pub member_id: u32,
    pub member_flags: MemberFlag,
    pub type_id: TypeIdentifier,
    pub label_seq: Vec<i32>,
    pub detail: R::MemberDetail,
}

impl<R: Representation> UnionMember<R> {
    pub fn is_default(&self) -> bool {
        self.member_flags.contains(MemberFlag::IS_DEFAULT)
    }
}

impl<R: Representation> UnionType<R> {
    /// Case selected by `label`, falling back to the default case.
    pub fn select(&self, label: i32) -> Option<&UnionMember<R>> {
        self.member_seq
            .iter()
            .find(|m| m.label_seq.contains(&label))
            .or_else(|| self.member_seq.iter().find(|m| m.is_default()))
    }

    pub fn member_by_name(&self, name: &str) -> Option<&UnionMember<R>> {
        let hash = crate::xtypes::NameHash::of(name);
        self.member_seq.iter().find(|m| m.detail.name_hash() == hash)
    }
}
