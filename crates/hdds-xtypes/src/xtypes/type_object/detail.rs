// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type and member details: names, name hashes and annotations.

use crate::xtypes::{NameHash, TypeIdentifier};

/// Access to a type's name, when the form carries one.
pub trait TypeName {
    fn type_name(&self) -> Option<&str>;
}

/// Access to a member's name hash (both forms) and name (COMPLETE only).
pub trait MemberName {
    fn name_hash(&self) -> NameHash;
    fn name(&self) -> Option<&str>;
}

/// MINIMAL type detail carries nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MinimalTypeDetail;

impl TypeName for MinimalTypeDetail {
    fn type_name(&self) -> Option<&str> {
        None
    }
}

/// COMPLETE type detail.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompleteTypeDetail {
    /// Fully qualified name, e.g. "sensors::Temperature"
    pub type_name: String,
    pub ann_custom: Vec<AppliedAnnotation>,
}

impl CompleteTypeDetail {
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            ann_custom: Vec::new(),
        }
    }
}

impl TypeName for CompleteTypeDetail {
    fn type_name(&self) -> Option<&str> {
        Some(&self.type_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MinimalMemberDetail {
    pub name_hash: NameHash,
}

impl MinimalMemberDetail {
    pub fn for_name(name: &str) -> Self {
        Self {
            name_hash: NameHash::of(name),
        }
    }
}

impl MemberName for MinimalMemberDetail {
    fn name_hash(&self) -> NameHash {
        self.name_hash
    }

    fn name(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompleteMemberDetail {
    pub name: String,
    pub ann_builtin: AppliedBuiltinMemberAnnotations,
    pub ann_custom: Vec<AppliedAnnotation>,
}

impl CompleteMemberDetail {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

impl MemberName for CompleteMemberDetail {
    fn name_hash(&self) -> NameHash {
        NameHash::of(&self.name)
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }
}

/// Builtin member annotations kept in COMPLETE objects.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppliedBuiltinMemberAnnotations {
    /// @unit
    pub unit: Option<String>,
    /// @hashid
    pub hash_id: Option<String>,
}

impl AppliedBuiltinMemberAnnotations {
    pub fn is_empty(&self) -> bool {
        self.unit.is_none() && self.hash_id.is_none()
    }
}

/// Application of a user annotation type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAnnotation {
    pub annotation_typeid: TypeIdentifier,
    pub param_seq: Vec<AppliedAnnotationParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAnnotationParameter {
    pub paramname_hash: NameHash,
    pub value: AnnotationParameterValue,
}

/// Annotation parameter value, discriminated by TypeKind octet.
///
/// Floating point and wide character values are not supported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnnotationParameterValue {
    Boolean(bool),
    Byte(u8),
    Int16(i16),
    UInt16(u16),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Char8(u8),
    Enumerated(i32),
    String8(String),
}
