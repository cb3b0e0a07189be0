// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member descriptors and type references accepted by the builder.

use super::DynamicType;
use crate::xtypes::{TypeIdentifier, TypeKind};

/// Type of a member, case, element or alias target.
#[derive(Debug, Clone)]
pub enum DynamicTypeSpec {
    /// Primitive kind (`TK_BOOLEAN` .. `TK_CHAR8`).
    Primitive(TypeKind),
    /// Another dynamic type, completed together with its user.
    Type(DynamicType),
}

impl From<TypeKind> for DynamicTypeSpec {
    fn from(kind: TypeKind) -> Self {
        DynamicTypeSpec::Primitive(kind)
    }
}

impl From<DynamicType> for DynamicTypeSpec {
    fn from(ty: DynamicType) -> Self {
        DynamicTypeSpec::Type(ty)
    }
}

impl From<&DynamicType> for DynamicTypeSpec {
    fn from(ty: &DynamicType) -> Self {
        DynamicTypeSpec::Type(ty.clone())
    }
}

/// Minimal and complete identifiers of a completed type. Plain types
/// (primitives, strings, sequences, arrays of plain types) carry the same
/// identifier twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicTypeIds {
    pub minimal: TypeIdentifier,
    pub complete: TypeIdentifier,
}

impl DynamicTypeIds {
    pub(crate) fn plain(id: TypeIdentifier) -> Self {
        Self {
            minimal: id.clone(),
            complete: id,
        }
    }
}

/// Member id assignment for members added without an explicit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoId {
    /// Highest id so far plus one.
    #[default]
    Sequential,
    /// Hash of the member name (`@autoid(HASH)`).
    Hash,
}

/// Describes a struct member or union case to add.
///
/// ```
/// use hdds_xtypes::dynamic::MemberDescriptor;
/// use hdds_xtypes::xtypes::TypeKind;
///
/// let member = MemberDescriptor::new("count", TypeKind::TK_UINT32)
///     .with_id(4)
///     .at_index(0);
/// assert_eq!(member.id, Some(4));
/// ```
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    pub name: String,
    pub type_spec: DynamicTypeSpec,
    /// Explicit member id; assigned automatically when `None`.
    pub id: Option<u32>,
    /// Declaration index; appended when `None`.
    pub index: Option<usize>,
    /// Case labels (unions only).
    pub labels: Vec<i32>,
    /// Default case (unions only).
    pub is_default: bool,
}

impl MemberDescriptor {
    pub fn new(name: impl Into<String>, type_spec: impl Into<DynamicTypeSpec>) -> Self {
        Self {
            name: name.into(),
            type_spec: type_spec.into(),
            id: None,
            index: None,
            labels: Vec::new(),
            is_default: false,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = Some(id);
        self
    }

    /// Insert at declaration index `index`, shifting later members.
    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    pub fn with_labels(mut self, labels: &[i32]) -> Self {
        self.labels = labels.to_vec();
        self
    }

    pub fn default_case(mut self) -> Self {
        self.is_default = true;
        self
    }
}
