// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeInformation and TypeMapping (OMG DDS-XTypes v1.3, 7.6.3.2).
//!
//! `TypeInformation` names the top-level MINIMAL and COMPLETE identifiers
//! of a topic type together with their transitive hashed dependencies.
//! `TypeMapping` carries the objects behind those identifiers so a local
//! type can be interned without asking a peer.

use super::cdr2::{self, CdrError};
use super::{EquivalenceKind, TypeIdentifier, TypeObject};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeIdentifierWithSize {
    pub type_id: TypeIdentifier,
    pub typeobject_serialized_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeIdentifierWithDependencies {
    pub typeid_with_size: TypeIdentifierWithSize,
    /// Total dependency count, `-1` when unknown. May exceed the list below.
    pub dependent_typeid_count: i32,
    pub dependent_typeids: Vec<TypeIdentifierWithSize>,
}

impl TypeIdentifierWithDependencies {
    /// Placeholder for a representation that is not provided.
    pub fn none() -> Self {
        Self {
            typeid_with_size: TypeIdentifierWithSize {
                type_id: TypeIdentifier::NONE,
                typeobject_serialized_size: 0,
            },
            dependent_typeid_count: 0,
            dependent_typeids: Vec::new(),
        }
    }

    pub fn type_id(&self) -> &TypeIdentifier {
        &self.typeid_with_size.type_id
    }

    /// Describe `top` and everything it transitively references in `mapping`.
    pub fn describe(top: &TypeIdentifier, mapping: &TypeMapping) -> Self {
        let size = |id: &TypeIdentifier| {
            mapping
                .object(id)
                .map(|obj| obj.to_cdr2_bytes().len() as u32)
                .unwrap_or(0)
        };
        let deps: Vec<TypeIdentifierWithSize> = mapping
            .dependencies_of(top)
            .into_iter()
            .map(|id| TypeIdentifierWithSize {
                typeobject_serialized_size: size(&id),
                type_id: id,
            })
            .collect();
        Self {
            typeid_with_size: TypeIdentifierWithSize {
                type_id: top.clone(),
                typeobject_serialized_size: size(top),
            },
            dependent_typeid_count: deps.len() as i32,
            dependent_typeids: deps,
        }
    }
}

/// Top-level identifiers of a type, one per representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInformation {
    pub minimal: TypeIdentifierWithDependencies,
    pub complete: TypeIdentifierWithDependencies,
}

impl TypeInformation {
    /// Build from the objects in `mapping`. Absent sides are encoded as NONE.
    pub fn describe(
        minimal: Option<&TypeIdentifier>,
        complete: Option<&TypeIdentifier>,
        mapping: &TypeMapping,
    ) -> Self {
        Self {
            minimal: minimal
                .map(|id| TypeIdentifierWithDependencies::describe(id, mapping))
                .unwrap_or_else(TypeIdentifierWithDependencies::none),
            complete: complete
                .map(|id| TypeIdentifierWithDependencies::describe(id, mapping))
                .unwrap_or_else(TypeIdentifierWithDependencies::none),
        }
    }

    /// Top-level MINIMAL identifier, if any.
    pub fn minimal_id(&self) -> Option<&TypeIdentifier> {
        Some(self.minimal.type_id()).filter(|id| !id.is_none())
    }

    /// Top-level COMPLETE identifier, if any.
    pub fn complete_id(&self) -> Option<&TypeIdentifier> {
        Some(self.complete.type_id()).filter(|id| !id.is_none())
    }

    /// At least one side present, and every present side is a hash
    /// identifier of the matching kind.
    pub fn is_valid(&self) -> bool {
        let side_ok = |id: Option<&TypeIdentifier>, kind: EquivalenceKind| match id {
            None => true,
            Some(id) => (id.is_hashed() || id.is_scc()) && id.equivalence_kind() == kind,
        };
        (self.minimal_id().is_some() || self.complete_id().is_some())
            && side_ok(self.minimal_id(), EquivalenceKind::Minimal)
            && side_ok(self.complete_id(), EquivalenceKind::Complete)
    }

    pub fn to_cdr2_bytes(&self) -> Vec<u8> {
        cdr2::to_cdr2_bytes(self)
    }

    pub fn from_cdr2_bytes(bytes: &[u8]) -> Result<Self, CdrError> {
        cdr2::from_cdr2_bytes(bytes)
    }
}

/// Identifier to object pairs for a closure of types.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeMapping {
    pub identifier_object_pair_minimal: Vec<(TypeIdentifier, TypeObject)>,
    pub identifier_object_pair_complete: Vec<(TypeIdentifier, TypeObject)>,
    pub identifier_complete_minimal: Vec<(TypeIdentifier, TypeIdentifier)>,
}

impl TypeMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// File objects under their own hash identifiers.
    pub fn from_objects(objects: impl IntoIterator<Item = TypeObject>) -> Self {
        let mut mapping = Self::new();
        for obj in objects {
            let id = obj.type_identifier();
            mapping.insert(id, obj);
        }
        mapping
    }

    /// Add an object under an explicit identifier (needed for SCC parts).
    /// An identifier already present is left untouched.
    pub fn insert(&mut self, id: TypeIdentifier, obj: TypeObject) {
        if self.object(&id).is_some() {
            return;
        }
        match obj.equivalence_kind() {
            EquivalenceKind::Minimal => self.identifier_object_pair_minimal.push((id, obj)),
            _ => self.identifier_object_pair_complete.push((id, obj)),
        }
    }

    /// Record that `complete` and `minimal` describe the same type.
    pub fn link(&mut self, complete: TypeIdentifier, minimal: TypeIdentifier) {
        if !self.identifier_complete_minimal.iter().any(|(c, _)| *c == complete) {
            self.identifier_complete_minimal.push((complete, minimal));
        }
    }

    pub fn object(&self, id: &TypeIdentifier) -> Option<&TypeObject> {
        self.iter().find(|(k, _)| *k == id).map(|(_, obj)| obj)
    }

    pub fn minimal_of(&self, complete: &TypeIdentifier) -> Option<&TypeIdentifier> {
        self.identifier_complete_minimal
            .iter()
            .find(|(c, _)| c == complete)
            .map(|(_, m)| m)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TypeIdentifier, &TypeObject)> {
        self.identifier_object_pair_minimal
            .iter()
            .chain(self.identifier_object_pair_complete.iter())
            .map(|(id, obj)| (id, obj))
    }

    pub fn len(&self) -> usize {
        self.identifier_object_pair_minimal.len() + self.identifier_object_pair_complete.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hashed and SCC identifiers reachable from `top`, excluding `top`,
    /// in breadth-first order.
    pub fn dependencies_of(&self, top: &TypeIdentifier) -> Vec<TypeIdentifier> {
        let mut seen: HashSet<TypeIdentifier> = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        seen.insert(top.clone());
        queue.push_back(top.clone());

        while let Some(id) = queue.pop_front() {
            let Some(obj) = self.object(&id) else {
                continue;
            };
            let mut leaves = Vec::new();
            for referenced in obj.referenced_ids() {
                collect_hashed(referenced, &mut leaves);
            }
            for leaf in leaves {
                if seen.insert(leaf.clone()) {
                    order.push(leaf.clone());
                    queue.push_back(leaf);
                }
            }
        }
        order
    }

    pub fn to_cdr2_bytes(&self) -> Vec<u8> {
        cdr2::to_cdr2_bytes(self)
    }

    pub fn from_cdr2_bytes(bytes: &[u8]) -> Result<Self, CdrError> {
        cdr2::from_cdr2_bytes(bytes)
    }
}

/// Hashed or SCC identifiers inside `id`, looking through plain collections.
pub(crate) fn collect_hashed(id: &TypeIdentifier, out: &mut Vec<TypeIdentifier>) {
    if id.is_hashed() || id.is_scc() {
        out.push(id.clone());
        return;
    }
    for inner in id.embedded() {
        collect_hashed(inner, out);
    }
}
