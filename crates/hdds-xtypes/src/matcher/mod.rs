// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XTypes v1.3 type assignability.
//!
//! Implements the "is assignable from" relation between a reader type and
//! a writer type:
//! - Aliases are transparent; minimal-equivalent types always match
//! - Strings, collections and bitmasks compare by shape and bound
//! - Enums, structs and unions follow the per-extensibility rules
//!   (FINAL, APPENDABLE, MUTABLE), including the key-member rules
//!
//! # Type Assignability Rules
//!
//! - **FINAL**: identical member ids in declaration order
//! - **APPENDABLE / MUTABLE**: members paired by id; unmatched key or
//!   must-understand members on either side reject the pair
//!
//! The engine is a pure function of the two types and the objects it can
//! read through a [`TypeGraph`]; the registry calls it with its lock held.

mod aggregates;
mod consistency;
mod engine;
mod views;

#[cfg(test)]
mod tests;

pub use consistency::TypeConsistencyEnforcement;
pub use views::{key_erased, key_holder};

use crate::registry::{TypePair, TypeRegistry};
use crate::xtypes::{
    CompleteForm, EquivalenceKind, MinimalForm, TypeIdentifier, TypeInformation, TypeMapping,
    TypeObject,
};
use engine::{Engine, View};
use std::collections::HashSet;

/// Read access to the objects of a set of types.
pub trait TypeGraph {
    /// Object filed under the hashed or SCC identifier `id`, when known.
    fn object(&self, id: &TypeIdentifier) -> Option<&TypeObject>;

    /// MINIMAL identifier `id` is equivalent to, when known.
    fn minimal_id(&self, id: &TypeIdentifier) -> Option<TypeIdentifier>;
}

impl TypeGraph for TypeMapping {
    fn object(&self, id: &TypeIdentifier) -> Option<&TypeObject> {
        TypeMapping::object(self, id)
    }

    fn minimal_id(&self, id: &TypeIdentifier) -> Option<TypeIdentifier> {
        if !(id.is_hashed() || id.is_scc()) {
            return None;
        }
        match id.equivalence_kind() {
            EquivalenceKind::Minimal => Some(id.clone()),
            EquivalenceKind::Complete => self.minimal_of(id).cloned(),
            EquivalenceKind::Both => None,
        }
    }
}

/// Outcome of matching the types of a reader and a writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeMatch {
    Matched,
    NotMatched,
    /// Some types are not resolved yet; the listed identifiers are
    /// UNRESOLVED or REQUESTED.
    Pending(Vec<TypeIdentifier>),
}

/// Can data of type `writer` be received as type `reader`.
///
/// Both identifiers must be of the same equivalence kind (plain
/// identifiers go with either). A mix of MINIMAL and COMPLETE hashes is
/// never assignable.
pub fn is_assignable_from<G>(
    graph: &G,
    reader: &TypeIdentifier,
    writer: &TypeIdentifier,
    opts: &TypeConsistencyEnforcement,
) -> bool
where
    G: TypeGraph + ?Sized,
{
    match common_kind(reader, writer) {
        Some(EquivalenceKind::Complete) => {
            Engine::<G, CompleteForm>::new(graph, opts).check(reader, writer, View::Plain)
        }
        Some(_) => Engine::<G, MinimalForm>::new(graph, opts).check(reader, writer, View::Plain),
        None => {
            log::trace!(
                "[Assignability] {} <- {}: minimal and complete identifiers mixed",
                reader,
                writer
            );
            false
        }
    }
}

/// `writer` is minimal-equivalent to `reader`, or delimited and
/// assignable to it.
pub fn is_strongly_assignable<G>(
    graph: &G,
    reader: &TypeIdentifier,
    writer: &TypeIdentifier,
    opts: &TypeConsistencyEnforcement,
) -> bool
where
    G: TypeGraph + ?Sized,
{
    match common_kind(reader, writer) {
        Some(EquivalenceKind::Complete) => {
            Engine::<G, CompleteForm>::new(graph, opts).strongly(reader, writer)
        }
        Some(_) => Engine::<G, MinimalForm>::new(graph, opts).strongly(reader, writer),
        None => false,
    }
}

/// Whether `id` can be skipped on the wire without being understood.
/// `false` when part of the type is not in `graph`.
pub fn is_delimited<G>(graph: &G, id: &TypeIdentifier) -> bool
where
    G: TypeGraph + ?Sized,
{
    let opts = TypeConsistencyEnforcement::default();
    match id.equivalence_kind() {
        EquivalenceKind::Complete => {
            Engine::<G, CompleteForm>::new(graph, &opts).delimited(id, &mut HashSet::new())
        }
        _ => Engine::<G, MinimalForm>::new(graph, &opts).delimited(id, &mut HashSet::new()),
    }
}

/// Type information is present and well formed.
pub fn type_info_valid(info: Option<&TypeInformation>) -> bool {
    info.is_some_and(TypeInformation::is_valid)
}

/// Match the types of a reader and a writer.
///
/// MINIMAL types are compared when both sides have one, COMPLETE types
/// otherwise. Without type information on either side the endpoints
/// match, unless `force_type_validation` is set.
pub fn check_type_match(
    registry: &TypeRegistry,
    reader: &TypePair,
    writer: &TypePair,
    opts: &TypeConsistencyEnforcement,
) -> TypeMatch {
    if reader.is_empty() || writer.is_empty() {
        return if opts.force_type_validation {
            log::trace!("[Assignability] type information missing, validation forced");
            TypeMatch::NotMatched
        } else {
            TypeMatch::Matched
        };
    }
    let (r, w) = match (reader, writer) {
        (
            TypePair {
                minimal: Some(r), ..
            },
            TypePair {
                minimal: Some(w), ..
            },
        ) => (r, w),
        (
            TypePair {
                complete: Some(r), ..
            },
            TypePair {
                complete: Some(w), ..
            },
        ) => (r, w),
        _ => {
            log::trace!("[Assignability] reader and writer share no type representation");
            return TypeMatch::NotMatched;
        }
    };
    registry.match_handles(r, w, opts)
}

fn common_kind(a: &TypeIdentifier, b: &TypeIdentifier) -> Option<EquivalenceKind> {
    use EquivalenceKind::{Both, Complete, Minimal};
    match (a.equivalence_kind(), b.equivalence_kind()) {
        (Complete, Complete) | (Complete, Both) | (Both, Complete) => Some(Complete),
        (Minimal, Minimal) | (Minimal, Both) | (Both, Minimal) | (Both, Both) => Some(Minimal),
        _ => None,
    }
}
