// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XTypes v1.3 type representation.
//!
//! # Type Identification
//!
//! Every type has a `TypeIdentifier`. Primitives, strings and plain
//! collections describe themselves; constructed types are named by the
//! 14-byte MD5 of their CDR2 encoded `TypeObject`:
//!
//! ```
//! use hdds_xtypes::xtypes::{TypeIdentifier, TypeKind};
//!
//! let int32_id = TypeIdentifier::primitive(TypeKind::TK_INT32);
//! let names = TypeIdentifier::sequence(TypeIdentifier::string8(64), 10);
//! assert!(names.is_fully_descriptive());
//! assert!(!int32_id.is_hashed());
//! ```
//!
//! Mutually recursive types are named as a strongly connected component
//! (SCC): one hash for the whole component plus a 1-based index per part.
//!
//! # Type Evolution
//!
//! - **@final**: no changes allowed (exact match required)
//! - **@appendable**: members can be added at the end
//! - **@mutable**: members are matched by member id
//!
//! # Specification References
//!
//! - **OMG DDS-XTypes v1.3**: <https://www.omg.org/spec/DDS-XTypes/1.3/>

pub mod cdr2;
mod equivalence;
mod flags;
pub(crate) mod type_id;
mod type_information;
mod type_kind;
mod type_object;

pub use equivalence::{hash_member_id, EquivalenceHash, NameHash, MEMBER_ID_MAX};
pub use flags::{Extensibility, MemberFlag, TypeFlag};
pub use type_id::{
    ArrayBounds, CollectionBound, EquivalenceKind, PlainArray, PlainCollectionHeader, PlainMap,
    PlainSequence, SccId, TypeIdentifier, TypeObjectHashId,
};
pub(crate) use type_information::collect_hashed;
pub use type_information::{
    TypeIdentifierWithDependencies, TypeIdentifierWithSize, TypeInformation, TypeMapping,
};
pub use type_kind::TypeKind;
pub use type_object::*;

/// XTypes specification version implemented.
pub const XTYPES_VERSION: &str = "1.3";
