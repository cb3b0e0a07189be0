// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # hdds-xtypes - Extensible type system for HDDS
//!
//! Type identity, type registry, assignability and TypeLookup for the
//! OMG DDS-XTypes v1.3 type system.
//!
//! ## Architecture
//!
//! ```text
//! +---------------------------------------------------------------------+
//! |   TypeLookupService (request/reply)    |   DynamicType (builder)    |
//! +---------------------------------------------------------------------+
//! |                 TypeRegistry (one per domain)                       |
//! |   TypeNode arena | TypeHandle refcounts | SCC roots | wait_resolved |
//! +---------------------------------------------------------------------+
//! |   matcher (assignability)   |   xtypes (TypeIdentifier/TypeObject)  |
//! +---------------------------------------------------------------------+
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hdds_xtypes::{RegistryConfig, TypeRegistry, TypeConsistencyEnforcement};
//! use hdds_xtypes::dynamic::{DynamicType, MemberDescriptor};
//! use hdds_xtypes::xtypes::TypeKind;
//!
//! # fn main() -> hdds_xtypes::Result<()> {
//! let registry = TypeRegistry::new(0, RegistryConfig::default());
//!
//! let sensor = DynamicType::create_struct(&registry, "Sensor");
//! sensor.add_member(MemberDescriptor::new("id", TypeKind::TK_UINT32).with_id(0))?;
//! sensor.set_key(0, true)?;
//! sensor.add_member(MemberDescriptor::new("value", TypeKind::TK_FLOAT64))?;
//! let pair = sensor.register()?;
//!
//! let complete = pair.complete.as_ref().expect("complete type registered");
//! assert!(registry.is_assignable_from(
//!     complete,
//!     complete,
//!     &TypeConsistencyEnforcement::default()
//! ));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules Overview
//!
//! - [`xtypes`] - TypeIdentifier / TypeObject data model and CDR2 codec
//! - [`registry`] - Per-domain type registry and counted handles
//! - [`matcher`] - Assignability engine
//! - [`dynamic`] - Dynamic type builder
//! - [`type_lookup`] - TypeLookup request/reply service

pub mod config;
pub mod error;
pub mod guid;
pub mod matcher;
pub mod registry;
pub mod xtypes;

#[cfg(feature = "dynamic-types")]
pub mod dynamic;

#[cfg(feature = "type-lookup")]
pub mod type_lookup;

pub use config::RegistryConfig;
pub use error::{Error, Result};
pub use guid::Guid;
pub use matcher::{check_type_match, TypeConsistencyEnforcement, TypeMatch};
pub use registry::{LocalType, Sertype, TypeHandle, TypePair, TypeRegistry, TypeState};
