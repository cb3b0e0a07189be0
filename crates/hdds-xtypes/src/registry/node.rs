// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type node: the registry's unit of identity.

use crate::guid::Guid;
use crate::xtypes::{TypeIdentifier, TypeObject};
use std::collections::BTreeSet;
use std::fmt;

/// Arena key. Keys increase monotonically and are never reused.
pub(crate) type NodeKey = u64;

/// Resolution state of a type node.
///
/// A node only moves forward: `Unresolved`/`Requested`/`Constructing`
/// to `Resolved` or `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeState {
    /// Known by identifier only.
    Unresolved,
    /// A TypeLookup request for it is outstanding.
    Requested,
    /// Being assembled by a `DynamicType`, not yet interned.
    Constructing,
    /// Structural object attached and verified.
    Resolved,
    /// Hash mismatch on itself or on a dependency.
    Invalid,
}

impl TypeState {
    pub fn is_pending(self) -> bool {
        matches!(self, TypeState::Unresolved | TypeState::Requested)
    }
}

impl fmt::Display for TypeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeState::Unresolved => "UNRESOLVED",
            TypeState::Requested => "REQUESTED",
            TypeState::Constructing => "CONSTRUCTING",
            TypeState::Resolved => "RESOLVED",
            TypeState::Invalid => "INVALID",
        };
        f.write_str(s)
    }
}

pub(crate) struct TypeNode {
    pub key: NodeKey,
    pub id: TypeIdentifier,
    /// The other representation of the same type (minimal for a complete
    /// node and the reverse), when known.
    pub counterpart: Option<TypeIdentifier>,
    pub state: TypeState,
    pub object: Option<TypeObject>,
    /// Counted references. Always 0 on SCC parts; the root carries them.
    pub refc: u32,
    /// Counted forward edges, released when this node is freed.
    pub deps: Vec<NodeKey>,
    /// Reverse edges, used for invalidation and endpoint re-matching.
    pub dependents: BTreeSet<NodeKey>,
    /// Remote endpoints waiting on this type.
    pub endpoints: BTreeSet<Guid>,
    /// Sequence number of the outstanding TypeLookup request.
    pub request_seqno: Option<u64>,
    /// Component root, set on SCC parts.
    pub scc_root: Option<NodeKey>,
    /// Parts in index order, set on an SCC root.
    pub scc_parts: Vec<NodeKey>,
}

impl TypeNode {
    pub fn new(key: NodeKey, id: TypeIdentifier, state: TypeState) -> Self {
        Self {
            key,
            id,
            counterpart: None,
            state,
            object: None,
            refc: 0,
            deps: Vec::new(),
            dependents: BTreeSet::new(),
            endpoints: BTreeSet::new(),
            request_seqno: None,
            scc_root: None,
            scc_parts: Vec::new(),
        }
    }

    pub fn is_scc_root(&self) -> bool {
        !self.scc_parts.is_empty()
    }
}

impl fmt::Debug for TypeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeNode")
            .field("key", &self.key)
            .field("id", &self.id)
            .field("state", &self.state)
            .field("refc", &self.refc)
            .field("deps", &self.deps.len())
            .field("dependents", &self.dependents.len())
            .finish()
    }
}
