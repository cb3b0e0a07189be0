// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry state: the node arena, the identifier index and every graph
//! mutation. All methods expect the registry lock to be held by the caller.
//!
//! # Reference counting
//!
//! ```text
//! handle / dependency edge --refc--> node
//!                                     |
//!                   SCC part ---------+--> counted on the component root
//! ```
//!
//! A node is freed when its count reaches zero; freeing releases its
//! forward edges, which may free further nodes (iterative, no recursion).

use super::node::{NodeKey, TypeNode, TypeState};
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::matcher::TypeGraph;
use crate::xtypes::{
    collect_hashed, scc_component_hash, EquivalenceKind, SccId, TypeIdentifier, TypeObject,
};
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

/// Largest accepted strongly connected component.
pub(crate) const MAX_SCC_LENGTH: i32 = 4096;

pub(crate) struct RegistryState {
    nodes: HashMap<NodeKey, TypeNode>,
    index: HashMap<TypeIdentifier, NodeKey>,
    next_key: NodeKey,
    max_nodes: usize,
}

impl RegistryState {
    pub fn new(max_nodes: usize) -> Self {
        Self {
            nodes: HashMap::new(),
            index: HashMap::new(),
            next_key: 0,
            max_nodes,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, key: NodeKey) -> Option<&TypeNode> {
        self.nodes.get(&key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut TypeNode> {
        self.nodes.get_mut(&key)
    }

    pub fn lookup_key(&self, id: &TypeIdentifier) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    pub fn lookup(&self, id: &TypeIdentifier) -> Option<&TypeNode> {
        self.lookup_key(id).and_then(|key| self.nodes.get(&key))
    }

    /// Node a reference on `key` is counted against (the root for SCC parts).
    pub fn counted_key(&self, key: NodeKey) -> NodeKey {
        self.nodes
            .get(&key)
            .and_then(|node| node.scc_root)
            .unwrap_or(key)
    }

    pub fn refcount(&self, key: NodeKey) -> u32 {
        self.nodes
            .get(&self.counted_key(key))
            .map(|node| node.refc)
            .unwrap_or(0)
    }

    fn check_capacity(&self, extra: usize) -> Result<()> {
        if self.max_nodes != 0 && self.nodes.len() + extra > self.max_nodes {
            return Err(Error::OutOfResources(format!(
                "type node limit {} reached",
                self.max_nodes
            )));
        }
        Ok(())
    }

    fn insert_node(&mut self, id: TypeIdentifier, state: TypeState) -> NodeKey {
        self.next_key += 1;
        let key = self.next_key;
        log::debug!("[TypeRegistry] created node {} ({})", id, state);
        self.index.insert(id.clone(), key);
        self.nodes.insert(key, TypeNode::new(key, id, state));
        key
    }

    pub fn incref(&mut self, key: NodeKey) {
        let root = self.counted_key(key);
        if let Some(node) = self.nodes.get_mut(&root) {
            node.refc += 1;
        }
    }

    /// Find or create the node for `id` and count one reference on it.
    pub fn ref_by_id_locked(&mut self, id: &TypeIdentifier) -> Result<NodeKey> {
        let key = self.ensure_node(id)?;
        self.incref(key);
        Ok(key)
    }

    /// Find or create the node for `id` without counting a reference.
    /// The caller counts one before releasing the lock.
    fn ensure_node(&mut self, id: &TypeIdentifier) -> Result<NodeKey> {
        if id.is_none() {
            return Err(Error::BadParameter("TK_NONE does not name a type".into()));
        }
        if let Some(key) = self.lookup_key(id) {
            let invalid = self
                .nodes
                .get(&key)
                .map(|node| node.state == TypeState::Invalid)
                .unwrap_or(false);
            if !invalid {
                return Ok(key);
            }
            self.quarantine(key);
        }
        match id {
            TypeIdentifier::StronglyConnected(scc) => self.create_scc(scc),
            _ if id.is_plain() => self.create_plain(id),
            _ => {
                self.check_capacity(1)?;
                Ok(self.insert_node(id.clone(), TypeState::Unresolved))
            }
        }
    }

    /// Detach an INVALID node (and its component) from the index so the next
    /// reference starts over. Holders of the old node keep it until released.
    fn quarantine(&mut self, key: NodeKey) {
        let root = self.counted_key(key);
        let mut members = vec![root];
        if let Some(node) = self.nodes.get(&root) {
            members.extend(node.scc_parts.iter().copied());
        }
        for member in members {
            if let Some(node) = self.nodes.get(&member) {
                if self.index.get(&node.id) == Some(&member) {
                    log::debug!("[TypeRegistry] quarantined {}", node.id);
                    self.index.remove(&node.id);
                }
            }
        }
    }

    fn create_plain(&mut self, id: &TypeIdentifier) -> Result<NodeKey> {
        self.check_capacity(1)?;
        let key = self.insert_node(id.clone(), TypeState::Resolved);
        let mut leaves = Vec::new();
        for inner in id.embedded() {
            collect_hashed(inner, &mut leaves);
        }
        for leaf in &leaves {
            if let Err(e) = self.ref_dependency(key, leaf) {
                self.discard(key);
                return Err(e);
            }
        }
        Ok(key)
    }

    fn create_scc(&mut self, scc: &SccId) -> Result<NodeKey> {
        if !scc.is_valid_part() || scc.length > MAX_SCC_LENGTH {
            return Err(Error::BadParameter(format!(
                "invalid SCC identifier (index {} of {})",
                scc.index, scc.length
            )));
        }
        self.check_capacity(scc.length as usize + 1)?;
        let root = self.insert_node(
            TypeIdentifier::StronglyConnected(scc.root()),
            TypeState::Unresolved,
        );
        let mut parts = Vec::with_capacity(scc.length as usize);
        for index in 1..=scc.length {
            let part = self.insert_node(
                TypeIdentifier::StronglyConnected(scc.part(index)),
                TypeState::Unresolved,
            );
            if let Some(node) = self.nodes.get_mut(&part) {
                node.scc_root = Some(root);
            }
            parts.push(part);
        }
        let wanted = parts[(scc.index - 1) as usize];
        if let Some(node) = self.nodes.get_mut(&root) {
            node.scc_parts = parts;
        }
        Ok(wanted)
    }

    /// Count a forward edge `from -> id`. Edges between parts of the same
    /// component are not counted.
    pub fn ref_dependency(&mut self, from: NodeKey, id: &TypeIdentifier) -> Result<()> {
        let target = self.ensure_node(id)?;
        if self.counted_key(from) == self.counted_key(target) {
            return Ok(());
        }
        self.incref(target);
        if let Some(node) = self.nodes.get_mut(&from) {
            node.deps.push(target);
        }
        if let Some(node) = self.nodes.get_mut(&target) {
            node.dependents.insert(from);
        }
        Ok(())
    }

    /// Drop every forward edge of `key`.
    fn release_deps(&mut self, key: NodeKey) {
        let deps = match self.nodes.get_mut(&key) {
            Some(node) => std::mem::take(&mut node.deps),
            None => return,
        };
        for dep in deps {
            if let Some(node) = self.nodes.get_mut(&dep) {
                node.dependents.remove(&key);
            }
            self.unref_locked(dep);
        }
    }

    /// Remove a node that never had a reference counted on it.
    fn discard(&mut self, key: NodeKey) {
        self.release_deps(key);
        if let Some(node) = self.nodes.remove(&key) {
            if self.index.get(&node.id) == Some(&key) {
                self.index.remove(&node.id);
            }
        }
    }

    /// Release one reference; frees the node (and cascades) at zero.
    pub fn unref_locked(&mut self, key: NodeKey) {
        let mut work = vec![key];
        while let Some(key) = work.pop() {
            let root = self.counted_key(key);
            let Some(node) = self.nodes.get_mut(&root) else {
                continue;
            };
            if node.refc == 0 {
                log::warn!("[TypeRegistry] unbalanced release of {}", node.id);
                continue;
            }
            node.refc -= 1;
            if node.refc > 0 {
                continue;
            }

            let mut members = vec![root];
            members.extend(node.scc_parts.iter().copied());
            for member in members {
                let Some(node) = self.nodes.remove(&member) else {
                    continue;
                };
                if self.index.get(&node.id) == Some(&member) {
                    self.index.remove(&node.id);
                }
                log::debug!("[TypeRegistry] freed node {}", node.id);
                for dep in node.deps {
                    if let Some(target) = self.nodes.get_mut(&dep) {
                        target.dependents.remove(&member);
                    }
                    work.push(dep);
                }
            }
        }
    }

    /// Attach a verified object: count its dependencies, mark RESOLVED.
    /// On failure the node is left as it was.
    pub fn attach_object_locked(&mut self, key: NodeKey, obj: TypeObject) -> Result<()> {
        let mut refs = Vec::new();
        for id in obj.referenced_ids() {
            collect_hashed(id, &mut refs);
        }
        for dep in &refs {
            if let Err(e) = self.ref_dependency(key, dep) {
                self.release_deps(key);
                return Err(e);
            }
        }
        if let Some(node) = self.nodes.get_mut(&key) {
            log::debug!("[TypeRegistry] resolved {} ({} deps)", node.id, node.deps.len());
            node.object = Some(obj);
            node.state = TypeState::Resolved;
            node.request_seqno = None;
        }
        Ok(())
    }

    /// Attach verified objects to every part of the component rooted at `root`.
    pub fn attach_scc_locked(&mut self, root: NodeKey, objects: Vec<TypeObject>) -> Result<()> {
        let parts = self
            .nodes
            .get(&root)
            .map(|node| node.scc_parts.clone())
            .unwrap_or_default();
        if parts.len() != objects.len() {
            return Err(Error::BadParameter(format!(
                "component has {} parts, got {} objects",
                parts.len(),
                objects.len()
            )));
        }
        for (part, obj) in parts.iter().zip(&objects) {
            let mut refs = Vec::new();
            for id in obj.referenced_ids() {
                collect_hashed(id, &mut refs);
            }
            for dep in &refs {
                if let Err(e) = self.ref_dependency(*part, dep) {
                    for part in &parts {
                        self.release_deps(*part);
                    }
                    return Err(e);
                }
            }
        }
        for (part, obj) in parts.iter().zip(objects) {
            if let Some(node) = self.nodes.get_mut(part) {
                node.object = Some(obj);
                node.state = TypeState::Resolved;
                node.request_seqno = None;
            }
        }
        if let Some(node) = self.nodes.get_mut(&root) {
            log::debug!("[TypeRegistry] resolved component {}", node.id);
            node.state = TypeState::Resolved;
            node.request_seqno = None;
        }
        Ok(())
    }

    fn check_attachable(&self, key: NodeKey) -> Result<bool> {
        let node = self
            .nodes
            .get(&key)
            .ok_or_else(|| Error::PreconditionNotMet("unknown type node".into()))?;
        match node.state {
            TypeState::Resolved => Ok(false),
            TypeState::Invalid | TypeState::Constructing => Err(Error::PreconditionNotMet(
                format!("type {} is {}", node.id, node.state),
            )),
            TypeState::Unresolved | TypeState::Requested => Ok(true),
        }
    }

    /// Verify and attach `obj` to the node `key`.
    ///
    /// A RESOLVED node accepts silently. A hash mismatch invalidates the node
    /// and every node depending on it.
    pub fn add_object_locked(&mut self, key: NodeKey, obj: TypeObject) -> Result<()> {
        if !self.check_attachable(key)? {
            return Ok(());
        }
        let Some(node) = self.nodes.get(&key) else {
            return Err(Error::PreconditionNotMet("unknown type node".into()));
        };
        if node.scc_root.is_some() {
            return Err(Error::BadParameter(
                "SCC parts are attached as a whole component".into(),
            ));
        }
        if !verify_object(&node.id, &obj) {
            let id = node.id.clone();
            log::warn!("[TypeRegistry] hash mismatch for {}", id);
            self.invalidate(key);
            return Err(Error::BadParameter(format!("hash mismatch for {}", id)));
        }
        self.attach_object_locked(key, obj)
    }

    /// Verify and attach the objects of a whole component, given any part.
    pub fn add_scc_objects_locked(&mut self, key: NodeKey, objects: Vec<TypeObject>) -> Result<()> {
        let scc = match self.nodes.get(&key).map(|node| &node.id) {
            Some(TypeIdentifier::StronglyConnected(scc)) => *scc,
            Some(id) => {
                return Err(Error::BadParameter(format!(
                    "{} is not a strongly connected component",
                    id
                )))
            }
            None => return Err(Error::PreconditionNotMet("unknown type node".into())),
        };
        let root = self.counted_key(key);
        if !self.check_attachable(root)? {
            return Ok(());
        }
        if !verify_scc(&scc, &objects) {
            log::warn!("[TypeRegistry] component hash mismatch for {}", scc.component.hash);
            self.invalidate(root);
            return Err(Error::BadParameter(format!(
                "component hash mismatch for {}",
                scc.component.hash
            )));
        }
        self.attach_scc_locked(root, objects)
    }

    /// Mark `key`, its component and every transitive dependent INVALID.
    pub fn invalidate(&mut self, key: NodeKey) {
        let mut queue = VecDeque::from([key]);
        let mut seen = HashSet::new();
        while let Some(key) = queue.pop_front() {
            if !seen.insert(key) {
                continue;
            }
            let Some(node) = self.nodes.get_mut(&key) else {
                continue;
            };
            if node.state != TypeState::Invalid {
                log::warn!("[TypeRegistry] {} marked INVALID", node.id);
            }
            node.state = TypeState::Invalid;
            node.request_seqno = None;
            queue.extend(node.dependents.iter().copied());
            queue.extend(node.scc_root);
            queue.extend(node.scc_parts.iter().copied());
        }
    }

    /// `key`, its SCC siblings, and everything reachable through forward
    /// edges (with their siblings).
    pub fn closure(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![key];
        while let Some(key) = stack.pop() {
            if !seen.insert(key) {
                continue;
            }
            let Some(node) = self.nodes.get(&key) else {
                continue;
            };
            order.push(key);
            stack.extend(node.deps.iter().copied());
            if let Some(root) = node.scc_root {
                if let Some(root) = self.nodes.get(&root) {
                    stack.extend(root.scc_parts.iter().copied());
                }
            }
        }
        order
    }

    /// State the waiters observe: RESOLVED only when every node of the
    /// closure is, INVALID as soon as one is.
    pub fn deep_state(&self, key: NodeKey) -> TypeState {
        let mut state = TypeState::Resolved;
        for member in self.closure(key) {
            match self.nodes.get(&member).map(|node| node.state) {
                Some(TypeState::Invalid) => return TypeState::Invalid,
                Some(TypeState::Resolved) | None => {}
                Some(other) => state = other,
            }
        }
        state
    }

    /// UNRESOLVED (and optionally REQUESTED) identifiers in the closure of
    /// `key`. Components are reported once, by their first part.
    pub fn pending_ids(&self, key: NodeKey, include_requested: bool) -> Vec<TypeIdentifier> {
        let mut roots = HashSet::new();
        let mut ids = Vec::new();
        for member in self.closure(key) {
            let Some(node) = self.nodes.get(&member) else {
                continue;
            };
            let wanted = match node.state {
                TypeState::Unresolved => true,
                TypeState::Requested => include_requested,
                _ => false,
            };
            if !wanted {
                continue;
            }
            match node.scc_root {
                Some(root) => {
                    if roots.insert(root) {
                        let first = self
                            .nodes
                            .get(&root)
                            .and_then(|r| r.scc_parts.first())
                            .and_then(|p| self.nodes.get(p))
                            .map(|p| p.id.clone());
                        ids.extend(first);
                    }
                }
                None => ids.push(node.id.clone()),
            }
        }
        ids
    }

    fn component_members(&self, key: NodeKey) -> Vec<NodeKey> {
        let root = self.counted_key(key);
        match self.nodes.get(&root) {
            Some(node) if node.is_scc_root() => {
                let mut members = vec![root];
                members.extend(node.scc_parts.iter().copied());
                members
            }
            _ => vec![key],
        }
    }

    /// Mark UNRESOLVED nodes REQUESTED under `seqno`. Returns the identifiers
    /// actually marked; ones already REQUESTED are suppressed.
    pub fn mark_requested(&mut self, ids: &[TypeIdentifier], seqno: u64) -> Vec<TypeIdentifier> {
        let mut marked = Vec::new();
        for id in ids {
            let Some(key) = self.lookup_key(id) else {
                continue;
            };
            if self.nodes.get(&key).map(|node| node.state) != Some(TypeState::Unresolved) {
                continue;
            }
            for member in self.component_members(key) {
                if let Some(node) = self.nodes.get_mut(&member) {
                    node.state = TypeState::Requested;
                    node.request_seqno = Some(seqno);
                }
            }
            marked.push(id.clone());
        }
        marked
    }

    /// Undo `mark_requested` for nodes still REQUESTED under `seqno`.
    pub fn revert_requested(&mut self, ids: &[TypeIdentifier], seqno: u64) {
        for id in ids {
            let Some(key) = self.lookup_key(id) else {
                continue;
            };
            for member in self.component_members(key) {
                if let Some(node) = self.nodes.get_mut(&member) {
                    if node.state == TypeState::Requested && node.request_seqno == Some(seqno) {
                        node.state = TypeState::Unresolved;
                        node.request_seqno = None;
                    }
                }
            }
        }
    }

    /// Identifiers among `ids` still REQUESTED.
    pub fn still_requested(&self, ids: &[TypeIdentifier]) -> Vec<TypeIdentifier> {
        ids.iter()
            .filter(|id| {
                self.lookup(id)
                    .map(|node| node.state == TypeState::Requested)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Attach a TypeLookup reply object to a REQUESTED node. Returns false
    /// (node untouched) when nobody requested it or the hash does not match.
    pub fn resolve_requested(&mut self, id: &TypeIdentifier, obj: TypeObject) -> Result<bool> {
        let Some(node) = self.lookup(id) else {
            return Ok(false);
        };
        if node.state != TypeState::Requested || node.scc_root.is_some() {
            return Ok(false);
        }
        if !verify_object(id, &obj) {
            log::warn!("[TypeRegistry] dropping reply object for {}: hash mismatch", id);
            return Ok(false);
        }
        let key = node.key;
        self.attach_object_locked(key, obj)?;
        Ok(true)
    }

    /// Component variant of [`Self::resolve_requested`].
    pub fn resolve_requested_scc(&mut self, scc: &SccId, objects: Vec<TypeObject>) -> Result<bool> {
        let Some(key) = self.lookup_key(&TypeIdentifier::StronglyConnected(scc.part(1))) else {
            return Ok(false);
        };
        let root = self.counted_key(key);
        if self.nodes.get(&root).map(|node| node.state) != Some(TypeState::Requested) {
            return Ok(false);
        }
        if !verify_scc(scc, &objects) {
            log::warn!(
                "[TypeRegistry] dropping reply for component {}: hash mismatch",
                scc.component.hash
            );
            return Ok(false);
        }
        self.attach_scc_locked(root, objects)?;
        Ok(true)
    }

    /// Objects of every part of the component `scc` belongs to, in index
    /// order, when the component is resolved.
    pub fn scc_objects(&self, scc: &SccId) -> Option<Vec<(TypeIdentifier, TypeObject)>> {
        let key = self.lookup_key(&TypeIdentifier::StronglyConnected(scc.part(1)))?;
        let root = self.nodes.get(&self.counted_key(key))?;
        if root.state != TypeState::Resolved {
            return None;
        }
        root.scc_parts
            .iter()
            .map(|part| {
                let node = self.nodes.get(part)?;
                Some((node.id.clone(), node.object.clone()?))
            })
            .collect()
    }

    /// Remote endpoints waiting on `key` directly or through dependents.
    pub fn gpe_matches(&self, key: NodeKey) -> Vec<Guid> {
        let mut endpoints = BTreeSet::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<NodeKey> = self.component_members(key).into();
        while let Some(key) = queue.pop_front() {
            if !seen.insert(key) {
                continue;
            }
            let Some(node) = self.nodes.get(&key) else {
                continue;
            };
            endpoints.extend(node.endpoints.iter().copied());
            queue.extend(node.dependents.iter().copied());
        }
        endpoints.into_iter().collect()
    }

    /// Record the minimal/complete pairing of two nodes.
    pub fn link_counterparts(&mut self, complete: &TypeIdentifier, minimal: &TypeIdentifier) {
        if let Some(key) = self.lookup_key(complete) {
            if let Some(node) = self.nodes.get_mut(&key) {
                node.counterpart = Some(minimal.clone());
            }
        }
        if let Some(key) = self.lookup_key(minimal) {
            if let Some(node) = self.nodes.get_mut(&key) {
                node.counterpart = Some(complete.clone());
            }
        }
    }

    /// COMPLETE type name of `key`, looking through its counterpart.
    pub fn type_name(&self, key: NodeKey) -> Option<String> {
        let node = self.nodes.get(&key)?;
        if let Some(name) = node.object.as_ref().and_then(|obj| obj.type_name()) {
            return Some(name.to_string());
        }
        let other = self.lookup(node.counterpart.as_ref()?)?;
        other
            .object
            .as_ref()
            .and_then(|obj| obj.type_name())
            .map(str::to_string)
    }
}

impl TypeGraph for RegistryState {
    fn object(&self, id: &TypeIdentifier) -> Option<&TypeObject> {
        let node = self.lookup(id)?;
        if node.state != TypeState::Resolved {
            return None;
        }
        node.object.as_ref()
    }

    fn minimal_id(&self, id: &TypeIdentifier) -> Option<TypeIdentifier> {
        if !(id.is_hashed() || id.is_scc()) {
            return None;
        }
        match id.equivalence_kind() {
            EquivalenceKind::Minimal => Some(id.clone()),
            EquivalenceKind::Complete => self
                .lookup(id)?
                .counterpart
                .clone()
                .filter(|other| other.equivalence_kind() == EquivalenceKind::Minimal),
            EquivalenceKind::Both => None,
        }
    }
}

/// `obj` hashes to the hash identifier `id`.
pub(crate) fn verify_object(id: &TypeIdentifier, obj: &TypeObject) -> bool {
    id.is_hashed() && obj.type_identifier() == *id
}

/// `objects` are the parts of `scc`, in index order.
pub(crate) fn verify_scc(scc: &SccId, objects: &[TypeObject]) -> bool {
    objects.len() == scc.length as usize
        && objects
            .iter()
            .all(|obj| obj.equivalence_kind() == scc.component.kind)
        && scc_component_hash(objects) == scc.component.hash
}
