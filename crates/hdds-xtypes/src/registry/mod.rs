// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-domain type registry.
//!
//! # Architecture
//!
//! ```text
//! TypeRegistry (one per domain, cheap to clone)
//! +-- RegistryInner
//!     +-- state: Mutex<RegistryState>
//!     |   +-- nodes: HashMap<NodeKey, TypeNode>      (arena, sole owner)
//!     |   +-- index: HashMap<TypeIdentifier, NodeKey>
//!     +-- resolved: Condvar                          (wait_resolved)
//!
//! TypeHandle --weak--> RegistryInner   (one counted reference per handle)
//! ```
//!
//! Nodes reference each other by key, never by pointer. Mutually recursive
//! types form a strongly connected component whose root node carries the
//! references for all its parts.
//!
//! # Thread Safety
//!
//! Every operation takes the registry lock for the duration of its graph
//! mutation. `wait_resolved` is the only blocking call; it releases the lock
//! while waiting on the condition variable.

mod handle;
mod node;
mod sertype;
mod state;

pub use handle::{TypeHandle, TypePair};
pub use node::TypeState;
pub use sertype::{LocalType, Sertype};

pub(crate) use node::NodeKey;
pub(crate) use state::RegistryState;

use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::matcher::{self, TypeConsistencyEnforcement, TypeMatch};
use crate::xtypes::{TypeIdentifier, TypeMapping, TypeObject};
use parking_lot::{Condvar, Mutex, MutexGuard};
use sertype::{decode_sertype, scc_objects_from};
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub(crate) struct RegistryInner {
    domain_id: u32,
    config: RegistryConfig,
    pub(crate) state: Mutex<RegistryState>,
    resolved: Condvar,
}

/// Type registry of one domain.
///
/// Created at domain start, dropped at domain stop. Handles that outlive it
/// become inert.
#[derive(Clone)]
pub struct TypeRegistry {
    inner: Arc<RegistryInner>,
}

impl TypeRegistry {
    pub fn new(domain_id: u32, config: RegistryConfig) -> Self {
        log::debug!("[TypeRegistry] domain {} registry created", domain_id);
        Self {
            inner: Arc::new(RegistryInner {
                domain_id,
                state: Mutex::new(RegistryState::new(config.max_nodes)),
                config,
                resolved: Condvar::new(),
            }),
        }
    }

    pub fn domain_id(&self) -> u32 {
        self.inner.domain_id
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.inner.config
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.inner.state.lock()
    }

    /// Wake every `wait_resolved` caller to re-check its node.
    pub(crate) fn notify_resolved(&self) {
        self.inner.resolved.notify_all();
    }

    /// Both values refer to the same registry.
    pub(crate) fn same_as(&self, other: &TypeRegistry) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn adopt(&self, key: NodeKey, id: TypeIdentifier) -> TypeHandle {
        TypeHandle::adopt(&self.inner, key, id)
    }

    fn key_of(&self, handle: &TypeHandle) -> Result<NodeKey> {
        if handle.belongs_to(&self.inner) {
            Ok(handle.key())
        } else {
            Err(Error::BadParameter(
                "handle belongs to another registry".into(),
            ))
        }
    }

    /// Look up or create the node for `id` and count a reference on it.
    ///
    /// Plain identifiers resolve immediately. A strongly connected component
    /// part creates the whole component.
    pub fn ref_by_id(&self, id: &TypeIdentifier) -> Result<TypeHandle> {
        let key = self.lock().ref_by_id_locked(id)?;
        Ok(self.adopt(key, id.clone()))
    }

    /// Release a handle. Same as dropping it.
    pub fn unref(&self, handle: TypeHandle) {
        drop(handle);
    }

    /// Counted handle on an existing node, without creating one.
    pub fn lookup(&self, id: &TypeIdentifier) -> Option<TypeHandle> {
        let key = {
            let mut state = self.lock();
            let key = state.lookup_key(id)?;
            state.incref(key);
            key
        };
        Some(self.adopt(key, id.clone()))
    }

    pub fn state(&self, id: &TypeIdentifier) -> Option<TypeState> {
        self.lock().lookup(id).map(|node| node.state)
    }

    /// Number of live nodes, including SCC roots.
    pub fn node_count(&self) -> usize {
        self.lock().node_count()
    }

    /// Intern a locally defined type and every object it depends on.
    ///
    /// The descriptor's objects are all verified before anything is
    /// interned, so a rejected call leaves the registry untouched.
    pub fn ref_local(&self, sertype: &dyn Sertype) -> Result<TypePair> {
        let (info, mapping) = decode_sertype(sertype)?;
        let pair = self.intern_mapping(&mapping, info.minimal_id(), info.complete_id())?;
        log::debug!(
            "[TypeRegistry] local type {} interned ({} objects)",
            sertype.type_name(),
            mapping.len()
        );
        Ok(pair)
    }

    /// Intern the top-level identifiers and resolve everything reachable
    /// from them using the (already verified) objects of `mapping`.
    pub(crate) fn intern_mapping(
        &self,
        mapping: &TypeMapping,
        minimal: Option<&TypeIdentifier>,
        complete: Option<&TypeIdentifier>,
    ) -> Result<TypePair> {
        let tops: Vec<&TypeIdentifier> = [minimal, complete].into_iter().flatten().collect();
        let keys = {
            let mut state = self.lock();
            let keys = intern_locked(&mut state, mapping, &tops)?;
            if let (Some(complete), Some(minimal)) = (complete, minimal) {
                state.link_counterparts(complete, minimal);
            }
            for (complete, minimal) in &mapping.identifier_complete_minimal {
                state.link_counterparts(complete, minimal);
            }
            keys
        };
        self.notify_resolved();

        let mut handles = tops
            .iter()
            .zip(keys)
            .map(|(id, key)| self.adopt(key, (*id).clone()));
        let mut pair = TypePair::default();
        if minimal.is_some() {
            pair.minimal = handles.next();
        }
        if complete.is_some() {
            pair.complete = handles.next();
        }
        Ok(pair)
    }

    /// Attach a structural object to an unresolved node.
    ///
    /// Succeeds silently when the node is already RESOLVED. On a hash
    /// mismatch the node and all its dependents become INVALID and
    /// `BadParameter` is returned.
    pub fn add_object(&self, handle: &TypeHandle, obj: TypeObject) -> Result<()> {
        let key = self.key_of(handle)?;
        let result = self.lock().add_object_locked(key, obj);
        self.notify_resolved();
        result
    }

    /// Attach all parts of a strongly connected component, in index order.
    pub fn add_scc_objects(&self, handle: &TypeHandle, objects: Vec<TypeObject>) -> Result<()> {
        let key = self.key_of(handle)?;
        let result = self.lock().add_scc_objects_locked(key, objects);
        self.notify_resolved();
        result
    }

    /// Block until the node for `id` is RESOLVED (with `include_deps`, until
    /// its whole dependency closure is) or `timeout` elapses.
    ///
    /// Returns `PreconditionNotMet` when no node exists for `id` or it is
    /// INVALID, and `Timeout` when the deadline passes first.
    pub fn wait_resolved(
        &self,
        id: &TypeIdentifier,
        timeout: Duration,
        include_deps: bool,
    ) -> Result<TypeHandle> {
        let deadline = Instant::now() + timeout;
        let mut state = self.lock();
        let mut timed_out = false;
        loop {
            let key = state.lookup_key(id).ok_or_else(|| {
                Error::PreconditionNotMet(format!("type {} not registered", id))
            })?;
            let current = if include_deps {
                state.deep_state(key)
            } else {
                state
                    .node(key)
                    .map(|node| node.state)
                    .unwrap_or(TypeState::Invalid)
            };
            match current {
                TypeState::Resolved => {
                    state.incref(key);
                    drop(state);
                    return Ok(self.adopt(key, id.clone()));
                }
                TypeState::Invalid => {
                    return Err(Error::PreconditionNotMet(format!("type {} is INVALID", id)))
                }
                _ if timed_out => return Err(Error::Timeout),
                _ => {}
            }
            timed_out = self
                .inner
                .resolved
                .wait_until(&mut state, deadline)
                .timed_out();
        }
    }

    /// Remote endpoints to re-match after `handle`'s type resolved, sorted.
    pub fn gpe_matches(&self, handle: &TypeHandle) -> Vec<Guid> {
        match self.key_of(handle) {
            Ok(key) => self.lock().gpe_matches(key),
            Err(_) => Vec::new(),
        }
    }

    /// Record that remote endpoint `guid` waits on this type.
    pub fn register_endpoint(&self, handle: &TypeHandle, guid: Guid) -> Result<()> {
        let key = self.key_of(handle)?;
        let mut state = self.lock();
        let node = state
            .node_mut(key)
            .ok_or_else(|| Error::PreconditionNotMet("unknown type node".into()))?;
        node.endpoints.insert(guid);
        Ok(())
    }

    pub fn unregister_endpoint(&self, handle: &TypeHandle, guid: Guid) -> Result<()> {
        let key = self.key_of(handle)?;
        let mut state = self.lock();
        let node = state
            .node_mut(key)
            .ok_or_else(|| Error::PreconditionNotMet("unknown type node".into()))?;
        node.endpoints.remove(&guid);
        Ok(())
    }

    /// Structural object of a RESOLVED node.
    pub fn type_object(&self, id: &TypeIdentifier) -> Option<TypeObject> {
        let state = self.lock();
        let node = state.lookup(id)?;
        if node.state != TypeState::Resolved {
            return None;
        }
        node.object.clone()
    }

    /// COMPLETE name of the type, when known.
    pub fn type_name(&self, handle: &TypeHandle) -> Option<String> {
        let key = self.key_of(handle).ok()?;
        self.lock().type_name(key)
    }

    /// Identifiers still UNRESOLVED in the closure of `handle`; REQUESTED
    /// ones are left out.
    pub fn unresolved_ids(&self, handle: &TypeHandle) -> Vec<TypeIdentifier> {
        match self.key_of(handle) {
            Ok(key) => self.lock().pending_ids(key, false),
            Err(_) => Vec::new(),
        }
    }

    /// Can data of `writer`'s type be received as `reader`'s type.
    pub fn is_assignable_from(
        &self,
        reader: &TypeHandle,
        writer: &TypeHandle,
        opts: &TypeConsistencyEnforcement,
    ) -> bool {
        if self.key_of(reader).is_err() || self.key_of(writer).is_err() {
            return false;
        }
        let state = self.lock();
        matcher::is_assignable_from(&*state, reader.id(), writer.id(), opts)
    }

    pub(crate) fn match_handles(
        &self,
        reader: &TypeHandle,
        writer: &TypeHandle,
        opts: &TypeConsistencyEnforcement,
    ) -> TypeMatch {
        let (Ok(r_key), Ok(w_key)) = (self.key_of(reader), self.key_of(writer)) else {
            return TypeMatch::NotMatched;
        };
        let state = self.lock();
        if state.deep_state(r_key) == TypeState::Invalid
            || state.deep_state(w_key) == TypeState::Invalid
        {
            return TypeMatch::NotMatched;
        }
        let mut pending = state.pending_ids(r_key, true);
        for id in state.pending_ids(w_key, true) {
            if !pending.contains(&id) {
                pending.push(id);
            }
        }
        if !pending.is_empty() {
            return TypeMatch::Pending(pending);
        }
        if matcher::is_assignable_from(&*state, reader.id(), writer.id(), opts) {
            TypeMatch::Matched
        } else {
            TypeMatch::NotMatched
        }
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("domain_id", &self.inner.domain_id)
            .field("nodes", &self.node_count())
            .finish()
    }
}

/// Count one reference per top-level identifier and attach every object of
/// `mapping` reachable from them. On error all references taken here are
/// released again.
fn intern_locked(
    state: &mut RegistryState,
    mapping: &TypeMapping,
    tops: &[&TypeIdentifier],
) -> Result<Vec<NodeKey>> {
    let mut keys = Vec::with_capacity(tops.len());
    for top in tops {
        match state.ref_by_id_locked(top) {
            Ok(key) => keys.push(key),
            Err(e) => {
                for key in keys {
                    state.unref_locked(key);
                }
                return Err(e);
            }
        }
    }
    if let Err(e) = resolve_from_mapping(state, mapping, tops) {
        for key in keys {
            state.unref_locked(key);
        }
        return Err(e);
    }
    Ok(keys)
}

fn resolve_from_mapping(
    state: &mut RegistryState,
    mapping: &TypeMapping,
    tops: &[&TypeIdentifier],
) -> Result<()> {
    let mut queue: VecDeque<TypeIdentifier> = tops.iter().map(|id| (*id).clone()).collect();
    let mut seen = HashSet::new();
    while let Some(id) = queue.pop_front() {
        if !seen.insert(id.clone()) {
            continue;
        }
        let Some(key) = state.lookup_key(&id) else {
            continue;
        };
        let pending = state
            .node(key)
            .map(|node| node.state.is_pending())
            .unwrap_or(false);
        if pending {
            match &id {
                TypeIdentifier::StronglyConnected(scc) => {
                    if let Some(objects) = scc_objects_from(mapping, scc) {
                        let root = state.counted_key(key);
                        state.attach_scc_locked(root, objects)?;
                    }
                }
                _ => {
                    if let Some(obj) = mapping.object(&id) {
                        state.attach_object_locked(key, obj.clone())?;
                    }
                }
            }
        }
        for member in state.closure(key) {
            if let Some(node) = state.node(member) {
                queue.push_back(node.id.clone());
            }
        }
    }
    Ok(())
}
