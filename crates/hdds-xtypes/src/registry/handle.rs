// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Counted handles on registry nodes.
//!
//! A `TypeHandle` owns one reference on its node. Cloning counts another;
//! dropping releases it, which frees the node (and cascades through its
//! dependencies) when it was the last one. Handles keep only a weak link
//! to the registry, so a handle outliving its domain is inert.

use super::node::{NodeKey, TypeState};
use super::RegistryInner;
use crate::xtypes::TypeIdentifier;
use std::sync::{Arc, Weak};

pub struct TypeHandle {
    registry: Weak<RegistryInner>,
    key: NodeKey,
    id: TypeIdentifier,
}

impl TypeHandle {
    /// Wrap a reference already counted under the registry lock.
    pub(crate) fn adopt(registry: &Arc<RegistryInner>, key: NodeKey, id: TypeIdentifier) -> Self {
        Self {
            registry: Arc::downgrade(registry),
            key,
            id,
        }
    }

    pub fn id(&self) -> &TypeIdentifier {
        &self.id
    }

    pub(crate) fn key(&self) -> NodeKey {
        self.key
    }

    pub(crate) fn belongs_to(&self, registry: &Arc<RegistryInner>) -> bool {
        std::ptr::eq(self.registry.as_ptr(), Arc::as_ptr(registry))
    }

    /// Current state, `None` once the registry is gone.
    pub fn state(&self) -> Option<TypeState> {
        let registry = self.registry.upgrade()?;
        let state = registry.state.lock();
        state.node(self.key).map(|node| node.state)
    }

    /// References counted on the node (on the component root for SCC parts).
    pub fn refcount(&self) -> u32 {
        match self.registry.upgrade() {
            Some(registry) => registry.state.lock().refcount(self.key),
            None => 0,
        }
    }
}

impl Clone for TypeHandle {
    fn clone(&self) -> Self {
        if let Some(registry) = self.registry.upgrade() {
            registry.state.lock().incref(self.key);
        }
        Self {
            registry: self.registry.clone(),
            key: self.key,
            id: self.id.clone(),
        }
    }
}

impl Drop for TypeHandle {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.state.lock().unref_locked(self.key);
        }
    }
}

impl PartialEq for TypeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key && Weak::ptr_eq(&self.registry, &other.registry)
    }
}

impl Eq for TypeHandle {}

impl std::fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeHandle")
            .field("key", &self.key)
            .field("id", &self.id)
            .finish()
    }
}

/// Minimal and complete handles for one type. Either side may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypePair {
    pub minimal: Option<TypeHandle>,
    pub complete: Option<TypeHandle>,
}

impl TypePair {
    pub fn is_empty(&self) -> bool {
        self.minimal.is_none() && self.complete.is_none()
    }

    /// Handle used for matching: minimal when present.
    pub fn preferred(&self) -> Option<&TypeHandle> {
        self.minimal.as_ref().or(self.complete.as_ref())
    }
}
