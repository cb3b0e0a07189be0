// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeLookup client and server sides.

use super::messages::{TypeLookupReply, TypeLookupRequest};
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::registry::{NodeKey, TypeHandle, TypeRegistry};
use crate::xtypes::{SccId, TypeIdentifier, TypeObject};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Sends requests to remote TypeLookup services.
pub trait TypeLookupTransport: Send + Sync {
    fn send_request(&self, request: &TypeLookupRequest) -> Result<()>;
}

/// Called with the remote endpoints to re-match after types resolved.
pub type RematchCallback = Box<dyn Fn(&[Guid]) + Send + Sync>;

#[derive(Debug, Clone)]
struct Outstanding {
    ids: Vec<TypeIdentifier>,
    sent_at: Instant,
}

/// TypeLookup service of one participant.
///
/// The server side answers from the local registry. The client side
/// marks unresolved nodes REQUESTED, sends requests through the
/// transport and feeds replies back into the registry.
pub struct TypeLookupService {
    registry: TypeRegistry,
    writer_id: Guid,
    transport: Arc<dyn TypeLookupTransport>,
    seq: AtomicU64,
    outstanding: Mutex<HashMap<u64, Outstanding>>,
    rematch: Option<RematchCallback>,
}

impl TypeLookupService {
    pub fn new(
        registry: TypeRegistry,
        participant_prefix: [u8; 12],
        transport: Arc<dyn TypeLookupTransport>,
    ) -> Self {
        Self {
            registry,
            writer_id: Guid::new(participant_prefix, Guid::ENTITYID_TL_SVC_REQ_WRITER),
            transport,
            seq: AtomicU64::new(0),
            outstanding: Mutex::new(HashMap::new()),
            rematch: None,
        }
    }

    pub fn with_rematch(mut self, callback: RematchCallback) -> Self {
        self.rematch = Some(callback);
        self
    }

    /// Writer id requests are sent from; replies must echo it.
    pub fn writer_id(&self) -> Guid {
        self.writer_id
    }

    /// Number of requests still waiting for a reply.
    pub fn outstanding_requests(&self) -> usize {
        self.outstanding.lock().len()
    }

    /// Answer `request` with every requested type that is RESOLVED here.
    /// A component member is answered with all parts of its component.
    pub fn handle_request(&self, request: &TypeLookupRequest) -> TypeLookupReply {
        let mut types: Vec<(TypeIdentifier, TypeObject)> = Vec::new();
        {
            let state = self.registry.lock();
            let mut components: Vec<SccId> = Vec::new();
            for id in &request.type_ids {
                match id {
                    TypeIdentifier::StronglyConnected(scc) => {
                        let root = scc.root();
                        if components.contains(&root) {
                            continue;
                        }
                        components.push(root);
                        if let Some(parts) = state.scc_objects(scc) {
                            types.extend(parts);
                        }
                    }
                    _ if id.is_hashed() => {
                        let resolved = state.lookup(id).filter(|node| {
                            node.state == crate::registry::TypeState::Resolved
                        });
                        if let Some(obj) = resolved.and_then(|node| node.object.clone()) {
                            if !types.iter().any(|(known, _)| known == id) {
                                types.push((id.clone(), obj));
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        log::debug!(
            "[TypeLookup] request #{} from {}: {} of {} types answered",
            request.seq_no,
            request.writer_id,
            types.len(),
            request.type_ids.len()
        );
        TypeLookupReply {
            writer_id: request.writer_id,
            seq_no: request.seq_no,
            types,
        }
    }

    /// Request every UNRESOLVED type in the closure of `handle`. Returns
    /// the sequence numbers of the requests sent (none when nothing is
    /// missing or everything is already requested).
    pub fn request(&self, handle: &TypeHandle) -> Result<Vec<u64>> {
        let ids = self.registry.unresolved_ids(handle);
        self.request_ids(&ids)
    }

    fn request_ids(&self, ids: &[TypeIdentifier]) -> Result<Vec<u64>> {
        let batch = self.registry.config().max_request_batch.max(1);
        let mut sent = Vec::new();
        for chunk in ids.chunks(batch) {
            // Numbered under the registry lock; a chunk with nothing left
            // to request consumes no sequence number.
            let (seq_no, marked) = {
                let mut state = self.registry.lock();
                let seq_no = self.seq.load(Ordering::Relaxed) + 1;
                let marked = state.mark_requested(chunk, seq_no);
                if !marked.is_empty() {
                    self.seq.store(seq_no, Ordering::Relaxed);
                }
                (seq_no, marked)
            };
            if marked.is_empty() {
                continue;
            }
            let request = TypeLookupRequest {
                writer_id: self.writer_id,
                seq_no,
                type_ids: marked,
            };
            // Registered before sending: the reply may arrive inside
            // `send_request`.
            self.outstanding.lock().insert(
                seq_no,
                Outstanding {
                    ids: request.type_ids.clone(),
                    sent_at: Instant::now(),
                },
            );
            if let Err(err) = self.transport.send_request(&request) {
                log::warn!("[TypeLookup] request #{} failed: {}", seq_no, err);
                self.outstanding.lock().remove(&seq_no);
                self.registry
                    .lock()
                    .revert_requested(&request.type_ids, seq_no);
                return Err(err);
            }
            log::debug!(
                "[TypeLookup] request #{} sent for {} types",
                seq_no,
                request.type_ids.len()
            );
            sent.push(seq_no);
        }
        Ok(sent)
    }

    /// Feed a reply into the registry. Returns the number of types
    /// resolved by it.
    ///
    /// Objects nobody requested, or whose hash does not match, are
    /// dropped. Newly discovered dependencies are requested, then the
    /// rematch callback is invoked once with the endpoints to re-match.
    pub fn handle_reply(&self, reply: &TypeLookupReply) -> usize {
        if reply.writer_id != self.writer_id {
            log::trace!(
                "[TypeLookup] reply #{} addressed to {}, ignored",
                reply.seq_no,
                reply.writer_id
            );
            return 0;
        }

        let mut resolved: Vec<NodeKey> = Vec::new();
        let mut follow_up: Vec<TypeIdentifier> = Vec::new();
        let mut endpoints: BTreeSet<Guid> = BTreeSet::new();
        {
            let mut state = self.registry.lock();
            let mut components: HashMap<SccId, Vec<(i32, TypeObject)>> = HashMap::new();
            for (id, obj) in &reply.types {
                match id {
                    TypeIdentifier::StronglyConnected(scc) => components
                        .entry(scc.root())
                        .or_default()
                        .push((scc.index, obj.clone())),
                    _ => match state.resolve_requested(id, obj.clone()) {
                        Ok(true) => resolved.extend(state.lookup_key(id)),
                        Ok(false) => {
                            log::debug!("[TypeLookup] reply object for {} dropped", id)
                        }
                        Err(err) => log::warn!("[TypeLookup] {} not attached: {}", id, err),
                    },
                }
            }
            for (root, mut parts) in components {
                parts.sort_by_key(|(index, _)| *index);
                let first = root.part(1);
                let objects = parts.into_iter().map(|(_, obj)| obj).collect();
                match state.resolve_requested_scc(&first, objects) {
                    Ok(true) => {
                        resolved.extend(
                            state.lookup_key(&TypeIdentifier::StronglyConnected(first)),
                        );
                    }
                    Ok(false) => log::debug!(
                        "[TypeLookup] reply component {} dropped",
                        root.component.hash
                    ),
                    Err(err) => log::warn!(
                        "[TypeLookup] component {} not attached: {}",
                        root.component.hash,
                        err
                    ),
                }
            }

            for key in &resolved {
                for id in state.pending_ids(*key, false) {
                    if !follow_up.contains(&id) {
                        follow_up.push(id);
                    }
                }
                endpoints.extend(state.gpe_matches(*key));
            }

            let mut outstanding = self.outstanding.lock();
            if let Some(entry) = outstanding.get(&reply.seq_no) {
                if state.still_requested(&entry.ids).is_empty() {
                    outstanding.remove(&reply.seq_no);
                }
            }
        }
        if resolved.is_empty() {
            return 0;
        }
        self.registry.notify_resolved();
        log::debug!(
            "[TypeLookup] reply #{} resolved {} types",
            reply.seq_no,
            resolved.len()
        );

        if !follow_up.is_empty() {
            if let Err(err) = self.request_ids(&follow_up) {
                log::warn!("[TypeLookup] follow-up request failed: {}", err);
            }
        }
        if let Some(callback) = &self.rematch {
            if !endpoints.is_empty() {
                let endpoints: Vec<Guid> = endpoints.into_iter().collect();
                callback(&endpoints);
            }
        }
        resolved.len()
    }

    /// Re-send requests unanswered for longer than the retry interval,
    /// under their original sequence numbers. Returns how many were sent.
    pub fn resend_pending(&self) -> Result<usize> {
        let interval = self.registry.config().request_retry_interval;
        let now = Instant::now();
        let mut due: Vec<(u64, Vec<TypeIdentifier>)> = Vec::new();
        {
            let state = self.registry.lock();
            let mut outstanding = self.outstanding.lock();
            outstanding.retain(|seq_no, entry| {
                let still = state.still_requested(&entry.ids);
                if still.is_empty() {
                    return false;
                }
                if now.duration_since(entry.sent_at) >= interval {
                    due.push((*seq_no, still));
                }
                true
            });
        }

        let mut sent = 0;
        for (seq_no, type_ids) in due {
            let request = TypeLookupRequest {
                writer_id: self.writer_id,
                seq_no,
                type_ids,
            };
            self.transport.send_request(&request)?;
            if let Some(entry) = self.outstanding.lock().get_mut(&seq_no) {
                entry.ids = request.type_ids;
                entry.sent_at = Instant::now();
            }
            log::debug!("[TypeLookup] request #{} re-sent", seq_no);
            sent += 1;
        }
        Ok(sent)
    }

    /// Request `id` and its dependencies, then block until all of them
    /// are RESOLVED. `None` waits for the configured resolve timeout.
    pub fn resolve(&self, id: &TypeIdentifier, timeout: Option<Duration>) -> Result<TypeHandle> {
        if id.is_fully_descriptive() {
            return self.registry.ref_by_id(id);
        }
        let handle = self.registry.ref_by_id(id)?;
        self.request(&handle)?;
        let timeout = timeout.unwrap_or(self.registry.config().resolve_timeout);
        let resolved = self.registry.wait_resolved(id, timeout, true);
        drop(handle);
        match resolved {
            Err(Error::Timeout) => {
                log::debug!("[TypeLookup] {} not resolved within {:?}", id, timeout);
                Err(Error::Timeout)
            }
            other => other,
        }
    }
}

impl std::fmt::Debug for TypeLookupService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeLookupService")
            .field("writer_id", &self.writer_id)
            .field("outstanding", &self.outstanding_requests())
            .finish()
    }
}
