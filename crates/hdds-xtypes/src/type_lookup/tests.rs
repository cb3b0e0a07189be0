// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::config::RegistryConfig;
use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::registry::{TypeHandle, TypeRegistry, TypeState};
use crate::xtypes::{
    CompleteMemberDetail, CompleteTypeDetail, EquivalenceHash, Extensibility, MemberFlag,
    StructMember, StructType, TypeBody, TypeFlag, TypeIdentifier, TypeKind, TypeObject,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<TypeLookupRequest>>,
    fail: AtomicBool,
}

impl TypeLookupTransport for RecordingTransport {
    fn send_request(&self, request: &TypeLookupRequest) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::OutOfResources("link down".into()));
        }
        self.sent.lock().push(request.clone());
        Ok(())
    }
}

impl RecordingTransport {
    fn last(&self) -> TypeLookupRequest {
        self.sent.lock().last().cloned().expect("a request was sent")
    }
}

/// Answers each request before `send_request` returns.
struct InlineTransport {
    server: TypeLookupService,
    client: Mutex<Weak<TypeLookupService>>,
}

impl TypeLookupTransport for InlineTransport {
    fn send_request(&self, request: &TypeLookupRequest) -> Result<()> {
        let reply = self.server.handle_request(request);
        // Release the lock before delivering: follow-up requests re-enter.
        let client = self.client.lock().upgrade();
        if let Some(client) = client {
            client.handle_reply(&reply);
        }
        Ok(())
    }
}

fn struct_obj(name: &str, members: &[(u32, &str, TypeIdentifier)]) -> TypeObject {
    TypeObject::Complete(TypeBody::Struct(StructType {
        struct_flags: TypeFlag::empty().with_extensibility(Extensibility::Appendable),
        base_type: None,
        detail: CompleteTypeDetail::named(name),
        member_seq: members
            .iter()
            .map(|(id, member, ty)| StructMember {
                member_id: *id,
                member_flags: MemberFlag::empty(),
                member_type_id: ty.clone(),
                detail: CompleteMemberDetail::named(*member),
            })
            .collect(),
    }))
}

fn int32() -> TypeIdentifier {
    TypeIdentifier::primitive(TypeKind::TK_INT32)
}

struct Fixture {
    server_registry: TypeRegistry,
    server: TypeLookupService,
    client_registry: TypeRegistry,
    client: TypeLookupService,
    transport: Arc<RecordingTransport>,
    _server_handles: Vec<TypeHandle>,
    inner_id: TypeIdentifier,
    outer_id: TypeIdentifier,
}

/// Server knows `Outer { Inner inner; }` and `Inner { int32 x; }`.
fn fixture(config: RegistryConfig) -> Fixture {
    let inner = struct_obj("Inner", &[(0, "x", int32())]);
    let inner_id = inner.type_identifier();
    let outer = struct_obj("Outer", &[(0, "inner", inner_id.clone())]);
    let outer_id = outer.type_identifier();

    let server_registry = TypeRegistry::new(0, RegistryConfig::default());
    let h_inner = server_registry.ref_by_id(&inner_id).expect("inner");
    server_registry.add_object(&h_inner, inner).expect("inner object");
    let h_outer = server_registry.ref_by_id(&outer_id).expect("outer");
    server_registry.add_object(&h_outer, outer).expect("outer object");

    let transport = Arc::new(RecordingTransport::default());
    let client_registry = TypeRegistry::new(0, config);
    Fixture {
        server: TypeLookupService::new(server_registry.clone(), [2; 12], transport.clone()),
        server_registry,
        client: TypeLookupService::new(client_registry.clone(), [1; 12], transport.clone()),
        client_registry,
        transport,
        _server_handles: vec![h_inner, h_outer],
        inner_id,
        outer_id,
    }
}

#[test]
fn test_request_reply_resolves_closure() {
    let f = fixture(RegistryConfig::default());
    assert_eq!(
        f.server_registry.state(&f.outer_id),
        Some(TypeState::Resolved)
    );
    let handle = f.client_registry.ref_by_id(&f.outer_id).expect("ref");
    let seqs = f.client.request(&handle).expect("request");
    assert_eq!(seqs.len(), 1);
    assert_eq!(
        f.client_registry.state(&f.outer_id),
        Some(TypeState::Requested)
    );
    // Already REQUESTED: suppressed.
    assert!(f.client.request(&handle).expect("again").is_empty());

    let request = f.transport.last();
    assert_eq!(request.writer_id, f.client.writer_id());
    assert_eq!(request.type_ids, vec![f.outer_id.clone()]);

    let reply = f.server.handle_request(&request);
    assert_eq!(reply.seq_no, request.seq_no);
    assert_eq!(f.client.handle_reply(&reply), 1);
    assert_eq!(
        f.client_registry.state(&f.outer_id),
        Some(TypeState::Resolved)
    );

    // The dependency was discovered and requested in turn.
    let follow_up = f.transport.last();
    assert_ne!(follow_up.seq_no, request.seq_no);
    assert_eq!(follow_up.type_ids, vec![f.inner_id.clone()]);
    let reply = f.server.handle_request(&follow_up);
    assert_eq!(f.client.handle_reply(&reply), 1);
    assert!(f.client_registry.unresolved_ids(&handle).is_empty());
    assert_eq!(f.client.outstanding_requests(), 0);
}

#[test]
fn test_hash_mismatch_stays_requested() {
    let f = fixture(RegistryConfig::default());
    let rematched = Arc::new(AtomicBool::new(false));
    let flag = rematched.clone();
    let client = TypeLookupService::new(f.client_registry.clone(), [1; 12], f.transport.clone())
        .with_rematch(Box::new(move |_| flag.store(true, Ordering::SeqCst)));

    let handle = f.client_registry.ref_by_id(&f.inner_id).expect("ref");
    f.client_registry
        .register_endpoint(&handle, Guid::new([9; 12], [0, 0, 0, 7]))
        .expect("endpoint");
    client.request(&handle).expect("request");
    let request = f.transport.last();

    let wrong = struct_obj("Inner", &[(0, "y", int32())]);
    let reply = TypeLookupReply {
        writer_id: request.writer_id,
        seq_no: request.seq_no,
        types: vec![(f.inner_id.clone(), wrong)],
    };
    assert_eq!(client.handle_reply(&reply), 0);
    assert_eq!(
        f.client_registry.state(&f.inner_id),
        Some(TypeState::Requested)
    );
    assert!(!rematched.load(Ordering::SeqCst));
}

#[test]
fn test_unrequested_and_misaddressed_replies_dropped() {
    let f = fixture(RegistryConfig::default());
    let handle = f.client_registry.ref_by_id(&f.inner_id).expect("ref");
    let reply = f.server.handle_request(&TypeLookupRequest {
        writer_id: f.client.writer_id(),
        seq_no: 40,
        type_ids: vec![f.inner_id.clone()],
    });
    assert_eq!(reply.types.len(), 1);
    // Node is UNRESOLVED, nobody asked.
    assert_eq!(f.client.handle_reply(&reply), 0);
    assert_eq!(
        f.client_registry.state(&f.inner_id),
        Some(TypeState::Unresolved)
    );

    f.client.request(&handle).expect("request");
    let other = TypeLookupReply {
        writer_id: Guid::new([7; 12], Guid::ENTITYID_TL_SVC_REQ_WRITER),
        ..reply
    };
    assert_eq!(f.client.handle_reply(&other), 0);
    assert_eq!(
        f.client_registry.state(&f.inner_id),
        Some(TypeState::Requested)
    );
}

#[test]
fn test_transport_failure_reverts() {
    let f = fixture(RegistryConfig::default());
    let handle = f.client_registry.ref_by_id(&f.outer_id).expect("ref");
    f.transport.fail.store(true, Ordering::SeqCst);
    assert!(matches!(
        f.client.request(&handle),
        Err(Error::OutOfResources(_))
    ));
    assert_eq!(
        f.client_registry.state(&f.outer_id),
        Some(TypeState::Unresolved)
    );
    f.transport.fail.store(false, Ordering::SeqCst);
    assert_eq!(f.client.request(&handle).expect("retry").len(), 1);
}

#[test]
fn test_rematch_after_resolution() {
    let f = fixture(RegistryConfig::default());
    let seen: Arc<Mutex<Vec<Guid>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let client = TypeLookupService::new(f.client_registry.clone(), [1; 12], f.transport.clone())
        .with_rematch(Box::new(move |guids| sink.lock().extend_from_slice(guids)));

    let reader = Guid::new([9; 12], [0, 0, 0, 7]);
    let handle = f.client_registry.ref_by_id(&f.outer_id).expect("ref");
    f.client_registry
        .register_endpoint(&handle, reader)
        .expect("endpoint");
    client.request(&handle).expect("request");
    let reply = f.server.handle_request(&f.transport.last());
    client.handle_reply(&reply);
    let reply = f.server.handle_request(&f.transport.last());
    client.handle_reply(&reply);

    assert_eq!(*seen.lock(), vec![reader, reader]);
}

#[test]
fn test_resend_keeps_sequence_number() {
    let config = RegistryConfig {
        request_retry_interval: Duration::ZERO,
        ..RegistryConfig::default()
    };
    let f = fixture(config);
    let handle = f.client_registry.ref_by_id(&f.outer_id).expect("ref");
    f.client.request(&handle).expect("request");
    let first = f.transport.last();

    assert_eq!(f.client.resend_pending().expect("resend"), 1);
    let again = f.transport.last();
    assert_eq!(again.seq_no, first.seq_no);
    assert_eq!(again.type_ids, first.type_ids);

    let reply = f.server.handle_request(&again);
    f.client.handle_reply(&reply);
    // Answered; only the follow-up for the dependency is left.
    f.client.resend_pending().expect("resend");
    assert_eq!(f.transport.last().type_ids, vec![f.inner_id.clone()]);
}

#[test]
fn test_request_batches() {
    let config = RegistryConfig {
        max_request_batch: 1,
        ..RegistryConfig::default()
    };
    let f = fixture(config);
    let a = f.client_registry.ref_by_id(&f.outer_id).expect("outer");
    let b = f.client_registry.ref_by_id(&f.inner_id).expect("inner");
    let wrapper = struct_obj(
        "Wrapper",
        &[(0, "a", f.outer_id.clone()), (1, "b", f.inner_id.clone())],
    );
    let w = f
        .client_registry
        .ref_by_id(&wrapper.type_identifier())
        .expect("wrapper");
    f.client_registry.add_object(&w, wrapper).expect("local");
    assert_eq!(f.client.request(&w).expect("request").len(), 2);
    drop((a, b));
}

#[test]
fn test_resolve_blocks_until_reply() {
    let f = fixture(RegistryConfig::default());
    assert!(matches!(
        f.client.resolve(&f.inner_id, Some(Duration::from_millis(20))),
        Err(Error::Timeout)
    ));

    let client = Arc::new(f.client);
    let waiter = {
        let client = client.clone();
        let id = f.outer_id.clone();
        std::thread::spawn(move || client.resolve(&id, Some(Duration::from_secs(5))))
    };
    // Answer requests until the waiter is satisfied.
    let mut answered = 0;
    while !waiter.is_finished() && answered < 100 {
        let pending: Vec<TypeLookupRequest> = f.transport.sent.lock().drain(..).collect();
        for request in pending {
            client.handle_reply(&f.server.handle_request(&request));
        }
        answered += 1;
        std::thread::sleep(Duration::from_millis(10));
    }
    let handle = waiter.join().expect("waiter").expect("resolved");
    assert_eq!(handle.id(), &f.outer_id);
    assert_eq!(handle.state(), Some(TypeState::Resolved));
}

#[test]
fn test_plain_identifier_needs_no_lookup() {
    let f = fixture(RegistryConfig::default());
    let id = TypeIdentifier::sequence(int32(), 4);
    let handle = f.client.resolve(&id, None).expect("plain");
    assert_eq!(handle.state(), Some(TypeState::Resolved));
    assert!(f.transport.sent.lock().is_empty());
}

#[test]
fn test_reply_during_send_clears_outstanding() {
    let f = fixture(RegistryConfig::default());
    let inline = Arc::new(InlineTransport {
        server: f.server,
        client: Mutex::new(Weak::new()),
    });
    let client = Arc::new(TypeLookupService::new(
        f.client_registry.clone(),
        [3; 12],
        inline.clone(),
    ));
    *inline.client.lock() = Arc::downgrade(&client);

    let handle = f.client_registry.ref_by_id(&f.outer_id).expect("ref");
    assert_eq!(client.request(&handle).expect("request").len(), 1);
    assert!(f.client_registry.unresolved_ids(&handle).is_empty());
    assert_eq!(
        f.client_registry.state(&f.inner_id),
        Some(TypeState::Resolved)
    );
    assert_eq!(client.outstanding_requests(), 0);
}

#[test]
fn test_suppressed_request_consumes_no_sequence_number() {
    let f = fixture(RegistryConfig::default());
    let handle = f.client_registry.ref_by_id(&f.outer_id).expect("ref");
    let first = f.client.request(&handle).expect("request");
    assert!(f.client.request(&handle).expect("suppressed").is_empty());

    let unknown = TypeIdentifier::Complete(EquivalenceHash::from_bytes([3; 14]));
    let other = f.client_registry.ref_by_id(&unknown).expect("unknown");
    let second = f.client.request(&other).expect("request unknown");
    assert_eq!(second, vec![first[0] + 1]);
    assert_eq!(f.client.outstanding_requests(), 2);
}
