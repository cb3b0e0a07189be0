// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![cfg(all(feature = "type-lookup", feature = "dynamic-types"))]
#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure
#![allow(clippy::too_many_lines)] // Test code

//! TypeLookup between two participants, with every request and reply
//! passing through its wire encoding.

use hdds_xtypes::dynamic::{DynamicType, MemberDescriptor};
use hdds_xtypes::type_lookup::{
    TypeLookupReply, TypeLookupRequest, TypeLookupService, TypeLookupTransport,
};
use hdds_xtypes::xtypes::{
    scc_component_hash, EquivalenceKind, Extensibility, MemberFlag, MinimalMemberDetail,
    MinimalTypeDetail, SccId, StructMember, StructType, TypeBody, TypeIdentifier,
    TypeInformation, TypeKind, TypeObject, TypeObjectHashId,
};
use hdds_xtypes::{
    check_type_match, Guid, RegistryConfig, Result, Sertype, TypeConsistencyEnforcement,
    TypeHandle, TypeMatch, TypePair, TypeRegistry, TypeState,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Queues encoded request samples until the test delivers them.
#[derive(Default)]
struct Loopback {
    wire: Mutex<VecDeque<Vec<u8>>>,
}

impl TypeLookupTransport for Loopback {
    fn send_request(&self, request: &TypeLookupRequest) -> Result<()> {
        self.wire.lock().push_back(request.to_bytes());
        Ok(())
    }
}

struct Participants {
    server_registry: TypeRegistry,
    server: TypeLookupService,
    client_registry: TypeRegistry,
    client: TypeLookupService,
    wire: Arc<Loopback>,
}

impl Participants {
    fn new() -> Self {
        let wire = Arc::new(Loopback::default());
        let server_registry = TypeRegistry::new(0, RegistryConfig::default());
        let client_registry = TypeRegistry::new(0, RegistryConfig::default());
        Self {
            server: TypeLookupService::new(server_registry.clone(), [0xAA; 12], wire.clone()),
            server_registry,
            client: TypeLookupService::new(client_registry.clone(), [0xBB; 12], wire.clone()),
            client_registry,
            wire,
        }
    }

    /// Deliver queued requests and their replies until the wire is idle.
    /// Returns the number of round trips.
    fn pump(&self) -> usize {
        let mut trips = 0;
        loop {
            let next = self.wire.wire.lock().pop_front();
            let Some(bytes) = next else {
                return trips;
            };
            let request = TypeLookupRequest::from_bytes(&bytes).expect("request decodes");
            let reply = self.server.handle_request(&request).to_bytes();
            let reply = TypeLookupReply::from_bytes(&reply).expect("reply decodes");
            self.client.handle_reply(&reply);
            trips += 1;
        }
    }
}

/// `Telemetry { Header header; sequence<Reading> readings; }` with nested
/// structs, built on `registry`.
fn telemetry(registry: &TypeRegistry) -> DynamicType {
    let header = DynamicType::create_struct(registry, "telemetry::Header");
    header
        .add_member(MemberDescriptor::new("stamp", TypeKind::TK_UINT64))
        .expect("stamp");
    let source = DynamicType::create_string(registry, 32);
    header
        .add_member(MemberDescriptor::new("source", &source))
        .expect("source");

    let unit = DynamicType::create_enum(registry, "telemetry::Unit");
    unit.add_literal("CELSIUS", None).expect("celsius");
    unit.add_literal("KELVIN", None).expect("kelvin");

    let reading = DynamicType::create_struct(registry, "telemetry::Reading");
    reading
        .add_member(MemberDescriptor::new("value", TypeKind::TK_FLOAT64))
        .expect("value");
    reading
        .add_member(MemberDescriptor::new("unit", &unit))
        .expect("unit");

    let readings = DynamicType::create_sequence(registry, &reading, 0).expect("sequence");
    let sample = DynamicType::create_struct(registry, "telemetry::Sample");
    sample.set_extensibility(Extensibility::Mutable).expect("mutable");
    let id = sample
        .add_member(MemberDescriptor::new("header", &header))
        .expect("header");
    sample.set_key(id, true).expect("key");
    sample
        .add_member(MemberDescriptor::new("readings", &readings))
        .expect("readings");
    sample
}

/// What discovery would carry: the writer's type information.
fn announced(ty: &DynamicType) -> TypeInformation {
    let bytes = ty.type_information().expect("completed type");
    TypeInformation::from_cdr2_bytes(&bytes).expect("type information decodes")
}

#[test]
fn test_remote_type_resolved_and_matched() {
    let p = Participants::new();
    let writer_type = telemetry(&p.server_registry);
    let _server_pair = writer_type.register().expect("server registers");

    let info = announced(&writer_type);
    let minimal_id = info.minimal_id().expect("minimal").clone();
    let remote = p.client_registry.ref_by_id(&minimal_id).expect("remote ref");
    let writer_guid = Guid::new([0xAA; 12], [0, 0, 0x12, 0x03]);
    p.client_registry
        .register_endpoint(&remote, writer_guid)
        .expect("endpoint");

    let local_type = telemetry(&p.client_registry);
    let reader_pair = local_type.register().expect("client registers");
    let writer_pair = TypePair {
        minimal: Some(remote.clone()),
        complete: None,
    };
    let opts = TypeConsistencyEnforcement::default();

    // Registering the same definition locally resolved the remote node.
    assert_eq!(remote.state(), Some(TypeState::Resolved));
    let first = check_type_match(&p.client_registry, &reader_pair, &writer_pair, &opts);
    assert_eq!(first, TypeMatch::Matched);
    drop(reader_pair);
    drop(local_type);

    assert!(p.client.request(&remote).expect("request").is_empty());
    assert!(p.wire.wire.lock().is_empty());
    assert_eq!(remote.state(), Some(TypeState::Resolved));
}

#[test]
fn test_unknown_type_closure_fetched_over_the_wire() {
    let p = Participants::new();
    let writer_type = telemetry(&p.server_registry);
    let _server_pair = writer_type.register().expect("server registers");
    let info = announced(&writer_type);
    let minimal_id = info.minimal_id().expect("minimal").clone();

    let remote: TypeHandle = p.client_registry.ref_by_id(&minimal_id).expect("remote ref");
    assert_eq!(remote.state(), Some(TypeState::Unresolved));
    let sent = p.client.request(&remote).expect("request");
    assert_eq!(sent.len(), 1);
    assert_eq!(remote.state(), Some(TypeState::Requested));

    // Sample first, then Header and Reading, then Unit.
    let trips = p.pump();
    assert!(trips >= 2, "dependencies fetched in follow-up requests");
    assert!(p.client_registry.unresolved_ids(&remote).is_empty());
    assert_eq!(p.client.outstanding_requests(), 0);
    assert_eq!(
        p.client_registry.type_object(&minimal_id),
        p.server_registry.type_object(&minimal_id)
    );

    // A locally built copy matches the fetched type.
    let reader_pair = telemetry(&p.client_registry).register().expect("local");
    let writer_pair = TypePair {
        minimal: Some(remote),
        complete: None,
    };
    assert_eq!(
        check_type_match(
            &p.client_registry,
            &reader_pair,
            &writer_pair,
            &TypeConsistencyEnforcement::default()
        ),
        TypeMatch::Matched
    );
}

#[test]
fn test_pending_match_until_reply_arrives() {
    let p = Participants::new();
    let writer_type = telemetry(&p.server_registry);
    let _server_pair = writer_type.register().expect("server registers");
    let minimal_id = announced(&writer_type)
        .minimal_id()
        .expect("minimal")
        .clone();

    let reader = DynamicType::create_struct(&p.client_registry, "telemetry::Other");
    reader
        .add_member(MemberDescriptor::new("x", TypeKind::TK_INT32))
        .expect("x");
    let reader_pair = reader.register().expect("reader");
    let remote = p.client_registry.ref_by_id(&minimal_id).expect("remote");
    let writer_pair = TypePair {
        minimal: Some(remote.clone()),
        complete: None,
    };
    let opts = TypeConsistencyEnforcement::default();
    assert_eq!(
        check_type_match(&p.client_registry, &reader_pair, &writer_pair, &opts),
        TypeMatch::Pending(vec![minimal_id.clone()])
    );

    p.client.request(&remote).expect("request");
    p.pump();
    // Resolved, but the two types share no member.
    assert_eq!(
        check_type_match(&p.client_registry, &reader_pair, &writer_pair, &opts),
        TypeMatch::NotMatched
    );
}

fn minimal_struct(members: &[(u32, &str, TypeIdentifier)]) -> TypeObject {
    TypeObject::Minimal(TypeBody::Struct(StructType {
        struct_flags: Extensibility::Appendable.flag(),
        base_type: None,
        detail: MinimalTypeDetail,
        member_seq: members
            .iter()
            .map(|(id, name, ty)| StructMember {
                member_id: *id,
                member_flags: MemberFlag::empty(),
                member_type_id: ty.clone(),
                detail: MinimalMemberDetail::for_name(name),
            })
            .collect(),
    }))
}

#[test]
fn test_component_sent_as_a_whole() {
    let p = Participants::new();
    let int32 = TypeIdentifier::primitive(TypeKind::TK_INT32);
    let parts = vec![
        minimal_struct(&[(0, "left", int32.clone())]),
        minimal_struct(&[(0, "right", int32)]),
    ];
    let first = SccId {
        component: TypeObjectHashId {
            kind: EquivalenceKind::Minimal,
            hash: scc_component_hash(&parts),
        },
        length: 2,
        index: 1,
    };
    let server_handle = p
        .server_registry
        .ref_by_id(&TypeIdentifier::StronglyConnected(first))
        .expect("server ref");
    p.server_registry
        .add_scc_objects(&server_handle, parts.clone())
        .expect("server attach");

    let second = TypeIdentifier::StronglyConnected(first.part(2));
    let client_handle = p.client_registry.ref_by_id(&second).expect("client ref");
    p.client.request(&client_handle).expect("request");

    let request = TypeLookupRequest::from_bytes(
        &p.wire.wire.lock().front().cloned().expect("queued"),
    )
    .expect("decodes");
    assert_eq!(
        request.type_ids,
        vec![TypeIdentifier::StronglyConnected(first)]
    );

    assert_eq!(p.pump(), 1);
    assert_eq!(client_handle.state(), Some(TypeState::Resolved));
    assert_eq!(
        p.client_registry
            .type_object(&TypeIdentifier::StronglyConnected(first)),
        Some(parts[0].clone())
    );
    assert_eq!(p.client_registry.type_object(&second), Some(parts[1].clone()));
}

#[test]
fn test_tampered_reply_leaves_type_requested() {
    let p = Participants::new();
    let writer_type = telemetry(&p.server_registry);
    let _server_pair = writer_type.register().expect("server registers");
    let minimal_id = announced(&writer_type)
        .minimal_id()
        .expect("minimal")
        .clone();

    let remote = p.client_registry.ref_by_id(&minimal_id).expect("remote");
    p.client.request(&remote).expect("request");
    let bytes = p.wire.wire.lock().pop_front().expect("queued");
    let request = TypeLookupRequest::from_bytes(&bytes).expect("decodes");

    let mut reply = p.server.handle_request(&request);
    let forged = minimal_struct(&[(0, "x", TypeIdentifier::primitive(TypeKind::TK_INT32))]);
    for (_, obj) in &mut reply.types {
        *obj = forged.clone();
    }
    let reply = TypeLookupReply::from_bytes(&reply.to_bytes()).expect("decodes");
    assert_eq!(p.client.handle_reply(&reply), 0);
    assert_eq!(remote.state(), Some(TypeState::Requested));
    assert_eq!(p.client.outstanding_requests(), 1);
}
