// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::xtypes::{
    EquivalenceHash, MinimalForm, MinimalMemberDetail, MinimalTypeDetail, SequenceType,
    CollectionElement,
};

#[test]
fn test_primitives_match_by_kind() {
    let graph = TypeMapping::new();
    assert!(assignable(&graph, &int32(), &int32()));
    assert!(!assignable(&graph, &int32(), &int16()));
    assert!(!assignable(
        &graph,
        &TypeIdentifier::primitive(TypeKind::TK_UINT32),
        &int32()
    ));
}

#[test]
fn test_string_bounds_ignored_by_default() {
    let graph = TypeMapping::new();
    assert!(assignable(
        &graph,
        &TypeIdentifier::string8(10),
        &TypeIdentifier::string8(300)
    ));
    assert!(!assignable(
        &graph,
        &TypeIdentifier::string8(10),
        &TypeIdentifier::string16(10)
    ));
}

#[test]
fn test_string_bounds_enforced_on_request() {
    let graph = TypeMapping::new();
    let opts = TypeConsistencyEnforcement::default().with_ignore_string_bounds(false);
    let check = |r: u32, w: u32| {
        is_assignable_from(
            &graph,
            &TypeIdentifier::string8(r),
            &TypeIdentifier::string8(w),
            &opts,
        )
    };
    assert!(!check(10, 20));
    assert!(check(20, 10));
    assert!(check(0, 20));
    assert!(!check(20, 0));
}

#[test]
fn test_sequence_element_must_match() {
    let graph = TypeMapping::new();
    let r = TypeIdentifier::sequence(int32(), 0);
    assert!(assignable(&graph, &r, &TypeIdentifier::sequence(int32(), 5)));
    assert!(!assignable(&graph, &r, &TypeIdentifier::sequence(int16(), 0)));

    let opts = TypeConsistencyEnforcement::default().with_ignore_sequence_bounds(false);
    assert!(!is_assignable_from(
        &graph,
        &TypeIdentifier::sequence(int32(), 5),
        &TypeIdentifier::sequence(int32(), 6),
        &opts
    ));
}

#[test]
fn test_array_dimensions_must_be_equal() {
    let graph = TypeMapping::new();
    let a = TypeIdentifier::array(int32(), &[3, 4]);
    assert!(assignable(&graph, &a, &TypeIdentifier::array(int32(), &[3, 4])));
    assert!(!assignable(&graph, &a, &TypeIdentifier::array(int32(), &[4, 3])));
    assert!(!assignable(&graph, &a, &TypeIdentifier::array(int32(), &[3])));
}

#[test]
fn test_map_key_and_element() {
    let graph = TypeMapping::new();
    let m = TypeIdentifier::map(TypeIdentifier::string8(0), int32(), 0);
    assert!(assignable(
        &graph,
        &m,
        &TypeIdentifier::map(TypeIdentifier::string8(16), int32(), 0)
    ));
    assert!(!assignable(
        &graph,
        &m,
        &TypeIdentifier::map(int32(), int32(), 0)
    ));
}

#[test]
fn test_alias_is_transparent() {
    let mut graph = TypeMapping::new();
    let alias = add(&mut graph, alias_type("Meters", int32()));
    let alias2 = add(&mut graph, alias_type("Distance", alias.clone()));
    assert!(assignable(&graph, &alias2, &int32()));
    assert!(assignable(&graph, &int32(), &alias));
    assert!(!assignable(&graph, &alias2, &int16()));
}

#[test]
fn test_sequence_object_matches_plain_sequence() {
    let mut graph = TypeMapping::new();
    let seq = add(
        &mut graph,
        TypeObject::Complete(TypeBody::Sequence(SequenceType {
            collection_flag: TypeFlag::empty(),
            detail: CompleteTypeDetail::default(),
            bound: 0,
            element: CollectionElement::of(int32()),
        })),
    );
    assert!(assignable(&graph, &TypeIdentifier::sequence(int32(), 0), &seq));
}

#[test]
fn test_bitmask_rules() {
    let mut graph = TypeMapping::new();
    let flags12 = add(&mut graph, bitmask_type("Flags", 12));
    let other12 = add(&mut graph, bitmask_type("Other", 12));
    let flags20 = add(&mut graph, bitmask_type("Wide", 20));
    let uint16 = TypeIdentifier::primitive(TypeKind::TK_UINT16);

    assert!(assignable(&graph, &flags12, &other12));
    assert!(!assignable(&graph, &flags12, &flags20));
    assert!(assignable(&graph, &flags12, &uint16));
    assert!(assignable(&graph, &uint16, &flags12));
    assert!(!assignable(&graph, &flags20, &uint16));
    assert!(!assignable(
        &graph,
        &flags12,
        &TypeIdentifier::primitive(TypeKind::TK_INT16)
    ));
}

#[test]
fn test_unknown_hash_is_not_assignable() {
    let graph = TypeMapping::new();
    let ghost = TypeIdentifier::Complete(EquivalenceHash::from_bytes([7; 14]));
    assert!(!assignable(&graph, &ghost, &int32()));
    assert!(assignable(&graph, &ghost, &ghost));
}

#[test]
fn test_minimal_and_complete_never_mix() {
    let mut graph = TypeMapping::new();
    let complete = add_struct(
        &mut graph,
        struct_type("S", Extensibility::Appendable, vec![member(0, "a", int32())]),
    );
    let minimal = add(
        &mut graph,
        TypeObject::Minimal(TypeBody::Struct(StructType::<MinimalForm> {
            struct_flags: TypeFlag::IS_APPENDABLE,
            base_type: None,
            detail: MinimalTypeDetail,
            member_seq: vec![StructMember {
                member_id: 0,
                member_flags: MemberFlag::empty(),
                member_type_id: int32(),
                detail: MinimalMemberDetail::for_name("a"),
            }],
        })),
    );
    assert!(assignable(&graph, &minimal, &minimal));
    assert!(!assignable(&graph, &complete, &minimal));
    assert!(!is_strongly_assignable(
        &graph,
        &minimal,
        &complete,
        &TypeConsistencyEnforcement::default()
    ));
}

#[test]
fn test_delimited_types() {
    let mut graph = TypeMapping::new();
    let final_flat = add_struct(
        &mut graph,
        struct_type("F", Extensibility::Final, vec![member(0, "a", int32())]),
    );
    let ghost = TypeIdentifier::Complete(EquivalenceHash::from_bytes([9; 14]));
    let final_nested = add_struct(
        &mut graph,
        struct_type("G", Extensibility::Final, vec![member(0, "g", ghost.clone())]),
    );
    let mutable_nested = add_struct(
        &mut graph,
        struct_type("M", Extensibility::Mutable, vec![member(0, "g", ghost.clone())]),
    );

    assert!(is_delimited(&graph, &int32()));
    assert!(is_delimited(&graph, &TypeIdentifier::sequence(final_flat.clone(), 0)));
    assert!(is_delimited(&graph, &final_flat));
    assert!(!is_delimited(&graph, &ghost));
    assert!(!is_delimited(&graph, &final_nested));
    assert!(is_delimited(&graph, &mutable_nested));
}
