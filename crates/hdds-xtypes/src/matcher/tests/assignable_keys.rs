// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;

fn uint32() -> TypeIdentifier {
    TypeIdentifier::primitive(TypeKind::TK_UINT32)
}

#[test]
fn test_key_flag_must_agree_on_matched_member() {
    let mut graph = TypeMapping::new();
    let r = add_struct(
        &mut graph,
        struct_type(
            "S",
            Extensibility::Final,
            vec![key_member(0, "a", uint32()), member(1, "b", uint32())],
        ),
    );
    let w = add_struct(
        &mut graph,
        struct_type(
            "S2",
            Extensibility::Final,
            vec![key_member(0, "a", uint32()), key_member(1, "b", uint32())],
        ),
    );
    assert!(!assignable(&graph, &r, &w));
    assert!(!assignable(&graph, &w, &r));
}

#[test]
fn test_key_missing_on_reader_side() {
    let mut graph = TypeMapping::new();
    let r = add_struct(
        &mut graph,
        struct_type(
            "R",
            Extensibility::Mutable,
            vec![member(1, "v", int32()), key_member(7, "k", int32())],
        ),
    );
    let w = add_struct(
        &mut graph,
        struct_type("W", Extensibility::Mutable, vec![member(1, "v", int32())]),
    );
    assert!(!assignable(&graph, &r, &w));
    assert!(!assignable(&graph, &w, &r));
}

#[test]
fn test_string_key_bound_always_checked() {
    let mut graph = TypeMapping::new();
    let short = add_struct(
        &mut graph,
        struct_type(
            "Short",
            Extensibility::Appendable,
            vec![key_member(0, "name", TypeIdentifier::string8(8))],
        ),
    );
    let long = add_struct(
        &mut graph,
        struct_type(
            "Long",
            Extensibility::Appendable,
            vec![key_member(0, "name", TypeIdentifier::string8(64))],
        ),
    );
    assert!(!assignable(&graph, &short, &long));
    assert!(assignable(&graph, &long, &short));
}

#[test]
fn test_enum_key_reader_may_know_more_literals() {
    let mut graph = TypeMapping::new();
    let small = add(
        &mut graph,
        enum_type("Color", Extensibility::Appendable, &[(0, "RED"), (1, "GREEN")]),
    );
    let large = add(
        &mut graph,
        enum_type(
            "Color2",
            Extensibility::Appendable,
            &[(0, "RED"), (1, "GREEN"), (2, "BLUE")],
        ),
    );
    let r = add_struct(
        &mut graph,
        struct_type("R", Extensibility::Final, vec![key_member(0, "c", large)]),
    );
    let w = add_struct(
        &mut graph,
        struct_type("W", Extensibility::Final, vec![key_member(0, "c", small)]),
    );
    assert!(assignable(&graph, &r, &w));
    assert!(!assignable(&graph, &w, &r));
}

#[test]
fn test_nested_key_struct_uses_key_holder() {
    // Inner types have no keys, so every member counts as a key inside
    // the key holder: the writer's extra member is then a missing key.
    let mut graph = TypeMapping::new();
    let inner_r = add_struct(
        &mut graph,
        struct_type("InnerR", Extensibility::Appendable, vec![member(0, "x", int32())]),
    );
    let inner_w = add_struct(
        &mut graph,
        struct_type(
            "InnerW",
            Extensibility::Appendable,
            vec![member(0, "x", int32()), member(1, "y", int32())],
        ),
    );
    assert!(assignable(&graph, &inner_r, &inner_w));

    let r = add_struct(
        &mut graph,
        struct_type("R", Extensibility::Appendable, vec![key_member(0, "id", inner_r.clone())]),
    );
    let w = add_struct(
        &mut graph,
        struct_type("W", Extensibility::Appendable, vec![key_member(0, "id", inner_w.clone())]),
    );
    assert!(!assignable(&graph, &r, &w));

    // As a plain member the same pair is fine.
    let r = add_struct(
        &mut graph,
        struct_type("R2", Extensibility::Appendable, vec![member(0, "id", inner_r)]),
    );
    let w = add_struct(
        &mut graph,
        struct_type("W2", Extensibility::Appendable, vec![member(0, "id", inner_w)]),
    );
    assert!(assignable(&graph, &r, &w));
}

#[test]
fn test_key_erased_view_clears_flags() {
    let st = struct_type(
        "S",
        Extensibility::Final,
        vec![key_member(0, "a", int32()), member(1, "b", int32())],
    );
    let erased = key_erased(&TypeBody::Struct(st.clone()));
    let TypeBody::Struct(erased) = erased else {
        panic!("struct expected");
    };
    assert!(erased.member_seq.iter().all(|m| !m.member_flags.is_key()));
    assert!(erased.member_seq[0].member_flags.is_must_understand());
    // Source untouched.
    assert!(st.member_seq[0].member_flags.is_key());
}

#[test]
fn test_key_holder_view() {
    let mut graph = TypeMapping::new();
    let base = add_struct(
        &mut graph,
        struct_type("Base", Extensibility::Final, vec![key_member(0, "k", int32())]),
    );
    let mut derived = struct_type(
        "Derived",
        Extensibility::Final,
        vec![member(1, "v", int32()), key_member(2, "k2", int16())],
    );
    derived.base_type = Some(base);

    let holder = key_holder(&graph, &TypeBody::Struct(derived)).expect("base resolvable");
    let TypeBody::Struct(holder) = holder else {
        panic!("struct expected");
    };
    assert_eq!(holder.base_type, None);
    let ids: Vec<u32> = holder.member_seq.iter().map(|m| m.member_id).collect();
    assert_eq!(ids, vec![0, 2]);

    let keyless = struct_type(
        "Plain",
        Extensibility::Final,
        vec![member(0, "a", int32()), member(1, "b", int32())],
    );
    let TypeBody::Struct(holder) = key_holder(&graph, &TypeBody::Struct(keyless)).expect("no base")
    else {
        panic!("struct expected");
    };
    assert_eq!(holder.member_seq.len(), 2);
    assert!(holder.member_seq.iter().all(|m| m.member_flags.is_key()));
}
