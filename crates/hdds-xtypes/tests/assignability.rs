// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![cfg(feature = "dynamic-types")]
#![allow(clippy::uninlined_format_args)] // Test code readability over pedantic
#![allow(clippy::missing_panics_doc)] // Tests panic on failure
#![allow(clippy::too_many_lines)] // Test code
#![allow(clippy::cast_possible_truncation)] // Random ids fit

//! Assignability of types built with the dynamic type builder.

use hdds_xtypes::dynamic::{DynamicType, MemberDescriptor};
use hdds_xtypes::xtypes::{Extensibility, TypeKind};
use hdds_xtypes::{
    check_type_match, RegistryConfig, TypeConsistencyEnforcement, TypeHandle, TypeMatch,
    TypePair, TypeRegistry,
};

fn registry() -> TypeRegistry {
    TypeRegistry::new(0, RegistryConfig::default())
}

fn complete(pair: &TypePair) -> &TypeHandle {
    pair.complete.as_ref().expect("complete handle")
}

fn minimal(pair: &TypePair) -> &TypeHandle {
    pair.minimal.as_ref().expect("minimal handle")
}

fn assignable(registry: &TypeRegistry, reader: &TypePair, writer: &TypePair) -> bool {
    let opts = TypeConsistencyEnforcement::default();
    let by_minimal = registry.is_assignable_from(minimal(reader), minimal(writer), &opts);
    let by_complete = registry.is_assignable_from(complete(reader), complete(writer), &opts);
    assert_eq!(by_minimal, by_complete, "representations disagree");
    by_complete
}

// ============================================================================
// Random type generation
// ============================================================================

const PRIMITIVES: [TypeKind; 10] = [
    TypeKind::TK_BOOLEAN,
    TypeKind::TK_BYTE,
    TypeKind::TK_INT16,
    TypeKind::TK_INT32,
    TypeKind::TK_INT64,
    TypeKind::TK_UINT16,
    TypeKind::TK_UINT32,
    TypeKind::TK_UINT64,
    TypeKind::TK_FLOAT32,
    TypeKind::TK_FLOAT64,
];

const EXTENSIBILITIES: [Extensibility; 3] = [
    Extensibility::Final,
    Extensibility::Appendable,
    Extensibility::Mutable,
];

struct Gen<'r> {
    registry: &'r TypeRegistry,
    rng: fastrand::Rng,
    serial: u32,
}

impl Gen<'_> {
    fn name(&mut self, prefix: &str) -> String {
        self.serial += 1;
        format!("gen::{}{}", prefix, self.serial)
    }

    fn primitive(&mut self) -> TypeKind {
        PRIMITIVES[self.rng.usize(..PRIMITIVES.len())]
    }

    /// Any member type, nesting at most `depth` more aggregates.
    fn member_type(&mut self, depth: u32) -> DynamicType {
        let choice = if depth == 0 {
            self.rng.u8(..3)
        } else {
            self.rng.u8(..7)
        };
        let registry = self.registry;
        match choice {
            0 => DynamicType::create_primitive(registry, self.primitive()).expect("primitive"),
            1 => DynamicType::create_string(registry, self.rng.u32(0..64)),
            2 => {
                let element = self.primitive();
                let bound = self.rng.u32(0..8);
                DynamicType::create_sequence(registry, element, bound).expect("sequence")
            }
            3 => {
                let keyed = self.rng.bool();
                self.structure(depth - 1, keyed)
            }
            4 => self.enumeration(),
            5 => self.union(depth - 1),
            _ => {
                let element = self.member_type(depth - 1);
                let len = self.rng.u32(1..4);
                DynamicType::create_array(registry, &element, &[len]).expect("array")
            }
        }
    }

    fn structure(&mut self, depth: u32, keyed: bool) -> DynamicType {
        let name = self.name("S");
        let st = DynamicType::create_struct(self.registry, &name);
        st.set_extensibility(EXTENSIBILITIES[self.rng.usize(..3)])
            .expect("extensibility");
        let count = self.rng.usize(1..5);
        for i in 0..count {
            let ty = self.member_type(depth);
            let id = st
                .add_member(MemberDescriptor::new(format!("m{}", i), &ty))
                .expect("member");
            if keyed && i == 0 && ty.kind().is_primitive() {
                st.set_key(id, true).expect("key");
            }
        }
        st
    }

    fn enumeration(&mut self) -> DynamicType {
        let name = self.name("E");
        let en = DynamicType::create_enum(self.registry, &name);
        for i in 0..self.rng.usize(1..5) {
            en.add_literal(&format!("L{}", i), None).expect("literal");
        }
        en
    }

    fn union(&mut self, depth: u32) -> DynamicType {
        let name = self.name("U");
        let un = DynamicType::create_union(self.registry, &name, TypeKind::TK_INT32)
            .expect("union");
        un.set_extensibility(EXTENSIBILITIES[self.rng.usize(..3)])
            .expect("extensibility");
        for i in 0..self.rng.usize(1..4) {
            let ty = self.member_type(depth);
            un.add_case(MemberDescriptor::new(format!("c{}", i), &ty).with_labels(&[i as i32]))
                .expect("case");
        }
        if self.rng.bool() {
            un.add_case(MemberDescriptor::new("other", TypeKind::TK_INT32).default_case())
                .expect("default case");
        }
        un
    }
}

#[test]
fn test_reflexive_over_random_types() {
    let registry = registry();
    let mut gen = Gen {
        registry: &registry,
        rng: fastrand::Rng::with_seed(42),
        serial: 0,
    };
    for _ in 0..50 {
        let keyed = gen.rng.bool();
        let ty = gen.structure(2, keyed);
        let pair = ty.register().expect("register");
        assert!(assignable(&registry, &pair, &pair), "{:?}", ty);
    }
}

#[test]
fn test_appendable_extension_is_mutually_assignable() {
    // T{...} and T{..., extra} built from the same random member types.
    let registry = registry();
    let mut gen = Gen {
        registry: &registry,
        rng: fastrand::Rng::with_seed(7),
        serial: 0,
    };
    for round in 0..25 {
        let members: Vec<DynamicType> = (0..gen.rng.usize(1..4))
            .map(|_| gen.member_type(1))
            .collect();
        let build = |extra: bool| {
            let st = DynamicType::create_struct(&registry, &format!("Ext{}", round));
            st.set_extensibility(Extensibility::Appendable)
                .expect("extensibility");
            for (i, ty) in members.iter().enumerate() {
                st.add_member(MemberDescriptor::new(format!("m{}", i), ty))
                    .expect("member");
            }
            if extra {
                st.add_member(MemberDescriptor::new("extra", TypeKind::TK_INT64))
                    .expect("extra");
            }
            st.register().expect("register")
        };
        let base = build(false);
        let extended = build(true);
        assert!(assignable(&registry, &base, &extended));
        assert!(assignable(&registry, &extended, &base));

        let no_widening = TypeConsistencyEnforcement::default().with_prevent_type_widening(true);
        assert!(!registry.is_assignable_from(complete(&base), complete(&extended), &no_widening));
        assert!(registry.is_assignable_from(complete(&extended), complete(&base), &no_widening));
    }
}

// ============================================================================
// Scenarios
// ============================================================================

/// FINAL `S{u32 a (key), u32 b}` with ids 0 and 1.
fn keyed_final(registry: &TypeRegistry, swapped: bool, b_is_key: bool) -> DynamicType {
    let s = DynamicType::create_struct(registry, "S");
    s.set_extensibility(Extensibility::Final).expect("final");
    let a = MemberDescriptor::new("a", TypeKind::TK_UINT32).with_id(0);
    let b = MemberDescriptor::new("b", TypeKind::TK_UINT32).with_id(1);
    if swapped {
        s.add_member(b).expect("b");
        s.add_member(a.at_index(0)).expect("a");
    } else {
        s.add_member(a).expect("a");
        s.add_member(b).expect("b");
    }
    s.set_key(0, true).expect("key a");
    if b_is_key {
        s.set_key(1, true).expect("key b");
    }
    s
}

#[test]
fn test_final_key_scenario() {
    let registry = registry();
    let s = keyed_final(&registry, false, false);
    let s_swapped = keyed_final(&registry, true, false);
    assert_eq!(
        s.complete().expect("s"),
        s_swapped.complete().expect("s'")
    );
    let (ps, ps_swapped) = (
        s.register().expect("s"),
        s_swapped.register().expect("s'"),
    );
    assert!(assignable(&registry, &ps, &ps_swapped));

    let b_keyed = keyed_final(&registry, true, true).register().expect("b key");
    assert!(!assignable(&registry, &ps, &b_keyed));
    assert!(!assignable(&registry, &b_keyed, &ps));
}

#[test]
fn test_must_understand_member_is_required_both_ways() {
    let registry = registry();
    for ext in [Extensibility::Final, Extensibility::Appendable] {
        let with = DynamicType::create_struct(&registry, "Host");
        with.set_extensibility(ext).expect("ext");
        with.add_member(MemberDescriptor::new("a", TypeKind::TK_INT32))
            .expect("a");
        let extra = with
            .add_member(MemberDescriptor::new("b", TypeKind::TK_INT32))
            .expect("b");
        with.set_must_understand(extra, true).expect("mu");

        let without = DynamicType::create_struct(&registry, "Host");
        without.set_extensibility(ext).expect("ext");
        without
            .add_member(MemberDescriptor::new("a", TypeKind::TK_INT32))
            .expect("a");

        let (with, without) = (
            with.register().expect("with"),
            without.register().expect("without"),
        );
        assert!(!assignable(&registry, &with, &without), "{:?}", ext);
        assert!(!assignable(&registry, &without, &with), "{:?}", ext);
    }
}

fn enumeration(
    registry: &TypeRegistry,
    ext: Extensibility,
    literals: &[(&str, i32)],
) -> TypePair {
    let en = DynamicType::create_enum(registry, "Color");
    en.set_extensibility(ext).expect("ext");
    for (name, value) in literals {
        en.add_literal(name, Some(*value)).expect("literal");
    }
    en.register().expect("register")
}

#[test]
fn test_appendable_enum_monotonicity() {
    let registry = registry();
    let ext = Extensibility::Appendable;
    let reader = enumeration(&registry, ext, &[("RED", 0), ("GREEN", 1), ("BLUE", 2)]);

    let subset = enumeration(&registry, ext, &[("RED", 0), ("BLUE", 2)]);
    assert!(assignable(&registry, &reader, &subset));
    // Writer-only literal.
    let extra = enumeration(&registry, ext, &[("RED", 0), ("CYAN", 3)]);
    assert!(assignable(&registry, &reader, &extra));
    // Known name under another value.
    let moved = enumeration(&registry, ext, &[("RED", 0), ("GREEN", 3)]);
    assert!(!assignable(&registry, &reader, &moved));
    // Same value, different name.
    let renamed = enumeration(&registry, ext, &[("RED", 0), ("VERT", 1)]);
    assert!(!assignable(&registry, &reader, &renamed));
    let opts = TypeConsistencyEnforcement::default().with_ignore_member_names(true);
    assert!(registry.is_assignable_from(complete(&reader), complete(&renamed), &opts));

    let final_reader = enumeration(
        &registry,
        Extensibility::Final,
        &[("RED", 0), ("GREEN", 1), ("BLUE", 2)],
    );
    let final_subset = enumeration(&registry, Extensibility::Final, &[("RED", 0), ("BLUE", 2)]);
    assert!(!assignable(&registry, &final_reader, &final_subset));
    // Extensibility must agree.
    assert!(!assignable(&registry, &final_reader, &reader));
}

#[test]
fn test_union_label_overlap() {
    let registry = registry();
    let build = |cases: &[(&str, &[i32])]| {
        let un = DynamicType::create_union(&registry, "Choice", TypeKind::TK_INT32)
            .expect("union");
        for (name, labels) in cases {
            un.add_case(MemberDescriptor::new(*name, TypeKind::TK_INT32).with_labels(labels))
                .expect("case");
        }
        un.register().expect("register")
    };
    let reader = build(&[("a", &[1, 2]), ("b", &[3])]);
    let writer = build(&[("a", &[1]), ("b", &[3, 4])]);
    assert!(assignable(&registry, &reader, &writer));
    let disjoint = build(&[("a", &[7]), ("b", &[8])]);
    assert!(!assignable(&registry, &reader, &disjoint));
}

#[test]
fn test_check_type_match_prefers_minimal() {
    let registry = registry();
    let reader = DynamicType::create_struct(&registry, "Sample");
    reader
        .add_member(MemberDescriptor::new("id", TypeKind::TK_UINT32))
        .expect("id");
    let writer = DynamicType::create_struct(&registry, "Sample");
    writer
        .add_member(MemberDescriptor::new("id", TypeKind::TK_UINT32))
        .expect("id");
    writer
        .add_member(MemberDescriptor::new("note", TypeKind::TK_FLOAT32))
        .expect("note");
    let (reader, writer) = (
        reader.register().expect("reader"),
        writer.register().expect("writer"),
    );
    let opts = TypeConsistencyEnforcement::default();
    assert_eq!(
        check_type_match(&registry, &reader, &writer, &opts),
        TypeMatch::Matched
    );

    let complete_only = TypePair {
        minimal: None,
        complete: writer.complete.clone(),
    };
    assert_eq!(
        check_type_match(&registry, &reader, &complete_only, &opts),
        TypeMatch::Matched
    );

    let none = TypePair::default();
    assert_eq!(
        check_type_match(&registry, &reader, &none, &opts),
        TypeMatch::Matched
    );
    assert_eq!(
        check_type_match(&registry, &reader, &none, &TypeConsistencyEnforcement::strict()),
        TypeMatch::NotMatched
    );
}
