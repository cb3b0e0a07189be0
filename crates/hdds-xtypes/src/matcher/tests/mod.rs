// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

use super::*;
use crate::xtypes::{
    AliasType, BitmaskType, CompleteMemberDetail, CompleteTypeDetail, EnumeratedLiteral,
    EnumeratedType, Extensibility, MemberFlag, StructMember, StructType, TypeBody, TypeFlag,
    TypeKind, UnionDiscriminator, UnionMember, UnionType,
};

mod assignable_collections;
mod assignable_keys;

fn int32() -> TypeIdentifier {
    TypeIdentifier::primitive(TypeKind::TK_INT32)
}

fn int16() -> TypeIdentifier {
    TypeIdentifier::primitive(TypeKind::TK_INT16)
}

fn member(id: u32, name: &str, type_id: TypeIdentifier) -> StructMember<CompleteForm> {
    StructMember {
        member_id: id,
        member_flags: MemberFlag::empty(),
        member_type_id: type_id,
        detail: CompleteMemberDetail::named(name),
    }
}

fn key_member(id: u32, name: &str, type_id: TypeIdentifier) -> StructMember<CompleteForm> {
    StructMember {
        member_flags: MemberFlag::IS_KEY | MemberFlag::IS_MUST_UNDERSTAND,
        ..member(id, name, type_id)
    }
}

fn struct_type(
    name: &str,
    ext: Extensibility,
    members: Vec<StructMember<CompleteForm>>,
) -> StructType<CompleteForm> {
    StructType {
        struct_flags: TypeFlag::empty().with_extensibility(ext),
        base_type: None,
        detail: CompleteTypeDetail::named(name),
        member_seq: members,
    }
}

fn enum_type(name: &str, ext: Extensibility, literals: &[(i32, &str)]) -> TypeObject {
    TypeObject::Complete(TypeBody::Enumerated(EnumeratedType {
        enum_flags: TypeFlag::empty().with_extensibility(ext),
        bit_bound: 32,
        detail: CompleteTypeDetail::named(name),
        literal_seq: literals
            .iter()
            .map(|(value, name)| EnumeratedLiteral {
                value: *value,
                flags: MemberFlag::empty(),
                detail: CompleteMemberDetail::named(*name),
            })
            .collect(),
    }))
}

fn case(id: u32, name: &str, type_id: TypeIdentifier, labels: &[i32]) -> UnionMember<CompleteForm> {
    UnionMember {
        member_id: id,
        member_flags: MemberFlag::empty(),
        type_id,
        label_seq: labels.to_vec(),
        detail: CompleteMemberDetail::named(name),
    }
}

fn default_case(id: u32, name: &str, type_id: TypeIdentifier) -> UnionMember<CompleteForm> {
    UnionMember {
        member_flags: MemberFlag::IS_DEFAULT,
        ..case(id, name, type_id, &[])
    }
}

fn union_type(
    name: &str,
    ext: Extensibility,
    discriminator: TypeIdentifier,
    cases: Vec<UnionMember<CompleteForm>>,
) -> TypeObject {
    TypeObject::Complete(TypeBody::Union(UnionType {
        union_flags: TypeFlag::empty().with_extensibility(ext),
        detail: CompleteTypeDetail::named(name),
        discriminator: UnionDiscriminator {
            member_flags: MemberFlag::empty(),
            type_id: discriminator,
        },
        member_seq: cases,
    }))
}

fn bitmask_type(name: &str, bit_bound: u16) -> TypeObject {
    TypeObject::Complete(TypeBody::Bitmask(BitmaskType {
        bitmask_flags: TypeFlag::empty(),
        bit_bound,
        detail: CompleteTypeDetail::named(name),
        flag_seq: Vec::new(),
    }))
}

fn alias_type(name: &str, related: TypeIdentifier) -> TypeObject {
    TypeObject::Complete(TypeBody::Alias(AliasType {
        alias_flags: TypeFlag::empty(),
        detail: CompleteTypeDetail::named(name),
        related_flags: MemberFlag::empty(),
        related_type: related,
    }))
}

/// File `obj` in `graph` under its own hash.
fn add(graph: &mut TypeMapping, obj: TypeObject) -> TypeIdentifier {
    let id = obj.type_identifier();
    graph.insert(id.clone(), obj);
    id
}

fn add_struct(graph: &mut TypeMapping, st: StructType<CompleteForm>) -> TypeIdentifier {
    add(graph, TypeObject::Complete(TypeBody::Struct(st)))
}

fn assignable(graph: &TypeMapping, reader: &TypeIdentifier, writer: &TypeIdentifier) -> bool {
    is_assignable_from(graph, reader, writer, &TypeConsistencyEnforcement::default())
}
