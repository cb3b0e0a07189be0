// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Derived views used by the key rules: key-erased and key-holder types.
//!
//! Views are freshly built values; the source body is never modified.

use super::TypeGraph;
use crate::xtypes::{MemberFlag, Representation, StructMember, StructType, TypeBody};

/// Base chains longer than this are treated as unresolvable.
const MAX_BASE_DEPTH: usize = 64;

/// `body` with every key flag cleared (struct members, union discriminator).
pub fn key_erased<R: Representation>(body: &TypeBody<R>) -> TypeBody<R> {
    let mut out = body.clone();
    match &mut out {
        TypeBody::Struct(st) => erase_keys(&mut st.member_seq),
        TypeBody::Union(un) => {
            un.discriminator.member_flags = un
                .discriminator
                .member_flags
                .with(MemberFlag::IS_KEY, false);
        }
        _ => {}
    }
    out
}

/// Key-holder view of `body`.
///
/// For a struct: inherited members flattened in, then only the key
/// members kept; a struct without keys keeps every member, all marked as
/// keys. Other kinds are returned unchanged. `None` when a base type
/// cannot be resolved in `graph`.
pub fn key_holder<G, R>(graph: &G, body: &TypeBody<R>) -> Option<TypeBody<R>>
where
    G: TypeGraph + ?Sized,
    R: Representation,
{
    match body {
        TypeBody::Struct(st) => {
            let members = hold_keys(flatten_members(graph, st)?);
            Some(TypeBody::Struct(StructType {
                struct_flags: st.struct_flags,
                base_type: None,
                detail: st.detail.clone(),
                member_seq: members,
            }))
        }
        other => Some(other.clone()),
    }
}

/// Members of `st` with its base chain expanded, base members first.
pub(crate) fn flatten_members<G, R>(graph: &G, st: &StructType<R>) -> Option<Vec<StructMember<R>>>
where
    G: TypeGraph + ?Sized,
    R: Representation,
{
    let mut chain = vec![st];
    let mut base = st.base_type.as_ref();
    while let Some(id) = base.filter(|id| !id.is_none()) {
        if chain.len() > MAX_BASE_DEPTH {
            log::trace!("[Assignability] base chain of {} too deep", id);
            return None;
        }
        let parent = match base_struct(graph, id) {
            Some(parent) => parent,
            None => {
                log::trace!("[Assignability] base type {} unresolved", id);
                return None;
            }
        };
        chain.push(parent);
        base = parent.base_type.as_ref();
    }
    Some(
        chain
            .iter()
            .rev()
            .flat_map(|st| st.member_seq.iter().cloned())
            .collect(),
    )
}

/// Struct body behind a base type identifier, looking through aliases.
fn base_struct<'g, G, R>(
    graph: &'g G,
    id: &crate::xtypes::TypeIdentifier,
) -> Option<&'g StructType<R>>
where
    G: TypeGraph + ?Sized,
    R: Representation,
{
    let mut body = R::body(graph.object(id)?)?;
    for _ in 0..MAX_BASE_DEPTH {
        match body {
            TypeBody::Struct(st) => return Some(st),
            TypeBody::Alias(alias) => body = R::body(graph.object(&alias.related_type)?)?,
            _ => return None,
        }
    }
    None
}

pub(crate) fn erase_keys<R: Representation>(members: &mut [StructMember<R>]) {
    for member in members {
        member.member_flags = member.member_flags.with(MemberFlag::IS_KEY, false);
    }
}

/// Keep key members only, or all members as keys when none is.
pub(crate) fn hold_keys<R: Representation>(members: Vec<StructMember<R>>) -> Vec<StructMember<R>> {
    let has_keys = members.iter().any(|m| m.member_flags.is_key());
    members
        .into_iter()
        .filter(|m| !has_keys || m.member_flags.is_key())
        .map(|mut m| {
            m.member_flags = m.member_flags.with(MemberFlag::IS_KEY, true);
            m
        })
        .collect()
}
