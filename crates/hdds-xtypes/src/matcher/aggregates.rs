// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Enum, struct and union assignability rules (XTypes 7.2.4.4.4).

use super::engine::{Engine, Shape, View};
use super::views::{erase_keys, flatten_members, hold_keys};
use super::{TypeConsistencyEnforcement, TypeGraph};
use crate::xtypes::{
    EnumeratedType, Extensibility, MemberName, NameHash, Representation, StructMember, StructType,
    TypeBody, TypeIdentifier, UnionType,
};
use std::collections::{BTreeSet, HashMap};

impl<'g, G, R> Engine<'g, G, R>
where
    G: TypeGraph + ?Sized,
    R: Representation,
{
    pub(super) fn enums(&mut self, reader: &EnumeratedType<R>, writer: &EnumeratedType<R>) -> bool {
        let ext = reader.enum_flags.extensibility();
        if ext != writer.enum_flags.extensibility() {
            log::trace!("[Assignability] enum extensibility differs");
            return false;
        }
        if ext == Extensibility::Final && reader.bit_bound != writer.bit_bound {
            log::trace!("[Assignability] final enum bit_bound differs");
            return false;
        }

        // Both literal lists are sorted by value.
        let (r_lits, w_lits) = (&reader.literal_seq, &writer.literal_seq);
        let (mut i, mut j) = (0, 0);
        while i < r_lits.len() || j < w_lits.len() {
            match (r_lits.get(i), w_lits.get(j)) {
                (Some(r), Some(w)) if r.value == w.value => {
                    if !self.opts.ignore_member_names && r.detail.name_hash() != w.detail.name_hash()
                    {
                        log::trace!("[Assignability] enum literal {} renamed", r.value);
                        return false;
                    }
                    i += 1;
                    j += 1;
                }
                (Some(r), w) if w.map_or(true, |w| r.value < w.value) => {
                    if ext == Extensibility::Final {
                        log::trace!("[Assignability] final enum: reader-only literal {}", r.value);
                        return false;
                    }
                    i += 1;
                }
                (_, Some(w)) => {
                    if ext == Extensibility::Final {
                        log::trace!("[Assignability] final enum: writer-only literal {}", w.value);
                        return false;
                    }
                    j += 1;
                }
                // Covered by the guarded reader-only arm above.
                (Some(_), None) => unreachable!(),
                (None, None) => break,
            }
        }

        // A one-sided literal must not reuse a name bound to another value.
        if !self.opts.ignore_member_names {
            let by_name: HashMap<NameHash, i32> = r_lits
                .iter()
                .map(|l| (l.detail.name_hash(), l.value))
                .collect();
            if let Some(w) = w_lits.iter().find(|w| {
                by_name
                    .get(&w.detail.name_hash())
                    .is_some_and(|&value| value != w.value)
            }) {
                log::trace!("[Assignability] enum literal {} changed value", w.value);
                return false;
            }
        }
        true
    }

    /// Struct members as seen under `view`, base members flattened in.
    fn view_members(&self, st: &StructType<R>, view: View) -> Option<Vec<StructMember<R>>> {
        let mut members = flatten_members(self.graph, st)?;
        match view {
            View::Plain => {}
            View::KeyErased => erase_keys(&mut members),
            View::KeyHolder => members = hold_keys(members),
        }
        Some(members)
    }

    pub(super) fn structs(
        &mut self,
        reader: &StructType<R>,
        writer: &StructType<R>,
        view: View,
    ) -> bool {
        let ext = reader.struct_flags.extensibility();
        if ext != writer.struct_flags.extensibility() {
            log::trace!("[Assignability] struct extensibility differs");
            return false;
        }
        let (Some(r_members), Some(w_members)) =
            (self.view_members(reader, view), self.view_members(writer, view))
        else {
            return false;
        };

        if !self.opts.ignore_member_names
            && !names_consistent(
                r_members.iter().map(|m| (m.member_id, m.detail.name_hash())),
                w_members.iter().map(|m| (m.member_id, m.detail.name_hash())),
            )
        {
            log::trace!("[Assignability] struct member names and ids disagree");
            return false;
        }

        if ext == Extensibility::Final
            && (r_members.len() != w_members.len()
                || r_members
                    .iter()
                    .zip(&w_members)
                    .any(|(r, w)| r.member_id != w.member_id))
        {
            log::trace!("[Assignability] final struct member ids differ");
            return false;
        }

        let mut r_matched = vec![false; r_members.len()];
        let mut matched = 0usize;
        // Scan resumes after the previous hit so that same-order members
        // are found in one step each.
        let mut start = 0usize;
        for w in &w_members {
            let found = (0..r_members.len())
                .map(|k| (start + k) % r_members.len())
                .find(|&i| r_members[i].member_id == w.member_id);
            match found {
                Some(i) => {
                    start = (i + 1) % r_members.len();
                    r_matched[i] = true;
                    matched += 1;
                    if !self.member_pair(&r_members[i], w) {
                        return false;
                    }
                }
                None => {
                    if w.member_flags.is_key() || w.member_flags.is_must_understand() {
                        log::trace!(
                            "[Assignability] writer member {} is key or must-understand",
                            w.member_id
                        );
                        return false;
                    }
                    if self.opts.prevent_type_widening {
                        log::trace!("[Assignability] writer member {} widens", w.member_id);
                        return false;
                    }
                }
            }
        }

        let reader_missing = r_members
            .iter()
            .zip(&r_matched)
            .filter(|(_, hit)| !**hit)
            .any(|(m, _)| m.member_flags.is_key() || m.member_flags.is_must_understand());
        if reader_missing {
            log::trace!("[Assignability] reader key or must-understand member missing");
            return false;
        }
        if matched == 0 {
            log::trace!("[Assignability] no member in common");
            return false;
        }
        true
    }

    fn member_pair(&mut self, reader: &StructMember<R>, writer: &StructMember<R>) -> bool {
        if reader.member_flags.is_key() != writer.member_flags.is_key() {
            log::trace!("[Assignability] member {} key-ness differs", writer.member_id);
            return false;
        }
        if !self.check(&reader.member_type_id, &writer.member_type_id, View::KeyErased) {
            return false;
        }
        !writer.member_flags.is_key()
            || self.key_member(&reader.member_type_id, &writer.member_type_id)
    }

    /// Extra rules for a key member's type.
    fn key_member(&mut self, reader: &TypeIdentifier, writer: &TypeIdentifier) -> bool {
        if self.equivalent(reader, writer) {
            return true;
        }
        let (Some((_, r_shape)), Some((_, w_shape))) = (self.resolve(reader), self.resolve(writer))
        else {
            return false;
        };
        match (r_shape, w_shape) {
            (Shape::String { bound: rb, .. }, Shape::String { bound: wb, .. })
            | (Shape::Sequence { bound: rb, .. }, Shape::Sequence { bound: wb, .. })
            | (Shape::Map { bound: rb, .. }, Shape::Map { bound: wb, .. }) => {
                TypeConsistencyEnforcement::bound_fits(rb, wb)
            }
            (Shape::Body(TypeBody::Enumerated(r)), Shape::Body(TypeBody::Enumerated(w))) => w
                .literal_seq
                .iter()
                .all(|lit| r.literal(lit.value).is_some()),
            (Shape::Body(TypeBody::Struct(_)), Shape::Body(TypeBody::Struct(_))) => {
                self.check(reader, writer, View::KeyHolder)
            }
            (Shape::Body(TypeBody::Union(r)), Shape::Body(TypeBody::Union(w))) => {
                self.check(reader, writer, View::KeyHolder)
                    && w
                        .member_seq
                        .iter()
                        .flat_map(|m| m.label_seq.iter())
                        .all(|label| r.select(*label).is_some())
            }
            _ => true,
        }
    }

    pub(super) fn unions(&mut self, reader: &UnionType<R>, writer: &UnionType<R>, view: View) -> bool {
        let ext = reader.union_flags.extensibility();
        if ext != writer.union_flags.extensibility() {
            log::trace!("[Assignability] union extensibility differs");
            return false;
        }
        if view != View::KeyErased
            && reader.discriminator.member_flags.is_key() != writer.discriminator.member_flags.is_key()
        {
            log::trace!("[Assignability] union discriminator key-ness differs");
            return false;
        }
        if !self.strongly(&reader.discriminator.type_id, &writer.discriminator.type_id) {
            log::trace!("[Assignability] union discriminators not strongly assignable");
            return false;
        }

        let r_labels: BTreeSet<i32> = labels(reader);
        let w_labels: BTreeSet<i32> = labels(writer);
        if ext == Extensibility::Final {
            if r_labels != w_labels {
                log::trace!("[Assignability] final union label sets differ");
                return false;
            }
        } else if r_labels.is_disjoint(&w_labels) {
            log::trace!("[Assignability] union has no label in common");
            return false;
        }

        if !self.opts.ignore_member_names
            && !names_consistent(
                reader.member_seq.iter().map(|m| (m.member_id, m.detail.name_hash())),
                writer.member_seq.iter().map(|m| (m.member_id, m.detail.name_hash())),
            )
        {
            log::trace!("[Assignability] union member names and ids disagree");
            return false;
        }

        for w in &writer.member_seq {
            for label in &w.label_seq {
                let Some(r) = reader.select(*label) else {
                    continue;
                };
                if !self.check(&r.type_id, &w.type_id, View::KeyErased) {
                    log::trace!("[Assignability] union case {} not assignable", label);
                    return false;
                }
            }
        }

        if let Some(w_default) = writer.member_seq.iter().find(|m| m.is_default()) {
            for label in r_labels.difference(&w_labels) {
                let Some(r) = reader.select(*label) else {
                    continue;
                };
                if !self.check(&r.type_id, &w_default.type_id, View::KeyErased) {
                    log::trace!("[Assignability] writer default case not assignable to {}", label);
                    return false;
                }
            }
        }
        true
    }
}

fn labels<R: Representation>(union: &UnionType<R>) -> BTreeSet<i32> {
    union
        .member_seq
        .iter()
        .flat_map(|m| m.label_seq.iter().copied())
        .collect()
}

/// A member id present on both sides carries the same name, and a name
/// present on both sides carries the same id.
fn names_consistent(
    reader: impl Iterator<Item = (u32, NameHash)>,
    writer: impl Iterator<Item = (u32, NameHash)>,
) -> bool {
    let mut by_id: HashMap<u32, NameHash> = HashMap::new();
    let mut by_name: HashMap<NameHash, u32> = HashMap::new();
    for (id, name) in reader {
        by_id.insert(id, name);
        by_name.insert(name, id);
    }
    writer.into_iter().all(|(id, name)| {
        by_id.get(&id).map_or(true, |n| *n == name) && by_name.get(&name).map_or(true, |i| *i == id)
    })
}
