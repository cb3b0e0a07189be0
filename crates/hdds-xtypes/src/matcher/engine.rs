// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Assignability entry point shared by every recursive check.
//!
//! Aliases are unwrapped and cycles cut here, once, before dispatching
//! on kind. Aggregate rules live in `aggregates`.

use super::{TypeConsistencyEnforcement, TypeGraph};
use crate::xtypes::{Representation, TypeBody, TypeIdentifier, TypeKind};
use std::collections::HashSet;
use std::marker::PhantomData;

const MAX_ALIAS_DEPTH: usize = 32;

/// Which derived view of an aggregate is being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum View {
    Plain,
    KeyErased,
    KeyHolder,
}

/// A type with aliases unwrapped and collection objects normalized to
/// the same shape as plain collection identifiers.
pub(crate) enum Shape<'a, R: Representation> {
    Primitive(TypeKind),
    String { wide: bool, bound: u32 },
    Sequence { bound: u32, element: &'a TypeIdentifier },
    Array { dims: Vec<u32>, element: &'a TypeIdentifier },
    Map { bound: u32, key: &'a TypeIdentifier, element: &'a TypeIdentifier },
    /// Struct, union, enum, bitmask or bitset body.
    Body(&'a TypeBody<R>),
}

pub(crate) struct Engine<'g, G: ?Sized, R> {
    pub(super) graph: &'g G,
    pub(super) opts: &'g TypeConsistencyEnforcement,
    in_progress: HashSet<(TypeIdentifier, TypeIdentifier, View)>,
    _form: PhantomData<R>,
}

impl<'g, G, R> Engine<'g, G, R>
where
    G: TypeGraph + ?Sized,
    R: Representation,
{
    pub(crate) fn new(graph: &'g G, opts: &'g TypeConsistencyEnforcement) -> Self {
        Self {
            graph,
            opts,
            in_progress: HashSet::new(),
            _form: PhantomData,
        }
    }

    /// Same identifier, or both map to the same MINIMAL identifier.
    pub(crate) fn equivalent(&self, a: &TypeIdentifier, b: &TypeIdentifier) -> bool {
        if a == b {
            return true;
        }
        match (self.graph.minimal_id(a), self.graph.minimal_id(b)) {
            (Some(ma), Some(mb)) => ma == mb,
            _ => false,
        }
    }

    /// Unwrap aliases and normalize `id`. Returns the identifier the
    /// shape was read from. `None` when an object is missing or in the
    /// other form.
    pub(crate) fn resolve<'x>(
        &self,
        id: &'x TypeIdentifier,
    ) -> Option<(&'x TypeIdentifier, Shape<'x, R>)>
    where
        'g: 'x,
    {
        let mut current = id;
        for _ in 0..MAX_ALIAS_DEPTH {
            let shape = match current {
                TypeIdentifier::Primitive(kind) if *kind == TypeKind::TK_NONE => return None,
                TypeIdentifier::Primitive(kind) => Shape::Primitive(*kind),
                TypeIdentifier::String8Small { bound } => Shape::String {
                    wide: false,
                    bound: u32::from(*bound),
                },
                TypeIdentifier::String8Large { bound } => Shape::String {
                    wide: false,
                    bound: *bound,
                },
                TypeIdentifier::String16Small { bound } => Shape::String {
                    wide: true,
                    bound: u32::from(*bound),
                },
                TypeIdentifier::String16Large { bound } => Shape::String {
                    wide: true,
                    bound: *bound,
                },
                TypeIdentifier::PlainSequence(seq) => Shape::Sequence {
                    bound: seq.bound.value(),
                    element: &seq.element,
                },
                TypeIdentifier::PlainArray(arr) => Shape::Array {
                    dims: arr.bounds.dims(),
                    element: &arr.element,
                },
                TypeIdentifier::PlainMap(map) => Shape::Map {
                    bound: map.bound.value(),
                    key: &map.key,
                    element: &map.element,
                },
                TypeIdentifier::StronglyConnected(_)
                | TypeIdentifier::Minimal(_)
                | TypeIdentifier::Complete(_) => {
                    let graph: &'g G = self.graph;
                    let Some(body) = graph.object(current).and_then(R::body) else {
                        log::trace!("[Assignability] no {:?} object for {}", R::KIND, current);
                        return None;
                    };
                    match body {
                        TypeBody::Alias(alias) => {
                            current = &alias.related_type;
                            continue;
                        }
                        TypeBody::Sequence(seq) => Shape::Sequence {
                            bound: seq.bound,
                            element: &seq.element.type_id,
                        },
                        TypeBody::Array(arr) => Shape::Array {
                            dims: arr.bound_seq.clone(),
                            element: &arr.element.type_id,
                        },
                        TypeBody::Map(map) => Shape::Map {
                            bound: map.bound,
                            key: &map.key.type_id,
                            element: &map.element.type_id,
                        },
                        other => Shape::Body(other),
                    }
                }
            };
            return Some((current, shape));
        }
        log::trace!("[Assignability] alias chain of {} too deep", id);
        None
    }

    /// Reader type `reader` is assignable from writer type `writer` under
    /// `view`.
    pub(crate) fn check(
        &mut self,
        reader: &TypeIdentifier,
        writer: &TypeIdentifier,
        view: View,
    ) -> bool {
        if self.equivalent(reader, writer) {
            return true;
        }
        let (Some((r_id, r_shape)), Some((w_id, w_shape))) =
            (self.resolve(reader), self.resolve(writer))
        else {
            log::trace!("[Assignability] unresolved: {} <- {}", reader, writer);
            return false;
        };
        if self.equivalent(r_id, w_id) {
            return true;
        }

        let opts = *self.opts;
        let ok = match (r_shape, w_shape) {
            (Shape::Primitive(r), Shape::Primitive(w)) => r == w,
            (
                Shape::String { wide: rw, bound: rb },
                Shape::String { wide: ww, bound: wb },
            ) => rw == ww && (opts.ignore_string_bounds || TypeConsistencyEnforcement::bound_fits(rb, wb)),
            (
                Shape::Sequence { bound: rb, element: re },
                Shape::Sequence { bound: wb, element: we },
            ) => {
                (opts.ignore_sequence_bounds || TypeConsistencyEnforcement::bound_fits(rb, wb))
                    && self.strongly(re, we)
            }
            (
                Shape::Array { dims: rd, element: re },
                Shape::Array { dims: wd, element: we },
            ) => rd == wd && self.strongly(re, we),
            (
                Shape::Map { bound: rb, key: rk, element: re },
                Shape::Map { bound: wb, key: wk, element: we },
            ) => {
                (opts.ignore_sequence_bounds || TypeConsistencyEnforcement::bound_fits(rb, wb))
                    && self.strongly(rk, wk)
                    && self.strongly(re, we)
            }
            (Shape::Body(TypeBody::Bitmask(r)), Shape::Body(TypeBody::Bitmask(w))) => {
                r.bit_bound == w.bit_bound
            }
            (Shape::Body(TypeBody::Bitmask(r)), Shape::Primitive(kind))
            | (Shape::Primitive(kind), Shape::Body(TypeBody::Bitmask(r))) => {
                bitmask_holds(r.bit_bound, kind)
            }
            (Shape::Body(r), Shape::Body(w)) => self.check_bodies(r_id, w_id, r, w, view),
            _ => false,
        };
        if !ok {
            log::trace!("[Assignability] {} <- {} rejected ({:?})", r_id, w_id, view);
        }
        ok
    }

    fn check_bodies(
        &mut self,
        r_id: &TypeIdentifier,
        w_id: &TypeIdentifier,
        reader: &TypeBody<R>,
        writer: &TypeBody<R>,
        view: View,
    ) -> bool {
        let guard = (r_id.clone(), w_id.clone(), view);
        if self.in_progress.contains(&guard) {
            // Assume the pair holds while it is being proven.
            return true;
        }
        self.in_progress.insert(guard.clone());
        let ok = match (reader, writer) {
            (TypeBody::Enumerated(r), TypeBody::Enumerated(w)) => self.enums(r, w),
            (TypeBody::Struct(r), TypeBody::Struct(w)) => self.structs(r, w, view),
            (TypeBody::Union(r), TypeBody::Union(w)) => self.unions(r, w, view),
            (TypeBody::Bitset(_), TypeBody::Bitset(_)) => {
                log::trace!("[Assignability] bitset assignability unsupported");
                false
            }
            _ => false,
        };
        self.in_progress.remove(&guard);
        ok
    }

    /// Minimal-equivalent, or writer delimited and plainly assignable.
    pub(crate) fn strongly(&mut self, reader: &TypeIdentifier, writer: &TypeIdentifier) -> bool {
        self.equivalent(reader, writer)
            || (self.delimited(writer, &mut HashSet::new()) && self.check(reader, writer, View::Plain))
    }

    /// Whether the serialized size of `id` can be skipped without knowing
    /// the type: primitives, strings, enums, bitmasks and every
    /// non-FINAL aggregate are; collections and FINAL aggregates are when
    /// all their parts are.
    pub(crate) fn delimited(
        &self,
        id: &TypeIdentifier,
        visited: &mut HashSet<TypeIdentifier>,
    ) -> bool {
        let Some((resolved, shape)) = self.resolve(id) else {
            return false;
        };
        match shape {
            Shape::Primitive(_) | Shape::String { .. } => true,
            Shape::Sequence { element, .. } | Shape::Array { element, .. } => {
                self.delimited(element, visited)
            }
            Shape::Map { key, element, .. } => {
                self.delimited(key, visited) && self.delimited(element, visited)
            }
            Shape::Body(body) => {
                if body.flags().extensibility() != crate::xtypes::Extensibility::Final {
                    return true;
                }
                if !visited.insert(resolved.clone()) {
                    return true;
                }
                match body {
                    TypeBody::Struct(st) => {
                        st.base_type
                            .iter()
                            .filter(|base| !base.is_none())
                            .all(|base| self.delimited(base, visited))
                            && st
                                .member_seq
                                .iter()
                                .all(|m| self.delimited(&m.member_type_id, visited))
                    }
                    TypeBody::Union(un) => {
                        self.delimited(&un.discriminator.type_id, visited)
                            && un.member_seq.iter().all(|m| self.delimited(&m.type_id, visited))
                    }
                    _ => true,
                }
            }
        }
    }
}

/// A bitmask of `bit_bound` bits is carried by the unsigned integer
/// `kind` of the matching width.
fn bitmask_holds(bit_bound: u16, kind: TypeKind) -> bool {
    match kind.unsigned_bits() {
        Some(8) => (1..=8).contains(&bit_bound),
        Some(16) => (9..=16).contains(&bit_bound),
        Some(32) => (17..=32).contains(&bit_bound),
        Some(64) => (33..=64).contains(&bit_bound),
        _ => false,
    }
}
