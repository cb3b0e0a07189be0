// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Dynamic type construction.
//!
//! A [`DynamicType`] is a type under construction. It is edited through
//! shared handles, closed with [`DynamicType::complete`], and interned in
//! the registry with [`DynamicType::register`]:
//!
//! ```
//! use hdds_xtypes::dynamic::{DynamicType, MemberDescriptor};
//! use hdds_xtypes::xtypes::{Extensibility, TypeKind};
//! use hdds_xtypes::{RegistryConfig, TypeRegistry};
//!
//! # fn main() -> hdds_xtypes::Result<()> {
//! let registry = TypeRegistry::new(0, RegistryConfig::default());
//! let point = DynamicType::create_struct(&registry, "geometry::Point");
//! point.set_extensibility(Extensibility::Final)?;
//! point.add_member(MemberDescriptor::new("x", TypeKind::TK_FLOAT64))?;
//! point.add_member(MemberDescriptor::new("y", TypeKind::TK_FLOAT64))?;
//!
//! let path = DynamicType::create_struct(&registry, "geometry::Path");
//! let points = DynamicType::create_sequence(&registry, &point, 0)?;
//! path.add_member(MemberDescriptor::new("points", &points))?;
//!
//! // Completes `points` and `point` first.
//! let pair = path.register()?;
//! assert!(pair.complete.is_some());
//! assert!(point.is_completed());
//! # Ok(())
//! # }
//! ```
//!
//! Once completed, every mutator returns `PreconditionNotMet`.

mod complete;
mod descriptor;


pub use descriptor::{AutoId, DynamicTypeIds, DynamicTypeSpec, MemberDescriptor};

use crate::error::{Error, Result};
use crate::registry::{Sertype, TypePair, TypeRegistry, TypeState};
use crate::xtypes::{
    hash_member_id, Extensibility, TypeInformation, TypeKind, TypeMapping, MEMBER_ID_MAX,
};
use parking_lot::Mutex;
use std::sync::Arc;

const MAX_DISCRIMINATOR_ALIAS_DEPTH: usize = 16;

/// Shape of a type under construction.
#[derive(Debug, Clone)]
pub(crate) enum Body {
    Primitive(TypeKind),
    String8 {
        bound: u32,
    },
    Struct {
        base: Option<DynamicType>,
        members: Vec<Member>,
    },
    Union {
        discriminator: DynamicTypeSpec,
        discriminator_key: bool,
        cases: Vec<Member>,
    },
    Sequence {
        element: DynamicTypeSpec,
        bound: u32,
    },
    Array {
        element: DynamicTypeSpec,
        dims: Vec<u32>,
    },
    Alias {
        related: DynamicTypeSpec,
    },
    Enum {
        literals: Vec<Literal>,
    },
    Bitmask {
        flags: Vec<Flag>,
    },
}

impl Body {
    fn kind(&self) -> TypeKind {
        match self {
            Body::Primitive(kind) => *kind,
            Body::String8 { .. } => TypeKind::TK_STRING8,
            Body::Struct { .. } => TypeKind::TK_STRUCTURE,
            Body::Union { .. } => TypeKind::TK_UNION,
            Body::Sequence { .. } => TypeKind::TK_SEQUENCE,
            Body::Array { .. } => TypeKind::TK_ARRAY,
            Body::Alias { .. } => TypeKind::TK_ALIAS,
            Body::Enum { .. } => TypeKind::TK_ENUM,
            Body::Bitmask { .. } => TypeKind::TK_BITMASK,
        }
    }
}

/// Struct member or union case.
#[derive(Debug, Clone)]
pub(crate) struct Member {
    pub(crate) id: u32,
    pub(crate) name: String,
    pub(crate) spec: DynamicTypeSpec,
    pub(crate) key: bool,
    pub(crate) optional: bool,
    pub(crate) external: bool,
    pub(crate) must_understand: bool,
    pub(crate) hash_id: Option<String>,
    pub(crate) labels: Vec<i32>,
    pub(crate) is_default: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct Literal {
    pub(crate) name: String,
    pub(crate) value: i32,
}

#[derive(Debug, Clone)]
pub(crate) struct Flag {
    pub(crate) name: String,
    pub(crate) position: u16,
}

/// Everything that goes into the finished objects.
#[derive(Debug, Clone)]
pub(crate) struct Definition {
    pub(crate) body: Body,
    pub(crate) extensibility: Extensibility,
    pub(crate) autoid: AutoId,
    pub(crate) nested: bool,
    pub(crate) bit_bound: u16,
}

#[derive(Debug, Clone)]
pub(crate) struct Completed {
    pub(crate) ids: DynamicTypeIds,
    pub(crate) mapping: TypeMapping,
}

struct Builder {
    def: Definition,
    completed: Option<Completed>,
}

struct Shared {
    registry: TypeRegistry,
    name: String,
    builder: Mutex<Builder>,
}

/// Handle on a type under construction. Clones share the same type.
#[derive(Clone)]
pub struct DynamicType {
    shared: Arc<Shared>,
}

impl DynamicType {
    fn with_body(registry: &TypeRegistry, name: &str, body: Body) -> Self {
        let bit_bound = match body {
            Body::Enum { .. } | Body::Bitmask { .. } => 32,
            _ => 0,
        };
        log::debug!("[DynamicType] {} created ({:?})", name, body.kind());
        Self {
            shared: Arc::new(Shared {
                registry: registry.clone(),
                name: name.to_string(),
                builder: Mutex::new(Builder {
                    def: Definition {
                        body,
                        extensibility: Extensibility::Appendable,
                        autoid: AutoId::Sequential,
                        nested: false,
                        bit_bound,
                    },
                    completed: None,
                }),
            }),
        }
    }

    pub fn create_primitive(registry: &TypeRegistry, kind: TypeKind) -> Result<Self> {
        check_primitive(kind)?;
        Ok(Self::with_body(registry, "", Body::Primitive(kind)))
    }

    /// 8-bit string, `bound == 0` is unbounded.
    pub fn create_string(registry: &TypeRegistry, bound: u32) -> Self {
        Self::with_body(registry, "", Body::String8 { bound })
    }

    pub fn create_struct(registry: &TypeRegistry, name: &str) -> Self {
        Self::with_body(
            registry,
            name,
            Body::Struct {
                base: None,
                members: Vec::new(),
            },
        )
    }

    /// Union discriminated by a bool, char8, integer or enum type (or an
    /// alias of one).
    pub fn create_union(
        registry: &TypeRegistry,
        name: &str,
        discriminator: impl Into<DynamicTypeSpec>,
    ) -> Result<Self> {
        let discriminator = discriminator.into();
        check_spec(registry, &discriminator)?;
        if !is_discriminator(&discriminator, 0) {
            return Err(Error::BadParameter(format!(
                "invalid discriminator type for union {}",
                name
            )));
        }
        Ok(Self::with_body(
            registry,
            name,
            Body::Union {
                discriminator,
                discriminator_key: false,
                cases: Vec::new(),
            },
        ))
    }

    /// Sequence of `element`, `bound == 0` is unbounded.
    pub fn create_sequence(
        registry: &TypeRegistry,
        element: impl Into<DynamicTypeSpec>,
        bound: u32,
    ) -> Result<Self> {
        let element = element.into();
        check_spec(registry, &element)?;
        Ok(Self::with_body(registry, "", Body::Sequence { element, bound }))
    }

    pub fn create_array(
        registry: &TypeRegistry,
        element: impl Into<DynamicTypeSpec>,
        dims: &[u32],
    ) -> Result<Self> {
        let element = element.into();
        check_spec(registry, &element)?;
        if dims.is_empty() || dims.contains(&0) {
            return Err(Error::BadParameter(
                "array dimensions must be non-empty and non-zero".into(),
            ));
        }
        Ok(Self::with_body(
            registry,
            "",
            Body::Array {
                element,
                dims: dims.to_vec(),
            },
        ))
    }

    /// Maps are not constructible; always `Unsupported`.
    pub fn create_map(
        _registry: &TypeRegistry,
        _key: impl Into<DynamicTypeSpec>,
        _element: impl Into<DynamicTypeSpec>,
        _bound: u32,
    ) -> Result<Self> {
        Err(Error::Unsupported("map types".into()))
    }

    pub fn create_alias(
        registry: &TypeRegistry,
        name: &str,
        related: impl Into<DynamicTypeSpec>,
    ) -> Result<Self> {
        let related = related.into();
        check_spec(registry, &related)?;
        Ok(Self::with_body(registry, name, Body::Alias { related }))
    }

    /// Enumeration with a 32-bit bound.
    pub fn create_enum(registry: &TypeRegistry, name: &str) -> Self {
        Self::with_body(
            registry,
            name,
            Body::Enum {
                literals: Vec::new(),
            },
        )
    }

    /// Bitmask with a 32-bit bound.
    pub fn create_bitmask(registry: &TypeRegistry, name: &str) -> Self {
        Self::with_body(registry, name, Body::Bitmask { flags: Vec::new() })
    }

    pub fn name(&self) -> &str {
        &self.shared.name
    }

    pub fn kind(&self) -> TypeKind {
        self.shared.builder.lock().def.body.kind()
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.shared.registry
    }

    /// CONSTRUCTING until completed, RESOLVED afterwards.
    pub fn state(&self) -> TypeState {
        if self.is_completed() {
            TypeState::Resolved
        } else {
            TypeState::Constructing
        }
    }

    pub fn is_completed(&self) -> bool {
        self.shared.builder.lock().completed.is_some()
    }

    fn ptr_eq(&self, other: &DynamicType) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    /// Run `f` on a type still under construction.
    fn edit<T>(&self, f: impl FnOnce(&mut Definition) -> Result<T>) -> Result<T> {
        let mut builder = self.shared.builder.lock();
        if builder.completed.is_some() {
            return Err(Error::PreconditionNotMet(format!(
                "type {} is already completed",
                self.shared.name
            )));
        }
        f(&mut builder.def)
    }

    /// Add a struct member or union case. Returns its member id.
    pub fn add_member(&self, desc: MemberDescriptor) -> Result<u32> {
        check_spec(&self.shared.registry, &desc.type_spec)?;
        if let DynamicTypeSpec::Type(ty) = &desc.type_spec {
            if ty.ptr_eq(self) {
                return Err(Error::BadParameter(format!(
                    "type {} cannot contain itself",
                    self.shared.name
                )));
            }
        }
        self.edit(|def| {
            let autoid = def.autoid;
            match &mut def.body {
                Body::Struct { members, .. } => {
                    if !desc.labels.is_empty() || desc.is_default {
                        return Err(Error::BadParameter(
                            "case labels on a struct member".into(),
                        ));
                    }
                    insert_member(members, desc, autoid)
                }
                Body::Union { cases, .. } => {
                    check_case(cases, &desc)?;
                    insert_member(cases, desc, autoid)
                }
                _ => Err(Error::BadParameter(
                    "members can only be added to structs and unions".into(),
                )),
            }
        })
    }

    /// Add a union case. Same as [`add_member`](Self::add_member), for
    /// unions only.
    pub fn add_case(&self, desc: MemberDescriptor) -> Result<u32> {
        if self.kind() != TypeKind::TK_UNION {
            return Err(Error::BadParameter(format!(
                "{} is not a union",
                self.shared.name
            )));
        }
        self.add_member(desc)
    }

    /// Add an enum literal; `value` defaults to the highest value plus one.
    /// The first literal added is the default one.
    pub fn add_literal(&self, name: &str, value: Option<i32>) -> Result<i32> {
        self.edit(|def| {
            let bit_bound = def.bit_bound;
            let Body::Enum { literals } = &mut def.body else {
                return Err(Error::BadParameter("literals belong to enums".into()));
            };
            if literals.iter().any(|l| l.name == name) {
                return Err(Error::BadParameter(format!("duplicate literal {}", name)));
            }
            let value = match value {
                Some(value) => value,
                None => match literals.iter().map(|l| l.value).max() {
                    Some(max) => max.checked_add(1).ok_or_else(|| {
                        Error::BadParameter("enum literal value overflow".into())
                    })?,
                    None => 0,
                },
            };
            if literals.iter().any(|l| l.value == value) {
                return Err(Error::BadParameter(format!(
                    "duplicate literal value {}",
                    value
                )));
            }
            if !literal_fits(value, bit_bound) {
                return Err(Error::BadParameter(format!(
                    "literal value {} exceeds bit bound {}",
                    value, bit_bound
                )));
            }
            literals.push(Literal {
                name: name.to_string(),
                value,
            });
            Ok(value)
        })
    }

    /// Add a bitmask flag; `position` defaults to the highest position
    /// plus one.
    pub fn add_bitflag(&self, name: &str, position: Option<u16>) -> Result<u16> {
        self.edit(|def| {
            let bit_bound = def.bit_bound;
            let Body::Bitmask { flags } = &mut def.body else {
                return Err(Error::BadParameter("flags belong to bitmasks".into()));
            };
            if flags.iter().any(|f| f.name == name) {
                return Err(Error::BadParameter(format!("duplicate flag {}", name)));
            }
            let position = position
                .unwrap_or_else(|| flags.iter().map(|f| f.position + 1).max().unwrap_or(0));
            if position >= bit_bound || flags.iter().any(|f| f.position == position) {
                return Err(Error::BadParameter(format!(
                    "invalid flag position {}",
                    position
                )));
            }
            flags.push(Flag {
                name: name.to_string(),
                position,
            });
            Ok(position)
        })
    }

    pub fn set_extensibility(&self, ext: Extensibility) -> Result<()> {
        self.edit(|def| match def.body {
            Body::Struct { .. } | Body::Union { .. } | Body::Enum { .. } | Body::Bitmask { .. } => {
                def.extensibility = ext;
                Ok(())
            }
            _ => Err(Error::BadParameter(
                "extensibility applies to aggregates, enums and bitmasks".into(),
            )),
        })
    }

    /// Id assignment for members added from now on.
    pub fn set_autoid(&self, autoid: AutoId) -> Result<()> {
        self.edit(|def| match def.body {
            Body::Struct { .. } | Body::Union { .. } => {
                def.autoid = autoid;
                Ok(())
            }
            _ => Err(Error::BadParameter("autoid applies to aggregates".into())),
        })
    }

    pub fn set_nested(&self, nested: bool) -> Result<()> {
        self.edit(|def| {
            def.nested = nested;
            Ok(())
        })
    }

    /// Enum bound 1..=32, bitmask bound 1..=64. Existing literals or flags
    /// must fit.
    pub fn set_bitbound(&self, bits: u16) -> Result<()> {
        self.edit(|def| {
            let fits = match &def.body {
                Body::Enum { literals } => {
                    (1..=32).contains(&bits) && literals.iter().all(|l| literal_fits(l.value, bits))
                }
                Body::Bitmask { flags } => {
                    (1..=64).contains(&bits) && flags.iter().all(|f| f.position < bits)
                }
                _ => {
                    return Err(Error::BadParameter(
                        "bit bound applies to enums and bitmasks".into(),
                    ))
                }
            };
            if !fits {
                return Err(Error::BadParameter(format!("invalid bit bound {}", bits)));
            }
            def.bit_bound = bits;
            Ok(())
        })
    }

    /// Inherit from struct `base`.
    pub fn set_base(&self, base: &DynamicType) -> Result<()> {
        if base.ptr_eq(self) {
            return Err(Error::BadParameter("a struct cannot extend itself".into()));
        }
        check_spec(&self.shared.registry, &DynamicTypeSpec::Type(base.clone()))?;
        if base.kind() != TypeKind::TK_STRUCTURE {
            return Err(Error::BadParameter(format!(
                "base {} is not a struct",
                base.name()
            )));
        }
        self.edit(|def| match &mut def.body {
            Body::Struct { base: slot, .. } => {
                *slot = Some(base.clone());
                Ok(())
            }
            _ => Err(Error::BadParameter("only structs have a base".into())),
        })
    }

    /// Mark member `member_id` as key. Key members are must-understand.
    pub fn set_key(&self, member_id: u32, key: bool) -> Result<()> {
        self.edit_member(member_id, |m| {
            if key && m.optional {
                return Err(Error::BadParameter(format!(
                    "optional member {} cannot be a key",
                    m.name
                )));
            }
            m.key = key;
            Ok(())
        })
    }

    pub fn set_optional(&self, member_id: u32, optional: bool) -> Result<()> {
        self.edit_member(member_id, |m| {
            if optional && m.key {
                return Err(Error::BadParameter(format!(
                    "key member {} cannot be optional",
                    m.name
                )));
            }
            m.optional = optional;
            Ok(())
        })
    }

    pub fn set_external(&self, member_id: u32, external: bool) -> Result<()> {
        self.edit_member(member_id, |m| {
            m.external = external;
            Ok(())
        })
    }

    pub fn set_must_understand(&self, member_id: u32, must_understand: bool) -> Result<()> {
        self.edit_member(member_id, |m| {
            m.must_understand = must_understand;
            Ok(())
        })
    }

    /// Re-id member `member_id` with the hash of `hash_name` (the member's
    /// own name when empty). Returns the new id.
    pub fn set_hashid(&self, member_id: u32, hash_name: &str) -> Result<u32> {
        self.edit(|def| {
            let members = match &mut def.body {
                Body::Struct { members, .. } => members,
                Body::Union { cases, .. } => cases,
                _ => return Err(Error::BadParameter("no members".into())),
            };
            let pos = members
                .iter()
                .position(|m| m.id == member_id)
                .ok_or_else(|| Error::BadParameter(format!("no member with id {}", member_id)))?;
            let source = if hash_name.is_empty() {
                members[pos].name.as_str()
            } else {
                hash_name
            };
            let new_id = hash_member_id(source);
            if members
                .iter()
                .enumerate()
                .any(|(i, m)| i != pos && m.id == new_id)
            {
                return Err(Error::BadParameter(format!(
                    "hashed id {:#x} already in use",
                    new_id
                )));
            }
            let member = &mut members[pos];
            member.id = new_id;
            member.hash_id = Some(hash_name.to_string());
            Ok(new_id)
        })
    }

    /// Mark the union discriminator as key.
    pub fn set_discriminator_key(&self, key: bool) -> Result<()> {
        self.edit(|def| match &mut def.body {
            Body::Union {
                discriminator_key, ..
            } => {
                *discriminator_key = key;
                Ok(())
            }
            _ => Err(Error::BadParameter("not a union".into())),
        })
    }

    fn edit_member(&self, member_id: u32, f: impl FnOnce(&mut Member) -> Result<()>) -> Result<()> {
        self.edit(|def| {
            let member = match &mut def.body {
                Body::Struct { members, .. } => members.iter_mut().find(|m| m.id == member_id),
                Body::Union { cases, .. } => cases.iter_mut().find(|m| m.id == member_id),
                _ => None,
            };
            match member {
                Some(member) => f(member),
                None => Err(Error::BadParameter(format!(
                    "no member with id {}",
                    member_id
                ))),
            }
        })
    }

    /// Close construction and compute the identifiers, completing every
    /// referenced type first. Nothing is interned.
    pub fn complete(&self) -> Result<DynamicTypeIds> {
        self.complete_with(&mut Vec::new()).map(|done| done.ids)
    }

    pub(crate) fn complete_with(&self, visiting: &mut Vec<DynamicType>) -> Result<Completed> {
        if visiting.iter().any(|ty| ty.ptr_eq(self)) {
            return Err(Error::BadParameter(format!(
                "type {} is part of a cycle",
                self.shared.name
            )));
        }
        let def = {
            let builder = self.shared.builder.lock();
            if let Some(done) = &builder.completed {
                return Ok(done.clone());
            }
            builder.def.clone()
        };

        visiting.push(self.clone());
        let built = complete::build(&self.shared.name, &def, visiting);
        visiting.pop();
        let built = built?;

        let mut builder = self.shared.builder.lock();
        let done = builder.completed.get_or_insert(built);
        log::debug!(
            "[DynamicType] {} completed as {}",
            self.shared.name,
            done.ids.complete
        );
        Ok(done.clone())
    }

    /// Complete and intern. Registering again returns another counted pair
    /// for the same nodes.
    pub fn register(&self) -> Result<TypePair> {
        let done = self.complete_with(&mut Vec::new())?;
        self.shared.registry.intern_mapping(
            &done.mapping,
            Some(&done.ids.minimal),
            Some(&done.ids.complete),
        )
    }

    /// Objects of the completed type and its dependencies.
    pub fn mapping(&self) -> Option<TypeMapping> {
        let builder = self.shared.builder.lock();
        builder.completed.as_ref().map(|done| done.mapping.clone())
    }

    /// Type information of the completed type.
    pub fn type_info(&self) -> Option<TypeInformation> {
        let builder = self.shared.builder.lock();
        builder.completed.as_ref().map(|done| {
            TypeInformation::describe(
                Some(&done.ids.minimal),
                Some(&done.ids.complete),
                &done.mapping,
            )
        })
    }
}

impl Sertype for DynamicType {
    fn type_name(&self) -> &str {
        &self.shared.name
    }

    fn type_information(&self) -> Option<Vec<u8>> {
        self.type_info().map(|info| info.to_cdr2_bytes())
    }

    fn type_mapping(&self) -> Option<Vec<u8>> {
        self.mapping().map(|mapping| mapping.to_cdr2_bytes())
    }
}

impl std::fmt::Debug for DynamicType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicType")
            .field("name", &self.shared.name)
            .field("kind", &self.kind())
            .field("completed", &self.is_completed())
            .finish()
    }
}

fn check_primitive(kind: TypeKind) -> Result<()> {
    if kind.is_wide() {
        return Err(Error::Unsupported("16-bit character types".into()));
    }
    if !kind.is_primitive() || kind == TypeKind::TK_NONE {
        return Err(Error::BadParameter(format!("{:?} is not a primitive", kind)));
    }
    Ok(())
}

fn check_spec(registry: &TypeRegistry, spec: &DynamicTypeSpec) -> Result<()> {
    match spec {
        DynamicTypeSpec::Primitive(kind) => check_primitive(*kind),
        DynamicTypeSpec::Type(ty) if !ty.registry().same_as(registry) => Err(Error::BadParameter(
            format!("type {} belongs to another registry", ty.name()),
        )),
        DynamicTypeSpec::Type(_) => Ok(()),
    }
}

fn is_discriminator(spec: &DynamicTypeSpec, depth: usize) -> bool {
    if depth > MAX_DISCRIMINATOR_ALIAS_DEPTH {
        return false;
    }
    match spec {
        DynamicTypeSpec::Primitive(kind) => kind.is_discriminator(),
        DynamicTypeSpec::Type(ty) => {
            let body = ty.shared.builder.lock().def.body.clone();
            match body {
                Body::Primitive(kind) => kind.is_discriminator(),
                Body::Enum { .. } => true,
                Body::Alias { related } => is_discriminator(&related, depth + 1),
                _ => false,
            }
        }
    }
}

fn literal_fits(value: i32, bit_bound: u16) -> bool {
    bit_bound >= 32 || (value >= 0 && (value as u64) < (1u64 << bit_bound))
}

/// Labels must be unique across cases; one default case at most.
fn check_case(cases: &[Member], desc: &MemberDescriptor) -> Result<()> {
    if desc.labels.is_empty() && !desc.is_default {
        return Err(Error::BadParameter(format!(
            "case {} has no label",
            desc.name
        )));
    }
    if desc.is_default && cases.iter().any(|c| c.is_default) {
        return Err(Error::BadParameter("union already has a default case".into()));
    }
    let mut seen: Vec<i32> = cases.iter().flat_map(|c| c.labels.iter().copied()).collect();
    for label in &desc.labels {
        if seen.contains(label) {
            return Err(Error::BadParameter(format!("duplicate case label {}", label)));
        }
        seen.push(*label);
    }
    Ok(())
}

fn insert_member(members: &mut Vec<Member>, desc: MemberDescriptor, autoid: AutoId) -> Result<u32> {
    if members.iter().any(|m| m.name == desc.name) {
        return Err(Error::BadParameter(format!(
            "duplicate member name {}",
            desc.name
        )));
    }
    let id = match (desc.id, autoid) {
        (Some(id), _) => id,
        (None, AutoId::Hash) => hash_member_id(&desc.name),
        (None, AutoId::Sequential) => match members.iter().map(|m| m.id).max() {
            Some(max) => max + 1,
            None => 0,
        },
    };
    if id > MEMBER_ID_MAX {
        return Err(Error::BadParameter(format!("member id {:#x} out of range", id)));
    }
    if members.iter().any(|m| m.id == id) {
        return Err(Error::BadParameter(format!("duplicate member id {}", id)));
    }
    let index = desc.index.unwrap_or(members.len());
    if index > members.len() {
        return Err(Error::BadParameter(format!(
            "member index {} out of range",
            index
        )));
    }
    members.insert(
        index,
        Member {
            id,
            name: desc.name,
            spec: desc.type_spec,
            key: false,
            optional: false,
            external: false,
            must_understand: false,
            hash_id: None,
            labels: desc.labels,
            is_default: desc.is_default,
        },
    );
    Ok(id)
}
