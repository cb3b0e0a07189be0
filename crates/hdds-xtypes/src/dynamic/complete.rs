// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Turning a finished definition into MINIMAL and COMPLETE type objects.

use super::{Body, Completed, Definition, DynamicType, DynamicTypeIds, DynamicTypeSpec, Member};
use crate::error::{Error, Result};
use crate::xtypes::{
    AliasType, BitFlag, BitmaskType, CompleteForm, CompleteMemberDetail, CompleteTypeDetail,
    EnumeratedLiteral, EnumeratedType, MemberFlag, MinimalForm, MinimalMemberDetail,
    MinimalTypeDetail, Representation, StructMember, StructType, TypeBody, TypeFlag,
    TypeIdentifier, TypeMapping, TypeObject, UnionDiscriminator, UnionMember, UnionType,
};

/// How one TypeObject form fills in details and picks identifiers.
trait Form: Representation {
    fn type_detail(name: &str) -> Self::TypeDetail;
    fn member_detail(member: &str, hash_id: Option<&str>) -> Self::MemberDetail;
    fn pick(ids: &DynamicTypeIds) -> &TypeIdentifier;
    fn wrap(body: TypeBody<Self>) -> TypeObject;
}

impl Form for MinimalForm {
    fn type_detail(_name: &str) -> MinimalTypeDetail {
        MinimalTypeDetail
    }

    fn member_detail(member: &str, _hash_id: Option<&str>) -> MinimalMemberDetail {
        MinimalMemberDetail::for_name(member)
    }

    fn pick(ids: &DynamicTypeIds) -> &TypeIdentifier {
        &ids.minimal
    }

    fn wrap(body: TypeBody<Self>) -> TypeObject {
        TypeObject::Minimal(body)
    }
}

impl Form for CompleteForm {
    fn type_detail(name: &str) -> CompleteTypeDetail {
        CompleteTypeDetail::named(name)
    }

    fn member_detail(member: &str, hash_id: Option<&str>) -> CompleteMemberDetail {
        let mut detail = CompleteMemberDetail::named(member);
        detail.ann_builtin.hash_id = hash_id.map(str::to_string);
        detail
    }

    fn pick(ids: &DynamicTypeIds) -> &TypeIdentifier {
        &ids.complete
    }

    fn wrap(body: TypeBody<Self>) -> TypeObject {
        TypeObject::Complete(body)
    }
}

/// A definition whose type references are replaced by identifiers.
enum Resolved<'d> {
    Alias(DynamicTypeIds),
    Struct {
        base: Option<DynamicTypeIds>,
        members: Vec<(&'d Member, DynamicTypeIds)>,
    },
    Union {
        discriminator: DynamicTypeIds,
        discriminator_key: bool,
        cases: Vec<(&'d Member, DynamicTypeIds)>,
    },
    Enum(Vec<(&'d str, i32)>),
    Bitmask(Vec<(&'d str, u16)>),
}

/// Build the objects of `def`, completing its dependencies on the way.
/// `visiting` holds the types being completed further up.
pub(super) fn build(
    name: &str,
    def: &Definition,
    visiting: &mut Vec<DynamicType>,
) -> Result<Completed> {
    let mut mapping = TypeMapping::new();
    let resolved = match &def.body {
        Body::Primitive(kind) => {
            return Ok(plain(TypeIdentifier::primitive(*kind), mapping));
        }
        Body::String8 { bound } => {
            return Ok(plain(TypeIdentifier::string8(*bound), mapping));
        }
        Body::Sequence { element, bound } => {
            let el = dependency(element, visiting, &mut mapping)?;
            let ids = DynamicTypeIds {
                minimal: TypeIdentifier::sequence(el.minimal, *bound),
                complete: TypeIdentifier::sequence(el.complete, *bound),
            };
            return Ok(Completed { ids, mapping });
        }
        Body::Array { element, dims } => {
            let el = dependency(element, visiting, &mut mapping)?;
            let ids = DynamicTypeIds {
                minimal: TypeIdentifier::array(el.minimal, dims),
                complete: TypeIdentifier::array(el.complete, dims),
            };
            return Ok(Completed { ids, mapping });
        }
        Body::Alias { related } => Resolved::Alias(dependency(related, visiting, &mut mapping)?),
        Body::Struct { base, members } => {
            let base = match base {
                Some(base) => Some(base.complete_with(visiting).map(|done| {
                    merge(&mut mapping, &done.mapping);
                    done.ids
                })?),
                None => None,
            };
            let mut resolved = Vec::with_capacity(members.len());
            for member in members {
                resolved.push((member, dependency(&member.spec, visiting, &mut mapping)?));
            }
            Resolved::Struct {
                base,
                members: resolved,
            }
        }
        Body::Union {
            discriminator,
            discriminator_key,
            cases,
        } => {
            if cases.is_empty() {
                return Err(Error::BadParameter(format!("union {} has no case", name)));
            }
            let discriminator = dependency(discriminator, visiting, &mut mapping)?;
            let mut resolved = Vec::with_capacity(cases.len());
            for case in cases {
                resolved.push((case, dependency(&case.spec, visiting, &mut mapping)?));
            }
            Resolved::Union {
                discriminator,
                discriminator_key: *discriminator_key,
                cases: resolved,
            }
        }
        Body::Enum { literals } => {
            if literals.is_empty() {
                return Err(Error::BadParameter(format!("enum {} has no literal", name)));
            }
            Resolved::Enum(literals.iter().map(|l| (l.name.as_str(), l.value)).collect())
        }
        Body::Bitmask { flags } => {
            Resolved::Bitmask(flags.iter().map(|f| (f.name.as_str(), f.position)).collect())
        }
    };

    let minimal = MinimalForm::wrap(body::<MinimalForm>(name, def, &resolved));
    let complete = CompleteForm::wrap(body::<CompleteForm>(name, def, &resolved));
    let ids = DynamicTypeIds {
        minimal: minimal.type_identifier(),
        complete: complete.type_identifier(),
    };
    mapping.insert(ids.minimal.clone(), minimal);
    mapping.insert(ids.complete.clone(), complete);
    mapping.link(ids.complete.clone(), ids.minimal.clone());
    Ok(Completed { ids, mapping })
}

fn plain(id: TypeIdentifier, mapping: TypeMapping) -> Completed {
    Completed {
        ids: DynamicTypeIds::plain(id),
        mapping,
    }
}

fn dependency(
    spec: &DynamicTypeSpec,
    visiting: &mut Vec<DynamicType>,
    mapping: &mut TypeMapping,
) -> Result<DynamicTypeIds> {
    match spec {
        DynamicTypeSpec::Primitive(kind) => {
            Ok(DynamicTypeIds::plain(TypeIdentifier::primitive(*kind)))
        }
        DynamicTypeSpec::Type(ty) => {
            let done = ty.complete_with(visiting)?;
            merge(mapping, &done.mapping);
            Ok(done.ids)
        }
    }
}

fn merge(into: &mut TypeMapping, from: &TypeMapping) {
    for (id, obj) in from.iter() {
        into.insert(id.clone(), obj.clone());
    }
    for (complete, minimal) in &from.identifier_complete_minimal {
        into.link(complete.clone(), minimal.clone());
    }
}

fn type_flags(def: &Definition) -> TypeFlag {
    TypeFlag::empty()
        .with_extensibility(def.extensibility)
        .with(TypeFlag::IS_NESTED, def.nested)
}

fn member_flags(member: &Member) -> MemberFlag {
    MemberFlag::empty()
        .with(MemberFlag::IS_KEY, member.key)
        .with(MemberFlag::IS_MUST_UNDERSTAND, member.key || member.must_understand)
        .with(MemberFlag::IS_OPTIONAL, member.optional)
        .with(MemberFlag::IS_EXTERNAL, member.external)
        .with(MemberFlag::IS_DEFAULT, member.is_default)
}

fn body<F: Form>(name: &str, def: &Definition, resolved: &Resolved<'_>) -> TypeBody<F> {
    let flags = type_flags(def);
    let aggregate_flags = flags.with(
        TypeFlag::IS_AUTOID_HASH,
        def.autoid == super::AutoId::Hash,
    );
    match resolved {
        Resolved::Alias(related) => TypeBody::Alias(AliasType {
            alias_flags: TypeFlag::empty(),
            detail: F::type_detail(name),
            related_flags: MemberFlag::empty(),
            related_type: F::pick(related).clone(),
        }),
        Resolved::Struct { base, members } => TypeBody::Struct(StructType {
            struct_flags: aggregate_flags,
            base_type: base.as_ref().map(|b| F::pick(b).clone()),
            detail: F::type_detail(name),
            member_seq: members
                .iter()
                .map(|(m, ids)| StructMember {
                    member_id: m.id,
                    member_flags: member_flags(m),
                    member_type_id: F::pick(ids).clone(),
                    detail: F::member_detail(&m.name, m.hash_id.as_deref()),
                })
                .collect(),
        }),
        Resolved::Union {
            discriminator,
            discriminator_key,
            cases,
        } => TypeBody::Union(UnionType {
            union_flags: aggregate_flags,
            detail: F::type_detail(name),
            discriminator: UnionDiscriminator {
                member_flags: MemberFlag::empty()
                    .with(MemberFlag::IS_KEY, *discriminator_key)
                    .with(MemberFlag::IS_MUST_UNDERSTAND, *discriminator_key),
                type_id: F::pick(discriminator).clone(),
            },
            member_seq: cases
                .iter()
                .map(|(c, ids)| UnionMember {
                    member_id: c.id,
                    member_flags: MemberFlag::empty()
                        .with(MemberFlag::IS_EXTERNAL, c.external)
                        .with(MemberFlag::IS_DEFAULT, c.is_default),
                    type_id: F::pick(ids).clone(),
                    label_seq: c.labels.clone(),
                    detail: F::member_detail(&c.name, c.hash_id.as_deref()),
                })
                .collect(),
        }),
        Resolved::Enum(literals) => {
            let default_value = literals.first().map(|(_, v)| *v);
            let mut literal_seq: Vec<EnumeratedLiteral<F>> = literals
                .iter()
                .map(|(lit, value)| EnumeratedLiteral {
                    value: *value,
                    flags: MemberFlag::empty()
                        .with(MemberFlag::IS_DEFAULT, Some(*value) == default_value),
                    detail: F::member_detail(lit, None),
                })
                .collect();
            literal_seq.sort_by_key(|l| l.value);
            TypeBody::Enumerated(EnumeratedType {
                enum_flags: flags,
                bit_bound: def.bit_bound,
                detail: F::type_detail(name),
                literal_seq,
            })
        }
        Resolved::Bitmask(bits) => {
            let mut flag_seq: Vec<BitFlag<F>> = bits
                .iter()
                .map(|(flag, position)| BitFlag {
                    position: *position,
                    flags: MemberFlag::empty(),
                    detail: F::member_detail(flag, None),
                })
                .collect();
            flag_seq.sort_by_key(|f| f.position);
            TypeBody::Bitmask(BitmaskType {
                bitmask_flags: flags,
                bit_bound: def.bit_bound,
                detail: F::type_detail(name),
                flag_seq,
            })
        }
    }
}
