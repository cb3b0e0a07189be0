// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Boundary to application type descriptors.

use super::state::{verify_object, verify_scc};
use crate::error::{Error, Result};
use crate::xtypes::{
    SccId, TypeIdentifier, TypeInformation, TypeKind, TypeMapping, TypeObject, TypeObjectHashId,
};
use std::collections::HashMap;

/// Application type descriptor as seen by the registry.
///
/// Both blobs are CDR2 encoded: `type_information` a [`TypeInformation`],
/// `type_mapping` a [`TypeMapping`] holding every object the top-level
/// types need.
pub trait Sertype: Send + Sync {
    fn type_name(&self) -> &str;
    fn type_information(&self) -> Option<Vec<u8>>;
    fn type_mapping(&self) -> Option<Vec<u8>>;
}

/// Owned [`Sertype`] built from already encoded blobs.
#[derive(Debug, Clone)]
pub struct LocalType {
    type_name: String,
    type_information: Option<Vec<u8>>,
    type_mapping: Option<Vec<u8>>,
}

impl LocalType {
    pub fn new(type_name: impl Into<String>, info: &TypeInformation, mapping: &TypeMapping) -> Self {
        Self {
            type_name: type_name.into(),
            type_information: Some(info.to_cdr2_bytes()),
            type_mapping: Some(mapping.to_cdr2_bytes()),
        }
    }

    pub fn from_bytes(
        type_name: impl Into<String>,
        type_information: Option<Vec<u8>>,
        type_mapping: Option<Vec<u8>>,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            type_information,
            type_mapping,
        }
    }
}

impl Sertype for LocalType {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn type_information(&self) -> Option<Vec<u8>> {
        self.type_information.clone()
    }

    fn type_mapping(&self) -> Option<Vec<u8>> {
        self.type_mapping.clone()
    }
}

/// Decode and check a descriptor before anything is interned.
pub(crate) fn decode_sertype(sertype: &dyn Sertype) -> Result<(TypeInformation, TypeMapping)> {
    let info_bytes = sertype.type_information().ok_or_else(|| {
        Error::BadParameter(format!("{}: no type information", sertype.type_name()))
    })?;
    let mapping_bytes = sertype.type_mapping().ok_or_else(|| {
        Error::BadParameter(format!("{}: no type mapping", sertype.type_name()))
    })?;
    let info = TypeInformation::from_cdr2_bytes(&info_bytes)?;
    let mapping = TypeMapping::from_cdr2_bytes(&mapping_bytes)?;
    if !info.is_valid() {
        return Err(Error::BadParameter(format!(
            "{}: invalid type information",
            sertype.type_name()
        )));
    }
    verify_mapping(&mapping)?;

    for top in [info.minimal_id(), info.complete_id()].into_iter().flatten() {
        let obj = mapping.object(top).ok_or_else(|| {
            Error::BadParameter(format!("{}: no object for {}", sertype.type_name(), top))
        })?;
        if !matches!(obj.type_kind(), TypeKind::TK_STRUCTURE | TypeKind::TK_UNION) {
            return Err(Error::BadParameter(format!(
                "{}: top-level type must be a struct or union, not {:?}",
                sertype.type_name(),
                obj.type_kind()
            )));
        }
    }
    Ok((info, mapping))
}

/// Every object hashes to the identifier it is filed under; components are
/// complete and hash to their component hash.
pub(crate) fn verify_mapping(mapping: &TypeMapping) -> Result<()> {
    let mut components: HashMap<TypeObjectHashId, (i32, Vec<(i32, &TypeObject)>)> =
        HashMap::new();
    for (id, obj) in mapping.iter() {
        match id {
            TypeIdentifier::StronglyConnected(scc) => {
                if !scc.is_valid_part() {
                    return Err(Error::BadParameter(format!("invalid SCC identifier {}", id)));
                }
                let entry = components
                    .entry(scc.component)
                    .or_insert_with(|| (scc.length, Vec::new()));
                if entry.0 != scc.length {
                    return Err(Error::BadParameter(format!(
                        "inconsistent component length for {}",
                        id
                    )));
                }
                entry.1.push((scc.index, obj));
            }
            _ if verify_object(id, obj) => {}
            _ => {
                log::warn!("[TypeRegistry] hash mismatch for local type {}", id);
                return Err(Error::BadParameter(format!("hash mismatch for {}", id)));
            }
        }
    }
    for (component, (length, mut parts)) in components {
        parts.sort_by_key(|(index, _)| *index);
        let in_order = parts
            .iter()
            .enumerate()
            .all(|(pos, (index, _))| *index == pos as i32 + 1);
        let objects: Vec<TypeObject> = parts.into_iter().map(|(_, obj)| obj.clone()).collect();
        let scc = SccId {
            component,
            length,
            index: 1,
        };
        if !in_order || !verify_scc(&scc, &objects) {
            return Err(Error::BadParameter(format!(
                "component {} incomplete or hash mismatch",
                component.hash
            )));
        }
    }
    Ok(())
}

/// Objects of one component from a verified mapping, in index order.
pub(crate) fn scc_objects_from(mapping: &TypeMapping, scc: &SccId) -> Option<Vec<TypeObject>> {
    (1..=scc.length)
        .map(|index| {
            mapping
                .object(&TypeIdentifier::StronglyConnected(scc.part(index)))
                .cloned()
        })
        .collect()
}
