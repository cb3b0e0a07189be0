// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Endpoint identity used for TypeLookup correlation and rematch lists.

use std::fmt;

/// 16-byte RTPS endpoint GUID: participant prefix then entity id.
///
/// Ordered so that endpoint lists can be sorted and de-duplicated.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Guid {
    pub prefix: [u8; 12],
    pub entity_id: [u8; 4],
}

impl Guid {
    /// Entity id of the builtin TypeLookup request writer.
    pub const ENTITYID_TL_SVC_REQ_WRITER: [u8; 4] = [0x00, 0x03, 0x00, 0xC3];

    /// Entity id of the builtin TypeLookup reply writer.
    pub const ENTITYID_TL_SVC_REPLY_WRITER: [u8; 4] = [0x00, 0x03, 0x01, 0xC3];

    pub fn new(prefix: [u8; 12], entity_id: [u8; 4]) -> Self {
        Self { prefix, entity_id }
    }

    /// Wire layout as carried in a TypeLookup sample identity.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        let (prefix, entity_id) = bytes.split_at(12);
        let mut guid = Self::new([0; 12], [0; 4]);
        guid.prefix.copy_from_slice(prefix);
        guid.entity_id.copy_from_slice(entity_id);
        guid
    }

    pub fn as_bytes(&self) -> [u8; 16] {
        let mut bytes = [0u8; 16];
        let (prefix, entity_id) = bytes.split_at_mut(12);
        prefix.copy_from_slice(&self.prefix);
        entity_id.copy_from_slice(&self.entity_id);
        bytes
    }
}

fn write_hex(f: &mut fmt::Formatter<'_>, bytes: &[u8]) -> fmt::Result {
    bytes.iter().try_for_each(|b| write!(f, "{:02x}", b))
}

impl fmt::Display for Guid {
    /// `prefix|entity`, e.g. `aaaaaaaaaaaaaaaaaaaaaaaa|000300c3`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_hex(f, &self.prefix)?;
        f.write_str("|")?;
        write_hex(f, &self.entity_id)
    }
}

impl fmt::Debug for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Guid({})", self)
    }
}
