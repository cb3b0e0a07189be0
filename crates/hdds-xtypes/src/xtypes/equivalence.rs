// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Equivalence and name hashes (OMG DDS-XTypes v1.3, 7.3.4.8).

use md5::{Digest, Md5};
use std::fmt;

/// Largest member id; the top 4 bits are reserved.
pub const MEMBER_ID_MAX: u32 = 0x0FFF_FFFF;

fn md5_digest(data: &[u8]) -> [u8; 16] {
    let mut hasher = Md5::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&result);
    bytes
}

/// 14-byte equivalence hash: MD5 of the CDR2 encoded TypeObject, truncated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EquivalenceHash([u8; 14]);

impl EquivalenceHash {
    pub const fn from_bytes(bytes: [u8; 14]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; 14] {
        &self.0
    }

    pub const fn zero() -> Self {
        Self([0u8; 14])
    }

    /// Hash CDR2 encoded TypeObject bytes.
    pub fn compute(cdr2_data: &[u8]) -> Self {
        let digest = md5_digest(cdr2_data);
        let mut bytes = [0u8; 14];
        bytes.copy_from_slice(&digest[..14]);
        Self(bytes)
    }
}

impl fmt::Debug for EquivalenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EquivalenceHash({})", self)
    }
}

impl fmt::Display for EquivalenceHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl From<[u8; 14]> for EquivalenceHash {
    fn from(bytes: [u8; 14]) -> Self {
        Self::from_bytes(bytes)
    }
}

/// 4-byte member name hash carried by MINIMAL type objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NameHash(pub [u8; 4]);

impl NameHash {
    pub fn of(name: &str) -> Self {
        let digest = md5_digest(name.as_bytes());
        Self([digest[0], digest[1], digest[2], digest[3]])
    }
}

/// Member id derived from a name (`@autoid(HASH)` and `@hashid`).
pub fn hash_member_id(name: &str) -> u32 {
    u32::from_le_bytes(NameHash::of(name).0) & MEMBER_ID_MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_truncates_md5() {
        // MD5("") = d41d8cd98f00b204e9800998ecf8427e
        let hash = EquivalenceHash::compute(b"");
        assert_eq!(hash.to_string(), "d41d8cd98f00b204e9800998ecf8");
    }

    #[test]
    fn test_compute_is_deterministic() {
        let data = [0x51, 0x01, 0x00, 0x00, 0x04];
        assert_eq!(EquivalenceHash::compute(&data), EquivalenceHash::compute(&data));
        assert_ne!(
            EquivalenceHash::compute(&data),
            EquivalenceHash::compute(&data[..4])
        );
    }

    #[test]
    fn test_name_hash_prefix_of_digest() {
        // MD5("") prefix
        assert_eq!(NameHash::of("").0, [0xd4, 0x1d, 0x8c, 0xd9]);
        assert_ne!(NameHash::of("x"), NameHash::of("y"));
    }

    #[test]
    fn test_hash_member_id_masks_reserved_bits() {
        for name in ["a", "b", "temperature", "sensor_id"] {
            assert!(hash_member_id(name) <= MEMBER_ID_MAX);
        }
        assert_eq!(
            hash_member_id(""),
            u32::from_le_bytes([0xd4, 0x1d, 0x8c, 0xd9]) & MEMBER_ID_MAX
        );
    }
}
