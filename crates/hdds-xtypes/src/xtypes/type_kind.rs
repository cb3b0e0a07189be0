// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeKind octets per OMG DDS-XTypes v1.3 (dds-xtypes_typeobject.idl).

macro_rules! type_kinds {
    ($($(#[$doc:meta])* $name:ident = $value:literal,)+) => {
        /// TypeKind identifies primitive and constructed types.
        ///
        /// Primitive kinds double as fully-descriptive TypeIdentifier
        /// discriminators; constructed kinds discriminate TypeObject bodies.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(u8)]
        #[allow(non_camel_case_types)]
        pub enum TypeKind {
            $($(#[$doc])* $name = $value,)+
        }

        impl TypeKind {
            pub const fn to_u8(self) -> u8 {
                self as u8
            }

            pub const fn from_u8(value: u8) -> Option<Self> {
                match value {
                    $($value => Some(TypeKind::$name),)+
                    _ => None,
                }
            }
        }
    };
}

type_kinds! {
    /// No type (absent base type, invalid)
    TK_NONE = 0x00,
    TK_BOOLEAN = 0x01,
    TK_BYTE = 0x02,
    TK_INT16 = 0x03,
    TK_INT32 = 0x04,
    TK_INT64 = 0x05,
    TK_UINT16 = 0x06,
    TK_UINT32 = 0x07,
    TK_UINT64 = 0x08,
    TK_FLOAT32 = 0x09,
    TK_FLOAT64 = 0x0A,
    TK_FLOAT128 = 0x0B,
    TK_INT8 = 0x0C,
    TK_UINT8 = 0x0D,
    TK_CHAR8 = 0x10,
    /// Wide character (UTF-16 code unit)
    TK_CHAR16 = 0x11,
    TK_STRING8 = 0x20,
    TK_STRING16 = 0x21,
    TK_ALIAS = 0x30,
    TK_ENUM = 0x40,
    TK_BITMASK = 0x41,
    TK_ANNOTATION = 0x50,
    TK_STRUCTURE = 0x51,
    TK_UNION = 0x52,
    TK_BITSET = 0x53,
    TK_SEQUENCE = 0x60,
    TK_ARRAY = 0x61,
    TK_MAP = 0x62,
}

impl TypeKind {
    /// Primitive kinds are identified directly, without a TypeObject.
    pub const fn is_primitive(self) -> bool {
        matches!(
            self,
            TypeKind::TK_BOOLEAN
                | TypeKind::TK_BYTE
                | TypeKind::TK_INT16
                | TypeKind::TK_INT32
                | TypeKind::TK_INT64
                | TypeKind::TK_UINT16
                | TypeKind::TK_UINT32
                | TypeKind::TK_UINT64
                | TypeKind::TK_FLOAT32
                | TypeKind::TK_FLOAT64
                | TypeKind::TK_FLOAT128
                | TypeKind::TK_INT8
                | TypeKind::TK_UINT8
                | TypeKind::TK_CHAR8
                | TypeKind::TK_CHAR16
        )
    }

    pub const fn is_string(self) -> bool {
        matches!(self, TypeKind::TK_STRING8 | TypeKind::TK_STRING16)
    }

    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            TypeKind::TK_SEQUENCE | TypeKind::TK_ARRAY | TypeKind::TK_MAP
        )
    }

    pub const fn is_aggregate(self) -> bool {
        matches!(self, TypeKind::TK_STRUCTURE | TypeKind::TK_UNION)
    }

    /// Unsigned integer width in bits (used by bitmask assignability).
    pub const fn unsigned_bits(self) -> Option<u16> {
        match self {
            TypeKind::TK_BYTE | TypeKind::TK_UINT8 => Some(8),
            TypeKind::TK_UINT16 => Some(16),
            TypeKind::TK_UINT32 => Some(32),
            TypeKind::TK_UINT64 => Some(64),
            _ => None,
        }
    }

    /// Kinds accepted as union discriminator (besides enums and aliases).
    pub const fn is_discriminator(self) -> bool {
        matches!(
            self,
            TypeKind::TK_BOOLEAN
                | TypeKind::TK_BYTE
                | TypeKind::TK_INT8
                | TypeKind::TK_UINT8
                | TypeKind::TK_INT16
                | TypeKind::TK_UINT16
                | TypeKind::TK_INT32
                | TypeKind::TK_UINT32
                | TypeKind::TK_INT64
                | TypeKind::TK_UINT64
                | TypeKind::TK_CHAR8
        )
    }

    /// 16-bit character kinds have no builder support.
    pub const fn is_wide(self) -> bool {
        matches!(self, TypeKind::TK_CHAR16 | TypeKind::TK_STRING16)
    }
}

impl TryFrom<u8> for TypeKind {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        TypeKind::from_u8(value).ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typekind_octets_match_xtypes_idl() {
        assert_eq!(TypeKind::TK_ENUM.to_u8(), 0x40);
        assert_eq!(TypeKind::TK_STRUCTURE.to_u8(), 0x51);
        assert_eq!(TypeKind::TK_SEQUENCE.to_u8(), 0x60);
        assert_eq!(TypeKind::from_u8(0x52), Some(TypeKind::TK_UNION));
        assert_eq!(TypeKind::from_u8(0x0E), None);
        assert_eq!(TypeKind::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn test_typekind_classes() {
        assert!(TypeKind::TK_CHAR16.is_primitive());
        assert!(!TypeKind::TK_STRING8.is_primitive());
        assert!(TypeKind::TK_STRING16.is_string());
        assert!(TypeKind::TK_MAP.is_collection());
        assert!(TypeKind::TK_UNION.is_aggregate());
        assert!(!TypeKind::TK_FLOAT32.is_discriminator());
        assert!(TypeKind::TK_CHAR8.is_discriminator());
    }

    #[test]
    fn test_unsigned_bits() {
        assert_eq!(TypeKind::TK_UINT8.unsigned_bits(), Some(8));
        assert_eq!(TypeKind::TK_UINT64.unsigned_bits(), Some(64));
        assert_eq!(TypeKind::TK_INT32.unsigned_bits(), None);
    }
}
