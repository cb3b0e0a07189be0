// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type and member flag words (XTypes 7.3.4.2).

use std::ops::BitOr;

/// Member, literal, discriminator and collection-element flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct MemberFlag(pub u16);

impl MemberFlag {
    pub const TRY_CONSTRUCT1: Self = Self(0x0001);
    pub const TRY_CONSTRUCT2: Self = Self(0x0002);
    /// @external
    pub const IS_EXTERNAL: Self = Self(0x0004);
    /// @optional
    pub const IS_OPTIONAL: Self = Self(0x0008);
    /// @must_understand
    pub const IS_MUST_UNDERSTAND: Self = Self(0x0010);
    /// @key
    pub const IS_KEY: Self = Self(0x0020);
    /// Default union case / default enum literal
    pub const IS_DEFAULT: Self = Self(0x0040);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    /// Copy with `flag` set or cleared.
    pub const fn with(self, flag: Self, on: bool) -> Self {
        if on {
            Self(self.0 | flag.0)
        } else {
            Self(self.0 & !flag.0)
        }
    }

    pub const fn is_key(self) -> bool {
        self.contains(Self::IS_KEY)
    }

    pub const fn is_must_understand(self) -> bool {
        self.contains(Self::IS_MUST_UNDERSTAND)
    }
}

impl BitOr for MemberFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Type-level flags (struct, union, enum, bitmask, collections).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct TypeFlag(pub u16);

impl TypeFlag {
    pub const IS_FINAL: Self = Self(0x0001);
    pub const IS_APPENDABLE: Self = Self(0x0002);
    pub const IS_MUTABLE: Self = Self(0x0004);
    pub const IS_NESTED: Self = Self(0x0008);
    pub const IS_AUTOID_HASH: Self = Self(0x0010);

    const EXTENSIBILITY_MASK: u16 = 0x0007;

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn contains(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    pub const fn with(self, flag: Self, on: bool) -> Self {
        if on {
            Self(self.0 | flag.0)
        } else {
            Self(self.0 & !flag.0)
        }
    }

    /// Extensibility encoded in the flag word. No bit set reads as FINAL.
    pub const fn extensibility(self) -> Extensibility {
        if self.contains(Self::IS_MUTABLE) {
            Extensibility::Mutable
        } else if self.contains(Self::IS_APPENDABLE) {
            Extensibility::Appendable
        } else {
            Extensibility::Final
        }
    }

    pub const fn with_extensibility(self, ext: Extensibility) -> Self {
        let cleared = self.0 & !Self::EXTENSIBILITY_MASK;
        Self(cleared | ext.flag().0)
    }
}

impl BitOr for TypeFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Aggregate extensibility kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Extensibility {
    #[default]
    Final,
    Appendable,
    Mutable,
}

impl Extensibility {
    pub const fn flag(self) -> TypeFlag {
        match self {
            Extensibility::Final => TypeFlag::IS_FINAL,
            Extensibility::Appendable => TypeFlag::IS_APPENDABLE,
            Extensibility::Mutable => TypeFlag::IS_MUTABLE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_flag_with() {
        let flags = MemberFlag::empty()
            .with(MemberFlag::IS_KEY, true)
            .with(MemberFlag::IS_MUST_UNDERSTAND, true);
        assert!(flags.is_key());
        assert!(flags.is_must_understand());
        let flags = flags.with(MemberFlag::IS_KEY, false);
        assert!(!flags.is_key());
        assert_eq!(flags, MemberFlag::IS_MUST_UNDERSTAND);
    }

    #[test]
    fn test_type_flag_extensibility() {
        assert_eq!(TypeFlag::empty().extensibility(), Extensibility::Final);
        let flags = TypeFlag::IS_NESTED | TypeFlag::IS_FINAL;
        let flags = flags.with_extensibility(Extensibility::Mutable);
        assert_eq!(flags.extensibility(), Extensibility::Mutable);
        assert!(flags.contains(TypeFlag::IS_NESTED));
        assert!(!flags.contains(TypeFlag::IS_FINAL));
    }
}
