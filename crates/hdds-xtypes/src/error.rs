// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error type shared by the registry, builder and TypeLookup service.

use crate::xtypes::cdr2::CdrError;

/// Errors returned by the XTypes subsystem.
///
/// Structural corruption received from the network is never reported
/// through this type: the registry quarantines the affected nodes as
/// INVALID instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed call: duplicate ids, bad bounds, hash/identifier mismatch.
    BadParameter(String),
    /// A resource limit was hit. The registry is left unchanged.
    OutOfResources(String),
    /// Operation not valid in the current state (completed builder,
    /// unknown node, invalid type).
    PreconditionNotMet(String),
    /// Legal XTypes construct that this implementation does not handle.
    Unsupported(String),
    /// Waiting for a type exceeded its deadline.
    Timeout,
    /// Identifier/object encoding or decoding failed.
    Codec(CdrError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::BadParameter(msg) => write!(f, "Bad parameter: {}", msg),
            Error::OutOfResources(msg) => write!(f, "Out of resources: {}", msg),
            Error::PreconditionNotMet(msg) => write!(f, "Precondition not met: {}", msg),
            Error::Unsupported(msg) => write!(f, "Unsupported: {}", msg),
            Error::Timeout => write!(f, "Timeout"),
            Error::Codec(e) => write!(f, "CDR2 codec error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Codec(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CdrError> for Error {
    fn from(err: CdrError) -> Self {
        match err {
            CdrError::Unsupported(what) => Error::Unsupported(what.to_string()),
            other => Error::Codec(other),
        }
    }
}

/// Convenient alias for results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codec_unsupported_maps_to_unsupported() {
        let err: Error = CdrError::Unsupported("annotation type").into();
        assert_eq!(err, Error::Unsupported("annotation type".to_string()));
    }

    #[test]
    fn test_codec_error_keeps_source() {
        let err: Error = CdrError::UnexpectedEof { offset: 12 }.into();
        assert!(matches!(err, Error::Codec(_)));
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("offset 12"));
    }
}
