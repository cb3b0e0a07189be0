// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TypeLookup request/reply service.
//!
//! Fetches the objects of types known only by identifier from the remote
//! participant that announced them.
//!
//! # Protocol
//!
//! ```text
//! Client                                   Server
//!   |  Request {writer_id, seq_no, ids}      |
//!   |--------------------------------------->|  handle_request()
//!   |  Reply {writer_id, seq_no, types}      |
//!   |<---------------------------------------|
//! handle_reply(): verify hash, attach, request new dependencies,
//!                 re-match waiting endpoints
//! ```
//!
//! Per identifier: UNRESOLVED -> REQUESTED -> RESOLVED. A second request
//! for a REQUESTED identifier is suppressed; an unanswered one is re-sent
//! by [`TypeLookupService::resend_pending`] under its original sequence
//! number. Carrying the samples is left to a [`TypeLookupTransport`].

mod messages;
mod service;

#[cfg(test)]
mod tests;

pub use messages::{TypeLookupReply, TypeLookupRequest, CDR2_LE};
pub use service::{RematchCallback, TypeLookupService, TypeLookupTransport};
