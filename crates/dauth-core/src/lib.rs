// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core hashing primitives for HTTP Digest Access Authentication.
//!
//! This crate provides the algorithm-agnostic foundation for RFC 2617 /
//! RFC 7616 digest computation:
//! - **Algorithm tags**: [`DigestAlgorithm`] (MD5, SHA-256, auto-selection)
//! - **Streaming engine**: [`HashEngine`] with `update`/`finalize`, enum
//!   dispatched so the hot path carries no allocation or indirection
//! - **Digest pipeline**: [`compute_ha1`], [`compute_ha2`] and
//!   [`compute_response`] per RFC 2617 §3.2.2 / RFC 7616 §3.4
//! - **Comparison**: [`constant_time_eq`] for the final response check
//!
//! Only `qop=auth` and the empty (RFC 2069 compatibility) qop are supported;
//! `auth-int` and the `-sess` key-derivation variants are out of scope and
//! rejected by the verification layer.

mod algorithm;
mod compare;
mod digest;
mod engine;

pub use algorithm::DigestAlgorithm;
pub use compare::constant_time_eq;
pub use digest::{compute_ha1, compute_ha1_from_digest, compute_ha2, compute_response};
pub use engine::{hash_parts, DigestValue, HashEngine, MAX_DIGEST_SIZE};
