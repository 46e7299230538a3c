// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nonce wire format.
//!
//! A nonce is `hex(H(ts48 ":" method ":" seed ":" uri ":" realm))` followed
//! by twelve hex chars of the 48-bit big-endian millisecond timestamp.
//! The keyed hash binds the nonce to its endpoint, the embedded timestamp
//! makes expiry an O(1) check with no per-nonce storage. A 48-bit
//! millisecond counter repeats only every ~8,900 years.

use dauth_core::{DigestAlgorithm, HashEngine, MAX_DIGEST_SIZE};
use smol_str::SmolStr;

pub(crate) const TIMESTAMP_BIN_SIZE: usize = 6;
pub(crate) const TIMESTAMP_HEX_LEN: usize = TIMESTAMP_BIN_SIZE * 2;

/// All timestamps live in the low 48 bits.
pub(crate) const TIMESTAMP_MAX: u64 = (1 << (TIMESTAMP_BIN_SIZE * 8)) - 1;

/// Longest nonce the server ever produces (SHA-256 class).
pub const MAX_NONCE_LEN: usize = MAX_DIGEST_SIZE * 2 + TIMESTAMP_HEX_LEN;

/// Wire length of a nonce for the given algorithm.
pub fn nonce_std_len(algo: DigestAlgorithm) -> usize {
    algo.hex_len() + TIMESTAMP_HEX_LEN
}

pub(crate) fn trim_timestamp(value: u64) -> u64 {
    value & TIMESTAMP_MAX
}

/// `later - earlier` modulo 2^48; wraps to a large value when `later` is
/// actually the older timestamp.
pub(crate) fn timestamp_diff(later: u64, earlier: u64) -> u64 {
    trim_timestamp(later.wrapping_sub(earlier))
}

/// Generate the nonce for the given request context.
///
/// Deterministic: identical inputs yield byte-identical nonces, which is
/// what lets the verifier recompute and compare instead of storing every
/// value it handed out.
pub fn generate_nonce(
    timestamp_ms: u64,
    method: &str,
    seed: &[u8],
    uri: &str,
    realm: &str,
    algo: DigestAlgorithm,
) -> SmolStr {
    let ts = trim_timestamp(timestamp_ms);
    let ts_bin = [
        (ts >> 40) as u8,
        (ts >> 32) as u8,
        (ts >> 24) as u8,
        (ts >> 16) as u8,
        (ts >> 8) as u8,
        ts as u8,
    ];

    let mut engine = HashEngine::new(algo);
    engine.update(&ts_bin);
    engine.update(b":");
    engine.update(method.as_bytes());
    engine.update(b":");
    if !seed.is_empty() {
        engine.update(seed);
    }
    engine.update(b":");
    engine.update(uri.as_bytes());
    engine.update(b":");
    engine.update(realm.as_bytes());
    let digest = engine.finalize();

    let mut nonce = String::with_capacity(nonce_std_len(algo));
    nonce.push_str(&digest.to_hex());
    nonce.push_str(&format!("{ts:012x}"));
    SmolStr::new(nonce)
}

/// Extract the embedded timestamp.
///
/// The nonce length must match one of the two supported classes and the
/// trailing twelve chars must be hex; anything else rejects.
pub fn nonce_timestamp(nonce: &str) -> Option<u64> {
    let len = nonce.len();
    if len != nonce_std_len(DigestAlgorithm::Md5) && len != nonce_std_len(DigestAlgorithm::Sha256) {
        return None;
    }
    let ts_part = nonce.get(len - TIMESTAMP_HEX_LEN..)?;
    dauth_parse::parse_hex_u64(ts_part)
}
