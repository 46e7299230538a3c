// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use sha2::{Digest as _, Sha256};

use crate::DigestAlgorithm;

/// Largest digest size handled by the engine (SHA-256 > MD5).
pub const MAX_DIGEST_SIZE: usize = 32;

/// Streaming digest engine, uniform over MD5 and SHA-256.
///
/// The active algorithm is carried by the variant itself; dispatch is a
/// plain `match`, with no boxing. `finalize` consumes the engine, so a
/// finished computation cannot be fed more data and a context cannot be
/// finalized twice. Re-hashing starts with a fresh [`HashEngine::new`].
pub enum HashEngine {
    Md5(md5::Context),
    Sha256(Sha256),
}

impl HashEngine {
    /// Start a new computation. `Auto` resolves to SHA-256.
    pub fn new(algo: DigestAlgorithm) -> Self {
        match algo.resolve() {
            DigestAlgorithm::Md5 => HashEngine::Md5(md5::Context::new()),
            DigestAlgorithm::Sha256 => HashEngine::Sha256(Sha256::new()),
            DigestAlgorithm::Auto => unreachable!(),
        }
    }

    /// The algorithm this engine was set up with.
    pub fn algorithm(&self) -> DigestAlgorithm {
        match self {
            HashEngine::Md5(_) => DigestAlgorithm::Md5,
            HashEngine::Sha256(_) => DigestAlgorithm::Sha256,
        }
    }

    /// Feed the computation with more data.
    pub fn update(&mut self, data: &[u8]) {
        match self {
            HashEngine::Md5(ctx) => ctx.consume(data),
            HashEngine::Sha256(ctx) => ctx.update(data),
        }
    }

    /// Finish the computation and return the digest.
    pub fn finalize(self) -> DigestValue {
        let mut value = DigestValue {
            bytes: [0u8; MAX_DIGEST_SIZE],
            len: 0,
        };
        match self {
            HashEngine::Md5(ctx) => {
                let digest = ctx.compute();
                value.bytes[..16].copy_from_slice(&digest.0);
                value.len = 16;
            }
            HashEngine::Sha256(ctx) => {
                let digest = ctx.finalize();
                value.bytes[..32].copy_from_slice(digest.as_slice());
                value.len = 32;
            }
        }
        value
    }
}

/// A finished digest in binary form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigestValue {
    bytes: [u8; MAX_DIGEST_SIZE],
    len: usize,
}

impl DigestValue {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Lowercase hex, exactly twice the digest size, no separators.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }
}

/// Hash a sequence of byte slices in one pass.
pub fn hash_parts(algo: DigestAlgorithm, parts: &[&[u8]]) -> DigestValue {
    let mut engine = HashEngine::new(algo);
    for part in parts {
        engine.update(part);
    }
    engine.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn md5_known_vector_empty() {
        // MD5("") = d41d8cd98f00b204e9800998ecf8427e
        let engine = HashEngine::new(DigestAlgorithm::Md5);
        assert_eq!(engine.finalize().to_hex(), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn sha256_known_vector_abc() {
        let mut engine = HashEngine::new(DigestAlgorithm::Sha256);
        engine.update(b"abc");
        assert_eq!(
            engine.finalize().to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn streaming_matches_one_shot() {
        let mut engine = HashEngine::new(DigestAlgorithm::Md5);
        engine.update(b"Mufasa:");
        engine.update(b"testrealm@host.com:");
        engine.update(b"Circle Of Life");
        let streamed = engine.finalize();
        let whole = hash_parts(
            DigestAlgorithm::Md5,
            &[b"Mufasa:testrealm@host.com:Circle Of Life"],
        );
        assert_eq!(streamed, whole);
    }

    #[test]
    fn auto_engine_is_sha256() {
        let engine = HashEngine::new(DigestAlgorithm::Auto);
        assert_eq!(engine.algorithm(), DigestAlgorithm::Sha256);
        assert_eq!(engine.finalize().as_bytes().len(), 32);
    }
}
