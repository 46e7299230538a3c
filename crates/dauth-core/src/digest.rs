// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! H(A1) / H(A2) / response computation per RFC 2617 §3.2.2 and
//! RFC 7616 §3.4.
//!
//! All values are streamed into the engine field by field with literal `:`
//! separators, so no intermediate concatenation is allocated. `nc`, `cnonce`
//! and `qop` are hashed exactly as the client sent them.

use crate::engine::HashEngine;
use crate::DigestAlgorithm;

/// H(A1) = H(username ":" realm ":" password), hex encoded.
pub fn compute_ha1(algo: DigestAlgorithm, username: &str, realm: &str, password: &str) -> String {
    let mut engine = HashEngine::new(algo);
    engine.update(username.as_bytes());
    engine.update(b":");
    engine.update(realm.as_bytes());
    engine.update(b":");
    engine.update(password.as_bytes());
    engine.finalize().to_hex()
}

/// H(A1) from a pre-computed binary `H(username:realm:password)`.
///
/// The caller holds the hash instead of the cleartext password; the digest
/// only needs hex encoding. The slice length must match the algorithm's
/// digest size.
pub fn compute_ha1_from_digest(digest: &[u8]) -> String {
    hex::encode(digest)
}

/// H(A2) = H(method ":" uri), hex encoded.
///
/// `uri` is the request-uri exactly as the client sent it in the `uri=`
/// parameter, query part included. Only `qop=auth` is supported, so the
/// entity-body hash of `auth-int` never participates.
pub fn compute_ha2(algo: DigestAlgorithm, method: &str, uri: &str) -> String {
    let mut engine = HashEngine::new(algo);
    engine.update(method.as_bytes());
    engine.update(b":");
    engine.update(uri.as_bytes());
    engine.finalize().to_hex()
}

/// The request-digest.
///
/// With a non-empty qop:
/// `H(HA1 ":" nonce ":" nc ":" cnonce ":" qop ":" HA2)`; with the empty
/// qop the RFC 2069 compatibility form `H(HA1 ":" nonce ":" HA2)`.
pub fn compute_response(
    algo: DigestAlgorithm,
    ha1: &str,
    nonce: &str,
    nc: &str,
    cnonce: &str,
    qop: &str,
    ha2: &str,
) -> String {
    let mut engine = HashEngine::new(algo);
    engine.update(ha1.as_bytes());
    engine.update(b":");
    engine.update(nonce.as_bytes());
    engine.update(b":");
    if !qop.is_empty() {
        engine.update(nc.as_bytes());
        engine.update(b":");
        engine.update(cnonce.as_bytes());
        engine.update(b":");
        engine.update(qop.as_bytes());
        engine.update(b":");
    }
    engine.update(ha2.as_bytes());
    engine.finalize().to_hex()
}

#[cfg(test)]
mod tests {
    use super::*;

    // The RFC 2617 §3.5 example: GET /dir/index.html by Mufasa.
    const REALM: &str = "testrealm@host.com";
    const NONCE: &str = "dcd98b7102dd2f0e8b11d0f600bfb0c093";

    #[test]
    fn rfc_2617_ha1_vector() {
        let ha1 = compute_ha1(DigestAlgorithm::Md5, "Mufasa", REALM, "Circle Of Life");
        assert_eq!(ha1, "939e7578ed9e3c518a452acee763bce9");
    }

    #[test]
    fn rfc_2617_ha2_vector() {
        let ha2 = compute_ha2(DigestAlgorithm::Md5, "GET", "/dir/index.html");
        assert_eq!(ha2, "39aff3a2bab6126f332b942af96d3366");
    }

    #[test]
    fn rfc_2617_response_vector() {
        let ha1 = compute_ha1(DigestAlgorithm::Md5, "Mufasa", REALM, "Circle Of Life");
        let ha2 = compute_ha2(DigestAlgorithm::Md5, "GET", "/dir/index.html");
        let response = compute_response(
            DigestAlgorithm::Md5,
            &ha1,
            NONCE,
            "00000001",
            "0a4f113b",
            "auth",
            &ha2,
        );
        assert_eq!(response, "6629fae49393a05397450978507c4ef1");
    }

    #[test]
    fn prehashed_credential_matches_password_form() {
        let from_password = compute_ha1(DigestAlgorithm::Md5, "Mufasa", REALM, "Circle Of Life");
        let digest = crate::engine::hash_parts(
            DigestAlgorithm::Md5,
            &[b"Mufasa:testrealm@host.com:Circle Of Life"],
        );
        assert_eq!(compute_ha1_from_digest(digest.as_bytes()), from_password);
    }

    #[test]
    fn empty_qop_uses_rfc_2069_form() {
        let ha1 = compute_ha1(DigestAlgorithm::Md5, "Mufasa", REALM, "Circle Of Life");
        let ha2 = compute_ha2(DigestAlgorithm::Md5, "GET", "/dir/index.html");
        let with_qop = compute_response(
            DigestAlgorithm::Md5,
            &ha1,
            NONCE,
            "00000001",
            "0a4f113b",
            "auth",
            &ha2,
        );
        let without_qop = compute_response(DigestAlgorithm::Md5, &ha1, NONCE, "", "", "", &ha2);
        assert_ne!(with_qop, without_qop);
        // RFC 2069 form depends only on ha1, nonce and ha2.
        let again = compute_response(
            DigestAlgorithm::Md5,
            &ha1,
            NONCE,
            "ignored",
            "ignored",
            "",
            &ha2,
        );
        assert_eq!(without_qop, again);
    }
}
