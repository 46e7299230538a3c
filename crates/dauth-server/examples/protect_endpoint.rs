// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Example demonstrating the server-side digest flow.
///
/// This example shows how to:
/// 1. Set up a DigestAuthority at daemon start
/// 2. Challenge a request that carries no Authorization header
/// 3. Verify the authorized retry a client would send
use dauth_core::{compute_ha1, compute_ha2, compute_response};
use dauth_server::{
    AuthRequest, Challenge, Credential, DigestAlgorithm, DigestAuthority, DigestParams,
};

fn main() -> anyhow::Result<()> {
    // Step 1: daemon-scoped state. The seed is secret; the table bounds
    // how many outstanding nonces are tracked for replay defense.
    let authority = DigestAuthority::new(DigestAuthority::generate_seed(16)).with_table_size(1000);

    let realm = "example.com";
    let request = AuthRequest {
        method: "GET",
        path: "/protected",
        query_args: &[],
        auth: None,
    };

    // Step 2: no credentials yet, emit the challenge.
    let challenge = authority.challenge(&request, realm, "opaque-1", false, DigestAlgorithm::Sha256)?;
    println!("HTTP/1.1 {} Unauthorized", challenge.status);
    println!("{}: {}", Challenge::HEADER_NAME, challenge.header_value);

    // Step 3: a well-behaved client answers the challenge. Here we play
    // both sides; a real client derives the same response from the header.
    let nonce = {
        let value = challenge.header_value.as_str();
        let start = value.find("nonce=\"").unwrap() + 7;
        let end = value[start..].find('"').unwrap() + start;
        value[start..end].to_string()
    };
    let ha1 = compute_ha1(DigestAlgorithm::Sha256, "alice", realm, "wonderland");
    let ha2 = compute_ha2(DigestAlgorithm::Sha256, "GET", "/protected");
    let response = compute_response(
        DigestAlgorithm::Sha256,
        &ha1,
        &nonce,
        "00000001",
        "f2a3b4c5",
        "auth",
        &ha2,
    );
    let header = format!(
        "Digest username=\"alice\", realm=\"{realm}\", nonce=\"{nonce}\", uri=\"/protected\", \
         qop=auth, nc=00000001, cnonce=\"f2a3b4c5\", response=\"{response}\", algorithm=SHA-256"
    );
    println!("\nAuthorization: {header}");

    let retry = AuthRequest {
        method: "GET",
        path: "/protected",
        query_args: &[],
        auth: DigestParams::parse(&header),
    };
    let outcome = authority.verify(
        &retry,
        realm,
        "alice",
        Credential::Password("wonderland"),
        DigestAlgorithm::Sha256,
        300,
    );
    println!("\nverification outcome: {outcome:?}");
    assert!(outcome.is_ok());
    Ok(())
}
