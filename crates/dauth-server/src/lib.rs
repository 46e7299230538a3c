// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Server-side HTTP Digest Access Authentication per RFC 2617 / RFC 7616.
//!
//! The [`DigestAuthority`] owns the per-daemon state: the secret nonce seed,
//! the nonce-nc replay table and the monotonic clock. Request handlers call
//! [`DigestAuthority::verify`] with the credentials they expect and
//! [`DigestAuthority::challenge`] to compose a `WWW-Authenticate` response.
//!
//! - **Nonce lifecycle**: nonces bind a keyed hash over method, URI and
//!   realm to an embedded 48-bit millisecond timestamp, so expiry is checked
//!   without any lookup and a captured nonce cannot be replayed across
//!   endpoints ([`generate_nonce`])
//! - **Replay defense**: a fixed-size [`NonceNcTable`] tracks the highest
//!   nonce-count per nonce plus a 64-value sliding window of out-of-order
//!   counts
//! - **Verification**: an ordered gate that classifies every failure
//!   deterministically ([`VerifyOutcome`])
//!
//! # Example
//!
//! ```
//! use dauth_server::{AuthRequest, Credential, DigestAlgorithm, DigestAuthority};
//!
//! let authority = DigestAuthority::new(DigestAuthority::generate_seed(8))
//!     .with_table_size(1000);
//!
//! let request = AuthRequest {
//!     method: "GET",
//!     path: "/status",
//!     query_args: &[],
//!     auth: None,
//! };
//! // No Authorization header yet: challenge the client.
//! let outcome = authority.verify(
//!     &request,
//!     "example.com",
//!     "alice",
//!     Credential::Password("secret"),
//!     DigestAlgorithm::Sha256,
//!     300,
//! );
//! assert!(!outcome.is_ok());
//! let challenge = authority
//!     .challenge(&request, "example.com", "opaque-token", false, DigestAlgorithm::Sha256)
//!     .unwrap();
//! assert_eq!(challenge.status, 401);
//! ```

mod challenge;
mod clock;
mod nonce;
mod table;
mod verify;

use std::borrow::Cow;
use std::sync::Arc;

use rand::{thread_rng, Rng};

pub use dauth_core::DigestAlgorithm;
pub use dauth_parse::{DigestParams, RawParam};

pub use challenge::Challenge;
pub use clock::{Clock, SystemClock};
pub use nonce::{generate_nonce, nonce_std_len, nonce_timestamp, MAX_NONCE_LEN};
pub use table::{NonceCheck, NonceNcTable};
pub use verify::{AuthRequest, Credential, LegacyOutcome, QueryArg, VerifyOutcome};

/// How long an unused nonce keeps its table slot before it may be
/// reclaimed for a new nonce, in milliseconds. Clients normally use a
/// fresh nonce immediately.
pub const REUSE_TIMEOUT_MS: u64 = 30_000;

/// Default nonce table capacity; raise it for busy daemons.
pub const DEFAULT_NONCE_TABLE_SIZE: usize = 4;

/// Per-daemon digest authentication state.
///
/// Cheap to share behind an `Arc`; all methods take `&self` and the only
/// interior mutability is the nonce table's single mutex.
pub struct DigestAuthority {
    pub(crate) seed: Vec<u8>,
    pub(crate) table: NonceNcTable,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) unescape: for<'a> fn(&'a str) -> Cow<'a, str>,
    pub(crate) strict_qop_case: bool,
}

impl DigestAuthority {
    /// Create an authority with the given secret seed.
    ///
    /// The seed is mixed into every nonce hash; without it a nonce cannot
    /// be forged. An empty seed is tolerated but weakens the scheme.
    pub fn new(seed: impl Into<Vec<u8>>) -> Self {
        Self {
            seed: seed.into(),
            table: NonceNcTable::new(DEFAULT_NONCE_TABLE_SIZE),
            clock: Arc::new(SystemClock::new()),
            unescape: dauth_parse::percent_decode,
            strict_qop_case: false,
        }
    }

    /// Set the nonce table capacity. Zero disables nonce-nc tracking:
    /// challenges fail to register and every reuse verifies as stale.
    pub fn with_table_size(mut self, size: usize) -> Self {
        self.table = NonceNcTable::new(size);
        self
    }

    /// Replace the monotonic millisecond clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the URL unescape callback used when comparing the client's
    /// `uri=` parameter against the request path.
    pub fn with_unescaper(mut self, unescape: for<'a> fn(&'a str) -> Cow<'a, str>) -> Self {
        self.unescape = unescape;
        self
    }

    /// Compare the client's `qop` byte-exact instead of ignoring ASCII
    /// case. RFC 7616 wants caseless matching; this flag restores the
    /// legacy behavior for bug-compatible deployments.
    pub fn with_strict_qop_case(mut self, strict: bool) -> Self {
        self.strict_qop_case = strict;
        self
    }

    /// Generate a random seed of the given length.
    pub fn generate_seed(len: usize) -> Vec<u8> {
        let mut seed = vec![0u8; len];
        thread_rng().fill(seed.as_mut_slice());
        seed
    }

    /// The nonce-nc replay table.
    pub fn nonce_table(&self) -> &NonceNcTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_seeds_differ() {
        let a = DigestAuthority::generate_seed(16);
        let b = DigestAuthority::generate_seed(16);
        assert_eq!(a.len(), 16);
        assert_ne!(a, b);
    }

    #[test]
    fn builder_configures_table_size() {
        let authority = DigestAuthority::new(b"seed".to_vec()).with_table_size(128);
        assert_eq!(authority.nonce_table().size(), 128);
    }
}
