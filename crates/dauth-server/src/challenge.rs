// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use anyhow::{bail, Result};
use rand::{thread_rng, Rng};
use smol_str::SmolStr;
use tracing::{info, warn};

use dauth_core::DigestAlgorithm;

use crate::nonce::generate_nonce;
use crate::verify::AuthRequest;
use crate::DigestAuthority;

/// Maximum artificial backward jump for the admission retry, in ms.
const JUMPBACK_MAX_MS: u64 = 0x7f;

/// A composed authentication challenge.
///
/// The daemon attaches [`Challenge::HEADER_NAME`] with `header_value` to
/// the access-denied response and queues it with `status`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub header_value: SmolStr,
    /// Always 401 Unauthorized.
    pub status: u16,
}

impl Challenge {
    pub const HEADER_NAME: &'static str = "WWW-Authenticate";
}

impl DigestAuthority {
    /// Build a challenge for the client, registering a fresh nonce.
    ///
    /// Fails when the nonce table is disabled. A full table is tolerated:
    /// the header still carries the generated nonce, its first use will
    /// verify as stale and the client retries automatically.
    ///
    /// `realm` and `opaque` are inserted verbatim; quoting them is the
    /// caller's responsibility.
    pub fn challenge(
        &self,
        request: &AuthRequest<'_>,
        realm: &str,
        opaque: &str,
        stale: bool,
        algo: DigestAlgorithm,
    ) -> Result<Challenge> {
        let algo = algo.resolve();
        if self.table.size() == 0 {
            bail!("nonce table size is zero, cannot issue digest challenges");
        }

        let first_ts = self.clock.monotonic_ms();
        let mut nonce = generate_nonce(
            first_ts,
            request.method,
            &self.seed,
            request.path,
            realm,
            algo,
        );
        if !self.table.try_reserve(&nonce, first_ts) {
            // Either the identical nonce is already in flight, or the slot
            // holds a fresh unused nonce. One retry at a slightly earlier
            // timestamp yields a different slot candidate.
            let mut retry_ts = self.clock.monotonic_ms();
            if retry_ts == first_ts {
                retry_ts = retry_ts.wrapping_sub(u64::from(thread_rng().gen::<u8>()) & JUMPBACK_MAX_MS);
                if retry_ts == first_ts {
                    retry_ts = retry_ts.wrapping_sub(2);
                }
            }
            let retry = generate_nonce(
                retry_ts,
                request.method,
                &self.seed,
                request.path,
                realm,
                algo,
            );
            if self.table.try_reserve(&retry, retry_ts) {
                nonce = retry;
            } else {
                warn!(
                    "could not register nonce; requests using it will always be stale, \
                     the nonce table may be undersized"
                );
            }
        }

        let header_value = format!(
            "Digest realm=\"{realm}\",qop=\"auth\",nonce=\"{nonce}\",opaque=\"{opaque}\",algorithm={algo_name}{stale_flag}",
            algo_name = algo.as_str(),
            stale_flag = if stale { ",stale=\"true\"" } else { "" },
        );
        info!(realm = %realm, algorithm = algo.as_str(), stale, "issuing digest challenge");

        Ok(Challenge {
            header_value: SmolStr::new(header_value),
            status: 401,
        })
    }
}
