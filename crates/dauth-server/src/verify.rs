// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The request verification gate.
//!
//! Checks run in a fixed order and the first failure decides the outcome,
//! so a given request always classifies the same way. The nonce-count is
//! consumed before the URI checks on purpose: a one-shot nonce stays
//! consumed even when the rest of the request turns out to be wrong.

use std::borrow::Cow;

use smol_str::SmolStr;
use tracing::{debug, info, warn};

use dauth_core::{
    compute_ha1, compute_ha1_from_digest, compute_ha2, compute_response, constant_time_eq,
    DigestAlgorithm,
};
use dauth_parse::{is_param_equal, parse_hex_u64, parse_query_pairs, DigestParams, RawParam};

use crate::nonce::{generate_nonce, nonce_timestamp, timestamp_diff};
use crate::table::NonceCheck;
use crate::DigestAuthority;

const MAX_CNONCE_LEN: usize = 128;
const MAX_QOP_LEN: usize = 14;
const MAX_NC_LEN: usize = 19;
const MAX_RESPONSE_LEN: usize = 255;

/// Outcome of one verification, classified at the earliest failing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The response matches; the request is authenticated.
    Ok,
    /// Missing, oversized or malformed parameter; unsupported qop or
    /// algorithm; bad nc format.
    WrongHeader,
    /// The username does not match the expected one.
    WrongUsername,
    /// The realm does not match the expected one.
    WrongRealm,
    /// The nonce expired, the nonce-count was replayed, or the nonce was
    /// evicted. The client should retry with a fresh challenge
    /// (`stale=true`).
    NonceStale,
    /// The nonce was never issued by this server. Log-worthy: either a
    /// forgery attempt or a restart lost the table.
    NonceWrong,
    /// The `uri=` parameter disagrees with the request URI or its
    /// arguments.
    WrongUri,
    /// Everything checked out except the response digest: wrong password.
    ResponseWrong,
    /// Internal failure: a parameter exceeded a hard cap or credentials
    /// were unusable.
    Error,
}

impl VerifyOutcome {
    pub fn is_ok(self) -> bool {
        self == VerifyOutcome::Ok
    }

    /// Collapse to the coarse legacy taxonomy.
    pub fn collapse(self) -> LegacyOutcome {
        match self {
            VerifyOutcome::Ok => LegacyOutcome::Allowed,
            VerifyOutcome::NonceStale | VerifyOutcome::NonceWrong => LegacyOutcome::InvalidNonce,
            _ => LegacyOutcome::Denied,
        }
    }
}

/// The coarse result older call sites work with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyOutcome {
    Allowed,
    Denied,
    /// Nonce invalid or stale; the caller should re-challenge with
    /// `stale=true` instead of treating it as a bad password.
    InvalidNonce,
}

/// The server-held credential to verify against.
#[derive(Debug, Clone, Copy)]
pub enum Credential<'c> {
    /// Cleartext password.
    Password(&'c str),
    /// Binary `H(username ":" realm ":" password)` for the verification
    /// algorithm, so the cleartext never has to be stored.
    PrehashedA1(&'c [u8]),
}

/// One parsed GET argument of the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryArg {
    pub key: SmolStr,
    /// `None` for a bare key without `=`.
    pub value: Option<SmolStr>,
}

impl QueryArg {
    pub fn new(key: &str, value: Option<&str>) -> Self {
        Self {
            key: SmolStr::new(key),
            value: value.map(SmolStr::new),
        }
    }
}

/// What the daemon knows about the request under verification.
#[derive(Debug, Clone)]
pub struct AuthRequest<'r> {
    /// HTTP method, as sent.
    pub method: &'r str,
    /// Request path, already URL-unescaped, without the query part.
    pub path: &'r str,
    /// Parsed GET arguments of the request.
    pub query_args: &'r [QueryArg],
    /// The split digest parameters, or `None` when the request carried no
    /// `Authorization: Digest` header.
    pub auth: Option<DigestParams<'r>>,
}

/// Extract a required client field, enforcing its staging cap.
fn client_field<'a>(
    param: Option<&RawParam<'a>>,
    cap: usize,
) -> Result<Cow<'a, str>, VerifyOutcome> {
    let Some(param) = param else {
        return Err(VerifyOutcome::WrongHeader);
    };
    let Ok(value) = param.unquoted() else {
        return Err(VerifyOutcome::WrongHeader);
    };
    if value.is_empty() {
        return Err(VerifyOutcome::WrongHeader);
    }
    if value.len() > cap {
        return Err(VerifyOutcome::Error);
    }
    Ok(value)
}

impl DigestAuthority {
    /// Authenticate the authorization parameters sent by the client.
    ///
    /// `nonce_timeout_secs` bounds the age of the nonce the client used;
    /// a nonce exactly at the bound is still accepted.
    pub fn verify(
        &self,
        request: &AuthRequest<'_>,
        realm: &str,
        username: &str,
        credential: Credential<'_>,
        algo: DigestAlgorithm,
        nonce_timeout_secs: u32,
    ) -> VerifyOutcome {
        let algo = algo.resolve();
        let Some(params) = request.auth.as_ref() else {
            return VerifyOutcome::WrongHeader;
        };

        let Some(user_param) = params.username.as_ref() else {
            return VerifyOutcome::WrongHeader;
        };
        if !is_param_equal(user_param, username) {
            return VerifyOutcome::WrongUsername;
        }

        let Some(realm_param) = params.realm.as_ref() else {
            return VerifyOutcome::WrongHeader;
        };
        if !is_param_equal(realm_param, realm) {
            return VerifyOutcome::WrongRealm;
        }

        let Some(nonce_param) = params.nonce.as_ref() else {
            return VerifyOutcome::WrongHeader;
        };
        let Ok(nonce) = nonce_param.unquoted() else {
            return VerifyOutcome::WrongHeader;
        };
        if nonce.is_empty() {
            return VerifyOutcome::NonceWrong;
        }
        let Some(nonce_ts) = nonce_timestamp(&nonce) else {
            debug!("authentication failed, invalid nonce timestamp format");
            return VerifyOutcome::NonceWrong;
        };

        // First-level vetting: the timestamp alone decides expiry.
        let now = self.clock.monotonic_ms();
        if timestamp_diff(now, nonce_ts) > u64::from(nonce_timeout_secs) * 1000 {
            return VerifyOutcome::NonceStale;
        }

        // Second-level vetting: recompute the nonce for this request
        // context. A fabricated timestamp cannot survive this without the
        // server seed.
        let expected_nonce = generate_nonce(
            nonce_ts,
            request.method,
            &self.seed,
            request.path,
            realm,
            algo,
        );
        if expected_nonce.as_str() != nonce.as_ref() {
            warn!("nonce not generated by this server, possible attack attempt");
            return VerifyOutcome::NonceWrong;
        }

        let cnonce = match client_field(params.cnonce.as_ref(), MAX_CNONCE_LEN) {
            Ok(value) => value,
            Err(outcome) => return outcome,
        };

        let qop = match client_field(params.qop.as_ref(), MAX_QOP_LEN) {
            Ok(value) => value,
            Err(outcome) => return outcome,
        };
        let qop_supported = if self.strict_qop_case {
            qop == "auth"
        } else {
            qop.eq_ignore_ascii_case("auth")
        };
        if !qop_supported {
            debug!(qop = %qop, "unsupported qop");
            return VerifyOutcome::WrongHeader;
        }

        // Session variants cannot be verified here and must not fall
        // through to the plain computation.
        if let Some(algo_param) = params.algorithm.as_ref() {
            let Ok(token) = algo_param.unquoted() else {
                return VerifyOutcome::WrongHeader;
            };
            if DigestAlgorithm::from_token(&token).is_none() {
                debug!(algorithm = %token, "unsupported digest algorithm requested");
                return VerifyOutcome::WrongHeader;
            }
        }

        let nc_str = match client_field(params.nc.as_ref(), MAX_NC_LEN) {
            Ok(value) => value,
            Err(outcome) => return outcome,
        };
        let Some(nc) = parse_hex_u64(&nc_str) else {
            debug!("authentication failed, invalid nc format");
            return VerifyOutcome::WrongHeader;
        };
        if nc == 0 {
            debug!("authentication failed, invalid nc value");
            return VerifyOutcome::WrongHeader;
        }

        let response = match client_field(params.response.as_ref(), MAX_RESPONSE_LEN) {
            Ok(value) => value,
            Err(outcome) => return outcome,
        };

        // Replay defense. The nc is consumed here; a URI failure below
        // does not give it back.
        match self.table.check(&expected_nonce, nonce_ts, nc) {
            NonceCheck::Ok => {}
            NonceCheck::Stale => {
                info!(
                    "stale nonce received; if this happens a lot, increase the nonce table size"
                );
                return VerifyOutcome::NonceStale;
            }
            NonceCheck::Wrong => {
                warn!("nonce technically valid but never issued; this may indicate an attack");
                return VerifyOutcome::NonceWrong;
            }
        }

        let Some(uri_param) = params.uri.as_ref() else {
            return VerifyOutcome::WrongHeader;
        };
        let Ok(uri) = uri_param.unquoted() else {
            return VerifyOutcome::WrongHeader;
        };
        if uri.is_empty() {
            return VerifyOutcome::WrongHeader;
        }

        // H(A2) takes the uri exactly as the client sent it, query part
        // and escapes included.
        let ha1 = match credential {
            Credential::Password(password) => compute_ha1(algo, username, realm, password),
            Credential::PrehashedA1(digest) => {
                if digest.len() != algo.digest_size() {
                    debug_assert!(false, "prehashed credential does not match the algorithm");
                    return VerifyOutcome::Error;
                }
                compute_ha1_from_digest(digest)
            }
        };
        let ha2 = compute_ha2(algo, request.method, &uri);
        let expected = compute_response(algo, &ha1, &expected_nonce, &nc_str, &cnonce, &qop, &ha2);

        let (uri_path, uri_args) = match uri.split_once('?') {
            Some((path, args)) => (path, args),
            None => (uri.as_ref(), ""),
        };
        let unescaped = (self.unescape)(uri_path);
        if unescaped != request.path {
            debug!("authentication failed, URI does not match");
            return VerifyOutcome::WrongUri;
        }

        let pairs = parse_query_pairs(uri_args);
        for (key, value) in &pairs {
            let matched = request.query_args.iter().any(|arg| {
                arg.key == key.as_ref()
                    && match (&arg.value, value) {
                        (None, None) => true,
                        (Some(have), Some(want)) => have.as_str() == want.as_ref(),
                        _ => false,
                    }
            });
            if !matched {
                debug!("authentication failed, URI arguments do not match");
                return VerifyOutcome::WrongUri;
            }
        }
        if pairs.len() != request.query_args.len() {
            debug!("authentication failed, URI argument count does not match");
            return VerifyOutcome::WrongUri;
        }

        if constant_time_eq(expected.as_bytes(), response.as_bytes()) {
            VerifyOutcome::Ok
        } else {
            VerifyOutcome::ResponseWrong
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_maps_nonce_failures_to_invalid_nonce() {
        assert_eq!(VerifyOutcome::Ok.collapse(), LegacyOutcome::Allowed);
        assert_eq!(
            VerifyOutcome::NonceStale.collapse(),
            LegacyOutcome::InvalidNonce
        );
        assert_eq!(
            VerifyOutcome::NonceWrong.collapse(),
            LegacyOutcome::InvalidNonce
        );
        assert_eq!(
            VerifyOutcome::ResponseWrong.collapse(),
            LegacyOutcome::Denied
        );
        assert_eq!(VerifyOutcome::WrongHeader.collapse(), LegacyOutcome::Denied);
    }

    #[test]
    fn client_field_maps_errors() {
        assert_eq!(
            client_field(None, 16).unwrap_err(),
            VerifyOutcome::WrongHeader
        );
        let empty = RawParam {
            value: "",
            quoted: false,
        };
        assert_eq!(
            client_field(Some(&empty), 16).unwrap_err(),
            VerifyOutcome::WrongHeader
        );
        let oversize = RawParam {
            value: "0123456789abcdef0",
            quoted: false,
        };
        assert_eq!(
            client_field(Some(&oversize), 16).unwrap_err(),
            VerifyOutcome::Error
        );
        let good = RawParam {
            value: "0a4f113b",
            quoted: true,
        };
        assert_eq!(client_field(Some(&good), 16).unwrap().as_ref(), "0a4f113b");
    }
}
