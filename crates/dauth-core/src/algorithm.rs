// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Digest algorithm per RFC 7616.
///
/// `Auto` lets the server pick; it resolves to SHA-256 when the engine is
/// set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Md5,
    Sha256,
    Auto,
}

impl DigestAlgorithm {
    /// Resolve `Auto` to the concrete algorithm used for computation.
    pub fn resolve(self) -> DigestAlgorithm {
        match self {
            DigestAlgorithm::Auto => DigestAlgorithm::Sha256,
            other => other,
        }
    }

    /// RFC token as it appears in `algorithm=` parameters.
    pub fn as_str(&self) -> &'static str {
        match self.resolve() {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Auto => unreachable!(),
        }
    }

    /// Parse an `algorithm=` token, ignoring US-ASCII case.
    ///
    /// Only the plain MD5 and SHA-256 tokens are accepted. The `-sess`
    /// variants are deliberately not recognized: clients selecting them
    /// cannot be verified by this implementation and must be refused.
    pub fn from_token(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("MD5") {
            Some(DigestAlgorithm::Md5)
        } else if s.eq_ignore_ascii_case("SHA-256") {
            Some(DigestAlgorithm::Sha256)
        } else {
            None
        }
    }

    /// Size of the binary digest in bytes.
    pub fn digest_size(&self) -> usize {
        match self.resolve() {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Auto => unreachable!(),
        }
    }

    /// Length of the hex-printed digest.
    pub fn hex_len(&self) -> usize {
        self.digest_size() * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_resolves_to_sha256() {
        assert_eq!(DigestAlgorithm::Auto.resolve(), DigestAlgorithm::Sha256);
        assert_eq!(DigestAlgorithm::Auto.as_str(), "SHA-256");
        assert_eq!(DigestAlgorithm::Auto.digest_size(), 32);
    }

    #[test]
    fn token_parsing_is_caseless() {
        assert_eq!(DigestAlgorithm::from_token("md5"), Some(DigestAlgorithm::Md5));
        assert_eq!(
            DigestAlgorithm::from_token("sha-256"),
            Some(DigestAlgorithm::Sha256)
        );
        assert_eq!(
            DigestAlgorithm::from_token("SHA-256"),
            Some(DigestAlgorithm::Sha256)
        );
    }

    #[test]
    fn session_variants_are_refused() {
        assert_eq!(DigestAlgorithm::from_token("MD5-sess"), None);
        assert_eq!(DigestAlgorithm::from_token("SHA-256-sess"), None);
        assert_eq!(DigestAlgorithm::from_token("SHA-512"), None);
        assert_eq!(DigestAlgorithm::from_token(""), None);
    }
}
