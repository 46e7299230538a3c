// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw `Authorization: Digest` parameter splitting.
//!
//! The splitter only locates parameter boundaries. Quoted values are
//! returned as the slice between the DQUOTEs with their escapes intact and
//! the `quoted` flag set; resolving escapes is the consumer's decision
//! (most checks compare quoted-aware without ever allocating).

use std::borrow::Cow;

use crate::unquote::{unquote, UnquoteError, MAX_PARAM_SIZE};

/// One raw parameter value as found in the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawParam<'a> {
    /// The value bytes. For a quoted value the delimiting DQUOTEs are
    /// stripped but backslash escapes are not resolved.
    pub value: &'a str,
    /// Whether the value was a quoted-string.
    pub quoted: bool,
}

impl<'a> RawParam<'a> {
    /// The value with quoted-string escapes resolved.
    ///
    /// Unquoted values pass through untouched whatever their size; quoted
    /// values above [`MAX_PARAM_SIZE`] are refused before any copy is made.
    pub fn unquoted(&self) -> Result<Cow<'a, str>, UnquoteError> {
        if !self.quoted {
            return Ok(Cow::Borrowed(self.value));
        }
        if self.value.len() > MAX_PARAM_SIZE {
            return Err(UnquoteError::TooLarge);
        }
        unquote(self.value).ok_or(UnquoteError::Broken)
    }
}

/// The digest parameter set of one request.
#[derive(Debug, Default, Clone)]
pub struct DigestParams<'a> {
    pub username: Option<RawParam<'a>>,
    pub realm: Option<RawParam<'a>>,
    pub nonce: Option<RawParam<'a>>,
    pub cnonce: Option<RawParam<'a>>,
    pub qop: Option<RawParam<'a>>,
    pub nc: Option<RawParam<'a>>,
    pub uri: Option<RawParam<'a>>,
    pub response: Option<RawParam<'a>>,
    pub algorithm: Option<RawParam<'a>>,
    pub opaque: Option<RawParam<'a>>,
}

impl<'a> DigestParams<'a> {
    /// Split an `Authorization` header value of the form `Digest ...`.
    ///
    /// Returns `None` for a different scheme or broken syntax (missing
    /// `=`, unterminated quoted-string). Unknown parameters are ignored;
    /// a repeated parameter keeps its last occurrence.
    pub fn parse(header_value: &'a str) -> Option<DigestParams<'a>> {
        let trimmed = header_value.trim();
        let (scheme, rest) = match trimmed.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((scheme, rest)) => (scheme, rest.trim_start()),
            None => (trimmed, ""),
        };
        if !scheme.eq_ignore_ascii_case("Digest") {
            return None;
        }

        let mut params = DigestParams::default();
        let bytes = rest.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b',') {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }

            let key_start = i;
            while i < bytes.len()
                && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b'_')
            {
                i += 1;
            }
            if i == key_start {
                return None;
            }
            let key = &rest[key_start..i];

            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() || bytes[i] != b'=' {
                return None;
            }
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }

            let param = if i < bytes.len() && bytes[i] == b'"' {
                i += 1;
                let value_start = i;
                let mut closed = false;
                while i < bytes.len() {
                    match bytes[i] {
                        b'\\' if i + 1 < bytes.len() => i += 2,
                        b'"' => {
                            closed = true;
                            break;
                        }
                        _ => i += 1,
                    }
                }
                if !closed {
                    return None;
                }
                let value = &rest[value_start..i];
                i += 1;
                RawParam {
                    value,
                    quoted: true,
                }
            } else {
                let value_start = i;
                while i < bytes.len() && bytes[i] != b',' {
                    i += 1;
                }
                RawParam {
                    value: rest[value_start..i].trim_end(),
                    quoted: false,
                }
            };

            params.set(key, param);
        }
        Some(params)
    }

    fn set(&mut self, key: &str, param: RawParam<'a>) {
        let slot = if key.eq_ignore_ascii_case("username") {
            &mut self.username
        } else if key.eq_ignore_ascii_case("realm") {
            &mut self.realm
        } else if key.eq_ignore_ascii_case("nonce") {
            &mut self.nonce
        } else if key.eq_ignore_ascii_case("cnonce") {
            &mut self.cnonce
        } else if key.eq_ignore_ascii_case("qop") {
            &mut self.qop
        } else if key.eq_ignore_ascii_case("nc") {
            &mut self.nc
        } else if key.eq_ignore_ascii_case("uri") {
            &mut self.uri
        } else if key.eq_ignore_ascii_case("response") {
            &mut self.response
        } else if key.eq_ignore_ascii_case("algorithm") {
            &mut self.algorithm
        } else if key.eq_ignore_ascii_case("opaque") {
            &mut self.opaque
        } else {
            return;
        };
        *slot = Some(param);
    }

    /// The username parameter with escapes resolved, without running any
    /// verification. Absent or broken values yield `None`.
    pub fn username_unquoted(&self) -> Option<Cow<'a, str>> {
        self.username.as_ref()?.unquoted().ok()
    }
}
