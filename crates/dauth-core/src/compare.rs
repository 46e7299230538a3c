// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use subtle::ConstantTimeEq;

/// Timing-safe byte comparison.
///
/// Used for the final `response=` check so that a byte-by-byte mismatch
/// position cannot be observed as a timing oracle. Length mismatch returns
/// early; both sides are fixed-length hex strings of the active algorithm,
/// so the length itself is public.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_slices_match() {
        assert!(constant_time_eq(b"6629fae49393a053", b"6629fae49393a053"));
        assert!(constant_time_eq(b"", b""));
    }

    #[test]
    fn unequal_slices_do_not_match() {
        assert!(!constant_time_eq(b"6629fae49393a053", b"6629fae49393a054"));
        assert!(!constant_time_eq(b"short", b"longer value"));
    }
}
