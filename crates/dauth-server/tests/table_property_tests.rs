// drawbridge-rs - HTTP Digest Access Authentication
// Copyright (C) 2025 James Ferris <ferrous.communications@gmail.com>
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::collections::HashSet;

use dauth_server::{generate_nonce, DigestAlgorithm, NonceCheck, NonceNcTable};
use proptest::prelude::*;

fn test_nonce(ts: u64) -> smol_str::SmolStr {
    generate_nonce(ts, "GET", b"property-seed", "/resource", "realm", DigestAlgorithm::Md5)
}

proptest! {
    /// Any (nonce, nc) pair verifies at most once, whatever the order and
    /// repetition of the counts the client presents.
    #[test]
    fn nonce_count_pairs_are_single_use(
        ncs in prop::collection::vec(1u64..200, 1..64),
        size in 1usize..64,
    ) {
        let table = NonceNcTable::new(size);
        let nonce = test_nonce(1_000);
        prop_assert!(table.try_reserve(&nonce, 1_000));

        let mut accepted = HashSet::new();
        for nc in ncs {
            if table.check(&nonce, 1_000, nc) == NonceCheck::Ok {
                prop_assert!(accepted.insert(nc), "nc {} accepted twice", nc);
            }
        }
    }

    /// Strictly increasing counts are always accepted from a fresh slot.
    #[test]
    fn increasing_counts_always_pass(
        ncs in prop::collection::btree_set(1u64..100_000, 1..100),
    ) {
        let table = NonceNcTable::new(8);
        let nonce = test_nonce(1_000);
        prop_assert!(table.try_reserve(&nonce, 1_000));

        for nc in ncs {
            prop_assert_eq!(table.check(&nonce, 1_000, nc), NonceCheck::Ok);
        }
    }

    /// Bucketing is deterministic: a reserved nonce is always found again,
    /// whatever the table size.
    #[test]
    fn reserved_nonce_is_found_for_any_size(
        ts in 0u64..(1u64 << 48),
        size in 1usize..128,
        nc in 1u64..1_000,
    ) {
        let table = NonceNcTable::new(size);
        let nonce = test_nonce(ts);
        prop_assert!(table.try_reserve(&nonce, ts));
        prop_assert_eq!(table.check(&nonce, ts, nc), NonceCheck::Ok);
    }

    /// A nonce that was never admitted can only classify as wrong (empty
    /// slot) or stale (tracking disabled), never as valid.
    #[test]
    fn unregistered_nonces_never_verify(size in 0usize..32, nc in 1u64..1_000) {
        let table = NonceNcTable::new(size);
        let nonce = test_nonce(5_000);
        let outcome = table.check(&nonce, 5_000, nc);
        if size == 0 {
            prop_assert_eq!(outcome, NonceCheck::Stale);
        } else {
            prop_assert_eq!(outcome, NonceCheck::Wrong);
        }
    }

    /// Reservation is idempotent-averse: the same value never takes a slot
    /// twice, so one challenge cannot reset another's counter window.
    #[test]
    fn same_nonce_is_never_admitted_twice(ts in 0u64..(1u64 << 48), size in 1usize..32) {
        let table = NonceNcTable::new(size);
        let nonce = test_nonce(ts);
        prop_assert!(table.try_reserve(&nonce, ts));
        prop_assert!(!table.try_reserve(&nonce, ts));
        prop_assert!(!table.try_reserve(&nonce, ts + 60_000));
    }
}
