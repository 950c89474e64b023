// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key/value store shared by all replicas.
//!
//! Plain entries carry the requestor id and the per-feed liveness
//! timestamps (last writer wins is fine for both). Leases carry the
//! per-trigger leadership locks and need expiry plus single-writer
//! semantics, so they get their own operations.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

pub trait SharedMap: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);

    /// Store `value` only when `key` is absent. Returns the winning value:
    /// the existing one on conflict, `value` when this call was first.
    fn put_if_absent(&self, key: &str, value: String) -> String;

    /// Acquire or renew the lease on `key` for `holder`. Succeeds when the
    /// lease is free, expired, or already held by `holder`; a successful
    /// call extends the expiry by `ttl`.
    fn try_acquire_lease(&self, key: &str, holder: &str, ttl: Duration) -> bool;

    /// Drop the lease if `holder` still owns it.
    fn release_lease(&self, key: &str, holder: &str);
}

struct Lease {
    holder: String,
    expires_at: Instant,
}

/// Single-process implementation.
///
/// One replica is a degenerate cluster; tests hand the same instance to
/// several coordinators to exercise the election. A multi-replica
/// deployment swaps in an implementation backed by a real distributed map.
#[derive(Default)]
pub struct InMemorySharedMap {
    entries: Mutex<HashMap<String, String>>,
    leases: Mutex<HashMap<String, Lease>>,
}

impl SharedMap for InMemorySharedMap {
    fn get(&self, key: &str) -> Option<String> {
        match self.entries.lock() {
            Ok(entries) => entries.get(key).cloned(),
            Err(_) => None,
        }
    }

    fn set(&self, key: &str, value: String) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value);
        }
    }

    fn put_if_absent(&self, key: &str, value: String) -> String {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.entry(key.to_owned()).or_insert(value).clone()
            }
            Err(_) => value,
        }
    }

    fn try_acquire_lease(&self, key: &str, holder: &str, ttl: Duration) -> bool {
        let Ok(mut leases) = self.leases.lock() else { return false };
        let now = Instant::now();
        match leases.get_mut(key) {
            Some(lease) if lease.holder != holder && lease.expires_at > now => false,
            Some(lease) => {
                lease.holder = holder.to_owned();
                lease.expires_at = now + ttl;
                true
            }
            None => {
                leases.insert(
                    key.to_owned(),
                    Lease { holder: holder.to_owned(), expires_at: now + ttl },
                );
                true
            }
        }
    }

    fn release_lease(&self, key: &str, holder: &str) {
        if let Ok(mut leases) = self.leases.lock() {
            if leases.get(key).is_some_and(|l| l.holder == holder) {
                leases.remove(key);
            }
        }
    }
}
