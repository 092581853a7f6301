//! Thread-safe balance storage
//!
//! This module provides the `BalanceStore` struct, which owns every balance
//! record and creates them lazily on first reference.
//!
//! # Design
//!
//! The store uses `DashMap` (a concurrent HashMap) keyed by [`BalanceKey`] with
//! `Arc<Balance>` values. Map shards are only locked while looking up or
//! installing an entry; the `Arc` is cloned out before any balance lock is
//! taken, so the map never participates in the ledger's lock ordering.
//!
//! # Thread Safety
//!
//! `get_or_create` goes through `DashMap::entry`, an atomic insert-if-absent:
//! racing first accessors of one key all receive the same record.

use super::balance::Balance;
use crate::types::{AssetId, BalanceKey, BalanceSnapshot, UserId};
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent, lazily-populated map from (user, asset) to [`Balance`]
///
/// There is no removal: records persist for the lifetime of the store.
#[derive(Debug)]
pub struct BalanceStore {
    balances: DashMap<BalanceKey, Arc<Balance>>,
}

impl BalanceStore {
    /// Create a new empty BalanceStore
    pub fn new() -> Self {
        Self {
            balances: DashMap::new(),
        }
    }

    /// Get an existing record or install a zero-valued one
    ///
    /// # Thread Safety
    ///
    /// The read-only fast path avoids taking a shard write lock for keys that
    /// already exist. On a miss, `entry().or_insert_with()` decides the single
    /// winner under the shard write lock, and every caller gets that winner.
    pub fn get_or_create(&self, user: UserId, asset: &AssetId) -> Arc<Balance> {
        let key = BalanceKey::new(user, asset.clone());

        if let Some(existing) = self.balances.get(&key) {
            return Arc::clone(existing.value());
        }

        let entry = self
            .balances
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::trace!(user, asset = %asset, "balance record created");
                Arc::new(Balance::new(key))
            });
        Arc::clone(entry.value())
    }

    /// Look up a record without creating it
    pub fn get(&self, user: UserId, asset: &AssetId) -> Option<Arc<Balance>> {
        self.balances
            .get(&BalanceKey::new(user, asset.clone()))
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot every record, sorted by key
    ///
    /// Each record is read under its own lock; the result is not a single
    /// consistent cut across records while transfers are running.
    pub fn snapshot(&self) -> Vec<BalanceSnapshot> {
        let records: Vec<Arc<Balance>> = self
            .balances
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut snapshots: Vec<BalanceSnapshot> =
            records.iter().map(|balance| balance.snapshot()).collect();
        snapshots.sort_by(|a, b| (a.user, &a.asset).cmp(&(b.user, &b.asset)));
        snapshots
    }

    pub fn len(&self) -> usize {
        self.balances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl Default for BalanceStore {
    fn default() -> Self {
        Self::new()
    }
}
