//! In-memory asset registry
//!
//! Backed by `DashMap` so lookups from many ledger threads never contend on a
//! single lock, and registrations can happen while the ledger is running.

use super::traits::AssetRegistry;
use crate::types::{AssetId, AssetMeta};
use dashmap::DashMap;

/// Concurrent in-memory [`AssetRegistry`]
///
/// `MemoryRegistry::new()` comes pre-seeded with USD (2 decimals), BTC (8) and
/// ETH (8), all active. Use [`MemoryRegistry::empty`] for a blank registry.
#[derive(Debug)]
pub struct MemoryRegistry {
    metas: DashMap<AssetId, AssetMeta>,
}

impl MemoryRegistry {
    /// Registry seeded with the default assets
    pub fn new() -> Self {
        let registry = Self::empty();
        registry.register(AssetMeta::new("USD", 2));
        registry.register(AssetMeta::new("BTC", 8));
        registry.register(AssetMeta::new("ETH", 8));
        registry
    }

    /// Registry with no assets
    pub fn empty() -> Self {
        Self {
            metas: DashMap::new(),
        }
    }

    /// Insert or replace an asset's metadata
    ///
    /// Re-registering with `active = false` retires an asset: subsequent
    /// transfers in it are rejected while existing balances stay readable.
    pub fn register(&self, meta: AssetMeta) {
        tracing::debug!(asset = %meta.id, precision = meta.precision, active = meta.active, "asset registered");
        self.metas.insert(meta.id.clone(), meta);
    }

    pub fn len(&self) -> usize {
        self.metas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metas.is_empty()
    }
}

impl Default for MemoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRegistry for MemoryRegistry {
    fn exists(&self, asset: &AssetId) -> bool {
        self.metas.get(asset).is_some_and(|meta| meta.active)
    }

    fn metadata(&self, asset: &AssetId) -> Option<AssetMeta> {
        self.metas.get(asset).map(|entry| entry.value().clone())
    }
}
