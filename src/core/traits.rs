//! Core traits for the ledger's collaborators
//!
//! The ledger depends on an asset registry only through this trait, so a
//! database- or config-backed registry can replace [`super::MemoryRegistry`].

use crate::types::{AssetId, AssetMeta};
use std::sync::Arc;

/// Read-mostly lookup of asset metadata
///
/// Implementations are shared across every thread calling the ledger.
pub trait AssetRegistry: Send + Sync {
    /// True only if the asset is known AND active
    fn exists(&self, asset: &AssetId) -> bool;

    /// Metadata for a known asset, active or not
    fn metadata(&self, asset: &AssetId) -> Option<AssetMeta>;

    /// Display precision for an asset, if known
    fn precision(&self, asset: &AssetId) -> Option<u32> {
        self.metadata(asset).map(|meta| meta.precision)
    }
}

impl<R: AssetRegistry + ?Sized> AssetRegistry for Arc<R> {
    fn exists(&self, asset: &AssetId) -> bool {
        (**self).exists(asset)
    }

    fn metadata(&self, asset: &AssetId) -> Option<AssetMeta> {
        (**self).metadata(asset)
    }
}
