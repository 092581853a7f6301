//! Core ledger module
//!
//! This module contains the balance ledger components:
//! - `traits` - The asset registry abstraction
//! - `registry` - Concurrent in-memory asset registry
//! - `balance` - The lock-carrying per-(user, asset) record
//! - `balance_store` - Lazily-populated concurrent map of records
//! - `lock_order` - Canonical two-record lock acquisition
//! - `ledger` - Transfer validation and orchestration

pub mod balance;
pub mod balance_store;
pub mod ledger;
pub mod lock_order;
pub mod registry;
pub mod traits;

pub use balance::Balance;
pub use balance_store::BalanceStore;
pub use ledger::LedgerService;
pub use lock_order::lock_order;
pub use registry::MemoryRegistry;
pub use traits::AssetRegistry;
