//! Asset Ledger Library
//! # Overview
//!
//! This library provides a concurrent, in-memory balance ledger. Every
//! (user, asset) pair owns a record with an `available` and a `frozen`
//! balance, and funds move between records through three transfer types.
//! A CSV replay driver with sync and parallel strategies sits on top.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (BalanceKey, Funds, TransferRequest, etc.)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Ledger components:
//!   - [`core::ledger`] - Transfer validation and orchestration
//!   - [`core::balance_store`] - Lazily-created per-(user, asset) records
//!   - [`core::lock_order`] - Deadlock-free locking of two records
//!   - [`core::registry`] - Asset registry
//! - [`io`] - Command CSV parsing and balance output
//! - [`strategy`] - Replay strategies
//! - [`logging`] - Subscriber setup for the binary
//!
//! # Transfer Types
//!
//! - **AvailableToAvailable**: `from.available` to `to.available`
//! - **AvailableToFrozen**: `from.available` to `to.frozen` (freeze when `from == to`)
//! - **FrozenToAvailable**: `from.frozen` to `to.available` (unfreeze when `from == to`)
//!
//! # Guarantees
//!
//! - A transfer changes both records or neither
//! - With balance checks on, no balance ever goes negative
//! - The sum of all balances of an asset is unchanged by any transfer
//! - Two records are always locked in `(user, asset)` order, so concurrent
//!   transfers in opposite directions cannot deadlock

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod logging;
pub mod strategy;
pub mod types;

pub use core::{AssetRegistry, Balance, BalanceStore, LedgerService, MemoryRegistry};
pub use io::write_balances_csv;
pub use strategy::{ReplayConfig, ReplayStats, ReplayStrategy};
pub use types::{
    AssetId, AssetMeta, BalanceKey, BalanceSnapshot, Funds, LedgerCommand, LedgerError,
    SubBalance, TransferRequest, TransferType, UserId,
};
