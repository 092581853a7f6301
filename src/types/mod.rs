//! Types module
//!
//! Contains core data structures used throughout the ledger.
//! This module organizes types into logical submodules:
//! - `asset`: Asset identifiers and registry metadata
//! - `balance`: Balance keys and point-in-time balance snapshots
//! - `transfer`: Transfer types and transfer requests
//! - `error`: Error types for the ledger

pub mod asset;
pub mod balance;
pub mod error;
pub mod transfer;

pub use asset::{AssetId, AssetMeta};
pub use balance::{BalanceKey, BalanceSnapshot, Funds, UserId};
pub use error::LedgerError;
pub use transfer::{LedgerCommand, SubBalance, TransferRequest, TransferType};
