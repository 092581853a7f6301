//! Error types for the ledger
//!
//! This module defines all error types that can occur while validating and
//! executing transfers, and while replaying command files.
//!
//! # Error Categories
//!
//! - **Rejected requests**: malformed input (missing or negative amount, unknown
//!   asset, unknown transfer type). The caller has to fix the request.
//! - **Declined transfers**: insufficient available or frozen funds. This is an
//!   expected business outcome; see [`LedgerError::is_declined`].
//! - **Invariant guards**: overdraft on an unchecked transfer, arithmetic overflow,
//!   negative opening balances.
//! - **File I/O and CSV errors**: raised by the replay driver only.
//!
//! No variant is fatal to the process and none is ever returned after a partial
//! mutation.

use super::asset::AssetId;
use super::balance::UserId;
use super::transfer::SubBalance;
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// Amount argument absent or unparseable
    #[error("Invalid amount{}", raw.as_ref().map(|r| format!(" '{}'", r)).unwrap_or_default())]
    InvalidAmount {
        /// The raw text that failed to parse, if any
        raw: Option<String>,
    },

    /// Amount is below zero
    #[error("Amount {amount} is negative")]
    NegativeAmount { amount: Decimal },

    /// Asset is not registered or is inactive
    #[error("Unknown or inactive asset '{asset}'")]
    UnknownAsset { asset: AssetId },

    /// Transfer type outside the closed set
    #[error("Invalid transfer type '{value}'")]
    InvalidTransferType { value: String },

    /// Source available balance is short on a checked transfer
    ///
    /// Declined, not rejected.
    #[error("Insufficient available {asset} for user {user}: available {available}, requested {requested}")]
    InsufficientAvailable {
        user: UserId,
        asset: AssetId,
        available: Decimal,
        requested: Decimal,
    },

    /// Source frozen balance is short on a checked transfer
    ///
    /// Declined, not rejected.
    #[error("Insufficient frozen {asset} for user {user}: frozen {frozen}, requested {requested}")]
    InsufficientFrozen {
        user: UserId,
        asset: AssetId,
        frozen: Decimal,
        requested: Decimal,
    },

    /// An unchecked transfer would drive the source negative
    #[error("Transfer would overdraw {side} {asset} for user {user}: balance {balance}, requested {requested}")]
    Overdraft {
        user: UserId,
        asset: AssetId,
        side: SubBalance,
        balance: Decimal,
        requested: Decimal,
    },

    /// Checked decimal addition overflowed
    #[error("Arithmetic overflow crediting {side} {asset} for user {user}")]
    ArithmeticOverflow {
        user: UserId,
        asset: AssetId,
        side: SubBalance,
    },

    /// Opening balance with a negative component
    #[error("Invalid opening balance for user {user} {asset}: available {available}, frozen {frozen}")]
    InvalidBalance {
        user: UserId,
        asset: AssetId,
        available: Decimal,
        frozen: Decimal,
    },

    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// I/O error while reading or writing files
    #[error("I/O error: {message}")]
    IoError { message: String },

    /// CSV parsing error
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError { line: Option<u64>, message: String },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// True for the business declines (insufficient funds)
    ///
    /// Declined transfers may be retried once funds arrive; every other variant
    /// means the request itself has to change.
    pub fn is_declined(&self) -> bool {
        matches!(
            self,
            LedgerError::InsufficientAvailable { .. } | LedgerError::InsufficientFrozen { .. }
        )
    }

    pub fn missing_amount() -> Self {
        LedgerError::InvalidAmount { raw: None }
    }

    pub fn invalid_amount(raw: &str) -> Self {
        LedgerError::InvalidAmount {
            raw: Some(raw.to_string()),
        }
    }

    pub fn negative_amount(amount: Decimal) -> Self {
        LedgerError::NegativeAmount { amount }
    }

    pub fn unknown_asset(asset: &AssetId) -> Self {
        LedgerError::UnknownAsset {
            asset: asset.clone(),
        }
    }

    pub fn invalid_transfer_type(value: &str) -> Self {
        LedgerError::InvalidTransferType {
            value: value.to_string(),
        }
    }

    /// Insufficient funds on the given side
    pub fn insufficient(
        side: SubBalance,
        user: UserId,
        asset: &AssetId,
        balance: Decimal,
        requested: Decimal,
    ) -> Self {
        match side {
            SubBalance::Available => LedgerError::InsufficientAvailable {
                user,
                asset: asset.clone(),
                available: balance,
                requested,
            },
            SubBalance::Frozen => LedgerError::InsufficientFrozen {
                user,
                asset: asset.clone(),
                frozen: balance,
                requested,
            },
        }
    }

    pub fn overdraft(
        side: SubBalance,
        user: UserId,
        asset: &AssetId,
        balance: Decimal,
        requested: Decimal,
    ) -> Self {
        LedgerError::Overdraft {
            user,
            asset: asset.clone(),
            side,
            balance,
            requested,
        }
    }

    pub fn arithmetic_overflow(side: SubBalance, user: UserId, asset: &AssetId) -> Self {
        LedgerError::ArithmeticOverflow {
            user,
            asset: asset.clone(),
            side,
        }
    }

    pub fn invalid_balance(
        user: UserId,
        asset: &AssetId,
        available: Decimal,
        frozen: Decimal,
    ) -> Self {
        LedgerError::InvalidBalance {
            user,
            asset: asset.clone(),
            available,
            frozen,
        }
    }
}
