//! Transfer-related types for the ledger
//!
//! This module defines the closed set of balance movements, the request a
//! caller submits to the ledger, and the commands read by the replay driver.

use super::asset::AssetId;
use super::balance::UserId;
use super::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One side of a balance record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubBalance {
    Available,
    Frozen,
}

impl fmt::Display for SubBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubBalance::Available => f.write_str("available"),
            SubBalance::Frozen => f.write_str("frozen"),
        }
    }
}

/// The three legal balance movements
///
/// Each variant debits one side of the source record and credits one side of
/// the destination record. Source and destination may be the same record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    /// available(from) -> available(to), usually a settlement between users
    AvailableToAvailable,

    /// available(from) -> frozen(to), a freeze when from == to
    AvailableToFrozen,

    /// frozen(from) -> available(to), an unfreeze when from == to
    FrozenToAvailable,
}

impl TransferType {
    pub const ALL: [TransferType; 3] = [
        TransferType::AvailableToAvailable,
        TransferType::AvailableToFrozen,
        TransferType::FrozenToAvailable,
    ];

    /// Side of the source record that is debited
    pub fn source(self) -> SubBalance {
        match self {
            TransferType::AvailableToAvailable | TransferType::AvailableToFrozen => {
                SubBalance::Available
            }
            TransferType::FrozenToAvailable => SubBalance::Frozen,
        }
    }

    /// Side of the destination record that is credited
    pub fn destination(self) -> SubBalance {
        match self {
            TransferType::AvailableToAvailable | TransferType::FrozenToAvailable => {
                SubBalance::Available
            }
            TransferType::AvailableToFrozen => SubBalance::Frozen,
        }
    }

    /// Compact wire code (0, 1, 2)
    pub fn code(self) -> u8 {
        match self {
            TransferType::AvailableToAvailable => 0,
            TransferType::AvailableToFrozen => 1,
            TransferType::FrozenToAvailable => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransferType::AvailableToAvailable => "available_to_available",
            TransferType::AvailableToFrozen => "available_to_frozen",
            TransferType::FrozenToAvailable => "frozen_to_available",
        }
    }
}

impl fmt::Display for TransferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransferType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "available_to_available" => Ok(TransferType::AvailableToAvailable),
            "available_to_frozen" => Ok(TransferType::AvailableToFrozen),
            "frozen_to_available" => Ok(TransferType::FrozenToAvailable),
            _ => Err(LedgerError::invalid_transfer_type(s)),
        }
    }
}

impl TryFrom<u8> for TransferType {
    type Error = LedgerError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TransferType::AvailableToAvailable),
            1 => Ok(TransferType::AvailableToFrozen),
            2 => Ok(TransferType::FrozenToAvailable),
            other => Err(LedgerError::invalid_transfer_type(&other.to_string())),
        }
    }
}

/// A single transfer submitted to the ledger
///
/// `amount` is optional so that an absent or unparseable amount coming from an
/// outer layer reaches the ledger as a malformed request rather than a zero.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRequest {
    pub transfer_type: TransferType,
    pub from: UserId,
    pub to: UserId,
    pub asset: AssetId,
    pub amount: Option<Decimal>,

    /// When false the sufficiency decline is skipped; the source still can
    /// never go negative
    pub check_balance: bool,
}

impl TransferRequest {
    /// A balance-checked transfer
    pub fn new(
        transfer_type: TransferType,
        from: UserId,
        to: UserId,
        asset: impl Into<AssetId>,
        amount: Decimal,
    ) -> Self {
        TransferRequest {
            transfer_type,
            from,
            to,
            asset: asset.into(),
            amount: Some(amount),
            check_balance: true,
        }
    }

    /// available -> frozen on the user's own record
    pub fn freeze(user: UserId, asset: impl Into<AssetId>, amount: Decimal) -> Self {
        Self::new(TransferType::AvailableToFrozen, user, user, asset, amount)
    }

    /// frozen -> available on the user's own record
    pub fn unfreeze(user: UserId, asset: impl Into<AssetId>, amount: Decimal) -> Self {
        Self::new(TransferType::FrozenToAvailable, user, user, asset, amount)
    }

    /// Skip the sufficiency decline
    pub fn unchecked(self) -> Self {
        TransferRequest {
            check_balance: false,
            ..self
        }
    }

    /// Replace the amount, including with "unset"
    pub fn with_amount(self, amount: Option<Decimal>) -> Self {
        TransferRequest { amount, ..self }
    }
}

/// A command read by the replay driver
#[derive(Debug, Clone, PartialEq)]
pub enum LedgerCommand {
    /// Hydrate an opening available balance
    Open {
        user: UserId,
        asset: AssetId,
        available: Decimal,
    },

    /// Execute a transfer
    Transfer(TransferRequest),
}

impl LedgerCommand {
    /// User whose record is debited (or opened)
    pub fn source_user(&self) -> UserId {
        match self {
            LedgerCommand::Open { user, .. } => *user,
            LedgerCommand::Transfer(request) => request.from,
        }
    }
}
