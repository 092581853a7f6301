//! Balance-related types for the ledger
//!
//! This module defines the plain data side of a balance: the key it is stored
//! under, the pair of sub-balances, and the snapshot handed out to readers.
//! The lock-carrying record itself lives in [`crate::core::balance`].

use super::asset::AssetId;
use super::transfer::SubBalance;
use rust_decimal::Decimal;
use serde::Serialize;

/// User identifier
pub type UserId = u64;

/// Identity of a balance record: one user's holding of one asset
///
/// The derived ordering compares `user` first and `asset` second. The field
/// order is load-bearing: it defines the global lock order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BalanceKey {
    pub user: UserId,
    pub asset: AssetId,
}

impl BalanceKey {
    pub fn new(user: UserId, asset: AssetId) -> Self {
        BalanceKey { user, asset }
    }
}

/// The two sub-balances of a record
///
/// Both fields are kept non-negative by every ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Funds {
    /// Spendable and transferable funds
    pub available: Decimal,

    /// Funds reserved behind open orders
    pub frozen: Decimal,
}

impl Funds {
    pub fn new(available: Decimal, frozen: Decimal) -> Self {
        Funds { available, frozen }
    }

    /// Value of one side
    pub fn get(&self, side: SubBalance) -> Decimal {
        match side {
            SubBalance::Available => self.available,
            SubBalance::Frozen => self.frozen,
        }
    }

    pub(crate) fn get_mut(&mut self, side: SubBalance) -> &mut Decimal {
        match side {
            SubBalance::Available => &mut self.available,
            SubBalance::Frozen => &mut self.frozen,
        }
    }

    /// available + frozen, or None on overflow
    pub fn total(&self) -> Option<Decimal> {
        self.available.checked_add(self.frozen)
    }

    pub fn is_non_negative(&self) -> bool {
        self.available >= Decimal::ZERO && self.frozen >= Decimal::ZERO
    }
}

/// Point-in-time copy of one balance record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceSnapshot {
    pub user: UserId,
    pub asset: AssetId,
    pub available: Decimal,
    pub frozen: Decimal,
}

impl BalanceSnapshot {
    pub fn new(key: &BalanceKey, funds: Funds) -> Self {
        BalanceSnapshot {
            user: key.user,
            asset: key.asset.clone(),
            available: funds.available,
            frozen: funds.frozen,
        }
    }

    pub fn key(&self) -> BalanceKey {
        BalanceKey::new(self.user, self.asset.clone())
    }

    pub fn funds(&self) -> Funds {
        Funds::new(self.available, self.frozen)
    }
}
