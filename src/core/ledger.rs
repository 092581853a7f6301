//! Transfer orchestration
//!
//! This module provides the `LedgerService` struct, the public entry point for
//! every balance movement.
//!
//! # Transfer lifecycle
//!
//! ```text
//! Validating ──► Locking ──► Mutating ──► Done
//!     │                          │
//!     └──── rejected/no-op ──────┴──► Done (nothing mutated)
//! ```
//!
//! 1. **Validating** (no locks): amount present, amount not negative, zero
//!    amount short-circuits as a successful no-op, asset known and active.
//! 2. **Locking**: both records are resolved through the [`BalanceStore`] and
//!    locked via [`lock_pair`] in canonical key order.
//! 3. **Mutating**: the sufficiency gate runs and both sides are computed with
//!    checked arithmetic before either is written, so a failure at this stage
//!    also leaves both records untouched.
//!
//! # Thread Safety
//!
//! `LedgerService` holds no lock of its own. Transfers on disjoint records run
//! fully in parallel; transfers sharing a record serialize on its lock.

use super::balance_store::BalanceStore;
use super::lock_order::{lock_pair, Legs};
use super::registry::MemoryRegistry;
use super::traits::AssetRegistry;
use crate::types::{
    AssetId, BalanceSnapshot, Funds, LedgerError, SubBalance, TransferRequest, UserId,
};
use rust_decimal::Decimal;

/// The balance ledger
///
/// Share it across threads behind an `Arc` (or borrow it into scoped
/// threads); every method takes `&self`.
#[derive(Debug)]
pub struct LedgerService<R: AssetRegistry = MemoryRegistry> {
    registry: R,
    store: BalanceStore,
}

impl<R: AssetRegistry> LedgerService<R> {
    /// Create a ledger with no balances over the given registry
    pub fn new(registry: R) -> Self {
        Self {
            registry,
            store: BalanceStore::new(),
        }
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn store(&self) -> &BalanceStore {
        &self.store
    }

    /// Execute one transfer
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The transfer was applied, or the amount was zero
    /// * `Err(e)` with `e.is_declined()` - Insufficient funds, nothing changed
    /// * `Err(e)` otherwise - The request was rejected, nothing changed
    ///
    /// # Errors
    ///
    /// In validation order:
    /// - `InvalidAmount` if `amount` is unset
    /// - `NegativeAmount` if `amount < 0`
    /// - `UnknownAsset` if the asset is not registered or inactive
    ///
    /// Then, with both records locked:
    /// - `InsufficientAvailable` / `InsufficientFrozen` if `check_balance` is on
    ///   and the source side is short
    /// - `Overdraft` if `check_balance` is off and the source side is short
    /// - `ArithmeticOverflow` if the credit overflows
    pub fn transfer(&self, request: &TransferRequest) -> Result<(), LedgerError> {
        let amount = request.amount.ok_or_else(LedgerError::missing_amount)?;

        if amount < Decimal::ZERO {
            return Err(LedgerError::negative_amount(amount));
        }

        if amount.is_zero() {
            return Ok(());
        }

        if !self.registry.exists(&request.asset) {
            return Err(LedgerError::unknown_asset(&request.asset));
        }

        let from = self.store.get_or_create(request.from, &request.asset);
        let to = self.store.get_or_create(request.to, &request.asset);

        let mut locked = lock_pair(&from, &to);
        let result = settle(locked.legs(), request, amount);
        drop(locked);

        match &result {
            Ok(()) => tracing::trace!(
                transfer_type = %request.transfer_type,
                from = request.from,
                to = request.to,
                asset = %request.asset,
                %amount,
                "transfer applied"
            ),
            Err(e) if e.is_declined() => tracing::debug!(
                transfer_type = %request.transfer_type,
                from = request.from,
                to = request.to,
                asset = %request.asset,
                %amount,
                "transfer declined: {}",
                e
            ),
            // The replay driver reports rejections at warn
            Err(e) => tracing::debug!(
                transfer_type = %request.transfer_type,
                from = request.from,
                to = request.to,
                asset = %request.asset,
                %amount,
                "transfer rejected: {}",
                e
            ),
        }

        result
    }

    /// Move `amount` from the user's available to frozen balance
    pub fn freeze(
        &self,
        user: UserId,
        asset: &AssetId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        self.transfer(&TransferRequest::freeze(user, asset.clone(), amount))
    }

    /// Move `amount` from the user's frozen to available balance
    pub fn unfreeze(
        &self,
        user: UserId,
        asset: &AssetId,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        self.transfer(&TransferRequest::unfreeze(user, asset.clone(), amount))
    }

    /// Set a record's balances from an external source of truth
    ///
    /// This is how a persistence layer hydrates the ledger at startup. It
    /// overwrites whatever the record held and is not a transfer: it does not
    /// conserve funds.
    ///
    /// # Errors
    ///
    /// - `UnknownAsset` if the asset is not registered or inactive
    /// - `InvalidBalance` if either component is negative
    pub fn open_balance(
        &self,
        user: UserId,
        asset: &AssetId,
        available: Decimal,
        frozen: Decimal,
    ) -> Result<(), LedgerError> {
        if !self.registry.exists(asset) {
            return Err(LedgerError::unknown_asset(asset));
        }

        let funds = Funds::new(available, frozen);
        if !funds.is_non_negative() {
            return Err(LedgerError::invalid_balance(user, asset, available, frozen));
        }

        let balance = self.store.get_or_create(user, asset);
        *balance.lock() = funds;

        tracing::debug!(user, asset = %asset, %available, %frozen, "opening balance set");
        Ok(())
    }

    /// Snapshot of one record, without creating it
    pub fn balance(&self, user: UserId, asset: &AssetId) -> Option<BalanceSnapshot> {
        self.store.get(user, asset).map(|balance| balance.snapshot())
    }

    /// Snapshot of every record, sorted by (user, asset)
    pub fn balances(&self) -> Vec<BalanceSnapshot> {
        self.store.snapshot()
    }
}

impl Default for LedgerService<MemoryRegistry> {
    fn default() -> Self {
        Self::new(MemoryRegistry::new())
    }
}

/// Apply a validated transfer to locked funds
///
/// Both new values are computed before either is written.
fn settle(legs: Legs<'_>, request: &TransferRequest, amount: Decimal) -> Result<(), LedgerError> {
    let source = request.transfer_type.source();
    let destination = request.transfer_type.destination();

    match legs {
        Legs::Same(funds) => {
            let debited = debit(funds, source, request, amount)?;
            if source == destination {
                // available -> available on one record: gate checked, net zero
                return Ok(());
            }
            let credited = credit(funds, destination, request.to, &request.asset, amount)?;
            *funds.get_mut(source) = debited;
            *funds.get_mut(destination) = credited;
        }
        Legs::Distinct { from, to } => {
            let debited = debit(from, source, request, amount)?;
            let credited = credit(to, destination, request.to, &request.asset, amount)?;
            *from.get_mut(source) = debited;
            *to.get_mut(destination) = credited;
        }
    }

    Ok(())
}

fn debit(
    funds: &Funds,
    side: SubBalance,
    request: &TransferRequest,
    amount: Decimal,
) -> Result<Decimal, LedgerError> {
    let balance = funds.get(side);

    if balance < amount {
        return Err(if request.check_balance {
            LedgerError::insufficient(side, request.from, &request.asset, balance, amount)
        } else {
            LedgerError::overdraft(side, request.from, &request.asset, balance, amount)
        });
    }

    balance
        .checked_sub(amount)
        .ok_or_else(|| LedgerError::overdraft(side, request.from, &request.asset, balance, amount))
}

fn credit(
    funds: &Funds,
    side: SubBalance,
    user: UserId,
    asset: &AssetId,
    amount: Decimal,
) -> Result<Decimal, LedgerError> {
    funds
        .get(side)
        .checked_add(amount)
        .ok_or_else(|| LedgerError::arithmetic_overflow(side, user, asset))
}
