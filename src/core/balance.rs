//! The per-(user, asset) balance record
//!
//! A [`Balance`] pairs an immutable [`BalanceKey`] with the two sub-balances
//! behind a mutex. Readers get copies; only the ledger, holding the lock, can
//! change the funds.

use crate::types::{AssetId, BalanceKey, BalanceSnapshot, Funds, UserId};
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;

/// One user's holdings of one asset
///
/// Records are created zero-valued by [`super::BalanceStore`] on first
/// reference and live as long as the store.
#[derive(Debug)]
pub struct Balance {
    key: BalanceKey,
    funds: Mutex<Funds>,
}

impl Balance {
    pub(crate) fn new(key: BalanceKey) -> Self {
        Balance {
            key,
            funds: Mutex::new(Funds::default()),
        }
    }

    pub fn key(&self) -> &BalanceKey {
        &self.key
    }

    pub fn user(&self) -> UserId {
        self.key.user
    }

    pub fn asset(&self) -> &AssetId {
        &self.key.asset
    }

    /// Current available balance
    pub fn available(&self) -> Decimal {
        self.funds.lock().available
    }

    /// Current frozen balance
    pub fn frozen(&self) -> Decimal {
        self.funds.lock().frozen
    }

    /// Both sub-balances read under a single lock acquisition
    pub fn funds(&self) -> Funds {
        *self.funds.lock()
    }

    pub fn snapshot(&self) -> BalanceSnapshot {
        BalanceSnapshot::new(&self.key, self.funds())
    }

    /// Exclusive access to the funds
    ///
    /// Callers holding more than one record must go through
    /// [`super::lock_order::lock_pair`].
    pub(crate) fn lock(&self) -> MutexGuard<'_, Funds> {
        self.funds.lock()
    }

    #[cfg(test)]
    pub(crate) fn is_locked(&self) -> bool {
        self.funds.is_locked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_new_balance_is_zero() {
        let balance = Balance::new(BalanceKey::new(1, AssetId::from("USD")));

        assert_eq!(balance.user(), 1);
        assert_eq!(balance.asset(), &AssetId::from("USD"));
        assert_eq!(balance.available(), Decimal::ZERO);
        assert_eq!(balance.frozen(), Decimal::ZERO);
    }

    #[test]
    fn test_snapshot_reflects_locked_writes() {
        let balance = Balance::new(BalanceKey::new(7, AssetId::from("BTC")));
        {
            let mut funds = balance.lock();
            funds.available = dec!(1.25);
            funds.frozen = dec!(0.75);
        }

        let snapshot = balance.snapshot();
        assert_eq!(snapshot.user, 7);
        assert_eq!(snapshot.asset, AssetId::from("BTC"));
        assert_eq!(snapshot.available, dec!(1.25));
        assert_eq!(snapshot.frozen, dec!(0.75));
    }
}
