//! Deadlock-free acquisition of two balance locks
//!
//! Every transfer locks its source and destination records. Two transfers in
//! opposite directions between the same pair of records would deadlock if each
//! took "its" source lock first. Instead, both records are always locked in
//! ascending [`BalanceKey`] order (user first, asset second) and released in
//! descending order. Every thread agrees on the order, so the wait-for graph
//! can never contain a cycle.
//!
//! When source and destination are the same record, its lock is taken once.

use super::balance::Balance;
use crate::types::{BalanceKey, Funds};
use parking_lot::MutexGuard;
use std::cmp::Ordering;

/// Global lock order between two records
///
/// Total and tie-free: `Equal` only for identical keys.
pub fn lock_order(a: &BalanceKey, b: &BalanceKey) -> Ordering {
    a.user.cmp(&b.user).then_with(|| a.asset.cmp(&b.asset))
}

/// Locks held for the duration of one transfer
///
/// Dropping a `Distinct` pair releases `high` before `low`: struct fields are
/// dropped in declaration order, which is the reverse of acquisition here.
pub(crate) enum LockedPair<'a> {
    /// Source and destination are one record
    Same(MutexGuard<'a, Funds>),

    /// Two records, acquired low then high
    Distinct {
        high: MutexGuard<'a, Funds>,
        low: MutexGuard<'a, Funds>,
        from_is_low: bool,
    },
}

/// Mutable view of the locked funds, oriented as source/destination
pub(crate) enum Legs<'g> {
    Same(&'g mut Funds),
    Distinct {
        from: &'g mut Funds,
        to: &'g mut Funds,
    },
}

impl<'a> LockedPair<'a> {
    pub(crate) fn legs(&mut self) -> Legs<'_> {
        match self {
            LockedPair::Same(funds) => Legs::Same(&mut **funds),
            LockedPair::Distinct {
                high,
                low,
                from_is_low,
            } => {
                if *from_is_low {
                    Legs::Distinct {
                        from: &mut **low,
                        to: &mut **high,
                    }
                } else {
                    Legs::Distinct {
                        from: &mut **high,
                        to: &mut **low,
                    }
                }
            }
        }
    }
}

/// Lock `from` and `to` in canonical order
pub(crate) fn lock_pair<'a>(from: &'a Balance, to: &'a Balance) -> LockedPair<'a> {
    match lock_order(from.key(), to.key()) {
        Ordering::Equal => LockedPair::Same(from.lock()),
        Ordering::Less => {
            let low = from.lock();
            let high = to.lock();
            LockedPair::Distinct {
                high,
                low,
                from_is_low: true,
            }
        }
        Ordering::Greater => {
            let low = to.lock();
            let high = from.lock();
            LockedPair::Distinct {
                high,
                low,
                from_is_low: false,
            }
        }
    }
}
