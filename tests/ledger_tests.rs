//! Ledger integration tests
//!
//! Exercise the public `LedgerService` API from many threads at once:
//! - opposite-direction transfers between the same pair of users finish
//! - the per-asset sum of all balances never changes
//! - no balance goes negative while balance checks are on
//! - lazily-created records converge to a single instance

use asset_ledger::{AssetId, LedgerError, LedgerService, TransferRequest, TransferType};
use rstest::rstest;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn usd() -> AssetId {
    AssetId::from("USD")
}

fn funded_ledger(users: u64, available: Decimal) -> Arc<LedgerService> {
    let ledger = Arc::new(LedgerService::default());
    for user in 1..=users {
        ledger
            .open_balance(user, &usd(), available, Decimal::ZERO)
            .unwrap();
    }
    ledger
}

fn asset_total(ledger: &LedgerService, asset: &AssetId) -> Decimal {
    ledger
        .balances()
        .iter()
        .filter(|b| &b.asset == asset)
        .map(|b| b.available + b.frozen)
        .sum()
}

#[test]
fn test_opposite_direction_transfers_complete() {
    const ITERATIONS: usize = 500;
    let ledger = funded_ledger(2, dec!(1000));
    let (done_tx, done_rx) = mpsc::channel();

    for (from, to) in [(1u64, 2u64), (2, 1)] {
        let ledger = Arc::clone(&ledger);
        let done_tx = done_tx.clone();
        thread::spawn(move || {
            for _ in 0..ITERATIONS {
                let request = TransferRequest::new(
                    TransferType::AvailableToAvailable,
                    from,
                    to,
                    "USD",
                    dec!(1),
                );
                ledger.transfer(&request).unwrap();
            }
            done_tx.send(()).unwrap();
        });
    }

    for _ in 0..2 {
        done_rx
            .recv_timeout(Duration::from_secs(30))
            .expect("transfers deadlocked");
    }

    // At most 500 leaves either side, so nothing was declined and both
    // balances are back where they started
    for user in [1, 2] {
        let snapshot = ledger.balance(user, &usd()).unwrap();
        assert_eq!(snapshot.available, dec!(1000), "user {}", user);
        assert_eq!(snapshot.frozen, Decimal::ZERO, "user {}", user);
    }
    assert_eq!(asset_total(&ledger, &usd()), dec!(2000));
}

#[rstest]
#[case::available_to_available(TransferType::AvailableToAvailable, dec!(500), dec!(500))]
#[case::available_to_frozen(TransferType::AvailableToFrozen, dec!(400), dec!(600))]
#[case::frozen_to_available(TransferType::FrozenToAvailable, dec!(600), dec!(400))]
fn test_ring_of_transfers_does_not_deadlock(
    #[case] transfer_type: TransferType,
    #[case] available: Decimal,
    #[case] frozen: Decimal,
) {
    const USERS: u64 = 6;
    const ITERATIONS: usize = 200;
    let ledger = Arc::new(LedgerService::default());
    for user in 1..=USERS {
        ledger
            .open_balance(user, &usd(), dec!(500), dec!(500))
            .unwrap();
    }
    let (done_tx, done_rx) = mpsc::channel();

    // Every user sends to the next, closing a cycle in the wait-for graph
    for from in 1..=USERS {
        let ledger = Arc::clone(&ledger);
        let done_tx = done_tx.clone();
        let to = from % USERS + 1;
        thread::spawn(move || {
            for _ in 0..ITERATIONS {
                let request = TransferRequest::new(transfer_type, from, to, "USD", dec!(0.5));
                ledger.transfer(&request).unwrap();
            }
            done_tx.send(()).unwrap();
        });
    }

    for _ in 0..USERS {
        done_rx
            .recv_timeout(Duration::from_secs(30))
            .expect("transfers deadlocked");
    }

    // Each user sends and receives 100, so every record ends the same way
    for user in 1..=USERS {
        let snapshot = ledger.balance(user, &usd()).unwrap();
        assert_eq!(
            (snapshot.available, snapshot.frozen),
            (available, frozen),
            "user {}",
            user
        );
    }
    assert_eq!(asset_total(&ledger, &usd()), dec!(6000));
}

#[test]
fn test_concurrent_mixed_transfers_conserve_and_stay_non_negative() {
    const USERS: u64 = 8;
    const THREADS: u64 = 8;
    const ITERATIONS: u64 = 300;
    let ledger = funded_ledger(USERS, dec!(100));
    let btc = AssetId::from("BTC");
    for user in 1..=USERS {
        ledger
            .open_balance(user, &btc, dec!(0.5), dec!(0.25))
            .unwrap();
    }

    thread::scope(|scope| {
        for worker in 0..THREADS {
            let ledger = &ledger;
            scope.spawn(move || {
                for i in 0..ITERATIONS {
                    let from = (worker + i) % USERS + 1;
                    let to = (worker * 3 + i * 7) % USERS + 1;
                    let transfer_type = TransferType::ALL[(i % 3) as usize];
                    let asset = if i % 4 == 0 { "BTC" } else { "USD" };
                    let amount = Decimal::new(((worker + 1) * (i % 13 + 1)) as i64, 2);

                    let request = TransferRequest::new(transfer_type, from, to, asset, amount);
                    match ledger.transfer(&request) {
                        Ok(()) => {}
                        Err(e) => assert!(e.is_declined(), "unexpected error: {}", e),
                    }
                }
            });
        }
    });

    assert_eq!(asset_total(&ledger, &usd()), dec!(800));
    assert_eq!(asset_total(&ledger, &btc), dec!(6));
    for snapshot in ledger.balances() {
        assert!(
            snapshot.funds().is_non_negative(),
            "negative balance: {:?}",
            snapshot
        );
    }
}

#[test]
fn test_concurrent_drain_never_overdraws() {
    // 16 threads race to take 10 each from a balance of 100
    let ledger = funded_ledger(1, dec!(100));
    let results: Vec<Result<(), LedgerError>> = thread::scope(|scope| {
        let handles: Vec<_> = (0..16u64)
            .map(|i| {
                let ledger = &ledger;
                scope.spawn(move || {
                    ledger.transfer(&TransferRequest::new(
                        TransferType::AvailableToAvailable,
                        1,
                        100 + i,
                        "USD",
                        dec!(10),
                    ))
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    let applied = results.iter().filter(|r| r.is_ok()).count();
    let declined = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.is_declined()))
        .count();

    assert_eq!(applied, 10);
    assert_eq!(declined, 6);
    assert_eq!(ledger.balance(1, &usd()).unwrap().available, Decimal::ZERO);
    assert_eq!(asset_total(&ledger, &usd()), dec!(100));
}

#[test]
fn test_concurrent_first_touch_creates_one_record() {
    let ledger = funded_ledger(1, dec!(1000));

    thread::scope(|scope| {
        for _ in 0..8 {
            let ledger = &ledger;
            scope.spawn(move || {
                for _ in 0..50 {
                    ledger
                        .transfer(&TransferRequest::new(
                            TransferType::AvailableToAvailable,
                            1,
                            2,
                            "USD",
                            dec!(1),
                        ))
                        .unwrap();
                }
            });
        }
    });

    // No credit was lost to a duplicate record
    let receiver = ledger.balance(2, &usd()).unwrap();
    assert_eq!(receiver.available, dec!(400));
    assert_eq!(ledger.store().len(), 2);
}

#[test]
fn test_end_to_end_scenario() {
    let ledger = LedgerService::default();
    let btc = AssetId::from("BTC");
    ledger
        .open_balance(1, &usd(), dec!(100), Decimal::ZERO)
        .unwrap();
    ledger
        .open_balance(3, &btc, dec!(1.5), Decimal::ZERO)
        .unwrap();

    ledger
        .transfer(&TransferRequest::new(
            TransferType::AvailableToAvailable,
            1,
            2,
            "USD",
            dec!(30),
        ))
        .unwrap();
    ledger.freeze(2, &usd(), dec!(10)).unwrap();
    ledger.freeze(3, &btc, dec!(0.25)).unwrap();
    ledger.unfreeze(3, &btc, dec!(0.05)).unwrap();

    let declined = ledger.unfreeze(2, &usd(), dec!(11)).unwrap_err();
    assert!(declined.is_declined());

    let user2 = ledger.balance(2, &usd()).unwrap();
    assert_eq!((user2.available, user2.frozen), (dec!(20), dec!(10)));
    let user3 = ledger.balance(3, &btc).unwrap();
    assert_eq!((user3.available, user3.frozen), (dec!(1.3), dec!(0.2)));
    assert_eq!(ledger.balance(1, &usd()).unwrap().available, dec!(70));
    assert!(ledger.balance(4, &usd()).is_none());
}
