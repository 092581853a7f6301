//! Replay strategy module
//!
//! This module defines the Strategy pattern for replaying a command file
//! against a fresh ledger, encompassing CSV parsing, command execution and
//! balance output. Strategies are selected at runtime from the CLI.

use crate::cli::StrategyType;
use crate::core::{AssetRegistry, LedgerService, MemoryRegistry};
use crate::types::{AssetMeta, LedgerCommand, LedgerError};
use rust_decimal::Decimal;
use std::io::Write;
use std::ops::AddAssign;
use std::path::Path;

pub mod parallel;
pub mod sync;

pub use parallel::ParallelReplayStrategy;
pub use sync::SyncReplayStrategy;

/// Configuration shared by the replay strategies
#[derive(Clone, Debug)]
pub struct ReplayConfig {
    /// Worker threads used by the parallel strategy
    pub workers: usize,

    /// Assets registered on top of the registry defaults
    pub extra_assets: Vec<AssetMeta>,
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            extra_assets: Vec::new(),
        }
    }
}

impl ReplayConfig {
    /// Create a ReplayConfig, falling back to the default worker count for 0
    pub fn new(workers: usize, extra_assets: Vec<AssetMeta>) -> Self {
        let workers = if workers == 0 {
            let fallback = num_cpus::get();
            tracing::warn!(
                "Invalid workers ({}), using default ({})",
                workers,
                fallback
            );
            fallback
        } else {
            workers
        };

        Self {
            workers,
            extra_assets,
        }
    }

    /// Default registry plus the configured extra assets
    pub fn registry(&self) -> MemoryRegistry {
        let registry = MemoryRegistry::new();
        for meta in &self.extra_assets {
            registry.register(meta.clone());
        }
        registry
    }
}

/// Outcome counts of one replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Commands that changed (or trivially kept) the ledger
    pub applied: u64,

    /// Transfers declined for insufficient funds
    pub declined: u64,

    /// Rows or commands rejected as malformed
    pub rejected: u64,
}

impl AddAssign for ReplayStats {
    fn add_assign(&mut self, other: Self) {
        self.applied += other.applied;
        self.declined += other.declined;
        self.rejected += other.rejected;
    }
}

impl ReplayStats {
    /// Count one command result, logging failures
    pub(crate) fn record(&mut self, result: Result<(), LedgerError>) {
        match result {
            Ok(()) => self.applied += 1,
            // The ledger logs declines itself
            Err(e) if e.is_declined() => self.declined += 1,
            Err(e) => {
                tracing::warn!("Command rejected: {}", e);
                self.rejected += 1;
            }
        }
    }
}

/// Replay strategy trait
///
/// Each strategy reads commands from a CSV file, executes them against a new
/// ledger and writes the final balances to `output`.
pub trait ReplayStrategy: Send + Sync {
    /// Replay `input_path` and write balances to `output`
    ///
    /// # Errors
    ///
    /// Only fatal conditions are returned: the input cannot be opened or the
    /// output cannot be written. Malformed rows, rejected and declined
    /// commands are logged, counted in the returned stats and skipped.
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplayStats, LedgerError>;
}

/// Execute one command against the ledger
pub(crate) fn apply_command<R: AssetRegistry>(
    ledger: &LedgerService<R>,
    command: &LedgerCommand,
) -> Result<(), LedgerError> {
    match command {
        LedgerCommand::Open {
            user,
            asset,
            available,
        } => ledger.open_balance(*user, asset, *available, Decimal::ZERO),
        LedgerCommand::Transfer(request) => ledger.transfer(request),
    }
}

/// Create a replay strategy
pub fn create_strategy(
    strategy_type: StrategyType,
    config: ReplayConfig,
) -> Box<dyn ReplayStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncReplayStrategy::new(config)),
        StrategyType::Parallel => Box::new(ParallelReplayStrategy::new(config)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AssetId, TransferRequest, TransferType};
    use parking_lot::Mutex;
    use rust_decimal_macros::dec;
    use std::io;
    use std::sync::Arc;

    /// In-memory log sink for a scoped subscriber
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn lines_at(&self, level: &str) -> usize {
            String::from_utf8_lossy(&self.0.lock())
                .lines()
                .filter(|line| line.contains(level))
                .count()
        }
    }

    #[test]
    fn test_zero_workers_falls_back_to_default() {
        let config = ReplayConfig::new(0, Vec::new());

        assert_eq!(config.workers, num_cpus::get());
    }

    #[test]
    fn test_registry_includes_extra_assets() {
        let config = ReplayConfig::new(2, vec![AssetMeta::new("SOL", 9)]);
        let registry = config.registry();

        assert!(registry.exists(&AssetId::from("USD")));
        assert_eq!(registry.precision(&AssetId::from("SOL")), Some(9));
    }

    #[test]
    fn test_stats_record_and_sum() {
        let ledger = LedgerService::default();
        let usd = AssetId::from("USD");
        let mut stats = ReplayStats::default();

        stats.record(apply_command(
            &ledger,
            &LedgerCommand::Open {
                user: 1,
                asset: usd.clone(),
                available: dec!(10),
            },
        ));
        stats.record(apply_command(
            &ledger,
            &LedgerCommand::Transfer(TransferRequest::new(
                TransferType::AvailableToAvailable,
                1,
                2,
                "USD",
                dec!(50),
            )),
        ));
        stats.record(apply_command(
            &ledger,
            &LedgerCommand::Transfer(TransferRequest::freeze(1, "NEW", dec!(1))),
        ));

        assert_eq!(
            stats,
            ReplayStats {
                applied: 1,
                declined: 1,
                rejected: 1
            }
        );

        let mut total = ReplayStats::default();
        total += stats;
        total += stats;
        assert_eq!(total.applied, 2);
        assert_eq!(total.declined, 2);
        assert_eq!(total.rejected, 2);
    }

    #[test]
    fn test_rejected_transfer_warns_once() {
        let ledger = LedgerService::default();
        let usd = AssetId::from("USD");
        ledger
            .open_balance(1, &usd, dec!(10), Decimal::ZERO)
            .unwrap();
        let overdraft = LedgerCommand::Transfer(
            TransferRequest::new(TransferType::AvailableToAvailable, 1, 2, "USD", dec!(50))
                .unchecked(),
        );

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let logs = logs.clone();
                move || logs.clone()
            })
            .with_ansi(false)
            .with_max_level(tracing::Level::TRACE)
            .finish();

        let mut stats = ReplayStats::default();
        tracing::subscriber::with_default(subscriber, || {
            stats.record(apply_command(&ledger, &overdraft));
        });

        assert_eq!(stats.rejected, 1);
        assert_eq!(logs.lines_at("WARN"), 1);
        assert_eq!(logs.lines_at("transfer rejected"), 1);
    }
}
