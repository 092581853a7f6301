//! Synchronous replay strategy
//!
//! Replays commands one at a time in file order on the calling thread. The
//! outcome is fully deterministic, which makes this the reference strategy
//! that the parallel one is compared against.
//!
//! # Memory Efficiency
//!
//! Rows are streamed through [`SyncReader`]; memory use is
//! O(balance records), not O(commands).

use crate::core::LedgerService;
use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{apply_command, ReplayConfig, ReplayStats, ReplayStrategy};
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;

/// Synchronous replay strategy
///
/// ```no_run
/// use asset_ledger::strategy::{ReplayConfig, ReplayStrategy, SyncReplayStrategy};
/// use std::path::Path;
///
/// let strategy = SyncReplayStrategy::new(ReplayConfig::default());
/// let mut output = std::io::stdout();
///
/// strategy.process(Path::new("commands.csv"), &mut output)
///     .expect("Replay failed");
/// ```
#[derive(Debug, Clone)]
pub struct SyncReplayStrategy {
    config: ReplayConfig,
}

impl SyncReplayStrategy {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

impl ReplayStrategy for SyncReplayStrategy {
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplayStats, LedgerError> {
        let ledger = LedgerService::new(self.config.registry());
        let reader = SyncReader::new(input_path)?;
        let mut stats = ReplayStats::default();

        for result in reader {
            match result {
                Ok(command) => stats.record(apply_command(&ledger, &command)),
                Err(e) => {
                    tracing::warn!("CSV parsing error: {}", e);
                    stats.rejected += 1;
                }
            }
        }

        tracing::info!(
            applied = stats.applied,
            declined = stats.declined,
            rejected = stats.rejected,
            balances = ledger.store().len(),
            "Sync replay finished"
        );

        write_balances_csv(&ledger.balances(), ledger.registry(), output)?;

        Ok(stats)
    }
}
