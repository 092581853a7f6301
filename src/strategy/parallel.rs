//! Parallel replay strategy
//!
//! Replays a command file against one shared ledger from several worker
//! threads, which is the workload the ledger's pairwise locking exists for.
//!
//! # Ordering
//!
//! 1. The whole file is parsed up front; malformed rows are counted and
//!    dropped.
//! 2. `open` commands are applied first, in file order, on the calling
//!    thread, so every worker sees the hydrated balances.
//! 3. Transfers are partitioned by source user (`from % n`, with `n` the
//!    worker count capped at the number of transfers). Each non-empty
//!    partition gets one thread and is applied in file order; partitions
//!    interleave arbitrarily.
//!
//! Commands sharing a source user therefore keep their relative order, but a
//! transfer that depends on a credit from another user's transfer may be
//! declined or not depending on scheduling. Inputs whose outcome must not
//! depend on scheduling should only chain credits within one source user.

use crate::core::LedgerService;
use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{apply_command, ReplayConfig, ReplayStats, ReplayStrategy};
use crate::types::{LedgerCommand, LedgerError};
use std::io::Write;
use std::path::Path;
use std::thread;

/// Parallel replay strategy
#[derive(Debug, Clone)]
pub struct ParallelReplayStrategy {
    config: ReplayConfig,
}

impl ParallelReplayStrategy {
    pub fn new(config: ReplayConfig) -> Self {
        Self { config }
    }
}

/// Split transfers into per-worker queues keyed by source user
///
/// Never returns more queues than commands, and never an empty queue, so
/// each queue is worth a thread.
fn partition(commands: Vec<LedgerCommand>, workers: usize) -> Vec<Vec<LedgerCommand>> {
    let slots = workers.min(commands.len()).max(1);
    let mut queues: Vec<Vec<LedgerCommand>> = (0..slots).map(|_| Vec::new()).collect();

    for command in commands {
        let slot = (command.source_user() % slots as u64) as usize;
        queues[slot].push(command);
    }

    queues.retain(|queue| !queue.is_empty());
    queues
}

impl ReplayStrategy for ParallelReplayStrategy {
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<ReplayStats, LedgerError> {
        let ledger = LedgerService::new(self.config.registry());
        let reader = SyncReader::new(input_path)?;
        let mut stats = ReplayStats::default();

        let mut transfers = Vec::new();
        for result in reader {
            match result {
                Ok(command @ LedgerCommand::Open { .. }) => {
                    stats.record(apply_command(&ledger, &command))
                }
                Ok(command) => transfers.push(command),
                Err(e) => {
                    tracing::warn!("CSV parsing error: {}", e);
                    stats.rejected += 1;
                }
            }
        }

        let queues = partition(transfers, self.config.workers);
        let threads = queues.len();
        tracing::debug!(
            threads,
            transfers = queues.iter().map(Vec::len).sum::<usize>(),
            "Dispatching transfers"
        );

        let worker_stats = thread::scope(|scope| {
            let handles: Vec<_> = queues
                .iter()
                .map(|queue| {
                    let ledger = &ledger;
                    scope.spawn(move || {
                        let mut local = ReplayStats::default();
                        for command in queue {
                            local.record(apply_command(ledger, command));
                        }
                        local
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().map_err(|_| LedgerError::IoError {
                        message: "Replay worker panicked".to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()
        })?;

        for local in worker_stats {
            stats += local;
        }

        tracing::info!(
            applied = stats.applied,
            declined = stats.declined,
            rejected = stats.rejected,
            balances = ledger.store().len(),
            threads,
            "Parallel replay finished"
        );

        write_balances_csv(&ledger.balances(), ledger.registry(), output)?;

        Ok(stats)
    }
}
