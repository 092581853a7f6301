//! Ledger replay CLI
//!
//! Replays a command CSV against a fresh ledger and prints the final
//! balances to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- commands.csv > balances.csv
//! cargo run -- --strategy parallel --workers 8 commands.csv > balances.csv
//! cargo run -- --asset SOL:9 --log-level debug commands.csv > balances.csv
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (missing arguments, file not found, file not readable, etc.)

use asset_ledger::cli;
use asset_ledger::logging;
use asset_ledger::strategy;
use std::process;

fn main() {
    let args = cli::parse_args();

    logging::init_logging(&args.log_level, args.log_json);

    let strategy = strategy::create_strategy(args.strategy, args.to_config());

    let mut output = std::io::stdout().lock();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!("{}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
