use crate::strategy::ReplayConfig;
use crate::types::AssetMeta;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Replay ledger commands and print the resulting balances
#[derive(Parser, Debug)]
#[command(name = "ledger-replay")]
#[command(about = "Replay ledger transfer commands and print final balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing ledger commands
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Replay strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' for file order or 'parallel' for worker threads"
    )]
    pub strategy: StrategyType,

    /// Number of worker threads (parallel mode only)
    #[arg(
        long = "workers",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub workers: Option<usize>,

    /// Extra assets to register, as SYMBOL:PRECISION
    #[arg(
        long = "asset",
        value_name = "SYMBOL:PRECISION",
        help = "Register an extra asset (repeatable), e.g. --asset SOL:9"
    )]
    pub assets: Vec<AssetMeta>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long = "log-json")]
    pub log_json: bool,
}

/// Available replay strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Parallel,
}

impl CliArgs {
    /// Create a ReplayConfig from CLI arguments
    ///
    /// Missing values fall back to the defaults; a worker count of 0 is
    /// replaced by the default with a warning.
    pub fn to_config(&self) -> ReplayConfig {
        let default = ReplayConfig::default();
        ReplayConfig::new(
            self.workers.unwrap_or(default.workers),
            self.assets.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AssetId;
    use rstest::rstest;

    #[rstest]
    #[case::default_strategy(&["program", "input.csv"], StrategyType::Sync)]
    #[case::explicit_sync(&["program", "--strategy", "sync", "input.csv"], StrategyType::Sync)]
    #[case::explicit_parallel(&["program", "--strategy", "parallel", "input.csv"], StrategyType::Parallel)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[rstest]
    #[case::all_defaults(&["program", "input.csv"], num_cpus::get())]
    #[case::custom_workers(&["program", "--workers", "3", "input.csv"], 3)]
    #[case::zero_workers(&["program", "--workers", "0", "input.csv"], num_cpus::get())]
    fn test_config_workers(#[case] args: &[&str], #[case] expected_workers: usize) {
        let parsed = CliArgs::try_parse_from(args).unwrap();

        assert_eq!(parsed.to_config().workers, expected_workers);
    }

    #[test]
    fn test_repeatable_assets() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--asset",
            "SOL:9",
            "--asset",
            "EUR:2",
            "input.csv",
        ])
        .unwrap();

        let config = parsed.to_config();
        assert_eq!(config.extra_assets.len(), 2);
        assert_eq!(config.extra_assets[0].id, AssetId::from("SOL"));
        assert_eq!(config.extra_assets[0].precision, 9);
        assert_eq!(config.extra_assets[1].id, AssetId::from("EUR"));
    }

    #[test]
    fn test_logging_flags() {
        let parsed =
            CliArgs::try_parse_from(["program", "--log-level", "debug", "--log-json", "in.csv"])
                .unwrap();

        assert_eq!(parsed.log_level, "debug");
        assert!(parsed.log_json);

        let defaults = CliArgs::try_parse_from(["program", "in.csv"]).unwrap();
        assert_eq!(defaults.log_level, "warn");
        assert!(!defaults.log_json);
    }

    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "async", "input.csv"])]
    #[case::bad_asset(&["program", "--asset", "SOL", "input.csv"])]
    #[case::bad_precision(&["program", "--asset", "SOL:x", "input.csv"])]
    #[case::negative_workers(&["program", "--workers", "-1", "input.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
