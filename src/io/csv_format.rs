//! CSV format handling for ledger commands and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvCommand structure for deserialization
//! - Conversion from CSV rows to [`LedgerCommand`]s
//! - Balance output serialization, formatted to each asset's precision
//!
//! All functions are pure (no file I/O) for easy testing.
//!
//! # Input format
//!
//! ```text
//! op,from,to,asset,amount,check
//! open,1,,USD,100,
//! available_to_available,1,2,USD,30,
//! freeze,2,,USD,10,
//! available_to_available,2,3,USD,5,false
//! ```
//!
//! `to` defaults to `from`; `check` defaults to `true`. An empty amount is
//! passed through as "unset" so the ledger can reject it.

use crate::core::AssetRegistry;
use crate::types::{
    AssetId, BalanceSnapshot, LedgerCommand, LedgerError, TransferRequest, TransferType, UserId,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvCommand {
    pub op: String,
    pub from: UserId,
    #[serde(default)]
    pub to: Option<UserId>,
    pub asset: String,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub check: Option<bool>,
}

/// Convert a CsvCommand to a LedgerCommand
///
/// # Errors
///
/// - `InvalidTransferType` for an unknown `op`
/// - `InvalidAmount` for an amount that does not parse, or an `open` row
///   without an amount
pub fn convert_csv_command(row: CsvCommand) -> Result<LedgerCommand, LedgerError> {
    let amount = parse_amount(row.amount.as_deref())?;
    let asset = AssetId::new(row.asset.trim());

    let transfer_type = match row.op.trim().to_lowercase().as_str() {
        "open" => {
            let available = amount.ok_or_else(LedgerError::missing_amount)?;
            return Ok(LedgerCommand::Open {
                user: row.from,
                asset,
                available,
            });
        }
        // Own-account shorthands; `to` is ignored
        "freeze" => {
            return Ok(LedgerCommand::Transfer(
                TransferRequest::freeze(row.from, asset, Decimal::ZERO).with_amount(amount),
            ))
        }
        "unfreeze" => {
            return Ok(LedgerCommand::Transfer(
                TransferRequest::unfreeze(row.from, asset, Decimal::ZERO).with_amount(amount),
            ))
        }
        other => TransferType::from_str(other)?,
    };

    let mut request = TransferRequest::new(
        transfer_type,
        row.from,
        row.to.unwrap_or(row.from),
        asset,
        Decimal::ZERO,
    )
    .with_amount(amount);
    request.check_balance = row.check.unwrap_or(true);

    Ok(LedgerCommand::Transfer(request))
}

fn parse_amount(raw: Option<&str>) -> Result<Option<Decimal>, LedgerError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => Decimal::from_str(text)
            .map(Some)
            .map_err(|_| LedgerError::invalid_amount(text)),
    }
}

/// Format an amount to the asset's registry precision
///
/// Unknown assets fall back to the value's own scale, trailing zeros removed.
pub fn format_amount<R: AssetRegistry + ?Sized>(
    registry: &R,
    asset: &AssetId,
    value: Decimal,
) -> String {
    match registry.precision(asset) {
        Some(precision) => format!("{:.*}", precision as usize, value.round_dp(precision)),
        None => value.normalize().to_string(),
    }
}

/// Write balance snapshots in CSV format
///
/// Columns: user, asset, available, frozen. Rows are sorted by (user, asset)
/// for deterministic output.
pub fn write_balances_csv<R: AssetRegistry + ?Sized>(
    balances: &[BalanceSnapshot],
    registry: &R,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer.write_record(["user", "asset", "available", "frozen"])?;

    let mut sorted: Vec<&BalanceSnapshot> = balances.iter().collect();
    sorted.sort_by(|a, b| (a.user, &a.asset).cmp(&(b.user, &b.asset)));

    for balance in sorted {
        writer.write_record(&[
            balance.user.to_string(),
            balance.asset.to_string(),
            format_amount(registry, &balance.asset, balance.available),
            format_amount(registry, &balance.asset, balance.frozen),
        ])?;
    }

    writer.flush()?;

    Ok(())
}
