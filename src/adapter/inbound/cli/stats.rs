//! Handler for the `stats` command.
//!
//! Reads the persisted statistics file and renders it as a table, or as one
//! JSON document with `--json`.

use rust_decimal::Decimal;
use serde_json::json;
use tabled::{Table, Tabled};

use super::command::StatsArgs;
use super::output;
use crate::adapter::outbound::json::JsonFileStatsRepository;
use crate::domain::liquidation::group_thousands;
use crate::domain::{StatisticsStore, Symbol, SymbolStats};
use crate::error::Result;
use crate::infrastructure::config::Config;

#[derive(Debug, Tabled)]
pub(crate) struct StatsRow {
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Count")]
    count: String,
    #[tabled(rename = "Total Qty")]
    total_quantity: String,
    #[tabled(rename = "Largest")]
    largest: String,
    #[tabled(rename = "Avg Qty")]
    average: String,
    #[tabled(rename = "Notional")]
    notional: String,
}

impl StatsRow {
    fn new(symbol: &Symbol, stats: &SymbolStats) -> Self {
        Self {
            symbol: symbol.to_string(),
            count: group_thousands(stats.count),
            total_quantity: group_thousands(stats.total_quantity),
            largest: group_thousands(stats.largest_quantity),
            average: group_thousands(average_quantity(stats)),
            notional: stats.total_notional.round_dp(2).normalize().to_string(),
        }
    }
}

fn average_quantity(stats: &SymbolStats) -> u64 {
    stats.total_quantity.checked_div(stats.count).unwrap_or(0)
}

/// Table rows, one per symbol, optionally filtered.
pub(crate) fn rows(store: &StatisticsStore, symbol: Option<&str>) -> Vec<StatsRow> {
    store
        .iter()
        .filter(|(s, _)| symbol.map_or(true, |wanted| s.as_str() == wanted))
        .map(|(s, stats)| StatsRow::new(s, stats))
        .collect()
}

/// Execute the stats command.
pub fn execute(args: &StatsArgs) -> Result<()> {
    let path = match &args.file {
        Some(file) => file.clone(),
        None => {
            let config = Config::load(&args.config)?;
            if !config.statistics.persist {
                output::warning("Statistics persistence is disabled in this configuration");
                return Ok(());
            }
            config.statistics.path
        }
    };

    let repository = JsonFileStatsRepository::new(&path);
    let file = repository.read()?;

    if output::is_json() {
        let (updated_at, store) = match file {
            Some(file) => (Some(file.updated_at), file.symbols),
            None => (None, StatisticsStore::new()),
        };
        let symbols = store
            .iter()
            .filter(|(s, _)| args.symbol.as_deref().map_or(true, |wanted| s.as_str() == wanted))
            .map(|(s, stats)| serde_json::to_value(stats).map(|value| (s.to_string(), value)))
            .collect::<std::result::Result<serde_json::Map<String, serde_json::Value>, _>>()?;
        output::json_output(json!({
            "command": "stats",
            "path": path.display().to_string(),
            "updated_at": updated_at,
            "symbols": symbols,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("File", path.display());

    let Some(file) = file else {
        output::warning("No statistics recorded yet");
        return Ok(());
    };

    output::field("Updated", file.updated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    output::field("Liquidations", group_thousands(file.symbols.total_count()));

    let rows = rows(&file.symbols, args.symbol.as_deref());
    if rows.is_empty() {
        output::warning("No matching symbols");
        return Ok(());
    }

    let notional: Decimal = file
        .symbols
        .iter()
        .map(|(_, stats)| stats.total_notional)
        .sum();
    output::field("Notional", notional.round_dp(2).normalize());

    output::section("Symbols");
    output::lines(&Table::new(rows).to_string());
    Ok(())
}
