//! History command implementation

use anyhow::{Context, Result};
use nm_ledger::{Ledger, LedgerRecord};

use crate::cli::{GlobalArgs, HistoryArgs, OutputFormat};
use crate::commands::common;
use crate::context::RuntimeContext;

/// Execute the history command
pub async fn execute(args: &HistoryArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let ledger = ctx.ledger();
    let chain = ledger
        .read_chain()
        .await
        .context("Failed to read the migration ledger")?;

    match args.output {
        OutputFormat::Json => common::print_json(&chain),
        OutputFormat::Table => {
            if chain.is_empty() {
                println!("No migrations applied for {}.", ledger.scope());
            } else {
                common::print_table(
                    &[
                        "VERSION",
                        "DESCRIPTION",
                        "TYPE",
                        "APPLIED AT",
                        "DURATION",
                        "BY",
                        "CONNECTED AS",
                    ],
                    &history_rows(&chain),
                );
            }
            Ok(())
        }
    }
}

pub(crate) fn history_rows(chain: &[LedgerRecord]) -> Vec<Vec<String>> {
    chain
        .iter()
        .map(|record| {
            vec![
                format!("V{}", record.descriptor.version),
                record.descriptor.description.clone(),
                record.descriptor.kind.to_string(),
                record
                    .applied_at
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                record
                    .duration_ms
                    .map(common::format_duration_ms)
                    .unwrap_or_else(|| "-".to_string()),
                common::cell(record.migrated_by.as_deref()),
                common::cell(record.connected_as.as_deref()),
            ]
        })
        .collect()
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
