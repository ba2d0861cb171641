//! Analyze command implementation

use anyhow::Result;
use nm_core::{Analysis, MigrationDescriptor};
use nm_migrate::Migration;

use crate::cli::{AnalyzeArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};
use crate::context::RuntimeContext;

/// Execute the analyze command
pub async fn execute(args: &AnalyzeArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let executor = ctx.executor(&common::action_registry())?;
    let analysis = executor.analyze().await?;

    match args.output {
        OutputFormat::Json => common::print_json(&descriptors_only(&analysis))?,
        OutputFormat::Table => print_analysis(&analysis),
    }

    if analysis.is_valid() {
        Ok(())
    } else {
        Err(ExitCode(1).into())
    }
}

fn descriptors_only(analysis: &Analysis<Migration>) -> Analysis<&MigrationDescriptor> {
    Analysis {
        latest_applied_version: analysis.latest_applied_version.clone(),
        pending: analysis.pending.iter().map(|m| &m.descriptor).collect(),
        invalid: analysis.invalid.clone(),
    }
}

fn print_analysis(analysis: &Analysis<Migration>) {
    if !analysis.is_valid() {
        println!("The database must be repaired. Invalid versions:");
        let rows: Vec<Vec<String>> = analysis
            .invalid
            .iter()
            .map(|v| vec![format!("V{}", v.version), v.cause.to_string()])
            .collect();
        common::print_table(&["VERSION", "STATUS"], &rows);
        return;
    }

    println!(
        "Latest applied version: {}",
        analysis.latest_applied_version.as_deref().unwrap_or("-")
    );
    if analysis.pending.is_empty() {
        println!("Database is up-to-date.");
        return;
    }

    println!("Pending migrations:");
    let rows: Vec<Vec<String>> = analysis
        .pending
        .iter()
        .map(|m| {
            vec![
                format!("V{}", m.descriptor.version),
                m.descriptor.description.clone(),
                m.descriptor.kind.to_string(),
                common::cell(m.descriptor.source.as_deref()),
            ]
        })
        .collect();
    common::print_table(&["VERSION", "DESCRIPTION", "TYPE", "SOURCE"], &rows);
}
