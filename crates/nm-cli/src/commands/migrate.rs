//! Migrate command implementation

use anyhow::Result;
use chrono::Local;
use nm_migrate::{MigrateError, MigrationReport};
use std::io::Write;

use crate::cli::{GlobalArgs, MigrateArgs, OutputFormat};
use crate::commands::common::{self, ExitCode};
use crate::context::RuntimeContext;

/// Execute the migrate command
pub async fn execute(args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global).await?;
    let executor = ctx.executor(&common::action_registry())?;
    let json = args.output == OutputFormat::Json;

    let result = executor
        .migrate_with(|applied| {
            if !json {
                let mut out = std::io::stdout().lock();
                writeln!(
                    out,
                    "{} Migration V{} ({}) APPLIED",
                    Local::now().format("%Y-%m-%d %H:%M:%S%.6f"),
                    applied.descriptor.version,
                    applied.descriptor.description
                )?;
                out.flush()?;
            }
            Ok(())
        })
        .await;

    match result {
        Ok(report) => report_success(&report, args.output),
        Err(MigrateError::Validation { invalid }) => {
            eprintln!(
                "Errors were found during migration verification. \
                 Run the `analyze` command for more information."
            );
            for version in &invalid {
                eprintln!("  {}", version);
            }
            Err(ExitCode(1).into())
        }
        Err(e) => {
            eprintln!("Migration failed: {}", e);
            Err(ExitCode(1).into())
        }
    }
}

fn report_success(report: &MigrationReport, output: OutputFormat) -> Result<()> {
    match output {
        OutputFormat::Json => common::print_json(report),
        OutputFormat::Table => {
            if report.applied.is_empty() {
                println!("Database is up-to-date.");
            } else {
                println!(
                    "Applied {} migration(s); database is at V{}.",
                    report.applied.len(),
                    report.current_version().unwrap_or("-")
                );
            }
            Ok(())
        }
    }
}
