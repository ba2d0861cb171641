//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// neomigrate - versioned schema migrations for Neo4j
#[derive(Parser, Debug)]
#[command(name = "neomigrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Connection and scoping options shared by all commands.
///
/// Every option left unset falls back to the settings file (if given) and
/// then to the built-in default.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// YAML settings file
    #[arg(short, long, global = true, env = "NEO4J_MIGRATIONS_CONFIG")]
    pub config: Option<PathBuf>,

    /// The login of the user connecting to the database
    #[arg(short, long, global = true, env = "NEO4J_MIGRATIONS_USER")]
    pub username: Option<String>,

    /// The password of the user connecting to the database
    #[arg(long, global = true, env = "NEO4J_MIGRATIONS_PASS", hide_env_values = true)]
    pub password: Option<String>,

    /// The path to the directory for scanning migration files
    #[arg(short, long, global = true, env = "NEO4J_MIGRATIONS_PATH")]
    pub path: Option<PathBuf>,

    /// Host for connecting to the database
    #[arg(long, global = true, env = "NEO4J_MIGRATIONS_HOST")]
    pub host: Option<String>,

    /// Port for connecting to the database
    #[arg(long, global = true, env = "NEO4J_MIGRATIONS_PORT")]
    pub port: Option<u16>,

    /// Scheme for connecting to the database
    #[arg(long, global = true, env = "NEO4J_MIGRATIONS_SCHEME")]
    pub scheme: Option<String>,

    /// Project name separating independent migration chains in one database
    #[arg(long, global = true, env = "NEO4J_MIGRATIONS_PROJECT")]
    pub project: Option<String>,

    /// The database that should be migrated (Neo4j EE)
    #[arg(short, long, global = true, env = "NEO4J_MIGRATIONS_DATABASE")]
    pub database: Option<String>,

    /// The database storing the migration ledger (Neo4j EE); defaults to --database
    #[arg(long, global = true, env = "NEO4J_MIGRATIONS_SCHEMA_DATABASE")]
    pub schema_database: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify and apply all pending migrations
    Migrate(MigrateArgs),

    /// Compare local migrations with the database, finding pending and invalid versions
    Analyze(AnalyzeArgs),

    /// Show migrations applied to the database
    History(HistoryArgs),
}

/// Output formats for reporting commands
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Arguments for the migrate command
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

/// Arguments for the history command
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: OutputFormat,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
