use super::*;
use clap::CommandFactory;
use serial_test::serial;

#[test]
fn verify_cli_args() {
    // Validates the entire command tree: short flag conflicts,
    // duplicate args, and other clap definition errors.
    Cli::command().debug_assert();
}

#[test]
#[serial]
fn test_global_options_after_subcommand() {
    let cli = Cli::try_parse_from([
        "neomigrate",
        "analyze",
        "--path",
        "migrations",
        "--database",
        "movies",
        "--output",
        "json",
    ])
    .unwrap();

    assert_eq!(cli.global.path, Some(PathBuf::from("migrations")));
    assert_eq!(cli.global.database.as_deref(), Some("movies"));
    match cli.command {
        Commands::Analyze(args) => assert_eq!(args.output, OutputFormat::Json),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
#[serial]
fn test_output_defaults_to_table() {
    let cli = Cli::try_parse_from(["neomigrate", "history"]).unwrap();
    match cli.command {
        Commands::History(args) => assert_eq!(args.output, OutputFormat::Table),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
#[serial]
fn test_port_must_be_numeric() {
    assert!(Cli::try_parse_from(["neomigrate", "--port", "bolt", "migrate"]).is_err());
}

#[test]
#[serial]
fn test_subcommand_required() {
    assert!(Cli::try_parse_from(["neomigrate"]).is_err());
}
