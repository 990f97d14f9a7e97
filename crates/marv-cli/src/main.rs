use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

/// Marv identifier resolver.
///
/// Binds every identifier use in a Marv syntax tree to the declaration it
/// refers to, and reports redefinitions and unresolved names.
///
/// EXAMPLES:
///     marv resolve main.json              Resolve a syntax tree
///     marv resolve main.json --json       Output diagnostics as JSON
///     marv resolve main.json --dump       Print the resolved tree
///     marv intrinsics                     List host-provided names
///
/// ENVIRONMENT VARIABLES:
///     MARV_JSON              Set to '1' for JSON output by default
///     MARV_DIAGNOSTICS       'human' or 'json' (overrides marv.toml)
///     MARV_WARN_UNRESOLVED   Set to '0' to silence unresolved-name warnings
///     MARV_LOG               Tracing filter, e.g. 'marv_resolver=trace'
#[derive(Parser)]
#[command(name = "marv")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve identifiers in a syntax tree
    ///
    /// Reads a JSON syntax tree, binds every use to its declaration and
    /// reports diagnostics. Exits non-zero when any error was reported.
    ///
    /// EXAMPLES:
    ///     marv resolve main.json                    Resolve and report
    ///     marv resolve main.json --source main.js   Report with line numbers
    ///     marv resolve main.json --dump > out.json  Save the resolved tree
    #[command(visible_alias = "r")]
    Resolve {
        /// Path to the JSON syntax tree
        file: PathBuf,
        /// Output diagnostics in JSON format
        #[arg(long, env = "MARV_JSON")]
        json: bool,
        /// Print the resolved tree as JSON to stdout
        #[arg(long)]
        dump: bool,
        /// Source text the tree was parsed from, for line/column reporting
        #[arg(long)]
        source: Option<PathBuf>,
        /// Use this marv.toml instead of searching from the current directory
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },

    /// List the names pre-declared as constants before any user code
    Intrinsics {
        /// Output as a JSON array
        #[arg(long, env = "MARV_JSON")]
        json: bool,
        /// Use this marv.toml instead of searching from the current directory
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
}

/// Install the stderr tracing subscriber, filtered by `MARV_LOG`
fn init_tracing() {
    let filter = EnvFilter::try_from_env("MARV_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            file,
            json,
            dump,
            source,
            config,
        } => {
            let args = commands::resolve::ResolveArgs {
                file,
                json,
                dump,
                source,
                config,
            };
            commands::resolve::run(args)?;
        }
        Commands::Intrinsics { json, config } => {
            commands::intrinsics::run(json, config.as_deref())?;
        }
    }

    Ok(())
}
