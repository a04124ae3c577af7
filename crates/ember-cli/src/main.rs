use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ember_config::{Config, ConfigLoader};
use tracing_subscriber::EnvFilter;

mod commands;

/// Ember builtin inspector.
///
/// Lists the builtin table compiled into the runtime, compiles individual
/// builtins on demand, and verifies that every builtin materializes under the
/// configured heap.
///
/// EXAMPLES:
///     ember list                                  List every builtin
///     ember show consoleObject.write              Compile one builtin
///     ember names                                 Show the public/private name table
///     ember check                                 Compile everything under ember.toml limits
///
/// ENVIRONMENT VARIABLES:
///     EMBER_JSON          Set to '1' for JSON output by default
///     EMBER_HEAP_LIMIT    Heap ceiling in bytes
///     EMBER_GC_THRESHOLD  Bytes allocated before the first collection
///     EMBER_GC_STRESS     Set to '1' to collect before every allocation
///     EMBER_LOG           Log filter (error, warn, info, debug, trace)
///     NO_COLOR            Set to disable colored output
#[derive(Parser)]
#[command(name = "ember")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List builtin families and their descriptors
    ///
    /// Prints every builtin in declaration order with its declared argument
    /// count, visibility, and display-name override.
    ///
    /// EXAMPLES:
    ///     ember list                          All families
    ///     ember list --family consoleObject   One family
    ///     ember list --json                   Machine-readable listing
    #[command(visible_alias = "ls")]
    List {
        /// Only list this family
        #[arg(long, short = 'f')]
        family: Option<String>,
        /// Output in JSON format
        #[arg(long, env = "EMBER_JSON")]
        json: bool,
    },

    /// Compile one builtin and describe its executable
    ///
    /// The builtin is addressed as `family.name`. Compilation errors are
    /// reported as diagnostics against the builtin's source.
    ///
    /// EXAMPLES:
    ///     ember show processObjectInternals.getStdinStream
    ///     ember show consoleObject.asyncIterator --json
    Show {
        /// Builtin path, e.g. `consoleObject.write`
        builtin: String,
        /// Also print the function body
        #[arg(long)]
        body: bool,
        /// Output in JSON format
        #[arg(long, env = "EMBER_JSON")]
        json: bool,
    },

    /// Export builtin names and print the public-to-private table
    ///
    /// EXAMPLES:
    ///     ember names
    ///     ember names --json
    Names {
        /// Output in JSON format
        #[arg(long, env = "EMBER_JSON")]
        json: bool,
    },

    /// Compile every builtin under the configured heap
    ///
    /// Exits with a non-zero status if any builtin fails to compile or the
    /// heap limit is exceeded.
    ///
    /// EXAMPLES:
    ///     ember check
    ///     EMBER_HEAP_LIMIT=4096 ember check
    #[command(visible_alias = "c")]
    Check {
        /// Output in JSON format
        #[arg(long, env = "EMBER_JSON")]
        json: bool,
        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load_from_directory(&std::env::current_dir()?)
        .context("Failed to load configuration")?;
    init_logging(&config)?;

    match cli.command {
        Commands::List { family, json } => commands::list::run(family.as_deref(), json)?,
        Commands::Show {
            builtin,
            body,
            json,
        } => commands::show::run(&config, &builtin, body, json)?,
        Commands::Names { json } => commands::names::run(&config, json)?,
        Commands::Check { json, no_color } => commands::check::run(&config, json, no_color)?,
    }

    Ok(())
}

/// Route runtime tracing events to stderr, filtered by the configured level
fn init_logging(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(config.log_level())
        .with_context(|| format!("Invalid log filter '{}'", config.log_level()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}
