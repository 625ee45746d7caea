//! Weld CLI — the command-line driver for whole-program link-time
//! optimization.
//!
//! Provides `weld link` to merge `.wir` modules and generate native
//! objects, `weld dump` to inspect a module's symbol table, and
//! `weld cache` for out-of-band maintenance of the incremental object
//! cache.

#![warn(missing_docs)]

mod cache;
mod dump;
mod emit;
mod link;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Weld — a whole-program LTO driver.
#[derive(Parser, Debug)]
#[command(name = "weld", version, about = "Weld LTO driver")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a custom `weld.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Merge IR modules and generate native objects.
    Link(LinkArgs),
    /// Print the symbol table of a `.wir` module.
    Dump(DumpArgs),
    /// Inspect or prune the incremental object cache.
    Cache(CacheArgs),
}

/// Arguments for the `weld link` subcommand.
#[derive(Parser, Debug)]
pub struct LinkArgs {
    /// Input `.wir` module files, in registration order.
    #[arg(required = true)]
    pub modules: Vec<PathBuf>,

    /// Base path for the generated objects (`<output>.<n>.o`).
    #[arg(short, long, default_value = "weld.out")]
    pub output: PathBuf,

    /// Codegen job limit: 0 picks a default level of parallelism, 1 forces
    /// sequential execution.
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Cache directory for incremental codegen (overrides `weld.toml`).
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Disable the incremental object cache for this link.
    #[arg(long)]
    pub no_cache: bool,

    /// Persist each task's buffer to `<output>.lto.<task>.o` for inspection.
    #[arg(long)]
    pub save_temps: bool,

    /// Optimization level passed to the codegen engine (0-3).
    #[arg(short = 'O', long)]
    pub opt_level: Option<u8>,
}

/// Arguments for the `weld dump` subcommand.
#[derive(Parser, Debug)]
pub struct DumpArgs {
    /// The `.wir` module file to inspect.
    pub module: PathBuf,
}

/// Arguments for the `weld cache` subcommand.
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Cache directory (overrides `weld.toml`).
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// The cache operation to run.
    #[command(subcommand)]
    pub command: CacheCommand,
}

/// Cache maintenance operations.
#[derive(Subcommand, Debug)]
pub enum CacheCommand {
    /// Print entry count and total size.
    Stats,
    /// Apply the pruning policy to the cache directory.
    Prune {
        /// Maximum total cache size, e.g. "2G" (overrides `weld.toml`).
        #[arg(long)]
        max_size: Option<String>,

        /// Maximum entry age, e.g. "14d" (overrides `weld.toml`).
        #[arg(long)]
        max_age: Option<String>,
    },
    /// Remove every cached object.
    Clear,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a custom config file.
    pub config: Option<PathBuf>,
}

fn init_tracing(global: &GlobalArgs) {
    let default_level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
    };
    init_tracing(&global);

    let result = match cli.command {
        Command::Link(ref args) => link::run(args, &global),
        Command::Dump(ref args) => dump::run(args),
        Command::Cache(ref args) => cache::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
