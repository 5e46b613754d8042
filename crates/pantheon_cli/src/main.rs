#![forbid(unsafe_code)]
//! `pantheon` command-line entry point.
//!
//! # Responsibility
//! - Resolve config from file, environment and flags.
//! - Run single requests or a JSON-lines request loop on one connection.
//!
//! # Invariants
//! - A failing request never stops `serve-stdin`; it yields an error line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use pantheon_api::Dispatcher;
use pantheon_core::db::migrations::{current_user_version, latest_version};
use pantheon_core::db::open_db_with_options;
use pantheon_core::{core_version, init_logging, load_config, PantheonConfig};
use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "pantheon: relationship graph store for gods, abodes and emblems",
    long_about = None
)]
struct Cli {
    /// TOML config file; defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file (overrides config and PANTHEON_DB_PATH).
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Directory for rolling log files; logging stays off without one.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Create or migrate the database",
        after_help = "EXAMPLES:\n    # Initialize the default database\n    pantheon init\n\n    # Initialize a specific file\n    pantheon --db olympus.sqlite3 init"
    )]
    Init,

    #[command(
        about = "Run one JSON request",
        long_about = "Run one {\"op\":...,\"args\":{...}} request and print the response envelope.",
        after_help = "EXAMPLES:\n    # Create a god\n    pantheon exec '{\"op\":\"newGod\",\"args\":{\"name\":\"Zeus\",\"type\":\"god\"}}'\n\n    # Read the request from stdin\n    echo '{\"op\":\"gods\"}' | pantheon exec -"
    )]
    Exec {
        /// Request body, or `-` to read it from stdin.
        request: String,
    },

    #[command(
        about = "Serve JSON-lines requests from stdin",
        long_about = "Read one request per line from stdin and write one response per line to stdout."
    )]
    ServeStdin,

    #[command(about = "Print version information")]
    Version,
}

fn main() -> Result<()> {
    let Cli {
        config,
        db,
        log_level,
        log_dir,
        command,
    } = Cli::parse();

    if let Commands::Version = command {
        println!("pantheon {}", core_version());
        println!("schema_version={}", latest_version());
        return Ok(());
    }

    let config = resolve_config(config.as_deref(), db)?;
    start_logging(&config, log_level, log_dir)?;

    let conn = open_db_with_options(&config.db_path, &config.db_options())
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let dispatcher = Dispatcher::new(&conn).with_defaults(config.resolve_options());

    match command {
        Commands::Init => {
            let version = current_user_version(&conn).context("failed to read schema version")?;
            println!(
                "initialized {} schema_version={version}",
                config.db_path.display()
            );
        }
        Commands::Exec { request } => {
            let body = read_request(&request, io::stdin().lock())?;
            println!("{}", dispatcher.handle_json(&body));
        }
        Commands::ServeStdin => {
            serve_lines(&dispatcher, io::stdin().lock(), io::stdout().lock())?;
        }
        Commands::Version => {}
    }
    Ok(())
}

fn resolve_config(path: Option<&Path>, db: Option<PathBuf>) -> Result<PantheonConfig> {
    let mut config = load_config(path).context("failed to load config")?;
    if let Some(db) = db {
        config.db_path = db;
    }
    config.validate().context("invalid config")?;
    Ok(config)
}

fn start_logging(
    config: &PantheonConfig,
    level: Option<String>,
    log_dir: Option<PathBuf>,
) -> Result<()> {
    let Some(dir) = log_dir.or_else(|| config.log_dir.clone()) else {
        return Ok(());
    };
    let dir = if dir.is_absolute() {
        dir
    } else {
        std::env::current_dir()
            .context("failed to resolve working directory")?
            .join(dir)
    };
    let level = level.unwrap_or_else(|| config.log_level.clone());
    init_logging(&level, &dir).context("failed to start logging")?;
    info!(
        "event=cli_start module=cli status=ok db_path={}",
        config.db_path.display()
    );
    Ok(())
}

fn read_request<R: Read>(arg: &str, mut stdin: R) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut body = String::new();
    stdin
        .read_to_string(&mut body)
        .context("failed to read request from stdin")?;
    Ok(body)
}

/// Answers each non-blank input line with one response line.
fn serve_lines<R: BufRead, W: Write>(
    dispatcher: &Dispatcher<'_>,
    input: R,
    mut output: W,
) -> Result<usize> {
    let mut served = 0;
    for line in input.lines() {
        let line = line.context("failed to read request line")?;
        if line.trim().is_empty() {
            continue;
        }
        writeln!(output, "{}", dispatcher.handle_json(&line))?;
        output.flush()?;
        served += 1;
    }
    info!("event=serve_stdin module=cli status=ok served={served}");
    Ok(served)
}
