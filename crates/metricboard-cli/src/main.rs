//! CLI for metricboard: live metric boards fed by pushed snapshots.

mod commands;
mod tui;

use std::env;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "metricboard")]
#[command(about = "metricboard: live metric boards fed by pushed snapshots")]
#[command(version = metricboard_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in boards, their events and metrics
    Presets {
        /// Print the full preset configuration as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Validate a dashboard configuration file
    CheckConfig {
        /// Path to a dashboard config JSON file
        path: String,
    },

    /// Replay a JSONL snapshot log through a dashboard and print every update
    Replay {
        /// Path to the event log (one snapshot event per line)
        path: String,

        /// Dashboard config JSON (defaults to the built-in preset)
        #[arg(long)]
        config: Option<String>,

        /// Print each update as a JSON line
        #[arg(long)]
        json: bool,
    },

    /// Live terminal dashboard.
    /// Feeds either a replayed event log (--file) or generated demo snapshots (--demo).
    Monitor {
        /// Event log to replay, one event per refresh
        #[arg(long, conflicts_with = "demo")]
        file: Option<String>,

        /// Generate random snapshots for every board and the worldmap
        #[arg(long)]
        demo: bool,

        /// Seconds between fed events
        #[arg(long, default_value = "1.0")]
        refresh: f64,

        /// Dashboard config JSON (defaults to the built-in preset)
        #[arg(long)]
        config: Option<String>,
    },

    /// Start the HTTP ingest server
    Server {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(long, default_value = "8042")]
        port: u16,

        /// Dashboard config JSON (defaults to the built-in preset)
        #[arg(long)]
        config: Option<String>,
    },
}

fn init_logging(default_level: log::LevelFilter) {
    let mut builder = env_logger::builder();
    if env::var_os("RUST_LOG").is_none() {
        builder.filter_level(default_level);
    }
    builder.init();
}

fn main() {
    let cli = Cli::parse();

    // Log lines would tear the alternate screen, so the monitor is quiet
    // unless RUST_LOG asks otherwise.
    init_logging(match cli.command {
        Commands::Monitor { .. } => log::LevelFilter::Off,
        _ => log::LevelFilter::Info,
    });

    match cli.command {
        Commands::Presets { json } => commands::presets::run(json),
        Commands::CheckConfig { path } => commands::check_config::run(&path),
        Commands::Replay { path, config, json } => {
            commands::replay::run(&path, config.as_deref(), json)
        }
        Commands::Monitor {
            file,
            demo,
            refresh,
            config,
        } => commands::monitor::run(file.as_deref(), demo, refresh, config.as_deref()),
        Commands::Server { host, port, config } => {
            commands::server::run(&host, port, config.as_deref())
        }
    }
}
