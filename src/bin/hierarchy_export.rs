//! Hierarchy export - print one panchayath's hierarchy from the local store
//!
//! Opens the database read-only, so it can run while the desktop app is open.
//!
//! Usage:
//!   hierarchy_export --panchayath <id> [--format outline|cards|graph]
//!
//! Environment variables:
//!   PANCHAYATH_DB - database path (default: config `databasePath`, then
//!                   ~/.panchayath/panchayath.db)
//!   RUST_LOG      - log filter (default: warn)

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use panchayath_lib::db::AgentDb;
use panchayath_lib::error::AppError;
use panchayath_lib::hierarchy::{render_outline, CardKey, SupervisorAttachment};
use panchayath_lib::services;
use panchayath_lib::state::load_config;
use panchayath_lib::types::Config;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// Indented plain text
    Outline,
    /// Card tree as JSON
    Cards,
    /// Node/edge graph as JSON
    Graph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Key {
    Id,
    Name,
}

#[derive(Parser, Debug)]
#[command(name = "hierarchy_export")]
#[command(about = "Print a panchayath's field-agent hierarchy")]
#[command(version)]
struct Args {
    /// Panchayath id
    #[arg(long)]
    panchayath: String,

    /// Output format
    #[arg(long, value_enum, default_value = "outline")]
    format: Format,

    /// Card branch key (outline and cards formats)
    #[arg(long, value_enum, default_value = "id")]
    key: Key,

    /// Hang supervisors under their coordinator in the graph
    #[arg(long)]
    by_coordinator: bool,

    /// Database path
    #[arg(long, env = "PANCHAYATH_DB")]
    database: Option<PathBuf>,
}

fn export(args: &Args) -> Result<String, AppError> {
    let config = load_config().unwrap_or_else(|e| {
        log::warn!("{}; using default config", e);
        Config::default()
    });
    let path = match (&args.database, &config.database_path) {
        (Some(p), _) => p.clone(),
        (None, Some(p)) => p.clone(),
        (None, None) => AgentDb::db_path()?,
    };
    log::info!("Reading {}", path.display());
    let db = AgentDb::open_readonly_at(&path)?;

    let mode = match args.key {
        Key::Id => CardKey::Id,
        Key::Name => CardKey::Name,
    };

    let json = |value: serde_json::Result<String>| {
        value.map_err(|e| AppError::Config(format!("Failed to serialize output: {}", e)))
    };

    match args.format {
        Format::Outline => {
            let tree = services::hierarchy::card_tree(&db, &args.panchayath, mode)?;
            Ok(render_outline(&tree))
        }
        Format::Cards => {
            let tree = services::hierarchy::card_tree(&db, &args.panchayath, mode)?;
            json(serde_json::to_string_pretty(&tree))
        }
        Format::Graph => {
            let attachment = if args.by_coordinator {
                SupervisorAttachment::Coordinator
            } else {
                SupervisorAttachment::Panchayath
            };
            let graph =
                services::hierarchy::graph(&db, &args.panchayath, &config.graph_layout, attachment)?;
            json(serde_json::to_string_pretty(&graph))
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    match export(&args) {
        Ok(out) => {
            print!("{}", out);
            if !out.ends_with('\n') {
                println!();
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Export failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
