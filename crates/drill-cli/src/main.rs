//! Drill - command-line front end.
//!
//! Resolves recorded dashboard clicks, deletes rows through the writeback
//! API and manages segments.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use drill_core::{Clicked, DrillConfig, EntityId, Table};
use drill_engine::segments::NEW_SEGMENT_PATH;
use drill_engine::{
    delete_row_from_object_detail, resolve, DashboardState, DeleteRowPayload, DetailEvent,
    Dispatcher, HttpClient, RowId, SegmentList,
};

// =============================================================================
// Arguments
// =============================================================================

#[derive(Parser)]
#[command(name = "drill", version, about = "Dashboard click-through tools")]
struct Cli {
    /// Config file (defaults to the drill config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve a recorded click and print the resulting action
    Resolve {
        /// JSON file holding the click context
        click: PathBuf,

        /// Apply a state-update action to the dashboard and print the new values
        #[arg(long)]
        apply: bool,
    },

    /// Delete a row from a table through the writeback API
    DeleteRow {
        /// JSON file holding the table metadata
        #[arg(long)]
        table: PathBuf,

        /// Primary-key value of the row
        #[arg(long)]
        id: String,
    },

    /// List active segments
    Segments {
        /// Only segments on this table
        #[arg(long)]
        table: Option<EntityId>,

        /// Archive this segment before listing
        #[arg(long)]
        retire: Option<EntityId>,
    },
}

// =============================================================================
// Helpers
// =============================================================================

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    serde_json::from_str(&text).map_err(|e| format!("Failed to parse {}: {}", path.display(), e))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", text);
    Ok(())
}

fn row_id(raw: &str) -> RowId {
    raw.parse::<i64>()
        .map(RowId::Int)
        .unwrap_or_else(|_| RowId::Str(raw.to_string()))
}

/// Prints view events as they arrive.
struct LogDispatcher;

impl Dispatcher for LogDispatcher {
    fn dispatch(&self, event: DetailEvent) {
        tracing::info!(action = event.action_type(), "Dispatched");
        println!("{}", event.action_type());
    }
}

// =============================================================================
// Commands
// =============================================================================

fn run_resolve(click: &Path, apply: bool) -> Result<(), String> {
    let clicked: Clicked = read_json(click)?;
    let action = resolve(&clicked);
    print_json(&action)?;

    if !apply {
        return Ok(());
    }
    let Some(effect) = action.as_ref().and_then(|a| a.as_effect()) else {
        tracing::info!("Nothing to apply");
        return Ok(());
    };
    let state = clicked
        .extra_data
        .as_ref()
        .and_then(DashboardState::from_extra_data)
        .ok_or("Click has no current dashboard to apply to")?;
    state.apply(effect);
    print_json(&state.values())
}

async fn run_delete_row(config: &DrillConfig, table: &Path, id: &str) -> Result<(), String> {
    let table: Table = read_json(table)?;
    let client = HttpClient::from_config(config).map_err(|e| e.to_string())?;
    let payload = DeleteRowPayload {
        table,
        id: row_id(id),
    };

    let response = delete_row_from_object_detail(&client, &LogDispatcher, payload)
        .await
        .map_err(|e| e.to_string())?;
    print_json(&response)
}

async fn run_segments(
    config: &DrillConfig,
    table: Option<EntityId>,
    retire: Option<EntityId>,
) -> Result<(), String> {
    let client = HttpClient::from_config(config).map_err(|e| e.to_string())?;
    let mut list = SegmentList::load(&client, table)
        .await
        .map_err(|e| e.to_string())?;

    if let Some(id) = retire {
        list.retire(&client, id).await.map_err(|e| e.to_string())?;
    }

    if let Some(message) = list.empty_message() {
        println!("{}", message);
    }
    for segment in list.segments() {
        println!("{}\t{}\t{}", segment.id, segment.table_id, segment.name);
    }
    println!("New segment: {}{}", config.site_url, NEW_SEGMENT_PATH);
    Ok(())
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DrillConfig::load_from(path),
        None => DrillConfig::load(),
    };
    let (config, config_error) = match config {
        Ok(config) => (config, None),
        Err(e) => (DrillConfig::default(), Some(e)),
    };

    let directive = config
        .log_level
        .parse::<Directive>()
        .unwrap_or_else(|_| tracing::Level::INFO.into());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();

    if let Some(e) = config_error {
        tracing::warn!("Using default config: {}", e);
    }

    let result = match cli.command {
        Command::Resolve { click, apply } => run_resolve(&click, apply),
        Command::DeleteRow { table, id } => run_delete_row(&config, &table, &id).await,
        Command::Segments { table, retire } => run_segments(&config, table, retire).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(debug_assertions)]
    fn test_debug_events_enabled_in_dev_builds() {
        use tracing::level_filters::{LevelFilter, STATIC_MAX_LEVEL};
        assert!(STATIC_MAX_LEVEL >= LevelFilter::DEBUG);
    }

    #[test]
    fn test_row_id_parsing() {
        assert_eq!(row_id("42"), RowId::Int(42));
        assert_eq!(row_id("abc"), RowId::Str("abc".to_string()));
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["drill", "segments", "--table", "3"]);
        assert!(matches!(
            cli.command,
            Command::Segments {
                table: Some(3),
                retire: None
            }
        ));

        let cli = Cli::parse_from(["drill", "resolve", "click.json", "--apply"]);
        assert!(matches!(cli.command, Command::Resolve { apply: true, .. }));
    }
}
