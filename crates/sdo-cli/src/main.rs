//! `sdo`: operator CLI for State of DevOps alarm capture.
//!
//! Replays alarm events through the state-change handler against a local
//! SQLite event store, lists what was recorded, and prints dashboard bodies.
//!
//! # Usage
//!
//! ```text
//! sdo replay event.json --history history.json --app-names app1,app2
//! sdo records app1-service-alarm
//! sdo dashboard flaky-service-pipeline stable-service-pipeline
//! ```

mod commands;

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use sdo_store_sqlite::SqliteEventStore;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(author, version, about = "State of DevOps alarm capture tools")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "sdo.toml")]
  config: PathBuf,

  /// SQLite event store; overrides `store_path` from the config file.
  #[arg(long, env = "SDO_STORE_PATH")]
  store: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Run a CloudWatch alarm state-change event through the handler.
  Replay {
    /// JSON file holding the EventBridge event.
    event: PathBuf,

    /// JSON array of history entries to use when nothing is stored.
    #[arg(long)]
    history: Option<PathBuf>,

    /// Comma-separated known application names; overrides `app_names`.
    #[arg(long)]
    app_names: Option<String>,
  },

  /// List stored records, for one alarm or for all of them.
  Records {
    /// Alarm name (not the record key).
    alarm: Option<String>,
  },

  /// Print the dashboard body for the given pipelines.
  Dashboard {
    pipelines: Vec<String>,

    #[arg(long, default_value = "ap-southeast-2")]
    region: String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Settings {
  store_path: PathBuf,
  app_names:  String,
}

fn load_settings(path: &Path) -> anyhow::Result<Settings> {
  let settings = config::Config::builder()
    .set_default("store_path", "sdo.db")?
    .set_default("app_names", "")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("SDO"))
    .build()
    .context("failed to read config file")?;

  settings
    .try_deserialize()
    .context("failed to deserialise settings")
}

async fn open_store(path: &Path) -> anyhow::Result<SqliteEventStore> {
  SqliteEventStore::open(path)
    .await
    .with_context(|| format!("failed to open store at {path:?}"))
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let Cli { config, store, command } = Cli::parse();

  match command {
    Command::Dashboard { pipelines, region } => {
      println!("{}", commands::dashboard(&pipelines, &region)?);
    }
    Command::Replay { event, history, app_names } => {
      let settings = load_settings(&config)?;
      let store = open_store(&store.unwrap_or(settings.store_path)).await?;
      let app_names = app_names.unwrap_or(settings.app_names);

      let outcome =
        commands::replay(store, &event, history.as_deref(), &app_names).await?;
      print_json(&commands::summary(&outcome))?;
    }
    Command::Records { alarm } => {
      let settings = load_settings(&config)?;
      let store = open_store(&store.unwrap_or(settings.store_path)).await?;

      let records = commands::records(&store, alarm.as_deref()).await?;
      print_json(&serde_json::to_value(records)?)?;
    }
  }

  Ok(())
}
