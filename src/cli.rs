//! Command line interface.
//!
//! `serve` is the default; the other commands cover the settings lifecycle
//! (activation, inspection, uninstall) without starting the server.

use crate::{
    config::{self, AppConfig, database},
    core::{
        gate::{CallerRole, GateDecision, GateRequest, decide},
        settings::{self, MaintenanceSettings},
    },
    errors::Result,
    web,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use tracing::info;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "maintenance-gate")]
#[command(version)]
#[command(about = "Puts a website behind a scheduled maintenance page", long_about = None)]
pub struct Cli {
    /// Path to configuration file (defaults to ./maintenance-gate.toml)
    #[arg(short, long, env = "MAINTENANCE_CONFIG")]
    pub config: Option<PathBuf>,

    /// What to do (defaults to `serve`)
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Serve the site behind the gate (default)
    Serve,
    /// Create the option table and seed default settings
    Activate,
    /// Print the effective settings and the current decision for a visitor
    Status,
    /// Remove every maintenance option from the store
    Uninstall,
}

/// Runs the parsed command line to completion.
pub async fn run(cli: Cli) -> Result<()> {
    let app_config = config::load_app_configuration(cli.config.as_deref())?;
    let db = database::create_connection(&app_config.database_url).await?;
    database::create_tables(&db).await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            settings::seed_default_settings(&db).await?;
            web::serve(&app_config, db).await
        }
        Commands::Activate => {
            let seeded = settings::seed_default_settings(&db).await?;
            println!("Seeded {} default option(s)", seeded.len());
            Ok(())
        }
        Commands::Status => {
            let current = settings::load_settings(&db).await?;
            print!("{}", format_status(&current, Utc::now()));
            Ok(())
        }
        Commands::Uninstall => uninstall(&db, &app_config).await,
    }
}

async fn uninstall(db: &DatabaseConnection, app_config: &AppConfig) -> Result<()> {
    let removed = settings::uninstall(db).await?;
    info!(database = %app_config.database_url, "Uninstall finished");
    println!("Removed {removed} maintenance option(s)");
    Ok(())
}

/// Formats the settings and what the gate would do for an anonymous visitor at `now`.
#[must_use]
pub fn format_status(current: &MaintenanceSettings, now: DateTime<Utc>) -> String {
    let decision = decide(&GateRequest::default(), CallerRole::Visitor, current, now);
    let verdict = match decision {
        GateDecision::Allow(reason) => format!("allow ({reason:?})"),
        GateDecision::Block(_) => "block (503)".to_string(),
    };

    format!(
        "Maintenance mode:  {}\n\
         Time check:        {}\n\
         Window:            {} .. {}\n\
         Timezone:          {}\n\
         Visitors right now: {verdict}\n",
        on_off(current.enabled),
        on_off(current.time_check_enabled),
        current.window_start,
        current.window_end,
        current.timezone,
    )
}

const fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}
