//! Database configuration module for the maintenance gate.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! The schema is generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the table always matches the Rust model.

use crate::entities::SiteOption;
use crate::errors::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, instrument};

/// Default `SQLite` location used when neither the config file nor `DATABASE_URL` sets one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/maintenance_gate.sqlite?mode=rwc";

/// Establishes a connection to the database at `database_url`.
///
/// In-memory `SQLite` URLs get a single pinned connection, since every pooled
/// connection would otherwise open its own empty database.
#[instrument]
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to option store");
    let mut options = ConnectOptions::new(database_url);
    if database_url.contains(":memory:") {
        options.max_connections(1).min_connections(1);
    }
    Database::connect(options).await.map_err(Into::into)
}

/// Creates the `site_options` table if it does not exist yet.
///
/// Safe to call on every start; an existing table and its rows are left alone.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut site_options_table = schema.create_table_from_entity(SiteOption);
    site_options_table.if_not_exists();

    db.execute(builder.build(&site_options_table)).await?;

    Ok(())
}
