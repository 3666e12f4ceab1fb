//! Option store - the key-value table the maintenance settings live in.
//!
//! All functions take any `ConnectionTrait`, so they work against a plain
//! connection as well as inside a transaction.

use crate::{
    entities::{SiteOption, site_option},
    errors::Result,
};
use chrono::Utc;
use sea_orm::{Set, prelude::*};
use tracing::{debug, info, instrument};

/// Retrieves the raw value stored under `key`.
///
/// # Returns
/// * `Ok(Some(value))` - The key exists
/// * `Ok(None)` - The key has never been written or was deleted
#[instrument(skip(db))]
pub async fn get_option<C>(db: &C, key: &str) -> Result<Option<String>>
where
    C: ConnectionTrait,
{
    let value = SiteOption::find()
        .filter(site_option::Column::Key.eq(key))
        .one(db)
        .await?
        .map(|row| row.value);
    debug!("Option '{}': {:?}", key, value);
    Ok(value)
}

/// Sets or updates the value stored under `key` (UPSERT behavior).
#[instrument(skip(db, value))]
pub async fn set_option<C>(db: &C, key: &str, value: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let now = Utc::now().naive_utc();

    let existing = SiteOption::find()
        .filter(site_option::Column::Key.eq(key))
        .one(db)
        .await?;

    if let Some(row) = existing {
        let mut active_model: site_option::ActiveModel = row.into();
        active_model.value = Set(value.to_string());
        active_model.updated_at = Set(now);
        active_model.update(db).await?;
    } else {
        let new_row = site_option::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(now),
            ..Default::default()
        };
        new_row.insert(db).await?;
    }

    info!("Set option: {}", key);
    Ok(())
}

/// Deletes the option stored under `key`.
///
/// Deleting an absent key is a no-op. Returns whether a row was removed.
#[instrument(skip(db))]
pub async fn delete_option<C>(db: &C, key: &str) -> Result<bool>
where
    C: ConnectionTrait,
{
    let result = SiteOption::delete_many()
        .filter(site_option::Column::Key.eq(key))
        .exec(db)
        .await?;
    debug!("Deleted {} row(s) for option '{}'", result.rows_affected, key);
    Ok(result.rows_affected > 0)
}
