//! Maintenance settings - the typed view over the six raw options.
//!
//! Handles default substitution on read, type coercion on save, seeding the
//! defaults on activation and removing every key on uninstall.

use crate::{
    core::options::{delete_option, get_option, set_option},
    errors::Result,
};
use sea_orm::{ConnectionTrait, DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Master on/off switch
pub const ENABLE_MAINTENANCE_MODE_KEY: &str = "enable_maintenance_mode";
/// Start of the maintenance window (local date-time)
pub const MAINTENANCE_START_KEY: &str = "maintenance_start";
/// End of the maintenance window (local date-time)
pub const MAINTENANCE_END_KEY: &str = "maintenance_end";
/// IANA timezone the window is interpreted in
pub const MAINTENANCE_TIMEZONE_KEY: &str = "maintenance_timezone";
/// Whether the window is consulted at all
pub const ENABLE_TIME_CHECK_KEY: &str = "enable_time_check";
/// HTML shown to blocked visitors
pub const MAINTENANCE_MESSAGE_KEY: &str = "maintenance_message";

/// Every option key owned by the gate, in the order they appear on the form.
pub const ALL_OPTION_KEYS: [&str; 6] = [
    ENABLE_MAINTENANCE_MODE_KEY,
    MAINTENANCE_START_KEY,
    MAINTENANCE_END_KEY,
    ENABLE_TIME_CHECK_KEY,
    MAINTENANCE_MESSAGE_KEY,
    MAINTENANCE_TIMEZONE_KEY,
];

/// Window start written on activation
pub const DEFAULT_WINDOW_START: &str = "2024-11-29 18:00";
/// Window end written on activation
pub const DEFAULT_WINDOW_END: &str = "2024-11-29 19:00";
/// Timezone written on activation
pub const DEFAULT_TIMEZONE: &str = "Europe/Amsterdam";
/// Block page body written on activation
pub const DEFAULT_MESSAGE: &str = "<h1>We'll be back soon!</h1><p>The site is currently undergoing scheduled maintenance.</p>";

/// Stored representation of `true`; `false` is stored as an empty string.
const STORED_TRUE: &str = "1";

/// The gate's configuration, read once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaintenanceSettings {
    /// Master switch for blocking
    pub enabled: bool,
    /// Window start as written by the settings form
    pub window_start: String,
    /// Window end as written by the settings form
    pub window_end: String,
    /// IANA timezone identifier, may be invalid
    pub timezone: String,
    /// When false the window is ignored and `enabled` alone governs
    pub time_check_enabled: bool,
    /// Body of the block page
    pub message: String,
}

impl Default for MaintenanceSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            window_start: DEFAULT_WINDOW_START.to_string(),
            window_end: DEFAULT_WINDOW_END.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            time_check_enabled: false,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }
}

impl MaintenanceSettings {
    /// Pairs each option key with the string it is stored as.
    #[must_use]
    pub fn to_stored_values(&self) -> [(&'static str, String); 6] {
        [
            (ENABLE_MAINTENANCE_MODE_KEY, encode_bool(self.enabled)),
            (MAINTENANCE_START_KEY, self.window_start.clone()),
            (MAINTENANCE_END_KEY, self.window_end.clone()),
            (ENABLE_TIME_CHECK_KEY, encode_bool(self.time_check_enabled)),
            (MAINTENANCE_MESSAGE_KEY, self.message.clone()),
            (MAINTENANCE_TIMEZONE_KEY, self.timezone.clone()),
        ]
    }
}

/// Raw fields submitted by the settings form.
///
/// Unchecked checkboxes are simply absent from the submission.
#[derive(Debug, Clone, Default, Deserialize)]
#[allow(missing_docs)]
pub struct SettingsForm {
    #[serde(default)]
    pub enable_maintenance_mode: Option<String>,
    #[serde(default)]
    pub maintenance_start: String,
    #[serde(default)]
    pub maintenance_end: String,
    #[serde(default)]
    pub enable_time_check: Option<String>,
    #[serde(default)]
    pub maintenance_message: String,
    #[serde(default)]
    pub maintenance_timezone: String,
}

impl From<SettingsForm> for MaintenanceSettings {
    fn from(form: SettingsForm) -> Self {
        Self {
            enabled: form.enable_maintenance_mode.as_deref().is_some_and(parse_bool),
            window_start: form.maintenance_start,
            window_end: form.maintenance_end,
            timezone: form.maintenance_timezone,
            time_check_enabled: form.enable_time_check.as_deref().is_some_and(parse_bool),
            message: form.maintenance_message,
        }
    }
}

/// Interprets a stored or submitted boolean.
#[must_use]
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "on" | "yes"
    )
}

fn encode_bool(value: bool) -> String {
    if value {
        STORED_TRUE.to_string()
    } else {
        String::new()
    }
}

/// Reads all six options, substituting the default for any missing key.
#[instrument(skip(db))]
pub async fn load_settings<C>(db: &C) -> Result<MaintenanceSettings>
where
    C: ConnectionTrait,
{
    let defaults = MaintenanceSettings::default();

    let enabled = get_option(db, ENABLE_MAINTENANCE_MODE_KEY)
        .await?
        .map_or(defaults.enabled, |v| parse_bool(&v));
    let time_check_enabled = get_option(db, ENABLE_TIME_CHECK_KEY)
        .await?
        .map_or(defaults.time_check_enabled, |v| parse_bool(&v));
    let window_start = get_option(db, MAINTENANCE_START_KEY)
        .await?
        .unwrap_or(defaults.window_start);
    let window_end = get_option(db, MAINTENANCE_END_KEY)
        .await?
        .unwrap_or(defaults.window_end);
    let timezone = get_option(db, MAINTENANCE_TIMEZONE_KEY)
        .await?
        .unwrap_or(defaults.timezone);
    let message = get_option(db, MAINTENANCE_MESSAGE_KEY)
        .await?
        .unwrap_or(defaults.message);

    Ok(MaintenanceSettings {
        enabled,
        window_start,
        window_end,
        timezone,
        time_check_enabled,
        message,
    })
}

/// Persists every field of `settings`.
///
/// All six writes happen in one transaction. No cross-field validation is
/// performed; a reversed window is stored as given.
#[instrument(skip(db, settings))]
pub async fn save_settings(db: &DatabaseConnection, settings: &MaintenanceSettings) -> Result<()> {
    let txn = db.begin().await?;

    for (key, value) in settings.to_stored_values() {
        set_option(&txn, key, &value).await?;
    }

    txn.commit().await?;
    info!(
        enabled = settings.enabled,
        time_check_enabled = settings.time_check_enabled,
        "Maintenance settings saved"
    );
    Ok(())
}

/// Seeds defaults on activation.
///
/// Any key that is missing or holds an empty value gets its default; other
/// values are left untouched. Returns the keys that were written.
#[instrument(skip(db))]
pub async fn seed_default_settings<C>(db: &C) -> Result<Vec<&'static str>>
where
    C: ConnectionTrait,
{
    let mut seeded = Vec::new();

    for (key, default) in MaintenanceSettings::default().to_stored_values() {
        let current = get_option(db, key).await?;
        if current.as_deref().is_none_or(str::is_empty) {
            set_option(db, key, &default).await?;
            seeded.push(key);
        }
    }

    info!("Seeded {} default option(s)", seeded.len());
    Ok(seeded)
}

/// Deletes all six options. Idempotent.
///
/// Returns how many keys were actually present.
#[instrument(skip(db))]
pub async fn uninstall<C>(db: &C) -> Result<usize>
where
    C: ConnectionTrait,
{
    let mut removed = 0;
    for key in ALL_OPTION_KEYS {
        if delete_option(db, key).await? {
            removed += 1;
        }
    }
    info!("Removed {} maintenance option(s)", removed);
    Ok(removed)
}
