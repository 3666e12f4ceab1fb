//! Access gate - decides per request whether a visitor may reach the site.
//!
//! The decision is a pure function of the request's bypass flag, the caller's
//! role, the stored settings and the current instant. Turning a block into an
//! HTTP response is left to the web layer.

use crate::core::settings::MaintenanceSettings;
use chrono::{DateTime, NaiveDateTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Query parameter that skips the gate entirely
pub const BYPASS_PARAM: &str = "emergency-login";
/// The only value of [`BYPASS_PARAM`] that counts as a bypass
pub const BYPASS_VALUE: &str = "1";
/// Status code of the block response
pub const BLOCK_STATUS: u16 = 503;
/// Value of the `Retry-After` header on the block response, in seconds
pub const RETRY_AFTER_SECONDS: u32 = 3600;
/// Timezone used when the stored identifier is not a valid IANA name
pub const FALLBACK_TIMEZONE: Tz = Tz::UTC;

/// Formats the settings form and the activation defaults may produce.
const LOCAL_DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Who is making the request, as far as the gate cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallerRole {
    /// Holds administrator privilege and is never blocked
    Administrator,
    /// Anyone else, including anonymous visitors
    Visitor,
}

impl CallerRole {
    /// Whether this caller holds administrator privilege
    #[must_use]
    pub const fn is_administrator(self) -> bool {
        matches!(self, Self::Administrator)
    }
}

/// The parts of an incoming request the gate consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateRequest {
    /// `emergency-login=1` was present in the query string
    pub bypass_requested: bool,
}

impl GateRequest {
    /// Builds a request from decoded query-string pairs.
    ///
    /// When the bypass parameter repeats, the last occurrence wins.
    pub fn from_query_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let bypass_requested = pairs
            .into_iter()
            .filter(|(key, _)| key.as_ref() == BYPASS_PARAM)
            .last()
            .is_some_and(|(_, value)| value.as_ref() == BYPASS_VALUE);

        Self { bypass_requested }
    }
}

/// Why a request was let through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    /// The emergency login parameter was present
    Bypass,
    /// Maintenance mode is switched off
    Disabled,
    /// Time check is on and now is outside the window
    OutsideWindow,
    /// Time check is on but a window boundary could not be parsed
    UnparseableWindow,
    /// The caller is an administrator
    Administrator,
}

/// The terminal response sent to a blocked visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockResponse {
    /// HTTP status code, always [`BLOCK_STATUS`]
    pub status: u16,
    /// Response headers
    pub headers: Vec<(&'static str, String)>,
    /// The configured maintenance message (HTML)
    pub body: String,
}

impl BlockResponse {
    /// The 503 response carrying `message` as its body.
    #[must_use]
    pub fn maintenance(message: &str) -> Self {
        Self {
            status: BLOCK_STATUS,
            headers: vec![("Retry-After", RETRY_AFTER_SECONDS.to_string())],
            body: message.to_string(),
        }
    }
}

/// Outcome of running the gate on one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Continue with normal request handling
    Allow(AllowReason),
    /// Stop here and send the block response
    Block(BlockResponse),
}

impl GateDecision {
    /// Whether the request must be stopped
    #[must_use]
    pub const fn is_block(&self) -> bool {
        matches!(self, Self::Block(_))
    }
}

/// The `[start, end]` interval during which blocking is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceWindow {
    /// First blocked instant
    pub start: DateTime<Tz>,
    /// Last blocked instant
    pub end: DateTime<Tz>,
}

impl MaintenanceWindow {
    /// Interprets both boundaries as local date-times in `tz`.
    ///
    /// Returns `None` when either boundary is not a recognised date-time.
    #[must_use]
    pub fn parse(start: &str, end: &str, tz: Tz) -> Option<Self> {
        let start = localize(tz, parse_local_datetime(start)?)?;
        let end = localize(tz, parse_local_datetime(end)?)?;
        Some(Self { start, end })
    }

    /// Whether `now` falls inside the window, boundaries included.
    ///
    /// A reversed window (end before start) contains nothing.
    #[must_use]
    pub fn contains(&self, now: DateTime<Utc>) -> bool {
        let now = now.with_timezone(&self.start.timezone());
        !(now < self.start || now > self.end)
    }
}

/// Resolves an IANA identifier, falling back to UTC when it is unknown.
///
/// Identifiers match case-insensitively, so `europe/amsterdam` resolves too.
#[must_use]
pub fn resolve_timezone(name: &str) -> Tz {
    let name = name.trim();
    name.parse::<Tz>()
        .or_else(|_| Tz::from_str_insensitive(name))
        .unwrap_or_else(|_| {
            debug!("Unknown timezone '{}', using {}", name, FALLBACK_TIMEZONE);
            FALLBACK_TIMEZONE
        })
}

/// Parses a stored window boundary such as `2024-11-29 18:00` or `2024-11-29T18:00`.
#[must_use]
pub fn parse_local_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    LOCAL_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Pins a local date-time to an instant in `tz`.
///
/// Ambiguous times (clocks going back) take the earlier instant. Times that
/// don't exist (clocks going forward) move one hour later.
fn localize(tz: Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&local).earliest().or_else(|| {
        tz.from_local_datetime(&(local + TimeDelta::hours(1)))
            .earliest()
    })
}

/// Runs the gate.
///
/// The checks short-circuit in a fixed order: bypass, master switch, time
/// window, administrator. Only a request that survives all of them is blocked.
#[must_use]
pub fn decide(
    request: &GateRequest,
    caller: CallerRole,
    settings: &MaintenanceSettings,
    now: DateTime<Utc>,
) -> GateDecision {
    if request.bypass_requested {
        return GateDecision::Allow(AllowReason::Bypass);
    }

    if !settings.enabled {
        return GateDecision::Allow(AllowReason::Disabled);
    }

    let tz = resolve_timezone(&settings.timezone);

    if settings.time_check_enabled {
        let Some(window) = MaintenanceWindow::parse(&settings.window_start, &settings.window_end, tz)
        else {
            warn!(
                start = %settings.window_start,
                end = %settings.window_end,
                "Maintenance window is not a valid date-time range, letting request through"
            );
            return GateDecision::Allow(AllowReason::UnparseableWindow);
        };

        if !window.contains(now) {
            return GateDecision::Allow(AllowReason::OutsideWindow);
        }
    }

    if caller.is_administrator() {
        return GateDecision::Allow(AllowReason::Administrator);
    }

    GateDecision::Block(BlockResponse::maintenance(&settings.message))
}
