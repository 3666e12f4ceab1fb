//! Core logic - framework-agnostic option storage, settings and the access gate.

/// The per-request access decision
pub mod gate;
/// Raw key-value option storage
pub mod options;
/// Typed maintenance settings over the option store
pub mod settings;

pub use gate::{CallerRole, GateDecision, GateRequest, decide};
pub use settings::{MaintenanceSettings, load_settings, save_settings};
