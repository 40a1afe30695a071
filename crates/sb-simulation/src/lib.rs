//! Turn-based snowball simulation.
//!
//! [`Simulation`] drives a fixed number of turns over a [`sb_core::Roster`],
//! resolving one throw per turn through the escalation, synergy, and
//! probability layers and recording everything in an append-only
//! [`sb_core::Ledger`]. One seeded RNG is advanced in a fixed call order, so
//! a seed, roster, and configuration always reproduce the same ledger.
//! Audits run on demand and only ever append.

/// Post-hoc audit of anomalous events.
pub mod audit;
/// Configuration types for simulation runs.
pub mod config;
/// Mutable hook context and per-turn snapshots.
pub mod context;
/// Error types for the simulation crate.
pub mod error;
/// Meter-triggered escalation states and their fusion.
pub mod escalation;
/// Turn-0 origin events.
pub mod prologue;
/// Forced actions for deterministic test scenarios.
pub mod scenario;
/// The turn loop.
pub mod simulation;
/// Paired-agent interaction modules.
pub mod synergy;
/// Observability sinks.
pub mod telemetry;

/// Re-exports of [`audit::AuditManager`] and [`audit::AuditMode`].
pub use audit::{AuditManager, AuditMode};
/// Re-exports of the configuration types.
pub use config::{AreaModeConfig, RicochetConfig, Roles, SimConfig};
/// Re-exports of [`context::HookContext`] and [`context::TurnSnapshot`].
pub use context::{HookContext, TurnSnapshot};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of the escalation types.
pub use escalation::{EscalationConfig, EscalationManager, EscalationTrack, FusionSpec, MeterGain};
/// Re-exports of the scenario types.
pub use scenario::{Intent, ScenarioAction, ScenarioQueue};
/// Re-exports of [`simulation::Simulation`] and [`simulation::Phase`].
pub use simulation::{Phase, Simulation};
/// Re-exports of the synergy types.
pub use synergy::{Dyad, DyadKind, SynergyManager};
/// Re-exports of the telemetry types.
pub use telemetry::{TelemetrySink, TracingSink};
