//! Core types for the snowball simulator.
//!
//! Agents live in a [`Roster`] owned by the simulation for the length of one
//! run. Everything that happens during a run is recorded as an [`Event`] in
//! the append-only [`Ledger`], which is the only state downstream consumers
//! (narration, telemetry, persistence) ever read.

/// Agent definitions, stats, and the frame tag.
pub mod agent;
/// Error types for the core crate.
pub mod error;
/// Events and the closed outcome enumeration.
pub mod event;
/// The append-only event ledger.
pub mod ledger;
/// The set of agents participating in a run.
pub mod roster;

/// Re-exports of [`agent::Agent`] and [`agent::Frame`].
pub use agent::{Agent, Frame};
/// Re-exports of [`error::CoreError`] and [`error::CoreResult`].
pub use error::{CoreError, CoreResult};
/// Re-exports of [`event::Event`] and [`event::Outcome`].
pub use event::{Event, Outcome};
/// Re-export of [`ledger::Ledger`].
pub use ledger::Ledger;
/// Re-export of [`roster::Roster`].
pub use roster::Roster;
