//! Built-in dyads.

mod chaos_containment;
mod enthusiasm_twins;
mod offensive_line;
mod signal_weavers;

pub use chaos_containment::ChaosContainment;
pub use enthusiasm_twins::EnthusiasmTwins;
pub use offensive_line::OffensiveLine;
pub use signal_weavers::SignalWeavers;
