//! Probability mechanics for the snowball simulator.
//!
//! Pure functions over agents: hit probability, target selection, weighted
//! ricochet picks with a per-agent cap, and the budget-limited reroll and
//! untouchable mechanics. Nothing here records events; callers turn the
//! returned notes into ledger entries.

pub mod budget;
pub mod decay;
pub mod probability;
pub mod targeting;

pub use budget::{Reroll, paradox_reroll, untouchable_gate};
pub use decay::apply_turn_decay;
pub use probability::{
    DodgeDebuff, MAX_DEBUFFED_DODGE, clamp, compute_hit_probability, effective_dodge,
    spite_multiplier,
};
pub use targeting::{RicochetCap, capped_weights, pick_ricochet_targets, pick_target};
