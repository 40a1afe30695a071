//! Per-turn passive decay.

use sb_core::Roster;

use crate::probability::clamp;

/// Decay every spite meter toward zero by its per-turn step.
pub fn apply_turn_decay(roster: &mut Roster) {
    for agent in roster.iter_mut() {
        if agent.spite_decay_per_turn > 0.0 {
            agent.spite_meter = clamp(agent.spite_meter - agent.spite_decay_per_turn, 0.0, 1.0);
        }
    }
}
