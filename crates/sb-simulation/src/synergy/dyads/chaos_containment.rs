use rand::Rng;
use sb_core::{Event, Outcome};

use crate::context::HookContext;
use crate::synergy::Dyad;

const SENTINEL: &str = "Sentinel-02";
const WILDCARD: &str = "Wildcard-04";

/// Sentinel-02 and Wildcard-04.
///
/// Half the time the wildcard lands a hit, the sentinel stabilises it: the
/// wildcard dodges 10% better on the next turn.
#[derive(Debug, Default)]
pub struct ChaosContainment {
    pending: bool,
}

impl Dyad for ChaosContainment {
    fn name(&self) -> &str {
        "chaos_containment"
    }

    fn requirements(&self) -> &[&str] {
        &[SENTINEL, WILDCARD]
    }

    fn on_turn_start(&mut self, ctx: &mut HookContext<'_>) -> Vec<Event> {
        if !std::mem::take(&mut self.pending) {
            return Vec::new();
        }
        if let Some(wildcard) = ctx.roster.get_mut(WILDCARD) {
            wildcard.dodge_mod *= 1.1;
        }
        Vec::new()
    }

    fn on_hit(&mut self, ctx: &mut HookContext<'_>, thrower: &str, _target: &str) -> Vec<Event> {
        if thrower != WILDCARD || ctx.rng.random::<f64>() >= 0.5 {
            return Vec::new();
        }
        self.pending = true;
        vec![
            Event::new(
                ctx.turn,
                SENTINEL,
                WILDCARD,
                Outcome::Synergy("CONTAINMENT_FIELD".into()),
                "Stabilized",
            )
            .with_note("Sentinel reinforces Wildcard's structure.")
            .with_tag("dyad:chaos-containment"),
        ]
    }
}
