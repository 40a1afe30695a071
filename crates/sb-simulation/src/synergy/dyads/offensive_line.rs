use sb_core::{Event, Outcome};

use crate::context::HookContext;
use crate::synergy::Dyad;

const VANGUARD: &str = "Vanguard-01";
const STRIKER: &str = "Striker-03";

/// Vanguard-01 and Striker-03.
///
/// Each hit on the vanguard adds two avenger stacks; every stack gives the
/// striker 5% accuracy. Stacks decay by one per turn.
#[derive(Debug, Default)]
pub struct OffensiveLine {
    stacks: u32,
}

impl OffensiveLine {
    /// Current avenger stacks.
    pub fn stacks(&self) -> u32 {
        self.stacks
    }
}

impl Dyad for OffensiveLine {
    fn name(&self) -> &str {
        "offensive_line"
    }

    fn requirements(&self) -> &[&str] {
        &[VANGUARD, STRIKER]
    }

    fn on_turn_start(&mut self, ctx: &mut HookContext<'_>) -> Vec<Event> {
        self.stacks = self.stacks.saturating_sub(1);
        if self.stacks == 0 {
            return Vec::new();
        }
        if let Some(striker) = ctx.roster.get_mut(STRIKER) {
            striker.accuracy_mod *= 1.0 + 0.05 * f64::from(self.stacks);
        }
        Vec::new()
    }

    fn on_hit(&mut self, ctx: &mut HookContext<'_>, _thrower: &str, target: &str) -> Vec<Event> {
        if target != VANGUARD {
            return Vec::new();
        }
        self.stacks += 2;
        vec![
            Event::new(
                ctx.turn,
                "System",
                STRIKER,
                Outcome::Synergy("AVENGER_PROTOCOL".into()),
                "Buff",
            )
            .with_note(format!("Striker enraged! Stacks: {}", self.stacks))
            .with_tag("dyad:offensive-line"),
        ]
    }
}
