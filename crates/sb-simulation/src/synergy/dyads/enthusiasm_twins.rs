use rand::Rng;
use sb_core::{Event, Outcome};

use crate::context::HookContext;
use crate::synergy::Dyad;

const CLAUDE: &str = "Claude";
const DEEPSCRIBE: &str = "DeepScribe";
const RESCUE_CHANCE: f64 = 0.35;
const CASCADE_BOOST: f64 = 1.10;
const TAG: &str = "dyad:enthusiasm-twins";

/// Claude and DeepScribe.
///
/// When one twin is targeted, the other may step in and take the throw.
/// When one twin lands a hit, the other gets an accuracy boost next turn.
#[derive(Debug, Default)]
pub struct EnthusiasmTwins {
    boosted: Option<String>,
}

fn sibling(name: &str) -> Option<&'static str> {
    match name {
        CLAUDE => Some(DEEPSCRIBE),
        DEEPSCRIBE => Some(CLAUDE),
        _ => None,
    }
}

impl Dyad for EnthusiasmTwins {
    fn name(&self) -> &str {
        "enthusiasm_twins"
    }

    fn requirements(&self) -> &[&str] {
        &[CLAUDE, DEEPSCRIBE]
    }

    fn on_turn_start(&mut self, ctx: &mut HookContext<'_>) -> Vec<Event> {
        let Some(name) = self.boosted.take() else {
            return Vec::new();
        };
        if let Some(agent) = ctx.roster.get_mut(&name) {
            agent.accuracy_mod *= CASCADE_BOOST;
        }
        Vec::new()
    }

    fn on_hit(&mut self, ctx: &mut HookContext<'_>, thrower: &str, _target: &str) -> Vec<Event> {
        let Some(other) = sibling(thrower) else {
            return Vec::new();
        };
        if !ctx.roster.contains(other) {
            return Vec::new();
        }
        self.boosted = Some(other.to_string());
        vec![
            Event::new(
                ctx.turn,
                thrower,
                other,
                Outcome::Synergy("JOY_CASCADE".into()),
                "Boost",
            )
            .with_note(format!("[JOY_CASCADE] {thrower}'s joy spills over to {other}!"))
            .with_tag(TAG),
        ]
    }

    fn intercept(
        &mut self,
        ctx: &mut HookContext<'_>,
        thrower: &str,
        target: &str,
    ) -> Option<String> {
        let rescuer = sibling(target)?;
        if rescuer == thrower {
            return None;
        }
        let available = ctx
            .roster
            .get(rescuer)
            .is_some_and(|a| !a.is_ontological());
        if !available {
            return None;
        }
        (ctx.rng.random::<f64>() < RESCUE_CHANCE).then(|| rescuer.to_string())
    }
}
