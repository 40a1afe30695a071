use sb_core::{Event, Outcome};

use crate::context::HookContext;
use crate::synergy::Dyad;

const JANUS: &str = "Janus";
const QUINN: &str = "Quinn";
const LOCK_TURNS: u32 = 5;
const LOCK_ACCURACY: f64 = 1.20;
const RENEWAL_BUDGET: u32 = 2;
const CHARGE_EVERY: u32 = 3;
const TAG: &str = "dyad:signal-weavers";

/// Janus and Quinn.
///
/// When Janus runs out of paradox budget, Quinn locks onto the pattern and
/// throws sharper until the lock fades or Janus lands a hit to renew the
/// cycle. Outside a lock, every third hit Quinn lands feeds Janus one unit
/// of budget.
#[derive(Debug, Default)]
pub struct SignalWeavers {
    lock_turns_left: u32,
    quinn_hits: u32,
}

impl SignalWeavers {
    /// Whether the pattern lock is held.
    pub fn is_locked(&self) -> bool {
        self.lock_turns_left > 0
    }
}

fn event(
    turn: u32,
    thrower: &str,
    intended: &str,
    label: &str,
    actual: &str,
    note: String,
) -> Event {
    Event::new(turn, thrower, intended, Outcome::Synergy(label.into()), actual)
        .with_note(note)
        .with_tag(TAG)
}

impl Dyad for SignalWeavers {
    fn name(&self) -> &str {
        "signal_weavers"
    }

    fn requirements(&self) -> &[&str] {
        &[JANUS, QUINN]
    }

    fn on_turn_start(&mut self, ctx: &mut HookContext<'_>) -> Vec<Event> {
        let mut events = Vec::new();
        if self.is_locked() {
            self.lock_turns_left -= 1;
            if self.lock_turns_left == 0 {
                events.push(event(
                    ctx.turn,
                    QUINN,
                    JANUS,
                    "LOCK_FADE",
                    "Pattern",
                    "The pattern lock dissolves.".into(),
                ));
            }
        } else {
            let exhausted = ctx.roster.get(JANUS).is_some_and(|a| a.paradox_budget == 0);
            if exhausted {
                self.lock_turns_left = LOCK_TURNS;
                tracing::debug!(turn = ctx.turn, "pattern lock engaged");
                events.push(event(
                    ctx.turn,
                    QUINN,
                    JANUS,
                    "PATTERN_LOCK",
                    "Pattern",
                    format!("{JANUS} is out of paradox. {QUINN} locks onto the pattern."),
                ));
            }
        }

        let locked = self.is_locked();
        if let Some(quinn) = ctx.roster.get_mut(QUINN).filter(|_| locked) {
            quinn.accuracy_mod *= LOCK_ACCURACY;
        }
        events
    }

    fn on_hit(&mut self, ctx: &mut HookContext<'_>, thrower: &str, _target: &str) -> Vec<Event> {
        if self.is_locked() && thrower == JANUS {
            self.lock_turns_left = 0;
            let budget = ctx.roster.get_mut(JANUS).map(|janus| {
                janus.paradox_budget += RENEWAL_BUDGET;
                janus.paradox_budget
            });
            return vec![event(
                ctx.turn,
                JANUS,
                QUINN,
                "CYCLE_RENEWAL",
                "Paradox",
                format!(
                    "{JANUS} breaks the lock. Paradox budget renewed to {}.",
                    budget.unwrap_or(0)
                ),
            )];
        }

        if !self.is_locked() && thrower == QUINN {
            self.quinn_hits += 1;
            if self.quinn_hits % CHARGE_EVERY == 0 {
                let budget = ctx.roster.get_mut(JANUS).map(|janus| {
                    janus.paradox_budget += 1;
                    janus.paradox_budget
                });
                return vec![event(
                    ctx.turn,
                    QUINN,
                    JANUS,
                    "PARADOX_CHARGE",
                    "Paradox",
                    format!(
                        "{QUINN}'s signal charges {JANUS} (budget {}).",
                        budget.unwrap_or(0)
                    ),
                )];
            }
        }
        Vec::new()
    }
}
