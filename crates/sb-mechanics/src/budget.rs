//! Budget-limited mechanics: hit-roll rerolls and untouchable blocks.
//!
//! Both draw on the same `paradox_budget`. An exhausted budget is never an
//! error; the mechanic simply does not trigger.

use rand::Rng;
use rand::rngs::StdRng;
use sb_core::Agent;

/// Result of offering a thrower its reroll.
#[derive(Debug, Clone, PartialEq)]
pub struct Reroll {
    /// The hit roll to use from here on.
    pub roll: f64,
    /// Whether the original roll was discarded.
    pub used: bool,
    /// Detail for the event note, if anything happened worth recording.
    pub note: Option<String>,
}

impl Reroll {
    fn kept(roll: f64, note: Option<String>) -> Self {
        Self {
            roll,
            used: false,
            note,
        }
    }
}

/// Offer `thrower` a chance to discard `roll` and redraw it.
///
/// Only throwers with a positive `paradox_chance` take part. With budget
/// left, one draw decides whether to reroll; a reroll spends one unit and
/// draws the replacement. With no budget left nothing is drawn and the note
/// records the exhaustion.
pub fn paradox_reroll(rng: &mut StdRng, thrower: &mut Agent, roll: f64) -> Reroll {
    if !thrower.has_paradox() {
        return Reroll::kept(roll, None);
    }
    if thrower.paradox_budget == 0 {
        return Reroll::kept(
            roll,
            Some(format!("{} paradox budget exhausted.", thrower.name)),
        );
    }
    if rng.random::<f64>() < thrower.paradox_chance {
        thrower.paradox_budget -= 1;
        return Reroll {
            roll: rng.random::<f64>(),
            used: true,
            note: Some(format!(
                "{} paradox reroll used (budget now {}).",
                thrower.name, thrower.paradox_budget
            )),
        };
    }
    Reroll::kept(roll, None)
}

/// Spend one unit of `target`'s budget to block an incoming throw.
///
/// Returns the note for the `UNTOUCHABLE` event when the block happens.
pub fn untouchable_gate(target: &mut Agent) -> Option<String> {
    if !target.untouchable_while_budget || target.paradox_budget == 0 {
        return None;
    }
    target.paradox_budget -= 1;
    Some(format!(
        "{} untouchable (budget now {}).",
        target.name, target.paradox_budget
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn janus(chance: f64, budget: u32) -> Agent {
        let mut a = Agent::new("Janus");
        a.paradox_chance = chance;
        a.paradox_budget = budget;
        a.untouchable_while_budget = true;
        a
    }

    #[test]
    fn non_paradox_thrower_is_untouched() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut a = Agent::new("Ace");
        let r = paradox_reroll(&mut rng, &mut a, 0.42);
        assert!(!r.used);
        assert!(r.note.is_none());
        assert!((r.roll - 0.42).abs() < f64::EPSILON);
    }

    #[test]
    fn certain_reroll_spends_budget() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut j = janus(1.0, 2);
        let r = paradox_reroll(&mut rng, &mut j, 0.42);
        assert!(r.used);
        assert_eq!(j.paradox_budget, 1);
        assert!(r.note.unwrap().contains("budget now 1"));
        assert!((0.0..1.0).contains(&r.roll));
    }

    #[test]
    fn exhausted_budget_is_a_note_without_drawing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut untouched = StdRng::seed_from_u64(1);
        let mut j = janus(1.0, 0);
        let r = paradox_reroll(&mut rng, &mut j, 0.42);
        assert!(!r.used);
        assert_eq!(r.note.as_deref(), Some("Janus paradox budget exhausted."));
        assert_eq!(rng.random::<u64>(), untouched.random::<u64>());
    }

    #[test]
    fn untouchable_consumes_one_unit_per_block() {
        let mut j = janus(0.0, 1);
        assert!(untouchable_gate(&mut j).is_some());
        assert_eq!(j.paradox_budget, 0);
        assert!(untouchable_gate(&mut j).is_none());
    }

    #[test]
    fn untouchable_requires_the_flag() {
        let mut a = Agent::new("Mega");
        a.paradox_budget = 3;
        assert!(untouchable_gate(&mut a).is_none());
        assert_eq!(a.paradox_budget, 3);
    }
}
