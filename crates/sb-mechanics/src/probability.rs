//! Hit probability.

use sb_core::Agent;

/// Dodge can never reach certainty while a debuff is active.
pub const MAX_DEBUFFED_DODGE: f64 = 0.92;

/// Clamp a value into `[lo, hi]`. `lo` must not exceed `hi`.
pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.clamp(lo, hi)
}

/// Accuracy multiplier from the spite meter.
///
/// `spite_min_multiplier + spite_meter * spite_max_bonus`, which is 1.0 for
/// agents carrying the default spite fields.
pub fn spite_multiplier(agent: &Agent) -> f64 {
    agent.spite_min_multiplier + agent.spite_meter * agent.spite_max_bonus
}

/// Dodge before transient modifiers, including the abstention bonus.
pub fn effective_dodge(agent: &Agent) -> f64 {
    if agent.holding_beer {
        clamp(agent.dodge + agent.beer_dodge_bonus, 0.0, 1.0)
    } else {
        agent.dodge
    }
}

/// A global dodge reduction applied while area mode is active.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DodgeDebuff {
    /// Area mode intensity.
    pub intensity: f64,
    /// Dodge lost per unit of intensity.
    pub rate: f64,
}

impl DodgeDebuff {
    /// Total dodge subtracted.
    pub fn amount(&self) -> f64 {
        self.rate * self.intensity
    }
}

/// Probability that `thrower`'s throw lands on `target`.
///
/// `clamp(accuracy_eff * (1 - dodge_eff))`, where accuracy picks up the
/// transient modifier and the spite multiplier, and dodge picks up the
/// abstention bonus and the transient modifier. A debuff subtracts from dodge
/// and clamps it to [0, [`MAX_DEBUFFED_DODGE`]].
pub fn compute_hit_probability(
    thrower: &Agent,
    target: &Agent,
    debuff: Option<DodgeDebuff>,
) -> f64 {
    let accuracy = thrower.accuracy * thrower.accuracy_mod * spite_multiplier(thrower);

    let mut dodge = effective_dodge(target) * target.dodge_mod;
    if let Some(debuff) = debuff {
        dodge = clamp(dodge - debuff.amount(), 0.0, MAX_DEBUFFED_DODGE);
    }

    clamp(accuracy * (1.0 - dodge), 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn base_probability() {
        let thrower = Agent::new("A").with_accuracy(0.8);
        let target = Agent::new("B").with_dodge(0.25);
        assert!(close(compute_hit_probability(&thrower, &target, None), 0.6));
    }

    #[test]
    fn spite_scales_accuracy() {
        let mut thrower = Agent::new("Ace").with_accuracy(0.5);
        thrower.spite_meter = 0.5;
        thrower.spite_max_bonus = 0.4;
        assert!(close(spite_multiplier(&thrower), 1.2));
        let target = Agent::new("B").with_dodge(0.0);
        assert!(close(compute_hit_probability(&thrower, &target, None), 0.6));
    }

    #[test]
    fn beer_bonus_only_while_holding() {
        let mut k = Agent::new("Kryssie").with_dodge(0.3);
        k.beer_dodge_bonus = 0.2;
        assert!(close(effective_dodge(&k), 0.3));
        k.holding_beer = true;
        assert!(close(effective_dodge(&k), 0.5));
        k.beer_dodge_bonus = 0.9;
        assert!(close(effective_dodge(&k), 1.0));
    }

    #[test]
    fn transient_modifiers_compose() {
        let mut thrower = Agent::new("A").with_accuracy(0.1);
        thrower.accuracy_mod = 5.0;
        let mut target = Agent::new("B").with_dodge(0.2);
        target.dodge_mod = 2.0;
        assert!(close(compute_hit_probability(&thrower, &target, None), 0.3));
    }

    #[test]
    fn debuff_caps_dodge() {
        let thrower = Agent::new("A").with_accuracy(1.0);
        let mut target = Agent::new("B").with_dodge(1.0);
        let debuff = DodgeDebuff {
            intensity: 1.0,
            rate: 0.06,
        };
        // 1.0 - 0.06 = 0.94 is capped to 0.92
        assert!(close(
            compute_hit_probability(&thrower, &target, Some(debuff)),
            0.08
        ));
        target.dodge = 0.04;
        assert!(close(
            compute_hit_probability(&thrower, &target, Some(debuff)),
            1.0
        ));
    }

    #[test]
    fn probability_clamps_above_one() {
        let mut thrower = Agent::new("A").with_accuracy(0.9);
        thrower.accuracy_mod = 10.0;
        let target = Agent::new("B").with_dodge(0.0);
        assert!(close(compute_hit_probability(&thrower, &target, None), 1.0));
    }

    proptest! {
        #[test]
        fn probability_is_always_a_probability(
            accuracy in 0.0f64..=1.0,
            dodge in 0.0f64..=1.0,
            acc_mod in 0.0f64..10.0,
            dodge_mod in 0.0f64..10.0,
            meter in 0.0f64..2.0,
            debuffed in any::<bool>(),
        ) {
            let mut thrower = Agent::new("A").with_accuracy(accuracy);
            thrower.accuracy_mod = acc_mod;
            thrower.spite_meter = meter;
            thrower.spite_max_bonus = 0.5;
            let mut target = Agent::new("B").with_dodge(dodge);
            target.dodge_mod = dodge_mod;
            let debuff = debuffed.then_some(DodgeDebuff { intensity: 1.0, rate: 0.06 });
            let p = compute_hit_probability(&thrower, &target, debuff);
            prop_assert!((0.0..=1.0).contains(&p));
        }
    }
}
