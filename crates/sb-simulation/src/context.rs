use std::collections::BTreeMap;

use rand::rngs::StdRng;
use sb_core::Roster;
use serde_json::Value;

use crate::escalation::EscalationManager;

/// Mutable context handed to escalation and synergy hooks.
///
/// Hooks see the roster and the run's single random source. Any draw they
/// make advances the same stream as the engine, in call order.
pub struct HookContext<'a> {
    /// The turn being played.
    pub turn: u32,
    /// The live roster.
    pub roster: &'a mut Roster,
    /// The run's seeded random source.
    pub rng: &'a mut StdRng,
}

impl<'a> HookContext<'a> {
    /// Create a context for `turn`.
    pub fn new(turn: u32, roster: &'a mut Roster, rng: &'a mut StdRng) -> Self {
        Self { turn, roster, rng }
    }
}

/// State captured at the start of a turn, after decay and countdowns.
///
/// Attached as context to every event the turn records and handed to the
/// telemetry sink.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TurnSnapshot {
    /// The turn this snapshot was taken at.
    pub turn: u32,
    /// Flat key-value view of the interesting state.
    pub values: BTreeMap<String, Value>,
}

impl TurnSnapshot {
    /// Capture the roster and area mode state.
    pub fn capture(turn: u32, roster: &Roster, area_turns_left: u32, area_intensity: f64) -> Self {
        let mut values = BTreeMap::new();
        values.insert("area_mode_active".into(), Value::from(area_turns_left > 0));
        values.insert("area_turns_left".into(), Value::from(area_turns_left));
        values.insert("area_intensity".into(), Value::from(area_intensity));

        for agent in roster.iter() {
            if agent.has_spite() {
                values.insert(
                    format!("spite.{}", agent.name),
                    Value::from(round2(agent.spite_meter)),
                );
            }
            if agent.has_beer_mode() {
                values.insert(format!("beer.{}", agent.name), Value::from(agent.holding_beer));
            }
            if agent.has_paradox() || agent.untouchable_while_budget {
                values.insert(
                    format!("paradox_budget.{}", agent.name),
                    Value::from(agent.paradox_budget),
                );
            }
        }
        Self { turn, values }
    }

    /// Add active turns left for every escalation track and the fusion.
    pub fn with_escalation(mut self, escalation: &EscalationManager) -> Self {
        for owner in escalation.owners() {
            self.values.insert(
                format!("escalation.{owner}"),
                Value::from(escalation.remaining(owner)),
            );
        }
        self.values.insert(
            "fusion_turns_left".into(),
            Value::from(escalation.fusion_remaining()),
        );
        self
    }

    /// Look up a captured value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
