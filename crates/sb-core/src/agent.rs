use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// The layer an agent currently lives in.
///
/// `Ontological` outranks every other layer: throws, ricochets, and audits
/// directed at such an agent are never resolved against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frame {
    /// Normal, targetable participant.
    #[default]
    Combat,
    /// Exempt from all throw and audit resolution.
    Ontological,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Combat => write!(f, "COMBAT"),
            Self::Ontological => write!(f, "ONTOLOGICAL"),
        }
    }
}

/// A named participant with mutable throw stats.
///
/// Deserialises from roster definitions: unknown fields are ignored and
/// missing fields take the defaults below. The transient modifiers are never
/// read from input; they are reset to 1.0 at the start of every turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Agent {
    /// Unique name within a run.
    pub name: String,
    /// Base probability of a throw being on target, in [0, 1].
    pub accuracy: f64,
    /// Base probability of avoiding a throw, in [0, 1].
    pub dodge: f64,
    /// Flavour stat carried through from roster files.
    pub chaos: f64,
    /// Throws this agent has been credited with.
    pub landed: u32,
    /// Throws this agent has absorbed.
    pub taken: u32,

    /// Free-form trait labels.
    pub traits: Vec<String>,
    /// Free-form description.
    pub description: String,

    /// Current spite meter in [0, 1].
    pub spite_meter: f64,
    /// Spite gained whenever this agent is hit.
    pub spite_gain_on_hit: f64,
    /// Spite lost at the start of every turn.
    pub spite_decay_per_turn: f64,
    /// Extra accuracy multiplier at a full meter.
    pub spite_max_bonus: f64,
    /// Accuracy multiplier at an empty meter.
    pub spite_min_multiplier: f64,

    /// Chance to discard and redraw a hit roll while throwing.
    pub paradox_chance: f64,
    /// Shared budget for rerolls and untouchable blocks.
    pub paradox_budget: u32,
    /// Whether this agent spends budget to block incoming throws.
    pub untouchable_while_budget: bool,

    /// Extra ricochet weight on top of the base 1.0.
    pub stray_magnet: f64,

    /// Whether this agent is abstaining with a drink in hand.
    pub holding_beer: bool,
    /// Current dodge bonus earned by abstaining.
    pub beer_dodge_bonus: f64,
    /// Dodge bonus gained per sip.
    pub beer_dodge_bonus_step: f64,
    /// Ceiling for the abstention dodge bonus.
    pub beer_dodge_bonus_cap: f64,

    /// Transient accuracy multiplier, reset every turn.
    #[serde(skip)]
    pub accuracy_mod: f64,
    /// Transient dodge multiplier, reset every turn.
    #[serde(skip)]
    pub dodge_mod: f64,

    /// The layer this agent currently lives in.
    pub frame: Frame,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            name: String::new(),
            accuracy: 0.55,
            dodge: 0.25,
            chaos: 0.0,
            landed: 0,
            taken: 0,
            traits: Vec::new(),
            description: String::new(),
            spite_meter: 0.0,
            spite_gain_on_hit: 0.0,
            spite_decay_per_turn: 0.0,
            spite_max_bonus: 0.0,
            spite_min_multiplier: 1.0,
            paradox_chance: 0.0,
            paradox_budget: 0,
            untouchable_while_budget: false,
            stray_magnet: 0.0,
            holding_beer: false,
            beer_dodge_bonus: 0.0,
            beer_dodge_bonus_step: 0.0,
            beer_dodge_bonus_cap: 0.0,
            accuracy_mod: 1.0,
            dodge_mod: 1.0,
            frame: Frame::Combat,
        }
    }
}

impl Agent {
    /// Create an agent with default stats.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set base accuracy.
    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Set base dodge.
    pub fn with_dodge(mut self, dodge: f64) -> Self {
        self.dodge = dodge;
        self
    }

    /// Set the frame.
    pub fn with_frame(mut self, frame: Frame) -> Self {
        self.frame = frame;
        self
    }

    /// Parse a single agent definition from JSON and validate it.
    pub fn from_json(json: &str) -> CoreResult<Self> {
        let agent: Self = serde_json::from_str(json).map_err(|source| CoreError::Json {
            origin: "inline".to_string(),
            source,
        })?;
        agent.validate()?;
        Ok(agent)
    }

    /// Check that the definition is usable: a name and stats inside [0, 1].
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |reason: String| CoreError::InvalidAgent {
            name: self.name.clone(),
            reason,
        };
        if self.name.trim().is_empty() {
            return Err(invalid("name is empty".to_string()));
        }
        if !(0.0..=1.0).contains(&self.accuracy) {
            return Err(invalid(format!("accuracy {} outside [0, 1]", self.accuracy)));
        }
        if !(0.0..=1.0).contains(&self.dodge) {
            return Err(invalid(format!("dodge {} outside [0, 1]", self.dodge)));
        }
        Ok(())
    }

    /// Reset the transient modifiers to their 1.0 baseline.
    pub fn reset_transient(&mut self) {
        self.accuracy_mod = 1.0;
        self.dodge_mod = 1.0;
    }

    /// True while this agent is exempt from throw and audit resolution.
    pub fn is_ontological(&self) -> bool {
        self.frame == Frame::Ontological
    }

    /// True if this agent carries a spite meter worth reporting.
    pub fn has_spite(&self) -> bool {
        self.spite_gain_on_hit > 0.0 || self.spite_max_bonus > 0.0
    }

    /// True if this agent can reroll its own hit rolls.
    pub fn has_paradox(&self) -> bool {
        self.paradox_chance > 0.0
    }

    /// True if this agent takes part in the abstention mechanic.
    pub fn has_beer_mode(&self) -> bool {
        self.holding_beer || self.beer_dodge_bonus_step > 0.0
    }
}
