use serde::{Deserialize, Serialize};

use crate::audit::AuditMode;
use crate::error::{SimError, SimResult};
use crate::escalation::EscalationConfig;
use crate::synergy::DyadKind;

/// Area ("weaver") mode: a window of turns in which misses become volleys
/// and every target's dodge is debuffed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaModeConfig {
    /// Apply the dodge debuff while the mode is active.
    pub debuff_enabled: bool,
    /// Scales the debuff.
    pub intensity: f64,
    /// Turns the mode lasts once summoned.
    pub duration: u32,
    /// Dodge removed per unit of intensity.
    pub debuff_rate: f64,
    /// Fewest volley targets on a miss. Values below 1 count as 1.
    pub min_targets: usize,
    /// Most volley targets on a miss.
    pub max_targets: usize,
    /// Accuracy granted to the agent who summons the mode.
    pub summon_accuracy_bonus: f64,
}

impl Default for AreaModeConfig {
    fn default() -> Self {
        Self {
            debuff_enabled: true,
            intensity: 1.0,
            duration: 5,
            debuff_rate: 0.06,
            min_targets: 2,
            max_targets: 4,
            summon_accuracy_bonus: 0.08,
        }
    }
}

/// Single-target ricochet on a plain miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RicochetConfig {
    /// A miss ricochets when `roll_ricochet` is below this.
    pub threshold: f64,
    /// Highest selection probability the stray magnet may reach.
    pub cap_probability: f64,
}

impl Default for RicochetConfig {
    fn default() -> Self {
        Self {
            threshold: 0.25,
            cap_probability: 0.45,
        }
    }
}

/// Agents that play the named roles in a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Roles {
    /// Carries the spite meter; primed by the prologue.
    pub spite: String,
    /// Holds the paradox budget.
    pub paradox: String,
    /// The stray magnet whose ricochet share is capped.
    pub magnet: String,
    /// Starts the run holding a beer.
    pub beer: String,
    /// Signs audit events.
    pub auditor: String,
}

impl Default for Roles {
    fn default() -> Self {
        Self {
            spite: "Ace".into(),
            paradox: "Janus".into(),
            magnet: "Quinn".into(),
            beer: "Kryssie".into(),
            auditor: "Mega".into(),
        }
    }
}

/// Configuration for a simulation run.
///
/// Every field has a default, so a JSON document only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// RNG seed for deterministic runs.
    pub seed: u64,
    /// Turns to play.
    pub turns: u32,
    /// How the audit layer judges anomalies.
    pub audit_mode: AuditMode,
    /// Area mode tuning.
    pub area: AreaModeConfig,
    /// Ricochet tuning.
    pub ricochet: RicochetConfig,
    /// Role assignments.
    pub roles: Roles,
    /// Escalation tracks and fusion.
    pub escalation: EscalationConfig,
    /// Built-in dyads to load, in load order.
    pub dyads: Vec<DyadKind>,
    /// Record the turn-0 origin events before the first turn.
    pub prologue: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            turns: 20,
            audit_mode: AuditMode::default(),
            area: AreaModeConfig::default(),
            ricochet: RicochetConfig::default(),
            roles: Roles::default(),
            escalation: EscalationConfig::default(),
            dyads: DyadKind::ALL.to_vec(),
            prologue: true,
        }
    }
}

impl SimConfig {
    /// Parse a configuration document. Missing keys keep their defaults.
    pub fn from_json(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(SimError::Config)
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the number of turns to play.
    pub fn with_turns(mut self, turns: u32) -> Self {
        self.turns = turns;
        self
    }

    /// Set the audit mode.
    pub fn with_audit_mode(mut self, mode: AuditMode) -> Self {
        self.audit_mode = mode;
        self
    }

    /// Enable or disable the prologue.
    pub fn with_prologue(mut self, prologue: bool) -> Self {
        self.prologue = prologue;
        self
    }

    /// Replace the dyad load order.
    pub fn with_dyads(mut self, dyads: Vec<DyadKind>) -> Self {
        self.dyads = dyads;
        self
    }

    /// Replace the role assignments.
    pub fn with_roles(mut self, roles: Roles) -> Self {
        self.roles = roles;
        self
    }

    /// Replace the escalation configuration.
    pub fn with_escalation(mut self, escalation: EscalationConfig) -> Self {
        self.escalation = escalation;
        self
    }

    /// Replace the area mode tuning.
    pub fn with_area(mut self, area: AreaModeConfig) -> Self {
        self.area = area;
        self
    }

    /// Replace the ricochet tuning.
    pub fn with_ricochet(mut self, ricochet: RicochetConfig) -> Self {
        self.ricochet = ricochet;
        self
    }
}
