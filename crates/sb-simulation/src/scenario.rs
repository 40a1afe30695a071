//! Forced actions, keyed by turn, for driving a run into known states.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

/// Actor name meaning "let the engine pick".
pub const ANY_ACTOR: &str = "Any";

/// What a forced action makes happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// Release the actor's escalation state immediately.
    #[serde(alias = "BANKAI_RELEASE")]
    ForceEscalation,
    /// Force the miss branch and a ricochet, optionally onto `target`.
    #[serde(alias = "FORCE_RICOCHET_ON_ONTOLOGICAL")]
    ForceRicochet,
    /// Run an audit before the throw.
    #[serde(alias = "MEGA_AUDIT")]
    Audit,
    /// Move the actor into the ontological frame.
    #[serde(alias = "BEER_SIP")]
    EnterOntological,
}

/// One forced action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioAction {
    /// Turn the action fires on.
    pub turn: u32,
    /// Acting agent, or [`ANY_ACTOR`].
    pub actor: String,
    /// What happens.
    pub intent: Intent,
    /// Optional target override.
    #[serde(default)]
    pub target: Option<String>,
}

impl ScenarioAction {
    /// Create an action with no target override.
    pub fn new(turn: u32, actor: impl Into<String>, intent: Intent) -> Self {
        Self {
            turn,
            actor: actor.into(),
            intent,
            target: None,
        }
    }

    /// Set the target override.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// True if the engine should pick the actor.
    pub fn is_any_actor(&self) -> bool {
        self.actor == ANY_ACTOR
    }
}

/// An ordered list of forced actions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioQueue {
    /// Scenario name, for the ledger header.
    #[serde(default)]
    pub name: String,
    /// Actions in declaration order.
    #[serde(default)]
    pub actions: Vec<ScenarioAction>,
}

impl ScenarioQueue {
    /// Names accepted by [`ScenarioQueue::builtin`].
    pub const BUILTIN_NAMES: [&'static str; 2] = ["ricochet_audit", "hierarchy_test"];

    /// An empty named scenario.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    /// Load a built-in scenario.
    ///
    /// - `ricochet_audit`: escalation, a forced ricochet, an audit of it,
    ///   then the beer holder steps out of combat.
    /// - `hierarchy_test`: the beer holder steps out first, a ricochet is
    ///   forced onto it, and the audit is vetoed.
    pub fn builtin(name: &str) -> SimResult<Self> {
        let mut queue = Self::new(name);
        match name {
            "ricochet_audit" => {
                queue.push(ScenarioAction::new(1, "Ace", Intent::ForceEscalation));
                queue.push(ScenarioAction::new(2, ANY_ACTOR, Intent::ForceRicochet));
                queue.push(ScenarioAction::new(3, "Mega", Intent::Audit));
                queue.push(ScenarioAction::new(4, "Kryssie", Intent::EnterOntological));
            }
            "hierarchy_test" => {
                queue.push(ScenarioAction::new(1, "Kryssie", Intent::EnterOntological));
                queue.push(
                    ScenarioAction::new(2, "Ace", Intent::ForceRicochet).with_target("Kryssie"),
                );
                queue.push(ScenarioAction::new(3, "Mega", Intent::Audit));
            }
            other => return Err(SimError::UnknownScenario(other.to_string())),
        }
        Ok(queue)
    }

    /// Parse a scenario document: `{"name": ..., "actions": [...]}` or a
    /// bare array of actions.
    pub fn from_json(json: &str) -> SimResult<Self> {
        if json.trim_start().starts_with('[') {
            let actions = serde_json::from_str(json).map_err(SimError::Scenario)?;
            return Ok(Self {
                name: "custom".into(),
                actions,
            });
        }
        serde_json::from_str(json).map_err(SimError::Scenario)
    }

    /// Append an action.
    pub fn push(&mut self, action: ScenarioAction) {
        self.actions.push(action);
    }

    /// Actions firing on `turn`, in declaration order.
    pub fn actions_for_turn(&self, turn: u32) -> impl Iterator<Item = &ScenarioAction> {
        self.actions.iter().filter(move |a| a.turn == turn)
    }

    /// Number of queued actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// True if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}
