//! Paired-agent interaction modules ("dyads") and the manager that runs them.

pub mod dyads;

use std::fmt;
use std::str::FromStr;

use sb_core::{Event, Roster};
use serde::{Deserialize, Serialize};

use crate::context::HookContext;
use crate::error::SimError;

pub use dyads::{ChaosContainment, EnthusiasmTwins, OffensiveLine, SignalWeavers};

/// A synergy module for a fixed set of agents.
///
/// Every hook has a do-nothing default, so a dyad only implements the points
/// it reacts to. Hooks may mutate transient modifiers and counters on the
/// roster and may draw from the shared random source.
pub trait Dyad: fmt::Debug {
    /// Name for logs.
    fn name(&self) -> &str;

    /// Agents that must all be on the roster for this dyad to register.
    fn requirements(&self) -> &[&str];

    /// Called after the escalation turn-start hook.
    fn on_turn_start(&mut self, _ctx: &mut HookContext<'_>) -> Vec<Event> {
        Vec::new()
    }

    /// Observes a thrower picking a target. Produces nothing.
    fn on_target_selected(&mut self, _ctx: &mut HookContext<'_>, _thrower: &str, _target: &str) {}

    /// Called when a direct throw lands.
    fn on_hit(&mut self, _ctx: &mut HookContext<'_>, _thrower: &str, _target: &str) -> Vec<Event> {
        Vec::new()
    }

    /// Called at the end of every turn, whichever way the throw resolved.
    fn on_turn_end(&mut self, _ctx: &mut HookContext<'_>) -> Vec<Event> {
        Vec::new()
    }

    /// Offer a replacement target for the throw.
    fn intercept(
        &mut self,
        _ctx: &mut HookContext<'_>,
        _thrower: &str,
        _target: &str,
    ) -> Option<String> {
        None
    }
}

/// The built-in dyads, in a form configuration can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DyadKind {
    /// Claude and DeepScribe.
    EnthusiasmTwins,
    /// Janus and Quinn.
    SignalWeavers,
    /// Vanguard-01 and Striker-03.
    OffensiveLine,
    /// Sentinel-02 and Wildcard-04.
    ChaosContainment,
}

impl DyadKind {
    /// Every built-in dyad in the default load order.
    pub const ALL: [DyadKind; 4] = [
        DyadKind::EnthusiasmTwins,
        DyadKind::SignalWeavers,
        DyadKind::OffensiveLine,
        DyadKind::ChaosContainment,
    ];

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EnthusiasmTwins => "enthusiasm_twins",
            Self::SignalWeavers => "signal_weavers",
            Self::OffensiveLine => "offensive_line",
            Self::ChaosContainment => "chaos_containment",
        }
    }

    /// A fresh instance with its internal counters at zero.
    pub fn build(self) -> Box<dyn Dyad> {
        match self {
            Self::EnthusiasmTwins => Box::new(EnthusiasmTwins::default()),
            Self::SignalWeavers => Box::new(SignalWeavers::default()),
            Self::OffensiveLine => Box::new(OffensiveLine::default()),
            Self::ChaosContainment => Box::new(ChaosContainment::default()),
        }
    }
}

impl fmt::Display for DyadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DyadKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s.trim())
            .ok_or_else(|| SimError::UnknownDyad(s.to_string()))
    }
}

/// Runs registered dyads in registration order.
#[derive(Debug, Default)]
pub struct SynergyManager {
    dyads: Vec<Box<dyn Dyad>>,
}

impl SynergyManager {
    /// Register the built-in dyads whose agents are all on the roster.
    pub fn new(roster: &Roster, kinds: &[DyadKind]) -> Self {
        let mut manager = Self::default();
        for kind in kinds {
            let dyad = kind.build();
            if roster.contains_all(dyad.requirements()) {
                tracing::debug!(dyad = %kind, "dyad registered");
                manager.dyads.push(dyad);
            } else {
                tracing::debug!(dyad = %kind, "dyad inactive: agents missing");
            }
        }
        manager
    }

    /// Register an extra dyad behind the same requirement check.
    ///
    /// Returns whether the dyad was accepted.
    pub fn register(&mut self, roster: &Roster, dyad: Box<dyn Dyad>) -> bool {
        if !roster.contains_all(dyad.requirements()) {
            tracing::warn!(
                dyad = dyad.name(),
                requires = ?dyad.requirements(),
                "dyad rejected: required agents missing"
            );
            return false;
        }
        tracing::debug!(dyad = dyad.name(), "dyad registered");
        self.dyads.push(dyad);
        true
    }

    /// Names of the registered dyads, in order.
    pub fn names(&self) -> Vec<&str> {
        self.dyads.iter().map(|d| d.name()).collect()
    }

    /// Number of registered dyads.
    pub fn len(&self) -> usize {
        self.dyads.len()
    }

    /// True if no dyad registered.
    pub fn is_empty(&self) -> bool {
        self.dyads.is_empty()
    }

    /// Run every dyad's turn-start hook, in load order.
    pub fn on_turn_start(&mut self, ctx: &mut HookContext<'_>) -> Vec<Event> {
        self.dyads
            .iter_mut()
            .flat_map(|d| d.on_turn_start(ctx))
            .collect()
    }

    /// Tell every dyad which target was drawn.
    pub fn on_target_selected(
        &mut self,
        ctx: &mut HookContext<'_>,
        thrower: &str,
        target: &str,
    ) {
        for dyad in &mut self.dyads {
            dyad.on_target_selected(ctx, thrower, target);
        }
    }

    /// Run every dyad's hit hook after a direct hit lands.
    pub fn on_hit(
        &mut self,
        ctx: &mut HookContext<'_>,
        thrower: &str,
        target: &str,
    ) -> Vec<Event> {
        self.dyads
            .iter_mut()
            .flat_map(|d| d.on_hit(ctx, thrower, target))
            .collect()
    }

    /// Run every dyad's turn-end hook.
    pub fn on_turn_end(&mut self, ctx: &mut HookContext<'_>) -> Vec<Event> {
        self.dyads
            .iter_mut()
            .flat_map(|d| d.on_turn_end(ctx))
            .collect()
    }

    /// Poll dyads for an interception. The first answer wins and later dyads
    /// are not asked.
    pub fn intercept(
        &mut self,
        ctx: &mut HookContext<'_>,
        thrower: &str,
        target: &str,
    ) -> Option<String> {
        self.dyads
            .iter_mut()
            .find_map(|d| d.intercept(ctx, thrower, target))
    }
}
