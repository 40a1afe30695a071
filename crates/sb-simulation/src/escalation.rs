//! Escalation states: meter-triggered, time-limited multiplier bonuses.
//!
//! Each track belongs to one agent and cycles `dormant -> active -> dormant`
//! when its meter reaches 1.0. A fusion state activates while both of its
//! parent tracks are active at once, multiplies everyone's modifiers, and
//! never outlives either parent.

use sb_core::{Event, Outcome};
use serde::{Deserialize, Serialize};

use crate::context::HookContext;

/// What fills a track's meter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeterGain {
    /// The owner landed a direct hit.
    OnLand(f64),
    /// The owner took a direct hit.
    OnTaken(f64),
}

/// Static definition of one escalation track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EscalationTrack {
    /// The agent this track belongs to.
    pub owner: String,
    /// Name of the escalated state, recorded as the event's actual target.
    pub title: String,
    /// Note on activation.
    pub announcement: String,
    /// Note on fade.
    pub fade_note: String,
    /// How the meter fills.
    pub gain: MeterGain,
    /// Turns the state stays active.
    pub duration: u32,
    /// Multiplier on the owner's accuracy modifier while active.
    #[serde(default = "one")]
    pub accuracy_factor: f64,
    /// Multiplier on the owner's dodge modifier while active.
    #[serde(default = "one")]
    pub dodge_factor: f64,
    /// Tags added to activation events.
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Static definition of the fusion state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FusionSpec {
    /// Name recorded as the thrower of fusion events.
    pub name: String,
    /// Name of the fused state.
    pub title: String,
    /// Note on activation.
    pub announcement: String,
    /// Note on fade.
    pub fade_note: String,
    /// Owners of the two parent tracks.
    pub parents: [String; 2],
    /// Turns the fusion stays active; both parents are capped to this.
    pub duration: u32,
    /// Multiplier on every agent's accuracy modifier while active.
    #[serde(default = "one")]
    pub accuracy_factor: f64,
    /// Multiplier on every agent's dodge modifier while active.
    #[serde(default = "one")]
    pub dodge_factor: f64,
    /// Tags added to activation events.
    #[serde(default)]
    pub tags: Vec<String>,
}

fn one() -> f64 {
    1.0
}

/// Tracks and fusion for a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EscalationConfig {
    /// Per-agent tracks, evaluated in this order.
    pub tracks: Vec<EscalationTrack>,
    /// Optional fusion of two tracks.
    pub fusion: Option<FusionSpec>,
}

impl Default for EscalationConfig {
    fn default() -> Self {
        Self {
            tracks: vec![
                EscalationTrack {
                    owner: "Ace".into(),
                    title: "Strategic Deployment".into(),
                    announcement: "Strategy matrix locked. The future is deployed.".into(),
                    fade_note: "Strategy matrix cooling down.".into(),
                    gain: MeterGain::OnLand(0.15),
                    duration: 4,
                    accuracy_factor: 5.0,
                    dodge_factor: 1.0,
                    tags: vec!["ritual:escalation".into(), "ace:strategy_deployment".into()],
                },
                EscalationTrack {
                    owner: "Mega".into(),
                    title: "Living Thought Engine".into(),
                    announcement: "Canon lock engaged. Anomalies will be normalized.".into(),
                    fade_note: "Audit complete. Resuming standard protocols.".into(),
                    gain: MeterGain::OnTaken(0.20),
                    duration: 4,
                    accuracy_factor: 1.0,
                    dodge_factor: 5.0,
                    tags: vec!["ritual:escalation".into(), "mega:audit_engine".into()],
                },
            ],
            fusion: Some(FusionSpec {
                name: "Omni-Forge".into(),
                title: "The Architect of Reason".into(),
                announcement: "Resonance critical. The vision and the blueprint are one.".into(),
                fade_note: "The forge cools. Two minds again.".into(),
                parents: ["Ace".into(), "Mega".into()],
                duration: 3,
                accuracy_factor: 2.0,
                dodge_factor: 2.0,
                tags: vec!["ritual:fusion".into(), "dyad:architect-rivals".into()],
            }),
        }
    }
}

#[derive(Debug, Clone)]
struct TrackState {
    spec: EscalationTrack,
    meter: f64,
    active: bool,
    remaining: u32,
}

#[derive(Debug, Clone)]
struct FusionState {
    spec: FusionSpec,
    active: bool,
    remaining: u32,
}

/// Runs the escalation state machine for every configured track.
#[derive(Debug, Clone)]
pub struct EscalationManager {
    tracks: Vec<TrackState>,
    fusion: Option<FusionState>,
}

impl EscalationManager {
    /// Create a manager with every meter at zero and nothing active.
    pub fn new(config: &EscalationConfig) -> Self {
        let tracks = config
            .tracks
            .iter()
            .map(|spec| TrackState {
                spec: spec.clone(),
                meter: 0.0,
                active: false,
                remaining: 0,
            })
            .collect();
        let fusion = config.fusion.as_ref().map(|spec| FusionState {
            spec: spec.clone(),
            active: false,
            remaining: 0,
        });
        Self { tracks, fusion }
    }

    /// Turn-start hook: countdowns and fades, then triggers, then the fusion
    /// check, then passive multipliers.
    pub fn on_turn_start(&mut self, ctx: &mut HookContext<'_>) -> Vec<Event> {
        let mut events = Vec::new();

        for track in self.tracks.iter_mut().filter(|t| t.active) {
            track.remaining = track.remaining.saturating_sub(1);
            if track.remaining == 0 {
                track.active = false;
                events.push(fade_event(ctx.turn, &track.spec));
            }
        }
        self.fade_fusion_if_done(ctx.turn, &mut events);

        for idx in 0..self.tracks.len() {
            let track = &self.tracks[idx];
            if !track.active && track.meter >= 1.0 && ctx.roster.contains(&track.spec.owner) {
                events.push(self.activate(idx, ctx.turn));
            }
        }
        if let Some(event) = self.try_fuse(ctx.turn) {
            events.push(event);
        }

        self.apply_passives(ctx);
        events
    }

    /// Hit hook: fill meters for the thrower's and target's tracks.
    pub fn on_hit(&mut self, thrower: &str, target: &str) {
        let gains: Vec<(String, f64)> = self
            .tracks
            .iter()
            .filter_map(|track| {
                let delta = match track.spec.gain {
                    MeterGain::OnLand(delta) if track.spec.owner == thrower => delta,
                    MeterGain::OnTaken(delta) if track.spec.owner == target => delta,
                    _ => return None,
                };
                Some((track.spec.owner.clone(), delta))
            })
            .collect();
        for (owner, delta) in gains {
            self.add_meter(&owner, delta);
        }
    }

    /// Activate `owner`'s track immediately, mid-turn.
    ///
    /// Used by scenarios. The passive multiplier is applied for the current
    /// turn as well; the fusion check runs too. An unknown owner, an owner
    /// missing from the roster, or an already active track is a no-op.
    pub fn force_release(&mut self, ctx: &mut HookContext<'_>, owner: &str) -> Vec<Event> {
        let Some(idx) = self.tracks.iter().position(|t| t.spec.owner == owner) else {
            tracing::debug!(owner, "no escalation track to force");
            return Vec::new();
        };
        if self.tracks[idx].active || !ctx.roster.contains(owner) {
            return Vec::new();
        }

        let mut events = vec![self.activate(idx, ctx.turn)];
        let spec = &self.tracks[idx].spec;
        if let Some(agent) = ctx.roster.get_mut(&spec.owner) {
            agent.accuracy_mod *= spec.accuracy_factor;
            agent.dodge_mod *= spec.dodge_factor;
        }
        if let Some(event) = self.try_fuse(ctx.turn) {
            events.push(event);
            if let Some(fusion) = &self.fusion {
                for agent in ctx.roster.iter_mut() {
                    agent.accuracy_mod *= fusion.spec.accuracy_factor;
                    agent.dodge_mod *= fusion.spec.dodge_factor;
                }
            }
        }
        events
    }

    /// Current meter for `owner`, or 0.0 if untracked.
    pub fn meter(&self, owner: &str) -> f64 {
        self.track(owner).map_or(0.0, |t| t.meter)
    }

    /// Add to `owner`'s meter. Untracked owners are ignored.
    pub fn add_meter(&mut self, owner: &str, delta: f64) {
        if let Some(track) = self.tracks.iter_mut().find(|t| t.spec.owner == owner) {
            track.meter += delta;
        }
    }

    /// Whether `owner`'s track is active.
    pub fn is_active(&self, owner: &str) -> bool {
        self.track(owner).is_some_and(|t| t.active)
    }

    /// Active turns left for `owner`'s track.
    pub fn remaining(&self, owner: &str) -> u32 {
        self.track(owner).map_or(0, |t| t.remaining)
    }

    /// Whether the fusion state is active.
    pub fn is_fusion_active(&self) -> bool {
        self.fusion.as_ref().is_some_and(|f| f.active)
    }

    /// Active turns left for the fusion state.
    pub fn fusion_remaining(&self) -> u32 {
        self.fusion.as_ref().map_or(0, |f| f.remaining)
    }

    /// Owners of all configured tracks, in evaluation order.
    pub fn owners(&self) -> impl Iterator<Item = &str> {
        self.tracks.iter().map(|t| t.spec.owner.as_str())
    }

    fn track(&self, owner: &str) -> Option<&TrackState> {
        self.tracks.iter().find(|t| t.spec.owner == owner)
    }

    fn activate(&mut self, idx: usize, turn: u32) -> Event {
        let track = &mut self.tracks[idx];
        track.meter = 0.0;
        track.active = true;
        track.remaining = track.spec.duration;
        tracing::info!(
            turn,
            owner = %track.spec.owner,
            title = %track.spec.title,
            "escalation released"
        );

        Event::new(
            turn,
            track.spec.owner.clone(),
            "Reality",
            Outcome::EscalationRelease,
            track.spec.title.clone(),
        )
        .with_note(track.spec.announcement.clone())
        .with_rolls(0.0, 0.0, 1.0)
        .with_tags(track.spec.tags.iter().cloned())
        .with_context("escalation_duration", track.spec.duration)
    }

    fn try_fuse(&mut self, turn: u32) -> Option<Event> {
        let fusion = self.fusion.as_mut()?;
        if fusion.active {
            return None;
        }
        let mut parents = Vec::with_capacity(2);
        for parent in &fusion.spec.parents {
            let idx = self
                .tracks
                .iter()
                .position(|t| t.spec.owner == *parent && t.active)?;
            parents.push(idx);
        }

        for &idx in &parents {
            let track = &mut self.tracks[idx];
            track.remaining = track.remaining.min(fusion.spec.duration);
        }
        let shortest = parents
            .iter()
            .map(|&idx| self.tracks[idx].remaining)
            .min()
            .unwrap_or(0);
        fusion.active = true;
        fusion.remaining = fusion.spec.duration.min(shortest);
        tracing::info!(turn, name = %fusion.spec.name, "fusion released");

        Some(
            Event::new(
                turn,
                fusion.spec.name.clone(),
                "Reality",
                Outcome::FusionRelease,
                fusion.spec.title.clone(),
            )
            .with_note(fusion.spec.announcement.clone())
            .with_rolls(0.0, 0.0, 1.0)
            .with_tags(fusion.spec.tags.iter().cloned())
            .with_context("fusion_duration", fusion.remaining),
        )
    }

    fn fade_fusion_if_done(&mut self, turn: u32, events: &mut Vec<Event>) {
        let Some(fusion) = self.fusion.as_mut() else {
            return;
        };
        if !fusion.active {
            return;
        }
        fusion.remaining = fusion.remaining.saturating_sub(1);
        let parent_gone = fusion.spec.parents.iter().any(|p| {
            !self
                .tracks
                .iter()
                .any(|t| t.spec.owner == *p && t.active)
        });
        if fusion.remaining == 0 || parent_gone {
            fusion.active = false;
            fusion.remaining = 0;
            events.push(
                Event::new(
                    turn,
                    fusion.spec.name.clone(),
                    "Reality",
                    Outcome::FusionFade,
                    fusion.spec.title.clone(),
                )
                .with_note(fusion.spec.fade_note.clone())
                .with_tag("ritual:fusion"),
            );
        }
    }

    fn apply_passives(&self, ctx: &mut HookContext<'_>) {
        for track in self.tracks.iter().filter(|t| t.active) {
            if let Some(agent) = ctx.roster.get_mut(&track.spec.owner) {
                agent.accuracy_mod *= track.spec.accuracy_factor;
                agent.dodge_mod *= track.spec.dodge_factor;
            }
        }
        if let Some(fusion) = self.fusion.as_ref().filter(|f| f.active) {
            for agent in ctx.roster.iter_mut() {
                agent.accuracy_mod *= fusion.spec.accuracy_factor;
                agent.dodge_mod *= fusion.spec.dodge_factor;
            }
        }
    }
}

fn fade_event(turn: u32, spec: &EscalationTrack) -> Event {
    Event::new(
        turn,
        spec.owner.clone(),
        "Reality",
        Outcome::EscalationFade,
        spec.title.clone(),
    )
    .with_note(spec.fade_note.clone())
    .with_tag("ritual:escalation")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use sb_core::{Agent, Roster};

    fn roster() -> Roster {
        Roster::from_agents(["Ace", "Mega", "Quinn"].into_iter().map(Agent::new))
    }

    fn turn_start(mgr: &mut EscalationManager, roster: &mut Roster, turn: u32) -> Vec<Event> {
        let mut rng = StdRng::seed_from_u64(1);
        roster.reset_transient();
        let mut ctx = HookContext::new(turn, roster, &mut rng);
        mgr.on_turn_start(&mut ctx)
    }

    fn outcomes(events: &[Event]) -> Vec<Outcome> {
        events.iter().map(|e| e.outcome.clone()).collect()
    }

    #[test]
    fn meter_gain_follows_hit_roles() {
        let mut mgr = EscalationManager::new(&EscalationConfig::default());
        mgr.on_hit("Ace", "Quinn");
        mgr.on_hit("Quinn", "Mega");
        mgr.on_hit("Mega", "Ace");
        assert!((mgr.meter("Ace") - 0.15).abs() < 1e-9);
        assert!((mgr.meter("Mega") - 0.20).abs() < 1e-9);
        assert!(mgr.meter("Quinn").abs() < f64::EPSILON);
    }

    #[test]
    fn full_cycle_release_passive_fade() {
        let mut mgr = EscalationManager::new(&EscalationConfig::default());
        let mut roster = roster();
        mgr.add_meter("Ace", 1.0);

        let events = turn_start(&mut mgr, &mut roster, 1);
        assert_eq!(outcomes(&events), vec![Outcome::EscalationRelease]);
        assert_eq!(events[0].thrower, "Ace");
        assert!(mgr.meter("Ace").abs() < f64::EPSILON);
        assert!((roster.get("Ace").unwrap().accuracy_mod - 5.0).abs() < f64::EPSILON);

        for turn in 2..=4 {
            let events = turn_start(&mut mgr, &mut roster, turn);
            assert!(events.is_empty(), "turn {turn}");
            assert!((roster.get("Ace").unwrap().accuracy_mod - 5.0).abs() < f64::EPSILON);
        }

        let events = turn_start(&mut mgr, &mut roster, 5);
        assert_eq!(outcomes(&events), vec![Outcome::EscalationFade]);
        assert!(!mgr.is_active("Ace"));
        assert!((roster.get("Ace").unwrap().accuracy_mod - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn owner_missing_from_roster_never_triggers() {
        let mut mgr = EscalationManager::new(&EscalationConfig::default());
        let mut roster = Roster::from_agents([Agent::new("Quinn")]);
        mgr.add_meter("Ace", 3.0);
        assert!(turn_start(&mut mgr, &mut roster, 1).is_empty());
        assert!(!mgr.is_active("Ace"));
    }

    #[test]
    fn fusion_caps_parents_and_ends_with_them() {
        let mut mgr = EscalationManager::new(&EscalationConfig::default());
        let mut roster = roster();
        mgr.add_meter("Ace", 1.0);
        mgr.add_meter("Mega", 1.0);

        let events = turn_start(&mut mgr, &mut roster, 1);
        assert_eq!(
            outcomes(&events),
            vec![
                Outcome::EscalationRelease,
                Outcome::EscalationRelease,
                Outcome::FusionRelease
            ]
        );
        assert!(mgr.is_fusion_active());
        assert_eq!(mgr.remaining("Ace"), 3);
        assert_eq!(mgr.remaining("Mega"), 3);
        // Ace: 5 (own) * 2 (fusion); Mega dodge: 5 * 2; Quinn: fusion only
        assert!((roster.get("Ace").unwrap().accuracy_mod - 10.0).abs() < 1e-9);
        assert!((roster.get("Mega").unwrap().dodge_mod - 10.0).abs() < 1e-9);
        assert!((roster.get("Quinn").unwrap().accuracy_mod - 2.0).abs() < 1e-9);

        turn_start(&mut mgr, &mut roster, 2);
        turn_start(&mut mgr, &mut roster, 3);
        let events = turn_start(&mut mgr, &mut roster, 4);
        assert_eq!(
            outcomes(&events),
            vec![
                Outcome::EscalationFade,
                Outcome::EscalationFade,
                Outcome::FusionFade
            ]
        );
        assert!(!mgr.is_fusion_active());
        assert!((roster.get("Quinn").unwrap().accuracy_mod - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fusion_fades_when_a_parent_fades_first() {
        let mut mgr = EscalationManager::new(&EscalationConfig::default());
        let mut roster = roster();
        mgr.add_meter("Ace", 1.0);
        turn_start(&mut mgr, &mut roster, 1);
        turn_start(&mut mgr, &mut roster, 2);
        turn_start(&mut mgr, &mut roster, 3);
        // Ace is on its last turn when Mega joins; fusion is held to that
        mgr.add_meter("Mega", 1.0);
        let events = turn_start(&mut mgr, &mut roster, 4);
        assert!(events.iter().any(|e| e.outcome == Outcome::FusionRelease));
        assert_eq!(mgr.fusion_remaining(), 1);

        let events = turn_start(&mut mgr, &mut roster, 5);
        assert_eq!(
            outcomes(&events),
            vec![Outcome::EscalationFade, Outcome::FusionFade]
        );
        assert!(mgr.is_active("Mega"));
        assert!(!mgr.is_fusion_active());
    }

    #[test]
    fn force_release_applies_passive_immediately() {
        let mut mgr = EscalationManager::new(&EscalationConfig::default());
        let mut roster = roster();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ctx = HookContext::new(1, &mut roster, &mut rng);

        let events = mgr.force_release(&mut ctx, "Ace");
        assert_eq!(outcomes(&events), vec![Outcome::EscalationRelease]);
        assert!((ctx.roster.get("Ace").unwrap().accuracy_mod - 5.0).abs() < f64::EPSILON);
        assert!(mgr.force_release(&mut ctx, "Ace").is_empty());
        assert!(mgr.force_release(&mut ctx, "Nobody").is_empty());
    }

    #[test]
    fn config_round_trips_through_json() {
        let json = serde_json::to_string(&EscalationConfig::default()).unwrap();
        assert!(json.contains("\"on_land\":0.15"));
        let back: EscalationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EscalationConfig::default());
    }
}
