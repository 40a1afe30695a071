use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sb_core::{Event, Frame, Ledger, Outcome, Roster};
use sb_mechanics::{
    DodgeDebuff, RicochetCap, apply_turn_decay, clamp, compute_hit_probability, paradox_reroll,
    pick_ricochet_targets, pick_target, untouchable_gate,
};

use crate::audit::AuditManager;
use crate::config::SimConfig;
use crate::context::{HookContext, TurnSnapshot};
use crate::escalation::EscalationManager;
use crate::prologue;
use crate::scenario::{Intent, ScenarioQueue};
use crate::synergy::{Dyad, SynergyManager};
use crate::telemetry::TelemetrySink;

/// Dyad effect whose note is repeated on the hit that caused it.
const ECHOED_ON_HIT: &str = "JOY_CASCADE";

/// Where a run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Built, prologue not yet recorded.
    Setup,
    /// Turns are being played.
    Running,
    /// Every turn has been played.
    Done,
}

#[derive(Debug, Clone, Default)]
struct AreaMode {
    turns_left: u32,
    beneficiary: Option<String>,
}

/// Overrides collected from the scenario for one turn.
#[derive(Debug, Default)]
struct Forced {
    actor: Option<String>,
    ricochet: bool,
    target: Option<String>,
}

/// The turn loop.
///
/// Owns the roster, the single seeded RNG, the ledger, and the escalation,
/// synergy, and audit layers. Every turn resolves exactly one throw (or one
/// abstention) and always ends with the synergy turn-end hook.
pub struct Simulation {
    config: SimConfig,
    roster: Roster,
    rng: StdRng,
    ledger: Ledger,
    escalation: EscalationManager,
    synergy: SynergyManager,
    audit: AuditManager,
    scenario: ScenarioQueue,
    telemetry: Option<Box<dyn TelemetrySink>>,
    area: AreaMode,
    snapshot: TurnSnapshot,
    turn: u32,
    phase: Phase,
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("turn", &self.turn)
            .field("phase", &self.phase)
            .field("agents", &self.roster.len())
            .field("dyads", &self.synergy.names())
            .field("events", &self.ledger.len())
            .finish()
    }
}

impl Simulation {
    /// Create a simulation over `roster`.
    ///
    /// Dyads named in the configuration register now, each only if its
    /// agents are all present.
    pub fn new(roster: Roster, config: SimConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        let escalation = EscalationManager::new(&config.escalation);
        let synergy = SynergyManager::new(&roster, &config.dyads);
        let audit =
            AuditManager::new(config.audit_mode).with_auditor(config.roles.auditor.clone());
        Self {
            config,
            roster,
            rng,
            ledger: Ledger::new(),
            escalation,
            synergy,
            audit,
            scenario: ScenarioQueue::default(),
            telemetry: None,
            area: AreaMode::default(),
            snapshot: TurnSnapshot::default(),
            turn: 0,
            phase: Phase::Setup,
        }
    }

    /// Attach forced actions.
    pub fn with_scenario(mut self, scenario: ScenarioQueue) -> Self {
        self.scenario = scenario;
        self
    }

    /// Attach a telemetry sink.
    pub fn with_telemetry(mut self, sink: impl TelemetrySink + 'static) -> Self {
        self.telemetry = Some(Box::new(sink));
        self
    }

    /// Register an extra dyad. Returns whether its agents were all present.
    pub fn register_dyad(&mut self, dyad: Box<dyn Dyad>) -> bool {
        self.synergy.register(&self.roster, dyad)
    }

    /// Play the next turn. Returns false once the run is done.
    pub fn step(&mut self) -> bool {
        if self.phase == Phase::Setup {
            self.start();
        }
        if self.phase == Phase::Done {
            return false;
        }
        if self.turn >= self.config.turns {
            self.finish();
            return false;
        }

        self.turn += 1;
        self.play_turn();
        if self.turn >= self.config.turns {
            self.finish();
        }
        true
    }

    /// Play every remaining turn and return the ledger.
    pub fn run(&mut self) -> &Ledger {
        while self.step() {}
        &self.ledger
    }

    /// Audit the ledger now and append the result.
    ///
    /// Returns the events this call appended.
    pub fn audit(&mut self) -> &[Event] {
        let verdict = self
            .audit
            .evaluate(self.turn, self.ledger.events(), &self.roster);
        let start = self.ledger.len();
        self.record_all(verdict);
        &self.ledger.events()[start..]
    }

    /// Everything recorded so far.
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// The live roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Escalation meters and active states.
    pub fn escalation(&self) -> &EscalationManager {
        &self.escalation
    }

    /// Registered dyads.
    pub fn synergy(&self) -> &SynergyManager {
        &self.synergy
    }

    /// The configuration this run was built with.
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Forced actions attached to this run.
    pub fn scenario(&self) -> &ScenarioQueue {
        &self.scenario
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The last turn played, 0 before the first.
    pub fn turn(&self) -> u32 {
        self.turn
    }

    /// Turns of area mode left, 0 when inactive.
    pub fn area_turns_left(&self) -> u32 {
        self.area.turns_left
    }

    /// Extract the final roster and ledger, consuming the simulation.
    pub fn into_parts(self) -> (Roster, Ledger) {
        (self.roster, self.ledger)
    }

    fn start(&mut self) {
        self.phase = Phase::Running;
        if self.config.prologue {
            let events = prologue::run(&mut self.roster, &self.config.roles);
            self.record_all(events);
        }
        tracing::debug!(
            seed = self.config.seed,
            turns = self.config.turns,
            agents = self.roster.len(),
            dyads = ?self.synergy.names(),
            "simulation started"
        );
    }

    fn finish(&mut self) {
        self.phase = Phase::Done;
        if let Some(sink) = self.telemetry.as_mut() {
            sink.run_finished(&self.ledger);
        }
        tracing::info!(turns = self.turn, events = self.ledger.len(), "simulation complete");
    }

    fn record(&mut self, event: Event) {
        let event = event.with_context_map(&self.snapshot.values);
        if let Some(sink) = self.telemetry.as_mut() {
            sink.event_recorded(&event);
        }
        self.ledger.append(event);
    }

    fn record_all(&mut self, events: Vec<Event>) {
        for event in events {
            self.record(event);
        }
    }

    fn play_turn(&mut self) {
        let turn = self.turn;
        self.roster.reset_transient();
        apply_turn_decay(&mut self.roster);
        if self.area.turns_left > 0 {
            self.area.turns_left -= 1;
            if self.area.turns_left == 0 {
                self.area.beneficiary = None;
            }
        }

        self.snapshot = TurnSnapshot::capture(
            turn,
            &self.roster,
            self.area_turns_left(),
            self.config.area.intensity,
        )
        .with_escalation(&self.escalation);
        if let Some(sink) = self.telemetry.as_mut() {
            sink.turn_started(&self.snapshot);
        }
        tracing::debug!(turn, "turn started");

        let started = {
            let mut ctx = HookContext::new(turn, &mut self.roster, &mut self.rng);
            let mut events = self.escalation.on_turn_start(&mut ctx);
            events.extend(self.synergy.on_turn_start(&mut ctx));
            events
        };
        self.record_all(started);

        let forced = self.apply_scenario(turn);
        self.resolve_throw(turn, &forced);

        let ended = {
            let mut ctx = HookContext::new(turn, &mut self.roster, &mut self.rng);
            self.synergy.on_turn_end(&mut ctx)
        };
        self.record_all(ended);
    }

    fn apply_scenario(&mut self, turn: u32) -> Forced {
        let mut forced = Forced::default();
        let actions: Vec<_> = self.scenario.actions_for_turn(turn).cloned().collect();
        for action in actions {
            tracing::debug!(
                turn,
                actor = %action.actor,
                intent = ?action.intent,
                "scenario action"
            );
            match action.intent {
                Intent::ForceEscalation => {
                    let events = {
                        let mut ctx = HookContext::new(turn, &mut self.roster, &mut self.rng);
                        self.escalation.force_release(&mut ctx, &action.actor)
                    };
                    self.record_all(events);
                }
                Intent::ForceRicochet => {
                    forced.ricochet = true;
                    if !action.is_any_actor() {
                        forced.actor = Some(action.actor.clone());
                    }
                    forced.target = action.target.clone();
                }
                Intent::Audit => {
                    self.audit();
                }
                Intent::EnterOntological => match self.roster.get_mut(&action.actor) {
                    Some(agent) => agent.frame = Frame::Ontological,
                    None => tracing::debug!(actor = %action.actor, "scenario actor not on roster"),
                },
            }
        }
        forced
    }

    /// Resolve this turn's throw. Every path records exactly one terminal
    /// event (or one per volley strike).
    fn resolve_throw(&mut self, turn: u32, forced: &Forced) {
        if self.roster.len() < 2 {
            self.record(
                Event::new(turn, "None", "None", Outcome::Idle, "None")
                    .with_note("Not enough agents on the field."),
            );
            return;
        }

        let thrower = match forced.actor.as_deref().filter(|n| self.roster.contains(n)) {
            Some(name) => name.to_string(),
            None => {
                let agents = self.roster.agents();
                agents[self.rng.random_range(0..agents.len())].name.clone()
            }
        };

        if self.roster.get(&thrower).is_some_and(|a| a.holding_beer) {
            self.sip_beer(turn, &thrower);
            return;
        }

        let aimed = forced
            .target
            .as_deref()
            .filter(|t| forced.ricochet && *t != thrower && self.roster.contains(t))
            .map(str::to_string);
        let provisional = match aimed {
            Some(target) => Some(target),
            None => {
                let agents = self.roster.agents();
                agents
                    .iter()
                    .find(|a| a.name == thrower)
                    .and_then(|t| pick_target(&mut self.rng, t, agents, None))
                    .map(|a| a.name.clone())
            }
        };
        let Some(mut target) = provisional else {
            self.record(
                Event::new(turn, thrower.as_str(), "None", Outcome::Idle, "None")
                    .with_note("Nobody to throw at."),
            );
            return;
        };

        if self.is_ontological(&target) {
            self.record(
                Event::new(
                    turn,
                    thrower.as_str(),
                    target.as_str(),
                    Outcome::LayerExemption,
                    target.as_str(),
                )
                .with_note("Target is in the ontological layer. Combat invalid."),
            );
            return;
        }

        let rescuer = {
            let mut ctx = HookContext::new(turn, &mut self.roster, &mut self.rng);
            self.synergy.on_target_selected(&mut ctx, &thrower, &target);
            self.synergy.intercept(&mut ctx, &thrower, &target)
        };
        let rescuer = rescuer.filter(|r| self.roster.contains(r));

        let mut notes: Vec<String> = Vec::new();
        if let Some(rescuer) = rescuer {
            self.record(
                Event::new(
                    turn,
                    thrower.as_str(),
                    target.as_str(),
                    Outcome::TwinRescue,
                    rescuer.as_str(),
                )
                .with_note(format!("{rescuer} steps in front of {target}.")),
            );
            notes.push(format!("[TWIN_RESCUE] {rescuer} intercepts!"));
            target = rescuer;
            if self.is_ontological(&target) {
                self.record(
                    Event::new(
                        turn,
                        thrower.as_str(),
                        target.as_str(),
                        Outcome::LayerExemption,
                        target.as_str(),
                    )
                    .with_note("Rescuer is in the ontological layer. Combat invalid."),
                );
                return;
            }
        }

        let first_roll = self.rng.random::<f64>();
        let roll_ricochet = self.rng.random::<f64>();
        let reroll = self
            .roster
            .get_mut(&thrower)
            .map(|t| paradox_reroll(&mut self.rng, t, first_roll));
        let roll_hit = reroll.as_ref().map_or(first_roll, |r| r.roll);
        if let Some(reroll) = reroll {
            match (reroll.used, reroll.note) {
                (true, Some(note)) => notes.insert(0, format!("[PARADOX_REROLL] {note}")),
                (false, Some(note)) => notes.insert(0, note),
                _ => {}
            }
        }

        let area = &self.config.area;
        let area_active = self.area.turns_left > 0;
        let debuff = area_active.then(|| DodgeDebuff {
            intensity: area.intensity,
            rate: if area.debuff_enabled { area.debuff_rate } else { 0.0 },
        });
        if area_active && area.debuff_enabled {
            notes.push("[RESONANCE] Dodge reduced.".into());
        }
        let p_hit = match (self.roster.get(&thrower), self.roster.get(&target)) {
            (Some(t), Some(v)) => compute_hit_probability(t, v, debuff),
            _ => 0.0,
        };

        if let Some(note) = self.roster.get_mut(&target).and_then(untouchable_gate) {
            self.record(
                Event::new(
                    turn,
                    thrower.as_str(),
                    target.as_str(),
                    Outcome::Untouchable,
                    target.as_str(),
                )
                .with_note(note)
                .with_rolls(roll_hit, roll_ricochet, p_hit),
            );
            return;
        }

        let rolls = (roll_hit, roll_ricochet, p_hit);
        if !forced.ricochet && roll_hit < p_hit {
            self.resolve_hit(turn, &thrower, &target, notes, rolls);
        } else if area_active {
            self.resolve_volley(turn, &thrower, &target, &notes, rolls);
        } else if forced.ricochet || roll_ricochet < self.config.ricochet.threshold {
            self.resolve_ricochet(turn, &thrower, &target, forced, notes, rolls);
        } else {
            self.record(
                Event::new(
                    turn,
                    thrower.as_str(),
                    target.as_str(),
                    Outcome::Miss,
                    target.as_str(),
                )
                .with_note(notes.join(" "))
                .with_rolls(roll_hit, roll_ricochet, p_hit),
            );
        }
    }

    fn sip_beer(&mut self, turn: u32, thrower: &str) {
        let roll_hit = self.rng.random::<f64>();
        let roll_ricochet = self.rng.random::<f64>();
        let note = match self.roster.get_mut(thrower) {
            Some(agent) => {
                agent.frame = Frame::Ontological;
                agent.beer_dodge_bonus = clamp(
                    agent.beer_dodge_bonus + agent.beer_dodge_bonus_step,
                    0.0,
                    agent.beer_dodge_bonus_cap.max(0.0),
                );
                format!(
                    "Dodge up (+{:.2}, now {:.2}). Frame: ONTOLOGICAL",
                    agent.beer_dodge_bonus_step, agent.beer_dodge_bonus
                )
            }
            None => String::new(),
        };
        self.record(
            Event::new(turn, thrower, "(none)", Outcome::BeerSip, "(peace maintained)")
                .with_note(note)
                .with_rolls(roll_hit, roll_ricochet, 0.0),
        );
    }

    fn resolve_hit(
        &mut self,
        turn: u32,
        thrower: &str,
        target: &str,
        mut notes: Vec<String>,
        (roll_hit, roll_ricochet, p_hit): (f64, f64, f64),
    ) {
        self.credit(thrower, target);
        self.land_on(turn, target, &mut notes, "Beer knocked. Weaver descends.");

        let dyad_events = {
            let mut ctx = HookContext::new(turn, &mut self.roster, &mut self.rng);
            self.synergy.on_hit(&mut ctx, thrower, target)
        };
        for event in &dyad_events {
            if matches!(&event.outcome, Outcome::Synergy(label) if label == ECHOED_ON_HIT) {
                notes.push(event.note.clone());
            }
        }
        self.escalation.on_hit(thrower, target);
        self.record_all(dyad_events);

        self.record(
            Event::new(turn, thrower, target, Outcome::Hit, target)
                .with_note(notes.join(" "))
                .with_rolls(roll_hit, roll_ricochet, p_hit),
        );
    }

    fn resolve_volley(
        &mut self,
        turn: u32,
        thrower: &str,
        target: &str,
        notes: &[String],
        (roll_hit, roll_ricochet, p_hit): (f64, f64, f64),
    ) {
        let area = &self.config.area;
        let lo = area.min_targets.min(area.max_targets).max(1);
        let hi = area.max_targets.max(lo);
        let count = self.rng.random_range(lo..=hi);
        let cap = self.ricochet_cap();
        let victims: Vec<String> =
            pick_ricochet_targets(&mut self.rng, self.roster.agents(), &[thrower], count, &cap)
                .into_iter()
                .map(|a| a.name.clone())
                .collect();

        let credited = self
            .area
            .beneficiary
            .clone()
            .filter(|b| self.roster.contains(b))
            .unwrap_or_else(|| thrower.to_string());
        let extra = notes.join(" ");
        let total = victims.len();

        for (idx, victim) in victims.iter().enumerate() {
            let strike = idx + 1;
            if self.is_ontological(victim) {
                self.record(
                    Event::new(turn, thrower, target, Outcome::LayerExemption, victim.as_str())
                        .with_note("Net strand deflected by the ontological frame.")
                        .with_rolls(roll_hit, roll_ricochet, p_hit)
                        .with_context("volley_strike", strike as u64),
                );
                continue;
            }
            self.credit(&credited, victim);
            let note = format!("MISS -> NET [Credit: {credited}] ({strike}/{total}) {extra}");
            self.record(
                Event::new(turn, thrower, target, Outcome::SnowNetHit, victim.as_str())
                    .with_note(note.trim_end())
                    .with_rolls(roll_hit, roll_ricochet, p_hit)
                    .with_context("volley_strike", strike as u64)
                    .with_context("volley_size", total as u64),
            );
        }
    }

    fn resolve_ricochet(
        &mut self,
        turn: u32,
        thrower: &str,
        target: &str,
        forced: &Forced,
        mut notes: Vec<String>,
        (roll_hit, roll_ricochet, p_hit): (f64, f64, f64),
    ) {
        let aimed = forced
            .target
            .clone()
            .filter(|t| forced.ricochet && t != thrower && self.roster.contains(t));
        let victim = match aimed {
            Some(victim) => Some(victim),
            None => {
                let cap = self.ricochet_cap();
                pick_ricochet_targets(&mut self.rng, self.roster.agents(), &[thrower], 1, &cap)
                    .first()
                    .map(|a| a.name.clone())
            }
        };
        let roll_ricochet = if forced.ricochet { 0.0 } else { roll_ricochet };

        let Some(victim) = victim else {
            self.record(
                Event::new(turn, thrower, target, Outcome::Miss, target)
                    .with_note(notes.join(" "))
                    .with_rolls(roll_hit, roll_ricochet, p_hit),
            );
            return;
        };

        if self.is_ontological(&victim) {
            let mut event =
                Event::new(turn, thrower, target, Outcome::LayerExemption, victim.as_str())
                    .with_note("Ricochet deflected by the ontological frame.")
                    .with_rolls(roll_hit, roll_ricochet, p_hit);
            if forced.ricochet {
                event = event.with_tag("scenario:forced");
            }
            self.record(event);
            return;
        }

        self.credit(thrower, &victim);
        self.land_on(turn, &victim, &mut notes, "Beer knocked by ricochet.");

        notes.insert(0, "MISS RICOCHET".into());
        if forced.ricochet {
            notes.push("[FORCED]".into());
        }
        let mut event = Event::new(turn, thrower, target, Outcome::RicochetHit, victim.as_str())
            .with_note(notes.join(" "))
            .with_rolls(roll_hit, roll_ricochet, p_hit);
        if forced.ricochet {
            event = event.with_tag("scenario:forced");
        }
        self.record(event);
    }

    /// Side effects of landing on `victim`: spite gain and knocking a beer.
    fn land_on(&mut self, turn: u32, victim: &str, notes: &mut Vec<String>, knock_note: &str) {
        let summon_bonus = self.config.area.summon_accuracy_bonus;
        let Some(agent) = self.roster.get_mut(victim) else {
            return;
        };

        if agent.spite_gain_on_hit > 0.0 {
            agent.spite_meter = clamp(agent.spite_meter + agent.spite_gain_on_hit, 0.0, 1.0);
            notes.push(format!("{} spite_meter -> {:.2}", agent.name, agent.spite_meter));
        }

        if !agent.holding_beer {
            return;
        }
        agent.holding_beer = false;
        agent.frame = Frame::Combat;
        agent.beer_dodge_bonus = 0.0;
        agent.accuracy = clamp(agent.accuracy + summon_bonus, 0.0, 1.0);

        self.area.turns_left = self.config.area.duration;
        self.area.beneficiary = Some(victim.to_string());
        tracing::debug!(turn, beneficiary = victim, "area mode summoned");
        self.record(
            Event::new(turn, "Weaver", "Stage", Outcome::WeaverDescends, "Snow Net")
                .with_note(knock_note)
                .with_context("area_beneficiary", victim),
        );
    }

    fn credit(&mut self, thrower: &str, target: &str) {
        if let Some(agent) = self.roster.get_mut(thrower) {
            agent.landed += 1;
        }
        if let Some(agent) = self.roster.get_mut(target) {
            agent.taken += 1;
        }
    }

    fn is_ontological(&self, name: &str) -> bool {
        self.roster.get(name).is_some_and(|a| a.is_ontological())
    }

    fn ricochet_cap(&self) -> RicochetCap {
        RicochetCap::new(
            self.config.roles.magnet.clone(),
            self.config.ricochet.cap_probability,
        )
    }
}
