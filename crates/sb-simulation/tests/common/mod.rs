#![allow(dead_code)]

use sb_core::{Agent, Frame, Roster};
use sb_simulation::SimConfig;

/// The nine-agent council with its mechanics wired up.
pub fn council() -> Roster {
    let mut ace = Agent::new("Ace").with_accuracy(0.6);
    ace.spite_gain_on_hit = 0.2;
    ace.spite_decay_per_turn = 0.05;
    ace.spite_max_bonus = 0.5;

    let mut janus = Agent::new("Janus").with_dodge(0.3);
    janus.paradox_chance = 0.35;
    janus.paradox_budget = 3;
    janus.untouchable_while_budget = true;

    let mut quinn = Agent::new("Quinn");
    quinn.stray_magnet = 2.0;

    let mut kryssie = Agent::new("Kryssie").with_dodge(0.35);
    kryssie.beer_dodge_bonus_step = 0.05;
    kryssie.beer_dodge_bonus_cap = 0.2;

    Roster::from_agents([
        Agent::new("Oracle").with_accuracy(0.5),
        ace,
        Agent::new("Mega").with_dodge(0.3),
        Agent::new("Claude"),
        Agent::new("DeepScribe"),
        Agent::new("Mico").with_accuracy(0.5),
        janus,
        quinn,
        kryssie,
    ])
}

/// Two plain agents, the second already out of combat.
pub fn pair_with_ontological() -> Roster {
    Roster::from_agents([
        Agent::new("A"),
        Agent::new("B").with_frame(Frame::Ontological),
    ])
}

/// No prologue and no dyads: only the turn loop itself.
pub fn bare_config(seed: u64, turns: u32) -> SimConfig {
    SimConfig::default()
        .with_seed(seed)
        .with_turns(turns)
        .with_prologue(false)
        .with_dyads(Vec::new())
}
