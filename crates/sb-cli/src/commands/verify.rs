use clap::ValueEnum;
use colored::Colorize;
use sb_core::{Event, Outcome, Roster};
use sb_simulation::{AuditMode, ScenarioQueue, SimConfig, Simulation};

use super::RosterMode;

/// Verification suites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VerifyTarget {
    /// Forced ricochet, audit, then an idempotent re-audit.
    Audit,
    /// Audit of an ontological-frame target is vetoed.
    Hierarchy,
    /// Same seed, same ledger bytes.
    Determinism,
    /// An open council run keeps every turn total and every landing counted.
    Chaos,
    /// An exhausted paradox budget engages the pattern lock, which later ends.
    Lock,
    /// Every suite.
    All,
}

pub fn run(target: VerifyTarget) -> Result<(), String> {
    let suites: &[VerifyTarget] = match target {
        VerifyTarget::All => &[
            VerifyTarget::Audit,
            VerifyTarget::Hierarchy,
            VerifyTarget::Determinism,
            VerifyTarget::Chaos,
            VerifyTarget::Lock,
        ],
        VerifyTarget::Audit => &[VerifyTarget::Audit],
        VerifyTarget::Hierarchy => &[VerifyTarget::Hierarchy],
        VerifyTarget::Determinism => &[VerifyTarget::Determinism],
        VerifyTarget::Chaos => &[VerifyTarget::Chaos],
        VerifyTarget::Lock => &[VerifyTarget::Lock],
    };

    let mut failures = 0;
    for suite in suites {
        let name = format!("{suite:?}").to_lowercase();
        match check(*suite) {
            Ok(detail) => println!("  {} {name}: {detail}", "PASS".green().bold()),
            Err(detail) => {
                failures += 1;
                println!("  {} {name}: {detail}", "FAIL".red().bold());
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} verification suite(s) failed"));
    }
    println!();
    println!("  All {} suite(s) verified.", suites.len());
    Ok(())
}

fn check(suite: VerifyTarget) -> Result<String, String> {
    match suite {
        VerifyTarget::Audit => verify_audit(),
        VerifyTarget::Hierarchy => verify_hierarchy(),
        VerifyTarget::Determinism => verify_determinism(),
        VerifyTarget::Chaos => verify_chaos(),
        VerifyTarget::Lock => verify_lock(),
        VerifyTarget::All => Ok(String::new()),
    }
}

fn scenario_run(name: &str, seed: u64, turns: u32) -> Result<Simulation, String> {
    let roster = super::load_roster(None, RosterMode::Open)?;
    let scenario = ScenarioQueue::builtin(name).map_err(|e| e.to_string())?;
    let config = SimConfig::default()
        .with_seed(seed)
        .with_turns(turns)
        .with_audit_mode(AuditMode::Stabilize);
    let mut sim = Simulation::new(roster, config).with_scenario(scenario);
    sim.run();
    Ok(sim)
}

fn audit_at(events: &[Event], turn: u32) -> Vec<&Event> {
    events
        .iter()
        .filter(|e| e.turn == turn && e.outcome.is_audit_record())
        .collect()
}

fn verify_audit() -> Result<String, String> {
    let mut sim = scenario_run("ricochet_audit", 1002, 10)?;
    let recorded = audit_at(sim.ledger().events(), 3);
    let Some(begin) = recorded.first() else {
        return Err("no audit recorded on turn 3".into());
    };
    if begin.outcome != Outcome::AuditBegin {
        return Err(format!("audit opened with {} instead of AUDIT_BEGIN", begin.outcome));
    }
    let verdict = recorded
        .iter()
        .find(|e| e.outcome == Outcome::AuditVerdict)
        .map(|e| e.actual_target.clone())
        .ok_or("audit recorded no verdict")?;

    let before = sim.ledger().events().to_vec();
    sim.audit();
    let again = sim.audit().to_vec();
    if sim.ledger().events()[..before.len()] != before[..] {
        return Err("audit rewrote earlier events".into());
    }
    if again.len() != 1 || again[0].outcome != Outcome::AuditSkip {
        return Err("immediate re-audit was not a single skip".into());
    }
    Ok(format!("turn 3 verdict {verdict}, immediate re-audit skipped"))
}

fn verify_hierarchy() -> Result<String, String> {
    let sim = scenario_run("hierarchy_test", 1003, 5)?;
    let recorded = audit_at(sim.ledger().events(), 3);
    let veto = recorded
        .iter()
        .find(|e| e.outcome == Outcome::AuditVerdict && e.actual_target == "JURISDICTION_ERROR");
    match veto {
        Some(event) if !recorded.iter().any(|e| e.outcome == Outcome::AuditApply) => Ok(format!(
            "audit of {} vetoed: JURISDICTION_ERROR",
            event.intended_target
        )),
        Some(_) => Err("vetoed audit still applied a correction".into()),
        None => Err("expected JURISDICTION_ERROR on turn 3".into()),
    }
}

fn verify_determinism() -> Result<String, String> {
    let render = || -> Result<Vec<u8>, String> {
        let roster = super::load_roster(None, RosterMode::Open)?;
        let config = SimConfig::default().with_seed(42).with_turns(20);
        let mut sim = Simulation::new(roster, config);
        sim.run();
        let mut out = Vec::new();
        sim.ledger().write_jsonl(&mut out).map_err(|e| e.to_string())?;
        Ok(out)
    };
    let first = render()?;
    let second = render()?;
    if first != second {
        return Err("two runs with seed 42 produced different ledgers".into());
    }
    Ok(format!("seed 42 reproduced {} ledger bytes", first.len()))
}

fn verify_chaos() -> Result<String, String> {
    let roster = super::load_roster(None, RosterMode::Open)?;
    let turns = 20;
    let mut sim = Simulation::new(roster, SimConfig::default().with_seed(777).with_turns(turns));
    sim.run();
    let (roster, ledger) = sim.into_parts();

    if let Some(turn) = (1..=turns).find(|t| ledger.at_turn(*t).next().is_none()) {
        return Err(format!("turn {turn} recorded nothing"));
    }
    let landed: u32 = roster.iter().map(|a| a.landed).sum();
    let taken: u32 = roster.iter().map(|a| a.taken).sum();
    if landed != taken {
        return Err(format!("{landed} landed but {taken} taken"));
    }
    let stray = ledger.iter().find(|e| {
        e.outcome.is_landing() && roster.get(&e.actual_target).is_some_and(|a| a.is_ontological())
    });
    if let Some(event) = stray {
        return Err(format!(
            "turn {} landed {} on {}, who stayed out of combat",
            event.turn, event.outcome, event.actual_target
        ));
    }
    Ok(format!("seed 777: {} events, {landed} landings balanced", ledger.len()))
}

fn verify_lock() -> Result<String, String> {
    let mut roster: Roster = super::load_roster(None, RosterMode::Open)?;
    let Some(janus) = roster.get_mut("Janus") else {
        return Err("roster has no Janus".into());
    };
    janus.paradox_budget = 0;

    let mut sim = Simulation::new(roster, SimConfig::default().with_seed(888).with_turns(20));
    let ledger = sim.run();
    let label = |e: &Event| match &e.outcome {
        Outcome::Synergy(label) => Some(label.clone()),
        _ => None,
    };

    let engaged = ledger
        .at_turn(1)
        .any(|e| label(e).as_deref() == Some("PATTERN_LOCK"));
    if !engaged {
        return Err("pattern lock did not engage on turn 1".into());
    }
    let ended = ledger.iter().find_map(|e| {
        label(e)
            .filter(|l| l == "LOCK_FADE" || l == "CYCLE_RENEWAL")
            .map(|l| (e.turn, l))
    });
    match ended {
        Some((turn, how)) if turn <= 6 => {
            Ok(format!("lock engaged on turn 1, {how} on turn {turn}"))
        }
        Some((turn, how)) => Err(format!("lock outlived its five turns ({how} on turn {turn})")),
        None => Err("pattern lock never ended".into()),
    }
}
