use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use colored::Colorize;
use sb_core::{Ledger, Outcome, Roster};
use sb_simulation::{AuditMode, ScenarioQueue, SimConfig, SimError, Simulation};
use serde::Serialize;

use super::{RosterMode, render};

/// Machine-readable summary formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    Json,
}

/// Everything `snowball play` accepts.
#[derive(Debug, Clone, Default)]
pub struct PlayArgs {
    pub seed: Option<u64>,
    pub turns: Option<u32>,
    pub roster: Option<PathBuf>,
    pub mode: RosterMode,
    pub scenario: Option<String>,
    pub audit_mode: Option<String>,
    pub config: Option<PathBuf>,
    pub ledger: Option<PathBuf>,
    pub timeline: usize,
    pub summary: Option<SummaryFormat>,
    pub audit: bool,
    pub no_prologue: bool,
}

/// First line of a ledger file.
#[derive(Debug, Serialize)]
struct LedgerHeader<'a> {
    event_type: &'static str,
    version: &'static str,
    seed: u64,
    turns: u32,
    mode: String,
    audit_mode: AuditMode,
    prologue: bool,
    scenario: Option<&'a str>,
    roster: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
struct Summary<'a> {
    seed: u64,
    turns: u32,
    scenario: Option<&'a str>,
    events: usize,
    counts: Counts,
    mvp: Option<Mvp<'a>>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct Counts {
    hit: usize,
    miss: usize,
    ricochet: usize,
    exempt: usize,
    audit: usize,
}

#[derive(Debug, Serialize)]
struct Mvp<'a> {
    name: &'a str,
    landed: u32,
}

pub fn run(args: &PlayArgs) -> Result<(), String> {
    let config = build_config(args)?;
    let roster = super::load_roster(args.roster.as_deref(), args.mode)?;
    let scenario = super::load_scenario(args.scenario.as_deref())?;

    println!(
        "  {} {}",
        "Snowball".bold(),
        format!(
            "(seed={}, turns={}, mode={}, audit={}, agents={})",
            config.seed,
            config.turns,
            args.mode,
            config.audit_mode,
            roster.len()
        )
        .dimmed()
    );
    if !scenario.is_empty() {
        println!("  Scenario: {} ({} actions)", scenario.name, scenario.len());
    }
    println!();

    let (roster, ledger) = simulate(roster, config.clone(), scenario.clone(), args.audit);

    if let Some(path) = &args.ledger {
        write_ledger(path, &config, args.mode, &scenario, &roster, &ledger)?;
        println!("  Ledger written to {}", path.display());
        println!();
    }

    render::print_timeline(ledger.events(), args.timeline);
    println!();
    render::print_scoreboard(&roster, &ledger);

    if args.summary == Some(SummaryFormat::Json) {
        let summary = summarize(&config, &scenario, &roster, &ledger);
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| format!("cannot render summary: {e}"))?;
        println!();
        println!("{json}");
    }
    Ok(())
}

/// Layer CLI flags over the config file (or the defaults).
fn build_config(args: &PlayArgs) -> Result<SimConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
            SimConfig::from_json(&text).map_err(|e| e.to_string())?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(turns) = args.turns {
        config = config.with_turns(turns);
    }
    if let Some(mode) = &args.audit_mode {
        let mode: AuditMode = mode.parse().map_err(|e: SimError| e.to_string())?;
        config = config.with_audit_mode(mode);
    }
    if args.no_prologue {
        config = config.with_prologue(false);
    }
    Ok(config)
}

/// Run to completion, optionally auditing at the end.
pub(crate) fn simulate(
    roster: Roster,
    config: SimConfig,
    scenario: ScenarioQueue,
    audit: bool,
) -> (Roster, Ledger) {
    let mut sim = Simulation::new(roster, config).with_scenario(scenario);
    sim.run();
    if audit {
        sim.audit();
    }
    sim.into_parts()
}

/// Write the header line followed by one line per event.
pub(crate) fn write_ledger(
    path: &Path,
    config: &SimConfig,
    mode: RosterMode,
    scenario: &ScenarioQueue,
    roster: &Roster,
    ledger: &Ledger,
) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create {}: {e}", parent.display()))?;
    }
    let file =
        File::create(path).map_err(|e| format!("cannot create {}: {e}", path.display()))?;
    let mut out = BufWriter::new(file);
    write_jsonl(&mut out, config, mode, scenario, roster, ledger)?;
    out.flush()
        .map_err(|e| format!("cannot write {}: {e}", path.display()))
}

pub(crate) fn write_jsonl(
    out: &mut impl Write,
    config: &SimConfig,
    mode: RosterMode,
    scenario: &ScenarioQueue,
    roster: &Roster,
    ledger: &Ledger,
) -> Result<(), String> {
    let mut names = roster.names();
    names.sort_unstable();
    let header = LedgerHeader {
        event_type: "LEDGER_HEADER",
        version: env!("CARGO_PKG_VERSION"),
        seed: config.seed,
        turns: config.turns,
        mode: mode.to_string(),
        audit_mode: config.audit_mode,
        prologue: config.prologue,
        scenario: (!scenario.is_empty()).then_some(scenario.name.as_str()),
        roster: names,
    };
    let line = serde_json::to_string(&header).map_err(|e| e.to_string())?;
    writeln!(out, "{line}").map_err(|e| format!("ledger write failed: {e}"))?;
    ledger.write_jsonl(out).map_err(|e| e.to_string())
}

fn summarize<'a>(
    config: &SimConfig,
    scenario: &'a ScenarioQueue,
    roster: &'a Roster,
    ledger: &Ledger,
) -> Summary<'a> {
    let mut counts = Counts::default();
    for event in ledger.iter() {
        match &event.outcome {
            o if o.is_landing() => counts.hit += 1,
            Outcome::Miss => counts.miss += 1,
            Outcome::LayerExemption => counts.exempt += 1,
            o if o.is_audit_record() => counts.audit += 1,
            _ => {}
        }
        if event.outcome == Outcome::RicochetHit {
            counts.ricochet += 1;
        }
    }

    let mvp = render::standings(roster).into_iter().next().map(|a| Mvp {
        name: a.name.as_str(),
        landed: a.landed,
    });

    Summary {
        seed: config.seed,
        turns: config.turns,
        scenario: (!scenario.is_empty()).then_some(scenario.name.as_str()),
        events: ledger.len(),
        counts,
        mvp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::Event;

    #[test]
    fn flags_override_the_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("sim.json");
        fs::write(&path, r#"{"seed": 7, "turns": 3, "audit_mode": "conditional"}"#).unwrap();

        let args = PlayArgs {
            config: Some(path),
            turns: Some(9),
            no_prologue: true,
            ..PlayArgs::default()
        };
        let config = build_config(&args).unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.turns, 9);
        assert_eq!(config.audit_mode, AuditMode::Conditional);
        assert!(!config.prologue);
    }

    #[test]
    fn bad_audit_mode_is_an_error() {
        let args = PlayArgs {
            audit_mode: Some("lenient".into()),
            ..PlayArgs::default()
        };
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn ledger_file_starts_with_a_header() {
        let roster = Roster::from_agents([sb_core::Agent::new("B"), sb_core::Agent::new("A")]);
        let mut ledger = Ledger::new();
        ledger.append(Event::new(1, "A", "B", Outcome::Hit, "B"));

        let mut out = Vec::new();
        write_jsonl(
            &mut out,
            &SimConfig::default(),
            RosterMode::Classic,
            &ScenarioQueue::default(),
            &roster,
            &ledger,
        )
        .unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let header: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(header["event_type"], "LEDGER_HEADER");
        assert_eq!(header["seed"], 42);
        assert_eq!(header["mode"], "classic");
        assert_eq!(header["roster"], serde_json::json!(["A", "B"]));
        assert!(header["scenario"].is_null());
        assert!(lines[1].contains(r#""outcome":"HIT""#));
    }

    #[test]
    fn summary_counts_by_outcome_class() {
        let mut a = sb_core::Agent::new("A");
        a.landed = 2;
        let roster = Roster::from_agents([a, sb_core::Agent::new("B")]);
        let mut ledger = Ledger::new();
        ledger.append(Event::new(1, "A", "B", Outcome::Hit, "B"));
        ledger.append(Event::new(2, "A", "B", Outcome::RicochetHit, "C"));
        ledger.append(Event::new(3, "B", "A", Outcome::Miss, "A"));
        ledger.append(Event::new(3, "Mega", "Reality", Outcome::AuditSkip, "None"));

        let scenario = ScenarioQueue::default();
        let summary = summarize(&SimConfig::default(), &scenario, &roster, &ledger);
        assert_eq!(summary.counts.hit, 2);
        assert_eq!(summary.counts.ricochet, 1);
        assert_eq!(summary.counts.miss, 1);
        assert_eq!(summary.counts.audit, 1);
        assert_eq!(summary.mvp.unwrap().name, "A");
    }
}
