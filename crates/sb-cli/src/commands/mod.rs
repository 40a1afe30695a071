pub mod play;
pub mod render;
pub mod roster;
pub mod verify;

use std::fmt;
use std::path::Path;

use clap::ValueEnum;
use sb_core::Roster;
use sb_simulation::ScenarioQueue;

/// Built-in council used when no roster is given.
const SAMPLE_ROSTER: &str = include_str!("../../data/sample_roster.json");

/// Canonical seating order. Unlisted agents sit after these, alphabetically.
const CANON_ORDER: [&str; 9] = [
    "Oracle",
    "Ace",
    "Mega",
    "Claude",
    "DeepScribe",
    "Mico",
    "Janus",
    "Quinn",
    "Kryssie",
];

/// The six-agent lineup and its seating order for classic games.
const CLASSIC_ORDER: [&str; 6] = ["Kryssie", "Mega", "Ace", "Claude", "Janus", "Quinn"];

/// Which agents take the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RosterMode {
    /// Everyone on the roster, in canonical order.
    #[default]
    #[value(alias = "council")]
    Open,
    /// Only the classic six, in their original seating order.
    Classic,
}

impl fmt::Display for RosterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Classic => write!(f, "classic"),
        }
    }
}

/// Load a roster from a directory, a JSON array file, or the built-in sample.
fn load_roster(source: Option<&Path>, mode: RosterMode) -> Result<Roster, String> {
    let mut roster = match source {
        None => Roster::from_json_array(SAMPLE_ROSTER).map_err(|e| e.to_string())?,
        Some(path) if path.is_dir() => Roster::load_dir(path).map_err(|e| e.to_string())?,
        Some(path) => Roster::load_file(path).map_err(|e| e.to_string())?,
    };
    match mode {
        RosterMode::Open => roster.sort_by_precedence(&CANON_ORDER),
        RosterMode::Classic => {
            roster.retain_names(&CLASSIC_ORDER);
            roster.sort_by_precedence(&CLASSIC_ORDER);
        }
    }
    if roster.is_empty() {
        return Err(format!("roster has no valid agents for {mode} mode"));
    }
    Ok(roster)
}

/// Resolve a scenario argument: a built-in name, else a JSON file path.
fn load_scenario(spec: Option<&str>) -> Result<ScenarioQueue, String> {
    let Some(spec) = spec else {
        return Ok(ScenarioQueue::default());
    };
    if ScenarioQueue::BUILTIN_NAMES.contains(&spec) {
        return ScenarioQueue::builtin(spec).map_err(|e| e.to_string());
    }

    let path = Path::new(spec);
    if !path.is_file() {
        return Err(format!(
            "unknown scenario '{spec}' (built-ins: {})",
            ScenarioQueue::BUILTIN_NAMES.join(", ")
        ));
    }
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let mut queue = ScenarioQueue::from_json(&text).map_err(|e| e.to_string())?;
    if queue.name.is_empty() || queue.name == "custom" {
        queue.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("custom")
            .to_string();
    }
    Ok(queue)
}
