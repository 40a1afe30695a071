use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sb_core::{Agent, Event, Ledger, Outcome, Roster};
use sb_mechanics::spite_multiplier;

/// Print events as a timeline, at most `limit` of them (0 = all).
pub fn print_timeline(events: &[Event], limit: usize) {
    let shown = if limit == 0 { events.len() } else { limit.min(events.len()) };
    for event in &events[..shown] {
        let turn = format!("[t{:02}]", event.turn).dimmed();
        let note = if event.note.is_empty() {
            String::new()
        } else {
            format!(" {}", format!(":: {}", event.note).dimmed())
        };
        println!(
            "  {turn} {} -> {} :: {} -> {}{note}",
            event.thrower,
            event.intended_target,
            colorize_outcome(&event.outcome),
            event.actual_target,
        );
    }
    if shown < events.len() {
        println!("  {}", format!("... {} more", events.len() - shown).dimmed());
    }
}

fn colorize_outcome(outcome: &Outcome) -> colored::ColoredString {
    let label = outcome.to_string();
    match outcome {
        Outcome::Hit | Outcome::RicochetHit | Outcome::SnowNetHit => label.green().bold(),
        Outcome::Miss | Outcome::Idle => label.normal(),
        Outcome::LayerExemption | Outcome::Untouchable => label.cyan(),
        Outcome::BeerSip | Outcome::Diplomacy | Outcome::Paradox => label.yellow(),
        Outcome::WeaverDescends | Outcome::EscalationRelease | Outcome::FusionRelease => {
            label.magenta().bold()
        }
        Outcome::EscalationFade | Outcome::FusionFade => label.magenta(),
        Outcome::AuditSkip | Outcome::AuditBegin | Outcome::AuditVerdict | Outcome::AuditApply => {
            label.blue()
        }
        Outcome::TwinRescue | Outcome::Synergy(_) => label.bright_yellow(),
    }
}

/// Agents ordered by most landed, then fewest taken.
pub fn standings(roster: &Roster) -> Vec<&Agent> {
    let mut rows: Vec<&Agent> = roster.iter().collect();
    rows.sort_by(|a, b| b.landed.cmp(&a.landed).then(a.taken.cmp(&b.taken)));
    rows
}

/// Print the final standings, with how many events each agent appears in.
pub fn print_scoreboard(roster: &Roster, ledger: &Ledger) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Agent", "Landed", "Taken", "Events", "Frame", "State"]);

    for agent in standings(roster) {
        table.add_row(vec![
            agent.name.clone(),
            agent.landed.to_string(),
            agent.taken.to_string(),
            ledger.involving(&agent.name).count().to_string(),
            agent.frame.to_string(),
            mechanic_state(agent),
        ]);
    }
    println!("{table}");
}

/// One-line summary of whichever mechanics the agent takes part in.
pub fn mechanic_state(agent: &Agent) -> String {
    let mut parts = Vec::new();
    if agent.has_spite() {
        parts.push(format!(
            "spite {:.2} ({:.2}x)",
            agent.spite_meter,
            spite_multiplier(agent)
        ));
    }
    if agent.has_paradox() || agent.untouchable_while_budget {
        parts.push(format!("paradox budget {}", agent.paradox_budget));
    }
    if agent.stray_magnet > 0.0 {
        parts.push(format!("magnet {:.1}", agent.stray_magnet));
    }
    if agent.has_beer_mode() {
        parts.push(format!(
            "beer {} (+{:.2} dodge)",
            if agent.holding_beer { "held" } else { "down" },
            agent.beer_dodge_bonus
        ));
    }
    if parts.is_empty() {
        "—".into()
    } else {
        parts.join(", ")
    }
}
