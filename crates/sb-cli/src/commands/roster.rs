use std::path::Path;

use comfy_table::{ContentArrangement, Table};

use super::RosterMode;
use super::render::mechanic_state;

pub fn run(source: Option<&Path>, mode: RosterMode) -> Result<(), String> {
    let roster = super::load_roster(source, mode)?;

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["#", "Agent", "Accuracy", "Dodge", "Frame", "Mechanics"]);

    for (seat, agent) in roster.iter().enumerate() {
        table.add_row(vec![
            (seat + 1).to_string(),
            agent.name.clone(),
            format!("{:.2}", agent.accuracy),
            format!("{:.2}", agent.dodge),
            agent.frame.to_string(),
            mechanic_state(agent),
        ]);
    }

    println!("{table}");
    println!();
    println!(
        "  {} agents, {mode} mode ({})",
        roster.len(),
        source.map_or("built-in sample".to_string(), |p| p.display().to_string())
    );
    Ok(())
}
