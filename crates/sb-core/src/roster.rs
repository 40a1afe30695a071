use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::agent::Agent;
use crate::error::{CoreError, CoreResult};

/// The set of agents taking part in one run, in a fixed order.
///
/// Order matters: random thrower and target selection index into it, so two
/// rosters with the same agents in a different order produce different runs.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    agents: Vec<Agent>,
}

impl Roster {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an agent. Fails if the name is already taken.
    pub fn insert(&mut self, agent: Agent) -> CoreResult<()> {
        if self.contains(&agent.name) {
            return Err(CoreError::DuplicateAgent(agent.name));
        }
        self.agents.push(agent);
        Ok(())
    }

    /// Build a roster from agents, skipping invalid or duplicate entries.
    pub fn from_agents(agents: impl IntoIterator<Item = Agent>) -> Self {
        let mut roster = Self::new();
        for agent in agents {
            if let Err(e) = agent.validate().and_then(|()| roster.insert(agent)) {
                tracing::warn!("skipping roster entry: {e}");
            }
        }
        roster
    }

    /// Build a roster from raw JSON definitions.
    ///
    /// Entries that fail to parse or validate are skipped with a warning;
    /// the remaining entries still load.
    pub fn from_definitions(definitions: impl IntoIterator<Item = Value>) -> Self {
        let agents = definitions
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Agent>(value) {
                Ok(agent) => Some(agent),
                Err(e) => {
                    tracing::warn!("skipping malformed agent definition: {e}");
                    None
                }
            });
        Self::from_agents(agents)
    }

    /// Load a roster from a JSON array of agent definitions.
    pub fn from_json_array(json: &str) -> CoreResult<Self> {
        let values: Vec<Value> = serde_json::from_str(json).map_err(|source| CoreError::Json {
            origin: "inline".to_string(),
            source,
        })?;
        Ok(Self::from_definitions(values))
    }

    /// Load a roster from a single file holding a JSON array of definitions.
    pub fn load_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| CoreError::RosterSource {
            path: path.to_path_buf(),
            source,
        })?;
        let values: Vec<Value> = serde_json::from_str(&text).map_err(|source| CoreError::Json {
            origin: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_definitions(values))
    }

    /// Load a roster from a directory holding one `*.json` file per agent.
    ///
    /// Files whose name starts with `_` are templates and are skipped.
    /// Files are read in name order so the resulting roster is stable.
    /// Unreadable or malformed files are skipped with a warning.
    pub fn load_dir(dir: &Path) -> CoreResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|source| CoreError::RosterSource {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !n.starts_with('_'))
            })
            .collect();
        paths.sort();

        let mut definitions = Vec::new();
        for path in paths {
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|text| serde_json::from_str::<Value>(&text).map_err(|e| e.to_string()));
            match parsed {
                Ok(value) => definitions.push(value),
                Err(e) => tracing::warn!("skipping {}: {e}", path.display()),
            }
        }
        Ok(Self::from_definitions(definitions))
    }

    /// Reorder agents by a precedence list. Listed names come first in list
    /// order, the rest follow alphabetically.
    pub fn sort_by_precedence(&mut self, order: &[&str]) {
        self.agents.sort_by(|a, b| {
            let rank = |agent: &Agent| {
                order
                    .iter()
                    .position(|n| *n == agent.name)
                    .unwrap_or(usize::MAX)
            };
            rank(a).cmp(&rank(b)).then_with(|| a.name.cmp(&b.name))
        });
    }

    /// Keep only agents whose name is in `names`.
    pub fn retain_names(&mut self, names: &[&str]) {
        self.agents.retain(|a| names.contains(&a.name.as_str()));
    }

    /// Look up an agent by name.
    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Look up an agent by name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| a.name == name)
    }

    /// Whether an agent with this name is on the roster.
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Whether every listed name is on the roster.
    pub fn contains_all(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.contains(n))
    }

    /// All agents in roster order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Iterate agents in roster order.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    /// Iterate agents mutably in roster order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Agent> {
        self.agents.iter_mut()
    }

    /// Agent names in roster order.
    pub fn names(&self) -> Vec<&str> {
        self.agents.iter().map(|a| a.name.as_str()).collect()
    }

    /// Number of agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// True if no agents are on the roster.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Reset every agent's transient modifiers.
    pub fn reset_transient(&mut self) {
        for agent in &mut self.agents {
            agent.reset_transient();
        }
    }
}
