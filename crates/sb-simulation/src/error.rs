/// Alias for `Result<T, SimError>`.
pub type SimResult<T> = Result<T, SimError>;

/// Errors raised while setting up a run.
///
/// Turn resolution itself never fails; these only come from building
/// configuration, scenarios, and registries from names or JSON.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// No built-in scenario has this name.
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),

    /// Not one of `transparent`, `stabilize`, `conditional`.
    #[error("unknown audit mode: {0}")]
    UnknownAuditMode(String),

    /// No built-in dyad has this name.
    #[error("unknown dyad: {0}")]
    UnknownDyad(String),

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[source] serde_json::Error),

    /// A scenario document could not be parsed.
    #[error("invalid scenario: {0}")]
    Scenario(#[source] serde_json::Error),
}
