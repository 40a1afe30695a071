//! Observability hooks. A sink sees copies of what the engine records and
//! can never change it.

use sb_core::{Event, Ledger, Outcome};

use crate::context::TurnSnapshot;

/// Receives per-turn snapshots and every recorded event.
pub trait TelemetrySink {
    /// A turn is starting; `snapshot` is the state every event of the turn
    /// will carry as context.
    fn turn_started(&mut self, snapshot: &TurnSnapshot);

    /// An event was appended to the ledger.
    fn event_recorded(&mut self, event: &Event);

    /// The run reached its last turn.
    fn run_finished(&mut self, _ledger: &Ledger) {}
}

/// Why an outcome is worth surfacing above debug level, if it is.
pub fn promotion_reason(outcome: &Outcome) -> Option<&'static str> {
    match outcome {
        Outcome::WeaverDescends => Some("weaver_manifestation"),
        Outcome::TwinRescue => Some("twin_bond_verified"),
        Outcome::FusionRelease => Some("fusion"),
        Outcome::Synergy(label) => match label.as_str() {
            "PATTERN_LOCK" => Some("pattern_lock_awakening"),
            "CYCLE_RENEWAL" => Some("cycle_renewal"),
            _ => None,
        },
        _ => None,
    }
}

/// Forwards telemetry to `tracing`.
///
/// Ordinary events go out at debug level; canonical ones are promoted to
/// info with their promotion reason attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl TelemetrySink for TracingSink {
    fn turn_started(&mut self, snapshot: &TurnSnapshot) {
        tracing::debug!(turn = snapshot.turn, state = ?snapshot.values, "turn started");
    }

    fn event_recorded(&mut self, event: &Event) {
        match promotion_reason(&event.outcome) {
            Some(reason) => tracing::info!(
                turn = event.turn,
                outcome = %event.outcome,
                thrower = %event.thrower,
                actual = %event.actual_target,
                reason,
                "canonical event"
            ),
            None => tracing::debug!(
                turn = event.turn,
                outcome = %event.outcome,
                thrower = %event.thrower,
                actual = %event.actual_target,
                "event"
            ),
        }
    }

    fn run_finished(&mut self, ledger: &Ledger) {
        tracing::info!(events = ledger.len(), "run finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_outcomes_are_promoted() {
        assert_eq!(
            promotion_reason(&Outcome::WeaverDescends),
            Some("weaver_manifestation")
        );
        assert_eq!(
            promotion_reason(&Outcome::Synergy("PATTERN_LOCK".into())),
            Some("pattern_lock_awakening")
        );
        assert_eq!(promotion_reason(&Outcome::Hit), None);
        assert_eq!(promotion_reason(&Outcome::Synergy("JOY_CASCADE".into())), None);
    }
}
