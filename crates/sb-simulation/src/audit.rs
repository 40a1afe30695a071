//! Post-hoc audit of anomalous events.
//!
//! An audit scans the ledger backwards for the latest ricochet or layer
//! exemption and appends a judgment about it: `AUDIT_BEGIN` with the raw
//! truth, `AUDIT_VERDICT` with the decision, and `AUDIT_APPLY` declaring
//! whether canon was corrected. The audited event itself is never touched.
//! An ontological-frame target vetoes the audit outright.

use std::fmt;
use std::str::FromStr;

use sb_core::{Event, Outcome, Roster};
use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// How the audit layer decides a verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditMode {
    /// Ratify whatever happened.
    #[default]
    Transparent,
    /// Always rule a hit.
    Stabilize,
    /// Always rule a hit, but say whether order was preserved or restored.
    Conditional,
}

impl AuditMode {
    /// Every mode, in documentation order.
    pub const ALL: [AuditMode; 3] = [Self::Transparent, Self::Stabilize, Self::Conditional];

    /// Configuration name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transparent => "transparent",
            Self::Stabilize => "stabilize",
            Self::Conditional => "conditional",
        }
    }
}

impl fmt::Display for AuditMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuditMode {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| SimError::UnknownAuditMode(s.to_string()))
    }
}

/// What the audited event actually did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawTruth {
    Hit,
    Miss,
    Exempt,
}

impl RawTruth {
    fn of(outcome: &Outcome) -> Self {
        match outcome {
            Outcome::LayerExemption => Self::Exempt,
            o if o.is_landing() => Self::Hit,
            _ => Self::Miss,
        }
    }

    fn landed(self) -> bool {
        self == Self::Hit
    }

    fn label(self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Exempt => "EXEMPT",
        }
    }
}

/// Runs audits on demand against an event history.
#[derive(Debug, Clone)]
pub struct AuditManager {
    mode: AuditMode,
    auditor: String,
}

impl AuditManager {
    /// Create a manager signing its events as `Mega`.
    pub fn new(mode: AuditMode) -> Self {
        Self {
            mode,
            auditor: "Mega".into(),
        }
    }

    /// Sign audit events with a different name.
    pub fn with_auditor(mut self, auditor: impl Into<String>) -> Self {
        self.auditor = auditor.into();
        self
    }

    /// The configured mode.
    pub fn mode(&self) -> AuditMode {
        self.mode
    }

    /// Audit the most recent unaudited anomaly in `events`.
    ///
    /// Returns the events to append, in order. An anomaly followed by any
    /// audit record has already been judged, so an immediate second call
    /// yields a single skip. Never fails: nothing to audit, or a target no
    /// longer on the roster, degrade to a skip.
    pub fn evaluate(&self, turn: u32, events: &[Event], roster: &Roster) -> Vec<Event> {
        let found = events
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| e.outcome.is_anomaly() || e.outcome.is_audit_record());

        let (index, audited) = match found {
            Some((index, e)) if e.outcome.is_anomaly() => (index, e),
            Some(_) => return vec![self.skip(turn, "No new anomalies since the last audit.")],
            None => return vec![self.skip(turn, "No recent anomalies detected.")],
        };

        let target = audited.actual_target.as_str();
        let Some(agent) = roster.get(target) else {
            tracing::debug!(turn, target, "audit target not on roster");
            return vec![self.skip(turn, &format!("{target} is not on the roster."))];
        };

        let raw = RawTruth::of(&audited.outcome);
        let mut out = vec![
            self.event(turn, target, Outcome::AuditBegin, format!("Raw: {}", raw.label()))
                .with_note(format!("Auditing event from turn {}.", audited.turn))
                .with_context("audited_turn", audited.turn)
                .with_context("audited_index", index as u64),
        ];

        if agent.is_ontological() {
            tracing::info!(turn, target, "audit vetoed: target in a higher layer");
            out.push(
                self.event(turn, target, Outcome::AuditVerdict, "JURISDICTION_ERROR")
                    .with_note("Target exists in a higher reality layer. Audit rejected.")
                    .with_tag("veto"),
            );
            return out;
        }

        let (verdict, reason) = match self.mode {
            AuditMode::Transparent => (raw.landed(), "Ratified (Transparent)"),
            AuditMode::Stabilize => (true, "Normalized to HIT (Order)"),
            AuditMode::Conditional if raw.landed() => (true, "Ratified (Order Preserved)"),
            AuditMode::Conditional => (true, "Normalized (Chaos Detected)"),
        };
        let verdict_label = if verdict { "HIT" } else { "MISS" };
        tracing::info!(turn, target, mode = %self.mode, verdict = verdict_label, "audit verdict");

        out.push(
            self.event(turn, target, Outcome::AuditVerdict, reason)
                .with_note(format!("Final verdict: {verdict_label}")),
        );

        let apply = if verdict != raw.landed() {
            self.event(turn, target, Outcome::AuditApply, "CANON_CORRECTION")
                .with_note(format!("Reality rewritten: {target} takes the HIT."))
                .with_tag("correction")
        } else {
            self.event(turn, target, Outcome::AuditApply, "RATIFIED")
                .with_note("Reality aligned with canon.")
        };
        out.push(apply.with_rolls(1.0, 0.0, 1.0));
        out
    }

    fn event(&self, turn: u32, target: &str, outcome: Outcome, actual: impl Into<String>) -> Event {
        Event::new(turn, self.auditor.clone(), target, outcome, actual).with_tag("audit")
    }

    fn skip(&self, turn: u32, note: &str) -> Event {
        Event::new(turn, self.auditor.clone(), "Reality", Outcome::AuditSkip, "None")
            .with_note(note)
            .with_tag("audit")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sb_core::{Agent, Frame};

    fn roster() -> Roster {
        Roster::from_agents([
            Agent::new("Ace"),
            Agent::new("Quinn"),
            Agent::new("Kryssie").with_frame(Frame::Ontological),
        ])
    }

    fn ricochet_on(target: &str) -> Event {
        Event::new(2, "Ace", "Janus", Outcome::RicochetHit, target)
    }

    fn outcomes(events: &[Event]) -> Vec<Outcome> {
        events.iter().map(|e| e.outcome.clone()).collect()
    }

    #[test]
    fn empty_history_skips() {
        let out = AuditManager::new(AuditMode::Stabilize).evaluate(1, &[], &roster());
        assert_eq!(outcomes(&out), vec![Outcome::AuditSkip]);
        assert_eq!(out[0].actual_target, "None");
        assert!(out[0].has_tag("audit"));
    }

    #[test]
    fn stabilize_ratifies_a_ricochet_hit() {
        let history = vec![
            Event::new(1, "Ace", "Quinn", Outcome::Hit, "Quinn"),
            ricochet_on("Quinn"),
        ];
        let out = AuditManager::new(AuditMode::Stabilize).evaluate(3, &history, &roster());
        assert_eq!(
            outcomes(&out),
            vec![Outcome::AuditBegin, Outcome::AuditVerdict, Outcome::AuditApply]
        );
        assert_eq!(out[0].actual_target, "Raw: HIT");
        assert_eq!(out[0].context.get("audited_index"), Some(&1.into()));
        assert_eq!(out[1].note, "Final verdict: HIT");
        assert_eq!(out[2].actual_target, "RATIFIED");
    }

    #[test]
    fn stabilize_corrects_a_miss_exemption() {
        // Quinn has since left the ontological layer.
        let history = vec![Event::new(1, "Ace", "Quinn", Outcome::LayerExemption, "Quinn")];
        let out = AuditManager::new(AuditMode::Stabilize).evaluate(2, &history, &roster());
        assert_eq!(out[0].actual_target, "Raw: EXEMPT");
        assert_eq!(out[2].actual_target, "CANON_CORRECTION");
        assert!(out[2].has_tag("correction"));
    }

    #[test]
    fn transparent_ratifies_raw_truth() {
        let history = vec![Event::new(1, "Ace", "Quinn", Outcome::LayerExemption, "Quinn")];
        let out = AuditManager::new(AuditMode::Transparent).evaluate(2, &history, &roster());
        assert_eq!(out[1].actual_target, "Ratified (Transparent)");
        assert_eq!(out[1].note, "Final verdict: MISS");
        assert_eq!(out[2].actual_target, "RATIFIED");
    }

    #[test]
    fn conditional_always_rules_a_hit() {
        let hit = vec![ricochet_on("Quinn")];
        let out = AuditManager::new(AuditMode::Conditional).evaluate(3, &hit, &roster());
        assert_eq!(out[1].actual_target, "Ratified (Order Preserved)");
        assert_eq!(out[2].actual_target, "RATIFIED");

        let exempt = vec![Event::new(1, "Ace", "Quinn", Outcome::LayerExemption, "Quinn")];
        let out = AuditManager::new(AuditMode::Conditional).evaluate(3, &exempt, &roster());
        assert_eq!(out[1].actual_target, "Normalized (Chaos Detected)");
        assert_eq!(out[1].note, "Final verdict: HIT");
        assert_eq!(out[2].actual_target, "CANON_CORRECTION");
    }

    #[test]
    fn ontological_target_is_vetoed() {
        let history = vec![Event::new(1, "Ace", "Kryssie", Outcome::LayerExemption, "Kryssie")];
        for mode in AuditMode::ALL {
            let out = AuditManager::new(mode).evaluate(2, &history, &roster());
            assert_eq!(outcomes(&out), vec![Outcome::AuditBegin, Outcome::AuditVerdict]);
            assert_eq!(out[1].actual_target, "JURISDICTION_ERROR");
            assert!(out[1].has_tag("veto"));
        }
    }

    #[test]
    fn audited_anomaly_is_not_judged_twice() {
        let manager = AuditManager::new(AuditMode::Stabilize);
        let mut history = vec![ricochet_on("Quinn")];
        let first = manager.evaluate(3, &history, &roster());
        history.extend(first);
        let second = manager.evaluate(3, &history, &roster());
        assert_eq!(outcomes(&second), vec![Outcome::AuditSkip]);

        history.push(ricochet_on("Ace"));
        let third = manager.evaluate(4, &history, &roster());
        assert_eq!(third[0].intended_target, "Ace");
    }

    #[test]
    fn missing_target_degrades_to_skip() {
        let history = vec![ricochet_on("Ghost")];
        let out = AuditManager::new(AuditMode::Stabilize).evaluate(3, &history, &roster());
        assert_eq!(outcomes(&out), vec![Outcome::AuditSkip]);
    }

    #[test]
    fn modes_parse_from_names() {
        assert_eq!("Stabilize".parse::<AuditMode>().unwrap(), AuditMode::Stabilize);
        assert!(matches!(
            "chaotic".parse::<AuditMode>(),
            Err(SimError::UnknownAuditMode(_))
        ));
        let signed = AuditManager::new(AuditMode::Conditional)
            .with_auditor("Oracle")
            .evaluate(1, &[], &roster());
        assert_eq!(signed[0].thrower, "Oracle");
    }
}
