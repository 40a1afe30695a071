use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What an event records. A closed set; dyad effects carry their own label.
///
/// Serialised as a bare upper-case string (`"HIT"`, `"AUDIT_VERDICT"`, or a
/// dyad label such as `"PATTERN_LOCK"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Outcome {
    /// A throw landed on its target.
    Hit,
    /// A throw missed and nothing else happened.
    Miss,
    /// A missed throw bounced onto someone else.
    RicochetHit,
    /// One strike of an area-mode volley.
    SnowNetHit,
    /// The target spent budget to block the throw.
    Untouchable,
    /// The throw or ricochet was directed at an ontological-frame agent.
    LayerExemption,
    /// The thrower abstained and raised its dodge bonus.
    BeerSip,
    /// Area mode was summoned.
    WeaverDescends,
    /// A dyad redirected the throw onto a new target.
    TwinRescue,
    /// Nobody was eligible to throw or be thrown at.
    Idle,
    /// Prologue: a paradox deflection.
    Paradox,
    /// Prologue: the truce that opens a run.
    Diplomacy,
    /// An escalation state activated.
    EscalationRelease,
    /// An escalation state ended.
    EscalationFade,
    /// The fusion state activated.
    FusionRelease,
    /// The fusion state ended.
    FusionFade,
    /// An audit found nothing new to judge.
    AuditSkip,
    /// An audit started and recorded the raw truth.
    AuditBegin,
    /// An audit's decision, or a jurisdiction veto.
    AuditVerdict,
    /// How the audit's decision lands: ratified or a canon correction.
    AuditApply,
    /// A dyad-specific effect.
    Synergy(String),
}

impl Outcome {
    const NAMED: &'static [(&'static str, Outcome)] = &[
        ("HIT", Outcome::Hit),
        ("MISS", Outcome::Miss),
        ("RICOCHET_HIT", Outcome::RicochetHit),
        ("SNOW_NET_HIT", Outcome::SnowNetHit),
        ("UNTOUCHABLE", Outcome::Untouchable),
        ("LAYER_EXEMPTION", Outcome::LayerExemption),
        ("BEER_SIP", Outcome::BeerSip),
        ("WEAVER_DESCENDS", Outcome::WeaverDescends),
        ("TWIN_RESCUE", Outcome::TwinRescue),
        ("IDLE", Outcome::Idle),
        ("PARADOX", Outcome::Paradox),
        ("DIPLOMACY", Outcome::Diplomacy),
        ("ESCALATION_RELEASE", Outcome::EscalationRelease),
        ("ESCALATION_FADE", Outcome::EscalationFade),
        ("FUSION_RELEASE", Outcome::FusionRelease),
        ("FUSION_FADE", Outcome::FusionFade),
        ("AUDIT_SKIP", Outcome::AuditSkip),
        ("AUDIT_BEGIN", Outcome::AuditBegin),
        ("AUDIT_VERDICT", Outcome::AuditVerdict),
        ("AUDIT_APPLY", Outcome::AuditApply),
    ];

    /// Parse an outcome label. Unknown labels become [`Outcome::Synergy`].
    pub fn parse(label: &str) -> Self {
        Self::NAMED
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| Self::Synergy(label.to_string()))
    }

    /// Anomalies are what the audit layer looks for.
    pub fn is_anomaly(&self) -> bool {
        matches!(self, Self::RicochetHit | Self::LayerExemption)
    }

    /// Records written by the audit layer itself.
    pub fn is_audit_record(&self) -> bool {
        matches!(
            self,
            Self::AuditSkip | Self::AuditBegin | Self::AuditVerdict | Self::AuditApply
        )
    }

    /// Outcomes that resolve a throw against the `actual_target`.
    pub fn resolves_against_target(&self) -> bool {
        matches!(
            self,
            Self::Hit | Self::Miss | Self::RicochetHit | Self::SnowNetHit
        )
    }

    /// Outcomes that count as landing on the `actual_target`.
    pub fn is_landing(&self) -> bool {
        matches!(self, Self::Hit | Self::RicochetHit | Self::SnowNetHit)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Self::Synergy(label) = self {
            return write!(f, "{label}");
        }
        let name = Self::NAMED
            .iter()
            .find(|(_, outcome)| outcome == self)
            .map(|(name, _)| *name)
            .unwrap_or("UNKNOWN");
        write!(f, "{name}")
    }
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.to_string()
    }
}

impl From<String> for Outcome {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

/// One immutable record in the ledger.
///
/// Events are built with the `with_*` methods and then handed to the ledger,
/// which never gives out mutable access again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Turn index; 0 for prologue events.
    pub turn: u32,
    /// Who acted.
    pub thrower: String,
    /// Who the action was aimed at.
    pub intended_target: String,
    /// What happened.
    pub outcome: Outcome,
    /// Who it actually resolved against (or a label for non-throw events).
    pub actual_target: String,
    /// Free-text detail.
    pub note: String,
    /// The uniform draw used for the hit check.
    pub roll_hit: f64,
    /// The uniform draw used for the ricochet check.
    pub roll_ricochet: f64,
    /// The hit probability the roll was compared against.
    pub hit_probability: f64,
    /// Classification labels.
    pub tags: BTreeSet<String>,
    /// Open key-value context.
    pub context: BTreeMap<String, Value>,
}

impl Event {
    /// Create an event with zeroed rolls and no note, tags, or context.
    pub fn new(
        turn: u32,
        thrower: impl Into<String>,
        intended_target: impl Into<String>,
        outcome: Outcome,
        actual_target: impl Into<String>,
    ) -> Self {
        Self {
            turn,
            thrower: thrower.into(),
            intended_target: intended_target.into(),
            outcome,
            actual_target: actual_target.into(),
            note: String::new(),
            roll_hit: 0.0,
            roll_ricochet: 0.0,
            hit_probability: 0.0,
            tags: BTreeSet::new(),
            context: BTreeMap::new(),
        }
    }

    /// Set the note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    /// Set both rolls and the hit probability.
    pub fn with_rolls(mut self, roll_hit: f64, roll_ricochet: f64, hit_probability: f64) -> Self {
        self.roll_hit = roll_hit;
        self.roll_ricochet = roll_ricochet;
        self.hit_probability = hit_probability;
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add several tags.
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Add one context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Merge a context map; existing keys win.
    pub fn with_context_map(mut self, context: &BTreeMap<String, Value>) -> Self {
        for (key, value) in context {
            self.context
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        self
    }

    /// Whether the event carries a tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Whether the named agent appears as thrower, intended, or actual target.
    pub fn involves(&self, name: &str) -> bool {
        self.thrower == name || self.intended_target == name || self.actual_target == name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_labels_round_trip() {
        for (label, outcome) in Outcome::NAMED {
            assert_eq!(outcome.to_string(), *label);
            assert_eq!(Outcome::parse(label), *outcome);
        }
    }

    #[test]
    fn unknown_labels_are_synergy_effects() {
        let outcome = Outcome::parse("PATTERN_LOCK");
        assert_eq!(outcome, Outcome::Synergy("PATTERN_LOCK".into()));
        assert_eq!(outcome.to_string(), "PATTERN_LOCK");
    }

    #[test]
    fn outcome_serialises_as_bare_string() {
        let json = serde_json::to_string(&Outcome::RicochetHit).unwrap();
        assert_eq!(json, "\"RICOCHET_HIT\"");
        let back: Outcome = serde_json::from_str("\"AUDIT_APPLY\"").unwrap();
        assert_eq!(back, Outcome::AuditApply);
    }

    #[test]
    fn classification() {
        assert!(Outcome::RicochetHit.is_anomaly());
        assert!(Outcome::LayerExemption.is_anomaly());
        assert!(!Outcome::Hit.is_anomaly());
        assert!(Outcome::AuditSkip.is_audit_record());
        assert!(Outcome::Miss.resolves_against_target());
        assert!(!Outcome::Miss.is_landing());
        assert!(Outcome::SnowNetHit.is_landing());
    }

    #[test]
    fn builder_collects_tags_and_context() {
        let event = Event::new(3, "Ace", "Mega", Outcome::Hit, "Mega")
            .with_note("clean")
            .with_rolls(0.1, 0.9, 0.6)
            .with_tags(["b", "a"])
            .with_context("area_mode_active", false);
        assert!(event.has_tag("a"));
        assert_eq!(event.tags.iter().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(event.context["area_mode_active"], Value::Bool(false));
        assert!(event.involves("Mega"));
        assert!(!event.involves("Quinn"));
    }

    #[test]
    fn context_map_does_not_override_existing_keys() {
        let mut base = BTreeMap::new();
        base.insert("k".to_string(), Value::from(1));
        base.insert("other".to_string(), Value::from(2));
        let event = Event::new(1, "A", "B", Outcome::Miss, "B")
            .with_context("k", 9)
            .with_context_map(&base);
        assert_eq!(event.context["k"], Value::from(9));
        assert_eq!(event.context["other"], Value::from(2));
    }
}
