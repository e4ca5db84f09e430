//! Crew-related components: Name, RosterStatus, the health record and its
//! training log.

use std::collections::BTreeMap;

use crewhealth_logic::condition::Condition;
use crewhealth_logic::vitals;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::GeneralSettings;

/// Display name, also the stable identity key for a tracked person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Name {
    pub first: String,
    pub last: String,
}

impl Name {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// Parse a full name, splitting at the last space. A single token
    /// becomes a first name with an empty last name.
    pub fn parse(full: &str) -> Self {
        match full.rsplit_once(' ') {
            Some((first, last)) => Self::new(first, last),
            None => Self::new(full, ""),
        }
    }

    pub fn full(&self) -> String {
        if self.last.is_empty() {
            self.first.clone()
        } else {
            format!("{} {}", self.first, self.last)
        }
    }
}

/// Where the person stands in the roster. Tracking starts when a person
/// first becomes Assigned or Available and ends when they are recovered for
/// good or reaped after death.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RosterStatus {
    /// Serving aboard a location (or on EVA from one).
    Assigned,
    /// Idle at the base facility.
    Available,
}

/// Per-module training progress, keyed by the module's persistent id so it
/// survives the module moving between locations. The module itself is only
/// ever looked up, never owned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingLog {
    pub entries: BTreeMap<u32, f64>,
}

impl TrainingLog {
    pub fn progress(&self, module_id: u32) -> f64 {
        self.entries.get(&module_id).copied().unwrap_or(0.0)
    }

    pub fn set_progress(&mut self, module_id: u32, progress: f64) {
        self.entries.insert(module_id, progress);
    }
}

/// The mutable per-person health record.
///
/// `hp` is kept in `[MIN_HP, max_hp]` by every mutation; the cached change
/// fields hold the last live computation for ticks where the person cannot
/// be simulated directly (unloaded vessel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewHealth {
    pub hp: f64,
    pub condition: Condition,
    /// Current working role; swapped out while exhausted.
    pub role: String,
    pub experience_level: u8,
    pub on_eva: bool,
    /// Lifetime accumulated radiation dose.
    pub dose: f64,
    /// True while undergoing decontamination at the base facility.
    pub decontaminating: bool,
    /// Cached net linear HP change per day from the last live computation.
    pub last_change: f64,
    /// Cached marginal recuperation, percent per day.
    pub last_marginal_positive: f64,
    /// Cached marginal decay, percent per day.
    pub last_marginal_negative: f64,
    pub training: TrainingLog,
}

impl CrewHealth {
    /// Fresh record at full health.
    pub fn new(role: impl Into<String>, experience_level: u8, general: &GeneralSettings) -> Self {
        let mut record = Self {
            hp: 0.0,
            condition: Condition::Ok,
            role: role.into(),
            experience_level,
            on_eva: false,
            dose: 0.0,
            decontaminating: false,
            last_change: 0.0,
            last_marginal_positive: 0.0,
            last_marginal_negative: 0.0,
            training: TrainingLog::default(),
        };
        record.hp = record.max_hp(general);
        record
    }

    /// Maximum HP at the current experience level. Derived, never cached.
    pub fn max_hp(&self, general: &GeneralSettings) -> f64 {
        vitals::max_hp(general.base_max_hp, general.hp_per_level, self.experience_level)
    }

    /// Current health as a fraction of the full range.
    pub fn health(&self, general: &GeneralSettings) -> f64 {
        vitals::health_fraction(self.hp, self.max_hp(general))
    }

    /// Set HP, clamping into the valid range.
    pub fn set_hp(&mut self, hp: f64, general: &GeneralSettings) {
        self.hp = vitals::clamp_hp(hp, self.max_hp(general));
    }

    /// Net HP change per day from the cached linear change plus the
    /// marginal term evaluated at the current HP.
    pub fn change_per_day(&self, general: &GeneralSettings) -> f64 {
        self.last_change
            + vitals::marginal_change(
                self.hp,
                self.max_hp(general),
                self.last_marginal_positive,
                self.last_marginal_negative,
            )
    }

    /// Seconds until HP reaches `target` at the current net change, NaN
    /// ("never") when the rate is zero or points away from the target. A
    /// linear projection — the marginal term is frozen at its current
    /// value, so long-range estimates drift when marginal effects dominate.
    pub fn time_to_value(&self, target: f64, general: &GeneralSettings) -> f64 {
        vitals::time_to_value(self.hp, target, self.change_per_day(general))
    }

    /// HP level where marginal recuperation balances decay plus the flat
    /// change; 0 when the drift is monotonic.
    pub fn balance_hp(&self, general: &GeneralSettings) -> f64 {
        vitals::balance_hp(
            self.max_hp(general),
            self.last_change,
            self.last_marginal_positive,
            self.last_marginal_negative,
        )
    }

    /// The next condition threshold this person is drifting toward.
    pub fn next_condition_hp(&self, general: &GeneralSettings) -> f64 {
        crewhealth_logic::condition::next_threshold_hp(
            &self.condition,
            self.change_per_day(general),
            self.max_hp(general),
            &general.thresholds(),
        )
    }

    /// Seconds until the next condition transition, NaN for "never".
    pub fn time_to_next_condition(&self, general: &GeneralSettings) -> f64 {
        self.time_to_value(self.next_condition_hp(general), general)
    }

    /// Flatten the record into a key→value document for an external
    /// savegame surface. Zero-valued cache fields are omitted, matching the
    /// load-side defaults.
    pub fn to_document(&self, name: &str) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert("name".into(), Value::String(name.to_string()));
        doc.insert("hp".into(), json_f64(self.hp));
        let condition = match &self.condition {
            Condition::Ok => "OK",
            Condition::Exhausted { .. } => "Exhausted",
            Condition::Dead => "Dead",
        };
        doc.insert("condition".into(), Value::String(condition.to_string()));
        if let Condition::Exhausted { prior_role } = &self.condition {
            doc.insert("trait".into(), Value::String(prior_role.clone()));
        }
        if self.last_change != 0.0 {
            doc.insert("lastChange".into(), json_f64(self.last_change));
        }
        if self.last_marginal_positive != 0.0 {
            doc.insert(
                "lastMarginalPositiveChange".into(),
                json_f64(self.last_marginal_positive),
            );
        }
        if self.last_marginal_negative != 0.0 {
            doc.insert(
                "lastMarginalNegativeChange".into(),
                json_f64(self.last_marginal_negative),
            );
        }
        if self.dose != 0.0 {
            doc.insert("dose".into(), json_f64(self.dose));
        }
        if self.on_eva {
            doc.insert("onEva".into(), Value::Bool(true));
        }
        doc
    }

    /// Rebuild a record from a flat document. Missing or malformed numeric
    /// fields default to zero, flags to false; the record is re-clamped
    /// against the configured pool.
    pub fn from_document(
        doc: &Map<String, Value>,
        role: impl Into<String>,
        experience_level: u8,
        general: &GeneralSettings,
    ) -> (String, Self) {
        let name = doc
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let condition = match doc.get("condition").and_then(Value::as_str) {
            Some("Exhausted") => Condition::Exhausted {
                prior_role: doc
                    .get("trait")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
            },
            Some("Dead") => Condition::Dead,
            _ => Condition::Ok,
        };
        let mut record = Self {
            hp: 0.0,
            condition,
            role: role.into(),
            experience_level,
            on_eva: doc.get("onEva").and_then(Value::as_bool).unwrap_or(false),
            dose: doc_f64(doc, "dose"),
            decontaminating: false,
            last_change: doc_f64(doc, "lastChange"),
            last_marginal_positive: doc_f64(doc, "lastMarginalPositiveChange"),
            last_marginal_negative: doc_f64(doc, "lastMarginalNegativeChange"),
            training: TrainingLog::default(),
        };
        record.set_hp(doc_f64(doc, "hp"), general);
        (name, record)
    }
}

fn json_f64(v: f64) -> Value {
    serde_json::Number::from_f64(v)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

fn doc_f64(doc: &Map<String, Value>, key: &str) -> f64 {
    doc.get(key).and_then(Value::as_f64).unwrap_or(0.0)
}
