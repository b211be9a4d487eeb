use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::types;

/// A single entry on the start list, identified by its bib `NUMBER`.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Participant {
    #[serde(deserialize_with = "string_or_number")]
    number: String,
    #[serde(default, deserialize_with = "string_or_number")]
    name: String,
    #[serde(default, deserialize_with = "string_or_number")]
    class: String,
    #[serde(deserialize_with = "seconds_of_day")]
    start: i64,
    #[serde(default)]
    started: String,
    #[serde(default)]
    notes: String,
    #[serde(default, deserialize_with = "string_or_number")]
    card: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_modified: Option<DateTime<Utc>>,
    // anything else the timing service sent along rides through untouched
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Operator edits applied by `RosterStore::mutate`. Fields left as `None`
/// keep their current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldUpdates {
    pub started: Option<bool>,
    pub notes: Option<String>,
    pub card: Option<String>,
}

impl FieldUpdates {
    pub fn started(started: bool) -> FieldUpdates {
        FieldUpdates { started: Some(started), ..Default::default() }
    }

    pub fn notes(notes: &str) -> FieldUpdates {
        FieldUpdates { notes: Some(String::from(notes)), ..Default::default() }
    }

    pub fn card(card: &str) -> FieldUpdates {
        FieldUpdates { card: Some(String::from(card)), ..Default::default() }
    }
}

impl Participant {
    pub fn new(
        number: String,
        name: String,
        class: String,
        start: i64,
        started: String,
        notes: String,
        card: String,
    ) -> Participant {
        Participant {
            number,
            name,
            class,
            start,
            started,
            notes,
            card,
            last_modified: None,
            extra: Map::new(),
        }
    }

    pub(crate) fn with_extra(mut self, extra: Map<String, Value>) -> Participant {
        self.extra = extra;
        self
    }

    pub fn apply(&mut self, updates: &FieldUpdates, now: DateTime<Utc>) {
        if let Some(started) = updates.started {
            self.started = String::from(if started { types::STARTED_CHECKED } else { types::STARTED_NONE });
        }
        if let Some(notes) = &updates.notes {
            self.notes = notes.clone();
        }
        if let Some(card) = &updates.card {
            self.card = card.clone();
        }
        self.last_modified = Some(now);
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn start(&self) -> i64 {
        self.start
    }

    pub fn started(&self) -> &str {
        &self.started
    }

    pub fn is_started(&self) -> bool {
        self.started == types::STARTED_CHECKED
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn card(&self) -> &str {
        &self.card
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn extra(&self) -> &Map<String, Value> {
        &self.extra
    }
}

/// Bib numbers and card numbers arrive as either JSON strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!("expected string or number, found {other}"))),
    }
}

/// Start times are seconds-of-day, sometimes sent as numeric strings.
pub(crate) fn seconds_of_day<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Number(n) => match n.as_i64() {
            Some(v) => Ok(v),
            None => match n.as_f64() {
                Some(f) => Ok(f.trunc() as i64),
                None => Err(serde::de::Error::custom("start time out of range")),
            },
        },
        Value::String(s) => s.trim().parse::<i64>()
            .map_err(|e| serde::de::Error::custom(format!("invalid start time '{s}': {e}"))),
        other => Err(serde::de::Error::custom(format!("expected start seconds, found {other}"))),
    }
}
