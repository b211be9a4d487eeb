use std::collections::HashSet;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{error::RosterError, objects::{event::{ClassSet, EventSnapshot}, participant::{self, Participant}}, types};


const FIELD_PARTICIPANTS: &str = "PARTICIPANTS";
const FIELD_START_INFO: &str = "START_INFO";
const FIELD_CARD: &str = "CARD";
// derived from START_INFO or stamped locally, never taken from the server
const DERIVED_FIELDS: [&str; 3] = ["STARTED", "NOTES", "LAST_MODIFIED"];

/// A participant as the timing service sends it. `START_INFO` packs the
/// started flag into its first character and the notes into the rest.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct RawParticipant {
    #[serde(deserialize_with = "participant::string_or_number")]
    number: String,
    #[serde(default, deserialize_with = "participant::string_or_number")]
    name: String,
    #[serde(default, deserialize_with = "participant::string_or_number")]
    class: String,
    #[serde(deserialize_with = "participant::seconds_of_day")]
    start: i64,
    start_info: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

pub fn normalize_str(body: &str) -> Result<EventSnapshot, RosterError> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| RosterError::MalformedPayload(format!("payload is not json: {e}")))?;
    normalize(&payload)
}

/// Turns a raw roster payload into an event snapshot ready to replace the
/// current one. Nothing is returned unless every record is valid.
pub fn normalize(payload: &Value) -> Result<EventSnapshot, RosterError> {
    let obj = match payload.as_object() {
        Some(obj) => obj,
        None => return Err(RosterError::MalformedPayload(String::from("payload is not an object"))),
    };
    let raw_participants = match obj.get(FIELD_PARTICIPANTS) {
        Some(Value::Array(list)) => list,
        Some(_) => return Err(RosterError::MalformedPayload(String::from("PARTICIPANTS is not an array"))),
        None => return Err(RosterError::MalformedPayload(String::from("PARTICIPANTS is missing"))),
    };
    let mut classes = ClassSet::new();
    let mut seen: HashSet<String> = HashSet::with_capacity(raw_participants.len());
    let mut participants: Vec<Participant> = Vec::with_capacity(raw_participants.len());
    for (ix, raw) in raw_participants.iter().enumerate() {
        let raw: RawParticipant = RawParticipant::deserialize(raw)
            .map_err(|e| RosterError::MalformedPayload(format!("participant {ix}: {e}")))?;
        if !seen.insert(raw.number.clone()) {
            return Err(RosterError::MalformedPayload(format!("duplicate participant number {}", raw.number)));
        }
        // classless participants stay on the roster but never form a class
        if !raw.class.is_empty() {
            classes.insert(&raw.class);
        }
        participants.push(from_raw(raw));
    }
    // stable, so equal start times keep their ingestion order
    participants.sort_by_key(|p| p.start());
    Ok(EventSnapshot {
        day: metadata(obj, "DAY"),
        start: metadata(obj, "START"),
        title: metadata(obj, "TITLE"),
        www_id: metadata(obj, "WWW_ID"),
        count: participants.len(),
        classes,
        session_key: None,
        participants,
    })
}

fn from_raw(raw: RawParticipant) -> Participant {
    let (started, notes) = split_start_info(&raw.start_info);
    let mut extra = raw.extra;
    for field in DERIVED_FIELDS {
        extra.remove(field);
    }
    let card = card_value(extra.remove(FIELD_CARD));
    extra.insert(String::from(FIELD_START_INFO), Value::String(raw.start_info));
    Participant::new(
        raw.number,
        raw.name,
        raw.class,
        raw.start,
        String::from(started),
        notes,
        card,
    ).with_extra(extra)
}

fn card_value(card: Option<Value>) -> String {
    match card {
        Some(Value::String(s)) => s,
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// First character present means the participant already started, the
/// remainder is the note.
pub fn split_start_info(start_info: &str) -> (&'static str, String) {
    let mut chars = start_info.chars();
    match chars.next() {
        Some(_) => (types::STARTED_CHECKED, chars.collect()),
        None => (types::STARTED_NONE, String::new()),
    }
}

fn metadata(obj: &Map<String, Value>, key: &str) -> String {
    match obj.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
