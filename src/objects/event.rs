use std::fmt;

use serde::{de::{MapAccess, Visitor}, ser::SerializeMap, Deserialize, Deserializer, Serialize, Serializer};

use super::participant::Participant;

/// The whole persisted document: event metadata plus the roster. It is
/// always read and written as one unit.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EventSnapshot {
    #[serde(default)]
    pub day: String,
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub www_id: String,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub classes: ClassSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_key: Option<String>,
    #[serde(default)]
    pub participants: Vec<Participant>,
}

impl EventSnapshot {
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn participant(&self, number: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.number() == number)
    }
}

/// Distinct class labels in the order they were first seen. Stored in the
/// document as an object of `label: 1` pairs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClassSet {
    labels: Vec<String>,
}

impl ClassSet {
    pub fn new() -> ClassSet {
        ClassSet { labels: Vec::new() }
    }

    /// Returns false if the label was already present.
    pub fn insert(&mut self, label: &str) -> bool {
        if self.contains(label) {
            return false;
        }
        self.labels.push(String::from(label));
        true
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l == label)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|l| l.as_str())
    }
}

impl Serialize for ClassSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.labels.len()))?;
        for label in &self.labels {
            map.serialize_entry(label, &1)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ClassSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ClassSetVisitor;

        impl<'de> Visitor<'de> for ClassSetVisitor {
            type Value = ClassSet;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                write!(f, "an object keyed by class label")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ClassSet, A::Error> {
                let mut output = ClassSet::new();
                while let Some((label, _)) = access.next_entry::<String, serde::de::IgnoredAny>()? {
                    output.insert(&label);
                }
                Ok(output)
            }
        }

        deserializer.deserialize_map(ClassSetVisitor)
    }
}
