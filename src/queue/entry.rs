use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::QueueError;

/// Store-assigned entry identifier. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntryId {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(EntryId)
            .map_err(|_| QueueError::Validation(format!("Invalid id: '{s}'")))
    }
}

impl Serialize for EntryId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.0)
    }
}

// Clients send ids either as numbers or as the stringified number they kept from `add`.
impl<'de> Deserialize<'de> for EntryId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(EntryId(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Topic {
    Assignments,
    Concepts,
    Grading,
    Mbed,
    Other,
}

impl FromStr for Topic {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Assignments" => Ok(Topic::Assignments),
            "Concepts" => Ok(Topic::Concepts),
            "Grading" => Ok(Topic::Grading),
            "Mbed" => Ok(Topic::Mbed),
            "Other" => Ok(Topic::Other),
            _ => Err(QueueError::Validation(format!("Invalid topic: '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    InPerson,
    Online,
}

impl Location {
    pub fn is_in_person(self) -> bool {
        self == Location::InPerson
    }
}

impl FromStr for Location {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN_PERSON" => Ok(Location::InPerson),
            "ONLINE" => Ok(Location::Online),
            _ => Err(QueueError::Validation(format!("Invalid location: '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Queue,
    InProgress,
    Done,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Queue => "Queue",
            Status::InProgress => "In Progress",
            Status::Done => "Done",
        }
    }

    pub fn is_waiting(self) -> bool {
        self == Status::Queue
    }
}

impl FromStr for Status {
    type Err = QueueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Queue" => Ok(Status::Queue),
            "In Progress" | "InProgress" | "In_Progress" => Ok(Status::InProgress),
            "Done" => Ok(Status::Done),
            _ => Err(QueueError::Validation(format!("Invalid status: '{s}'"))),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One student's help request as held by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: EntryId,
    pub name: String,
    pub section: String,
    pub topic: Topic,
    pub location: Location,
    pub joined_at: DateTime<Utc>,
    pub status: Status,
}

/// Wire shape of an entry. `location` is exposed as the `inPerson` flag.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryView {
    pub id: EntryId,
    pub name: String,
    pub section: String,
    pub topic: Topic,
    pub in_person: bool,
    pub joined_at: DateTime<Utc>,
    pub status: Status,
}

impl From<QueueEntry> for EntryView {
    fn from(entry: QueueEntry) -> Self {
        EntryView {
            id: entry.id,
            name: entry.name,
            section: entry.section,
            topic: entry.topic,
            in_person: entry.location.is_in_person(),
            joined_at: entry.joined_at,
            status: entry.status,
        }
    }
}

/// Validated input for `QueueStore::add`.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub name: String,
    pub section: String,
    pub topic: Topic,
    pub location: Location,
}

pub const MAX_TEXT_LEN: usize = 200;

impl NewEntry {
    /// Validates raw client fields. Text fields are trimmed before the emptiness check.
    pub fn parse(name: &str, section: &str, topic: &str, location: &str) -> Result<Self, QueueError> {
        Ok(NewEntry {
            name: required_text("name", name)?,
            section: required_text("section", section)?,
            topic: required_enum("topic", topic)?,
            location: required_enum("location", location)?,
        })
    }
}

fn required_text(field: &str, value: &str) -> Result<String, QueueError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(QueueError::Validation(format!("Missing required field: {field}")));
    }
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(QueueError::Validation(format!(
            "Field too long: {field} (max {MAX_TEXT_LEN} characters)"
        )));
    }
    Ok(value.to_string())
}

fn required_enum<T: FromStr<Err = QueueError>>(field: &str, value: &str) -> Result<T, QueueError> {
    if value.trim().is_empty() {
        return Err(QueueError::Validation(format!("Missing required field: {field}")));
    }
    value.parse()
}
