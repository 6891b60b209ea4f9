//! Resource records shared across the API and seed binaries.

mod object_id;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Number, Value};
use strum_macros::{AsRefStr, Display, IntoStaticStr};

use crate::schema::{require_text, SchemaError};

pub use object_id::{ObjectId, ObjectIdError, OBJECT_ID_LEN};

/// The three resource collections exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum ResourceKind {
    User,
    Exercise,
    Workout,
}

impl ResourceKind {
    /// Capitalized label used in client-facing messages.
    pub fn title(self) -> &'static str {
        match self {
            ResourceKind::User => "User",
            ResourceKind::Exercise => "Exercise",
            ResourceKind::Workout => "Workout",
        }
    }

    /// Collection name the store files documents under.
    pub fn collection(self) -> &'static str {
        match self {
            ResourceKind::User => "users",
            ResourceKind::Exercise => "exercises",
            ResourceKind::Workout => "workouts",
        }
    }
}

/// Field set of a storable resource plus its static schema metadata.
pub trait Resource:
    Serialize + DeserializeOwned + Clone + PartialEq + fmt::Debug + Send + Sync + 'static
{
    const KIND: ResourceKind;

    /// Field names a partial update may target.
    const FIELDS: &'static [&'static str];

    /// Key a single-record read is wrapped under, if any.
    const ENVELOPE: Option<&'static str> = None;

    /// Checks required-field rules serde cannot express (e.g. non-empty text).
    fn check_required(&self) -> Result<(), SchemaError> {
        Ok(())
    }
}

/// A stored record: identifier, resource fields and display-only revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "R: Resource")]
pub struct Document<R> {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub fields: R,
    #[serde(rename = "__v", default)]
    pub revision: i64,
}

impl<R: Resource> Document<R> {
    pub fn new(id: ObjectId, fields: R) -> Self {
        Self {
            id,
            fields,
            revision: 0,
        }
    }
}

// Passwords are stored exactly as supplied; credential handling is out of scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<Number>,
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;
    const FIELDS: &'static [&'static str] = &["username", "password", "weight"];
    const ENVELOPE: Option<&'static str> = Some("user");

    fn check_required(&self) -> Result<(), SchemaError> {
        require_text("username", &self.username)?;
        require_text("password", &self.password)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub exercise_name: String,
    #[serde(rename = "bodyweightBoolean")]
    pub bodyweight: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sets: Option<Number>,
    #[serde(default)]
    pub reps: Vec<Number>,
    #[serde(default)]
    pub weights: Vec<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(rename = "finishedBoolean")]
    pub finished: bool,
    #[serde(
        rename = "strengthScore",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub strength_score: Option<Number>,
}

impl Resource for Exercise {
    const KIND: ResourceKind = ResourceKind::Exercise;
    const FIELDS: &'static [&'static str] = &[
        "exercise_name",
        "bodyweightBoolean",
        "suggestions",
        "sets",
        "reps",
        "weights",
        "notes",
        "finishedBoolean",
        "strengthScore",
    ];

    fn check_required(&self) -> Result<(), SchemaError> {
        require_text("exercise_name", &self.exercise_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    #[serde(with = "iso_date", default = "Utc::now")]
    pub date: DateTime<Utc>,
    pub workout_name: String,
    /// Exercise references are kept exactly as supplied.
    pub exercises: Vec<Value>,
    #[serde(rename = "finishedBoolean")]
    pub finished: bool,
}

impl Resource for Workout {
    const KIND: ResourceKind = ResourceKind::Workout;
    const FIELDS: &'static [&'static str] =
        &["date", "workout_name", "exercises", "finishedBoolean"];

    fn check_required(&self) -> Result<(), SchemaError> {
        require_text("workout_name", &self.workout_name)
    }
}

/// Millisecond ISO-8601 timestamps on output; RFC 3339 or bare dates on input.
pub mod iso_date {
    use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid date `{raw}`")))
    }

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }
}
