//! Job records as stored by the queue backend, plus the tags the finder adds.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Key holding the job's class name.
pub const CLASS_KEY: &str = "class";
/// Key holding the category tag.
pub const WHERE_AT_KEY: &str = "where_at";
/// Key holding the delayed bucket timestamp.
pub const TIMESTAMP_KEY: &str = "timestamp";
/// Key holding the queue name.
pub const QUEUE_KEY: &str = "queue";

/// Which collection a matched job was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WhereAt {
    Working,
    Delayed,
    Queued,
}

impl WhereAt {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Working => "working",
            Self::Delayed => "delayed",
            Self::Queued => "queued",
        }
    }
}

impl fmt::Display for WhereAt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key of a delayed-job bucket (Unix seconds in the Resque encoding).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn new(secs: i64) -> Self {
        Self(secs)
    }

    pub fn as_secs(self) -> i64 {
        self.0
    }

    /// Calendar time of the bucket, if representable.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.0, 0).single()
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(at: DateTime<Utc>) -> Self {
        Self(at.timestamp())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job payload: string keys to JSON values, with at least a `class`.
///
/// The backend owns the payload shape; this type only reads `class` and adds
/// tags, never rewriting fields that came from the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Job(Map<String, Value>);

impl Job {
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Convenience constructor for a payload carrying only a class name.
    pub fn with_class(class: impl Into<String>) -> Self {
        let mut fields = Map::new();
        fields.insert(CLASS_KEY.to_string(), Value::String(class.into()));
        Self(fields)
    }

    /// Builder-style field insertion, used when assembling payloads.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The job's class name, if present and a string.
    pub fn class_name(&self) -> Option<&str> {
        self.0.get(CLASS_KEY).and_then(Value::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn where_at(&self) -> Option<&str> {
        self.get(WHERE_AT_KEY).and_then(Value::as_str)
    }

    /// A new record: the original fields plus the category tag and `extra`.
    pub fn tagged<I, K>(&self, where_at: WhereAt, extra: I) -> Job
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut fields = self.0.clone();
        fields.insert(WHERE_AT_KEY.to_string(), Value::String(where_at.as_str().to_string()));
        for (key, value) in extra {
            fields.insert(key.into(), value);
        }
        Job(fields)
    }
}

impl TryFrom<Value> for Job {
    type Error = Value;

    /// Accepts JSON objects only; anything else is handed back.
    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tagging_builds_a_new_record() {
        let original = Job::with_class("SendEmail").with_field("args", json!([1, 2]));
        let tagged = original.tagged(WhereAt::Queued, [(QUEUE_KEY, json!("mailers"))]);

        assert_eq!(original.where_at(), None);
        assert_eq!(
            serde_json::to_value(&tagged).unwrap(),
            json!({"class": "SendEmail", "args": [1, 2], "queue": "mailers", "where_at": "queued"})
        );
    }

    #[test]
    fn class_must_be_a_string() {
        let job = Job::new().with_field(CLASS_KEY, 42);
        assert_eq!(job.class_name(), None);
    }

    #[test]
    fn only_objects_convert_into_jobs() {
        assert!(Job::try_from(json!({"class": "Cleanup"})).is_ok());
        assert_eq!(Job::try_from(json!("Cleanup")), Err(json!("Cleanup")));
    }

    #[test]
    fn timestamp_serializes_as_integer() {
        let ts = Timestamp::new(1_700_000_000);
        assert_eq!(serde_json::to_value(ts).unwrap(), json!(1_700_000_000));
        assert_eq!(ts.to_datetime().map(Timestamp::from), Some(ts));
    }
}
