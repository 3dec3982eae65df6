//! Canonical statistic types produced by an aggregation sweep.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::platforms::FallbackRecord;

/// Display text for a field with neither a fallback nor an extracted value.
pub const PLACEHOLDER: &str = "-";

/// Canonical statistic fields every platform result carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatField {
    QuestionsSolved,
    Rank,
    Contests,
}

impl StatField {
    pub const ALL: [StatField; 3] = [
        StatField::QuestionsSolved,
        StatField::Rank,
        StatField::Contests,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StatField::QuestionsSolved => "questionsSolved",
            StatField::Rank => "rank",
            StatField::Contests => "contests",
        }
    }
}

impl std::fmt::Display for StatField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single statistic value: a number, free text, or the placeholder marker.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StatValue {
    Number(serde_json::Number),
    Text(String),
    #[default]
    Placeholder,
}

impl StatValue {
    /// Convert an extracted JSON value into a stat value.
    ///
    /// `null` yields `None`: it never overrides a fallback. Booleans become
    /// their string form and containers are kept as compact JSON text.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::Number(n) => Some(StatValue::Number(n.clone())),
            serde_json::Value::String(s) => Some(StatValue::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(StatValue::Text(b.to_string())),
            other @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
                Some(StatValue::Text(other.to_string()))
            }
        }
    }

    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, StatValue::Placeholder)
    }
}

impl From<i64> for StatValue {
    fn from(n: i64) -> Self {
        StatValue::Number(n.into())
    }
}

impl From<&str> for StatValue {
    fn from(s: &str) -> Self {
        StatValue::Text(s.to_string())
    }
}

impl std::fmt::Display for StatValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatValue::Number(n) => write!(f, "{n}"),
            StatValue::Text(s) => f.write_str(s),
            StatValue::Placeholder => f.write_str(PLACEHOLDER),
        }
    }
}

impl Serialize for StatValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StatValue::Number(n) => n.serialize(serializer),
            StatValue::Text(s) => serializer.serialize_str(s),
            StatValue::Placeholder => serializer.serialize_str(PLACEHOLDER),
        }
    }
}

impl<'de> Deserialize<'de> for StatValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(serde_json::Number),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => StatValue::Number(n),
            Raw::Text(s) if s == PLACEHOLDER => StatValue::Placeholder,
            Raw::Text(s) => StatValue::Text(s),
        })
    }
}

/// Canonical per-platform result of one sweep.
///
/// Every field always holds a value: the fallback, an extracted override, or
/// the placeholder. `error` is informational and never clears field values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformResult {
    pub questions_solved: StatValue,
    pub rank: StatValue,
    pub contests: StatValue,
    pub error: Option<String>,
}

impl PlatformResult {
    /// Seed a result from a fallback record, with no error.
    #[must_use]
    pub fn seeded(fallback: &FallbackRecord) -> Self {
        Self {
            questions_solved: fallback.get(StatField::QuestionsSolved),
            rank: fallback.get(StatField::Rank),
            contests: fallback.get(StatField::Contests),
            error: None,
        }
    }

    #[must_use]
    pub fn get(&self, field: StatField) -> &StatValue {
        match field {
            StatField::QuestionsSolved => &self.questions_solved,
            StatField::Rank => &self.rank,
            StatField::Contests => &self.contests,
        }
    }

    pub fn set(&mut self, field: StatField, value: StatValue) {
        match field {
            StatField::QuestionsSolved => self.questions_solved = value,
            StatField::Rank => self.rank = value,
            StatField::Contests => self.contests = value,
        }
    }
}

/// The complete `name -> PlatformResult` mapping produced by one sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AchievementStats {
    results: BTreeMap<String, PlatformResult>,
}

impl AchievementStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, result: PlatformResult) {
        self.results.insert(name.into(), result);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&PlatformResult> {
        self.results.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PlatformResult)> {
        self.results.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of platforms whose result carries an error.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.results.values().filter(|r| r.error.is_some()).count()
    }

    /// Keep only the named platforms.
    #[must_use]
    pub fn retain_names<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let results = names
            .into_iter()
            .filter_map(|name| {
                self.results
                    .get(name)
                    .map(|r| (name.to_string(), r.clone()))
            })
            .collect();
        Self { results }
    }
}

impl FromIterator<(String, PlatformResult)> for AchievementStats {
    fn from_iter<T: IntoIterator<Item = (String, PlatformResult)>>(iter: T) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
