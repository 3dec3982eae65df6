//! Path expressions addressing values inside arbitrary JSON bodies.
//!
//! A path is a dot-separated list of segments. A plain segment indexes an
//! object field; `name[N]` indexes field `name` and then element `N` of the
//! resulting array (repeated suffixes such as `name[0][2]` index successively).
//! Segments that do not fit that grammar are taken literally as field names.
//!
//! Evaluation never fails: anything that cannot be resolved, including JSON
//! `null`, is reported as `None`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static INDEXED_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\w+)((?:\[\d+\])+)$").expect("valid indexed segment regex"));

static INDEX_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("valid index suffix regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Object field access. On an array, a numeric name indexes the array.
    Field(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    steps: Vec<Step>,
}

impl PathExpr {
    /// Parse a path expression. Returns `None` for an empty or blank path.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        if path.trim().is_empty() {
            return None;
        }

        // Single plain field: no splitting or suffix parsing needed.
        if !path.contains('.') && !path.contains('[') {
            return Some(Self {
                steps: vec![Step::Field(path.to_string())],
            });
        }

        let mut steps = Vec::new();
        for segment in path.split('.') {
            push_segment(segment, &mut steps);
        }
        Some(Self { steps })
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Resolve this path against `data`.
    #[must_use]
    pub fn evaluate<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        let mut current = data;
        for step in &self.steps {
            current = match (step, current) {
                (Step::Field(name), Value::Object(map)) => map.get(name)?,
                (Step::Field(name), Value::Array(items)) => {
                    items.get(name.parse::<usize>().ok()?)?
                }
                (Step::Index(index), Value::Array(items)) => items.get(*index)?,
                _ => return None,
            };
        }
        (!current.is_null()).then_some(current)
    }
}

impl std::fmt::Display for PathExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for step in &self.steps {
            match step {
                Step::Field(name) => {
                    if !first {
                        f.write_str(".")?;
                    }
                    f.write_str(name)?;
                }
                Step::Index(index) => write!(f, "[{index}]")?,
            }
            first = false;
        }
        Ok(())
    }
}

fn push_segment(segment: &str, steps: &mut Vec<Step>) {
    if let Some(caps) = INDEXED_SEGMENT.captures(segment) {
        let indices: Option<Vec<usize>> = INDEX_SUFFIX
            .captures_iter(&caps[2])
            .map(|c| c[1].parse::<usize>().ok())
            .collect();
        if let Some(indices) = indices {
            steps.push(Step::Field(caps[1].to_string()));
            steps.extend(indices.into_iter().map(Step::Index));
            return;
        }
    }
    steps.push(Step::Field(segment.to_string()));
}

/// Extract the value addressed by `path` from `data`.
///
/// Returns `None` when the path is empty, the data is `null`, or any step
/// fails to resolve.
#[must_use]
pub fn extract<'a>(data: &'a Value, path: &str) -> Option<&'a Value> {
    if data.is_null() {
        return None;
    }
    PathExpr::parse(path)?.evaluate(data)
}
