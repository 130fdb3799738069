//! Plan document model: work items, their status, and JSON loading.
//!
//! A plan document is either a bare JSON array of items or an object with an
//! `items` array:
//!
//! ```json
//! { "name": "Sprint 14", "items": [
//!     { "id": "CORE-456", "points": 3, "status": "In Progress" },
//!     { "id": "PORTAL-123", "dependencies": ["CORE-456"] }
//! ] }
//! ```

use std::io::Read;
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlanError;

/// Weight used for items that carry no `points` estimate, and for phantom nodes.
pub const DEFAULT_WEIGHT: u32 = 1;

/// Delivery status of a work item, as exported from a ticket tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum Status {
    Todo,
    InProgress,
    Done,
    Blocked,
}

impl Status {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in_progress",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a status value from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    pub got: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid status: '{}' (expected todo, in progress, done or blocked)",
            self.got
        )
    }
}

impl std::error::Error for ParseStatusError {}

/// Lowercase and drop separators so `"In Progress"`, `"in-progress"` and
/// `"IN_PROGRESS"` compare equal.
fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for Status {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "todo" | "open" => Ok(Self::Todo),
            "inprogress" | "doing" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            "blocked" => Ok(Self::Blocked),
            _ => Err(ParseStatusError { got: s.to_string() }),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = ParseStatusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A unit of work with an optional point estimate and predecessor ids.
///
/// Predecessors may name ids that are never declared as items; the graph
/// treats those as phantom nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: String,
    #[serde(default, alias = "weight", skip_serializing_if = "Option::is_none")]
    pub points: Option<u32>,
    #[serde(default, alias = "deps", alias = "predecessors")]
    pub dependencies: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl WorkItem {
    /// Create an item with no estimate and the given predecessors.
    #[must_use]
    pub fn new<I, S>(id: impl Into<String>, dependencies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            points: None,
            dependencies: dependencies.into_iter().map(Into::into).collect(),
            summary: None,
            status: None,
        }
    }

    #[must_use]
    pub fn with_points(mut self, points: u32) -> Self {
        self.points = Some(points);
        self
    }

    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.status = Some(status);
        self
    }

    /// Point estimate, defaulting to [`DEFAULT_WEIGHT`].
    #[must_use]
    pub fn weight(&self) -> u32 {
        self.points.unwrap_or(DEFAULT_WEIGHT)
    }
}

/// A parsed plan: an optional name and the ordered list of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlanDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub items: Vec<WorkItem>,
}

impl PlanDocument {
    /// Parse a plan document from JSON text.
    ///
    /// Items are decoded one by one so the error names the offending item.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError::MalformedInput`] when the text is not JSON, is
    /// neither an array nor an object with an `items` array, or any item
    /// fails to decode (for example a missing `id`).
    pub fn from_json_str(text: &str) -> Result<Self, PlanError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| PlanError::MalformedInput(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Parse a plan document from a reader (file or stdin).
    ///
    /// # Errors
    ///
    /// Same as [`PlanDocument::from_json_str`].
    pub fn from_reader(reader: impl Read) -> Result<Self, PlanError> {
        let value: Value = serde_json::from_reader(reader)
            .map_err(|e| PlanError::MalformedInput(format!("invalid JSON: {e}")))?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self, PlanError> {
        let (name, raw_items) = match value {
            Value::Array(items) => (None, items),
            Value::Object(mut map) => {
                let name = match map.remove("name") {
                    None | Some(Value::Null) => None,
                    Some(Value::String(name)) => Some(name),
                    Some(other) => {
                        return Err(PlanError::MalformedInput(format!(
                            "`name` must be a string, got {other}"
                        )));
                    }
                };
                match map.remove("items") {
                    Some(Value::Array(items)) => (name, items),
                    Some(_) => {
                        return Err(PlanError::MalformedInput(
                            "`items` must be an array".to_string(),
                        ));
                    }
                    None => {
                        return Err(PlanError::MalformedInput(
                            "missing field `items`".to_string(),
                        ));
                    }
                }
            }
            _ => {
                return Err(PlanError::MalformedInput(
                    "expected an array of items or an object with `items`".to_string(),
                ));
            }
        };

        let items = raw_items
            .into_iter()
            .enumerate()
            .map(|(idx, raw)| {
                serde_json::from_value::<WorkItem>(raw)
                    .map_err(|e| PlanError::MalformedInput(format!("item #{}: {e}", idx + 1)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { name, items })
    }
}
