use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Priority labels the backend schema accepts. The wire type stays an open string.
pub const KNOWN_PRIORITIES: [&str; 4] = ["None", "Low", "Medium", "High"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskStatus {
    Backlog,
    ToDo,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 4] = [
        TaskStatus::Backlog,
        TaskStatus::ToDo,
        TaskStatus::InProgress,
        TaskStatus::Done,
    ];

    /// Label used on the wire and on cards.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "Backlog",
            TaskStatus::ToDo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Identity of the board column that renders this status.
    pub fn column_id(&self) -> &'static str {
        match self {
            TaskStatus::Backlog => "backlog",
            TaskStatus::ToDo => "todo",
            TaskStatus::InProgress => "inprogress",
            TaskStatus::Done => "done",
        }
    }

    /// Fixed column to status mapping. Unknown columns map to nothing.
    pub fn from_column_id(column: &str) -> Option<Self> {
        TaskStatus::ALL
            .into_iter()
            .find(|status| status.column_id() == column)
    }

    pub fn index(&self) -> usize {
        match self {
            TaskStatus::Backlog => 0,
            TaskStatus::ToDo => 1,
            TaskStatus::InProgress => 2,
            TaskStatus::Done => 3,
        }
    }

    pub fn card_label(&self) -> String {
        format!("Status: {}", self.as_str())
    }

    pub fn empty_marker(&self) -> String {
        format!("No {} tasks found.", self.as_str())
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "backlog" => Ok(TaskStatus::Backlog),
            "todo" => Ok(TaskStatus::ToDo),
            "inprogress" => Ok(TaskStatus::InProgress),
            "done" => Ok(TaskStatus::Done),
            _ => Err(anyhow!(
                "Unknown status '{}': expected backlog|todo|inprogress|done",
                s
            )),
        }
    }
}

impl ValueEnum for TaskStatus {
    fn value_variants<'a>() -> &'a [Self] {
        &TaskStatus::ALL
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.column_id()).help(self.as_str()))
    }
}

impl Serialize for TaskStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}

/// Reconciliation certification. Exactly one of the three holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Certified {
    Yes,
    No,
    #[default]
    Unset,
}

impl Certified {
    pub fn as_str(&self) -> &'static str {
        match self {
            Certified::Yes => "Yes",
            Certified::No => "No",
            Certified::Unset => "",
        }
    }

    /// Boolean string the write endpoints compare against.
    pub fn as_flag(&self) -> Option<&'static str> {
        match self {
            Certified::Yes => Some("true"),
            Certified::No => Some("false"),
            Certified::Unset => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Certified::Unset)
    }

    /// Cycle used by the form toggle: Unset, Yes, No, Unset.
    pub fn cycle(self) -> Self {
        match self {
            Certified::Unset => Certified::Yes,
            Certified::Yes => Certified::No,
            Certified::No => Certified::Unset,
        }
    }

    fn from_wire(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("yes") => Certified::Yes,
            Some(v) if v.eq_ignore_ascii_case("no") => Certified::No,
            _ => Certified::Unset,
        }
    }
}

impl fmt::Display for Certified {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Certified::Unset => write!(f, "n/a"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl Serialize for Certified {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Certified::Unset => serializer.serialize_none(),
            other => serializer.serialize_str(other.as_str()),
        }
    }
}

impl<'de> Deserialize<'de> for Certified {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(Certified::from_wire(raw.as_deref()))
    }
}

/// Server-owned task as returned by the query and lookup endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    #[serde(rename = "task_id", deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub pos_id: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub pos_name: Option<String>,
    #[serde(rename = "task_desc", default, deserialize_with = "opt_text")]
    pub description: Option<String>,
    #[serde(rename = "task_status")]
    pub status: TaskStatus,
    #[serde(rename = "task_priority", default, deserialize_with = "opt_text")]
    pub priority: Option<String>,
    #[serde(rename = "task_start_date", default, deserialize_with = "lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(rename = "task_due_date", default, deserialize_with = "lenient_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(rename = "rec_date", default, deserialize_with = "lenient_date")]
    pub reconciliation_date: Option<NaiveDate>,
    #[serde(rename = "task_notes", default, deserialize_with = "opt_text")]
    pub notes: Option<String>,
    #[serde(rename = "blocker_desc", default, deserialize_with = "opt_text")]
    pub blocker_description: Option<String>,
    #[serde(default, deserialize_with = "opt_text")]
    pub blocker_responsible: Option<String>,
    #[serde(rename = "rec_certified", default)]
    pub certified: Certified,
}

impl Task {
    pub fn new(id: impl Into<String>, status: TaskStatus) -> Self {
        Self {
            id: id.into(),
            pos_id: None,
            pos_name: None,
            description: None,
            status,
            priority: None,
            start_date: None,
            due_date: None,
            reconciliation_date: None,
            notes: None,
            blocker_description: None,
            blocker_responsible: None,
            certified: Certified::Unset,
        }
    }

    pub fn title(&self) -> &str {
        self.description.as_deref().unwrap_or("(no description)")
    }
}

pub fn format_date(value: Option<NaiveDate>) -> Option<String> {
    value.map(|date| date.format(DATE_FORMAT).to_string())
}

/// Parses `YYYY-MM-DD`, also accepting a trailing time component.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .ok()
        .or_else(|| {
            trimmed
                .get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, DATE_FORMAT).ok())
        })
}

struct StringOrNumber;

impl<'de> Visitor<'de> for StringOrNumber {
    type Value = Option<String>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a string, an integer, or null")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            Ok(None)
        } else {
            Ok(Some(trimmed.to_string()))
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v.to_string()))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(StringOrNumber)
    }
}

pub(crate) fn opt_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StringOrNumber)
}

pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    opt_string_or_number(deserializer)?.ok_or_else(|| de::Error::custom("missing identifier"))
}

pub(crate) fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Item(#[serde(deserialize_with = "opt_string_or_number")] Option<String>);

    let items = Option::<Vec<Item>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items.into_iter().filter_map(|item| item.0).collect())
}

fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.trim().is_empty()))
}

fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}
