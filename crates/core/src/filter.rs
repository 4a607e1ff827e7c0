use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{TaskStatus, DATE_FORMAT};

/// Filter controls as the user left them. Date inputs start on today's date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInputs {
    pub search: String,
    pub pos_id: String,
    pub pos_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub statuses: BTreeSet<TaskStatus>,
    pub priorities: BTreeSet<String>,
}

impl FilterInputs {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            search: String::new(),
            pos_id: String::new(),
            pos_name: String::new(),
            start_date: Some(today),
            end_date: Some(today),
            statuses: BTreeSet::new(),
            priorities: BTreeSet::new(),
        }
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }

    pub fn toggle_status(&mut self, status: TaskStatus) {
        if !self.statuses.remove(&status) {
            self.statuses.insert(status);
        }
    }

    pub fn toggle_priority(&mut self, priority: &str) {
        if !self.priorities.remove(priority) {
            self.priorities.insert(priority.to_string());
        }
    }
}

/// Query payload for the task endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub pos_id: String,
    pub pos_name: String,
    pub search_query: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub statuses: Vec<TaskStatus>,
    pub priorities: Vec<String>,
    pub page: u32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self::unfiltered()
    }
}

impl FilterSpec {
    pub fn unfiltered() -> Self {
        Self {
            pos_id: String::new(),
            pos_name: String::new(),
            search_query: String::new(),
            start_date: None,
            end_date: None,
            statuses: Vec::new(),
            priorities: Vec::new(),
            page: 1,
        }
    }

    /// Tasks starting on or after and due on or before today.
    pub fn due_today(today: NaiveDate) -> Self {
        Self {
            start_date: Some(today),
            end_date: Some(today),
            ..Self::unfiltered()
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn is_unfiltered(&self) -> bool {
        self.pos_id.is_empty()
            && self.pos_name.is_empty()
            && self.search_query.is_empty()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.statuses.is_empty()
            && self.priorities.is_empty()
    }

    pub fn summary(&self) -> Option<String> {
        if self.is_unfiltered() {
            return None;
        }

        let mut parts = Vec::new();
        if !self.search_query.is_empty() {
            parts.push(format!("search:{}", self.search_query));
        }
        if !self.pos_id.is_empty() {
            parts.push(format!("pos:{}", self.pos_id));
        }
        if !self.pos_name.is_empty() {
            parts.push(format!("name:{}", self.pos_name));
        }
        match (self.start_date, self.end_date) {
            (None, None) => {}
            (start, end) => {
                let fmt = |d: Option<NaiveDate>| {
                    d.map(|d| d.format(DATE_FORMAT).to_string())
                        .unwrap_or_default()
                };
                parts.push(format!("dates:{}..{}", fmt(start), fmt(end)));
            }
        }
        if !self.statuses.is_empty() {
            let joined = self
                .statuses
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(",");
            parts.push(format!("status:{joined}"));
        }
        if !self.priorities.is_empty() {
            parts.push(format!("priority:{}", self.priorities.join(",")));
        }

        Some(parts.join(" | "))
    }
}

/// Builds the query for the current inputs, starting at page 1.
///
/// A date input still showing `today` is indistinguishable from an untouched
/// one, so it is sent as `null`.
pub fn build(inputs: &FilterInputs, today: NaiveDate) -> FilterSpec {
    FilterSpec {
        pos_id: inputs.pos_id.trim().to_string(),
        pos_name: inputs.pos_name.trim().to_string(),
        search_query: inputs.search.clone(),
        start_date: inputs.start_date.filter(|date| *date != today),
        end_date: inputs.end_date.filter(|date| *date != today),
        statuses: inputs.statuses.iter().copied().collect(),
        priorities: inputs.priorities.iter().cloned().collect(),
        page: 1,
    }
}
