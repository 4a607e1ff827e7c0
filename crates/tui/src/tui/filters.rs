use crate::core::session::{Session, UiEvent};
use crate::model::{TaskStatus, KNOWN_PRIORITIES};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FilterColumn {
    Status,
    Priority,
    PosName,
    PosId,
}

impl FilterColumn {
    pub(crate) const ALL: [Self; 4] = [
        FilterColumn::Status,
        FilterColumn::Priority,
        FilterColumn::PosName,
        FilterColumn::PosId,
    ];

    pub(crate) fn index(self) -> usize {
        match self {
            FilterColumn::Status => 0,
            FilterColumn::Priority => 1,
            FilterColumn::PosName => 2,
            FilterColumn::PosId => 3,
        }
    }

    pub(crate) fn title(self) -> &'static str {
        match self {
            FilterColumn::Status => "Status",
            FilterColumn::Priority => "Priority",
            FilterColumn::PosName => "POS Name",
            FilterColumn::PosId => "POS ID",
        }
    }

    /// Multi-select columns toggle; POS columns pick exactly one option.
    pub(crate) fn is_multi(self) -> bool {
        matches!(self, FilterColumn::Status | FilterColumn::Priority)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FilterEntry {
    pub(crate) label: String,
    pub(crate) checked: bool,
}

/// Cursor over the filter picker. Selections live in the session, so the
/// picker always shows what the next query would send.
#[derive(Debug)]
pub(crate) struct FilterOverlay {
    pub(crate) column: FilterColumn,
    pub(crate) row_positions: [usize; 4],
}

impl FilterOverlay {
    pub(crate) fn new() -> Self {
        Self {
            column: FilterColumn::Status,
            row_positions: [0; 4],
        }
    }

    pub(crate) fn entries(column: FilterColumn, session: &Session) -> Vec<FilterEntry> {
        let inputs = session.inputs();
        match column {
            FilterColumn::Status => TaskStatus::ALL
                .iter()
                .map(|status| FilterEntry {
                    label: status.as_str().to_string(),
                    checked: inputs.statuses.contains(status),
                })
                .collect(),
            FilterColumn::Priority => priority_values(session)
                .into_iter()
                .map(|priority| FilterEntry {
                    checked: inputs.priorities.contains(&priority),
                    label: priority,
                })
                .collect(),
            FilterColumn::PosName | FilterColumn::PosId => {
                let set = if column == FilterColumn::PosName {
                    session.resolver().names()
                } else {
                    session.resolver().ids()
                };
                set.options()
                    .iter()
                    .enumerate()
                    .map(|(idx, option)| FilterEntry {
                        label: option.label.clone(),
                        checked: idx == set.selected_index(),
                    })
                    .collect()
            }
        }
    }

    pub(crate) fn next_column(&mut self, session: &Session) {
        let next = (self.column.index() + 1) % FilterColumn::ALL.len();
        self.column = FilterColumn::ALL[next];
        self.clamp_rows(session);
    }

    pub(crate) fn prev_column(&mut self, session: &Session) {
        let idx = self.column.index();
        let prev = if idx == 0 {
            FilterColumn::ALL.len() - 1
        } else {
            idx - 1
        };
        self.column = FilterColumn::ALL[prev];
        self.clamp_rows(session);
    }

    pub(crate) fn next_row(&mut self, session: &Session) {
        let max = Self::entries(self.column, session).len().saturating_sub(1);
        let row = &mut self.row_positions[self.column.index()];
        *row = if *row >= max { 0 } else { *row + 1 };
    }

    pub(crate) fn prev_row(&mut self, session: &Session) {
        let max = Self::entries(self.column, session).len().saturating_sub(1);
        let row = &mut self.row_positions[self.column.index()];
        *row = if *row == 0 { max } else { *row - 1 };
    }

    pub(crate) fn current_row(&self) -> usize {
        self.row_positions[self.column.index()]
    }

    /// The event that toggling the highlighted row stands for.
    pub(crate) fn toggle_event(&self, session: &Session) -> Option<UiEvent> {
        let row = self.current_row();
        match self.column {
            FilterColumn::Status => TaskStatus::ALL
                .get(row)
                .copied()
                .map(UiEvent::StatusToggled),
            FilterColumn::Priority => priority_values(session)
                .into_iter()
                .nth(row)
                .map(UiEvent::PriorityToggled),
            FilterColumn::PosName => session
                .resolver()
                .names()
                .options()
                .get(row)
                .map(|option| UiEvent::PosNameSelected(option.value.clone())),
            FilterColumn::PosId => session
                .resolver()
                .ids()
                .options()
                .get(row)
                .map(|option| UiEvent::PosIdSelected(option.value.clone())),
        }
    }

    fn clamp_rows(&mut self, session: &Session) {
        let len = Self::entries(self.column, session).len();
        let row = &mut self.row_positions[self.column.index()];
        if *row >= len {
            *row = len.saturating_sub(1);
        }
    }
}

/// Known priorities plus any other label already selected.
fn priority_values(session: &Session) -> Vec<String> {
    let mut values: Vec<String> = KNOWN_PRIORITIES.iter().map(|p| p.to_string()).collect();
    for extra in &session.inputs().priorities {
        if !values.contains(extra) {
            values.push(extra.clone());
        }
    }
    values
}
