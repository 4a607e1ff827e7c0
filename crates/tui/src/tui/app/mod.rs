use std::collections::VecDeque;
use std::time::Instant;

use chrono::NaiveDate;
use ratatui::style::{Color, Style};
use ratatui::widgets::TableState;

use super::buffer::TextBuffer;
use super::constants::*;
use super::filters::FilterOverlay;
use crate::config::AppConfig;
use crate::core::board::Card;
use crate::core::form::FormField;
use crate::core::session::{Command, Completion, Notice, Reaction, Session, UiEvent};
use crate::model::TaskStatus;

mod input;
mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ViewMode {
    Board,
    List,
}

impl ViewMode {
    pub(crate) const ALL: [ViewMode; 2] = [ViewMode::Board, ViewMode::List];

    fn toggle(self) -> Self {
        match self {
            ViewMode::Board => ViewMode::List,
            ViewMode::List => ViewMode::Board,
        }
    }

    pub(crate) fn label(self) -> &'static str {
        match self {
            ViewMode::Board => "▦ Board",
            ViewMode::List => "☰ List",
        }
    }

    fn index(self) -> usize {
        match self {
            ViewMode::Board => 0,
            ViewMode::List => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DateField {
    Start,
    End,
}

impl DateField {
    fn title(self) -> &'static str {
        match self {
            DateField::Start => "Start date",
            DateField::End => "End date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Search,
    Filter,
    DatePrompt(DateField),
    Form,
    FormEdit(FormField),
    Help,
}

#[derive(Debug, Clone)]
struct StatusMessage {
    text: String,
    kind: StatusKind,
    created_at: Instant,
}

impl StatusMessage {
    fn new<T: Into<String>>(text: T, kind: StatusKind) -> Self {
        Self {
            text: text.into(),
            kind,
            created_at: Instant::now(),
        }
    }

    fn style(&self) -> Style {
        match self.kind {
            StatusKind::Info => Style::default().fg(Color::Cyan),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Info,
    Error,
}

/// Column under the cursor plus the remembered card row of every column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct BoardCursor {
    column: usize,
    rows: [usize; 4],
}

impl BoardCursor {
    fn row(&self) -> usize {
        self.rows[self.column]
    }
}

pub(crate) struct App {
    config: AppConfig,
    session: Session,
    outbox: Vec<Command>,
    view: ViewMode,
    input_mode: InputMode,
    input: TextBuffer,
    cursor: BoardCursor,
    list_state: TableState,
    filter_overlay: Option<FilterOverlay>,
    form_row: usize,
    alerts: VecDeque<String>,
    status: Option<StatusMessage>,
    should_quit: bool,
}

impl App {
    pub(crate) fn new(config: AppConfig, today: NaiveDate) -> Self {
        Self {
            config,
            session: Session::new(today),
            outbox: Vec::new(),
            view: ViewMode::Board,
            input_mode: InputMode::Normal,
            input: TextBuffer::new(),
            cursor: BoardCursor::default(),
            list_state: TableState::default(),
            filter_overlay: None,
            form_row: 0,
            alerts: VecDeque::new(),
            status: None,
            should_quit: false,
        }
    }

    /// Queues the initial POS list and unfiltered task query.
    pub(crate) fn start(&mut self) {
        self.dispatch(UiEvent::Load);
    }

    pub(crate) fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outbox)
    }

    pub(crate) fn on_completion(&mut self, completion: Completion) {
        let failed_move = match &completion {
            Completion::StatusUpdated {
                task_id,
                result: Err(err),
            } => Some((task_id.clone(), err.to_string())),
            _ => None,
        };

        let reaction = self.session.complete(completion);
        self.absorb(reaction);
        self.clamp_cursor();

        if let Some((task_id, reason)) = failed_move {
            self.set_status_error(format!("Could not move task {task_id}: {reason}"));
        }
    }

    pub(crate) fn on_tick(&mut self) {
        if let Some(status) = &self.status {
            if status.created_at.elapsed() > STATUS_TTL {
                self.status = None;
            }
        }
    }

    pub(crate) fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn dispatch(&mut self, event: UiEvent) {
        let reaction = self.session.dispatch(event);
        self.absorb(reaction);
    }

    fn absorb(&mut self, reaction: Reaction) {
        self.outbox.extend(reaction.commands);
        for notice in reaction.notices {
            match notice {
                Notice::Alert(message) => self.alerts.push_back(message),
            }
        }
    }

    fn column_len(&self, column: usize) -> usize {
        TaskStatus::ALL
            .get(column)
            .map(|status| self.session.board().column(*status).cards.len())
            .unwrap_or(0)
    }

    fn clamp_cursor(&mut self) {
        for column in 0..TaskStatus::ALL.len() {
            let len = self.column_len(column);
            let row = &mut self.cursor.rows[column];
            *row = (*row).min(len.saturating_sub(1));
        }

        let rows = self.session.list().rows().len();
        match self.list_state.selected() {
            _ if rows == 0 => self.list_state.select(None),
            Some(idx) => self.list_state.select(Some(idx.min(rows - 1))),
            None => self.list_state.select(Some(0)),
        }
    }

    fn selected_card(&self) -> Option<&Card> {
        let status = TaskStatus::ALL.get(self.cursor.column).copied()?;
        self.session
            .board()
            .column(status)
            .cards
            .get(self.cursor.row())
    }

    fn move_column(&mut self, delta: isize) {
        let max = TaskStatus::ALL.len() as isize - 1;
        self.cursor.column = (self.cursor.column as isize + delta).clamp(0, max) as usize;
    }

    fn select_next(&mut self) {
        match self.view {
            ViewMode::Board => {
                let len = self.column_len(self.cursor.column);
                let row = &mut self.cursor.rows[self.cursor.column];
                *row = (*row + 1).min(len.saturating_sub(1));
            }
            ViewMode::List => {
                let rows = self.session.list().rows().len();
                if rows > 0 {
                    let next = self.list_state.selected().map_or(0, |idx| idx + 1);
                    self.list_state.select(Some(next.min(rows - 1)));
                }
            }
        }
    }

    fn select_prev(&mut self) {
        match self.view {
            ViewMode::Board => {
                let row = &mut self.cursor.rows[self.cursor.column];
                *row = row.saturating_sub(1);
            }
            ViewMode::List => {
                let prev = self
                    .list_state
                    .selected()
                    .map_or(0, |idx| idx.saturating_sub(1));
                if !self.session.list().rows().is_empty() {
                    self.list_state.select(Some(prev));
                }
            }
        }
    }

    /// Drops the selected card into the neighbouring column and keeps the
    /// cursor on it.
    fn drag_selected(&mut self, delta: isize) {
        if self.view != ViewMode::Board {
            self.set_status_info(STATUS_BOARD_ONLY);
            return;
        }
        let Some(task_id) = self.selected_card().map(|card| card.id().to_string()) else {
            self.set_status_info("No card selected");
            return;
        };
        let target = self.cursor.column as isize + delta;
        let Some(status) = usize::try_from(target)
            .ok()
            .and_then(|idx| TaskStatus::ALL.get(idx).copied())
        else {
            return;
        };

        self.dispatch(UiEvent::CardDropped {
            task_id: task_id.clone(),
            column: status.column_id().to_string(),
            index: None,
        });

        if let Some(position) = self.session.board().locate(&task_id) {
            self.cursor.column = position.column.index();
            self.cursor.rows[self.cursor.column] = position.index;
            if position.column == status {
                self.set_status_info(format!("Moved task {task_id} to {status}"));
            }
        }
    }

    fn follow_previous(&mut self) {
        match self.session.pagination().previous() {
            Some(link) => self.dispatch(UiEvent::FollowLink(link)),
            None => self.set_status_info(STATUS_NO_PREVIOUS),
        }
    }

    fn follow_next(&mut self) {
        match self.session.pagination().next() {
            Some(link) => self.dispatch(UiEvent::FollowLink(link)),
            None => self.set_status_info(STATUS_NO_NEXT),
        }
    }

    fn open_filter_overlay(&mut self) {
        self.filter_overlay = Some(FilterOverlay::new());
        self.input_mode = InputMode::Filter;
        self.set_status_info(STATUS_FILTER_PICKER);
    }

    fn open_form(&mut self) {
        self.input_mode = InputMode::Form;
        self.set_status_info(STATUS_FORM);
    }

    fn selected_form_field(&self) -> FormField {
        FormField::ALL[self.form_row.min(FormField::ALL.len() - 1)]
    }

    fn edit_form_field(&mut self) {
        let field = self.selected_form_field();
        if field.is_choice() {
            self.session.form_mut().cycle(field);
            return;
        }
        let current = match field {
            FormField::TaskId => self.session.form().task_id.clone(),
            other => self.session.form().value(other),
        };
        self.input.set(current);
        self.input_mode = InputMode::FormEdit(field);
        self.set_status_info(STATUS_FORM_EDIT);
    }

    fn commit_form_field(&mut self, field: FormField) {
        let value = self.input.as_str().to_string();
        self.input.clear();
        self.input_mode = InputMode::Form;
        if field == FormField::TaskId {
            self.dispatch(UiEvent::TaskIdEntered(value));
        } else {
            self.session.form_mut().set_text(field, value);
        }
    }

    fn open_date_prompt(&mut self, field: DateField) {
        let inputs = self.session.inputs();
        let current = match field {
            DateField::Start => inputs.start_date,
            DateField::End => inputs.end_date,
        };
        self.input
            .set(crate::model::format_date(current).unwrap_or_default());
        self.input_mode = InputMode::DatePrompt(field);
        self.set_status_info(STATUS_DATE_PROMPT);
    }

    fn commit_date(&mut self, field: DateField) {
        let raw = self.input.as_str().trim().to_string();
        let date = if raw.is_empty() {
            None
        } else {
            match crate::model::parse_date(&raw) {
                Some(date) => Some(date),
                None => {
                    self.set_status_error(format!("'{raw}' is not a YYYY-MM-DD date"));
                    return;
                }
            }
        };
        let event = match field {
            DateField::Start => UiEvent::StartDateChanged(date),
            DateField::End => UiEvent::EndDateChanged(date),
        };
        self.dispatch(event);
        self.input.clear();
        self.input_mode = InputMode::Filter;
        self.set_status_info(STATUS_FILTER_PICKER);
    }

    pub(crate) fn set_status_info<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("ℹ️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Info));
    }

    pub(crate) fn set_status_error<T: Into<String>>(&mut self, message: T) {
        let mut text = String::from("⚠️  ");
        text.push_str(&message.into());
        self.status = Some(StatusMessage::new(text, StatusKind::Error));
    }
}
