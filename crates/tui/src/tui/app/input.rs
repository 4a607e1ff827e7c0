use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::form::FormField;
use crate::core::session::UiEvent;
use crate::tui::constants::{
    STATUS_CLEARED, STATUS_DUE_TODAY, STATUS_FILTER_CLOSED, STATUS_FILTER_PICKER, STATUS_HELP,
    STATUS_REFRESHING, STATUS_SEARCH,
};

use super::{App, DateField, InputMode, ViewMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NormalAction {
    Quit,
    ToggleView,
    PrevColumn,
    NextColumn,
    SelectNext,
    SelectPrev,
    DragLeft,
    DragRight,
    OpenFilter,
    Search,
    DueToday,
    ClearFilters,
    PrevPage,
    NextPage,
    OpenForm,
    Refresh,
    ShowHelp,
}

impl NormalAction {
    pub(crate) fn from_event(key: &KeyEvent) -> Option<Self> {
        if matches!(key.code, KeyCode::Char('c')) && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Self::Quit);
        }

        match key.code {
            KeyCode::Char('q') => Some(Self::Quit),
            KeyCode::Tab | KeyCode::BackTab => Some(Self::ToggleView),
            KeyCode::Char('h') | KeyCode::Left => Some(Self::PrevColumn),
            KeyCode::Char('l') | KeyCode::Right => Some(Self::NextColumn),
            KeyCode::Char('j') | KeyCode::Down => Some(Self::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Self::SelectPrev),
            KeyCode::Char('H') => Some(Self::DragLeft),
            KeyCode::Char('L') => Some(Self::DragRight),
            KeyCode::Char('f') => Some(Self::OpenFilter),
            KeyCode::Char('/') => Some(Self::Search),
            KeyCode::Char('t') => Some(Self::DueToday),
            KeyCode::Char('c') => Some(Self::ClearFilters),
            KeyCode::Char('[') => Some(Self::PrevPage),
            KeyCode::Char(']') => Some(Self::NextPage),
            KeyCode::Char('o') => Some(Self::OpenForm),
            KeyCode::Char('r') => Some(Self::Refresh),
            KeyCode::Char('?') => Some(Self::ShowHelp),
            _ => None,
        }
    }
}

impl App {
    pub(crate) fn on_key(&mut self, key: KeyEvent) {
        if !self.alerts.is_empty() {
            self.handle_alert(key);
            return;
        }
        match self.input_mode {
            InputMode::Normal => self.handle_normal_mode(key),
            InputMode::Search => self.handle_search_mode(key),
            InputMode::Filter => self.handle_filter_mode(key),
            InputMode::DatePrompt(field) => self.handle_date_prompt(key, field),
            InputMode::Form => self.handle_form_mode(key),
            InputMode::FormEdit(field) => self.handle_form_edit(key, field),
            InputMode::Help => self.handle_help_mode(key),
        }
    }

    fn handle_alert(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            self.alerts.pop_front();
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) {
        if let Some(action) = NormalAction::from_event(&key) {
            self.execute_normal_action(action);
        }
    }

    fn execute_normal_action(&mut self, action: NormalAction) {
        match action {
            NormalAction::Quit => self.should_quit = true,
            NormalAction::ToggleView => {
                self.view = self.view.toggle();
                self.clamp_cursor();
            }
            NormalAction::PrevColumn => {
                if self.view == ViewMode::Board {
                    self.move_column(-1);
                }
            }
            NormalAction::NextColumn => {
                if self.view == ViewMode::Board {
                    self.move_column(1);
                }
            }
            NormalAction::SelectNext => self.select_next(),
            NormalAction::SelectPrev => self.select_prev(),
            NormalAction::DragLeft => self.drag_selected(-1),
            NormalAction::DragRight => self.drag_selected(1),
            NormalAction::OpenFilter => self.open_filter_overlay(),
            NormalAction::Search => {
                self.input.set(self.session.inputs().search.clone());
                self.input_mode = InputMode::Search;
                self.set_status_info(STATUS_SEARCH);
            }
            NormalAction::DueToday => {
                self.dispatch(UiEvent::DueToday);
                self.set_status_info(STATUS_DUE_TODAY);
            }
            NormalAction::ClearFilters => {
                self.dispatch(UiEvent::ClearFilters);
                self.set_status_info(STATUS_CLEARED);
            }
            NormalAction::PrevPage => self.follow_previous(),
            NormalAction::NextPage => self.follow_next(),
            NormalAction::OpenForm => self.open_form(),
            NormalAction::Refresh => {
                self.dispatch(UiEvent::Refresh);
                self.set_status_info(STATUS_REFRESHING);
            }
            NormalAction::ShowHelp => {
                self.input_mode = InputMode::Help;
                self.set_status_info(STATUS_HELP);
            }
        }
    }

    /// Every edit re-queries, the same as typing into the search box.
    fn handle_search_mode(&mut self, key: KeyEvent) {
        let changed = match key.code {
            KeyCode::Enter | KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Normal;
                self.status = None;
                return;
            }
            KeyCode::Backspace => {
                self.input.backspace();
                true
            }
            KeyCode::Delete => {
                self.input.delete_char();
                true
            }
            KeyCode::Char(c) => {
                self.input.insert_char(c);
                true
            }
            _ => self.move_input_cursor(key.code),
        };
        if changed {
            self.dispatch(UiEvent::SearchChanged(self.input.as_str().to_string()));
        }
    }

    /// Returns false: cursor movement never changes the text.
    fn move_input_cursor(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_home(),
            KeyCode::End => self.input.move_end(),
            _ => {}
        }
        false
    }

    fn handle_filter_mode(&mut self, key: KeyEvent) {
        let Some(mut overlay) = self.filter_overlay.take() else {
            self.input_mode = InputMode::Normal;
            return;
        };

        let mut close = false;
        match key.code {
            KeyCode::Esc => {
                close = true;
                self.set_status_info(STATUS_FILTER_CLOSED);
            }
            KeyCode::Enter => {
                close = true;
                self.dispatch(UiEvent::ApplyFilters);
                match self.session.active_filter().and_then(|spec| spec.summary()) {
                    Some(summary) => self.set_status_info(format!("Applied filters: {summary}")),
                    None => self.set_status_info("Showing all tasks"),
                }
            }
            KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => {
                overlay.prev_column(&self.session)
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                overlay.next_column(&self.session)
            }
            KeyCode::Up | KeyCode::Char('k') => overlay.prev_row(&self.session),
            KeyCode::Down | KeyCode::Char('j') => overlay.next_row(&self.session),
            KeyCode::Char(' ') => {
                if let Some(event) = overlay.toggle_event(&self.session) {
                    self.dispatch(event);
                }
            }
            KeyCode::Char('s') => self.open_date_prompt(DateField::Start),
            KeyCode::Char('e') => self.open_date_prompt(DateField::End),
            KeyCode::Char('c') | KeyCode::Char('C') => {
                close = true;
                self.dispatch(UiEvent::ClearFilters);
                self.set_status_info(STATUS_CLEARED);
            }
            _ => {}
        }

        if close {
            self.input_mode = InputMode::Normal;
        } else {
            self.filter_overlay = Some(overlay);
        }
    }

    fn handle_date_prompt(&mut self, key: KeyEvent, field: DateField) {
        match key.code {
            KeyCode::Enter => self.commit_date(field),
            KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Filter;
                self.set_status_info(STATUS_FILTER_PICKER);
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete_char(),
            KeyCode::Char(c) => self.input.insert_char(c),
            other => {
                self.move_input_cursor(other);
            }
        }
    }

    fn handle_form_mode(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.status = None;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.form_row = self.form_row.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.form_row = (self.form_row + 1).min(FormField::ALL.len() - 1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.edit_form_field(),
            KeyCode::Char('s') => self.dispatch(UiEvent::SaveForm),
            KeyCode::Char('n') => self.dispatch(UiEvent::CreateTask),
            _ => {}
        }
    }

    fn handle_form_edit(&mut self, key: KeyEvent, field: FormField) {
        match key.code {
            KeyCode::Enter => self.commit_form_field(field),
            KeyCode::Esc => {
                self.input.clear();
                self.input_mode = InputMode::Form;
            }
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete_char(),
            KeyCode::Char(c) => self.input.insert_char(c),
            other => {
                self.move_input_cursor(other);
            }
        }
    }

    fn handle_help_mode(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?')) {
            self.input_mode = InputMode::Normal;
            self.status = None;
        }
    }
}
