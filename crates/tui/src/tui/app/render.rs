use std::cmp::min;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
};
use ratatui::Frame;

use crate::core::board::{BoardColumn, LIST_HEADERS};
use crate::core::drag::MoveState;
use crate::core::form::FormField;
use crate::model::format_date;
use crate::tui::constants::APP_VERSION;
use crate::tui::filters::{FilterColumn, FilterOverlay};
use crate::tui::helpers::{
    accent_title, build_help_lines, centered_rect, checkbox, inset_rect, status_color, truncate,
    BG_ACCENT, BG_BASE, BG_PANEL, FG_ACCENT,
};

use super::{App, InputMode, ViewMode};

impl App {
    pub(crate) fn draw(&mut self, f: &mut Frame<'_>) {
        let size = f.size();
        f.render_widget(Clear, size);
        f.render_widget(Block::default().style(Style::default().bg(BG_BASE)), size);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(2),
            ])
            .split(size);

        self.draw_header(f, chunks[0]);
        self.draw_tabs(f, chunks[1]);
        match self.view {
            ViewMode::Board => self.draw_board(f, chunks[2]),
            ViewMode::List => self.draw_list(f, chunks[2]),
        }
        self.draw_footer(f, chunks[3]);

        match self.input_mode {
            InputMode::Search => self.draw_input_overlay(f, size, "🔍 Search"),
            InputMode::Filter => self.draw_filter_overlay(f, size),
            InputMode::DatePrompt(field) => {
                self.draw_filter_overlay(f, size);
                self.draw_input_overlay(f, size, field.title());
            }
            InputMode::Form | InputMode::FormEdit(_) => self.draw_form_overlay(f, size),
            InputMode::Help => self.draw_help_overlay(f, size),
            InputMode::Normal => {}
        }

        if let Some(alert) = self.alerts.front() {
            draw_alert(f, size, alert);
        }
    }

    fn draw_header(&self, f: &mut Frame<'_>, area: Rect) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(75), Constraint::Percentage(25)])
            .split(area);

        let mut left_spans = vec![
            Span::styled(
                format!(" kanban v{} ", APP_VERSION),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("🌐 {}", self.config.base_url()),
                Style::default().fg(Color::DarkGray),
            ),
        ];

        if let Some(summary) = self.session.active_filter().and_then(|spec| spec.summary()) {
            left_spans.push(Span::raw("  "));
            left_spans.push(Span::styled(
                format!("🔍 {}", summary),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        f.render_widget(
            Paragraph::new(Line::from(left_spans)).style(Style::default().bg(BG_BASE)),
            cols[0],
        );

        let right = if self.session.is_loading() {
            Span::styled("⏳ loading ", Style::default().fg(Color::Yellow))
        } else {
            Span::styled(
                format!("{} tasks ", self.session.board().task_count()),
                Style::default().fg(Color::DarkGray),
            )
        };
        f.render_widget(
            Paragraph::new(Line::from(right))
                .alignment(Alignment::Right)
                .style(Style::default().bg(BG_BASE)),
            cols[1],
        );
    }

    fn draw_tabs(&self, f: &mut Frame<'_>, area: Rect) {
        let titles: Vec<Line> = ViewMode::ALL
            .iter()
            .map(|view| Line::from(view.label()))
            .collect();
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("Views"))
                    .border_style(Style::default().fg(Color::DarkGray))
                    .style(Style::default().bg(BG_PANEL)),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Green)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD),
            );
        f.render_widget(tabs, area);
    }

    fn draw_board(&self, f: &mut Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(area);

        for (idx, column) in self.session.board().columns().iter().enumerate() {
            self.draw_board_column(f, columns[idx], column, idx == self.cursor.column);
        }
    }

    fn draw_board_column(&self, f: &mut Frame<'_>, area: Rect, column: &BoardColumn, active: bool) {
        let accent = status_color(column.status);
        let title = format!("{} ({})", column.status, column.cards.len());
        let border_style = if active {
            Style::default().fg(accent).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(Span::styled(title, Style::default().fg(accent).add_modifier(Modifier::BOLD)))
            .border_style(border_style)
            .style(Style::default().bg(BG_PANEL));

        if let Some(marker) = column.empty_marker() {
            let paragraph = Paragraph::new(Line::from(Span::styled(
                marker,
                Style::default().fg(Color::DarkGray),
            )))
            .wrap(Wrap { trim: true })
            .block(block);
            f.render_widget(paragraph, area);
            return;
        }

        let width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = column
            .cards
            .iter()
            .map(|card| {
                let pending = matches!(
                    self.session.drag().state(card.id()),
                    MoveState::Pending | MoveState::OptimisticallyApplied
                );
                let mut title_spans = vec![
                    Span::styled(
                        format!("#{} ", card.id()),
                        Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(truncate(card.task.title(), width.saturating_sub(card.id().len() + 2))),
                ];
                if pending {
                    title_spans.push(Span::styled(" ⏳", Style::default().fg(Color::Yellow)));
                }
                ListItem::new(vec![
                    Line::from(title_spans),
                    Line::from(Span::styled(
                        card.label.clone(),
                        Style::default().fg(status_color(card.status)),
                    )),
                    Line::default(),
                ])
            })
            .collect();

        let mut state = ListState::default();
        if active {
            state.select(Some(self.cursor.row()));
        }
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(BG_ACCENT)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_list(&mut self, f: &mut Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));

        let header = Row::new(LIST_HEADERS.iter().map(|h| Cell::from(*h)))
            .style(Style::default().add_modifier(Modifier::BOLD));

        if let Some(marker) = self.session.list().empty_marker() {
            let inner = block.inner(area);
            f.render_widget(block, area);
            if inner.width == 0 || inner.height == 0 {
                return;
            }
            let content = centered_rect(inner.width, 1, inner);
            f.render_widget(
                Paragraph::new(marker)
                    .alignment(Alignment::Center)
                    .style(Style::default().fg(Color::DarkGray)),
                content,
            );
            return;
        }

        let rows: Vec<Row> = self
            .session
            .list()
            .rows()
            .iter()
            .map(|row| Row::new(row.cells.iter().map(|cell| Cell::from(cell.as_str()))))
            .collect();

        let widths = [
            Constraint::Length(8),
            Constraint::Length(8),
            Constraint::Length(14),
            Constraint::Length(11),
            Constraint::Length(10),
            Constraint::Min(16),
            Constraint::Length(12),
            Constraint::Length(9),
            Constraint::Length(14),
            Constraint::Length(12),
            Constraint::Length(11),
            Constraint::Length(11),
            Constraint::Length(14),
        ];

        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .bg(BG_ACCENT)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        f.render_stateful_widget(table, area, &mut self.list_state);
    }

    fn draw_footer(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1)])
            .split(area);
        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(32)])
            .split(lines[0]);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.style())])
        } else {
            Line::from(vec![Span::raw("Ready")])
        };
        f.render_widget(Paragraph::new(status_line), top[0]);

        let pagination = self.session.pagination();
        let mut page_spans = Vec::new();
        if pagination.previous().is_some() {
            page_spans.push(Span::styled("[ Previous  ", Style::default().fg(Color::Cyan)));
        }
        page_spans.push(Span::raw(pagination.label()));
        if pagination.next().is_some() {
            page_spans.push(Span::styled("  Next ]", Style::default().fg(Color::Cyan)));
        }
        f.render_widget(
            Paragraph::new(Line::from(page_spans)).alignment(Alignment::Right),
            top[1],
        );

        let help = match self.input_mode {
            InputMode::Normal => {
                "tab view | h/l column | j/k card | H/L drag | f filter | / search | t due today | c clear | [/] page | o form | r refresh | ? help | q quit"
            }
            InputMode::Search => "type to search • Enter/Esc done",
            InputMode::Filter => {
                "←/→ column • ↑/↓ move • Space toggle • s/e dates • c clear • Enter apply • Esc close"
            }
            InputMode::DatePrompt(_) => "YYYY-MM-DD • Enter set • Esc cancel",
            InputMode::Form => "↑/↓ field • Enter edit • s save • n create • Esc close",
            InputMode::FormEdit(_) => "Enter keep • Esc cancel",
            InputMode::Help => "Enter/Esc to close ❔",
        };
        let help_line = Line::from(vec![Span::styled(
            help,
            Style::default().fg(Color::DarkGray),
        )]);
        f.render_widget(Paragraph::new(help_line), lines[1]);
    }

    fn draw_input_overlay(&self, f: &mut Frame<'_>, area: Rect, title: &str) {
        let width = min(area.width.saturating_sub(10), 60);
        let popup_area = centered_rect(width, 3, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title(title))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);
        f.render_widget(
            Paragraph::new(self.input.as_str()).style(Style::default().bg(BG_PANEL)),
            inner,
        );
        if inner.width > 0 {
            let offset = min(self.input.cursor() as u16, inner.width - 1);
            f.set_cursor(inner.x + offset, inner.y);
        }
    }

    fn draw_filter_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let Some(overlay) = self.filter_overlay.as_ref() else {
            return;
        };

        let width = min(area.width.saturating_sub(10), 96);
        let height = min(area.height.saturating_sub(4), 22);
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(3)])
            .split(popup_area);
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
                Constraint::Percentage(25),
            ])
            .split(rows[0]);

        for (idx, column) in FilterColumn::ALL.into_iter().enumerate() {
            self.render_filter_column(f, columns[idx], overlay, column);
        }

        let inputs = self.session.inputs();
        let date_text = |value| format_date(value).unwrap_or_else(|| String::from("unset"));
        let dates = Line::from(vec![
            Span::styled("s ", Style::default().fg(Color::Cyan)),
            Span::raw(format!("Start: {}", date_text(inputs.start_date))),
            Span::raw("    "),
            Span::styled("e ", Style::default().fg(Color::Cyan)),
            Span::raw(format!("End: {}", date_text(inputs.end_date))),
        ]);
        f.render_widget(
            Paragraph::new(dates).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(accent_title("Dates"))
                    .border_style(Style::default().fg(Color::DarkGray))
                    .style(Style::default().bg(BG_PANEL)),
            ),
            rows[1],
        );
    }

    fn render_filter_column(
        &self,
        f: &mut Frame<'_>,
        area: Rect,
        overlay: &FilterOverlay,
        column: FilterColumn,
    ) {
        let is_active = overlay.column == column;
        let entries = FilterOverlay::entries(column, &self.session);
        let mut items: Vec<ListItem> = entries
            .iter()
            .map(|entry| {
                let mark = if column.is_multi() {
                    format!("[{}]", checkbox(entry.checked))
                } else if entry.checked {
                    String::from("(•)")
                } else {
                    String::from("( )")
                };
                ListItem::new(format!("{mark} {}", entry.label))
            })
            .collect();

        if items.is_empty() {
            items.push(ListItem::new("(no options)"));
        }

        let mut state = ListState::default();
        if is_active {
            state.select(Some(overlay.current_row().min(items.len() - 1)));
        }

        let display_title = if is_active {
            format!("▶ {}", column.title())
        } else {
            column.title().to_string()
        };
        let border_style = if is_active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let list_style = if is_active {
            Style::default().bg(BG_PANEL)
        } else {
            Style::default().fg(Color::DarkGray).bg(BG_BASE)
        };

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(display_title)
                    .border_style(border_style),
            )
            .style(list_style)
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        f.render_widget(Clear, area);
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_form_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let width = min(area.width.saturating_sub(10), 80).max(40);
        let height = (FormField::ALL.len() as u16 + 4).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("🗒 Task Lookup"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        let editing = match self.input_mode {
            InputMode::FormEdit(field) => Some(field),
            _ => None,
        };
        let form = self.session.form();
        let rows: Vec<Row> = FormField::ALL
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let value = if editing == Some(*field) {
                    let (before, after) = self.input.split_at_cursor();
                    Span::styled(
                        format!("{before}▏{after}"),
                        Style::default().fg(Color::Yellow),
                    )
                } else {
                    Span::raw(form.value(*field))
                };
                let label_style = if idx == self.form_row {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(FG_ACCENT).add_modifier(Modifier::BOLD)
                };
                Row::new(vec![
                    Cell::from(field.label()).style(label_style),
                    Cell::from(Line::from(value)),
                ])
            })
            .collect();

        let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(20)])
            .block(Block::default().style(Style::default().bg(BG_PANEL)))
            .column_spacing(2);
        f.render_widget(table, inset_rect(inner, 1));
    }

    fn draw_help_overlay(&self, f: &mut Frame<'_>, area: Rect) {
        let lines = build_help_lines();
        let width = min(area.width.saturating_sub(10), 72);
        let height = (lines.len() as u16 + 4).min(area.height.saturating_sub(2));
        let popup_area = centered_rect(width, height, area);
        f.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(accent_title("⌨️ Keyboard Reference"))
            .border_style(Style::default().fg(Color::DarkGray))
            .style(Style::default().bg(BG_PANEL));
        let inner = block.inner(popup_area);
        f.render_widget(block, popup_area);

        if inner.width < 3 || inner.height < 3 {
            return;
        }

        let help_lines: Vec<Line> = lines
            .into_iter()
            .map(|(combo, desc)| {
                Line::from(vec![
                    Span::styled(format!("{combo:<16}"), Style::default().fg(Color::Cyan)),
                    Span::raw(desc),
                ])
            })
            .collect();
        f.render_widget(
            Paragraph::new(help_lines)
                .wrap(Wrap { trim: true })
                .style(Style::default().bg(BG_PANEL)),
            inset_rect(inner, 1),
        );
    }
}

fn draw_alert(f: &mut Frame<'_>, area: Rect, message: &str) {
    let width = min(area.width.saturating_sub(20), 60).max(30);
    let popup_area = centered_rect(width, 7, area);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(accent_title("⚠️ Notice"))
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(BG_PANEL));
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let lines = vec![
        Line::from(Span::styled(message.to_string(), Style::default().fg(Color::White))),
        Line::default(),
        Line::from(Span::styled(
            "Press Enter to dismiss",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .alignment(Alignment::Center)
            .style(Style::default().bg(BG_PANEL)),
        inset_rect(inner, 1),
    );
}
