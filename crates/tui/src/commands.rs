use std::fmt;
use std::io::Write;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Local, NaiveDate};

use crate::cli::{CliCommand, FilterArgs, ListArgs, MoveArgs, PosArgs, ShowArgs};
use crate::config::AppConfig;
use crate::core::api::{ApiError, TaskApi, TaskPage};
use crate::core::board::{BoardColumn, BoardProjection, ListProjection, LIST_HEADERS};
use crate::core::form::{FormField, TaskForm};
use crate::core::options::OptionSet;
use crate::core::pagination::Pagination;
use crate::core::session::{ALERT_FETCH_FAILED, ALERT_TASK_NOT_FOUND};
use crate::core::HttpTaskApi;

pub fn execute<W: Write>(config: &AppConfig, command: CliCommand, writer: W) -> Result<()> {
    if matches!(command, CliCommand::Tui) {
        return Err(anyhow!("launch interactive surfaces directly"));
    }
    let api = HttpTaskApi::new(config)?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let today = Local::now().date_naive();
    runtime.block_on(run(&api, today, command, writer))
}

/// Runs a one-shot command against `api`, writing human-readable output.
pub async fn run<W: Write>(
    api: &dyn TaskApi,
    today: NaiveDate,
    command: CliCommand,
    mut writer: W,
) -> Result<()> {
    match command {
        CliCommand::Board(filters) => handle_board(api, today, &filters, &mut writer).await,
        CliCommand::List(args) => handle_list(api, today, &args, &mut writer).await,
        CliCommand::Move(args) => handle_move(api, &args, &mut writer).await,
        CliCommand::Show(args) => handle_show(api, &args, &mut writer).await,
        CliCommand::Pos(args) => handle_pos(api, &args, &mut writer).await,
        CliCommand::Tui => Err(anyhow!("launch interactive surfaces directly")),
    }
}

async fn fetch_page(api: &dyn TaskApi, filters: &FilterArgs, today: NaiveDate, page: u32) -> Result<TaskPage> {
    let spec = filters.to_spec(today).with_page(page);
    tracing::debug!(summary = spec.summary().as_deref(), page, "querying tasks");
    api.query_tasks(&spec).await.context("failed to fetch tasks")
}

async fn handle_board<W: Write>(
    api: &dyn TaskApi,
    today: NaiveDate,
    filters: &FilterArgs,
    mut writer: W,
) -> Result<()> {
    let page = fetch_page(api, filters, today, 1).await?;
    let board = BoardProjection::from_tasks(&page.tasks);
    for column in board.columns() {
        writeln!(writer, "{}", ColumnHeading(column))?;
        match column.empty_marker() {
            Some(marker) => writeln!(writer, "  {marker}")?,
            None => {
                for card in &column.cards {
                    writeln!(writer, "  [{}] {}  ({})", card.id(), card.task.title(), card.label)?;
                }
            }
        }
    }
    writeln!(
        writer,
        "{}",
        Pagination::from_server(page.page, page.total_pages).label()
    )?;
    Ok(())
}

async fn handle_list<W: Write>(
    api: &dyn TaskApi,
    today: NaiveDate,
    args: &ListArgs,
    mut writer: W,
) -> Result<()> {
    let page = fetch_page(api, &args.filters, today, args.page).await?;
    let list = ListProjection::from_tasks(&page.tasks);

    let mut widths: Vec<usize> = LIST_HEADERS.iter().map(|h| h.chars().count()).collect();
    for row in list.rows() {
        for (width, cell) in widths.iter_mut().zip(row.cells.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }
    write_row(&mut writer, LIST_HEADERS.iter().copied(), &widths)?;
    match list.empty_marker() {
        Some(marker) => writeln!(writer, "{marker}")?,
        None => {
            for row in list.rows() {
                write_row(&mut writer, row.cells.iter().map(String::as_str), &widths)?;
            }
        }
    }

    let pagination = Pagination::from_server(page.page, page.total_pages);
    let links: Vec<String> = pagination
        .links()
        .into_iter()
        .map(|link| format!("{} (--page {})", link.label(), link.target()))
        .collect();
    if links.is_empty() {
        writeln!(writer, "{}", pagination.label())?;
    } else {
        writeln!(writer, "{}  {}", pagination.label(), links.join("  "))?;
    }
    Ok(())
}

fn write_row<'a, W, I>(mut writer: W, cells: I, widths: &[usize]) -> Result<()>
where
    W: Write,
    I: Iterator<Item = &'a str>,
{
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    writeln!(writer, "{}", line.trim_end())?;
    Ok(())
}

async fn handle_move<W: Write>(api: &dyn TaskApi, args: &MoveArgs, mut writer: W) -> Result<()> {
    api.update_status(&args.task_id, args.column)
        .await
        .with_context(|| format!("failed to move task {}", args.task_id))?;
    writeln!(writer, "Moved task {} to {}", args.task_id, args.column)?;
    Ok(())
}

async fn handle_show<W: Write>(api: &dyn TaskApi, args: &ShowArgs, mut writer: W) -> Result<()> {
    let task = match api.get_task(&args.task_id).await {
        Ok(task) => task,
        Err(ApiError::Rejected { message }) => {
            bail!(message.unwrap_or_else(|| ALERT_TASK_NOT_FOUND.to_string()))
        }
        Err(err) => return Err(anyhow!(err).context(ALERT_FETCH_FAILED)),
    };

    let mut form = TaskForm::default();
    form.populate(&task);
    let width = FormField::ALL
        .iter()
        .map(|field| field.label().chars().count())
        .max()
        .unwrap_or_default();
    for field in FormField::ALL {
        writeln!(writer, "{:<width$}  {}", field.label(), form.value(field))?;
    }
    Ok(())
}

async fn handle_pos<W: Write>(api: &dyn TaskApi, args: &PosArgs, mut writer: W) -> Result<()> {
    match (&args.id, &args.name) {
        (Some(id), _) => {
            let names = api
                .pos_names_for(id)
                .await
                .with_context(|| format!("failed to resolve POS names for {id}"))?;
            write_candidates(&mut writer, &format!("POS names for {id}"), names)
        }
        (None, Some(name)) => {
            let ids = api
                .pos_ids_for(name)
                .await
                .with_context(|| format!("failed to resolve POS ids for {name}"))?;
            write_candidates(&mut writer, &format!("POS ids for {name}"), ids)
        }
        (None, None) => {
            let universe = api.pos_universe().await.context("failed to fetch POS list")?;
            writeln!(writer, "POS names: {}", universe.pos_names.join(", "))?;
            writeln!(writer, "POS ids: {}", universe.pos_ids.join(", "))?;
            Ok(())
        }
    }
}

fn write_candidates<W: Write>(mut writer: W, heading: &str, values: Vec<String>) -> Result<()> {
    let mut options = OptionSet::new();
    options.fill_candidates(values);
    let listed: Vec<&str> = options.values().collect();
    if listed.is_empty() {
        writeln!(writer, "{heading}: none")?;
        return Ok(());
    }
    writeln!(writer, "{heading}: {}", listed.join(", "))?;
    if !options.selected().is_empty() {
        writeln!(writer, "Resolved: {}", options.selected())?;
    }
    Ok(())
}

struct ColumnHeading<'a>(&'a BoardColumn);

impl fmt::Display for ColumnHeading<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.0.cards.len();
        write!(
            f,
            "{} ({} task{})",
            self.0.status,
            count,
            if count == 1 { "" } else { "s" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use crate::model::{Task, TaskStatus};
    use clap::Parser;
    use kanban_core::memory::{Call, InMemoryTaskApi};
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    fn seeded() -> InMemoryTaskApi {
        let mut open = Task::new("7", TaskStatus::ToDo);
        open.description = Some("Count drawer".into());
        open.pos_id = Some("1007".into());
        open.pos_name = Some("Downtown".into());
        let mut done = Task::new("8", TaskStatus::Done);
        done.description = Some("File report".into());
        done.pos_id = Some("2001".into());
        done.pos_name = Some("Airport".into());
        InMemoryTaskApi::new(vec![open, done])
    }

    async fn run_args(api: &InMemoryTaskApi, args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(std::iter::once("kanban").chain(args.iter().copied()))
            .expect("parse cli");
        let mut output = Vec::new();
        run(api, today(), cli.command.expect("subcommand"), &mut output).await?;
        Ok(String::from_utf8(output).expect("utf8"))
    }

    #[tokio::test]
    async fn board_prints_columns_and_markers() {
        let api = seeded();
        let output = run_args(&api, &["board"]).await.expect("board");

        assert!(output.contains("To Do (1 task)\n  [7] Count drawer  (Status: To Do)"));
        assert!(output.contains("Backlog (0 tasks)\n  No Backlog tasks found."));
        assert!(output.contains("In Progress (0 tasks)\n  No In Progress tasks found."));
        assert!(output.ends_with("Page 1 of 1\n"));
    }

    #[tokio::test]
    async fn list_prints_table_and_page_links() {
        let api = seeded().with_page_size(1);
        let output = run_args(&api, &["list"]).await.expect("list");

        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("Task ID  POS ID  POS Name"));
        assert!(lines[1].starts_with("7"));
        assert_eq!(lines.last().copied(), Some("Page 1 of 2  Next (--page 2)"));
    }

    #[tokio::test]
    async fn list_shows_empty_marker() {
        let api = seeded();
        let output = run_args(&api, &["list", "--search", "nothing"]).await.expect("list");
        assert!(output.contains("\nNo tasks found\n"));
        assert!(output.ends_with("Page 1 of 1\n"));
    }

    #[tokio::test]
    async fn move_updates_status() {
        let api = seeded();
        let output = run_args(&api, &["move", "7", "inprogress"]).await.expect("move");

        assert_eq!(output, "Moved task 7 to In Progress\n");
        assert_eq!(
            api.calls(),
            vec![Call::UpdateStatus("7".into(), TaskStatus::InProgress)]
        );
    }

    #[tokio::test]
    async fn move_reports_backend_rejection() {
        let api = seeded();
        api.fail_status_updates(true);
        let err = run_args(&api, &["move", "7", "done"]).await.unwrap_err();
        assert_eq!(err.to_string(), "failed to move task 7");
        assert_eq!(err.root_cause().to_string(), "Database error");
    }

    #[tokio::test]
    async fn show_prints_form_fields() {
        let api = seeded();
        let output = run_args(&api, &["show", "7"]).await.expect("show");
        assert!(output.lines().any(|line| line.ends_with("Count drawer")));
        assert!(output.lines().any(|line| line.ends_with("To Do")));
        assert_eq!(output.lines().count(), FormField::ALL.len());
    }

    #[tokio::test]
    async fn show_missing_task_uses_backend_message() {
        let api = seeded();
        let err = run_args(&api, &["show", "99"]).await.unwrap_err();
        assert_eq!(err.to_string(), "Task not found");
    }

    #[tokio::test]
    async fn pos_resolution_reports_single_candidate() {
        let api = seeded();
        let output = run_args(&api, &["pos", "--id", "1007"]).await.expect("pos");
        assert_eq!(output, "POS names for 1007: Downtown\nResolved: Downtown\n");

        let output = run_args(&api, &["pos"]).await.expect("pos");
        assert_eq!(output, "POS names: Airport, Downtown\nPOS ids: 1007, 2001\n");
    }
}
