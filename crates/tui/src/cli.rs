use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{value_parser, ArgAction, Args, Parser, Subcommand};

use crate::core::filter::{self, FilterInputs, FilterSpec};
use crate::model::{self, TaskStatus};

#[derive(Parser, Debug, Clone)]
#[command(
    name = "kanban",
    version,
    about = "Keyboard-driven client for the reconciliation task board.",
    after_help = "Examples:\n  kanban                     Launch the board (same as `kanban tui`)\n  kanban list --status todo --page 2\n  kanban move 42 inprogress\n  kanban pos --id 1007"
)]
pub struct Cli {
    /// Override the data directory (defaults to platform-specific app dir)
    #[arg(long, value_name = "PATH", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Backend base URL (e.g. http://127.0.0.1:5000)
    #[arg(long = "base-url", value_name = "URL", global = true)]
    pub base_url: Option<String>,

    /// Tracing filter (e.g. "info", "kanban_core=debug")
    #[arg(long = "log", value_name = "DIRECTIVE", global = true)]
    pub log_filter: Option<String>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CliCommand {
    /// Launch the terminal board (default command)
    Tui,
    /// Print the four status columns for a filter
    Board(FilterArgs),
    /// Print the task table and pagination label
    List(ListArgs),
    /// Move a task to another column
    Move(MoveArgs),
    /// Print a single task as the lookup form shows it
    Show(ShowArgs),
    /// Resolve POS names and ids
    Pos(PosArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive search over description, notes and POS name
    #[arg(long, value_name = "TEXT")]
    pub search: Option<String>,

    /// Exact POS id
    #[arg(long = "pos-id", value_name = "ID")]
    pub pos_id: Option<String>,

    /// POS name
    #[arg(long = "pos-name", value_name = "NAME")]
    pub pos_name: Option<String>,

    /// Tasks starting on or after DATE (YYYY-MM-DD)
    #[arg(long = "from", value_name = "DATE", value_parser = parse_date_arg)]
    pub start_date: Option<NaiveDate>,

    /// Tasks due on or before DATE (YYYY-MM-DD)
    #[arg(long = "to", value_name = "DATE", value_parser = parse_date_arg)]
    pub end_date: Option<NaiveDate>,

    /// Restrict to columns (comma-separated or repeated flag)
    #[arg(long, value_enum, value_delimiter = ',', action = ArgAction::Append)]
    pub status: Vec<TaskStatus>,

    /// Restrict to priorities (comma-separated or repeated flag)
    #[arg(long, value_delimiter = ',', action = ArgAction::Append)]
    pub priority: Vec<String>,

    /// Tasks that start and are due today; ignores the other filters
    #[arg(long = "due-today")]
    pub due_today: bool,
}

impl FilterArgs {
    /// Builds the query. Dates given on the command line are always sent,
    /// even when they equal today.
    pub fn to_spec(&self, today: NaiveDate) -> FilterSpec {
        if self.due_today {
            return FilterSpec::due_today(today);
        }
        let mut inputs = FilterInputs::new(today);
        inputs.search = self.search.clone().unwrap_or_default();
        inputs.pos_id = self.pos_id.clone().unwrap_or_default();
        inputs.pos_name = self.pos_name.clone().unwrap_or_default();
        for status in &self.status {
            inputs.statuses.insert(*status);
        }
        for priority in &self.priority {
            inputs.priorities.insert(priority.trim().to_string());
        }
        let mut spec = filter::build(&inputs, today);
        spec.start_date = self.start_date;
        spec.end_date = self.end_date;
        spec
    }
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub filters: FilterArgs,

    /// Page to show (1-based)
    #[arg(long, default_value_t = 1, value_parser = value_parser!(u32).range(1..))]
    pub page: u32,
}

#[derive(Args, Debug, Clone)]
pub struct MoveArgs {
    /// Task id as shown on the card
    #[arg(value_name = "TASK_ID")]
    pub task_id: String,

    /// Target column (backlog, todo, inprogress, done)
    #[arg(value_name = "COLUMN", value_enum)]
    pub column: TaskStatus,
}

#[derive(Args, Debug, Clone)]
pub struct ShowArgs {
    #[arg(value_name = "TASK_ID")]
    pub task_id: String,
}

#[derive(Args, Debug, Clone, Default)]
pub struct PosArgs {
    /// List the POS names registered for an id
    #[arg(long, value_name = "ID", conflicts_with = "name")]
    pub id: Option<String>,

    /// List the POS ids registered under a name
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    model::parse_date(raw).ok_or_else(|| format!("'{raw}' is not a YYYY-MM-DD date"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("kanban").chain(args.iter().copied()))
            .expect("parse cli")
    }

    #[test]
    fn no_subcommand_means_tui() {
        assert!(parse(&[]).command.is_none());
    }

    #[test]
    fn list_filters_become_a_spec() {
        let cli = parse(&[
            "list",
            "--status",
            "todo,done",
            "--priority",
            "High",
            "--pos-id",
            " 1007 ",
            "--page",
            "3",
        ]);
        let Some(CliCommand::List(args)) = cli.command else {
            panic!("expected list command");
        };
        let spec = args.filters.to_spec(today());

        assert_eq!(args.page, 3);
        assert_eq!(spec.statuses, vec![TaskStatus::ToDo, TaskStatus::Done]);
        assert_eq!(spec.priorities, vec![String::from("High")]);
        assert_eq!(spec.pos_id, "1007");
        assert_eq!(spec.start_date, None);
    }

    #[test]
    fn explicit_dates_are_sent_even_when_today() {
        let cli = parse(&["board", "--from", "2024-05-14", "--to", "2024-06-01"]);
        let Some(CliCommand::Board(filters)) = cli.command else {
            panic!("expected board command");
        };
        let spec = filters.to_spec(today());
        assert_eq!(spec.start_date, Some(today()));
        assert_eq!(spec.end_date, NaiveDate::from_ymd_opt(2024, 6, 1));
    }

    #[test]
    fn due_today_overrides_other_filters() {
        let cli = parse(&["board", "--due-today", "--search", "drawer"]);
        let Some(CliCommand::Board(filters)) = cli.command else {
            panic!("expected board command");
        };
        assert_eq!(filters.to_spec(today()), FilterSpec::due_today(today()));
    }

    #[rstest]
    #[case(&["move", "42", "archive"])]
    #[case(&["list", "--page", "0"])]
    #[case(&["board", "--from", "14/05/2024"])]
    #[case(&["pos", "--id", "1", "--name", "Downtown"])]
    fn invalid_arguments_are_rejected(#[case] args: &[&str]) {
        let argv = std::iter::once("kanban").chain(args.iter().copied());
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn global_flags_apply_after_subcommand() {
        let cli = parse(&["board", "--base-url", "http://tasks:8000", "--log", "debug"]);
        assert_eq!(cli.base_url.as_deref(), Some("http://tasks:8000"));
        assert_eq!(cli.log_filter.as_deref(), Some("debug"));
    }
}
