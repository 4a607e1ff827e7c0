use std::time::Duration;

pub(crate) const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const TICK_RATE: Duration = Duration::from_millis(200);
pub(crate) const STATUS_TTL: Duration = Duration::from_secs(5);

pub(crate) const STATUS_SEARCH: &str = "Search as you type • Enter/Esc to finish";
pub(crate) const STATUS_FILTER_PICKER: &str =
    "Filter picker • ←/→ column • ↑/↓ move • Space toggle • s/e dates • c clear • Enter apply • Esc close";
pub(crate) const STATUS_FILTER_CLOSED: &str = "Filter changes kept but not applied (f, then Enter)";
pub(crate) const STATUS_DATE_PROMPT: &str =
    "Date as YYYY-MM-DD, empty to unset • Enter to set • Esc to cancel";
pub(crate) const STATUS_FORM: &str =
    "Task form • ↑/↓ field • Enter edit or cycle • s save • n create • Esc close";
pub(crate) const STATUS_FORM_EDIT: &str = "Editing field • Enter to keep • Esc to cancel";
pub(crate) const STATUS_HELP: &str = "Keyboard reference • Enter/Esc to close";
pub(crate) const STATUS_REFRESHING: &str = "Refreshing tasks";
pub(crate) const STATUS_CLEARED: &str = "Cleared filters";
pub(crate) const STATUS_DUE_TODAY: &str = "Showing tasks due today";
pub(crate) const STATUS_BOARD_ONLY: &str = "Switch to the board view (Tab) to move cards";
pub(crate) const STATUS_NO_PREVIOUS: &str = "Already on the first page";
pub(crate) const STATUS_NO_NEXT: &str = "No further pages";
