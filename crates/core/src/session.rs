//! Event dispatcher tying the board components together.
//!
//! UI events become plain [`Command`] values. A command is executed against a
//! [`TaskApi`] and its [`Completion`] is fed back into the session, which is
//! the only place rendered state changes.

use std::collections::VecDeque;

use chrono::NaiveDate;

use crate::api::{ApiError, PosUniverse, TaskApi, TaskPage};
use crate::board::{BoardProjection, ListProjection};
use crate::drag::{DragController, DropOutcome, MoveState};
use crate::filter::{self, FilterInputs, FilterSpec};
use crate::form::{CreateRequest, ModifyRequest, TaskForm};
use crate::model::{Task, TaskStatus};
use crate::pagination::{PageLink, Pagination, PaginationController};
use crate::resolver::{PosRequest, PosResolver};

pub const ALERT_TASK_NOT_FOUND: &str = "Task not found!";
pub const ALERT_FETCH_FAILED: &str =
    "Error fetching task. Please check the console for more details.";
pub const ALERT_ID_REQUIRED: &str = "Task ID is required to modify a task.";
pub const ALERT_MODIFIED: &str = "Task modified successfully!";
pub const ALERT_MODIFY_FAILED: &str = "Failed to modify task.";
pub const ALERT_CREATED: &str = "Task created successfully!";
pub const ALERT_CREATE_FAILED: &str = "An error occurred while creating the task.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Load,
    SearchChanged(String),
    PosIdSelected(String),
    PosNameSelected(String),
    StartDateChanged(Option<NaiveDate>),
    EndDateChanged(Option<NaiveDate>),
    StatusToggled(TaskStatus),
    PriorityToggled(String),
    ApplyFilters,
    DueToday,
    ClearFilters,
    GoToPage(u32),
    FollowLink(PageLink),
    Refresh,
    CardDropped {
        task_id: String,
        column: String,
        index: Option<usize>,
    },
    TaskIdEntered(String),
    SaveForm,
    /// Submits the form as a new task. The task id field is ignored.
    CreateTask,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    FetchPosUniverse,
    FetchPosNames { pos_id: String },
    FetchPosIds { pos_name: String },
    QueryTasks { seq: u64, filter: FilterSpec },
    UpdateStatus { task_id: String, status: TaskStatus },
    LoadTask { task_id: String },
    ModifyTask { task_id: String, request: ModifyRequest },
    CreateTask { request: CreateRequest },
}

impl From<PosRequest> for Command {
    fn from(request: PosRequest) -> Self {
        match request {
            PosRequest::Universe => Command::FetchPosUniverse,
            PosRequest::NamesForId(pos_id) => Command::FetchPosNames { pos_id },
            PosRequest::IdsForName(pos_name) => Command::FetchPosIds { pos_name },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    PosUniverse(Result<PosUniverse, ApiError>),
    PosNames(Result<Vec<String>, ApiError>),
    PosIds(Result<Vec<String>, ApiError>),
    Tasks {
        seq: u64,
        result: Result<TaskPage, ApiError>,
    },
    StatusUpdated {
        task_id: String,
        result: Result<(), ApiError>,
    },
    TaskLoaded {
        task_id: String,
        result: Result<Task, ApiError>,
    },
    TaskModified {
        task_id: String,
        result: Result<Option<String>, ApiError>,
    },
    TaskCreated(Result<(), ApiError>),
}

/// Something the user must acknowledge. Only the form flows raise these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Alert(String),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Reaction {
    pub commands: Vec<Command>,
    pub notices: Vec<Notice>,
}

impl Reaction {
    fn command(command: Command) -> Self {
        Self {
            commands: vec![command],
            notices: Vec::new(),
        }
    }

    fn alert(message: impl Into<String>) -> Self {
        Self {
            commands: Vec::new(),
            notices: vec![Notice::Alert(message.into())],
        }
    }
}

/// Runs one command against the backend.
pub async fn execute(api: &dyn TaskApi, command: Command) -> Completion {
    match command {
        Command::FetchPosUniverse => Completion::PosUniverse(api.pos_universe().await),
        Command::FetchPosNames { pos_id } => Completion::PosNames(api.pos_names_for(&pos_id).await),
        Command::FetchPosIds { pos_name } => Completion::PosIds(api.pos_ids_for(&pos_name).await),
        Command::QueryTasks { seq, filter } => Completion::Tasks {
            seq,
            result: api.query_tasks(&filter).await,
        },
        Command::UpdateStatus { task_id, status } => {
            let result = api.update_status(&task_id, status).await;
            Completion::StatusUpdated { task_id, result }
        }
        Command::LoadTask { task_id } => {
            let result = api.get_task(&task_id).await;
            Completion::TaskLoaded { task_id, result }
        }
        Command::ModifyTask { task_id, request } => {
            let result = api.modify_task(&task_id, &request).await;
            Completion::TaskModified { task_id, result }
        }
        Command::CreateTask { request } => Completion::TaskCreated(api.create_task(&request).await),
    }
}

#[derive(Debug)]
pub struct Session {
    today: NaiveDate,
    inputs: FilterInputs,
    resolver: PosResolver,
    pagination: PaginationController,
    board: BoardProjection,
    list: ListProjection,
    tasks: Vec<Task>,
    drag: DragController,
    form: TaskForm,
    issued_seq: u64,
    rendered_seq: Option<u64>,
    answered_seq: u64,
}

impl Session {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            inputs: FilterInputs::new(today),
            resolver: PosResolver::new(),
            pagination: PaginationController::new(),
            board: BoardProjection::default(),
            list: ListProjection::default(),
            tasks: Vec::new(),
            drag: DragController::new(),
            form: TaskForm::default(),
            issued_seq: 0,
            rendered_seq: None,
            answered_seq: 0,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn inputs(&self) -> &FilterInputs {
        &self.inputs
    }

    pub fn resolver(&self) -> &PosResolver {
        &self.resolver
    }

    pub fn board(&self) -> &BoardProjection {
        &self.board
    }

    pub fn list(&self) -> &ListProjection {
        &self.list
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination.pagination()
    }

    pub fn active_filter(&self) -> Option<&FilterSpec> {
        self.pagination.last_filter()
    }

    pub fn drag(&self) -> &DragController {
        &self.drag
    }

    pub fn form(&self) -> &TaskForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut TaskForm {
        &mut self.form
    }

    /// True once any query response has been rendered.
    pub fn has_rendered(&self) -> bool {
        self.rendered_seq.is_some()
    }

    /// True while the newest query has not come back yet.
    pub fn is_loading(&self) -> bool {
        self.answered_seq < self.issued_seq
    }

    pub fn dispatch(&mut self, event: UiEvent) -> Reaction {
        match event {
            UiEvent::Load | UiEvent::ClearFilters => {
                self.inputs.reset(self.today);
                let universe = Command::from(self.resolver.reset());
                let query = self.issue_query(FilterSpec::unfiltered());
                Reaction {
                    commands: vec![universe, query],
                    notices: Vec::new(),
                }
            }
            UiEvent::SearchChanged(text) => {
                self.inputs.search = text;
                self.apply_inputs()
            }
            UiEvent::PosIdSelected(pos_id) => {
                self.inputs.pos_id = pos_id.clone();
                let request = self.resolver.select_id(&pos_id);
                Reaction {
                    commands: request.map(Command::from).into_iter().collect(),
                    notices: Vec::new(),
                }
            }
            UiEvent::PosNameSelected(pos_name) => {
                self.inputs.pos_name = pos_name.clone();
                let request = self.resolver.select_name(&pos_name);
                Reaction {
                    commands: request.map(Command::from).into_iter().collect(),
                    notices: Vec::new(),
                }
            }
            UiEvent::StartDateChanged(date) => {
                self.inputs.start_date = date;
                Reaction::default()
            }
            UiEvent::EndDateChanged(date) => {
                self.inputs.end_date = date;
                Reaction::default()
            }
            UiEvent::StatusToggled(status) => {
                self.inputs.toggle_status(status);
                Reaction::default()
            }
            UiEvent::PriorityToggled(priority) => {
                self.inputs.toggle_priority(&priority);
                Reaction::default()
            }
            UiEvent::ApplyFilters => self.apply_inputs(),
            UiEvent::DueToday => {
                let query = self.issue_query(FilterSpec::due_today(self.today));
                Reaction::command(query)
            }
            UiEvent::GoToPage(page) => {
                let filter = self.pagination.go_to_page(page);
                self.reissue(filter)
            }
            UiEvent::FollowLink(link) => {
                let filter = self.pagination.follow(link);
                self.reissue(filter)
            }
            UiEvent::Refresh => {
                let filter = self.pagination.reload();
                self.reissue(Some(filter))
            }
            UiEvent::CardDropped {
                task_id,
                column,
                index,
            } => {
                let outcome = self
                    .drag
                    .drop_card(&mut self.board, &task_id, &column, index);
                match outcome {
                    DropOutcome::Applied(update) => {
                        self.sync_list();
                        Reaction::command(Command::UpdateStatus {
                            task_id: update.task_id,
                            status: update.status,
                        })
                    }
                    DropOutcome::Unchanged | DropOutcome::Rejected(_) => Reaction::default(),
                }
            }
            UiEvent::TaskIdEntered(task_id) => {
                self.form.task_id = task_id;
                match self.form.task_id() {
                    None => {
                        self.form.clear_fields();
                        Reaction::default()
                    }
                    Some(id) => Reaction::command(Command::LoadTask {
                        task_id: id.to_string(),
                    }),
                }
            }
            UiEvent::SaveForm => match self.form.to_request() {
                None => Reaction::alert(ALERT_ID_REQUIRED),
                Some(request) => Reaction::command(Command::ModifyTask {
                    task_id: request.task_id.clone(),
                    request,
                }),
            },
            UiEvent::CreateTask => match self.form.to_create_request() {
                Err(err) => Reaction::alert(err.to_string()),
                Ok(request) => Reaction::command(Command::CreateTask { request }),
            },
        }
    }

    pub fn complete(&mut self, completion: Completion) -> Reaction {
        match completion {
            Completion::PosUniverse(result) => {
                self.resolver.complete_universe(result);
                self.inputs.pos_id = self.resolver.ids().selected().to_string();
                self.inputs.pos_name = self.resolver.names().selected().to_string();
                Reaction::default()
            }
            Completion::PosNames(result) => {
                let applied = result.is_ok();
                self.resolver.complete_names(result);
                if applied {
                    self.inputs.pos_name = self.resolver.names().selected().to_string();
                }
                Reaction::default()
            }
            Completion::PosIds(result) => {
                let applied = result.is_ok();
                self.resolver.complete_ids(result);
                if applied {
                    self.inputs.pos_id = self.resolver.ids().selected().to_string();
                }
                Reaction::default()
            }
            Completion::Tasks { seq, result } => {
                self.render(seq, result);
                Reaction::default()
            }
            Completion::StatusUpdated { task_id, result } => {
                let state = self.drag.settle(&mut self.board, &task_id, result);
                if state == MoveState::RolledBack {
                    self.sync_list();
                }
                Reaction::default()
            }
            Completion::TaskLoaded { task_id, result } => self.on_task_loaded(task_id, result),
            Completion::TaskModified { task_id, result } => match result {
                Ok(message) => {
                    tracing::info!(task_id = %task_id, reason = message.as_deref(), "task modified");
                    let mut reaction = self.dispatch(UiEvent::Refresh);
                    reaction.notices.push(Notice::Alert(ALERT_MODIFIED.to_string()));
                    reaction
                }
                Err(err) => {
                    tracing::error!(task_id = %task_id, error = %err, "failed to modify task");
                    Reaction::alert(err.backend_message().unwrap_or(ALERT_MODIFY_FAILED))
                }
            },
            Completion::TaskCreated(result) => match result {
                Ok(()) => {
                    tracing::info!("task created");
                    self.form = TaskForm::default();
                    let mut reaction = self.dispatch(UiEvent::Refresh);
                    reaction.notices.push(Notice::Alert(ALERT_CREATED.to_string()));
                    reaction
                }
                Err(err) => {
                    tracing::error!(error = %err, "failed to create task");
                    Reaction::alert(err.backend_message().unwrap_or(ALERT_CREATE_FAILED))
                }
            },
        }
    }

    /// Executes `reaction` and every follow-up command in order.
    pub async fn run_until_idle(&mut self, api: &dyn TaskApi, reaction: Reaction) -> Vec<Notice> {
        let mut notices = reaction.notices;
        let mut queue: VecDeque<Command> = reaction.commands.into();
        while let Some(command) = queue.pop_front() {
            let completion = execute(api, command).await;
            let follow_up = self.complete(completion);
            notices.extend(follow_up.notices);
            queue.extend(follow_up.commands);
        }
        notices
    }

    fn apply_inputs(&mut self) -> Reaction {
        let spec = filter::build(&self.inputs, self.today);
        Reaction::command(self.issue_query(spec))
    }

    fn issue_query(&mut self, spec: FilterSpec) -> Command {
        let filter = self.pagination.apply(spec);
        self.issued_seq += 1;
        Command::QueryTasks {
            seq: self.issued_seq,
            filter,
        }
    }

    /// Queries with an already paged filter. `None` means the page was refused.
    fn reissue(&mut self, filter: Option<FilterSpec>) -> Reaction {
        match filter {
            Some(filter) => {
                self.issued_seq += 1;
                Reaction::command(Command::QueryTasks {
                    seq: self.issued_seq,
                    filter,
                })
            }
            None => Reaction::default(),
        }
    }

    fn render(&mut self, seq: u64, result: Result<TaskPage, ApiError>) {
        if seq < self.issued_seq {
            tracing::debug!(seq, latest = self.issued_seq, "discarding stale task response");
            return;
        }
        self.answered_seq = seq;
        match result {
            Ok(page) => {
                tracing::debug!(
                    count = page.tasks.len(),
                    page = page.page,
                    total_pages = page.total_pages,
                    "rendering tasks"
                );
                self.board.replace_with(BoardProjection::from_tasks(&page.tasks));
                self.list = ListProjection::from_tasks(&page.tasks);
                self.tasks = page.tasks;
                self.pagination.on_response(page.page, page.total_pages);
                self.rendered_seq = Some(seq);
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to fetch tasks; keeping current view");
            }
        }
    }

    fn sync_list(&mut self) {
        for task in &mut self.tasks {
            if let Some(card) = self.board.card(&task.id) {
                task.status = card.status;
            }
        }
        self.list = ListProjection::from_tasks(&self.tasks);
    }

    fn on_task_loaded(&mut self, task_id: String, result: Result<Task, ApiError>) -> Reaction {
        if self.form.task_id() != Some(task_id.as_str()) {
            tracing::debug!(task_id = %task_id, "ignoring lookup for a superseded task id");
            return Reaction::default();
        }
        match result {
            Ok(task) => {
                self.form.populate(&task);
                Reaction::default()
            }
            Err(ApiError::Rejected { message }) => {
                tracing::error!(task_id = %task_id, reason = message.as_deref(), "task lookup rejected");
                Reaction::alert(message.unwrap_or_else(|| ALERT_TASK_NOT_FOUND.to_string()))
            }
            Err(err) => {
                tracing::error!(task_id = %task_id, error = %err, "error fetching task");
                Reaction::alert(ALERT_FETCH_FAILED)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardColumn;
    use crate::memory::{Call, InMemoryTaskApi};
    use crate::model::Certified;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    fn task(id: &str, status: TaskStatus, pos: (&str, &str)) -> Task {
        let mut task = Task::new(id, status);
        task.pos_id = Some(pos.0.into());
        task.pos_name = Some(pos.1.into());
        task.description = Some(format!("Task {id}"));
        task
    }

    fn seeded() -> InMemoryTaskApi {
        InMemoryTaskApi::new(vec![
            task("6", TaskStatus::ToDo, ("1007", "Downtown")),
            task("5", TaskStatus::Backlog, ("2001", "Airport")),
            task("4", TaskStatus::ToDo, ("2002", "Airport")),
            task("3", TaskStatus::Done, ("1007", "Downtown")),
        ])
    }

    async fn loaded(api: &InMemoryTaskApi) -> Session {
        let mut session = Session::new(today());
        let reaction = session.dispatch(UiEvent::Load);
        session.run_until_idle(api, reaction).await;
        api.clear_calls();
        session
    }

    fn column_ids(session: &Session, status: TaskStatus) -> Vec<String> {
        session
            .board()
            .column(status)
            .cards
            .iter()
            .map(|card| card.id().to_string())
            .collect()
    }

    #[tokio::test]
    async fn load_fetches_universe_and_unfiltered_tasks() {
        let api = seeded();
        let mut session = Session::new(today());

        let reaction = session.dispatch(UiEvent::Load);
        session.run_until_idle(&api, reaction).await;

        assert_eq!(
            api.calls(),
            vec![Call::PosUniverse, Call::Query(FilterSpec::unfiltered())]
        );
        assert_eq!(session.board().task_count(), 4);
        assert_eq!(
            session.resolver().names().values().collect::<Vec<_>>(),
            vec!["Airport", "Downtown"]
        );
        assert_eq!(session.pagination().label(), "Page 1 of 1");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn status_filter_populates_only_matching_column() {
        let api = seeded();
        let mut session = loaded(&api).await;

        session.dispatch(UiEvent::StatusToggled(TaskStatus::ToDo));
        let reaction = session.dispatch(UiEvent::ApplyFilters);
        session.run_until_idle(&api, reaction).await;

        assert_eq!(column_ids(&session, TaskStatus::ToDo), vec!["6", "4"]);
        let markers: Vec<Option<String>> = session
            .board()
            .columns()
            .iter()
            .map(BoardColumn::empty_marker)
            .collect();
        assert_eq!(markers.iter().filter(|m| m.is_some()).count(), 3);
        assert!(markers[TaskStatus::ToDo.index()].is_none());
    }

    #[tokio::test]
    async fn clear_filters_refetches_universe_and_first_page() {
        let api = seeded().with_page_size(2);
        let mut session = loaded(&api).await;
        let reaction = session.dispatch(UiEvent::GoToPage(2));
        session.run_until_idle(&api, reaction).await;
        session.dispatch(UiEvent::PriorityToggled("High".into()));
        api.clear_calls();

        let reaction = session.dispatch(UiEvent::ClearFilters);
        session.run_until_idle(&api, reaction).await;

        assert_eq!(
            api.calls(),
            vec![Call::PosUniverse, Call::Query(FilterSpec::unfiltered())]
        );
        assert!(session.inputs().priorities.is_empty());
        assert_eq!(session.pagination().current(), 1);
    }

    #[tokio::test]
    async fn identical_filters_render_identical_boards() {
        let api = seeded();
        let mut session = loaded(&api).await;

        session.dispatch(UiEvent::StatusToggled(TaskStatus::Done));
        let reaction = session.dispatch(UiEvent::ApplyFilters);
        session.run_until_idle(&api, reaction).await;
        let first = session.board().columns().to_vec();

        let reaction = session.dispatch(UiEvent::ApplyFilters);
        session.run_until_idle(&api, reaction).await;

        assert_eq!(session.board().columns(), first.as_slice());
    }

    #[tokio::test]
    async fn selecting_pos_id_resolves_single_name() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let reaction = session.dispatch(UiEvent::PosIdSelected("1007".into()));
        session.run_until_idle(&api, reaction).await;

        assert_eq!(api.calls(), vec![Call::PosNames("1007".into())]);
        assert_eq!(session.resolver().names().selected(), "Downtown");
        assert_eq!(session.inputs().pos_name, "Downtown");
    }

    #[tokio::test]
    async fn selecting_pos_name_with_many_ids_keeps_all_selected() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let reaction = session.dispatch(UiEvent::PosNameSelected("Airport".into()));
        session.run_until_idle(&api, reaction).await;

        assert_eq!(
            session.resolver().ids().values().collect::<Vec<_>>(),
            vec!["2001", "2002"]
        );
        assert_eq!(session.inputs().pos_id, "");
    }

    #[tokio::test]
    async fn failed_drag_rolls_back_card() {
        let api = seeded();
        let mut session = loaded(&api).await;
        let before = session.board().columns().to_vec();
        api.fail_status_updates(true);

        let reaction = session.dispatch(UiEvent::CardDropped {
            task_id: "5".into(),
            column: "done".into(),
            index: None,
        });
        assert_eq!(session.board().card("5").unwrap().status, TaskStatus::Done);
        assert_eq!(session.list().rows()[1].cells[6], "Done");

        session.run_until_idle(&api, reaction).await;

        assert_eq!(
            api.calls(),
            vec![Call::UpdateStatus("5".into(), TaskStatus::Done)]
        );
        assert_eq!(session.board().columns(), before.as_slice());
        assert_eq!(session.board().card("5").unwrap().label, "Status: Backlog");
        assert_eq!(session.list().rows()[1].cells[6], "Backlog");
        assert!(session.board().is_consistent());
    }

    #[tokio::test]
    async fn successful_drag_persists() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let reaction = session.dispatch(UiEvent::CardDropped {
            task_id: "4".into(),
            column: "inprogress".into(),
            index: None,
        });
        session.run_until_idle(&api, reaction).await;

        assert_eq!(column_ids(&session, TaskStatus::InProgress), vec!["4"]);
        assert_eq!(
            api.task("4").map(|task| task.status),
            Some(TaskStatus::InProgress)
        );
    }

    #[tokio::test]
    async fn drop_on_own_column_makes_no_call() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let reaction = session.dispatch(UiEvent::CardDropped {
            task_id: "3".into(),
            column: "done".into(),
            index: Some(0),
        });

        assert_eq!(reaction, Reaction::default());
        session.run_until_idle(&api, reaction).await;
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn stale_query_response_is_discarded() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let older = session.dispatch(UiEvent::SearchChanged("Task 6".into()));
        let newer = session.dispatch(UiEvent::SearchChanged("Task 5".into()));

        // The newer response lands first.
        session.run_until_idle(&api, newer).await;
        session.run_until_idle(&api, older).await;

        assert_eq!(session.board().task_count(), 1);
        assert_eq!(column_ids(&session, TaskStatus::Backlog), vec!["5"]);
    }

    #[tokio::test]
    async fn failed_query_keeps_previous_render() {
        let api = seeded();
        let mut session = loaded(&api).await;
        let before = session.board().columns().to_vec();
        api.set_offline(true);

        let reaction = session.dispatch(UiEvent::DueToday);
        session.run_until_idle(&api, reaction).await;

        assert_eq!(session.board().columns(), before.as_slice());
        assert!(!session.is_loading(), "a failed answer still ends loading");
    }

    #[tokio::test]
    async fn page_links_reissue_last_filter() {
        let api = seeded().with_page_size(1);
        let mut session = loaded(&api).await;
        session.dispatch(UiEvent::StatusToggled(TaskStatus::ToDo));
        let reaction = session.dispatch(UiEvent::ApplyFilters);
        session.run_until_idle(&api, reaction).await;
        assert_eq!(session.pagination().label(), "Page 1 of 2");
        assert!(session.pagination().previous().is_none());

        let next = session.pagination().next().unwrap();
        let reaction = session.dispatch(UiEvent::FollowLink(next));
        session.run_until_idle(&api, reaction).await;

        assert_eq!(column_ids(&session, TaskStatus::ToDo), vec!["4"]);
        assert!(session.pagination().next().is_none());
        assert_eq!(session.dispatch(UiEvent::GoToPage(3)), Reaction::default());
    }

    #[tokio::test]
    async fn lookup_populates_form() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let reaction = session.dispatch(UiEvent::TaskIdEntered("4".into()));
        let notices = session.run_until_idle(&api, reaction).await;

        assert!(notices.is_empty());
        assert_eq!(session.form().pos_id, "2002");
        assert_eq!(session.form().status, Some(TaskStatus::ToDo));
    }

    #[tokio::test]
    async fn lookup_failures_raise_alerts() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let reaction = session.dispatch(UiEvent::TaskIdEntered("99".into()));
        let notices = session.run_until_idle(&api, reaction).await;
        assert_eq!(notices, vec![Notice::Alert("Task not found".into())]);

        api.set_offline(true);
        let reaction = session.dispatch(UiEvent::TaskIdEntered("4".into()));
        let notices = session.run_until_idle(&api, reaction).await;
        assert_eq!(notices, vec![Notice::Alert(ALERT_FETCH_FAILED.into())]);
    }

    #[tokio::test]
    async fn empty_task_id_clears_form_without_request() {
        let api = seeded();
        let mut session = loaded(&api).await;
        let reaction = session.dispatch(UiEvent::TaskIdEntered("4".into()));
        session.run_until_idle(&api, reaction).await;
        api.clear_calls();

        let reaction = session.dispatch(UiEvent::TaskIdEntered(String::new()));

        assert_eq!(reaction, Reaction::default());
        assert_eq!(session.form(), &TaskForm::default());
    }

    #[tokio::test]
    async fn save_without_id_alerts() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let notices = {
            let reaction = session.dispatch(UiEvent::SaveForm);
            session.run_until_idle(&api, reaction).await
        };

        assert_eq!(notices, vec![Notice::Alert(ALERT_ID_REQUIRED.into())]);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn save_modifies_and_reloads() {
        let api = seeded();
        let mut session = loaded(&api).await;
        let reaction = session.dispatch(UiEvent::TaskIdEntered("6".into()));
        session.run_until_idle(&api, reaction).await;
        session.form_mut().certified = Certified::Yes;
        session.form_mut().description = "Recount drawer".into();
        api.clear_calls();

        let reaction = session.dispatch(UiEvent::SaveForm);
        let notices = session.run_until_idle(&api, reaction).await;

        assert_eq!(notices, vec![Notice::Alert(ALERT_MODIFIED.into())]);
        assert_eq!(
            api.calls(),
            vec![
                Call::ModifyTask("6".into()),
                Call::Query(FilterSpec::unfiltered())
            ]
        );
        assert_eq!(
            session.board().card("6").unwrap().task.description.as_deref(),
            Some("Recount drawer")
        );
    }

    #[tokio::test]
    async fn failed_save_uses_backend_message() {
        let api = seeded();
        let mut session = loaded(&api).await;
        session.form_mut().task_id = "404".into();

        let reaction = session.dispatch(UiEvent::SaveForm);
        let notices = session.run_until_idle(&api, reaction).await;

        assert_eq!(notices, vec![Notice::Alert("Task not found".into())]);
    }

    #[tokio::test]
    async fn create_adds_task_and_reloads() {
        let api = seeded();
        let mut session = loaded(&api).await;
        session.form_mut().pos_id = "1007".into();
        session.form_mut().description = "Order coin rolls".into();
        session.form_mut().status = Some(TaskStatus::InProgress);

        let reaction = session.dispatch(UiEvent::CreateTask);
        let notices = session.run_until_idle(&api, reaction).await;

        assert_eq!(notices, vec![Notice::Alert(ALERT_CREATED.into())]);
        assert_eq!(
            api.calls(),
            vec![
                Call::CreateTask("1007".into()),
                Call::Query(FilterSpec::unfiltered())
            ]
        );
        let created = session.board().card("7").expect("new card");
        assert_eq!(created.task.pos_name.as_deref(), Some("Downtown"));
        assert_eq!(column_ids(&session, TaskStatus::InProgress), vec!["7"]);
        assert_eq!(session.form(), &TaskForm::default());
    }

    #[tokio::test]
    async fn create_validation_alerts_without_request() {
        let api = seeded();
        let mut session = loaded(&api).await;

        let reaction = session.dispatch(UiEvent::CreateTask);
        assert!(reaction.commands.is_empty());
        assert_eq!(reaction.notices, vec![Notice::Alert("POS ID is required.".into())]);

        session.form_mut().pos_id = "1007".into();
        session.form_mut().due_date = "tomorrow".into();
        let reaction = session.dispatch(UiEvent::CreateTask);
        assert_eq!(
            reaction.notices,
            vec![Notice::Alert("Invalid date format. Please use YYYY-MM-DD.".into())]
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn failed_create_keeps_form() {
        let api = seeded();
        let mut session = loaded(&api).await;
        session.form_mut().pos_id = "1007".into();
        api.set_offline(true);

        let reaction = session.dispatch(UiEvent::CreateTask);
        let notices = session.run_until_idle(&api, reaction).await;

        assert_eq!(notices, vec![Notice::Alert(ALERT_CREATE_FAILED.into())]);
        assert_eq!(session.form().pos_id, "1007");
    }
}
