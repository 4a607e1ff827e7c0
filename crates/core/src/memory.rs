//! In-process [`TaskApi`] used by tests. Filters the way the backend does.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::api::{ApiError, PosUniverse, TaskApi, TaskPage};
use crate::filter::FilterSpec;
use crate::form::{CreateRequest, ModifyRequest};
use crate::model::{parse_date, Task, TaskStatus};

pub const RECORDS_PER_PAGE: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    PosUniverse,
    PosNames(String),
    PosIds(String),
    Query(FilterSpec),
    UpdateStatus(String, TaskStatus),
    GetTask(String),
    ModifyTask(String),
    /// Carries the POS id of the new task.
    CreateTask(String),
}

#[derive(Debug, Default)]
struct State {
    tasks: Vec<Task>,
    calls: Vec<Call>,
    fail_status_updates: bool,
    offline: bool,
    per_page: usize,
}

#[derive(Debug, Default)]
pub struct InMemoryTaskApi {
    state: Mutex<State>,
}

impl InMemoryTaskApi {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            state: Mutex::new(State {
                tasks,
                per_page: RECORDS_PER_PAGE,
                ..State::default()
            }),
        }
    }

    pub fn with_page_size(self, per_page: usize) -> Self {
        self.state.lock().per_page = per_page.max(1);
        self
    }

    pub fn fail_status_updates(&self, fail: bool) {
        self.state.lock().fail_status_updates = fail;
    }

    /// Every request fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    pub fn task(&self, task_id: &str) -> Option<Task> {
        self.state
            .lock()
            .tasks
            .iter()
            .find(|task| task.id == task_id)
            .cloned()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        let mut state = self.state.lock();
        state.calls.push(call);
        if state.offline {
            return Err(ApiError::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn pos_pairs(&self) -> Vec<(String, String)> {
        let state = self.state.lock();
        let mut pairs: Vec<(String, String)> = state
            .tasks
            .iter()
            .filter_map(|task| Some((task.pos_id.clone()?, task.pos_name.clone()?)))
            .collect();
        pairs.sort();
        pairs.dedup();
        pairs
    }
}

fn matches(task: &Task, filter: &FilterSpec) -> bool {
    let contains = |value: &Option<String>, needle: &str| {
        value
            .as_deref()
            .map(|v| v.to_lowercase().contains(needle))
            .unwrap_or(false)
    };

    let search = filter.search_query.trim().to_lowercase();
    if !search.is_empty()
        && !(contains(&task.description, &search)
            || contains(&task.notes, &search)
            || contains(&task.pos_name, &search))
    {
        return false;
    }
    if !filter.pos_id.is_empty() && task.pos_id.as_deref() != Some(filter.pos_id.as_str()) {
        return false;
    }
    if !filter.pos_name.is_empty() && !contains(&task.pos_name, &filter.pos_name.to_lowercase())
    {
        return false;
    }
    if !filter.statuses.is_empty() && !filter.statuses.contains(&task.status) {
        return false;
    }
    if !filter.priorities.is_empty()
        && !task
            .priority
            .as_ref()
            .map(|p| filter.priorities.contains(p))
            .unwrap_or(false)
    {
        return false;
    }
    if let Some(start) = filter.start_date {
        if !task.start_date.map(|d| d >= start).unwrap_or(false) {
            return false;
        }
    }
    if let Some(end) = filter.end_date {
        if !task.due_date.map(|d| d <= end).unwrap_or(false) {
            return false;
        }
    }
    true
}

#[async_trait]
impl TaskApi for InMemoryTaskApi {
    async fn pos_universe(&self) -> Result<PosUniverse, ApiError> {
        self.record(Call::PosUniverse)?;
        let pairs = self.pos_pairs();
        let mut pos_names: Vec<String> = pairs.iter().map(|(_, name)| name.clone()).collect();
        pos_names.sort();
        pos_names.dedup();
        Ok(PosUniverse {
            pos_names,
            pos_ids: pairs.into_iter().map(|(id, _)| id).collect(),
        })
    }

    async fn pos_names_for(&self, pos_id: &str) -> Result<Vec<String>, ApiError> {
        self.record(Call::PosNames(pos_id.to_string()))?;
        Ok(self
            .pos_pairs()
            .into_iter()
            .filter(|(id, _)| id == pos_id)
            .map(|(_, name)| name)
            .collect())
    }

    async fn pos_ids_for(&self, pos_name: &str) -> Result<Vec<String>, ApiError> {
        self.record(Call::PosIds(pos_name.to_string()))?;
        Ok(self
            .pos_pairs()
            .into_iter()
            .filter(|(_, name)| name == pos_name)
            .map(|(id, _)| id)
            .collect())
    }

    async fn query_tasks(&self, filter: &FilterSpec) -> Result<TaskPage, ApiError> {
        self.record(Call::Query(filter.clone()))?;
        let state = self.state.lock();
        let matching: Vec<&Task> = state.tasks.iter().filter(|t| matches(t, filter)).collect();
        let total_pages = matching.len().div_ceil(state.per_page) as u32;
        let page = filter.page.max(1);
        let tasks = matching
            .into_iter()
            .skip((page as usize - 1) * state.per_page)
            .take(state.per_page)
            .cloned()
            .collect();
        Ok(TaskPage {
            tasks,
            page,
            total_pages,
        })
    }

    async fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<(), ApiError> {
        self.record(Call::UpdateStatus(task_id.to_string(), status))?;
        let mut state = self.state.lock();
        if state.fail_status_updates {
            return Err(ApiError::rejected("Database error"));
        }
        match state.tasks.iter_mut().find(|task| task.id == task_id) {
            Some(task) => {
                task.status = status;
                Ok(())
            }
            None => Err(ApiError::rejected("Task not found")),
        }
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, ApiError> {
        self.record(Call::GetTask(task_id.to_string()))?;
        self.task(task_id)
            .ok_or_else(|| ApiError::rejected("Task not found"))
    }

    async fn modify_task(
        &self,
        task_id: &str,
        request: &ModifyRequest,
    ) -> Result<Option<String>, ApiError> {
        self.record(Call::ModifyTask(task_id.to_string()))?;
        let mut state = self.state.lock();
        let Some(task) = state.tasks.iter_mut().find(|task| task.id == task_id) else {
            return Err(ApiError::rejected("Task not found"));
        };
        let text = |value: &str| Some(value.to_string()).filter(|v| !v.is_empty());
        task.description = text(&request.description);
        task.priority = text(&request.priority);
        task.notes = text(&request.notes);
        task.certified = request.certified;
        if let Some(status) = request.status {
            task.status = status;
        }
        Ok(Some(String::from("Task updated")))
    }

    async fn create_task(&self, request: &CreateRequest) -> Result<(), ApiError> {
        self.record(Call::CreateTask(request.pos_id.clone()))?;
        let pos_name = self
            .pos_pairs()
            .into_iter()
            .find(|(id, _)| *id == request.pos_id)
            .map(|(_, name)| name);
        let mut state = self.state.lock();
        let next_id = state
            .tasks
            .iter()
            .filter_map(|task| task.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let date = |value: &Option<String>| value.as_deref().and_then(parse_date);
        let mut task = Task::new(
            next_id.to_string(),
            request.status.unwrap_or(TaskStatus::Backlog),
        );
        task.pos_id = Some(request.pos_id.clone());
        task.pos_name = pos_name;
        task.description = request.description.clone();
        task.priority = request.priority.clone();
        task.start_date = date(&request.start_date);
        task.due_date = date(&request.due_date);
        task.reconciliation_date = date(&request.reconciliation_date);
        task.notes = request.notes.clone();
        task.blocker_description = request.blocker_desc.clone();
        task.blocker_responsible = request.blocker_responsible.clone();
        task.certified = request.certified;
        state.tasks.push(task);
        Ok(())
    }
}
