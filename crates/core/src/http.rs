use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Serialize;
use serde_json::json;

use crate::api::{self, ApiError, PosUniverse, TaskApi, TaskPage};
use crate::config::AppConfig;
use crate::filter::FilterSpec;
use crate::form::{CreateRequest, ModifyRequest};
use crate::model::{Task, TaskStatus};

pub const POS_UNIVERSE_PATH: &str = "/api/pos_names_and_ids";
pub const POS_NAMES_PATH: &str = "/api/pos_names";
pub const POS_IDS_PATH: &str = "/api/pos_ids";
pub const UPDATE_STATUS_PATH: &str = "/api/update_task_status";
pub const GET_TASK_PATH: &str = "/api/get_task";
pub const MODIFY_TASK_PATH: &str = "/api/modify_task";
pub const CREATE_TASK_PATH: &str = "/create";

/// Builds endpoint URLs below a base URL that may carry its own path prefix.
#[derive(Debug, Clone)]
pub struct Routes {
    base: Url,
    tasks_path: String,
}

impl Routes {
    pub fn new(base: Url, tasks_path: impl Into<String>) -> Self {
        Self {
            base,
            tasks_path: tasks_path.into(),
        }
    }

    fn at(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::Transport(format!("'{}' cannot be a base URL", self.base)))?;
            segments.pop_if_empty();
            for part in path.split('/').filter(|part| !part.is_empty()) {
                segments.push(part);
            }
        }
        Ok(url)
    }

    fn with_id(&self, path: &str, id: &str) -> Result<Url, ApiError> {
        let mut url = self.at(path)?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("'{}' cannot be a base URL", self.base)))?
            .push(id);
        Ok(url)
    }

    pub fn pos_universe(&self) -> Result<Url, ApiError> {
        self.at(POS_UNIVERSE_PATH)
    }

    pub fn pos_names(&self, pos_id: &str) -> Result<Url, ApiError> {
        let mut url = self.at(POS_NAMES_PATH)?;
        url.query_pairs_mut().append_pair("pos_id", pos_id);
        Ok(url)
    }

    pub fn pos_ids(&self, pos_name: &str) -> Result<Url, ApiError> {
        let mut url = self.at(POS_IDS_PATH)?;
        url.query_pairs_mut().append_pair("pos_name", pos_name);
        Ok(url)
    }

    pub fn tasks(&self) -> Result<Url, ApiError> {
        self.at(&self.tasks_path)
    }

    pub fn update_status(&self, task_id: &str) -> Result<Url, ApiError> {
        self.with_id(UPDATE_STATUS_PATH, task_id)
    }

    pub fn get_task(&self, task_id: &str) -> Result<Url, ApiError> {
        self.with_id(GET_TASK_PATH, task_id)
    }

    pub fn modify_task(&self, task_id: &str) -> Result<Url, ApiError> {
        self.with_id(MODIFY_TASK_PATH, task_id)
    }

    pub fn create_task(&self) -> Result<Url, ApiError> {
        self.at(CREATE_TASK_PATH)
    }
}

/// The create endpoint answers with a redirect. Landing back on the form means it refused.
pub fn create_outcome(create_url: &Url, landed_on: &Url) -> Result<(), ApiError> {
    if landed_on.path() == create_url.path() {
        Err(ApiError::Rejected { message: None })
    } else {
        Ok(())
    }
}

/// Maps a non-2xx reply. A JSON `message` in the body becomes a rejection.
pub fn error_from_status(status: StatusCode, body: &str) -> ApiError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        error: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => match parsed.message.or(parsed.error) {
            Some(message) => ApiError::rejected(message),
            None => ApiError::Transport(format!("server responded with {status}")),
        },
        Err(_) => ApiError::Transport(format!("server responded with {status}")),
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}

pub struct HttpTaskApi {
    client: Client,
    routes: Routes,
}

impl HttpTaskApi {
    pub fn new(config: &AppConfig) -> Result<Self> {
        Self::with_timeout(
            config.base_url().clone(),
            config.tasks_path(),
            config.timeout(),
        )
    }

    pub fn with_timeout(base: Url, tasks_path: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("kanban-sync/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            routes: Routes::new(base, tasks_path),
        })
    }

    async fn read(response: reqwest::Response) -> Result<String, ApiError> {
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            Err(error_from_status(status, &body))
        }
    }

    async fn get(&self, url: Url) -> Result<String, ApiError> {
        tracing::debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        Self::read(response).await
    }

    async fn post<B: Serialize + ?Sized>(&self, url: Url, body: &B) -> Result<String, ApiError> {
        tracing::debug!(%url, "POST");
        let response = self.client.post(url).json(body).send().await?;
        Self::read(response).await
    }
}

#[async_trait]
impl TaskApi for HttpTaskApi {
    async fn pos_universe(&self) -> Result<PosUniverse, ApiError> {
        let body = self.get(self.routes.pos_universe()?).await?;
        api::decode_pos_universe(&body)
    }

    async fn pos_names_for(&self, pos_id: &str) -> Result<Vec<String>, ApiError> {
        let body = self.get(self.routes.pos_names(pos_id)?).await?;
        api::decode_pos_names(&body)
    }

    async fn pos_ids_for(&self, pos_name: &str) -> Result<Vec<String>, ApiError> {
        let body = self.get(self.routes.pos_ids(pos_name)?).await?;
        api::decode_pos_ids(&body)
    }

    async fn query_tasks(&self, filter: &FilterSpec) -> Result<TaskPage, ApiError> {
        let body = self.post(self.routes.tasks()?, filter).await?;
        api::decode_task_page(&body)
    }

    async fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<(), ApiError> {
        let body = self
            .post(self.routes.update_status(task_id)?, &json!({ "status": status }))
            .await?;
        api::decode_status_update(&body)
    }

    async fn get_task(&self, task_id: &str) -> Result<Task, ApiError> {
        let body = self.get(self.routes.get_task(task_id)?).await?;
        api::decode_task(&body)
    }

    async fn modify_task(
        &self,
        task_id: &str,
        request: &ModifyRequest,
    ) -> Result<Option<String>, ApiError> {
        let body = self.post(self.routes.modify_task(task_id)?, request).await?;
        api::decode_modify(&body)
    }

    async fn create_task(&self, request: &CreateRequest) -> Result<(), ApiError> {
        let url = self.routes.create_task()?;
        tracing::debug!(%url, pos_id = %request.pos_id, "POST form");
        let response = self.client.post(url.clone()).form(request).send().await?;
        let landed_on = response.url().clone();
        Self::read(response).await?;
        create_outcome(&url, &landed_on)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn routes(base: &str) -> Routes {
        Routes::new(Url::parse(base).unwrap(), "/api/kanban_tasks")
    }

    #[test]
    fn routes_join_below_base_path() {
        let routes = routes("http://localhost:5000/kanban/");
        assert_eq!(
            routes.pos_universe().unwrap().as_str(),
            "http://localhost:5000/kanban/api/pos_names_and_ids"
        );
        assert_eq!(
            routes.tasks().unwrap().as_str(),
            "http://localhost:5000/kanban/api/kanban_tasks"
        );
    }

    #[test]
    fn query_values_are_encoded() {
        let routes = routes("http://localhost:5000");
        assert_eq!(
            routes.pos_ids("Main & 5th").unwrap().as_str(),
            "http://localhost:5000/api/pos_ids?pos_name=Main+%26+5th"
        );
        assert_eq!(
            routes.pos_names("1007").unwrap().as_str(),
            "http://localhost:5000/api/pos_names?pos_id=1007"
        );
    }

    #[test]
    fn task_ids_become_path_segments() {
        let routes = routes("http://localhost:5000");
        assert_eq!(
            routes.update_status("42").unwrap().as_str(),
            "http://localhost:5000/api/update_task_status/42"
        );
        assert_eq!(
            routes.modify_task("a/b").unwrap().as_str(),
            "http://localhost:5000/api/modify_task/a%2Fb"
        );
    }

    #[test]
    fn create_redirect_decides_outcome() {
        let routes = routes("http://localhost:5000/kanban");
        let create = routes.create_task().unwrap();
        assert_eq!(create.as_str(), "http://localhost:5000/kanban/create");

        let back_to_form = Url::parse("http://localhost:5000/kanban/create").unwrap();
        let board = Url::parse("http://localhost:5000/kanban/tasks").unwrap();
        assert_eq!(
            create_outcome(&create, &back_to_form),
            Err(ApiError::Rejected { message: None })
        );
        assert_eq!(create_outcome(&create, &board), Ok(()));
    }

    #[test]
    fn error_body_message_is_surfaced() {
        let err = error_from_status(
            StatusCode::NOT_FOUND,
            r#"{"success": false, "message": "Task not found"}"#,
        );
        assert_eq!(err, ApiError::rejected("Task not found"));
    }

    #[test]
    fn opaque_error_body_is_transport_failure() {
        let err = error_from_status(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>");
        assert!(matches!(err, ApiError::Transport(message) if message.contains("502")));
    }
}
