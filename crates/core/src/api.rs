use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

use crate::filter::FilterSpec;
use crate::form::{CreateRequest, ModifyRequest};
use crate::model::{string_list, Task, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("{}", .message.as_deref().unwrap_or("request was rejected"))]
    Rejected { message: Option<String> },
    #[error("malformed response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn rejected(message: impl Into<String>) -> Self {
        ApiError::Rejected {
            message: Some(message.into()),
        }
    }

    /// Backend-supplied message, if any.
    pub fn backend_message(&self) -> Option<&str> {
        match self {
            ApiError::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosUniverse {
    pub pos_names: Vec<String>,
    pub pos_ids: Vec<String>,
}

/// One page of query results with the server-reported position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPage {
    pub tasks: Vec<Task>,
    pub page: u32,
    pub total_pages: u32,
}

/// Network boundary for the board. Every method is a single request.
#[async_trait]
pub trait TaskApi: Send + Sync {
    async fn pos_universe(&self) -> Result<PosUniverse, ApiError>;
    async fn pos_names_for(&self, pos_id: &str) -> Result<Vec<String>, ApiError>;
    async fn pos_ids_for(&self, pos_name: &str) -> Result<Vec<String>, ApiError>;
    async fn query_tasks(&self, filter: &FilterSpec) -> Result<TaskPage, ApiError>;
    async fn update_status(&self, task_id: &str, status: TaskStatus) -> Result<(), ApiError>;
    async fn get_task(&self, task_id: &str) -> Result<Task, ApiError>;
    /// Returns the backend's confirmation message, if it sent one.
    async fn modify_task(
        &self,
        task_id: &str,
        request: &ModifyRequest,
    ) -> Result<Option<String>, ApiError>;
    async fn create_task(&self, request: &CreateRequest) -> Result<(), ApiError>;
}

#[derive(Deserialize)]
struct Ack {
    #[serde(default)]
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

impl Ack {
    /// `required` treats a missing flag as falsy.
    fn check(self, required: bool) -> Result<Option<String>, ApiError> {
        match self.success {
            Some(true) => Ok(self.message),
            None if !required => Ok(self.message),
            _ => Err(ApiError::Rejected {
                message: self.message.filter(|m| !m.trim().is_empty()),
            }),
        }
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|err| ApiError::Decode(err.to_string()))
}

fn parse_checked<T: DeserializeOwned>(body: &str, required: bool) -> Result<T, ApiError> {
    let ack: Ack = parse(body)?;
    ack.check(required)?;
    parse(body)
}

pub fn decode_pos_universe(body: &str) -> Result<PosUniverse, ApiError> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(default, deserialize_with = "string_list")]
        pos_names: Vec<String>,
        #[serde(default, deserialize_with = "string_list")]
        pos_ids: Vec<String>,
    }

    let payload: Payload = parse_checked(body, true)?;
    Ok(PosUniverse {
        pos_names: payload.pos_names,
        pos_ids: payload.pos_ids,
    })
}

pub fn decode_pos_names(body: &str) -> Result<Vec<String>, ApiError> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(deserialize_with = "string_list")]
        pos_names: Vec<String>,
    }

    parse_checked::<Payload>(body, true).map(|payload| payload.pos_names)
}

pub fn decode_pos_ids(body: &str) -> Result<Vec<String>, ApiError> {
    #[derive(Deserialize)]
    struct Payload {
        #[serde(deserialize_with = "string_list")]
        pos_ids: Vec<String>,
    }

    parse_checked::<Payload>(body, true).map(|payload| payload.pos_ids)
}

/// The query envelope carries no `success` flag unless it failed.
pub fn decode_task_page(body: &str) -> Result<TaskPage, ApiError> {
    #[derive(Deserialize)]
    struct Payload {
        tasks: Vec<serde_json::Value>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        total_pages: Option<u32>,
    }

    let payload: Payload = parse_checked(body, false)?;
    let page = payload.page.unwrap_or(1).max(1);
    // One bad card must not blank the whole board.
    let tasks = payload
        .tasks
        .into_iter()
        .filter_map(|raw| match serde_json::from_value::<Task>(raw) {
            Ok(task) => Some(task),
            Err(err) => {
                tracing::warn!(error = %err, "skipping task that failed to decode");
                None
            }
        })
        .collect();
    Ok(TaskPage {
        tasks,
        page,
        total_pages: payload.total_pages.unwrap_or(page),
    })
}

pub fn decode_status_update(body: &str) -> Result<(), ApiError> {
    let ack: Ack = parse(body)?;
    ack.check(true).map(|_| ())
}

pub fn decode_task(body: &str) -> Result<Task, ApiError> {
    #[derive(Deserialize)]
    struct Payload {
        task: Task,
    }

    parse_checked::<Payload>(body, true).map(|payload| payload.task)
}

pub fn decode_modify(body: &str) -> Result<Option<String>, ApiError> {
    let ack: Ack = parse(body)?;
    ack.check(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn pos_universe_accepts_numeric_ids() {
        let universe = decode_pos_universe(
            r#"{"success": true, "pos_names": ["Downtown", "Airport"], "pos_ids": [1007, "2001"]}"#,
        )
        .unwrap();

        assert_eq!(universe.pos_names, vec!["Downtown", "Airport"]);
        assert_eq!(universe.pos_ids, vec!["1007", "2001"]);
    }

    #[rstest]
    #[case(r#"{"success": false, "pos_names": []}"#, ApiError::Rejected { message: None })]
    #[case(r#"{"pos_names": ["Downtown"]}"#, ApiError::Rejected { message: None })]
    #[case(
        r#"{"success": false, "message": "POS not found"}"#,
        ApiError::rejected("POS not found")
    )]
    fn falsy_success_is_a_rejection(#[case] body: &str, #[case] expected: ApiError) {
        assert_eq!(decode_pos_names(body).unwrap_err(), expected);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        assert!(matches!(
            decode_pos_ids("<html>oops</html>"),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            decode_pos_ids(r#"{"success": true}"#),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn task_page_defaults_missing_paging_fields() {
        let page = decode_task_page(
            r#"{"tasks": [{"task_id": 3, "task_status": "Done"}]}"#,
        )
        .unwrap();

        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.tasks.len(), 1);
    }

    #[test]
    fn task_page_skips_cards_with_unknown_status() {
        let page = decode_task_page(
            r#"{"tasks": [
                {"task_id": 3, "task_status": "Archived"},
                {"task_id": 4, "task_status": "To Do"}
            ], "page": 1, "total_pages": 1}"#,
        )
        .unwrap();

        assert_eq!(page.tasks.len(), 1);
        assert_eq!(page.tasks[0].id, "4");
        assert_eq!(page.tasks[0].status, TaskStatus::ToDo);
    }

    #[test]
    fn task_page_keeps_server_paging() {
        let page = decode_task_page(r#"{"tasks": [], "page": 2, "total_pages": 5}"#).unwrap();
        assert_eq!((page.page, page.total_pages), (2, 5));
    }

    #[test]
    fn task_page_honours_explicit_failure() {
        let err = decode_task_page(r#"{"success": false, "tasks": []}"#).unwrap_err();
        assert_eq!(err, ApiError::Rejected { message: None });
    }

    #[test]
    fn modify_returns_backend_message() {
        assert_eq!(
            decode_modify(r#"{"success": true, "message": "Saved"}"#).unwrap(),
            Some("Saved".to_string())
        );
        assert_eq!(
            decode_modify(r#"{"success": false, "message": "Invalid date"}"#)
                .unwrap_err()
                .backend_message(),
            Some("Invalid date")
        );
    }

    #[test]
    fn status_update_requires_success_flag() {
        assert!(decode_status_update(r#"{"success": true}"#).is_ok());
        assert!(decode_status_update(r#"{}"#).is_err());
    }
}
