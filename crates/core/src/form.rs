use chrono::NaiveDate;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::model::{format_date, Certified, Task, TaskStatus, DATE_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    TaskId,
    PosId,
    PosName,
    ReconciliationDate,
    Certified,
    Description,
    Status,
    Priority,
    StartDate,
    DueDate,
    Notes,
    BlockerDescription,
    BlockerResponsible,
}

impl FormField {
    pub const ALL: [FormField; 13] = [
        FormField::TaskId,
        FormField::PosId,
        FormField::PosName,
        FormField::ReconciliationDate,
        FormField::Certified,
        FormField::Description,
        FormField::Status,
        FormField::Priority,
        FormField::StartDate,
        FormField::DueDate,
        FormField::Notes,
        FormField::BlockerDescription,
        FormField::BlockerResponsible,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FormField::TaskId => "Task ID",
            FormField::PosId => "POS ID",
            FormField::PosName => "POS Name",
            FormField::ReconciliationDate => "Rec Date",
            FormField::Certified => "Certified",
            FormField::Description => "Description",
            FormField::Status => "Status",
            FormField::Priority => "Priority",
            FormField::StartDate => "Start Date",
            FormField::DueDate => "Due Date",
            FormField::Notes => "Notes",
            FormField::BlockerDescription => "Blocker",
            FormField::BlockerResponsible => "Responsible",
        }
    }

    /// Fields edited by cycling rather than typing.
    pub fn is_choice(self) -> bool {
        matches!(self, FormField::Certified | FormField::Status)
    }
}

/// Editable copy of a task used by the lookup/modify flow.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub task_id: String,
    pub pos_id: String,
    pub pos_name: String,
    pub reconciliation_date: String,
    pub certified: Certified,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: String,
    pub start_date: String,
    pub due_date: String,
    pub notes: String,
    pub blocker_description: String,
    pub blocker_responsible: String,
}

/// Body of the modify endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifyRequest {
    pub task_id: String,
    pub pos_id: String,
    pub pos_name: String,
    pub reconciliation_date: String,
    #[serde(serialize_with = "certified_flag")]
    pub certified: Certified,
    pub description: String,
    pub status: Option<TaskStatus>,
    pub priority: String,
    pub start_date: String,
    pub due_date: String,
    pub notes: String,
    pub blocker_desc: String,
    pub blocker_responsible: String,
}

/// Form body of the create endpoint. Blank fields are left out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateRequest {
    pub pos_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation_date: Option<String>,
    #[serde(serialize_with = "certified_flag", skip_serializing_if = "Certified::is_unset")]
    pub certified: Certified,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocker_desc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocker_responsible: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreateError {
    #[error("Invalid date format. Please use YYYY-MM-DD.")]
    InvalidDate,
    #[error("POS ID is required.")]
    MissingPosId,
}

fn certified_flag<S: Serializer>(certified: &Certified, serializer: S) -> Result<S::Ok, S::Error> {
    match certified.as_flag() {
        Some(flag) => serializer.serialize_str(flag),
        None => serializer.serialize_none(),
    }
}

fn filled(value: &str) -> Option<String> {
    Some(value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn strict_date(value: &str) -> Result<Option<String>, CreateError> {
    match filled(value) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(&raw, DATE_FORMAT)
            .map(|_| Some(raw))
            .map_err(|_| CreateError::InvalidDate),
    }
}

impl TaskForm {
    /// Clears every field except the task id being typed.
    pub fn clear_fields(&mut self) {
        let task_id = std::mem::take(&mut self.task_id);
        *self = Self {
            task_id,
            ..Self::default()
        };
    }

    pub fn populate(&mut self, task: &Task) {
        let text = |value: &Option<String>| value.clone().unwrap_or_default();
        *self = Self {
            task_id: task.id.clone(),
            pos_id: text(&task.pos_id),
            pos_name: text(&task.pos_name),
            reconciliation_date: format_date(task.reconciliation_date).unwrap_or_default(),
            certified: task.certified,
            description: text(&task.description),
            status: Some(task.status),
            priority: text(&task.priority),
            start_date: format_date(task.start_date).unwrap_or_default(),
            due_date: format_date(task.due_date).unwrap_or_default(),
            notes: text(&task.notes),
            blocker_description: text(&task.blocker_description),
            blocker_responsible: text(&task.blocker_responsible),
        };
    }

    pub fn task_id(&self) -> Option<&str> {
        Some(self.task_id.trim()).filter(|id| !id.is_empty())
    }

    pub fn value(&self, field: FormField) -> String {
        match field {
            FormField::TaskId => self.task_id.clone(),
            FormField::PosId => self.pos_id.clone(),
            FormField::PosName => self.pos_name.clone(),
            FormField::ReconciliationDate => self.reconciliation_date.clone(),
            FormField::Certified => match self.certified {
                Certified::Unset => String::from("(unset)"),
                other => other.as_str().to_string(),
            },
            FormField::Description => self.description.clone(),
            FormField::Status => self
                .status
                .map(|status| status.as_str().to_string())
                .unwrap_or_default(),
            FormField::Priority => self.priority.clone(),
            FormField::StartDate => self.start_date.clone(),
            FormField::DueDate => self.due_date.clone(),
            FormField::Notes => self.notes.clone(),
            FormField::BlockerDescription => self.blocker_description.clone(),
            FormField::BlockerResponsible => self.blocker_responsible.clone(),
        }
    }

    /// Writes a text field. Choice fields are changed through [`TaskForm::cycle`].
    pub fn set_text(&mut self, field: FormField, value: String) {
        match field {
            FormField::TaskId => self.task_id = value,
            FormField::PosId => self.pos_id = value,
            FormField::PosName => self.pos_name = value,
            FormField::ReconciliationDate => self.reconciliation_date = value,
            FormField::Description => self.description = value,
            FormField::Priority => self.priority = value,
            FormField::StartDate => self.start_date = value,
            FormField::DueDate => self.due_date = value,
            FormField::Notes => self.notes = value,
            FormField::BlockerDescription => self.blocker_description = value,
            FormField::BlockerResponsible => self.blocker_responsible = value,
            FormField::Certified | FormField::Status => {}
        }
    }

    pub fn cycle(&mut self, field: FormField) {
        match field {
            FormField::Certified => self.certified = self.certified.cycle(),
            FormField::Status => {
                self.status = match self.status {
                    None => Some(TaskStatus::Backlog),
                    Some(status) => TaskStatus::ALL.get(status.index() + 1).copied(),
                }
            }
            _ => {}
        }
    }

    pub fn to_request(&self) -> Option<ModifyRequest> {
        let task_id = self.task_id()?.to_string();
        Some(ModifyRequest {
            task_id,
            pos_id: self.pos_id.trim().to_string(),
            pos_name: self.pos_name.trim().to_string(),
            reconciliation_date: self.reconciliation_date.trim().to_string(),
            certified: self.certified,
            description: self.description.clone(),
            status: self.status,
            priority: self.priority.trim().to_string(),
            start_date: self.start_date.trim().to_string(),
            due_date: self.due_date.trim().to_string(),
            notes: self.notes.clone(),
            blocker_desc: self.blocker_description.clone(),
            blocker_responsible: self.blocker_responsible.clone(),
        })
    }

    /// Dates are checked before the POS id, matching the order the server reports them.
    pub fn to_create_request(&self) -> Result<CreateRequest, CreateError> {
        let start_date = strict_date(&self.start_date)?;
        let due_date = strict_date(&self.due_date)?;
        let reconciliation_date = strict_date(&self.reconciliation_date)?;
        let pos_id = filled(&self.pos_id).ok_or(CreateError::MissingPosId)?;
        Ok(CreateRequest {
            pos_id,
            reconciliation_date,
            certified: self.certified,
            description: filled(&self.description),
            status: self.status,
            priority: filled(&self.priority),
            start_date,
            due_date,
            notes: filled(&self.notes),
            blocker_desc: filled(&self.blocker_description),
            blocker_responsible: filled(&self.blocker_responsible),
        })
    }
}
