//! Task Model
//!
//! Status machine:
//!
//! ```text
//! pending ──start──▶ in_progress ──submit──▶ submitted ──approve──▶ completed
//!    │                  ▲    │                   │
//!    │                  │    │                reject
//!    │               start   │                   ▼
//!    │                  └────┼────────────── rejected
//!    └──cancel──▶ cancelled ◀┘cancel
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum TaskStatus {
    Pending,
    InProgress,
    Submitted,
    Completed,
    Rejected,
    Cancelled,
}

/// Actions that move a task between statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Start,
    Submit,
    Approve,
    Reject,
    Cancel,
}

impl TaskAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        }
    }
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Submitted => "submitted",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        }
    }

    /// Next status after `action`, or `None` if the transition is not allowed
    pub fn apply(self, action: TaskAction) -> Option<TaskStatus> {
        use TaskAction as A;
        use TaskStatus as S;
        match (self, action) {
            (S::Pending | S::Rejected, A::Start) => Some(S::InProgress),
            (S::InProgress, A::Submit) => Some(S::Submitted),
            (S::Submitted, A::Approve) => Some(S::Completed),
            (S::Submitted, A::Reject) => Some(S::Rejected),
            (S::Pending | S::InProgress, A::Cancel) => Some(S::Cancelled),
            _ => None,
        }
    }

    /// Still requires work or a decision
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Task fields may be edited by a manager
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Task {
    pub id: i64,
    pub restaurant_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub sop_id: Option<i64>,
    pub assigned_to: i64,
    pub assigned_by: i64,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    /// Deadline (Unix millis)
    pub due_at: Option<i64>,
    pub photo_url: Option<String>,
    pub submission_note: Option<String>,
    /// Latest AI review of the submitted photo
    pub ai_review_id: Option<i64>,
    /// Manager's note on approve/reject
    pub review_note: Option<String>,
    pub started_at: Option<i64>,
    pub submitted_at: Option<i64>,
    pub completed_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Task {
    /// Deadline passed while the task is still open
    pub fn is_overdue(&self, now: i64) -> bool {
        self.status.is_open() && self.due_at.is_some_and(|due| due < now)
    }

    /// Mark submitted with this submission's evidence only. A rework
    /// resubmission drops the earlier photo and its AI review.
    pub fn record_submission(&mut self, photo_url: Option<String>, note: Option<String>, now: i64) {
        self.status = TaskStatus::Submitted;
        self.photo_url = photo_url;
        self.submission_note = note;
        self.ai_review_id = None;
        self.submitted_at = Some(now);
        self.updated_at = now;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreate {
    pub title: String,
    pub description: Option<String>,
    pub sop_id: Option<i64>,
    pub assigned_to: i64,
    pub priority: Option<TaskPriority>,
    pub due_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sop_id: Option<i64>,
    pub assigned_to: Option<i64>,
    pub priority: Option<TaskPriority>,
    pub due_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<i64>,
    pub priority: Option<TaskPriority>,
    /// created_at lower bound (Unix millis)
    pub from: Option<i64>,
    /// created_at upper bound (Unix millis)
    pub to: Option<i64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Manager decision on a submitted task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDecision {
    pub note: Option<String>,
}

/// Task with its latest AI review attached
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub ai_review: Option<super::AiReview>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path() {
        let s = TaskStatus::Pending;
        let s = s.apply(TaskAction::Start).unwrap();
        assert_eq!(s, TaskStatus::InProgress);
        let s = s.apply(TaskAction::Submit).unwrap();
        assert_eq!(s, TaskStatus::Submitted);
        let s = s.apply(TaskAction::Approve).unwrap();
        assert_eq!(s, TaskStatus::Completed);
        assert!(!s.is_open());
    }

    #[test]
    fn rework_after_rejection() {
        let s = TaskStatus::Submitted.apply(TaskAction::Reject).unwrap();
        assert_eq!(s, TaskStatus::Rejected);
        assert_eq!(s.apply(TaskAction::Start), Some(TaskStatus::InProgress));
        assert_eq!(s.apply(TaskAction::Submit), None);
    }

    #[test]
    fn illegal_transitions() {
        assert_eq!(TaskStatus::Pending.apply(TaskAction::Submit), None);
        assert_eq!(TaskStatus::Pending.apply(TaskAction::Approve), None);
        assert_eq!(TaskStatus::Completed.apply(TaskAction::Cancel), None);
        assert_eq!(TaskStatus::Submitted.apply(TaskAction::Cancel), None);
        assert_eq!(TaskStatus::Cancelled.apply(TaskAction::Start), None);
    }

    #[test]
    fn editable_only_before_submission() {
        assert!(TaskStatus::Pending.is_editable());
        assert!(TaskStatus::InProgress.is_editable());
        assert!(!TaskStatus::Submitted.is_editable());
        assert!(!TaskStatus::Rejected.is_editable());
    }

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(TaskStatus::InProgress.as_str(), "in_progress");
    }
}
