//! AI Review Model (photo verification of task completion)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(type_name = "text", rename_all = "snake_case"))]
pub enum AiReviewStatus {
    /// Provider approved and the score met the pass threshold
    Passed,
    /// Provider answered but did not approve
    Failed,
    /// Every provider failed to answer
    Error,
}

/// One provider that failed before the chain produced a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderAttempt {
    pub provider: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct AiReview {
    pub id: i64,
    pub restaurant_id: i64,
    pub task_id: i64,
    pub image_url: String,
    /// Provider that produced the verdict (`None` when all failed)
    pub provider: Option<String>,
    pub model: Option<String>,
    pub status: AiReviewStatus,
    pub score: Option<i32>,
    pub approved: Option<bool>,
    pub feedback: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub attempts: Vec<ProviderAttempt>,
    pub override_status: Option<AiReviewStatus>,
    pub override_by: Option<i64>,
    pub override_note: Option<String>,
    pub created_at: i64,
}

impl AiReview {
    /// Manager override wins over the provider verdict
    pub fn effective_status(&self) -> AiReviewStatus {
        self.override_status.unwrap_or(self.status)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AiReviewQuery {
    pub status: Option<AiReviewStatus>,
    pub task_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiReviewOverride {
    pub status: AiReviewStatus,
    pub note: Option<String>,
}
