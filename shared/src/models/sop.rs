//! SOP (Standard Operating Procedure) Model

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Upper bound on steps per SOP
pub const MAX_SOP_STEPS: usize = 50;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Sop {
    pub id: i64,
    pub restaurant_id: i64,
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    /// Ordered steps (JSONB array of strings)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub steps: Vec<String>,
    /// Task completion must include a photo
    pub requires_photo: bool,
    /// Extra instruction appended to the AI review prompt
    pub ai_check_prompt: Option<String>,
    pub is_active: bool,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SopCreate {
    pub title: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub steps: Vec<String>,
    #[serde(default)]
    pub requires_photo: bool,
    pub ai_check_prompt: Option<String>,
}

impl SopCreate {
    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("title must not be empty").with_detail("field", "title"));
        }
        validate_steps(&self.steps)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SopUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub steps: Option<Vec<String>>,
    pub requires_photo: Option<bool>,
    pub ai_check_prompt: Option<String>,
    pub is_active: Option<bool>,
}

impl SopUpdate {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(title) = &self.title
            && title.trim().is_empty()
        {
            return Err(AppError::validation("title must not be empty").with_detail("field", "title"));
        }
        match &self.steps {
            Some(steps) => validate_steps(steps),
            None => Ok(()),
        }
    }
}

fn validate_steps(steps: &[String]) -> AppResult<()> {
    if steps.is_empty() {
        return Err(AppError::validation("at least one step is required").with_detail("field", "steps"));
    }
    if steps.len() > MAX_SOP_STEPS {
        return Err(AppError::validation(format!(
            "too many steps ({}, max {MAX_SOP_STEPS})",
            steps.len()
        )));
    }
    if let Some(idx) = steps.iter().position(|s| s.trim().is_empty()) {
        return Err(AppError::validation(format!("step {} is empty", idx + 1))
            .with_detail("field", "steps"));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SopQuery {
    pub category: Option<String>,
    pub active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(title: &str, steps: &[&str]) -> SopCreate {
        SopCreate {
            title: title.to_string(),
            category: None,
            description: None,
            steps: steps.iter().map(|s| s.to_string()).collect(),
            requires_photo: false,
            ai_check_prompt: None,
        }
    }

    #[test]
    fn create_requires_title_and_steps() {
        assert!(create("Close kitchen", &["Clean grill", "Mop floor"]).validate().is_ok());
        assert!(create("  ", &["Clean grill"]).validate().is_err());
        assert!(create("Close kitchen", &[]).validate().is_err());
        assert!(create("Close kitchen", &["Clean grill", " "]).validate().is_err());
    }

    #[test]
    fn update_only_checks_present_fields() {
        assert!(SopUpdate::default().validate().is_ok());
        let update = SopUpdate {
            steps: Some(vec![]),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }
}
