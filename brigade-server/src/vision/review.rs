//! Turning a task photo into a stored review

use shared::models::{AiReviewStatus, ProviderAttempt, Sop, Task};

use super::{ChainOutcome, VisionError};

/// Instructions for the vision model: what the photo should prove
pub fn build_instructions(task: &Task, sop: Option<&Sop>) -> String {
    let mut out = format!("Task: {}", task.title.trim());
    if let Some(desc) = task.description.as_deref().filter(|d| !d.trim().is_empty()) {
        out.push_str(&format!("\nDetails: {}", desc.trim()));
    }
    if let Some(sop) = sop {
        out.push_str(&format!("\nStandard operating procedure: {}", sop.title.trim()));
        for (i, step) in sop.steps.iter().enumerate() {
            out.push_str(&format!("\n{}. {}", i + 1, step.trim()));
        }
        if let Some(extra) = sop.ai_check_prompt.as_deref().filter(|p| !p.trim().is_empty()) {
            out.push_str(&format!("\nSpecifically check: {}", extra.trim()));
        }
    }
    out
}

/// Review fields derived from a chain run, ready to insert
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewDraft {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub status: AiReviewStatus,
    pub score: Option<i32>,
    pub approved: Option<bool>,
    pub feedback: Option<String>,
    pub attempts: Vec<ProviderAttempt>,
}

impl ReviewDraft {
    /// Passed only when the model approved and the score reaches `pass_score`.
    /// A chain error still yields a draft with status `error`.
    pub fn from_result(result: Result<ChainOutcome, VisionError>, pass_score: i32) -> Self {
        match result {
            Ok(outcome) => {
                let verdict = outcome.verdict;
                let passed = verdict.approved && verdict.score >= pass_score;
                Self {
                    provider: Some(outcome.provider.to_string()),
                    model: Some(outcome.model),
                    status: if passed {
                        AiReviewStatus::Passed
                    } else {
                        AiReviewStatus::Failed
                    },
                    score: Some(verdict.score),
                    approved: Some(verdict.approved),
                    feedback: Some(verdict.feedback).filter(|f| !f.is_empty()),
                    attempts: outcome.failures.into_iter().map(Into::into).collect(),
                }
            }
            Err(e) => {
                let attempts = match e {
                    VisionError::AllFailed(failures) => {
                        failures.into_iter().map(Into::into).collect()
                    }
                    other => vec![ProviderAttempt {
                        provider: "chain".into(),
                        error: other.to_string(),
                    }],
                };
                Self {
                    provider: None,
                    model: None,
                    status: AiReviewStatus::Error,
                    score: None,
                    approved: None,
                    feedback: Some("Automatic review unavailable".into()),
                    attempts,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::{ProviderFailure, VisionVerdict};
    use shared::models::{TaskPriority, TaskStatus};

    fn task() -> Task {
        Task {
            id: 1,
            restaurant_id: 1,
            title: "Deep clean fryer".into(),
            description: Some("Both baskets".into()),
            sop_id: Some(3),
            assigned_to: 2,
            assigned_by: 3,
            priority: TaskPriority::High,
            status: TaskStatus::Submitted,
            due_at: None,
            photo_url: None,
            submission_note: None,
            ai_review_id: None,
            review_note: None,
            started_at: None,
            submitted_at: None,
            completed_at: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn sop() -> Sop {
        Sop {
            id: 3,
            restaurant_id: 1,
            title: "Fryer cleaning".into(),
            category: Some("kitchen".into()),
            description: None,
            steps: vec!["Drain oil".into(), "Scrub baskets".into()],
            requires_photo: true,
            ai_check_prompt: Some("No oil residue visible".into()),
            is_active: true,
            created_by: 3,
            created_at: 0,
            updated_at: 0,
        }
    }

    fn outcome(approved: bool, score: i32) -> ChainOutcome {
        ChainOutcome {
            provider: "gemini",
            model: "gemini-1.5-flash".into(),
            verdict: VisionVerdict {
                approved,
                score,
                feedback: "Looks good".into(),
            },
            failures: vec![ProviderFailure {
                provider: "openai".into(),
                error: "timed out after 30s".into(),
            }],
        }
    }

    #[test]
    fn instructions_include_sop_steps() {
        let text = build_instructions(&task(), Some(&sop()));
        assert!(text.starts_with("Task: Deep clean fryer"));
        assert!(text.contains("Details: Both baskets"));
        assert!(text.contains("1. Drain oil"));
        assert!(text.contains("2. Scrub baskets"));
        assert!(text.contains("Specifically check: No oil residue visible"));
        assert_eq!(build_instructions(&task(), None).lines().count(), 2);
    }

    #[test]
    fn pass_needs_approval_and_score() {
        let d = ReviewDraft::from_result(Ok(outcome(true, 70)), 70);
        assert_eq!(d.status, AiReviewStatus::Passed);
        assert_eq!(d.provider.as_deref(), Some("gemini"));
        assert_eq!(d.attempts.len(), 1);

        assert_eq!(
            ReviewDraft::from_result(Ok(outcome(true, 69)), 70).status,
            AiReviewStatus::Failed
        );
        assert_eq!(
            ReviewDraft::from_result(Ok(outcome(false, 95)), 70).status,
            AiReviewStatus::Failed
        );
    }

    #[test]
    fn chain_failure_is_recorded_as_error() {
        let err = VisionError::AllFailed(vec![
            ProviderFailure {
                provider: "openai".into(),
                error: "a".into(),
            },
            ProviderFailure {
                provider: "ollama".into(),
                error: "b".into(),
            },
        ]);
        let d = ReviewDraft::from_result(Err(err), 70);
        assert_eq!(d.status, AiReviewStatus::Error);
        assert_eq!(d.score, None);
        assert_eq!(d.provider, None);
        assert_eq!(d.attempts.len(), 2);
        assert_eq!(d.attempts[1].provider, "ollama");
    }
}
