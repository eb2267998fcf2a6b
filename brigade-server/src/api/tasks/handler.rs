//! Task API Handlers

use axum::extract::{Multipart, Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    AiReview, Sop, Task, TaskAction, TaskCreate, TaskDecision, TaskDetail, TaskQuery, TaskStatus,
    TaskUpdate, User,
};
use shared::response::{PageQuery, PaginatedResponse};
use shared::util::{now_millis, snowflake_id};

use crate::api::{ApiResult, ClientIp, notify_user, record_audit};
use crate::auth::Identity;
use crate::db;
use crate::error::ServiceResult;
use crate::media::store_image;
use crate::notify::PushMessage;
use crate::state::AppState;
use crate::validation::{MAX_NAME_LEN, MAX_NOTE_LEN, validate_optional_text, validate_required_text};
use crate::vision::VisionRequest;
use crate::vision::review::{ReviewDraft, build_instructions};

async fn find_task(state: &AppState, restaurant_id: i64, id: i64) -> ServiceResult<Task> {
    db::tasks::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TaskNotFound).into())
}

/// Assignees must be active accounts of the same restaurant
async fn find_assignee(state: &AppState, restaurant_id: i64, user_id: i64) -> ServiceResult<User> {
    let user = db::users::find_in_restaurant(&state.pool, restaurant_id, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::EmployeeNotFound).with_detail("user_id", user_id))?;
    if !user.is_active {
        return Err(AppError::new(ErrorCode::EmployeeInactive)
            .with_detail("user_id", user_id)
            .into());
    }
    Ok(user)
}

/// SOPs attached to new work must be active
async fn find_active_sop(state: &AppState, restaurant_id: i64, sop_id: i64) -> ServiceResult<Sop> {
    let sop = db::sops::find(&state.pool, restaurant_id, sop_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::SopNotFound).with_detail("sop_id", sop_id))?;
    if !sop.is_active {
        return Err(AppError::new(ErrorCode::SopInactive)
            .with_detail("sop_id", sop_id)
            .into());
    }
    Ok(sop)
}

/// Next status for `action`, or `InvalidTaskTransition`
fn next_status(task: &Task, action: TaskAction) -> Result<TaskStatus, AppError> {
    task.status.apply(action).ok_or_else(|| {
        AppError::new(ErrorCode::InvalidTaskTransition)
            .with_detail("from", task.status.as_str())
            .with_detail("action", action.as_str())
    })
}

fn ensure_assignee(identity: &Identity, task: &Task) -> Result<(), AppError> {
    if task.assigned_to != identity.user_id {
        return Err(AppError::new(ErrorCode::TaskNotAssignee));
    }
    Ok(())
}

/// CAS status change; losing a concurrent race reads as an invalid transition
async fn move_task(
    state: &AppState,
    task: &Task,
    action: TaskAction,
    note: Option<&str>,
) -> ServiceResult<Task> {
    let to = next_status(task, action)?;
    db::tasks::transition(
        &state.pool,
        task.restaurant_id,
        task.id,
        task.status,
        to,
        note,
        now_millis(),
    )
    .await?
    .ok_or_else(|| {
        AppError::new(ErrorCode::InvalidTaskTransition)
            .with_detail("action", action.as_str())
            .into()
    })
}

/// Analyze the photo and attach the stored review to the task.
///
/// Provider failures are recorded as an `error` review, never returned.
async fn run_review(
    state: &AppState,
    task: &Task,
    image: Vec<u8>,
    image_url: &str,
) -> ServiceResult<AiReview> {
    let sop = match task.sop_id {
        Some(sop_id) => db::sops::find(&state.pool, task.restaurant_id, sop_id).await?,
        None => None,
    };
    let request = VisionRequest {
        image,
        mime: "image/jpeg".to_string(),
        instructions: build_instructions(task, sop.as_ref()),
    };
    let result = state.vision.analyze(&request).await;
    if let Err(e) = &result {
        tracing::warn!(task_id = task.id, error = %e, "AI review failed");
    }
    let draft = ReviewDraft::from_result(result, state.ai_pass_score);

    let now = now_millis();
    let review = AiReview {
        id: snowflake_id(),
        restaurant_id: task.restaurant_id,
        task_id: task.id,
        image_url: image_url.to_string(),
        provider: draft.provider,
        model: draft.model,
        status: draft.status,
        score: draft.score,
        approved: draft.approved,
        feedback: draft.feedback,
        attempts: draft.attempts,
        override_status: None,
        override_by: None,
        override_note: None,
        created_at: now,
    };
    db::ai_reviews::insert(&state.pool, &review).await?;
    db::tasks::attach_review(&state.pool, task.id, review.id, now).await?;

    tracing::info!(
        task_id = task.id,
        review_id = review.id,
        status = ?review.status,
        score = ?review.score,
        provider = review.provider.as_deref().unwrap_or("none"),
        "AI review stored"
    );
    Ok(review)
}

/// POST /api/tasks
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<TaskCreate>,
) -> ApiResult<Task> {
    let restaurant_id = identity.tenant_id()?;
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    find_assignee(&state, restaurant_id, payload.assigned_to).await?;
    if let Some(sop_id) = payload.sop_id {
        find_active_sop(&state, restaurant_id, sop_id).await?;
    }

    let now = now_millis();
    let task = Task {
        id: snowflake_id(),
        restaurant_id,
        title: payload.title.trim().to_string(),
        description: payload.description,
        sop_id: payload.sop_id,
        assigned_to: payload.assigned_to,
        assigned_by: identity.user_id,
        priority: payload.priority.unwrap_or_default(),
        status: TaskStatus::Pending,
        due_at: payload.due_at,
        photo_url: None,
        submission_note: None,
        ai_review_id: None,
        review_note: None,
        started_at: None,
        submitted_at: None,
        completed_at: None,
        created_at: now,
        updated_at: now,
    };
    db::tasks::insert(&state.pool, &task).await?;

    tracing::info!(task_id = task.id, assigned_to = task.assigned_to, "Task created");
    notify_user(
        &state,
        task.assigned_to,
        PushMessage::new("New task", &task.title).with_data("task_id", task.id),
    )
    .await;
    Ok(Json(task))
}

/// GET /api/tasks
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(mut query): Query<TaskQuery>,
) -> ApiResult<PaginatedResponse<Task>> {
    let restaurant_id = identity.tenant_id()?;
    query.assigned_to = identity.scope_user(query.assigned_to);
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let (tasks, total) = db::tasks::list(&state.pool, restaurant_id, &query, &page).await?;
    Ok(Json(PaginatedResponse::new(tasks, &page, total)))
}

/// GET /api/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<TaskDetail> {
    let restaurant_id = identity.tenant_id()?;
    let task = find_task(&state, restaurant_id, id).await?;
    if !identity.can_view_user(task.assigned_to) {
        return Err(ErrorCode::TaskNotFound.into());
    }
    let ai_review = match task.ai_review_id {
        Some(review_id) => db::ai_reviews::find(&state.pool, restaurant_id, review_id).await?,
        None => None,
    };
    Ok(Json(TaskDetail { task, ai_review }))
}

/// PATCH /api/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<TaskUpdate>,
) -> ApiResult<Task> {
    let restaurant_id = identity.tenant_id()?;
    if let Some(title) = &payload.title {
        validate_required_text(title, "title", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let task = find_task(&state, restaurant_id, id).await?;
    if !task.status.is_editable() {
        return Err(AppError::new(ErrorCode::TaskNotEditable)
            .with_detail("status", task.status.as_str())
            .into());
    }
    if let Some(user_id) = payload.assigned_to {
        find_assignee(&state, restaurant_id, user_id).await?;
    }
    if let Some(sop_id) = payload.sop_id {
        find_active_sop(&state, restaurant_id, sop_id).await?;
    }

    let updated = db::tasks::update(&state.pool, restaurant_id, id, &payload, now_millis())
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::TaskNotEditable))?;

    if updated.assigned_to != task.assigned_to {
        notify_user(
            &state,
            updated.assigned_to,
            PushMessage::new("New task", &updated.title).with_data("task_id", updated.id),
        )
        .await;
    }
    Ok(Json(updated))
}

/// POST /api/tasks/{id}/start
pub async fn start(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<Task> {
    let restaurant_id = identity.tenant_id()?;
    let task = find_task(&state, restaurant_id, id).await?;
    ensure_assignee(&identity, &task)?;
    Ok(Json(move_task(&state, &task, TaskAction::Start, None).await?))
}

/// Photo and note parts of a submission
#[derive(Default)]
struct Submission {
    photo: Option<(Vec<u8>, Option<String>, Option<String>)>,
    note: Option<String>,
}

async fn read_submission(multipart: &mut Multipart) -> Result<Submission, AppError> {
    let mut submission = Submission::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        match field.name() {
            Some("photo") => {
                let filename = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?;
                // Browsers send an empty part for an untouched file input
                if !data.is_empty() {
                    submission.photo = Some((data.to_vec(), filename, content_type));
                }
            }
            Some("note") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?;
                let text = text.trim();
                if !text.is_empty() {
                    submission.note = Some(text.to_string());
                }
            }
            _ => {}
        }
    }
    Ok(submission)
}

/// POST /api/tasks/{id}/submit
pub async fn submit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> ApiResult<TaskDetail> {
    let restaurant_id = identity.tenant_id()?;
    let task = find_task(&state, restaurant_id, id).await?;
    ensure_assignee(&identity, &task)?;
    next_status(&task, TaskAction::Submit)?;

    let submission = read_submission(&mut multipart).await?;
    validate_optional_text(&submission.note, "note", MAX_NOTE_LEN)?;

    let requires_photo = match task.sop_id {
        Some(sop_id) => db::sops::find(&state.pool, restaurant_id, sop_id)
            .await?
            .is_some_and(|sop| sop.requires_photo),
        None => false,
    };
    if requires_photo && submission.photo.is_none() {
        return Err(ErrorCode::PhotoRequired.into());
    }

    let stored = match &submission.photo {
        Some((data, filename, content_type)) => Some(
            store_image(
                state.media.as_ref(),
                restaurant_id,
                data,
                filename.as_deref(),
                content_type.as_deref(),
            )
            .await?,
        ),
        None => None,
    };

    let mut submitted = task;
    submitted.record_submission(
        stored.as_ref().map(|s| s.url.clone()),
        submission.note,
        now_millis(),
    );
    let mut task = db::tasks::submit(&state.pool, &submitted)
        .await?
        .ok_or_else(|| {
            AppError::new(ErrorCode::InvalidTaskTransition).with_detail("action", "submit")
        })?;
    tracing::info!(task_id = id, has_photo = stored.is_some(), "Task submitted");

    let ai_review = match stored {
        Some(image) if !state.vision.is_empty() => {
            let review = run_review(&state, &task, image.bytes, &image.url).await?;
            task.ai_review_id = Some(review.id);
            Some(review)
        }
        _ => None,
    };
    Ok(Json(TaskDetail { task, ai_review }))
}

/// POST /api/tasks/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    payload: Option<Json<TaskDecision>>,
) -> ApiResult<Task> {
    let restaurant_id = identity.tenant_id()?;
    let note = payload.and_then(|Json(d)| d.note).filter(|n| !n.trim().is_empty());
    validate_optional_text(&note, "note", MAX_NOTE_LEN)?;

    let task = find_task(&state, restaurant_id, id).await?;
    let task = move_task(&state, &task, TaskAction::Approve, note.as_deref()).await?;

    record_audit(
        &state,
        &identity,
        "task.approve",
        serde_json::json!({ "task_id": id }),
        &ip,
    )
    .await;
    notify_user(
        &state,
        task.assigned_to,
        PushMessage::new("Task approved", &task.title).with_data("task_id", task.id),
    )
    .await;
    Ok(Json(task))
}

/// POST /api/tasks/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    ip: ClientIp,
    Path(id): Path<i64>,
    Json(payload): Json<TaskDecision>,
) -> ApiResult<Task> {
    let restaurant_id = identity.tenant_id()?;
    let note = payload.note.unwrap_or_default();
    validate_required_text(&note, "note", MAX_NOTE_LEN)?;

    let task = find_task(&state, restaurant_id, id).await?;
    let task = move_task(&state, &task, TaskAction::Reject, Some(note.trim())).await?;

    record_audit(
        &state,
        &identity,
        "task.reject",
        serde_json::json!({ "task_id": id, "note": note.trim() }),
        &ip,
    )
    .await;
    notify_user(
        &state,
        task.assigned_to,
        PushMessage::new("Task needs rework", note.trim()).with_data("task_id", task.id),
    )
    .await;
    Ok(Json(task))
}

/// POST /api/tasks/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<Task> {
    let restaurant_id = identity.tenant_id()?;
    let task = find_task(&state, restaurant_id, id).await?;
    let task = move_task(&state, &task, TaskAction::Cancel, None).await?;
    tracing::info!(task_id = id, cancelled_by = identity.user_id, "Task cancelled");
    Ok(Json(task))
}

/// POST /api/tasks/{id}/ai-review
///
/// Re-runs the review on the stored photo, e.g. after a provider outage.
pub async fn rerun_review(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> ApiResult<AiReview> {
    let restaurant_id = identity.tenant_id()?;
    let task = find_task(&state, restaurant_id, id).await?;
    let photo_url = task
        .photo_url
        .clone()
        .ok_or_else(|| AppError::new(ErrorCode::NoPhotoToReview))?;
    if state.vision.is_empty() {
        return Err(ErrorCode::VisionUnavailable.into());
    }
    let key = state.media.key_from_url(&photo_url).ok_or_else(|| {
        AppError::new(ErrorCode::NoPhotoToReview).with_detail("photo_url", photo_url.clone())
    })?;
    let image = state.media.get(&key).await.map_err(AppError::from)?;

    Ok(Json(run_review(&state, &task, image, &photo_url).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{Role, TaskPriority};

    fn task(status: TaskStatus) -> Task {
        Task {
            id: 7,
            restaurant_id: 1,
            title: "Restock bar".into(),
            description: None,
            sop_id: None,
            assigned_to: 42,
            assigned_by: 2,
            priority: TaskPriority::Normal,
            status,
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

    fn identity(user_id: i64, role: Role) -> Identity {
        Identity {
            user_id,
            role,
            restaurant_id: Some(1),
            name: "Someone".into(),
        }
    }

    #[test]
    fn invalid_transition_reports_from_and_action() {
        let err = next_status(&task(TaskStatus::Completed), TaskAction::Start).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidTaskTransition);
        let details = err.details.unwrap();
        assert_eq!(details["from"], "completed");
        assert_eq!(details["action"], "start");

        assert_eq!(
            next_status(&task(TaskStatus::Rejected), TaskAction::Start).unwrap(),
            TaskStatus::InProgress
        );
    }

    #[test]
    fn rework_resubmission_drops_previous_evidence() {
        let mut t = task(TaskStatus::Rejected);
        t.photo_url = Some("/media/1/old.jpg".into());
        t.ai_review_id = Some(99);
        t.submission_note = Some("done".into());

        t.status = next_status(&t, TaskAction::Start).unwrap();
        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(next_status(&t, TaskAction::Submit).unwrap(), TaskStatus::Submitted);

        t.record_submission(None, Some("fixed the shelf".into()), 500);
        assert_eq!(t.status, TaskStatus::Submitted);
        assert_eq!(t.photo_url, None);
        assert_eq!(t.ai_review_id, None);
        assert_eq!(t.submission_note.as_deref(), Some("fixed the shelf"));
        assert_eq!(t.submitted_at, Some(500));

        t.status = TaskStatus::InProgress;
        t.record_submission(Some("/media/1/new.jpg".into()), None, 600);
        assert_eq!(t.photo_url.as_deref(), Some("/media/1/new.jpg"));
        assert_eq!(t.ai_review_id, None);
    }

    #[test]
    fn only_the_assignee_works_the_task() {
        let t = task(TaskStatus::Pending);
        assert!(ensure_assignee(&identity(42, Role::Employee), &t).is_ok());
        assert_eq!(
            ensure_assignee(&identity(43, Role::Manager), &t).unwrap_err().code,
            ErrorCode::TaskNotAssignee
        );
    }
}
