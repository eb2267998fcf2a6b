//! Dashboard and Report Handlers

use axum::extract::{Query, State};
use axum::{Extension, Json};
use shared::error::AppError;
use shared::models::{Dashboard, Month, RangeQuery, TaskReportRow};
use shared::util::now_millis;

use crate::api::{ApiResult, restaurant_today};
use crate::auth::Identity;
use crate::db;
use crate::state::AppState;

fn validate_range(range: &RangeQuery) -> Result<(), AppError> {
    if let (Some(from), Some(to)) = (range.from, range.to)
        && to < from
    {
        return Err(AppError::validation("'to' must not be before 'from'").with_detail("field", "to"));
    }
    Ok(())
}

/// GET /api/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Dashboard> {
    let restaurant_id = identity.tenant_id()?;
    validate_range(&range)?;
    let pool = &state.pool;
    let today = restaurant_today(&state, restaurant_id).await?;

    let (tasks_by_status, overdue_tasks, attendance_today, pending_requests, pending_advances, ai_reviews) =
        tokio::try_join!(
            db::dashboard::tasks_by_status(pool, restaurant_id, range.from, range.to),
            db::dashboard::overdue_tasks(pool, restaurant_id, now_millis()),
            db::dashboard::attendance_today(pool, restaurant_id, today),
            db::dashboard::pending_requests(pool, restaurant_id),
            db::advances::count_pending(pool, restaurant_id),
            db::dashboard::ai_review_stats(pool, restaurant_id, range.from, range.to),
        )?;
    let payroll_net_this_month =
        db::payslips::net_total(pool, restaurant_id, &Month::of(today).to_string()).await?;

    Ok(Json(Dashboard {
        tasks_by_status,
        overdue_tasks,
        attendance_today,
        pending_requests,
        pending_advances,
        ai_pass_rate: ai_reviews.pass_rate(),
        ai_reviews,
        payroll_net_this_month,
    }))
}

/// GET /api/reports/tasks
pub async fn task_report(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(range): Query<RangeQuery>,
) -> ApiResult<Vec<TaskReportRow>> {
    let restaurant_id = identity.tenant_id()?;
    validate_range(&range)?;
    let rows = db::dashboard::task_report(&state.pool, restaurant_id, range.from, range.to).await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_range_rejected() {
        let range = RangeQuery {
            from: Some(2_000),
            to: Some(1_000),
        };
        assert!(validate_range(&range).is_err());
        assert!(validate_range(&RangeQuery::default()).is_ok());
        assert!(validate_range(&RangeQuery { from: Some(1), to: None }).is_ok());
    }
}
