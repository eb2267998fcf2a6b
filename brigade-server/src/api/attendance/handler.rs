//! Attendance API Handlers
//!
//! The work day is the restaurant's local calendar date at check-in.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use shared::error::{AppError, ErrorCode};
use shared::models::{
    Attendance, AttendanceQuery, AttendanceStatus, AttendanceSummaryQuery, AttendanceSummaryRow,
    AttendanceUpdate, CheckInRequest, worked_minutes,
};
use shared::util::{now_millis, snowflake_id};

use crate::api::{ApiResult, parse_month, restaurant_today};
use crate::auth::Identity;
use crate::db;
use crate::error::on_unique_violation;
use crate::state::AppState;
use crate::validation::{MAX_NOTE_LEN, validate_optional_text};

fn validate_coordinates(lat: Option<f64>, lng: Option<f64>) -> Result<(), AppError> {
    if let Some(lat) = lat
        && !(-90.0..=90.0).contains(&lat)
    {
        return Err(AppError::new(ErrorCode::ValueOutOfRange).with_detail("field", "lat"));
    }
    if let Some(lng) = lng
        && !(-180.0..=180.0).contains(&lng)
    {
        return Err(AppError::new(ErrorCode::ValueOutOfRange).with_detail("field", "lng"));
    }
    Ok(())
}

/// Apply a manual correction and recompute worked minutes
fn apply_correction(record: &mut Attendance, update: AttendanceUpdate, now: i64) -> Result<(), AppError> {
    if let Some(status) = update.status {
        record.status = status;
    }
    if update.check_in_at.is_some() {
        record.check_in_at = update.check_in_at;
    }
    if update.check_out_at.is_some() {
        record.check_out_at = update.check_out_at;
    }
    if update.note.is_some() {
        record.note = update.note;
    }

    record.worked_minutes = match (record.check_in_at, record.check_out_at) {
        (Some(check_in), Some(check_out)) => Some(
            worked_minutes(check_in, check_out)
                .ok_or_else(|| AppError::new(ErrorCode::InvalidAttendanceTimes))?,
        ),
        (None, Some(_)) => {
            return Err(AppError::with_message(
                ErrorCode::InvalidAttendanceTimes,
                "check-out requires a check-in",
            ));
        }
        _ => None,
    };
    record.updated_at = now;
    Ok(())
}

/// Record that can be checked out: today's, else yesterday's if still open
async fn open_record(
    state: &AppState,
    user_id: i64,
    today: chrono::NaiveDate,
) -> Result<Option<Attendance>, sqlx::Error> {
    if let Some(record) = db::attendance::find_for_day(&state.pool, user_id, today).await? {
        return Ok(Some(record));
    }
    // Shifts that run past midnight
    let Some(yesterday) = today.pred_opt() else {
        return Ok(None);
    };
    Ok(db::attendance::find_for_day(&state.pool, user_id, yesterday)
        .await?
        .filter(|r| r.check_in_at.is_some() && r.check_out_at.is_none()))
}

/// POST /api/attendance/check-in
pub async fn check_in(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    payload: Option<Json<CheckInRequest>>,
) -> ApiResult<Attendance> {
    let restaurant_id = identity.tenant_id()?;
    let payload = payload.map(|Json(p)| p).unwrap_or_default();
    validate_coordinates(payload.lat, payload.lng)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let today = restaurant_today(&state, restaurant_id).await?;
    let now = now_millis();

    // A day pre-filled as leave or absent turns into a normal check-in
    if let Some(mut record) = db::attendance::find_for_day(&state.pool, identity.user_id, today).await? {
        if record.check_in_at.is_some() {
            return Err(ErrorCode::AlreadyCheckedIn.into());
        }
        record.status = AttendanceStatus::Present;
        record.check_in_at = Some(now);
        record.check_in_lat = payload.lat;
        record.check_in_lng = payload.lng;
        record.note = payload.note.or(record.note);
        record.updated_at = now;
        db::attendance::save(&state.pool, &record).await?;
        return Ok(Json(record));
    }

    let record = Attendance {
        id: snowflake_id(),
        restaurant_id,
        user_id: identity.user_id,
        work_date: today,
        status: AttendanceStatus::Present,
        check_in_at: Some(now),
        check_out_at: None,
        worked_minutes: None,
        check_in_lat: payload.lat,
        check_in_lng: payload.lng,
        note: payload.note,
        created_at: now,
        updated_at: now,
    };
    db::attendance::insert(&state.pool, &record)
        .await
        .map_err(|e| on_unique_violation(e, ErrorCode::AlreadyCheckedIn))?;

    tracing::info!(user_id = identity.user_id, work_date = %today, "Checked in");
    Ok(Json(record))
}

/// POST /api/attendance/check-out
pub async fn check_out(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Attendance> {
    let restaurant_id = identity.tenant_id()?;
    let today = restaurant_today(&state, restaurant_id).await?;

    let record = open_record(&state, identity.user_id, today)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::NotCheckedIn))?;
    let Some(check_in_at) = record.check_in_at else {
        return Err(ErrorCode::NotCheckedIn.into());
    };
    if record.check_out_at.is_some() {
        return Err(ErrorCode::AlreadyCheckedOut.into());
    }

    let now = now_millis();
    let minutes = worked_minutes(check_in_at, now);
    let record = db::attendance::check_out(&state.pool, record.id, now, minutes)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AlreadyCheckedOut))?;

    tracing::info!(
        user_id = identity.user_id,
        worked_minutes = ?record.worked_minutes,
        "Checked out"
    );
    Ok(Json(record))
}

/// GET /api/attendance
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(mut query): Query<AttendanceQuery>,
) -> ApiResult<Vec<Attendance>> {
    let restaurant_id = identity.tenant_id()?;
    query.user_id = identity.scope_user(query.user_id);
    Ok(Json(db::attendance::list(&state.pool, restaurant_id, &query).await?))
}

/// PUT /api/attendance/{id}
pub async fn update(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(payload): Json<AttendanceUpdate>,
) -> ApiResult<Attendance> {
    let restaurant_id = identity.tenant_id()?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;

    let mut record = db::attendance::find(&state.pool, restaurant_id, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AttendanceNotFound))?;
    apply_correction(&mut record, payload, now_millis())?;
    db::attendance::save(&state.pool, &record).await?;

    tracing::info!(
        attendance_id = id,
        corrected_by = identity.user_id,
        status = ?record.status,
        "Attendance corrected"
    );
    Ok(Json(record))
}

/// GET /api/attendance/summary?month=YYYY-MM
pub async fn summary(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<AttendanceSummaryQuery>,
) -> ApiResult<Vec<AttendanceSummaryRow>> {
    let restaurant_id = identity.tenant_id()?;
    let month = parse_month(&query.month)?;
    let rows =
        db::attendance::summary(&state.pool, restaurant_id, month.first_day(), month.last_day())
            .await?;
    Ok(Json(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HOUR: i64 = 3_600_000;

    fn record() -> Attendance {
        Attendance {
            id: 1,
            restaurant_id: 1,
            user_id: 2,
            work_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            status: AttendanceStatus::Present,
            check_in_at: Some(10 * HOUR),
            check_out_at: None,
            worked_minutes: None,
            check_in_lat: None,
            check_in_lng: None,
            note: None,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn correction_recomputes_minutes() {
        let mut r = record();
        let update = AttendanceUpdate {
            check_out_at: Some(18 * HOUR),
            ..Default::default()
        };
        apply_correction(&mut r, update, 99).unwrap();
        assert_eq!(r.worked_minutes, Some(480));
        assert_eq!(r.updated_at, 99);
    }

    #[test]
    fn correction_rejects_checkout_before_checkin() {
        let mut r = record();
        let update = AttendanceUpdate {
            check_out_at: Some(9 * HOUR),
            ..Default::default()
        };
        assert_eq!(
            apply_correction(&mut r, update, 0).unwrap_err().code,
            ErrorCode::InvalidAttendanceTimes
        );

        let mut r = record();
        r.check_in_at = None;
        let update = AttendanceUpdate {
            check_out_at: Some(9 * HOUR),
            ..Default::default()
        };
        assert!(apply_correction(&mut r, update, 0).is_err());
    }

    #[test]
    fn status_only_correction_keeps_times() {
        let mut r = record();
        let update = AttendanceUpdate {
            status: Some(AttendanceStatus::HalfDay),
            ..Default::default()
        };
        apply_correction(&mut r, update, 0).unwrap();
        assert_eq!(r.status, AttendanceStatus::HalfDay);
        assert_eq!(r.check_in_at, Some(10 * HOUR));
        assert_eq!(r.worked_minutes, None);
    }

    #[test]
    fn coordinates_must_be_on_earth() {
        assert!(validate_coordinates(Some(48.85), Some(2.35)).is_ok());
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(91.0), None).is_err());
        assert!(validate_coordinates(None, Some(-181.0)).is_err());
    }
}
