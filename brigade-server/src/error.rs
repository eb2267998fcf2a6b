//! Unified service-layer error type
//!
//! `ServiceError` bridges DB-layer errors (`sqlx::Error`, `BoxError`) and the
//! API-layer error (`AppError`), so handlers can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: database/infrastructure errors (logged, mapped to InternalError)
/// - `App`: business-rule errors (passed through to the client)
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<BoxError> for ServiceError {
    fn from(e: BoxError) -> Self {
        ServiceError::Db(e)
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ErrorCode> for ServiceError {
    fn from(code: ErrorCode) -> Self {
        ServiceError::App(AppError::new(code))
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service database error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Map a unique violation to `code`, any other error to `Db`
pub fn on_unique_violation(e: sqlx::Error, code: ErrorCode) -> ServiceError {
    if let sqlx::Error::Database(db) = &e
        && db.is_unique_violation()
    {
        return ServiceError::App(AppError::new(code));
    }
    ServiceError::Db(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    #[test]
    fn app_errors_pass_through() {
        let err: AppError = ServiceError::from(ErrorCode::SopInUse).into();
        assert_eq!(err.code, ErrorCode::SopInUse);
    }

    #[test]
    fn db_errors_become_internal() {
        let err: AppError = ServiceError::from(sqlx::Error::RowNotFound).into();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.http_status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_unique_errors_stay_db() {
        let err = on_unique_violation(sqlx::Error::RowNotFound, ErrorCode::EmailExists);
        assert!(matches!(err, ServiceError::Db(_)));
    }
}
