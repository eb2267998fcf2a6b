//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::TenantNotFound
            | Self::TaskNotFound
            | Self::SopNotFound
            | Self::AiReviewNotFound
            | Self::PayslipNotFound
            | Self::AdvanceNotFound
            | Self::VoucherNotFound
            | Self::AttendanceNotFound
            | Self::RequestNotFound
            | Self::EmployeeNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::EmailExists
            | Self::SopInUse
            | Self::PayslipExists
            | Self::PayslipAlreadyPaid
            | Self::VoucherAlreadyVoid
            | Self::AlreadyCheckedIn
            | Self::AlreadyCheckedOut
            | Self::InvalidTaskTransition
            | Self::InvalidAdvanceTransition
            | Self::InvalidRequestTransition
            | Self::TaskNotEditable => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::RoleRequired
            | Self::AdminRequired
            | Self::SuperadminRequired
            | Self::CannotModifySelf
            | Self::EmployeeCannotDeleteSelf
            | Self::TaskNotAssignee
            | Self::TenantNotSelected
            | Self::TenantSuspended => StatusCode::FORBIDDEN,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 429 Too Many Requests
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // 502 Bad Gateway (upstream answered with an error)
            Self::ExternalServiceError => StatusCode::BAD_GATEWAY,

            // 503 Service Unavailable (transient errors, client can retry)
            Self::NetworkError | Self::TimeoutError | Self::VisionUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ImageProcessingFailed
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_family() {
        assert_eq!(ErrorCode::NotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::TaskNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ErrorCode::VoucherNotFound.http_status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_transitions_conflict() {
        assert_eq!(
            ErrorCode::InvalidTaskTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ErrorCode::AlreadyCheckedIn.http_status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_auth_and_permission() {
        assert_eq!(
            ErrorCode::TokenExpired.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::TenantSuspended.http_status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ErrorCode::TooManyRequests.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_business_defaults_to_bad_request() {
        assert_eq!(
            ErrorCode::AdvanceLimitExceeded.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ErrorCode::PhotoRequired.http_status(),
            StatusCode::BAD_REQUEST
        );
    }
}
