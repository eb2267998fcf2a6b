//! Unified error codes for Brigade
//!
//! This module defines all error codes returned by the back-office API.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Tenant (restaurant) errors
//! - 4xxx: Task / SOP / AI review errors
//! - 5xxx: Payroll / advance / voucher errors
//! - 6xxx: Media upload errors
//! - 7xxx: Attendance / staff request errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (email/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Password too short
    PasswordTooShort = 1008,
    /// Too many requests from this client
    TooManyRequests = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Specific role required
    RoleRequired = 2002,
    /// Admin role required
    AdminRequired = 2003,
    /// Superadmin role required
    SuperadminRequired = 2004,
    /// Operation not allowed on own account
    CannotModifySelf = 2005,

    // ==================== 3xxx: Tenant ====================
    /// Caller is not bound to a restaurant
    TenantNotSelected = 3001,
    /// Restaurant not found
    TenantNotFound = 3002,
    /// Restaurant is suspended
    TenantSuspended = 3003,

    // ==================== 4xxx: Task ====================
    /// Task not found
    TaskNotFound = 4001,
    /// Task status transition not allowed
    InvalidTaskTransition = 4002,
    /// Caller is not the task assignee
    TaskNotAssignee = 4003,
    /// Task SOP requires a completion photo
    PhotoRequired = 4004,
    /// Task can no longer be edited
    TaskNotEditable = 4005,
    /// SOP not found
    SopNotFound = 4101,
    /// SOP is referenced by open tasks
    SopInUse = 4102,
    /// SOP is inactive
    SopInactive = 4103,
    /// AI review not found
    AiReviewNotFound = 4201,
    /// No vision provider configured
    VisionUnavailable = 4202,
    /// Task has no photo to review
    NoPhotoToReview = 4203,

    // ==================== 5xxx: Payroll ====================
    /// Payslip not found
    PayslipNotFound = 5001,
    /// Payslip has already been paid
    PayslipAlreadyPaid = 5002,
    /// Payslip already exists for this month
    PayslipExists = 5003,
    /// Net pay would be negative
    NegativeNetPay = 5004,
    /// Advance request not found
    AdvanceNotFound = 5101,
    /// Advance exceeds the allowed limit
    AdvanceLimitExceeded = 5102,
    /// Advance status transition not allowed
    InvalidAdvanceTransition = 5103,
    /// Voucher not found
    VoucherNotFound = 5201,
    /// Voucher is already void
    VoucherAlreadyVoid = 5202,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// Image processing failed
    ImageProcessingFailed = 6508,
    /// File storage failed
    FileStorageFailed = 6509,

    // ==================== 7xxx: Attendance ====================
    /// Attendance record not found
    AttendanceNotFound = 7001,
    /// Already checked in today
    AlreadyCheckedIn = 7002,
    /// No open check-in for today
    NotCheckedIn = 7003,
    /// Already checked out today
    AlreadyCheckedOut = 7004,
    /// Check-out precedes check-in
    InvalidAttendanceTimes = 7005,
    /// Staff request not found
    RequestNotFound = 7101,
    /// Staff request status transition not allowed
    InvalidRequestTransition = 7102,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Email already registered
    EmailExists = 8002,
    /// Cannot deactivate self
    EmployeeCannotDeleteSelf = 8003,
    /// Employee is inactive
    EmployeeInactive = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Network error
    NetworkError = 9003,
    /// Operation timeout
    TimeoutError = 9004,
    /// Configuration error
    ConfigError = 9005,
    /// Upstream service returned an error
    ExternalServiceError = 9006,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid email or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::PasswordTooShort => "Password must be at least 8 characters",
            ErrorCode::TooManyRequests => "Too many requests, try again later",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::RoleRequired => "Specific role is required",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::SuperadminRequired => "Superadmin role is required",
            ErrorCode::CannotModifySelf => "Operation not allowed on own account",

            // Tenant
            ErrorCode::TenantNotSelected => "No restaurant bound to this account",
            ErrorCode::TenantNotFound => "Restaurant not found",
            ErrorCode::TenantSuspended => "Restaurant is suspended",

            // Task
            ErrorCode::TaskNotFound => "Task not found",
            ErrorCode::InvalidTaskTransition => "Task status change not allowed",
            ErrorCode::TaskNotAssignee => "Task is assigned to another employee",
            ErrorCode::PhotoRequired => "A completion photo is required",
            ErrorCode::TaskNotEditable => "Task can no longer be edited",
            ErrorCode::SopNotFound => "SOP not found",
            ErrorCode::SopInUse => "SOP is referenced by open tasks",
            ErrorCode::SopInactive => "SOP is inactive",
            ErrorCode::AiReviewNotFound => "AI review not found",
            ErrorCode::VisionUnavailable => "No vision provider is configured",
            ErrorCode::NoPhotoToReview => "Task has no photo to review",

            // Payroll
            ErrorCode::PayslipNotFound => "Payslip not found",
            ErrorCode::PayslipAlreadyPaid => "Payslip has already been paid",
            ErrorCode::PayslipExists => "Payslip already exists for this month",
            ErrorCode::NegativeNetPay => "Net pay cannot be negative",
            ErrorCode::AdvanceNotFound => "Advance request not found",
            ErrorCode::AdvanceLimitExceeded => "Advance exceeds the monthly salary limit",
            ErrorCode::InvalidAdvanceTransition => "Advance status change not allowed",
            ErrorCode::VoucherNotFound => "Voucher not found",
            ErrorCode::VoucherAlreadyVoid => "Voucher is already void",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Attendance
            ErrorCode::AttendanceNotFound => "Attendance record not found",
            ErrorCode::AlreadyCheckedIn => "Already checked in today",
            ErrorCode::NotCheckedIn => "Not checked in today",
            ErrorCode::AlreadyCheckedOut => "Already checked out today",
            ErrorCode::InvalidAttendanceTimes => "Check-out cannot precede check-in",
            ErrorCode::RequestNotFound => "Request not found",
            ErrorCode::InvalidRequestTransition => "Request status change not allowed",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmailExists => "Email is already registered",
            ErrorCode::EmployeeCannotDeleteSelf => "Cannot deactivate own account",
            ErrorCode::EmployeeInactive => "Employee is inactive",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::NetworkError => "Network error",
            ErrorCode::TimeoutError => "Operation timed out",
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ExternalServiceError => "Upstream service error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::PasswordTooShort),
            1009 => Ok(ErrorCode::TooManyRequests),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2002 => Ok(ErrorCode::RoleRequired),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::SuperadminRequired),
            2005 => Ok(ErrorCode::CannotModifySelf),

            // Tenant
            3001 => Ok(ErrorCode::TenantNotSelected),
            3002 => Ok(ErrorCode::TenantNotFound),
            3003 => Ok(ErrorCode::TenantSuspended),

            // Task
            4001 => Ok(ErrorCode::TaskNotFound),
            4002 => Ok(ErrorCode::InvalidTaskTransition),
            4003 => Ok(ErrorCode::TaskNotAssignee),
            4004 => Ok(ErrorCode::PhotoRequired),
            4005 => Ok(ErrorCode::TaskNotEditable),
            4101 => Ok(ErrorCode::SopNotFound),
            4102 => Ok(ErrorCode::SopInUse),
            4103 => Ok(ErrorCode::SopInactive),
            4201 => Ok(ErrorCode::AiReviewNotFound),
            4202 => Ok(ErrorCode::VisionUnavailable),
            4203 => Ok(ErrorCode::NoPhotoToReview),

            // Payroll
            5001 => Ok(ErrorCode::PayslipNotFound),
            5002 => Ok(ErrorCode::PayslipAlreadyPaid),
            5003 => Ok(ErrorCode::PayslipExists),
            5004 => Ok(ErrorCode::NegativeNetPay),
            5101 => Ok(ErrorCode::AdvanceNotFound),
            5102 => Ok(ErrorCode::AdvanceLimitExceeded),
            5103 => Ok(ErrorCode::InvalidAdvanceTransition),
            5201 => Ok(ErrorCode::VoucherNotFound),
            5202 => Ok(ErrorCode::VoucherAlreadyVoid),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6508 => Ok(ErrorCode::ImageProcessingFailed),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // Attendance
            7001 => Ok(ErrorCode::AttendanceNotFound),
            7002 => Ok(ErrorCode::AlreadyCheckedIn),
            7003 => Ok(ErrorCode::NotCheckedIn),
            7004 => Ok(ErrorCode::AlreadyCheckedOut),
            7005 => Ok(ErrorCode::InvalidAttendanceTimes),
            7101 => Ok(ErrorCode::RequestNotFound),
            7102 => Ok(ErrorCode::InvalidRequestTransition),

            // Employee
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::EmailExists),
            8003 => Ok(ErrorCode::EmployeeCannotDeleteSelf),
            8004 => Ok(ErrorCode::EmployeeInactive),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::NetworkError),
            9004 => Ok(ErrorCode::TimeoutError),
            9005 => Ok(ErrorCode::ConfigError),
            9006 => Ok(ErrorCode::ExternalServiceError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ErrorCode] = &[
        ErrorCode::Success,
        ErrorCode::ValidationFailed,
        ErrorCode::NotFound,
        ErrorCode::InvalidCredentials,
        ErrorCode::TooManyRequests,
        ErrorCode::AdminRequired,
        ErrorCode::TenantSuspended,
        ErrorCode::InvalidTaskTransition,
        ErrorCode::SopInUse,
        ErrorCode::VisionUnavailable,
        ErrorCode::AdvanceLimitExceeded,
        ErrorCode::VoucherAlreadyVoid,
        ErrorCode::FileTooLarge,
        ErrorCode::AlreadyCheckedIn,
        ErrorCode::InvalidRequestTransition,
        ErrorCode::EmailExists,
        ErrorCode::ExternalServiceError,
    ];

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::InvalidCredentials.code(), 1002);
        assert_eq!(ErrorCode::TenantSuspended.code(), 3003);
        assert_eq!(ErrorCode::TaskNotFound.code(), 4001);
        assert_eq!(ErrorCode::PayslipExists.code(), 5003);
        assert_eq!(ErrorCode::FileTooLarge.code(), 6501);
        assert_eq!(ErrorCode::AlreadyCheckedIn.code(), 7002);
        assert_eq!(ErrorCode::EmailExists.code(), 8002);
        assert_eq!(ErrorCode::InternalError.code(), 9001);
    }

    #[test]
    fn test_try_from_matches_code() {
        for code in ALL {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(*code));
        }
        assert_eq!(ErrorCode::try_from(4999), Err(InvalidErrorCode(4999)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::SopInUse).unwrap();
        assert_eq!(json, "4102");
        let code: ErrorCode = serde_json::from_str("5102").unwrap();
        assert_eq!(code, ErrorCode::AdvanceLimitExceeded);
        assert!(serde_json::from_str::<ErrorCode>("12345").is_err());
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::Unknown.is_success());
    }
}
