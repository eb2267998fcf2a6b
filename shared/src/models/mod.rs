//! Back-office data models
//!
//! Wire types shared between the server and its clients. Row types derive
//! `sqlx::FromRow` when the `db` feature is enabled.

pub mod advance;
pub mod ai_review;
pub mod attendance;
pub mod dashboard;
pub mod payroll;
pub mod restaurant;
pub mod sop;
pub mod staff_request;
pub mod task;
pub mod user;
pub mod voucher;

pub use advance::*;
pub use ai_review::*;
pub use attendance::*;
pub use dashboard::*;
pub use payroll::*;
pub use restaurant::*;
pub use sop::*;
pub use staff_request::*;
pub use task::*;
pub use user::*;
pub use voucher::*;
