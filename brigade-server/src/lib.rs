//! Brigade back-office server
//!
//! REST API for restaurant staff workflows: tasks and SOPs with AI photo
//! review, attendance, staff requests, salary advances, payroll and
//! vouchers. Multi-tenant: every restaurant's data is scoped by
//! `restaurant_id`, with a superadmin layer managing the tenants.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod media;
pub mod notify;
pub mod payroll;
pub mod state;
pub mod validation;
pub mod vision;

pub use config::Config;
pub use error::{BoxError, ServiceError, ServiceResult};
pub use state::AppState;
