//! Authentication: JWT, role guards, password hashing, rate limiting

pub mod bootstrap;
pub mod identity;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod rate_limit;

pub use identity::Identity;
pub use jwt::{JwtConfig, JwtError};
pub use rate_limit::RateLimiter;
