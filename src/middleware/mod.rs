mod auth;
mod error_handler;
mod rate_limit;
mod trace;

pub use auth::auth_middleware;
pub use error_handler::log_errors;
pub use rate_limit::{RateLimiter, rate_limit};
pub use trace::{TRACE_ID_HEADER, trace_requests};
