//! HTTP seam: request description, client and response abstractions.

mod backend;
mod client;
mod retry;

pub use backend::{ClientConfig, ReqwestResponse};
pub use client::{HttpClient, HttpRequest, Response};
pub use retry::{RATE_LIMIT_STATUS, RateLimitPolicy};
