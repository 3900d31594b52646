//! HTTP transport for REST API clients.
//!
//! [`RequestDispatcher`] executes a request through an [`HttpClient`], retries
//! while the server answers `429 Too Many Requests`, passes the response to a
//! [`ContentHandler`] and drains whatever body is left. Client failures are
//! reported as [`Error::Format`] or [`Error::Transport`].

pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod http;

pub use dispatcher::RequestDispatcher;
pub use error::{ClientError, Error};
pub use handler::{ContentHandler, from_fn};
pub use http::{
    ClientConfig, HttpClient, HttpRequest, RATE_LIMIT_STATUS, RateLimitPolicy, ReqwestResponse,
    Response,
};
