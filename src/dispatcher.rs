//! Request dispatch with rate-limit retry.

use log::{debug, warn};
use reqwest::header::{ACCEPT_ENCODING, HeaderValue};

use crate::error::{ClientError, Error};
use crate::handler::ContentHandler;
use crate::http::{HttpClient, HttpRequest, RATE_LIMIT_STATUS, RateLimitPolicy, Response};

/// Sends requests through an [`HttpClient`], retrying while the server answers
/// `429 Too Many Requests`, and hands the final response to a content handler.
///
/// The dispatcher holds no per-call state; one instance can serve concurrent calls.
#[derive(Debug, Clone)]
pub struct RequestDispatcher<C> {
    client: C,
    policy: RateLimitPolicy,
}

impl<C: HttpClient> RequestDispatcher<C> {
    /// Creates a dispatcher with the default, unbounded [`RateLimitPolicy`].
    pub fn new(client: C) -> Self {
        Self {
            client,
            policy: RateLimitPolicy::default(),
        }
    }

    /// Replaces the rate-limit policy.
    pub fn with_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Returns the rate-limit policy.
    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Executes `request` and returns what `handler` makes of the response.
    ///
    /// Sets `Accept-Encoding: gzip` on the request. Rate-limited responses are
    /// drained and the same request is executed again, per the dispatcher's
    /// [`RateLimitPolicy`]. The final response is drained after the handler
    /// returns, whether it succeeded or not.
    ///
    /// Client failures come back as [`Error::Format`] or [`Error::Transport`]
    /// converted into the handler's error type. Handler errors are returned as is.
    #[tracing::instrument(skip_all)]
    pub async fn send_request<H>(
        &self,
        request: &mut HttpRequest,
        handler: &H,
    ) -> Result<H::Output, H::Error>
    where
        H: ContentHandler<C::Response> + ?Sized,
    {
        debug!("{}", request.request_line());
        request
            .headers
            .insert(ACCEPT_ENCODING, HeaderValue::from_static("gzip"));

        let mut response = self.execute(request).await?;

        let result = handler.process_content(&mut response).await;
        let drained = response.drain().await;

        match (result, drained) {
            (Ok(output), Ok(_)) => Ok(output),
            (Ok(_), Err(e)) => Err(Error::from_client(e, request.uri()).into()),
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(drain_err)) => {
                warn!("Failed to drain response body: {}", drain_err);
                Err(e)
            }
        }
    }

    /// Executes `request` until the response is not rate limited or the policy
    /// gives up.
    async fn execute(&self, request: &HttpRequest) -> Result<C::Response, Error> {
        let classify = |e: ClientError| Error::from_client(e, request.uri());

        let mut attempt = 1;
        let mut response = self.client.execute(request).await.map_err(classify)?;

        while self.policy.should_retry(response.status(), attempt) {
            response.drain().await.map_err(classify)?;

            let delay = self.policy.delay();
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            attempt += 1;
            response = self.client.execute(request).await.map_err(classify)?;
        }

        if response.status() == RATE_LIMIT_STATUS {
            warn!(
                "Still rate limited after {} attempts, passing response on",
                attempt
            );
        }

        Ok(response)
    }
}
