//! Shared HTTP client for target probes
//!
//! Wraps a reqwest client with a per-probe timeout, cookie persistence and a
//! governor rate limiter. Booking portals are touchy about request bursts;
//! the limiter caps the sustained rate while the orchestrator's pacing delay
//! handles the gaps between probes.

use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::header::HeaderMap;
use reqwest::{Client, Response, StatusCode};
use std::num::NonZeroU32;
use std::time::Duration;

use crate::utils::error::ProbeError;

/// Default sustained request rate against any single target
const DEFAULT_REQUESTS_PER_SECOND: u32 = 2;

/// HTTP client shared by the probe implementations
pub struct ProbeClient {
    client: Client,
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl ProbeClient {
    /// Create a client with the given per-request timeout
    pub fn new(timeout: Duration) -> Result<Self, ProbeError> {
        Self::with_rate(timeout, DEFAULT_REQUESTS_PER_SECOND)
    }

    /// Create a client with a custom sustained request rate
    pub fn with_rate(timeout: Duration, requests_per_second: u32) -> Result<Self, ProbeError> {
        let client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .cookie_store(true)
            .build()?;

        let rate = NonZeroU32::new(requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(rate));

        Ok(Self {
            client,
            rate_limiter,
        })
    }

    /// GET a URL with query parameters and headers
    pub async fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Response, ProbeError> {
        self.rate_limiter.until_ready().await;

        self.client
            .get(url)
            .query(query)
            .headers(headers)
            .send()
            .await
            .map_err(map_send_error)
    }

    /// POST a form-encoded body with headers
    pub async fn post_form(
        &self,
        url: &str,
        headers: HeaderMap,
        body: String,
    ) -> Result<Response, ProbeError> {
        self.rate_limiter.until_ready().await;

        self.client
            .post(url)
            .headers(headers)
            .header(
                reqwest::header::CONTENT_TYPE,
                "application/x-www-form-urlencoded",
            )
            .body(body)
            .send()
            .await
            .map_err(map_send_error)
    }
}

fn map_send_error(err: reqwest::Error) -> ProbeError {
    if err.is_timeout() {
        ProbeError::Timeout
    } else {
        ProbeError::Http(err)
    }
}

/// Reject non-2xx responses, surfacing 429 as a distinct rate-limit error
pub fn ensure_success(response: Response) -> Result<Response, ProbeError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else if status == StatusCode::TOO_MANY_REQUESTS {
        Err(ProbeError::RateLimited)
    } else {
        Err(ProbeError::ServerError(status.as_u16()))
    }
}
