use reqwest::StatusCode;

/// Errors surfaced to callers of the client.
///
/// Rate limiting itself is never an error at submission time: a request that
/// exceeds the local budget estimate is queued, not rejected. Errors here
/// come from the transport, from the remote service, or from a scheduler that
/// was shut down with requests still queued.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network-level failure from the underlying HTTP client.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response from the API, other than the rate-limit signal.
    #[error("api error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// HTTP 429 from the remote service. The scheduler's counters are
    /// corrected from the response headers before this is surfaced; the
    /// request is not re-queued.
    #[error("rate limited by the remote service")]
    RateLimited,

    /// A paginated response did not carry the expected list key.
    #[error("missing `{0}` list in paginated response")]
    MissingListKey(String),

    /// The scheduler was dropped or shut down before the request ran.
    #[error("scheduler closed before the request was executed")]
    SchedulerClosed,

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
