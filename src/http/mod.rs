use crate::config::Config;
use crate::error::Error;
use crate::request::RequestDescriptor;
use async_trait::async_trait;
use log::warn;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const API_KEY_HEADER: &str = "X-Api-Key";

/// Remaining-capacity values parsed from a response, one per rate window.
/// `None` means the header was absent, not that capacity is zero.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RateSnapshot {
    pub remaining_minute: Option<u32>,
    pub remaining_hour: Option<u32>,
}

/// Outcome of one transport exchange. The rate snapshot is populated on
/// every response that reached the server, including 429s and other errors,
/// so the scheduler can correct its counters regardless of the outcome.
#[derive(Debug)]
pub struct TransportResponse {
    pub body: Option<Value>,
    pub rate: RateSnapshot,
    pub error: Option<Error>,
    pub status: Option<StatusCode>,
}

impl TransportResponse {
    pub fn into_result(self) -> Result<Value, Error> {
        match (self.body, self.error) {
            (_, Some(err)) => Err(err),
            (Some(body), None) => Ok(body),
            (None, None) => Err(Error::Api {
                status: self.status.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                message: "empty response body".to_string(),
            }),
        }
    }
}

/// Boundary to the HTTP layer. The scheduler executes requests through this
/// trait; tests substitute an in-memory implementation.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn execute(&self, descriptor: &RequestDescriptor) -> TransportResponse;
}

/// reqwest-backed transport for the Kentaa REST API.
pub struct HttpTransport {
    client: Client,
    config: Config,
}

impl HttpTransport {
    pub fn new(config: Config) -> Result<Self, Error> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }
}

pub fn build_client(cfg: &Config) -> Result<Client, Error> {
    let mut default_headers = HeaderMap::new();
    let ua = HeaderValue::from_str(&cfg.user_agent)
        .map_err(|e| Error::Config(format!("invalid user agent: {}", e)))?;
    default_headers.insert(USER_AGENT, ua);
    // API key is injected per request to allow key rotation later.
    let client = Client::builder()
        .default_headers(default_headers)
        .timeout(Duration::from_secs(cfg.timeout_secs))
        .use_rustls_tls()
        .build()?;
    Ok(client)
}

fn api_key_header(key: &str) -> Result<HeaderValue, Error> {
    HeaderValue::from_str(key).map_err(|e| Error::Config(format!("invalid api key: {}", e)))
}

pub fn map_status_to_error(status: StatusCode, message: String) -> Error {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Error::RateLimited;
    }
    Error::Api { status, message }
}

/// Pull `X-RateLimit-Remaining-Minute` / `X-RateLimit-Remaining-Hour` out of
/// the response headers. Unparseable values are treated as absent.
pub fn extract_rate(headers: &HeaderMap) -> RateSnapshot {
    let remaining_minute = headers
        .get("x-ratelimit-remaining-minute")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok());
    let remaining_hour = headers
        .get("x-ratelimit-remaining-hour")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse::<u32>().ok());
    RateSnapshot {
        remaining_minute,
        remaining_hour,
    }
}

/// Percent-encode a value for use as a single URL path segment, e.g. an
/// action slug in `actions/{slug}`.
pub fn encode_path_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, descriptor: &RequestDescriptor) -> TransportResponse {
        let url = format!(
            "{}/{}",
            self.config.api_url.trim_end_matches('/'),
            descriptor.path
        );

        let api_key = match api_key_header(&self.config.api_key) {
            Ok(v) => v,
            Err(e) => {
                return TransportResponse {
                    body: None,
                    rate: RateSnapshot::default(),
                    error: Some(e),
                    status: None,
                }
            }
        };

        let mut req = self
            .client
            .request(descriptor.method.as_reqwest(), &url)
            .header(API_KEY_HEADER, api_key)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        if !descriptor.query.is_empty() {
            req = req.query(&descriptor.query);
        }
        if let Some(body) = &descriptor.body {
            req = req.json(body);
        }

        let res = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!("error sending request to {}: {}", url, e);
                return TransportResponse {
                    body: None,
                    rate: RateSnapshot::default(),
                    error: Some(Error::Transport(e)),
                    status: None,
                };
            }
        };

        let status = res.status();
        let rate = extract_rate(res.headers());

        if status.is_success() {
            return match res.json::<Value>().await {
                Ok(body) => TransportResponse {
                    body: Some(body),
                    rate,
                    error: None,
                    status: Some(status),
                },
                Err(e) => TransportResponse {
                    body: None,
                    rate,
                    error: Some(Error::Transport(e)),
                    status: Some(status),
                },
            };
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            warn!("rate limited by server on {} (remaining {:?})", url, rate);
        }
        let text = res.text().await.unwrap_or_default();
        TransportResponse {
            body: None,
            rate,
            error: Some(map_status_to_error(status, text)),
            status: Some(status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_headers_parse() {
        let mut h = HeaderMap::new();
        h.insert("x-ratelimit-remaining-minute", "42".parse().unwrap());
        h.insert("x-ratelimit-remaining-hour", "377".parse().unwrap());
        let rate = extract_rate(&h);
        assert_eq!(rate.remaining_minute, Some(42));
        assert_eq!(rate.remaining_hour, Some(377));
    }

    #[test]
    fn rate_headers_absent_or_garbage() {
        let mut h = HeaderMap::new();
        h.insert("x-ratelimit-remaining-minute", "soon".parse().unwrap());
        let rate = extract_rate(&h);
        assert_eq!(rate.remaining_minute, None);
        assert_eq!(rate.remaining_hour, None);
    }

    #[test]
    fn status_error_mapping() {
        assert!(matches!(
            map_status_to_error(StatusCode::TOO_MANY_REQUESTS, "limit".into()),
            Error::RateLimited
        ));
        match map_status_to_error(StatusCode::NOT_FOUND, "nope".into()) {
            Error::Api { status, message } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn url_path_segment_encoding() {
        assert_eq!(
            encode_path_segment("Run for Life/2026"),
            "Run%20for%20Life%2F2026"
        );
        assert_eq!(encode_path_segment("abc-._~123"), "abc-._~123");
    }

    #[test]
    fn empty_success_body_is_an_error() {
        let resp = TransportResponse {
            body: None,
            rate: RateSnapshot::default(),
            error: None,
            status: Some(StatusCode::OK),
        };
        assert!(resp.into_result().is_err());
    }
}
