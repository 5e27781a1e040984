use kentaa_api::http::{encode_path_segment, extract_rate, map_status_to_error};
use kentaa_api::Error;
use reqwest::header::HeaderMap;
use reqwest::StatusCode;

#[test]
fn rate_headers_extract_per_window() {
    let mut h = HeaderMap::new();
    h.insert("x-ratelimit-remaining-minute", "7".parse().unwrap());
    h.insert("x-ratelimit-remaining-hour", "123".parse().unwrap());
    let rate = extract_rate(&h);
    assert_eq!(rate.remaining_minute, Some(7));
    assert_eq!(rate.remaining_hour, Some(123));
}

#[test]
fn missing_rate_headers_are_none() {
    let rate = extract_rate(&HeaderMap::new());
    assert_eq!(rate.remaining_minute, None);
    assert_eq!(rate.remaining_hour, None);
}

#[test]
fn status_error_mapping() {
    assert!(matches!(
        map_status_to_error(StatusCode::TOO_MANY_REQUESTS, "limit".into()),
        Error::RateLimited
    ));
    assert!(matches!(
        map_status_to_error(StatusCode::UNPROCESSABLE_ENTITY, "bad field".into()),
        Error::Api { .. }
    ));
}

#[test]
fn url_path_segment_encoding() {
    assert_eq!(encode_path_segment("Prod Env/Blue%"), "Prod%20Env%2FBlue%25");
    assert_eq!(encode_path_segment("abc-._~123"), "abc-._~123");
}
