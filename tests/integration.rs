use httpmock::{Method::GET, MockServer};
use kentaa_api::{Config, KentaaClient, Window};
use serde_json::json;
use std::time::Duration;

fn client_for(server: &MockServer) -> KentaaClient {
    let mut cfg = Config::new("test-key");
    cfg.api_url = server.base_url();
    KentaaClient::from_config(cfg).expect("client")
}

#[tokio::test]
async fn exhausted_budget_queues_instead_of_failing() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/actions/1");
            then.status(200)
                .header("X-RateLimit-Remaining-Minute", "0")
                .header("X-RateLimit-Remaining-Hour", "321")
                .json_body(json!({"action": {"id": 1}}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/actions/2");
            then.status(200)
                .header("X-RateLimit-Remaining-Minute", "4")
                .header("X-RateLimit-Remaining-Hour", "320")
                .json_body(json!({"action": {"id": 2}}));
        })
        .await;

    let client = client_for(&server);

    // First call succeeds but the server reports the minute budget as spent.
    client.actions().get(1, &[]).await?;
    assert_eq!(client.scheduler().remaining(Window::Minute), 0);

    // The second call is admitted but held, not rejected.
    let held = client.request(kentaa_api::RequestDescriptor::get(
        "actions/2".to_string(),
        Vec::new(),
    ));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(client.scheduler().queue_depth(), 1);

    // An out-of-band correction restores capacity and a nudge releases it.
    client.scheduler().report_remaining(Window::Minute, 5);
    client.scheduler().try_dequeue_one();
    let body = held.await?;
    assert_eq!(body["action"]["id"], 2);
    assert_eq!(client.scheduler().remaining(Window::Minute), 4);
    assert_eq!(client.scheduler().remaining(Window::Hour), 320);
    Ok(())
}
