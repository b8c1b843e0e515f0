//! Exercises the reqwest-backed transport against a local mock HTTP
//! server: header policy, status/header propagation, and the retry
//! loop end to end over real sockets.

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use reddit_threads::{Error, Fetcher, HttpTransport, Transport, USER_AGENT};

#[tokio::test]
async fn sends_the_fixed_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/r/test/comments/abc12.json"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"ok\":true}"))
        .expect(1)
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let resp = transport
        .get(&format!("{}/r/test/comments/abc12.json", server.uri()))
        .await
        .unwrap();

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "{\"ok\":true}");
}

#[tokio::test]
async fn propagates_status_and_retry_after() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "7")
                .set_body_string(""),
        )
        .mount(&server)
        .await;

    let transport = HttpTransport::new().unwrap();
    let resp = transport.get(&server.uri()).await.unwrap();

    assert_eq!(resp.status, 429);
    assert_eq!(resp.retry_after.as_deref(), Some("7"));
    assert_eq!(resp.status_text, "Too Many Requests");
}

#[tokio::test]
async fn connection_failures_surface_as_network_errors() {
    // A server that is immediately dropped leaves nothing listening on
    // its port.
    let uri = {
        let server = MockServer::start().await;
        server.uri()
    };

    let transport = HttpTransport::new().unwrap();
    let err = transport.get(&uri).await.unwrap_err();
    assert!(matches!(err, Error::Network(_)));
}

#[tokio::test]
async fn fetcher_retries_rate_limits_over_real_http() {
    let server = MockServer::start().await;
    // First hit is rate limited with an immediate retry window; the
    // mock is consumed after one match and the fallback serves JSON.
    Mock::given(method("GET"))
        .and(path("/x.json"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "0")
                .set_body_string(""),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/x.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"value\":9}"))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(HttpTransport::new().unwrap());
    let value = fetcher
        .get_json(&format!("{}/x.json", server.uri()))
        .await
        .unwrap();
    assert_eq!(value["value"], 9);
}

#[tokio::test]
async fn fetcher_fails_fast_on_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("sort", "top"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(HttpTransport::new().unwrap());
    let err = fetcher
        .get_json(&format!("{}/gone.json?sort=top", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Http { status: 404, .. }));
}
