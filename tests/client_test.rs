//! Integration tests for the resilient Yandex Metrika client.
//!
//! A wiremock server stands in for the upstream API so the retry matrix,
//! authentication handling, and parameter serialization can be asserted
//! against real HTTP traffic.

use metrika_mcp_server::config::Config;
use metrika_mcp_server::error::MetrikaError;
use metrika_mcp_server::metrika::MetrikaClient;
use serde_json::json;
use std::collections::HashMap;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config() -> Config {
    Config {
        api_key: "test-token".to_string(),
        retries: 3,
        retry_delay: 0.01,
        ..Config::default()
    }
}

fn test_client(server: &MockServer) -> MetrikaClient {
    MetrikaClient::with_base_url(&test_config(), &server.uri()).unwrap()
}

#[tokio::test]
async fn sends_oauth_authorization_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stat/v1/data"))
        .and(header("authorization", "OAuth test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.get("/stat/v1/data", vec![]).await.unwrap();
    assert_eq!(result, json!({"data": []}));
}

#[tokio::test]
async fn null_params_dropped_empty_string_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    client
        .get(
            "/stat/v1/data",
            vec![
                ("ids", Some("123".to_string())),
                ("date1", None),
                ("search", Some(String::new())),
            ],
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let pairs: HashMap<String, String> = requests[0].url.query_pairs().into_owned().collect();
    assert_eq!(pairs.get("ids").map(String::as_str), Some("123"));
    assert_eq!(pairs.get("search").map(String::as_str), Some(""));
    assert!(!pairs.contains_key("date1"));
}

#[tokio::test]
async fn auth_failure_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("/stat/v1/data", vec![]).await.unwrap_err();
    assert!(matches!(err, MetrikaError::Auth { status: 401 }));
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn forbidden_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("/stat/v1/data", vec![]).await.unwrap_err();
    assert!(matches!(err, MetrikaError::Auth { status: 403 }));
}

#[tokio::test]
async fn persistent_server_error_exhausts_all_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("/stat/v1/data", vec![]).await.unwrap_err();
    match &err {
        MetrikaError::Upstream {
            status, attempts, ..
        } => {
            assert_eq!(*status, 500);
            assert_eq!(*attempts, 3);
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
    assert!(err.to_string().contains("3"));
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn recovers_after_transient_server_error() {
    let server = MockServer::start().await;
    // First attempt sees a 502, the retry succeeds
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"visits": 7})))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.get("/stat/v1/data", vec![]).await.unwrap();
    assert_eq!(result, json!({"visits": 7}));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn network_failure_exhausts_as_transport() {
    // Port 9 (discard) is not listening; every attempt fails at connect time
    let config = Config {
        retries: 2,
        ..test_config()
    };
    let client = MetrikaClient::with_base_url(&config, "http://127.0.0.1:9").unwrap();
    let err = client.get("/stat/v1/data", vec![]).await.unwrap_err();
    match err {
        MetrikaError::Transport { attempts, message } => {
            assert_eq!(attempts, 2);
            assert!(!message.is_empty());
        }
        other => panic!("expected Transport, got {other:?}"),
    }
}

#[tokio::test]
async fn backoff_waits_grow_linearly_with_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    // base*1 + base*2 between three attempts: 0.6s total at base 0.2s
    let config = Config {
        retry_delay: 0.2,
        ..test_config()
    };
    let client = MetrikaClient::with_base_url(&config, &server.uri()).unwrap();
    let started = std::time::Instant::now();
    let err = client.get("/stat/v1/data", vec![]).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, MetrikaError::Upstream { attempts: 3, .. }));
    assert!(
        elapsed >= std::time::Duration::from_millis(600),
        "expected at least 600ms of backoff, got {elapsed:?}"
    );
    assert!(
        elapsed < std::time::Duration::from_millis(1200),
        "backoff took too long: {elapsed:?}"
    );
}

#[tokio::test]
async fn invalid_json_body_is_decode_error_with_source() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("/stat/v1/data", vec![]).await.unwrap_err();
    assert!(matches!(err, MetrikaError::Decode(_)));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn non_retryable_status_fails_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("no such counter"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.get("/stat/v1/data", vec![]).await.unwrap_err();
    match err {
        MetrikaError::Upstream {
            status,
            attempts,
            body,
        } => {
            assert_eq!(status, 404);
            assert_eq!(attempts, 1);
            assert!(body.contains("no such counter"));
        }
        other => panic!("expected Upstream, got {other:?}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn success_returns_payload_verbatim() {
    let server = MockServer::start().await;
    let payload = json!({
        "query": {"ids": [123]},
        "data": [{"dimensions": [{"name": "Москва"}], "metrics": [42.0]}],
    });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload.clone()))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client.get("/stat/v1/data", vec![]).await.unwrap();
    assert_eq!(result, payload);
}

#[tokio::test]
async fn single_attempt_config_never_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let config = Config {
        retries: 1,
        ..test_config()
    };
    let client = MetrikaClient::with_base_url(&config, &server.uri()).unwrap();
    let err = client.get("/stat/v1/data", vec![]).await.unwrap_err();
    assert!(matches!(
        err,
        MetrikaError::Upstream {
            status: 503,
            attempts: 1,
            ..
        }
    ));
}
