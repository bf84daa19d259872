//! Integration tests for the analytics tool handlers.
//!
//! Each handler builds exactly one upstream GET; these tests assert the
//! query parameters that reach the wire and that validation failures
//! short-circuit before any request is issued.

use metrika_mcp_server::config::Config;
use metrika_mcp_server::error::MetrikaError;
use metrika_mcp_server::metrika::MetrikaClient;
use metrika_mcp_server::tools::{
    AdvancedTools, GeographicTools, PerformanceTools, TrafficTools,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn test_client(server: &MockServer) -> Arc<MetrikaClient> {
    let config = Config {
        api_key: "test-token".to_string(),
        retries: 1,
        retry_delay: 0.01,
        ..Config::default()
    };
    Arc::new(MetrikaClient::with_base_url(&config, &server.uri()).unwrap())
}

async fn mount_ok(server: &MockServer) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(server)
        .await;
}

fn query_map(request: &Request) -> HashMap<String, String> {
    request.url.query_pairs().into_owned().collect()
}

#[tokio::test]
async fn visits_sends_explicit_date_range() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stat/v1/data"))
        .and(query_param("ids", "123"))
        .and(query_param("metrics", "ym:s:visits"))
        .and(query_param("date1", "2024-01-01"))
        .and(query_param("date2", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&server)
        .await;

    let tools = TrafficTools::new(test_client(&server));
    tools
        .get_visits("123", Some("2024-01-01"), Some("2024-01-31"))
        .await
        .unwrap();
}

#[tokio::test]
async fn visits_defaults_to_seven_day_window() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = TrafficTools::new(test_client(&server));
    tools.get_visits("123", None, None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let pairs = query_map(&requests[0]);
    let date1 = pairs.get("date1").unwrap();
    let date2 = pairs.get("date2").unwrap();
    assert_eq!(date1.len(), 10);
    assert_eq!(date2.len(), 10);
    assert!(date1.as_str() < date2.as_str());
}

#[tokio::test]
async fn visits_rejects_malformed_date_before_network() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = TrafficTools::new(test_client(&server));
    let err = tools
        .get_visits("123", Some("15-01-2024"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, MetrikaError::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn search_engines_filters_joined_with_and() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = TrafficTools::new(test_client(&server));
    tools
        .get_search_engines_data("123", true, false)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let pairs = query_map(&requests[0]);
    assert_eq!(
        pairs.get("filters").map(String::as_str),
        Some("ym:s:trafficSource=='organic' AND ym:s:isRobot=='No'")
    );
}

#[tokio::test]
async fn list_counters_omits_absent_search() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = TrafficTools::new(test_client(&server));
    tools.list_counters(None, 100).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/management/v1/counters");
    let pairs = query_map(&requests[0]);
    assert_eq!(pairs.get("per_page").map(String::as_str), Some("100"));
    assert!(!pairs.contains_key("search"));
}

#[tokio::test]
async fn account_info_uses_management_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/management/v1/counter/456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"counter": {}})))
        .expect(1)
        .mount(&server)
        .await;

    let tools = TrafficTools::new(test_client(&server));
    tools.get_account_info("456").await.unwrap();
}

#[tokio::test]
async fn regional_data_default_city_filter() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = GeographicTools::new(test_client(&server));
    tools.get_regional_data("123", None).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let pairs = query_map(&requests[0]);
    assert_eq!(
        pairs.get("filters").map(String::as_str),
        Some("ym:s:regionCityName=.('Москва','Санкт-Петербург')")
    );
}

#[tokio::test]
async fn regional_data_custom_cities() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = GeographicTools::new(test_client(&server));
    let cities = vec!["Казань".to_string()];
    tools
        .get_regional_data("123", Some(&cities))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let pairs = query_map(&requests[0]);
    assert_eq!(
        pairs.get("filters").map(String::as_str),
        Some("ym:s:regionCityName=.('Казань')")
    );
}

#[tokio::test]
async fn goals_conversion_builds_dynamic_metric_names() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = PerformanceTools::new(test_client(&server));
    tools.get_goals_conversion("123", &[1, 2]).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let pairs = query_map(&requests[0]);
    assert_eq!(
        pairs.get("metrics").map(String::as_str),
        Some("ym:s:users,ym:s:goal1conversionRate,ym:s:goal2conversionRate")
    );
}

#[tokio::test]
async fn data_by_time_rejects_too_many_metrics() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = AdvancedTools::new(test_client(&server));
    let metrics: Vec<String> = (0..21).map(|i| format!("ym:s:metric{i}")).collect();
    let err = tools
        .get_data_by_time("123", &metrics, None, None, None, "day", 7, None)
        .await
        .unwrap_err();

    match err {
        MetrikaError::Validation { field, .. } => assert_eq!(field, "metrics"),
        other => panic!("expected Validation, got {other:?}"),
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn data_by_time_rejects_too_many_dimensions() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = AdvancedTools::new(test_client(&server));
    let metrics = vec!["ym:s:visits".to_string()];
    let dimensions: Vec<String> = (0..11).map(|i| format!("ym:s:dim{i}")).collect();
    let err = tools
        .get_data_by_time(
            "123",
            &metrics,
            None,
            None,
            Some(&dimensions),
            "day",
            7,
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, MetrikaError::Validation { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn data_by_time_rejects_unknown_group() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = AdvancedTools::new(test_client(&server));
    let metrics = vec!["ym:s:visits".to_string()];
    let err = tools
        .get_data_by_time("123", &metrics, None, None, None, "decade", 7, None)
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("day, week, month, quarter, year"));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn data_by_time_rejects_top_keys_out_of_range() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = AdvancedTools::new(test_client(&server));
    let metrics = vec!["ym:s:visits".to_string()];
    for top_keys in [0, 31] {
        let err = tools
            .get_data_by_time("123", &metrics, None, None, None, "day", top_keys, None)
            .await
            .unwrap_err();
        assert!(matches!(err, MetrikaError::Validation { .. }));
    }
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn data_by_time_sends_bounds_and_drops_absent_dimensions() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = AdvancedTools::new(test_client(&server));
    let metrics = vec!["ym:s:visits".to_string(), "ym:s:users".to_string()];
    tools
        .get_data_by_time(
            "123",
            &metrics,
            Some("2024-01-01"),
            Some("2024-01-31"),
            None,
            "week",
            10,
            None,
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/stat/v1/data/bytime");
    let pairs = query_map(&requests[0]);
    assert_eq!(
        pairs.get("metrics").map(String::as_str),
        Some("ym:s:visits,ym:s:users")
    );
    assert_eq!(pairs.get("group").map(String::as_str), Some("week"));
    assert_eq!(pairs.get("top_keys").map(String::as_str), Some("10"));
    assert!(!pairs.contains_key("dimensions"));
    assert!(!pairs.contains_key("timezone"));
}

#[tokio::test]
async fn ecommerce_embeds_currency_in_metric_name() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = AdvancedTools::new(test_client(&server));
    tools
        .get_ecommerce_performance("123", "USD", None, None)
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let pairs = query_map(&requests[0]);
    assert_eq!(
        pairs.get("metrics").map(String::as_str),
        Some("ym:s:ecommercePurchases,ym:s:ecommerceUSDConvertedRevenue")
    );
}

#[tokio::test]
async fn drilldown_hits_dedicated_endpoint() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = AdvancedTools::new(test_client(&server));
    let metrics = vec!["ym:s:visits".to_string()];
    tools
        .get_drilldown(
            "123",
            "ym:s:regionCountry,ym:s:regionCity",
            &metrics,
            Some("ru"),
            None,
            None,
            Some(50),
        )
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.path(), "/stat/v1/data/drilldown");
    let pairs = query_map(&requests[0]);
    assert_eq!(pairs.get("id").map(String::as_str), Some("123"));
    assert_eq!(pairs.get("parent_id").map(String::as_str), Some("ru"));
    assert_eq!(pairs.get("limit").map(String::as_str), Some("50"));
}

#[tokio::test]
async fn direct_experiment_embeds_experiment_id() {
    let server = MockServer::start().await;
    mount_ok(&server).await;

    let tools = AdvancedTools::new(test_client(&server));
    tools.get_yandex_direct_experiment("123", 42).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let pairs = query_map(&requests[0]);
    assert_eq!(
        pairs.get("dimensions").map(String::as_str),
        Some("ym:s:experimentAB42")
    );
    assert_eq!(
        pairs.get("metrics").map(String::as_str),
        Some("ym:s:bounceRate")
    );
}

#[tokio::test]
async fn upstream_errors_surface_through_handlers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let tools = TrafficTools::new(test_client(&server));
    let err = tools.get_account_info("123").await.unwrap_err();
    assert!(matches!(err, MetrikaError::Auth { status: 401 }));
}
