use finagent_core::api::error::{ApiError, ApiErrorKind};
use finagent_core::api::{ApiClient, MarketApi};
use finagent_core::chat::ChatSession;
use finagent_core::dashboard::{DashboardController, DashboardParams, DashboardState};
use finagent_core::domain::recommendation::Action;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri(), Duration::from_secs(5)).unwrap()
}

fn forecast_body(ticker: &str, last: f64) -> Value {
    json!({
        "ticker": ticker,
        "history": [
            {"ts": "2026-01-05T00:00:00", "value": 101.0, "ema": 100.0},
            {"ts": "2026-01-06T00:00:00", "value": 103.0, "ema": 100.4}
        ],
        "forecast": [
            {"ts": "2026-01-07T00:00:00", "value": last}
        ],
        "metrics": {"last_deviation": 2.6, "window": 14}
    })
}

fn recommendation_body(ticker: &str) -> Value {
    json!({
        "ticker": ticker,
        "window": 14,
        "action": "buy",
        "confidence": 0.128,
        "rationale": "price vs EMA delta=2.6000"
    })
}

async fn mount_dashboard(server: &MockServer, ticker: &str, last: f64, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/api/v1/mcp/forecast"))
        .and(body_partial_json(json!({"ticker": ticker})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body(ticker, last))
                .set_delay(delay),
        )
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/mcp/recommendation"))
        .and(query_param("ticker", ticker))
        .respond_with(ResponseTemplate::new(200).set_body_json(recommendation_body(ticker)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn forecast_posts_expected_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/mcp/forecast"))
        .and(body_json(json!({"ticker": "AAPL", "horizon_days": 7, "window": 14})))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("AAPL", 100.4)))
        .expect(1)
        .mount(&server)
        .await;

    let forecast = client(&server).fetch_forecast("AAPL", 7, 14).await.unwrap();
    assert_eq!(forecast.ticker, "AAPL");
    assert_eq!(forecast.history.len(), 2);
    assert_eq!(forecast.projected_value(), Some(100.4));
}

#[tokio::test]
async fn recommendation_uses_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/mcp/recommendation"))
        .and(query_param("ticker", "MSFT"))
        .and(query_param("window", "21"))
        .respond_with(ResponseTemplate::new(200).set_body_json(recommendation_body("MSFT")))
        .expect(1)
        .mount(&server)
        .await;

    let rec = client(&server).fetch_recommendation("MSFT", 21).await.unwrap();
    assert_eq!(rec.action, Action::Buy);
    assert_eq!(rec.headline(), "BUY (13%)");
}

#[tokio::test]
async fn chat_returns_reply_and_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .and(body_json(json!({"message": "AAPL forecast"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reply": "- Apple guidance raised [1]",
            "sources": [{"score": 0.8, "title": "Guidance", "url": "https://example.com/g", "content": "..."}]
        })))
        .mount(&server)
        .await;

    let reply = client(&server).send_chat("AAPL forecast").await.unwrap();
    assert_eq!(reply.reply, "- Apple guidance raised [1]");
    assert_eq!(reply.sources[0].url, "https://example.com/g");
}

#[tokio::test]
async fn health_defaults_missing_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let health = client(&server).fetch_health().await.unwrap();
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn http_error_carries_status_and_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/mcp/forecast"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({"detail": "No market data for ticker"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).fetch_forecast("ZZZ", 7, 14).await.unwrap_err();
    let api = err.downcast_ref::<ApiError>().unwrap();
    assert_eq!(api.kind, ApiErrorKind::Status(404));
    assert_eq!(api.detail, "No market data for ticker");
}

#[tokio::test]
async fn malformed_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/mcp/recommendation"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client(&server).fetch_recommendation("AAPL", 14).await.unwrap_err();
    assert_eq!(err.downcast_ref::<ApiError>().unwrap().kind, ApiErrorKind::Decode);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    // Nothing listens on the discard port.
    let client = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = client.fetch_health().await.unwrap_err();
    assert_eq!(err.downcast_ref::<ApiError>().unwrap().kind, ApiErrorKind::Network);
}

#[tokio::test]
async fn controller_keeps_latest_ticker_over_http() {
    let server = MockServer::start().await;
    mount_dashboard(&server, "AAPL", 111.0, Duration::from_millis(300)).await;
    mount_dashboard(&server, "MSFT", 222.0, Duration::ZERO).await;

    let controller = DashboardController::new(Arc::new(client(&server)));
    let slow = controller.set_params(DashboardParams::new("AAPL"));
    let fast = controller.set_params(DashboardParams::new("MSFT"));
    fast.await.unwrap();
    slow.await.unwrap();

    let DashboardState::Success { data, params, .. } = controller.state() else {
        panic!("expected success");
    };
    assert_eq!(params.ticker, "MSFT");
    assert_eq!(data.forecast.projected_value(), Some(222.0));
    assert_eq!(data.recommendation.ticker, "MSFT");
}

#[tokio::test]
async fn controller_surfaces_recommendation_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/mcp/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("AAPL", 100.0)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/mcp/recommendation"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let controller = DashboardController::new(Arc::new(client(&server)));
    controller.set_params(DashboardParams::new("AAPL"));

    let state = controller.wait_settled().await.unwrap();
    let DashboardState::Error { message, .. } = &state else {
        panic!("expected error, got {state:?}");
    };
    assert_eq!(
        message,
        "recommendation request failed (HTTP 500): Internal Server Error"
    );
}

#[tokio::test]
async fn chat_session_appends_mcp_summary_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"reply": "ok", "sources": []})))
        .mount(&server)
        .await;
    mount_dashboard(&server, "AAPL", 100.4, Duration::ZERO).await;

    let mut session = ChatSession::new(Arc::new(client(&server)));
    let added = session.send("AAPL forecast").await;
    assert_eq!(added.len(), 3);
    assert!(added[2].text.contains("projected value ~ 100.40"));
    assert!(added[2].text.contains("BUY (13%)"));
}
