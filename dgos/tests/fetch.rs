//! HTTP fetcher against an in-process server.

mod common;

use std::time::Duration;

use axum::{http::StatusCode, routing::get, Json, Router};
use common::{metrics, multi};
use dgos::fetch::{metrics_endpoint, HttpSource, MetricsSource};
use dgos::normalize::normalize;
use dgos::SyncError;

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn source(base: &str, timeout: Duration) -> HttpSource {
    HttpSource::new(metrics_endpoint(base).unwrap(), timeout).unwrap()
}

#[tokio::test]
async fn fetches_and_normalizes_a_multi_agent_payload() {
    let body = multi(&[("a", metrics(10, 20))]);
    let served = body.clone();
    let base = serve(Router::new().route(
        "/api/metrics",
        get(move || {
            let b = served.clone();
            async move { Json(b) }
        }),
    ))
    .await;

    let src = source(&base, Duration::from_secs(2));
    let raw = src.fetch().await.expect("fetch");
    assert_eq!(raw.body, body);
    let snap = normalize(&raw).unwrap();
    assert_eq!(snap.timestamp, raw.fetched_at);
    assert_eq!(snap.agents.len(), 1);
}

#[tokio::test]
async fn non_success_status_is_a_transport_failure() {
    let base = serve(Router::new().route(
        "/api/metrics",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "warming up") }),
    ))
    .await;
    let err = source(&base, Duration::from_secs(2)).fetch().await.unwrap_err();
    match err {
        SyncError::Transport(msg) => assert!(msg.contains("503"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn non_json_body_is_an_invalid_shape() {
    let base = serve(Router::new().route("/api/metrics", get(|| async { "<html>oops</html>" }))).await;
    let err = source(&base, Duration::from_secs(2)).fetch().await.unwrap_err();
    assert!(matches!(err, SyncError::InvalidShape { ref path, .. } if path == "$"));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_failure() {
    // grab a free port, then close it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = source(&format!("http://{addr}"), Duration::from_secs(2))
        .fetch()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn slow_endpoint_times_out_as_transport_failure() {
    let base = serve(Router::new().route(
        "/api/metrics",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "{}"
        }),
    ))
    .await;
    let err = source(&base, Duration::from_millis(200)).fetch().await.unwrap_err();
    assert_eq!(err.kind(), "transport");
}

#[tokio::test]
async fn base_url_path_prefix_is_kept() {
    let base = serve(Router::new().route(
        "/monitor/api/metrics",
        get(|| async { Json(serde_json::json!({})) }),
    ))
    .await;
    let src = source(&format!("{base}/monitor/"), Duration::from_secs(2));
    assert!(src.describe().ends_with("/monitor/api/metrics"));
    let snap = normalize(&src.fetch().await.unwrap()).unwrap();
    assert!(snap.is_empty());
}

#[test]
fn endpoint_is_base_plus_metrics_path() {
    assert_eq!(
        metrics_endpoint("http://localhost:8080").unwrap().as_str(),
        "http://localhost:8080/api/metrics"
    );
    assert_eq!(
        metrics_endpoint("http://localhost:8080/").unwrap().as_str(),
        "http://localhost:8080/api/metrics"
    );
    assert_eq!(
        metrics_endpoint("http://h/api/metrics").unwrap().as_str(),
        "http://h/api/metrics"
    );
    assert!(metrics_endpoint("not a url").is_err());
}
