//! Failure injection tests for the resilient product client.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use axum::http::StatusCode;
use serde_json::Value;

mod common;

async fn recommendation(addr: std::net::SocketAddr, user: &str) -> Value {
    let res = common::client()
        .get(format!("http://{}/users/{}/recommendation", addr, user))
        .send()
        .await
        .expect("service unreachable");
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

async fn circuit(addr: std::net::SocketAddr) -> Value {
    common::client()
        .get(format!("http://{}/admin/circuit", addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn metrics_text(addr: std::net::SocketAddr) -> String {
    common::client()
        .get(format!("http://{}/metrics", addr))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_recommendation_success() {
    let backend = common::start_programmable_backend(|| async {
        (200, common::LAPTOP_JSON.to_string())
    })
    .await;
    let (addr, shutdown) = common::start_service(common::test_config(backend, "fi-success")).await;

    let body = recommendation(addr, "1").await;
    assert_eq!(body["user"]["name"], "Alice");
    assert_eq!(body["recommendedProduct"]["id"], 101);
    assert_eq!(body["recommendedProduct"]["name"], "Laptop");

    let metrics = metrics_text(addr).await;
    assert!(metrics.contains(r#"product_service_requests_total{service="fi-success"} 1"#));
    assert!(metrics.contains(r#"circuit_breaker_state{service="fi-success"} 0"#));

    shutdown.trigger();
}

#[tokio::test]
async fn test_retry_on_failure() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let backend = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            let count = cc.fetch_add(1, Ordering::SeqCst);
            if count < 2 {
                (503, "Service Unavailable".into())
            } else {
                (200, common::LAPTOP_JSON.to_string())
            }
        }
    })
    .await;
    let (addr, shutdown) = common::start_service(common::test_config(backend, "fi-retry")).await;

    let body = recommendation(addr, "2").await;
    assert_eq!(body["recommendedProduct"]["name"], "Laptop", "should succeed after retries");
    assert_eq!(call_count.load(Ordering::SeqCst), 3);

    let snapshot = circuit(addr).await;
    assert_eq!(snapshot["state"], "closed");
    assert_eq!(snapshot["failure_count"], 0);

    let metrics = metrics_text(addr).await;
    assert!(metrics.contains(r#"retry_attempts_total{service="fi-retry"} 2"#));

    shutdown.trigger();
}

#[tokio::test]
async fn test_circuit_opens_and_short_circuits() {
    let call_count = Arc::new(AtomicU32::new(0));
    let cc = call_count.clone();
    let backend = common::start_programmable_backend(move || {
        let cc = cc.clone();
        async move {
            cc.fetch_add(1, Ordering::SeqCst);
            (503, "Service Unavailable".into())
        }
    })
    .await;
    let mut config = common::test_config(backend, "fi-open");
    config.circuit_breaker.reset_timeout_ms = 60_000;
    let (addr, shutdown) = common::start_service(config).await;

    let first = recommendation(addr, "1").await;
    assert_eq!(first["user"]["id"], "1");
    assert_eq!(first["recommendedProduct"]["error"], "Could not fetch recommendation");
    // One try plus three retries.
    assert_eq!(call_count.load(Ordering::SeqCst), 4);

    let snapshot = circuit(addr).await;
    assert_eq!(snapshot["state"], "open");

    let second = recommendation(addr, "1").await;
    assert_eq!(second["recommendedProduct"]["error"], "Could not fetch recommendation");
    assert_eq!(call_count.load(Ordering::SeqCst), 4, "open circuit must not reach the network");

    let metrics = metrics_text(addr).await;
    assert!(metrics.contains(r#"circuit_breaker_opens_total{service="fi-open"} 1"#));
    assert!(metrics.contains(r#"circuit_breaker_short_circuited_total{service="fi-open"} 1"#));
    assert!(metrics.contains(r#"retry_attempts_total{service="fi-open"} 4"#));
    assert!(metrics.contains(r#"circuit_breaker_state{service="fi-open"} 1"#));
    assert!(metrics.contains(r#"product_service_requests_total{service="fi-open"} 2"#));

    shutdown.trigger();
}

#[tokio::test]
async fn test_circuit_recovers_after_reset_timeout() {
    let healthy = Arc::new(AtomicBool::new(false));
    let h = healthy.clone();
    let backend = common::start_programmable_backend(move || {
        let h = h.clone();
        async move {
            if h.load(Ordering::SeqCst) {
                (200, common::LAPTOP_JSON.to_string())
            } else {
                (500, "dead".into())
            }
        }
    })
    .await;
    let mut config = common::test_config(backend, "fi-recover");
    config.circuit_breaker.reset_timeout_ms = 300;
    let (addr, shutdown) = common::start_service(config).await;

    let _ = recommendation(addr, "3").await;
    assert_eq!(circuit(addr).await["state"], "open");

    healthy.store(true, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(400)).await;

    let body = recommendation(addr, "3").await;
    assert_eq!(body["recommendedProduct"]["name"], "Laptop");

    let snapshot = circuit(addr).await;
    assert_eq!(snapshot["state"], "closed");
    assert_eq!(snapshot["failure_count"], 0);

    shutdown.trigger();
}

#[tokio::test]
async fn test_unreachable_upstream_falls_back() {
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let backend = closed.local_addr().unwrap();
    drop(closed);

    let mut config = common::test_config(backend, "fi-unreachable");
    config.retries.max_attempts = 1;
    let (addr, shutdown) = common::start_service(config).await;

    let body = recommendation(addr, "2").await;
    assert_eq!(body["user"]["name"], "Bob");
    assert_eq!(body["recommendedProduct"]["error"], "Could not fetch recommendation");

    let snapshot = circuit(addr).await;
    assert_eq!(snapshot["state"], "closed");
    assert_eq!(snapshot["failure_count"], 2);

    shutdown.trigger();
}

#[tokio::test]
async fn test_user_routes() {
    let backend = common::start_programmable_backend(|| async {
        (200, common::LAPTOP_JSON.to_string())
    })
    .await;
    let (addr, shutdown) = common::start_service(common::test_config(backend, "fi-routes")).await;
    let client = common::client();

    let res = client.get(format!("http://{}/users/1", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["data"]["email"], "alice@example.com");

    let res = client.get(format!("http://{}/users/42", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["error"], "Not Found");

    let res = client.get(format!("http://{}/no-such-route", addr)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("http://{}/users/42/recommendation", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .get(format!("http://{}/health", addr))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");
    assert_eq!(res.text().await.unwrap(), "User Service is healthy!");

    let res = client.get(format!("http://{}/metrics", addr)).send().await.unwrap();
    assert!(res.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
    let metrics = res.text().await.unwrap();
    assert!(metrics.contains("http_request_total"));
    assert!(metrics.contains(r#"path="/users/{id}""#));
    assert!(!metrics.contains("no-such-route"));

    shutdown.trigger();
}
