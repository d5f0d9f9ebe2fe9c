//! Tracing over a real listener, driven by an HTTP client.

use std::time::Duration;

use axum::{routing::get, Router};
use request_tracer::config::parse_config;
use request_tracer::sink::MemoryChannel;
use request_tracer::tracer::key_source;
use request_tracer::{registrar, PathFilter};
use tokio::net::TcpListener;

mod common;
use common::{parse, Line};

#[tokio::test]
async fn test_traced_server_over_tcp() {
    let config = parse_config(
        r#"
        [application]
        name = "ts-order-service"

        [tracing]
        exclude = ["/actuator/**"]
        context_key = "request_id"
        "#,
    )
    .unwrap();

    let channel = MemoryChannel::new();
    let tracer =
        common::memory_tracer(&channel).with_key_source(key_source(config.tracing.context_key));
    let routes = Router::new()
        .route("/orders/{id}", get(|| async { "order" }))
        .route("/actuator/health", get(|| async { "UP" }));
    let app = registrar::install(
        routes,
        std::sync::Arc::new(tracer),
        PathFilter::from_config(&config.tracing).unwrap(),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("http://{addr}/actuator/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("http://{addr}/orders/42"))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "order");

    let lines: Vec<Line> = channel.lines().iter().map(|l| parse(l)).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        Line::Enter {
            method: "GET".into(),
            uri: "/orders/42".into(),
            key: "req-42.1".into(),
        }
    );
    assert!(matches!(&lines[1], Line::Exit { status: 200, key, .. } if key == "req-42.1"));
}
