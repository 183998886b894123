use super::*;
use crate::pipeline::test_helpers::{RecordingLedger, StubEngine, create_test_pipeline};
use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, Response, StatusCode};
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;


/// Router over a stub engine, plus everything a test may want to inspect
struct TestApp {
    router: Router,
    engine: Arc<StubEngine>,
    ledger: Arc<RecordingLedger>,
    pipeline: Arc<FetchPipeline>,
    _dir: TempDir,
}

async fn create_test_app(engine: StubEngine) -> TestApp {
    create_test_app_with(engine, |_| {}).await
}

async fn create_test_app_with(engine: StubEngine, tweak: impl FnOnce(&mut Config)) -> TestApp {
    let engine = Arc::new(engine);
    let (pipeline, dir, ledger) = create_test_pipeline(engine.clone()).await;
    let pipeline = Arc::new(pipeline);

    let mut config = (**pipeline.config()).clone();
    tweak(&mut config);
    let router = create_router(pipeline.clone(), Arc::new(config));

    TestApp {
        router,
        engine,
        ledger,
        pipeline,
        _dir: dir,
    }
}

async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn server_binds_serves_and_shuts_down() {
    let engine = Arc::new(StubEngine::new("Song"));
    let (pipeline, _dir, _ledger) = create_test_pipeline(engine).await;
    let pipeline = Arc::new(pipeline);

    let mut config = (**pipeline.config()).clone();
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let mut events = pipeline.subscribe();
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(start_api_server_with_shutdown(
        pipeline.clone(),
        config,
        shutdown.clone(),
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    shutdown.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());

    let event = events.try_recv().unwrap();
    assert_eq!(event.kind(), "shutdown");
}

#[tokio::test]
async fn bind_failure_is_reported() {
    let engine = Arc::new(StubEngine::new("Song"));
    let (pipeline, _dir, _ledger) = create_test_pipeline(engine).await;
    let pipeline = Arc::new(pipeline);

    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let mut config = (**pipeline.config()).clone();
    config.server.api.bind_address = occupied.local_addr().unwrap();

    let result = start_api_server(pipeline, Arc::new(config)).await;
    assert!(matches!(result, Err(crate::Error::Io(_))));
}

#[tokio::test]
async fn cors_headers_are_sent_when_enabled() {
    let app = create_test_app(StubEngine::new("Song")).await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn cors_can_be_disabled() {
    let app = create_test_app_with(StubEngine::new("Song"), |c| {
        c.server.api.cors_enabled = false;
    })
    .await;

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(request).await.unwrap();

    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn cors_with_explicit_origins_only_echoes_listed_ones() {
    let app = create_test_app_with(StubEngine::new("Song"), |c| {
        c.server.api.cors_origins = vec!["https://music.example".into()];
    })
    .await;

    let allowed = Request::builder()
        .uri("/health")
        .header("Origin", "https://music.example")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(allowed).await.unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "https://music.example"
    );

    let other = Request::builder()
        .uri("/health")
        .header("Origin", "https://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.router.oneshot(other).await.unwrap();
    assert!(
        !response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}

#[tokio::test]
async fn rate_limiting_returns_429_when_exceeded() {
    let app = create_test_app_with(StubEngine::new("Song"), |c| {
        c.server.api.rate_limit = crate::config::RateLimitConfig {
            enabled: true,
            requests_per_second: 1,
            burst_size: 2,
            exempt_paths: vec!["/health".into()],
            exempt_ips: vec![],
        };
    })
    .await;

    let peer: SocketAddr = "203.0.113.50:40000".parse().unwrap();
    let request = |uri: &str| {
        Request::builder()
            .uri(uri)
            .extension(ConnectInfo(peer))
            .body(Body::empty())
            .unwrap()
    };

    for _ in 0..2 {
        let response = app.router.clone().oneshot(request("/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.router.clone().oneshot(request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));

    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "rate_limited");
    assert!(body["error"]["details"]["retry_after_seconds"].is_number());

    // Exempt paths keep working
    let response = app.router.oneshot(request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = create_test_app(StubEngine::new("Song")).await;
    let response = app.router.oneshot(get("/downloads")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
