use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use futures::stream;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use video_companion::http::handlers::{middleware_error, panic_response};
use video_companion::http::{is_allowed_origin, IngestLimits};
use video_companion::{create_router, AppState, Notifier};

#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn show(&self) {
        self.events.lock().push("show".to_string());
    }

    fn focus(&self) {
        self.events.lock().push("focus".to_string());
    }

    fn deliver(&self, url: &str, title: &str) {
        self.events.lock().push(format!("deliver {} | {}", url, title));
    }

    fn report_error(&self, message: &str) {
        self.events.lock().push(format!("error {}", message));
    }
}

fn app() -> (Router, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::new(notifier.clone(), IngestLimits::default());
    (create_router(state), notifier)
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/send-url")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_ping() -> anyhow::Result<()> {
    let (app, _) = app();

    let response = app
        .oneshot(Request::get("/ping").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
    Ok(())
}

#[tokio::test]
async fn test_send_url_delivers_to_ui() -> anyhow::Result<()> {
    let (app, notifier) = app();
    let body = json!({ "url": "https://www.youtube.com/watch?v=abc", "title": "My <b>Video</b>" });

    let response = app.oneshot(post_json(body.to_string())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "success": true }));
    assert_eq!(
        notifier.events(),
        vec![
            "deliver https://www.youtube.com/watch?v=abc | My bVideo/b".to_string(),
            "show".to_string(),
            "focus".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_send_url_defaults_title() -> anyhow::Result<()> {
    let (app, notifier) = app();
    let body = json!({ "url": "https://example.com/clip", "title": "   " });

    let response = app.oneshot(post_json(body.to_string())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        notifier.events()[0],
        "deliver https://example.com/clip | External Video"
    );
    Ok(())
}

#[tokio::test]
async fn test_send_url_missing_url() -> anyhow::Result<()> {
    let (app, notifier) = app();

    let response = app
        .oneshot(post_json(json!({ "title": "x" }).to_string()))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "URL must be a non-empty string" })
    );
    assert!(notifier.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_send_url_rejects_non_http_scheme() -> anyhow::Result<()> {
    let (app, notifier) = app();

    let response = app
        .oneshot(post_json(json!({ "url": "file:///etc/passwd" }).to_string()))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Only HTTP/HTTPS URLs are allowed" })
    );
    assert!(notifier.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_send_url_rejects_overlong_url() -> anyhow::Result<()> {
    let (app, _) = app();
    let url = format!("https://example.com/{}", "a".repeat(2048));

    let response = app
        .oneshot(post_json(json!({ "url": url }).to_string()))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "URL exceeds maximum length" })
    );
    Ok(())
}

#[tokio::test]
async fn test_send_url_invalid_json() -> anyhow::Result<()> {
    let (app, _) = app();

    let response = app.oneshot(post_json("{not json")).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({ "error": "Invalid JSON" }));
    Ok(())
}

#[tokio::test]
async fn test_oversized_body_rejected_before_fully_read() -> anyhow::Result<()> {
    let (app, notifier) = app();
    let polled = Arc::new(AtomicUsize::new(0));

    let counter = polled.clone();
    let chunks = stream::iter((0..10).map(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok::<_, std::io::Error>(vec![b'a'; 4096])
    }));

    let response = app.oneshot(post_json(Body::from_stream(chunks))).await?;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(
        response.headers().get(header::CONNECTION).unwrap(),
        "close"
    );
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Request body too large" })
    );
    // Two chunks fit under 10 KiB; the third trips the cap
    assert_eq!(polled.load(Ordering::SeqCst), 3);
    assert!(notifier.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_declared_length_over_cap_rejected() -> anyhow::Result<()> {
    let (app, _) = app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/send-url")
        .header(header::CONTENT_LENGTH, "20000")
        .body(Body::from("{}"))?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stalled_body_times_out() -> anyhow::Result<()> {
    let (app, notifier) = app();
    let stalled = stream::pending::<Result<Vec<u8>, std::io::Error>>();

    let response = app.oneshot(post_json(Body::from_stream(stalled))).await?;

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(json_body(response).await, json!({ "error": "Request timeout" }));
    assert!(notifier.events().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unknown_path_is_404() -> anyhow::Result<()> {
    let (app, _) = app();

    let response = app
        .oneshot(Request::get("/unknown").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await, json!({ "error": "Not found" }));
    Ok(())
}

#[tokio::test]
async fn test_wrong_method_is_404() -> anyhow::Result<()> {
    let (app, _) = app();

    let ping = app
        .clone()
        .oneshot(Request::post("/ping").body(Body::empty())?)
        .await?;
    assert_eq!(ping.status(), StatusCode::NOT_FOUND);

    let send = app
        .oneshot(Request::get("/send-url").body(Body::empty())?)
        .await?;
    assert_eq!(send.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn test_preflight_from_extension() -> anyhow::Result<()> {
    let (app, _) = app();
    let origin = "chrome-extension://abcdefghijklmnop";

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/send-url")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(), origin);
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()?;
    assert!(methods.contains("POST"));
    assert!(methods.contains("GET"));
    let allowed_headers = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()?;
    assert!(allowed_headers.eq_ignore_ascii_case("content-type"));
    Ok(())
}

#[tokio::test]
async fn test_untrusted_origin_gets_null() -> anyhow::Result<()> {
    let (app, _) = app();

    let request = Request::builder()
        .uri("/ping")
        .header(header::ORIGIN, "https://evil.example.com")
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "null"
    );
    Ok(())
}

#[tokio::test]
async fn test_allowed_origin_reflected_on_errors() -> anyhow::Result<()> {
    let (app, _) = app();
    let origin = "moz-extension://1234-5678";

    let request = Request::builder()
        .uri("/nope")
        .header(header::ORIGIN, origin)
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        origin
    );
    Ok(())
}

#[test]
fn test_origin_policy() {
    assert!(is_allowed_origin("chrome-extension://abcdef"));
    assert!(is_allowed_origin("safari-web-extension://ABC-123"));
    assert!(is_allowed_origin("http://localhost:3000"));
    assert!(is_allowed_origin("http://127.0.0.1"));

    assert!(!is_allowed_origin("chrome-extension://"));
    assert!(!is_allowed_origin("https://localhost"));
    assert!(!is_allowed_origin("http://localhost.evil.com"));
    assert!(!is_allowed_origin("https://example.com"));
    assert!(!is_allowed_origin("null"));
}

#[tokio::test]
async fn test_panic_becomes_500() {
    let response = panic_response(Box::new("handler blew up"));

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "Internal server error" })
    );
}

#[tokio::test]
async fn test_send_url_exact_payload() -> anyhow::Result<()> {
    let (app, notifier) = app();
    let body = json!({ "url": "https://example.com/video", "title": "Test Video" });

    let response = app.oneshot(post_json(body.to_string())).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        notifier.events()[0],
        "deliver https://example.com/video | Test Video"
    );
    Ok(())
}

#[tokio::test]
async fn test_bare_options_is_preflight() -> anyhow::Result<()> {
    let (app, _) = app();

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/anything")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let methods = response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()?;
    assert!(methods.contains("POST"));
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "null"
    );
    Ok(())
}

#[tokio::test]
async fn test_unknown_middleware_error_is_500() {
    let err: axum::BoxError = "layer failed".into();

    let response = middleware_error(err).await.into_response();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
