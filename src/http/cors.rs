use axum::{
    http::{header, HeaderValue, Method},
    response::Response,
};
use reqwest::Url;
use tower_http::cors::{AllowOrigin, CorsLayer};

const EXTENSION_SCHEMES: [&str; 3] = ["chrome-extension", "moz-extension", "safari-web-extension"];
const LOOPBACK_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "[::1]"];

/// Origins allowed to read responses: browser extensions, plus plain-http
/// loopback pages for local testing.
pub fn is_allowed_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin) else {
        return false;
    };
    let host = url.host_str().unwrap_or_default();

    if EXTENSION_SCHEMES.contains(&url.scheme()) {
        return !host.is_empty();
    }

    url.scheme() == "http" && LOOPBACK_HOSTS.contains(&host)
}

/// Reflects allowed origins and answers every OPTIONS request as a preflight.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(|origin: &HeaderValue, _| {
            origin.to_str().map(is_allowed_origin).unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

/// Responses that did not earn an allowed origin say so explicitly.
pub async fn deny_by_default(mut response: Response) -> Response {
    response
        .headers_mut()
        .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(HeaderValue::from_static("null"));
    response
}
