use crate::core::config::SecurityConfig;
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Which optional security headers to emit
#[derive(Clone, Debug, Default)]
pub struct SecurityHeadersConfig {
    /// HSTS max-age in seconds; `None` leaves the header off
    pub hsts_max_age: Option<u64>,
}

impl From<&SecurityConfig> for SecurityHeadersConfig {
    fn from(config: &SecurityConfig) -> Self {
        Self {
            hsts_max_age: config.enable_hsts.then_some(config.hsts_max_age),
        }
    }
}

/// Security headers middleware
///
/// Every response is JSON, so nothing may be sniffed, framed or loaded from
/// it. HSTS is only sent when the deployment terminates TLS in front of us
/// and asked for it.
pub async fn security_headers_middleware(
    State(config): State<SecurityHeadersConfig>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(header::REFERRER_POLICY, HeaderValue::from_static("no-referrer"));
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static("default-src 'none'; frame-ancestors 'none'"),
    );

    if let Some(max_age) = config.hsts_max_age {
        if let Ok(value) = HeaderValue::from_str(&format!("max-age={}; includeSubDomains", max_age)) {
            headers.insert(header::STRICT_TRANSPORT_SECURITY, value);
        }
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::util::ServiceExt;

    async fn call(config: SecurityHeadersConfig) -> Response {
        let app = Router::new()
            .route("/menu", get(|| async { "[]" }))
            .layer(middleware::from_fn_with_state(config, security_headers_middleware));

        app.oneshot(Request::builder().uri("/menu").body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_baseline_headers() {
        let response = call(SecurityHeadersConfig::default()).await;

        assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(response.headers()[header::X_FRAME_OPTIONS], "DENY");
        assert!(response.headers().contains_key(header::CONTENT_SECURITY_POLICY));
        assert!(!response.headers().contains_key(header::STRICT_TRANSPORT_SECURITY));
    }

    #[tokio::test]
    async fn test_hsts_when_enabled() {
        let response = call(SecurityHeadersConfig {
            hsts_max_age: Some(600),
        })
        .await;

        assert_eq!(
            response.headers()[header::STRICT_TRANSPORT_SECURITY],
            "max-age=600; includeSubDomains"
        );
    }
}
