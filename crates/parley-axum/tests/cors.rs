//! Integration tests for CORS handling.
//!
//! Verifies that preflight requests are answered by the CORS layer and
//! that the allow-list is enforced when configured.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use parley_axum::{AxumContext, CorsConfig, create_router};
use parley_core::{AdmissionConfig, SynthesisBackend, SynthesisError, SynthesizedAudio};
use tower::ServiceExt;

struct SilentSynth;

#[async_trait]
impl SynthesisBackend for SilentSynth {
    async fn synthesize(&self, _text: &str) -> Result<SynthesizedAudio, SynthesisError> {
        Ok(SynthesizedAudio::mpeg(Vec::new()))
    }

    fn name(&self) -> &str {
        "silent"
    }
}

fn router(cors: &CorsConfig) -> Router {
    let ctx = AxumContext::new(Arc::new(SilentSynth), AdmissionConfig::default(), None);
    create_router(ctx, cors)
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/tts")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn preflight_allowed_for_listed_origin() {
    let cors = CorsConfig::from_list(Some("http://localhost:3000"));
    let response = router(&cors)
        .oneshot(preflight("http://localhost:3000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
    let methods = response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS]
        .to_str()
        .unwrap();
    assert!(methods.contains("POST"), "got: {methods}");
}

#[tokio::test]
async fn preflight_from_unlisted_origin_gets_no_allow_header() {
    let cors = CorsConfig::AllowOrigins(vec!["http://localhost:3000".to_string()]);
    let response = router(&cors)
        .oneshot(preflight("https://evil.example"))
        .await
        .unwrap();

    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn allow_all_answers_with_wildcard() {
    let response = router(&CorsConfig::AllowAll)
        .oneshot(
            Request::get("/health")
                .header(header::ORIGIN, "https://anywhere.example")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
}
