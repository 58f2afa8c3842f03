//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Integration tests for the ingest HTTP surface.
// Requests go through the full router with a real JWT verifier and a mocked queue publisher.
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use futures::future::join_all;
use jsonwebtoken::{EncodingKey, Header, encode, get_current_timestamp};
use mockall::mock;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::Arc;

use telemetry_ingest::{
    Api, AppState, IngestServices, JwtConfig, JwtTokenVerifier, PayloadParser, PublishError,
    PublishRequest, QueuePublisher,
    api::{BAD_REQUEST_MESSAGE, SERVER_ERROR_MESSAGE, TOKEN_PARSE_MESSAGE, TOKEN_VERIFY_MESSAGE},
};

mock! {
    pub Publisher {}

    #[async_trait]
    impl QueuePublisher for Publisher {
        async fn publish(&self, request: PublishRequest) -> Result<(), PublishError>;
    }
}

const SECRET: &str = "integration-secret";
const INGEST_PATH: &str = "/data";
const BODY: &str = r#"{"data":{"temp":21}}"#;

/// Sets up a router around the given publisher with the default body limit.
fn setup_test_router(publisher: MockPublisher) -> Router {
    setup_test_router_with_limit(publisher, 1024 * 1024)
}

fn setup_test_router_with_limit(publisher: MockPublisher, max_body_bytes: usize) -> Router {
    let services = IngestServices {
        token_verifier: Arc::new(JwtTokenVerifier::new(&JwtConfig::hmac(SECRET)).unwrap()),
        payload_parser: PayloadParser::default(),
        queue_publisher: Arc::new(publisher),
        data_topic: "iot-data".to_string(),
        device_id_claim: "deviceId".to_string(),
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], 0));
    Api::new(addr, INGEST_PATH, AppState::new(services, max_body_bytes)).routes()
}

fn never_publishes() -> MockPublisher {
    let mut publisher = MockPublisher::new();
    publisher.expect_publish().times(0);
    publisher
}

fn token_for(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

fn device_token(device_id: &str) -> String {
    token_for(
        json!({ "deviceId": device_id, "exp": get_current_timestamp() + 3600 }),
        SECRET,
    )
}

fn post(token: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::post(INGEST_PATH).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(body.into()).unwrap()
}

/// Helper to read a response body as text
async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    tower::ServiceExt::oneshot(app.clone(), request).await.unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_test_router(never_publishes());

    let response = send(&app, Request::get("/health").body(Body::empty()).unwrap()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_publishes_reading_and_answers_empty_ok() {
    let mut publisher = MockPublisher::new();
    publisher
        .expect_publish()
        .withf(|req| req.topic == "iot-data" && req.key == "dev-1" && req.value == r#"{"temp":21}"#)
        .times(1)
        .returning(|_| Ok(()));
    let app = setup_test_router(publisher);

    let response = send(&app, post(Some(&device_token("dev-1")), BODY)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "");
}

#[tokio::test]
async fn test_rejects_other_methods_without_reading_body() {
    let app = setup_test_router(never_publishes());

    for method in ["GET", "PUT", "DELETE", "PATCH"] {
        let request = Request::builder()
            .method(method)
            .uri(INGEST_PATH)
            .header(header::AUTHORIZATION, format!("Bearer {}", device_token("dev-1")))
            .body(Body::from(BODY))
            .unwrap();

        let response = send(&app, request).await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(response.headers()[header::ALLOW], "POST");
        assert_eq!(response.headers()[header::CONNECTION], "close");
        assert_eq!(body_text(response).await, "");
    }
}

#[tokio::test]
async fn test_unparsable_token_is_unauthorized() {
    let app = setup_test_router(never_publishes());

    let token = device_token("dev-1");
    let segments: Vec<&str> = token.split('.').collect();
    let with_claims = |claims: &str| format!("{}.{}.{}", segments[0], claims, segments[2]);
    let with_signature = |signature: &str| format!("{}.{}.{}", segments[0], segments[1], signature);

    for token in [
        "not-a-token".to_string(),
        with_claims("!!!not-base64!!!"),
        // base64url for "not-json"
        with_claims("bm90LWpzb24"),
        with_signature("!!!not-base64!!!"),
    ] {
        let response = send(&app, post(Some(&token), BODY)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{token}");
        assert_eq!(body_text(response).await, TOKEN_PARSE_MESSAGE, "{token}");
    }
}

#[tokio::test]
async fn test_missing_authorization_is_a_parse_failure() {
    let app = setup_test_router(never_publishes());

    let response = send(&app, post(None, BODY)).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_text(response).await, TOKEN_PARSE_MESSAGE);
}

#[tokio::test]
async fn test_unverifiable_tokens_are_unauthorized() {
    let app = setup_test_router(never_publishes());
    let exp = get_current_timestamp() + 3600;

    let wrong_key = token_for(json!({ "deviceId": "dev-1", "exp": exp }), "another-secret");
    let expired = token_for(
        json!({ "deviceId": "dev-1", "exp": get_current_timestamp() - 3600 }),
        SECRET,
    );
    let not_yet_valid = token_for(
        json!({ "deviceId": "dev-1", "exp": exp + 3600, "nbf": exp }),
        SECRET,
    );

    for token in [wrong_key, expired, not_yet_valid] {
        let response = send(&app, post(Some(&token), BODY)).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_text(response).await, TOKEN_VERIFY_MESSAGE);
    }
}

#[tokio::test]
async fn test_token_without_device_identity_is_bad_request() {
    let app = setup_test_router(never_publishes());
    let exp = get_current_timestamp() + 3600;

    for claims in [
        json!({ "exp": exp }),
        json!({ "deviceId": "", "exp": exp }),
        json!({ "deviceId": 42, "exp": exp }),
    ] {
        let response = send(&app, post(Some(&token_for(claims, SECRET)), BODY)).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_text(response).await, BAD_REQUEST_MESSAGE);
    }
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = setup_test_router(never_publishes());

    let response = send(&app, post(Some(&device_token("dev-1")), r#"{"data":"#)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, BAD_REQUEST_MESSAGE);
}

#[tokio::test]
async fn test_body_without_data_field_is_bad_request() {
    let app = setup_test_router(never_publishes());

    let response = send(&app, post(Some(&device_token("dev-1")), r#"{"temp":21}"#)).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, BAD_REQUEST_MESSAGE);
}

#[tokio::test]
async fn test_publish_failure_is_internal_error_without_retry() {
    let mut publisher = MockPublisher::new();
    publisher
        .expect_publish()
        .times(1)
        .returning(|_| Err(PublishError::Rejected("broker unreachable".to_string())));
    let app = setup_test_router(publisher);

    let response = send(&app, post(Some(&device_token("dev-1")), BODY)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, SERVER_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_body_read_failure_is_internal_error() {
    let app = setup_test_router(never_publishes());
    let chunks: Vec<Result<Bytes, std::io::Error>> = vec![
        Ok(Bytes::from_static(b"{\"data\":")),
        Err(std::io::Error::other("connection reset")),
    ];
    let body = Body::from_stream(futures::stream::iter(chunks));

    let response = send(&app, post(Some(&device_token("dev-1")), body)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, SERVER_ERROR_MESSAGE);
}

#[tokio::test]
async fn test_oversized_body_is_internal_error() {
    let app = setup_test_router_with_limit(never_publishes(), 8);

    let response = send(&app, post(Some(&device_token("dev-1")), BODY)).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_each_get_their_own_outcome() {
    const REQUESTS: usize = 32;

    // Odd-numbered devices are refused by the broker
    let mut publisher = MockPublisher::new();
    publisher
        .expect_publish()
        .times(REQUESTS)
        .returning(|req| {
            let n: usize = req.key.trim_start_matches("dev-").parse().unwrap();
            if n % 2 == 0 {
                Ok(())
            } else {
                Err(PublishError::Rejected(format!("refused {}", req.key)))
            }
        });
    let app = setup_test_router(publisher);

    let responses = join_all((0..REQUESTS).map(|n| {
        let app = app.clone();
        async move {
            let token = device_token(&format!("dev-{n}"));
            let body = json!({ "data": { "seq": n } }).to_string();
            (n, send(&app, post(Some(&token), body)).await)
        }
    }))
    .await;

    for (n, response) in responses {
        let expected = if n % 2 == 0 {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        assert_eq!(response.status(), expected, "request {n}");
    }
}
