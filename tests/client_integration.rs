//! Integration tests for the authenticated API client.
//!
//! Exercises the full request/decrypt flow against a wiremock server with
//! the client clock pinned, so response envelopes can be encrypted with the
//! exact timestamp the client signs into its headers.

use std::sync::Arc;

use rouman_source::client::{ApiClient, ApiError, Session};
use rouman_source::codec::derive_key;
use rouman_source::transport::HttpTransport;
use wiremock::matchers::{body_string, header, headers, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::{FIXED_TIME, api_response_body, fixed_clock, init_tracing};

fn pinned_client() -> ApiClient {
    init_tracing();
    let transport = Arc::new(HttpTransport::new().expect("transport builds"));
    ApiClient::with_clock(transport, fixed_clock)
}

#[tokio::test]
async fn test_get_decodes_envelope_and_signs_headers() {
    let server = MockServer::start().await;
    let expected_token = derive_key(&format!("{FIXED_TIME}rouman5APPContent2025"));

    Mock::given(method("GET"))
        .and(path("/api/home"))
        .and(header("token", expected_token.as_str()))
        // wiremock normalizes comma-joined header values into a value list,
        // so the single `tokenparam: <time>,2.1.0` header must be matched
        // with the multi-value form.
        .and(headers("tokenparam", vec![FIXED_TIME.to_string().as_str(), "2.1.0"]))
        .and(header("x-requested-with", "com.rouman5.app"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(api_response_body(r#"[{"title":"首页"}]"#)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = pinned_client();
    let decoded = client
        .get(&format!("{}/api/home", server.uri()), &Session::anonymous())
        .await
        .expect("decodes");
    assert_eq!(decoded, r#"[{"title":"首页"}]"#);
}

#[tokio::test]
async fn test_post_form_sets_content_type_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("username=alice&password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(api_response_body("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let client = pinned_client();
    let decoded = client
        .post_form(
            &format!("{}/api/login", server.uri()),
            "username=alice&password=secret",
            &Session::anonymous(),
        )
        .await
        .expect("decodes");
    assert_eq!(decoded, "{}");
}

#[tokio::test]
async fn test_401_login_required_while_logged_in_is_session_expired() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"errorMsg":"请先登录"}"#))
        .mount(&server)
        .await;

    let client = pinned_client();
    let err = client
        .get(&format!("{}/api/home", server.uri()), &Session::logged_in())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::SessionExpired), "got {err:?}");
}

#[tokio::test]
async fn test_401_login_required_while_anonymous_carries_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"errorMsg":"请先登录"}"#))
        .mount(&server)
        .await;

    let client = pinned_client();
    let err = client
        .get(&format!("{}/api/home", server.uri()), &Session::anonymous())
        .await
        .expect_err("must fail");
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "请先登录");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_non_200_surfaces_status_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream sad"))
        .mount(&server)
        .await;

    let client = pinned_client();
    let err = client
        .get(&format!("{}/api/home", server.uri()), &Session::anonymous())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::Status { status: 503, .. }), "got {err:?}");
}

#[tokio::test]
async fn test_missing_data_field_is_malformed_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"message":"ok"}"#))
        .mount(&server)
        .await;

    let client = pinned_client();
    let err = client
        .get(&format!("{}/api/home", server.uri()), &Session::anonymous())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::MalformedResponse { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_undecryptable_data_field_is_codec_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(r#"{"data":"not valid base64 !!"}"#),
        )
        .mount(&server)
        .await;

    let client = pinned_client();
    let err = client
        .get(&format!("{}/api/home", server.uri()), &Session::anonymous())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::Codec(_)), "got {err:?}");
}

#[tokio::test]
async fn test_transport_failure_surfaces_transport_error() {
    // Unroutable port: nothing listens here.
    let client = pinned_client();
    let err = client
        .get("http://127.0.0.1:1/api/home", &Session::anonymous())
        .await
        .expect_err("must fail");
    assert!(matches!(err, ApiError::Transport { .. }), "got {err:?}");
}
