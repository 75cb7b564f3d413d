//! Integration tests for the reqwest forwarder
//!
//! Tests cover:
//! - Byte-for-byte relay of status, headers and body
//! - Forwarding of method, query, headers and raw body
//! - Redirects relayed instead of followed
//! - Transport failures surfacing as upstream errors

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::net::TcpListener;
use std::time::Duration;

use application::error::ApplicationError;
use application::ports::{Forwarder, ProxyRequest};
use bytes::Bytes;
use http::{HeaderValue, Method, StatusCode, header};
use infrastructure::adapters::ReqwestForwarder;
use infrastructure::config::UpstreamConfig;
use url::Url;
use wiremock::matchers::{body_bytes, header as header_matcher, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn forwarder() -> ReqwestForwarder {
    ReqwestForwarder::new(&UpstreamConfig::default()).expect("Failed to build forwarder")
}

fn target(server: &MockServer, path_and_query: &str) -> Url {
    Url::parse(&format!("{}{path_and_query}", server.uri())).expect("Invalid URL")
}

// ============================================================================
// Relaying Upstream Responses
// ============================================================================

mod relay_tests {
    use super::*;

    #[tokio::test]
    async fn relays_status_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/base/extra"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("x-upstream", "yes")
                    .set_body_raw(r#"{"ok":true}"#, "application/json"),
            )
            .mount(&server)
            .await;

        let response = forwarder()
            .forward(
                &target(&server, "/base/extra"),
                ProxyRequest::new(Method::GET, Bytes::new()),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body, Bytes::from_static(br#"{"ok":true}"#));
        assert_eq!(response.headers["x-upstream"], "yes");
        assert_eq!(response.headers[header::CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn relays_error_statuses_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(418).set_body_string("teapot"))
            .mount(&server)
            .await;

        let response = forwarder()
            .forward(
                &target(&server, "/brew"),
                ProxyRequest::new(Method::GET, Bytes::new()),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::IM_A_TEAPOT);
        assert_eq!(response.body, Bytes::from_static(b"teapot"));
    }

    #[tokio::test]
    async fn redirects_are_relayed_not_followed() {
        let server = MockServer::start().await;
        Mock::given(path("/old"))
            .respond_with(ResponseTemplate::new(302).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(path("/new"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let response = forwarder()
            .forward(
                &target(&server, "/old"),
                ProxyRequest::new(Method::GET, Bytes::new()),
            )
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::FOUND);
        assert_eq!(response.headers[header::LOCATION], "/new");
    }
}

// ============================================================================
// Forwarding Inbound Requests
// ============================================================================

mod forward_tests {
    use super::*;

    #[tokio::test]
    async fn forwards_method_query_headers_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/items/7"))
            .and(query_param("x", "1"))
            .and(header_matcher("x-trace", "abc"))
            .and(body_bytes(b"raw \x00 bytes".to_vec()))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let mut request = ProxyRequest::new(Method::PUT, Bytes::from_static(b"raw \x00 bytes"));
        request
            .headers
            .insert("x-trace", HeaderValue::from_static("abc"));

        let response = forwarder()
            .forward(&target(&server, "/items/7?x=1"), request)
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn inbound_host_header_is_not_forwarded() {
        let server = MockServer::start().await;
        Mock::given(header_matcher("host", "proxy.local"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let mut request = ProxyRequest::new(Method::GET, Bytes::new());
        request
            .headers
            .insert(header::HOST, HeaderValue::from_static("proxy.local"));

        let response = forwarder()
            .forward(&target(&server, "/"), request)
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
    }
}

// ============================================================================
// Transport Failures
// ============================================================================

mod failure_tests {
    use super::*;

    #[tokio::test]
    async fn connection_refused_is_upstream_error() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
        let addr = listener.local_addr().expect("No local address");
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/gone")).expect("Invalid URL");

        let err = forwarder()
            .forward(&url, ProxyRequest::new(Method::GET, Bytes::new()))
            .await
            .unwrap_err();

        assert!(matches!(err, ApplicationError::Upstream(_)));
    }

    #[tokio::test]
    async fn slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let config = UpstreamConfig {
            request_timeout_secs: 1,
            ..UpstreamConfig::default()
        };
        let err = ReqwestForwarder::new(&config)
            .unwrap()
            .forward(
                &target(&server, "/slow"),
                ProxyRequest::new(Method::GET, Bytes::new()),
            )
            .await
            .unwrap_err();

        match err {
            ApplicationError::Upstream(message) => assert!(message.contains("timed out")),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
}
