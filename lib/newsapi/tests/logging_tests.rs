//! Logging middleware over the hyper transport.

use std::sync::Arc;

use newsapi::middleware::{
    AuthenticationMiddleware, BodyLoggingPolicy, LogSink, LoggingMiddleware, LoggingPolicy,
    WriterSink,
};
use newsapi::{Body, BodyLength, Method, NewsClient, Request, header::CONTENT_TYPE};
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_string, method, path},
};

type MemorySink = Arc<WriterSink<Vec<u8>>>;

fn memory_sink() -> MemorySink {
    Arc::new(WriterSink::new(Vec::new()))
}

fn output(sink: &MemorySink) -> String {
    sink.with_writer(|buffer| String::from_utf8(buffer.clone()).expect("utf8 output"))
}

fn client(mock_server: &MockServer, logging: LoggingMiddleware) -> NewsClient {
    NewsClient::builder()
        .server_url(Url::parse(&format!("{}/api/v1", mock_server.uri())).expect("url"))
        .middleware(AuthenticationMiddleware::new("k1"))
        .middleware(logging)
        .build()
        .expect("client")
}

#[tokio::test]
async fn test_large_response_is_summarized_and_read_in_full() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/archive"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'n'; 3000]))
        .mount(&mock_server)
        .await;

    let sink = memory_sink();
    let logging = LoggingMiddleware::new().with_shared_sink(Arc::clone(&sink) as Arc<dyn LogSink>);
    let client = client(&mock_server, logging);

    let request = Request::builder(Method::GET, "/archive").build();
    let (response, body) = client.send(request, None, "archive").await.expect("exchange");

    assert_eq!(response.status(), 200);
    let body = body.expect("response body");
    assert_eq!(body.length(), BodyLength::Known(3000));
    let bytes = body.into_bytes().await.expect("read body");
    assert_eq!(bytes.len(), 3000);

    let logged = output(&sink);
    assert!(logged.contains("Request: GET http /archive\n"), "{logged}");
    assert!(logged.contains("x-rapidapi-key=k1\n"), "{logged}");
    assert!(logged.contains("Response: 200 GET http /archive\n"), "{logged}");
    assert!(logged.ends_with("Body:\n<3000 bytes>\n"), "{logged}");
}

#[tokio::test]
async fn test_captured_request_body_still_reaches_the_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/article/getArticles"))
        .and(body_string(r#"{"keyword":"Newton"}"#))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"ok":true}"#))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sink = memory_sink();
    let logging = LoggingMiddleware::new()
        .with_logging_policy(LoggingPolicy::BODY)
        .with_shared_sink(Arc::clone(&sink) as Arc<dyn LogSink>);
    let client = client(&mock_server, logging);

    let request = Request::builder(Method::POST, "/article/getArticles")
        .header(CONTENT_TYPE, "application/json")
        .build();
    let (response, body) = client
        .send(request, Some(Body::from(r#"{"keyword":"Newton"}"#)), "getArticles")
        .await
        .expect("exchange");

    assert_eq!(response.status(), 200);
    let bytes = body.expect("response body").into_bytes().await.expect("read body");
    assert_eq!(bytes, r#"{"ok":true}"#);

    insta::assert_snapshot!(output(&sink), @r#"
    Request: POST http /article/getArticles
    Body:
    {"keyword":"Newton"}
    Response: 200 POST http /article/getArticles
    Body:
    {"ok":true}
    "#);
}

#[tokio::test]
async fn test_redacted_bodies_are_forwarded_untouched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login"))
        .and(body_string("password=hunter2"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let sink = memory_sink();
    let logging = LoggingMiddleware::new()
        .with_body_policy(BodyLoggingPolicy::Never)
        .with_shared_sink(Arc::clone(&sink) as Arc<dyn LogSink>);
    let client = client(&mock_server, logging);

    let request = Request::builder(Method::POST, "/login").build();
    let (response, body) = client
        .send(request, Some(Body::from("password=hunter2")), "login")
        .await
        .expect("exchange");

    assert_eq!(response.status(), 204);
    assert!(body.is_none());

    let logged = output(&sink);
    assert!(!logged.contains("hunter2"), "{logged}");
    assert!(logged.contains("Body:\n<redacted>\n"), "{logged}");
}

#[tokio::test]
async fn test_transport_failure_is_logged() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    let address = listener.local_addr().expect("address");
    drop(listener);

    let sink = memory_sink();
    let logging = LoggingMiddleware::new()
        .with_logging_policy(LoggingPolicy::BRIEF)
        .with_shared_sink(Arc::clone(&sink) as Arc<dyn LogSink>);
    let client = NewsClient::builder()
        .server_url(Url::parse(&format!("http://{address}/api/v1")).expect("url"))
        .middleware(logging)
        .build()
        .expect("client");

    let request = Request::builder(Method::GET, "/article/getArticles").build();
    let error = client
        .send(request, None, "getArticles")
        .await
        .expect_err("nothing listening");

    assert!(error.is_connection(), "unexpected error: {error}");
    let logged = output(&sink);
    assert!(
        logged.starts_with("Request: GET http /article/getArticles\nRequest GET /article/getArticles error: connection error:"),
        "{logged}"
    );
}
