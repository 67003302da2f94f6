use indoc::indoc;
use integration_tests::TestServer;
use reqwest::Method;

const MINIMAL_CONFIG: &str = indoc! {r#"
    [relay]
    api_key = "sk-test"
"#};

#[tokio::test]
async fn options_preflight_returns_204_with_cors_headers() {
    let server = TestServer::start(MINIMAL_CONFIG).await;

    let response = server.client.request(Method::OPTIONS, "/ai").await;

    assert_eq!(response.status(), 204);

    let headers = response.headers();
    assert_eq!(headers.get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(headers.get("access-control-allow-methods").unwrap(), "GET, POST, OPTIONS");
    assert_eq!(headers.get("access-control-allow-headers").unwrap(), "Content-Type");

    let body = response.text().await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn error_responses_also_carry_allow_origin() {
    let server = TestServer::start(MINIMAL_CONFIG).await;

    let response = server.client.post_raw("/ai", "").await;

    assert_eq!(response.status(), 400);
    assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn health_endpoint_reports_healthy() {
    let server = TestServer::start(MINIMAL_CONFIG).await;

    let response = server.client.get("/health").await;
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    insta::assert_json_snapshot!(body, @r#"
    {
      "status": "healthy"
    }
    "#);
}
