use integration_tests::{TestServer, upstream::UpstreamMock};
use serde_json::json;

#[tokio::test]
async fn text_only_turn_sends_system_plus_user_with_small_budget() {
    let upstream = UpstreamMock::builder().with_reply("Hallo!").spawn().await;
    let server = TestServer::start(&upstream.config()).await;

    let response = server
        .client
        .post_json("/ai", &json!({ "message": "Hallo", "messages": [], "files": [] }))
        .await;

    assert_eq!(response.status(), 200);

    let forwarded = upstream.only_request().body;

    assert_eq!(forwarded["model"], "gpt-3.5-turbo");
    assert_eq!(forwarded["max_tokens"], 1000);
    assert_eq!(forwarded["temperature"], 0.7);

    let messages = forwarded["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(
        messages[0]["content"],
        "Du bist ein hilfsreicher AI-Assistent. Antworte höflich und informativ auf Deutsch."
    );
    assert_eq!(messages[1], json!({ "role": "user", "content": "Hallo" }));
}

#[tokio::test]
async fn upstream_success_is_passed_through_unmodified() {
    let upstream = UpstreamMock::builder().with_reply("Guten Tag!").spawn().await;
    let server = TestServer::start(&upstream.config()).await;

    let response = server.client.post_json("/ai", &json!({ "message": "Hallo" })).await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("access-control-allow-origin").unwrap(), "*");

    let body: serde_json::Value = response.json().await.unwrap();

    assert_eq!(body["id"], "chatcmpl-test");
    assert_eq!(body["object"], "chat.completion");
    assert_eq!(body["created"], 1700000000);
    assert_eq!(body["model"], "gpt-3.5-turbo");
    assert_eq!(body["choices"][0]["message"]["content"], "Guten Tag!");
    assert_eq!(body["choices"][0]["finish_reason"], "stop");
    assert_eq!(body["usage"]["total_tokens"], 20);
}

#[tokio::test]
async fn files_use_larger_budget_and_augmented_system_prompt() {
    let upstream = UpstreamMock::builder().spawn().await;
    let server = TestServer::start(&upstream.config()).await;

    let request = json!({
        "message": "Fasse die Datei zusammen.\n\n[DATEIINHALT]\nLorem ipsum",
        "messages": [],
        "files": [{ "name": "notes.txt", "size": 123 }],
    });

    let response = server.client.post_json("/ai", &request).await;
    assert_eq!(response.status(), 200);

    let forwarded = upstream.only_request().body;
    assert_eq!(forwarded["max_tokens"], 2000);

    let system = forwarded["messages"][0]["content"].as_str().unwrap();
    assert!(system.starts_with("Du bist ein hilfsreicher AI-Assistent."));
    assert!(system.contains("[DATEIINHALT]"));
    assert!(system.contains("Dateien hochgeladen"));
}

#[tokio::test]
async fn history_is_replayed_between_system_and_current_message() {
    let upstream = UpstreamMock::builder().spawn().await;
    let server = TestServer::start(&upstream.config()).await;

    let request = json!({
        "message": "C",
        "messages": [
            { "role": "user", "content": "A" },
            { "role": "assistant", "content": "B" },
        ],
    });

    let response = server.client.post_json("/ai", &request).await;
    assert_eq!(response.status(), 200);

    let forwarded = upstream.only_request().body;
    let messages = forwarded["messages"].as_array().unwrap();

    assert_eq!(messages.len(), 4);
    assert_eq!(messages[0]["role"], "system");
    assert_eq!(messages[1], json!({ "role": "user", "content": "A" }));
    assert_eq!(messages[2], json!({ "role": "assistant", "content": "B" }));
    assert_eq!(messages[3], json!({ "role": "user", "content": "C" }));
}

#[tokio::test]
async fn pre_appended_current_turn_is_not_sent_twice() {
    let upstream = UpstreamMock::builder().spawn().await;
    let server = TestServer::start(&upstream.config()).await;

    // Callers that append the current message to their local history
    // before sending must not cause a duplicated user turn upstream.
    let request = json!({
        "message": "C",
        "messages": [
            { "role": "user", "content": "A" },
            { "role": "assistant", "content": "B" },
            { "role": "user", "content": "C" },
        ],
    });

    let response = server.client.post_json("/ai", &request).await;
    assert_eq!(response.status(), 200);

    let forwarded = upstream.only_request().body;
    let messages = forwarded["messages"].as_array().unwrap();

    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1], json!({ "role": "user", "content": "A" }));
    assert_eq!(messages[2], json!({ "role": "assistant", "content": "B" }));
    assert_eq!(messages[3], json!({ "role": "user", "content": "C" }));
}

#[tokio::test]
async fn configured_credential_is_forwarded_as_bearer_token() {
    let upstream = UpstreamMock::builder().spawn().await;
    let server = TestServer::start(&upstream.config()).await;

    let response = server.client.post_json("/ai", &json!({ "message": "Hallo" })).await;
    assert_eq!(response.status(), 200);

    let received = upstream.only_request();
    assert_eq!(received.authorization.as_deref(), Some("Bearer sk-test"));
}

#[tokio::test]
async fn identical_requests_produce_identical_output() {
    let upstream = UpstreamMock::builder().with_reply("Gleich.").spawn().await;
    let server = TestServer::start(&upstream.config()).await;

    let request = json!({ "message": "Hallo", "messages": [] });

    let first = server.client.post_json("/ai", &request).await.text().await.unwrap();
    let second = server.client.post_json("/ai", &request).await.text().await.unwrap();

    assert_eq!(first, second);
    assert_eq!(upstream.received().len(), 2);
}
