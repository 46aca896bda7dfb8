//! HTTP contract tests for ApiClient against a mock backend.

use std::sync::Arc;

use docunova_chat::auth::TOKEN_KEY;
use docunova_chat::{
    ApiClient, ApiError, Backend, ExportFormat, QueryRequest, StoredTokenProvider,
};
use docunova_config::schema::ApiConfig;
use docunova_platform::{KeyValueStore, MemoryStore};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_json, header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> (ApiClient, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    store.set(TOKEN_KEY, "test-token").unwrap();
    let tokens = Arc::new(StoredTokenProvider::new(store.clone()));
    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    (ApiClient::new(&config, tokens).unwrap(), store)
}

fn request(question: &str, conversation_id: Option<&str>) -> QueryRequest {
    QueryRequest {
        question: question.into(),
        document_ids: vec!["doc-1".into()],
        conversation_id: conversation_id.map(String::from),
    }
}

#[tokio::test]
async fn stream_body_arrives_as_text_with_bearer_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query/stream"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_json(serde_json::json!({
            "question": "What is the refund policy?",
            "document_ids": ["doc-1"],
            "conversation_id": "c-1",
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain; charset=utf-8")
                .set_body_string("The refund policy is 30 days. Prices in €."),
        )
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let stream = client
        .open_stream(
            &request("What is the refund policy?", Some("c-1")),
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(
        stream.collect_text().await.unwrap(),
        "The refund policy is 30 days. Prices in €."
    );
}

#[tokio::test]
async fn stream_error_status_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query/stream"))
        .respond_with(ResponseTemplate::new(500).set_body_string("this is not an answer"))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let err = client
        .open_stream(&request("q", None), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::StreamTransportFailed(ref m) if m.contains("500")));
}

#[tokio::test]
async fn unauthorized_clears_cached_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/documents"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (client, store) = client_for(&server);
    let err = client.list_documents().await.unwrap_err();

    assert!(matches!(err, ApiError::AuthExpired));
    assert_eq!(store.get(TOKEN_KEY), None);
}

#[tokio::test]
async fn status_codes_map_to_error_variants() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats/usage"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    assert!(matches!(client.stats().await, Err(ApiError::RateLimited)));
    assert!(matches!(
        client.conversation("missing").await,
        Err(ApiError::NotFound(_))
    ));
    match client.usage().await {
        Err(ApiError::Http { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn create_conversation_sends_title() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/conversations"))
        .and(body_json(serde_json::json!({ "title": "What is the refund policy?..." })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "c-42",
            "title": "What is the refund policy?...",
            "created_at": "2024-05-01T10:00:00",
            "updated_at": "2024-05-01T10:00:00",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let conversation = client
        .create_conversation(Some("What is the refund policy?..."))
        .await
        .unwrap();
    assert_eq!(conversation.id, "c-42");
}

#[tokio::test]
async fn create_conversation_failure_is_reported_as_such() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/conversations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let err = client.create_conversation(Some("t")).await.unwrap_err();
    assert!(matches!(err, ApiError::ConversationCreateFailed(_)));
}

#[tokio::test]
async fn list_conversations_sends_search_only_when_present() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations"))
        .and(query_param("q", "refund"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "c-1", "title": "Refunds", "created_at": "", "updated_at": "" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations"))
        .and(query_param_is_missing("q"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "c-1", "title": "Refunds", "created_at": "", "updated_at": "" },
            { "id": "c-2", "title": null, "created_at": "", "updated_at": "" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    assert_eq!(client.list_conversations("refund").await.unwrap().len(), 1);

    let all = client.list_conversations("").await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[1].title, None);
}

#[tokio::test]
async fn conversation_detail_carries_sources() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "c-1",
            "title": "Refunds...",
            "created_at": "2024-05-01T10:00:00",
            "updated_at": "2024-05-01T10:01:00",
            "messages": [
                { "role": "user", "content": "What is the refund policy?" },
                {
                    "role": "assistant",
                    "content": "30 days.",
                    "sources": [{
                        "document_id": "doc-1",
                        "filename": "policy.pdf",
                        "page": 3,
                        "chunk_text": "Refunds within 30 days",
                        "relevance_score": 0.92
                    }],
                    "timestamp": "2024-05-01T10:01:00"
                }
            ]
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let detail = client.conversation("c-1").await.unwrap();
    assert_eq!(detail.conversation.id, "c-1");
    assert_eq!(detail.messages.len(), 2);
    assert_eq!(detail.messages[1].sources()[0].page, Some(3));
}

#[tokio::test]
async fn export_share_and_shared_view() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/c-1/export"))
        .and(query_param("format", "txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("USER: hi\nASSISTANT: hello\n"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/conversations/c-1/share"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "share_token": "tok-9" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/conversations/shared/tok-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "c-1",
            "title": "Shared",
            "messages": [{ "role": "user", "content": "hi" }]
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let exported = client
        .export_conversation("c-1", ExportFormat::Text)
        .await
        .unwrap();
    assert!(exported.starts_with("USER: hi"));

    let link = client.share_conversation("c-1").await.unwrap();
    assert_eq!(link.url("http://localhost:5173/"), "http://localhost:5173/shared/tok-9");

    let shared = client.shared_conversation(&link.share_token).await.unwrap();
    assert_eq!(shared.messages.len(), 1);
}

#[tokio::test]
async fn delete_calls_accept_no_content() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/conversations/c-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/documents/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    client.delete_conversation("c-1").await.unwrap();
    client.delete_document("doc-1").await.unwrap();
}

#[tokio::test]
async fn documents_stats_and_usage_parse() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "id": "doc-1", "filename": "policy.pdf", "status": "completed",
              "chunk_count": 12, "file_size": 20480, "upload_date": "2024-05-01" },
            { "id": "doc-2", "filename": "draft.docx", "status": "processing",
              "chunk_count": null, "file_size": 1024 }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "documents": 2, "conversations": 5, "messages": 40
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/stats/usage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "daily_remaining": 90, "daily_limit": 100, "daily_used": 10,
            "daily_percentage": 10.0, "monthly_remaining": 900, "monthly_limit": 1000,
            "monthly_used": 100, "monthly_percentage": 10.0, "total_used": 100,
            "total_requests": 12, "resets_in": "5h 12m"
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let docs = client.list_documents().await.unwrap();
    assert_eq!(docs.len(), 2);
    assert!(docs[0].status.is_completed());
    assert!(!docs[1].status.is_completed());

    let stats = client.stats().await.unwrap();
    assert_eq!(stats.conversations, 5);

    let usage = client.usage().await.unwrap();
    assert_eq!(usage.daily_limit, 100);
    assert_eq!(usage.resets_in, "5h 12m");
}

#[tokio::test]
async fn upload_posts_multipart_file() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/documents/upload"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "doc-7", "filename": "notes.txt", "status": "pending"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "meeting notes").unwrap();

    let (client, _) = client_for(&server);
    let receipt = client.upload_document(&file).await.unwrap();
    assert_eq!(receipt.id, "doc-7");

    let received = server.received_requests().await.unwrap();
    let content_type = received[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data"));
    let body = String::from_utf8_lossy(&received[0].body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("meeting notes"));
}

#[tokio::test]
async fn non_streaming_query_returns_answer_and_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "answer": "30 days.",
            "sources": [{ "document_id": "doc-1", "filename": "policy.pdf" }],
            "conversation_id": "c-1"
        })))
        .mount(&server)
        .await;

    let (client, _) = client_for(&server);
    let answer = client.query(&request("refunds?", Some("c-1"))).await.unwrap();
    assert_eq!(answer.answer, "30 days.");
    assert_eq!(answer.sources[0].filename, "policy.pdf");
    assert_eq!(answer.sources[0].page, None);
}
