mod common;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use common::mocks::{
    test_config_toml, test_state, test_state_from_file, MockEmbedder, MockLLMClient,
};
use pyq::api::create_app;
use serde_json::json;

fn test_server(embedder: MockEmbedder, llm: MockLLMClient) -> TestServer {
    let app = create_app(test_state(3, embedder, llm));
    TestServer::new(app).expect("Failed to create test server")
}

fn file_form(name: &str, content: &[u8]) -> MultipartForm {
    MultipartForm::new().add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(name)
            .mime_type("application/octet-stream"),
    )
}

// ============= Health =============

#[tokio::test]
async fn test_health_check() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    let response = server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    let response = server.get("/api-docs/openapi.json").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert!(body["paths"]["/upload"].is_object());
    assert!(body["paths"]["/ask"].is_object());
    assert!(body["paths"]["/index"].is_object());
}

// ============= Upload =============

#[tokio::test]
async fn test_upload_text_file() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    let response = server
        .post("/upload")
        .multipart(file_form("notes.txt", b"one two three four five six seven"))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "status": "success",
        "num_chunks": 3,
        "file": { "name": "notes.txt", "chunks": 3 }
    }));
}

#[tokio::test]
async fn test_upload_unsupported_format() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    let response = server
        .post("/upload")
        .multipart(file_form("image.xyz", b"bytes"))
        .await;

    response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    response.assert_json(&json!({ "error": "Unsupported file format: xyz" }));

    let stats: serde_json::Value = server.get("/index").await.json();
    assert_eq!(stats["chunks"], 0);
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    let form = MultipartForm::new().add_text("comment", "no file here");
    let response = server.post("/upload").multipart(form).await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_partial_failure_reports_progress() {
    let server = test_server(MockEmbedder::failing_on_call(2), MockLLMClient::new("unused"));

    let response = server
        .post("/upload")
        .multipart(file_form("notes.txt", b"a b c d e f g h i"))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["chunks_indexed"], 1);
    assert_eq!(body["chunks_total"], 3);
    assert!(!body["error"].as_str().unwrap().contains("quota"));

    let stats: serde_json::Value = server.get("/index").await.json();
    assert_eq!(stats["chunks"], 1);
}

#[tokio::test]
async fn test_upload_that_is_not_multipart() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    let response = server.post("/upload").json(&json!({ "file": "notes.txt" })).await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert!(body["error"].as_str().unwrap().starts_with("Invalid upload"));
}

// ============= Ask =============

#[tokio::test]
async fn test_ask_requires_question() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    for body in [json!({}), json!({ "question": "" }), json!({ "question": "  " })] {
        let response = server.post("/ask").json(&body).await;
        response.assert_status_bad_request();
        response.assert_json(&json!({ "error": "Question is required" }));
    }
}

#[tokio::test]
async fn test_ask_rejects_bad_k() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    let response = server
        .post("/ask")
        .json(&json!({ "question": "What?", "k": 0 }))
        .await;

    response.assert_status_bad_request();
}

#[tokio::test]
async fn test_ask_rejects_mistyped_k() {
    let llm = MockLLMClient::new("unused");
    let server = test_server(MockEmbedder::new(), llm.clone());

    for body in [
        json!({ "question": "What?", "k": "four" }),
        json!({ "question": "What?", "k": -1 }),
    ] {
        let response = server.post("/ask").json(&body).await;
        response.assert_status_bad_request();
        let error: serde_json::Value = response.json();
        assert!(error["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }
    assert!(llm.prompts().is_empty());
}

#[tokio::test]
async fn test_ask_rejects_body_that_is_not_json() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    let response = server
        .post("/ask")
        .bytes(axum::body::Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;
    response.assert_status_bad_request();
    assert!(response.json::<serde_json::Value>()["error"].is_string());

    let response = server.post("/ask").text("What is paging?").await;
    response.assert_status_bad_request();
    assert!(response.json::<serde_json::Value>()["error"].is_string());
}

#[tokio::test]
async fn test_ask_on_empty_index_answers_without_context() {
    let llm = MockLLMClient::new("Paging maps pages to frames.");
    let server = test_server(MockEmbedder::new(), llm.clone());

    let response = server
        .post("/ask")
        .json(&json!({ "question": "What is paging?" }))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({ "answer": "Paging maps pages to frames." }));
    assert_eq!(
        llm.prompts(),
        vec!["Answer the following question:\n\nQuestion: What is paging?".to_string()]
    );
}

#[tokio::test]
async fn test_upload_then_ask_uses_context() {
    let llm = MockLLMClient::echo();
    let server = test_server(MockEmbedder::new(), llm.clone());

    server
        .post("/upload")
        .multipart(file_form("os.txt", b"paging uses frames"))
        .await
        .assert_status_ok();

    let response = server
        .post("/ask")
        .json(&json!({ "question": "What is paging?", "k": 1 }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let answer = body["answer"].as_str().unwrap();
    assert!(answer.contains("paging uses frames"));
    assert!(answer.ends_with("Question: What is paging?"));
}

#[tokio::test]
async fn test_ask_generation_failure_is_generic() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::failing());

    let response = server
        .post("/ask")
        .json(&json!({ "question": "What is paging?" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Internal server error occurred" }));
}

#[tokio::test]
async fn test_ask_embedding_failure_is_generic() {
    let server = test_server(MockEmbedder::failing_on_call(1), MockLLMClient::new("unused"));

    let response = server
        .post("/ask")
        .json(&json!({ "question": "What is paging?" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Internal server error occurred" }));
}

// ============= Index =============

#[tokio::test]
async fn test_index_stats_and_clear() {
    let server = test_server(MockEmbedder::new(), MockLLMClient::new("unused"));

    for (name, content) in [("a.txt", "one two three four"), ("b.txt", "five six")] {
        server
            .post("/upload")
            .multipart(file_form(name, content.as_bytes()))
            .await
            .assert_status_ok();
    }

    let response = server.get("/index").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "chunks": 3, "dimensions": 16, "sources": 2 }));

    let response = server.delete("/index").await;
    response.assert_status_ok();
    response.assert_json(&json!({ "chunks_removed": 3 }));

    let stats: serde_json::Value = server.get("/index").await.json();
    assert_eq!(stats["chunks"], 0);
    assert_eq!(stats["sources"], 0);
}

// ============= Config =============

#[tokio::test]
async fn test_config_reload_applies_retrieval_settings() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), test_config_toml(3)).unwrap();
    let app = create_app(test_state_from_file(
        file.path(),
        MockEmbedder::new(),
        MockLLMClient::new("unused"),
    ));
    let server = TestServer::new(app).unwrap();
    let text = b"one two three four five six seven";

    let response = server.post("/upload").multipart(file_form("a.txt", text)).await;
    assert_eq!(response.json::<serde_json::Value>()["num_chunks"], 3);

    let updated = test_config_toml(3)
        .replace("chunk_size = 3", "chunk_size = 7")
        .replace("top_k = 4", "top_k = 2");
    std::fs::write(file.path(), updated).unwrap();

    let response = server.post("/config/reload").await;
    response.assert_status_ok();
    response.assert_json(&json!({
        "chunk_size": 7,
        "top_k": 2,
        "max_top_k": 10,
        "restart_required": []
    }));

    let response = server.post("/upload").multipart(file_form("b.txt", text)).await;
    assert_eq!(response.json::<serde_json::Value>()["num_chunks"], 1);
}

#[tokio::test]
async fn test_config_reload_failure_keeps_previous_settings() {
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), test_config_toml(3)).unwrap();
    let app = create_app(test_state_from_file(
        file.path(),
        MockEmbedder::new(),
        MockLLMClient::new("unused"),
    ));
    let server = TestServer::new(app).unwrap();

    std::fs::write(file.path(), "[rag\nchunk_size = ").unwrap();

    let response = server.post("/config/reload").await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({ "error": "Internal server error occurred" }));

    let response = server
        .post("/upload")
        .multipart(file_form("a.txt", b"one two three four five six seven"))
        .await;
    assert_eq!(response.json::<serde_json::Value>()["num_chunks"], 3);
}
