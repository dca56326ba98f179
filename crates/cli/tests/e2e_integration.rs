//! End-to-end tests for the Aide completion pipeline.
//!
//! These run the real HTTP transport against a local mock server, with real
//! memory and log files, and check what reaches the wire and the disk.

use aide_agent::{Assistant, CompletionMode, Outcome, insert_at};
use aide_config::{AideConfig, LogConfig, MemoryConfig};
use aide_core::error::ChatError;
use aide_providers::build_from_config;
use std::path::Path;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config_for(server: &MockServer, dir: &Path) -> AideConfig {
    AideConfig {
        api_key: Some("sk-e2e".into()),
        base_url: format!("{}/v1", server.uri()),
        model: "gpt-4o-mini".into(),
        max_input_tokens: 15,
        memory: MemoryConfig {
            enabled: true,
            path: dir.join("memory.txt").to_string_lossy().into_owned(),
            notice_delay_ms: 0,
        },
        log: LogConfig {
            chat_log: dir.join("aide-log.txt").to_string_lossy().into_owned(),
        },
        ..AideConfig::default()
    }
}

fn completion_body(text: &str) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": text}}]
    })
}

// ── Full pipeline ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_tail_completion_is_budgeted_logged_and_inserted() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("memory.txt"), "Style: terse.\n").unwrap();

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("Authorization", "Bearer sk-e2e"))
        .and(body_partial_json(serde_json::json!({
            "model": "gpt-4o-mini",
            "max_tokens": 480,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(" The end.")))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let assistant = Assistant::new(build_from_config(&config).unwrap());

    let document = "It was a dark and stormy night. Suddenly";
    let mode = CompletionMode::at_end(document);
    let completion = assistant
        .complete(&config, "finish it", mode.context(document))
        .await;

    assert_eq!(completion.outcome, Outcome::Insert(" The end.".into()));
    assert!(completion.memory_warning.is_none());

    // What went over the wire: memory first, then instruction, then the
    // newest slice of the document that fits in 60 chars.
    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.starts_with("Style: terse.\nInstructions: finish it\n\nContext:\n\n"));
    assert!(prompt.ends_with("\n\nt. Suddenly"));
    assert!(prompt.chars().count() <= config.max_prompt_chars());
    assert!(!prompt.contains("It was a dark"));

    let log = std::fs::read_to_string(dir.path().join("aide-log.txt")).unwrap();
    assert_eq!(log.lines().filter(|l| l.starts_with("* ")).count(), 1);
    assert!(log.contains("gpt-4o-mini"));
    assert!(log.contains(prompt));
    assert!(log.contains(" The end."));

    let updated = insert_at(document, mode.insertion_point(document), completion.text().unwrap());
    assert_eq!(updated, "It was a dark and stormy night. Suddenly The end.");
}

#[tokio::test]
async fn e2e_region_completion_inserts_after_selection() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(" [fixed]")))
        .mount(&server)
        .await;

    let config = AideConfig {
        memory: MemoryConfig::default(),
        ..config_for(&server, dir.path())
    };
    let assistant = Assistant::new(build_from_config(&config).unwrap());

    let document = "keep teh typo here. rest";
    let mode = CompletionMode::Region { start: 5, end: 19 };
    let completion = assistant.complete(&config, "fix spelling", mode.context(document)).await;

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = requests[0].body_json().unwrap();
    assert!(body["messages"][0]["content"].as_str().unwrap().ends_with("teh typo here."));

    let updated = insert_at(document, mode.insertion_point(document), completion.text().unwrap());
    assert_eq!(updated, "keep teh typo here. [fixed] rest");
}

// ── Failure paths ────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_server_error_is_single_attempt_and_unlogged() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let assistant = Assistant::new(build_from_config(&config).unwrap());
    let completion = assistant.complete(&config, "go", "text").await;

    assert!(matches!(
        completion.outcome,
        Outcome::Failed(ChatError::Http { status_code: 500, .. })
    ));
    // Memory file was never created, so the warning is surfaced too.
    assert!(completion.memory_warning.is_some());
    assert!(!dir.path().join("aide-log.txt").exists());
}

#[tokio::test]
async fn e2e_unexpected_body_is_malformed() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let config = config_for(&server, dir.path());
    let assistant = Assistant::new(build_from_config(&config).unwrap());
    let completion = assistant.complete(&config, "go", "text").await;

    assert_eq!(completion.outcome, Outcome::Failed(ChatError::MalformedResponse));
    assert_eq!(completion.notice().unwrap(), "Aide: request failed: malformed response");
}

// ── Concurrency ──────────────────────────────────────────────────────────

#[tokio::test]
async fn e2e_overlapping_requests_do_not_cross() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Echo the last word of the prompt; "first" answers slowly.
    Mock::given(method("POST"))
        .respond_with(|req: &Request| {
            let body: serde_json::Value = req.body_json().unwrap();
            let prompt = body["messages"][0]["content"].as_str().unwrap_or_default();
            let word = prompt.split_whitespace().last().unwrap_or_default().to_string();
            let delay = if word == "first" { 300 } else { 0 };
            ResponseTemplate::new(200)
                .set_body_json(completion_body(&word))
                .set_delay(std::time::Duration::from_millis(delay))
        })
        .expect(2)
        .mount(&server)
        .await;

    let config = AideConfig {
        memory: MemoryConfig::default(),
        ..config_for(&server, dir.path())
    };
    let assistant = Assistant::new(build_from_config(&config).unwrap());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

    let tx_first = tx.clone();
    let first = assistant.spawn_complete(config.clone(), "echo".into(), "the first".into(), move |c| {
        tx_first.send(("first", c)).unwrap();
    });
    let second = assistant.spawn_complete(config.clone(), "echo".into(), "the second".into(), move |c| {
        tx.send(("second", c)).unwrap();
    });
    first.await.unwrap();
    second.await.unwrap();

    let mut seen = Vec::new();
    while let Some((label, completion)) = rx.recv().await {
        assert_eq!(completion.text(), Some(label));
        seen.push(label);
    }
    assert_eq!(seen, vec!["second", "first"]);

    let log = std::fs::read_to_string(dir.path().join("aide-log.txt")).unwrap();
    assert_eq!(log.lines().filter(|l| l.starts_with("* ")).count(), 2);
}
