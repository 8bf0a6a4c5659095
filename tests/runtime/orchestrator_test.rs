//! Tests for `src/runtime/orchestrator.rs`, the heartbeat loop against a
//! scripted mock model client.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::{json, Map, Value};

use crisisbench::config::RunConfig;
use crisisbench::generator::{generate_package, GeneratorParams};
use crisisbench::providers::{
    ChatCompletion, ChatChoice, ChatMessage, ChatResponseMessage, ModelClient, ProviderError,
    WireFunctionCall, WireTool, WireToolCall,
};
use crisisbench::runtime::orchestrator::Orchestrator;
use crisisbench::runtime::run_benchmark;
use crisisbench::runtime::transcript::{MemoryOpKind, ToolStatus};
use crisisbench::runtime::RuntimeError;
use crisisbench::scenario::package::write_package;
use crisisbench::scenario::types::{CrisisType, NoiseTier, ScenarioPackage};

// ---------------------------------------------------------------------------
// Mock model client
// ---------------------------------------------------------------------------

/// Snapshot of one completion request as the mock saw it.
struct CallRecord {
    message_count: usize,
    roles: Vec<String>,
    user_content: String,
    wire_tool_names: Vec<String>,
}

/// Scripted [`ModelClient`]: either repeats one tool call forever, or pops
/// per-call scripts (name, raw arguments) and answers with text when the
/// script runs dry.
struct MockClient {
    repeat: Option<(String, String)>,
    script: Mutex<VecDeque<Vec<(String, String)>>>,
    calls: Mutex<Vec<CallRecord>>,
    next_id: AtomicUsize,
}

impl MockClient {
    fn quiet() -> Self {
        Self::scripted(Vec::new())
    }

    fn repeating(name: &str, arguments: &str) -> Self {
        Self {
            repeat: Some((name.to_owned(), arguments.to_owned())),
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    fn scripted(turns: Vec<Vec<(&str, &str)>>) -> Self {
        let script = turns
            .into_iter()
            .map(|turn| {
                turn.into_iter()
                    .map(|(n, a)| (n.to_owned(), a.to_owned()))
                    .collect()
            })
            .collect();
        Self {
            repeat: None,
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.lock().expect("lock").len()
    }

    fn records<T>(&self, f: impl Fn(&[CallRecord]) -> T) -> T {
        let calls = self.calls.lock().expect("lock");
        f(&calls)
    }
}

#[async_trait]
impl ModelClient for MockClient {
    async fn complete(
        &self,
        _model: &str,
        messages: &[ChatMessage],
        tools: &[WireTool],
        _params: &Map<String, Value>,
    ) -> Result<ChatCompletion, ProviderError> {
        self.calls.lock().expect("lock").push(CallRecord {
            message_count: messages.len(),
            roles: messages.iter().map(|m| m.role.clone()).collect(),
            user_content: messages
                .get(1)
                .and_then(|m| m.content.clone())
                .unwrap_or_default(),
            wire_tool_names: tools.iter().map(|t| t.function.name.clone()).collect(),
        });

        let emitted: Vec<(String, String)> = match &self.repeat {
            Some(call) => vec![call.clone()],
            None => self
                .script
                .lock()
                .expect("lock")
                .pop_front()
                .unwrap_or_default(),
        };

        let tool_calls: Vec<WireToolCall> = emitted
            .into_iter()
            .map(|(name, arguments)| WireToolCall {
                id: format!("call_{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
                kind: "function".to_owned(),
                function: WireFunctionCall { name, arguments },
            })
            .collect();

        let message = if tool_calls.is_empty() {
            ChatResponseMessage {
                content: Some("Nothing needs attention.".to_owned()),
                tool_calls: None,
            }
        } else {
            ChatResponseMessage {
                content: None,
                tool_calls: Some(tool_calls),
            }
        };

        Ok(ChatCompletion {
            choices: vec![ChatChoice {
                message,
                finish_reason: None,
            }],
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn package(tier: NoiseTier) -> Arc<ScenarioPackage> {
    Arc::new(
        generate_package(&GeneratorParams {
            crisis_type: CrisisType::CardiacArrest,
            noise_tier: tier,
            seed: 42,
            scenario_date: NaiveDate::from_ymd_opt(2027, 6, 12).expect("valid date"),
        })
        .expect("generate"),
    )
}

fn config() -> RunConfig {
    RunConfig::with_models(
        "openai/gpt-test",
        "openai/gpt-test-mini",
        "anthropic/judge-test",
    )
}

// ---------------------------------------------------------------------------
// Fresh context and end conditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_fresh_context_every_heartbeat() {
    let client = Arc::new(MockClient::quiet());
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T1), config(), Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");
    let transcript = orchestrator.run().await.expect("run");

    // One model call per heartbeat, each opening with exactly
    // [system, user].
    assert_eq!(client.call_count(), transcript.heartbeats.len());
    client.records(|calls| {
        for call in calls {
            assert_eq!(call.message_count, 2);
            assert_eq!(call.roles, ["system", "user"]);
        }
    });
}

#[tokio::test]
async fn test_full_post_crisis_window_runs_by_default() {
    let client = Arc::new(MockClient::quiet());
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T1), config(), Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");
    let transcript = orchestrator.run().await.expect("run");

    assert_eq!(transcript.heartbeats.len(), 160);
    assert_eq!(
        transcript.heartbeats.last().expect("non-empty").heartbeat_id,
        159
    );
}

#[tokio::test]
async fn test_post_crisis_bound_truncates_run() {
    let mut cfg = config();
    cfg.max_post_crisis_heartbeats = 2;
    let client = Arc::new(MockClient::quiet());
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T1), cfg, Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");
    let transcript = orchestrator.run().await.expect("run");

    // Crisis at 139; two post-crisis heartbeats allowed.
    assert_eq!(
        transcript.heartbeats.last().expect("non-empty").heartbeat_id,
        141
    );
    assert_eq!(transcript.heartbeats.len(), 142);
}

#[tokio::test]
async fn test_transcript_embeds_scenario_hash() {
    let pkg = package(NoiseTier::T1);
    let expected = pkg.manifest.content_hash.to_string();
    let client = Arc::new(MockClient::quiet());
    let orchestrator = Orchestrator::new(pkg, config(), Arc::clone(&client) as Arc<dyn ModelClient>)
        .expect("orchestrator");
    let transcript = orchestrator.run().await.expect("run");

    for hb in &transcript.heartbeats {
        assert_eq!(hb.scenario_hash, expected);
    }
}

// ---------------------------------------------------------------------------
// Tool budget
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_tool_budget_caps_model_calls() {
    let mut cfg = config();
    cfg.max_tool_turns = 2;
    let client = Arc::new(MockClient::repeating("query_wearable", "{}"));
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T1), cfg, Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");
    let transcript = orchestrator.run().await.expect("run");

    // Exactly max_tool_turns + 1 = 3 model calls per heartbeat.
    assert_eq!(client.call_count(), transcript.heartbeats.len() * 3);

    // Conversation grows by assistant + tool-result per turn: 2, 4, 6.
    client.records(|calls| {
        for chunk in calls.chunks(3) {
            let counts: Vec<usize> = chunk.iter().map(|c| c.message_count).collect();
            assert_eq!(counts, [2, 4, 6]);
        }
    });

    // The final turn's tool calls were executed and recorded.
    for hb in &transcript.heartbeats {
        assert_eq!(hb.turns.len(), 3);
        for turn in &hb.turns {
            assert_eq!(turn.tool_calls.len(), 1);
            assert_eq!(turn.tool_calls[0].name, "query_wearable");
            assert_eq!(
                turn.tool_calls[0].routed_to.as_deref(),
                Some("ScenarioDataHandler")
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Unknown tools and the action log
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_unrouted_call_to_responders_is_expected_error() {
    let client = Arc::new(MockClient::scripted(vec![vec![(
        "make_call",
        r#"{"number": "911"}"#,
    )]]));
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T1), config(), Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");
    let transcript = orchestrator.run().await.expect("run");

    let call = &transcript.heartbeats[0].turns[0].tool_calls[0];
    assert_eq!(call.name, "make_call");
    assert_eq!(call.routed_to, None);
    assert_eq!(call.response.status, ToolStatus::Error);
    assert_eq!(
        call.response.payload.get("message"),
        Some(&json!("Unknown tool"))
    );

    // The next heartbeat's user message shows the action-log entry.
    client.records(|calls| {
        let next = &calls[2].user_content;
        assert!(next.contains("make_call"), "log entry missing: {next}");
        assert!(next.contains("Called 911"), "summary missing: {next}");
    });
}

// ---------------------------------------------------------------------------
// Memory round-trip within a heartbeat
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_memory_write_then_read_same_heartbeat() {
    let client = Arc::new(MockClient::scripted(vec![vec![
        ("write_memory", r#"{"key": "note", "content": "hr=0 spotted"}"#),
        ("read_memory", r#"{"key": "note"}"#),
    ]]));
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T1), config(), Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");
    let transcript = orchestrator.run().await.expect("run");

    let calls = &transcript.heartbeats[0].turns[0].tool_calls;
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].response.status, ToolStatus::Ok);
    let read = serde_json::to_value(&calls[1].response).expect("serialize");
    assert_eq!(read, json!({"status": "ok", "content": "hr=0 spotted"}));

    let ops = &transcript.heartbeats[0].memory_ops;
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0].op, MemoryOpKind::Write);
    assert_eq!(ops[0].key.as_deref(), Some("note"));
    assert_eq!(ops[0].content.as_deref(), Some("hr=0 spotted"));
    assert_eq!(ops[1].op, MemoryOpKind::Read);
}

#[tokio::test]
async fn test_seeded_memory_readable_on_first_heartbeat() {
    let client = Arc::new(MockClient::scripted(vec![vec![(
        "read_memory",
        r#"{"key": "health_baseline"}"#,
    )]]));
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T1), config(), Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");

    // The working directory is seeded with all six memory files up front.
    let seeded: Vec<_> = std::fs::read_dir(orchestrator.memory_path())
        .expect("read_dir")
        .collect();
    assert_eq!(seeded.len(), 6);

    let transcript = orchestrator.run().await.expect("run");

    let response = &transcript.heartbeats[0].turns[0].tool_calls[0].response;
    assert_eq!(response.status, ToolStatus::Ok);
    let content = response
        .payload
        .get("content")
        .and_then(Value::as_str)
        .expect("content");
    assert!(content.contains("Resting heart rate"));
}

// ---------------------------------------------------------------------------
// Sanitization on the wire
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_dotted_names_sanitized_on_wire_and_restored() {
    let client = Arc::new(MockClient::scripted(vec![vec![(
        "spotify__play_track",
        r#"{"query": "running mix"}"#,
    )]]));
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T3), config(), Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");
    let transcript = orchestrator.run().await.expect("run");

    // The wire catalogue carries no dots but does carry the escaped form.
    client.records(|calls| {
        let names = &calls[0].wire_tool_names;
        assert!(names.iter().all(|n| !n.contains('.')));
        assert!(names.iter().any(|n| n == "spotify__play_track"));
    });

    // The transcript shows the restored dotted name, unrouted.
    let call = &transcript.heartbeats[0].turns[0].tool_calls[0];
    assert_eq!(call.name, "spotify.play_track");
    assert_eq!(call.routed_to, None);
    assert_eq!(call.response.status, ToolStatus::Error);
}

// ---------------------------------------------------------------------------
// Failure semantics
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_malformed_tool_arguments_propagate() {
    let client = Arc::new(MockClient::scripted(vec![vec![(
        "query_wearable",
        "{not valid json",
    )]]));
    let orchestrator =
        Orchestrator::new(package(NoiseTier::T1), config(), Arc::clone(&client) as Arc<dyn ModelClient>)
            .expect("orchestrator");
    match orchestrator.run().await {
        Err(RuntimeError::ToolArguments { tool, .. }) => assert_eq!(tool, "query_wearable"),
        other => panic!("expected ToolArguments error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// End to end through the package on disk
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_run_benchmark_loads_and_runs_from_disk() {
    let pkg = package(NoiseTier::T2);
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_package(&pkg, dir.path()).expect("write");

    let client = Arc::new(MockClient::quiet());
    let transcript = run_benchmark(&path, config(), Arc::clone(&client) as Arc<dyn ModelClient>)
        .await
        .expect("run");
    assert_eq!(transcript.scenario_id, pkg.scenario_id);
    assert_eq!(transcript.heartbeats.len(), 160);
}

#[tokio::test]
async fn test_tampered_package_fails_before_any_model_call() {
    let pkg = package(NoiseTier::T2);
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_package(&pkg, dir.path()).expect("write");

    let file = path.join("heartbeats.json");
    let mut raw = std::fs::read_to_string(&file).expect("read");
    raw.push(' ');
    std::fs::write(&file, raw).expect("tamper");

    let client = Arc::new(MockClient::quiet());
    let result = run_benchmark(&path, config(), Arc::clone(&client) as Arc<dyn ModelClient>).await;
    assert!(result.is_err());
    assert_eq!(client.call_count(), 0, "model was called despite bad hash");
}
