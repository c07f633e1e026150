//! Provider fallback across the chain and through the runtime.

use std::sync::Arc;

use vigil_approval::ApprovalRegistry;
use vigil_llm::{FallbackChat, LlmError, ProviderConfig, ProviderFamily, ToolCallResult};
use vigil_runtime::{AgentRuntime, RuntimeConfig, RuntimeError};
use vigil_test::{MockLlmProvider, MockProviderFactory, MockTurn, TestWorkspace, tool_call};

struct Chain {
    configs: Vec<ProviderConfig>,
    factory: MockProviderFactory,
    first: MockLlmProvider,
    second: MockLlmProvider,
    third: MockLlmProvider,
    unconfigured: MockLlmProvider,
}

/// Three configured providers, the first two failing, plus a fourth the
/// factory knows about but the chain does not list.
fn chain(third_turns: Vec<MockTurn>) -> Chain {
    let configs = vec![
        ProviderConfig::new(ProviderFamily::Anthropic, "a", "claude"),
        ProviderConfig::new(ProviderFamily::Gemini, "g", "gemini"),
        ProviderConfig::new(ProviderFamily::OpenAi, "o", "gpt"),
    ];
    let first = MockLlmProvider::failing("overloaded");
    let second = MockLlmProvider::failing("quota exceeded");
    let third = MockLlmProvider::new(third_turns);
    let unconfigured = MockLlmProvider::new(vec![MockTurn::text("should never answer")]);
    let factory = MockProviderFactory::new()
        .with_provider("anthropic:claude", first.clone())
        .with_provider("gemini:gemini", second.clone())
        .with_provider("openai:gpt", third.clone())
        .with_provider("groq:llama", unconfigured.clone());

    Chain {
        configs,
        factory,
        first,
        second,
        third,
        unconfigured,
    }
}

#[tokio::test]
async fn test_third_provider_serves_after_two_failures() {
    let c = chain(vec![MockTurn::text("hello from gpt"), MockTurn::text("still gpt")]);
    let chat = FallbackChat::new(c.configs.clone()).with_factory(Arc::new(c.factory.clone()));

    let (mut session, turn) = chat.start("hi").await.unwrap();
    assert_eq!(session.label(), "openai:gpt");
    assert_eq!(turn.text, "hello from gpt");
    assert_eq!(c.first.call_count(), 1);
    assert_eq!(c.second.call_count(), 1);
    assert_eq!(c.unconfigured.call_count(), 0);

    // The conversation stays on the provider that answered.
    let turn = session.send_message("and again").await.unwrap();
    assert_eq!(turn.text, "still gpt");
    assert_eq!(c.third.call_count(), 2);
    assert_eq!(c.first.call_count(), 1);
    assert_eq!(c.second.call_count(), 1);
    assert!(!c.factory.built().contains(&"groq:llama".to_string()));
}

#[tokio::test]
async fn test_all_failing_reports_every_attempt() {
    let c = chain(vec![MockTurn::error("down too")]);
    let chat = FallbackChat::new(c.configs).with_factory(Arc::new(c.factory));

    match chat.start("hi").await {
        Err(LlmError::AllProvidersFailed { attempts }) => {
            let labels: Vec<_> = attempts.iter().map(|a| a.label.as_str()).collect();
            assert_eq!(labels, vec!["anthropic:claude", "gemini:gemini", "openai:gpt"]);
        },
        Err(other) => panic!("unexpected error {other}"),
        Ok(_) => panic!("expected failure"),
    }
    assert_eq!(c.unconfigured.call_count(), 0);
}

#[tokio::test]
async fn test_tool_results_go_to_selected_provider() {
    let c = chain(vec![
        MockTurn::tool_calls(vec![tool_call("c1", "read_file", serde_json::json!({ "path": "x" }))]),
        MockTurn::text("done"),
    ]);
    let chat = FallbackChat::new(c.configs).with_factory(Arc::new(c.factory));

    let (mut session, turn) = chat.start("read x").await.unwrap();
    assert_eq!(turn.tool_calls[0].id, "c1");

    let turn = session
        .send_tool_results(vec![ToolCallResult::success("c1", "{}")])
        .await
        .unwrap();
    assert_eq!(turn.text, "done");
    assert_eq!(c.third.call_count(), 2);
}

#[tokio::test]
async fn test_runtime_reports_serving_provider() {
    let c = chain(vec![MockTurn::text("answer")]);
    let ws = TestWorkspace::new();
    let runtime = AgentRuntime::new(
        c.configs,
        ws.root(),
        Arc::new(ApprovalRegistry::new()),
        RuntimeConfig::default(),
    )
    .with_factory(Arc::new(c.factory));

    let out = runtime.run_turn("hi").await.unwrap();
    assert_eq!(out.provider, "openai:gpt");
    assert_eq!(out.text, "answer");
}

#[tokio::test]
async fn test_runtime_without_providers_is_configuration_error() {
    let ws = TestWorkspace::new();
    let runtime = AgentRuntime::new(vec![], ws.root(), Arc::new(ApprovalRegistry::new()), RuntimeConfig::default());

    let err = runtime.run_turn("hi").await.unwrap_err();
    assert!(matches!(err, RuntimeError::Configuration(LlmError::NoProvidersConfigured)));
}
