use std::sync::Arc;

use chain_agent_model::{ModelMessage, ToolCallRequest};
use chain_agent_test_model::{
    PresetEvent, PresetFailure, PresetResponse, TestModelProvider,
};
use serde_json::json;

use super::*;
use crate::AgentError;
use crate::checkpoint::MemoryCheckpointer;
use crate::conversation::Role;
use crate::tool::tests::EchoTool;

fn tool_call(id: &str, name: &str, text: &str) -> PresetEvent {
    PresetEvent::ToolCall(ToolCallRequest {
        id: id.to_owned(),
        name: name.to_owned(),
        arguments: json!({ "text": text }),
    })
}

fn build_agent(provider: &TestModelProvider) -> Agent {
    AgentBuilder::with_model_provider(provider.clone())
        .with_system_prompt("Be concise.")
        .with_tool(EchoTool("get_balance"))
        .with_tool(EchoTool("Search"))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_simple_message() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_events([
        PresetEvent::MessageDelta("Hi, ".to_owned()),
        PresetEvent::MessageDelta("what can I do for you?".to_owned()),
    ]));
    let agent = build_agent(&provider);
    let config = RunConfig::with_thread_id("t");

    let updates = agent.stream("Hello", &config).collect().await.unwrap();
    assert_eq!(
        updates,
        vec![AgentUpdate::Agent(AgentMessage {
            content: "Hi, what can I do for you?".to_owned(),
            tool_calls: vec![],
        })]
    );

    let requests = provider.requests();
    let request = &requests[0];
    assert_eq!(
        request.messages,
        vec![
            ModelMessage::System("Be concise.".to_owned()),
            ModelMessage::User("Hello".to_owned()),
        ]
    );
    let tool_names: Vec<_> =
        request.tools.iter().map(|tool| tool.name.as_str()).collect();
    assert_eq!(tool_names, ["get_balance", "Search"]);
}

#[tokio::test]
async fn test_tool_round_trip() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::with_events([
        tool_call("call:1", "get_balance", "eth"),
        tool_call("call:2", "deploy_nft", "x"),
    ]));
    provider.add_response(PresetResponse::text("You have some ETH."));
    let agent = build_agent(&provider);
    let config = RunConfig::with_thread_id("t");

    let mut stream = agent.stream("what is my balance", &config);

    let Some(Ok(AgentUpdate::Agent(reply))) = stream.next().await else {
        panic!("expected an agent update first");
    };
    assert!(reply.content.is_empty());
    assert_eq!(reply.tool_calls.len(), 2);

    let Some(Ok(AgentUpdate::Tools(results))) = stream.next().await else {
        panic!("expected a tools update second");
    };
    assert_eq!(results[0].content, "get_balance: eth");
    assert!(!results[0].is_error);
    assert!(results[1].content.starts_with("Error: "));
    assert!(results[1].is_error);

    let Some(Ok(AgentUpdate::Agent(reply))) = stream.next().await else {
        panic!("expected the final answer");
    };
    assert_eq!(reply.content, "You have some ETH.");
    assert!(stream.next().await.is_none());
    assert!(stream.next().await.is_none());

    // The second request carries the tool results.
    let requests = provider.requests();
    let second = &requests[1];
    assert_eq!(second.messages.len(), 5);
    assert!(matches!(second.messages[4], ModelMessage::Tool(_)));
}

#[tokio::test]
async fn test_thread_persists_across_turns() {
    let provider = TestModelProvider::default();
    provider.add_response(PresetResponse::text("gm"));
    provider.add_response(PresetResponse::text("still here"));
    let checkpointer = Arc::new(MemoryCheckpointer::new());
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_checkpointer(checkpointer)
        .build()
        .unwrap();
    let config = RunConfig::with_thread_id("chatbot");

    agent.stream("gm", &config).collect().await.unwrap();
    agent.stream("you there?", &config).collect().await.unwrap();

    let roles: Vec<_> =
        agent.history(&config).iter().map(|turn| turn.role).collect();
    assert_eq!(roles, [Role::User, Role::Agent, Role::User, Role::Agent]);
    assert_eq!(provider.requests()[1].messages.len(), 3);

    // Another thread starts from scratch.
    assert!(agent.history(&RunConfig::with_thread_id("other")).is_empty());
}

#[tokio::test]
async fn test_model_error_ends_turn() {
    let provider = TestModelProvider::default();
    provider.add_response(
        PresetResponse::text("").with_failure(PresetFailure::Request),
    );
    let agent = build_agent(&provider);
    let config = RunConfig::with_thread_id("t");

    let mut stream = agent.stream("gm", &config);
    assert!(matches!(
        stream.next().await,
        Some(Err(AgentError::Model { .. }))
    ));
    assert!(stream.next().await.is_none());

    // The user input was kept.
    assert_eq!(agent.history(&config).len(), 1);
}

#[tokio::test]
async fn test_step_limit() {
    let provider = TestModelProvider::default();
    for idx in 0..3 {
        provider.add_response(PresetResponse::with_events([tool_call(
            &format!("call:{idx}"),
            "get_balance",
            "eth",
        )]));
    }
    let agent = AgentBuilder::with_model_provider(provider.clone())
        .with_tool(EchoTool("get_balance"))
        .with_max_steps(2)
        .build()
        .unwrap();

    let err = agent
        .stream("loop forever", &RunConfig::with_thread_id("t"))
        .collect()
        .await
        .unwrap_err();
    assert_eq!(err, AgentError::StepLimitExceeded(2));
    assert_eq!(provider.remaining(), 1);
}

#[test]
fn test_duplicate_tools_rejected() {
    let result = AgentBuilder::with_model_provider(TestModelProvider::default())
        .with_tool(EchoTool("Search"))
        .with_tool(EchoTool("Search"))
        .build();
    assert!(result.is_err());
}
