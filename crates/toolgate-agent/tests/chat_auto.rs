//! Auto approval: every requested call executes immediately, nothing goes
//! pending, and tool failures feed back into the model-visible history.

use std::sync::Arc;

use toolgate_agent::test_support::{ScriptedTransport, StaticTool, assistant_text, assistant_tool_calls};
use toolgate_agent::{
    ApprovalMode, ChatService, NullElicitationChannel, ServiceConfig, Tool, ToolCatalog,
};

fn auto_service(transport: Arc<ScriptedTransport>, tools: Vec<Arc<dyn Tool>>) -> ChatService {
    ChatService::with_parts(
        ServiceConfig::default(),
        transport,
        Arc::new(NullElicitationChannel),
        ApprovalMode::Auto,
        ToolCatalog::new(tools),
    )
}

#[tokio::test]
async fn tool_calls_execute_inline_and_the_turn_resumes() {
    let clock = StaticTool::ok("get_current_datetime", "2026-08-07T12:00:00Z");
    let transport = ScriptedTransport::new(vec![
        assistant_tool_calls(&[("c1", "get_current_datetime", "")]),
        assistant_text("It is noon, UTC."),
    ]);
    let service = auto_service(Arc::clone(&transport), vec![Arc::clone(&clock) as Arc<dyn Tool>]);

    let response = service.begin("u1", "what time is it").await.expect("begin");

    assert_eq!(response.final_answer.as_deref(), Some("It is noon, UTC."));
    assert!(response.pending_calls.is_empty());
    assert_eq!(clock.invocations(), 1);
    assert_eq!(transport.sends(), 2);

    let handle = service.store().get("u1").await.expect("session");
    let session = handle.lock().await;
    assert!(session.pending_calls.is_empty());
    assert_eq!(session.final_answer.as_deref(), Some("It is noon, UTC."));
    // user, assistant w/ calls, tool result
    assert_eq!(session.history.len(), 3);
    assert_eq!(session.history[2].role, "tool");
    assert_eq!(session.history[2].tool_call_id.as_deref(), Some("c1"));
}

#[tokio::test]
async fn auto_mode_never_surfaces_pending_calls() {
    let clock = StaticTool::ok("get_current_datetime", "2026-08-07T12:00:00Z");
    let transport = ScriptedTransport::new(vec![
        assistant_tool_calls(&[("c1", "get_current_datetime", "")]),
        assistant_tool_calls(&[("c2", "get_current_datetime", "")]),
        assistant_text("done"),
    ]);
    let service = auto_service(transport, vec![clock as Arc<dyn Tool>]);

    let response = service.begin("u1", "time twice").await.expect("begin");
    assert!(response.pending_calls.is_empty());
    assert!(response.final_answer.is_some());
}

#[tokio::test]
async fn failed_tool_becomes_an_error_result_and_the_conversation_continues() {
    let broken = StaticTool::failing("get_current_datetime", "clock is down");
    let transport = ScriptedTransport::new(vec![
        assistant_tool_calls(&[("c1", "get_current_datetime", "")]),
        assistant_text("I could not read the clock."),
    ]);
    let service = auto_service(transport, vec![broken as Arc<dyn Tool>]);

    let response = service.begin("u1", "what time is it").await.expect("begin");
    assert_eq!(
        response.final_answer.as_deref(),
        Some("I could not read the clock.")
    );

    let handle = service.store().get("u1").await.expect("session");
    let session = handle.lock().await;
    let tool_message = &session.history[2];
    assert_eq!(tool_message.role, "tool");
    assert!(
        tool_message
            .content
            .as_deref()
            .is_some_and(|c| c.starts_with("Error:")),
        "tool failure should be visible to the model"
    );
}

#[tokio::test]
async fn unknown_tool_name_is_an_execution_failure_not_a_protocol_error() {
    let transport = ScriptedTransport::new(vec![
        assistant_tool_calls(&[("c1", "no_such_tool", "{}")]),
        assistant_text("that tool does not exist"),
    ]);
    let service = auto_service(transport, vec![]);

    let response = service.begin("u1", "use the mystery tool").await.expect("begin");
    assert_eq!(
        response.final_answer.as_deref(),
        Some("that tool does not exist")
    );

    let handle = service.store().get("u1").await.expect("session");
    let session = handle.lock().await;
    assert!(
        session.history[2]
            .content
            .as_deref()
            .is_some_and(|c| c.starts_with("Error:"))
    );
}

#[tokio::test]
async fn empty_trailing_message_yields_an_empty_final_answer() {
    let transport = ScriptedTransport::new(vec![toolgate_agent::AssistantMessage::default()]);
    let service = auto_service(transport, vec![]);

    let response = service.begin("u1", "say nothing").await.expect("begin");
    assert_eq!(response.final_answer.as_deref(), Some(""));
    assert!(response.pending_calls.is_empty());
}

#[tokio::test]
async fn interleaved_begins_for_distinct_keys_keep_history_ordering() {
    let transport = ScriptedTransport::new(vec![
        assistant_text("answer one"),
        assistant_text("answer two"),
    ]);
    let service = Arc::new(auto_service(transport, vec![]));

    let a = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.begin("u1", "prompt for u1").await })
    };
    let b = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.begin("u2", "prompt for u2").await })
    };
    a.await.expect("join").expect("begin u1");
    b.await.expect("join").expect("begin u2");

    for key in ["u1", "u2"] {
        let handle = service.store().get(key).await.expect("session");
        let session = handle.lock().await;
        assert_eq!(session.history.len(), 1);
        assert_eq!(
            session.history[0].content.as_deref(),
            Some(format!("prompt for {key}").as_str())
        );
        assert!(session.final_answer.is_some());
    }
}
