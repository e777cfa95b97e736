//! Error taxonomy: transport failures preserve the session, catalog
//! resolution failures block `begin`, and the turn loop is bounded.

use std::sync::Arc;

use toolgate_agent::test_support::{
    FailingTransport, ScriptedTransport, StaticTool, assistant_tool_calls,
};
use toolgate_agent::{
    ApprovalMode, CallingMode, ChatError, ChatService, NullElicitationChannel, ServiceConfig, Tool,
    ToolCatalog,
};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test]
async fn transport_failure_is_surfaced_and_the_session_survives_for_retry() {
    init_logging();
    let service = ChatService::with_parts(
        ServiceConfig::default(),
        Arc::new(FailingTransport),
        Arc::new(NullElicitationChannel),
        ApprovalMode::Auto,
        ToolCatalog::new(vec![]),
    );

    let err = service.begin("u1", "hello").await.expect_err("must fail");
    assert!(matches!(err, ChatError::Transport { .. }));

    let handle = service.store().get("u1").await.expect("session preserved");
    let session = handle.lock().await;
    assert_eq!(session.history.len(), 1);
    assert_eq!(session.history[0].content.as_deref(), Some("hello"));
}

#[tokio::test]
async fn a_runaway_tool_loop_hits_the_round_bound() {
    init_logging();
    let clock = StaticTool::ok("get_current_datetime", "2026-08-07T12:00:00Z");
    let transport = ScriptedTransport::new(vec![
        assistant_tool_calls(&[("c1", "get_current_datetime", "")]),
        assistant_tool_calls(&[("c2", "get_current_datetime", "")]),
    ]);
    let config = ServiceConfig {
        max_tool_rounds: 2,
        ..ServiceConfig::default()
    };
    let service = ChatService::with_parts(
        config,
        transport,
        Arc::new(NullElicitationChannel),
        ApprovalMode::Auto,
        ToolCatalog::new(vec![Arc::clone(&clock) as Arc<dyn Tool>]),
    );

    let err = service.begin("u1", "loop forever").await.expect_err("must abort");
    assert!(matches!(err, ChatError::TurnLimitExceeded { rounds: 2 }));
    assert_eq!(clock.invocations(), 2);
    assert!(
        service.store().get("u1").await.is_some(),
        "session preserved after the bound"
    );
}

#[tokio::test]
async fn catalog_resolution_failure_blocks_begin_before_any_session_exists() {
    let service = ChatService::from_config(
        ServiceConfig::default(),
        Arc::new(NullElicitationChannel),
    );
    service
        .set_calling_mode(CallingMode::RemoteUnauthenticated)
        .await;

    let err = service.begin("u1", "hello").await.expect_err("must fail");
    assert!(matches!(err, ChatError::ToolResolution { .. }));
    assert!(service.store().get("u1").await.is_none());
}

#[tokio::test]
async fn changing_the_approval_mode_forces_catalog_re_resolution() {
    let custom = StaticTool::ok("get_current_datetime", "2026-08-07T12:00:00Z");
    let transport = ScriptedTransport::new(vec![assistant_tool_calls(&[(
        "c1",
        "get_random_number_from_datetime",
        "",
    )])]);
    let service = ChatService::with_parts(
        ServiceConfig::default(),
        transport,
        Arc::new(NullElicitationChannel),
        ApprovalMode::Auto,
        ToolCatalog::new(vec![custom as Arc<dyn Tool>]),
    );

    service.set_approval_mode(ApprovalMode::Manual).await;
    assert_eq!(service.approval_mode().await, ApprovalMode::Manual);

    // The rebuilt local catalog carries the real random tool, so the gated
    // call projects from it rather than from the discarded custom catalog.
    let response = service.begin("u1", "random number").await.expect("begin");
    assert!(response.final_answer.is_none());
    assert_eq!(response.pending_calls.len(), 1);
    assert_eq!(
        response.pending_calls[0].name,
        "get_random_number_from_datetime"
    );
}

#[tokio::test]
async fn unchanged_modes_keep_the_existing_setup() {
    let transport = ScriptedTransport::new(vec![]);
    let service = ChatService::with_parts(
        ServiceConfig::default(),
        transport,
        Arc::new(NullElicitationChannel),
        ApprovalMode::Manual,
        ToolCatalog::new(vec![]),
    );

    service.set_approval_mode(ApprovalMode::Manual).await;
    service.set_calling_mode(CallingMode::Local).await;
    assert_eq!(service.approval_mode().await, ApprovalMode::Manual);
    assert_eq!(service.calling_mode().await, CallingMode::Local);
}
