//! Elicitation approval: pending calls resolve through the out-of-band
//! channel with no second caller action; decline terminates; timeout
//! degrades to the manual pending surface without leaking a waiter.

use std::sync::Arc;

use toolgate_agent::test_support::{
    ForwardingChannel, ScriptedTransport, StaticTool, assistant_text, assistant_tool_calls,
};
use toolgate_agent::{
    ApprovalMode, ChatService, ElicitOutcome, ServiceConfig, TERMINATION_ANSWER, Tool, ToolCatalog,
};

fn elicitation_service(
    transport: Arc<ScriptedTransport>,
    tools: Vec<Arc<dyn Tool>>,
) -> (Arc<ChatService>, tokio::sync::mpsc::UnboundedReceiver<toolgate_agent::ElicitationRequest>) {
    let (channel, rx) = ForwardingChannel::new();
    let service = Arc::new(ChatService::with_parts(
        ServiceConfig::default(),
        transport,
        channel,
        ApprovalMode::Elicitation,
        ToolCatalog::new(tools),
    ));
    (service, rx)
}

#[tokio::test]
async fn accepted_elicitation_executes_and_finishes_without_caller_action() {
    let dice = StaticTool::ok("get_random_number_from_datetime", "41");
    let transport = ScriptedTransport::new(vec![
        assistant_tool_calls(&[("c1", "get_random_number_from_datetime", "")]),
        assistant_text("Your number is 41."),
    ]);
    let (service, mut rx) = elicitation_service(
        Arc::clone(&transport),
        vec![Arc::clone(&dice) as Arc<dyn Tool>],
    );

    let approver = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                assert!(request.description.contains("get_random_number_from_datetime"));
                service
                    .resolve_elicitation(&request.id, ElicitOutcome::Accepted { content: None })
                    .await;
            }
        })
    };

    let response = service.begin("u1", "random number").await.expect("begin");

    assert_eq!(response.final_answer.as_deref(), Some("Your number is 41."));
    assert!(response.pending_calls.is_empty());
    assert_eq!(dice.invocations(), 1);
    assert_eq!(transport.sends(), 2);
    assert_eq!(service.pending_elicitations().await, 0);
    drop(service);
    approver.abort();
}

#[tokio::test]
async fn declined_elicitation_terminates_the_conversation() {
    let dice = StaticTool::ok("get_random_number_from_datetime", "41");
    let transport = ScriptedTransport::new(vec![assistant_tool_calls(&[(
        "c1",
        "get_random_number_from_datetime",
        "",
    )])]);
    let (service, mut rx) =
        elicitation_service(transport, vec![Arc::clone(&dice) as Arc<dyn Tool>]);

    let approver = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            if let Some(request) = rx.recv().await {
                service
                    .resolve_elicitation(&request.id, ElicitOutcome::Declined)
                    .await;
            }
        })
    };

    let response = service.begin("u1", "random number").await.expect("begin");

    assert_eq!(response.final_answer.as_deref(), Some(TERMINATION_ANSWER));
    assert!(response.pending_calls.is_empty());
    assert_eq!(dice.invocations(), 0);
    assert!(service.store().get("u1").await.is_none());
    approver.await.expect("approver");
}

#[tokio::test(start_paused = true)]
async fn timed_out_elicitation_degrades_to_the_manual_surface() {
    let dice = StaticTool::ok("get_random_number_from_datetime", "41");
    let transport = ScriptedTransport::new(vec![
        assistant_tool_calls(&[("c1", "get_random_number_from_datetime", "")]),
        assistant_text("Your number is 41."),
    ]);
    // Hold the receiver without responding: the request is deliverable but
    // never answered, so the timeout fires (paused clock auto-advances).
    let (service, _rx) = elicitation_service(
        Arc::clone(&transport),
        vec![Arc::clone(&dice) as Arc<dyn Tool>],
    );

    let response = service.begin("u1", "random number").await.expect("begin");

    assert!(response.final_answer.is_none());
    assert_eq!(response.pending_calls.len(), 1);
    assert_eq!(dice.invocations(), 0);
    assert_eq!(service.pending_elicitations().await, 0, "waiter must not leak");

    // The caller can still resolve the stranded call directly.
    let resumed = service.approve("u1", "c1").await.expect("approve");
    assert_eq!(resumed.final_answer.as_deref(), Some("Your number is 41."));
    assert_eq!(dice.invocations(), 1);
}

#[tokio::test]
async fn undeliverable_channel_degrades_to_the_manual_surface() {
    let dice = StaticTool::ok("get_random_number_from_datetime", "41");
    let transport = ScriptedTransport::new(vec![assistant_tool_calls(&[(
        "c1",
        "get_random_number_from_datetime",
        "",
    )])]);
    let (channel, rx) = ForwardingChannel::new();
    drop(rx); // nobody is listening
    let service = ChatService::with_parts(
        ServiceConfig::default(),
        transport,
        channel,
        ApprovalMode::Elicitation,
        ToolCatalog::new(vec![Arc::clone(&dice) as Arc<dyn Tool>]),
    );

    let response = service.begin("u1", "random number").await.expect("begin");

    assert!(response.final_answer.is_none());
    assert_eq!(response.pending_calls.len(), 1);
    assert_eq!(service.pending_elicitations().await, 0);
}

#[tokio::test]
async fn late_response_for_a_resolved_request_is_ignored() {
    let transport = ScriptedTransport::new(vec![]);
    let (service, _rx) = elicitation_service(transport, vec![]);
    assert!(
        !service
            .resolve_elicitation("stale-id", ElicitOutcome::Declined)
            .await
    );
}

#[tokio::test]
async fn a_second_gated_batch_elicits_again() {
    let dice = StaticTool::ok("roll", "6");
    let transport = ScriptedTransport::new(vec![
        assistant_tool_calls(&[("c1", "roll", "")]),
        assistant_tool_calls(&[("c2", "roll", "")]),
        assistant_text("Two rolls done."),
    ]);
    let (service, mut rx) =
        elicitation_service(Arc::clone(&transport), vec![Arc::clone(&dice) as Arc<dyn Tool>]);

    let approver = {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                service
                    .resolve_elicitation(&request.id, ElicitOutcome::Accepted { content: None })
                    .await;
            }
        })
    };

    let response = service.begin("u1", "roll until done").await.expect("begin");

    assert_eq!(response.final_answer.as_deref(), Some("Two rolls done."));
    assert_eq!(dice.invocations(), 2);
    assert_eq!(transport.sends(), 3);
    drop(service);
    approver.abort();
}
