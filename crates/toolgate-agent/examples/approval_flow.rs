//! Example: one gated conversation against a live chat endpoint.
//!
//! Set OPENAI_API_KEY (or TOOLGATE_API_KEY) for the default endpoint, or
//! point TOOLGATE_INFERENCE_URL at any OpenAI-compatible server. The local
//! tool set is used; every requested call is surfaced and then approved.
//!
//! Run: `cargo run -p toolgate-agent --example approval_flow -- "Your prompt"`

use std::sync::Arc;

use toolgate_agent::{ApprovalMode, ChatService, NullElicitationChannel, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Please generate a random number based on the current date".to_string());

    let config = ServiceConfig {
        inference_url: std::env::var("TOOLGATE_INFERENCE_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string()),
        model: std::env::var("TOOLGATE_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
        ..ServiceConfig::default()
    };
    let service = ChatService::from_config(config, Arc::new(NullElicitationChannel));
    service.set_approval_mode(ApprovalMode::Manual).await;

    let mut response = service.begin("example-user", &prompt).await?;
    while response.final_answer.is_none() {
        for call in response.pending_calls.clone() {
            println!("approving `{}` ({}): {}", call.name, call.id, call.arguments_json);
            response = service.approve("example-user", &call.id).await?;
        }
    }
    println!("{}", response.final_answer.unwrap_or_default());
    Ok(())
}
