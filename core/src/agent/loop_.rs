use crate::agent::{PromptBuilder, ReplySink, ToolRegistry};
use crate::traits::{ChatMessage, ChatRequest, Provider};
use anyhow::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

pub const MAX_TOOL_ROUNDS: usize = 8;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

const ROUND_CAP_REPLY: &str =
    "The threads of fate have tangled; let us pause and try that again.";

pub struct AgentLoop {
    provider: Arc<dyn Provider>,
    prompt_builder: PromptBuilder,
    registry: Arc<ToolRegistry>,
    max_tokens: u32,
    max_tool_rounds: usize,
}

impl AgentLoop {
    pub fn new(
        provider: Arc<dyn Provider>,
        prompt_builder: PromptBuilder,
        registry: Arc<ToolRegistry>,
    ) -> Self {
        Self {
            provider,
            prompt_builder,
            registry,
            max_tokens: DEFAULT_MAX_TOKENS,
            max_tool_rounds: MAX_TOOL_ROUNDS,
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_max_tool_rounds(mut self, max: usize) -> Self {
        self.max_tool_rounds = max;
        self
    }

    pub async fn handle_prompt(
        &self,
        user_message: &str,
        character_name: Option<&str>,
        sink: &ReplySink,
    ) -> Result<String> {
        let start = Instant::now();
        let system = self.prompt_builder.build_system_blocks(character_name);
        let tools = self.registry.specs();
        let mut messages = vec![ChatMessage::user(user_message)];

        for round in 1..=self.max_tool_rounds {
            let request = ChatRequest {
                system: &system,
                messages: &messages,
                tools: &tools,
                max_tokens: self.max_tokens,
            };

            let response = self.provider.complete(request).await?;
            debug!(
                round,
                tool_calls = response.tool_calls.len(),
                stop = ?response.stop,
                "model turn"
            );

            if !response.has_tool_calls() {
                let reply = response.text_or_empty().to_string();
                if !reply.is_empty() {
                    sink.send(reply.clone()).await;
                }
                info!(
                    rounds = round,
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "prompt handled"
                );
                return Ok(reply);
            }

            let text = response.text_or_empty().to_string();
            if !text.is_empty() {
                sink.send(text.clone()).await;
            }
            messages.push(ChatMessage::assistant_with_tool_calls(
                text,
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                let result = self.registry.dispatch(call, sink).await;
                messages.push(ChatMessage::tool(result));
            }
        }

        warn!(
            max_tool_rounds = self.max_tool_rounds,
            "round cap reached before the model settled"
        );
        sink.send(ROUND_CAP_REPLY.to_string()).await;
        Ok(ROUND_CAP_REPLY.to_string())
    }
}
