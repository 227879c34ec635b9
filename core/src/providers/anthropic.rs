use crate::traits::{
    ChatMessage, ChatRequest, ChatResponse, Provider, ProviderError, Role, StopReason,
    SystemBlock, ToolCall, ToolSpec,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

pub const DEFAULT_MODEL: &str = "claude-haiku-4-5";

const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<SystemParam<'a>>,
    messages: Vec<MessageParam<'a>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ToolParam<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct SystemParam<'a> {
    r#type: &'static str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_control: Option<CacheControl>,
}

#[derive(Debug, Serialize)]
struct CacheControl {
    r#type: &'static str,
}

#[derive(Debug, Serialize)]
struct MessageParam<'a> {
    role: &'static str,
    content: Vec<ContentParam<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentParam<'a> {
    Text {
        text: &'a str,
    },
    ToolUse {
        id: &'a str,
        name: &'a str,
        input: &'a serde_json::Value,
    },
    ToolResult {
        tool_use_id: &'a str,
        content: &'a str,
        is_error: bool,
    },
}

#[derive(Debug, Serialize)]
struct ToolParam<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    r#type: &'static str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Usage,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
    #[serde(default)]
    cache_read_input_tokens: u64,
}

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .connect_timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: ANTHROPIC_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let url = base_url.into();
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    fn build_body<'a>(&'a self, request: ChatRequest<'a>) -> MessagesRequest<'a> {
        MessagesRequest {
            model: &self.model,
            max_tokens: request.max_tokens,
            system: self.convert_system(request.system),
            messages: self.convert_messages(request.messages),
            tools: self.convert_tools(request.tools),
            tool_choice: (!request.tools.is_empty()).then_some(ToolChoice { r#type: "auto" }),
        }
    }

    fn convert_system<'a>(&self, system: &'a [SystemBlock]) -> Vec<SystemParam<'a>> {
        system
            .iter()
            .map(|block| SystemParam {
                r#type: "text",
                text: &block.text,
                cache_control: block
                    .cache
                    .then_some(CacheControl { r#type: "ephemeral" }),
            })
            .collect()
    }

    fn convert_messages<'a>(&self, messages: &'a [ChatMessage]) -> Vec<MessageParam<'a>> {
        let mut params: Vec<MessageParam> = Vec::new();

        for message in messages {
            match message.role {
                Role::User => params.push(MessageParam {
                    role: "user",
                    content: vec![ContentParam::Text {
                        text: &message.content,
                    }],
                }),
                Role::Assistant => {
                    let mut content = Vec::new();
                    if !message.content.is_empty() {
                        content.push(ContentParam::Text {
                            text: &message.content,
                        });
                    }
                    for call in &message.tool_calls {
                        content.push(ContentParam::ToolUse {
                            id: &call.id,
                            name: &call.name,
                            input: &call.arguments,
                        });
                    }
                    params.push(MessageParam {
                        role: "assistant",
                        content,
                    });
                }
                Role::Tool => {
                    let Some(result) = &message.tool_result else {
                        continue;
                    };
                    let block = ContentParam::ToolResult {
                        tool_use_id: &result.tool_call_id,
                        content: &result.payload,
                        is_error: !result.success,
                    };
                    // The API wants every tool result of a round in one user message.
                    match params.last_mut() {
                        Some(last)
                            if last.role == "user"
                                && matches!(
                                    last.content.first(),
                                    Some(ContentParam::ToolResult { .. })
                                ) =>
                        {
                            last.content.push(block);
                        }
                        _ => params.push(MessageParam {
                            role: "user",
                            content: vec![block],
                        }),
                    }
                }
            }
        }

        params
    }

    fn convert_tools<'a>(&self, tools: &'a [ToolSpec]) -> Vec<ToolParam<'a>> {
        tools
            .iter()
            .map(|t| ToolParam {
                name: &t.name,
                description: &t.description,
                input_schema: &t.input_schema,
            })
            .collect()
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn complete(&self, request: ChatRequest<'_>) -> Result<ChatResponse, ProviderError> {
        let body = self.build_body(request);

        let start = Instant::now();
        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            input_tokens = parsed.usage.input_tokens,
            output_tokens = parsed.usage.output_tokens,
            cache_read_input_tokens = parsed.usage.cache_read_input_tokens,
            "anthropic call finished"
        );

        parse_response(parsed)
    }
}

fn parse_response(response: MessagesResponse) -> Result<ChatResponse, ProviderError> {
    let mut text_parts = Vec::new();
    let mut tool_calls = Vec::new();

    for block in response.content {
        match block {
            ContentBlock::Text { text } => text_parts.push(text),
            ContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                id,
                name,
                arguments: input,
            }),
            ContentBlock::Unknown => debug!("skipping unknown content block"),
        }
    }

    if text_parts.is_empty() && tool_calls.is_empty() {
        return Err(ProviderError::InvalidResponse(
            "no text or tool calls in response".to_string(),
        ));
    }

    let stop = match response.stop_reason.as_deref() {
        Some("end_turn") => StopReason::EndTurn,
        Some("tool_use") => StopReason::ToolUse,
        Some("max_tokens") => StopReason::MaxTokens,
        _ => StopReason::Unknown,
    };

    Ok(ChatResponse {
        text: (!text_parts.is_empty()).then(|| text_parts.join("\n")),
        tool_calls,
        stop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ToolResult;
    use serde_json::json;

    fn provider() -> AnthropicProvider {
        AnthropicProvider::new("test-key")
    }

    #[test]
    fn parses_a_tool_use_message() {
        let raw = r#"{
            "id": "msg_01A7qKtLUakEX4jg9LA4HbxA",
            "type": "message",
            "role": "assistant",
            "content": [
                {
                    "citations": null,
                    "text": "I'll roll 2d20 for you.",
                    "type": "text"
                },
                {
                    "id": "toolu_01Met3ioxHuaVAabavjxva2s",
                    "input": {"sides": 20, "times": 2},
                    "name": "roll_dice",
                    "type": "tool_use"
                }
            ],
            "stop_reason": "tool_use",
            "stop_sequence": null,
            "usage": {"input_tokens": 619, "output_tokens": 86}
        }"#;

        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let response = parse_response(parsed).unwrap();

        assert_eq!(response.text.as_deref(), Some("I'll roll 2d20 for you."));
        assert_eq!(response.stop, StopReason::ToolUse);
        assert_eq!(response.tool_calls.len(), 1);
        assert_eq!(response.tool_calls[0].name, "roll_dice");
        assert_eq!(response.tool_calls[0].id, "toolu_01Met3ioxHuaVAabavjxva2s");
        assert_eq!(response.tool_calls[0].arguments["sides"], 20);
    }

    #[test]
    fn unknown_content_blocks_are_skipped() {
        let raw = r#"{
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "Done."}
            ],
            "stop_reason": "end_turn"
        }"#;

        let parsed: MessagesResponse = serde_json::from_str(raw).unwrap();
        let response = parse_response(parsed).unwrap();
        assert_eq!(response.text.as_deref(), Some("Done."));
        assert!(response.tool_calls.is_empty());
    }

    #[test]
    fn empty_content_is_invalid() {
        let parsed: MessagesResponse =
            serde_json::from_str(r#"{"content": [], "stop_reason": "end_turn"}"#).unwrap();
        assert!(matches!(
            parse_response(parsed),
            Err(ProviderError::InvalidResponse(_))
        ));
    }

    #[test]
    fn stop_reasons_map_to_variants() {
        for (raw, expected) in [
            ("end_turn", StopReason::EndTurn),
            ("tool_use", StopReason::ToolUse),
            ("max_tokens", StopReason::MaxTokens),
            ("pause_turn", StopReason::Unknown),
        ] {
            let parsed: MessagesResponse = serde_json::from_str(&format!(
                r#"{{"content": [{{"type": "text", "text": "x"}}], "stop_reason": "{raw}"}}"#
            ))
            .unwrap();
            assert_eq!(parse_response(parsed).unwrap().stop, expected);
        }
    }

    #[test]
    fn request_body_has_the_wire_shape() {
        let system = [
            SystemBlock::plain("persona"),
            SystemBlock::cached("party roster"),
        ];
        let messages = [ChatMessage::user("roll for initiative")];
        let schema = json!({"type": "object"});
        let tools = [ToolSpec {
            name: "roll_dice".to_string(),
            description: "Roll dice.".to_string(),
            input_schema: schema.clone(),
        }];
        let request = ChatRequest {
            system: &system,
            messages: &messages,
            tools: &tools,
            max_tokens: 1024,
        };

        let body = serde_json::to_value(provider().build_body(request)).unwrap();

        assert_eq!(body["model"], DEFAULT_MODEL);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["system"][0]["type"], "text");
        assert!(body["system"][0].get("cache_control").is_none());
        assert_eq!(body["system"][1]["cache_control"]["type"], "ephemeral");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["type"], "text");
        assert_eq!(body["tools"][0]["name"], "roll_dice");
        assert_eq!(body["tools"][0]["input_schema"], schema);
        assert_eq!(body["tool_choice"]["type"], "auto");
    }

    #[test]
    fn no_tools_omits_tool_choice() {
        let system = [SystemBlock::plain("persona")];
        let messages = [ChatMessage::user("hello")];
        let request = ChatRequest {
            system: &system,
            messages: &messages,
            tools: &[],
            max_tokens: 256,
        };

        let body = serde_json::to_value(provider().build_body(request)).unwrap();
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
    }

    #[test]
    fn tool_results_of_a_round_share_one_user_message() {
        let calls = vec![
            ToolCall {
                id: "toolu_1".to_string(),
                name: "roll_dice".to_string(),
                arguments: json!({"sides": 6}),
            },
            ToolCall {
                id: "toolu_2".to_string(),
                name: "get_character_sheet".to_string(),
                arguments: json!({"character_name": "Maera Thistledown"}),
            },
        ];
        let messages = [
            ChatMessage::user("roll and look me up"),
            ChatMessage::assistant_with_tool_calls("On it.", calls),
            ChatMessage::tool(ToolResult::ok("toolu_1", r#"{"rolls":[4]}"#)),
            ChatMessage::tool(ToolResult::error("toolu_2", "Execution failed: no such elf")),
        ];

        let params = provider().convert_messages(&messages);
        assert_eq!(params.len(), 3);

        assert_eq!(params[1].role, "assistant");
        assert_eq!(params[1].content.len(), 3);

        assert_eq!(params[2].role, "user");
        assert_eq!(params[2].content.len(), 2);
        let body = serde_json::to_value(&params[2]).unwrap();
        assert_eq!(body["content"][0]["tool_use_id"], "toolu_1");
        assert_eq!(body["content"][0]["is_error"], false);
        assert_eq!(body["content"][1]["tool_use_id"], "toolu_2");
        assert_eq!(body["content"][1]["is_error"], true);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let provider = provider().with_base_url("http://localhost:8080/");
        assert_eq!(provider.base_url, "http://localhost:8080");
    }
}
