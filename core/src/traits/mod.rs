pub mod provider;
pub mod store;
pub mod tool;

pub use provider::{
    ChatMessage, ChatRequest, ChatResponse, Provider, ProviderError, Role, StopReason, SystemBlock,
    ToolCall,
};
pub use store::CharacterStore;
pub use tool::{Tool, ToolName, ToolResult, ToolSpec};
