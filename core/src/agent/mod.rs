pub mod context;
pub mod loop_;
pub mod registry;
pub mod sink;

pub use context::PromptBuilder;
pub use loop_::{AgentLoop, DEFAULT_MAX_TOKENS, MAX_TOOL_ROUNDS};
pub use registry::ToolRegistry;
pub use sink::{DEFAULT_SINK_CAPACITY, ReplySink};
