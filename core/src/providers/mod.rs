pub mod anthropic;
pub mod factory;

pub use anthropic::{AnthropicProvider, DEFAULT_MODEL};
pub use factory::create_provider;
