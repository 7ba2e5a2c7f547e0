pub mod analysis;
pub mod prompts;
pub mod provider;
pub mod providers;

pub use analysis::{strip_code_fence, BomAnalyzer, FileSummary};
pub use provider::{LlmError, LlmProvider, Message, Role};
pub use providers::openrouter::OpenRouterProvider;
