//! LLM 层：客户端抽象与实现（OpenAI 兼容 / Mock）与嵌入

pub mod embedding;
pub mod mock;
pub mod openai;
pub mod traits;

pub use embedding::{EmbeddingProvider, OpenAiEmbedder};
pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
pub use traits::LlmClient;
