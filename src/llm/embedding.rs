//! 嵌入 API：供向量记忆存储使用，调用 OpenAI 兼容的 /embeddings 端点
//!
//! 默认配置指向 VoyageAI（其 /embeddings 与 OpenAI 形状兼容）。
//! 存储层为同步实现（rusqlite），因此 trait 暴露 embed_sync，
//! 内部用 block_in_place 执行 async 调用。

use async_openai::config::OpenAIConfig;
use async_openai::types::embeddings::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_openai::Client;

/// 可从 sync 上下文调用的嵌入提供方
pub trait EmbeddingProvider: Send + Sync {
    /// 将文本编码为向量；空文本返回空向量，失败时返回错误字符串
    fn embed_sync(&self, text: &str) -> Result<Vec<f32>, String>;
}

/// 使用 async-openai 调用 OpenAI 兼容的 embeddings API
pub struct OpenAiEmbedder {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbedder {
    /// api_key 未提供时回退读 OPENAI_API_KEY（与 LLM 客户端一致）
    pub fn new(base_url: Option<&str>, model: &str, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new()
                .with_api_base(url.trim_end_matches('/'))
                .with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    pub async fn embed_async(&self, text: &str) -> Result<Vec<f32>, String> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(vec![]);
        }
        let request = CreateEmbeddingRequestArgs::default()
            .model(&self.model)
            .input(EmbeddingInput::String(text.to_string()))
            .build()
            .map_err(|e| e.to_string())?;
        let response = self
            .client
            .embeddings()
            .create(request)
            .await
            .map_err(|e| e.to_string())?;
        let vec = response
            .data
            .first()
            .map(|e| e.embedding.clone())
            .unwrap_or_default();
        Ok(vec)
    }
}

impl EmbeddingProvider for OpenAiEmbedder {
    /// 须在多线程 tokio 运行时内调用：block_in_place 在 current_thread 运行时会 panic
    fn embed_sync(&self, text: &str) -> Result<Vec<f32>, String> {
        let text = text.to_string();
        let this = self.clone();
        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(this.embed_async(&text))
        })
    }
}

impl Clone for OpenAiEmbedder {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            model: self.model.clone(),
        }
    }
}
