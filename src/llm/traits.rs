//! LLM 客户端抽象
//!
//! 所有后端（OpenAI 兼容 / Mock）实现 LlmClient::complete：
//! 输入整段消息序列，输出一条生成文本。本系统为同步请求/响应式对话，不做流式。

use async_trait::async_trait;

use crate::state::ChatMessage;

/// LLM 客户端 trait：非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 对给定消息序列做一次完成；失败时返回错误字符串
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, String>;
}
