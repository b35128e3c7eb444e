//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按脚本顺序返回预置回复（可驱动工具调用再最终回复的完整 ReAct 流程），
//! 并记录每次收到的完整消息序列，供测试断言 system 消息内容。
//! 脚本耗尽时回显最后一条 User 消息。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::state::{ChatMessage, Role};

/// Mock 客户端：脚本化回复 + 请求记录
#[derive(Debug, Default)]
pub struct MockLlmClient {
    scripts: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockLlmClient {
    pub fn new(scripts: Vec<impl Into<String>>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 追加一条脚本回复
    pub fn push_script(&self, script: impl Into<String>) {
        self.scripts.lock().unwrap().push_back(script.into());
    }

    /// 已收到的所有请求（每个请求为一段完整消息序列）
    pub fn requests(&self) -> Vec<Vec<ChatMessage>> {
        self.requests.lock().unwrap().clone()
    }

    /// 最后一次请求的 system 消息内容（无则为空串）
    pub fn last_system_content(&self) -> String {
        self.requests
            .lock()
            .unwrap()
            .last()
            .and_then(|msgs| msgs.iter().find(|m| m.role == Role::System))
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, String> {
        self.requests.lock().unwrap().push(messages.to_vec());

        if let Some(script) = self.scripts.lock().unwrap().pop_front() {
            return Ok(script);
        }

        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");
        Ok(format!("Echo from Mock: {}", last_user))
    }
}
