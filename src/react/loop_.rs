//! ReAct 主循环
//!
//! 每步：记忆增强提示 -> LLM 完成 -> 解析输出；ToolCall 则执行并把观察写回状态，
//! Response 则追加 assistant 消息并返回；最大步数限制防止死循环。
//! 提示增强失败的降级策略放在这里（调用方侧）：记录警告并改用基础提示，对话继续。

use std::sync::Arc;

use crate::error::AgentError;
use crate::llm::LlmClient;
use crate::prompt::PromptAugmenter;
use crate::react::{parse_llm_output, LlmOutput};
use crate::state::{ChatMessage, StateMessage};
use crate::store::MemoryStore;
use crate::tools::ToolRegistry;

/// 单次对话内最大 ReAct 步数
pub const MAX_REACT_STEPS: usize = 10;

/// ReAct 循环：LLM、工具、提示增强器与记忆存储的组合
pub struct ReactLoop {
    llm: Arc<dyn LlmClient>,
    tools: ToolRegistry,
    augmenter: PromptAugmenter,
    store: Arc<dyn MemoryStore>,
}

impl ReactLoop {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        augmenter: PromptAugmenter,
        store: Arc<dyn MemoryStore>,
    ) -> Self {
        Self {
            llm,
            tools,
            augmenter,
            store,
        }
    }

    /// 执行一轮对话：state 末尾已是最新用户消息；最终回复同时追加为 assistant 消息
    pub async fn run(&self, state: &mut Vec<StateMessage>) -> Result<String, AgentError> {
        let mut step = 0;

        loop {
            if step >= MAX_REACT_STEPS {
                return Err(AgentError::MaxStepsReached(MAX_REACT_STEPS));
            }

            // 每轮重算增强提示；检索失败属可恢复：记警告并降级为基础提示
            let prompt = match self.augmenter.augment(state, self.store.as_ref()) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(error = %e, "memory injection failed, falling back to base prompt");
                    self.augmenter.fallback(state)
                }
            };

            let mut messages: Vec<ChatMessage> =
                prompt.iter().map(|m| m.to_chat_message()).collect();
            if let Some(first) = messages.first_mut() {
                first.content.push_str(&self.tools_section());
            }

            let output = self
                .llm
                .complete(&messages)
                .await
                .map_err(AgentError::Llm)?;

            match parse_llm_output(&output) {
                Ok(LlmOutput::Response(resp)) => {
                    state.push(StateMessage::assistant(resp.clone()));
                    return Ok(resp);
                }
                Ok(LlmOutput::ToolCall(tc)) => {
                    tracing::debug!(tool = %tc.tool, "executing tool call");
                    let observation = match self.tools.execute(&tc.tool, tc.args.clone()).await {
                        Ok(r) => r,
                        // 工具失败写回错误观察，交给下一轮模型处理
                        Err(e) => format!("Error: {}", e),
                    };
                    state.push(StateMessage::assistant(format!(
                        "Tool call: {} | Result: {}",
                        tc.tool, observation
                    )));
                    state.push(StateMessage::user(format!(
                        "Observation from {}: {}",
                        tc.tool, observation
                    )));
                }
                Err(e) => {
                    // 解析失败：提示模型重试
                    state.push(StateMessage::user(format!(
                        "Your last output could not be parsed ({}). Reply with one valid \
                         tool-call JSON object or a plain-text answer.",
                        e
                    )));
                }
            }

            step += 1;
        }
    }

    /// Available Tools 段落：追加到 system 消息末尾；无注册工具时为空
    fn tools_section(&self) -> String {
        if self.tools.is_empty() {
            return String::new();
        }
        format!(
            "\n\n## Available Tools\n{}\n\nTo call a tool, respond with exactly one JSON object: \
             {{\"tool\": \"<name>\", \"args\": {{...}}}}. Otherwise respond with the final answer \
             in plain text.",
            self.tools.to_schema_json()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::store::{InMemoryMemoryStore, MemoryStore, MEMORY_NAMESPACE};
    use crate::tools::ManageMemoryTool;
    use serde_json::json;

    fn build_loop(scripts: Vec<&str>, store: Arc<InMemoryMemoryStore>) -> (ReactLoop, Arc<MockLlmClient>) {
        let llm = Arc::new(MockLlmClient::new(scripts));
        let mut tools = ToolRegistry::new();
        tools.register(ManageMemoryTool::new(store.clone(), MEMORY_NAMESPACE));
        let loop_ = ReactLoop::new(
            llm.clone(),
            tools,
            PromptAugmenter::new(None),
            store,
        );
        (loop_, llm)
    }

    #[tokio::test]
    async fn plain_response_ends_the_turn() {
        let store = Arc::new(InMemoryMemoryStore::new());
        let (loop_, llm) = build_loop(vec!["Your meeting is at 9am."], store);

        let mut state = vec![StateMessage::user("When is my meeting?")];
        let resp = loop_.run(&mut state).await.unwrap();

        assert_eq!(resp, "Your meeting is at 9am.");
        assert_eq!(state.len(), 2);
        // system 消息含人设与工具段落
        let system = llm.last_system_content();
        assert!(system.contains("smart watches"));
        assert!(system.contains("## Available Tools"));
        assert!(system.contains("manage_memory"));
    }

    #[tokio::test]
    async fn tool_call_then_final_response() {
        let store = Arc::new(InMemoryMemoryStore::new());
        let (loop_, _) = build_loop(
            vec![
                r#"{"tool": "manage_memory", "args": {"content": "Prefers mornings"}}"#,
                "Noted, I'll remember that.",
            ],
            store.clone(),
        );

        let mut state = vec![StateMessage::user("Remember that I prefer mornings")];
        let resp = loop_.run(&mut state).await.unwrap();

        assert_eq!(resp, "Noted, I'll remember that.");
        // 工具已写入记忆
        let hits = store.search(MEMORY_NAMESPACE, "mornings", 5).unwrap();
        assert_eq!(hits.len(), 1);
        // 状态含 user + tool call + observation + assistant
        assert_eq!(state.len(), 4);
    }

    #[tokio::test]
    async fn second_turn_sees_injected_memory() {
        let store = Arc::new(InMemoryMemoryStore::new());
        store
            .put(MEMORY_NAMESPACE, "m", json!({"text": "Prefers mornings"}))
            .unwrap();
        let (loop_, llm) = build_loop(vec!["Morning it is."], store);

        let mut state = vec![StateMessage::user("Schedule a meeting, mornings preferred")];
        loop_.run(&mut state).await.unwrap();

        let system = llm.last_system_content();
        assert!(system.contains("## Relevant Memories"));
        assert!(system.contains("- Prefers mornings"));
    }

    #[tokio::test]
    async fn unknown_tool_is_observed_not_fatal() {
        let store = Arc::new(InMemoryMemoryStore::new());
        let (loop_, _) = build_loop(
            vec![
                r#"{"tool": "teleport", "args": {}}"#,
                "Sorry, I can't do that.",
            ],
            store,
        );

        let mut state = vec![StateMessage::user("Teleport me")];
        let resp = loop_.run(&mut state).await.unwrap();
        assert_eq!(resp, "Sorry, I can't do that.");
        // 未知工具的错误作为观察写回
        assert!(state
            .iter()
            .any(|m| m.query_text().unwrap_or("").contains("Unknown tool")));
    }

    #[tokio::test]
    async fn store_failure_degrades_to_base_prompt() {
        struct FailingStore;
        impl MemoryStore for FailingStore {
            fn search(
                &self,
                _namespace: &str,
                _query: &str,
                _limit: usize,
            ) -> Result<Vec<crate::store::MemoryRecord>, crate::error::StoreError> {
                Err(crate::error::StoreError::Database(
                    "connection refused".to_string(),
                ))
            }
            fn put(
                &self,
                _namespace: &str,
                _key: &str,
                _value: serde_json::Value,
            ) -> Result<(), crate::error::StoreError> {
                Err(crate::error::StoreError::Database(
                    "connection refused".to_string(),
                ))
            }
            fn delete(
                &self,
                _namespace: &str,
                _key: &str,
            ) -> Result<(), crate::error::StoreError> {
                Err(crate::error::StoreError::Database(
                    "connection refused".to_string(),
                ))
            }
        }

        let llm = Arc::new(MockLlmClient::new(vec!["Your meeting is at 9am."]));
        let loop_ = ReactLoop::new(
            llm.clone(),
            ToolRegistry::new(),
            PromptAugmenter::new(None),
            Arc::new(FailingStore),
        );

        // 检索失败不上抛：本轮正常完成，提示降级为纯基础人设
        let mut state = vec![StateMessage::user("When is my meeting?")];
        let resp = loop_.run(&mut state).await.unwrap();
        assert_eq!(resp, "Your meeting is at 9am.");

        let system = llm.last_system_content();
        assert!(system.contains("smart watches"));
        assert!(!system.contains("## Relevant Memories"));
        // 降级提示仍保持 [system] + 原状态 的结构
        let requests = llm.requests();
        let first = requests.first().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].content, "When is my meeting?");
    }

    #[tokio::test]
    async fn runaway_tool_calls_hit_the_step_limit() {
        let store = Arc::new(InMemoryMemoryStore::new());
        let scripts =
            vec![r#"{"tool": "manage_memory", "args": {"content": "again"}}"#; MAX_REACT_STEPS + 1];
        let (loop_, _) = build_loop(scripts, store);

        let mut state = vec![StateMessage::user("loop forever")];
        let err = loop_.run(&mut state).await.unwrap_err();
        assert!(matches!(err, AgentError::MaxStepsReached(_)));
    }
}
