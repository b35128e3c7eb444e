//! 记忆增强提示构建
//!
//! 取对话状态最新一条消息的文本作检索词，查 memories 分区（最多 5 条），
//! 拼出 Relevant Memories 块并把 system 消息前置到状态之前；输入状态只前置、不修改。
//! 检索/格式化失败属可恢复错误：本函数返回 Err，由调用方（ReAct 循环）
//! 记录日志并用 fallback 降级为仅基础提示，对话继续。

use crate::error::AugmentError;
use crate::state::StateMessage;
use crate::store::{MemoryStore, MEMORY_NAMESPACE};

/// 默认人设：智能手表与日程安排助理
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a specialized assistant for smart watches and \
     calendar scheduling. Use the provided tools to answer questions, retrieve information, or \
     schedule meetings.";

/// 每轮检索的记忆条数上限
pub const MEMORY_SEARCH_LIMIT: usize = 5;

const MEMORY_TOOL_REMINDER: &str = "Remember to use the manage_memory tool to store important \
     information from conversations for future reference.";

/// 提示增强器：持有基础 system 提示，每轮对话重算增强提示（不持久化）
pub struct PromptAugmenter {
    base_prompt: String,
}

impl PromptAugmenter {
    pub fn new(base_prompt: Option<String>) -> Self {
        Self {
            base_prompt: base_prompt.unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }

    pub fn base_prompt(&self) -> &str {
        &self.base_prompt
    }

    /// 构建增强提示：`[system] + state`，输出长度 = 输入长度 + 1
    pub fn augment(
        &self,
        state: &[StateMessage],
        store: &dyn MemoryStore,
    ) -> Result<Vec<StateMessage>, AugmentError> {
        let latest = state.last().ok_or(AugmentError::EmptyState)?;
        // 形态不符时用空串检索：降级为低相关度检索而非失败
        let query = latest.query_text().unwrap_or("");

        let memories = store.search(MEMORY_NAMESPACE, query, MEMORY_SEARCH_LIMIT)?;

        let memory_block = if memories.is_empty() {
            String::new()
        } else {
            let items: Vec<String> = memories
                .iter()
                .map(|m| format!("- {}", m.display_text()))
                .collect();
            format!(
                "\n\n## Relevant Memories\n<memories>\n{}\n</memories>\n",
                items.join("\n")
            )
        };

        let system = format!(
            "{}{}\n\n{}",
            self.base_prompt, memory_block, MEMORY_TOOL_REMINDER
        );

        let mut out = Vec::with_capacity(state.len() + 1);
        out.push(StateMessage::system(system));
        out.extend_from_slice(state);
        Ok(out)
    }

    /// 降级输出：仅基础提示 + 原状态（检索失败时的回退路径）
    pub fn fallback(&self, state: &[StateMessage]) -> Vec<StateMessage> {
        let mut out = Vec::with_capacity(state.len() + 1);
        out.push(StateMessage::system(self.base_prompt.clone()));
        out.extend_from_slice(state);
        out
    }
}
