//! Nectar - 记忆增强日程助理智能体
//!
//! 模块划分：
//! - **agent**: 装配器与可调用 Agent（唯一公开入口 create_agent）
//! - **checkpoint**: 按 thread_id 持久化对话检查点（sqlite）
//! - **config**: 显式配置结构（`NECTAR__*` 环境变量加载，数据库路径必填）
//! - **error**: 两层错误：装配期致命 / 提示增强期可恢复
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）与嵌入
//! - **prompt**: 记忆增强提示构建（检索 memories 分区并前置 system 消息）
//! - **react**: ReAct 循环与模型输出解析
//! - **state**: 对话状态（三种消息形态的带标签联合）
//! - **store**: 向量记忆存储（sqlite / 内存）
//! - **tools**: Tool trait、注册表与 manage_memory

pub mod agent;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod llm;
pub mod observability;
pub mod prompt;
pub mod react;
pub mod state;
pub mod store;
pub mod tools;

pub use agent::{create_agent, create_agent_from_env, Agent};
pub use config::AgentConfig;
pub use error::{AgentError, AugmentError, CheckpointError, StoreError};
pub use prompt::{PromptAugmenter, DEFAULT_SYSTEM_PROMPT, MEMORY_SEARCH_LIMIT};
pub use state::{ChatMessage, Role, StateMessage};
pub use store::{MemoryRecord, MemoryStore, EMBEDDING_DIMS, MEMORY_NAMESPACE};
