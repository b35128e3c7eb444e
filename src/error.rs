//! 错误类型
//!
//! 两层错误设计：装配期缺少必需配置（数据库路径）为致命错误，立即失败、不重试；
//! 提示增强期的检索/格式化错误为可恢复错误（AugmentError），
//! 由调用方（ReAct 循环）决定记录日志并降级为基础提示。

use thiserror::Error;

/// Agent 装配与运行期错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// 必需配置缺失或数据库无法打开：没有持久化就没有可用的降级模式，装配期直接失败
    #[error("Config error: {0}")]
    Config(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    /// 单轮对话内 ReAct 步数达到上限，防止死循环
    #[error("Max react steps reached ({0})")]
    MaxStepsReached(usize),
}

impl From<config::ConfigError> for AgentError {
    fn from(e: config::ConfigError) -> Self {
        AgentError::Config(e.to_string())
    }
}

/// 记忆存储错误（检索、写入、嵌入）
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Embedding failed: {0}")]
    Embedding(String),

    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// 对话检查点错误
#[derive(Error, Debug)]
pub enum CheckpointError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for CheckpointError {
    fn from(e: rusqlite::Error) -> Self {
        CheckpointError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for CheckpointError {
    fn from(e: serde_json::Error) -> Self {
        CheckpointError::Serialization(e.to_string())
    }
}

/// 提示增强期可恢复错误：不向上传播，由 ReAct 循环降级处理
#[derive(Error, Debug)]
pub enum AugmentError {
    /// 对话状态为空，取不到最新消息
    #[error("Conversation state is empty")]
    EmptyState,

    #[error("Memory search failed: {0}")]
    Search(#[from] StoreError),
}
