//! Agent 装配
//!
//! 唯一公开入口 create_agent：打开数据库、建嵌入/存储/检查点/LLM 句柄，
//! 追加 manage_memory 工具，绑定提示增强器，返回可调用的 Agent。
//! 必需配置缺失或数据库打不开时装配立即失败——没有持久化就没有可用的降级模式，不重试。

use std::sync::{Arc, Mutex};

use crate::checkpoint::{Checkpointer, SqliteCheckpointer};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::llm::{LlmClient, OpenAiClient, OpenAiEmbedder};
use crate::prompt::PromptAugmenter;
use crate::react::ReactLoop;
use crate::state::StateMessage;
use crate::store::{MemoryStore, SqliteMemoryStore, MEMORY_NAMESPACE};
use crate::tools::{ManageMemoryTool, Tool, ToolRegistry};

/// 可调用的智能体：每次 invoke 处理一条用户输入并持久化对话
pub struct Agent {
    react: ReactLoop,
    checkpointer: Arc<dyn Checkpointer>,
}

impl Agent {
    /// 从已构建的组件装配（测试与自定义后端用；create_agent 是标准入口）
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: ToolRegistry,
        store: Arc<dyn MemoryStore>,
        checkpointer: Arc<dyn Checkpointer>,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            react: ReactLoop::new(llm, tools, PromptAugmenter::new(system_prompt), store),
            checkpointer,
        }
    }

    /// 处理一条用户输入：按 thread_id 载入检查点，跑 ReAct 循环，保存检查点，返回最终回复
    pub async fn invoke(&self, thread_id: &str, input: &str) -> Result<String, AgentError> {
        let mut state = self.checkpointer.load(thread_id)?.unwrap_or_default();
        state.push(StateMessage::user(input));

        let response = self.react.run(&mut state).await?;

        self.checkpointer.save(thread_id, &state)?;
        Ok(response)
    }
}

/// 装配智能体：system_prompt 为 None 时使用内置日程助理人设；
/// extra_tools 之外总会追加 manage_memory（绑定 memories 分区）
pub fn create_agent(
    config: AgentConfig,
    system_prompt: Option<String>,
    extra_tools: Vec<Arc<dyn Tool>>,
) -> Result<Agent, AgentError> {
    let conn = rusqlite::Connection::open(&config.database.path).map_err(|e| {
        AgentError::Config(format!(
            "cannot open database {}: {}",
            config.database.path.display(),
            e
        ))
    })?;
    let conn = Arc::new(Mutex::new(conn));

    // 嵌入凭证缺失不在装配期拦截：请求期失败会走提示增强的降级路径
    let embedding_key = config
        .embedding
        .api_key
        .clone()
        .or_else(|| std::env::var("VOYAGE_API_KEY").ok());
    let embedder = Arc::new(OpenAiEmbedder::new(
        config.embedding.base_url.as_deref(),
        &config.embedding.model,
        embedding_key.as_deref(),
    ));

    let store: Arc<dyn MemoryStore> = Arc::new(SqliteMemoryStore::new(
        conn.clone(),
        &config.database.store_table,
        Some(embedder),
    )?);
    let checkpointer: Arc<dyn Checkpointer> = Arc::new(SqliteCheckpointer::new(
        conn,
        &config.database.checkpoint_table,
    )?);

    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::new(
        config.llm.base_url.as_deref(),
        &config.llm.model,
        config.llm.api_key.as_deref(),
    ));

    let mut tools = ToolRegistry::new();
    for tool in extra_tools {
        tools.register_arc(tool);
    }
    tools.register(ManageMemoryTool::new(store.clone(), MEMORY_NAMESPACE));

    tracing::info!(
        db = %config.database.path.display(),
        model = %config.llm.model,
        tools = tools.len(),
        "creating memory-enhanced agent"
    );

    Ok(Agent::new(llm, tools, store, checkpointer, system_prompt))
}

/// 从环境变量 `NECTAR__*` 读配置并装配（`NECTAR__DATABASE__PATH` 缺失时为致命错误）
pub fn create_agent_from_env(
    system_prompt: Option<String>,
    extra_tools: Vec<Arc<dyn Tool>>,
) -> Result<Agent, AgentError> {
    let config = AgentConfig::from_env()?;
    create_agent(config, system_prompt, extra_tools)
}
