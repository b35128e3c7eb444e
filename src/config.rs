//! 应用配置：从环境变量 `NECTAR__*` 加载（双下划线表示嵌套，如 `NECTAR__DATABASE__PATH`）
//!
//! 设计为显式配置结构体传入装配器，默认值全部集中在本文件，不在别处读全局状态。
//! database.path 为必填项：没有持久化就没有可用的降级模式，缺失时加载即报错。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    pub database: DatabaseSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub embedding: EmbeddingSection,
}

/// [database] 段：sqlite 文件路径与两张表名（记忆存储 + 对话检查点共用一个文件）
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    /// sqlite 数据库文件路径（必填，缺失为装配期致命错误）
    pub path: PathBuf,
    #[serde(default = "default_store_table")]
    pub store_table: String,
    #[serde(default = "default_checkpoint_table")]
    pub checkpoint_table: String,
}

fn default_store_table() -> String {
    "memory_store".to_string()
}

fn default_checkpoint_table() -> String {
    "thread_checkpoints".to_string()
}

/// [llm] 段：OpenAI 兼容端点与模型；解码参数固定为确定性采样（temperature 0，
/// 不设 token 上限与超时覆盖，沿用客户端默认值）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    /// OpenAI 兼容端点；默认指向 Gemini 的兼容层
    pub base_url: Option<String>,
    /// 未设置时客户端回退读 OPENAI_API_KEY
    pub api_key: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".to_string(),
            base_url: Some(
                "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            ),
            api_key: None,
        }
    }
}

/// [embedding] 段：OpenAI 兼容 /embeddings 端点与模型；向量维度固定为
/// [`crate::store::EMBEDDING_DIMS`]，与记忆存储的相似度索引一致
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmbeddingSection {
    pub model: String,
    pub base_url: Option<String>,
    /// 未设置时装配器回退读 VOYAGE_API_KEY
    pub api_key: Option<String>,
}

impl Default for EmbeddingSection {
    fn default() -> Self {
        Self {
            model: "voyage-3.5".to_string(),
            base_url: Some("https://api.voyageai.com/v1".to_string()),
            api_key: None,
        }
    }
}

impl AgentConfig {
    /// 从环境变量 `NECTAR__*` 加载；`NECTAR__DATABASE__PATH` 缺失时返回错误
    pub fn from_env() -> Result<AgentConfig, config::ConfigError> {
        let c = config::Config::builder()
            .add_source(
                config::Environment::with_prefix("NECTAR")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        c.try_deserialize()
    }

    /// 用默认的 LLM/嵌入配置与指定数据库路径构造（测试与嵌入式调用方便用）
    pub fn with_database(path: impl Into<PathBuf>) -> Self {
        Self {
            database: DatabaseSection {
                path: path.into(),
                store_table: default_store_table(),
                checkpoint_table: default_checkpoint_table(),
            },
            llm: LlmSection::default(),
            embedding: EmbeddingSection::default(),
        }
    }
}
