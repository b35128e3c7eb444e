//! 记忆存储：按命名分区（namespace）隔离的向量检索与写入
//!
//! search 返回按相关度降序的记忆记录；写入只经 manage_memory 工具，
//! 提示增强器只读。实现：SqliteMemoryStore（持久化 + 余弦相似度）、
//! InMemoryMemoryStore（关键词重叠，测试与无嵌入场景用）。

pub mod in_memory;
pub mod record;
pub mod sqlite;

pub use in_memory::InMemoryMemoryStore;
pub use record::MemoryRecord;
pub use sqlite::SqliteMemoryStore;

use crate::error::StoreError;

/// 记忆向量的固定维度（与嵌入模型的输出一致；存储层校验不匹配的写入）
pub const EMBEDDING_DIMS: usize = 1024;

/// 记忆分区名：提示增强器与 manage_memory 工具共用
pub const MEMORY_NAMESPACE: &str = "memories";

/// 记忆存储 trait
pub trait MemoryStore: Send + Sync {
    /// 在指定分区按相似度检索，最多返回 limit 条（按相关度降序）。
    /// 空查询降级为按写入时间倒序的无筛选检索，而非报错。
    fn search(
        &self,
        namespace: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError>;

    /// 写入或覆盖一条记忆（key 相同即覆盖）
    fn put(&self, namespace: &str, key: &str, value: serde_json::Value)
        -> Result<(), StoreError>;

    /// 删除一条记忆；不存在时为空操作
    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError>;
}
