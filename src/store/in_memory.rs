//! 内存记忆存储：关键词重叠检索（无真实向量）
//!
//! 用于测试与未配置嵌入端点的场景；接口行为与 sqlite 实现一致：
//! 空查询或无词可匹配时降级为按写入顺序倒序。

use std::collections::HashSet;
use std::sync::RwLock;

use serde_json::Value;

use crate::error::StoreError;
use crate::store::record::display_text;
use crate::store::{MemoryRecord, MemoryStore};

struct Entry {
    namespace: String,
    key: String,
    value: Value,
    tokens: HashSet<String>,
}

/// 内存实现：(namespace, key) 去重，按词重叠计分
#[derive(Default)]
pub struct InMemoryMemoryStore {
    entries: RwLock<Vec<Entry>>,
}

/// 将文本切分为小写词集合，用于简单相似度（词重叠数）
fn tokenize_lower(s: &str) -> HashSet<String> {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .filter(|w| w.len() > 1)
        .collect()
}

impl InMemoryMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MemoryStore for InMemoryMemoryStore {
    fn search(
        &self,
        namespace: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let entries = self.entries.read().unwrap();
        let query_tokens = tokenize_lower(query);

        if query_tokens.is_empty() {
            // 降级：最近写入优先
            return Ok(entries
                .iter()
                .rev()
                .filter(|e| e.namespace == namespace)
                .take(limit)
                .map(|e| MemoryRecord::new(e.key.clone(), e.value.clone(), 0.0))
                .collect());
        }

        let mut scored: Vec<(usize, MemoryRecord)> = entries
            .iter()
            .filter(|e| e.namespace == namespace)
            .map(|e| {
                let overlap = query_tokens.intersection(&e.tokens).count();
                (
                    overlap,
                    MemoryRecord::new(e.key.clone(), e.value.clone(), overlap as f32),
                )
            })
            .filter(|(overlap, _)| *overlap > 0)
            .collect();
        scored.sort_by(|a, b| b.0.cmp(&a.0));
        Ok(scored.into_iter().take(limit).map(|(_, r)| r).collect())
    }

    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let tokens = tokenize_lower(&display_text(&value));
        let mut entries = self.entries.write().unwrap();
        entries.retain(|e| !(e.namespace == namespace && e.key == key));
        entries.push(Entry {
            namespace: namespace.to_string(),
            key: key.to_string(),
            value,
            tokens,
        });
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().unwrap();
        entries.retain(|e| !(e.namespace == namespace && e.key == key));
        Ok(())
    }
}
