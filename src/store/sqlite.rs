//! sqlite 记忆存储
//!
//! 每行一条记忆：namespace + key 为主键，value 为 JSON 文本，embedding 为 f32 LE BLOB。
//! 检索：有嵌入时对分区内全部向量算余弦相似度、降序截断；
//! 空查询或无嵌入提供方时降级为按写入时间倒序（低相关度而非失败）。

use std::sync::{Arc, Mutex};

use rusqlite::Connection;
use serde_json::Value;

use crate::error::StoreError;
use crate::llm::EmbeddingProvider;
use crate::store::record::display_text;
use crate::store::{MemoryRecord, MemoryStore, EMBEDDING_DIMS};

/// sqlite 实现：与检查点共享同一 Connection（外部包 Mutex）
pub struct SqliteMemoryStore {
    conn: Arc<Mutex<Connection>>,
    table: String,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl SqliteMemoryStore {
    /// 建表（不存在时）并返回存储句柄
    pub fn new(
        conn: Arc<Mutex<Connection>>,
        table: &str,
        embedder: Option<Arc<dyn EmbeddingProvider>>,
    ) -> Result<Self, StoreError> {
        {
            let conn = conn.lock().unwrap();
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        namespace TEXT NOT NULL,
                        key TEXT NOT NULL,
                        value TEXT NOT NULL,
                        embedding BLOB,
                        created_at TEXT NOT NULL,
                        PRIMARY KEY (namespace, key)
                    )",
                    table
                ),
                [],
            )?;
        }
        Ok(Self {
            conn,
            table: table.to_string(),
            embedder,
        })
    }

    fn embed(&self, text: &str) -> Result<Option<Vec<f32>>, StoreError> {
        let Some(ref embedder) = self.embedder else {
            return Ok(None);
        };
        let vec = embedder.embed_sync(text).map_err(StoreError::Embedding)?;
        if vec.is_empty() {
            return Ok(None);
        }
        if vec.len() != EMBEDDING_DIMS {
            return Err(StoreError::DimensionMismatch {
                expected: EMBEDDING_DIMS,
                actual: vec.len(),
            });
        }
        Ok(Some(vec))
    }

    /// 按写入时间倒序取最近 limit 条（空查询 / 无嵌入时的降级路径）
    fn search_recent(&self, namespace: &str, limit: usize) -> Result<Vec<MemoryRecord>, StoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT key, value FROM {} WHERE namespace = ?1 ORDER BY created_at DESC LIMIT ?2",
            self.table
        ))?;
        let rows = stmt.query_map(rusqlite::params![namespace, limit as i64], |row| {
            let key: String = row.get(0)?;
            let value: String = row.get(1)?;
            Ok((key, value))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (key, value) = row?;
            let value: Value = serde_json::from_str(&value)?;
            records.push(MemoryRecord::new(key, value, 0.0));
        }
        Ok(records)
    }
}

impl MemoryStore for SqliteMemoryStore {
    fn search(
        &self,
        namespace: &str,
        query: &str,
        limit: usize,
    ) -> Result<Vec<MemoryRecord>, StoreError> {
        let query_embedding = if query.trim().is_empty() {
            None
        } else {
            self.embed(query)?
        };
        let Some(query_embedding) = query_embedding else {
            return self.search_recent(namespace, limit);
        };

        let rows = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare(&format!(
                "SELECT key, value, embedding FROM {} WHERE namespace = ?1",
                self.table
            ))?;
            let mapped = stmt.query_map(rusqlite::params![namespace], |row| {
                let key: String = row.get(0)?;
                let value: String = row.get(1)?;
                let embedding: Option<Vec<u8>> = row.get(2)?;
                Ok((key, value, embedding))
            })?;
            mapped.collect::<Result<Vec<_>, _>>()?
        };

        let mut scored: Vec<MemoryRecord> = Vec::new();
        for (key, value, embedding) in rows {
            let Some(embedding) = embedding else { continue };
            let embedding = blob_to_embedding(&embedding);
            let score = cosine_similarity(&query_embedding, &embedding);
            if score > 0.0 {
                let value: Value = serde_json::from_str(&value)?;
                scored.push(MemoryRecord::new(key, value, score));
            }
        }
        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        let text = display_text(&value);
        let embedding = self.embed(&text)?.map(|v| embedding_to_blob(&v));
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (namespace, key, value, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                self.table
            ),
            rusqlite::params![
                namespace,
                key,
                serde_json::to_string(&value)?,
                embedding,
                chrono::Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("DELETE FROM {} WHERE namespace = ?1 AND key = ?2", self.table),
            rusqlite::params![namespace, key],
        )?;
        Ok(())
    }
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for v in embedding {
        blob.extend_from_slice(&v.to_le_bytes());
    }
    blob
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// 余弦相似度；维度不等或零向量时为 0
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
