//! sqlite 检查点：thread_id 为主键，状态为 JSON 文本
//!
//! 与记忆存储共享同一数据库文件（外部传入同一 Connection）。

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::checkpoint::Checkpointer;
use crate::error::CheckpointError;
use crate::state::StateMessage;

pub struct SqliteCheckpointer {
    conn: Arc<Mutex<Connection>>,
    table: String,
}

impl SqliteCheckpointer {
    /// 建表（不存在时）并返回检查点句柄
    pub fn new(conn: Arc<Mutex<Connection>>, table: &str) -> Result<Self, CheckpointError> {
        {
            let conn = conn.lock().unwrap();
            conn.execute(
                &format!(
                    "CREATE TABLE IF NOT EXISTS {} (
                        thread_id TEXT PRIMARY KEY,
                        state TEXT NOT NULL,
                        updated_at TEXT NOT NULL
                    )",
                    table
                ),
                [],
            )?;
        }
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }
}

impl Checkpointer for SqliteCheckpointer {
    fn save(&self, thread_id: &str, state: &[StateMessage]) -> Result<(), CheckpointError> {
        let encoded = serde_json::to_string(state)?;
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT OR REPLACE INTO {} (thread_id, state, updated_at) VALUES (?1, ?2, ?3)",
                self.table
            ),
            rusqlite::params![thread_id, encoded, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn load(&self, thread_id: &str) -> Result<Option<Vec<StateMessage>>, CheckpointError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT state FROM {} WHERE thread_id = ?1",
            self.table
        ))?;
        let mut rows = stmt.query(rusqlite::params![thread_id])?;
        let Some(row) = rows.next()? else {
            return Ok(None);
        };
        let encoded: String = row.get(0)?;
        Ok(Some(serde_json::from_str(&encoded)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_checkpointer() -> SqliteCheckpointer {
        let conn = Arc::new(Mutex::new(Connection::open_in_memory().unwrap()));
        SqliteCheckpointer::new(conn, "thread_checkpoints").unwrap()
    }

    #[test]
    fn save_and_load_round_trip() {
        let cp = open_checkpointer();
        let state = vec![
            StateMessage::user("Schedule a meeting tomorrow"),
            StateMessage::assistant("Done."),
        ];
        cp.save("thread-1", &state).unwrap();

        let loaded = cp.load("thread-1").unwrap().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].query_text(), Some("Schedule a meeting tomorrow"));
    }

    #[test]
    fn threads_are_isolated() {
        let cp = open_checkpointer();
        cp.save("a", &[StateMessage::user("hi")]).unwrap();
        assert!(cp.load("b").unwrap().is_none());
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let cp = open_checkpointer();
        cp.save("t", &[StateMessage::user("one")]).unwrap();
        cp.save(
            "t",
            &[StateMessage::user("one"), StateMessage::assistant("two")],
        )
        .unwrap();
        assert_eq!(cp.load("t").unwrap().unwrap().len(), 2);
    }
}
