//! 对话检查点：按 thread_id 持久化完整对话状态，支持跨进程续聊

pub mod sqlite;

pub use sqlite::SqliteCheckpointer;

use crate::error::CheckpointError;
use crate::state::StateMessage;

/// 检查点 trait：整段状态快照的保存与读取
pub trait Checkpointer: Send + Sync {
    /// 保存一个线程的完整对话状态（覆盖旧快照）
    fn save(&self, thread_id: &str, state: &[StateMessage]) -> Result<(), CheckpointError>;

    /// 读取一个线程的对话状态；无快照时返回 None
    fn load(&self, thread_id: &str) -> Result<Option<Vec<StateMessage>>, CheckpointError>;
}
