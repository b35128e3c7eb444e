//! 工具：Tool trait、注册表与 manage_memory
//!
//! 调用方可传入自定义工具；装配器总会追加 manage_memory（预先绑定 memories 分区），
//! 记忆写入只经由该工具，提示增强器只读。

pub mod manage_memory;
pub mod registry;

pub use manage_memory::ManageMemoryTool;
pub use registry::{Tool, ToolRegistry};
