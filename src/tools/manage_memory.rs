//! manage_memory 工具：模型写入长期记忆的唯一通道
//!
//! 预先绑定记忆分区；支持 create / update / delete。
//! create 生成 uuid 键，update/delete 需要显式 id。

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::store::MemoryStore;
use crate::tools::Tool;

/// manage_memory 工具：对固定分区做增删改
pub struct ManageMemoryTool {
    store: Arc<dyn MemoryStore>,
    namespace: String,
}

impl ManageMemoryTool {
    pub fn new(store: Arc<dyn MemoryStore>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }
}

#[async_trait]
impl Tool for ManageMemoryTool {
    fn name(&self) -> &str {
        "manage_memory"
    }

    fn description(&self) -> &str {
        "Store, update, or delete a long-term memory about the user. \
         Args: {\"action\": \"create|update|delete\", \"content\": \"fact to remember\", \
         \"id\": \"memory id (update/delete only)\"}"
    }

    fn parameters_schema(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["create", "update", "delete"],
                    "default": "create"
                },
                "content": { "type": "string" },
                "id": { "type": "string" }
            },
            "required": []
        })
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let action = args
            .get("action")
            .and_then(|v| v.as_str())
            .unwrap_or("create");

        match action {
            "create" => {
                let content = require_str(&args, "content")?;
                let key = uuid::Uuid::new_v4().to_string();
                self.store
                    .put(&self.namespace, &key, serde_json::json!({ "text": content }))
                    .map_err(|e| e.to_string())?;
                Ok(format!("created memory {key}"))
            }
            "update" => {
                let id = require_str(&args, "id")?;
                let content = require_str(&args, "content")?;
                self.store
                    .put(&self.namespace, id, serde_json::json!({ "text": content }))
                    .map_err(|e| e.to_string())?;
                Ok(format!("updated memory {id}"))
            }
            "delete" => {
                let id = require_str(&args, "id")?;
                self.store
                    .delete(&self.namespace, id)
                    .map_err(|e| e.to_string())?;
                Ok(format!("deleted memory {id}"))
            }
            other => Err(format!("Unknown action: {other}")),
        }
    }
}

fn require_str<'a>(args: &'a Value, field: &str) -> Result<&'a str, String> {
    args.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("Missing required field: {field}"))
}
