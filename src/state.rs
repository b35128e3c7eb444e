//! 对话状态
//!
//! Role / ChatMessage 为发给 LLM API 的结构化消息；StateMessage 为对话状态中
//! 容忍的三种等价消息形态（结构化消息 / (role, text) 二元组 / JSON 映射）的带标签联合。
//! 每个变体有各自的取文本分支，用显式模式匹配代替按序探测，消除一条消息同时满足
//! 多种形态时的优先级歧义。状态可整体 serde 序列化，供检查点持久化。

use serde::{Deserialize, Serialize};

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// 结构化消息：role + content
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 对话状态中的单条消息：三种等价形态之一
///
/// untagged 序列化：Chat 为 {"role", "content"} 对象，Pair 为两元素数组，
/// Map 为任意 JSON 映射；反序列化按声明顺序匹配。注意：恰好只含合法
/// role/content 对的 Map 经检查点往返后会归一化为 Chat，且额外键被丢弃；
/// Agent::invoke 写入的状态全部是 Chat，不受影响。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateMessage {
    /// 结构化消息（带 content 字段的对象）
    Chat(ChatMessage),
    /// ("user", "message") 形式的二元组
    Pair(String, String),
    /// 键值映射（含 "content" 键的 JSON 对象）
    Map(serde_json::Value),
}

impl StateMessage {
    pub fn system(content: impl Into<String>) -> Self {
        StateMessage::Chat(ChatMessage::system(content))
    }

    pub fn user(content: impl Into<String>) -> Self {
        StateMessage::Chat(ChatMessage::user(content))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        StateMessage::Chat(ChatMessage::assistant(content))
    }

    /// 提取用于记忆检索的文本：每个变体一个分支；形态不符（如 Map 无 content 键）返回 None
    pub fn query_text(&self) -> Option<&str> {
        match self {
            StateMessage::Chat(m) => Some(m.content.as_str()),
            StateMessage::Pair(_, text) => Some(text.as_str()),
            StateMessage::Map(v) => v.get("content").and_then(|c| c.as_str()),
        }
    }

    /// 转为 LLM API 消息：Pair/Map 的 role 按字符串解析，未知角色按 user 处理
    pub fn to_chat_message(&self) -> ChatMessage {
        match self {
            StateMessage::Chat(m) => m.clone(),
            StateMessage::Pair(role, text) => ChatMessage {
                role: parse_role(role),
                content: text.clone(),
            },
            StateMessage::Map(v) => ChatMessage {
                role: parse_role(v.get("role").and_then(|r| r.as_str()).unwrap_or("user")),
                content: v
                    .get("content")
                    .and_then(|c| c.as_str())
                    .unwrap_or("")
                    .to_string(),
            },
        }
    }
}

fn parse_role(s: &str) -> Role {
    match s {
        "system" => Role::System,
        "assistant" => Role::Assistant,
        _ => Role::User,
    }
}
