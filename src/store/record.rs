//! 记忆记录与展示文本提取

use serde_json::Value;

/// 一条检索到的记忆：键、JSON 值、相关度分数
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub key: String,
    pub value: Value,
    pub score: f32,
}

impl MemoryRecord {
    pub fn new(key: impl Into<String>, value: Value, score: f32) -> Self {
        Self {
            key: key.into(),
            value,
            score,
        }
    }

    /// 提取用于展示（与嵌入）的文本
    pub fn display_text(&self) -> String {
        display_text(&self.value)
    }
}

/// 固定优先级的展示文本提取：结构化 text 字段 → 原始 JSON 值 → 字符串强转。
/// 该顺序决定最终呈现给模型的文本，保持不变。
pub fn display_text(value: &Value) -> String {
    if let Some(text) = value.get("text").and_then(|t| t.as_str()) {
        return text.to_string();
    }
    match value {
        Value::Object(_) | Value::Array(_) => value.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn structured_text_field_wins() {
        let record = MemoryRecord::new("k1", json!({"text": "Prefers mornings", "tag": "x"}), 0.9);
        assert_eq!(record.display_text(), "Prefers mornings");
    }

    #[test]
    fn mapping_without_text_renders_as_json() {
        let record = MemoryRecord::new("k2", json!({"city": "Tokyo"}), 0.5);
        assert_eq!(record.display_text(), r#"{"city":"Tokyo"}"#);
    }

    #[test]
    fn bare_string_passes_through() {
        let record = MemoryRecord::new("k3", json!("plain fact"), 0.5);
        assert_eq!(record.display_text(), "plain fact");
    }

    #[test]
    fn scalar_coerces_to_string() {
        let record = MemoryRecord::new("k4", json!(42), 0.5);
        assert_eq!(record.display_text(), "42");
    }

    #[test]
    fn non_string_text_field_falls_through_to_json() {
        // text 键存在但不是字符串时不算结构化字段，按原始 JSON 值处理
        let record = MemoryRecord::new("k5", json!({"text": 7}), 0.5);
        assert_eq!(record.display_text(), r#"{"text":7}"#);
    }
}
