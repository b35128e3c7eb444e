//! 模型输出解析：JSON Tool Call 或直接回复
//!
//! 约定格式：{"tool": "manage_memory", "args": {...}}；
//! 从文本中提取 JSON 块（```json 围栏或裸 JSON），tool 非空则为 ToolCall，否则为回复。

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// LLM 返回的 Tool Call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    #[serde(default)]
    pub args: serde_json::Value,
}

/// 解析结果
#[derive(Debug, Clone)]
pub enum LlmOutput {
    /// 直接回复用户
    Response(String),
    /// 需要执行工具
    ToolCall(ToolCall),
}

/// 解析 LLM 输出：若含有效 JSON 且 tool 非空则为 ToolCall，否则为 Response
pub fn parse_llm_output(output: &str) -> Result<LlmOutput, AgentError> {
    let trimmed = output.trim();

    let json_str = if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        rest.find("```")
            .map(|end| rest[..end].trim())
            .unwrap_or(rest.trim())
    } else if let Some(start) = trimmed.find('{') {
        if let Some(end) = trimmed.rfind('}') {
            &trimmed[start..=end]
        } else {
            trimmed
        }
    } else {
        return Ok(LlmOutput::Response(trimmed.to_string()));
    };

    let parsed: ToolCall = serde_json::from_str(json_str)
        .map_err(|e| AgentError::JsonParse(format!("{}: {}", e, json_str)))?;

    if parsed.tool.is_empty() {
        Ok(LlmOutput::Response(trimmed.to_string()))
    } else {
        Ok(LlmOutput::ToolCall(parsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_response() {
        let out = parse_llm_output("Your meeting is at 9am.").unwrap();
        assert!(matches!(out, LlmOutput::Response(s) if s == "Your meeting is at 9am."));
    }

    #[test]
    fn bare_json_is_a_tool_call() {
        let out =
            parse_llm_output(r#"{"tool": "manage_memory", "args": {"content": "x"}}"#).unwrap();
        let LlmOutput::ToolCall(tc) = out else {
            panic!("expected tool call");
        };
        assert_eq!(tc.tool, "manage_memory");
        assert_eq!(tc.args["content"], "x");
    }

    #[test]
    fn fenced_json_is_a_tool_call() {
        let text = "Let me store that.\n```json\n{\"tool\": \"manage_memory\", \"args\": {}}\n```";
        let out = parse_llm_output(text).unwrap();
        assert!(matches!(out, LlmOutput::ToolCall(tc) if tc.tool == "manage_memory"));
    }

    #[test]
    fn invalid_json_is_a_parse_error() {
        let err = parse_llm_output(r#"{"tool": broken"#).unwrap_err();
        assert!(matches!(err, AgentError::JsonParse(_)));
    }

    #[test]
    fn json_without_tool_field_is_a_parse_error() {
        // {"foo": 1} 缺少 tool 字段，serde 解析失败
        assert!(parse_llm_output(r#"{"foo": 1}"#).is_err());
    }
}
