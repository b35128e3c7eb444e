//! ReAct 推理循环：模型生成与工具执行交替，直至产生最终回复

pub mod loop_;
pub mod output;

pub use loop_::{ReactLoop, MAX_REACT_STEPS};
pub use output::{parse_llm_output, LlmOutput, ToolCall};
