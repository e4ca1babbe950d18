//! Fact extraction from tool calls and transcripts, plus call classification

pub mod classify;
pub mod tags;
pub mod tool_calls;
pub mod transcript;

pub use classify::{classify, Classification};
pub use tags::build_tags;
pub use tool_calls::{extract_tool_facts, RawToolCall, RawToolResult, ToolCallPairer, ToolInvocation, ToolKind};
