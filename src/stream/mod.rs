//! 流翻译层
//!
//! 把 Langflow 的流式响应翻译为发给前端的归一化事件流：
//! - 事件类型定义 (events)
//! - 负载文本提取 (extract)
//! - 行级解析与内容累积 (parser)
//! - 字节流到事件流的异步管道 (pipeline)
//!
//! # 架构设计
//!
//! ```text
//! 上游字节流 ──> [FlowStreamParser] ──> RelayEvent ──> to_wire() ──> 前端输出单元
//! ```
//!
//! 输出单元是裸 JSON 对象加一个空行分隔符，不带 `data: ` 前缀；
//! 前缀解析只发生在消费上游的一侧。

pub mod events;
pub mod extract;
pub mod parser;
pub mod pipeline;

// 重新导出核心类型
pub use events::RelayEvent;
pub use extract::extract_fragment;
pub use parser::FlowStreamParser;
pub use pipeline::{translate_byte_stream, STREAM_IDLE_TIMEOUT};
