//! Langflow 流式响应解析器
//!
//! 按行消费上游字节流: 只有 `data: ` 前缀的行参与解析，
//! 前缀之后是一条 JSON 事件负载，从中提取增量文本片段。
//! 单行解析失败只告警跳过，绝不中断整条流。

use serde_json::Value;
use tracing::warn;

use super::events::RelayEvent;
use super::extract::extract_fragment;

/// Langflow 流式响应解析器
///
/// 喂入任意切分的字节块，产出归一化事件。
/// 行边界与 chunk 边界无关，半行内容留在缓冲里等待后续字节。
#[derive(Debug, Default)]
pub struct FlowStreamParser {
    /// 跨 chunk 的未完整行缓冲（字节级，避免切断多字节字符）
    buffer: Vec<u8>,
    /// 累积的完整内容
    full_content: String,
}

impl FlowStreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// 处理一个到达的字节块，返回由此产生的事件
    ///
    /// 每解析出一个片段立即返回给调用方，不做合并或攒批
    pub fn process_chunk(&mut self, chunk: &[u8]) -> Vec<RelayEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line_bytes);
            if let Some(event) = self.process_line(line.trim()) {
                events.push(event);
            }
        }
        events
    }

    /// 流正常结束: 冲刷残留的最后一行，发出唯一的结束事件
    pub fn finish(&mut self) -> Vec<RelayEvent> {
        let mut events = Vec::new();
        if !self.buffer.is_empty() {
            let line_bytes = std::mem::take(&mut self.buffer);
            let line = String::from_utf8_lossy(&line_bytes);
            if let Some(event) = self.process_line(line.trim()) {
                events.push(event);
            }
        }
        events.push(RelayEvent::completed(self.full_content.clone()));
        events
    }

    /// 当前累积的完整内容
    ///
    /// 错误中断时由 pipeline 读取，作为结束事件的部分内容
    pub fn full_content(&self) -> &str {
        &self.full_content
    }

    /// 处理单行
    ///
    /// 空行和无 `data: ` 前缀的行直接忽略
    fn process_line(&mut self, line: &str) -> Option<RelayEvent> {
        if line.is_empty() {
            return None;
        }
        let data = line.strip_prefix("data: ")?;

        let payload: Value = match serde_json::from_str(data) {
            Ok(v) => v,
            Err(e) => {
                warn!("[FLOW_STREAM] 解析 JSON 失败: {} - line: {}", e, data);
                return None;
            }
        };

        let fragment = extract_fragment(&payload)?;
        self.full_content.push_str(fragment);
        Some(RelayEvent::fragment(fragment))
    }
}


// ============================================================================
// 属性测试
// ============================================================================
