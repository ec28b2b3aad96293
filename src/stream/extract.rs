//! 上游事件负载文本提取
//!
//! Langflow 流事件的负载嵌套较深，且不同版本把文本放在不同位置。
//! 这里按固定优先级依次尝试一组提取策略，任何一层字段缺失或
//! 类型不符都视为"无片段"，绝不视为错误。

use serde_json::Value;

/// 提取策略签名
type ExtractFn = fn(&Value) -> Option<&str>;

/// 策略一: `outputs[0].outputs[0].artifacts.message`
fn artifact_message(payload: &Value) -> Option<&str> {
    payload
        .get("outputs")?
        .get(0)?
        .get("outputs")?
        .get(0)?
        .get("artifacts")?
        .get("message")?
        .as_str()
        .filter(|s| !s.is_empty())
}

/// 策略二: `outputs[0].outputs[0].results.message.text`
fn result_message_text(payload: &Value) -> Option<&str> {
    payload
        .get("outputs")?
        .get(0)?
        .get("outputs")?
        .get(0)?
        .get("results")?
        .get("message")?
        .get("text")?
        .as_str()
        .filter(|s| !s.is_empty())
}

/// 按优先级排列的提取策略
///
/// 顺序是对齐线上 Langflow 行为的契约:
/// artifacts.message 优先于 results.message.text
const EXTRACTORS: &[ExtractFn] = &[artifact_message, result_message_text];

/// 从一条上游事件负载中提取文本片段
///
/// 所有策略都未命中时返回 `None`，调用方静默跳过该事件
pub fn extract_fragment(payload: &Value) -> Option<&str> {
    EXTRACTORS.iter().find_map(|extract| extract(payload))
}
