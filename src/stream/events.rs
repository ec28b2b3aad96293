//! 归一化流事件类型
//!
//! 定义中继输出给前端的事件联合类型，
//! 用于解耦上游流解析 (parser) 和 HTTP 响应层 (server)。
//!
//! # 设计原则
//!
//! - Parser / Pipeline 输出 `RelayEvent`
//! - Server 层将 `RelayEvent` 编码为 `<json>\n\n` 输出单元
//! - 线上格式只有三种形状:
//!   `{"content":...}` / `{"complete":true,"content":...}` / `{"error":...}`

use serde::{Deserialize, Serialize};

/// 归一化流事件
///
/// 一条流由零个或多个 `Fragment`、可选的 `Error`、
/// 以及恰好一个终止的 `Completed` 组成。
///
/// `#[serde(untagged)]` 保证序列化结果就是裸字段对象，
/// 不携带变体标签。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelayEvent {
    /// 流错误事件
    ///
    /// 上游调用失败或传输中断时在流内发出，
    /// 之后仍会跟随终止的 `Completed`
    Error {
        /// 错误描述
        error: String,
    },

    /// 流结束事件
    ///
    /// 每条流恰好发出一次，`content` 为此前所有片段的完整拼接
    Completed {
        /// 恒为 true
        complete: bool,
        /// 累计的完整文本
        content: String,
    },

    /// 增量文本片段
    ///
    /// 从上游事件中提取出的一段文本，到达即发出
    Fragment {
        /// 片段文本
        content: String,
    },
}

impl RelayEvent {
    /// 创建片段事件
    pub fn fragment(content: impl Into<String>) -> Self {
        Self::Fragment {
            content: content.into(),
        }
    }

    /// 创建结束事件
    pub fn completed(content: impl Into<String>) -> Self {
        Self::Completed {
            complete: true,
            content: content.into(),
        }
    }

    /// 创建错误事件
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// 编码为输出单元: 一个 JSON 对象后跟空行分隔符
    ///
    /// 注意输出不带 `data: ` 前缀，前端按空行切分后直接 parse
    pub fn to_wire(&self) -> String {
        let json = serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"error":"event serialization failed"}"#.to_string());
        format!("{}\n\n", json)
    }
}
