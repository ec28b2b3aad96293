//! 流翻译管道
//!
//! 把上游的原始字节流翻译成归一化事件流：
//! 字节块 → 行切分 → 片段提取 → `RelayEvent`。
//!
//! 传输错误和读取超时都转换为流内的 `Error` 事件，
//! 之后发出携带已累积内容的终止 `Completed`，
//! 保证每条流在任何路径上都恰好结束一次。

use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::error;

use super::events::RelayEvent;
use super::parser::FlowStreamParser;

/// 单次读取的空闲超时
///
/// 上游停摆时不能让一条流永远挂着，超时后走错误结束路径
pub const STREAM_IDLE_TIMEOUT: Duration = Duration::from_secs(300);

/// 将上游字节流翻译为归一化事件流
///
/// 每个片段在解析出来的瞬间就被 yield，不做攒批。
/// 调用方 drop 返回的流即可中止读取，上游连接随之释放。
pub fn translate_byte_stream<S, E>(
    byte_stream: S,
    idle_timeout: Duration,
) -> impl Stream<Item = RelayEvent>
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    async_stream::stream! {
        let mut parser = FlowStreamParser::new();
        let mut byte_stream = std::pin::pin!(byte_stream);

        loop {
            match tokio::time::timeout(idle_timeout, byte_stream.next()).await {
                Ok(Some(Ok(bytes))) => {
                    for event in parser.process_chunk(&bytes) {
                        yield event;
                    }
                }
                Ok(Some(Err(e))) => {
                    error!("[FLOW_STREAM] 读取上游流失败: {}", e);
                    yield RelayEvent::error(format!("stream read failed: {}", e));
                    yield RelayEvent::completed(parser.full_content());
                    return;
                }
                Ok(None) => break,
                Err(_) => {
                    error!("[FLOW_STREAM] 读取上游流超时 ({}s)", idle_timeout.as_secs());
                    yield RelayEvent::error("upstream read timed out");
                    yield RelayEvent::completed(parser.full_content());
                    return;
                }
            }
        }

        for event in parser.finish() {
            yield event;
        }
    }
}
