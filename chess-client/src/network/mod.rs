//! 网络通信模块
//!
//! - `push`: WebSocket + STOMP 推送通道，接收棋局快照
//! - `api`: REST 请求通道
//! - `dispatcher`: 写请求的异步分发与失败回报
//! - `reconnect`: 推送通道重连策略

mod api;
mod dispatcher;
mod push;
mod reconnect;

pub use api::*;
pub use dispatcher::*;
pub use push::*;
pub use reconnect::*;

#[cfg(test)]
pub(crate) use dispatcher::tests::FakeApi;

use std::fmt;

use protocol::GameState;

/// 推送通道连接状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// 首次连接中
    #[default]
    Connecting,
    /// 已订阅快照主题
    Connected,
    /// 第 attempt 次重连
    Reconnecting { attempt: u32 },
    /// 已放弃重连
    Disconnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Connecting => f.write_str("connecting"),
            ConnectionStatus::Connected => f.write_str("connected"),
            ConnectionStatus::Reconnecting { attempt } => write!(f, "reconnecting (attempt {})", attempt),
            ConnectionStatus::Disconnected => f.write_str("disconnected"),
        }
    }
}

/// 推送通道产生的事件
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// 收到新快照
    Snapshot(GameState),
    /// 连接状态变化
    Status(ConnectionStatus),
}
