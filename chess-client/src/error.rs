//! 客户端错误类型

use thiserror::Error;
use tokio_tungstenite::tungstenite;

use protocol::ProtocolError;

/// REST 请求错误
#[derive(Error, Debug)]
pub enum RequestError {
    /// 网络层错误（连接失败、超时等）
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// 服务端拒绝请求
    #[error("HTTP Error {status}: {message}")]
    Server { status: u16, message: String },

    /// 响应体无法解析
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// 推送通道错误
#[derive(Error, Debug)]
pub enum TransportError {
    /// WebSocket 错误
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// 协议错误
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 服务器地址无效
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// STOMP 握手被拒绝
    #[error("STOMP handshake rejected: {0}")]
    HandshakeRejected(String),

    /// 连接超时
    #[error("Connection timeout")]
    ConnectTimeout,

    /// 连接已关闭
    #[error("Connection closed")]
    ConnectionClosed,
}

/// 选择状态机错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// 当前没有等待升变的走法
    #[error("No promotion is pending")]
    NoPendingPromotion,

    /// 升变选项不在快照提供的列表中
    #[error("Promotion option {name} is not offered (offered: {offered:?})")]
    UnknownPromotionOption { name: String, offered: Vec<String> },
}
