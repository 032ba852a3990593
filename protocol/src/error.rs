//! 错误类型定义

use thiserror::Error;

/// 快照不变量错误
///
/// 服务端推送的快照必须满足 `pieceGrid.len() == width * height`，
/// 且所有走法的起止格都在棋盘范围内。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    /// 棋盘尺寸为零
    #[error("Empty board: {width}x{height}")]
    EmptyBoard { width: usize, height: usize },

    /// 尺寸乘积溢出
    #[error("Board too large: {width}x{height}")]
    BoardTooLarge { width: usize, height: usize },

    /// 格子数量与尺寸不符
    #[error("Piece grid has {actual} squares, expected {expected}")]
    GridSizeMismatch { expected: usize, actual: usize },

    /// 走法格子越界
    #[error("Move option {from} -> {to} is outside a board of {squares} squares")]
    MoveIndexOutOfRange { from: usize, to: usize, squares: usize },
}

/// 协议错误类型
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// JSON 序列化错误
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// STOMP 帧格式错误
    #[error("Malformed STOMP frame: {reason}")]
    Stomp { reason: String },

    /// 未知阵营名称
    #[error("Unknown side: {0}")]
    UnknownSide(String),

    /// 快照不合法
    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl ProtocolError {
    pub(crate) fn stomp(reason: impl Into<String>) -> Self {
        ProtocolError::Stomp {
            reason: reason.into(),
        }
    }
}

/// 协议操作结果类型
pub type Result<T> = std::result::Result<T, ProtocolError>;
