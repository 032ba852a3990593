//! 混沌象棋共享协议库
//!
//! 包含:
//! - 棋局快照 (GameState, MoveOption, GameOutcome)
//! - 棋子与阵营 (Piece, Side)
//! - 请求消息 (MoveRequest, NewGameRequest, BotConfigRequest)
//! - 推送通道的 STOMP 帧编解码
//! - 协议常量与错误类型

mod constants;
mod error;
mod message;
mod piece;
mod state;
mod stomp;

pub use constants::*;
pub use error::{ProtocolError, Result, SnapshotError};
pub use message::{
    ApiEndpoint, BotConfigRequest, ChaosLevel, ErrorBody, MoveRequest, NewGameRequest,
};
pub use piece::{Piece, Side};
pub use state::{
    GameOutcome, GameOutcomeCategory, GameOutcomeState, GameState, MoveOption, SquareIndex,
};
pub use stomp::{StompCommand, StompFrame};
