//! 混沌象棋客户端
//!
//! 与服务端同步棋局快照，把用户的点击转换为走法请求。
//! 走法合法性与对局结果完全由服务端决定。

pub mod app;
pub mod board;
pub mod error;
pub mod game;
pub mod network;
pub mod settings;
pub mod terminal;

pub use error::{RequestError, SelectionError, TransportError};
