//! 请求消息定义
//!
//! 客户端通过 REST 请求通道发送的所有请求体，以及服务端错误响应体。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::piece::Side;
use crate::state::SquareIndex;

/// REST 接口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiEndpoint {
    /// `GET /api/game/status`
    Status,
    /// `POST /api/game/new`
    NewGame,
    /// `POST /api/game/move`
    Move,
    /// `POST /api/game/config/bot`
    BotConfig,
}

impl ApiEndpoint {
    /// 相对于 API 前缀的路径
    pub fn path(&self) -> &'static str {
        match self {
            ApiEndpoint::Status => "status",
            ApiEndpoint::NewGame => "new",
            ApiEndpoint::Move => "move",
            ApiEndpoint::BotConfig => "config/bot",
        }
    }
}

/// 混沌等级（决定初始布局的随机程度）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ChaosLevel {
    /// 标准布局
    #[default]
    Dull,
    Odd,
    Weird,
}

impl ChaosLevel {
    pub const ALL: [ChaosLevel; 3] = [ChaosLevel::Dull, ChaosLevel::Odd, ChaosLevel::Weird];

    /// 数值等级
    pub fn level(&self) -> i32 {
        match self {
            ChaosLevel::Dull => 0,
            ChaosLevel::Odd => 1,
            ChaosLevel::Weird => 2,
        }
    }

    /// 从数值解析，未知数值回退为 `Dull`（与服务端一致）
    pub fn from_level(level: i32) -> Self {
        Self::ALL
            .into_iter()
            .find(|c| c.level() == level)
            .unwrap_or_default()
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ChaosLevel::Dull => "Conformist Chess",
            ChaosLevel::Odd => "Odd",
            ChaosLevel::Weird => "ChaosChess",
        }
    }
}

/// 新对局请求
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGameRequest {
    pub chaos_level: i32,
}

impl From<ChaosLevel> for NewGameRequest {
    fn from(level: ChaosLevel) -> Self {
        Self {
            chaos_level: level.level(),
        }
    }
}

/// 走棋请求
///
/// `promo_piece_name` 为空时序列化为 `null`，不会省略字段。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveRequest {
    pub from_square_index: SquareIndex,
    pub to_square_index: SquareIndex,
    pub promo_piece_name: Option<String>,
}

impl MoveRequest {
    pub fn new(from: SquareIndex, to: SquareIndex, promo_piece_name: Option<String>) -> Self {
        Self {
            from_square_index: from,
            to_square_index: to,
            promo_piece_name,
        }
    }
}

impl fmt::Display for MoveRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from_square_index, self.to_square_index)?;
        if let Some(name) = &self.promo_piece_name {
            write!(f, " ={}", name)?;
        }
        Ok(())
    }
}

/// 机器人配置请求（完整覆盖，不是增量）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfigRequest {
    pub bot_color_names: Vec<Side>,
}

impl BotConfigRequest {
    pub fn new(sides: impl IntoIterator<Item = Side>) -> Self {
        Self {
            bot_color_names: sides.into_iter().collect(),
        }
    }
}

/// 服务端错误响应体
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_move_request_keeps_null_promo() {
        let json = serde_json::to_value(MoveRequest::new(8, 16, None)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"fromSquareIndex": 8, "toSquareIndex": 16, "promoPieceName": null})
        );
    }

    #[test]
    fn test_bot_config_names() {
        let sides: BTreeSet<Side> = [Side::Black, Side::White].into_iter().collect();
        let json = serde_json::to_value(BotConfigRequest::new(sides)).unwrap();
        assert_eq!(json, serde_json::json!({"botColorNames": ["WHITE", "BLACK"]}));
    }

    #[test]
    fn test_chaos_level_fallback() {
        assert_eq!(ChaosLevel::from_level(2), ChaosLevel::Weird);
        assert_eq!(ChaosLevel::from_level(7), ChaosLevel::Dull);
        let json = serde_json::to_value(NewGameRequest::from(ChaosLevel::Odd)).unwrap();
        assert_eq!(json, serde_json::json!({"chaosLevel": 1}));
    }

    #[test]
    fn test_error_body_without_message() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"status":500,"error":"Internal Server Error"}"#).unwrap();
        assert_eq!(body.message, None);
    }

    #[test]
    fn test_endpoint_paths() {
        assert_eq!(ApiEndpoint::BotConfig.path(), "config/bot");
        assert_eq!(ApiEndpoint::Move.path(), "move");
    }
}
