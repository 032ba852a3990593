//! 棋局快照定义
//!
//! 服务端每次状态变化都会推送一份完整的 [`GameState`]，
//! 客户端整体替换，从不做增量合并。

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SnapshotError};
use crate::piece::{Piece, Side};

/// 格子下标（按 `pieceGrid` 线性排列）
pub type SquareIndex = usize;

/// 伪合法走法
///
/// 所有字段都由服务端给出，客户端从不推导或重新计算。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveOption {
    pub from_square_index: SquareIndex,
    pub to_square_index: SquareIndex,
    /// 走完后需要选择升变棋子
    pub is_promo: bool,
    /// 伪合法走法可能不合法（例如送将）
    pub is_legal: bool,
}

/// 对局结果状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameOutcomeState {
    Ongoing,
    Checkmate,
    Resignation,
    TimeLoss,
    Stalemate,
    ThreefoldRepetition,
    FiftyMoveRule,
    InsufficientMaterial,
    Agreement,
}

/// 对局结果大类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GameOutcomeCategory {
    Ongoing,
    WinLoss,
    Draw,
}

impl GameOutcomeState {
    pub fn category(&self) -> GameOutcomeCategory {
        match self {
            GameOutcomeState::Ongoing => GameOutcomeCategory::Ongoing,
            GameOutcomeState::Checkmate
            | GameOutcomeState::Resignation
            | GameOutcomeState::TimeLoss => GameOutcomeCategory::WinLoss,
            GameOutcomeState::Stalemate
            | GameOutcomeState::ThreefoldRepetition
            | GameOutcomeState::FiftyMoveRule
            | GameOutcomeState::InsufficientMaterial
            | GameOutcomeState::Agreement => GameOutcomeCategory::Draw,
        }
    }
}

/// 对局结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOutcome {
    pub state: GameOutcomeState,
    #[serde(default)]
    pub winner: Option<Side>,
}

impl GameOutcome {
    pub fn is_ongoing(&self) -> bool {
        self.state.category() == GameOutcomeCategory::Ongoing
    }
}

/// 棋局快照
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub width: usize,
    pub height: usize,
    pub color_to_move: Side,
    pub piece_grid: Vec<Option<Piece>>,
    #[serde(default)]
    pub promo_option_names: Vec<String>,
    #[serde(default)]
    pub pseudolegal_move_options: Vec<MoveOption>,
    #[serde(default)]
    pub game_outcome: Option<GameOutcome>,
    #[serde(default)]
    pub bot_colors: BTreeSet<Side>,
}

impl GameState {
    /// 解析并校验一份快照
    pub fn from_json(body: &str) -> Result<Self> {
        let state: GameState = serde_json::from_str(body)?;
        state.validate()?;
        Ok(state)
    }

    /// 格子总数，尺寸乘积溢出时为 None
    pub fn square_count(&self) -> Option<usize> {
        self.width.checked_mul(self.height)
    }

    /// 检查快照不变量
    pub fn validate(&self) -> std::result::Result<(), SnapshotError> {
        if self.width == 0 || self.height == 0 {
            return Err(SnapshotError::EmptyBoard {
                width: self.width,
                height: self.height,
            });
        }

        let squares = self.square_count().ok_or(SnapshotError::BoardTooLarge {
            width: self.width,
            height: self.height,
        })?;
        if self.piece_grid.len() != squares {
            return Err(SnapshotError::GridSizeMismatch {
                expected: squares,
                actual: self.piece_grid.len(),
            });
        }

        if let Some(bad) = self
            .pseudolegal_move_options
            .iter()
            .find(|m| m.from_square_index >= squares || m.to_square_index >= squares)
        {
            return Err(SnapshotError::MoveIndexOutOfRange {
                from: bad.from_square_index,
                to: bad.to_square_index,
                squares,
            });
        }

        Ok(())
    }

    /// 获取指定格子上的棋子
    pub fn piece_at(&self, index: SquareIndex) -> Option<&Piece> {
        self.piece_grid.get(index).and_then(Option::as_ref)
    }

    /// 当前走子方是否由服务端机器人控制
    pub fn is_bot_turn(&self) -> bool {
        self.bot_colors.contains(&self.color_to_move)
    }

    /// 格子上是否有当前走子方的棋子
    pub fn is_owned_by_side_to_move(&self, index: SquareIndex) -> bool {
        self.piece_at(index)
            .is_some_and(|piece| piece.color == self.color_to_move)
    }

    /// 是否为本局提供的升变选项
    pub fn is_promo_option(&self, piece_name: &str) -> bool {
        self.promo_option_names.iter().any(|name| name == piece_name)
    }

    /// 对局是否已结束（仅依据服务端给出的结果）
    pub fn is_over(&self) -> bool {
        self.game_outcome.is_some_and(|outcome| !outcome.is_ongoing())
    }
}
