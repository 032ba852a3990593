//! 棋盘视图模型
//!
//! 由当前快照、走法索引和选择状态计算每个格子的高亮标记，
//! 渲染层只读取这里的结果。

use std::collections::BTreeSet;

use protocol::{GameOutcome, GameState, Piece, Side, SquareIndex};

use super::{BoardGeometry, SquareCoord};
use crate::game::{MoveOptionIndex, SelectionState};

/// 单个格子的显示状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquareView {
    pub index: SquareIndex,
    pub coord: SquareCoord,
    pub piece: Option<Piece>,
    /// 选中的起点格
    pub is_selected: bool,
    /// 悬停在有棋子的格子上
    pub is_hovered: bool,
    /// 悬停棋子的目标格（含不合法走法）
    pub is_hovered_move_target: bool,
    /// 选中棋子的合法目标格
    pub is_selected_legal_move_target: bool,
}

/// 升变选择框
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromotionView {
    pub from: SquareIndex,
    pub to: SquareIndex,
    /// 可选棋子，颜色为当前走子方
    pub options: Vec<Piece>,
}

/// 棋盘视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardView {
    pub geometry: BoardGeometry,
    pub squares: Vec<SquareView>,
    pub color_to_move: Side,
    pub is_bot_turn: bool,
    pub bot_colors: BTreeSet<Side>,
    pub outcome: Option<GameOutcome>,
    pub promotion: Option<PromotionView>,
}

impl BoardView {
    pub fn build(state: &GameState, index: &MoveOptionIndex, selection: &SelectionState) -> Self {
        let geometry = BoardGeometry {
            width: state.width,
            height: state.height,
        };

        let hovered = selection
            .hovered_square()
            .filter(|square| state.piece_at(*square).is_some());
        let hovered_targets = hovered.map(|h| index.targets(h)).unwrap_or_default();

        let selected = selection.selected_square();
        let selected_targets = selected
            .map(|s| index.legal_targets(s))
            .unwrap_or_default();

        let squares = geometry
            .tiles()
            .into_iter()
            .enumerate()
            .map(|(i, coord)| SquareView {
                index: i,
                coord,
                piece: state.piece_at(i).cloned(),
                is_selected: selected == Some(i),
                is_hovered: hovered == Some(i),
                is_hovered_move_target: hovered_targets.contains(&i),
                is_selected_legal_move_target: selected_targets.contains(&i),
            })
            .collect();

        let promotion = selection.pending_promotion().map(|(from, to)| PromotionView {
            from,
            to,
            options: state
                .promo_option_names
                .iter()
                .map(|name| Piece::new(name.as_str(), state.color_to_move))
                .collect(),
        });

        Self {
            geometry,
            squares,
            color_to_move: state.color_to_move,
            is_bot_turn: state.is_bot_turn(),
            bot_colors: state.bot_colors.clone(),
            outcome: state.game_outcome,
            promotion,
        }
    }

    pub fn square(&self, index: SquareIndex) -> Option<&SquareView> {
        self.squares.get(index)
    }
}
