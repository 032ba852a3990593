//! 选择状态机
//!
//! 把格子点击、悬停和升变选择转换为界面状态和走法请求。
//! 合法性与升变标记完全来自服务端快照，这里从不自行判断。

use protocol::{GameState, MoveRequest, SquareIndex};
use tracing::debug;

use super::MoveOptionIndex;
use crate::error::SelectionError;

/// 选择阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    /// 未选择
    #[default]
    Idle,
    /// 已选中起点格
    Selected { origin: SquareIndex },
    /// 升变走法已确定，等待选择棋子
    AwaitingPromotion { from: SquareIndex, to: SquareIndex },
}

/// 界面选择状态
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    phase: SelectionPhase,
    /// 悬停格，仅用于高亮，与选择阶段无关
    hovered: Option<SquareIndex>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SelectionPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == SelectionPhase::Idle
    }

    /// 选中的起点格（等待升变时仍保持选中）
    pub fn selected_square(&self) -> Option<SquareIndex> {
        match self.phase {
            SelectionPhase::Idle => None,
            SelectionPhase::Selected { origin } => Some(origin),
            SelectionPhase::AwaitingPromotion { from, .. } => Some(from),
        }
    }

    pub fn hovered_square(&self) -> Option<SquareIndex> {
        self.hovered
    }

    /// 等待升变的 (from, to)
    pub fn pending_promotion(&self) -> Option<(SquareIndex, SquareIndex)> {
        match self.phase {
            SelectionPhase::AwaitingPromotion { from, to } => Some((from, to)),
            _ => None,
        }
    }

    pub fn is_promo_modal_visible(&self) -> bool {
        self.pending_promotion().is_some()
    }

    /// 点击格子
    ///
    /// 返回需要立即发送的走法请求（如果有）。
    pub fn click(
        &mut self,
        state: &GameState,
        index: &MoveOptionIndex,
        square: SquareIndex,
    ) -> Option<MoveRequest> {
        if state.is_bot_turn() {
            debug!("Click on square {} ignored: {} is bot-controlled", square, state.color_to_move);
            return None;
        }

        match self.phase {
            SelectionPhase::Idle => {
                if state.is_owned_by_side_to_move(square) {
                    self.phase = SelectionPhase::Selected { origin: square };
                } else {
                    debug!("Click on square {} ignored: no own piece", square);
                }
                None
            }
            SelectionPhase::Selected { origin } => {
                if square == origin {
                    self.phase = SelectionPhase::Idle;
                    return None;
                }

                if let Some(option) = index.legal_move(origin, square) {
                    if option.is_promo {
                        self.phase = SelectionPhase::AwaitingPromotion {
                            from: origin,
                            to: square,
                        };
                        return None;
                    }
                    self.phase = SelectionPhase::Idle;
                    return Some(MoveRequest::new(origin, square, None));
                }

                self.phase = if state.is_owned_by_side_to_move(square) {
                    SelectionPhase::Selected { origin: square }
                } else {
                    SelectionPhase::Idle
                };
                None
            }
            SelectionPhase::AwaitingPromotion { .. } => {
                debug!("Click on square {} ignored: promotion choice pending", square);
                None
            }
        }
    }

    /// 选择升变棋子
    ///
    /// 棋子必须在当前快照的 `promoOptionNames` 中，否则状态不变。
    pub fn choose_promotion(
        &mut self,
        state: &GameState,
        piece_name: &str,
    ) -> Result<MoveRequest, SelectionError> {
        let SelectionPhase::AwaitingPromotion { from, to } = self.phase else {
            return Err(SelectionError::NoPendingPromotion);
        };

        if !state.is_promo_option(piece_name) {
            return Err(SelectionError::UnknownPromotionOption {
                name: piece_name.to_string(),
                offered: state.promo_option_names.clone(),
            });
        }

        self.phase = SelectionPhase::Idle;
        Ok(MoveRequest::new(from, to, Some(piece_name.to_string())))
    }

    /// 放弃升变，回到未选择状态
    pub fn cancel_promotion(&mut self) -> bool {
        if self.is_promo_modal_visible() {
            self.phase = SelectionPhase::Idle;
            true
        } else {
            false
        }
    }

    /// 鼠标进入格子
    pub fn hover_enter(&mut self, square: SquareIndex) {
        self.hovered = Some(square);
    }

    /// 鼠标离开棋盘
    pub fn hover_leave(&mut self) {
        self.hovered = None;
    }

    /// 快照替换后重置为初始状态
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::{MoveOption, Piece, Side};
    use std::collections::BTreeSet;

    fn board_with_pawn(is_promo: bool) -> GameState {
        let mut piece_grid = vec![None; 64];
        piece_grid[8] = Some(Piece::new("PAWN", Side::White));
        piece_grid[9] = Some(Piece::new("PAWN", Side::White));
        piece_grid[0] = Some(Piece::new("ROOK", Side::Black));
        GameState {
            width: 8,
            height: 8,
            color_to_move: Side::White,
            piece_grid,
            promo_option_names: vec!["QUEEN".into(), "ROOK".into(), "BISHOP".into(), "KNIGHT".into()],
            pseudolegal_move_options: vec![
                MoveOption {
                    from_square_index: 8,
                    to_square_index: 16,
                    is_promo,
                    is_legal: true,
                },
                MoveOption {
                    from_square_index: 8,
                    to_square_index: 24,
                    is_promo: false,
                    is_legal: false,
                },
            ],
            game_outcome: None,
            bot_colors: BTreeSet::new(),
        }
    }

    fn setup(is_promo: bool) -> (GameState, MoveOptionIndex, SelectionState) {
        let state = board_with_pawn(is_promo);
        let index = MoveOptionIndex::build(&state.pseudolegal_move_options);
        (state, index, SelectionState::new())
    }

    #[test]
    fn test_empty_board_stays_idle() {
        let mut state = board_with_pawn(false);
        state.piece_grid = vec![None; 64];
        state.pseudolegal_move_options.clear();
        let index = MoveOptionIndex::build(&state.pseudolegal_move_options);
        let mut selection = SelectionState::new();

        for square in 0..64 {
            assert_eq!(selection.click(&state, &index, square), None);
            assert!(selection.is_idle());
        }
    }

    #[test]
    fn test_select_then_move() {
        let (state, index, mut selection) = setup(false);

        assert_eq!(selection.click(&state, &index, 8), None);
        assert_eq!(selection.phase(), SelectionPhase::Selected { origin: 8 });

        let request = selection.click(&state, &index, 16);
        assert_eq!(request, Some(MoveRequest::new(8, 16, None)));
        assert!(selection.is_idle());
    }

    #[test]
    fn test_promotion_flow() {
        let (state, index, mut selection) = setup(true);

        selection.click(&state, &index, 8);
        assert_eq!(selection.click(&state, &index, 16), None);
        assert_eq!(selection.phase(), SelectionPhase::AwaitingPromotion { from: 8, to: 16 });
        assert!(selection.is_promo_modal_visible());
        assert_eq!(selection.pending_promotion(), Some((8, 16)));

        let request = selection.choose_promotion(&state, "QUEEN").unwrap();
        assert_eq!(request, MoveRequest::new(8, 16, Some("QUEEN".into())));
        assert!(selection.is_idle());
        assert!(!selection.is_promo_modal_visible());
    }

    #[test]
    fn test_promotion_requires_offered_piece() {
        let (state, index, mut selection) = setup(true);
        selection.click(&state, &index, 8);
        selection.click(&state, &index, 16);

        let err = selection.choose_promotion(&state, "KING").unwrap_err();
        assert!(matches!(err, SelectionError::UnknownPromotionOption { .. }));
        assert_eq!(selection.pending_promotion(), Some((8, 16)));
    }

    #[test]
    fn test_promotion_without_pending_move() {
        let (state, _, mut selection) = setup(true);
        assert_eq!(
            selection.choose_promotion(&state, "QUEEN"),
            Err(SelectionError::NoPendingPromotion)
        );
    }

    #[test]
    fn test_clicks_ignored_while_awaiting_promotion() {
        let (state, index, mut selection) = setup(true);
        selection.click(&state, &index, 8);
        selection.click(&state, &index, 16);

        assert_eq!(selection.click(&state, &index, 9), None);
        assert_eq!(selection.pending_promotion(), Some((8, 16)));

        assert!(selection.cancel_promotion());
        assert!(selection.is_idle());
        assert!(!selection.cancel_promotion());
    }

    #[test]
    fn test_selection_is_a_toggle() {
        let (state, index, mut selection) = setup(false);

        selection.click(&state, &index, 8);
        selection.click(&state, &index, 8);
        assert!(selection.is_idle());

        selection.click(&state, &index, 8);
        assert_eq!(selection.selected_square(), Some(8));
    }

    #[test]
    fn test_switch_to_other_own_piece() {
        let (state, index, mut selection) = setup(false);
        selection.click(&state, &index, 8);
        assert_eq!(selection.click(&state, &index, 9), None);
        assert_eq!(selection.phase(), SelectionPhase::Selected { origin: 9 });
    }

    #[test]
    fn test_illegal_target_deselects() {
        let (state, index, mut selection) = setup(false);
        selection.click(&state, &index, 8);

        // 24 只是伪合法走法
        assert_eq!(selection.click(&state, &index, 24), None);
        assert!(selection.is_idle());

        // 对方棋子
        selection.click(&state, &index, 8);
        assert_eq!(selection.click(&state, &index, 0), None);
        assert!(selection.is_idle());
    }

    #[test]
    fn test_opponent_piece_not_selectable() {
        let (state, index, mut selection) = setup(false);
        selection.click(&state, &index, 0);
        assert!(selection.is_idle());
    }

    #[test]
    fn test_bot_turn_blocks_everything() {
        let (mut state, index, mut selection) = setup(false);
        state.bot_colors.insert(Side::White);

        for square in [8, 9, 16, 0, 63] {
            assert_eq!(selection.click(&state, &index, square), None);
            assert!(selection.is_idle());
        }

        // 已选中后轮到机器人，同样无效
        state.bot_colors.clear();
        selection.click(&state, &index, 8);
        state.bot_colors.insert(Side::White);
        assert_eq!(selection.click(&state, &index, 16), None);
        assert_eq!(selection.selected_square(), Some(8));
    }

    #[test]
    fn test_hover_is_orthogonal() {
        let (state, index, mut selection) = setup(false);
        selection.hover_enter(8);
        assert!(selection.is_idle());
        assert_eq!(selection.hovered_square(), Some(8));

        selection.click(&state, &index, 8);
        selection.hover_enter(16);
        assert_eq!(selection.selected_square(), Some(8));

        selection.hover_leave();
        assert_eq!(selection.hovered_square(), None);
        assert_eq!(selection.selected_square(), Some(8));
    }

    #[test]
    fn test_reset_clears_everything() {
        let (state, index, mut selection) = setup(true);
        selection.hover_enter(3);
        selection.click(&state, &index, 8);
        selection.click(&state, &index, 16);

        selection.reset();
        assert_eq!(selection, SelectionState::default());
        assert_eq!(selection.selected_square(), None);
        assert_eq!(selection.pending_promotion(), None);
        assert!(!selection.is_promo_modal_visible());
    }
}
