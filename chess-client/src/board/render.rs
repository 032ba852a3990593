//! 棋盘文本渲染

use std::fmt::Write;

use protocol::{GameOutcome, GameOutcomeCategory, Side};

use super::{BoardView, PromotionView, SquareView, TileColor};
use crate::game::GameSession;

/// 没有棋盘可显示时的占位文本
pub const LOADING_FALLBACK: &str = "Error while loading.";

/// 渲染整个会话（棋盘、状态行、升变选择）
pub fn render_session(session: &GameSession) -> String {
    let Some(view) = session.board_view() else {
        let mut out = String::from(LOADING_FALLBACK);
        if let Some(reason) = session.load_error() {
            let _ = write!(out, "\n({})", reason);
        }
        return out;
    };

    let mut out = render_board(&view);
    out.push('\n');
    out.push_str(&render_status(&view));
    let _ = write!(
        out,
        "\nChaos: {} | push: {}",
        session.controls().chaos_level().display_name(),
        session.connection()
    );
    if let Some(snapshot) = session.snapshot() {
        let _ = write!(
            out,
            " | snapshot {} ({}) at {}",
            snapshot.id,
            snapshot.source,
            snapshot.received_at.format("%H:%M:%S")
        );
    }
    if let Some(failure) = session.last_failure() {
        let _ = write!(out, "\nLast request failed: {}", failure);
    }
    if let Some(promotion) = &view.promotion {
        out.push('\n');
        out.push_str(&render_promotion(&view, promotion));
    }
    out
}

/// 文本棋盘，最上方一行在前
///
/// `[X]` 选中，`(X)` 可走，`<X>` 悬停，`*X*` 悬停棋子的目标。
pub fn render_board(view: &BoardView) -> String {
    let geometry = view.geometry;
    let mut out = String::new();

    for row in 0..geometry.height {
        let y = geometry.height - 1 - row;
        let _ = write!(out, "{:>3} ", y + 1);
        for x in 0..geometry.width {
            let cell = geometry
                .index_of(x, y)
                .and_then(|i| view.square(i))
                .map(render_square)
                .unwrap_or_else(|| "   ".to_string());
            out.push_str(&cell);
        }
        out.push('\n');
    }

    out.push_str("    ");
    for x in 0..geometry.width {
        let _ = write!(out, " {} ", super::file_letter(x).unwrap_or('?'));
    }
    out
}

fn render_square(square: &SquareView) -> String {
    let symbol = match (&square.piece, square.coord.tile) {
        (Some(piece), _) => piece.symbol(),
        (None, TileColor::Dark) => ':',
        (None, TileColor::Light) => '.',
    };
    let (open, close) = if square.is_selected {
        ('[', ']')
    } else if square.is_selected_legal_move_target {
        ('(', ')')
    } else if square.is_hovered {
        ('<', '>')
    } else if square.is_hovered_move_target {
        ('*', '*')
    } else {
        (' ', ' ')
    };
    format!("{}{}{}", open, symbol, close)
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::White => "White",
        Side::Black => "Black",
    }
}

/// 对局结果描述；进行中返回 None
pub fn describe_outcome(outcome: &GameOutcome) -> Option<String> {
    match outcome.state.category() {
        GameOutcomeCategory::Ongoing => None,
        GameOutcomeCategory::WinLoss => Some(match outcome.winner {
            Some(winner) => format!("{:?}: {} wins", outcome.state, side_name(winner)),
            None => format!("{:?}", outcome.state),
        }),
        GameOutcomeCategory::Draw => Some(format!("Draw ({:?})", outcome.state)),
    }
}

/// 状态行
pub fn render_status(view: &BoardView) -> String {
    if let Some(text) = view.outcome.as_ref().and_then(describe_outcome) {
        return text;
    }

    let mut out = format!("{} to move", side_name(view.color_to_move));
    if view.is_bot_turn {
        out.push_str(" (bot)");
    }
    let bots: Vec<&str> = view.bot_colors.iter().map(|s| side_name(*s)).collect();
    let _ = write!(
        out,
        " | bots: {}",
        if bots.is_empty() { "none".to_string() } else { bots.join(", ") }
    );
    out
}

/// 升变选择列表
pub fn render_promotion(view: &BoardView, promotion: &PromotionView) -> String {
    let label = |i| view.geometry.label(i).unwrap_or_else(|| i.to_string());
    let mut out = format!(
        "Promote {} -> {}:",
        label(promotion.from),
        label(promotion.to)
    );
    for piece in &promotion.options {
        let _ = write!(out, " {} ({})", piece.piece_name, piece.symbol());
    }
    out.push_str("  [promote NAME | cancel]");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{SnapshotSource, UserInput};
    use protocol::{GameOutcomeState, GameState, MoveOption, Piece};
    use std::collections::BTreeSet;

    fn small_state() -> GameState {
        // 2x2: 上排 [K, .] 下排 [., k]
        GameState {
            width: 2,
            height: 2,
            color_to_move: Side::White,
            piece_grid: vec![
                Some(Piece::new("KING", Side::White)),
                None,
                None,
                Some(Piece::new("KING", Side::Black)),
            ],
            promo_option_names: vec!["QUEEN".into()],
            pseudolegal_move_options: vec![MoveOption {
                from_square_index: 0,
                to_square_index: 1,
                is_promo: true,
                is_legal: true,
            }],
            game_outcome: None,
            bot_colors: BTreeSet::from([Side::Black]),
        }
    }

    #[test]
    fn test_fallback_without_board() {
        let session = GameSession::default();
        assert_eq!(render_session(&session), LOADING_FALLBACK);
    }

    #[test]
    fn test_board_layout_and_markers() {
        let mut session = GameSession::default();
        session.apply_snapshot(small_state(), SnapshotSource::Push);
        session.handle_event(UserInput::Click(0).into());

        let view = session.board_view().unwrap();
        let board = render_board(&view);
        let lines: Vec<&str> = board.lines().collect();
        assert_eq!(lines[0], "  2 [K](:)");
        assert_eq!(lines[1], "  1  :  k ");
        assert_eq!(lines[2], "     a  b ");

        assert_eq!(render_status(&view), "White to move | bots: Black");
    }

    #[test]
    fn test_promotion_prompt() {
        let mut session = GameSession::default();
        session.apply_snapshot(small_state(), SnapshotSource::Push);
        session.handle_event(UserInput::Click(0).into());
        session.handle_event(UserInput::Click(1).into());

        let text = render_session(&session);
        assert!(text.contains("Promote a2 -> b2: QUEEN (Q)"));
    }

    #[test]
    fn test_session_footer_names_snapshot() {
        let mut session = GameSession::default();
        session.apply_snapshot(small_state(), SnapshotSource::InitialFetch);
        session.apply_snapshot(small_state(), SnapshotSource::Push);

        let text = render_session(&session);
        let footer = text
            .lines()
            .find(|line| line.starts_with("Chaos: "))
            .unwrap();
        assert!(footer.contains(" | push: connecting | snapshot #2 (push) at "));
    }

    #[test]
    fn test_outcome_replaces_turn_line() {
        let mut state = small_state();
        state.game_outcome = Some(GameOutcome {
            state: GameOutcomeState::Checkmate,
            winner: Some(Side::Black),
        });
        let mut session = GameSession::default();
        session.apply_snapshot(state, SnapshotSource::Push);

        let view = session.board_view().unwrap();
        assert_eq!(render_status(&view), "Checkmate: Black wins");

        let draw = GameOutcome {
            state: GameOutcomeState::Stalemate,
            winner: None,
        };
        assert_eq!(describe_outcome(&draw).as_deref(), Some("Draw (Stalemate)"));
    }
}
