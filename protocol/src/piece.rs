//! 棋子与阵营定义

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;

/// 阵营
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    /// 白方（先手）
    White,
    /// 黑方（后手）
    Black,
}

impl Side {
    /// 所有阵营
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    /// 线上名称
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::White => "WHITE",
            Side::Black => "BLACK",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "WHITE" | "W" => Ok(Side::White),
            "BLACK" | "B" => Ok(Side::Black),
            _ => Err(ProtocolError::UnknownSide(s.to_string())),
        }
    }
}

/// 棋子
///
/// 棋子类型由服务端配置决定（混沌模式下可能出现非标准棋子），
/// 客户端只把名称当作不透明字符串。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    #[serde(alias = "pieceType")]
    pub piece_name: String,
    pub color: Side,
}

impl Piece {
    pub fn new(piece_name: impl Into<String>, color: Side) -> Self {
        Self {
            piece_name: piece_name.into(),
            color,
        }
    }

    /// 单字符符号（白方大写，黑方小写）
    pub fn symbol(&self) -> char {
        let c = match self.piece_name.to_ascii_uppercase().as_str() {
            "KING" => 'k',
            "QUEEN" => 'q',
            "ROOK" => 'r',
            "BISHOP" => 'b',
            "KNIGHT" => 'n',
            "PAWN" => 'p',
            other => other
                .chars()
                .next()
                .map(|c| c.to_ascii_lowercase())
                .unwrap_or('?'),
        };
        match self.color {
            Side::White => c.to_ascii_uppercase(),
            Side::Black => c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_wire_name() {
        assert_eq!(serde_json::to_string(&Side::White).unwrap(), "\"WHITE\"");
        let side: Side = serde_json::from_str("\"BLACK\"").unwrap();
        assert_eq!(side, Side::Black);
    }

    #[test]
    fn test_side_from_str() {
        assert_eq!("white".parse::<Side>().unwrap(), Side::White);
        assert_eq!(" B ".parse::<Side>().unwrap(), Side::Black);
        assert!("red".parse::<Side>().is_err());
    }

    #[test]
    fn test_piece_accepts_both_field_names() {
        let a: Piece = serde_json::from_str(r#"{"pieceName":"QUEEN","color":"WHITE"}"#).unwrap();
        let b: Piece = serde_json::from_str(r#"{"pieceType":"QUEEN","color":"WHITE"}"#).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_piece_symbol() {
        assert_eq!(Piece::new("KNIGHT", Side::White).symbol(), 'N');
        assert_eq!(Piece::new("KING", Side::Black).symbol(), 'k');
        assert_eq!(Piece::new("AMAZON", Side::Black).symbol(), 'a');
    }
}
