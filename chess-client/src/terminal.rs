//! 终端命令解析
//!
//! 每行一条命令，代替指针事件驱动会话。

use protocol::{ChaosLevel, Side, SquareIndex};
use thiserror::Error;

use crate::board::BoardGeometry;
use crate::game::UserInput;

/// 帮助文本
pub const HELP_TEXT: &str = "\
Commands:
  click SQUARE     select a piece or move the selected piece (SQUARE: index or label, e.g. 8 or a7)
  hover SQUARE     hover over a square
  leave            move the pointer off the board
  promote NAME     choose the promotion piece (e.g. QUEEN)
  cancel           close the promotion choice
  new [LEVEL]      start a new game (LEVEL: 0-2 or dull/odd/weird)
  chaos LEVEL      set the chaos level for the next game
  bot COLOR        toggle bot control for WHITE or BLACK
  show             print the board
  help             print this help
  quit             exit";

/// 终端命令
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Input(UserInput),
    Show,
    Help,
    Quit,
}

/// 命令解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0} (type 'help')")]
    Unknown(String),

    #[error("Missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("Invalid square: {0}")]
    InvalidSquare(String),

    #[error("Invalid chaos level: {0}")]
    InvalidChaosLevel(String),

    #[error("Invalid color: {0}")]
    InvalidSide(String),
}

/// 解析一行输入，空行返回 None
pub fn parse_command(
    line: &str,
    geometry: Option<&BoardGeometry>,
) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let command = match verb.to_ascii_lowercase().as_str() {
        "click" | "c" => Command::Input(UserInput::Click(parse_square(
            arg.ok_or(CommandError::MissingArgument("SQUARE"))?,
            geometry,
        )?)),
        "hover" | "h" => Command::Input(UserInput::HoverEnter(parse_square(
            arg.ok_or(CommandError::MissingArgument("SQUARE"))?,
            geometry,
        )?)),
        "leave" => Command::Input(UserInput::HoverLeave),
        "promote" | "p" => {
            let name = arg.ok_or(CommandError::MissingArgument("NAME"))?;
            Command::Input(UserInput::ChoosePromotion(name.to_ascii_uppercase()))
        }
        "cancel" => Command::Input(UserInput::CancelPromotion),
        "new" => Command::Input(UserInput::NewGame(arg.map(parse_chaos_level).transpose()?)),
        "chaos" => Command::Input(UserInput::SetChaosLevel(parse_chaos_level(
            arg.ok_or(CommandError::MissingArgument("LEVEL"))?,
        )?)),
        "bot" => {
            let side = arg.ok_or(CommandError::MissingArgument("COLOR"))?;
            let side: Side = side
                .parse()
                .map_err(|_| CommandError::InvalidSide(side.to_string()))?;
            Command::Input(UserInput::ToggleBot(side))
        }
        "show" | "s" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

/// 格子：数字下标或格子名称
fn parse_square(arg: &str, geometry: Option<&BoardGeometry>) -> Result<SquareIndex, CommandError> {
    let invalid = || CommandError::InvalidSquare(arg.to_string());

    if let Ok(index) = arg.parse::<SquareIndex>() {
        return match geometry {
            Some(g) if !g.contains(index) => Err(invalid()),
            _ => Ok(index),
        };
    }
    geometry
        .and_then(|g| g.parse_label(arg))
        .ok_or_else(invalid)
}

fn parse_chaos_level(arg: &str) -> Result<ChaosLevel, CommandError> {
    let level = match arg.to_ascii_lowercase().as_str() {
        "0" | "dull" => ChaosLevel::Dull,
        "1" | "odd" => ChaosLevel::Odd,
        "2" | "weird" => ChaosLevel::Weird,
        _ => return Err(CommandError::InvalidChaosLevel(arg.to_string())),
    };
    Ok(level)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> BoardGeometry {
        BoardGeometry::new(8, 8).unwrap()
    }

    #[test]
    fn test_click_by_index_and_label() {
        let g = board();
        assert_eq!(
            parse_command("click 8", Some(&g)),
            Ok(Some(Command::Input(UserInput::Click(8))))
        );
        assert_eq!(
            parse_command("  CLICK a7 ", Some(&g)),
            Ok(Some(Command::Input(UserInput::Click(8))))
        );
        assert_eq!(
            parse_command("click 64", Some(&g)),
            Err(CommandError::InvalidSquare("64".into()))
        );
        assert_eq!(
            parse_command("click a7", None),
            Err(CommandError::InvalidSquare("a7".into()))
        );
        assert_eq!(
            parse_command("click", Some(&g)),
            Err(CommandError::MissingArgument("SQUARE"))
        );
    }

    #[test]
    fn test_promotion_and_hover() {
        assert_eq!(
            parse_command("promote queen", None),
            Ok(Some(Command::Input(UserInput::ChoosePromotion("QUEEN".into()))))
        );
        assert_eq!(
            parse_command("hover 3", None),
            Ok(Some(Command::Input(UserInput::HoverEnter(3))))
        );
        assert_eq!(
            parse_command("leave", None),
            Ok(Some(Command::Input(UserInput::HoverLeave)))
        );
    }

    #[test]
    fn test_controls() {
        assert_eq!(
            parse_command("new", None),
            Ok(Some(Command::Input(UserInput::NewGame(None))))
        );
        assert_eq!(
            parse_command("new weird", None),
            Ok(Some(Command::Input(UserInput::NewGame(Some(ChaosLevel::Weird)))))
        );
        assert_eq!(
            parse_command("chaos 1", None),
            Ok(Some(Command::Input(UserInput::SetChaosLevel(ChaosLevel::Odd))))
        );
        assert_eq!(
            parse_command("new 5", None),
            Err(CommandError::InvalidChaosLevel("5".into()))
        );
        assert_eq!(
            parse_command("bot black", None),
            Ok(Some(Command::Input(UserInput::ToggleBot(Side::Black))))
        );
        assert_eq!(
            parse_command("bot red", None),
            Err(CommandError::InvalidSide("red".into()))
        );
    }

    #[test]
    fn test_misc() {
        assert_eq!(parse_command("   ", None), Ok(None));
        assert_eq!(parse_command("quit", None), Ok(Some(Command::Quit)));
        assert_eq!(parse_command("show", None), Ok(Some(Command::Show)));
        assert!(matches!(
            parse_command("dance", None),
            Err(CommandError::Unknown(_))
        ));
    }
}
