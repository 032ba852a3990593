//! 棋盘几何模块
//!
//! 线性格子下标与二维坐标、格子底色之间的纯映射，
//! 供渲染和点击目标解析使用。

mod render;
mod view;

pub use render::*;
pub use view::*;

use protocol::SquareIndex;

/// 格子底色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileColor {
    Dark,
    Light,
}

/// 格子坐标（`y` 从棋盘底部开始计数）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SquareCoord {
    pub x: usize,
    pub y: usize,
    pub tile: TileColor,
}

/// 计算格子坐标与底色
///
/// `pieceGrid` 的第 0 行是棋盘最上方一行。
pub fn square_coord(index: SquareIndex, width: usize, height: usize) -> SquareCoord {
    let x = index % width;
    let row = index / width;
    let y = height - 1 - row;
    let tile = if (x + y) % 2 == 0 {
        TileColor::Dark
    } else {
        TileColor::Light
    };
    SquareCoord { x, y, tile }
}

/// 棋盘尺寸
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoardGeometry {
    pub width: usize,
    pub height: usize,
}

impl BoardGeometry {
    /// 尺寸为零或乘积溢出时返回 None
    pub fn new(width: usize, height: usize) -> Option<Self> {
        width
            .checked_mul(height)
            .filter(|&squares| squares > 0)
            .map(|_| Self { width, height })
    }

    /// 乘积溢出的尺寸按空棋盘处理
    pub fn square_count(&self) -> usize {
        self.width.checked_mul(self.height).unwrap_or(0)
    }

    pub fn contains(&self, index: SquareIndex) -> bool {
        index < self.square_count()
    }

    /// 下标转坐标
    pub fn coord_of(&self, index: SquareIndex) -> Option<SquareCoord> {
        self.contains(index)
            .then(|| square_coord(index, self.width, self.height))
    }

    /// 坐标转下标
    pub fn index_of(&self, x: usize, y: usize) -> Option<SquareIndex> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let row = self.height - 1 - y;
        Some(row * self.width + x)
    }

    /// 整个棋盘的格子坐标（按下标顺序）
    pub fn tiles(&self) -> Vec<SquareCoord> {
        (0..self.square_count())
            .map(|index| square_coord(index, self.width, self.height))
            .collect()
    }

    /// 格子名称，如 `a1`（列用字母，行从 1 开始）
    pub fn label(&self, index: SquareIndex) -> Option<String> {
        let coord = self.coord_of(index)?;
        let file = file_letter(coord.x)?;
        Some(format!("{}{}", file, coord.y + 1))
    }

    /// 解析格子名称
    pub fn parse_label(&self, label: &str) -> Option<SquareIndex> {
        let mut chars = label.trim().chars();
        let file = chars.next()?.to_ascii_lowercase();
        if !file.is_ascii_lowercase() {
            return None;
        }
        let x = (file as u8 - b'a') as usize;
        let rank: usize = chars.as_str().parse().ok()?;
        let y = rank.checked_sub(1)?;
        self.index_of(x, y)
    }
}

fn file_letter(x: usize) -> Option<char> {
    u8::try_from(x)
        .ok()
        .filter(|x| *x < 26)
        .map(|x| (b'a' + x) as char)
}
