//! 走法索引
//!
//! 按起点格分组的伪合法走法，每次收到新快照时整体重建。

use std::collections::{BTreeSet, HashMap};

use protocol::{MoveOption, SquareIndex};

/// 起点格 -> 走法列表（保持服务端给出的相对顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveOptionIndex {
    by_origin: HashMap<SquareIndex, Vec<MoveOption>>,
    total: usize,
}

impl MoveOptionIndex {
    /// 从快照中的走法列表构建索引
    pub fn build(options: &[MoveOption]) -> Self {
        let mut by_origin: HashMap<SquareIndex, Vec<MoveOption>> = HashMap::new();
        for option in options {
            by_origin
                .entry(option.from_square_index)
                .or_default()
                .push(*option);
        }
        Self {
            by_origin,
            total: options.len(),
        }
    }

    /// 指定起点的全部伪合法走法
    pub fn options_from(&self, from: SquareIndex) -> &[MoveOption] {
        self.by_origin
            .get(&from)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 指定起点的全部目标格（含不合法走法，用于悬停提示）
    pub fn targets(&self, from: SquareIndex) -> BTreeSet<SquareIndex> {
        self.options_from(from)
            .iter()
            .map(|m| m.to_square_index)
            .collect()
    }

    /// 指定起点的合法目标格
    pub fn legal_targets(&self, from: SquareIndex) -> BTreeSet<SquareIndex> {
        self.options_from(from)
            .iter()
            .filter(|m| m.is_legal)
            .map(|m| m.to_square_index)
            .collect()
    }

    /// 查找 from -> to 的第一个合法走法
    pub fn legal_move(&self, from: SquareIndex, to: SquareIndex) -> Option<&MoveOption> {
        self.options_from(from)
            .iter()
            .find(|m| m.is_legal && m.to_square_index == to)
    }

    /// 有走法的起点格
    pub fn origins(&self) -> BTreeSet<SquareIndex> {
        self.by_origin.keys().copied().collect()
    }

    /// 走法总数
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mv(from: usize, to: usize, is_legal: bool, is_promo: bool) -> MoveOption {
        MoveOption {
            from_square_index: from,
            to_square_index: to,
            is_promo,
            is_legal,
        }
    }

    #[test]
    fn test_every_move_indexed_once_in_order() {
        let options = vec![
            mv(8, 16, true, false),
            mv(1, 16, true, false),
            mv(8, 24, false, false),
            mv(1, 18, true, false),
            mv(8, 17, true, false),
        ];
        let index = MoveOptionIndex::build(&options);

        assert_eq!(index.len(), options.len());
        let regrouped: usize = index
            .origins()
            .iter()
            .map(|from| index.options_from(*from).len())
            .sum();
        assert_eq!(regrouped, options.len());

        let from_8: Vec<usize> = index.options_from(8).iter().map(|m| m.to_square_index).collect();
        assert_eq!(from_8, vec![16, 24, 17]);
        assert!(index.options_from(8).iter().all(|m| m.from_square_index == 8));
        assert_eq!(index.origins().into_iter().collect::<Vec<_>>(), vec![1, 8]);
    }

    #[test]
    fn test_legal_and_pseudolegal_targets() {
        let index = MoveOptionIndex::build(&[
            mv(8, 16, true, false),
            mv(8, 24, false, false),
        ]);
        assert_eq!(index.targets(8).into_iter().collect::<Vec<_>>(), vec![16, 24]);
        assert_eq!(index.legal_targets(8).into_iter().collect::<Vec<_>>(), vec![16]);
        assert!(index.legal_move(8, 24).is_none());
        assert!(index.legal_move(8, 16).is_some());
    }

    #[test]
    fn test_legal_move_skips_illegal_duplicate() {
        let index = MoveOptionIndex::build(&[
            mv(8, 0, false, false),
            mv(8, 0, true, true),
        ]);
        let found = index.legal_move(8, 0).unwrap();
        assert!(found.is_promo);
    }

    #[test]
    fn test_empty() {
        let index = MoveOptionIndex::build(&[]);
        assert!(index.is_empty());
        assert!(index.options_from(3).is_empty());
        assert!(index.legal_targets(3).is_empty());
    }
}
