//! 对局控制：新对局与机器人阵营

use std::collections::BTreeSet;

use protocol::{BotConfigRequest, ChaosLevel, NewGameRequest, Side};

/// 控制面板状态
///
/// 机器人阵营是本地勾选状态，每次切换发送完整集合。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Controls {
    chaos_level: ChaosLevel,
    bot_colors: BTreeSet<Side>,
}

impl Default for Controls {
    fn default() -> Self {
        Self::new(ChaosLevel::default())
    }
}

impl Controls {
    /// 初始时两方都勾选为机器人
    pub fn new(chaos_level: ChaosLevel) -> Self {
        Self {
            chaos_level,
            bot_colors: Side::ALL.into_iter().collect(),
        }
    }

    pub fn chaos_level(&self) -> ChaosLevel {
        self.chaos_level
    }

    pub fn set_chaos_level(&mut self, level: ChaosLevel) {
        self.chaos_level = level;
    }

    pub fn bot_colors(&self) -> &BTreeSet<Side> {
        &self.bot_colors
    }

    pub fn is_bot(&self, side: Side) -> bool {
        self.bot_colors.contains(&side)
    }

    pub fn new_game_request(&self) -> NewGameRequest {
        NewGameRequest::from(self.chaos_level)
    }

    /// 切换一方，返回需要发送的完整配置
    pub fn toggle_bot(&mut self, side: Side) -> BotConfigRequest {
        if !self.bot_colors.remove(&side) {
            self.bot_colors.insert(side);
        }
        BotConfigRequest::new(self.bot_colors.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initially_both_bots() {
        let controls = Controls::default();
        assert!(controls.is_bot(Side::White));
        assert!(controls.is_bot(Side::Black));
        assert_eq!(controls.new_game_request(), NewGameRequest { chaos_level: 0 });
    }

    #[test]
    fn test_toggle_sends_full_set() {
        let mut controls = Controls::default();

        let request = controls.toggle_bot(Side::White);
        assert_eq!(request.bot_color_names, vec![Side::Black]);

        let request = controls.toggle_bot(Side::Black);
        assert!(request.bot_color_names.is_empty());

        let request = controls.toggle_bot(Side::White);
        assert_eq!(request.bot_color_names, vec![Side::White]);
    }

    #[test]
    fn test_chaos_level() {
        let mut controls = Controls::new(ChaosLevel::Odd);
        assert_eq!(controls.new_game_request().chaos_level, 1);
        controls.set_chaos_level(ChaosLevel::Weird);
        assert_eq!(controls.new_game_request().chaos_level, 2);
    }
}
