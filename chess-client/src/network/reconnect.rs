//! 推送通道断线重连策略（指数退避 + 抖动）

use std::time::Duration;

use rand::Rng;

/// 重连策略
#[derive(Debug, Clone, PartialEq)]
pub struct ReconnectPolicy {
    /// 首次重连前的等待时间
    pub initial_delay: Duration,
    /// 退避上限
    pub max_delay: Duration,
    /// 每次失败后的倍数
    pub backoff_factor: f64,
    /// 最大重连次数，None 表示不限
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(protocol::RECONNECT_INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(protocol::RECONNECT_MAX_DELAY_MS),
            backoff_factor: 2.0,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    /// 不带抖动的退避时间（attempt 从 1 开始）
    pub fn base_delay(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_factor.powi(exp);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    /// 第 attempt 次重连前的等待时间，带 ±25% 抖动
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.base_delay(attempt).as_secs_f64();
        let offset: f64 = rand::thread_rng().gen_range(-1.0..1.0);
        Duration::from_secs_f64((base + base * 0.25 * offset).max(0.05))
    }

    /// 是否已用尽重连次数
    pub fn is_exhausted(&self, attempt: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempt > max)
    }
}
