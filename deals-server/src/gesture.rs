//! Secret tap gesture
//!
//! 在页脚连续快速点击 5 次打开后台登录。两次点击间隔超过静默期则重新计数。
//! 时间由调用方传入，状态机本身是确定的。

use std::time::{Duration, Instant};

/// 默认静默期
pub const DEFAULT_QUIET_INTERVAL: Duration = Duration::from_millis(1000);
/// 默认触发次数
pub const DEFAULT_THRESHOLD: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapState {
    Idle,
    Counting { count: u32, last_tap: Instant },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    /// 计数中 (当前次数)
    Counting(u32),
    /// 达到次数，状态回到 Idle
    Triggered,
}

#[derive(Debug, Clone)]
pub struct SecretTap {
    state: TapState,
    quiet_interval: Duration,
    threshold: u32,
}

impl Default for SecretTap {
    fn default() -> Self {
        Self::new(DEFAULT_QUIET_INTERVAL, DEFAULT_THRESHOLD)
    }
}

impl SecretTap {
    pub fn new(quiet_interval: Duration, threshold: u32) -> Self {
        Self {
            state: TapState::Idle,
            quiet_interval,
            threshold: threshold.max(1),
        }
    }

    pub fn state(&self) -> TapState {
        self.state
    }

    /// 当前计数 (静默期已过也返回最后的计数，下一次点击才会重置)
    pub fn count(&self) -> u32 {
        match self.state {
            TapState::Idle => 0,
            TapState::Counting { count, .. } => count,
        }
    }

    pub fn tap(&mut self, now: Instant) -> TapOutcome {
        let count = match self.state {
            TapState::Counting { count, last_tap }
                if now.saturating_duration_since(last_tap) <= self.quiet_interval =>
            {
                count + 1
            }
            _ => 1,
        };

        if count >= self.threshold {
            self.state = TapState::Idle;
            TapOutcome::Triggered
        } else {
            self.state = TapState::Counting {
                count,
                last_tap: now,
            };
            TapOutcome::Counting(count)
        }
    }

    pub fn reset(&mut self) {
        self.state = TapState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_five_quick_taps_trigger() {
        let start = Instant::now();
        let mut tap = SecretTap::default();
        for i in 1..=4 {
            assert_eq!(tap.tap(start + ms(i * 200)), TapOutcome::Counting(i as u32));
        }
        assert_eq!(tap.tap(start + ms(1000)), TapOutcome::Triggered);
        assert_eq!(tap.state(), TapState::Idle);
        assert_eq!(tap.count(), 0);
    }

    #[test]
    fn test_quiet_interval_restarts_count() {
        let start = Instant::now();
        let mut tap = SecretTap::default();
        for i in 0..4 {
            tap.tap(start + ms(i * 100));
        }
        assert_eq!(tap.count(), 4);
        assert_eq!(tap.tap(start + ms(300 + 1001)), TapOutcome::Counting(1));
    }

    #[test]
    fn test_every_tap_resets_the_timer() {
        let start = Instant::now();
        let mut tap = SecretTap::default();
        // 每次间隔 900ms，总时长超过静默期也能触发
        for i in 0..4 {
            tap.tap(start + ms(i * 900));
        }
        assert_eq!(tap.tap(start + ms(4 * 900)), TapOutcome::Triggered);
    }

    #[test]
    fn test_trigger_starts_fresh_count() {
        let start = Instant::now();
        let mut tap = SecretTap::new(ms(1000), 2);
        tap.tap(start);
        assert_eq!(tap.tap(start + ms(10)), TapOutcome::Triggered);
        assert_eq!(tap.tap(start + ms(20)), TapOutcome::Counting(1));
    }
}
