//! Keep-alive scheduling and synthetic input synthesis.
//!
//! While a session is spawned, the bot sends one harmless player-input packet
//! per interval so the server's idle timer never fires. The scheduler here is
//! a passive timer: the controller polls [`KeepAlive::tick`] from its event
//! loop, so a firing can never race the lifecycle handlers.

use afkbot_transport::{PlayerInput, Vec3};
use rand::Rng;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Time between keep-alive firings.
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// A cancellable repeating timer, armed only while the session is spawned.
#[derive(Default)]
pub struct KeepAlive {
    interval: Option<Interval>,
}

impl KeepAlive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arms the timer; the first firing happens one full interval from now.
    /// Arming an already-armed scheduler is a no-op.
    pub fn arm(&mut self) {
        if self.interval.is_none() {
            let mut interval =
                tokio::time::interval_at(Instant::now() + KEEPALIVE_INTERVAL, KEEPALIVE_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.interval = Some(interval);
        }
    }

    /// Cancels the timer. Disarming an already-disarmed scheduler is a no-op.
    pub fn disarm(&mut self) {
        self.interval = None;
    }

    pub fn is_armed(&self) -> bool {
        self.interval.is_some()
    }

    /// Completes at the next firing. While disarmed this future is pending
    /// forever, which makes it safe to poll unconditionally from a `select!`.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => std::future::pending().await,
        }
    }
}

/// Synthesizes one inert input tick: zeroed position, random heading, level
/// pitch, and a timestamp-derived tick counter.
pub fn synthesize_tick(runtime_id: u64) -> PlayerInput {
    let yaw = rand::rng().random_range(0.0_f32..360.0);
    let tick = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default();
    PlayerInput {
        runtime_id,
        position: Vec3::ZERO,
        yaw,
        pitch: 0.0,
        input_flags: 0,
        input_mode: 1,
        play_mode: 0,
        tick,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_yaw_in_range_and_pitch_level() {
        for _ in 0..256 {
            let tick = synthesize_tick(1);
            assert!((0.0..360.0).contains(&tick.yaw), "yaw {} out of range", tick.yaw);
            assert_eq!(tick.pitch, 0.0);
            assert_eq!(tick.position, Vec3::ZERO);
        }
    }

    #[test]
    fn tick_counter_is_monotonic() {
        let a = synthesize_tick(1);
        let b = synthesize_tick(1);
        assert!(b.tick >= a.tick);
    }

    #[tokio::test(start_paused = true)]
    async fn arm_and_disarm_are_idempotent() {
        let mut keepalive = KeepAlive::new();
        assert!(!keepalive.is_armed());

        keepalive.arm();
        keepalive.arm();
        assert!(keepalive.is_armed());

        keepalive.disarm();
        keepalive.disarm();
        assert!(!keepalive.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn disarmed_scheduler_never_fires() {
        let mut keepalive = KeepAlive::new();
        let fired = tokio::time::timeout(Duration::from_secs(120), keepalive.tick()).await;
        assert!(fired.is_err(), "disarmed scheduler must stay pending");
    }

    #[tokio::test(start_paused = true)]
    async fn armed_scheduler_fires_after_one_interval() {
        let mut keepalive = KeepAlive::new();
        keepalive.arm();

        // Nothing before the interval elapses.
        let early = tokio::time::timeout(Duration::from_secs(29), keepalive.tick()).await;
        assert!(early.is_err());

        // The firing lands on the interval boundary.
        let on_time = tokio::time::timeout(Duration::from_secs(2), keepalive.tick()).await;
        assert!(on_time.is_ok());
    }
}
