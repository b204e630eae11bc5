//! ECU link monitor
//!
//! Watches the decoded frame stream for two failure modes: the line going
//! quiet (unplugged connector, ECU off) and the line carrying garbage
//! (wrong baud, noise). Either one blinks the EFI warning lamp.

use embassy_time::{Duration, Instant};
use sv650_hal::OutputPin;

/// Default time without a good frame before the link counts as lost
pub const LINK_TIMEOUT_MS: u64 = 2000;
/// Default consecutive checksum failures before the data counts as bad
pub const MAX_BAD_FRAMES: u8 = 5;
/// Default lamp blink half period
pub const BLINK_MS: u64 = 500;

/// Link health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkStatus {
    /// Good frames arriving
    Ok,
    /// No good frame within the timeout, or none yet
    NoData,
    /// Frames arriving but failing the checksum
    BadData,
}

/// Link monitor thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkSettings {
    /// Silence before [`LinkStatus::NoData`]
    pub timeout: Duration,
    /// Consecutive checksum failures before [`LinkStatus::BadData`]
    pub max_bad_frames: u8,
    /// Lamp on/off time while the link is unhealthy
    pub blink_half_period: Duration,
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(LINK_TIMEOUT_MS),
            max_bad_frames: MAX_BAD_FRAMES,
            blink_half_period: Duration::from_millis(BLINK_MS),
        }
    }
}

/// Tracks the last good frame and the current run of bad ones
#[derive(Debug, Clone)]
pub struct LinkMonitor {
    settings: LinkSettings,
    /// Arrival of the last frame that passed the checksum
    last_good: Option<Instant>,
    /// Checksum failures since the last good frame
    bad_streak: u8,
}

impl Default for LinkMonitor {
    fn default() -> Self {
        Self::new(LinkSettings::default())
    }
}

impl LinkMonitor {
    /// Create a monitor; the link starts as [`LinkStatus::NoData`]
    pub fn new(settings: LinkSettings) -> Self {
        Self {
            settings,
            last_good: None,
            bad_streak: 0,
        }
    }

    pub fn settings(&self) -> &LinkSettings {
        &self.settings
    }

    /// Record a decoded frame
    pub fn frame_decoded(&mut self, at: Instant, checksum_valid: bool) {
        if checksum_valid {
            self.last_good = Some(at);
            self.bad_streak = 0;
        } else {
            self.bad_streak = self.bad_streak.saturating_add(1);
        }
    }

    /// Link health at `now`
    ///
    /// Bad data takes precedence over no data.
    pub fn status(&self, now: Instant) -> LinkStatus {
        if self.bad_streak >= self.settings.max_bad_frames.max(1) {
            return LinkStatus::BadData;
        }

        match self.last_good {
            None => LinkStatus::NoData,
            Some(last) => match now.checked_duration_since(last) {
                Some(silence) if silence > self.settings.timeout => LinkStatus::NoData,
                _ => LinkStatus::Ok,
            },
        }
    }

    /// Check if link is healthy
    pub fn is_link_healthy(&self, now: Instant) -> bool {
        self.status(now) == LinkStatus::Ok
    }

    /// Consecutive checksum failures
    pub fn bad_streak(&self) -> u8 {
        self.bad_streak
    }

    /// EFI warning lamp state at `now`
    ///
    /// Off while the link is healthy, blinking otherwise.
    pub fn warning_lamp(&self, now: Instant) -> bool {
        if self.is_link_healthy(now) {
            return false;
        }
        let half = self.settings.blink_half_period.as_ticks().max(1);
        (now.as_ticks() / half) % 2 == 0
    }

    /// Drive the lamp output
    pub fn drive_lamp<P: OutputPin>(&self, now: Instant, lamp: &mut P) {
        lamp.set_state(self.warning_lamp(now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Lamp(bool);

    impl OutputPin for Lamp {
        fn set_high(&mut self) {
            self.0 = true;
        }

        fn set_low(&mut self) {
            self.0 = false;
        }

        fn is_set_high(&self) -> bool {
            self.0
        }
    }

    fn ms(millis: u64) -> Instant {
        Instant::from_millis(millis)
    }

    #[test]
    fn test_starts_without_data() {
        let monitor = LinkMonitor::default();
        assert_eq!(monitor.status(ms(0)), LinkStatus::NoData);
    }

    #[test]
    fn test_good_frame_makes_link_ok() {
        let mut monitor = LinkMonitor::default();
        monitor.frame_decoded(ms(100), true);
        assert_eq!(monitor.status(ms(100)), LinkStatus::Ok);
        assert_eq!(monitor.status(ms(100 + LINK_TIMEOUT_MS)), LinkStatus::Ok);
    }

    #[test]
    fn test_silence_loses_link() {
        let mut monitor = LinkMonitor::default();
        monitor.frame_decoded(ms(100), true);
        assert_eq!(
            monitor.status(ms(101 + LINK_TIMEOUT_MS)),
            LinkStatus::NoData
        );
    }

    #[test]
    fn test_bad_streak() {
        let mut monitor = LinkMonitor::default();
        monitor.frame_decoded(ms(0), true);

        for i in 1..MAX_BAD_FRAMES as u64 {
            monitor.frame_decoded(ms(i * 10), false);
            assert_eq!(monitor.status(ms(i * 10)), LinkStatus::Ok);
        }
        monitor.frame_decoded(ms(100), false);
        assert_eq!(monitor.status(ms(100)), LinkStatus::BadData);
        assert_eq!(monitor.bad_streak(), MAX_BAD_FRAMES);
    }

    #[test]
    fn test_good_frame_resets_streak() {
        let mut monitor = LinkMonitor::default();
        for i in 0..10 {
            monitor.frame_decoded(ms(i), false);
        }
        assert_eq!(monitor.status(ms(10)), LinkStatus::BadData);

        monitor.frame_decoded(ms(11), true);
        assert_eq!(monitor.bad_streak(), 0);
        assert!(monitor.is_link_healthy(ms(11)));
    }

    #[test]
    fn test_lamp_blinks_only_when_unhealthy() {
        let mut monitor = LinkMonitor::default();
        let mut lamp = Lamp(true);

        // No data yet: blinking with a 500 ms half period
        assert!(monitor.warning_lamp(ms(0)));
        assert!(!monitor.warning_lamp(ms(BLINK_MS)));
        assert!(monitor.warning_lamp(ms(2 * BLINK_MS)));

        monitor.frame_decoded(ms(1000), true);
        monitor.drive_lamp(ms(1000), &mut lamp);
        assert!(!lamp.is_set_high());
        monitor.drive_lamp(ms(1000 + 2 * LINK_TIMEOUT_MS), &mut lamp);
        assert!(lamp.is_set_high());
    }
}
