//! Push-button debouncing and the reporting-mode toggle
//!
//! The button is wired active-low: a raw LOW level means pressed. A raw
//! level only becomes the stable level after it has held unchanged for
//! longer than the debounce delay. Each committed transition to LOW flips
//! the reporting mode; releasing the button does nothing.
//!
//! Timestamps are free-running milliseconds and may wrap.

use telenode_hal::OutputPin;

/// Default settle time in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;

/// Debounced push-button that toggles reporting on each press
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebouncedToggle {
    /// Committed level (`true` = HIGH = released)
    stable_high: bool,
    /// Raw level seen on the previous poll
    last_raw_high: bool,
    /// When the raw level last changed
    last_change_ms: u32,
    /// Current reporting mode
    reporting: bool,
    /// Required settle time
    delay_ms: u32,
}

impl DebouncedToggle {
    /// Create a toggle with the button released and reporting off
    pub fn new(delay_ms: u32) -> Self {
        Self {
            stable_high: true,
            last_raw_high: true,
            last_change_ms: 0,
            reporting: false,
            delay_ms,
        }
    }

    /// Feed one raw level sample
    ///
    /// Returns the new reporting mode when a debounced press toggled it.
    pub fn update(&mut self, raw_high: bool, now_ms: u32) -> Option<bool> {
        if raw_high != self.last_raw_high {
            self.last_change_ms = now_ms;
        }
        self.last_raw_high = raw_high;

        let held_ms = now_ms.wrapping_sub(self.last_change_ms);
        if held_ms <= self.delay_ms || raw_high == self.stable_high {
            return None;
        }

        self.stable_high = raw_high;
        if raw_high {
            // Release
            return None;
        }

        self.reporting = !self.reporting;
        Some(self.reporting)
    }

    /// Feed one raw level sample and mirror a toggle onto `indicator`
    ///
    /// Returns the reporting mode after this poll.
    pub fn poll<O: OutputPin>(&mut self, raw_high: bool, now_ms: u32, indicator: &mut O) -> bool {
        if let Some(reporting) = self.update(raw_high, now_ms) {
            indicator.set_state(reporting);
        }
        self.reporting
    }

    /// Current reporting mode
    pub fn reporting(&self) -> bool {
        self.reporting
    }
}

impl Default for DebouncedToggle {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Led {
        high: bool,
        writes: usize,
    }

    impl OutputPin for Led {
        fn set_high(&mut self) {
            self.high = true;
            self.writes += 1;
        }

        fn set_low(&mut self) {
            self.high = false;
            self.writes += 1;
        }

        fn is_set_high(&self) -> bool {
            self.high
        }
    }

    /// Poll every `step` ms from `start` up to and including `end`
    fn hold(toggle: &mut DebouncedToggle, high: bool, start: u32, end: u32, step: u32) -> usize {
        let mut toggles = 0;
        let mut now = start;
        while now <= end {
            if toggle.update(high, now).is_some() {
                toggles += 1;
            }
            now += step;
        }
        toggles
    }

    #[test]
    fn test_press_held_past_delay_toggles_once() {
        let mut toggle = DebouncedToggle::new(50);

        let toggles = hold(&mut toggle, false, 1000, 1060, 10);
        assert_eq!(toggles, 1);
        assert!(toggle.reporting());

        // Release and stay released
        assert_eq!(hold(&mut toggle, true, 1070, 1300, 10), 0);
        assert!(toggle.reporting());
    }

    #[test]
    fn test_short_press_ignored() {
        let mut toggle = DebouncedToggle::new(50);

        assert_eq!(hold(&mut toggle, false, 1000, 1030, 10), 0);
        assert_eq!(hold(&mut toggle, true, 1040, 1300, 10), 0);
        assert!(!toggle.reporting());
        assert!(toggle.stable_high);
    }

    #[test]
    fn test_exact_delay_not_enough() {
        let mut toggle = DebouncedToggle::new(50);

        assert_eq!(toggle.update(false, 1000), None);
        assert_eq!(toggle.update(false, 1050), None);
        assert_eq!(toggle.update(false, 1051), Some(true));
    }

    #[test]
    fn test_second_press_toggles_back() {
        let mut toggle = DebouncedToggle::new(50);

        hold(&mut toggle, false, 1000, 1100, 10);
        hold(&mut toggle, true, 1110, 1200, 10);
        assert_eq!(hold(&mut toggle, false, 1210, 1300, 10), 1);
        assert!(!toggle.reporting());
    }

    #[test]
    fn test_timestamp_wraparound() {
        let mut toggle = DebouncedToggle::new(50);
        let start = u32::MAX - 20;

        assert_eq!(toggle.update(false, start), None);
        assert_eq!(toggle.update(false, start.wrapping_add(51)), Some(true));
    }

    #[test]
    fn test_poll_drives_indicator() {
        let mut toggle = DebouncedToggle::new(50);
        let mut led = Led::default();

        assert!(!toggle.poll(false, 1000, &mut led));
        assert_eq!(led.writes, 0);

        assert!(toggle.poll(false, 1060, &mut led));
        assert!(led.is_set_high());
        assert_eq!(led.writes, 1);

        // Holding the button does not rewrite the indicator
        assert!(toggle.poll(false, 1200, &mut led));
        assert_eq!(led.writes, 1);
    }

    proptest! {
        #[test]
        fn prop_bounce_never_toggles(
            segments in prop::collection::vec(1u32..=50, 1..40),
        ) {
            let mut toggle = DebouncedToggle::new(50);
            let mut now = 1000u32;
            let mut high = false;

            for duration in segments {
                for offset in 0..duration {
                    prop_assert_eq!(toggle.update(high, now + offset), None);
                }
                now += duration;
                high = !high;
            }

            prop_assert!(!toggle.reporting());
        }

        #[test]
        fn prop_settled_presses_each_toggle_once(
            segments in prop::collection::vec(52u32..=300, 1..20),
        ) {
            let mut toggle = DebouncedToggle::new(50);
            let mut now = 1000u32;
            let mut high = false;
            let mut presses = 0usize;
            let mut toggles = 0usize;

            for duration in segments {
                if !high {
                    presses += 1;
                }
                for offset in 0..duration {
                    if toggle.update(high, now + offset).is_some() {
                        toggles += 1;
                    }
                }
                now += duration;
                high = !high;
            }

            prop_assert_eq!(toggles, presses);
            prop_assert_eq!(toggle.reporting(), presses % 2 == 1);
        }
    }
}
