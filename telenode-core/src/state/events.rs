//! Events that trigger state transitions

/// Lifecycle events reported by the firmware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Boot events
    /// Display controller initialized
    DisplayReady,
    /// Display did not answer its init sequence
    DisplayFailed,

    // Link events
    /// One join attempt failed; another follows after the retry delay
    LinkAttemptFailed,
    /// Associated and holding a DHCP lease
    LinkUp,
    /// Link dropped after it was up
    LinkDown,
}
