//! State machine definition

use super::events::Event;

/// Node states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum NodeState {
    /// Indicator and display initialization
    #[default]
    Booting,
    /// Joining the WiFi network, retrying forever
    Connecting,
    /// Sampling loop; terminal
    Running,
    /// Unrecoverable fault; the node idles until reset
    Halted(FaultKind),
}

/// Faults that stop the node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// No display answered at boot
    DisplayMissing,
}

impl NodeState {
    /// Check if the sampling loop may tick
    pub fn sampling_allowed(&self) -> bool {
        matches!(self, NodeState::Running)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use NodeState::*;

        match (self, event) {
            // Booting transitions
            (Booting, DisplayReady) => Connecting,
            (Booting, DisplayFailed) => Halted(FaultKind::DisplayMissing),

            // Connecting transitions
            (Connecting, LinkAttemptFailed) => Connecting,
            (Connecting, LinkUp) => Running,

            // Running never goes back to Connecting; a link drop is only logged
            (Running, LinkDown) => Running,

            // Default: stay in current state
            _ => self,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boot_to_connecting() {
        let next = NodeState::Booting.transition(Event::DisplayReady);
        assert_eq!(next, NodeState::Connecting);
    }

    #[test]
    fn test_display_failure_halts() {
        let next = NodeState::Booting.transition(Event::DisplayFailed);
        assert_eq!(next, NodeState::Halted(FaultKind::DisplayMissing));

        // Nothing leaves the halted state
        for event in [Event::DisplayReady, Event::LinkUp, Event::LinkDown] {
            assert_eq!(next.transition(event), next);
        }
    }

    #[test]
    fn test_connect_retries_until_up() {
        let mut state = NodeState::Connecting;
        for _ in 0..10 {
            state = state.transition(Event::LinkAttemptFailed);
            assert_eq!(state, NodeState::Connecting);
        }

        state = state.transition(Event::LinkUp);
        assert_eq!(state, NodeState::Running);
    }

    #[test]
    fn test_running_ignores_link_events() {
        let state = NodeState::Running;
        assert_eq!(state.transition(Event::LinkDown), NodeState::Running);
        assert_eq!(state.transition(Event::LinkAttemptFailed), NodeState::Running);
    }

    #[test]
    fn test_sampling_allowed() {
        assert!(NodeState::Running.sampling_allowed());
        assert!(!NodeState::Booting.sampling_allowed());
        assert!(!NodeState::Connecting.sampling_allowed());
        assert!(!NodeState::Halted(FaultKind::DisplayMissing).sampling_allowed());
    }

    #[test]
    fn test_link_up_ignored_while_booting() {
        assert_eq!(
            NodeState::Booting.transition(Event::LinkUp),
            NodeState::Booting
        );
    }
}
