//! One-shot alignment handshake.
//!
//! The handshake is a two-state machine driven only by capture triggers. It
//! never returns to [`HandshakeState::AwaitingAlignment`]; the end of the
//! measured window is signalled by the Fast Counter being disabled, not by a
//! third state.

/// Handshake phase of a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    /// No trigger seen yet. The next trigger is discarded and used to align
    /// the Fast Counter to the Reference Tick boundary.
    #[default]
    AwaitingAlignment,
    /// Aligned. The next trigger closes the measured window.
    Measuring,
}

/// What the trigger handler must do for one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerAction {
    /// Throw the capture away, program the true window period, drop the
    /// trigger input mode and zero the overflow tally.
    DiscardAndAlign,
    /// Keep the capture as the final remainder and stop the counter.
    LatchResult,
}

impl HandshakeState {
    /// Transition taken on a capture trigger.
    ///
    /// Returns the next state and the action the handler must perform.
    pub const fn on_trigger(self) -> (Self, TriggerAction) {
        match self {
            Self::AwaitingAlignment => (Self::Measuring, TriggerAction::DiscardAndAlign),
            Self::Measuring => (Self::Measuring, TriggerAction::LatchResult),
        }
    }

    /// `true` once the sacrificial trigger has been handled.
    pub const fn is_measuring(self) -> bool {
        matches!(self, Self::Measuring)
    }

    /// Short display name, for log output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::AwaitingAlignment => "awaiting-alignment",
            Self::Measuring => "measuring",
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_awaits_alignment() {
        assert_eq!(HandshakeState::default(), HandshakeState::AwaitingAlignment);
        assert!(!HandshakeState::default().is_measuring());
    }

    /// First trigger discards and moves to Measuring.
    #[test]
    fn test_first_trigger_aligns() {
        let (next, action) = HandshakeState::AwaitingAlignment.on_trigger();
        assert_eq!(next, HandshakeState::Measuring);
        assert_eq!(action, TriggerAction::DiscardAndAlign);
    }

    /// Second trigger latches and stays in Measuring.
    #[test]
    fn test_second_trigger_latches() {
        let (next, action) = HandshakeState::Measuring.on_trigger();
        assert_eq!(next, HandshakeState::Measuring);
        assert_eq!(action, TriggerAction::LatchResult);
    }

    /// No sequence of triggers ever leads back to AwaitingAlignment.
    #[test]
    fn test_never_returns_to_awaiting_alignment() {
        let mut state = HandshakeState::AwaitingAlignment;
        for _ in 0..8 {
            state = state.on_trigger().0;
            assert_ne!(state, HandshakeState::AwaitingAlignment);
        }
    }

    /// DiscardAndAlign is produced exactly once over any trigger sequence.
    #[test]
    fn test_align_action_happens_once() {
        let mut state = HandshakeState::AwaitingAlignment;
        let mut aligns = 0u32;
        for _ in 0..8 {
            let (next, action) = state.on_trigger();
            if action == TriggerAction::DiscardAndAlign {
                aligns = aligns.saturating_add(1);
            }
            state = next;
        }
        assert_eq!(aligns, 1);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(HandshakeState::AwaitingAlignment.name(), "awaiting-alignment");
        assert_eq!(HandshakeState::Measuring.name(), "measuring");
    }
}
