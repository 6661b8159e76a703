//! Result availability gate.
//!
//! The `(OverflowCount, CaptureValue)` pair is only self-consistent once the
//! window-closing trigger has latched it and stopped the Fast Counter. This
//! module defines the frozen result and why it may not be available yet.
//! Polling for it is the application's job; see
//! [`Calibrator::measurement`](crate::Calibrator::measurement).

/// Why a measurement is not available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementError {
    /// The sacrificial first trigger has not arrived.
    #[error("waiting for the alignment trigger")]
    AwaitingAlignment,
    /// Aligned, but the window-closing trigger has not arrived.
    #[error("measurement window still open")]
    InProgress,
    /// The Fast Counter was disabled without the window-closing trigger.
    /// The counters will never become consistent.
    #[error("fast counter stopped before the window closed")]
    Stopped,
}

/// Frozen result of one calibration window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurement {
    /// Fast Counter wraps counted inside the window.
    pub overflows: u32,
    /// Fast Counter value latched by the window-closing tick.
    pub capture: u16,
    /// Counter edges per wrap (FastCounterWrapModulus).
    pub wrap_modulus: u32,
}

impl Measurement {
    /// Fast Counter edges elapsed during exactly one Reference Tick window.
    ///
    /// `overflows * wrap_modulus + capture`; cannot overflow a `u64` for any
    /// `u32` tally and modulus.
    pub fn total_cycles(&self) -> u64 {
        u64::from(self.overflows)
            .saturating_mul(u64::from(self.wrap_modulus))
            .saturating_add(u64::from(self.capture))
    }
}
