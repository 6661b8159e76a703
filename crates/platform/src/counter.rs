//! Register interface of the two calibration peripherals.
//!
//! The calibration core never touches memory-mapped registers directly. The
//! firmware binds these traits to the real peripherals; tests bind them to
//! [`crate::mocks`].
//!
//! Every operation is a bounded register access that cannot fail, and every
//! one of them may be called from interrupt context. There is no `Error`
//! associated type; the interrupt handlers have no path to report one.

/// Narrow hardware counter clocked by the signal under measurement.
///
/// The counter counts from 0 up to its compare-clear value and wraps, raising
/// the *overflow* condition. A routed reference event latches the running
/// value into the capture register and raises the *trigger* condition.
pub trait FastCounter {
    /// Read the capture register latched by the most recent trigger.
    ///
    /// On some parts the read also clears the trigger flag, which is why this
    /// takes `&mut self`. The latched value itself is unchanged until the next
    /// trigger, so repeated reads return the same value.
    fn read_capture(&mut self) -> u16;

    /// `true` while the overflow condition flag is set.
    fn overflow_pending(&self) -> bool;

    /// `true` while the capture-trigger condition flag is set.
    fn trigger_pending(&self) -> bool;

    /// Acknowledge the overflow condition.
    ///
    /// Must only clear the overflow flag; the trigger flag is untouched.
    fn clear_overflow(&mut self);

    /// Acknowledge the capture-trigger condition.
    ///
    /// Must only clear the trigger flag; the overflow flag is untouched.
    fn clear_trigger(&mut self);

    /// Clear the trigger-input mode selection bits.
    ///
    /// Used once, after the sacrificial first trigger, so the input-path
    /// synchronization setting does not persist into the measured window.
    fn disable_trigger_input(&mut self);

    /// Reinitialize the count to zero without stopping the counter.
    ///
    /// Opens the measured window. An overflow condition still pending from
    /// before the restart lies outside the window: it is discarded here, not
    /// acknowledged through [`clear_overflow`](Self::clear_overflow). The
    /// trigger flag and the capture latch are untouched.
    fn restart(&mut self);

    /// Stop the counter: no further counting, overflow or trigger conditions.
    fn disable(&mut self);

    /// `true` while the counter enable bit is set.
    fn is_enabled(&self) -> bool;
}

/// Free-running divider clocked by the trusted reference source.
///
/// Its periodic event is routed, without CPU involvement, to the
/// [`FastCounter`] capture trigger.
pub trait ReferenceTick {
    /// Write the period register.
    fn set_period(&mut self, period: u16);

    /// Current period register value.
    fn period(&self) -> u16;
}
