//! Mock implementations for testing
//!
//! This module provides software fakes of the calibration peripherals for use
//! in unit and integration tests. The fakes model the flag/enable semantics
//! the calibration core depends on and record every access for assertion.

use crate::{FastCounter, ReferenceTick};

/// One recorded access to a [`MockFastCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterAccess {
    /// Capture register read, with the value returned.
    ReadCapture(u16),
    /// Overflow flag cleared.
    ClearOverflow,
    /// Trigger flag cleared.
    ClearTrigger,
    /// Trigger-input mode bits cleared.
    DisableTriggerInput,
    /// Count reinitialized to zero.
    Restart,
    /// Counter enable bit cleared.
    Disable,
}

/// Capacity of the access log; accesses past this are counted but not logged.
pub const ACCESS_LOG_DEPTH: usize = 64;

/// Mock Fast Counter
pub struct MockFastCounter {
    capture: u16,
    overflow_flag: bool,
    trigger_flag: bool,
    trigger_input: bool,
    enabled: bool,
    overflow_acks: u32,
    trigger_acks: u32,
    spurious_acks: u32,
    discarded_overflows: u32,
    restarts: u32,
    log: heapless::Vec<CounterAccess, ACCESS_LOG_DEPTH>,
}

impl MockFastCounter {
    /// Create an enabled counter with trigger input mode selected and no
    /// pending conditions.
    pub fn new() -> Self {
        Self {
            capture: 0,
            overflow_flag: false,
            trigger_flag: false,
            trigger_input: true,
            enabled: true,
            overflow_acks: 0,
            trigger_acks: 0,
            spurious_acks: 0,
            discarded_overflows: 0,
            restarts: 0,
            log: heapless::Vec::new(),
        }
    }

    /// Simulate a counter wrap. Returns `false` (nothing raised) when disabled.
    pub fn raise_overflow(&mut self) -> bool {
        if self.enabled {
            self.overflow_flag = true;
        }
        self.enabled
    }

    /// Simulate a routed reference tick latching `capture`.
    ///
    /// Returns `false` (nothing latched or raised) when disabled.
    pub fn raise_trigger(&mut self, capture: u16) -> bool {
        if self.enabled {
            self.capture = capture;
            self.trigger_flag = true;
        }
        self.enabled
    }

    /// Overwrite the capture latch without raising the trigger condition.
    pub fn set_capture(&mut self, capture: u16) {
        self.capture = capture;
    }

    /// Number of overflow acknowledgments that cleared a set flag.
    pub fn overflow_acks(&self) -> u32 {
        self.overflow_acks
    }

    /// Number of trigger acknowledgments that cleared a set flag.
    pub fn trigger_acks(&self) -> u32 {
        self.trigger_acks
    }

    /// Number of acknowledgments of a flag that was not set.
    pub fn spurious_acks(&self) -> u32 {
        self.spurious_acks
    }

    /// Pending overflows dropped by [`FastCounter::restart`] instead of
    /// being acknowledged.
    pub fn discarded_overflows(&self) -> u32 {
        self.discarded_overflows
    }

    /// Number of [`FastCounter::restart`] calls.
    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    /// `true` until [`FastCounter::disable_trigger_input`] is called.
    pub fn trigger_input_enabled(&self) -> bool {
        self.trigger_input
    }

    /// Recorded accesses, oldest first.
    pub fn log(&self) -> &[CounterAccess] {
        &self.log
    }

    fn record(&mut self, access: CounterAccess) {
        // Full log: keep the oldest entries, drop the rest.
        let _ = self.log.push(access);
    }
}

impl Default for MockFastCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FastCounter for MockFastCounter {
    fn read_capture(&mut self) -> u16 {
        let value = self.capture;
        self.record(CounterAccess::ReadCapture(value));
        value
    }

    fn overflow_pending(&self) -> bool {
        self.overflow_flag
    }

    fn trigger_pending(&self) -> bool {
        self.trigger_flag
    }

    fn clear_overflow(&mut self) {
        if self.overflow_flag {
            self.overflow_acks = self.overflow_acks.saturating_add(1);
        } else {
            self.spurious_acks = self.spurious_acks.saturating_add(1);
        }
        self.overflow_flag = false;
        self.record(CounterAccess::ClearOverflow);
    }

    fn clear_trigger(&mut self) {
        if self.trigger_flag {
            self.trigger_acks = self.trigger_acks.saturating_add(1);
        } else {
            self.spurious_acks = self.spurious_acks.saturating_add(1);
        }
        self.trigger_flag = false;
        self.record(CounterAccess::ClearTrigger);
    }

    fn disable_trigger_input(&mut self) {
        self.trigger_input = false;
        self.record(CounterAccess::DisableTriggerInput);
    }

    fn restart(&mut self) {
        if self.overflow_flag {
            self.discarded_overflows = self.discarded_overflows.saturating_add(1);
        }
        self.overflow_flag = false;
        self.restarts = self.restarts.saturating_add(1);
        self.record(CounterAccess::Restart);
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.record(CounterAccess::Disable);
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}

/// Mock Reference Tick Generator
pub struct MockReferenceTick {
    period: u16,
    writes: u32,
}

impl MockReferenceTick {
    /// Create a generator already programmed with `period` (not counted as a write).
    pub fn new(period: u16) -> Self {
        Self { period, writes: 0 }
    }

    /// Number of period register writes since construction.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl ReferenceTick for MockReferenceTick {
    fn set_period(&mut self, period: u16) {
        self.period = period;
        self.writes = self.writes.saturating_add(1);
    }

    fn period(&self) -> u16 {
        self.period
    }
}
