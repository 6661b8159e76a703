//! Shared calibration state and the two interrupt handlers that write it.
//!
//! [`Calibrator`] is meant to live in a `static` and be driven from interrupt
//! context through the [`FastCounter`] and [`ReferenceTick`] traits:
//!
//! - [`Calibrator::on_overflow`] for the counter-wrap condition,
//! - [`Calibrator::on_trigger`] for the capture-trigger condition,
//! - [`Calibrator::service`] when both conditions share one vector.
//!
//! The idle loop reads the result through [`Calibrator::measurement`].

use core::cell::Cell;

use critical_section::Mutex;
use platform::{CalibrationConfig, FastCounter, ReferenceTick};

use crate::handshake::{HandshakeState, TriggerAction};
use crate::measurement::{Measurement, MeasurementError};

/// Process-wide state of one calibration run.
pub struct Calibrator {
    config: CalibrationConfig,
    /// OverflowCount. Written by the overflow handler; reset once on alignment.
    overflows: Mutex<Cell<u32>>,
    /// CaptureValue. Written by the trigger handler only.
    capture: Mutex<Cell<u16>>,
    /// Written by the trigger handler only.
    state: Mutex<Cell<HandshakeState>>,
    /// Set by the window-closing trigger; never cleared.
    latched: Mutex<Cell<bool>>,
}

impl Calibrator {
    /// Zero-initialized run, awaiting alignment.
    pub const fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            overflows: Mutex::new(Cell::new(0)),
            capture: Mutex::new(Cell::new(0)),
            state: Mutex::new(Cell::new(HandshakeState::AwaitingAlignment)),
            latched: Mutex::new(Cell::new(false)),
        }
    }

    // ── Interrupt handlers ──────────────────────────────────────────────────

    /// Overflow handler: acknowledge the wrap, then count it.
    ///
    /// The acknowledgment comes first and is unconditional; a missed clear
    /// re-enters this handler forever. Touches neither the capture nor the
    /// handshake state.
    pub fn on_overflow<C: FastCounter>(&self, counter: &mut C) {
        counter.clear_overflow();
        critical_section::with(|cs| {
            let overflows = self.overflows.borrow(cs);
            overflows.set(overflows.get().saturating_add(1));
        });
    }

    /// Capture-trigger handler: acknowledge the trigger, then advance the
    /// handshake.
    ///
    /// - First trigger: the capture is read and discarded, `tick` gets the
    ///   true window period, the trigger input mode is dropped, the counter
    ///   is restarted and the overflow tally is zeroed. All of it inside one
    ///   critical section, so an overflow cannot land between the reset and
    ///   the state change. The counter restart follows the tick restart, so
    ///   the two window origins differ by the tick generator's start-up
    ///   latency.
    /// - Second trigger: the capture is kept and the counter is disabled,
    ///   freezing the result.
    /// - Any later trigger is acknowledged and ignored.
    pub fn on_trigger<C: FastCounter, R: ReferenceTick>(&self, counter: &mut C, tick: &mut R) {
        counter.clear_trigger();
        critical_section::with(|cs| {
            let state = self.state.borrow(cs);
            if self.latched.borrow(cs).get() {
                warn!(
                    "calibration: trigger in {=str} after result latched, ignored",
                    state.get().name()
                );
                return;
            }

            let (next, action) = state.get().on_trigger();
            match action {
                TriggerAction::DiscardAndAlign => {
                    let stale = counter.read_capture();
                    self.capture.borrow(cs).set(stale);
                    tick.set_period(self.config.reference_period);
                    counter.disable_trigger_input();
                    counter.restart();
                    let discarded = self.overflows.borrow(cs).replace(0);
                    debug!(
                        "calibration: {=str} -> {=str} (discarded capture={=u16}, overflows={=u32})",
                        state.get().name(),
                        next.name(),
                        stale,
                        discarded
                    );
                }
                TriggerAction::LatchResult => {
                    let capture = counter.read_capture();
                    self.capture.borrow(cs).set(capture);
                    counter.disable();
                    self.latched.borrow(cs).set(true);
                    info!(
                        "calibration: window closed (overflows={=u32}, capture={=u16})",
                        self.overflows.borrow(cs).get(),
                        capture
                    );
                }
            }
            state.set(next);
        });
    }

    /// Entry point for a vector shared by the overflow and trigger conditions.
    ///
    /// Each handler runs only if its own flag is pending. When both are
    /// pending the order is reconstructed from the latched capture: a value in
    /// the lower half of the counter range means the wrap happened before the
    /// tick. The overflow flag is checked again after the trigger handler,
    /// since a counter restarted by alignment has no earlier wrap to count.
    pub fn service<C: FastCounter, R: ReferenceTick>(&self, counter: &mut C, tick: &mut R) {
        match (counter.overflow_pending(), counter.trigger_pending()) {
            (true, true) => {
                if self.wrap_preceded_capture(counter.read_capture()) {
                    self.on_overflow(counter);
                    self.on_trigger(counter, tick);
                } else {
                    self.on_trigger(counter, tick);
                    // An alignment restart discards the wrap.
                    if !counter.overflow_pending() {
                        return;
                    }
                    if self.is_latched() {
                        // The wrap belongs after the window.
                        counter.clear_overflow();
                        trace!("calibration: overflow after window close not counted");
                    } else {
                        self.on_overflow(counter);
                    }
                }
            }
            (true, false) => self.on_overflow(counter),
            (false, true) => self.on_trigger(counter, tick),
            (false, false) => {}
        }
    }

    fn wrap_preceded_capture(&self, capture: u16) -> bool {
        u32::from(capture) < self.config.wrap_modulus().wrapping_div(2)
    }

    // ── Accessors ───────────────────────────────────────────────────────────

    /// Handshake phase, for consumers implementing their own polling.
    pub fn handshake_state(&self) -> HandshakeState {
        critical_section::with(|cs| self.state.borrow(cs).get())
    }

    /// Current OverflowCount. Only meaningful once the result is latched.
    pub fn overflow_count(&self) -> u32 {
        critical_section::with(|cs| self.overflows.borrow(cs).get())
    }

    /// Current CaptureValue. Only meaningful once the result is latched.
    pub fn capture_value(&self) -> u16 {
        critical_section::with(|cs| self.capture.borrow(cs).get())
    }

    /// `true` once the window-closing trigger has been handled.
    pub fn is_latched(&self) -> bool {
        critical_section::with(|cs| self.latched.borrow(cs).get())
    }

    /// Configuration this run was built with.
    pub const fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    // ── Result gate ─────────────────────────────────────────────────────────

    /// Frozen result, once the Fast Counter has been observed disabled by the
    /// window-closing trigger.
    ///
    /// Never blocks. Once `Ok`, every later call returns the same value.
    ///
    /// # Errors
    ///
    /// - [`MeasurementError::AwaitingAlignment`] before the first trigger.
    /// - [`MeasurementError::InProgress`] while the window is open.
    /// - [`MeasurementError::Stopped`] if the counter was disabled without
    ///   the window-closing trigger.
    pub fn measurement<C: FastCounter>(&self, counter: &C) -> Result<Measurement, MeasurementError> {
        critical_section::with(|cs| {
            let latched = self.latched.borrow(cs).get();
            match (counter.is_enabled(), latched) {
                (false, true) => Ok(Measurement {
                    overflows: self.overflows.borrow(cs).get(),
                    capture: self.capture.borrow(cs).get(),
                    wrap_modulus: self.config.wrap_modulus(),
                }),
                (false, false) => Err(MeasurementError::Stopped),
                (true, _) if self.state.borrow(cs).get().is_measuring() => {
                    Err(MeasurementError::InProgress)
                }
                (true, _) => Err(MeasurementError::AwaitingAlignment),
            }
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
