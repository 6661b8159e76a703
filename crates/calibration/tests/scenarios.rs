//! End-to-end calibration runs against the software fakes.
//!
//! Each test drives a fresh [`Calibrator`] through a full run: wraps before
//! alignment, the sacrificial trigger, wraps inside the window, and the
//! window-closing trigger.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]

use calibration::{Calibrator, HandshakeState, MeasurementError};
use platform::mocks::{MockFastCounter, MockReferenceTick};
use platform::{CalibrationConfig, FastCounter, ReferenceTick};

struct Rig {
    cal: Calibrator,
    counter: MockFastCounter,
    tick: MockReferenceTick,
}

impl Rig {
    fn new(config: CalibrationConfig) -> Self {
        Self {
            cal: Calibrator::new(config),
            counter: MockFastCounter::new(),
            tick: MockReferenceTick::new(config.alignment_period),
        }
    }

    fn overflows(&mut self, n: u32) {
        for _ in 0..n {
            assert!(self.counter.raise_overflow());
            self.cal.on_overflow(&mut self.counter);
        }
    }

    fn trigger(&mut self, capture: u16) {
        assert!(self.counter.raise_trigger(capture));
        self.cal.on_trigger(&mut self.counter, &mut self.tick);
    }
}

// ── Scenario A ── wraps on both sides of alignment ───────────────────────────

#[test]
fn test_scenario_a_pre_alignment_wraps_are_discarded() {
    let mut rig = Rig::new(CalibrationConfig::ONE_SECOND);

    rig.overflows(3);
    rig.trigger(2000);
    assert_eq!(rig.cal.handshake_state(), HandshakeState::Measuring);
    assert_eq!(rig.cal.overflow_count(), 0);

    rig.overflows(5);
    rig.trigger(100);

    let m = rig.cal.measurement(&rig.counter).unwrap();
    assert_eq!(m.overflows, 5);
    assert_eq!(m.capture, 100);
    assert_eq!(m.total_cycles(), 20_580);
}

// ── Scenario B ── back-to-back triggers ──────────────────────────────────────

#[test]
fn test_scenario_b_no_wraps_gives_capture_only() {
    let mut rig = Rig::new(CalibrationConfig::ONE_SECOND);

    rig.trigger(17);
    rig.trigger(333);

    let m = rig.cal.measurement(&rig.counter).unwrap();
    assert_eq!(m.overflows, 0);
    assert_eq!(m.capture, 333);
    assert_eq!(m.total_cycles(), 333);
}

// ── Scenario C ── ~70 000 edges in the window ────────────────────────────────

#[test]
fn test_scenario_c_seventeen_wraps() {
    let mut rig = Rig::new(CalibrationConfig::ONE_SECOND);

    rig.trigger(0);
    rig.overflows(70_000 / 4096);
    rig.trigger(50);

    let m = rig.cal.measurement(&rig.counter).unwrap();
    assert_eq!(m.overflows, 17);
    assert_eq!(m.capture, 50);
    assert_eq!(m.total_cycles(), 69_682);
}

// ── Scenario D ── full-length one-second window ──────────────────────────────

/// A 64 MHz measured clock wraps 15 625 times per second with a 12-bit top.
#[test]
fn test_scenario_d_64mhz_one_second_window() {
    let mut rig = Rig::new(CalibrationConfig::ONE_SECOND);

    rig.overflows(2);
    rig.trigger(3071);
    rig.overflows(15_625);
    rig.trigger(0);

    let m = rig.cal.measurement(&rig.counter).unwrap();
    assert_eq!(m.total_cycles(), 64_000_000);
    assert_eq!(rig.counter.overflow_acks(), 15_627);
    assert_eq!(rig.counter.trigger_acks(), 2);
    assert_eq!(rig.counter.spurious_acks(), 0);
}

// ── Run-level boundary behaviour ─────────────────────────────────────────────

#[test]
fn test_tick_period_switches_from_alignment_to_window() {
    let mut rig = Rig::new(CalibrationConfig::ONE_SECOND);
    assert_eq!(rig.tick.period(), 0x0009);

    rig.trigger(0);
    assert_eq!(rig.tick.period(), 0x7FFF);

    rig.trigger(0);
    assert_eq!(rig.tick.period(), 0x7FFF);
    assert_eq!(rig.tick.writes(), 1);
}

#[test]
fn test_disabled_counter_raises_nothing_more() {
    let mut rig = Rig::new(CalibrationConfig::ONE_SECOND);
    rig.trigger(0);
    rig.trigger(9);

    assert!(!rig.counter.is_enabled());
    assert!(!rig.counter.raise_overflow());
    assert!(!rig.counter.raise_trigger(1));
}

#[test]
fn test_gate_sequence_over_a_run() {
    let mut rig = Rig::new(CalibrationConfig::ONE_SECOND);
    assert_eq!(
        rig.cal.measurement(&rig.counter),
        Err(MeasurementError::AwaitingAlignment)
    );

    rig.overflows(4);
    assert_eq!(
        rig.cal.measurement(&rig.counter),
        Err(MeasurementError::AwaitingAlignment)
    );

    rig.trigger(0);
    rig.overflows(4);
    assert_eq!(
        rig.cal.measurement(&rig.counter),
        Err(MeasurementError::InProgress)
    );

    rig.trigger(12);
    assert!(rig.cal.measurement(&rig.counter).is_ok());
}

/// A 16-bit counter top changes the modulus carried in the result.
#[test]
fn test_custom_counter_top_flows_into_result() {
    let config = CalibrationConfig {
        counter_top: u16::MAX,
        ..CalibrationConfig::ONE_SECOND
    };
    assert_eq!(config.validate(), Ok(()));
    let mut rig = Rig::new(config);

    rig.trigger(0);
    rig.overflows(2);
    rig.trigger(10);

    let m = rig.cal.measurement(&rig.counter).unwrap();
    assert_eq!(m.wrap_modulus, 65_536);
    assert_eq!(m.total_cycles(), 2 * 65_536 + 10);
}
