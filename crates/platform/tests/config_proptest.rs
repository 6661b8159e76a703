//! Property-based tests for calibration window configuration.
//! Verifies invariants hold for ALL register values, not just the presets.
#![allow(clippy::arithmetic_side_effects)]

use platform::{CalibrationConfig, ClockSource, ConfigError};

proptest::proptest! {
    /// wrap_modulus never saturates: every u16 top gives top + 1.
    #[test]
    fn wrap_modulus_is_top_plus_one(top in 0u16..=u16::MAX) {
        let cfg = CalibrationConfig { counter_top: top, ..CalibrationConfig::ONE_SECOND };
        assert_eq!(cfg.wrap_modulus(), u32::from(top) + 1);
    }

    /// window_ticks never saturates: every u16 period gives period + 1.
    #[test]
    fn window_ticks_is_period_plus_one(period in 0u16..=u16::MAX) {
        let cfg = CalibrationConfig { reference_period: period, ..CalibrationConfig::ONE_SECOND };
        assert_eq!(cfg.window_ticks(), u32::from(period) + 1);
    }

    /// Any non-zero alignment strictly below the window, with non-zero top
    /// and clock, validates.
    #[test]
    fn valid_combinations_pass(
        reference in 2u16..=u16::MAX,
        alignment_seed in 1u16..=u16::MAX,
        top in 1u16..=u16::MAX,
        hz in 1u32..=u32::MAX,
    ) {
        let alignment = 1 + alignment_seed % (reference - 1);
        let cfg = CalibrationConfig {
            measured_clock: ClockSource::Hsi,
            reference_clock_hz: hz,
            alignment_period: alignment,
            reference_period: reference,
            counter_top: top,
        };
        assert_eq!(cfg.validate(), Ok(()), "{cfg:?}");
    }

    /// An alignment period at or above the window is always rejected.
    #[test]
    fn alignment_not_shorter_is_rejected(reference in 1u16..=u16::MAX, extra in 0u16..=64) {
        let alignment = reference.saturating_add(extra);
        let cfg = CalibrationConfig {
            alignment_period: alignment,
            reference_period: reference,
            ..CalibrationConfig::ONE_SECOND
        };
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::AlignmentNotShorter { alignment, reference })
        );
    }
}

// ── Presets ──────────────────────────────────────────────────────────────────

#[test]
fn presets_share_alignment_and_counter() {
    let a = CalibrationConfig::ONE_SECOND;
    let b = CalibrationConfig::RTC_WAKEUP_ONE_SECOND;
    assert_eq!(a.alignment_period, b.alignment_period);
    assert_eq!(a.counter_top, b.counter_top);
    assert_eq!(a.window_ticks(), a.reference_clock_hz);
    assert_eq!(b.window_ticks(), b.reference_clock_hz);
}
