//! Interrupt entry for the calibration run.
//!
//! TIM16 raises both the overflow (UIF) and the capture-trigger (CC1IF)
//! conditions on one vector, so the vector hands both to
//! [`Calibrator::service`], which reorders them when both are pending.

use calibration::Calibrator;
use platform::{CalibrationConfig, FastCounter, ReferenceTick};

/// Calibration window used by this firmware.
pub const CALIBRATION: CalibrationConfig = CalibrationConfig::RTC_WAKEUP_ONE_SECOND;

/// The process-wide calibration run.
///
/// Written only from the TIM16 vector; the idle loop reads it through
/// [`Calibrator::measurement`].
pub static CALIBRATOR: Calibrator = Calibrator::new(CALIBRATION);

/// Body of the Fast Counter vector, generic over the register bindings so it
/// runs against the mocks on the host.
pub fn service_fast_counter_irq<C: FastCounter, R: ReferenceTick>(
    calibrator: &Calibrator,
    counter: &mut C,
    tick: &mut R,
) {
    calibrator.service(counter, tick);
}

#[cfg(feature = "hardware")]
mod vector {
    use embassy_stm32::interrupt;

    use crate::hw::{RtcWakeupTick, Tim16FastCounter};

    #[interrupt]
    fn TIM16() {
        super::service_fast_counter_irq(
            &super::CALIBRATOR,
            &mut Tim16FastCounter,
            &mut RtcWakeupTick,
        );
    }
}
