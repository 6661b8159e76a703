//! Register bindings of the calibration peripherals on STM32H743.
//!
//! | Role                     | Peripheral                        |
//! |--------------------------|-----------------------------------|
//! | Fast Counter             | TIM16, channel 1 input capture    |
//! | Reference Tick Generator | RTC wakeup timer, LSE/2 (16 kHz)  |
//! | Event Router             | TIM16_TISEL.TI1SEL = RTC wakeup   |
//!
//! The embassy-stm32 drivers expose neither the wakeup timer period nor TIM16
//! input selection, so both are driven through the PAC it re-exports
//! (`unstable-pac`).
//!
//! # Sources
//!
//! - RM0433 Rev 8 §43 (TIM16/TIM17), §46 (RTC), §8.7 (RCC enable registers)

/// TIM16_TISEL.TI1SEL = 0011: TI1 fed from the RTC wakeup event.
///
/// Taken from the RM0433 TIM16 input table; confirm on silicon.
pub const TIM16_TI1_RTC_WAKEUP: u32 = 0b0011;

/// RTC write-protection unlock keys, written in order.
pub const RTC_WPR_UNLOCK: [u8; 2] = [0xCA, 0x53];

/// Any key outside the unlock sequence relocks.
pub const RTC_WPR_LOCK: u8 = 0xFF;

/// Upper bound on WUTWF polls. WUTWF rises within 2 RTCCLK cycles (~61 µs
/// at LSE), far below this at any core clock.
pub const WUTWF_SPIN_LIMIT: u32 = 100_000;

#[cfg(feature = "hardware")]
pub use bindings::{RtcWakeupTick, Tim16FastCounter};

#[cfg(feature = "hardware")]
mod bindings {
    use embassy_stm32::pac;
    use embassy_stm32::pac::timer::vals::FilterValue;
    use platform::{FastCounter, ReferenceTick};

    use super::{RTC_WPR_LOCK, RTC_WPR_UNLOCK, WUTWF_SPIN_LIMIT};

    /// TIM16 as the Fast Counter.
    ///
    /// Zero-sized: every instance aliases the one peripheral. Only the TIM16
    /// vector and the idle loop create one.
    pub struct Tim16FastCounter;

    impl Tim16FastCounter {
        /// Clear UIF alone. SR flags are rc_w0, so every other bit is written 1.
        fn clear_uif() {
            pac::TIM16.sr().write(|w| {
                w.0 = !0;
                w.set_uif(false);
            });
        }
    }

    impl FastCounter for Tim16FastCounter {
        fn read_capture(&mut self) -> u16 {
            pac::TIM16.ccr(0).read().ccr()
        }

        fn overflow_pending(&self) -> bool {
            pac::TIM16.sr().read().uif()
        }

        fn trigger_pending(&self) -> bool {
            pac::TIM16.sr().read().ccif(0)
        }

        fn clear_overflow(&mut self) {
            Self::clear_uif();
        }

        fn clear_trigger(&mut self) {
            pac::TIM16.sr().write(|w| {
                w.0 = !0;
                w.set_ccif(0, false);
            });
        }

        /// Drops the input filter used for the synchronizing edge.
        fn disable_trigger_input(&mut self) {
            pac::TIM16
                .ccmr_input(0)
                .modify(|w| w.set_icf(0, FilterValue::NOFILTER));
        }

        /// `EGR.UG` reloads the count; CR1.URS keeps it from raising UIF.
        ///
        /// TIM16 has no reset-on-trigger slave mode, so this is where the
        /// window opens, one handler latency after the tick. It runs after the
        /// wakeup timer was re-enabled, and the wakeup counter starts on the
        /// next RTCCLK/2 edge: the reference origin trails this restart by at
        /// most one wakeup clock period (61 µs at 16 384 Hz, 61 ppm of a
        /// one-second window).
        fn restart(&mut self) {
            pac::TIM16.egr().write(|w| w.set_ug(true));
            Self::clear_uif();
        }

        fn disable(&mut self) {
            pac::TIM16.cr1().modify(|w| w.set_cen(false));
            pac::TIM16.dier().modify(|w| {
                w.set_uie(false);
                w.set_ccie(0, false);
            });
        }

        fn is_enabled(&self) -> bool {
            pac::TIM16.cr1().read().cen()
        }
    }

    /// RTC wakeup timer as the Reference Tick Generator.
    pub struct RtcWakeupTick;

    impl RtcWakeupTick {
        /// Stop the wakeup timer and wait until its reload register accepts
        /// writes. Returns `false` if WUTWF never rose.
        ///
        /// Caller must have unlocked RTC write protection.
        pub(crate) fn stop() -> bool {
            pac::RTC.cr().modify(|w| w.set_wute(false));
            (0..WUTWF_SPIN_LIMIT).any(|_| pac::RTC.isr().read().wutwf())
        }

        /// Clear WUTF and load `period`, then enable the timer.
        ///
        /// Caller must have stopped the timer.
        pub(crate) fn load_and_start(period: u16) {
            // WUTF must be clear for the next wakeup to produce an edge.
            pac::RTC.isr().modify(|w| w.set_wutf(false));
            pac::RTC.wutr().write(|w| w.set_wut(period));
            pac::RTC.cr().modify(|w| w.set_wute(true));
        }

        pub(crate) fn unlock() {
            for key in RTC_WPR_UNLOCK {
                pac::RTC.wpr().write(|w| w.set_key(key));
            }
        }

        pub(crate) fn lock() {
            pac::RTC.wpr().write(|w| w.set_key(RTC_WPR_LOCK));
        }
    }

    impl ReferenceTick for RtcWakeupTick {
        /// Reprogram the reload value and restart the timer.
        ///
        /// Runs in the trigger handler, so a WUTWF timeout is logged rather
        /// than returned.
        fn set_period(&mut self, period: u16) {
            Self::unlock();
            if Self::stop() {
                Self::load_and_start(period);
            } else {
                defmt::warn!("rtc: WUTWF timeout, wakeup period not updated");
            }
            Self::lock();
        }

        fn period(&self) -> u16 {
            pac::RTC.wutr().read().wut()
        }
    }
}

#[cfg(test)]
#[allow(clippy::arithmetic_side_effects)]
mod tests {
    use super::*;

    #[test]
    fn test_ti1sel_fits_four_bits() {
        assert!(TIM16_TI1_RTC_WAKEUP <= 0b1111);
        assert_ne!(TIM16_TI1_RTC_WAKEUP, 0, "0 selects the TIM16_CH1 pin");
    }

    #[test]
    fn test_rtc_unlock_sequence() {
        assert_eq!(RTC_WPR_UNLOCK, [0xCA, 0x53]);
        assert!(!RTC_WPR_UNLOCK.contains(&RTC_WPR_LOCK));
    }

    /// The spin must outlast 2 RTCCLK cycles even at a 400 MHz core with
    /// one poll per cycle.
    #[test]
    fn test_wutwf_spin_covers_two_lse_cycles() {
        let two_lse_cycles_at_400mhz = 2 * 400_000_000 / 32_768;
        assert!(WUTWF_SPIN_LIMIT > two_lse_cycles_at_400mhz);
    }
}
