//! Hardware boot sequence for the calibration firmware.
//!
//! Initialization order (MUST be respected):
//!   1. RCC: PLL1 system clock from the measured clock, LSE enabled and
//!      stable, RTC clocked from LSE
//!   2. Peripheral clocks: TIM16 (APB2) and RTC register interface (APB4)
//!   3. Event route: TIM16 TI1 <- RTC wakeup event
//!   4. Fast Counter: compare-clear, input capture, interrupt enables
//!   5. Reference Tick: wakeup clock LSE/2, short alignment period, enable
//!   6. Start the Fast Counter, then unmask TIM16 in the NVIC
//!
//! Steps 3-6 mirror `platform::clock_config::STARTUP_REQUIREMENTS`, the
//! contract the calibration core relies on.
//!
//! TIM16 has no slave-mode controller and cannot count an input pin, so the
//! measured clock reaches it through its kernel clock: the clock under test
//! is selected as the PLL1 input and the timer counts a fixed multiple of it.

use platform::{CalibrationConfig, ClockSource, ConfigError};

/// Ordered list of boot sequence steps for documentation and testing.
///
/// # Correctness Invariants
///
/// - LSE must report ready before the wakeup timer is enabled; until then the
///   Reference Tick Generator never fires and no trigger arrives.
/// - The alignment period must be programmed before TIM16 is unmasked: the
///   first trigger handler replaces it with the window period.
/// - TIM16 must be counting before it is unmasked, so a trigger latched
///   early is still handled as the sacrificial one.
pub const BOOT_SEQUENCE_STEPS: &[&str] = &[
    "1. RCC: PLL1 @ 400 MHz from the measured clock, LSE on and ready, RTCSEL = LSE",
    "2. Clocks: TIM16EN (APB2), RTCAPBEN (APB4)",
    "3. Event route: TIM16_TISEL.TI1SEL = RTC wakeup",
    "4. Fast Counter: ARR = counter_top, IC1 on TI1 with sync filter, UIE + CC1IE",
    "5. Reference Tick: WUCKSEL = RTC/2, WUTR = alignment_period, WUTE",
    "6. Start TIM16, then unmask the TIM16 interrupt",
];

/// Wakeup timer input clock: LSE (32 768 Hz) / 2.
pub const RTC_WAKEUP_CLOCK_HZ: u32 = 16_384;

/// Frequency expected on the HSE bypass input (the ST-LINK MCO on a
/// NUCLEO-H743ZI).
pub const HSE_BYPASS_HZ: u32 = 8_000_000;

/// PLL1 VCO frequency shared by every measured-clock recipe.
pub const PLL1_VCO_HZ: u64 = 800_000_000;

/// Sysclk / AHB / APB2 dividers and the timer doubling: TIM16 counts at a
/// quarter of the 400 MHz system clock times two.
pub const TIM16_KERNEL_HZ: u64 = 200_000_000;

/// PLL1 input stage for one measured clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pll1Input {
    /// Nominal frequency of the measured clock.
    pub source_hz: u32,
    /// DIVM1 pre-divider.
    pub prediv: u32,
    /// DIVN1 multiplier.
    pub mul: u32,
}

impl Pll1Input {
    /// PLL reference frequency after the pre-divider.
    pub const fn reference_hz(&self) -> u32 {
        self.source_hz.wrapping_div(self.prediv)
    }

    /// Nominal VCO frequency.
    pub const fn vco_hz(&self) -> u64 {
        (self.reference_hz() as u64).saturating_mul(self.mul as u64)
    }
}

/// PLL1 recipe that brings `source` to [`PLL1_VCO_HZ`].
///
/// A drift of the measured clock scales the VCO, the system clock and the
/// TIM16 count alike, so TotalCycles / [`TIM16_KERNEL_HZ`] is the measured
/// clock's rate relative to nominal.
pub const fn pll1_input(source: ClockSource) -> Result<Pll1Input, BootError> {
    match source {
        ClockSource::Hsi => Ok(Pll1Input {
            source_hz: 64_000_000,
            prediv: 4,
            mul: 50,
        }),
        ClockSource::Csi => Ok(Pll1Input {
            source_hz: 4_000_000,
            prediv: 1,
            mul: 200,
        }),
        ClockSource::ExternalClock => Ok(Pll1Input {
            source_hz: HSE_BYPASS_HZ,
            prediv: 4,
            mul: 400,
        }),
        ClockSource::Lse => Err(BootError::UnmeasurableClock(source.name())),
    }
}

/// Errors from the boot sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootError {
    /// The calibration configuration failed validation.
    #[error("invalid calibration config: {0}")]
    Config(ConfigError),

    /// The configured reference clock is not the wakeup timer clock.
    #[error("reference clock {configured} Hz does not match wakeup timer clock {expected} Hz")]
    ReferenceClockMismatch {
        /// `CalibrationConfig::reference_clock_hz`.
        configured: u32,
        /// [`RTC_WAKEUP_CLOCK_HZ`].
        expected: u32,
    },

    /// The measured clock cannot drive PLL1.
    #[error("{0} cannot clock TIM16")]
    UnmeasurableClock(&'static str),

    /// The RTC never reported its wakeup reload register writable.
    #[error("RTC wakeup timer did not accept a new period")]
    RtcWriteTimeout,
}

impl From<ConfigError> for BootError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

/// Check that `config` is valid and can run on this board.
pub fn check_config(config: &CalibrationConfig) -> Result<(), BootError> {
    config.validate()?;
    if config.reference_clock_hz != RTC_WAKEUP_CLOCK_HZ {
        return Err(BootError::ReferenceClockMismatch {
            configured: config.reference_clock_hz,
            expected: RTC_WAKEUP_CLOCK_HZ,
        });
    }
    pll1_input(config.measured_clock)?;
    Ok(())
}

// ── RCC clock configuration ───────────────────────────────────────────────────

/// Build the `embassy_stm32::Config` with the RCC settings calibration needs.
///
/// # Clock Tree (measured clock → 400 MHz core)
///
/// measured clock → PLL1 (see [`pll1_input`]) → 800 MHz VCO
/// PLL1_P = VCO / 2 = 400 MHz (sys)
/// AHB prescaler: DIV2 → 200 MHz
/// APB2:          DIV2 → 100 MHz, timer kernel clock ×2 = 200 MHz (TIM16)
/// LSE (32.768 kHz crystal) → RTCCLK
///
/// `embassy_stm32::init` blocks until LSE reports ready, which covers the
/// crystal start-up wait (up to ~2 s). Run [`check_config`] first; an
/// unmeasurable clock falls back to HSI here.
#[cfg(feature = "hardware")]
pub fn build_embassy_config(calibration: &CalibrationConfig) -> embassy_stm32::Config {
    use embassy_stm32::rcc::*;
    use embassy_stm32::time::Hertz;

    let mut config = embassy_stm32::Config::default();

    // ── Oscillators ─────────────────────────────────────────────────────────
    config.rcc.hsi = Some(HSIPrescaler::DIV1);
    // LSE on, RTC clock source = LSE.
    config.rcc.ls = LsConfig::default_lse();

    // ── PLL1 input: the clock under measurement ──────────────────────────────
    // Divider values match `pll1_input`.
    let (source, prediv, mul) = match calibration.measured_clock {
        ClockSource::Csi => {
            config.rcc.csi = true;
            (PllSource::CSI, PllPreDiv::DIV1, PllMul::MUL200)
        }
        ClockSource::ExternalClock => {
            config.rcc.hse = Some(Hse {
                freq: Hertz(HSE_BYPASS_HZ),
                mode: HseMode::Bypass,
            });
            (PllSource::HSE, PllPreDiv::DIV4, PllMul::MUL400)
        }
        ClockSource::Hsi | ClockSource::Lse => (PllSource::HSI, PllPreDiv::DIV4, PllMul::MUL50),
    };
    config.rcc.pll1 = Some(Pll {
        source,
        prediv,
        mul,
        divp: Some(PllDiv::DIV2),
        divq: None,
        divr: None,
    });

    // ── System clock + bus prescalers ────────────────────────────────────────
    config.rcc.sys = Sysclk::PLL1_P; // 400 MHz
    config.rcc.ahb_pre = AHBPrescaler::DIV2; // 200 MHz
    config.rcc.apb1_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb2_pre = APBPrescaler::DIV2; // 100 MHz (TIM16 kernel 200 MHz)
    config.rcc.apb3_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.apb4_pre = APBPrescaler::DIV2; // 100 MHz
    config.rcc.voltage_scale = VoltageScale::Scale1;

    config
}

// ── Hardware register setup ───────────────────────────────────────────────────

#[cfg(feature = "hardware")]
pub mod hardware {
    //! One-time register writes, in [`super::BOOT_SEQUENCE_STEPS`] order.
    //! Only compiled when targeting real hardware (`--features hardware`).
    //! None of these may run after the TIM16 interrupt is unmasked.

    use embassy_stm32::pac;
    use embassy_stm32::pac::rtc::vals::Wucksel;
    use embassy_stm32::pac::timer::vals::{CcmrInputCcs, FilterValue, Urs};
    use platform::CalibrationConfig;

    use super::BootError;
    use crate::hw::{RtcWakeupTick, TIM16_TI1_RTC_WAKEUP};

    /// Step 2: clock the TIM16 and RTC register interfaces.
    pub fn enable_peripheral_clocks() {
        pac::RCC.apb2enr().modify(|w| w.set_tim16en(true));
        pac::RCC.apb4enr().modify(|w| w.set_rtcapben(true));
        // Enable bits take effect after the write completes on the bus.
        cortex_m::asm::dsb();
    }

    /// Step 3: feed the RTC wakeup event to TIM16 TI1.
    pub fn route_reference_tick() {
        pac::TIM16.tisel().write(|w| w.0 = TIM16_TI1_RTC_WAKEUP);
    }

    /// Step 4: program TIM16 as the Fast Counter, stopped.
    pub fn configure_fast_counter(config: &CalibrationConfig) {
        let tim = pac::TIM16;
        tim.cr1().write(|w| w.set_urs(Urs::COUNTERONLY));
        tim.psc().write(|w| w.set_psc(0));
        tim.arr().write(|w| w.set_arr(config.counter_top));
        // IC1 on TI1, filtered for the synchronizing edge only.
        tim.ccmr_input(0).write(|w| {
            w.set_ccs(0, CcmrInputCcs::TI4);
            w.set_icf(0, FilterValue::FCK_INT_N8);
        });
        tim.ccer().write(|w| w.set_cce(0, true));
        // Load ARR/PSC; URS keeps this from raising UIF.
        tim.egr().write(|w| w.set_ug(true));
        tim.sr().write(|w| w.0 = 0);
        tim.dier().write(|w| {
            w.set_uie(true);
            w.set_ccie(0, true);
        });
        defmt::debug!(
            "boot: TIM16 top={=u16:#x} (modulus {=u32}), measuring {=str}",
            config.counter_top,
            config.wrap_modulus(),
            config.measured_clock.name()
        );
    }

    /// Step 5: start the wakeup timer on the short alignment period.
    pub fn configure_reference_tick(config: &CalibrationConfig) -> Result<(), BootError> {
        RtcWakeupTick::unlock();
        if !RtcWakeupTick::stop() {
            RtcWakeupTick::lock();
            return Err(BootError::RtcWriteTimeout);
        }
        pac::RTC.cr().modify(|w| w.set_wucksel(Wucksel::DIV2));
        RtcWakeupTick::load_and_start(config.alignment_period);
        RtcWakeupTick::lock();
        defmt::debug!(
            "boot: RTC wakeup alignment period={=u16:#x}",
            config.alignment_period
        );
        Ok(())
    }

    /// Step 6a: start counting.
    pub fn start_fast_counter() {
        pac::TIM16.cr1().modify(|w| w.set_cen(true));
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
