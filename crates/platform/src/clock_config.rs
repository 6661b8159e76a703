//! Clock sources, calibration window configuration and startup ordering.
//!
//! Encodes which clock drives which peripheral and the register values the
//! calibration run depends on, enabling compile-time documentation and
//! runtime validation of the setup order.
//!
//! # Background
//!
//! A calibration run compares two clocks:
//!
//! - the **reference** clock (a 32.768 kHz crystal) drives the Reference Tick
//!   Generator, whose period register defines the measurement window;
//! - the **measured** clock drives the Fast Counter, whose compare-clear value
//!   defines how often it wraps.
//!
//! The reference period starts out at a short placeholder value
//! ([`CalibrationConfig::alignment_period`]) so the first, sacrificial trigger
//! arrives quickly. The true window length
//! ([`CalibrationConfig::reference_period`]) is written from the first
//! trigger's interrupt handler.
//!
//! # Window arithmetic
//!
//! ```text
//! window_ticks  = reference_period + 1            (reference clock edges)
//! wrap_modulus  = counter_top + 1                 (fast counter edges per wrap)
//! TotalCycles   = overflows * wrap_modulus + capture
//! ```

/// Clock sources taking part in a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockSource {
    /// External 32.768 kHz crystal oscillator.
    ///
    /// Drives the Reference Tick Generator. Takes up to ~2 s to report stable
    /// after enable; nothing may be measured before that.
    Lse,

    /// Internal high-speed RC oscillator (64 MHz on STM32H743).
    ///
    /// The usual measured clock: a factory-trimmed RC whose drift is what a
    /// calibration run quantifies.
    Hsi,

    /// Internal low-power RC oscillator (4 MHz on STM32H743).
    Csi,

    /// Externally applied clock signal (HSE in bypass mode on STM32H743).
    ExternalClock,
}

impl ClockSource {
    /// Short display name, for log output.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lse => "LSE",
            Self::Hsi => "HSI",
            Self::Csi => "CSI",
            Self::ExternalClock => "EXTCLK",
        }
    }
}

/// Invalid [`CalibrationConfig`] field combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror_no_std::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The reference clock frequency is zero.
    #[error("reference clock frequency must be non-zero")]
    ZeroReferenceClock,

    /// The alignment period is zero; the first trigger would never be
    /// separated from the enable edge.
    #[error("alignment period must be non-zero")]
    ZeroAlignmentPeriod,

    /// The alignment period is not strictly shorter than the measurement
    /// window, so it would not shorten time-to-first-trigger.
    #[error("alignment period {alignment} must be shorter than reference period {reference}")]
    AlignmentNotShorter {
        /// Configured alignment period register value.
        alignment: u16,
        /// Configured reference period register value.
        reference: u16,
    },

    /// The Fast Counter compare-clear value is zero; the counter would
    /// overflow on every edge.
    #[error("fast counter top must be non-zero")]
    ZeroCounterTop,

    /// The measured clock is the reference clock; the run would measure
    /// nothing.
    #[error("measured clock {0} is the reference clock")]
    MeasuredIsReference(&'static str),
}

/// Register values for one calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    /// Clock under measurement; it drives the Fast Counter.
    pub measured_clock: ClockSource,
    /// Frequency of the clock counted by the Reference Tick Generator, in Hz.
    pub reference_clock_hz: u32,
    /// Placeholder period register value used only until the first trigger.
    pub alignment_period: u16,
    /// Period register value for the measured window.
    pub reference_period: u16,
    /// Fast Counter compare-clear value. The counter wraps after `counter_top`.
    pub counter_top: u16,
}

impl CalibrationConfig {
    /// One-second window on a 32.768 kHz crystal, 12-bit Fast Counter
    /// clocked by an external clock input.
    ///
    /// `reference_period = 0x7FFF` gives 32 768 reference ticks per window;
    /// `counter_top = 0x0FFF` gives a wrap modulus of 4096.
    pub const ONE_SECOND: Self = Self {
        measured_clock: ClockSource::ExternalClock,
        reference_clock_hz: 32_768,
        alignment_period: 0x0009,
        reference_period: 0x7FFF,
        counter_top: 0x0FFF,
    };

    /// One-second window on an RTC wakeup timer clocked at LSE/2.
    ///
    /// STM32 wakeup timers have no undivided LSE input, so the reference
    /// clock is 16 384 Hz and the period register is `0x3FFF`. Measures the
    /// internal HSI.
    pub const RTC_WAKEUP_ONE_SECOND: Self = Self {
        measured_clock: ClockSource::Hsi,
        reference_clock_hz: 16_384,
        alignment_period: 0x0009,
        reference_period: 0x3FFF,
        counter_top: 0x0FFF,
    };

    /// Check the field combination.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.reference_clock_hz == 0 {
            return Err(ConfigError::ZeroReferenceClock);
        }
        if self.alignment_period == 0 {
            return Err(ConfigError::ZeroAlignmentPeriod);
        }
        if self.alignment_period >= self.reference_period {
            return Err(ConfigError::AlignmentNotShorter {
                alignment: self.alignment_period,
                reference: self.reference_period,
            });
        }
        if self.counter_top == 0 {
            return Err(ConfigError::ZeroCounterTop);
        }
        if matches!(self.measured_clock, ClockSource::Lse) {
            return Err(ConfigError::MeasuredIsReference(ClockSource::Lse.name()));
        }
        Ok(())
    }

    /// FastCounterWrapModulus: counter edges per overflow.
    pub const fn wrap_modulus(&self) -> u32 {
        // u16::MAX + 1 still fits in u32, so this never saturates.
        (self.counter_top as u32).saturating_add(1)
    }

    /// Reference clock edges per measured window.
    pub const fn window_ticks(&self) -> u32 {
        (self.reference_period as u32).saturating_add(1)
    }
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self::ONE_SECOND
    }
}

/// One entry of the ordered startup contract.
///
/// These are documentation + test records. They do **not** configure the
/// hardware; the firmware's boot module performs each step in this order.
pub struct StartupStep {
    /// Short identifier (e.g. `"LSE"`, `"EVENT-ROUTE"`).
    pub name: &'static str,
    /// Clock that must be running before this step, if any.
    pub requires: Option<ClockSource>,
    /// What the step does and why it must happen at this point.
    pub note: &'static str,
}

/// Boundary contract between startup code and the calibration core.
///
/// Interrupts must not be unmasked before the last entry has completed: the
/// first trigger handler assumes the alignment period and the trigger input
/// mode are already programmed.
pub const STARTUP_REQUIREMENTS: &[StartupStep] = &[
    StartupStep {
        name: "LSE",
        requires: None,
        note: "enable the 32.768 kHz crystal and wait until it reports stable; \
               a crystal that never stabilizes means no trigger ever arrives",
    },
    StartupStep {
        name: "EVENT-ROUTE",
        requires: None,
        note: "route the Reference Tick event to the Fast Counter capture input \
               (pure hardware path, no CPU cycles per event)",
    },
    StartupStep {
        name: "FAST-COUNTER",
        requires: None,
        note: "program counter_top (defines the wrap modulus), capture-on-trigger, \
               trigger input mode, overflow + trigger interrupt enables",
    },
    StartupStep {
        name: "REFERENCE-TICK",
        requires: Some(ClockSource::Lse),
        note: "select LSE, write alignment_period (short placeholder), enable",
    },
    StartupStep {
        name: "IRQ",
        requires: None,
        note: "start the Fast Counter, then unmask its interrupt(s); a trigger \
               latched earlier is serviced as the sacrificial one",
    },
];

// ─── Tests ───────────────────────────────────────────────────────────────────
