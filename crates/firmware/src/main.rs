//! Clock calibration firmware - Main Entry Point
//!
//! Hardware-only entry point for STM32H743ZI.

#![no_std]
#![no_main]

use calibration::MeasurementError;
use embassy_executor::Spawner;
use embassy_stm32::interrupt::{self, InterruptExt, Priority};
use embassy_time::{Duration, Timer};
use firmware::boot::{self, hardware};
use firmware::hw::Tim16FastCounter;
use firmware::{CALIBRATION, CALIBRATOR};

// Global logger + panic handler
use {defmt_rtt as _, panic_probe as _};

/// How often the idle loop checks the result gate.
const RESULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    defmt::info!("Clock calibration firmware v{=str}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = boot::check_config(&CALIBRATION) {
        defmt::error!("Calibration config rejected: {}", e);
        park().await;
    }

    // Step 1: RCC, PLL1 fed by the measured clock. Returns once LSE is ready.
    let _p = embassy_stm32::init(boot::build_embassy_config(&CALIBRATION));
    defmt::info!("LSE ready");

    // Steps 2-5: one-time register setup, interrupts still masked.
    hardware::enable_peripheral_clocks();
    hardware::route_reference_tick();
    hardware::configure_fast_counter(&CALIBRATION);
    if let Err(e) = hardware::configure_reference_tick(&CALIBRATION) {
        defmt::error!("Reference tick setup failed: {}", e);
        park().await;
    }

    // Step 6: start counting, then let triggers in.
    hardware::start_fast_counter();
    interrupt::TIM16.set_priority(Priority::P1);
    // SAFETY: the TIM16 vector only touches CALIBRATOR (critical-section
    // guarded) and the TIM16/RTC registers configured above.
    #[allow(unsafe_code)]
    unsafe {
        interrupt::TIM16.enable();
    }
    defmt::info!(
        "Calibration armed: window={=u32} ticks @ {=u32} Hz, modulus={=u32}",
        CALIBRATION.window_ticks(),
        CALIBRATION.reference_clock_hz,
        CALIBRATION.wrap_modulus()
    );

    let counter = Tim16FastCounter;
    loop {
        match CALIBRATOR.measurement(&counter) {
            Ok(m) => {
                defmt::info!(
                    "Calibration done: overflows={=u32} capture={=u16} total_cycles={=u64}",
                    m.overflows,
                    m.capture,
                    m.total_cycles()
                );
                break;
            }
            Err(MeasurementError::Stopped) => {
                defmt::error!("Fast counter stopped before the window closed");
                break;
            }
            Err(e) => defmt::trace!("Waiting: {}", e),
        }
        Timer::after(RESULT_POLL_INTERVAL).await;
    }

    park().await;
}

/// Idle forever. The result stays readable by a debugger.
async fn park() -> ! {
    loop {
        Timer::after(Duration::from_secs(60)).await;
    }
}
