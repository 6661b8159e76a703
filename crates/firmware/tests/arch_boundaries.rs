//! Architecture boundary tests. Run with `cargo test -p firmware --test arch_boundaries`
// Architecture test file: expect/unwrap/panic are intentional test mechanisms.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::assertions_on_constants,
    clippy::arithmetic_side_effects,
)]
//!
//! Layering rules:
//!   Rule 1: platform (HAL traits + config) depends on no other workspace crate
//!   Rule 2: calibration (core) reaches hardware only through platform traits
//!   Rule 3: firmware main only talks to registers through boot/hw/isr
//!
//! Rules 1 and 2 are enforced by the Cargo dependency graph; the tests below
//! check that the pieces that must exist compile from this binary, and scan
//! sources embedded at compile time for regressions.

/// The platform traits are reachable without any firmware type.
#[test]
fn platform_hal_is_independent() {
    fn _assert_counter_trait_exists<T: platform::FastCounter>() {}
    fn _assert_tick_trait_exists<T: platform::ReferenceTick>() {}
    // Compile-only check: if this test compiles, the boundary is intact.
}

/// The core is generic over the platform traits; it runs on the mocks.
#[test]
fn calibration_core_runs_on_mocks() {
    let cal = calibration::Calibrator::new(platform::CalibrationConfig::ONE_SECOND);
    let mut counter = platform::mocks::MockFastCounter::new();
    let mut tick = platform::mocks::MockReferenceTick::new(0x09);
    cal.service(&mut counter, &mut tick);
    assert!(counter.log().is_empty());
}

/// The calibration core must not name any register address.
#[test]
fn calibration_core_has_no_register_addresses() {
    for (name, src) in [
        ("calibrator.rs", include_str!("../../calibration/src/calibrator.rs")),
        ("handshake.rs", include_str!("../../calibration/src/handshake.rs")),
        ("measurement.rs", include_str!("../../calibration/src/measurement.rs")),
    ] {
        assert!(!src.contains("0x4001_"), "{name} touches TIM registers");
        assert!(!src.contains("0x5800_"), "{name} touches RTC registers");
        assert!(!src.contains("read_volatile"), "{name} does raw MMIO");
    }
}

/// `main.rs` must configure RCC through `build_embassy_config`; the
/// default config leaves LSE off and no trigger would ever arrive.
#[test]
fn main_does_not_use_default_config() {
    let main_rs = include_str!("../src/main.rs");
    assert!(main_rs.contains("embassy_stm32::init(boot::build_embassy_config(&CALIBRATION))"));
    assert!(!main_rs.contains("init(Default::default())"));
}

/// The TIM16 vector must be unmasked only after the counter is started and
/// the reference tick programmed.
#[test]
fn main_unmasks_tim16_last() {
    let main_rs = include_str!("../src/main.rs");
    let tick = main_rs
        .find("configure_reference_tick(")
        .expect("reference tick setup");
    let start = main_rs.find("start_fast_counter()").expect("counter start");
    let unmask = main_rs.find("TIM16.enable()").expect("TIM16 unmask");
    assert!(tick < start && start < unmask);
}

/// The embassy time driver must stay on TIM2, away from TIM16.
#[test]
fn time_driver_is_explicit_tim2() {
    let workspace_cargo = include_str!("../../../Cargo.toml");
    assert!(workspace_cargo.contains("time-driver-tim2"));
    let firmware_cargo = include_str!("../Cargo.toml");
    assert!(
        !firmware_cargo.contains("time-driver-any"),
        "time-driver-any may claim TIM16"
    );
}

/// Firmware register access goes through the embassy-stm32 PAC; no raw
/// pointers to peripheral addresses.
#[test]
fn firmware_uses_pac_for_registers() {
    for (name, src) in [
        ("hw.rs", include_str!("../src/hw.rs")),
        ("boot.rs", include_str!("../src/boot.rs")),
        ("isr.rs", include_str!("../src/isr.rs")),
    ] {
        assert!(!src.contains("read_volatile"), "{name} does raw MMIO");
        assert!(!src.contains("write_volatile"), "{name} does raw MMIO");
        assert!(!src.contains("unsafe"), "{name} needs no unsafe");
    }
    let hw = include_str!("../src/hw.rs");
    assert!(hw.contains("pac::TIM16") && hw.contains("pac::RTC"));
}

#[test]
fn memory_x_defines_flash_and_ram() {
    let memory_x = include_str!("../../../memory.x");
    assert!(memory_x.contains("FLASH : ORIGIN = 0x08000000"));
    assert!(memory_x.contains("RAM   : ORIGIN = 0x20000000"));
}

#[test]
fn hardfault_handler_module_present() {
    assert!(firmware::exception_handlers::HARDFAULT_DEFINED);
}
