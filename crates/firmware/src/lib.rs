//! On-chip clock calibration firmware
//!
//! Measures the system clock against the 32.768 kHz LSE crystal on an
//! STM32H743: TIM16 counts the measured clock, the RTC wakeup timer marks a
//! one-second reference window, and the [`calibration`] core reconciles the
//! overflow tally with the final capture.
//!
//! # Architecture
//!
//! ```text
//! Application Layer (main.rs: boot, result polling)
//!         ↓
//! Interrupt entry (isr: static Calibrator, TIM16 vector)
//!         ↓
//! Calibration core (calibration crate)
//!         ↓
//! Register bindings (hw: TIM16, RTC wakeup) → Platform traits
//! ```
//!
//! # Features
//!
//! - `hardware` - Build for STM32H743 target (embassy, defmt, vectors)
//!
//! ## Hardware Target
//!
//! ```bash
//! cargo build --release --target thumbv7em-none-eabihf --features hardware
//! ```

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
// unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![warn(clippy::dbg_macro)] // dbg! should not be left in committed code
// Intentional allows for this codebase:
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
// Register access narrows 32-bit reads to 16-bit fields:
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

pub mod boot;
pub mod exception_handlers;
pub mod hw;
pub mod isr;

pub use isr::{CALIBRATION, CALIBRATOR};
