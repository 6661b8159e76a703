//! Hardware Abstraction Layer for on-chip clock calibration
//!
//! This crate provides the trait-based register interface the calibration
//! core runs against, so the capture/overflow logic can be developed and
//! tested without physical hardware.
//!
//! # Architecture Layers
//!
//! ```text
//! Application Layer (firmware crate: startup, vectors, idle loop)
//!         ↓
//! Calibration core (calibration crate: handshake + reconciler)
//!         ↓
//! Platform HAL (this crate - trait abstractions + configuration)
//!         ↓
//! Hardware Layer (Embassy HAL + PAC)
//! ```
//!
//! # Peripherals
//!
//! - [`FastCounter`] - narrow wrapping counter clocked by the signal under
//!   measurement, with overflow and capture-trigger conditions
//! - [`ReferenceTick`] - divider clocked by the trusted low-frequency source
//!
//! # Features
//!
//! - `std`: Enable the [`mocks`] module outside of this crate's own tests
//! - `defmt`: Enable defmt logging derives
//!
//! # Example
//!
//! ```no_run
//! use platform::{FastCounter, ReferenceTick};
//!
//! fn align<C: FastCounter, R: ReferenceTick>(counter: &mut C, tick: &mut R, period: u16) {
//!     tick.set_period(period);
//!     counter.disable_trigger_input();
//!     counter.restart();
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in production code
#![deny(clippy::expect_used)] // no .expect() in production code
#![deny(clippy::panic)] // no panic!() in production code
#![deny(clippy::unreachable)] // no unreachable!() that isn't documented
#![deny(unused_must_use)]
// all Results must be handled
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)] // unsafe fn body is not implicitly unsafe block
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
// Pedantic lints suppressed for this hardware HAL crate:
#![allow(clippy::doc_markdown)] // register names in doc comments
#![allow(clippy::must_use_candidate)] // hardware accessors, callers decide
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

pub mod clock_config;
pub mod counter;
#[cfg(any(test, feature = "std"))]
pub mod mocks;

// Re-export main traits
pub use counter::{FastCounter, ReferenceTick};

// Re-export configuration types
pub use clock_config::{CalibrationConfig, ClockSource, ConfigError, StartupStep};
