//! Capture/overflow reconciliation for on-chip clock calibration
//!
//! A narrow Fast Counter, clocked by the signal under measurement, wraps many
//! times during one Reference Tick window. This crate extends it in software:
//! an overflow tally maintained by one interrupt handler is combined with the
//! capture remainder latched by the tick, giving the total number of counter
//! edges in exactly one window.
//!
//! # Run lifecycle
//!
//! ```text
//!   AwaitingAlignment ──(1st trigger: discard, align)──▶ Measuring
//!   Measuring         ──(2nd trigger: latch, disable)──▶ [result frozen]
//! ```
//!
//! The first trigger is sacrificial: the trigger input needs one edge to
//! synchronize, so its capture and the overflows counted before it are
//! thrown away.
//!
//! # Ownership
//!
//! | Field          | Written by                                  |
//! |----------------|---------------------------------------------|
//! | OverflowCount  | overflow handler; reset once by alignment    |
//! | CaptureValue   | trigger handler                              |
//! | HandshakeState | trigger handler                              |
//!
//! Every access goes through a [`critical_section`] so the alignment reset
//! stays atomic with respect to the overflow handler even when the target
//! allows nested interrupts.
//!
//! # Example
//!
//! ```no_run
//! use calibration::Calibrator;
//! use platform::{CalibrationConfig, FastCounter, ReferenceTick};
//!
//! static CALIBRATOR: Calibrator = Calibrator::new(CalibrationConfig::ONE_SECOND);
//!
//! fn fast_counter_irq<C: FastCounter, R: ReferenceTick>(counter: &mut C, tick: &mut R) {
//!     CALIBRATOR.service(counter, tick);
//! }
//! ```

// ── Lint policy ─────────────────────────────────────────────────────────────
#![deny(clippy::unwrap_used)] // no .unwrap() in interrupt handlers
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(unused_must_use)]
// ────────────────────────────────────────────────────────────────────────────
#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::print_stdout)] // prefer defmt over println! in lib code
#![allow(clippy::doc_markdown)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod calibrator;
pub mod handshake;
pub mod measurement;

pub use calibrator::Calibrator;
pub use handshake::{HandshakeState, TriggerAction};
pub use measurement::{Measurement, MeasurementError};
