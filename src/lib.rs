//! Serial command pipeline - testable core of the UART command firmware.
//!
//! A line typed on UART0 is captured by the RX interrupt, turned into a
//! command, dispatched against the LED, the toggle timer or the clock, and any
//! reply is written back on UART0. The menu is re-sent after every line.
//! Command `0` shuts the whole pipeline down.
//!
//! The binary (`main.rs`) adds the embassy-rp specific code: peripherals, the
//! interrupt handler, board adapters for the [`hal`] traits and the task
//! wrappers.
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test --lib --target x86_64-unknown-linux-gnu  # Linux
//! cargo test --lib --target x86_64-pc-windows-msvc    # Windows
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]

mod logging;

// Configuration and errors
pub mod config;
pub mod error;

// Pipeline data
pub mod capture;
pub mod clock;
pub mod command;
pub mod response;

// Collaborators and shared state
pub mod hal;
pub mod pipeline;
pub mod shutdown;
pub mod toggle;

pub mod cpu_cycles;
pub mod tasks;

#[cfg(test)]
mod testing;

pub use error::PipelineError;
pub use pipeline::Pipeline;
