//! Simulated GPIO client library for the simpi Broker.
//!
//! Link this in place of a real single-board-computer GPIO driver to
//! develop and exercise pin-mode, digital I/O, and edge-triggered
//! interrupt code against a desktop-hosted [`simpi-broker`] instance
//! instead of real hardware.
//!
//! ```no_run
//! use simpi_client::{Gpio, IsrMode, PinMode};
//!
//! let gpio = Gpio::setup();
//! gpio.pin_mode(17, PinMode::Output);
//! gpio.digital_write(17, 1);
//! gpio.wiring_pi_isr(27, IsrMode::Rising, || println!("button pressed"));
//! gpio.delay(100);
//! ```

mod api;
mod mirror;
mod sync_engine;
mod transport;

pub use api::{Gpio, IsrMode, PinMode};
pub use transport::{Transport, DEFAULT_HOST, DEFAULT_PORT};
