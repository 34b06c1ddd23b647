//! The public client API: pin mode, digital read/write, edge-triggered
//! interrupts, delays, and the shared timebase.
//!
//! This mirrors the shape of the hardware GPIO API it stands in for —
//! `pin_mode`/`digital_write`/`digital_read`/`wiring_pi_isr`/`delay` —
//! but is exposed through a [`Gpio`] handle instead of bare global
//! functions, so `setup`/teardown compose with normal Rust ownership
//! (`Gpio::setup()` to start, `Drop` to stop) instead of requiring an
//! explicit `atexit`-style hook.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use simpi_wire::RegisterName;

use crate::mirror::{IsrCallback, Mirror};
use crate::sync_engine;
use crate::transport::Transport;

/// How bad `Drop` will wait for the sync thread to notice it should
/// stop before giving up and detaching it.
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Direction (and, for outputs, PWM-ness) of a pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinMode {
    Input,
    Output,
    Pwm,
}

/// Edge (or level) an interrupt handler is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsrMode {
    Falling,
    Rising,
    Both,
    /// Recognized for API compatibility; encodes to the same reserved
    /// `(0,0)` "low level" selector as the register default, which this
    /// client never synthesizes a callback for.
    Setup,
}

impl IsrMode {
    fn bits(self) -> (u8, u8) {
        match self {
            IsrMode::Rising => (1, 1),
            IsrMode::Falling => (1, 0),
            IsrMode::Both => (0, 1),
            IsrMode::Setup => (0, 0),
        }
    }
}

/// A running simulated GPIO client: one background sync thread mirrors
/// the Broker's register bank for as long as this handle lives.
pub struct Gpio {
    mirror: Arc<Mirror>,
    running: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
    start: Instant,
}

impl Gpio {
    /// Connect to the Broker at the default address (`127.0.0.1:32000`),
    /// reset the local register mirror, and spawn the sync thread.
    pub fn setup() -> Gpio {
        Gpio::setup_with(Transport::default())
    }

    /// Same as [`Gpio::setup`], but against an arbitrary Broker address
    /// — used by tests and by anyone running more than one simulated
    /// board side by side.
    pub fn setup_with(transport: Transport) -> Gpio {
        let mirror = Arc::new(Mirror::new());
        mirror.regs.reset();
        let running = Arc::new(AtomicBool::new(true));

        let thread_mirror = mirror.clone();
        let thread_running = running.clone();
        let join = thread::Builder::new()
            .name("simpi-sync".to_string())
            .spawn(move || sync_engine::run(transport, thread_mirror, thread_running))
            .unwrap_or_else(|error| {
                // A thread that can't be spawned here is almost always OOM.
                // There's no sensible handle to hand back, so this is fatal.
                tracing::error!(%error, "simpi-client: failed to spawn sync thread");
                std::process::exit(1);
            });

        Gpio {
            mirror,
            running,
            join: Some(join),
            start: Instant::now(),
        }
    }

    /// Set a pin's direction (and PWM-ness, for outputs). Out-of-range
    /// pins are silently ignored.
    pub fn pin_mode(&self, pin: u8, mode: PinMode) {
        if !self.mirror.regs.in_range(pin) {
            return;
        }
        let is_input = matches!(mode, PinMode::Input);
        self.mirror
            .regs
            .write_pin(RegisterName::Config, pin, is_input as u8);
        let is_pwm = matches!(mode, PinMode::Pwm);
        self.mirror
            .regs
            .write_pin(RegisterName::Pwm, pin, is_pwm as u8);
    }

    /// Drive `pin` to `value` (0 or nonzero). Out-of-range pins are
    /// silently ignored.
    pub fn digital_write(&self, pin: u8, value: u8) {
        if !self.mirror.regs.in_range(pin) {
            return;
        }
        self.mirror
            .regs
            .write_pin(RegisterName::Output, pin, (value != 0) as u8);
    }

    /// Read the last-observed level of `pin`: `0`/`1` in range, `-1`
    /// out of range.
    pub fn digital_read(&self, pin: u8) -> i32 {
        if !self.mirror.regs.in_range(pin) {
            return -1;
        }
        self.mirror.regs.read_pin(RegisterName::Input, pin) as i32
    }

    /// Install an interrupt handler for `pin`. The callback is
    /// published to the mirror before the enabling register bits are
    /// set, so the sync thread never observes `inten[pin] == 1` without
    /// a callback to invoke. Always returns `0` — installation can't
    /// fail — and out-of-range pins are ignored.
    pub fn wiring_pi_isr<F>(&self, pin: u8, mode: IsrMode, callback: F) -> i32
    where
        F: Fn() + Send + Sync + 'static,
    {
        if !self.mirror.regs.in_range(pin) {
            return 0;
        }
        let callback: IsrCallback = Arc::new(callback);
        self.mirror.set_isr(pin, callback);

        let (int1, int0) = mode.bits();
        self.mirror.regs.write_pin(RegisterName::Int1, pin, int1);
        self.mirror.regs.write_pin(RegisterName::Int0, pin, int0);
        self.mirror.regs.write_pin(RegisterName::Inten, pin, 1);
        0
    }

    /// Block the calling thread for approximately `ms` milliseconds.
    pub fn delay(&self, ms: u64) {
        thread::sleep(Duration::from_millis(ms));
    }

    /// Block the calling thread for approximately `us` microseconds.
    pub fn delay_microseconds(&self, us: u64) {
        thread::sleep(Duration::from_micros(us));
    }

    /// Milliseconds elapsed since `setup`.
    pub fn millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    /// Microseconds elapsed since `setup`.
    pub fn micros(&self) -> u64 {
        self.start.elapsed().as_micros() as u64
    }
}

impl Drop for Gpio {
    /// The process-exit-hook equivalent: stop the sync thread and wait
    /// up to [`JOIN_TIMEOUT`] for it to actually exit. If it doesn't
    /// (e.g. it's blocked in a slow request), give up and detach —
    /// an in-flight request is allowed to finish on its own time.
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        let Some(handle) = self.join.take() else {
            return;
        };
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = handle.join();
            let _ = tx.send(());
        });
        if rx.recv_timeout(JOIN_TIMEOUT).is_err() {
            tracing::warn!("simpi-client: sync thread did not stop within 1s, detaching");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_digital_read_is_negative_one() {
        let gpio = Gpio::setup_with(Transport::new("127.0.0.1", 1));
        assert_eq!(gpio.digital_read(0), -1);
        assert_eq!(gpio.digital_read(31), -1);
    }

    #[test]
    fn pin_mode_and_digital_write_are_noops_out_of_range() {
        let gpio = Gpio::setup_with(Transport::new("127.0.0.1", 1));
        gpio.pin_mode(100, PinMode::Output);
        gpio.digital_write(100, 1);
        // No panic, and no meaningful bit to check since pin 100 doesn't exist
        // in a 32-bit word; this just documents the no-op contract.
    }

    #[test]
    fn in_range_pin_mode_sets_config_and_pwm_bits() {
        let gpio = Gpio::setup_with(Transport::new("127.0.0.1", 1));
        gpio.pin_mode(10, PinMode::Output);
        assert_eq!(gpio.mirror.regs.read_pin(RegisterName::Config, 10), 0);
        gpio.pin_mode(10, PinMode::Pwm);
        assert_eq!(gpio.mirror.regs.read_pin(RegisterName::Config, 10), 0);
        assert_eq!(gpio.mirror.regs.read_pin(RegisterName::Pwm, 10), 1);
        gpio.pin_mode(10, PinMode::Input);
        assert_eq!(gpio.mirror.regs.read_pin(RegisterName::Config, 10), 1);
        assert_eq!(gpio.mirror.regs.read_pin(RegisterName::Pwm, 10), 0);
    }

    #[test]
    fn wiring_pi_isr_publishes_callback_before_enabling() {
        let gpio = Gpio::setup_with(Transport::new("127.0.0.1", 1));
        assert_eq!(gpio.wiring_pi_isr(7, IsrMode::Rising, || {}), 0);
        assert_eq!(gpio.mirror.regs.read_pin(RegisterName::Inten, 7), 1);
        assert!(gpio.mirror.isr(7).is_some());
    }
}
