//! Blinks four simulated LEDs in lockstep against a running
//! `simpi-broker`. LEDs turn off on exit for free: `Gpio::drop` runs
//! when `main` returns, no signal handler required.

use simpi_client::{Gpio, PinMode};

const LEDS: [u8; 4] = [18, 23, 24, 25];
const DELAY_MS: u64 = 250;
const CYCLES: usize = 8;

fn main() {
    println!("Blinky v0.1.0\n");
    let gpio = Gpio::setup();
    for led in LEDS {
        gpio.pin_mode(led, PinMode::Output);
    }

    for _ in 0..CYCLES {
        for led in LEDS {
            gpio.digital_write(led, 0);
        }
        gpio.delay(DELAY_MS);
        for led in LEDS {
            gpio.digital_write(led, 1);
        }
        gpio.delay(DELAY_MS);
    }

    for led in LEDS {
        gpio.digital_write(led, 0);
    }
    println!("done.");
}
