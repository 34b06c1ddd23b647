//! Polls three simulated buttons and prints their state, overwriting
//! the same terminal line.

use simpi_client::{Gpio, PinMode};

const BTN1: u8 = 22;
const BTN2: u8 = 27;
const BTN3: u8 = 17;
const POLL_MS: u64 = 10;
const ITERATIONS: usize = 200;

fn main() {
    println!("Unit Test: check_buttons\n");
    let gpio = Gpio::setup();
    gpio.pin_mode(BTN1, PinMode::Input);
    gpio.pin_mode(BTN2, PinMode::Input);
    gpio.pin_mode(BTN3, PinMode::Input);

    for _ in 0..ITERATIONS {
        check_buttons(&gpio);
        gpio.delay(POLL_MS);
    }
    println!();
}

fn check_buttons(gpio: &simpi_client::Gpio) {
    print!(
        "BTN1={}  BTN2={}  BTN3={}     \r",
        gpio.digital_read(BTN1),
        gpio.digital_read(BTN2),
        gpio.digital_read(BTN3),
    );
    use std::io::Write;
    let _ = std::io::stdout().flush();
}
