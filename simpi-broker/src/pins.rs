//! The static 40-pin header descriptor table.
//!
//! This backs the name-addressed form of `getpin`/`setpin`: a request
//! may name a pin either by its physical header position (`1`..`40`) or
//! by its canonical (`GPIO17`) or alternate-function (`UART0_TXD`) name.
//! The numeric GPIO-register addressing used by `getreg`/`setreg` is
//! unrelated — that indexes bits `2..27` of the register words directly,
//! not this table.

/// What's physically present at a header position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinType {
    Unknown,
    Gnd,
    Dnc,
    Const3v3,
    Const5v,
    Gpio,
}

/// One entry in the 40-pin header.
#[derive(Debug, Clone, Copy)]
pub struct PinDescriptor {
    /// Physical header position, 1-40.
    pub number: u8,
    pub kind: PinType,
    /// Canonical name, e.g. `"GPIO17"`, `"3V3_1"`, `"GND_4"`.
    pub name: &'static str,
    /// Alternate-function name, e.g. `"UART0_TXD"`, empty if none.
    pub alt_name: &'static str,
}

use PinType::*;

/// The 40-pin header, in physical order.
pub const PIN_TABLE: [PinDescriptor; 40] = [
    PinDescriptor { number: 1, kind: Const3v3, name: "3V3_1", alt_name: "" },
    PinDescriptor { number: 2, kind: Const5v, name: "5V_1", alt_name: "" },
    PinDescriptor { number: 3, kind: Gpio, name: "GPIO2", alt_name: "SDA" },
    PinDescriptor { number: 4, kind: Const5v, name: "5V_2", alt_name: "" },
    PinDescriptor { number: 5, kind: Gpio, name: "GPIO3", alt_name: "SCL" },
    PinDescriptor { number: 6, kind: Gnd, name: "GND_1", alt_name: "" },
    PinDescriptor { number: 7, kind: Gpio, name: "GPIO4", alt_name: "" },
    PinDescriptor { number: 8, kind: Gpio, name: "GPIO14", alt_name: "UART0_TXD" },
    PinDescriptor { number: 9, kind: Gnd, name: "GND_2", alt_name: "" },
    PinDescriptor { number: 10, kind: Gpio, name: "GPIO15", alt_name: "UART0_RXD" },
    PinDescriptor { number: 11, kind: Gpio, name: "GPIO17", alt_name: "" },
    PinDescriptor { number: 12, kind: Gpio, name: "GPIO18", alt_name: "CLK" },
    PinDescriptor { number: 13, kind: Gpio, name: "GPIO27", alt_name: "" },
    PinDescriptor { number: 14, kind: Gnd, name: "GND_3", alt_name: "" },
    PinDescriptor { number: 15, kind: Gpio, name: "GPIO22", alt_name: "" },
    PinDescriptor { number: 16, kind: Gpio, name: "GPIO23", alt_name: "" },
    PinDescriptor { number: 17, kind: Const3v3, name: "3V3_2", alt_name: "" },
    PinDescriptor { number: 18, kind: Gpio, name: "GPIO24", alt_name: "" },
    PinDescriptor { number: 19, kind: Gpio, name: "GPIO10", alt_name: "MOSI" },
    PinDescriptor { number: 20, kind: Gnd, name: "GND_4", alt_name: "" },
    PinDescriptor { number: 21, kind: Gpio, name: "GPIO9", alt_name: "MISO" },
    PinDescriptor { number: 22, kind: Gpio, name: "GPIO25", alt_name: "" },
    PinDescriptor { number: 23, kind: Gpio, name: "GPIO11", alt_name: "CLK" },
    PinDescriptor { number: 24, kind: Gpio, name: "GPIO8", alt_name: "CE0_N" },
    PinDescriptor { number: 25, kind: Gnd, name: "GND_5", alt_name: "" },
    PinDescriptor { number: 26, kind: Gpio, name: "GPIO7", alt_name: "CE1_N" },
    PinDescriptor { number: 27, kind: Dnc, name: "DNC_1", alt_name: "I2C" },
    PinDescriptor { number: 28, kind: Dnc, name: "DNC_2", alt_name: "I2C" },
    PinDescriptor { number: 29, kind: Gpio, name: "GPIO5", alt_name: "" },
    PinDescriptor { number: 30, kind: Gnd, name: "GND_6", alt_name: "" },
    PinDescriptor { number: 31, kind: Gpio, name: "GPIO6", alt_name: "" },
    PinDescriptor { number: 32, kind: Gpio, name: "GPIO12", alt_name: "" },
    PinDescriptor { number: 33, kind: Gpio, name: "GPIO13", alt_name: "" },
    PinDescriptor { number: 34, kind: Gnd, name: "GND_7", alt_name: "" },
    PinDescriptor { number: 35, kind: Gpio, name: "GPIO19", alt_name: "" },
    PinDescriptor { number: 36, kind: Gpio, name: "GPIO16", alt_name: "" },
    PinDescriptor { number: 37, kind: Gpio, name: "GPIO26", alt_name: "" },
    PinDescriptor { number: 38, kind: Gpio, name: "GPIO20", alt_name: "" },
    PinDescriptor { number: 39, kind: Gnd, name: "GND_8", alt_name: "" },
    PinDescriptor { number: 40, kind: Gpio, name: "GPIO21", alt_name: "" },
];

/// Look up a pin by its physical header number (1-40).
pub fn by_number(number: u8) -> Option<&'static PinDescriptor> {
    PIN_TABLE.iter().find(|p| p.number == number)
}

/// Look up a pin by canonical or alternate-function name.
pub fn by_name(name: &str) -> Option<&'static PinDescriptor> {
    PIN_TABLE
        .iter()
        .find(|p| p.name == name || (!p.alt_name.is_empty() && p.alt_name == name))
}

/// Extract the GPIO register bit index (`2..27`) a header pin maps to,
/// for descriptors whose `kind` is `Gpio`. The canonical name encodes
/// it directly (`GPIO17` -> `17`).
pub fn gpio_bit(descriptor: &PinDescriptor) -> Option<u8> {
    if descriptor.kind != PinType::Gpio {
        return None;
    }
    descriptor.name.strip_prefix("GPIO")?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_forty_entries_numbered_one_to_forty() {
        assert_eq!(PIN_TABLE.len(), 40);
        for (i, pin) in PIN_TABLE.iter().enumerate() {
            assert_eq!(pin.number as usize, i + 1);
        }
    }

    #[test]
    fn lookup_by_name_and_alt_name() {
        assert_eq!(by_name("GPIO17").unwrap().number, 11);
        assert_eq!(by_name("UART0_TXD").unwrap().number, 8);
        assert!(by_name("NOT_A_PIN").is_none());
    }

    #[test]
    fn gpio_bit_maps_to_register_index() {
        let descriptor = by_name("GPIO17").unwrap();
        assert_eq!(gpio_bit(descriptor), Some(17));
        let gnd = by_name("GND_1").unwrap();
        assert_eq!(gpio_bit(gnd), None);
    }
}
