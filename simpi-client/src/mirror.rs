//! The client's local mirror of the Broker's register bank, plus the
//! interrupt handler table the sync engine consults every round.

use std::sync::{Arc, Mutex};

use simpi_wire::RegisterBank;

/// A zero-argument interrupt callback, as installed by `wiring_pi_isr`.
pub type IsrCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Number of pin slots in the callback table. Matches the register
/// width; only `[min_num, max_num]` are ever addressed by the public
/// API, but the table is sized for the full word.
const ISR_SLOTS: usize = 32;

/// The client's register mirror and ISR table.
///
/// Per the concurrency design: `input` is written only by the sync
/// engine and read by user code; `output`/`config`/`pwm`/`inten`/
/// `int0`/`int1` are written by user code (via the public API) and
/// republished wholesale by the sync engine every round. The ISR table
/// is guarded by a mutex — installing a callback (`wiring_pi_isr`) locks,
/// writes the slot, and unlocks *before* the matching `inten` bit is
/// set, so the sync engine never observes `inten[p] == 1` with an empty
/// slot for that pin.
pub struct Mirror {
    pub regs: RegisterBank,
    isr: Mutex<[Option<IsrCallback>; ISR_SLOTS]>,
}

impl Default for Mirror {
    fn default() -> Self {
        Self::new()
    }
}

impl Mirror {
    pub fn new() -> Self {
        Mirror {
            regs: RegisterBank::new(),
            isr: Mutex::new(std::array::from_fn(|_| None)),
        }
    }

    /// Install (or replace) the callback for `pin`. Called before the
    /// corresponding `inten`/`int0`/`int1` bits are written.
    pub fn set_isr(&self, pin: u8, callback: IsrCallback) {
        let mut table = self.isr.lock().unwrap();
        table[pin as usize] = Some(callback);
    }

    /// Fetch the callback for `pin`, if any is installed.
    pub fn isr(&self, pin: u8) -> Option<IsrCallback> {
        self.isr.lock().unwrap()[pin as usize].clone()
    }
}
