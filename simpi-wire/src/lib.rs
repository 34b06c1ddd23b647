//! Shared register model and wire format for the simpi GPIO simulator.
//!
//! This crate has no knowledge of HTTP or sockets. The Broker and the
//! client library both depend on it so that the bit-level semantics of
//! the register bank and the text format used to ship register values
//! back and forth only need to be right in one place.

pub mod codec;
pub mod regs;

pub use codec::{Record, Response, Status, StatusCode};
pub use regs::{
    read_pin, reg_to_str, str_to_reg, write_pin, EdgeSelector, RegisterBank, RegisterName,
    UnknownRegister,
};
