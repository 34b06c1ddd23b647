//! Handlers for everything under `/api/`.
//!
//! Each `getpin`/`setpin`/`getreg`/`setreg`/`action` handler takes the
//! path segment after the op name (still `;`-joined, un-decoded beyond
//! what `http` already stripped) and returns a fully-built
//! [`simpi_wire::Response`]; `http` is the only thing that knows how to
//! turn that into bytes on a socket.
//!
//! `prefs` is the odd one out: it doesn't speak the wire op/record
//! format at all, just raw JSON bytes or a literal `FAIL~IOERROR` line,
//! per the opaque passthrough this endpoint is documented as.

use simpi_wire::{Record, RegisterName, Response, StatusCode};

use crate::pins;
use crate::state::AppState;

fn resolve_pin(ident: &str) -> Option<u8> {
    if let Ok(n) = ident.parse::<u8>() {
        return Some(n);
    }
    pins::by_name(ident).and_then(pins::gpio_bit)
}

fn parse_bit(s: &str) -> Option<u8> {
    match s.to_ascii_uppercase().as_str() {
        "0" | "LOW" => Some(0),
        "1" | "HIGH" => Some(1),
        _ => None,
    }
}

fn tokens(arg: &str) -> impl Iterator<Item = &str> {
    arg.split(';').filter(|t| !t.is_empty())
}

/// `GET /api/getpin/P1;P2;...` — read the `output` bit for each pin,
/// addressed by GPIO number or by header-table name.
pub fn getpin(state: &AppState, arg: &str) -> Response {
    let mut resp = Response::new("getpin");
    for token in tokens(arg) {
        match resolve_pin(token).filter(|p| state.regs.in_range(*p)) {
            Some(pin) => {
                let bit = state.regs.read_pin(RegisterName::Output, pin);
                resp.push(Record::succ(token, bit.to_string()));
            }
            None => {
                resp.push(Record::fail(StatusCode::Pnf, token, "Pin not found."));
            }
        }
    }
    resp
}

/// `GET /api/setpin/P1=V1;P2=V2;...` — write the `input` bit for each
/// pin. `V` is `0`/`1` or `LOW`/`HIGH`, case-insensitive.
pub fn setpin(state: &AppState, arg: &str) -> Response {
    let mut resp = Response::new("setpin");
    for token in tokens(arg) {
        let Some((name, value)) = token.split_once('=') else {
            resp.push(Record::fail(StatusCode::Pnf, token, "Pin not found."));
            continue;
        };
        match (
            resolve_pin(name).filter(|p| state.regs.in_range(*p)),
            parse_bit(value),
        ) {
            (Some(pin), Some(bit)) => {
                state.regs.write_pin(RegisterName::Input, pin, bit);
                resp.push(Record::succ(name, bit.to_string()));
            }
            _ => {
                resp.push(Record::fail(StatusCode::Pnf, name, "Pin not found."));
            }
        }
    }
    resp
}

/// `GET /api/getreg/N1;N2;...` — read whole registers as hex words.
pub fn getreg(state: &AppState, arg: &str) -> Response {
    let mut resp = Response::new("getreg");
    for token in tokens(arg) {
        match token.parse::<RegisterName>() {
            Ok(name) => {
                let value = simpi_wire::regs::reg_to_str(state.regs.get(name));
                resp.push(Record::succ(token, value));
            }
            Err(_) => {
                resp.push(Record::fail(StatusCode::Unkreg, token, "Unknown register name."));
            }
        }
    }
    resp
}

/// `GET /api/setreg/N1=H1;N2=H2;...` — parse and assign whole registers.
/// Applied one register at a time, not as a single atomic batch.
pub fn setreg(state: &AppState, arg: &str) -> Response {
    let mut resp = Response::new("setreg");
    for token in tokens(arg) {
        let Some((name, hex)) = token.split_once('=') else {
            resp.push(Record::fail(StatusCode::Unkreg, token, "Unknown register name."));
            continue;
        };
        match name.parse::<RegisterName>() {
            Ok(reg) => {
                let value = simpi_wire::regs::str_to_reg(hex);
                state.regs.set(reg, value);
                resp.push(Record::succ(name, simpi_wire::regs::reg_to_str(value)));
            }
            Err(_) => {
                resp.push(Record::fail(StatusCode::Unkreg, name, "Unknown register name."));
            }
        }
    }
    resp
}

/// `GET /api/action/<name>`. Returns the response to send plus whether
/// `terminate` was requested — the caller is responsible for flushing
/// the response to the socket *before* acting on that flag, so the
/// requesting connection still gets its reply.
pub fn action(state: &AppState, arg: &str) -> (Response, bool) {
    let mut resp = Response::new("action");
    let name = arg.trim();
    match name {
        "terminate" => {
            resp.push(Record::succ("terminate", "Exiting..."));
            (resp, true)
        }
        "reset" => {
            state.regs.reset();
            resp.push(Record::succ("reset", "Register state reset."));
            (resp, false)
        }
        _ => {
            resp.push(Record::fail(StatusCode::Unkact, name, "Invalid action name."));
            (resp, false)
        }
    }
}

/// Result of touching the opaque preferences blob.
pub enum PrefsResult<T> {
    Ok(T),
    IoError,
}

/// `GET /api/prefs` — return the preferences file verbatim.
pub fn prefs_get(state: &AppState) -> PrefsResult<Vec<u8>> {
    match std::fs::read(&state.prefs_path) {
        Ok(bytes) => PrefsResult::Ok(bytes),
        Err(e) => {
            tracing::warn!(path = %state.prefs_path.display(), error = %e, "prefs read failed");
            PrefsResult::IoError
        }
    }
}

/// `PUT /api/prefs` — overwrite the preferences file verbatim. The
/// parent directory is created if missing so a fresh install doesn't
/// need to pre-seed it.
pub fn prefs_put(state: &AppState, body: &[u8]) -> PrefsResult<()> {
    if let Some(parent) = state.prefs_path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::warn!(path = %parent.display(), error = %e, "prefs dir create failed");
            return PrefsResult::IoError;
        }
    }
    match std::fs::write(&state.prefs_path, body) {
        Ok(()) => PrefsResult::Ok(()),
        Err(e) => {
            tracing::warn!(path = %state.prefs_path.display(), error = %e, "prefs write failed");
            PrefsResult::IoError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fresh_state() -> AppState {
        AppState::new(PathBuf::from("./www"), PathBuf::from("/tmp/simpi-test-prefs.json"))
    }

    #[test]
    fn getpin_and_setpin_by_number() {
        let state = fresh_state();
        let resp = setpin(&state, "17=1;3=0");
        assert_eq!(resp.records.len(), 2);
        assert_eq!(state.regs.read_pin(RegisterName::Input, 17), 1);

        let resp = getpin(&state, "17");
        assert_eq!(resp.records[0].value, "0"); // output unaffected by setpin
    }

    #[test]
    fn getpin_by_name_matches_numeric() {
        let state = fresh_state();
        state.regs.write_pin(RegisterName::Output, 17, 1);
        let by_name = getpin(&state, "GPIO17");
        let by_number = getpin(&state, "17");
        assert_eq!(by_name.records[0].value, by_number.records[0].value);
    }

    #[test]
    fn setpin_rejects_ground_pin_name() {
        let state = fresh_state();
        let resp = setpin(&state, "GND_1=1");
        assert_eq!(resp.records[0].status, simpi_wire::Status::Fail(StatusCode::Pnf));
    }

    #[test]
    fn getreg_and_setreg_roundtrip() {
        let state = fresh_state();
        setreg(&state, "output=0x00000004");
        let resp = getreg(&state, "output;bogus");
        assert_eq!(resp.records[0].value, "0x00000004");
        assert_eq!(resp.records[1].status, simpi_wire::Status::Fail(StatusCode::Unkreg));
    }

    #[test]
    fn action_terminate_requests_shutdown_but_reset_does_not() {
        let state = fresh_state();
        let (_, terminate) = action(&state, "terminate");
        assert!(terminate);
        let (_, terminate) = action(&state, "reset");
        assert!(!terminate);
    }

    #[test]
    fn action_unknown_fails_with_unkact() {
        let state = fresh_state();
        let (resp, terminate) = action(&state, "bogus");
        assert!(!terminate);
        assert_eq!(resp.records[0].status, simpi_wire::Status::Fail(StatusCode::Unkact));
    }
}
