//! The background sync engine: pulls `input` from the Broker, detects
//! edges against the previous round's mirror, fires ISR callbacks, and
//! pushes the output-side registers back. See module docs in
//! `simpi-wire::regs` for the edge-selector semantics.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use simpi_wire::{reg_to_str, str_to_reg, EdgeSelector, RegisterName};

use crate::mirror::Mirror;
use crate::transport::Transport;

/// Run one pull/detect/push cycle against `mirror` over `transport`.
pub fn sync_round(transport: &Transport, mirror: &Mirror) {
    pull_and_fire_isrs(transport, mirror);
    push_output_side(transport, mirror);
}

fn pull_and_fire_isrs(transport: &Transport, mirror: &Mirror) {
    let resp = transport.request("/api/getreg/input");
    let new_value = resp
        .records
        .first()
        .map(|r| str_to_reg(&r.value))
        .unwrap_or(0);

    let old_value = mirror.regs.get(RegisterName::Input);
    mirror.regs.set(RegisterName::Input, new_value);

    let inten = mirror.regs.get(RegisterName::Inten);
    let int0 = mirror.regs.get(RegisterName::Int0);
    let int1 = mirror.regs.get(RegisterName::Int1);

    for pin in mirror.regs.min_num()..=mirror.regs.max_num() {
        if simpi_wire::read_pin(pin, inten) == 0 {
            continue;
        }
        let Some(callback) = mirror.isr(pin) else {
            continue;
        };
        let selector = EdgeSelector::from_bits(
            simpi_wire::read_pin(pin, int1),
            simpi_wire::read_pin(pin, int0),
        );
        let old = simpi_wire::read_pin(pin, old_value);
        let new = simpi_wire::read_pin(pin, new_value);
        if selector.fires(old, new) {
            callback();
        }
    }
}

fn push_output_side(transport: &Transport, mirror: &Mirror) {
    let path = format!(
        "/api/setreg/output={};config={};pwm={};inten={};int0={};int1={}",
        reg_to_str(mirror.regs.get(RegisterName::Output)),
        reg_to_str(mirror.regs.get(RegisterName::Config)),
        reg_to_str(mirror.regs.get(RegisterName::Pwm)),
        reg_to_str(mirror.regs.get(RegisterName::Inten)),
        reg_to_str(mirror.regs.get(RegisterName::Int0)),
        reg_to_str(mirror.regs.get(RegisterName::Int1)),
    );
    transport.request(&path);
}

/// Run sync rounds in a loop until `running` is cleared. Called on the
/// dedicated sync thread spawned by `setup()`; never sleeps, pacing
/// comes entirely from the round-trip to the Broker.
pub fn run(transport: Transport, mirror: Arc<Mirror>, running: Arc<AtomicBool>) {
    while running.load(Ordering::Relaxed) {
        sync_round(&transport, &mirror);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::AtomicUsize;

    /// Accept one HTTP GET and reply with a canned simpi response body.
    fn serve_once(listener: TcpListener, body: &'static str) {
        std::thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 512];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body,
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
    }

    #[test]
    fn pull_fires_registered_isr_on_rising_edge() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        serve_once(listener, "op:getreg\n>SUCC;input;0x00000020\n");

        let mirror = Mirror::new();
        mirror.regs.set(RegisterName::Inten, 1 << 5);
        mirror.regs.set(RegisterName::Int1, 1 << 5);
        mirror.regs.set(RegisterName::Int0, 1 << 5);

        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        mirror.set_isr(5, Arc::new(move || {
            f.fetch_add(1, Ordering::SeqCst);
        }));

        let transport = Transport::new("127.0.0.1", port);
        pull_and_fire_isrs(&transport, &mirror);

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(mirror.regs.get(RegisterName::Input), 0x20);
    }

    #[test]
    fn pull_does_not_fire_on_falling_when_configured_rising() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        serve_once(listener, "op:getreg\n>SUCC;input;0x00000000\n");

        let mirror = Mirror::new();
        mirror.regs.set(RegisterName::Input, 1 << 5); // was high
        mirror.regs.set(RegisterName::Inten, 1 << 5);
        mirror.regs.set(RegisterName::Int1, 1 << 5); // rising only
        mirror.regs.set(RegisterName::Int0, 1 << 5);

        let fired = Arc::new(AtomicUsize::new(0));
        let f = fired.clone();
        mirror.set_isr(5, Arc::new(move || {
            f.fetch_add(1, Ordering::SeqCst);
        }));

        let transport = Transport::new("127.0.0.1", port);
        pull_and_fire_isrs(&transport, &mirror);

        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
