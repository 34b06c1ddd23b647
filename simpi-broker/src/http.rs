//! A deliberately minimal HTTP/1.1 server: one thread per connection,
//! a hand-rolled request-line/header parser, and a fixed route table
//! that sends everything under `/api/` to [`crate::api`] and
//! everything else to a static file under `AppState::static_dir`.
//!
//! There's no keep-alive: every response closes the connection, which
//! keeps the client's `Transport` (one TCP connection per call) and
//! this server in lockstep.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use crate::api;
use crate::state::AppState;

const RECV_BUF_SIZE: usize = 8192;
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Bind and serve until `state.running` is cleared by the
/// `action/terminate` handler. Returns once the accept loop notices
/// the flag; in-flight connection threads are not waited on, matching
/// the client's own bounded (not unbounded) teardown philosophy.
pub fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    listener.set_nonblocking(true)?;
    while state.running.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((stream, addr)) => {
                let state = Arc::clone(&state);
                std::thread::spawn(move || {
                    if let Err(error) = handle_connection(stream, &state) {
                        tracing::warn!(%addr, %error, "connection handling failed");
                    }
                });
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                std::thread::sleep(ACCEPT_POLL);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

struct Request {
    method: String,
    path: String,
    body: Vec<u8>,
}

fn read_request(stream: &mut TcpStream) -> std::io::Result<Request> {
    let mut buf = [0u8; RECV_BUF_SIZE];
    let mut filled = 0usize;
    let header_end = loop {
        if filled == buf.len() {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidData, "request too large"));
        }
        let n = stream.read(&mut buf[filled..filled + 1])?;
        if n == 0 {
            return Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "peer closed early"));
        }
        filled += 1;
        if filled >= 4 && &buf[filled - 4..filled] == b"\r\n\r\n" {
            break filled;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or("");
    let mut parts = request_line.split(' ');
    let method = parts.next().unwrap_or("").to_string();
    let path = parts.next().unwrap_or("/").to_string();

    let content_length: usize = lines
        .find_map(|line| line.split_once(':').filter(|(k, _)| k.eq_ignore_ascii_case("content-length")))
        .and_then(|(_, v)| v.trim().parse().ok())
        .unwrap_or(0);

    let mut body = Vec::with_capacity(content_length);
    while body.len() < content_length {
        let mut byte = [0u8; 1];
        match stream.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => body.push(byte[0]),
            Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(Request { method, path, body })
}

fn write_response(stream: &mut TcpStream, status_line: &str, content_type: &str, body: &[u8]) -> std::io::Result<()> {
    let header = format!(
        "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {len}\r\nConnection: close\r\n\r\n",
        len = body.len(),
    );
    stream.write_all(header.as_bytes())?;
    stream.write_all(body)?;
    stream.flush()
}

fn handle_connection(mut stream: TcpStream, state: &AppState) -> std::io::Result<()> {
    let request = read_request(&mut stream)?;
    tracing::trace!(method = %request.method, path = %request.path, "request");

    if let Some(rest) = request.path.strip_prefix("/api/") {
        let (op, arg) = rest.split_once('/').unwrap_or((rest, ""));
        return route_api(&mut stream, state, &request, op, arg);
    }

    serve_static(&mut stream, state, &request.path)
}

fn route_api(
    stream: &mut TcpStream,
    state: &AppState,
    request: &Request,
    op: &str,
    arg: &str,
) -> std::io::Result<()> {
    match op {
        "getpin" => write_wire(stream, &api::getpin(state, arg)),
        "setpin" => write_wire(stream, &api::setpin(state, arg)),
        "getreg" => write_wire(stream, &api::getreg(state, arg)),
        "setreg" => write_wire(stream, &api::setreg(state, arg)),
        "action" => {
            let (resp, terminate) = api::action(state, arg);
            write_wire(stream, &resp)?;
            if terminate {
                tracing::info!("terminate requested, accept loop will stop");
                state.running.store(false, Ordering::Relaxed);
            }
            Ok(())
        }
        "prefs" => route_prefs(stream, state, request),
        _ => {
            let mut resp = simpi_wire::Response::new(op);
            resp.push(simpi_wire::Record::fail(
                simpi_wire::StatusCode::Unkapicall,
                op,
                "Unrecognized API call.",
            ));
            write_wire(stream, &resp)
        }
    }
}

fn route_prefs(stream: &mut TcpStream, state: &AppState, request: &Request) -> std::io::Result<()> {
    match request.method.as_str() {
        "PUT" => match api::prefs_put(state, &request.body) {
            api::PrefsResult::Ok(()) => write_response(stream, "200 OK", "text/plain", b"SUCC"),
            api::PrefsResult::IoError => write_response(stream, "200 OK", "text/plain", b"FAIL~IOERROR"),
        },
        _ => match api::prefs_get(state) {
            api::PrefsResult::Ok(bytes) => write_response(stream, "200 OK", "application/json", &bytes),
            api::PrefsResult::IoError => write_response(stream, "200 OK", "text/plain", b"FAIL~IOERROR"),
        },
    }
}

fn write_wire(stream: &mut TcpStream, resp: &simpi_wire::Response) -> std::io::Result<()> {
    write_response(stream, "200 OK", "text/plain", resp.encode().as_bytes())
}

fn serve_static(stream: &mut TcpStream, state: &AppState, path: &str) -> std::io::Result<()> {
    let rel = path.trim_start_matches('/');
    let rel = if rel.is_empty() { "index.html" } else { rel };
    // Reject any attempt to climb out of the static root.
    if rel.split('/').any(|seg| seg == "..") {
        return write_response(stream, "400 Bad Request", "text/plain", b"bad path");
    }
    let full = state.static_dir.join(rel);
    match std::fs::read(&full) {
        Ok(bytes) => {
            let content_type = content_type_for(&full);
            write_response(stream, "200 OK", content_type, &bytes)
        }
        Err(_) => write_response(stream, "404 Not Found", "text/plain", b"not found"),
    }
}

fn content_type_for(path: &std::path::Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some("html") => "text/html",
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
