//! One-shot HTTP transport: every call opens a fresh TCP connection,
//! sends a single GET request, and reads until the peer closes.
//!
//! There is no connection pooling and no retrying. Keeping the client
//! this small is the point — see the module docs in `simpi-wire`.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use simpi_wire::{Response, Status};

/// Default Broker address. Fixed at compile time on the client.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 32000;

/// Receive buffer size for one request/response cycle.
const RECV_BUF_SIZE: usize = 1024;

/// A connection to one Broker, identified by host and port.
#[derive(Debug, Clone)]
pub struct Transport {
    host: String,
    port: u16,
}

impl Default for Transport {
    fn default() -> Self {
        Transport::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl Transport {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Transport {
            host: host.into(),
            port,
        }
    }

    /// Issue `GET <path> HTTP/1.1` against the Broker and parse the
    /// response body as a [`Response`]. Any socket-level failure is
    /// logged and turned into a single-record synthetic failure
    /// response rather than propagated — every client call is total.
    pub fn request(&self, path: &str) -> Response {
        match self.request_inner(path) {
            Ok(resp) => resp,
            Err(error) => {
                tracing::warn!(%error, %path, "simpi-client: request to broker failed");
                synthetic_failure()
            }
        }
    }

    fn request_inner(&self, path: &str) -> std::io::Result<Response> {
        let addr = (self.host.as_str(), self.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::NotFound, "no address resolved")
            })?;
        let mut stream = TcpStream::connect_timeout(&addr, Duration::from_secs(5))?;
        stream.set_nodelay(true)?;

        let request = format!(
            "GET {path} HTTP/1.1\r\nHost: {host}:{port}\r\nAccept: text/*\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            host = self.host,
            port = self.port,
        );
        stream.write_all(request.as_bytes())?;

        let mut buf = [0u8; RECV_BUF_SIZE];
        let mut filled = 0usize;
        while filled < buf.len() {
            let mut one = [0u8; 1];
            match stream.read(&mut one) {
                Ok(0) => break, // peer closed: end of response
                Ok(_) => {
                    buf[filled] = one[0];
                    filled += 1;
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        let received = String::from_utf8_lossy(&buf[..filled]);
        let body = received
            .find("\r\n\r\n")
            .map(|idx| &received[idx + 4..])
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidData, "no valid HTTP response")
            })?;

        Ok(Response::parse(body))
    }
}

fn synthetic_failure() -> Response {
    let mut resp = Response::new("?");
    resp.push(simpi_wire::Record {
        status: Status::FailOpaque,
        key: String::new(),
        value: String::new(),
    });
    resp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unreachable_broker_yields_synthetic_failure() {
        // Port 1 is reserved and nothing should be listening there.
        let transport = Transport::new("127.0.0.1", 1);
        let resp = transport.request("/api/getreg/input");
        assert_eq!(resp.records.len(), 1);
        assert_eq!(resp.records[0].status, Status::FailOpaque);
    }
}
