//! The line-oriented wire format shared by every Broker response.
//!
//! A response body is one `op:<name>` line followed by zero or more
//! `>STATUS;KEY;VALUE` record lines. Parsing is deliberately tolerant:
//! anything that isn't one of those two line shapes is ignored rather
//! than treated as an error, and the client's record buffer has a fixed
//! capacity that parsing simply stops at rather than growing past.

use std::fmt;

/// Records per response the parser will collect before it stops.
pub const MAX_RECORDS: usize = 16;

/// The failure code half of a `FAIL~CODE` status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// Pin not found.
    Pnf,
    /// Unknown register name.
    Unkreg,
    /// Unknown action name.
    Unkact,
    /// Unrecognized API path.
    Unkapicall,
    /// I/O error (e.g. touching the preferences file).
    Ioerror,
    /// Not yet implemented.
    Nyi,
}

impl StatusCode {
    fn as_str(self) -> &'static str {
        match self {
            StatusCode::Pnf => "PNF",
            StatusCode::Unkreg => "UNKREG",
            StatusCode::Unkact => "UNKACT",
            StatusCode::Unkapicall => "UNKAPICALL",
            StatusCode::Ioerror => "IOERROR",
            StatusCode::Nyi => "NYI",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "PNF" => StatusCode::Pnf,
            "UNKREG" => StatusCode::Unkreg,
            "UNKACT" => StatusCode::Unkact,
            "UNKAPICALL" => StatusCode::Unkapicall,
            "IOERROR" => StatusCode::Ioerror,
            "NYI" => StatusCode::Nyi,
            _ => return None,
        })
    }
}

/// `SUCC`, or `FAIL~CODE` carrying an unrecognized code as-is so a
/// forward-compatible peer doesn't lose information it can't parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Succ,
    Fail(StatusCode),
    /// A `FAIL~...` status whose code this version doesn't recognize.
    FailUnknown(String),
    /// Used only as the pre-initialized value of a synthetic failure
    /// record built locally by the client transport when a request
    /// never reached the Broker at all.
    FailOpaque,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Succ => write!(f, "SUCC"),
            Status::Fail(code) => write!(f, "FAIL~{}", code.as_str()),
            Status::FailUnknown(code) => write!(f, "FAIL~{code}"),
            Status::FailOpaque => write!(f, "FAIL"),
        }
    }
}

impl Status {
    fn parse(s: &str) -> Self {
        match s.split_once('~') {
            Some(("FAIL", code)) => match StatusCode::parse(code) {
                Some(code) => Status::Fail(code),
                None => Status::FailUnknown(code.to_string()),
            },
            _ if s == "SUCC" => Status::Succ,
            _ if s == "FAIL" => Status::FailOpaque,
            _ => Status::FailUnknown(s.to_string()),
        }
    }
}

/// One `>STATUS;KEY;VALUE` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub status: Status,
    pub key: String,
    pub value: String,
}

impl Record {
    pub fn succ(key: impl Into<String>, value: impl Into<String>) -> Self {
        Record {
            status: Status::Succ,
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn fail(code: StatusCode, key: impl Into<String>, value: impl Into<String>) -> Self {
        Record {
            status: Status::Fail(code),
            key: key.into(),
            value: value.into(),
        }
    }

    fn write_line(&self, out: &mut String) {
        out.push('>');
        out.push_str(&self.status.to_string());
        out.push(';');
        out.push_str(&self.key);
        out.push(';');
        out.push_str(&self.value);
        out.push('\n');
    }
}

/// A parsed or to-be-emitted response: the `op:` name plus its records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub op: String,
    pub records: Vec<Record>,
}

impl Response {
    pub fn new(op: impl Into<String>) -> Self {
        Response {
            op: op.into(),
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) -> &mut Self {
        self.records.push(record);
        self
    }

    /// Render this response into the wire body format.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        out.push_str("op:");
        out.push_str(&self.op);
        out.push('\n');
        for record in &self.records {
            record.write_line(&mut out);
        }
        out
    }

    /// Parse a response body. Lines that are neither an `op:` line nor a
    /// `>`-prefixed record are silently skipped. At most [`MAX_RECORDS`]
    /// records are kept; anything past that is dropped rather than
    /// causing an error.
    pub fn parse(body: &str) -> Response {
        let mut op = String::new();
        let mut records = Vec::new();

        for line in body.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if let Some(rest) = line.strip_prefix("op:") {
                op = rest.to_string();
            } else if let Some(rest) = line.strip_prefix('>') {
                if records.len() >= MAX_RECORDS {
                    break;
                }
                let mut fields = rest.splitn(3, ';');
                let status = fields.next().unwrap_or("");
                let key = fields.next().unwrap_or("");
                let value = fields.next().unwrap_or("");
                records.push(Record {
                    status: Status::parse(status),
                    key: key.to_string(),
                    value: value.to_string(),
                });
            }
            // lines matching neither shape are ignored
        }

        Response { op, records }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_through_encode_and_parse() {
        let mut resp = Response::new("getreg");
        resp.push(Record::succ("output", "0x0000FFFF"));
        resp.push(Record::fail(StatusCode::Unkreg, "bogus", "no such register"));
        let encoded = resp.encode();
        let parsed = Response::parse(&encoded);
        assert_eq!(parsed, resp);
    }

    #[test]
    fn tolerant_parse_ignores_unrelated_lines() {
        let body = "garbage line\nop:action\nnot a record\n>SUCC;terminate;Exiting...\n";
        let parsed = Response::parse(body);
        assert_eq!(parsed.op, "action");
        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].key, "terminate");
    }

    #[test]
    fn parser_caps_at_max_records() {
        let mut body = String::from("op:getpin\n");
        for i in 0..(MAX_RECORDS + 5) {
            body.push_str(&format!(">SUCC;{i};1\n"));
        }
        let parsed = Response::parse(&body);
        assert_eq!(parsed.records.len(), MAX_RECORDS);
    }

    #[test]
    fn unknown_action_matches_s3_scenario() {
        let mut resp = Response::new("action");
        resp.push(Record::fail(StatusCode::Unkact, "foobar", "Invalid action name."));
        let body = resp.encode();
        assert!(body.starts_with("op:action\n>FAIL~UNKACT;foobar;Invalid action name."));
    }
}
