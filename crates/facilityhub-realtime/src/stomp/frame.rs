//! STOMP 1.2 frame codec.
//!
//! A frame is a command line, header lines, a blank line, an optional body,
//! and a NUL terminator. Header values are escaped in every frame except
//! CONNECT/CONNECTED, per the STOMP 1.2 specification. Heartbeats are bare
//! EOLs and are filtered out before parsing.

use std::fmt;

use facilityhub_core::{AppError, AppResult};

/// STOMP commands used by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Client handshake.
    Connect,
    /// Server handshake acknowledgement.
    Connected,
    /// Open a topic subscription.
    Subscribe,
    /// Close a topic subscription.
    Unsubscribe,
    /// Publish to a destination.
    Send,
    /// Broker-delivered message on a subscribed topic.
    Message,
    /// Graceful teardown.
    Disconnect,
    /// Server receipt acknowledgement.
    Receipt,
    /// Server-reported error.
    Error,
}

impl Command {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Connected => "CONNECTED",
            Self::Subscribe => "SUBSCRIBE",
            Self::Unsubscribe => "UNSUBSCRIBE",
            Self::Send => "SEND",
            Self::Message => "MESSAGE",
            Self::Disconnect => "DISCONNECT",
            Self::Receipt => "RECEIPT",
            Self::Error => "ERROR",
        }
    }

    fn parse(s: &str) -> AppResult<Self> {
        match s {
            "CONNECT" => Ok(Self::Connect),
            "CONNECTED" => Ok(Self::Connected),
            "SUBSCRIBE" => Ok(Self::Subscribe),
            "UNSUBSCRIBE" => Ok(Self::Unsubscribe),
            "SEND" => Ok(Self::Send),
            "MESSAGE" => Ok(Self::Message),
            "DISCONNECT" => Ok(Self::Disconnect),
            "RECEIPT" => Ok(Self::Receipt),
            "ERROR" => Ok(Self::Error),
            other => Err(AppError::connection(format!("Unknown STOMP command: {other}"))),
        }
    }

    /// CONNECT and CONNECTED frames carry unescaped headers.
    fn escapes_headers(&self) -> bool {
        !matches!(self, Self::Connect | Self::Connected)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A STOMP frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The frame command.
    pub command: Command,
    /// Header name/value pairs in order.
    pub headers: Vec<(String, String)>,
    /// Frame body (empty for most client frames).
    pub body: String,
}

impl Frame {
    /// Creates a bare frame.
    pub fn new(command: Command) -> Self {
        Self {
            command,
            headers: Vec::new(),
            body: String::new(),
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Returns the first header with the given name, if any.
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Builds the client handshake frame.
    pub fn connect(host: &str) -> Self {
        Self::new(Command::Connect)
            .header("accept-version", "1.2")
            .header("host", host)
            .header("heart-beat", "0,0")
    }

    /// Builds a SUBSCRIBE frame.
    pub fn subscribe(id: &str, destination: &str) -> Self {
        Self::new(Command::Subscribe)
            .header("id", id)
            .header("destination", destination)
            .header("ack", "auto")
    }

    /// Builds an UNSUBSCRIBE frame.
    pub fn unsubscribe(id: &str) -> Self {
        Self::new(Command::Unsubscribe).header("id", id)
    }

    /// Builds a SEND frame with a JSON body.
    pub fn send(destination: &str, body: &str) -> Self {
        Self::new(Command::Send)
            .header("destination", destination)
            .header("content-type", "application/json")
            .header("content-length", body.len().to_string())
            .body(body)
    }

    /// Builds a DISCONNECT frame.
    pub fn disconnect() -> Self {
        Self::new(Command::Disconnect)
    }

    /// Serializes the frame to its wire representation.
    pub fn serialize(&self) -> String {
        let escape = self.command.escapes_headers();
        let mut out = String::with_capacity(64 + self.body.len());
        out.push_str(self.command.as_str());
        out.push('\n');
        for (name, value) in &self.headers {
            if escape {
                out.push_str(&escape_header(name));
                out.push(':');
                out.push_str(&escape_header(value));
            } else {
                out.push_str(name);
                out.push(':');
                out.push_str(value);
            }
            out.push('\n');
        }
        out.push('\n');
        out.push_str(&self.body);
        out.push('\0');
        out
    }

    /// Parses a frame from its wire representation.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let raw = raw.strip_suffix('\0').unwrap_or(raw);
        let (head, body) = if let Some((head, body)) = raw.split_once("\r\n\r\n") {
            (head, body)
        } else if let Some((head, body)) = raw.split_once("\n\n") {
            (head, body)
        } else {
            (raw, "")
        };

        let mut lines = head.lines();
        let command_line = lines
            .next()
            .ok_or_else(|| AppError::connection("Empty STOMP frame"))?;
        let command = Command::parse(command_line.trim_end_matches('\r'))?;
        let unescape_needed = command.escapes_headers();

        let mut headers = Vec::new();
        for line in lines {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                break;
            }
            let (name, value) = line.split_once(':').ok_or_else(|| {
                AppError::connection(format!("Malformed STOMP header line: {line}"))
            })?;
            if unescape_needed {
                headers.push((unescape_header(name)?, unescape_header(value)?));
            } else {
                headers.push((name.to_string(), value.to_string()));
            }
        }

        Ok(Self {
            command,
            headers,
            body: body.to_string(),
        })
    }

    /// Whether a raw websocket text payload is a STOMP heartbeat.
    pub fn is_heartbeat(raw: &str) -> bool {
        matches!(raw, "\n" | "\r\n" | "")
    }
}

fn escape_header(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            ':' => out.push_str("\\c"),
            '\\' => out.push_str("\\\\"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_header(s: &str) -> AppResult<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('c') => out.push(':'),
            Some('\\') => out.push('\\'),
            other => {
                return Err(AppError::connection(format!(
                    "Invalid STOMP header escape: \\{}",
                    other.map(String::from).unwrap_or_default()
                )));
            }
        }
    }
    Ok(out)
}
