//! # AT Command Vocabulary
//!
//! Commands understood by the NB-IoT modem. Each is sent followed by `\r\n`.

use std::fmt;

use super::socket::SocketId;

/// Line terminator appended to every command
pub const TERMINATOR: &str = "\r\n";

/// Release-assistance flag sent with every datagram
pub const RELEASE_ASSISTANCE_FLAG: &str = "0x200";

/// Identity queries: IMSI, IMEI, firmware, manufacturer, model
pub const IDENTITY_QUERIES: [&str; 5] = ["AT+CIMI", "AT+CGSN=1", "AT+CGMR", "AT+CGMI", "AT+CGMM"];

/// One AT command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtCommand<'a> {
    /// Turn command echo on
    EchoOn,
    /// Reboot the modem
    Reset,
    /// Query network attach state
    AttachStatus,
    /// Create a TCP stream socket
    CreateSocket,
    Connect {
        socket: SocketId,
        host: &'a str,
        port: u16,
    },
    /// Send a hex-encoded datagram
    Send {
        socket: SocketId,
        length: usize,
        hex: &'a str,
        sequence: u8,
    },
    /// Query delivery state of a sequence number
    SendStatus {
        socket: SocketId,
        sequence: u8,
    },
    Close {
        socket: SocketId,
    },
    /// Enter low-power mode
    FastOff,
    /// A fixed query string
    Query(&'a str),
}

impl AtCommand<'_> {
    /// Command text including the terminator
    pub fn to_wire(&self) -> String {
        format!("{}{}", self, TERMINATOR)
    }
}

impl fmt::Display for AtCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AtCommand::EchoOn => f.write_str("ATE1"),
            AtCommand::Reset => f.write_str("AT+RB"),
            AtCommand::AttachStatus => f.write_str("AT+CGATT?"),
            AtCommand::CreateSocket => f.write_str("AT+NSOCR=STREAM,6,0,1"),
            AtCommand::Connect { socket, host, port } => {
                write!(f, "AT+NSOCO={},{},{}", socket, host, port)
            }
            AtCommand::Send {
                socket,
                length,
                hex,
                sequence,
            } => write!(
                f,
                "AT+NSOSD={},{},{},{},{}",
                socket, length, hex, RELEASE_ASSISTANCE_FLAG, sequence
            ),
            AtCommand::SendStatus { socket, sequence } => {
                write!(f, "AT+SEQUENCE={},{}", socket, sequence)
            }
            AtCommand::Close { socket } => write!(f, "AT+NSOCL={}", socket),
            AtCommand::FastOff => f.write_str("AT+FASTOFF=0"),
            AtCommand::Query(text) => f.write_str(text),
        }
    }
}

/// Hex-encode at most `max_bytes` of `data`, two uppercase characters per byte
///
/// # Returns
///
/// * `(String, usize)` - Encoded text and the number of bytes it covers
///
/// # Examples
///
/// ```
/// use nbiot_tracker::modem::command::encode_hex;
///
/// assert_eq!(encode_hex(b"Hi", 16), ("4869".to_string(), 2));
/// assert_eq!(encode_hex(b"Hi", 1), ("48".to_string(), 1));
/// ```
pub fn encode_hex(data: &[u8], max_bytes: usize) -> (String, usize) {
    use fmt::Write;

    let used = data.len().min(max_bytes);
    let mut hex = String::with_capacity(used * 2);
    for byte in &data[..used] {
        // Writing to a String cannot fail
        let _ = write!(hex, "{:02X}", byte);
    }
    (hex, used)
}
