//! # Receiver Configuration Commands
//!
//! Proprietary `PCAS` commands accepted by the receiver, framed as NMEA
//! sentences: `$<body>*<checksum>\r\n`, where the checksum is the XOR of
//! every byte of the body.

/// Output all sentences once per second
pub const SET_OUTPUT_RATE_1HZ: &str = "PCAS02,1000";

/// Track GPS and BDS constellations together
pub const SET_MODE_GPS_BDS: &str = "PCAS04,3";

/// Info queries: firmware version, serial number, receiver mode,
/// customer number, upgrade code
pub const INFO_QUERIES: [&str; 5] = ["PCAS06,0", "PCAS06,1", "PCAS06,2", "PCAS06,3", "PCAS06,5"];

/// XOR checksum of a sentence body (the text between `$` and `*`)
pub fn checksum(body: &str) -> u8 {
    body.bytes().fold(0, |acc, byte| acc ^ byte)
}

/// Frame a command body as a complete sentence
///
/// # Examples
///
/// ```
/// use nbiot_tracker::gnss::command::frame_command;
///
/// assert_eq!(frame_command("PCAS02,1000"), "$PCAS02,1000*2E\r\n");
/// ```
pub fn frame_command(body: &str) -> String {
    format!("${}*{:02X}\r\n", body, checksum(body))
}
