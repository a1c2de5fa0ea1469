//! # Cellular AT Engine
//!
//! Drives the NB-IoT modem over its serial link.
//!
//! This module handles:
//! - Command/response exchanges terminated by `OK` or `ERROR`
//! - The socket lifecycle (attach, create, connect, send, close), each step
//!   retried on its own and never aborting the rest
//! - Modem setup, identity queries and low-power control

pub mod command;
pub mod socket;

pub use command::{encode_hex, AtCommand, IDENTITY_QUERIES};
pub use socket::{LifecycleReport, SocketId, SocketSession, SocketState, StepOutcome};

use async_trait::async_trait;
use std::borrow::Cow;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, TrackerError};
use crate::power::LowPowerDevice;
use crate::serial::{ControlLine, SerialTransport};

/// Capacity of the response slot
pub const RESPONSE_CAPACITY: usize = 64;

/// Reads per command: one idle-terminated read plus plain retries
pub const READS_PER_COMMAND: u32 = 5;

/// Largest payload carried by one datagram
pub const MAX_SEND_BYTES: usize = 512;

/// Width of each half of the wake pulse
const WAKE_PULSE: Duration = Duration::from_millis(5);

/// The response carries a terminal status token
pub fn has_terminal_token(response: &str) -> bool {
    response.contains("OK") || response.contains("ERROR")
}

/// Coarse success test used for attach state and send status
///
/// Accepts any response containing the character `1`. Command echo, socket
/// ids and sequence numbers can all produce false positives.
pub fn contains_one(response: &str) -> bool {
    response.contains('1')
}

fn accepts_ok(response: &str) -> bool {
    response.contains("OK")
}

fn accepts_socket_id(response: &str) -> bool {
    SocketId::from_create_response(response).is_some()
}

/// Timing and retry budget of the socket lifecycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitPolicy {
    /// Retries per step after the first attempt
    pub step_attempts: u32,
    /// Wait between retries of a step
    pub backoff: Duration,
    /// Wait between sending a datagram and the first status query
    pub send_settle: Duration,
    /// Wait between a resend and its status query
    pub resend_settle: Duration,
}

impl Default for TransmitPolicy {
    fn default() -> Self {
        Self {
            step_attempts: 10,
            backoff: Duration::from_secs(1),
            send_settle: Duration::from_secs(5),
            resend_settle: Duration::from_secs(10),
        }
    }
}

/// The current request and its response slot
///
/// Reused for every exchange; the slot is cleared when a new request is
/// written.
#[derive(Debug)]
pub struct AtExchange {
    request: String,
    response: [u8; RESPONSE_CAPACITY],
    response_len: usize,
}

impl AtExchange {
    pub fn new() -> Self {
        Self {
            request: String::new(),
            response: [0; RESPONSE_CAPACITY],
            response_len: 0,
        }
    }

    fn begin(&mut self, request: &str) {
        self.request.clear();
        self.request.push_str(request);
        self.clear();
    }

    fn clear(&mut self) {
        self.response = [0; RESPONSE_CAPACITY];
        self.response_len = 0;
    }

    /// Replace the slot content with `bytes`
    fn fill(&mut self, bytes: &[u8]) {
        let n = bytes.len().min(RESPONSE_CAPACITY);
        self.clear();
        self.response[..n].copy_from_slice(&bytes[..n]);
        self.response_len = n;
    }

    pub fn request(&self) -> &str {
        &self.request
    }

    pub fn response_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.response[..self.response_len])
    }

    pub fn is_terminal(&self) -> bool {
        has_terminal_token(&self.response_text())
    }
}

impl Default for AtExchange {
    fn default() -> Self {
        Self::new()
    }
}

/// AT-command engine for one modem
pub struct AtEngine<T: SerialTransport> {
    port: T,
    exchange: AtExchange,
    read_timeout: Duration,
    host: String,
    server_port: u16,
    sequence: u8,
    policy: TransmitPolicy,
}

impl<T: SerialTransport> AtEngine<T> {
    /// Create an engine over `port`
    ///
    /// # Arguments
    ///
    /// * `port` - Serial link to the modem
    /// * `read_timeout` - Bound of each individual read
    /// * `host`, `server_port` - Destination of every datagram
    /// * `sequence` - Sequence number used for send-status queries
    pub fn new(
        port: T,
        read_timeout: Duration,
        host: impl Into<String>,
        server_port: u16,
        sequence: u8,
    ) -> Self {
        Self {
            port,
            exchange: AtExchange::new(),
            read_timeout,
            host: host.into(),
            server_port,
            sequence,
            policy: TransmitPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: TransmitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn exchange(&self) -> &AtExchange {
        &self.exchange
    }

    /// Write `cmd` and collect its response
    ///
    /// One idle-terminated read, then plain reads while neither `OK` nor
    /// `ERROR` has arrived, for at most `READS_PER_COMMAND` reads. A read
    /// that returns nothing keeps the previous content.
    ///
    /// # Returns
    ///
    /// * `Result<String>` - The last received buffer, terminal or not
    pub async fn send_command(&mut self, cmd: &str) -> Result<String> {
        debug!("AT -> {}", cmd.trim_end());
        self.exchange.begin(cmd);
        self.port
            .send(cmd.as_bytes())
            .await
            .map_err(|e| TrackerError::Serial(format!("Modem write failed: {}", e)))?;

        let mut scratch = [0u8; RESPONSE_CAPACITY];
        let n = self
            .port
            .receive_until_idle(&mut scratch, self.read_timeout)
            .await
            .map_err(|e| TrackerError::Serial(format!("Modem read failed: {}", e)))?;
        self.exchange.fill(&scratch[..n]);

        let mut reads = 1;
        while !self.exchange.is_terminal() && reads < READS_PER_COMMAND {
            let n = self
                .port
                .receive(&mut scratch, self.read_timeout)
                .await
                .map_err(|e| TrackerError::Serial(format!("Modem read failed: {}", e)))?;
            if n > 0 {
                self.exchange.fill(&scratch[..n]);
            }
            reads += 1;
        }

        let response = self.exchange.response_text().into_owned();
        if self.exchange.is_terminal() {
            debug!("AT <- {}", response.trim());
        } else {
            warn!(
                "No OK/ERROR for {} after {} reads, last buffer: {:?}",
                cmd.trim_end(),
                reads,
                response
            );
        }
        Ok(response)
    }

    /// Turn on command echo
    pub async fn initialize(&mut self) -> Result<String> {
        self.send_command(&AtCommand::EchoOn.to_wire()).await
    }

    /// Reboot the modem
    ///
    /// The reboot banner has no terminal token, so this is a single plain
    /// read rather than a command exchange.
    pub async fn reset(&mut self) -> Result<String> {
        let cmd = AtCommand::Reset.to_wire();
        self.exchange.begin(&cmd);
        self.port
            .send(cmd.as_bytes())
            .await
            .map_err(|e| TrackerError::Serial(format!("Modem write failed: {}", e)))?;

        let mut scratch = [0u8; RESPONSE_CAPACITY];
        let n = self
            .port
            .receive(&mut scratch, self.read_timeout)
            .await
            .map_err(|e| TrackerError::Serial(format!("Modem read failed: {}", e)))?;
        self.exchange.fill(&scratch[..n]);

        let response = self.exchange.response_text().into_owned();
        info!("Modem reset: {}", response.trim());
        Ok(response)
    }

    /// Run the identity queries
    ///
    /// # Returns
    ///
    /// * `Result<Vec<(String, String)>>` - `(command, response)` pairs
    pub async fn identify(&mut self) -> Result<Vec<(String, String)>> {
        let mut identity = Vec::with_capacity(IDENTITY_QUERIES.len());
        for query in IDENTITY_QUERIES {
            let response = self.send_command(&AtCommand::Query(query).to_wire()).await?;
            info!("{}: {}", query, response.trim());
            identity.push((query.to_string(), response));
        }
        Ok(identity)
    }

    /// Transmit `payload` through a full socket lifecycle
    ///
    /// Every step runs regardless of how the previous one ended; exhausted
    /// steps are logged and reported, never escalated.
    pub async fn send_payload(&mut self, payload: &[u8]) -> LifecycleReport {
        let mut session = SocketSession::new(self.sequence);

        let attach = self
            .run_step("attach", &AtCommand::AttachStatus.to_wire(), contains_one)
            .await
            .0;

        let (create, last) = self
            .run_step("create", &AtCommand::CreateSocket.to_wire(), accepts_socket_id)
            .await;
        if let Some(id) = SocketId::from_create_response(&last) {
            session.id = id;
            session.state = SocketState::Created;
        } else {
            warn!("No socket id assigned, using {}", session.id);
        }

        let connect_cmd = AtCommand::Connect {
            socket: session.id,
            host: &self.host,
            port: self.server_port,
        }
        .to_wire();
        let connect = self.run_step("connect", &connect_cmd, accepts_ok).await.0;
        if connect.succeeded() {
            session.state = SocketState::Connected;
        }

        let (send, truncated) = self.send_step(&session, payload).await;

        let close_cmd = AtCommand::Close { socket: session.id }.to_wire();
        let close = self.run_step("close", &close_cmd, accepts_ok).await.0;
        session.state = SocketState::Closed;

        LifecycleReport {
            attach,
            create,
            connect,
            send,
            close,
            socket: session.id,
            truncated,
        }
    }

    /// Send and confirm a datagram
    async fn send_step(&mut self, session: &SocketSession, payload: &[u8]) -> (StepOutcome, bool) {
        let (hex, length) = encode_hex(payload, MAX_SEND_BYTES);
        let truncated = length < payload.len();
        if truncated {
            warn!(
                "Payload of {} bytes truncated to {} bytes",
                payload.len(),
                length
            );
        }

        let send_cmd = AtCommand::Send {
            socket: session.id,
            length,
            hex: &hex,
            sequence: session.sequence,
        }
        .to_wire();
        let status_cmd = AtCommand::SendStatus {
            socket: session.id,
            sequence: session.sequence,
        }
        .to_wire();

        self.attempt(&send_cmd, |_| true).await;
        tokio::time::sleep(self.policy.send_settle).await;
        let mut accepted = self.attempt(&status_cmd, contains_one).await.0;

        let mut retries = 0;
        while !accepted && retries < self.policy.step_attempts {
            tokio::time::sleep(self.policy.backoff).await;
            self.attempt(&send_cmd, |_| true).await;
            tokio::time::sleep(self.policy.resend_settle).await;
            accepted = self.attempt(&status_cmd, contains_one).await.0;
            retries += 1;
        }

        let outcome = StepOutcome::from_accepted(accepted);
        self.log_outcome("send", outcome);
        (outcome, truncated)
    }

    /// Run `cmd` until `accept` holds or the retry budget is spent
    ///
    /// # Returns
    ///
    /// * `(StepOutcome, String)` - Outcome and the last response seen
    async fn run_step<F>(&mut self, step: &str, cmd: &str, accept: F) -> (StepOutcome, String)
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        let (mut accepted, mut last) = self.attempt(cmd, &accept).await;

        let mut retries = 0;
        while !accepted && retries < self.policy.step_attempts {
            tokio::time::sleep(self.policy.backoff).await;
            (accepted, last) = self.attempt(cmd, &accept).await;
            retries += 1;
        }

        let outcome = StepOutcome::from_accepted(accepted);
        self.log_outcome(step, outcome);
        (outcome, last)
    }

    /// One exchange; a transport error counts as a rejected response
    async fn attempt<F>(&mut self, cmd: &str, accept: F) -> (bool, String)
    where
        F: Fn(&str) -> bool + Send + Sync,
    {
        match self.send_command(cmd).await {
            Ok(response) => (accept(&response), response),
            Err(e) => {
                warn!("{} failed: {}", cmd.trim_end(), e);
                (false, String::new())
            }
        }
    }

    fn log_outcome(&self, step: &str, outcome: StepOutcome) {
        match outcome {
            StepOutcome::Succeeded => debug!("Socket step {} succeeded", step),
            StepOutcome::ExhaustedRetries => warn!(
                "Socket step {} exhausted {} retries, continuing",
                step, self.policy.step_attempts
            ),
        }
    }
}

#[async_trait]
impl<T: SerialTransport> LowPowerDevice for AtEngine<T> {
    /// Pulse the wake line
    async fn wake(&mut self) -> Result<()> {
        self.port.set_line(ControlLine::Rts, true)?;
        tokio::time::sleep(WAKE_PULSE).await;
        self.port.set_line(ControlLine::Rts, false)?;
        tokio::time::sleep(WAKE_PULSE).await;
        debug!("Modem awake");
        Ok(())
    }

    async fn enter_low_power(&mut self) -> Result<()> {
        let response = self.send_command(&AtCommand::FastOff.to_wire()).await?;
        if !accepts_ok(&response) {
            warn!("Modem did not acknowledge low-power request: {:?}", response);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serial::port_trait::mocks::{MockSerialPort, ReadKind};
    use std::io;
    use tokio::time::Instant;

    /// Modem that accepts the whole lifecycle
    fn cooperative_modem(cmd: &str) -> Vec<String> {
        let reply = if cmd.starts_with("AT+CGATT?") {
            "\r\n+CGATT:1\r\n\r\nOK\r\n"
        } else if cmd.starts_with("AT+NSOCR") {
            "\r\n+NSOCR:0\r\n\r\nOK\r\n"
        } else if cmd.starts_with("AT+SEQUENCE") {
            "\r\n1\r\n\r\nOK\r\n"
        } else {
            "\r\nOK\r\n"
        };
        vec![reply.to_string()]
    }

    fn engine(port: MockSerialPort) -> AtEngine<MockSerialPort> {
        AtEngine::new(port, Duration::from_secs(2), "112.125.89.8", 43458, 5)
    }

    fn commands_starting_with(port: &MockSerialPort, prefix: &str) -> usize {
        port.written_strings()
            .iter()
            .filter(|cmd| cmd.starts_with(prefix))
            .count()
    }

    #[tokio::test]
    async fn test_send_command_single_read_on_ok() {
        let port = MockSerialPort::new();
        port.push_response("\r\nOK\r\n");
        let mut engine = engine(port.clone());

        let response = engine.send_command("ATE1\r\n").await.unwrap();

        assert_eq!(response, "\r\nOK\r\n");
        assert_eq!(port.get_reads(), vec![ReadKind::UntilIdle]);
        assert_eq!(engine.exchange().request(), "ATE1\r\n");
    }

    #[tokio::test]
    async fn test_send_command_error_is_terminal() {
        let port = MockSerialPort::new();
        port.push_response("\r\nERROR\r\n");
        let mut engine = engine(port.clone());

        let response = engine.send_command("AT+NSOCL=0\r\n").await.unwrap();

        assert!(response.contains("ERROR"));
        assert_eq!(port.get_reads().len(), 1);
    }

    #[tokio::test]
    async fn test_send_command_reads_at_most_five_times() {
        let port = MockSerialPort::new();
        port.push_response("+CGATT:");
        port.push_response("0\r\n");
        let mut engine = engine(port.clone());

        let response = engine.send_command("AT+CGATT?\r\n").await.unwrap();

        // Empty reads keep the last received buffer
        assert_eq!(response, "0\r\n");
        assert_eq!(
            port.get_reads(),
            vec![
                ReadKind::UntilIdle,
                ReadKind::Blocking,
                ReadKind::Blocking,
                ReadKind::Blocking,
                ReadKind::Blocking,
            ]
        );
    }

    #[tokio::test]
    async fn test_send_command_stops_when_terminal_arrives() {
        let port = MockSerialPort::new();
        port.push_response("\r\n+CIMI:4600");
        port.push_response("\r\nOK\r\n");
        let mut engine = engine(port.clone());

        let response = engine.send_command("AT+CIMI\r\n").await.unwrap();

        assert_eq!(response, "\r\nOK\r\n");
        assert_eq!(port.get_reads().len(), 2);
    }

    #[tokio::test]
    async fn test_send_command_caps_response_slot() {
        let port = MockSerialPort::new();
        port.push_response(&"x".repeat(200));
        let mut engine = engine(port);

        let response = engine.send_command("AT\r\n").await.unwrap();

        assert_eq!(response.len(), RESPONSE_CAPACITY);
    }

    #[tokio::test]
    async fn test_send_command_write_error() {
        let port = MockSerialPort::new();
        port.set_write_error(io::ErrorKind::BrokenPipe);
        let mut engine = engine(port);

        match engine.send_command("AT\r\n").await {
            Err(TrackerError::Serial(msg)) => assert!(msg.contains("write failed")),
            other => panic!("Expected Serial error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_write_error_leaves_no_stale_response() {
        let port = MockSerialPort::new();
        port.push_response("\r\nOK\r\n");
        let mut engine = engine(port.clone());
        assert_eq!(engine.send_command("AT\r\n").await.unwrap(), "\r\nOK\r\n");

        port.set_write_error(io::ErrorKind::BrokenPipe);
        assert!(engine.send_command("AT+CGATT?\r\n").await.is_err());

        assert_eq!(engine.exchange().request(), "AT+CGATT?\r\n");
        assert_eq!(engine.exchange().response_text(), "");
    }

    #[tokio::test]
    async fn test_response_slot_cleared_between_commands() {
        let port = MockSerialPort::new();
        port.push_response("\r\nOK\r\n");
        let mut engine = engine(port.clone());

        let first = engine.send_command("AT\r\n").await.unwrap();
        let second = engine.send_command("AT+CGATT?\r\n").await.unwrap();

        assert_eq!(first, "\r\nOK\r\n");
        assert_eq!(second, "");
        assert!(!engine.exchange().is_terminal());
        // One read for the first command, the full budget for the second
        assert_eq!(port.get_reads().len(), 1 + READS_PER_COMMAND as usize);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle_all_steps_succeed() {
        let port = MockSerialPort::with_responder(cooperative_modem);
        let mut engine = engine(port.clone());

        let report = engine.send_payload(b"Hi").await;

        assert!(report.all_succeeded());
        assert_eq!(report.socket, SocketId::Zero);
        assert!(!report.truncated);
        assert_eq!(
            port.written_strings(),
            vec![
                "AT+CGATT?\r\n".to_string(),
                "AT+NSOCR=STREAM,6,0,1\r\n".to_string(),
                "AT+NSOCO=0,112.125.89.8,43458\r\n".to_string(),
                "AT+NSOSD=0,2,4869,0x200,5\r\n".to_string(),
                "AT+SEQUENCE=0,5\r\n".to_string(),
                "AT+NSOCL=0\r\n".to_string(),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle_uses_socket_one() {
        let port = MockSerialPort::with_responder(|cmd| {
            if cmd.starts_with("AT+NSOCR") {
                vec!["+NSOCR:1\r\nOK\r\n".to_string()]
            } else {
                cooperative_modem(cmd)
            }
        });
        let mut engine = engine(port.clone());

        let report = engine.send_payload(b"x").await;

        assert_eq!(report.socket, SocketId::One);
        assert!(port.written_strings().contains(&"AT+NSOCL=1\r\n".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_retries_until_attached() {
        let mut polls = 0;
        let port = MockSerialPort::with_responder(move |cmd| {
            if cmd.starts_with("AT+CGATT?") {
                polls += 1;
                let state = if polls < 3 { 0 } else { 1 };
                vec![format!("+CGATT:{}\r\nOK\r\n", state)]
            } else {
                cooperative_modem(cmd)
            }
        });
        let mut engine = engine(port.clone());
        let start = Instant::now();

        let report = engine.send_payload(b"x").await;

        assert_eq!(report.attach, StepOutcome::Succeeded);
        assert_eq!(commands_starting_with(&port, "AT+CGATT?"), 3);
        // Two backoffs before attach, 5s send settle
        assert!(start.elapsed() >= Duration::from_secs(7));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_modem_exhausts_every_step_and_continues() {
        let port = MockSerialPort::new();
        let mut engine = engine(port.clone());

        let report = engine.send_payload(b"x").await;

        assert_eq!(report.attach, StepOutcome::ExhaustedRetries);
        assert_eq!(report.create, StepOutcome::ExhaustedRetries);
        assert_eq!(report.connect, StepOutcome::ExhaustedRetries);
        assert_eq!(report.send, StepOutcome::ExhaustedRetries);
        assert_eq!(report.close, StepOutcome::ExhaustedRetries);
        assert_eq!(report.socket, SocketId::Unassigned);

        assert_eq!(commands_starting_with(&port, "AT+CGATT?"), 11);
        assert_eq!(commands_starting_with(&port, "AT+NSOCR"), 11);
        assert_eq!(commands_starting_with(&port, "AT+NSOCO=255,"), 11);
        assert_eq!(commands_starting_with(&port, "AT+NSOSD=255,"), 11);
        assert_eq!(commands_starting_with(&port, "AT+SEQUENCE=255,5"), 11);
        assert_eq!(commands_starting_with(&port, "AT+NSOCL=255"), 11);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_resends_until_status_confirms() {
        let mut queries = 0;
        let port = MockSerialPort::with_responder(move |cmd| {
            if cmd.starts_with("AT+SEQUENCE") {
                queries += 1;
                let state = if queries < 2 { 2 } else { 1 };
                vec![format!("\r\n{}\r\n\r\nOK\r\n", state)]
            } else {
                cooperative_modem(cmd)
            }
        });
        let mut engine = engine(port.clone());

        let report = engine.send_payload(b"x").await;

        assert_eq!(report.send, StepOutcome::Succeeded);
        assert_eq!(commands_starting_with(&port, "AT+NSOSD"), 2);
        assert_eq!(commands_starting_with(&port, "AT+SEQUENCE"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_payload_is_truncated_and_reported() {
        let port = MockSerialPort::with_responder(cooperative_modem);
        let mut engine = engine(port.clone());

        let report = engine.send_payload(&[b'a'; MAX_SEND_BYTES + 10]).await;

        assert!(report.truncated);
        let send = port
            .written_strings()
            .into_iter()
            .find(|cmd| cmd.starts_with("AT+NSOSD"))
            .unwrap();
        assert!(send.starts_with(&format!("AT+NSOSD=0,{},", MAX_SEND_BYTES)));
        assert!(send.contains(&"61".repeat(MAX_SEND_BYTES)));
        assert!(!send.contains(&"61".repeat(MAX_SEND_BYTES + 1)));
    }

    #[tokio::test]
    async fn test_initialize_enables_echo() {
        let port = MockSerialPort::with_responder(cooperative_modem);
        let mut engine = engine(port.clone());

        engine.initialize().await.unwrap();

        assert_eq!(port.written_strings(), vec!["ATE1\r\n".to_string()]);
    }

    #[tokio::test]
    async fn test_reset_uses_single_plain_read() {
        let port = MockSerialPort::new();
        port.push_response("\r\nREBOOTING\r\n");
        let mut engine = engine(port.clone());

        let response = engine.reset().await.unwrap();

        assert!(response.contains("REBOOTING"));
        assert_eq!(port.get_reads(), vec![ReadKind::Blocking]);
        assert_eq!(port.written_strings(), vec!["AT+RB\r\n".to_string()]);
    }

    #[tokio::test]
    async fn test_identify_pairs_queries_with_responses() {
        let port = MockSerialPort::with_responder(|cmd| {
            vec![format!("\r\n{}\r\nOK\r\n", cmd.trim_end().trim_start_matches("AT+"))]
        });
        let mut engine = engine(port);

        let identity = engine.identify().await.unwrap();

        assert_eq!(identity.len(), IDENTITY_QUERIES.len());
        assert_eq!(identity[0].0, "AT+CIMI");
        assert!(identity[0].1.contains("CIMI"));
        assert_eq!(identity[4].0, "AT+CGMM");
        assert!(identity[4].1.contains("CGMM"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wake_pulses_rts() {
        let port = MockSerialPort::new();
        let mut engine = engine(port.clone());

        engine.wake().await.unwrap();

        assert_eq!(
            port.get_line_events(),
            vec![(ControlLine::Rts, true), (ControlLine::Rts, false)]
        );
    }

    #[tokio::test]
    async fn test_low_power_sends_fastoff() {
        let port = MockSerialPort::with_responder(cooperative_modem);
        let mut engine = engine(port.clone());

        engine.enter_low_power().await.unwrap();

        assert_eq!(port.written_strings(), vec!["AT+FASTOFF=0\r\n".to_string()]);
    }

    #[test]
    fn test_one_heuristic() {
        assert!(contains_one("+CGATT:1"));
        assert!(!contains_one("+CGATT:0"));
        // Known false positive from echoed socket ids
        assert!(contains_one("AT+SEQUENCE=1,5\r\n0"));
    }

    #[test]
    fn test_terminal_tokens() {
        assert!(has_terminal_token("\r\nOK\r\n"));
        assert!(has_terminal_token("+CME ERROR: 4"));
        assert!(!has_terminal_token("+NSOCR:0"));
        assert!(!has_terminal_token(""));
    }
}
