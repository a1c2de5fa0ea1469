//! # Socket Session Types
//!
//! State of one transmit attempt over the modem's socket interface, and the
//! per-step outcomes reported back to the orchestrator.

use std::fmt;

/// Wire value sent for a socket the modem never assigned
pub const UNASSIGNED_SOCKET: u8 = 0xFF;

/// Socket identifier as returned by the create-socket command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketId {
    Zero,
    One,
    /// No recognized identifier in the create response
    Unassigned,
}

impl SocketId {
    /// Recognize `NSOCR:0` or `NSOCR:1` anywhere in a create response
    pub fn from_create_response(response: &str) -> Option<Self> {
        if response.contains("NSOCR:0") {
            Some(SocketId::Zero)
        } else if response.contains("NSOCR:1") {
            Some(SocketId::One)
        } else {
            None
        }
    }

    /// Number used in AT commands
    pub fn number(&self) -> u8 {
        match self {
            SocketId::Zero => 0,
            SocketId::One => 1,
            SocketId::Unassigned => UNASSIGNED_SOCKET,
        }
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Lifecycle state of a socket session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketState {
    Unattached,
    Created,
    Connected,
    Closed,
}

/// One transmit attempt's socket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocketSession {
    pub id: SocketId,
    pub state: SocketState,
    /// Sequence number used to query send acknowledgement
    pub sequence: u8,
}

impl SocketSession {
    pub fn new(sequence: u8) -> Self {
        Self {
            id: SocketId::Unassigned,
            state: SocketState::Unattached,
            sequence,
        }
    }
}

/// Result of one lifecycle step after its retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Succeeded,
    ExhaustedRetries,
}

impl StepOutcome {
    pub fn from_accepted(accepted: bool) -> Self {
        if accepted {
            StepOutcome::Succeeded
        } else {
            StepOutcome::ExhaustedRetries
        }
    }

    pub fn succeeded(&self) -> bool {
        *self == StepOutcome::Succeeded
    }
}

/// Outcome of every step of one transmit attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleReport {
    pub attach: StepOutcome,
    pub create: StepOutcome,
    pub connect: StepOutcome,
    pub send: StepOutcome,
    pub close: StepOutcome,
    pub socket: SocketId,
    /// The payload exceeded the send capacity and was cut short
    pub truncated: bool,
}

impl LifecycleReport {
    pub fn all_succeeded(&self) -> bool {
        [self.attach, self.create, self.connect, self.send, self.close]
            .iter()
            .all(StepOutcome::succeeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_id_zero() {
        assert_eq!(SocketId::from_create_response("\r\n+NSOCR:0\r\n\r\nOK\r\n"), Some(SocketId::Zero));
    }

    #[test]
    fn test_socket_id_one() {
        assert_eq!(SocketId::from_create_response("+NSOCR:1\r\nOK"), Some(SocketId::One));
    }

    #[test]
    fn test_socket_id_unrecognized() {
        assert_eq!(SocketId::from_create_response("+NSOCR:2\r\nOK"), None);
        assert_eq!(SocketId::from_create_response("ERROR"), None);
        assert_eq!(SocketId::from_create_response(""), None);
    }

    #[test]
    fn test_socket_numbers() {
        assert_eq!(SocketId::Zero.to_string(), "0");
        assert_eq!(SocketId::One.to_string(), "1");
        assert_eq!(SocketId::Unassigned.to_string(), "255");
    }

    #[test]
    fn test_new_session() {
        let session = SocketSession::new(5);
        assert_eq!(session.id, SocketId::Unassigned);
        assert_eq!(session.state, SocketState::Unattached);
        assert_eq!(session.sequence, 5);
    }

    #[test]
    fn test_report_all_succeeded() {
        let mut report = LifecycleReport {
            attach: StepOutcome::Succeeded,
            create: StepOutcome::Succeeded,
            connect: StepOutcome::Succeeded,
            send: StepOutcome::Succeeded,
            close: StepOutcome::Succeeded,
            socket: SocketId::Zero,
            truncated: false,
        };
        assert!(report.all_succeeded());

        report.send = StepOutcome::ExhaustedRetries;
        assert!(!report.all_succeeded());
    }
}
