// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// What the peer gets told when a session fails.
//
// LPD has no structured error channel: a failing server writes a line of
// free text and drops the connection.  Some failures prove the peer is not
// following the protocol at all (short payload, missing trailing zero
// octet); those are never answered.

use crate::error::SpoolwerkError;
use crate::types::ErrorClass;

/// Classify a `SpoolwerkError` for logging and reply decisions.
pub fn classify_error(err: &SpoolwerkError) -> ErrorClass {
    match err {
        SpoolwerkError::UnsupportedCommand(_)
        | SpoolwerkError::DuplicatedSubcommand(_)
        | SpoolwerkError::BadFilename
        | SpoolwerkError::BadLength(_)
        | SpoolwerkError::CommandTooLong(_)
        | SpoolwerkError::NoCommand
        | SpoolwerkError::IncompleteJob => ErrorClass::ProtocolViolation,

        SpoolwerkError::ShortTransfer { .. } | SpoolwerkError::MissingAck(_) => {
            ErrorClass::TransferIntegrity
        }

        SpoolwerkError::EmptyQueueName
        | SpoolwerkError::EmptyFileName
        | SpoolwerkError::ControlFileTooBig { .. } => ErrorClass::Rejected,

        SpoolwerkError::SpoolCreate { .. }
        | SpoolwerkError::QueueOpen { .. }
        | SpoolwerkError::Helper(_)
        | SpoolwerkError::Config(_)
        | SpoolwerkError::Io(_)
        | SpoolwerkError::Serialization(_) => ErrorClass::Resource,
    }
}

/// The diagnostic line to send to the peer, without the trailing newline.
///
/// Returns `None` when the failure must stay silent on the wire.
pub fn peer_reply(err: &SpoolwerkError) -> Option<String> {
    match err {
        SpoolwerkError::UnsupportedCommand(cmd) => {
            Some(format!("Command {cmd:02x} is not supported"))
        }
        SpoolwerkError::DuplicatedSubcommand(_) => Some("Duplicated subcommand".into()),
        SpoolwerkError::BadFilename | SpoolwerkError::EmptyFileName => {
            Some("No or bad filename".into())
        }
        SpoolwerkError::BadLength(_) => Some("Bad length".into()),
        SpoolwerkError::CommandTooLong(_) => Some("Command line too long".into()),
        SpoolwerkError::ControlFileTooBig { .. } => Some("File is too big".into()),

        // Resource failures are the server's problem; say what broke.
        SpoolwerkError::SpoolCreate { .. }
        | SpoolwerkError::QueueOpen { .. }
        | SpoolwerkError::Io(_) => Some(err.to_string()),

        // The peer already hung up, broke framing, or sent a queue name
        // that sanitizes to nothing.
        SpoolwerkError::NoCommand
        | SpoolwerkError::IncompleteJob
        | SpoolwerkError::ShortTransfer { .. }
        | SpoolwerkError::MissingAck(_)
        | SpoolwerkError::EmptyQueueName => None,

        // Past the point where the peer is listening.
        SpoolwerkError::Helper(_)
        | SpoolwerkError::Config(_)
        | SpoolwerkError::Serialization(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Subcommand;

    #[test]
    fn unsupported_command_names_the_byte() {
        let reply = peer_reply(&SpoolwerkError::UnsupportedCommand(0x04));
        assert_eq!(reply.as_deref(), Some("Command 04 is not supported"));
    }

    #[test]
    fn protocol_violations_are_answered() {
        let errors = [
            SpoolwerkError::DuplicatedSubcommand(Subcommand::DataFile),
            SpoolwerkError::BadFilename,
            SpoolwerkError::BadLength("x".into()),
            SpoolwerkError::CommandTooLong(4096),
        ];
        for err in &errors {
            assert_eq!(classify_error(err), ErrorClass::ProtocolViolation);
            assert!(peer_reply(err).is_some(), "{err} should be answered");
        }
    }

    #[test]
    fn integrity_failures_stay_silent() {
        let short = SpoolwerkError::ShortTransfer {
            expected: 10,
            actual: 9,
        };
        let ack = SpoolwerkError::MissingAck(Some(b'x'));
        assert_eq!(classify_error(&short), ErrorClass::TransferIntegrity);
        assert_eq!(classify_error(&ack), ErrorClass::TransferIntegrity);
        assert!(peer_reply(&short).is_none());
        assert!(peer_reply(&ack).is_none());
    }

    #[test]
    fn rejections() {
        let big = SpoolwerkError::ControlFileTooBig {
            size: 20_000,
            limit: 16_384,
        };
        assert_eq!(classify_error(&big), ErrorClass::Rejected);
        assert_eq!(peer_reply(&big).as_deref(), Some("File is too big"));

        assert_eq!(
            classify_error(&SpoolwerkError::EmptyQueueName),
            ErrorClass::Rejected
        );
        assert!(peer_reply(&SpoolwerkError::EmptyQueueName).is_none());
        assert_eq!(
            peer_reply(&SpoolwerkError::EmptyFileName).as_deref(),
            Some("No or bad filename")
        );
    }

    #[test]
    fn resource_failure_reply_names_the_file() {
        let err = SpoolwerkError::SpoolCreate {
            name: "cfA001host".into(),
            source: std::io::Error::from(std::io::ErrorKind::AlreadyExists),
        };
        assert_eq!(classify_error(&err), ErrorClass::Resource);
        let reply = peer_reply(&err).expect("resource failures are answered");
        assert!(reply.starts_with("can't create spool file 'cfA001host'"));
    }
}
