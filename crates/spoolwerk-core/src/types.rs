// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the LPD job receiver.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Leading byte of the top-level "receive a printer job" command.
pub const RECEIVE_JOB: u8 = 0x02;

/// Single zero octet used for every positive acknowledgement, in both
/// directions.
pub const ACK: u8 = 0x00;

/// Second-level commands accepted inside a receive-job session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subcommand {
    /// `\x02<len> <name>\n`, job metadata.
    ControlFile,
    /// `\x03<len> <name>\n`, the print payload.
    DataFile,
}

impl Subcommand {
    /// Both subcommands, in the order a well-behaved client sends them.
    pub const ALL: [Subcommand; 2] = [Subcommand::ControlFile, Subcommand::DataFile];

    /// Map a wire tag to a subcommand.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0x02 => Some(Self::ControlFile),
            0x03 => Some(Self::DataFile),
            _ => None,
        }
    }

    /// Wire tag for this subcommand.
    pub fn tag(self) -> u8 {
        match self {
            Self::ControlFile => 0x02,
            Self::DataFile => 0x03,
        }
    }

    fn bit(self) -> u8 {
        match self {
            Self::ControlFile => 0b01,
            Self::DataFile => 0b10,
        }
    }
}

impl fmt::Display for Subcommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ControlFile => f.write_str("control file"),
            Self::DataFile => f.write_str("data file"),
        }
    }
}

/// Set of subcommands seen (or completed) in one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceivedFiles(u8);

impl ReceivedFiles {
    /// Nothing received yet.
    pub const fn new() -> Self {
        Self(0)
    }

    pub fn contains(self, sub: Subcommand) -> bool {
        self.0 & sub.bit() != 0
    }

    /// Record `sub`.  Returns `false` if it was already present.
    pub fn insert(&mut self, sub: Subcommand) -> bool {
        let fresh = !self.contains(sub);
        self.0 |= sub.bit();
        fresh
    }

    /// Both the control file and the data file are present.
    pub fn is_complete(self) -> bool {
        Subcommand::ALL.iter().all(|sub| self.contains(*sub))
    }
}

/// How a resolved queue accepts job data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueMode {
    /// The queue is a directory: both job files are persisted inside it.
    Spooling { dir: PathBuf },
    /// The queue is a file or device: data files are appended to it and
    /// control files are consumed and dropped.
    PassThrough { target: PathBuf },
}

/// Classification of session failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// Malformed command, bad length, unsupported or duplicated tag.
    ProtocolViolation,
    /// Byte count mismatch or missing end-of-file acknowledgement.
    TransferIntegrity,
    /// Filesystem could not satisfy the request (collision, permission, disk).
    Resource,
    /// Input refused on safety grounds (oversized control file, empty name).
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommand_tags_round_trip() {
        for sub in Subcommand::ALL {
            assert_eq!(Subcommand::from_tag(sub.tag()), Some(sub));
        }
        assert_eq!(Subcommand::from_tag(0x01), None);
        assert_eq!(Subcommand::from_tag(0x04), None);
    }

    #[test]
    fn received_files_tracks_duplicates() {
        let mut seen = ReceivedFiles::new();
        assert_eq!(seen, ReceivedFiles::new());
        assert!(seen.insert(Subcommand::DataFile));
        assert!(!seen.insert(Subcommand::DataFile));
        assert!(seen.contains(Subcommand::DataFile));
        assert!(!seen.contains(Subcommand::ControlFile));
        assert!(!seen.is_complete());
    }

    #[test]
    fn received_files_complete_in_either_order() {
        let mut a = ReceivedFiles::new();
        a.insert(Subcommand::ControlFile);
        a.insert(Subcommand::DataFile);

        let mut b = ReceivedFiles::new();
        b.insert(Subcommand::DataFile);
        b.insert(Subcommand::ControlFile);

        assert!(a.is_complete());
        assert_eq!(a, b);
    }
}
