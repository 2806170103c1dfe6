// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Spoolwerk.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Subcommand;

/// Top-level error type for all Spoolwerk operations.
///
/// Every variant is terminal for the current connection.
#[derive(Debug, Error)]
pub enum SpoolwerkError {
    // -- Protocol violations --
    #[error("command {0:02x} is not supported")]
    UnsupportedCommand(u8),

    #[error("duplicated {0} subcommand")]
    DuplicatedSubcommand(Subcommand),

    #[error("subcommand has no filename separator")]
    BadFilename,

    #[error("bad length field {0:?}")]
    BadLength(String),

    #[error("command line longer than {0} bytes")]
    CommandTooLong(usize),

    #[error("connection closed before any command")]
    NoCommand,

    #[error("connection closed before the job was complete")]
    IncompleteJob,

    // -- Transfer integrity --
    #[error("expected {expected} bytes but got {actual}")]
    ShortTransfer { expected: u64, actual: u64 },

    #[error("missing end-of-file acknowledgement (got {0:?})")]
    MissingAck(Option<u8>),

    // -- Input rejected on safety grounds --
    #[error("queue name is empty after sanitization")]
    EmptyQueueName,

    #[error("file name is empty after sanitization")]
    EmptyFileName,

    #[error("control file of {size} bytes exceeds the {limit} byte limit")]
    ControlFileTooBig { size: u64, limit: u64 },

    // -- Resources --
    #[error("can't create spool file '{name}': {source}")]
    SpoolCreate {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("can't open queue target '{}': {source}", path.display())]
    QueueOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("helper launch failed: {0}")]
    Helper(String),

    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SpoolwerkError>;
