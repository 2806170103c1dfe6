// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Control file parsing.
//
// An LPD control file is a list of newline-terminated records, each a
// single command character followed by its operand:
//
//   H  host the job came from      J  job name
//   P  submitting user             L  print a banner for this user
//   C  banner class                M  mail this user on error
//   l  data file name as the peer sees it (never trust it; use DATAFILE)
//
// Each record becomes one environment variable for the helper, named by
// the command character.
//
// # Trust boundary
//
// Variable names come from the peer.  They are limited to a single ASCII
// letter, so names like PATH, IFS or LD_PRELOAD cannot be produced, but any
// one-letter variable the helper's own environment defines can be
// overridden.  DATAFILE is always set by the receiver and cannot be spoofed.

use std::ffi::OsString;
use std::fs;
use std::io::Read;
use std::os::unix::ffi::OsStringExt;
use std::path::Path;

use tracing::{debug, warn};

use spoolwerk_core::error::{Result, SpoolwerkError};

/// Variable holding the data file name as actually stored.
pub const DATAFILE_VAR: &str = "DATAFILE";

/// One `<key><value>` line of a control file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlRecord {
    /// ASCII letter naming the record.
    pub key: u8,
    /// Rest of the line.
    pub value: Vec<u8>,
}

impl ControlRecord {
    pub fn name(&self) -> char {
        char::from(self.key)
    }
}

/// Parse records in file order.
///
/// The content ends at its first NUL byte.  Parsing stops, without error, at
/// the first line that does not start with an ASCII letter or that is not
/// newline-terminated.
pub fn parse_records(content: &[u8]) -> Vec<ControlRecord> {
    let mut records = Vec::new();
    let mut rest = match content.iter().position(|b| *b == 0) {
        Some(nul) => &content[..nul],
        None => content,
    };

    while let Some(end) = rest.iter().position(|b| *b == b'\n') {
        let line = &rest[..end];
        rest = &rest[end + 1..];

        let Some((&key, value)) = line.split_first() else {
            break;
        };
        if !key.is_ascii_alphabetic() {
            break;
        }
        records.push(ControlRecord {
            key,
            value: value.to_vec(),
        });
    }

    records
}

/// Build the helper's environment additions.
///
/// `DATAFILE` comes first, then one entry per record in file order, so a
/// repeated key ends up with its last value.
pub fn build_environment(content: &[u8], data_file: &str) -> Vec<(OsString, OsString)> {
    let mut env = vec![(OsString::from(DATAFILE_VAR), OsString::from(data_file))];
    env.extend(parse_records(content).into_iter().map(|record| {
        (
            OsString::from(record.name().to_string()),
            OsString::from_vec(record.value),
        )
    }));
    env
}

/// Read a control file into memory and delete it.
///
/// The file is removed whether or not the read succeeds.  Reads stop at
/// `limit` bytes; anything larger is an error.
pub fn read_and_remove(path: &Path, limit: u64) -> Result<Vec<u8>> {
    let content = read_limited(path, limit);
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "failed to remove control file");
    }
    let content = content?;
    debug!(path = %path.display(), bytes = content.len(), "control file consumed");
    Ok(content)
}

fn read_limited(path: &Path, limit: u64) -> Result<Vec<u8>> {
    let file = fs::File::open(path)?;
    let mut content = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut content)?;
    if content.len() as u64 > limit {
        return Err(SpoolwerkError::ControlFileTooBig {
            size: content.len() as u64,
            limit,
        });
    }
    Ok(content)
}
