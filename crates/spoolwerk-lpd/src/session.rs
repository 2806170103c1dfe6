// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-connection LPD protocol state machine.
//
// # Wire protocol (RFC 1179 subset)
//
//   peer → us   \x02<queue>\n                          receive a printer job
//   us → peer   \x00
//   peer → us   \x02<len> <name>\n <len bytes> \x00    control file
//   us → peer   \x00
//   peer → us   \x03<len> <name>\n <len bytes> \x00    data file
//   us → peer   \x00
//
// Subcommands may come in either order, each at most once.  When a spooled
// job is complete and a helper is configured, one more \x00 is sent and the
// session ends in a handoff.  Otherwise the session ends when the peer
// closes the connection.
//
// Every failure is terminal.  Files this session created are removed on
// any failure path.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Write};

use tracing::{debug, info, warn};

use spoolwerk_core::config::LpdConfig;
use spoolwerk_core::error::{Result, SpoolwerkError};
use spoolwerk_core::replies::{classify_error, peer_reply};
use spoolwerk_core::types::{ACK, QueueMode, RECEIVE_JOB, ReceivedFiles, Subcommand};

use crate::sanitize::sanitize;
use crate::spool::{self, CompletedJob, SpoolJob};
use crate::transfer;

/// Largest declared length accepted for any subcommand.
const MAX_DECLARED_LENGTH: u64 = i32::MAX as u64;

/// How a session ended successfully.
#[derive(Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The peer disconnected with no job pending.
    Finished,
    /// A spooled job is complete and must be handed to the helper.  The
    /// caller is responsible for launching it; the session does not return
    /// to the protocol afterwards.
    Handoff(CompletedJob),
}

/// A parsed `<tag><len> <name>` subcommand header.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SubcommandHeader {
    sub: Subcommand,
    length: u64,
    raw_name: Vec<u8>,
}

/// Where one payload goes.
enum Destination {
    /// Spool file, or pass-through target opened for append.
    File(File),
    /// Read from the peer and dropped.
    Discard,
}

/// Per-queue sink for received files.
enum JobSink {
    Spool(SpoolJob),
    PassThrough(std::path::PathBuf),
}

impl JobSink {
    fn open(&mut self, header: &SubcommandHeader) -> Result<Destination> {
        match self {
            JobSink::Spool(job) => job.create(header.sub, &header.raw_name).map(Destination::File),
            JobSink::PassThrough(_) if header.sub == Subcommand::ControlFile => {
                Ok(Destination::Discard)
            }
            JobSink::PassThrough(target) => spool::open_pass_through(target).map(Destination::File),
        }
    }
}

/// One connection's worth of protocol.
pub struct Session<'a, R, W> {
    config: &'a LpdConfig,
    reader: BufReader<R>,
    writer: W,
}

impl<'a, R: Read, W: Write> Session<'a, R, W> {
    pub fn new(config: &'a LpdConfig, reader: R, writer: W) -> Self {
        Self {
            config,
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Run the session to completion.
    ///
    /// On failure the peer is sent a diagnostic line when the error class
    /// allows it, and every spool file created so far has been removed.
    pub fn run(mut self) -> Result<SessionOutcome> {
        match self.drive() {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                warn!(class = ?classify_error(&e), error = %e, "session failed");
                if let Some(reply) = peer_reply(&e) {
                    // The peer may already be gone.
                    let _ = writeln!(self.writer, "{reply}");
                    let _ = self.writer.flush();
                }
                Err(e)
            }
        }
    }

    fn drive(&mut self) -> Result<SessionOutcome> {
        let line = self.read_line()?.ok_or(SpoolwerkError::NoCommand)?;
        let (cmd, queue) = split_tag(&line);
        if cmd != RECEIVE_JOB {
            return Err(SpoolwerkError::UnsupportedCommand(cmd));
        }

        let queue = sanitize(queue);
        if queue.is_empty() {
            return Err(SpoolwerkError::EmptyQueueName);
        }

        let mut sink = match spool::resolve_queue(&self.config.spool_dir, &queue) {
            QueueMode::Spooling { dir } => {
                info!(queue = %queue, "receiving job into spool directory");
                JobSink::Spool(SpoolJob::new(dir))
            }
            QueueMode::PassThrough { target } => {
                info!(queue = %queue, "receiving job in pass-through mode");
                JobSink::PassThrough(target)
            }
        };

        let mut seen = ReceivedFiles::new();
        let mut received = ReceivedFiles::new();

        loop {
            let line = match self.ack() {
                Ok(()) => self.read_line()?,
                Err(e) if received.is_complete() => {
                    // A peer that stopped reading doesn't undo a complete job.
                    debug!(error = %e, "final acknowledgement not delivered");
                    None
                }
                Err(e) => return Err(e),
            };

            let Some(line) = line else {
                return match sink {
                    JobSink::Spool(_) if !received.is_complete() => {
                        Err(SpoolwerkError::IncompleteJob)
                    }
                    JobSink::Spool(job) => {
                        job.commit();
                        info!(queue = %queue, "job spooled, peer closed connection");
                        Ok(SessionOutcome::Finished)
                    }
                    JobSink::PassThrough(_) => {
                        debug!(queue = %queue, "peer closed connection");
                        Ok(SessionOutcome::Finished)
                    }
                };
            };

            let (tag, rest) = split_tag(&line);
            let sub = Subcommand::from_tag(tag).ok_or(SpoolwerkError::UnsupportedCommand(tag))?;
            if !seen.insert(sub) {
                return Err(SpoolwerkError::DuplicatedSubcommand(sub));
            }
            let header = parse_header(sub, rest, self.config.max_control_file_bytes)?;
            debug!(
                kind = %sub,
                length = header.length,
                name = %String::from_utf8_lossy(&header.raw_name),
                "subcommand"
            );

            let mut destination = sink.open(&header)?;
            if self.config.ack_subcommand_lines {
                self.ack()?;
            }

            match &mut destination {
                Destination::File(file) => {
                    transfer::copy_exact(&mut self.reader, file, header.length)?;
                }
                Destination::Discard => {
                    transfer::discard(&mut self.reader, header.length)?;
                }
            }
            self.expect_peer_ack()?;

            if let (JobSink::Spool(job), Destination::File(file)) = (&sink, &destination) {
                job.finish(sub, file, self.config.finished_file_mode)?;
                received.insert(sub);
            }
            drop(destination);

            if received.is_complete() && self.config.helper.is_some() {
                if let JobSink::Spool(job) = sink {
                    let job = job.commit().ok_or(SpoolwerkError::IncompleteJob)?;
                    // Data acknowledgement, then the handoff signal.
                    if let Err(e) = self.ack().and_then(|()| self.ack()) {
                        debug!(error = %e, "handoff signal not delivered");
                    }
                    return Ok(SessionOutcome::Handoff(job));
                }
            }
        }
    }

    /// Read one command line, without its newline.  `None` at end of stream.
    fn read_line(&mut self) -> Result<Option<Vec<u8>>> {
        let limit = self.config.max_command_line_bytes;
        let mut line = Vec::new();
        let n = (&mut self.reader)
            .take(limit as u64)
            .read_until(b'\n', &mut line)?;

        if n == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
        } else if n >= limit {
            return Err(SpoolwerkError::CommandTooLong(limit));
        }
        Ok(Some(line))
    }

    fn ack(&mut self) -> Result<()> {
        self.writer.write_all(&[ACK])?;
        self.writer.flush()?;
        Ok(())
    }

    /// The peer ends every payload with a single zero octet.
    fn expect_peer_ack(&mut self) -> Result<()> {
        let mut byte = [0u8; 1];
        match self.reader.read_exact(&mut byte) {
            Ok(()) if byte[0] == ACK => Ok(()),
            Ok(()) => Err(SpoolwerkError::MissingAck(Some(byte[0]))),
            Err(_) => Err(SpoolwerkError::MissingAck(None)),
        }
    }
}

/// Split a command line into its leading tag and operand.  An empty line
/// reads as a bare newline tag, which no command uses.
fn split_tag(line: &[u8]) -> (u8, &[u8]) {
    match line.split_first() {
        Some((&tag, rest)) => (tag, rest),
        None => (b'\n', &[][..]),
    }
}

/// Parse `<decimal length> <filename>` following a subcommand tag.
fn parse_header(sub: Subcommand, rest: &[u8], control_limit: u64) -> Result<SubcommandHeader> {
    let space = rest
        .iter()
        .position(|b| *b == b' ')
        .ok_or(SpoolwerkError::BadFilename)?;
    let (digits, name) = (&rest[..space], &rest[space + 1..]);

    let length = parse_length(digits)?;
    if sub == Subcommand::ControlFile && length > control_limit {
        return Err(SpoolwerkError::ControlFileTooBig {
            size: length,
            limit: control_limit,
        });
    }

    Ok(SubcommandHeader {
        sub,
        length,
        raw_name: name.to_vec(),
    })
}

fn parse_length(digits: &[u8]) -> Result<u64> {
    let bad = || SpoolwerkError::BadLength(String::from_utf8_lossy(digits).into_owned());
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return Err(bad());
    }
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|n| *n <= MAX_DECLARED_LENGTH)
        .ok_or_else(bad)
}
