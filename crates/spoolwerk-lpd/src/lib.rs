// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk LPD — the per-connection half of an RFC 1179 print server.
//
// One `Session` runs per accepted connection, reading commands from the peer
// and writing acknowledgements back.  Accepting connections is left to an
// inetd-style super-server; completed spooled jobs are handed to an external
// helper program that does the actual printing.

pub mod control;
pub mod helper;
pub mod sanitize;
pub mod session;
pub mod spool;
pub mod transfer;

pub use helper::HelperCommand;
pub use sanitize::sanitize;
pub use session::{Session, SessionOutcome};
pub use spool::CompletedJob;
