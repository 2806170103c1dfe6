// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Length-prefixed payload copy.
//
// Every subcommand declares its payload length up front.  The payload must
// arrive in full: a short read is a failed transfer, never a short file.

use std::io::{self, ErrorKind, Read, Write};

use tracing::{debug, warn};

use spoolwerk_core::error::{Result, SpoolwerkError};

const CHUNK_BYTES: usize = 64 * 1024;

/// Copy exactly `expected` bytes from `src` into `dst`.
///
/// Returns the number of bytes copied, which on success always equals
/// `expected`.  End of stream or a read error before that point yields
/// `SpoolwerkError::ShortTransfer` carrying the count actually received.
/// Write failures on the destination are reported as I/O errors.
pub fn copy_exact<R, W>(src: &mut R, dst: &mut W, expected: u64) -> Result<u64>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; expected.clamp(1, CHUNK_BYTES as u64) as usize];
    let mut copied: u64 = 0;

    while copied < expected {
        let want = (expected - copied).min(buf.len() as u64) as usize;
        let n = match src.read(&mut buf[..want]) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, copied, expected, "read failed mid-transfer");
                break;
            }
        };
        dst.write_all(&buf[..n])?;
        copied += n as u64;
    }
    dst.flush()?;

    if copied != expected {
        return Err(SpoolwerkError::ShortTransfer {
            expected,
            actual: copied,
        });
    }

    debug!(bytes = copied, "transfer complete");
    Ok(copied)
}

/// Read and drop exactly `expected` bytes to keep the stream in step with
/// the peer.
pub fn discard<R>(src: &mut R, expected: u64) -> Result<u64>
where
    R: Read + ?Sized,
{
    copy_exact(src, &mut io::sink(), expected)
}
