// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Queue resolution and spool file lifecycle.
//
// A queue is an entry under the spool directory.  A directory means
// spooling: the job's control and data files are written inside it under
// their (sanitized) peer-chosen names.  Anything else is a pass-through
// target that data is appended to.
//
// Spool files are created exclusively, so two receivers can never write the
// same job file; that is the only coordination between concurrent
// connections.  A file is mode 0200 while in flight and is only made
// readable once its transfer has been verified.  Files created by a session
// that does not finish are removed when the `SpoolJob` is dropped.

use std::fs::{self, File, OpenOptions, Permissions};
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use spoolwerk_core::error::{Result, SpoolwerkError};
use spoolwerk_core::types::{QueueMode, Subcommand};

use crate::sanitize::sanitize;

/// Mode of a spool file whose transfer is still in progress.
const IN_FLIGHT_MODE: u32 = 0o200;

/// Decide how `queue` (already sanitized) accepts data.
pub fn resolve_queue(spool_dir: &Path, queue: &str) -> QueueMode {
    let path = spool_dir.join(queue);
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => QueueMode::Spooling { dir: path },
        _ => QueueMode::PassThrough { target: path },
    }
}

/// Open a pass-through queue target for appending.
pub fn open_pass_through(target: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .append(true)
        .open(target)
        .map_err(|source| SpoolwerkError::QueueOpen {
            path: target.to_path_buf(),
            source,
        })
}

/// Names of a fully received job, handed over to the helper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedJob {
    /// Queue directory both files live in.
    pub queue_dir: PathBuf,
    /// Sanitized control file name.
    pub control_file: String,
    /// Sanitized data file name, as actually stored.
    pub data_file: String,
}

impl CompletedJob {
    pub fn control_path(&self) -> PathBuf {
        self.queue_dir.join(&self.control_file)
    }

    pub fn data_path(&self) -> PathBuf {
        self.queue_dir.join(&self.data_file)
    }
}

/// Spool files created by one session in one queue directory.
#[derive(Debug)]
pub struct SpoolJob {
    dir: PathBuf,
    control_file: Option<String>,
    data_file: Option<String>,
    committed: bool,
}

impl SpoolJob {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            control_file: None,
            data_file: None,
            committed: false,
        }
    }

    /// Sanitized name recorded for `sub`, if it has been created.
    pub fn name(&self, sub: Subcommand) -> Option<&str> {
        match sub {
            Subcommand::ControlFile => self.control_file.as_deref(),
            Subcommand::DataFile => self.data_file.as_deref(),
        }
    }

    /// Create a fresh, write-only spool file for `sub` from the peer's name.
    ///
    /// Fails if the sanitized name is empty or a file of that name already
    /// exists.  A file that could not be created is never recorded, so a
    /// collision can't remove somebody else's job.
    pub fn create(&mut self, sub: Subcommand, raw_name: &[u8]) -> Result<File> {
        let name = sanitize(raw_name);
        if name.is_empty() {
            return Err(SpoolwerkError::EmptyFileName);
        }

        let path = self.dir.join(&name);
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(IN_FLIGHT_MODE)
            .open(&path)
            .map_err(|source| SpoolwerkError::SpoolCreate {
                name: name.clone(),
                source,
            })?;

        debug!(kind = %sub, file = %name, "spool file created");
        match sub {
            Subcommand::ControlFile => self.control_file = Some(name),
            Subcommand::DataFile => self.data_file = Some(name),
        }
        Ok(file)
    }

    /// Mark a verified file as finished by widening its mode.
    pub fn finish(&self, sub: Subcommand, file: &File, mode: u32) -> Result<()> {
        file.set_permissions(Permissions::from_mode(mode))?;
        info!(
            kind = %sub,
            file = self.name(sub).unwrap_or_default(),
            mode = %format!("{mode:o}"),
            "spool file received"
        );
        Ok(())
    }

    /// Keep the files on disk.  Returns the job when both files exist.
    pub fn commit(mut self) -> Option<CompletedJob> {
        self.committed = true;
        Some(CompletedJob {
            queue_dir: self.dir.clone(),
            control_file: self.control_file.take()?,
            data_file: self.data_file.take()?,
        })
    }

    /// Remove every file this session created.
    pub fn discard(&mut self) {
        for name in [self.control_file.take(), self.data_file.take()]
            .into_iter()
            .flatten()
        {
            let path = self.dir.join(&name);
            match fs::remove_file(&path) {
                Ok(()) => info!(file = %name, "removed unfinished spool file"),
                Err(e) => warn!(file = %name, error = %e, "failed to remove spool file"),
            }
        }
    }
}

impl Drop for SpoolJob {
    fn drop(&mut self) {
        if !self.committed {
            self.discard();
        }
    }
}
