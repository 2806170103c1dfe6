// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Handoff of a completed job to the external helper program.
//
// The helper runs in the queue directory with the control file's records in
// its environment, plus DATAFILE naming the stored data file.  It owns the
// data file from then on and is expected to delete it after printing.  The
// control file is gone before the helper starts.

use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use tracing::info;

use spoolwerk_core::config::HelperConfig;
use spoolwerk_core::error::{Result, SpoolwerkError};

use crate::control;
use crate::spool::CompletedJob;

/// A helper invocation ready to take over the process.
#[derive(Debug)]
pub struct HelperCommand {
    command: Command,
}

impl HelperCommand {
    /// Consume the job's control file and build the helper command.
    ///
    /// The control file is deleted even when reading it fails.
    pub fn prepare(job: &CompletedJob, helper: &HelperConfig, control_limit: u64) -> Result<Self> {
        let content = control::read_and_remove(&job.control_path(), control_limit)?;
        let env = control::build_environment(&content, &job.data_file);

        let mut command = Command::new(&helper.program);
        command
            .args(&helper.args)
            .envs(env)
            .current_dir(&job.queue_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        Ok(Self { command })
    }

    pub fn command(&self) -> &Command {
        &self.command
    }

    /// Replace the current process with the helper.
    ///
    /// Only returns if the exec itself failed.  The helper's standard streams
    /// are the null device, so nothing it prints can reach the peer.
    pub fn exec(mut self) -> SpoolwerkError {
        let program = self.command.get_program().to_string_lossy().into_owned();
        info!(helper = %program, "handing job to helper");
        let err = self.command.exec();
        SpoolwerkError::Helper(format!("exec {program}: {err}"))
    }
}
