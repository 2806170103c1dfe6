// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk LPD — receives one print job per process.
//
// Entry point.  Initialises logging, builds the configuration, runs a
// session over stdin/stdout, and acts on its outcome.  stdout is the peer
// connection, so nothing but protocol bytes may be written to it.

mod cli;

use std::io;
use std::process::ExitCode;

use clap::Parser;

use spoolwerk_lpd::{HelperCommand, Session, SessionOutcome};

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(spool_dir = %config.spool_dir.display(), "connection accepted");

    let outcome = Session::new(&config, io::stdin().lock(), io::stdout().lock()).run();

    match outcome {
        Ok(SessionOutcome::Finished) => ExitCode::SUCCESS,
        Ok(SessionOutcome::Handoff(job)) => {
            let Some(helper) = config.helper.as_ref() else {
                return ExitCode::SUCCESS;
            };
            let command =
                match HelperCommand::prepare(&job, helper, config.max_control_file_bytes) {
                    Ok(command) => command,
                    Err(e) => {
                        tracing::error!(error = %e, "failed to prepare helper");
                        return ExitCode::FAILURE;
                    }
                };
            // Only returns when exec failed.  The job was received; the
            // helper not starting is the helper's failure.
            let err = command.exec();
            tracing::error!(error = %err, data_file = %job.data_file, "helper did not start");
            ExitCode::SUCCESS
        }
        // Already logged and answered by the session.
        Err(_) => ExitCode::FAILURE,
    }
}
