// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Command line, in the traditional `lpd SPOOLDIR [HELPER [ARGS...]]` shape.

use std::path::PathBuf;

use clap::Parser;

use spoolwerk_core::config::{HelperConfig, LpdConfig};
use spoolwerk_core::error::Result;

/// Receive one LPD print job on stdin/stdout.
///
/// Meant to be started once per connection by a super-server, e.g.
/// `tcpsvd -E 0 515 spoolwerk-lpd /var/spool/lpd print-helper`.
#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    /// JSON configuration file; positional arguments override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset.  Logs go to stderr.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// Acknowledge each subcommand header before its payload.
    #[arg(long)]
    pub ack_subcommands: bool,

    /// Directory holding the print queues.
    pub spool_dir: Option<PathBuf>,

    /// Helper program for completed spooled jobs, followed by its arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub helper: Vec<String>,
}

impl Cli {
    /// Merge the optional config file with the command line.
    pub fn into_config(self) -> Result<LpdConfig> {
        let mut config = match &self.config {
            Some(path) => LpdConfig::load(path)?,
            None => LpdConfig::default(),
        };

        if let Some(dir) = self.spool_dir {
            config.spool_dir = dir;
        }
        let mut helper = self.helper.into_iter();
        if let Some(program) = helper.next() {
            config.helper = Some(HelperConfig {
                program,
                args: helper.collect(),
            });
        }
        if self.ack_subcommands {
            config.ack_subcommand_lines = true;
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_uses_defaults() {
        let config = Cli::try_parse_from(["spoolwerk-lpd"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.spool_dir, PathBuf::from("."));
        assert!(config.helper.is_none());
    }

    #[test]
    fn helper_takes_the_remaining_arguments() {
        let cli = Cli::try_parse_from([
            "spoolwerk-lpd",
            "/var/spool/lpd",
            "print-helper",
            "-P",
            "lp0",
        ])
        .unwrap();
        let config = cli.into_config().unwrap();

        assert_eq!(config.spool_dir, PathBuf::from("/var/spool/lpd"));
        assert_eq!(
            config.helper,
            Some(HelperConfig {
                program: "print-helper".into(),
                args: vec!["-P".into(), "lp0".into()],
            })
        );
    }

    #[test]
    fn command_line_overrides_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lpd.json");
        std::fs::write(
            &path,
            r#"{ "spool_dir": "/srv/spool", "max_control_file_bytes": 2048 }"#,
        )
        .unwrap();

        let config = Cli::try_parse_from([
            "spoolwerk-lpd",
            "--config",
            path.to_str().unwrap(),
            "--ack-subcommands",
            "/var/spool/lpd",
        ])
        .unwrap()
        .into_config()
        .unwrap();

        assert_eq!(config.spool_dir, PathBuf::from("/var/spool/lpd"));
        assert_eq!(config.max_control_file_bytes, 2048);
        assert!(config.ack_subcommand_lines);
    }
}
