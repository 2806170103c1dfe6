// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Receiver configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpoolwerkError};

/// Control files are read back into memory before the helper starts, so
/// their size is capped.
pub const DEFAULT_MAX_CONTROL_FILE_BYTES: u64 = 16 * 1024;

/// More than enough for any LPD command line.
pub const DEFAULT_MAX_COMMAND_LINE_BYTES: usize = 4 * 1024;

/// Mode of a spool file once its transfer has been verified.
///
/// Owner read-write only.  A deployment whose helper runs as a different
/// user needs world-readable files: set `finished_file_mode` to `0o644`.
pub const DEFAULT_FINISHED_FILE_MODE: u32 = 0o600;

/// External program that takes over a completed spooled job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelperConfig {
    /// Program to run, resolved through `PATH` when it has no slash.
    pub program: String,
    /// Arguments passed verbatim after the program name.
    #[serde(default)]
    pub args: Vec<String>,
}

/// Settings for one receiver instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LpdConfig {
    /// Directory holding one entry per queue.
    pub spool_dir: PathBuf,
    /// Helper to hand completed spooled jobs to.  Without one, jobs are left
    /// in the queue directory.
    pub helper: Option<HelperConfig>,
    /// Largest control file accepted.
    pub max_control_file_bytes: u64,
    /// Longest command line accepted, including the newline.
    pub max_command_line_bytes: usize,
    /// Permission bits applied after a verified transfer.
    pub finished_file_mode: u32,
    /// Acknowledge each subcommand header before its payload arrives.
    pub ack_subcommand_lines: bool,
}

impl Default for LpdConfig {
    fn default() -> Self {
        Self {
            spool_dir: PathBuf::from("."),
            helper: None,
            max_control_file_bytes: DEFAULT_MAX_CONTROL_FILE_BYTES,
            max_command_line_bytes: DEFAULT_MAX_COMMAND_LINE_BYTES,
            finished_file_mode: DEFAULT_FINISHED_FILE_MODE,
            ack_subcommand_lines: false,
        }
    }
}

impl LpdConfig {
    /// Load settings from a JSON file.  Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            SpoolwerkError::Config(format!("read {}: {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_control_file_bytes == 0 {
            return Err(SpoolwerkError::Config(
                "max_control_file_bytes must be positive".into(),
            ));
        }
        if self.max_command_line_bytes == 0 {
            return Err(SpoolwerkError::Config(
                "max_command_line_bytes must be positive".into(),
            ));
        }
        if self.finished_file_mode & !0o7777 != 0 {
            return Err(SpoolwerkError::Config(format!(
                "finished_file_mode {:o} is not a permission mode",
                self.finished_file_mode
            )));
        }
        if let Some(helper) = &self.helper {
            if helper.program.trim().is_empty() {
                return Err(SpoolwerkError::Config("helper program is empty".into()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LpdConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_control_file_bytes, 16 * 1024);
        assert_eq!(config.finished_file_mode, 0o600);
        assert!(config.helper.is_none());
        assert!(!config.ack_subcommand_lines);
    }

    #[test]
    fn load_fills_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lpd.json");
        std::fs::write(
            &path,
            r#"{ "spool_dir": "/var/spool/lpd", "helper": { "program": "print-job" } }"#,
        )
        .unwrap();

        let config = LpdConfig::load(&path).unwrap();
        assert_eq!(config.spool_dir, PathBuf::from("/var/spool/lpd"));
        let helper = config.helper.unwrap();
        assert_eq!(helper.program, "print-job");
        assert!(helper.args.is_empty());
        assert_eq!(config.max_command_line_bytes, DEFAULT_MAX_COMMAND_LINE_BYTES);
    }

    #[test]
    fn load_rejects_empty_helper() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lpd.json");
        std::fs::write(&path, r#"{ "helper": { "program": "  " } }"#).unwrap();

        match LpdConfig::load(&path) {
            Err(SpoolwerkError::Config(msg)) => assert!(msg.contains("helper")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let result = LpdConfig::load("/nonexistent/spoolwerk.json");
        assert!(matches!(result, Err(SpoolwerkError::Config(_))));
    }

    #[test]
    fn zero_limits_are_rejected() {
        let config = LpdConfig {
            max_control_file_bytes: 0,
            ..LpdConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LpdConfig {
            max_command_line_bytes: 0,
            ..LpdConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn world_readable_mode_can_be_configured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lpd.json");
        std::fs::write(&path, r#"{"finished_file_mode": 420}"#).unwrap();

        let config = LpdConfig::load(&path).unwrap();
        assert_eq!(config.finished_file_mode, 0o644);
    }
}
