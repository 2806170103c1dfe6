// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Spoolwerk — Core types, error definitions, and configuration shared by the
// LPD engine and the binary.

pub mod config;
pub mod error;
pub mod replies;
pub mod types;

pub use config::{HelperConfig, LpdConfig};
pub use error::SpoolwerkError;
pub use types::*;
