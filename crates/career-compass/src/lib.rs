//! Student academic profile intake for career prediction.
//!
//! The [`workflows::profile`] module holds the validation-and-encoding pipeline; the
//! remaining modules provide the configuration, telemetry, and error plumbing shared with
//! the HTTP service.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
