//! pppoe-smac - PPPoE source MAC rewriter
//!
//! Host side of a tc classifier that rewrites the source address of PPPoE
//! discovery and session frames from a six byte table. The classifier
//! itself lives in `packts` and is shared with the ebpf program; this crate
//! adds configuration, logging, metrics and in-process implementations of
//! the table and the event channel.

pub mod config;
pub mod dataplane;
pub mod error;
pub mod protocol;
pub mod telemetry;

pub use error::{Error, Result};
