//! Frame-level types used on the host side

pub mod ethernet;
pub mod types;

pub use types::*;
