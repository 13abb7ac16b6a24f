use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("invalid MAC address {input:?}: {reason}")]
    InvalidMac { input: String, reason: String },

    #[error("SMAC index {index} out of range (0..{len})")]
    TableIndex { index: u32, len: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
