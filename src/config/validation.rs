//! Configuration validation

use super::{Config, Events, TableMode, TableSource};
use crate::protocol::MacAddr;

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        for error in &self.errors {
            println!("[ERROR] {}", error);
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_table(config, &mut result);
    validate_events(config, &mut result);
    validate_logging(config, &mut result);

    result
}

fn validate_table(config: &Config, result: &mut ValidationResult) {
    let classifier = &config.classifier;

    let source = match classifier.resolve() {
        Ok(source) => source,
        Err(e) => {
            result.error(format!("classifier: {}", e));
            return;
        }
    };

    let entries = match source {
        TableSource::Fixed(mac) => mac.0.map(Some),
        TableSource::Table(entries) => entries,
    };

    if entries.iter().all(Option::is_none) {
        result.warn("classifier: table is empty, frames will pass unmodified");
        return;
    }

    // group bit only matters when the first octet is actually written
    if let Some(first) = entries[0] {
        if first & 0x01 != 0 {
            result.warn(format!(
                "classifier: first octet {:#04x} sets the multicast bit",
                first
            ));
        }
    }

    if let Some(mac) = full_address(&entries) {
        if mac.is_zero() {
            result.warn("classifier: replacement address is 00:00:00:00:00:00");
        }
    }

    if classifier.mode == TableMode::Table
        && classifier.table.is_some()
        && entries.iter().any(Option::is_none)
    {
        result.warn("classifier: sparse table, absent bytes keep their original value");
    }
}

fn validate_events(config: &Config, result: &mut ValidationResult) {
    let classifier = &config.classifier;

    if classifier.events != Events::Off && classifier.channel_capacity == 0 {
        result.error("classifier.channel_capacity: must be at least 1 when events are on");
    }

    if classifier.events == Events::Off
        && classifier.channel_capacity != super::DEFAULT_CHANNEL_CAPACITY
    {
        result.warn("classifier.channel_capacity: ignored while events = \"off\"");
    }
}

fn validate_logging(config: &Config, result: &mut ValidationResult) {
    let level = config.logging.level.to_lowercase();
    if !matches!(level.as_str(), "error" | "warn" | "info" | "debug" | "trace") {
        result.warn(format!(
            "logging.level: unknown level '{}', using info",
            config.logging.level
        ));
    }

    if !matches!(config.logging.format.as_str(), "pretty" | "compact" | "json") {
        result.warn(format!(
            "logging.format: unknown format '{}', using pretty",
            config.logging.format
        ));
    }
}

fn full_address(entries: &[Option<u8>; 6]) -> Option<MacAddr> {
    let mut mac = [0u8; 6];
    for (slot, entry) in mac.iter_mut().zip(entries) {
        *slot = (*entry)?;
    }
    Some(MacAddr(mac))
}
