//! Configuration types

use crate::protocol::MacAddr;
use crate::telemetry::LogConfig;
use crate::{Error, Result};
use packts::event::EmitPoint;
use packts::smac::{FixedMac, RewriteStrategy, SMAC_TABLE_LEN};
use serde::Deserialize;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// User-defined configuration (config.toml)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub classifier: ClassifierConfig,
    #[serde(default)]
    pub logging: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub mode: TableMode,
    pub mac: Option<MacAddr>,
    pub table: Option<Vec<TableEntry>>,
    pub strategy: Strategy,
    pub events: Events,
    pub channel_capacity: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: TableMode::default(),
            mac: None,
            table: None,
            strategy: Strategy::default(),
            events: Events::default(),
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableMode {
    /// Address baked in, every byte always replaced.
    Fixed,
    /// Runtime table, entries may be absent.
    #[default]
    Table,
}

/// One slot of the `table` array: a byte, or `"-"` for absent.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TableEntry {
    Byte(u8),
    Marker(String),
}

impl TableEntry {
    pub const ABSENT: &'static str = "-";

    pub fn value(&self) -> Option<u8> {
        match self {
            TableEntry::Byte(b) => Some(*b),
            TableEntry::Marker(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            TableEntry::Byte(_) => true,
            TableEntry::Marker(m) => m == Self::ABSENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    #[default]
    PerIndex,
    Iterate,
}

impl Strategy {
    /// Spelling used in config.toml.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::PerIndex => "per-index",
            Strategy::Iterate => "iterate",
        }
    }
}

impl From<Strategy> for RewriteStrategy {
    fn from(s: Strategy) -> Self {
        match s {
            Strategy::PerIndex => RewriteStrategy::PerIndex,
            Strategy::Iterate => RewriteStrategy::Iterate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Events {
    #[default]
    Off,
    Before,
    After,
}

impl Events {
    /// Spelling used in config.toml.
    pub fn as_str(&self) -> &'static str {
        match self {
            Events::Off => "off",
            Events::Before => "before",
            Events::After => "after",
        }
    }
}

impl From<Events> for EmitPoint {
    fn from(e: Events) -> Self {
        match e {
            Events::Off => EmitPoint::Disabled,
            Events::Before => EmitPoint::BeforeRewrite,
            Events::After => EmitPoint::AfterRewrite,
        }
    }
}

/// Where replacement bytes come from once the config is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSource {
    Fixed(FixedMac),
    /// Initial contents of the runtime table.
    Table([Option<u8>; SMAC_TABLE_LEN as usize]),
}

impl ClassifierConfig {
    /// Resolve `mode`, `mac` and `table` into a single table source.
    pub fn resolve(&self) -> Result<TableSource> {
        match self.mode {
            TableMode::Fixed => {
                if self.table.is_some() {
                    return Err(Error::Config(
                        "fixed mode takes `mac`, not `table`".into(),
                    ));
                }
                let mac = self
                    .mac
                    .ok_or_else(|| Error::Config("fixed mode requires `mac`".into()))?;
                Ok(TableSource::Fixed(mac.as_fixed()))
            }
            TableMode::Table => {
                let mut entries = [None; SMAC_TABLE_LEN as usize];
                match (&self.mac, &self.table) {
                    (Some(_), Some(_)) => {
                        return Err(Error::Config(
                            "set either `mac` or `table`, not both".into(),
                        ));
                    }
                    (Some(mac), None) => {
                        for (slot, b) in entries.iter_mut().zip(mac.0) {
                            *slot = Some(b);
                        }
                    }
                    (None, Some(table)) => {
                        if table.len() > entries.len() {
                            return Err(Error::Config(format!(
                                "table has {} entries, at most {} allowed",
                                table.len(),
                                entries.len()
                            )));
                        }
                        for (i, entry) in table.iter().enumerate() {
                            if !entry.is_valid() {
                                return Err(Error::Config(format!(
                                    "table[{}]: expected a byte or \"{}\"",
                                    i,
                                    TableEntry::ABSENT
                                )));
                            }
                            entries[i] = entry.value();
                        }
                    }
                    (None, None) => {}
                }
                Ok(TableSource::Table(entries))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Config {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse("");
        assert_eq!(config.classifier.mode, TableMode::Table);
        assert_eq!(config.classifier.strategy, Strategy::PerIndex);
        assert_eq!(config.classifier.events, Events::Off);
        assert_eq!(config.classifier.channel_capacity, DEFAULT_CHANNEL_CAPACITY);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_fixed_mode() {
        let config = parse(
            r#"
            [classifier]
            mode = "fixed"
            mac = "b0:48:7a:cf:ac:96"
            "#,
        );
        assert_eq!(
            config.classifier.resolve().unwrap(),
            TableSource::Fixed(FixedMac([176, 72, 122, 207, 172, 150]))
        );
    }

    #[test]
    fn test_fixed_mode_requires_mac() {
        let config = parse(
            r#"
            [classifier]
            mode = "fixed"
            "#,
        );
        assert!(config.classifier.resolve().is_err());
    }

    #[test]
    fn test_sparse_table() {
        let config = parse(
            r#"
            [classifier]
            table = [176, "-", 122, "-", 172, 150]
            strategy = "iterate"
            events = "after"
            "#,
        );
        assert_eq!(
            config.classifier.resolve().unwrap(),
            TableSource::Table([Some(176), None, Some(122), None, Some(172), Some(150)])
        );
        assert_eq!(
            RewriteStrategy::from(config.classifier.strategy),
            RewriteStrategy::Iterate
        );
        assert_eq!(
            EmitPoint::from(config.classifier.events),
            EmitPoint::AfterRewrite
        );
    }

    #[test]
    fn test_short_table_is_padded_with_absent() {
        let config = parse(
            r#"
            [classifier]
            table = [1, 2]
            "#,
        );
        assert_eq!(
            config.classifier.resolve().unwrap(),
            TableSource::Table([Some(1), Some(2), None, None, None, None])
        );
    }

    #[test]
    fn test_table_from_mac() {
        let config = parse(
            r#"
            [classifier]
            mac = "01:02:03:04:05:06"
            "#,
        );
        assert_eq!(
            config.classifier.resolve().unwrap(),
            TableSource::Table([Some(1), Some(2), Some(3), Some(4), Some(5), Some(6)])
        );
    }

    #[test]
    fn test_table_errors() {
        let too_long = parse(
            r#"
            [classifier]
            table = [1, 2, 3, 4, 5, 6, 7]
            "#,
        );
        assert!(too_long.classifier.resolve().is_err());

        let bad_marker = parse(
            r#"
            [classifier]
            table = [1, "x"]
            "#,
        );
        assert!(bad_marker.classifier.resolve().is_err());

        let both = parse(
            r#"
            [classifier]
            mac = "01:02:03:04:05:06"
            table = [1]
            "#,
        );
        assert!(both.classifier.resolve().is_err());
    }

    #[test]
    fn test_names_parse_back() {
        for strategy in [Strategy::PerIndex, Strategy::Iterate] {
            let config = parse(&format!(
                "[classifier]\nstrategy = \"{}\"",
                strategy.as_str()
            ));
            assert_eq!(config.classifier.strategy, strategy);
        }
        for events in [Events::Off, Events::Before, Events::After] {
            let config = parse(&format!(
                "[classifier]\nevents = \"{}\"",
                events.as_str()
            ));
            assert_eq!(config.classifier.events, events);
        }
    }

    #[test]
    fn test_out_of_range_byte_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str(
            r#"
            [classifier]
            table = [256]
            "#,
        );
        assert!(result.is_err());
    }
}
