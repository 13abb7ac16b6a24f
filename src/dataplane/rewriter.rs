//! Host-side driver for the PPPoE source address classifier.

use super::SharedSmacTable;
use crate::config::{ClassifierConfig, TableSource};
use crate::protocol::MacAddr;
use crate::telemetry::MetricsRegistry;
use crate::Result;
use packts::bounds::FrameBuffer;
use packts::classifier::{classify, Options, Outcome};
use packts::event::{EventSink, NoEvents};
use packts::smac::FixedMac;
use std::sync::Arc;
use tracing::{debug, trace};

/// Where the classifier reads replacement bytes from.
#[derive(Debug, Clone)]
pub enum TableHandle {
    Fixed(FixedMac),
    Shared(Arc<SharedSmacTable>),
}

impl From<TableSource> for TableHandle {
    fn from(source: TableSource) -> Self {
        match source {
            TableSource::Fixed(mac) => TableHandle::Fixed(mac),
            TableSource::Table(entries) => {
                TableHandle::Shared(Arc::new(SharedSmacTable::from_entries(entries)))
            }
        }
    }
}

/// Runs frames through the classifier and accounts for the outcome.
///
/// Cheap to share between threads when `S` is `Sync`; each call to
/// [`Rewriter::process`] is independent.
#[derive(Debug)]
pub struct Rewriter<S = NoEvents> {
    table: TableHandle,
    sink: S,
    options: Options,
    metrics: Arc<MetricsRegistry>,
}

impl Rewriter<NoEvents> {
    pub fn without_events(table: TableHandle, options: Options) -> Self {
        Rewriter::new(table, options, NoEvents, Arc::new(MetricsRegistry::new()))
    }
}

impl<S: EventSink> Rewriter<S> {
    pub fn new(
        table: TableHandle,
        options: Options,
        sink: S,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            table,
            sink,
            options,
            metrics,
        }
    }

    /// Builds a rewriter from the `[classifier]` table of config.toml.
    pub fn from_config(
        config: &ClassifierConfig,
        sink: S,
        metrics: Arc<MetricsRegistry>,
    ) -> Result<Self> {
        let options = Options {
            strategy: config.strategy.into(),
            emit: config.events.into(),
        };
        let table = TableHandle::from(config.resolve()?);
        Ok(Self::new(table, options, sink, metrics))
    }

    /// The runtime table, unless the address is compiled in.
    pub fn shared_table(&self) -> Option<&Arc<SharedSmacTable>> {
        match &self.table {
            TableHandle::Shared(table) => Some(table),
            TableHandle::Fixed(_) => None,
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Rewrites `frame` in place. The frame is always to be forwarded.
    pub fn process(&self, frame: &mut [u8]) -> Outcome {
        let len = frame.len();
        let mut buf = FrameBuffer::from_slice(frame);
        let outcome = match &self.table {
            TableHandle::Fixed(mac) => classify(&mut buf, mac, &self.sink, &self.options),
            TableHandle::Shared(table) => {
                classify(&mut buf, table.as_ref(), &self.sink, &self.options)
            }
        };

        self.metrics.record(&outcome);

        match outcome {
            Outcome::TooShort => trace!(len, "frame shorter than ethernet header"),
            Outcome::Unmatched(ether_type) => {
                trace!("not pppoe: ethertype {:#06x}", ether_type)
            }
            Outcome::Rewritten {
                kind,
                written,
                emitted,
            } => {
                let mut src = [0u8; 6];
                src.copy_from_slice(&frame[6..12]);
                debug!(
                    ?kind,
                    bytes = written.count(),
                    src = %MacAddr(src),
                    "source address rewritten"
                );
                if let Some(Err(e)) = emitted {
                    debug!(?e, "rewrite event dropped");
                }
            }
        }

        outcome
    }
}
