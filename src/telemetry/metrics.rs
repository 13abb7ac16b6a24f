//! Metrics collection for classifier outcomes.
//!
//! Lock-free counters; the classifier can run on several threads at once.

use packts::classifier::Outcome;
use packts::pppoe::PppoeKind;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counter for thread-safe increment operations.
#[derive(Debug, Default)]
pub struct Counter(AtomicU64);

impl Counter {
    /// Creates a new counter initialized to zero.
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    /// Increments the counter by 1.
    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    /// Adds a value to the counter.
    pub fn add(&self, val: u64) {
        self.0.fetch_add(val, Ordering::Relaxed);
    }

    /// Gets the current value of the counter.
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

/// Per-protocol statistics for matched frames.
#[derive(Debug, Default)]
pub struct ProtocolStats {
    /// Frames matched and passed to the rewrite engine.
    pub frames: Counter,
    /// Source address bytes overwritten.
    pub bytes_written: Counter,
}

impl ProtocolStats {
    pub fn record(&self, bytes_written: u32) {
        self.frames.inc();
        self.bytes_written.add(bytes_written as u64);
    }
}

#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Every frame handed to the classifier.
    pub frames: Counter,
    /// Frames shorter than an Ethernet header.
    pub too_short: Counter,
    /// Frames with a non-PPPoE EtherType.
    pub unmatched: Counter,

    pub discovery: ProtocolStats,
    pub session: ProtocolStats,

    pub events_emitted: Counter,
    /// Events lost to a full or closed channel.
    pub events_dropped: Counter,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: &Outcome) {
        self.frames.inc();
        match outcome {
            Outcome::TooShort => self.too_short.inc(),
            Outcome::Unmatched(_) => self.unmatched.inc(),
            Outcome::Rewritten {
                kind,
                written,
                emitted,
            } => {
                self.protocol(*kind).record(written.count());
                match emitted {
                    Some(Ok(())) => self.events_emitted.inc(),
                    Some(Err(_)) => self.events_dropped.inc(),
                    None => {}
                }
            }
        }
    }

    pub fn protocol(&self, kind: PppoeKind) -> &ProtocolStats {
        match kind {
            PppoeKind::Discovery => &self.discovery,
            PppoeKind::Session => &self.session,
        }
    }

    /// Frames that reached the rewrite engine, either protocol.
    pub fn rewritten(&self) -> u64 {
        self.discovery.frames.get() + self.session.frames.get()
    }

    /// Exports all metrics as key-value pairs.
    pub fn export(&self) -> Vec<(String, u64)> {
        vec![
            ("frames".into(), self.frames.get()),
            ("too_short".into(), self.too_short.get()),
            ("unmatched".into(), self.unmatched.get()),
            ("rewritten".into(), self.rewritten()),
            ("discovery_frames".into(), self.discovery.frames.get()),
            (
                "discovery_bytes_written".into(),
                self.discovery.bytes_written.get(),
            ),
            ("session_frames".into(), self.session.frames.get()),
            (
                "session_bytes_written".into(),
                self.session.bytes_written.get(),
            ),
            ("events_emitted".into(), self.events_emitted.get()),
            ("events_dropped".into(), self.events_dropped.get()),
        ]
    }
}
