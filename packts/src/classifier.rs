#![cfg(feature = "pppoe")]

//! Validate -> Match -> Rewrite -> Emit.
//!
//! Every path forwards the frame. Short buffers and foreign protocols are
//! left untouched, absent table entries leave their byte untouched, and a
//! failed event append is recorded but changes nothing.

use crate::bounds::FrameBuffer;
use crate::eth::{ETH_HEADER_SIZE, EthHeader};
use crate::event::{EmitError, EmitPoint, EventSink, RewriteEvent};
use crate::pppoe::{PppoeKind, match_ether_type};
use crate::smac::{RewriteStrategy, SmacTable, WrittenMask, rewrite_source};

/// `TC_ACT_OK` from `linux/pkt_cls.h`.
pub const TC_ACT_OK: i32 = 0;

/// Sizes of the kernel maps the classifier reads and writes.
pub mod maps {
    pub const SMAC_MAX_ENTRIES: u32 = crate::smac::SMAC_TABLE_LEN;
    pub const PIPE_BYTE_SIZE: u32 = 256 * 1024;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    pub strategy: RewriteStrategy,
    pub emit: EmitPoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Forward,
}

impl Verdict {
    #[inline(always)]
    pub fn tc_action(&self) -> i32 {
        match self {
            Self::Forward => TC_ACT_OK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    TooShort,
    Unmatched(u16),
    Rewritten {
        kind: PppoeKind,
        written: WrittenMask,
        /// `None` when emission is disabled.
        emitted: Option<Result<(), EmitError>>,
    },
}

impl Outcome {
    #[inline(always)]
    pub fn verdict(&self) -> Verdict {
        Verdict::Forward
    }
}

#[inline(always)]
pub fn classify<T: SmacTable, S: EventSink>(
    frame: &mut FrameBuffer<'_>,
    table: &T,
    sink: &S,
    options: &Options,
) -> Outcome {
    let Some(header) = frame.ptr_at::<EthHeader>(0) else {
        return Outcome::TooShort;
    };
    // SAFETY: ptr_at proved 14 bytes from start are inside the frame.
    let ether_type = unsafe { (*header).ether_type() };

    let Some(kind) = match_ether_type(ether_type) else {
        return Outcome::Unmatched(ether_type);
    };

    // ヘッダの後ろを触る前提のチェック。冗長でも消さない
    if !frame.check(ETH_HEADER_SIZE, 0) {
        return Outcome::TooShort;
    }

    let Some(header) = frame.ptr_at_mut::<EthHeader>(0) else {
        return Outcome::TooShort;
    };
    // SAFETY: checked just above, and the frame is borrowed mutably.
    let header = unsafe { &mut *header };

    let mut emitted = None;
    if options.emit == EmitPoint::BeforeRewrite {
        emitted = Some(sink.try_emit(&snapshot(header)));
    }

    let written = rewrite_source(header, table, options.strategy);

    if options.emit == EmitPoint::AfterRewrite {
        emitted = Some(sink.try_emit(&snapshot(header)));
    }

    Outcome::Rewritten {
        kind,
        written,
        emitted,
    }
}

#[inline(always)]
fn snapshot(header: &EthHeader) -> RewriteEvent {
    RewriteEvent {
        source_address: header.source_address,
        ether_type: header.raw_ether_type(),
    }
}
