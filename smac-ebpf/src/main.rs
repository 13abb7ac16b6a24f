#![no_std]
#![no_main]

use aya_ebpf::{
    bindings::TC_ACT_OK,
    cty::c_long,
    macros::{classifier, map},
    programs::TcContext,
};
use aya_log_ebpf::debug;
use packts::bounds::FrameBuffer;
use packts::classifier::{classify, maps, Options, Outcome};
use packts::event::EmitPoint;
use packts::smac::RewriteStrategy;

#[cfg(feature = "events")]
use aya_ebpf::maps::RingBuf;
#[cfg(feature = "events")]
use packts::event::{EmitError, EventSink, RewriteEvent};
#[cfg(not(feature = "events"))]
use packts::event::NoEvents;
#[cfg(feature = "fixed-mac")]
use packts::smac::FixedMac;
#[cfg(not(feature = "fixed-mac"))]
use {aya_ebpf::maps::HashMap, packts::smac::SmacTable};

// Verdict::tc_action() is returned on the normal path
const _: () = assert!(TC_ACT_OK as i32 == packts::classifier::TC_ACT_OK);

// control planeが index 0..6 に1バイトずつ書き込む
#[cfg(not(feature = "fixed-mac"))]
#[map]
static SMAC: HashMap<u32, u8> = HashMap::with_max_entries(maps::SMAC_MAX_ENTRIES, 0);

#[cfg(feature = "events")]
#[map]
static PIPE: RingBuf = RingBuf::with_byte_size(maps::PIPE_BYTE_SIZE, 0);

#[cfg(feature = "fixed-mac")]
const FIXED_SMAC: FixedMac = FixedMac([176, 72, 122, 207, 172, 150]);

#[cfg(feature = "iterate")]
const STRATEGY: RewriteStrategy = RewriteStrategy::Iterate;
#[cfg(not(feature = "iterate"))]
const STRATEGY: RewriteStrategy = RewriteStrategy::PerIndex;

#[cfg(feature = "events")]
const EMIT: EmitPoint = EmitPoint::AfterRewrite;
#[cfg(not(feature = "events"))]
const EMIT: EmitPoint = EmitPoint::Disabled;

const OPTIONS: Options = Options {
    strategy: STRATEGY,
    emit: EMIT,
};

#[cfg(not(feature = "fixed-mac"))]
struct SmacMap(&'static HashMap<u32, u8>);

#[cfg(not(feature = "fixed-mac"))]
impl SmacTable for SmacMap {
    #[inline(always)]
    fn get(&self, index: u32) -> Option<u8> {
        // 値はcontrol planeが途中で書き換えうるので即コピーする
        unsafe { self.0.get(&index).copied() }
    }
}

#[cfg(feature = "events")]
struct Pipe(&'static RingBuf);

#[cfg(feature = "events")]
impl EventSink for Pipe {
    #[inline(always)]
    fn try_emit(&self, event: &RewriteEvent) -> Result<(), EmitError> {
        match self.0.reserve::<RewriteEvent>(0) {
            Some(mut entry) => {
                entry.write(*event);
                entry.submit(0);
                Ok(())
            }
            None => Err(EmitError::Full),
        }
    }
}

#[classifier]
pub fn pppoe_smac(ctx: TcContext) -> i32 {
    match try_pppoe_smac(&ctx) {
        Ok(ret) => ret,
        Err(_) => TC_ACT_OK as i32,
    }
}

#[inline(always)]
fn try_pppoe_smac(ctx: &TcContext) -> Result<i32, c_long> {
    ctx.pull_data(0)?;

    // SAFETY: data..data_end is the linear part of the skb for this call.
    let mut frame = unsafe { FrameBuffer::from_raw(ctx.data(), ctx.data_end()) };

    #[cfg(feature = "fixed-mac")]
    let table = FIXED_SMAC;
    #[cfg(not(feature = "fixed-mac"))]
    let table = SmacMap(&SMAC);

    #[cfg(feature = "events")]
    let sink = Pipe(&PIPE);
    #[cfg(not(feature = "events"))]
    let sink = NoEvents;

    let outcome = classify(&mut frame, &table, &sink, &OPTIONS);

    if let Outcome::Rewritten {
        kind,
        written,
        emitted,
    } = outcome
    {
        debug!(
            ctx,
            "smac rewrite: ethertype {:x} bytes {} event_lost {}",
            kind.ether_type(),
            written.count(),
            matches!(emitted, Some(Err(_))) as u8
        );
    }

    Ok(outcome.verdict().tc_action())
}

#[link_section = "license"]
#[no_mangle]
static LICENSE: [u8; 13] = *b"Dual MIT/GPL\0";

#[cfg(not(test))]
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    loop {}
}
