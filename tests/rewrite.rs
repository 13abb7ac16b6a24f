//! End-to-end behaviour of the source address rewrite through the public API.

use packts::classifier::{Options, Outcome, Verdict, TC_ACT_OK};
use packts::event::EmitPoint;
use packts::pppoe::PppoeKind;
use packts::smac::{FixedMac, RewriteStrategy};
use pppoe_smac::config::{self, TableSource};
use pppoe_smac::dataplane::{channel, Rewriter, TableHandle};
use pppoe_smac::protocol::ethernet::FrameBuilder;
use pppoe_smac::protocol::MacAddr;
use std::sync::Arc;
use std::thread;

const ORIGINAL_SRC: MacAddr = MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]);
const REPLACEMENT: [u8; 6] = [176, 72, 122, 207, 172, 150];

fn frame(ether_type: u16) -> Vec<u8> {
    FrameBuilder::new()
        .dst_mac(MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]))
        .src_mac(ORIGINAL_SRC)
        .ethertype(ether_type)
        .payload(&[0x11, 0x00, 0x12, 0x34, 0x00, 0x02, 0xc0, 0x21])
        .build()
}

fn src(frame: &[u8]) -> [u8; 6] {
    let mut mac = [0u8; 6];
    mac.copy_from_slice(&frame[6..12]);
    mac
}

fn table_rewriter(entries: [Option<u8>; 6], strategy: RewriteStrategy) -> Rewriter {
    Rewriter::without_events(
        TableHandle::from(TableSource::Table(entries)),
        Options {
            strategy,
            ..Options::default()
        },
    )
}

#[test]
fn test_discovery_full_table() {
    let rewriter = table_rewriter(REPLACEMENT.map(Some), RewriteStrategy::PerIndex);
    let mut data = frame(0x8863);
    let outcome = rewriter.process(&mut data);

    assert_eq!(src(&data), [0xb0, 0x48, 0x7a, 0xcf, 0xac, 0x96]);
    assert!(matches!(
        outcome,
        Outcome::Rewritten {
            kind: PppoeKind::Discovery,
            ..
        }
    ));
    assert_eq!(outcome.verdict(), Verdict::Forward);
}

#[test]
fn test_sparse_table_both_strategies() {
    let entries = [Some(176), None, Some(122), None, Some(172), Some(150)];
    for strategy in [RewriteStrategy::PerIndex, RewriteStrategy::Iterate] {
        let rewriter = table_rewriter(entries, strategy);
        let mut data = frame(0x8863);
        rewriter.process(&mut data);
        assert_eq!(src(&data), [0xb0, 0xbb, 0x7a, 0xdd, 0xac, 0x96]);
    }
}

#[test]
fn test_only_source_address_changes() {
    let rewriter = table_rewriter(REPLACEMENT.map(Some), RewriteStrategy::PerIndex);
    let original = frame(0x8864);
    let mut data = original.clone();
    rewriter.process(&mut data);

    assert_eq!(data.len(), original.len());
    assert_eq!(data[..6], original[..6]);
    assert_eq!(data[12..], original[12..]);
}

#[test]
fn test_ipv4_frame_untouched() {
    let rewriter = table_rewriter(REPLACEMENT.map(Some), RewriteStrategy::PerIndex);
    let original = frame(0x0800);
    let mut data = original.clone();
    let outcome = rewriter.process(&mut data);

    assert_eq!(outcome, Outcome::Unmatched(0x0800));
    assert_eq!(data, original);
    assert_eq!(outcome.verdict().tc_action(), TC_ACT_OK);
}

#[test]
fn test_every_short_frame_untouched() {
    let rewriter = table_rewriter(REPLACEMENT.map(Some), RewriteStrategy::PerIndex);
    let full = frame(0x8863);
    for len in 0..14 {
        let mut data = full[..len].to_vec();
        let outcome = rewriter.process(&mut data);
        assert_eq!(outcome, Outcome::TooShort, "len {}", len);
        assert_eq!(data, full[..len], "len {}", len);
    }
}

#[test]
fn test_rewrite_twice_is_same_as_once() {
    let entries = [None, Some(0x10), None, Some(0x30), None, None];
    let rewriter = table_rewriter(entries, RewriteStrategy::Iterate);
    let mut once = frame(0x8864);
    rewriter.process(&mut once);
    let mut twice = once.clone();
    rewriter.process(&mut twice);
    assert_eq!(once, twice);
}

#[test]
fn test_fixed_and_full_table_agree() {
    let fixed = Rewriter::without_events(
        TableHandle::Fixed(FixedMac(REPLACEMENT)),
        Options::default(),
    );
    let table = table_rewriter(REPLACEMENT.map(Some), RewriteStrategy::Iterate);

    let mut a = frame(0x8863);
    let mut b = frame(0x8863);
    fixed.process(&mut a);
    table.process(&mut b);
    assert_eq!(a, b);
}

#[test]
fn test_events_from_config() {
    let cfg = config::parse(
        r#"
        [classifier]
        table = [176, "-", 122, "-", 172, 150]
        events = "before"
        channel_capacity = 8
        "#,
    )
    .unwrap();

    let (sink, mut rx) = channel(cfg.classifier.channel_capacity);
    let rewriter = Rewriter::from_config(&cfg.classifier, sink, Arc::default()).unwrap();
    assert_eq!(rewriter.options().emit, EmitPoint::BeforeRewrite);

    let mut data = frame(0x8864);
    rewriter.process(&mut data);
    rewriter.process(&mut frame(0x0800));

    let event = rx.try_recv().unwrap();
    assert_eq!(event.source_address, ORIGINAL_SRC.0);
    assert_eq!(event.ether_type(), 0x8864);
    // unmatched frames never emit
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_concurrent_table_updates() {
    let old = [0x02u8, 0x00, 0x00, 0x00, 0x00, 0x01];
    let new = [0x02u8, 0xff, 0xff, 0xff, 0xff, 0xfe];
    let rewriter = Arc::new(table_rewriter(old.map(Some), RewriteStrategy::PerIndex));
    let table = Arc::clone(rewriter.shared_table().unwrap());

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let rewriter = Arc::clone(&rewriter);
            thread::spawn(move || {
                for _ in 0..2_000 {
                    let mut data = frame(0x8863);
                    rewriter.process(&mut data);
                    for (i, b) in src(&data).into_iter().enumerate() {
                        assert!(b == old[i] || b == new[i], "byte {} = {:#04x}", i, b);
                    }
                }
            })
        })
        .collect();

    for i in 0..2_000 {
        table.load_mac(MacAddr(if i % 2 == 0 { new } else { old }));
    }

    for worker in workers {
        worker.join().unwrap();
    }
    assert_eq!(rewriter.metrics().rewritten(), 8_000);
}
