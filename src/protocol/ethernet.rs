//! Raw frame helpers for the offline tooling
//!
//! The classifier works on `packts::eth::EthHeader` directly. These types
//! are for reading back a frame after it has been processed, and for
//! producing test input.

use super::MacAddr;
use crate::{Error, Result};
use packts::eth::{ETH_HEADER_SIZE, MAC_LEN};
use packts::pppoe::{match_ether_type, PppoeKind, PPPOE_DISCOVERY};

/// PPPoE version 1, type 1.
const PPPOE_VER_TYPE: u8 = 0x11;
/// PADI code.
const PADI: u8 = 0x09;
/// Service-Name tag type.
const TAG_SERVICE_NAME: u16 = 0x0101;

/// Borrowed view of a frame that holds at least a full Ethernet header.
#[derive(Debug)]
pub struct Frame<'a> {
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < ETH_HEADER_SIZE {
            return Err(Error::Parse(format!(
                "need {} bytes for an Ethernet header, got {}",
                ETH_HEADER_SIZE,
                bytes.len()
            )));
        }
        Ok(Self { bytes })
    }

    fn mac_at(&self, offset: usize) -> MacAddr {
        let mut mac = [0u8; MAC_LEN];
        mac.copy_from_slice(&self.bytes[offset..offset + MAC_LEN]);
        MacAddr(mac)
    }

    pub fn dst_mac(&self) -> MacAddr {
        self.mac_at(0)
    }

    pub fn src_mac(&self) -> MacAddr {
        self.mac_at(MAC_LEN)
    }

    pub fn ethertype(&self) -> u16 {
        u16::from_be_bytes([self.bytes[12], self.bytes[13]])
    }

    /// Which PPPoE stage the frame belongs to, if any.
    pub fn pppoe_kind(&self) -> Option<PppoeKind> {
        match_ether_type(self.ethertype())
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[ETH_HEADER_SIZE..]
    }
}

/// Appends header fields in wire order; call the setters in the order
/// they appear on the wire.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Broadcast PADI from `src` carrying an empty Service-Name tag.
    pub fn padi(src: MacAddr) -> Self {
        let tag = TAG_SERVICE_NAME.to_be_bytes();
        let body = [tag[0], tag[1], 0x00, 0x00];
        let len = (body.len() as u16).to_be_bytes();

        let mut payload = vec![PPPOE_VER_TYPE, PADI, 0x00, 0x00, len[0], len[1]];
        payload.extend_from_slice(&body);

        Self::new()
            .dst_mac(MacAddr::BROADCAST)
            .src_mac(src)
            .ethertype(PPPOE_DISCOVERY)
            .payload(&payload)
    }

    pub fn dst_mac(mut self, mac: MacAddr) -> Self {
        self.bytes.extend_from_slice(&mac.0);
        self
    }

    pub fn src_mac(mut self, mac: MacAddr) -> Self {
        self.bytes.extend_from_slice(&mac.0);
        self
    }

    pub fn ethertype(mut self, ethertype: u16) -> Self {
        self.bytes.extend_from_slice(&ethertype.to_be_bytes());
        self
    }

    pub fn payload(mut self, payload: &[u8]) -> Self {
        self.bytes.extend_from_slice(payload);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
