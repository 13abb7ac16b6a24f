#![cfg(feature = "pppoe")]

// RFC 2516 から引用
// ETHER_TYPE to 0x8863 (Discovery Stage) or 0x8864 (PPP Session Stage)

pub const PPPOE_DISCOVERY: u16 = 0x8863;
pub const PPPOE_SESSION: u16 = 0x8864;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PppoeKind {
    Discovery,
    Session,
}

impl PppoeKind {
    #[inline(always)]
    pub fn ether_type(&self) -> u16 {
        match self {
            Self::Discovery => PPPOE_DISCOVERY,
            Self::Session => PPPOE_SESSION,
        }
    }
}

/// Exact match on the host-order EtherType. VLAN tags are not unwrapped.
#[inline(always)]
pub fn match_ether_type(ether_type: u16) -> Option<PppoeKind> {
    match ether_type {
        PPPOE_DISCOVERY => Some(PppoeKind::Discovery),
        PPPOE_SESSION => Some(PppoeKind::Session),
        _ => None,
    }
}
