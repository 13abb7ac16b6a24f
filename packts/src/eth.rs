#![cfg(feature = "ethernet")]

// IEEE Std 802.3-2022 (Revision of IEEE Std 802.3‐2018)から一部引用
// 6 OCTETS DESTINATION ADDRESS
// 6 OCTETS SOURCE ADDRESS
// 2 OCTETS LENGTH/TYPE

pub const ETH_HEADER_SIZE: usize = 14;
pub const MAC_LEN: usize = 6;

#[repr(C)]
pub struct EthHeader {
    pub destination_address: [u8; MAC_LEN],
    pub source_address: [u8; MAC_LEN],
    // ネットワークバイトオーダーのまま保持する
    // u16にするとalignが2になるので[u8; 2]で持つ
    ether_type: [u8; 2],
}

impl EthHeader {
    /// EtherType in host byte order.
    #[inline(always)]
    pub fn ether_type(&self) -> u16 {
        u16::from_be_bytes(self.ether_type)
    }

    /// EtherType exactly as it sits on the wire.
    #[inline(always)]
    pub fn raw_ether_type(&self) -> [u8; 2] {
        self.ether_type
    }

    // fcsはnicが自動で付けるので書けない
}
