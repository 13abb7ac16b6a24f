//! Common protocol types

use packts::smac::FixedMac;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// MAC address (6 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr([0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);
    pub const ZERO: MacAddr = MacAddr([0, 0, 0, 0, 0, 0]);

    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// The address as a fully-present replacement table.
    pub fn as_fixed(&self) -> FixedMac {
        FixedMac(self.0)
    }
}

impl From<[u8; 6]> for MacAddr {
    fn from(bytes: [u8; 6]) -> Self {
        MacAddr(bytes)
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error type for MAC address parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMacAddrError {
    kind: ParseMacAddrErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ParseMacAddrErrorKind {
    Length,
    Format,
    Hex,
}

impl ParseMacAddrError {
    fn new(kind: ParseMacAddrErrorKind) -> Self {
        Self { kind }
    }
}

impl fmt::Display for ParseMacAddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ParseMacAddrErrorKind::Length => write!(f, "expected six octets"),
            ParseMacAddrErrorKind::Format => write!(f, "octets must be two hex digits"),
            ParseMacAddrErrorKind::Hex => write!(f, "invalid hex digit"),
        }
    }
}

impl std::error::Error for ParseMacAddrError {}

impl FromStr for MacAddr {
    type Err = ParseMacAddrError;

    /// Accepts "b0:48:7a:cf:ac:96", "b0-48-7a-cf-ac-96" and "b0487acfac96".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let octets: Vec<&str> = if s.contains(':') {
            s.split(':').collect()
        } else if s.contains('-') {
            s.split('-').collect()
        } else if s.len() == 12 && s.is_ascii() {
            (0..6).map(|i| &s[i * 2..i * 2 + 2]).collect()
        } else {
            return Err(ParseMacAddrError::new(ParseMacAddrErrorKind::Format));
        };

        if octets.len() != 6 {
            return Err(ParseMacAddrError::new(ParseMacAddrErrorKind::Length));
        }

        let mut result = [0u8; 6];
        for (slot, octet) in result.iter_mut().zip(&octets) {
            if octet.len() != 2 {
                return Err(ParseMacAddrError::new(ParseMacAddrErrorKind::Format));
            }
            // from_str_radix would take "+a"
            if !octet.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ParseMacAddrError::new(ParseMacAddrErrorKind::Hex));
            }
            *slot = u8::from_str_radix(octet, 16)
                .map_err(|_| ParseMacAddrError::new(ParseMacAddrErrorKind::Hex))?;
        }

        Ok(MacAddr(result))
    }
}

impl<'de> Deserialize<'de> for MacAddr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse()
            .map_err(|e: ParseMacAddrError| serde::de::Error::custom(format!("{}: {}", s, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_addr_multicast() {
        assert!(MacAddr::BROADCAST.is_multicast());
        assert!(MacAddr([0x01, 0x00, 0x5e, 0x00, 0x00, 0x01]).is_multicast());
        assert!(!MacAddr([0xb0, 0x48, 0x7a, 0xcf, 0xac, 0x96]).is_multicast());
    }

    #[test]
    fn test_mac_addr_display() {
        let mac = MacAddr([0xb0, 0x48, 0x7a, 0xcf, 0xac, 0x96]);
        assert_eq!(mac.to_string(), "b0:48:7a:cf:ac:96");
    }

    #[test]
    fn test_mac_addr_parse_formats() {
        let expected = MacAddr([0xb0, 0x48, 0x7a, 0xcf, 0xac, 0x96]);
        assert_eq!("b0:48:7a:cf:ac:96".parse::<MacAddr>().unwrap(), expected);
        assert_eq!("B0-48-7A-CF-AC-96".parse::<MacAddr>().unwrap(), expected);
        assert_eq!("b0487acfac96".parse::<MacAddr>().unwrap(), expected);
    }

    #[test]
    fn test_mac_addr_parse_errors() {
        assert!("b0:48:7a:cf:ac".parse::<MacAddr>().is_err());
        assert!("b0:48:7a:cf:ac:zz".parse::<MacAddr>().is_err());
        assert!("b0.48.7a.cf.ac.96".parse::<MacAddr>().is_err());
        assert!("b0:48:7a:cf:ac:961".parse::<MacAddr>().is_err());
        assert!("".parse::<MacAddr>().is_err());
        assert!("+a:bb:cc:dd:ee:ff".parse::<MacAddr>().is_err());
        assert!("aa-bb-cc-dd-ee--f".parse::<MacAddr>().is_err());
        assert!("+abbccddeeff".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_mac_addr_as_fixed() {
        let mac = MacAddr([1, 2, 3, 4, 5, 6]);
        assert_eq!(mac.as_fixed(), FixedMac([1, 2, 3, 4, 5, 6]));
    }

    #[test]
    fn test_mac_addr_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            mac: MacAddr,
        }
        let w: Wrapper = toml::from_str(r#"mac = "aa:bb:cc:dd:ee:ff""#).unwrap();
        assert_eq!(w.mac, MacAddr([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]));

        let bad: Result<Wrapper, _> = toml::from_str(r#"mac = "nope""#);
        assert!(bad.is_err());
    }
}
