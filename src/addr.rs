use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    pub fn of(addr: &IpAddr) -> Self {
        match addr {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    // Directory name under /proc/sys/net.
    pub fn proc_name(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "ipv4",
            AddressFamily::Ipv6 => "ipv6",
        }
    }

    // Leading token of an address line in the listing.
    pub fn marker(&self) -> &'static str {
        match self {
            AddressFamily::Ipv4 => "inet",
            AddressFamily::Ipv6 => "inet6",
        }
    }

    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "inet" => Some(AddressFamily::Ipv4),
            "inet6" => Some(AddressFamily::Ipv6),
            _ => None,
        }
    }

    pub fn byte_len(&self) -> usize {
        match self {
            AddressFamily::Ipv4 => 4,
            AddressFamily::Ipv6 => 16,
        }
    }

    pub fn max_prefix(&self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.proc_name())
    }
}

pub fn ip_to_hex(addr: &IpAddr) -> String {
    match addr {
        IpAddr::V4(a) => hex::encode(a.octets()),
        IpAddr::V6(a) => hex::encode(a.octets()),
    }
}

pub fn ip_from_hex(family: AddressFamily, encoded: &str) -> Result<IpAddr> {
    let bytes = hex::decode(encoded)
        .map_err(|e| Error::invalid(crate::constants::ATTR_IP, format!("{:?}: {}", encoded, e)))?;
    if bytes.len() != family.byte_len() {
        return Err(Error::invalid(
            crate::constants::ATTR_IP,
            format!(
                "{} address must be {} bytes, got {}",
                family,
                family.byte_len(),
                bytes.len()
            ),
        ));
    }
    Ok(match family {
        AddressFamily::Ipv4 => {
            let mut octets = [0u8; 4];
            octets.copy_from_slice(&bytes);
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        AddressFamily::Ipv6 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&bytes);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    })
}

/// Build the "<addr>/<prefix>" argument for `ip addr add|del`.
pub fn address_and_prefix(family: AddressFamily, encoded: &str, prefix_len: u8) -> Result<String> {
    if prefix_len > family.max_prefix() {
        return Err(Error::invalid(
            crate::constants::ATTR_PREFIX_LENGTH,
            format!("{} exceeds {} for {}", prefix_len, family.max_prefix(), family),
        ));
    }
    let addr = ip_from_hex(family, encoded)?;
    Ok(format!("{}/{}", addr, prefix_len))
}

pub fn normalize_mac(mac: &str) -> Result<String> {
    let digits: String = mac.chars().filter(|c| *c != ':' && *c != '-').collect();
    if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::invalid(
            crate::constants::ATTR_MAC_ADDRESS,
            format!("{:?} is not a MAC address", mac),
        ));
    }
    Ok(digits.to_ascii_lowercase())
}

pub fn mac_with_colons(mac: &str) -> Result<String> {
    let digits = normalize_mac(mac)?;
    let pairs: Vec<&str> = (0..digits.len())
        .step_by(2)
        .map(|i| &digits[i..i + 2])
        .collect();
    Ok(pairs.join(":"))
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_hex_round_trip_v4() {
        let addr: IpAddr = "192.168.10.1".parse().unwrap();
        let encoded = ip_to_hex(&addr);
        assert_eq!(encoded, "c0a80a01");
        assert_eq!(ip_from_hex(AddressFamily::Ipv4, &encoded).unwrap(), addr);
    }

    #[test]
    fn test_hex_round_trip_v6() {
        let addr: IpAddr = "fe80::5054:ff:fe12:3456".parse().unwrap();
        let encoded = ip_to_hex(&addr);
        assert_eq!(encoded.len(), 32);
        assert_eq!(ip_from_hex(AddressFamily::Ipv6, &encoded).unwrap(), addr);
    }

    #[test]
    fn test_address_and_prefix_loopback() {
        assert_eq!(
            address_and_prefix(AddressFamily::Ipv4, "7f000001", 8).unwrap(),
            "127.0.0.1/8"
        );
        assert_eq!(
            address_and_prefix(AddressFamily::Ipv6, "00000000000000000000000000000001", 128)
                .unwrap(),
            "::1/128"
        );
    }

    #[test]
    fn test_address_and_prefix_rejects_bad_input() {
        assert!(address_and_prefix(AddressFamily::Ipv4, "7f0000", 8).is_err());
        assert!(address_and_prefix(AddressFamily::Ipv4, "7f00000g", 8).is_err());
        assert!(address_and_prefix(AddressFamily::Ipv4, "7f000001", 33).is_err());
        assert!(address_and_prefix(AddressFamily::Ipv6, "7f000001", 64).is_err());
    }

    #[test]
    fn test_ip_from_hex_errors() {
        let odd = ip_from_hex(AddressFamily::Ipv4, "7f00001").unwrap_err();
        assert!(matches!(&odd, Error::InvalidAttribute { attr, .. } if attr == "ip"));
        assert!(ip_from_hex(AddressFamily::Ipv4, "").is_err());
        assert!(ip_from_hex(AddressFamily::Ipv6, "7f000001").is_err());
        assert_eq!(
            ip_from_hex(AddressFamily::Ipv4, "0A00020F").unwrap(),
            "10.0.2.15".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_mac_with_colons() {
        assert_eq!(mac_with_colons("525400123456").unwrap(), "52:54:00:12:34:56");
        assert_eq!(mac_with_colons("52:54:00:AB:cd:EF").unwrap(), "52:54:00:ab:cd:ef");
        assert!(mac_with_colons("5254001234").is_err());
        assert!(mac_with_colons("zz5400123456").is_err());
    }
}
