use std::net::IpAddr;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::addr::AddressFamily;
use crate::constants::LOOPBACK_NAME;
use crate::error::{Error, Result};
use crate::sysfs::Sysfs;

static HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<ifindex>\d+):\s+(?P<ifname>\S+):\s+<(?P<flags>[^>]*)>").unwrap()
});
static MTU: Lazy<Regex> = Lazy::new(|| Regex::new(r"\smtu\s+(?P<mtu>\S+)").unwrap());
static STATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\sstate\s+(?P<state>\S+)").unwrap());
static ETHER: Lazy<Regex> = Lazy::new(|| Regex::new(r"link/ether\s+(?P<mac>\S+)").unwrap());
static ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?P<family>inet6?)\s+(?P<addr>[^\s/]+)/(?P<prefix>\d+)").unwrap()
});

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LinkState {
    Up = 1,
    Down = 2,
}

impl LinkState {
    fn from_token(token: &str) -> Self {
        if token.eq_ignore_ascii_case("up") {
            LinkState::Up
        } else {
            LinkState::Down
        }
    }

    pub fn code(&self) -> i64 {
        *self as i64
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum MediaType {
    #[default]
    Ethernet,
    Loopback,
    Vlan,
    Bond,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Ethernet => "ethernet",
            MediaType::Loopback => "loopback",
            MediaType::Vlan => "vlan",
            MediaType::Bond => "bond",
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AddressEntry {
    pub address: IpAddr,
    pub prefix_len: u8,
}

impl AddressEntry {
    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.address)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceRecord {
    pub index: u32,
    pub name: String,
    pub admin_state: LinkState,
    pub oper_state: LinkState,
    pub mtu: Option<u32>,
    pub media_type: MediaType,
    pub mac: Option<String>,
    pub addresses: Vec<AddressEntry>,
}

impl InterfaceRecord {
    pub fn addresses_of(&self, family: AddressFamily) -> impl Iterator<Item = &AddressEntry> {
        self.addresses.iter().filter(move |a| a.family() == family)
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

// Start a new group every time a line sits exactly at `scope`.
fn group_by_indentation<'a>(lines: &[&'a str], scope: usize) -> Vec<Vec<&'a str>> {
    let mut groups = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in lines {
        if indentation(line) == scope && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
        current.push(*line);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Parse the output of `ip addr show` into one record per interface, in
/// listing order.
pub fn parse_listing(output: &str, sysfs: &Sysfs) -> Result<Vec<InterfaceRecord>> {
    let lines: Vec<&str> = output.lines().filter(|l| !l.trim().is_empty()).collect();
    let Some(scope) = lines.iter().map(|l| indentation(l)).min() else {
        return Ok(Vec::new());
    };
    group_by_indentation(&lines, scope)
        .iter()
        .map(|block| parse_block(block, sysfs))
        .collect()
}

fn parse_block(block: &[&str], sysfs: &Sysfs) -> Result<InterfaceRecord> {
    let header = block[0];
    let caps = HEADER
        .captures(header)
        .ok_or_else(|| Error::Parse(format!("malformed interface header {:?}", header)))?;
    let index: u32 = caps["ifindex"]
        .parse()
        .map_err(|e| Error::Parse(format!("bad ifindex in {:?}: {}", header, e)))?;
    let name = match caps["ifname"].split_once('@') {
        Some((name, _)) => name.to_string(),
        None => caps["ifname"].to_string(),
    };
    let admin_state = if caps["flags"].split(',').any(|f| f.eq_ignore_ascii_case("up")) {
        LinkState::Up
    } else {
        LinkState::Down
    };

    let mtu = MTU
        .captures(header)
        .and_then(|c| c["mtu"].parse::<u32>().ok());
    let oper_state = STATE
        .captures(header)
        .map(|c| LinkState::from_token(&c["state"]))
        .unwrap_or(LinkState::Down);

    let media_type = if name == LOOPBACK_NAME || name.starts_with("lo:") {
        MediaType::Loopback
    } else {
        sysfs.device_type(&name)
    };

    let mut record = InterfaceRecord {
        index,
        name,
        admin_state,
        oper_state,
        mtu,
        media_type,
        mac: None,
        addresses: Vec::new(),
    };

    let rest = &block[1..];
    if let Some(first) = rest.first() {
        for group in group_by_indentation(rest, indentation(first)) {
            parse_sub_record(&mut record, group[0]);
        }
    }
    Ok(record)
}

fn parse_sub_record(record: &mut InterfaceRecord, line: &str) {
    if let Some(caps) = ETHER.captures(line) {
        record.mac = Some(caps["mac"].chars().filter(|c| *c != ':').collect());
        return;
    }
    let Some(caps) = ADDRESS.captures(line) else {
        return;
    };
    let Some(family) = AddressFamily::from_marker(&caps["family"]) else {
        return;
    };
    let address = match caps["addr"].parse::<IpAddr>() {
        Ok(a) if AddressFamily::of(&a) == family => a,
        _ => {
            warn!(
                "skipping unparseable {} address {:?} on {}",
                family, &caps["addr"], record.name
            );
            return;
        }
    };
    match caps["prefix"].parse::<u8>() {
        Ok(prefix_len) if prefix_len <= family.max_prefix() => {
            record.addresses.push(AddressEntry {
                address,
                prefix_len,
            });
        }
        _ => debug!(
            "skipping address {} on {} with bad prefix {:?}",
            address, record.name, &caps["prefix"]
        ),
    }
}
