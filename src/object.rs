use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::addr::AddressFamily;
use crate::constants::{ATTR_IFINDEX, ATTR_NAME};
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Set,
    Delete,
    Get,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Operation::Create => "create",
            Operation::Set => "set",
            Operation::Delete => "delete",
            Operation::Get => "get",
        };
        f.write_str(s)
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub enum TypeKey {
    #[serde(rename = "interface/entry")]
    InterfaceEntry,
    #[serde(rename = "ip/ipv4")]
    Ipv4,
    #[serde(rename = "ip/ipv6")]
    Ipv6,
    #[serde(rename = "ip/ipv4/address")]
    Ipv4Address,
    #[serde(rename = "ip/ipv6/address")]
    Ipv6Address,
}

impl TypeKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeKey::InterfaceEntry => "interface/entry",
            TypeKey::Ipv4 => "ip/ipv4",
            TypeKey::Ipv6 => "ip/ipv6",
            TypeKey::Ipv4Address => "ip/ipv4/address",
            TypeKey::Ipv6Address => "ip/ipv6/address",
        }
    }

    pub fn family(&self) -> Option<AddressFamily> {
        match self {
            TypeKey::Ipv4 | TypeKey::Ipv4Address => Some(AddressFamily::Ipv4),
            TypeKey::Ipv6 | TypeKey::Ipv6Address => Some(AddressFamily::Ipv6),
            TypeKey::InterfaceEntry => None,
        }
    }

    pub fn is_address(&self) -> bool {
        matches!(self, TypeKey::Ipv4Address | TypeKey::Ipv6Address)
    }

    pub fn container(family: AddressFamily) -> Self {
        match family {
            AddressFamily::Ipv4 => TypeKey::Ipv4,
            AddressFamily::Ipv6 => TypeKey::Ipv6,
        }
    }

    pub fn address(family: AddressFamily) -> Self {
        match family {
            AddressFamily::Ipv4 => TypeKey::Ipv4Address,
            AddressFamily::Ipv6 => TypeKey::Ipv6Address,
        }
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Object {
    pub key: TypeKey,
    #[serde(default)]
    pub attrs: BTreeMap<String, Value>,
}

impl Object {
    pub fn new(key: TypeKey) -> Self {
        Self {
            key,
            attrs: BTreeMap::new(),
        }
    }

    pub fn with<V: Into<Value>>(mut self, attr: &str, value: V) -> Self {
        self.set(attr, value);
        self
    }

    pub fn set<V: Into<Value>>(&mut self, attr: &str, value: V) {
        self.attrs.insert(attr.into(), value.into());
    }

    pub fn get(&self, attr: &str) -> Option<&Value> {
        match self.attrs.get(attr) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v),
        }
    }

    pub fn get_str(&self, attr: &str) -> Result<Option<&str>> {
        match self.get(attr) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(v) => Err(Error::invalid(attr, format!("expected a string, got {}", v))),
        }
    }

    pub fn get_i64(&self, attr: &str) -> Result<Option<i64>> {
        match self.get(attr) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_i64()
                .map(Some)
                .ok_or_else(|| Error::invalid(attr, format!("{} is not an integer", n))),
            Some(Value::String(s)) => s
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| Error::invalid(attr, format!("{:?} is not an integer", s))),
            Some(v) => Err(Error::invalid(attr, format!("expected an integer, got {}", v))),
        }
    }

    pub fn get_u32(&self, attr: &str) -> Result<Option<u32>> {
        match self.get_i64(attr)? {
            None => Ok(None),
            Some(n) => u32::try_from(n)
                .map(Some)
                .map_err(|_| Error::invalid(attr, format!("{} is out of range", n))),
        }
    }

    pub fn name(&self) -> Result<Option<&str>> {
        Ok(self.get_str(ATTR_NAME)?.filter(|n| !n.is_empty()))
    }

    pub fn ifindex(&self) -> Result<Option<u32>> {
        self.get_u32(ATTR_IFINDEX)
    }

    /// Key comparison against a candidate interface: every key attribute
    /// present in `self` must equal the candidate's.
    pub fn matches(&self, name: &str, ifindex: u32) -> bool {
        let name_ok = match self.name() {
            Ok(Some(n)) => n == name,
            Ok(None) => true,
            Err(_) => false,
        };
        let index_ok = match self.ifindex() {
            Ok(Some(i)) => i == ifindex,
            Ok(None) => true,
            Err(_) => false,
        };
        name_ok && index_ok
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Request {
    pub operation: Operation,
    pub object: Object,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<Object>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub change: Option<Object>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
