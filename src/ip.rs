use std::rc::Rc;

use log::{debug, info, warn};
use serde_json::{Map, Value, json};

use crate::addr::{AddressFamily, address_and_prefix, ip_to_hex};
use crate::constants::{
    ATTR_ADDRESS, ATTR_ENABLED, ATTR_FORWARDING, ATTR_IFINDEX, ATTR_IP, ATTR_NAME,
    ATTR_PREFIX_LENGTH, ATTR_VRF_ID,
};
use crate::error::{Error, Result};
use crate::host::Host;
use crate::listing::{AddressEntry, InterfaceRecord};
use crate::object::{Object, Operation, TypeKey};
use crate::router::Handler;

pub struct IpHandler {
    host: Rc<Host>,
    // Report success when a forwarding write fails, as older callers expect.
    legacy_forwarding_errors: bool,
}

fn family_of(object: &Object) -> Result<AddressFamily> {
    object.key.family().ok_or_else(|| Error::Unsupported {
        operation: "ip".into(),
        key: object.key.to_string(),
    })
}

fn base_object(key: TypeKey, record: &InterfaceRecord) -> Object {
    Object::new(key)
        .with(ATTR_VRF_ID, 0)
        .with(ATTR_IFINDEX, record.index)
        .with(ATTR_NAME, record.name.as_str())
}

fn address_attrs(entry: &AddressEntry) -> Value {
    json!({
        ATTR_IP: ip_to_hex(&entry.address),
        ATTR_PREFIX_LENGTH: entry.prefix_len,
    })
}

impl IpHandler {
    pub fn new(host: Rc<Host>, legacy_forwarding_errors: bool) -> Self {
        Self {
            host,
            legacy_forwarding_errors,
        }
    }

    fn get_containers(
        &self,
        family: AddressFamily,
        filter: &Object,
        out: &mut Vec<Object>,
    ) -> Result<()> {
        for record in self.host.matching_interfaces(filter)? {
            let forwarding = self
                .host
                .sysfs
                .forwarding(&record.name, family)
                .unwrap_or_else(|e| {
                    debug!("treating forwarding as 0: {}", e);
                    0
                });
            let addresses: Map<String, Value> = record
                .addresses_of(family)
                .enumerate()
                .map(|(i, entry)| (i.to_string(), address_attrs(entry)))
                .collect();
            out.push(
                base_object(TypeKey::container(family), &record)
                    .with(ATTR_ENABLED, 1)
                    .with(ATTR_FORWARDING, forwarding)
                    .with(ATTR_ADDRESS, Value::Object(addresses)),
            );
        }
        Ok(())
    }

    fn get_addresses(
        &self,
        family: AddressFamily,
        filter: &Object,
        out: &mut Vec<Object>,
    ) -> Result<()> {
        for record in self.host.matching_interfaces(filter)? {
            for entry in record.addresses_of(family) {
                out.push(
                    base_object(TypeKey::address(family), &record)
                        .with(ATTR_IP, ip_to_hex(&entry.address))
                        .with(ATTR_PREFIX_LENGTH, entry.prefix_len),
                );
            }
        }
        Ok(())
    }

    fn set_forwarding(&self, family: AddressFamily, name: &str, change: &Object) -> Result<()> {
        let Some(value) = change.get_i64(ATTR_FORWARDING)? else {
            return Ok(());
        };
        match self.host.sysfs.set_forwarding(name, family, value) {
            Ok(()) => {
                info!("Set {} forwarding on {} to {}", family, name, value);
                Ok(())
            }
            Err(e) if self.legacy_forwarding_errors => {
                warn!("ignoring failure to set {} forwarding on {}: {}", family, name, e);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn address_argument(&self, family: AddressFamily, change: &Object) -> Result<String> {
        let ip = change
            .get_str(ATTR_IP)?
            .ok_or(Error::MissingAttribute(ATTR_IP))?;
        let prefix = change
            .get_u32(ATTR_PREFIX_LENGTH)?
            .ok_or(Error::MissingAttribute(ATTR_PREFIX_LENGTH))?;
        let prefix = u8::try_from(prefix)
            .map_err(|_| Error::invalid(ATTR_PREFIX_LENGTH, format!("{} is too long", prefix)))?;
        address_and_prefix(family, ip, prefix)
    }
}

impl Handler for IpHandler {
    fn get(&self, filter: &Object, out: &mut Vec<Object>) -> Result<()> {
        let family = family_of(filter)?;
        if filter.key.is_address() {
            self.get_addresses(family, filter, out)
        } else {
            self.get_containers(family, filter, out)
        }
    }

    fn transact(&self, operation: Operation, change: &mut Object) -> Result<()> {
        let family = family_of(change)?;
        let name = self.host.target(change)?;
        match (operation, change.key.is_address()) {
            (Operation::Set, false) => self.set_forwarding(family, &name, change),
            (Operation::Create, true) => {
                let addr = self.address_argument(family, change)?;
                info!("Adding address {} to {}", addr, name);
                self.host.ip.addr_add(&addr, &name)
            }
            (Operation::Delete, true) => {
                let addr = self.address_argument(family, change)?;
                info!("Deleting address {} from {}", addr, name);
                self.host.ip.addr_del(&addr, &name)
            }
            _ => Err(Error::Unsupported {
                operation: operation.to_string(),
                key: change.key.to_string(),
            }),
        }
    }
}
