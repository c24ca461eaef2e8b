use std::rc::Rc;

use log::{error, info, warn};

use crate::constants::{
    ATTR_ADMIN_STATUS, ATTR_IFINDEX, ATTR_MAC_ADDRESS, ATTR_MTU, ATTR_NAME, ATTR_OPER_STATUS,
    ATTR_TYPE,
};
use crate::error::{Error, Result};
use crate::host::Host;
use crate::listing::InterfaceRecord;
use crate::object::{Object, Operation, TypeKey};
use crate::router::Handler;

pub struct InterfaceHandler {
    host: Rc<Host>,
}

impl InterfaceHandler {
    pub fn new(host: Rc<Host>) -> Self {
        Self { host }
    }

    fn create(&self, change: &mut Object) -> Result<()> {
        let name = change
            .name()?
            .ok_or(Error::MissingAttribute(ATTR_NAME))?
            .to_string();

        if self
            .host
            .interfaces(Some(&name))?
            .iter()
            .any(|r| r.name == name)
        {
            return Err(Error::AlreadyExists(name));
        }

        // A requested MAC is applied by the set pass; only fall back to
        // the system MAC at creation time.
        let mac = match change.get_str(ATTR_MAC_ADDRESS)? {
            Some(_) => None,
            None => self.host.base_mac(),
        };

        info!("Creating interface {}", name);
        self.host.ip.link_add_dummy(&name, mac.as_deref())?;

        let result = self.apply(&name, change);
        match self.host.index_of(&name) {
            Ok(index) => change.set(ATTR_IFINDEX, index),
            Err(e) => warn!("unable to get ifindex of new interface {}: {}", name, e),
        }
        result
    }

    fn delete(&self, change: &Object) -> Result<()> {
        let name = self.host.target(change)?;
        info!("Deleting interface {}", name);
        self.host.ip.link_delete(&name)
    }

    // Every present attribute is attempted; the first failure does not
    // stop the others and nothing is rolled back.
    fn apply(&self, name: &str, change: &Object) -> Result<()> {
        let mut failed = Vec::new();
        let steps: [(&str, fn(&Self, &str, &Object) -> Result<()>); 3] = [
            (ATTR_MTU, Self::apply_mtu),
            (ATTR_ADMIN_STATUS, Self::apply_admin_status),
            (ATTR_MAC_ADDRESS, Self::apply_mac),
        ];
        for (attr, step) in steps {
            if let Err(e) = step(self, name, change) {
                error!("unable to set {} on {}: {}", attr, name, e);
                failed.push(format!("{} ({})", attr, e));
            }
        }
        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::SetFailed(failed))
        }
    }

    fn apply_mtu(&self, name: &str, change: &Object) -> Result<()> {
        if let Some(mtu) = change.get_u32(ATTR_MTU)? {
            self.host.ip.set_mtu(name, mtu)?;
            info!("Set MTU of {} to {}", name, mtu);
        }
        Ok(())
    }

    fn apply_admin_status(&self, name: &str, change: &Object) -> Result<()> {
        if let Some(state) = change.get_i64(ATTR_ADMIN_STATUS)? {
            self.host.ip.set_admin_state(name, state)?;
            info!("Set admin state of {} to {}", name, state);
        }
        Ok(())
    }

    fn apply_mac(&self, name: &str, change: &Object) -> Result<()> {
        if let Some(mac) = change.get_str(ATTR_MAC_ADDRESS)? {
            self.host.ip.set_mac(name, mac)?;
            info!("Set MAC of {} to {}", name, mac);
        }
        Ok(())
    }
}

fn record_to_object(record: &InterfaceRecord) -> Object {
    let mut object = Object::new(TypeKey::InterfaceEntry)
        .with(ATTR_NAME, record.name.as_str())
        .with(ATTR_IFINDEX, record.index)
        .with(ATTR_ADMIN_STATUS, record.admin_state.code())
        .with(ATTR_OPER_STATUS, record.oper_state.code())
        .with(ATTR_TYPE, record.media_type.as_str());
    if let Some(mtu) = record.mtu {
        object.set(ATTR_MTU, mtu);
    }
    if let Some(mac) = &record.mac {
        object.set(ATTR_MAC_ADDRESS, mac.as_str());
    }
    object
}

impl Handler for InterfaceHandler {
    fn get(&self, filter: &Object, out: &mut Vec<Object>) -> Result<()> {
        for record in self.host.matching_interfaces(filter)? {
            out.push(record_to_object(&record));
        }
        Ok(())
    }

    fn transact(&self, operation: Operation, change: &mut Object) -> Result<()> {
        match operation {
            Operation::Create => self.create(change),
            Operation::Set => {
                let name = self.host.target(change)?;
                self.apply(&name, change)
            }
            Operation::Delete => self.delete(change),
            Operation::Get => Err(Error::Unsupported {
                operation: operation.to_string(),
                key: change.key.to_string(),
            }),
        }
    }
}
