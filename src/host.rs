use log::{debug, warn};

use crate::command::IpTool;
use crate::error::{Error, Result};
use crate::ifindex::IndexResolver;
use crate::inventory::Inventory;
use crate::listing::{InterfaceRecord, parse_listing};
use crate::object::Object;
use crate::sysfs::Sysfs;

pub struct Host {
    pub ip: IpTool,
    pub sysfs: Sysfs,
    resolver: Box<dyn IndexResolver>,
    inventory: Box<dyn Inventory>,
}

impl Host {
    pub fn new(
        ip: IpTool,
        sysfs: Sysfs,
        resolver: Box<dyn IndexResolver>,
        inventory: Box<dyn Inventory>,
    ) -> Self {
        Self {
            ip,
            sysfs,
            resolver,
            inventory,
        }
    }

    /// Interface named by a request: the `name` attribute, else the name
    /// of `ifindex`. `None` if neither resolves.
    pub fn resolve_name(&self, object: &Object) -> Result<Option<String>> {
        if let Some(name) = object.name()? {
            return Ok(Some(name.into()));
        }
        let Some(index) = object.ifindex()? else {
            return Ok(None);
        };
        match self.resolver.index_to_name(index) {
            Ok(name) => Ok(Some(name)),
            Err(e) => {
                debug!("ifindex {} does not resolve: {}", index, e);
                Ok(None)
            }
        }
    }

    pub fn target(&self, object: &Object) -> Result<String> {
        self.resolve_name(object)?.ok_or(Error::NoTarget)
    }

    pub fn index_of(&self, name: &str) -> Result<u32> {
        self.resolver.name_to_index(name)
    }

    pub fn interfaces(&self, dev: Option<&str>) -> Result<Vec<InterfaceRecord>> {
        let output = self.ip.list(dev)?;
        parse_listing(&output, &self.sysfs)
    }

    pub fn matching_interfaces(&self, filter: &Object) -> Result<Vec<InterfaceRecord>> {
        let name = self.resolve_name(filter)?;
        Ok(self
            .interfaces(name.as_deref())?
            .into_iter()
            .filter(|r| filter.matches(&r.name, r.index))
            .collect())
    }

    // Best effort: inventory failures only cost us the default MAC.
    pub fn base_mac(&self) -> Option<String> {
        match self.inventory.base_mac() {
            Ok(mac) => mac,
            Err(e) => {
                warn!("unable to get base MAC from inventory: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::object::TypeKey;
    use crate::testutil::{FakeInventory, FakeResolver, FakeRunner, LISTING};

    pub(crate) fn host_with(
        runner: &FakeRunner,
        resolver: &FakeResolver,
        inventory: FakeInventory,
        sysfs: Sysfs,
    ) -> Host {
        Host::new(
            IpTool::new("/sbin/ip", Box::new(runner.clone())),
            sysfs,
            Box::new(resolver.clone()),
            Box::new(inventory),
        )
    }

    fn host(runner: &FakeRunner) -> Host {
        host_with(
            runner,
            &FakeResolver::with(&[(1, "lo"), (2, "eth0")]),
            FakeInventory::Empty,
            Sysfs::new("/nonexistent", "/nonexistent"),
        )
    }

    #[test]
    fn test_resolve_name_precedence() {
        let host = host(&FakeRunner::default());
        let both = Object::new(TypeKey::InterfaceEntry)
            .with("name", "eth1")
            .with("ifindex", 2);
        let index_only = Object::new(TypeKey::InterfaceEntry).with("ifindex", 2);
        let unknown_index = Object::new(TypeKey::InterfaceEntry).with("ifindex", 42);
        let neither = Object::new(TypeKey::InterfaceEntry);

        assert_eq!(host.resolve_name(&both).unwrap(), Some("eth1".into()));
        assert_eq!(host.resolve_name(&index_only).unwrap(), Some("eth0".into()));
        assert_eq!(host.resolve_name(&unknown_index).unwrap(), None);
        assert_eq!(host.resolve_name(&neither).unwrap(), None);
        assert!(matches!(host.target(&neither), Err(Error::NoTarget)));
    }

    #[test]
    fn test_matching_interfaces_scopes_listing() {
        let runner = FakeRunner::default();
        runner.listing("addr show", LISTING);
        let host = host(&runner);

        let all = host
            .matching_interfaces(&Object::new(TypeKey::Ipv4))
            .unwrap();
        assert_eq!(all.len(), 3);

        let by_index = host
            .matching_interfaces(&Object::new(TypeKey::Ipv4).with("ifindex", 42))
            .unwrap();
        assert!(by_index.is_empty());
        assert_eq!(runner.calls(), vec!["addr show", "addr show"]);
    }

    #[test]
    fn test_own_key_matches_exactly_one() {
        let runner = FakeRunner::default();
        for args in ["addr show", "addr show dev lo", "addr show dev eth0", "addr show dev eth0.10"] {
            runner.listing(args, LISTING);
        }
        let host = host(&runner);

        let records = host.interfaces(None).unwrap();
        assert_eq!(records.len(), 3);
        for record in &records {
            let filter = Object::new(TypeKey::InterfaceEntry)
                .with("name", record.name.as_str())
                .with("ifindex", record.index);
            assert_eq!(host.matching_interfaces(&filter).unwrap(), vec![record.clone()]);
        }
    }

    #[test]
    fn test_base_mac_swallows_inventory_errors() {
        let host = host_with(
            &FakeRunner::default(),
            &FakeResolver::default(),
            FakeInventory::Unavailable,
            Sysfs::default(),
        );
        assert_eq!(host.base_mac(), None);
    }
}
