use anyhow::Result;

use crate::addr::normalize_mac;

pub trait Inventory {
    fn base_mac(&self) -> Result<Option<String>>;
}

#[derive(Clone, Debug, Default)]
pub struct StaticInventory {
    base_mac: Option<String>,
}

impl StaticInventory {
    pub fn new(base_mac: Option<&str>) -> Result<Self> {
        let base_mac = base_mac.map(normalize_mac).transpose()?;
        Ok(Self { base_mac })
    }
}

impl Inventory for StaticInventory {
    fn base_mac(&self) -> Result<Option<String>> {
        Ok(self.base_mac.clone())
    }
}
