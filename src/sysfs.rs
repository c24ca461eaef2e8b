use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::debug;

use crate::addr::AddressFamily;
use crate::constants::{self, FILE_FORWARDING, FILE_UEVENT};
use crate::error::{Error, Result};
use crate::listing::MediaType;

const DELIM: &str = "=";
const DEVTYPE: &str = "DEVTYPE";
const DEVTYPE_BOND: &str = "bond";
const DEVTYPE_VLAN: &str = "vlan";

#[derive(Clone, Debug)]
pub struct Sysfs {
    sys_class_net: PathBuf,
    proc_sys_net: PathBuf,
}

impl Default for Sysfs {
    fn default() -> Self {
        Self::new(constants::DIR_SYS_CLASS_NET, constants::DIR_PROC_SYS_NET)
    }
}

impl Sysfs {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(sys_class_net: P, proc_sys_net: Q) -> Self {
        Self {
            sys_class_net: sys_class_net.as_ref().to_path_buf(),
            proc_sys_net: proc_sys_net.as_ref().to_path_buf(),
        }
    }

    // Any failure to read or interpret the uevent file means ethernet.
    pub fn device_type(&self, name: &str) -> MediaType {
        let path = self.sys_class_net.join(name).join(FILE_UEVENT);
        match File::open(&path) {
            Ok(f) => devtype_from_uevent(BufReader::new(f)),
            Err(e) => {
                debug!("unable to open {:?}, assuming ethernet: {}", path, e);
                MediaType::Ethernet
            }
        }
    }

    pub fn forwarding_path(&self, name: &str, family: AddressFamily) -> PathBuf {
        self.proc_sys_net
            .join(family.proc_name())
            .join("conf")
            .join(name)
            .join(FILE_FORWARDING)
    }

    pub fn forwarding(&self, name: &str, family: AddressFamily) -> Result<i64> {
        let path = self.forwarding_path(name, family);
        let contents = fs::read_to_string(&path).map_err(|e| Error::Io {
            path: path.clone(),
            source: e,
        })?;
        contents.trim().parse().map_err(|e| Error::Io {
            path,
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }

    pub fn set_forwarding(&self, name: &str, family: AddressFamily, value: i64) -> Result<()> {
        let path = self.forwarding_path(name, family);
        debug!("writing {} to {:?}", value, path);
        fs::write(&path, value.to_string()).map_err(|e| Error::Io { path, source: e })
    }
}

fn devtype_from_uevent<R: BufRead>(reader: R) -> MediaType {
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            break;
        }
        let Some((key, value)) = line.split_once(DELIM) else {
            continue;
        };
        if key == DEVTYPE {
            return match value {
                DEVTYPE_VLAN => MediaType::Vlan,
                DEVTYPE_BOND => MediaType::Bond,
                _ => MediaType::Ethernet,
            };
        }
    }
    MediaType::Ethernet
}
