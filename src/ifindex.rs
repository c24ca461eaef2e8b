use log::debug;
use rustix::fd::OwnedFd;
use rustix::net::netdevice::{index_to_name, name_to_index};
use rustix::net::{AddressFamily, SocketType, socket};

use crate::error::{Error, Result};

pub trait IndexResolver {
    fn name_to_index(&self, name: &str) -> Result<u32>;
    fn index_to_name(&self, index: u32) -> Result<String>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemResolver;

impl SystemResolver {
    fn ioctl_socket() -> Result<OwnedFd> {
        socket(AddressFamily::INET, SocketType::DGRAM, None).map_err(|e| Error::Socket(e.into()))
    }
}

impl IndexResolver for SystemResolver {
    fn name_to_index(&self, name: &str) -> Result<u32> {
        let fd = Self::ioctl_socket()?;
        let index = name_to_index(&fd, name).map_err(|e| {
            debug!("unable to get index of {}: {}", name, e);
            Error::Resolve(name.into())
        })?;
        // The kernel reports unknown names as errors, but zero is never a valid index.
        if index == 0 {
            return Err(Error::Resolve(name.into()));
        }
        Ok(index)
    }

    fn index_to_name(&self, index: u32) -> Result<String> {
        let fd = Self::ioctl_socket()?;
        index_to_name(&fd, index).map_err(|e| {
            debug!("unable to get name of index {}: {}", index, e);
            Error::Resolve(index.to_string())
        })
    }
}
