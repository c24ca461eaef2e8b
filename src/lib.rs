pub mod addr;
pub mod agent;
pub mod command;
pub mod config;
pub mod constants;
pub mod error;
pub mod host;
pub mod ifindex;
pub mod interface;
pub mod inventory;
pub mod ip;
pub mod listing;
pub mod logger;
pub mod object;
pub mod router;
pub mod sysfs;

#[cfg(test)]
mod testutil;
