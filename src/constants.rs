pub const DIR_PROC_SYS_NET: &str = "/proc/sys/net";
pub const DIR_SYS_CLASS_NET: &str = "/sys/class/net";

pub const FILE_CONFIG: &str = "/etc/ifagent/config.yaml";
pub const FILE_UEVENT: &str = "uevent";
pub const FILE_FORWARDING: &str = "forwarding";

pub const ENV_CONFIG: &str = "IFAGENT_CONFIG";

pub const IP_TOOL: &str = "/sbin/ip";

pub const LOOPBACK_NAME: &str = "lo";

pub const ATTR_ADDRESS: &str = "address";
pub const ATTR_ADMIN_STATUS: &str = "admin-status";
pub const ATTR_ENABLED: &str = "enabled";
pub const ATTR_FORWARDING: &str = "forwarding";
pub const ATTR_IFINDEX: &str = "ifindex";
pub const ATTR_IP: &str = "ip";
pub const ATTR_MAC_ADDRESS: &str = "mac-address";
pub const ATTR_MTU: &str = "mtu";
pub const ATTR_NAME: &str = "name";
pub const ATTR_OPER_STATUS: &str = "oper-status";
pub const ATTR_PREFIX_LENGTH: &str = "prefix-length";
pub const ATTR_TYPE: &str = "type";
pub const ATTR_VRF_ID: &str = "vrf-id";
