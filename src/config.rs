use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use log::{Level, debug};
use serde::Deserialize;

use crate::constants;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub ip_tool: Option<String>,
    pub sys_class_net: Option<String>,
    pub proc_sys_net: Option<String>,
    pub base_mac: Option<String>,
    pub debug: Option<bool>,
    pub log_level: Option<String>,
    pub legacy_forwarding_errors: Option<bool>,
}

impl Config {
    pub fn from_string(value: &str) -> Result<Self> {
        if value.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml2::from_str::<Config>(value).map_err(|e| anyhow!("unable to parse config: {}", e))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_string(&contents),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            Err(e) => Err(anyhow!("unable to read {:?}: {}", path, e)),
        }
    }

    pub fn load() -> Result<Self> {
        let path = env::var_os(constants::ENV_CONFIG)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(constants::FILE_CONFIG));
        Self::from_file(path)
    }

    pub fn ip_tool(&self) -> &str {
        self.ip_tool.as_deref().unwrap_or(constants::IP_TOOL)
    }

    pub fn sys_class_net(&self) -> &str {
        self.sys_class_net
            .as_deref()
            .unwrap_or(constants::DIR_SYS_CLASS_NET)
    }

    pub fn proc_sys_net(&self) -> &str {
        self.proc_sys_net
            .as_deref()
            .unwrap_or(constants::DIR_PROC_SYS_NET)
    }

    pub fn legacy_forwarding_errors(&self) -> bool {
        self.legacy_forwarding_errors.unwrap_or(false)
    }

    // An explicit log-level wins over debug.
    pub fn log_level(&self) -> Result<Level> {
        if let Some(level) = &self.log_level {
            return level
                .parse()
                .map_err(|_| anyhow!("invalid log level {:?}", level));
        }
        if self.debug.unwrap_or(false) {
            Ok(Level::Debug)
        } else {
            Ok(Level::Info)
        }
    }
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::*;

    macro_rules! case__config__from_string {
        ($name:ident, $input:expr, $expected:expr) => {
            #[test]
            fn $name() {
                let input: &str = $input;
                let expected: Option<Config> = $expected;
                let result = Config::from_string(input);
                match expected {
                    Some(config) => assert_eq!(config, result.unwrap()),
                    None => assert!(result.is_err()),
                }
            }
        };
    }

    case__config__from_string!(test_config_from_string_empty, "", Some(Config::default()));

    case__config__from_string!(
        test_config_from_string_full,
        r#"
ip-tool: /usr/sbin/ip
sys-class-net: /tmp/sys
proc-sys-net: /tmp/proc
base-mac: "52:54:00:00:00:01"
debug: true
log-level: warn
legacy-forwarding-errors: true
"#,
        Some(Config {
            ip_tool: Some("/usr/sbin/ip".into()),
            sys_class_net: Some("/tmp/sys".into()),
            proc_sys_net: Some("/tmp/proc".into()),
            base_mac: Some("52:54:00:00:00:01".into()),
            debug: Some(true),
            log_level: Some("warn".into()),
            legacy_forwarding_errors: Some(true),
        })
    );

    case__config__from_string!(
        test_config_from_string_partial,
        "debug: true\n",
        Some(Config {
            debug: Some(true),
            ..Default::default()
        })
    );

    case__config__from_string!(test_config_from_string_not_a_map, "- a\n- b\n", None);

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.ip_tool(), "/sbin/ip");
        assert_eq!(config.sys_class_net(), "/sys/class/net");
        assert_eq!(config.proc_sys_net(), "/proc/sys/net");
        assert!(!config.legacy_forwarding_errors());
        assert_eq!(config.log_level().unwrap(), Level::Info);
    }

    #[test]
    fn test_log_level() {
        let debug = Config {
            debug: Some(true),
            ..Default::default()
        };
        let explicit = Config {
            debug: Some(true),
            log_level: Some("error".into()),
            ..Default::default()
        };
        let bogus = Config {
            log_level: Some("loud".into()),
            ..Default::default()
        };
        assert_eq!(debug.log_level().unwrap(), Level::Debug);
        assert_eq!(explicit.log_level().unwrap(), Level::Error);
        assert!(bogus.log_level().is_err());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert_eq!(Config::from_file(&path).unwrap(), Config::default());

        let mut file = fs::File::create(&path).unwrap();
        file.write_all(b"ip-tool: /bin/ip\n").unwrap();
        assert_eq!(Config::from_file(&path).unwrap().ip_tool(), "/bin/ip");
    }
}
