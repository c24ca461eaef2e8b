use std::process::Command;

use log::debug;

use crate::addr::mac_with_colons;
use crate::error::{Error, Result};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CommandOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    // Combined output, kept only for diagnostics.
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .chain(self.stderr.lines())
            .map(|l| l.trim_end().to_string())
            .filter(|l| !l.is_empty())
            .collect()
    }
}

pub trait CommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let output = Command::new(program)
            .args(args)
            .output()
            .map_err(|e| Error::Spawn {
                command: program.into(),
                source: e,
            })?;
        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

pub struct IpTool {
    path: String,
    runner: Box<dyn CommandRunner>,
}

impl IpTool {
    pub fn new<S: Into<String>>(path: S, runner: Box<dyn CommandRunner>) -> Self {
        Self {
            path: path.into(),
            runner,
        }
    }

    fn exec(&self, args: &[&str]) -> Result<CommandOutput> {
        let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        let command = format!("{} {}", self.path, args.join(" "));
        debug!("running {}", command);
        let output = self.runner.run(&self.path, &args)?;
        if output.success() {
            Ok(output)
        } else {
            let lines = output.lines();
            debug!("{} failed: {:?}", command, lines);
            Err(Error::CommandFailed {
                command,
                status: output.status,
                output: lines,
            })
        }
    }

    /// Output of `ip addr show`. When scoped to a device, a failed command
    /// means the device does not exist and yields an empty listing.
    pub fn list(&self, dev: Option<&str>) -> Result<String> {
        match dev {
            None => Ok(self.exec(&["addr", "show"])?.stdout),
            Some(name) => match self.exec(&["addr", "show", "dev", name]) {
                Ok(output) => Ok(output.stdout),
                Err(Error::CommandFailed { .. }) => Ok(String::new()),
                Err(e) => Err(e),
            },
        }
    }

    pub fn link_add_dummy(&self, name: &str, mac: Option<&str>) -> Result<()> {
        let mac = mac.map(mac_with_colons).transpose()?;
        let mut args = vec!["link", "add", "name", name];
        if let Some(m) = &mac {
            args.extend(["address", m.as_str()]);
        }
        args.extend(["type", "dummy"]);
        self.exec(&args).map(|_| ())
    }

    pub fn link_delete(&self, name: &str) -> Result<()> {
        self.exec(&["link", "delete", "dev", name]).map(|_| ())
    }

    pub fn set_mtu(&self, name: &str, mtu: u32) -> Result<()> {
        self.exec(&["link", "set", name, "mtu", &mtu.to_string()])
            .map(|_| ())
    }

    pub fn set_mac(&self, name: &str, mac: &str) -> Result<()> {
        let mac = mac_with_colons(mac)?;
        self.exec(&["link", "set", "dev", name, "address", &mac])
            .map(|_| ())
    }

    // 0 is up, anything else is down.
    pub fn set_admin_state(&self, name: &str, state: i64) -> Result<()> {
        let state = if state == 0 { "up" } else { "down" };
        self.exec(&["link", "set", "dev", name, state]).map(|_| ())
    }

    pub fn addr_add(&self, addr_and_prefix: &str, name: &str) -> Result<()> {
        self.exec(&["addr", "add", addr_and_prefix, "dev", name])
            .map(|_| ())
    }

    pub fn addr_del(&self, addr_and_prefix: &str, name: &str) -> Result<()> {
        self.exec(&["addr", "del", addr_and_prefix, "dev", name])
            .map(|_| ())
    }
}
