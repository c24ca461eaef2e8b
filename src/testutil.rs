use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use anyhow::anyhow;

use crate::command::{CommandOutput, CommandRunner};
use crate::error::{Error, Result};
use crate::ifindex::IndexResolver;
use crate::inventory::Inventory;

#[derive(Default)]
struct FakeState {
    calls: Vec<String>,
    responses: HashMap<String, CommandOutput>,
}

/// Records every invocation and answers from a table keyed by the joined
/// argument list. Unknown invocations succeed with no output.
#[derive(Clone, Default)]
pub(crate) struct FakeRunner {
    state: Rc<RefCell<FakeState>>,
}

impl FakeRunner {
    pub(crate) fn respond(&self, args: &str, output: CommandOutput) {
        self.state
            .borrow_mut()
            .responses
            .insert(args.into(), output);
    }

    pub(crate) fn listing(&self, args: &str, stdout: &str) {
        self.respond(
            args,
            CommandOutput {
                status: Some(0),
                stdout: stdout.into(),
                stderr: String::new(),
            },
        );
    }

    pub(crate) fn fail(&self, args: &str, status: i32, stderr: &str) {
        self.respond(
            args,
            CommandOutput {
                status: Some(status),
                stdout: String::new(),
                stderr: stderr.into(),
            },
        );
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    // Calls other than listings.
    pub(crate) fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| !c.starts_with("addr show"))
            .collect()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, _program: &str, args: &[String]) -> Result<CommandOutput> {
        let joined = args.join(" ");
        let mut state = self.state.borrow_mut();
        state.calls.push(joined.clone());
        Ok(state
            .responses
            .get(&joined)
            .cloned()
            .unwrap_or(CommandOutput {
                status: Some(0),
                ..Default::default()
            }))
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeResolver {
    links: Rc<RefCell<Vec<(u32, String)>>>,
}

impl FakeResolver {
    pub(crate) fn with(links: &[(u32, &str)]) -> Self {
        let resolver = Self::default();
        for (index, name) in links {
            resolver.add(*index, name);
        }
        resolver
    }

    pub(crate) fn add(&self, index: u32, name: &str) {
        self.links.borrow_mut().push((index, name.into()));
    }
}

impl IndexResolver for FakeResolver {
    fn name_to_index(&self, name: &str) -> Result<u32> {
        self.links
            .borrow()
            .iter()
            .find(|(_, n)| n == name)
            .map(|(i, _)| *i)
            .ok_or_else(|| Error::Resolve(name.into()))
    }

    fn index_to_name(&self, index: u32) -> Result<String> {
        self.links
            .borrow()
            .iter()
            .find(|(i, _)| *i == index)
            .map(|(_, n)| n.clone())
            .ok_or_else(|| Error::Resolve(index.to_string()))
    }
}

pub(crate) enum FakeInventory {
    Mac(String),
    Empty,
    Unavailable,
    // No MAC, but counts lookups.
    Counted(Rc<Cell<usize>>),
}

impl Inventory for FakeInventory {
    fn base_mac(&self) -> anyhow::Result<Option<String>> {
        match self {
            FakeInventory::Mac(m) => Ok(Some(m.clone())),
            FakeInventory::Empty => Ok(None),
            FakeInventory::Unavailable => Err(anyhow!("inventory service not reachable")),
            FakeInventory::Counted(lookups) => {
                lookups.set(lookups.get() + 1);
                Ok(None)
            }
        }
    }
}

pub(crate) const LISTING: &str = "\
1: lo: <LOOPBACK,UP,LOWER_UP> mtu 65536 qdisc noqueue state UNKNOWN group default qlen 1000
    link/loopback 00:00:00:00:00:00 brd 00:00:00:00:00:00
    inet 127.0.0.1/8 scope host lo
       valid_lft forever preferred_lft forever
    inet6 ::1/128 scope host
       valid_lft forever preferred_lft forever
2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP group default qlen 1000
    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
    inet 10.0.2.15/24 brd 10.0.2.255 scope global dynamic eth0
       valid_lft 86313sec preferred_lft 86313sec
    inet 10.0.2.16/24 scope global secondary eth0
       valid_lft forever preferred_lft forever
    inet6 fe80::5054:ff:fe12:3456/64 scope link
       valid_lft forever preferred_lft forever
3: eth0.10@eth0: <BROADCAST,MULTICAST> mtu 1500 qdisc noop state DOWN group default qlen 1000
    link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff
";
