use std::env;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow};
use crossbeam::channel::{Receiver, Select, Sender, TryRecvError, bounded, unbounded};
use log::{debug, error, info};
use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::iterator::Signals;

use crate::command::{IpTool, SystemRunner};
use crate::config::Config;
use crate::host::Host;
use crate::ifindex::SystemResolver;
use crate::interface::InterfaceHandler;
use crate::inventory::StaticInventory;
use crate::ip::IpHandler;
use crate::logger::init_logger;
use crate::object::{Object, Operation, Request, Response, TypeKey};
use crate::router::Router;
use crate::sysfs::Sysfs;

const IDLE_TICK: Duration = Duration::from_secs(1);

pub fn run() -> Result<()> {
    let config = Config::load()?;
    init_logger(config.log_level()?).map_err(|e| anyhow!("unable to initialize logger: {}", e))?;
    debug!("Loaded config: {:?}", config);

    let router = build_router(&config)?;
    let args: Vec<String> = env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None => serve(&router),
        Some("dump") => dump(&router, args.get(1).map(String::as_str), &mut io::stdout()),
        Some(other) => Err(anyhow!("unknown command {:?}", other)),
    }
}

fn build_router(config: &Config) -> Result<Router> {
    let host = Host::new(
        IpTool::new(config.ip_tool(), Box::new(SystemRunner)),
        Sysfs::new(config.sys_class_net(), config.proc_sys_net()),
        Box::new(SystemResolver),
        Box::new(StaticInventory::new(config.base_mac.as_deref())?),
    );
    Ok(router_for(Rc::new(host), config.legacy_forwarding_errors()))
}

fn router_for(host: Rc<Host>, legacy_forwarding_errors: bool) -> Router {
    Router::new()
        .register(
            &[TypeKey::InterfaceEntry],
            Rc::new(InterfaceHandler::new(host.clone())),
        )
        .register(
            &[
                TypeKey::Ipv4,
                TypeKey::Ipv6,
                TypeKey::Ipv4Address,
                TypeKey::Ipv6Address,
            ],
            Rc::new(IpHandler::new(host, legacy_forwarding_errors)),
        )
}

fn handle_line(router: &Router, line: &str) -> Result<String> {
    let response = match serde_json::from_str::<Request>(line) {
        Ok(request) => router.dispatch(request),
        Err(e) => {
            error!("Unable to parse request: {}", e);
            Response {
                success: false,
                error: Some(format!("invalid request: {}", e)),
                ..Default::default()
            }
        }
    };
    Ok(serde_json::to_string(&response)?)
}

fn dump<W: Write>(router: &Router, selector: Option<&str>, out: &mut W) -> Result<()> {
    let key = match selector.unwrap_or("ipv4") {
        "ipv4" => TypeKey::Ipv4,
        "ipv6" => TypeKey::Ipv6,
        "interfaces" => TypeKey::InterfaceEntry,
        other => return Err(anyhow!("unknown dump selector {:?}", other)),
    };
    let response = router.dispatch(Request {
        operation: Operation::Get,
        object: Object::new(key),
    });
    if !response.success {
        return Err(anyhow!(
            "unable to get {}: {}",
            key,
            response.error.unwrap_or_default()
        ));
    }
    for object in &response.objects {
        writeln!(out, "{}", serde_json::to_string(object)?)?;
    }
    Ok(())
}

fn read_lines<R: BufRead>(reader: R, tx: Sender<String>) {
    for line in reader.lines() {
        match line {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Unable to read request: {}", e);
                break;
            }
        }
    }
    debug!("Request reader finished");
}

fn serve(router: &Router) -> Result<()> {
    let (line_tx, line_rx) = unbounded();
    let (signal_tx, signal_rx) = bounded(1);

    let mut signals = Signals::new([SIGTERM, SIGINT])
        .map_err(|e| anyhow!("unable to register signal handler: {}", e))?;
    let signals_handle = signals.handle();
    thread::spawn(move || {
        if let Some(signal) = signals.forever().next() {
            let _ = signal_tx.send(signal);
        }
    });
    thread::spawn(move || read_lines(io::stdin().lock(), line_tx));

    info!("Serving {} object types", router.keys().len());
    let result = serve_loop(router, &line_rx, &signal_rx, &mut io::stdout());
    signals_handle.close();
    result
}

// Requests are handled to completion one at a time. The loop wakes on a
// request, a signal, or the idle tick, and ends when input closes.
fn serve_loop<W: Write>(
    router: &Router,
    lines: &Receiver<String>,
    signals: &Receiver<i32>,
    out: &mut W,
) -> Result<()> {
    let mut select = Select::new();
    let line_index = select.recv(lines);
    let signal_index = select.recv(signals);

    loop {
        let index = match select.ready_timeout(IDLE_TICK) {
            Ok(index) => index,
            Err(_) => continue,
        };
        if index == line_index {
            match lines.try_recv() {
                Ok(line) => {
                    let response = handle_line(router, &line)?;
                    writeln!(out, "{}", response)?;
                    out.flush()?;
                }
                Err(TryRecvError::Empty) => continue,
                Err(TryRecvError::Disconnected) => {
                    info!("Input closed, exiting");
                    return Ok(());
                }
            }
        } else if index == signal_index {
            match signals.try_recv() {
                Ok(signal) => {
                    info!("Received signal {}, exiting", signal);
                    return Ok(());
                }
                Err(TryRecvError::Empty) => continue,
                // The signal thread has gone away; keep serving requests.
                Err(TryRecvError::Disconnected) => select.remove(signal_index),
            }
        }
    }
}
