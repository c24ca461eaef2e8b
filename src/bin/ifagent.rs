use std::process::exit;

use ifagent::agent;

fn main() {
    if let Err(e) = agent::run() {
        // Use eprintln! here in case logger does not initialize.
        eprintln!("ifagent failed: {}", e);
        exit(1);
    }
}
