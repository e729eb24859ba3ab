// CLI entry point for the hexboard relay.
//
// Starts a standalone relay that board clients connect to. The relay only
// forwards opaque payloads between connections; it keeps no board state.
// See `server.rs` for the networking architecture and `session.rs` for the
// connection set.
//
// Logging goes through `env_logger`; set `RUST_LOG=debug` to see per-frame
// fan-out counts.

use std::sync::mpsc;

use clap::Parser;
use hexboard_relay::server::{RelayConfig, start_relay};

#[derive(Parser, Debug)]
#[command(name = "relay", version, about = "Fan-out relay for shared hexboard sessions")]
struct Args {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Listen port.
    #[arg(long, env = "HEXBOARD_PORT", default_value_t = 3000)]
    port: u16,

    /// Session name reported to clients in Welcome.
    #[arg(long, default_value = "hexboard")]
    name: String,

    /// Maximum simultaneous connections.
    #[arg(long, default_value_t = 16)]
    max_peers: u32,
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        RelayConfig {
            bind_host: args.host,
            port: args.port,
            session_name: args.name,
            max_peers: args.max_peers,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let (handle, addr) = match start_relay(args.into()) {
        Ok(result) => result,
        Err(e) => {
            log::error!("failed to start relay: {e}");
            std::process::exit(1);
        }
    };
    log::info!("relay ready on {addr}; press Ctrl+C to stop");

    let (stop_tx, stop_rx) = mpsc::channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    }) {
        log::error!("failed to install signal handler: {e}");
        std::process::exit(1);
    }

    let _ = stop_rx.recv();
    log::info!("shutting down");
    handle.stop();
}
