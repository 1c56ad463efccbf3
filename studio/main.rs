/// neurostep Studio
///
/// A small HTTP front end for building a network, editing units by hand and
/// watching it compute and train one unit at a time over Server-Sent Events.
/// Served by a synchronous tiny_http server.
///
/// Run with:
///   cargo run --bin studio --release -- --addr 127.0.0.1:7878

mod state;
mod routes;
mod handlers;
mod util;

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use clap::Parser;
use tiny_http::Server;
use tracing_subscriber::EnvFilter;

use state::StudioState;

#[derive(Parser, Debug)]
#[command(name = "studio", about = "Step-by-step network studio")]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:7878")]
    addr: String,

    /// Persisted network document to open at startup.
    #[arg(long)]
    load: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let server = Server::http(args.addr.as_str())
        .map_err(|e| anyhow!("failed to bind {}: {}", args.addr, e))?;

    let mut studio = StudioState::new();
    if let Some(path) = &args.load {
        studio.install(neurostep::Network::load_json(path)?);
    }
    let shared_state = Arc::new(Mutex::new(studio));

    tracing::info!(addr = %args.addr, "studio listening");

    // Each request is dispatched on its own thread so the event stream
    // (which blocks for the whole run) does not stall edits and stops.
    for request in server.incoming_requests() {
        let state_clone = shared_state.clone();
        std::thread::spawn(move || {
            routes::dispatch(request, state_clone);
        });
    }
    Ok(())
}
