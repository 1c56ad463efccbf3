//! Command-line driver for the neurostep engine.
//!
//! Builds a network from a spec file (or loads a saved one), drives its
//! training or forward computation for a number of unit steps, and optionally
//! saves the result.
//!
//!   cargo run -- --spec net.json --steps 10000
//!   cargo run -- --load trained.json --mode compute --pause-ms 200

use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use neurostep::train::ForwardPass;
use neurostep::{drive, DriveConfig, Network, NetworkSpec, TrainProcess};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    /// One forward pass, then stop.
    Compute,
    /// Alternate forward and backward passes until the step limit.
    Train,
}

#[derive(Parser, Debug)]
#[command(version, about = "Step through forward computation and backpropagation of a small network")]
struct Args {
    /// Network spec (JSON) to build a fresh network from.
    #[arg(long, conflicts_with = "load")]
    spec: Option<String>,

    /// Previously saved network document to resume from.
    #[arg(long)]
    load: Option<String>,

    /// Where to write the network document after the run.
    #[arg(long)]
    save: Option<String>,

    #[arg(long, value_enum, default_value_t = Mode::Train)]
    mode: Mode,

    /// Number of unit steps to take (training never ends on its own).
    #[arg(long, default_value_t = 1000)]
    steps: usize,

    /// Delay after each step, in milliseconds.
    #[arg(long, default_value_t = 0)]
    pause_ms: u64,

    /// Seed for the initial weights of a freshly built network.
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut network = load_network(&args)?;

    let config = DriveConfig::new(Some(args.steps))
        .with_pause(Duration::from_millis(args.pause_ms));
    let outcome = match args.mode {
        Mode::Compute => drive(&mut network, &mut ForwardPass::new(), &config),
        Mode::Train => drive(&mut network, &mut TrainProcess::new(), &config),
    };

    println!("steps: {}  ({:?})", outcome.steps, outcome.reason);
    println!("err:   {:.8}", outcome.err);
    println!("out:   {:?}", network.outputs());

    if let Some(path) = &args.save {
        network
            .save_json(path)
            .with_context(|| format!("saving network to {}", path))?;
    }
    Ok(())
}

fn load_network(args: &Args) -> anyhow::Result<Network> {
    if let Some(path) = &args.load {
        return Network::load_json(path).with_context(|| format!("loading network from {}", path));
    }
    let path = args
        .spec
        .as_deref()
        .context("either --spec or --load is required")?;
    let spec = NetworkSpec::load_json(path).with_context(|| format!("loading spec from {}", path))?;
    let network = match args.seed {
        Some(seed) => spec.build_with_rng(&mut StdRng::seed_from_u64(seed)),
        None => spec.build(),
    };
    Ok(network)
}
