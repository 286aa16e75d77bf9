//! evictctl - drive an evictcache instance from the command line

mod demo;
mod script;

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use evictcache::{Cache, CacheConfig, PolicyKind};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Eviction policy: lru or lfu (overrides the config file)
    #[arg(short, long)]
    policy: Option<PolicyKind>,

    /// Cache capacity in entries (overrides the config file)
    #[arg(short, long)]
    capacity: Option<usize>,

    /// JSON config file, e.g. {"capacity": 128, "policy": "lfu"}
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the capacity-2 LFU and LRU walkthroughs
    Demo,

    /// Replay a get/put/remove script against a fresh cache
    Replay {
        /// Script file, or "-" for stdin
        script: String,

        /// Print final statistics as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Config file (or defaults) with command-line overrides applied
fn resolve_config(args: &Args) -> Result<CacheConfig> {
    let mut config = match &args.config {
        Some(path) => CacheConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CacheConfig::default(),
    };

    if let Some(policy) = args.policy {
        config.policy = policy;
    }
    if let Some(capacity) = args.capacity {
        config.capacity = capacity;
    }
    Ok(config)
}

fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("failed to read script from stdin")?;
        Ok(text)
    } else {
        fs::read_to_string(source).with_context(|| format!("failed to read script {}", source))
    }
}

fn replay<W: Write>(config: &CacheConfig, text: &str, json: bool, out: &mut W) -> Result<()> {
    let commands = script::parse_script(text)?;
    let cache: Cache<String, String> = config.build();
    info!("Replaying {} commands", commands.len());

    script::run(&cache, &commands, out)?;

    let stats = cache.stats().snapshot();
    if json {
        writeln!(out, "{}", serde_json::to_string(&stats)?)?;
    } else {
        writeln!(
            out,
            "stats: len={} hits={} misses={} inserts={} updates={} evictions={} removals={} hit_ratio={:.3}",
            cache.len(),
            stats.hits,
            stats.misses,
            stats.inserts,
            stats.updates,
            stats.evictions,
            stats.removals,
            stats.hit_ratio
        )?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;
    let mut stdout = io::stdout().lock();

    match &args.command {
        Command::Demo => demo::run(&mut stdout)?,
        Command::Replay { script, json } => {
            info!("Cache capacity: {}", config.capacity);
            info!("Eviction policy: {}", config.policy);
            let text = read_script(script)?;
            replay(&config, &text, *json, &mut stdout)?;
        }
    }

    Ok(())
}
