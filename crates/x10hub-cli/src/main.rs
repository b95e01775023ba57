//! Command-line interface for X10Hub shutter control.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use x10hub_devices::{
    CoverConfig, CoverEntity, CoverPosition, MochadCover, MochadHub, X10Address, X10HubConfig,
    setup_platform,
};

/// X10Hub - Control X10 shutters through a mochad controller.
#[derive(Parser, Debug)]
#[command(name = "x10hub")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Configuration file (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// mochad host (overrides config and X10HUB_HOST).
    #[arg(long, global = true)]
    host: Option<String>,

    /// mochad port (overrides config and X10HUB_PORT).
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON (also enabled by X10HUB_LOG_JSON=true).
    #[arg(long, global = true)]
    json_logs: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List configured covers.
    List,
    /// Open a cover.
    Open {
        /// X10 address, e.g. a1.
        address: String,
    },
    /// Close a cover.
    Close {
        /// X10 address, e.g. a1.
        address: String,
    },
    /// Move a cover to a position.
    Set {
        /// X10 address, e.g. a1.
        address: String,
        /// Target position, 0 (closed) to 100 (open).
        #[arg(value_parser = clap::value_parser!(u8).range(0..=100))]
        position: u8,
    },
    /// Query the on/off status the controller reports for a device.
    Status {
        /// X10 address, e.g. a1.
        address: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let json_logging = args.json_logs
        || std::env::var("X10HUB_LOG_JSON")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false);

    let default_directive = if args.verbose {
        "x10hub=debug,x10hub_devices=debug"
    } else {
        "x10hub=info,x10hub_devices=warn"
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .with_writer(std::io::stderr)
            .init();
    }

    let config = load_config(&args)?;

    match &args.command {
        Command::List => list_covers(&config, args.json),
        Command::Open { address } => {
            let cover = build_cover(&config, address).await?;
            cover.open_cover().await?;
            print_cover(&cover, args.json);
            Ok(())
        }
        Command::Close { address } => {
            let cover = build_cover(&config, address).await?;
            cover.close_cover().await?;
            print_cover(&cover, args.json);
            Ok(())
        }
        Command::Set { address, position } => {
            let cover = build_cover(&config, address).await?;
            cover.set_cover_position(CoverPosition::new(*position)?).await?;
            print_cover(&cover, args.json);
            Ok(())
        }
        Command::Status { address } => {
            let cover = build_cover(&config, address).await?;
            let on = cover.get_device_status().await?;
            if args.json {
                println!("{}", json!({ "name": cover.name(), "address": cover.address(), "on": on }));
            } else {
                println!("{}: {}", cover.name(), if on { "on" } else { "off" });
            }
            Ok(())
        }
    }
}

/// Resolve configuration: file, then environment, then flags.
fn load_config(args: &Args) -> Result<X10HubConfig> {
    let mut config = match &args.config {
        Some(path) => X10HubConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => X10HubConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(host) = &args.host {
        config.mochad.host = host.clone();
    }
    if let Some(port) = args.port {
        config.mochad.port = port;
    }
    Ok(config)
}

/// Connect to the controller and build the cover at `address`.
///
/// Covers missing from the config get default settings.
async fn build_cover(config: &X10HubConfig, address: &str) -> Result<MochadCover> {
    let address: X10Address = address.parse()?;
    let device = config
        .cover(address)
        .cloned()
        .unwrap_or_else(|| CoverConfig::new(address));

    debug!(host = %config.mochad.host, port = config.mochad.port, address = %address, "Connecting to mochad");
    let hub = MochadHub::connect(config).await?;
    setup_platform(&hub, std::slice::from_ref(&device))
        .pop()
        .and_then(Arc::into_inner)
        .context("Cover setup produced no entity")
}

fn list_covers(config: &X10HubConfig, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&config.covers)?);
        return Ok(());
    }

    if config.covers.is_empty() {
        println!("No covers configured.");
        return Ok(());
    }
    for cover in &config.covers {
        let name = cover
            .name
            .clone()
            .unwrap_or_else(|| format!("{}{}", x10hub_devices::cover::DEFAULT_NAME_PREFIX, cover.address));
        println!(
            "{:<6} {:<4} {}",
            cover.address.to_string(),
            cover.comm_type.unwrap_or_default().as_str(),
            name
        );
    }
    Ok(())
}

fn print_cover(cover: &MochadCover, as_json: bool) {
    let position = cover.current_cover_position();
    let closed = cover.is_closed();
    if as_json {
        println!(
            "{}",
            json!({
                "name": cover.name(),
                "address": cover.address(),
                "position": position,
                "closed": closed,
                "supported_features": cover.supported_features(),
            })
        );
    } else {
        let position = position.map_or_else(|| "unknown".to_string(), |p| p.to_string());
        let state = match closed {
            Some(true) => "closed",
            Some(false) => "open",
            None => "unknown",
        };
        println!("{}: position {} ({})", cover.name(), position, state);
    }
}
