//! facebook-ads-mcp: MCP server for Facebook ads management
//!
//! Reads Facebook credentials from the environment, connects to the Graph
//! API and serves the ads tools over stdio.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use facebook_ads_mcp::config::{self, Config, Credentials};
use facebook_ads_mcp::graph::{AdsApi, GraphClient};
use facebook_ads_mcp::mcp::server::McpServer;
use facebook_ads_mcp::tools::Dispatcher;

/// MCP server exposing Facebook Marketing API tools.
///
/// Credentials are taken from `FACEBOOK_ACCESS_TOKEN`, `FACEBOOK_APP_ID`,
/// `FACEBOOK_APP_SECRET` and `FACEBOOK_ACCOUNT_ID`.
#[derive(Parser, Debug)]
#[command(name = "facebook-ads-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,

    /// Read the ad account once to verify credentials, then exit
    #[arg(long)]
    check: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // explicit "warn" arm
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Logs go to stderr; stdout carries protocol messages only.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load(args: &Args) -> Result<(Config, Credentials), String> {
    let config_path = args.config.as_deref();
    let cfg = config::load_config(config_path).map_err(|e| {
        match config::default_config_path().filter(|_| config_path.is_none()) {
            Some(default_path) => format!(
                "Configuration error: {e}\nDefault config location: {}",
                default_path.display()
            ),
            None => format!("Configuration error: {e}"),
        }
    })?;
    let credentials = Credentials::from_env().map_err(|e| format!("Configuration error: {e}"))?;
    Ok((cfg, credentials))
}

/// Reads a few account fields so a misconfigured token fails fast.
async fn check_account(api: &impl AdsApi, account_id: &str) -> Result<(), String> {
    let account = api
        .read(account_id, &["name", "account_status", "currency"])
        .await
        .map_err(|e| format!("Account check failed for {account_id}: {e}"))?;
    info!(
        account = account_id,
        name = ?account.get("name"),
        status = ?account.get("account_status"),
        currency = ?account.get("currency"),
        "Account reachable"
    );
    eprintln!("{account_id}: {account}");
    Ok(())
}

/// Entry point for the facebook-ads-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let (cfg, credentials) = match load(&args) {
        Ok(loaded) => loaded,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(get_log_level(args.verbose, args.quiet, &cfg.logging.level));

    // GPLv3 Section 5d notice
    eprintln!(
        "facebook-ads-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!();

    let client = match GraphClient::new(&cfg.graph, &credentials) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "Failed to initialise Graph API client");
            return ExitCode::FAILURE;
        }
    };
    info!(
        version = env!("CARGO_PKG_VERSION"),
        endpoint = client.endpoint(),
        "Graph API client ready"
    );

    let dispatcher = Dispatcher::new(client, credentials.account_id());

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    if args.check {
        let account_id = dispatcher.account_id().to_string();
        return match runtime.block_on(check_account(dispatcher.api(), &account_id)) {
            Ok(()) => ExitCode::SUCCESS,
            Err(message) => {
                error!("{message}");
                ExitCode::FAILURE
            }
        };
    }

    let mut server = McpServer::new(dispatcher);
    info!("MCP server ready, waiting for client connection...");

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
