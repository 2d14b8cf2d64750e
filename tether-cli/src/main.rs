use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::sync::Arc;
use std::time::Duration;
use tether_server::{
    InMemoryRoomDirectory, JwtVerifier, RelayConfig, SignalingRelay, mint_token,
    parse_bind_address, serve,
};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tether")]
#[command(bin_name = "tether")]
#[command(about = "WebRTC signaling relay")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the relay. Settings come from TETHER_* variables; flags override them.
    Serve {
        /// Listen address, e.g. 0.0.0.0:5000.
        #[arg(long)]
        bind: Option<String>,

        /// Room to register as active. Repeatable; added to TETHER_ROOMS.
        #[arg(long = "room")]
        rooms: Vec<String>,

        /// Log filter used when RUST_LOG is unset.
        #[arg(long, default_value = "info")]
        log: String,
    },

    /// Print a token for SUB signed with TETHER_JWT_SECRET.
    Token {
        #[arg(long)]
        sub: String,

        #[arg(long, default_value_t = 3600)]
        ttl_secs: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { bind, rooms, log } => {
            init_tracing(&log);

            let mut config = RelayConfig::from_env().context("Invalid configuration")?;
            if let Some(bind) = bind {
                config.bind_address = parse_bind_address(&bind)?;
            }
            config.rooms.extend(rooms);

            run_relay(config).await?;
        }
        Commands::Token { sub, ttl_secs } => {
            let config = RelayConfig::from_env().context("Invalid configuration")?;
            let token = mint_token(
                config.jwt_secret.as_bytes(),
                &sub,
                Duration::from_secs(ttl_secs),
            )
            .context("Failed to sign token")?;

            eprintln!(
                "{} {} {}",
                "Token for".green(),
                sub.bold(),
                format!("(valid {ttl_secs}s)").dimmed()
            );
            println!("{token}");
        }
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run_relay(config: RelayConfig) -> Result<()> {
    info!("Starting relay with {:?}", config);

    let directory = InMemoryRoomDirectory::with_active_rooms(config.rooms.iter().cloned());
    let verifier = JwtVerifier::new(config.jwt_secret.as_bytes(), config.jwt_leeway_secs);
    let relay = SignalingRelay::new(Arc::new(verifier), Arc::new(directory));

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_address))?;

    tokio::select! {
        result = serve(listener, relay) => result.context("Relay server failed")?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
