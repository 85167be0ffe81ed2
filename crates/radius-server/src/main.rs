use clap::Parser;
use radius_server::{Config, RadiusServer};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// RFC 2865 RADIUS Authentication Server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "radius-server")]
struct Cli {
    /// Path to configuration file
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config_path: PathBuf,

    /// Validate configuration and exit (doesn't start server)
    #[arg(short, long)]
    validate: bool,
}

fn print_summary(config: &Config) {
    println!("Configuration summary:");
    println!("  Listen: {}:{}", config.listen_address, config.listen_port);
    println!("  Log level: {}", config.log_level.as_deref().unwrap_or("info"));
    println!("  Concurrency: {}", config.concurrency);
    println!("  Duplicate window: {} ms", config.duplicate_timeout_ms);
    println!("  Unknown attributes: {}", if config.skip_unknown_attributes { "skip" } else { "reject" });
    println!("  Users: {}", config.users.len());
    println!();

    if config.nas.is_empty() {
        println!("WARNING: No NAS configured, every request will be discarded");
        return;
    }

    println!("Configured NAS:");
    for nas in &config.nas {
        println!("  {} - {} ({})", nas.short_name, nas.address.value, nas.address.kind);
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_file(&cli.config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", cli.config_path.display(), e);
            process::exit(1);
        }
    };

    if cli.validate {
        println!("Configuration validated successfully");
        println!();
        print_summary(&config);
        process::exit(0);
    }

    let log_level = config.log_level.as_deref().unwrap_or("info");
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("RADIUS server v{}", env!("CARGO_PKG_VERSION"));
    info!("Loaded configuration from: {}", cli.config_path.display());
    if config.nas.is_empty() {
        warn!("No NAS configured, every request will be discarded");
    }

    let server = match RadiusServer::from_config(&config) {
        Ok(server) => server,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    if server.start().await.is_err() {
        process::exit(1);
    }
    info!("Press Ctrl+C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }

    info!("Shutting down");
    if let Err(e) = server.stop().await {
        error!("Server error: {}", e);
        process::exit(1);
    }
}
