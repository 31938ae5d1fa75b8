use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tunewire_gateway::{Gateway, GatewayConfig};

/// Real-time presence and listening-activity gateway
#[derive(Debug, Parser)]
#[command(name = "tunewire-gateway", version)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, default_value_t = 5000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tunewire_gateway=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = GatewayConfig {
        host: cli.host,
        port: cli.port,
        ..GatewayConfig::default()
    };

    info!("Starting Tunewire presence gateway");
    Gateway::new(config).start().await
}
