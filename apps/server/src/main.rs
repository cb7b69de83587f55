use anyhow::Context;
use clap::{Parser, Subcommand};
use lobby_config::load as load_config;
use lobby_gateway::{build_router, GatewayState};
use lobby_runtime::{telemetry, ChatServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "lobby-server")]
#[command(about = "Room-based chat server (serves by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP and WebSocket server (default)
    Serve,
    /// Print the effective configuration as JSON
    PrintConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::PrintConfig => print_config(),
    }
}

async fn run_server() -> anyhow::Result<()> {
    telemetry::init_tracing().context("failed to initialise tracing")?;

    info!("starting lobby chat server");

    let config = load_config().context("failed to load configuration")?;

    let services =
        ChatServices::initialise(&config).context("failed to initialise chat services")?;

    let app = build_router(GatewayState::new(services.hub));

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(lobby_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("server shut down");
    Ok(())
}

fn print_config() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;
    let rendered =
        serde_json::to_string_pretty(&config).context("failed to render configuration")?;
    println!("{rendered}");
    Ok(())
}
