use clap::Parser;
use log::info;
use server::config::ServerConfig;
use server::network::Server;
use std::time::Duration;

/// Two-player tic-tac-toe server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server IP address to bind to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Server port to listen on
    #[arg(short, long, default_value = "1337")]
    port: u16,

    /// Seconds the active player has to reply; waits forever when omitted
    #[arg(short, long)]
    turn_timeout: Option<u64>,

    /// Exit after this many games; serves forever when omitted
    #[arg(short, long)]
    games: Option<usize>,
}

/// Parses command-line arguments, binds the listener and serves games until
/// the game limit is reached or Ctrl+C is pressed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    // Parse command line arguments
    let args = Args::parse();

    // Build server configuration
    let config = ServerConfig {
        addr: format!("{}:{}", args.host, args.port),
        turn_timeout: args.turn_timeout.map(Duration::from_secs),
        max_games: args.games,
    };

    // Create network server
    let server = Server::bind(config).await?;

    // Serve games until done or interrupted
    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
