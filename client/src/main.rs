use clap::Parser;
use client::network::Client;
use client::rendering::render;
use log::info;
use shared::DEFAULT_SERVER_ADDR;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short = 's', long, default_value = DEFAULT_SERVER_ADDR)]
    server: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();

    let (mut client, welcome) = Client::connect(&args.server).await?;
    print!("{}", render(&welcome));

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = std::io::stdout();

    let last = client.run(&mut input, &mut stdout).await?;
    info!("Game over for player {}: {}", client.player_id(), last.message);

    Ok(())
}
