//! Bot client that plays random legal moves against a running server

use clap::Parser;
use rand::seq::SliceRandom;
use shared::{
    decode_line, encode_line, ClientResponse, ServerMessage, BOARD_SIZE, DEFAULT_SERVER_ADDR,
};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::sleep;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to connect to
    #[arg(short, long, default_value = DEFAULT_SERVER_ADDR)]
    server: String,

    /// Pause before each move, in milliseconds
    #[arg(short, long, default_value = "250")]
    delay_ms: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let stream = TcpStream::connect(&args.server).await?;
    println!("Connected to {}", args.server);

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    let Some(line) = lines.next_line().await? else {
        return Err("server closed the connection during handshake".into());
    };
    let welcome: ServerMessage = decode_line(&line)?;
    if !welcome.ok {
        return Err(welcome.message.into());
    }
    let player_id = welcome.player_id;
    println!("Joined as player {}: {}", player_id, welcome.message);

    while let Some(line) = lines.next_line().await? {
        let msg: ServerMessage = decode_line(&line)?;
        print!("{}", msg.board);
        println!("{}", msg.message);

        if !msg.ok {
            break;
        }

        let open: Vec<(i64, i64)> = (0..BOARD_SIZE as i64)
            .flat_map(|row| (0..BOARD_SIZE as i64).map(move |col| (row, col)))
            .filter(|(row, col)| msg.board.is_legal_move(*row, *col))
            .collect();

        let reply = match open.choose(&mut rand::thread_rng()) {
            Some((row, col)) => ClientResponse::new(*row, *col, player_id),
            None => ClientResponse::leave(player_id),
        };

        sleep(Duration::from_millis(args.delay_ms)).await;
        println!("Playing ({}, {})", reply.row, reply.col);
        writer.write_all(encode_line(&reply)?.as_bytes()).await?;
    }

    println!("Test client finished");
    Ok(())
}
