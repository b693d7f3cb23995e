use futures_util::{SinkExt, StreamExt};
use rummikub_protocol::{Event, GameSnapshot, RackSnapshot};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🁫 Rummikub CLI Client");
    println!("=====================");

    let url = std::env::var("URL").unwrap_or_else(|_| "ws://127.0.0.1:9001/ws".to_string());
    println!("🔗 Connecting to {}...", url);

    let (ws_stream, _) = connect_async(url).await?;
    println!("✅ Connected to server!");

    let (mut write, mut read) = ws_stream.split();

    tokio::spawn(async move {
        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => print_frame(&text),
                Ok(Message::Close(_)) => {
                    println!("🔌 Connection closed by server");
                    break;
                }
                Err(e) => {
                    println!("❌ WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }
    });

    println!("\n📋 Commands available:");
    println!("  name <name>               - Set your display name");
    println!("  shuffle / deal / start    - Set up the game (full table only)");
    println!("  combine r0 r1 r2 ...      - Lay rack/loose pieces as a new set");
    println!("  insert s0 r3 2            - Put a piece into a set at a position");
    println!("  remove s0 1               - Pull a piece out of a set");
    println!("  split s0 3                - Cut a set in two");
    println!("  undo                      - Take back your last move");
    println!("  end                       - Finish your turn");
    println!("  quit                      - Exit");
    println!("\nType commands and press Enter:");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line == "quit" {
            break;
        }

        let (command, input) = match line.split_once(char::is_whitespace) {
            Some((command, input)) => (command, input.trim()),
            None => (line, ""),
        };
        let json = serde_json::to_string(&Event::new(command, input))?;
        write.send(Message::Text(json)).await?;
    }

    println!("👋 Goodbye!");
    Ok(())
}

/// Snapshots come back as JSON, notices as plain text. Try the two snapshot
/// shapes in order and fall back to printing the line as-is.
fn print_frame(text: &str) {
    if let Ok(game) = serde_json::from_str::<GameSnapshot>(text) {
        println!("\n🎲 === BOARD ===");
        if game.board.is_empty() && game.piece.is_empty() {
            println!("  (empty)");
        }
        for (index, set) in game.board.iter().enumerate() {
            let pieces: Vec<String> = set.pieces.iter().map(|p| p.to_string()).collect();
            println!("  s{}: {}", index, pieces.join(" "));
        }
        if !game.piece.is_empty() {
            let loose: Vec<String> = game
                .piece
                .iter()
                .enumerate()
                .map(|(index, p)| format!("p{}={}", index, p))
                .collect();
            println!("  loose: {}", loose.join(" "));
        }
        println!("===============");
    } else if let Ok(rack) = serde_json::from_str::<RackSnapshot>(text) {
        let pieces: Vec<String> = rack
            .rack
            .iter()
            .enumerate()
            .map(|(index, p)| format!("r{}={}", index, p))
            .collect();
        println!("🃏 Your rack: {}", pieces.join(" "));
    } else {
        println!("ℹ️  {}", text);
    }
}
