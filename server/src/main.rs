use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use axum::routing::get;
use axum::Router;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use rummikub_protocol::{Event, Outbound};

mod command;
mod error;
mod game;
mod history;
mod hub;
mod local;
mod piece;
mod set;

use hub::{Hub, HubEvent};

const PING_PERIOD: Duration = Duration::from_secs(54);
const READ_DEADLINE: Duration = Duration::from_secs(60);

const DEFAULT_PLAYERS: usize = 5;
const DEFAULT_ADDR: &str = "0.0.0.0:9001";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let players = std::env::var("PLAYERS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_PLAYERS);

    if std::env::args().any(|arg| arg == "--local") {
        let stdin = std::io::stdin();
        return local::run(players, stdin.lock(), std::io::stdout());
    }

    let addr: SocketAddr = std::env::var("ADDR")
        .unwrap_or_else(|_| DEFAULT_ADDR.to_string())
        .parse()?;

    let (hub_tx, hub_rx) = unbounded_channel();
    tokio::spawn(Hub::new(players).run(hub_rx));

    let app = Router::new()
        .route("/", get(home))
        .route("/ws", get(ws_handler))
        .with_state(hub_tx);

    info!(%addr, players, "listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn home() -> Html<&'static str> {
    Html(include_str!("../assets/home.html"))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(hub): State<UnboundedSender<HubEvent>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, hub))
}

async fn handle_socket(socket: WebSocket, hub: UnboundedSender<HubEvent>) {
    let conn = Uuid::new_v4();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (out_tx, mut out_rx) = unbounded_channel::<Outbound>();

    if hub
        .send(HubEvent::Register { conn, tx: out_tx.clone() })
        .is_err()
    {
        return;
    }

    // Writer half: drains the coordinator's outbound queue and keeps the
    // peer alive with periodic pings.
    let writer = tokio::spawn(async move {
        let mut ping = tokio::time::interval(PING_PERIOD);
        ping.tick().await;
        loop {
            tokio::select! {
                frame = out_rx.recv() => match frame {
                    Some(frame) => {
                        if ws_tx.send(Message::Text(frame.into_text())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                },
                _ = ping.tick() => {
                    if ws_tx.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Reader half: a peer silent past the deadline is treated as gone.
    loop {
        let frame = match tokio::time::timeout(READ_DEADLINE, ws_rx.next()).await {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(err))) => {
                warn!(%conn, %err, "socket error");
                break;
            }
            Ok(None) => break,
            Err(_) => {
                warn!(%conn, "read deadline expired");
                break;
            }
        };
        match frame {
            Message::Text(text) => match serde_json::from_str::<Event>(&text) {
                Ok(event) => {
                    if hub.send(HubEvent::Command { conn, event }).is_err() {
                        break;
                    }
                }
                Err(_) => {
                    let _ = out_tx.send(Outbound::Notice("bad json".to_string()));
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    let _ = hub.send(HubEvent::Unregister { conn });
    writer.abort();
}
