use std::collections::HashMap;

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::command::parse_move;
use crate::game::Game;
use crate::history::History;
use rummikub_protocol::{Event, Outbound};

/// Everything the coordinator reacts to, fanned in over one mpsc channel from
/// the per-connection read tasks.
pub enum HubEvent {
    Register {
        conn: Uuid,
        tx: UnboundedSender<Outbound>,
    },
    Unregister {
        conn: Uuid,
    },
    Command {
        conn: Uuid,
        event: Event,
    },
}

struct Client {
    tx: UnboundedSender<Outbound>,
    seat: Option<usize>,
}

/// Single writer over the whole match. Owns the game, the turn history, and
/// the client registry; per-connection tasks only push events into the
/// channel and drain their outbound queue, so moves apply strictly in
/// arrival order with no locking.
pub struct Hub {
    game: Game,
    history: History,
    clients: HashMap<Uuid, Client>,
    capacity: usize,
    shuffled: bool,
    dealt: bool,
    started: bool,
}

impl Hub {
    pub fn new(capacity: usize) -> Hub {
        Hub {
            game: Game::new(capacity),
            history: History::new(),
            clients: HashMap::new(),
            capacity,
            shuffled: false,
            dealt: false,
            started: false,
        }
    }

    pub async fn run(mut self, mut rx: UnboundedReceiver<HubEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle(event);
        }
        info!("all connections closed, coordinator stopping");
    }

    pub(crate) fn handle(&mut self, event: HubEvent) {
        match event {
            HubEvent::Register { conn, tx } => self.register(conn, tx),
            HubEvent::Unregister { conn } => self.unregister(conn),
            HubEvent::Command { conn, event } => self.command(conn, event),
        }
    }

    fn free_seat(&self) -> Option<usize> {
        (0..self.capacity)
            .find(|seat| !self.clients.values().any(|client| client.seat == Some(*seat)))
    }

    fn roster_full(&self) -> bool {
        self.free_seat().is_none()
    }

    fn register(&mut self, conn: Uuid, tx: UnboundedSender<Outbound>) {
        let seat = self.free_seat();
        match seat {
            Some(seat) => {
                info!(%conn, seat, "player connected");
                let _ = tx.send(Outbound::Notice(format!("you are player {}", seat + 1)));
                if self.dealt {
                    let _ = tx.send(Outbound::Rack(
                        self.game.players()[seat].wire(self.game.arena()),
                    ));
                }
            }
            None => {
                info!(%conn, "spectator connected");
                let _ = tx.send(Outbound::Notice("you are a spectator".to_string()));
            }
        }
        let _ = tx.send(Outbound::Game(self.game.wire()));
        self.clients.insert(conn, Client { tx, seat });
    }

    fn unregister(&mut self, conn: Uuid) {
        if let Some(client) = self.clients.remove(&conn) {
            info!(%conn, seat = ?client.seat, "disconnected");
        }
    }

    fn command(&mut self, conn: Uuid, event: Event) {
        let Some(client) = self.clients.get(&conn) else {
            warn!(%conn, "command from unregistered connection");
            return;
        };
        let seat = client.seat;
        debug!(%conn, command = %event.command, input = %event.input, "event");

        match event.command.as_str() {
            "name" => self.rename(conn, seat, &event.input),
            "shuffle" | "deal" | "start" => self.admin(conn, seat, &event.command),
            "undo" => self.undo(seat),
            "end" | "done" => self.end_turn(conn, seat, &event.command),
            "combine" | "insert" | "remove" | "split" => {
                self.apply_move(conn, seat, &event.command, &event.input)
            }
            _ => self.notice_to(conn, "invalid command".to_string()),
        }
    }

    fn rename(&mut self, conn: Uuid, seat: Option<usize>, input: &str) {
        // Spectators have no player to rename.
        let Some(seat) = seat else { return };
        match parse_move(seat, "name", input) {
            Ok(mut command) => {
                // Renames always succeed and never enter the history.
                let _ = command.invoke(&mut self.game);
                let name = self.game.players()[seat].name().to_string();
                self.notice_to(conn, format!("your name has been set to: {}", name));
            }
            Err(err) => self.notice_to(conn, format!("error performing name: {}", err)),
        }
    }

    fn admin(&mut self, conn: Uuid, seat: Option<usize>, command: &str) {
        if seat.is_none() {
            return;
        }
        if !self.roster_full() {
            self.notice_to(conn, "waiting for more players".to_string());
            return;
        }
        let allowed = match command {
            "shuffle" => !self.shuffled,
            "deal" => self.shuffled && !self.dealt,
            "start" => self.dealt && !self.started,
            _ => false,
        };
        if !allowed {
            self.notice_to(conn, format!("cannot {} now", command));
            return;
        }
        match command {
            "shuffle" => {
                self.game.shuffle();
                self.shuffled = true;
                self.notice_all("the pool has been shuffled".to_string());
            }
            "deal" => {
                self.game.deal_pieces();
                self.dealt = true;
                self.broadcast();
            }
            "start" => {
                self.started = true;
                info!(players = self.capacity, "game started");
                let name = self.game.players()[self.game.current_player()]
                    .name()
                    .to_string();
                self.game.notify(format!("it is {}'s turn", name));
                self.broadcast();
            }
            _ => {}
        }
    }

    fn is_current(&self, seat: Option<usize>) -> bool {
        self.started && seat == Some(self.game.current_player())
    }

    fn undo(&mut self, seat: Option<usize>) {
        if !self.is_current(seat) {
            return;
        }
        if let Some(mut command) = self.history.pop() {
            command.undo(&mut self.game);
            self.broadcast();
        }
    }

    fn end_turn(&mut self, conn: Uuid, seat: Option<usize>, command: &str) {
        if !self.is_current(seat) {
            return;
        }
        match self.game.next_turn() {
            Ok(()) => {
                self.history.clear();
                self.broadcast();
            }
            Err(err) => {
                // The turn cannot stand; rewind every move back to its start.
                while let Some(mut undone) = self.history.pop() {
                    undone.undo(&mut self.game);
                }
                self.notice_to(conn, format!("error performing {}: {}", command, err));
                self.broadcast();
            }
        }
    }

    fn apply_move(&mut self, conn: Uuid, seat: Option<usize>, command: &str, input: &str) {
        if !self.started {
            self.notice_to(conn, "the game has not started".to_string());
            return;
        }
        // Out-of-turn moves and spectator moves are dropped without comment.
        if !self.is_current(seat) {
            return;
        }
        let seat = seat.unwrap_or_default();
        let result =
            parse_move(seat, command, input).and_then(|mut parsed| {
                parsed.invoke(&mut self.game).map(|()| parsed)
            });
        match result {
            Ok(parsed) => {
                self.history.push(parsed);
                self.broadcast();
            }
            Err(err) => {
                self.notice_to(conn, format!("error performing {}: {}", command, err));
            }
        }
    }

    /// Game snapshot to everyone, each seated client's own rack, and queued
    /// game notices to the current player.
    fn broadcast(&mut self) {
        let snapshot = self.game.wire();
        let notices = self.game.drain_notices();
        let current = self.game.current_player();
        for client in self.clients.values() {
            let _ = client.tx.send(Outbound::Game(snapshot.clone()));
            if let Some(seat) = client.seat {
                let _ = client.tx.send(Outbound::Rack(
                    self.game.players()[seat].wire(self.game.arena()),
                ));
                if seat == current {
                    for notice in &notices {
                        let _ = client.tx.send(Outbound::Notice(notice.clone()));
                    }
                }
            }
        }
    }

    fn notice_to(&self, conn: Uuid, message: String) {
        if let Some(client) = self.clients.get(&conn) {
            let _ = client.tx.send(Outbound::Notice(message));
        }
    }

    fn notice_all(&self, message: String) {
        for client in self.clients.values() {
            let _ = client.tx.send(Outbound::Notice(message.clone()));
        }
    }

    #[cfg(test)]
    pub(crate) fn game(&self) -> &Game {
        &self.game
    }

    #[cfg(test)]
    pub(crate) fn history_len(&self) -> usize {
        self.history.len()
    }
}
