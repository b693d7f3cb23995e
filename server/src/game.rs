use crate::error::MoveError;
use crate::piece::{PieceArena, PieceId};
use crate::set::TileSet;
use rand::seq::SliceRandom;
use rummikub_protocol::{GameSnapshot, RackSnapshot};
use tracing::debug;

/// Tiles dealt to each player at game start.
pub const RACK_SIZE: usize = 14;

/// Minimum total value of the set that opens the board.
pub const FIRST_MELD_MIN: u32 = 30;

#[derive(Debug, Clone)]
pub struct Player {
    name: Option<String>,
    rack: Vec<PieceId>,
}

impl Player {
    fn new() -> Player {
        Player { name: None, rack: Vec::new() }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("Player")
    }

    pub fn set_name(&mut self, name: String) {
        self.name = Some(name);
    }

    /// Accepts `None` silently so a draw from an empty pool is a no-op.
    pub fn deal_piece(&mut self, piece: Option<PieceId>) {
        if let Some(piece) = piece {
            self.rack.push(piece);
        }
    }

    pub fn piece(&self, index: usize) -> Result<PieceId, MoveError> {
        self.rack.get(index).copied().ok_or(MoveError::PieceSelection)
    }

    /// Removes the first rack occurrence of each given id; ids not on the
    /// rack are skipped.
    pub fn remove_pieces(&mut self, pieces: &[PieceId]) {
        for piece in pieces {
            if let Some(index) = self.rack.iter().position(|id| id == piece) {
                self.rack.remove(index);
            }
        }
    }

    pub fn rack(&self) -> &[PieceId] {
        &self.rack
    }

    pub fn score(&self, arena: &PieceArena) -> u32 {
        self.rack.iter().map(|id| arena.get(*id).value() as u32).sum()
    }

    fn snapshot_rack(&self) -> Vec<PieceId> {
        self.rack.clone()
    }

    fn restore_rack(&mut self, rack: Vec<PieceId>) {
        self.rack = rack;
    }

    pub fn wire(&self, arena: &PieceArena) -> RackSnapshot {
        RackSnapshot {
            rack: self.rack.iter().map(|id| arena.get(*id).wire()).collect(),
        }
    }
}

/// Everything a command must capture to be undone: the board sets and the
/// loose pieces. Racks are snapshotted separately by the commands that touch
/// them.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    board: Vec<TileSet>,
    loose: Vec<PieceId>,
}

/// One match: the interned tile faces, the undealt pool, the shared board,
/// and the seated players. All mutation goes through the owning coordinator,
/// one command at a time.
#[derive(Debug)]
pub struct Game {
    arena: PieceArena,
    pool: Vec<PieceId>,
    board: Vec<TileSet>,
    loose: Vec<PieceId>,
    players: Vec<Player>,
    current: usize,
    first_meld_done: bool,
    turn_start_rack: usize,
    notices: Vec<String>,
}

impl Game {
    pub fn new(player_count: usize) -> Game {
        let arena = PieceArena::standard();
        let pool = arena.ids().collect();
        Game {
            arena,
            pool,
            board: Vec::new(),
            loose: Vec::new(),
            players: (0..player_count).map(|_| Player::new()).collect(),
            current: 0,
            first_meld_done: false,
            turn_start_rack: 0,
            notices: Vec::new(),
        }
    }

    pub fn arena(&self) -> &PieceArena {
        &self.arena
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&mut self, seat: usize) -> &mut Player {
        &mut self.players[seat]
    }

    pub fn current_player(&self) -> usize {
        self.current
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    pub fn shuffle(&mut self) {
        self.pool.shuffle(&mut rand::thread_rng());
    }

    pub fn deal_pieces(&mut self) {
        for seat in 0..self.players.len() {
            for _ in 0..RACK_SIZE {
                let piece = self.take_piece();
                self.players[seat].deal_piece(piece);
            }
        }
        self.turn_start_rack = self.players[self.current].rack().len();
        debug!(pool = self.pool.len(), "dealt racks");
    }

    pub fn take_piece(&mut self) -> Option<PieceId> {
        self.pool.pop()
    }

    // ---- board access ----

    pub fn board(&self) -> &[TileSet] {
        &self.board
    }

    pub fn set_at(&self, index: usize) -> Result<&TileSet, MoveError> {
        self.board.get(index).ok_or(MoveError::SetSelection)
    }

    pub fn add_set(&mut self, set: TileSet) {
        self.board.push(set);
    }

    /// Swaps the set at `index` for `replacement`, dropping it entirely when
    /// the replacement is empty.
    pub fn replace_set(&mut self, index: usize, replacement: TileSet) -> Result<(), MoveError> {
        if index >= self.board.len() {
            return Err(MoveError::SetSelection);
        }
        if replacement.is_empty() {
            self.board.remove(index);
        } else {
            self.board[index] = replacement;
        }
        Ok(())
    }

    pub fn loose_pieces(&self) -> &[PieceId] {
        &self.loose
    }

    pub fn loose_piece(&self, index: usize) -> Result<PieceId, MoveError> {
        self.loose.get(index).copied().ok_or(MoveError::PieceSelection)
    }

    pub fn add_loose_piece(&mut self, piece: PieceId) {
        self.loose.push(piece);
    }

    pub fn remove_loose(&mut self, piece: PieceId) -> Result<(), MoveError> {
        let index = self
            .loose
            .iter()
            .position(|id| *id == piece)
            .ok_or(MoveError::PieceSelection)?;
        self.loose.remove(index);
        Ok(())
    }

    /// A board is confirmable when every set passes validation and no loose
    /// pieces remain unattached.
    pub fn is_valid_board(&self) -> bool {
        self.loose.is_empty() && self.board.iter().all(|set| set.is_valid(&self.arena))
    }

    fn board_has_joker(&self) -> bool {
        self.board.iter().any(|set| set.jokers(&self.arena) > 0)
            || self.loose.iter().any(|id| self.arena.get(*id).is_joker())
    }

    fn first_meld_satisfied(&self) -> bool {
        !self.board_has_joker()
            && self
                .board
                .iter()
                .any(|set| set.size(&self.arena) >= FIRST_MELD_MIN)
    }

    /// Confirms the current turn and passes play to the next seat. Fails
    /// without advancing when the board is invalid or the opening meld falls
    /// short; the caller decides what to unwind.
    pub fn next_turn(&mut self) -> Result<(), MoveError> {
        if !self.is_valid_board() {
            return Err(MoveError::InvalidBoard);
        }
        if !self.first_meld_done {
            if self.board.is_empty() {
                // Nothing melded yet; the player passes and draws below.
            } else if self.first_meld_satisfied() {
                self.first_meld_done = true;
            } else {
                return Err(MoveError::FirstMeld);
            }
        }
        let player = &mut self.players[self.current];
        if player.rack().len() >= self.turn_start_rack {
            let piece = self.pool.pop();
            player.deal_piece(piece);
        }
        self.current = (self.current + 1) % self.players.len();
        self.turn_start_rack = self.players[self.current].rack().len();
        let name = self.players[self.current].name().to_string();
        self.notify(format!("it is {}'s turn", name));
        Ok(())
    }

    // ---- notices ----

    pub fn notify(&mut self, message: String) {
        self.notices.push(message);
    }

    pub fn drain_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    // ---- snapshots ----

    /// Captures board sets and loose pieces only; racks and turn bookkeeping
    /// belong to whoever mutates them.
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            board: self.board.clone(),
            loose: self.loose.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: BoardSnapshot) {
        self.board = snapshot.board;
        self.loose = snapshot.loose;
    }

    pub fn snapshot_rack(&self, seat: usize) -> Vec<PieceId> {
        self.players[seat].snapshot_rack()
    }

    pub fn restore_rack(&mut self, seat: usize, rack: Vec<PieceId>) {
        self.players[seat].restore_rack(rack);
    }

    pub fn wire(&self) -> GameSnapshot {
        GameSnapshot {
            board: self.board.iter().map(|set| set.wire(&self.arena)).collect(),
            piece: self
                .loose
                .iter()
                .map(|id| self.arena.get(*id).wire())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::piece::DECK_SIZE;

    fn game_with_board(player_count: usize, sets: Vec<Vec<usize>>) -> Game {
        let mut game = Game::new(player_count);
        let ids: Vec<PieceId> = game.arena.ids().collect();
        for set in sets {
            let tiles = set.into_iter().map(|i| ids[i]).collect();
            game.add_set(TileSet::combine(tiles));
        }
        game
    }

    // Arena layout: deck one is black 1..13 (0..=12), blue (13..=25),
    // red (26..=38), green (39..=51), joker (52); deck two repeats at +53.

    #[test]
    fn deal_leaves_expected_pool() {
        let mut game = Game::new(3);
        game.shuffle();
        game.deal_pieces();
        for player in game.players() {
            assert_eq!(player.rack().len(), RACK_SIZE);
        }
        assert_eq!(game.pool_len(), DECK_SIZE - 3 * RACK_SIZE);
    }

    #[test]
    fn take_piece_drains_then_yields_none() {
        let mut game = Game::new(2);
        for _ in 0..DECK_SIZE {
            assert!(game.take_piece().is_some());
        }
        assert!(game.take_piece().is_none());

        let mut player = Player::new();
        player.deal_piece(None);
        assert!(player.rack().is_empty());
    }

    #[test]
    fn remove_pieces_skips_missing_ids() {
        let mut game = Game::new(2);
        let ids: Vec<PieceId> = game.arena.ids().collect();
        let player = game.player(0);
        player.deal_piece(Some(ids[0]));
        player.deal_piece(Some(ids[1]));
        player.remove_pieces(&[ids[0], ids[5]]);
        assert_eq!(player.rack(), &[ids[1]]);
    }

    #[test]
    fn player_score_ignores_jokers() {
        let mut game = Game::new(1);
        let ids: Vec<PieceId> = game.arena.ids().collect();
        let arena = game.arena.clone();
        let player = game.player(0);
        player.deal_piece(Some(ids[4])); // black 5
        player.deal_piece(Some(ids[52])); // joker
        assert_eq!(player.score(&arena), 5);
    }

    #[test]
    fn board_validity_requires_no_loose_pieces() {
        // black 10, blue 10, red 10: a 30-point group.
        let mut game = game_with_board(2, vec![vec![9, 22, 35]]);
        assert!(game.is_valid_board());

        let ids: Vec<PieceId> = game.arena.ids().collect();
        game.add_loose_piece(ids[0]);
        assert!(!game.is_valid_board());
        game.remove_loose(ids[0]).unwrap();
        assert!(game.is_valid_board());
    }

    #[test]
    fn next_turn_rejects_invalid_board() {
        let mut game = game_with_board(2, vec![vec![0, 1]]);
        assert_eq!(game.next_turn(), Err(MoveError::InvalidBoard));
        assert_eq!(game.current_player(), 0);
    }

    #[test]
    fn first_meld_gate() {
        // black 5, blue 5, red 5: valid but only 15 points.
        let mut game = game_with_board(2, vec![vec![4, 17, 30]]);
        assert_eq!(game.next_turn(), Err(MoveError::FirstMeld));

        // black 10, blue 10, red 10 opens the board.
        let mut game = game_with_board(2, vec![vec![9, 22, 35]]);
        assert!(game.next_turn().is_ok());
        assert!(game.first_meld_done);

        // Once open, a 15-point set is fine.
        game.add_set(TileSet::combine({
            let ids: Vec<PieceId> = game.arena.ids().collect();
            vec![ids[4], ids[17], ids[30]]
        }));
        assert!(game.next_turn().is_ok());
    }

    #[test]
    fn first_meld_rejects_joker_anywhere() {
        // black 12, blue 12, joker: 24 points and a joker.
        let mut game = game_with_board(2, vec![vec![11, 24, 52]]);
        assert_eq!(game.next_turn(), Err(MoveError::FirstMeld));

        // A qualifying set does not help while a joker sits elsewhere.
        let mut game = game_with_board(2, vec![vec![9, 22, 35], vec![11, 24, 52]]);
        assert_eq!(game.next_turn(), Err(MoveError::FirstMeld));
    }

    #[test]
    fn pass_draws_a_piece() {
        let mut game = Game::new(2);
        game.deal_pieces();
        let before = game.players()[0].rack().len();
        let pool_before = game.pool_len();
        assert!(game.next_turn().is_ok());
        assert_eq!(game.players()[0].rack().len(), before + 1);
        assert_eq!(game.pool_len(), pool_before - 1);
        assert_eq!(game.current_player(), 1);
    }

    #[test]
    fn melding_skips_the_draw() {
        let mut game = Game::new(2);
        game.deal_pieces();
        let ids: Vec<PieceId> = game.arena.ids().collect();
        // Simulate playing three tiles from the rack onto the board.
        let rack: Vec<PieceId> = game.players()[0].rack().to_vec();
        game.player(0).remove_pieces(&rack[..3].to_vec());
        game.add_set(TileSet::combine(vec![ids[9], ids[22], ids[35]]));
        let pool_before = game.pool_len();
        assert!(game.next_turn().is_ok());
        assert_eq!(game.players()[0].rack().len(), RACK_SIZE - 3);
        assert_eq!(game.pool_len(), pool_before);
    }

    #[test]
    fn turn_order_is_circular() {
        let mut game = game_with_board(3, vec![vec![9, 22, 35]]);
        for expected in [1, 2, 0, 1] {
            assert!(game.next_turn().is_ok());
            assert_eq!(game.current_player(), expected);
        }
    }

    #[test]
    fn next_turn_announces_the_new_player() {
        let mut game = game_with_board(2, vec![vec![9, 22, 35]]);
        game.player(1).set_name("mira".to_string());
        game.drain_notices();
        assert!(game.next_turn().is_ok());
        assert_eq!(game.drain_notices(), vec!["it is mira's turn".to_string()]);
    }

    #[test]
    fn snapshot_restore_covers_board_and_loose_only() {
        let mut game = game_with_board(2, vec![vec![9, 22, 35]]);
        let ids: Vec<PieceId> = game.arena.ids().collect();
        game.add_loose_piece(ids[0]);
        game.notify("kept".to_string());
        let snapshot = game.snapshot();

        game.replace_set(0, TileSet::combine(vec![ids[1], ids[2]])).unwrap();
        game.add_loose_piece(ids[3]);
        game.restore(snapshot);

        assert_eq!(game.board().len(), 1);
        assert_eq!(game.loose_pieces(), &[ids[0]]);
        assert_eq!(game.drain_notices(), vec!["kept".to_string()]);
    }

    #[test]
    fn replace_set_drops_empty_replacement() {
        let mut game = game_with_board(2, vec![vec![9, 22, 35], vec![4, 17, 30]]);
        game.replace_set(0, TileSet::combine(vec![])).unwrap();
        assert_eq!(game.board().len(), 1);
        assert_eq!(
            game.replace_set(5, TileSet::combine(vec![])),
            Err(MoveError::SetSelection)
        );
    }

    #[test]
    fn wire_snapshot_shape() {
        let mut game = game_with_board(1, vec![vec![9, 22, 35]]);
        let ids: Vec<PieceId> = game.arena.ids().collect();
        game.add_loose_piece(ids[52]);
        let text = serde_json::to_string(&game.wire()).unwrap();
        assert_eq!(
            text,
            r#"{"board":[{"pieces":[{"value":10,"color":"black"},{"value":10,"color":"blue"},{"value":10,"color":"red"}]}],"piece":[{"joker":true}]}"#
        );
    }
}
