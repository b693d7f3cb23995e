use crate::error::MoveError;
use crate::piece::{PieceArena, PieceId};
use rummikub_protocol::WireSet;

/// A valid board set holds between 3 and 13 tiles.
pub const MIN_SET_LEN: usize = 3;
pub const MAX_SET_LEN: usize = 13;
const MAX_GROUP_LEN: usize = 4;

/// An ordered sequence of tile handles. Board sets must pass [`TileSet::is_valid`]
/// whenever a turn is confirmed; a set under construction (a combine selection,
/// or a half left behind by a split) may transiently be anything.
///
/// Mutation primitives are copy-on-write: they return a new `TileSet` and leave
/// the receiver untouched, so callers can stage a change, inspect it, and only
/// then commit it to the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileSet {
    tiles: Vec<PieceId>,
}

impl TileSet {
    /// Builds a set out of an arbitrary pile of pieces, no ownership or
    /// validity check. Legality is the caller's problem (usually deferred to
    /// the turn-boundary board check).
    pub fn combine(pieces: Vec<PieceId>) -> TileSet {
        TileSet { tiles: pieces }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tiles(&self) -> &[PieceId] {
        &self.tiles
    }

    pub fn piece(&self, index: usize) -> Result<PieceId, MoveError> {
        self.tiles.get(index).copied().ok_or(MoveError::PieceSelection)
    }

    pub fn contains(&self, piece: PieceId) -> bool {
        self.tiles.contains(&piece)
    }

    /// Sum of tile values; jokers contribute zero.
    pub fn size(&self, arena: &PieceArena) -> u32 {
        self.tiles.iter().map(|id| arena.get(*id).value() as u32).sum()
    }

    pub fn jokers(&self, arena: &PieceArena) -> usize {
        self.tiles.iter().filter(|id| arena.get(**id).is_joker()).count()
    }

    /// 3 or 4 tiles, one shared value among the non-jokers, and more than two
    /// distinct colors with each joker counting one toward the tally.
    pub fn is_group(&self, arena: &PieceArena) -> bool {
        if self.tiles.len() < MIN_SET_LEN || self.tiles.len() > MAX_GROUP_LEN {
            return false;
        }
        let mut shared_value = None;
        let mut seen = [false; 4];
        let mut total_colors = 0;
        for id in &self.tiles {
            let piece = arena.get(*id);
            if piece.is_joker() {
                total_colors += 1;
                continue;
            }
            match shared_value {
                None => shared_value = Some(piece.value()),
                Some(value) if value != piece.value() => return false,
                Some(_) => {}
            }
            let slot = piece.color() as usize;
            if !seen[slot] {
                seen[slot] = true;
                total_colors += 1;
            }
        }
        total_colors > 2
    }

    /// At least 3 tiles of one color with consecutive values; a joker is
    /// transparent to the continuity check but still occupies its position.
    pub fn is_run(&self, arena: &PieceArena) -> bool {
        if self.tiles.len() < MIN_SET_LEN {
            return false;
        }
        let mut color = None;
        let mut start = None;
        for (index, id) in self.tiles.iter().enumerate() {
            let piece = arena.get(*id);
            if piece.is_joker() {
                continue;
            }
            match color {
                None => color = Some(piece.color()),
                Some(c) if c != piece.color() => return false,
                Some(_) => {}
            }
            let expected_start = piece.value() as i16 - index as i16;
            match start {
                None => start = Some(expected_start),
                Some(s) if s != expected_start => return false,
                Some(_) => {}
            }
        }
        true
    }

    pub fn is_valid(&self, arena: &PieceArena) -> bool {
        if self.tiles.len() < MIN_SET_LEN || self.tiles.len() > MAX_SET_LEN {
            return false;
        }
        if self.jokers(arena) > 1 {
            return false;
        }
        self.is_group(arena) || self.is_run(arena)
    }

    /// Returns a clone with `piece` at `index`. Rejects an out-of-range index
    /// and a piece already present by identity. Does not re-validate shape;
    /// callers that need legality check `is_valid` on the result.
    pub fn insert(&self, piece: PieceId, index: usize) -> Result<TileSet, MoveError> {
        if index > self.tiles.len() {
            return Err(MoveError::OutOfBounds(0, self.tiles.len() + 1));
        }
        if self.contains(piece) {
            return Err(MoveError::InvalidPiece);
        }
        let mut tiles = self.tiles.clone();
        tiles.insert(index, piece);
        Ok(TileSet { tiles })
    }

    /// Returns a clone with `piece` excised (found by identity).
    pub fn remove(&self, piece: PieceId) -> Result<TileSet, MoveError> {
        if self.tiles.is_empty() {
            return Err(MoveError::InvalidSet);
        }
        let index = self
            .tiles
            .iter()
            .position(|id| *id == piece)
            .ok_or(MoveError::InvalidPiece)?;
        let mut tiles = self.tiles.clone();
        tiles.remove(index);
        Ok(TileSet { tiles })
    }

    /// Splits into `[0, index)` and `[index, len)`. Neither half is validated
    /// here; the turn-boundary board check decides legality.
    pub fn split(&self, index: usize) -> Result<(TileSet, TileSet), MoveError> {
        if self.tiles.len() < 2 {
            return Err(MoveError::TooFewPieces);
        }
        if index < 1 || index >= self.tiles.len() {
            return Err(MoveError::OutOfBounds(1, self.tiles.len()));
        }
        let (lower, upper) = self.tiles.split_at(index);
        Ok((
            TileSet { tiles: lower.to_vec() },
            TileSet { tiles: upper.to_vec() },
        ))
    }

    pub fn wire(&self, arena: &PieceArena) -> WireSet {
        WireSet {
            pieces: self.tiles.iter().map(|id| arena.get(*id).wire()).collect(),
        }
    }
}
