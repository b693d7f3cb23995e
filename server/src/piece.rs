use rummikub_protocol::{WireColor, WirePiece};
use std::fmt;

/// Value 0 marks the joker; real tiles carry 1..=13.
pub const JOKER_VALUE: u8 = 0;
pub const MAX_VALUE: u8 = 13;

/// Two full 52-tile decks plus two jokers.
pub const DECK_SIZE: usize = 106;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Blue,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 4] = [Color::Black, Color::Blue, Color::Red, Color::Green];

    fn wire(self) -> WireColor {
        match self {
            Color::Black => WireColor::Black,
            Color::Blue => WireColor::Blue,
            Color::Red => WireColor::Red,
            Color::Green => WireColor::Green,
        }
    }
}

/// One tile's face. Faces are interned in the [`PieceArena`] once per game;
/// everything else passes [`PieceId`] handles around, so "same piece" is
/// handle equality and two tiles with equal faces stay distinct entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    value: u8,
    color: Color,
}

impl Piece {
    pub fn new(value: u8, color: Color) -> Option<Piece> {
        if value > MAX_VALUE {
            return None;
        }
        Some(Piece { value, color })
    }

    pub fn is_joker(&self) -> bool {
        self.value == JOKER_VALUE
    }

    pub fn is_same_value(&self, other: &Piece) -> bool {
        self.value == other.value
    }

    pub fn is_same_color(&self, other: &Piece) -> bool {
        self.color == other.color
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn wire(&self) -> WirePiece {
        if self.is_joker() {
            WirePiece::joker()
        } else {
            WirePiece::tile(self.value, self.color.wire())
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.wire(), f)
    }
}

/// Stable handle for one tile; identity comparison is handle comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PieceId(u16);

/// All 106 tiles of a match, created once at game start and never destroyed.
/// Containers (pool, board sets, racks, loose pieces) only relocate ids.
#[derive(Debug, Clone)]
pub struct PieceArena {
    pieces: Vec<Piece>,
}

impl PieceArena {
    pub fn standard() -> PieceArena {
        let mut pieces = Vec::with_capacity(DECK_SIZE);
        for _ in 0..2 {
            for color in Color::ALL {
                for value in 1..=MAX_VALUE {
                    // Values stay within 1..=13, so construction cannot fail.
                    pieces.push(Piece::new(value, color).unwrap());
                }
            }
            pieces.push(Piece::new(JOKER_VALUE, Color::Black).unwrap());
        }
        PieceArena { pieces }
    }

    #[cfg(test)]
    pub fn from_pieces(pieces: Vec<Piece>) -> PieceArena {
        PieceArena { pieces }
    }

    pub fn get(&self, id: PieceId) -> Piece {
        self.pieces[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = PieceId> + '_ {
        (0..self.pieces.len()).map(|index| PieceId(index as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn rejects_out_of_range_values() {
        assert!(Piece::new(14, Color::Red).is_none());
        assert!(Piece::new(13, Color::Red).is_some());
        assert!(Piece::new(0, Color::Black).is_some());
    }

    #[test]
    fn joker_is_value_zero() {
        let joker = Piece::new(JOKER_VALUE, Color::Black).unwrap();
        assert!(joker.is_joker());
        assert!(!Piece::new(1, Color::Black).unwrap().is_joker());
    }

    #[test]
    fn comparisons() {
        let a = Piece::new(5, Color::Red).unwrap();
        let b = Piece::new(5, Color::Blue).unwrap();
        let c = Piece::new(9, Color::Red).unwrap();
        assert!(a.is_same_value(&b));
        assert!(!a.is_same_value(&c));
        assert!(a.is_same_color(&c));
        assert!(!a.is_same_color(&b));
    }

    #[test]
    fn standard_arena_composition() {
        let arena = PieceArena::standard();
        assert_eq!(arena.len(), DECK_SIZE);

        let mut jokers = 0;
        let mut by_value: HashMap<u8, usize> = HashMap::new();
        for id in arena.ids() {
            let piece = arena.get(id);
            if piece.is_joker() {
                jokers += 1;
            } else {
                *by_value.entry(piece.value()).or_default() += 1;
            }
        }
        assert_eq!(jokers, 2);
        // Each value appears twice per color.
        for value in 1..=MAX_VALUE {
            assert_eq!(by_value[&value], 8);
        }
    }

    #[test]
    fn equal_faces_are_distinct_entities() {
        let arena = PieceArena::standard();
        let ids: Vec<PieceId> = arena.ids().collect();
        // The two copies of [1 black] sit 52 tiles apart.
        let first = ids[0];
        let second = ids[53];
        assert_eq!(arena.get(first), arena.get(second));
        assert_ne!(first, second);
    }

    #[test]
    fn wire_shapes() {
        let joker = Piece::new(JOKER_VALUE, Color::Black).unwrap();
        assert_eq!(joker.wire(), WirePiece::joker());
        let tile = Piece::new(7, Color::Green).unwrap();
        assert_eq!(tile.wire(), WirePiece::tile(7, WireColor::Green));
    }
}
