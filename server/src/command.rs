use crate::error::MoveError;
use crate::game::{BoardSnapshot, Game};
use crate::piece::PieceId;
use crate::set::TileSet;

/// Where a selector token points. `r2` is the third rack tile, `p0` the
/// first loose board piece, `s1` the second board set; a bare number selects
/// a position inside an already-chosen set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector {
    Rack(usize),
    Loose(usize),
    Set(usize),
    Index(usize),
}

fn parse_int(token: &str) -> Result<usize, MoveError> {
    token.parse().map_err(|_| MoveError::NotANumber)
}

pub fn parse_selector(token: &str) -> Result<Selector, MoveError> {
    if let Some(rest) = token.strip_prefix('r') {
        Ok(Selector::Rack(parse_int(rest)?))
    } else if let Some(rest) = token.strip_prefix('p') {
        Ok(Selector::Loose(parse_int(rest)?))
    } else if let Some(rest) = token.strip_prefix('s') {
        Ok(Selector::Set(parse_int(rest)?))
    } else {
        Ok(Selector::Index(parse_int(token)?))
    }
}

/// Resolves a piece selector against the issuing player's rack or the board's
/// loose pile. Set-internal positions need a set first, so a bare index or an
/// `s` token is a selection error here.
fn resolve_piece(game: &mut Game, seat: usize, selector: Selector) -> Result<PieceId, MoveError> {
    match selector {
        Selector::Rack(index) => game.player(seat).piece(index),
        Selector::Loose(index) => game.loose_piece(index),
        Selector::Set(_) | Selector::Index(_) => Err(MoveError::PieceSelection),
    }
}

/// A reversible move. `invoke` either applies the whole move or leaves the
/// game untouched; `undo` assumes the matching `invoke` succeeded.
pub trait Command: Send {
    fn invoke(&mut self, game: &mut Game) -> Result<(), MoveError>;
    fn undo(&mut self, game: &mut Game);
}

/// Board snapshot plus, for moves that touch a rack, that rack's tiles.
struct Undo {
    board: Option<BoardSnapshot>,
    rack: Option<(usize, Vec<PieceId>)>,
}

impl Undo {
    fn capture(game: &Game, seat: Option<usize>) -> Undo {
        Undo {
            board: Some(game.snapshot()),
            rack: seat.map(|seat| (seat, game.snapshot_rack(seat))),
        }
    }

    fn restore(&mut self, game: &mut Game) {
        if let Some(board) = self.board.take() {
            game.restore(board);
        }
        if let Some((seat, rack)) = self.rack.take() {
            game.restore_rack(seat, rack);
        }
    }
}

/// `name <new name>`. Renames never enter the history, so undo is a no-op.
pub struct Rename {
    seat: usize,
    name: String,
}

impl Command for Rename {
    fn invoke(&mut self, game: &mut Game) -> Result<(), MoveError> {
        game.player(self.seat).set_name(self.name.clone());
        Ok(())
    }

    fn undo(&mut self, _game: &mut Game) {}
}

/// `combine r0 r4 p1 ...`: gathers at least three pieces from the rack and
/// the loose pile into a new board set. The new set is not validated; an
/// illegal combination surfaces at the turn boundary.
pub struct Combine {
    seat: usize,
    selectors: Vec<Selector>,
    undo: Option<Undo>,
}

impl Command for Combine {
    fn invoke(&mut self, game: &mut Game) -> Result<(), MoveError> {
        let mut pieces = Vec::with_capacity(self.selectors.len());
        for selector in &self.selectors {
            let piece = resolve_piece(game, self.seat, *selector)?;
            if pieces.contains(&piece) {
                return Err(MoveError::PieceSelection);
            }
            pieces.push(piece);
        }
        let undo = Undo::capture(game, Some(self.seat));
        for piece in &pieces {
            // Loose selectors were resolved above, so a miss means rack.
            if game.remove_loose(*piece).is_err() {
                game.player(self.seat).remove_pieces(&[*piece]);
            }
        }
        game.add_set(TileSet::combine(pieces));
        self.undo = Some(undo);
        Ok(())
    }

    fn undo(&mut self, game: &mut Game) {
        if let Some(mut undo) = self.undo.take() {
            undo.restore(game);
        }
    }
}

/// `insert <set> <piece> <position>`: puts a rack or loose piece into an
/// existing set. Unlike the other moves this one validates the grown set up
/// front, since a mid-run insert can never become legal later.
pub struct Insert {
    seat: usize,
    set: usize,
    piece: Selector,
    position: usize,
    undo: Option<Undo>,
}

impl Command for Insert {
    fn invoke(&mut self, game: &mut Game) -> Result<(), MoveError> {
        let piece = resolve_piece(game, self.seat, self.piece)?;
        let grown = game.set_at(self.set)?.insert(piece, self.position)?;
        if !grown.is_valid(game.arena()) {
            return Err(MoveError::CannotInsert);
        }
        let undo = Undo::capture(game, Some(self.seat));
        if game.remove_loose(piece).is_err() {
            game.player(self.seat).remove_pieces(&[piece]);
        }
        game.replace_set(self.set, grown)?;
        self.undo = Some(undo);
        Ok(())
    }

    fn undo(&mut self, game: &mut Game) {
        if let Some(mut undo) = self.undo.take() {
            undo.restore(game);
        }
    }
}

/// `remove <set> <position>`: pulls one piece out of a set onto the loose
/// pile. The shrunken set may be transiently illegal.
pub struct Remove {
    set: usize,
    position: usize,
    undo: Option<Undo>,
}

impl Command for Remove {
    fn invoke(&mut self, game: &mut Game) -> Result<(), MoveError> {
        let set = game.set_at(self.set)?;
        let piece = set.piece(self.position)?;
        let shrunk = set.remove(piece)?;
        let undo = Undo::capture(game, None);
        game.replace_set(self.set, shrunk)?;
        game.add_loose_piece(piece);
        self.undo = Some(undo);
        Ok(())
    }

    fn undo(&mut self, game: &mut Game) {
        if let Some(mut undo) = self.undo.take() {
            undo.restore(game);
        }
    }
}

/// `split <set> <position>`: cuts a set in two. The lower half stays in
/// place, the upper half becomes a new set at the end of the board.
pub struct Split {
    set: usize,
    position: usize,
    undo: Option<Undo>,
}

impl Command for Split {
    fn invoke(&mut self, game: &mut Game) -> Result<(), MoveError> {
        let (lower, upper) = game.set_at(self.set)?.split(self.position)?;
        let undo = Undo::capture(game, None);
        game.replace_set(self.set, lower)?;
        game.add_set(upper);
        self.undo = Some(undo);
        Ok(())
    }

    fn undo(&mut self, game: &mut Game) {
        if let Some(mut undo) = self.undo.take() {
            undo.restore(game);
        }
    }
}

fn set_index(token: &str) -> Result<usize, MoveError> {
    match parse_selector(token)? {
        Selector::Set(index) | Selector::Index(index) => Ok(index),
        _ => Err(MoveError::SetSelection),
    }
}

fn position_index(token: &str) -> Result<usize, MoveError> {
    match parse_selector(token)? {
        Selector::Index(index) => Ok(index),
        _ => Err(MoveError::PieceSelection),
    }
}

/// Turns an envelope into a move for the given seat. Selector indices are
/// resolved lazily at invoke time; only shape errors surface here.
pub fn parse_move(seat: usize, command: &str, input: &str) -> Result<Box<dyn Command>, MoveError> {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    match command {
        "name" => {
            if input.trim().is_empty() {
                return Err(MoveError::TooFewArguments);
            }
            Ok(Box::new(Rename { seat, name: input.trim().to_string() }))
        }
        "combine" => {
            if tokens.len() < 3 {
                return Err(MoveError::TooFewPieces);
            }
            let selectors = tokens
                .iter()
                .map(|token| match parse_selector(*token)? {
                    selector @ (Selector::Rack(_) | Selector::Loose(_)) => Ok(selector),
                    _ => Err(MoveError::PieceSelection),
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Box::new(Combine { seat, selectors, undo: None }))
        }
        "insert" => {
            let [set, piece, position] = tokens[..] else {
                return Err(MoveError::TooFewArguments);
            };
            Ok(Box::new(Insert {
                seat,
                set: set_index(set)?,
                piece: parse_selector(piece)?,
                position: position_index(position)?,
                undo: None,
            }))
        }
        "remove" => {
            let [set, position] = tokens[..] else {
                return Err(MoveError::TooFewArguments);
            };
            Ok(Box::new(Remove {
                set: set_index(set)?,
                position: position_index(position)?,
                undo: None,
            }))
        }
        "split" => {
            let [set, position] = tokens[..] else {
                return Err(MoveError::TooFewArguments);
            };
            Ok(Box::new(Split {
                set: set_index(set)?,
                position: position_index(position)?,
                undo: None,
            }))
        }
        _ => Err(MoveError::TooFewArguments),
    }
}
