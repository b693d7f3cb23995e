use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::info;

use crate::command::parse_move;
use crate::game::Game;
use crate::history::History;

/// Hot-seat mode: every player shares one terminal and the same command
/// vocabulary as the websocket path, minus the lobby commands (the pool is
/// shuffled and dealt up front). Input and output are injected so a scripted
/// session can drive a whole game.
pub fn run<R: BufRead, W: Write>(players: usize, input: R, mut output: W) -> Result<()> {
    let mut game = Game::new(players);
    let mut history = History::new();
    game.shuffle();
    game.deal_pieces();
    info!(players, "local game started");

    writeln!(output, "local game with {} players; 'quit' to leave", players)?;
    render(&game, &mut output)?;

    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        let (command, args) = match trimmed.split_once(char::is_whitespace) {
            Some((command, args)) => (command, args.trim()),
            None => (trimmed, ""),
        };
        let seat = game.current_player();

        match command {
            "" => continue,
            "quit" | "exit" => break,
            "undo" => {
                if let Some(mut undone) = history.pop() {
                    undone.undo(&mut game);
                }
            }
            "end" | "done" => match game.next_turn() {
                Ok(()) => history.clear(),
                Err(err) => {
                    while let Some(mut undone) = history.pop() {
                        undone.undo(&mut game);
                    }
                    writeln!(output, "error performing {}: {}", command, err)?;
                }
            },
            "name" => match parse_move(seat, command, args) {
                Ok(mut parsed) => {
                    let _ = parsed.invoke(&mut game);
                    let name = game.players()[seat].name().to_string();
                    writeln!(output, "your name has been set to: {}", name)?;
                }
                Err(err) => writeln!(output, "error performing name: {}", err)?,
            },
            "combine" | "insert" | "remove" | "split" => {
                match parse_move(seat, command, args)
                    .and_then(|mut parsed| parsed.invoke(&mut game).map(|()| parsed))
                {
                    Ok(parsed) => history.push(parsed),
                    Err(err) => writeln!(output, "error performing {}: {}", command, err)?,
                }
            }
            _ => writeln!(output, "invalid command")?,
        }

        for notice in game.drain_notices() {
            writeln!(output, "{}", notice)?;
        }
        render(&game, &mut output)?;
    }
    Ok(())
}

fn render<W: Write>(game: &Game, output: &mut W) -> Result<()> {
    let arena = game.arena();
    for (index, set) in game.board().iter().enumerate() {
        write!(output, "s{}:", index)?;
        for id in set.tiles() {
            write!(output, " {}", arena.get(*id))?;
        }
        writeln!(output)?;
    }
    if !game.loose_pieces().is_empty() {
        write!(output, "loose:")?;
        for (index, id) in game.loose_pieces().iter().enumerate() {
            write!(output, " p{}={}", index, arena.get(*id))?;
        }
        writeln!(output)?;
    }
    let seat = game.current_player();
    let player = &game.players()[seat];
    write!(output, "{} rack:", player.name())?;
    for (index, id) in player.rack().iter().enumerate() {
        write!(output, " r{}={}", index, arena.get(*id))?;
    }
    writeln!(output)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn session(script: &str) -> String {
        let mut output = Vec::new();
        run(2, Cursor::new(script.as_bytes()), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn scripted_rename_combine_and_pass() {
        let output = session("name ada\ncombine r0 r1 r2\nundo\nend\nquit\n");
        assert!(output.contains("your name has been set to: ada"));
        // The combine shows up as set s0 before the undo removes it.
        assert!(output.contains("s0:"));
        // Passing hands the turn to the unnamed second player.
        assert!(output.contains("it is Player's turn"));
    }

    #[test]
    fn bad_input_is_reported_and_ignored() {
        let output = session("combine r0 r1\nwarp 9\nquit\n");
        assert!(output.contains("error performing combine: not enough pieces to create set"));
        assert!(output.contains("invalid command"));
    }

    #[test]
    fn invalid_end_rewinds_the_turn() {
        let output = session("combine r0 r1 r2\nremove s0 0\nend\nquit\n");
        assert!(output.contains("error performing end: board is invalid"));
        // The final render shows a clean board and a full rack again.
        assert!(output.lines().last().unwrap().contains("r13="));
    }
}
