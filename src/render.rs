//! Text snapshot of a game, as exposed to readers.
//!
//! ```text
//! E - - - - - E
//! Z Q
//! 8 guesses left
//! You Win!            (only once the game has ended)
//! ```
//!
//! The reveal line keeps a trailing space after every slot. The snapshot is
//! always rebuilt from scratch, never patched.

use crate::error::{HangmanError, Result};
use crate::game_state::{GameState, Status};

/// Glyph shown for a letter not yet revealed.
pub const PLACEHOLDER: char = '-';

const LOSE_LINE: &str = "You Lose!\n";
const WIN_LINE: &str = "You Win!\n";

#[must_use]
pub fn render(state: &GameState) -> String {
    let mut out = String::with_capacity(rendered_len(state));
    write_snapshot(&mut out, state);
    out
}

/// Like [`render`], but reports allocation failure instead of aborting.
pub fn try_render(state: &GameState) -> Result<String> {
    let mut out = String::new();
    out.try_reserve_exact(rendered_len(state))
        .map_err(|_| HangmanError::ResourceExhausted)?;
    write_snapshot(&mut out, state);
    Ok(out)
}

#[must_use]
pub fn status_line(status: Status) -> Option<&'static str> {
    match status {
        Status::InProgress => None,
        Status::Lost => Some(LOSE_LINE),
        Status::Won => Some(WIN_LINE),
    }
}

fn write_snapshot(out: &mut String, state: &GameState) {
    for slot in state.reveal() {
        out.push(slot.unwrap_or(PLACEHOLDER));
        out.push(' ');
    }
    out.push('\n');

    for (i, letter) in state.bad_guesses().iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push(*letter);
    }
    out.push('\n');

    out.push_str(&state.guesses_remaining().to_string());
    out.push_str(" guesses left\n");

    if let Some(line) = status_line(state.status()) {
        out.push_str(line);
    }
}

// Upper bound, so a single reservation covers the whole snapshot.
fn rendered_len(state: &GameState) -> usize {
    let reveal = state.reveal().len() * 2 + 1;
    let bad = state.bad_guesses().len() * 2 + 1;
    let remaining = "255 guesses left\n".len();
    reveal + bad + remaining + LOSE_LINE.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game_after(secret: &str, letters: &str) -> GameState {
        let mut game = GameState::new(secret);
        for c in letters.chars() {
            game.guess(c).unwrap();
        }
        game
    }

    #[test]
    fn test_render_fresh_game() {
        let game = GameState::new("EXAMPLE");
        assert_eq!(render(&game), "- - - - - - - \n\n10 guesses left\n");
    }

    #[test]
    fn test_render_correct_guess() {
        let game = game_after("EXAMPLE", "E");
        assert_eq!(render(&game), "E - - - - - E \n\n10 guesses left\n");
    }

    #[test]
    fn test_render_bad_guesses() {
        let game = game_after("EXAMPLE", "ZY");
        assert_eq!(render(&game), "- - - - - - - \nZ Y\n8 guesses left\n");
    }

    #[test]
    fn test_render_win() {
        let game = game_after("GOODBYE", "BDEGOY");
        assert_eq!(
            render(&game),
            "G O O D B Y E \n\n10 guesses left\nYou Win!\n"
        );
    }

    #[test]
    fn test_render_loss() {
        let game = game_after("EXAMPLE", "BCDFGHIJKN");
        assert_eq!(
            render(&game),
            "- - - - - - - \nB C D F G H I J K N\n0 guesses left\nYou Lose!\n"
        );
    }

    #[test]
    fn test_try_render_matches_render() {
        let game = game_after("EXAMPLE", "EQ");
        assert_eq!(try_render(&game).unwrap(), render(&game));
        assert!(try_render(&game).unwrap().len() <= rendered_len(&game));
    }
}
