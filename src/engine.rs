//! The shared game engine.
//!
//! Two locks guard the engine's state:
//!
//! - the *state lock* covers the active [`GameState`] and its rendered
//!   snapshot;
//! - the *bank lock* covers the [`WordBank`] and the random source used to
//!   draw from it.
//!
//! Lock order is state before bank. The bank can only be reached from a held
//! state lock through [`BoardGuard::with_bank`], which releases the bank
//! before returning. Bank-only operations go through [`Engine::with_bank`],
//! whose closure gets the bank and nothing else. No path waits on the state
//! lock while holding the bank lock.

use crate::error::{HangmanError, Result};
use crate::game_state::{GameState, GuessOutcome, validate_secret};
use crate::lock::{CancelToken, InterruptibleMutex, LockGuard};
use crate::render::{render, try_render};
use crate::wordbank::{WordBank, parse_word_list};
use crate::{debug_log, info_log, warn_log};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::ops::{Deref, DerefMut};

/// How a seek offset is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekMode {
    Absolute,
    Relative,
    FromEnd,
}

/// A game together with its rendered snapshot. Always replaced as a unit.
#[derive(Debug)]
struct Board {
    game: GameState,
    snapshot: String,
}

impl Board {
    fn new(game: GameState) -> Self {
        let snapshot = render(&game);
        Self { game, snapshot }
    }

    /// Render ahead of committing, so an allocation failure leaves the
    /// current board untouched.
    fn staged(game: GameState) -> Result<Self> {
        let snapshot = try_render(&game)?;
        Ok(Self { game, snapshot })
    }
}

#[derive(Debug)]
struct BankCell {
    bank: WordBank,
    rng: StdRng,
}

/// Held state lock, with a scoped path to the bank lock.
struct BoardGuard<'a> {
    board: LockGuard<'a, Board>,
    bank: &'a InterruptibleMutex<BankCell>,
}

impl BoardGuard<'_> {
    fn with_bank<T>(
        &self,
        cancel: &CancelToken,
        f: impl FnOnce(&mut BankCell) -> Result<T>,
    ) -> Result<T> {
        let mut cell = self.bank.lock(cancel)?;
        f(&mut cell)
    }
}

impl Deref for BoardGuard<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        &self.board
    }
}

impl DerefMut for BoardGuard<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        &mut self.board
    }
}

/// One hangman game plus its word bank, safe to share between threads.
///
/// Every method takes the caller's [`CancelToken`]; cancelling it while the
/// call waits for a lock makes the call return `Interrupted` with nothing
/// changed.
#[derive(Debug)]
pub struct Engine {
    board: InterruptibleMutex<Board>,
    bank: InterruptibleMutex<BankCell>,
}

impl Engine {
    /// Start with `bank` and a secret drawn from it.
    #[must_use]
    pub fn new(bank: WordBank) -> Self {
        Self::with_rng(bank, StdRng::from_entropy())
    }

    /// Like [`Engine::new`] with a caller-provided random source.
    #[must_use]
    pub fn with_rng(mut bank: WordBank, mut rng: StdRng) -> Self {
        let word = bank.draw_random(&mut rng);
        info_log!("engine started with {} word(s) in the bank", bank.len());
        Self::assemble(GameState::new(&word), bank, rng)
    }

    /// Start with `bank`, but play `secret` first.
    pub fn with_secret(mut bank: WordBank, secret: &str) -> Result<Self> {
        let game = GameState::with_secret(secret)?;
        bank.seed_default();
        Ok(Self::assemble(game, bank, StdRng::from_entropy()))
    }

    fn assemble(game: GameState, bank: WordBank, rng: StdRng) -> Self {
        Self {
            board: InterruptibleMutex::new(Board::new(game)),
            bank: InterruptibleMutex::new(BankCell { bank, rng }),
        }
    }

    fn lock_board(&self, cancel: &CancelToken) -> Result<BoardGuard<'_>> {
        Ok(BoardGuard {
            board: self.board.lock(cancel)?,
            bank: &self.bank,
        })
    }

    fn with_bank<T>(
        &self,
        cancel: &CancelToken,
        f: impl FnOnce(&mut WordBank) -> Result<T>,
    ) -> Result<T> {
        let mut cell = self.bank.lock(cancel)?;
        f(&mut cell.bank)
    }

    // Data plane

    /// Copy up to `buf.len()` snapshot bytes starting at `offset`.
    ///
    /// Reading exactly at the end returns 0 bytes; past the end or before
    /// the start fails with `InvalidOffset`.
    pub fn read_into(
        &self,
        offset: i64,
        buf: &mut [u8],
        cancel: &CancelToken,
    ) -> Result<usize> {
        let board = self.lock_board(cancel)?;
        let src = window(&board.snapshot, offset, buf.len())?;
        buf[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    /// Up to `max_len` snapshot bytes starting at `offset`.
    pub fn read(&self, offset: i64, max_len: usize, cancel: &CancelToken) -> Result<Vec<u8>> {
        let board = self.lock_board(cancel)?;
        Ok(window(&board.snapshot, offset, max_len)?.to_vec())
    }

    /// Apply a letter guess and re-render the snapshot.
    pub fn guess(&self, letter: char, cancel: &CancelToken) -> Result<GuessOutcome> {
        let mut board = self.lock_board(cancel)?;
        let mut next = board.game.clone();
        let outcome = match next.guess(letter) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn_log!("guess {letter:?} rejected: {err}");
                return Err(err);
            }
        };
        *board = Board::staged(next)?;

        debug_log!(
            "guess {:?} -> {:?}, {} left, {:?}",
            letter,
            outcome,
            board.game.guesses_remaining(),
            board.game.status()
        );
        Ok(outcome)
    }

    /// Compute a new cursor position.
    ///
    /// The result is clamped into `0..len`: a negative target becomes 0 and
    /// a target at or past the end becomes `len - 1`, so a seek never lands
    /// exactly on end-of-stream.
    pub fn seek(
        &self,
        cursor: i64,
        offset: i64,
        mode: SeekMode,
        cancel: &CancelToken,
    ) -> Result<i64> {
        let board = self.lock_board(cancel)?;
        let len = i64::try_from(board.snapshot.len()).unwrap_or(i64::MAX);
        let target = match mode {
            SeekMode::Absolute => offset,
            SeekMode::Relative => cursor.saturating_add(offset),
            SeekMode::FromEnd => len.saturating_add(offset),
        };

        let clamped = if target < 0 {
            0
        } else if target >= len {
            (len - 1).max(0)
        } else {
            target
        };
        debug_log!("seek {mode:?} {offset} from {cursor} -> {clamped}");
        Ok(clamped)
    }

    /// Current rendered snapshot.
    pub fn snapshot(&self, cancel: &CancelToken) -> Result<String> {
        Ok(self.lock_board(cancel)?.snapshot.clone())
    }

    /// Copy of the active game.
    pub fn game(&self, cancel: &CancelToken) -> Result<GameState> {
        Ok(self.lock_board(cancel)?.game.clone())
    }

    // Control plane

    /// The bank as a comma-separated list.
    pub fn word_bank(&self, cancel: &CancelToken) -> Result<String> {
        self.with_bank(cancel, |bank| bank.snapshot())
    }

    /// Replace the bank from a comma-separated list. The active game keeps
    /// its secret until the next restart.
    pub fn set_word_bank(&self, list: &str, cancel: &CancelToken) -> Result<()> {
        self.replace_word_bank(parse_word_list(list), cancel)
    }

    /// Swap in `words` if they form a valid bank; otherwise nothing changes.
    pub fn replace_word_bank(&self, words: Vec<String>, cancel: &CancelToken) -> Result<()> {
        self.with_bank(cancel, |bank| {
            bank.replace(words)?;
            info_log!("word bank replaced with {} word(s)", bank.len());
            Ok(())
        })
    }

    pub fn secret(&self, cancel: &CancelToken) -> Result<String> {
        Ok(self.lock_board(cancel)?.game.secret().to_string())
    }

    /// Restart the game with `word` as the secret.
    pub fn set_secret(&self, word: &str, cancel: &CancelToken) -> Result<()> {
        validate_secret(word)?;
        let staged = Board::staged(GameState::new(word))?;
        let mut board = self.lock_board(cancel)?;
        *board = staged;
        info_log!("secret changed, new game of {} letters", word.len());
        Ok(())
    }

    /// Empty the bank and start over with a freshly drawn word.
    ///
    /// Since the bank is emptied first, the draw always reseeds it with the
    /// default word.
    pub fn restart(&self, cancel: &CancelToken) -> Result<()> {
        let mut board = self.lock_board(cancel)?;
        let staged = board.with_bank(cancel, |cell| {
            let mut fresh = WordBank::new();
            let word = fresh.draw_random(&mut cell.rng);
            let staged = Board::staged(GameState::new(&word))?;
            cell.bank = fresh;
            Ok(staged)
        })?;
        *board = staged;
        info_log!("game restarted");
        Ok(())
    }
}

fn window(snapshot: &str, offset: i64, max_len: usize) -> Result<&[u8]> {
    let bytes = snapshot.as_bytes();
    let start = usize::try_from(offset)
        .ok()
        .filter(|&start| start <= bytes.len())
        .ok_or(HangmanError::InvalidOffset(offset))?;
    let end = start + max_len.min(bytes.len() - start);
    Ok(&bytes[start..end])
}
