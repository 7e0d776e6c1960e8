//! Per-caller view of the shared engine.
//!
//! Every session has its own cursor and cancellation token. All sessions
//! observe the same snapshot.

use crate::engine::{Engine, SeekMode};
use crate::error::{HangmanError, Result};
use crate::game_state::GuessOutcome;
use crate::lock::CancelToken;
use crate::wire::decode_guess_frame;
use crate::{debug_log, info_log};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

/// Out-of-band control operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    GetWordBank,
    SetWordBank(String),
    GetSecret,
    SetSecret(String),
    Restart,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    WordBank(String),
    Secret(String),
    Done,
}

#[derive(Debug)]
pub struct Session {
    engine: Arc<Engine>,
    cursor: i64,
    cancel: CancelToken,
}

impl Session {
    #[must_use]
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            cursor: 0,
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    #[must_use]
    pub fn cursor(&self) -> i64 {
        self.cursor
    }

    /// Handle another thread can use to abort this session's lock waits.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Read up to `max_len` bytes at the cursor and advance past them.
    pub fn read_chunk(&mut self, max_len: usize) -> Result<Vec<u8>> {
        let bytes = self.engine.read(self.cursor, max_len, &self.cancel)?;
        self.advance(bytes.len());
        Ok(bytes)
    }

    fn advance(&mut self, count: usize) {
        self.cursor += i64::try_from(count).unwrap_or(i64::MAX);
    }

    /// Submit a raw write payload. On success the cursor rewinds to 0 and
    /// the whole payload counts as consumed.
    pub fn write_frame(&mut self, frame: &[u8]) -> Result<usize> {
        let letter = decode_guess_frame(frame)?;
        self.guess(letter)?;
        Ok(frame.len())
    }

    /// Guess one letter. On success the cursor rewinds to 0.
    pub fn guess(&mut self, letter: char) -> Result<GuessOutcome> {
        let outcome = self.engine.guess(letter, &self.cancel)?;
        self.cursor = 0;
        Ok(outcome)
    }

    pub fn seek(&mut self, offset: i64, mode: SeekMode) -> Result<i64> {
        self.cursor = self.engine.seek(self.cursor, offset, mode, &self.cancel)?;
        Ok(self.cursor)
    }

    /// Whole snapshot from the start; leaves the cursor at the end.
    pub fn read_snapshot(&mut self) -> Result<String> {
        let snapshot = self.engine.snapshot(&self.cancel)?;
        self.cursor = 0;
        self.advance(snapshot.len());
        Ok(snapshot)
    }

    pub fn control(&mut self, command: Command) -> Result<Reply> {
        debug_log!("control command {command:?}");
        match command {
            Command::GetWordBank => self.engine.word_bank(&self.cancel).map(Reply::WordBank),
            Command::SetWordBank(list) => {
                self.engine.set_word_bank(&list, &self.cancel)?;
                Ok(Reply::Done)
            }
            Command::GetSecret => self.engine.secret(&self.cancel).map(Reply::Secret),
            Command::SetSecret(word) => {
                self.engine.set_secret(&word, &self.cancel)?;
                Ok(Reply::Done)
            }
            Command::Restart => {
                self.engine.restart(&self.cancel)?;
                self.cursor = 0;
                info_log!("session restarted the game");
                Ok(Reply::Done)
            }
        }
    }
}

impl Read for Session {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let count = self.engine.read_into(self.cursor, buf, &self.cancel)?;
        self.advance(count);
        Ok(count)
    }
}

impl Write for Session {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.write_frame(buf)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for Session {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (offset, mode) = match pos {
            SeekFrom::Start(offset) => (
                i64::try_from(offset).unwrap_or(i64::MAX),
                SeekMode::Absolute,
            ),
            SeekFrom::Current(offset) => (offset, SeekMode::Relative),
            SeekFrom::End(offset) => (offset, SeekMode::FromEnd),
        };
        let cursor = Session::seek(self, offset, mode)?;
        u64::try_from(cursor).map_err(|_| HangmanError::InvalidOffset(cursor).into())
    }
}
