use crate::error::{HangmanError, Result};
use crate::wordbank::is_word_char;

/// Guesses a fresh game starts with.
pub const MAX_GUESSES: u8 = 10;
/// Longest secret a caller may set directly.
pub const MAX_SECRET_LEN: usize = 49;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Lost,
    Won,
}

impl Status {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::InProgress)
    }
}

/// What a single accepted guess did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuessOutcome {
    /// The letter occurs in the secret; carries the number of positions revealed.
    Revealed(usize),
    /// The letter is absent and cost a guess.
    Missed,
    /// The letter was guessed before. Nothing changed.
    AlreadyGuessed,
}

/// The single active game.
///
/// `reveal` is parallel to `secret`: `Some(c)` for a shown position, `None`
/// for a hidden one. Non-letter characters of a secret start out shown since
/// no guess could ever uncover them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    secret: String,
    reveal: Vec<Option<char>>,
    bad_guesses: Vec<char>,
    guesses_remaining: u8,
    status: Status,
}

impl GameState {
    /// Start a game with `word` as the secret. The word is uppercased.
    #[must_use]
    pub fn new(word: &str) -> Self {
        let secret = word.to_ascii_uppercase();
        let reveal = secret
            .chars()
            .map(|c| (!c.is_ascii_alphabetic()).then_some(c))
            .collect();
        let mut game = Self {
            secret,
            reveal,
            bad_guesses: Vec::new(),
            guesses_remaining: MAX_GUESSES,
            status: Status::InProgress,
        };
        if game.is_solved() {
            game.status = Status::Won;
        }
        game
    }

    /// Start a game with a caller-supplied secret, validating it first.
    pub fn with_secret(word: &str) -> Result<Self> {
        validate_secret(word)?;
        Ok(Self::new(word))
    }

    /// Apply one letter guess.
    ///
    /// Repeating a letter is accepted and changes nothing. Guessing after the
    /// game ended fails with `GameOver`, a non-letter with `InvalidInput`.
    pub fn guess(&mut self, letter: char) -> Result<GuessOutcome> {
        if self.status.is_terminal() {
            return Err(HangmanError::GameOver);
        }
        if !letter.is_ascii_alphabetic() {
            return Err(HangmanError::invalid_input(format!(
                "{letter:?} is not a letter"
            )));
        }

        let letter = letter.to_ascii_uppercase();
        if self.already_guessed(letter) {
            return Ok(GuessOutcome::AlreadyGuessed);
        }

        let revealed = self.reveal_letter(letter);
        if revealed == 0 {
            self.bad_guesses.push(letter);
            self.guesses_remaining -= 1;
            if self.guesses_remaining == 0 {
                self.status = Status::Lost;
            }
            return Ok(GuessOutcome::Missed);
        }

        if self.is_solved() {
            self.status = Status::Won;
        }
        Ok(GuessOutcome::Revealed(revealed))
    }

    fn already_guessed(&self, letter: char) -> bool {
        self.reveal.contains(&Some(letter)) || self.bad_guesses.contains(&letter)
    }

    fn reveal_letter(&mut self, letter: char) -> usize {
        let mut count = 0;
        for (slot, c) in self.reveal.iter_mut().zip(self.secret.chars()) {
            if c == letter {
                *slot = Some(c);
                count += 1;
            }
        }
        count
    }

    #[must_use]
    pub fn is_solved(&self) -> bool {
        self.reveal.iter().all(Option::is_some)
    }

    #[must_use]
    pub fn secret(&self) -> &str {
        &self.secret
    }

    #[must_use]
    pub fn reveal(&self) -> &[Option<char>] {
        &self.reveal
    }

    #[must_use]
    pub fn bad_guesses(&self) -> &[char] {
        &self.bad_guesses
    }

    #[must_use]
    pub fn guesses_remaining(&self) -> u8 {
        self.guesses_remaining
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }
}

pub fn validate_secret(word: &str) -> Result<()> {
    if word.is_empty() {
        return Err(HangmanError::invalid_input("secret word is empty"));
    }
    if word.len() > MAX_SECRET_LEN {
        return Err(HangmanError::invalid_input(format!(
            "secret word is longer than {MAX_SECRET_LEN} characters"
        )));
    }
    if let Some(bad) = word.chars().find(|&c| !is_word_char(c)) {
        return Err(HangmanError::invalid_input(format!(
            "secret word contains unsupported character {bad:?}"
        )));
    }
    if !word.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(HangmanError::invalid_input("secret word has no letters"));
    }
    Ok(())
}
