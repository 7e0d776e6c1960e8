use crate::error::{HangmanError, Result};
use crate::render::PLACEHOLDER;
use rand::Rng;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Most words the bank will hold.
pub const MAX_WORDS: usize = 32;
/// Longest single word, in characters.
pub const MAX_WORD_LEN: usize = 63;
/// Longest comma-joined rendering of the bank, in bytes.
pub const MAX_BANK_LEN: usize = 500;
/// Word the bank is seeded with when a game needs a word and none exist.
pub const DEFAULT_WORD: &str = "EXAMPLE";

const SEPARATOR: char = ',';

/// Ordered pool of candidate secrets.
///
/// Only ever replaced wholesale; insertion order is preserved for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordBank {
    words: Vec<String>,
}

impl WordBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_words(words: Vec<String>) -> Result<Self> {
        validate_words(&words)?;
        Ok(Self { words })
    }

    /// Swap in a new list. Nothing changes if the list is empty or any word
    /// is rejected.
    pub fn replace(&mut self, words: Vec<String>) -> Result<()> {
        if words.is_empty() {
            return Err(HangmanError::invalid_input("word list is empty"));
        }
        validate_words(&words)?;
        self.words = words;
        Ok(())
    }

    /// Comma-joined rendering of the bank.
    pub fn snapshot(&self) -> Result<String> {
        if self.words.is_empty() {
            return Err(HangmanError::Empty);
        }
        Ok(self.words.join(","))
    }

    /// Pick a word uniformly at random, seeding the default word first if
    /// the bank is empty.
    pub fn draw_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> String {
        self.seed_default();
        let idx = rng.gen_range(0..self.words.len());
        self.words[idx].clone()
    }

    /// Put the default word in an empty bank.
    pub fn seed_default(&mut self) {
        if self.words.is_empty() {
            self.words.push(DEFAULT_WORD.to_string());
        }
    }

    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Characters a stored word may contain. The separator is excluded since
/// the wire format has no escaping, the placeholder since a revealed one
/// would read as hidden.
#[must_use]
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_graphic() && c != SEPARATOR && c != PLACEHOLDER
}

pub fn validate_word(word: &str) -> Result<()> {
    if word.is_empty() {
        return Err(HangmanError::invalid_input("empty word"));
    }
    if word.len() > MAX_WORD_LEN {
        return Err(HangmanError::invalid_input(format!(
            "word '{word}' is longer than {MAX_WORD_LEN} characters"
        )));
    }
    if let Some(bad) = word.chars().find(|&c| !is_word_char(c)) {
        return Err(HangmanError::invalid_input(format!(
            "word '{word}' contains unsupported character {bad:?}"
        )));
    }
    if !word.chars().any(|c| c.is_ascii_alphabetic()) {
        return Err(HangmanError::invalid_input(format!(
            "word '{word}' has no letters to guess"
        )));
    }
    Ok(())
}

pub fn validate_words(words: &[String]) -> Result<()> {
    if words.len() > MAX_WORDS {
        return Err(HangmanError::invalid_input(format!(
            "{} words given, the bank holds at most {MAX_WORDS}",
            words.len()
        )));
    }
    for word in words {
        validate_word(word)?;
    }
    if joined_len(words) > MAX_BANK_LEN {
        return Err(HangmanError::invalid_input(format!(
            "word bank exceeds {MAX_BANK_LEN} bytes"
        )));
    }
    Ok(())
}

fn joined_len(words: &[String]) -> usize {
    words.iter().map(String::len).sum::<usize>() + words.len().saturating_sub(1)
}

/// Split a comma-separated list into words. [`WordBank::replace`] decides
/// whether they make a valid bank.
#[must_use]
pub fn parse_word_list(list: &str) -> Vec<String> {
    list.split(SEPARATOR).map(str::to_string).collect()
}

/// Default location of the startup word file.
#[must_use]
pub fn default_wordbank_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hangman").join("wordbank.txt"))
}

fn normalize_line(line: &str) -> Option<String> {
    let word = line.trim();
    if word.is_empty() || word.starts_with('#') {
        return None;
    }
    let word = word.to_uppercase();
    (word.len() <= MAX_WORD_LEN && word.chars().all(|c| c.is_ascii_alphabetic())).then_some(word)
}

// Keeps accepting words while the bank still has room for them.
fn push_if_room(words: &mut Vec<String>, word: String) -> bool {
    if words.len() >= MAX_WORDS {
        return false;
    }
    let extra = if words.is_empty() { word.len() } else { word.len() + 1 };
    if joined_len(words) + extra > MAX_BANK_LEN {
        return false;
    }
    words.push(word);
    true
}

pub fn load_wordbank_from_str(data: &str) -> Vec<String> {
    let mut words = Vec::new();
    for word in data.lines().filter_map(normalize_line) {
        if !push_if_room(&mut words, word) {
            break;
        }
    }
    words
}

pub fn load_wordbank_from_file<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut words = Vec::new();
    for line in reader.lines() {
        if let Some(word) = normalize_line(&line?)
            && !push_if_room(&mut words, word)
        {
            break;
        }
    }
    Ok(words)
}
