// Library interface for hangman
// The binary and integration tests both go through these modules

pub mod cli;
pub mod engine;
pub mod error;
pub mod game_state;
pub mod lock;
pub mod logging;
pub mod render;
pub mod session;
pub mod tui;
pub mod wire;
pub mod wordbank;

// Re-export commonly used items for easier testing
pub use engine::{Engine, SeekMode};
pub use error::{HangmanError, Result};
pub use game_state::{GameState, GuessOutcome, MAX_GUESSES, Status};
pub use lock::CancelToken;
pub use render::render;
pub use session::{Command, Reply, Session};
pub use wordbank::{WordBank, load_wordbank_from_file, load_wordbank_from_str};
