use crate::engine::SeekMode;
use crate::error::HangmanError;
use crate::session::{Command, Reply, Session};
use crate::{debug_log, info_log};
use clap::Parser;
use log::LevelFilter;
use std::io::{self, BufRead, Read, Write};

/// Hangman CLI options
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a newline-delimited word bank file
    #[arg(short = 'i', long = "input")]
    pub wordbank_path: Option<String>,

    /// Secret word for the first game instead of a random one
    #[arg(short = 's', long = "secret")]
    pub secret: Option<String>,

    /// Run the full-screen terminal interface
    #[arg(long)]
    pub tui: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    #[must_use]
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// Raw write payload, handed to the session as-is.
    Guess(Vec<u8>),
    Control(Command),
    Help,
    Exit,
    Empty,
    Unknown(String),
}

pub fn parse_input(line: &str) -> UserInput {
    let line = line.trim();
    if line.is_empty() {
        return UserInput::Empty;
    }

    if let Some(rest) = line.strip_prefix(':') {
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        return match (name.to_ascii_lowercase().as_str(), arg.is_empty()) {
            ("bank", true) => UserInput::Control(Command::GetWordBank),
            ("bank", false) => UserInput::Control(Command::SetWordBank(arg.to_string())),
            ("secret", true) => UserInput::Control(Command::GetSecret),
            ("secret", false) => UserInput::Control(Command::SetSecret(arg.to_string())),
            ("restart", _) => UserInput::Control(Command::Restart),
            ("help", _) => UserInput::Help,
            ("quit" | "q", _) => UserInput::Exit,
            _ => UserInput::Unknown(line.to_string()),
        };
    }

    if line.eq_ignore_ascii_case("exit") {
        return UserInput::Exit;
    }

    let mut frame = line.as_bytes().to_vec();
    frame.push(0);
    UserInput::Guess(frame)
}

const HELP_TEXT: &str = "\
Type a single letter to guess it.
  :bank             show the word bank
  :bank A,B,C       replace the word bank
  :secret           show the secret word
  :secret WORD      start a new game with WORD
  :restart          reset the word bank and start over
  :help             show this help
  :quit             leave";

/// Line-oriented front end over a [`Session`].
pub struct CliInterface<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> CliInterface<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Play until the input ends or the user quits.
    pub fn run(&mut self, session: &mut Session) -> io::Result<()> {
        self.display_board(session)?;
        writeln!(self.writer, "Type :help for commands.")?;

        loop {
            write!(self.writer, "> ")?;
            self.writer.flush()?;

            let mut line = String::new();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }

            match parse_input(&line) {
                UserInput::Empty => {}
                UserInput::Exit => {
                    writeln!(self.writer, "Exiting.")?;
                    break;
                }
                UserInput::Help => writeln!(self.writer, "{HELP_TEXT}")?,
                UserInput::Unknown(text) => {
                    writeln!(self.writer, "Unknown command: {text}. Type :help for commands.")?;
                }
                UserInput::Guess(frame) => match session.write_frame(&frame) {
                    Ok(_) => self.display_board(session)?,
                    Err(err) => self.display_error(&err)?,
                },
                UserInput::Control(command) => self.run_command(session, command)?,
            }
        }
        info_log!("cli session finished");
        Ok(())
    }

    fn run_command(&mut self, session: &mut Session, command: Command) -> io::Result<()> {
        let restarts_game = matches!(command, Command::SetSecret(_) | Command::Restart);
        match session.control(command) {
            Ok(Reply::WordBank(list)) => writeln!(self.writer, "Word bank: {list}"),
            Ok(Reply::Secret(secret)) => writeln!(self.writer, "Secret word: {secret}"),
            Ok(Reply::Done) if restarts_game => {
                writeln!(self.writer, "New game started.")?;
                self.display_board(session)
            }
            Ok(Reply::Done) => writeln!(self.writer, "Word bank updated."),
            Err(err) => self.display_error(&err),
        }
    }

    /// Print the snapshot as a reader of the stream would see it.
    fn display_board(&mut self, session: &mut Session) -> io::Result<()> {
        session.seek(0, SeekMode::Absolute)?;
        let mut board = String::new();
        session.read_to_string(&mut board)?;
        write!(self.writer, "\n{board}")
    }

    fn display_error(&mut self, err: &HangmanError) -> io::Result<()> {
        debug_log!("cli rejected input: {err}");
        match err {
            HangmanError::GameOver => {
                writeln!(self.writer, "The game is over. Type :restart to play again.")
            }
            HangmanError::InvalidInput(reason) => writeln!(self.writer, "Invalid input: {reason}"),
            _ => writeln!(self.writer, "Error: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::wordbank::WordBank;
    use std::io::Cursor;
    use std::sync::Arc;

    fn run_script(script: &str) -> String {
        let engine = Engine::with_secret(WordBank::new(), "EXAMPLE").unwrap();
        let mut session = Session::new(Arc::new(engine));
        let mut interface = CliInterface::new(Cursor::new(script), Vec::new());
        interface.run(&mut session).unwrap();
        String::from_utf8(interface.into_writer()).unwrap()
    }

    #[test]
    fn test_log_level_from_verbosity() {
        let mut cli = Cli {
            wordbank_path: None,
            secret: None,
            tui: false,
            verbose: 0,
        };
        assert_eq!(cli.log_level(), LevelFilter::Warn);
        cli.verbose = 1;
        assert_eq!(cli.log_level(), LevelFilter::Info);
        cli.verbose = 5;
        assert_eq!(cli.log_level(), LevelFilter::Debug);
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from(["hangman", "-i", "words.txt", "--secret", "goodbye", "-vv"])
            .unwrap();
        assert_eq!(cli.wordbank_path.as_deref(), Some("words.txt"));
        assert_eq!(cli.secret.as_deref(), Some("goodbye"));
        assert!(!cli.tui);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_parse_input_guess() {
        assert_eq!(parse_input("e\n"), UserInput::Guess(b"e\0".to_vec()));
        assert_eq!(parse_input("  hello "), UserInput::Guess(b"hello\0".to_vec()));
        assert_eq!(parse_input("   \n"), UserInput::Empty);
        assert_eq!(parse_input("EXIT"), UserInput::Exit);
    }

    #[test]
    fn test_parse_input_commands() {
        assert_eq!(
            parse_input(":bank"),
            UserInput::Control(Command::GetWordBank)
        );
        assert_eq!(
            parse_input(":bank CAT,DOG"),
            UserInput::Control(Command::SetWordBank("CAT,DOG".to_string()))
        );
        assert_eq!(
            parse_input(":SECRET word"),
            UserInput::Control(Command::SetSecret("word".to_string()))
        );
        assert_eq!(parse_input(":restart"), UserInput::Control(Command::Restart));
        assert_eq!(parse_input(":q"), UserInput::Exit);
        assert_eq!(parse_input(":help"), UserInput::Help);
        assert_eq!(
            parse_input(":dance"),
            UserInput::Unknown(":dance".to_string())
        );
    }

    #[test]
    fn test_run_shows_board_after_guess() {
        let output = run_script("e\n");
        assert!(output.contains("- - - - - - - \n\n10 guesses left\n"));
        assert!(output.contains("E - - - - - E \n\n10 guesses left\n"));
    }

    #[test]
    fn test_run_reports_invalid_guess() {
        let output = run_script("hello\n7\n:quit\n");
        assert_eq!(output.matches("Invalid input").count(), 2);
        assert!(output.ends_with("Exiting.\n"));
    }

    #[test]
    fn test_run_win_then_game_over() {
        let output = run_script("e\nx\na\nm\np\nl\nz\n");
        assert!(output.contains("E X A M P L E \n\n10 guesses left\nYou Win!\n"));
        assert!(output.contains("The game is over. Type :restart to play again."));
    }

    #[test]
    fn test_run_control_commands() {
        let output = run_script(":bank\n:bank CAT,DOG\n:bank\n:secret\n:secret test\n:secret\n");
        assert!(output.contains("Word bank: EXAMPLE\n"));
        assert!(output.contains("Word bank updated.\n"));
        assert!(output.contains("Word bank: CAT,DOG\n"));
        assert!(output.contains("Secret word: EXAMPLE\n"));
        assert!(output.contains("- - - - \n\n10 guesses left\n"));
        assert!(output.contains("Secret word: TEST\n"));
    }

    #[test]
    fn test_run_rejects_bad_word_bank() {
        let output = run_script(":bank CAT,,DOG\n:bank\n");
        assert!(output.contains("Invalid input"));
        assert!(output.contains("Word bank: EXAMPLE\n"));
    }

    #[test]
    fn test_run_unknown_command() {
        let output = run_script(":dance\n");
        assert!(output.contains("Unknown command: :dance."));
    }
}
