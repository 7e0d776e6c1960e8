use hangman::cli::{Cli, CliInterface, parse_cli};
use hangman::logging::{LogTarget, default_log_path, init_logging};
use hangman::tui::TuiInterface;
use hangman::wordbank::default_wordbank_path;
use hangman::{Engine, Session, WordBank, load_wordbank_from_file};
use std::io;
use std::sync::Arc;

fn main() {
    let cli = parse_cli();
    let target = if cli.tui {
        default_log_path().map_or(LogTarget::Stderr, LogTarget::File)
    } else {
        LogTarget::Stderr
    };
    init_logging(cli.log_level(), &target);

    let engine = match build_engine(&cli) {
        Ok(engine) => engine,
        Err(message) => {
            eprintln!("{message}");
            return;
        }
    };
    let mut session = Session::new(Arc::new(engine));

    let result = if cli.tui {
        TuiInterface::new().and_then(|mut tui| tui.run(&mut session))
    } else {
        let stdin = io::stdin();
        CliInterface::new(stdin.lock(), io::stdout()).run(&mut session)
    };
    if let Err(e) = result {
        eprintln!("Error: {e}");
    }
}

fn build_engine(cli: &Cli) -> Result<Engine, String> {
    let words = match &cli.wordbank_path {
        Some(path) => load_wordbank_from_file(path)
            .map_err(|e| format!("Failed to load word bank from '{path}': {e}"))?,
        // A missing default file just means an empty bank
        None => default_wordbank_path()
            .filter(|path| path.exists())
            .and_then(|path| load_wordbank_from_file(path).ok())
            .unwrap_or_default(),
    };
    let bank = WordBank::from_words(words).map_err(|e| format!("Invalid word bank: {e}"))?;

    match &cli.secret {
        Some(secret) => {
            Engine::with_secret(bank, secret).map_err(|e| format!("Invalid secret '{secret}': {e}"))
        }
        None => Ok(Engine::new(bank)),
    }
}
