//! TUI (Terminal User Interface) module for Hangman
//!
//! This module provides an interactive terminal interface using Ratatui.
//! It is a front end like any other: every action goes through a
//! [`Session`], so other sessions on the same engine see its guesses.
//!
//! # Keys
//! - letters guess
//! - `Ctrl-R` restarts, as does `N` once the game is over
//! - `Esc` / `Ctrl-C` quit

use crate::error::HangmanError;
use crate::game_state::{GameState, GuessOutcome, Status};
use crate::render::{PLACEHOLDER, status_line};
use crate::session::{Command, Session};
use crate::{debug_log, info_log};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io;
use std::time::Duration;

const EVENT_POLL_TIMEOUT: Duration = Duration::from_millis(100);
const ASCII_CONTROL_CHAR_THRESHOLD: u32 = 32;

// Style constants for consistent UI
const HEADER_STYLE: Style = Style::new().fg(Color::Cyan).add_modifier(Modifier::BOLD);
const ERROR_STYLE: Style = Style::new().fg(Color::Red);
const SUCCESS_STYLE: Style = Style::new().fg(Color::Green).add_modifier(Modifier::BOLD);
const HIDDEN_STYLE: Style = Style::new().fg(Color::DarkGray);
const MESSAGE_STYLE: Style = Style::new().fg(Color::Cyan);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Guess(char),
    Restart,
    Exit,
}

/// Everything one frame needs, captured under the engine's locks.
struct View {
    game: GameState,
    bank: String,
}

impl View {
    fn capture(session: &Session) -> Result<Self, HangmanError> {
        let cancel = session.cancel_token();
        let engine = session.engine();
        Ok(Self {
            game: engine.game(&cancel)?,
            bank: engine.word_bank(&cancel)?,
        })
    }
}

/// Main TUI interface component.
pub struct TuiInterface {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    message: String,
    error_message: String,
}

impl TuiInterface {
    pub fn new() -> Result<Self, io::Error> {
        info_log!("TuiInterface::new() - Initializing TUI");
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        info_log!("Terminal setup complete");

        Ok(Self {
            terminal,
            message: "Guess a letter to begin.".to_string(),
            error_message: String::new(),
        })
    }

    pub fn cleanup(&mut self) -> Result<(), io::Error> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            cursor::Show
        )?;
        Ok(())
    }

    /// Run until the user quits.
    pub fn run(&mut self, session: &mut Session) -> Result<(), io::Error> {
        loop {
            let view = View::capture(session)?;
            self.draw(&view)?;

            let Some(action) = self.poll_action(view.game.status().is_terminal())? else {
                continue;
            };
            info_log!("run() - action {:?}", action);

            match action {
                UserAction::Exit => break,
                UserAction::Guess(letter) => self.apply_guess(session, letter),
                UserAction::Restart => self.apply_restart(session),
            }
        }
        Ok(())
    }

    fn apply_guess(&mut self, session: &mut Session, letter: char) {
        self.error_message.clear();
        match session.guess(letter) {
            Ok(GuessOutcome::Revealed(count)) => {
                let upper = letter.to_ascii_uppercase();
                self.message = format!("{upper} appears {count} time(s).");
            }
            Ok(GuessOutcome::Missed) => {
                let upper = letter.to_ascii_uppercase();
                self.message = format!("No {upper} in the word.");
            }
            Ok(GuessOutcome::AlreadyGuessed) => {
                let upper = letter.to_ascii_uppercase();
                self.message = format!("{upper} was already guessed.");
            }
            Err(HangmanError::GameOver) => {
                self.error_message = "The game is over. Press N for a new one.".to_string();
            }
            Err(err) => self.error_message = err.to_string(),
        }
    }

    fn apply_restart(&mut self, session: &mut Session) {
        self.error_message.clear();
        match session.control(Command::Restart) {
            Ok(_) => self.message = "New game started.".to_string(),
            Err(err) => self.error_message = err.to_string(),
        }
    }

    fn draw(&mut self, view: &View) -> Result<(), io::Error> {
        let message = &self.message;
        let error_message = &self.error_message;
        self.terminal.draw(|f| {
            render_static(f, view, message, error_message);
        })?;
        Ok(())
    }

    fn poll_action(&mut self, game_over: bool) -> Result<Option<UserAction>, io::Error> {
        if !event::poll(EVENT_POLL_TIMEOUT)? {
            return Ok(None);
        }

        match event::read()? {
            Event::Key(key) => Ok(action_for_key(key, game_over)),
            other => {
                debug_log!("poll_action() - Ignoring event: {:?}", other);
                Ok(None)
            }
        }
    }
}

impl Drop for TuiInterface {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

/// Map a key press onto an action. Non-letters are still passed on as
/// guesses so the engine can reject them.
#[must_use]
pub fn action_for_key(key: KeyEvent, game_over: bool) -> Option<UserAction> {
    // Only process Press events, ignore Release and Repeat to avoid double input
    if key.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => Some(UserAction::Exit),
        KeyCode::Char('c') if ctrl => Some(UserAction::Exit),
        KeyCode::Char('r') if ctrl => Some(UserAction::Restart),
        KeyCode::Char('n' | 'N') if game_over => Some(UserAction::Restart),
        KeyCode::Char(_) if ctrl || key.modifiers.contains(KeyModifiers::ALT) => None,
        // Garbage from escape sequences when alt-tabbing
        KeyCode::Char(c) if c == '\u{FFFD}' || (c as u32) < ASCII_CONTROL_CHAR_THRESHOLD => {
            debug_log!("action_for_key() - Ignoring control character {:?}", c);
            None
        }
        KeyCode::Char(c) => Some(UserAction::Guess(c)),
        _ => None,
    }
}

/// Styled lines for the board panel: reveal line, misses, guesses left and
/// the final verdict.
#[must_use]
pub fn board_lines(game: &GameState) -> Vec<Line<'static>> {
    let mut reveal = vec![Span::raw("  ")];
    for slot in game.reveal() {
        let span = match slot {
            Some(c) => Span::styled(format!("{c} "), SUCCESS_STYLE),
            None => Span::styled(format!("{PLACEHOLDER} "), HIDDEN_STYLE),
        };
        reveal.push(span);
    }

    let misses: Vec<String> = game.bad_guesses().iter().map(char::to_string).collect();
    let mut lines = vec![
        Line::from(reveal),
        Line::from(""),
        Line::from(vec![
            Span::raw("  Misses: "),
            Span::styled(misses.join(" "), ERROR_STYLE),
        ]),
        Line::from(format!("  {} guesses left", game.guesses_remaining())),
    ];

    if let Some(verdict) = status_line(game.status()) {
        let style = if game.status() == Status::Won {
            SUCCESS_STYLE
        } else {
            ERROR_STYLE
        };
        lines.push(Line::from(Span::styled(
            format!("  {}", verdict.trim_end()),
            style,
        )));
    }
    lines
}

fn render_static(f: &mut Frame, view: &View, message: &str, error_message: &str) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(8), // Board
            Constraint::Min(5),    // Info panel
            Constraint::Length(3), // Instructions
        ])
        .split(f.area());

    render_title(f, chunks[0]);
    render_board(f, chunks[1], &view.game);
    render_info(f, chunks[2], &view.bank, message, error_message);
    render_instructions(f, chunks[3], view.game.status());
}

fn render_title(f: &mut Frame, area: Rect) {
    let title = Paragraph::new("HANGMAN")
        .style(HEADER_STYLE)
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, area);
}

fn render_board(f: &mut Frame, area: Rect, game: &GameState) {
    let paragraph =
        Paragraph::new(board_lines(game)).block(Block::default().title("Board").borders(Borders::ALL));
    f.render_widget(paragraph, area);
}

fn render_info(f: &mut Frame, area: Rect, bank: &str, message: &str, error_message: &str) {
    let mut lines = vec![
        Line::from(vec![Span::styled("Word bank: ", HEADER_STYLE), Span::raw(bank.to_string())]),
        Line::from(""),
    ];
    if !message.is_empty() {
        lines.push(Line::from(Span::styled(message.to_string(), MESSAGE_STYLE)));
    }
    if !error_message.is_empty() {
        lines.push(Line::from(Span::styled(error_message.to_string(), ERROR_STYLE)));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Information").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn render_instructions(f: &mut Frame, area: Rect, status: Status) {
    let text = if status.is_terminal() {
        "N: New game | ESC: Quit"
    } else {
        "Type a letter to guess | CTRL-R: Restart | ESC: Quit"
    };
    let paragraph = Paragraph::new(text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(paragraph, area);
}
