//! Fixed-buffer encodings for transports that mirror the classic device
//! interface: a 500-byte word-bank buffer, a 50-byte secret buffer, and a
//! `letter + NUL` guess frame.
//!
//! The word bank is comma-separated with no escaping, so a comma can never
//! appear inside a word.

use crate::debug_log;
use crate::error::{HangmanError, Result};
use crate::game_state::MAX_SECRET_LEN;
use crate::session::{Command, Session};
use crate::wordbank::MAX_BANK_LEN;

pub const BANK_BUFFER_LEN: usize = MAX_BANK_LEN;
pub const SECRET_BUFFER_LEN: usize = MAX_SECRET_LEN + 1;

/// Control requests carried over a caller-owned byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    GetWordBank,
    SetWordBank,
    GetSecret,
    SetSecret,
    Restart,
}

/// Run `request` on behalf of `session`, using `buf` as its argument or
/// result buffer. Returns 0 on success or a negative errno code.
///
/// Get requests need `buf` to hold [`BANK_BUFFER_LEN`] or
/// [`SECRET_BUFFER_LEN`] bytes. Set requests read text up to the first NUL.
pub fn control(session: &mut Session, request: Request, buf: &mut [u8]) -> i32 {
    match run_request(session, request, buf) {
        Ok(()) => 0,
        Err(err) => {
            debug_log!("control request {request:?} failed: {err}");
            err.errno()
        }
    }
}

fn run_request(session: &mut Session, request: Request, buf: &mut [u8]) -> Result<()> {
    let cancel = session.cancel_token();
    match request {
        Request::GetWordBank => {
            let list = session.engine().word_bank(&cancel)?;
            fill(buf, &encode_bank(&list))
        }
        Request::SetWordBank => {
            let list = decode_bank(buf)?;
            session.control(Command::SetWordBank(list)).map(drop)
        }
        Request::GetSecret => {
            let secret = session.engine().secret(&cancel)?;
            fill(buf, &encode_secret(&secret))
        }
        Request::SetSecret => {
            let secret = decode_secret(buf)?;
            session.control(Command::SetSecret(secret)).map(drop)
        }
        Request::Restart => session.control(Command::Restart).map(drop),
    }
}

fn fill(buf: &mut [u8], encoded: &[u8]) -> Result<()> {
    let available = buf.len();
    let dest = buf.get_mut(..encoded.len()).ok_or_else(|| {
        HangmanError::invalid_input(format!(
            "buffer holds {available} bytes, {} needed",
            encoded.len()
        ))
    })?;
    dest.copy_from_slice(encoded);
    Ok(())
}

/// Extract the guessed character from a write payload.
///
/// Accepts `[letter, 0]`, `[letter, b'\n']` (what `echo` produces) or a bare
/// `[letter]`. Anything else is not exactly one character and is rejected.
pub fn decode_guess_frame(frame: &[u8]) -> Result<char> {
    match frame {
        [letter] | [letter, 0 | b'\n'] if *letter != 0 => Ok(char::from(*letter)),
        _ => Err(HangmanError::invalid_input(format!(
            "expected a single letter, got {} byte(s)",
            frame.len()
        ))),
    }
}

/// Secret as a NUL-padded buffer; always keeps a terminating NUL.
#[must_use]
pub fn encode_secret(secret: &str) -> [u8; SECRET_BUFFER_LEN] {
    let mut buf = [0u8; SECRET_BUFFER_LEN];
    let bytes = secret.as_bytes();
    let len = bytes.len().min(SECRET_BUFFER_LEN - 1);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

pub fn decode_secret(buf: &[u8]) -> Result<String> {
    let text = until_nul(buf, SECRET_BUFFER_LEN)?;
    Ok(text.to_string())
}

#[must_use]
pub fn encode_bank(list: &str) -> [u8; BANK_BUFFER_LEN] {
    let mut buf = [0u8; BANK_BUFFER_LEN];
    let bytes = list.as_bytes();
    let len = bytes.len().min(BANK_BUFFER_LEN);
    buf[..len].copy_from_slice(&bytes[..len]);
    buf
}

pub fn decode_bank(buf: &[u8]) -> Result<String> {
    let text = until_nul(buf, BANK_BUFFER_LEN)?;
    Ok(text.to_string())
}

fn until_nul(buf: &[u8], limit: usize) -> Result<&str> {
    let buf = &buf[..buf.len().min(limit)];
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    std::str::from_utf8(&buf[..end])
        .map_err(|_| HangmanError::invalid_input("buffer is not valid text"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::wordbank::WordBank;
    use std::sync::Arc;

    fn session() -> Session {
        let engine = Engine::with_secret(WordBank::new(), "EXAMPLE").unwrap();
        Session::new(Arc::new(engine))
    }

    #[test]
    fn test_decode_guess_frame() {
        assert_eq!(decode_guess_frame(b"E\0"), Ok('E'));
        assert_eq!(decode_guess_frame(b"e\n"), Ok('e'));
        assert_eq!(decode_guess_frame(b"Q"), Ok('Q'));
        // Not alphabetic, but still one character; the game rejects it.
        assert_eq!(decode_guess_frame(b"1\0"), Ok('1'));
    }

    #[test]
    fn test_decode_guess_frame_rejects_other_lengths() {
        assert!(decode_guess_frame(b"").is_err());
        assert!(decode_guess_frame(b"\0").is_err());
        assert!(decode_guess_frame(b"HELLO").is_err());
        assert!(decode_guess_frame(b"AB").is_err());
        assert!(decode_guess_frame(b"A\0\0").is_err());
    }

    #[test]
    fn test_secret_buffer() {
        let buf = encode_secret("EXAMPLE");
        assert_eq!(&buf[..8], b"EXAMPLE\0");
        assert!(buf[7..].iter().all(|&b| b == 0));
        assert_eq!(decode_secret(&buf).unwrap(), "EXAMPLE");

        let long = "L".repeat(80);
        let buf = encode_secret(&long);
        assert_eq!(buf[SECRET_BUFFER_LEN - 1], 0);
        assert_eq!(decode_secret(&buf).unwrap().len(), SECRET_BUFFER_LEN - 1);
    }

    #[test]
    fn test_bank_buffer() {
        let buf = encode_bank("HELLO,GOODBYE,TEST_A,TEST_B");
        assert_eq!(buf.len(), BANK_BUFFER_LEN);
        assert_eq!(decode_bank(&buf).unwrap(), "HELLO,GOODBYE,TEST_A,TEST_B");
        assert_eq!(decode_bank(b"CAT,DOG").unwrap(), "CAT,DOG");
        assert!(decode_bank(&[0xff, 0xfe]).is_err());
    }

    #[test]
    fn test_control_get_requests() {
        let mut session = session();
        let mut bank = [0xaa; BANK_BUFFER_LEN];
        assert_eq!(control(&mut session, Request::GetWordBank, &mut bank), 0);
        assert_eq!(&bank[..8], b"EXAMPLE\0");

        let mut secret = [0u8; SECRET_BUFFER_LEN];
        assert_eq!(control(&mut session, Request::GetSecret, &mut secret), 0);
        assert_eq!(decode_secret(&secret).unwrap(), "EXAMPLE");

        let mut short = [0u8; 8];
        assert_eq!(control(&mut session, Request::GetSecret, &mut short), -14);
        assert_eq!(short, [0u8; 8]);
    }

    #[test]
    fn test_control_set_requests() {
        let mut session = session();
        let mut bank = encode_bank("CAT,DOG");
        assert_eq!(control(&mut session, Request::SetWordBank, &mut bank), 0);
        assert_eq!(session.engine().word_bank(&session.cancel_token()).unwrap(), "CAT,DOG");

        let mut secret = encode_secret("goodbye");
        assert_eq!(control(&mut session, Request::SetSecret, &mut secret), 0);
        assert_eq!(session.engine().secret(&session.cancel_token()).unwrap(), "GOODBYE");

        let mut bad = encode_secret("123");
        assert_eq!(control(&mut session, Request::SetSecret, &mut bad), -14);
        assert_eq!(session.engine().secret(&session.cancel_token()).unwrap(), "GOODBYE");
    }

    #[test]
    fn test_control_restart_rewinds_cursor() {
        let mut session = session();
        session.read_chunk(6).unwrap();
        assert_eq!(control(&mut session, Request::Restart, &mut []), 0);
        assert_eq!(session.cursor(), 0);
    }
}
