//! Inbound commands from the remote command channel.
//!
//! The envelope is a flat JSON-like object of string or bare scalar
//! values:
//!
//! ```text
//!   { "command": "arm", "source": "app" }
//! ```
//!
//! [`parse`] is a small hand-written recursive-descent reader over that
//! subset.  It fails closed: nesting, arrays, trailing input, unterminated
//! strings, or a missing `command` key are all errors.  Keys other than
//! `command` and `source` are ignored.

use crate::error::ParseError;

/// Byte capacity of every key and value.
pub const FIELD_CAP: usize = 32;

/// Fixed-capacity envelope field.
pub type Field = heapless::String<FIELD_CAP>;

/// What the remote side asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandAction {
    Arm,
    Disarm,
    Reset,
    Status,
    /// Anything else, kept for the echo in the response.
    Unknown(Field),
}

impl CommandAction {
    /// Exact, case-sensitive match on the command name.
    pub fn from_name(name: Field) -> Self {
        match name.as_str() {
            "arm" => Self::Arm,
            "disarm" => Self::Disarm,
            "reset" => Self::Reset,
            "status" => Self::Status,
            _ => Self::Unknown(name),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Arm => "arm",
            Self::Disarm => "disarm",
            Self::Reset => "reset",
            Self::Status => "status",
            Self::Unknown(name) => name.as_str(),
        }
    }
}

/// A parsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub action: CommandAction,
    /// Free-form origin tag, informational only.
    pub source: Option<Field>,
}

/// Parse one envelope.
pub fn parse(text: &str) -> Result<Command, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    let mut cur = Cursor::new(text);
    let mut command = None;
    let mut source = None;

    cur.skip_ws();
    cur.expect(b'{')?;
    cur.skip_ws();

    if !cur.eat(b'}') {
        loop {
            // A key longer than the cap cannot name a known field.
            let key = cur.string(Overflow::Truncate)?;
            cur.skip_ws();
            cur.expect(b':')?;
            cur.skip_ws();

            match key.as_str() {
                "command" => command = Some(cur.value(Overflow::Reject)?),
                "source" => source = Some(cur.value(Overflow::Truncate)?),
                _ => {
                    cur.value(Overflow::Skip)?;
                }
            }

            cur.skip_ws();
            if cur.eat(b',') {
                cur.skip_ws();
                continue;
            }
            cur.expect(b'}')?;
            break;
        }
    }

    cur.skip_ws();
    if !cur.at_end() {
        return Err(ParseError::Malformed);
    }

    let name = command.ok_or(ParseError::MissingCommand)?;
    Ok(Command {
        action: CommandAction::from_name(name),
        source,
    })
}

// ───────────────────────────────────────────────────────────────
// Cursor
// ───────────────────────────────────────────────────────────────

struct Cursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, byte: u8) -> bool {
        if self.peek() == Some(byte) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), ParseError> {
        if self.eat(byte) {
            Ok(())
        } else {
            Err(ParseError::Malformed)
        }
    }

    fn value(&mut self, overflow: Overflow) -> Result<Field, ParseError> {
        match self.peek() {
            Some(b'"') => self.string(overflow),
            Some(_) => self.scalar(overflow),
            None => Err(ParseError::Malformed),
        }
    }

    /// Quoted string with the common single-character escapes.
    fn string(&mut self, overflow: Overflow) -> Result<Field, ParseError> {
        self.expect(b'"')?;
        let mut out = Field::new();
        loop {
            // Quote, backslash and control bytes are ASCII, so `start..pos`
            // always lands on char boundaries.
            let start = self.pos;
            while self
                .peek()
                .is_some_and(|b| b != b'"' && b != b'\\' && b >= 0x20)
            {
                self.pos += 1;
            }
            overflow.keep(&mut out, &self.src[start..self.pos])?;

            match self.bump() {
                Some(b'"') => return Ok(out),
                Some(b'\\') => {
                    let c = match self.bump() {
                        Some(b'"') => "\"",
                        Some(b'\\') => "\\",
                        Some(b'/') => "/",
                        Some(b'n') => "\n",
                        Some(b't') => "\t",
                        _ => return Err(ParseError::Malformed),
                    };
                    overflow.keep(&mut out, c)?;
                }
                // Unterminated, or a raw control byte.
                _ => return Err(ParseError::Malformed),
            }
        }
    }

    /// Bare number / `true` / `false` / `null`.
    fn scalar(&mut self, overflow: Overflow) -> Result<Field, ParseError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-'))
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(ParseError::Malformed);
        }
        let mut out = Field::new();
        overflow.keep(&mut out, &self.src[start..self.pos])?;
        Ok(out)
    }
}

/// What to do with value text that does not fit a [`Field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Overflow {
    /// Fail with [`ParseError::FieldTooLong`].
    Reject,
    /// Keep the first `FIELD_CAP` bytes, cut on a char boundary.
    Truncate,
    /// Validate the syntax but store nothing.
    Skip,
}

impl Overflow {
    fn keep(self, out: &mut Field, text: &str) -> Result<(), ParseError> {
        match self {
            Self::Reject => out.push_str(text).map_err(|()| ParseError::FieldTooLong),
            Self::Truncate => {
                for c in text.chars() {
                    if out.push(c).is_err() {
                        break;
                    }
                }
                Ok(())
            }
            Self::Skip => Ok(()),
        }
    }
}
