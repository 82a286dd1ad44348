//! Tokenizer for workout notation
//!
//! Converts raw notation text into a flat token stream. Scanning is left to
//! right, longest-match-first (`..` before `.`, `20spm` before a bare
//! number, `[w]` before a bare `[`). Whitespace is insignificant and
//! discarded. Every token carries its source offsets so later stages can
//! point diagnostics at exact positions.

use thiserror::Error;

use super::ast::{Modality, Span, TagKind};
use super::guidance::Zone;

/// Token kinds.
///
/// Numbers and the `m`/`cal` units are separate tokens (`500m` is two);
/// rate shorthand (`r20`, `20spm`) and pace anchors (`2k`) are fused, since
/// they are atomic names rather than number/unit pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Bare integer: repeat counts, range bounds, relative offsets
    Number(u32),
    /// `m:ss` or `h:mm:ss`, held as total seconds
    Time(u32),
    /// `m`
    UnitMeters,
    /// `cal`
    UnitCalories,
    /// `Row:` / `Bike:` / `Ski:` / `Run:` / `Other:` (case-insensitive)
    Modality(Modality),
    /// `[w]` / `[c]` / `[t]` or legacy `#warmup` / `#cooldown` / `#test`
    Tag(TagKind),
    /// `x`
    RepeatX,
    /// `/`
    Slash,
    /// `r` terminating a rest suffix
    RestMarker,
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `..`
    Range,
    /// `@`
    At,
    /// `r20` or `20spm`, strokes per minute
    Rate(u32),
    /// `UT2` / `UT1` / `AT` / `TR` / `AN` (case-insensitive)
    Zone(Zone),
    /// Named test distance: `2k`, `5k`, `6k`, ...
    Anchor(String),
    LParen,
    RParen,
}

/// A single token with its kind, source text, and position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

/// Lexing failure. Fatal: no partial token stream is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("unexpected character '{unexpected}' at offset {position}")]
    UnexpectedChar { position: usize, unexpected: char },
    #[error("malformed time at offset {position}")]
    MalformedTime { position: usize },
    #[error("number out of range at offset {position}")]
    NumberOverflow { position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            LexError::UnexpectedChar { position, .. }
            | LexError::MalformedTime { position }
            | LexError::NumberOverflow { position } => *position,
        }
    }
}

/// Tokenize a notation string.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let mut scanner = Scanner {
        src: source,
        bytes: source.as_bytes(),
        pos: 0,
        tokens: Vec::new(),
    };
    scanner.run()?;
    Ok(scanner.tokens)
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn run(&mut self) -> Result<(), LexError> {
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() {
                self.pos += 1;
                continue;
            }
            match c {
                b'+' => self.push_single(TokenKind::Plus),
                b'-' => self.push_single(TokenKind::Minus),
                b'/' => self.push_single(TokenKind::Slash),
                b'@' => self.push_single(TokenKind::At),
                b'(' => self.push_single(TokenKind::LParen),
                b')' => self.push_single(TokenKind::RParen),
                b'.' => {
                    if self.peek_at(1) == Some(b'.') {
                        let start = self.pos;
                        self.pos += 2;
                        self.push(TokenKind::Range, start);
                    } else {
                        return Err(self.unexpected_here());
                    }
                }
                b'[' => self.bracket_tag()?,
                b'#' => self.legacy_tag()?,
                b'0'..=b'9' => self.number_like()?,
                b'a'..=b'z' | b'A'..=b'Z' => self.word_like()?,
                _ => return Err(self.unexpected_here()),
            }
        }
        Ok(())
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn push(&mut self, kind: TokenKind, start: usize) {
        self.tokens.push(Token {
            kind,
            text: self.src[start..self.pos].to_string(),
            span: Span::new(start, self.pos),
        });
    }

    fn push_single(&mut self, kind: TokenKind) {
        let start = self.pos;
        self.pos += 1;
        self.push(kind, start);
    }

    fn unexpected_here(&self) -> LexError {
        let unexpected = self.src[self.pos..].chars().next().unwrap_or('\0');
        LexError::UnexpectedChar {
            position: self.pos,
            unexpected,
        }
    }

    fn read_digit_run(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn read_letter_run(&mut self) -> &'a str {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        &self.src[start..self.pos]
    }

    fn parse_u32(&self, digits: &str, at: usize) -> Result<u32, LexError> {
        digits
            .parse::<u32>()
            .map_err(|_| LexError::NumberOverflow { position: at })
    }

    /// `[w]` / `[c]` / `[t]`. Tag keywords are case-sensitive lowercase.
    fn bracket_tag(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let kind = match (self.peek_at(1), self.peek_at(2)) {
            (Some(b'w'), Some(b']')) => TagKind::Warmup,
            (Some(b'c'), Some(b']')) => TagKind::Cooldown,
            (Some(b't'), Some(b']')) => TagKind::Test,
            _ => return Err(self.unexpected_here()),
        };
        self.pos += 3;
        self.push(TokenKind::Tag(kind), start);
        Ok(())
    }

    /// Legacy `#warmup` / `#cooldown` / `#test`.
    fn legacy_tag(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        self.pos += 1;
        let word = self.read_letter_run();
        let kind = match word {
            "warmup" => TagKind::Warmup,
            "cooldown" => TagKind::Cooldown,
            "test" => TagKind::Test,
            _ => {
                self.pos = start;
                return Err(self.unexpected_here());
            }
        };
        self.push(TokenKind::Tag(kind), start);
        Ok(())
    }

    /// Anything starting with a digit: a time, a fused rate (`20spm`), a
    /// fused anchor (`2k`), or a bare number.
    fn number_like(&mut self) -> Result<(), LexError> {
        let start = self.pos;
        let digits = self.read_digit_run();

        if self.peek() == Some(b':') {
            return self.time_tail(start, digits);
        }

        let value = self.parse_u32(digits, start)?;

        if self.src[self.pos..].starts_with("spm") {
            self.pos += 3;
            self.push(TokenKind::Rate(value), start);
            return Ok(());
        }

        if self.peek() == Some(b'k')
            && !matches!(self.peek_at(1), Some(b) if b.is_ascii_alphanumeric())
        {
            self.pos += 1;
            let text = self.src[start..self.pos].to_string();
            self.tokens.push(Token {
                kind: TokenKind::Anchor(text.clone()),
                text,
                span: Span::new(start, self.pos),
            });
            return Ok(());
        }

        self.push(TokenKind::Number(value), start);
        Ok(())
    }

    /// `m:ss` or `h:mm:ss` after the leading digit run. Trailing fields are
    /// exactly two digits, seconds and minutes under 60.
    fn time_tail(&mut self, start: usize, first: &str) -> Result<(), LexError> {
        self.pos += 1; // ':'
        let second = self.read_digit_run().to_string();
        if second.len() != 2 {
            return Err(LexError::MalformedTime { position: start });
        }

        let mut parts: Vec<u64> = Vec::with_capacity(3);
        parts.push(
            first
                .parse::<u64>()
                .map_err(|_| LexError::NumberOverflow { position: start })?,
        );
        parts.push(second.parse::<u64>().map_err(|_| LexError::MalformedTime {
            position: start,
        })?);

        if self.peek() == Some(b':') {
            self.pos += 1;
            let third = self.read_digit_run();
            if third.len() != 2 {
                return Err(LexError::MalformedTime { position: start });
            }
            parts.push(third.parse::<u64>().map_err(|_| LexError::MalformedTime {
                position: start,
            })?);
        }

        // Every field after the first must be a valid sexagesimal digit pair.
        if parts[1..].iter().any(|&p| p >= 60) {
            return Err(LexError::MalformedTime { position: start });
        }

        let total = parts
            .iter()
            .fold(0u64, |acc, &part| acc * 60 + part);
        if total > u64::from(u32::MAX) {
            return Err(LexError::NumberOverflow { position: start });
        }

        self.push(TokenKind::Time(total as u32), start);
        Ok(())
    }

    /// Anything starting with a letter: rate shorthand, a modality prefix,
    /// a zone label, or one of the single-word operators (`x`, `r`, `m`,
    /// `cal`).
    fn word_like(&mut self) -> Result<(), LexError> {
        let start = self.pos;

        // `r` immediately followed by digits is rate shorthand, checked
        // before the letter run so `r20` never half-matches `Row:`.
        if matches!(self.peek(), Some(b'r') | Some(b'R'))
            && matches!(self.peek_at(1), Some(b) if b.is_ascii_digit())
        {
            self.pos += 1;
            let digits = self.read_digit_run().to_string();
            let value = self.parse_u32(&digits, start)?;
            self.push(TokenKind::Rate(value), start);
            return Ok(());
        }

        let word = self.read_letter_run().to_string();
        let lower = word.to_ascii_lowercase();

        // Modality prefixes include their colon.
        if self.peek() == Some(b':') {
            if let Some(modality) = Modality::from_name(&word) {
                self.pos += 1;
                self.push(TokenKind::Modality(modality), start);
                return Ok(());
            }
        }

        // UT1/UT2 end in a digit the letter run did not consume.
        if lower == "ut" {
            let zone = match self.peek() {
                Some(b'1') => Some(Zone::Ut1),
                Some(b'2') => Some(Zone::Ut2),
                _ => None,
            };
            if let Some(zone) = zone {
                self.pos += 1;
                self.push(TokenKind::Zone(zone), start);
                return Ok(());
            }
        }

        let next_is_digit = matches!(self.peek(), Some(b) if b.is_ascii_digit());
        let kind = match lower.as_str() {
            "at" if !next_is_digit => Some(TokenKind::Zone(Zone::At)),
            "tr" if !next_is_digit => Some(TokenKind::Zone(Zone::Tr)),
            "an" if !next_is_digit => Some(TokenKind::Zone(Zone::An)),
            _ => match word.as_str() {
                "x" => Some(TokenKind::RepeatX),
                "r" => Some(TokenKind::RestMarker),
                "m" => Some(TokenKind::UnitMeters),
                "cal" => Some(TokenKind::UnitCalories),
                _ => None,
            },
        };

        match kind {
            Some(kind) => {
                self.push(kind, start);
                Ok(())
            }
            None => {
                self.pos = start;
                Err(self.unexpected_here())
            }
        }
    }
}
