//! Recursive-descent parser for workout notation
//!
//! Consumes the token stream into an AST of workout segments, handling
//! repeats, grouping, chaining, and tagged blocks. The grammar is LL(1):
//! every decision looks at the current token plus at most one token of
//! lookahead (a number followed by `x` opens a repeat), so parse errors
//! point at the exact token that violated expectation. Parsing fails fast
//! at the first problem: malformed input yields no partial AST.
//!
//! Modality is threaded through the recursion as an explicit inherited
//! context (`Row` at the top), never shared state, so any subtree parses
//! identically in isolation.

use thiserror::Error;
use tracing::debug;

use self::ast::{Modality, Quantity, Rest, Segment, Span, Tag, Workout};
use self::guidance::{Guidance, GuidanceTarget};
use self::tokenizer::{Token, TokenKind};

pub mod ast;
pub mod guidance;
pub mod semantic_validator;
pub mod tokenizer;

#[cfg(test)]
mod tests;

/// Grammar violation. Fatal: no partial AST is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found} at offset {position}")]
pub struct ParseError {
    pub position: usize,
    pub expected: String,
    pub found: String,
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Parse a token stream into a workout.
pub fn parse(tokens: &[Token]) -> ParseResult<Workout> {
    let mut parser = Parser { tokens, pos: 0 };

    if parser.peek().is_none() {
        return Err(parser.err_here("a workout segment"));
    }

    let segments = parser.chain(Modality::Row)?;
    if parser.peek().is_some() {
        return Err(parser.err_here("'+' or end of input"));
    }

    let span = segments
        .iter()
        .map(Segment::span)
        .reduce(|a, b| a.merge(&b))
        .unwrap_or_default();

    debug!(segments = segments.len(), "parsed workout");
    Ok(Workout { segments, span })
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

/// Parsed pieces of an atom before it is shaped into a segment.
struct PieceParts {
    modality: Modality,
    quantity: Quantity,
    quantity_span: Span,
    rest: Option<Rest>,
    guidance: Vec<Guidance>,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    fn kind_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    /// End offset of the most recently consumed token.
    fn prev_end(&self) -> usize {
        if self.pos == 0 {
            0
        } else {
            self.tokens[self.pos - 1].span.end
        }
    }

    fn eof_position(&self) -> usize {
        self.tokens.last().map(|t| t.span.end).unwrap_or(0)
    }

    fn err_here(&self, expected: &str) -> ParseError {
        match self.peek() {
            Some(token) => ParseError {
                position: token.span.start,
                expected: expected.to_string(),
                found: format!("'{}'", token.text),
            },
            None => ParseError {
                position: self.eof_position(),
                expected: expected.to_string(),
                found: "end of input".to_string(),
            },
        }
    }

    /* ===================== Productions ===================== */

    /// chain := unit ('+' unit)*
    fn chain(&mut self, inherited: Modality) -> ParseResult<Vec<Segment>> {
        let mut segments = vec![self.unit(inherited)?];
        while matches!(self.peek_kind(), Some(TokenKind::Plus)) {
            self.pos += 1;
            segments.push(self.unit(inherited)?);
        }
        Ok(segments)
    }

    /// unit := TAG? MODALITY? (repeatUnit | group | piece)
    fn unit(&mut self, inherited: Modality) -> ParseResult<Segment> {
        let start = match self.peek() {
            Some(token) => token.span.start,
            None => return Err(self.err_here("a workout segment")),
        };

        let tag = self.try_tag()?;
        let modality = self.try_modality().unwrap_or(inherited);

        match self.peek_kind() {
            Some(TokenKind::Number(_))
                if matches!(self.kind_at(1), Some(TokenKind::RepeatX)) =>
            {
                self.repeat_unit(tag, modality, start)
            }
            Some(TokenKind::LParen) => {
                let (children, group_rest) = self.paren_body(modality)?;
                Ok(Segment::Variable {
                    children,
                    group_rest,
                    tag,
                    span: Span::new(start, self.prev_end()),
                })
            }
            Some(_) => self.piece(tag, modality, start),
            None => Err(self.err_here("a workout segment")),
        }
    }

    /// repeatUnit := NUMBER 'x' (pieceBody | parenBody)
    ///
    /// A written `1x` is normalized away: `1x500m` is a steady piece,
    /// `1x(...)` a plain variable chain. A count of 0 parses and is left
    /// for the validator to reject.
    fn repeat_unit(
        &mut self,
        tag: Option<Tag>,
        inherited: Modality,
        start: usize,
    ) -> ParseResult<Segment> {
        let (repeat, _) = self.take_number("a repeat count")?;
        self.pos += 1; // 'x', guaranteed by the caller's lookahead

        if matches!(self.peek_kind(), Some(TokenKind::LParen)) {
            let (children, group_rest) = self.paren_body(inherited)?;
            let span = Span::new(start, self.prev_end());
            if repeat == 1 {
                return Ok(Segment::Variable {
                    children,
                    group_rest,
                    tag,
                    span,
                });
            }
            return Ok(Segment::Group {
                repeat,
                body: children,
                group_rest,
                tag,
                span,
            });
        }

        let parts = self.piece_body(inherited)?;
        if matches!(parts.quantity, Quantity::Calories { .. }) {
            return Err(ParseError {
                position: parts.quantity_span.start,
                expected: "a distance or time work quantity".to_string(),
                found: "calories".to_string(),
            });
        }

        let span = Span::new(start, self.prev_end());
        if repeat == 1 && parts.rest.is_none() {
            return Ok(Segment::Steady {
                modality: parts.modality,
                quantity: parts.quantity,
                tag,
                guidance: parts.guidance,
                span,
            });
        }
        Ok(Segment::Interval {
            modality: parts.modality,
            work: parts.quantity,
            repeat,
            rest: parts.rest,
            tag,
            guidance: parts.guidance,
            span,
        })
    }

    /// piece := pieceBody, a steady effort or a bare work/rest pair.
    fn piece(
        &mut self,
        tag: Option<Tag>,
        inherited: Modality,
        start: usize,
    ) -> ParseResult<Segment> {
        let parts = self.piece_body(inherited)?;
        let span = Span::new(start, self.prev_end());
        match parts.rest {
            None => Ok(Segment::Steady {
                modality: parts.modality,
                quantity: parts.quantity,
                tag,
                guidance: parts.guidance,
                span,
            }),
            Some(rest) => Ok(Segment::Interval {
                modality: parts.modality,
                work: parts.quantity,
                repeat: 1,
                rest: Some(rest),
                tag,
                guidance: parts.guidance,
                span,
            }),
        }
    }

    /// pieceBody := MODALITY? quantity guidance? restSuffix? guidance?
    ///
    /// At most one guidance may appear, before or after the rest suffix.
    /// A second guidance introducer (including an explicit `@` after rate
    /// shorthand) is ambiguous and rejected at that token.
    fn piece_body(&mut self, inherited: Modality) -> ParseResult<PieceParts> {
        let modality = self.try_modality().unwrap_or(inherited);
        let (quantity, quantity_span) = self.quantity()?;

        let mut guidance = Vec::new();
        if let Some(g) = self.try_guidance()? {
            guidance.push(g);
        }

        let rest = self.try_rest_suffix()?;

        if guidance.is_empty() {
            if let Some(g) = self.try_guidance()? {
                guidance.push(g);
            }
        }

        if self.at_guidance_start() {
            return Err(self.err_here("end of segment"));
        }

        Ok(PieceParts {
            modality,
            quantity,
            quantity_span,
            rest,
            guidance,
        })
    }

    /// parenBody := '(' chain ')' restSuffix?
    fn paren_body(&mut self, inherited: Modality) -> ParseResult<(Vec<Segment>, Option<Rest>)> {
        self.pos += 1; // '(', guaranteed by the caller
        if matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            // An empty group is a parse error, not a validation warning.
            return Err(self.err_here("a workout segment"));
        }
        let children = self.chain(inherited)?;
        if !matches!(self.peek_kind(), Some(TokenKind::RParen)) {
            return Err(self.err_here("'+' or ')'"));
        }
        self.pos += 1;
        let group_rest = self.try_rest_suffix()?;
        Ok((children, group_rest))
    }

    /// restSuffix := '/' MODALITY? (TIME | NUMBER 'm') 'r'
    fn try_rest_suffix(&mut self) -> ParseResult<Option<Rest>> {
        if !matches!(self.peek_kind(), Some(TokenKind::Slash)) {
            return Ok(None);
        }
        let start = self.tokens[self.pos].span.start;
        self.pos += 1;

        let modality = self.try_modality();

        let quantity = match self.peek_kind() {
            Some(TokenKind::Time(seconds)) => {
                let q = Quantity::Time { seconds: *seconds };
                self.pos += 1;
                q
            }
            Some(TokenKind::Number(_)) => {
                let (meters, _) = self.take_number("a rest duration after '/'")?;
                if !matches!(self.peek_kind(), Some(TokenKind::UnitMeters)) {
                    return Err(self.err_here("'m' after the rest distance"));
                }
                self.pos += 1;
                Quantity::Distance { meters }
            }
            _ => return Err(self.err_here("a rest duration after '/'")),
        };

        if !matches!(self.peek_kind(), Some(TokenKind::RestMarker)) {
            return Err(self.err_here("'r' after the rest duration"));
        }
        self.pos += 1;

        Ok(Some(Rest {
            modality,
            quantity,
            span: Span::new(start, self.prev_end()),
        }))
    }

    /// quantity := TIME | NUMBER 'm' | NUMBER 'cal'
    fn quantity(&mut self) -> ParseResult<(Quantity, Span)> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Time(seconds),
                span,
                ..
            }) => {
                let out = (Quantity::Time { seconds: *seconds }, *span);
                self.pos += 1;
                Ok(out)
            }
            Some(Token {
                kind: TokenKind::Number(value),
                span,
                ..
            }) => {
                let (value, start_span) = (*value, *span);
                self.pos += 1;
                let quantity = match self.peek_kind() {
                    Some(TokenKind::UnitMeters) => Quantity::Distance { meters: value },
                    Some(TokenKind::UnitCalories) => Quantity::Calories { calories: value },
                    _ => return Err(self.err_here("'m' or 'cal' after a number")),
                };
                let end = self.tokens[self.pos].span;
                self.pos += 1;
                Ok((quantity, start_span.merge(&end)))
            }
            _ => Err(self.err_here("a quantity (distance, time, or calories)")),
        }
    }

    /// guidance := '@' guidanceExpr | RATE | ZONE
    ///
    /// Bare rate tokens are the `30:00r20` shorthand; bare zone labels are
    /// accepted because that is the canonical rendering of zone guidance
    /// (`20:00 UT1`).
    fn try_guidance(&mut self) -> ParseResult<Option<Guidance>> {
        let start = match self.peek() {
            Some(token) => token.span.start,
            None => return Ok(None),
        };

        match self.peek_kind() {
            Some(TokenKind::Rate(spm)) => {
                let target = GuidanceTarget::RateAbsolute { spm: *spm };
                self.pos += 1;
                Ok(Some(Guidance {
                    target,
                    span: Span::new(start, self.prev_end()),
                }))
            }
            Some(TokenKind::Zone(zone)) => {
                let target = GuidanceTarget::ZoneLabel { zone: *zone };
                self.pos += 1;
                Ok(Some(Guidance {
                    target,
                    span: Span::new(start, self.prev_end()),
                }))
            }
            Some(TokenKind::At) => {
                self.pos += 1;
                let target = self.guidance_expr()?;
                Ok(Some(Guidance {
                    target,
                    span: Span::new(start, self.prev_end()),
                }))
            }
            _ => Ok(None),
        }
    }

    /// guidanceExpr := RATE ('..' NUMBER)? | NUMBER '..' RATE
    ///              | TIME ('..' TIME)? | ANCHOR (('+'|'-') NUMBER)? | ZONE
    fn guidance_expr(&mut self) -> ParseResult<GuidanceTarget> {
        match self.peek_kind() {
            Some(TokenKind::Rate(low)) => {
                let low = *low;
                self.pos += 1;
                if matches!(self.peek_kind(), Some(TokenKind::Range)) {
                    self.pos += 1;
                    let (high, _) = self.take_number("a rate upper bound")?;
                    Ok(GuidanceTarget::RateRange { low, high })
                } else {
                    Ok(GuidanceTarget::RateAbsolute { spm: low })
                }
            }
            Some(TokenKind::Number(low)) => {
                let low = *low;
                self.pos += 1;
                if !matches!(self.peek_kind(), Some(TokenKind::Range)) {
                    return Err(self.err_here("'..' in a rate range"));
                }
                self.pos += 1;
                match self.peek_kind() {
                    Some(TokenKind::Rate(high)) => {
                        let high = *high;
                        self.pos += 1;
                        Ok(GuidanceTarget::RateRange { low, high })
                    }
                    _ => Err(self.err_here("a rate upper bound ending in 'spm'")),
                }
            }
            Some(TokenKind::Time(low)) => {
                let low = *low;
                self.pos += 1;
                if matches!(self.peek_kind(), Some(TokenKind::Range)) {
                    self.pos += 1;
                    match self.peek_kind() {
                        Some(TokenKind::Time(high)) => {
                            let high = *high;
                            self.pos += 1;
                            Ok(GuidanceTarget::PaceRange {
                                low_seconds: low,
                                high_seconds: high,
                            })
                        }
                        _ => Err(self.err_here("a pace upper bound")),
                    }
                } else {
                    Ok(GuidanceTarget::PaceAbsolute { split_seconds: low })
                }
            }
            Some(TokenKind::Anchor(name)) => {
                let anchor = name.clone();
                self.pos += 1;
                let offset_seconds = match self.peek_kind() {
                    Some(TokenKind::Plus) => {
                        self.pos += 1;
                        let (n, _) = self.take_number("an offset in seconds")?;
                        n as i32
                    }
                    Some(TokenKind::Minus) => {
                        self.pos += 1;
                        let (n, _) = self.take_number("an offset in seconds")?;
                        -(n as i32)
                    }
                    _ => 0,
                };
                Ok(GuidanceTarget::PaceRelative {
                    anchor,
                    offset_seconds,
                })
            }
            Some(TokenKind::Zone(zone)) => {
                let zone = *zone;
                self.pos += 1;
                Ok(GuidanceTarget::ZoneLabel { zone })
            }
            _ => Err(self.err_here("a guidance target after '@'")),
        }
    }

    /* ===================== Token helpers ===================== */

    fn at_guidance_start(&self) -> bool {
        matches!(
            self.peek_kind(),
            Some(TokenKind::At | TokenKind::Rate(_) | TokenKind::Zone(_))
        )
    }

    fn try_tag(&mut self) -> ParseResult<Option<Tag>> {
        let tag = match self.peek() {
            Some(Token {
                kind: TokenKind::Tag(kind),
                span,
                ..
            }) => Tag {
                kind: *kind,
                span: *span,
            },
            _ => return Ok(None),
        };
        self.pos += 1;
        if matches!(self.peek_kind(), Some(TokenKind::Tag(_))) {
            return Err(self.err_here("a workout segment after the tag"));
        }
        Ok(Some(tag))
    }

    fn try_modality(&mut self) -> Option<Modality> {
        match self.peek_kind() {
            Some(TokenKind::Modality(modality)) => {
                let modality = *modality;
                self.pos += 1;
                Some(modality)
            }
            _ => None,
        }
    }

    fn take_number(&mut self, expected: &str) -> ParseResult<(u32, Span)> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Number(value),
                span,
                ..
            }) => {
                let out = (*value, *span);
                self.pos += 1;
                Ok(out)
            }
            _ => Err(self.err_here(expected)),
        }
    }
}
