//! DTD declaration scanner
//!
//! Walks the grammar source statement by statement. ELEMENT and ATTLIST
//! declarations feed the grammar table; comments, processing instructions,
//! and other well-formed declarations (ENTITY, NOTATION) are skipped. A
//! declaration that cannot be parsed fails the run with a diagnostic naming
//! the offending statement instead of being dropped, so the resulting model
//! is never silently incomplete.

use tracing::{debug, trace};

use crate::cursor::Cursor;
use crate::dtd::content;
use crate::dtd::model::{AttributeDef, Grammar};
use crate::error::{Error, ErrorKind, Pos, Result, Span};

/// DTD parser
#[derive(Debug)]
pub struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    /// Parse the grammar source into the normalized element table.
    pub fn parse(&mut self) -> Result<Grammar> {
        let mut grammar = Grammar::new();

        loop {
            self.cursor.skip_whitespace();
            if self.cursor.is_eof() {
                break;
            }

            if self.cursor.starts_with(b"<!--") {
                self.skip_comment()?;
            } else if self.cursor.starts_with(b"<?") {
                self.skip_processing_instruction()?;
            } else if self.cursor.starts_with(b"<!") {
                let (statement, pos) = self.read_statement()?;
                trace!(statement = %statement, "declaration");
                apply_statement(&statement, pos, &mut grammar)?;
            } else {
                return Err(Error::with_message(
                    ErrorKind::InvalidToken,
                    Span::at(self.cursor.position()),
                    format!(
                        "expected a markup declaration, found: {}",
                        self.snippet_here()
                    ),
                ));
            }
        }

        debug!(elements = grammar.len(), "parsed grammar");
        Ok(grammar)
    }

    /// Read one `<!...>` statement, quote-aware, returning its full text.
    fn read_statement(&mut self) -> Result<(String, Pos)> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        self.cursor.advance_by(2); // consume "<!"

        let mut quote: Option<u8> = None;
        while let Some(b) = self.cursor.current() {
            match quote {
                Some(q) if b == q => quote = None,
                Some(_) => {}
                None if b == b'"' || b == b'\'' => quote = Some(b),
                None if b == b'>' => {
                    self.cursor.advance();
                    let raw = self.cursor.slice_from(start);
                    return Ok((bytes_to_string(raw, start_pos)?, start_pos));
                }
                None => {}
            }
            self.cursor.advance();
        }

        Err(Error::new(
            ErrorKind::UnterminatedDeclaration {
                statement: snippet(self.cursor.slice_from(start)),
            },
            Span::at(start_pos),
        ))
    }

    fn skip_comment(&mut self) -> Result<()> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        self.cursor.advance_by(4); // consume "<!--"

        while !self.cursor.is_eof() {
            if self.cursor.starts_with(b"-->") {
                self.cursor.advance_by(3);
                return Ok(());
            }
            self.cursor.advance();
        }

        Err(Error::new(
            ErrorKind::UnterminatedDeclaration {
                statement: snippet(self.cursor.slice_from(start)),
            },
            Span::at(start_pos),
        ))
    }

    fn skip_processing_instruction(&mut self) -> Result<()> {
        let start_pos = self.cursor.position();
        let start = self.cursor.pos();
        self.cursor.advance_by(2); // consume "<?"

        while !self.cursor.is_eof() {
            if self.cursor.starts_with(b"?>") {
                self.cursor.advance_by(2);
                return Ok(());
            }
            self.cursor.advance();
        }

        Err(Error::new(
            ErrorKind::UnterminatedDeclaration {
                statement: snippet(self.cursor.slice_from(start)),
            },
            Span::at(start_pos),
        ))
    }

    fn snippet_here(&self) -> String {
        let mut probe = self.cursor.clone();
        let start = probe.pos();
        probe.advance_by(40);
        snippet(probe.slice_from(start))
    }
}

fn apply_statement(statement: &str, pos: Pos, grammar: &mut Grammar) -> Result<()> {
    let body = statement
        .strip_prefix("<!")
        .and_then(|s| s.strip_suffix('>'))
        .unwrap_or(statement)
        .trim();

    if let Some(rest) = keyword_body(body, "ELEMENT") {
        parse_element_declaration(rest, statement, pos, grammar)
    } else if let Some(rest) = keyword_body(body, "ATTLIST") {
        parse_attlist_declaration(rest, statement, pos, grammar)
    } else if keyword_body(body, "ENTITY").is_some()
        || keyword_body(body, "NOTATION").is_some()
        || keyword_body(body, "DOCTYPE").is_some()
    {
        // legal declarations we carry no facts from
        Ok(())
    } else {
        Err(invalid(statement, pos))
    }
}

/// Returns the statement body after `keyword` if the body starts with that
/// keyword as a whole word.
fn keyword_body<'a>(body: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = body.strip_prefix(keyword)?;
    if rest.starts_with(char::is_whitespace) {
        Some(rest.trim_start())
    } else {
        None
    }
}

fn parse_element_declaration(
    rest: &str,
    statement: &str,
    pos: Pos,
    grammar: &mut Grammar,
) -> Result<()> {
    let (name, model) = split_name(rest).ok_or_else(|| invalid(statement, pos))?;
    let model = model.trim();
    if model.is_empty() {
        return Err(invalid(statement, pos));
    }

    grammar.record_element(name, content::resolve(model));
    Ok(())
}

fn parse_attlist_declaration(
    rest: &str,
    statement: &str,
    pos: Pos,
    grammar: &mut Grammar,
) -> Result<()> {
    let (name, specs) = split_name(rest).ok_or_else(|| invalid(statement, pos))?;
    // an ATTLIST alone is enough for the element to exist in the table
    grammar.record_element(name, None);

    let tokens = tokenize_specs(specs).ok_or_else(|| invalid(statement, pos))?;
    let mut iter = tokens.into_iter().peekable();

    while let Some(attr_name) = iter.next() {
        if !is_identifier(&attr_name) {
            return Err(invalid(statement, pos));
        }
        let type_token = iter.next().ok_or_else(|| invalid(statement, pos))?;
        let marker = iter.next().ok_or_else(|| invalid(statement, pos))?;

        let required = match marker.as_str() {
            "#REQUIRED" => true,
            "#IMPLIED" => false,
            "#FIXED" => {
                // #FIXED must be followed by its value literal
                let literal = iter.next().ok_or_else(|| invalid(statement, pos))?;
                if !literal.starts_with('"') && !literal.starts_with('\'') {
                    return Err(invalid(statement, pos));
                }
                false
            }
            lit if lit.starts_with('"') || lit.starts_with('\'') => false,
            _ => return Err(invalid(statement, pos)),
        };

        let enum_values = if type_token.starts_with('(') {
            type_token
                .trim_start_matches('(')
                .trim_end_matches(')')
                .split('|')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        } else {
            Vec::new()
        };

        grammar.record_attribute(
            name,
            AttributeDef {
                name: attr_name,
                type_token,
                required,
                enum_values,
            },
        );
    }

    Ok(())
}

/// Split a declaration body into its leading element name and the remainder.
fn split_name(body: &str) -> Option<(&str, &str)> {
    let end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    let (name, rest) = body.split_at(end);
    if is_identifier(name) {
        Some((name, rest.trim_start()))
    } else {
        None
    }
}

/// Split ATTLIST spec text into tokens: bare words, quoted literals
/// (delimiters kept), and parenthesized groups. Returns `None` on an
/// unterminated quote or group.
fn tokenize_specs(input: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&ch) = chars.peek() {
        if ch.is_whitespace() {
            chars.next();
            continue;
        }

        let mut token = String::new();
        if ch == '"' || ch == '\'' {
            let quote = ch;
            token.push(ch);
            chars.next();
            loop {
                let next = chars.next()?;
                token.push(next);
                if next == quote {
                    break;
                }
            }
        } else if ch == '(' {
            let mut depth = 0u32;
            loop {
                let next = chars.next()?;
                token.push(next);
                match next {
                    '(' => depth += 1,
                    ')' => {
                        depth -= 1;
                        if depth == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
        } else {
            while let Some(&c) = chars.peek() {
                if c.is_whitespace() || c == '(' || c == '"' || c == '\'' {
                    break;
                }
                token.push(c);
                chars.next();
            }
        }
        tokens.push(token);
    }

    Some(tokens)
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn invalid(statement: &str, pos: Pos) -> Error {
    Error::new(
        ErrorKind::InvalidDeclaration {
            statement: snippet(statement.as_bytes()),
        },
        Span::at(pos),
    )
}

fn snippet(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    let text = text.trim();
    if text.chars().count() > 60 {
        let truncated: String = text.chars().take(60).collect();
        format!("{truncated}...")
    } else {
        text.to_string()
    }
}

fn bytes_to_string(raw: &[u8], pos: Pos) -> Result<String> {
    std::str::from_utf8(raw)
        .map(|s| s.to_string())
        .map_err(|_| {
            Error::with_message(ErrorKind::InvalidToken, Span::at(pos), "invalid utf-8")
        })
}
