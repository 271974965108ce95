//! JSON reading and writing for the registry document
//!
//! The parser produces the order-preserving [`Value`] tree; the serializer
//! emits stable 2-space-indented output so registry rewrites stay
//! human-diffable.

use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind, Result, Span};
use crate::value::{Array, Object, Value};

/// Parse a JSON document from text
pub fn parse(input: &str) -> Result<Value> {
    let mut parser = Parser::new(input.as_bytes());
    parser.parse()
}

/// Serialize a value as indented JSON with a trailing newline
pub fn to_string_pretty(value: &Value) -> String {
    let mut output = String::new();
    write_value(value, 0, &mut output);
    output.push('\n');
    output
}

#[derive(Debug)]
struct Parser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Parser<'a> {
    const fn new(input: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(input),
        }
    }

    fn parse(&mut self) -> Result<Value> {
        self.cursor.skip_whitespace();
        let value = self.parse_value()?;
        self.cursor.skip_whitespace();

        if !self.cursor.is_eof() {
            return Err(Error::new(
                ErrorKind::TrailingData,
                Span::at(self.cursor.position()),
            ));
        }

        Ok(value)
    }

    fn parse_value(&mut self) -> Result<Value> {
        match self.cursor.current() {
            Some(b'{') => self.parse_object().map(Value::Object),
            Some(b'[') => self.parse_array().map(Value::Array),
            Some(b'"') => self.parse_string().map(Value::String),
            Some(b't') => self.parse_keyword(b"true", Value::Bool(true)),
            Some(b'f') => self.parse_keyword(b"false", Value::Bool(false)),
            Some(b'n') => self.parse_keyword(b"null", Value::Null),
            Some(b'-') | Some(b'0'..=b'9') => self.parse_number().map(Value::Number),
            Some(_) => Err(self.error_here("expected a JSON value")),
            None => Err(self.error_here("unexpected end of input")),
        }
    }

    fn parse_object(&mut self) -> Result<Object> {
        self.expect_byte(b'{')?;
        self.cursor.skip_whitespace();

        let mut object = Object::new();
        if self.cursor.consume(b'}') {
            return Ok(object);
        }

        loop {
            self.cursor.skip_whitespace();
            let key = self.parse_string()?;
            self.cursor.skip_whitespace();
            self.expect_byte(b':')?;
            self.cursor.skip_whitespace();
            let value = self.parse_value()?;
            object.insert(key, value);

            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b',') => {
                    self.cursor.advance();
                }
                Some(b'}') => {
                    self.cursor.advance();
                    return Ok(object);
                }
                _ => return Err(self.expected("',' or '}'")),
            }
        }
    }

    fn parse_array(&mut self) -> Result<Array> {
        self.expect_byte(b'[')?;
        self.cursor.skip_whitespace();

        let mut array = Array::new();
        if self.cursor.consume(b']') {
            return Ok(array);
        }

        loop {
            self.cursor.skip_whitespace();
            let value = self.parse_value()?;
            array.push(value);

            self.cursor.skip_whitespace();
            match self.cursor.current() {
                Some(b',') => {
                    self.cursor.advance();
                }
                Some(b']') => {
                    self.cursor.advance();
                    return Ok(array);
                }
                _ => return Err(self.expected("',' or ']'")),
            }
        }
    }

    fn parse_string(&mut self) -> Result<String> {
        if !self.cursor.consume(b'"') {
            return Err(self.expected("'\"'"));
        }

        let mut result = String::new();
        loop {
            match self.cursor.current() {
                Some(b'"') => {
                    self.cursor.advance();
                    return Ok(result);
                }
                Some(b'\\') => {
                    self.cursor.advance();
                    self.parse_escape(&mut result)?;
                }
                Some(_) => {
                    let start = self.cursor.pos();
                    while let Some(b) = self.cursor.current() {
                        if b == b'"' || b == b'\\' {
                            break;
                        }
                        self.cursor.advance();
                    }
                    let raw = self.cursor.slice_from(start);
                    let text = std::str::from_utf8(raw).map_err(|_| {
                        Error::with_message(
                            ErrorKind::InvalidToken,
                            Span::at(self.cursor.position()),
                            "invalid utf-8 in string",
                        )
                    })?;
                    result.push_str(text);
                }
                None => {
                    return Err(Error::new(
                        ErrorKind::UnterminatedString,
                        Span::at(self.cursor.position()),
                    ));
                }
            }
        }
    }

    fn parse_escape(&mut self, result: &mut String) -> Result<()> {
        let Some(b) = self.cursor.current() else {
            return Err(Error::new(
                ErrorKind::UnterminatedString,
                Span::at(self.cursor.position()),
            ));
        };
        self.cursor.advance();

        let decoded = match b {
            b'"' => '"',
            b'\\' => '\\',
            b'/' => '/',
            b'b' => '\u{0008}',
            b'f' => '\u{000C}',
            b'n' => '\n',
            b'r' => '\r',
            b't' => '\t',
            b'u' => return self.parse_unicode_escape(result),
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidEscapeSequence,
                    Span::at(self.cursor.position()),
                ));
            }
        };
        result.push(decoded);
        Ok(())
    }

    fn parse_unicode_escape(&mut self, result: &mut String) -> Result<()> {
        let first = self.parse_hex4()?;

        // Surrogate pair: a high surrogate must be followed by \uXXXX low.
        let code = if (0xD800..0xDC00).contains(&first) {
            if !(self.cursor.consume(b'\\') && self.cursor.consume(b'u')) {
                return Err(self.invalid_escape());
            }
            let second = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&second) {
                return Err(self.invalid_escape());
            }
            0x10000 + ((first - 0xD800) << 10) + (second - 0xDC00)
        } else {
            first
        };

        match char::from_u32(code) {
            Some(ch) => {
                result.push(ch);
                Ok(())
            }
            None => Err(self.invalid_escape()),
        }
    }

    fn parse_hex4(&mut self) -> Result<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let Some(b) = self.cursor.current() else {
                return Err(self.invalid_escape());
            };
            let digit = match b {
                b'0'..=b'9' => u32::from(b - b'0'),
                b'a'..=b'f' => u32::from(b - b'a') + 10,
                b'A'..=b'F' => u32::from(b - b'A') + 10,
                _ => return Err(self.invalid_escape()),
            };
            code = code * 16 + digit;
            self.cursor.advance();
        }
        Ok(code)
    }

    fn parse_number(&mut self) -> Result<f64> {
        let start = self.cursor.pos();
        self.cursor.consume(b'-');
        while matches!(self.cursor.current(), Some(b'0'..=b'9')) {
            self.cursor.advance();
        }
        if self.cursor.consume(b'.') {
            while matches!(self.cursor.current(), Some(b'0'..=b'9')) {
                self.cursor.advance();
            }
        }
        if matches!(self.cursor.current(), Some(b'e') | Some(b'E')) {
            self.cursor.advance();
            if matches!(self.cursor.current(), Some(b'+') | Some(b'-')) {
                self.cursor.advance();
            }
            while matches!(self.cursor.current(), Some(b'0'..=b'9')) {
                self.cursor.advance();
            }
        }

        let raw = self.cursor.slice_from(start);
        std::str::from_utf8(raw)
            .ok()
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .ok_or_else(|| {
                Error::new(ErrorKind::InvalidNumber, Span::at(self.cursor.position()))
            })
    }

    fn parse_keyword(&mut self, keyword: &[u8], value: Value) -> Result<Value> {
        if self.cursor.starts_with(keyword) {
            self.cursor.advance_by(keyword.len());
            Ok(value)
        } else {
            Err(self.error_here("expected a JSON value"))
        }
    }

    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        if self.cursor.consume(expected) {
            Ok(())
        } else {
            Err(self.expected(&format!("'{}'", char::from(expected))))
        }
    }

    fn expected(&self, expected: &str) -> Error {
        let found = match self.cursor.current() {
            Some(b) => format!("'{}'", char::from(b)),
            None => "end of input".to_string(),
        };
        Error::new(
            ErrorKind::Expected {
                expected: expected.to_string(),
                found,
            },
            Span::at(self.cursor.position()),
        )
    }

    fn error_here(&self, message: &str) -> Error {
        Error::with_message(
            ErrorKind::InvalidToken,
            Span::at(self.cursor.position()),
            message,
        )
    }

    fn invalid_escape(&self) -> Error {
        Error::new(
            ErrorKind::InvalidEscapeSequence,
            Span::at(self.cursor.position()),
        )
    }
}

fn write_value(value: &Value, indent: usize, output: &mut String) {
    match value {
        Value::Null => output.push_str("null"),
        Value::Bool(b) => output.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => write_number(*n, output),
        Value::String(s) => write_string(s, output),
        Value::Array(arr) => write_array(arr, indent, output),
        Value::Object(obj) => write_object(obj, indent, output),
    }
}

fn write_number(n: f64, output: &mut String) {
    if !n.is_finite() {
        output.push_str("null");
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        output.push_str(&format!("{n:.0}"));
    } else {
        output.push_str(&n.to_string());
    }
}

fn write_string(s: &str, output: &mut String) {
    output.push('"');
    for ch in s.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '\u{0008}' => output.push_str("\\b"),
            '\u{000C}' => output.push_str("\\f"),
            ch if u32::from(ch) < 0x20 => {
                output.push_str(&format!("\\u{:04x}", u32::from(ch)));
            }
            ch => output.push(ch),
        }
    }
    output.push('"');
}

fn write_array(arr: &Array, indent: usize, output: &mut String) {
    if arr.is_empty() {
        output.push_str("[]");
        return;
    }

    let pad = "  ".repeat(indent + 1);
    output.push_str("[\n");
    for (i, value) in arr.iter().enumerate() {
        output.push_str(&pad);
        write_value(value, indent + 1, output);
        if i + 1 < arr.len() {
            output.push(',');
        }
        output.push('\n');
    }
    output.push_str(&"  ".repeat(indent));
    output.push(']');
}

fn write_object(obj: &Object, indent: usize, output: &mut String) {
    if obj.is_empty() {
        output.push_str("{}");
        return;
    }

    let pad = "  ".repeat(indent + 1);
    output.push_str("{\n");
    for (i, (key, value)) in obj.iter().enumerate() {
        output.push_str(&pad);
        write_string(key, output);
        output.push_str(": ");
        write_value(value, indent + 1, output);
        if i + 1 < obj.len() {
            output.push(',');
        }
        output.push('\n');
    }
    output.push_str(&"  ".repeat(indent));
    output.push('}');
}
