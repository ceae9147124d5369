// src/parser.rs
use serde_json::Value;

#[derive(Debug)]
pub enum ParseError {
    InvalidSyntax(String),
}

impl From<String> for ParseError {
    fn from(msg: String) -> Self {
        ParseError::InvalidSyntax(msg)
    }
}

/// Character cursor shared by the rule expression grammar and literal scanning.
pub struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    /// Consume everything up to (not including) `end`, or to the end of input.
    pub fn take_until(&mut self, end: char) -> &'a str {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == end {
                break;
            }
            self.i += c.len_utf8();
        }
        &self.s[start..self.i]
    }

    /// Scan a complete numeric literal: sign, digits, optional fraction and exponent.
    /// The whole remaining input must be consumed, otherwise this is not a number.
    pub fn parse_number_literal(&mut self) -> Result<Value, ParseError> {
        let start = self.i;
        if self.peek_char() == Some('-') || self.peek_char() == Some('+') {
            self.i += 1;
        }
        let int_digits = self.skip_digits();
        let mut frac_digits = 0;
        let mut is_float = false;
        if self.consume_char('.') {
            is_float = true;
            frac_digits = self.skip_digits();
        }
        if int_digits == 0 && frac_digits == 0 {
            return Err(ParseError::InvalidSyntax("number expected".into()));
        }
        if self.peek_char() == Some('e') || self.peek_char() == Some('E') {
            let mark = self.i;
            self.i += 1;
            if self.peek_char() == Some('-') || self.peek_char() == Some('+') {
                self.i += 1;
            }
            if self.skip_digits() == 0 {
                self.i = mark;
            } else {
                is_float = true;
            }
        }
        if !self.eof() {
            return Err(ParseError::InvalidSyntax("trailing input".into()));
        }
        let s = &self.s[start..self.i];
        if !is_float {
            if let Ok(i) = s.parse::<i64>() {
                return Ok(Value::from(i));
            }
        }
        let f: f64 = s
            .parse()
            .map_err(|_| ParseError::InvalidSyntax("bad float".into()))?;
        serde_json::Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| ParseError::InvalidSyntax("non-finite number".into()))
    }

    /// Scan a prefixed integer literal: `0x1f`, `0b101` or `017` (octal).
    pub fn parse_radix_int(&mut self) -> Result<i64, ParseError> {
        let rest = &self.s[self.i..];
        let (digits, radix) = if let Some(d) = strip_prefix_ci(rest, "0x") {
            (d, 16)
        } else if let Some(d) = strip_prefix_ci(rest, "0b") {
            (d, 2)
        } else if let Some(d) = rest.strip_prefix('0') {
            (d, 8)
        } else {
            return Err(ParseError::InvalidSyntax("radix prefix expected".into()));
        };
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return Err(ParseError::InvalidSyntax("bad radix digits".into()));
        }
        let n = i64::from_str_radix(digits, radix)
            .map_err(|_| ParseError::InvalidSyntax("radix integer overflow".into()))?;
        self.i = self.s.len();
        Ok(n)
    }

    fn skip_digits(&mut self) -> usize {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        self.i - start
    }

    pub fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    pub fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

fn strip_prefix_ci<'s>(s: &'s str, prefix: &str) -> Option<&'s str> {
    if s.len() >= prefix.len() && s.is_char_boundary(prefix.len()) && s[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}
