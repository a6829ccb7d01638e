//! Presentation (zone file) format tokenizer.
//!
//! Splits master-file style text into words, quoted strings and line ends
//! per RFC 1035 section 5.1: `;` starts a comment, parentheses join lines,
//! and a backslash escapes the next character. Escapes are kept in the
//! returned tokens; callers decode them for the field they are parsing.

use crate::error::{Error, Result};
use crate::name::Name;
use data_encoding::{BASE64, HEXUPPER_PERMISSIVE};

/// A token produced by [`Tokenizer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'a> {
    /// An unquoted word, escapes intact.
    Word(&'a str),
    /// The inside of a quoted string, escapes intact.
    Quoted(&'a str),
    /// End of a logical line.
    Eol,
    /// End of input.
    Eof,
}

impl Token<'_> {
    /// Returns true for [`Token::Eol`] and [`Token::Eof`].
    #[inline]
    pub fn is_eol(&self) -> bool {
        matches!(self, Token::Eol | Token::Eof)
    }
}

/// Tokenizer over a borrowed string.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a str,
    pos: usize,
    /// Current line, one-based.
    line: usize,
    /// Line the last token started on.
    token_line: usize,
    /// Open parentheses.
    depth: usize,
    pushed: Option<Token<'a>>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer over `input`.
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            token_line: 1,
            depth: 0,
            pushed: None,
        }
    }

    /// Returns the line of the most recent token.
    #[inline]
    pub fn line(&self) -> usize {
        self.token_line
    }

    /// Builds a `TextParse` error at the current line.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::text_parse(self.token_line, message)
    }

    /// Pushes a token back; the next [`get`](Self::get) returns it again.
    #[inline]
    pub fn unget(&mut self, token: Token<'a>) {
        self.pushed = Some(token);
    }

    /// Returns the next token.
    pub fn get(&mut self) -> Result<Token<'a>> {
        if let Some(token) = self.pushed.take() {
            return Ok(token);
        }

        let input = self.input;
        let bytes = input.as_bytes();

        loop {
            let Some(&byte) = bytes.get(self.pos) else {
                if self.depth > 0 {
                    return Err(self.error("unbalanced parentheses"));
                }
                return Ok(Token::Eof);
            };

            match byte {
                b' ' | b'\t' | b'\r' => self.pos += 1,
                b'\n' => {
                    self.pos += 1;
                    self.token_line = self.line;
                    self.line += 1;
                    if self.depth == 0 {
                        return Ok(Token::Eol);
                    }
                }
                b';' => {
                    while bytes.get(self.pos).is_some_and(|&b| b != b'\n') {
                        self.pos += 1;
                    }
                }
                b'(' => {
                    self.depth += 1;
                    self.pos += 1;
                }
                b')' => {
                    self.token_line = self.line;
                    if self.depth == 0 {
                        return Err(self.error("unbalanced parentheses"));
                    }
                    self.depth -= 1;
                    self.pos += 1;
                }
                b'"' => {
                    self.token_line = self.line;
                    let start = self.pos + 1;
                    let mut i = start;
                    loop {
                        match bytes.get(i) {
                            None => return Err(self.error("unterminated quoted string")),
                            Some(b'\\') => i += 1 + escaped_len(input, i + 1),
                            Some(b'"') => break,
                            Some(b'\n') => {
                                self.line += 1;
                                i += 1;
                            }
                            Some(_) => i += 1,
                        }
                    }
                    self.pos = i + 1;
                    return Ok(Token::Quoted(&input[start..i]));
                }
                _ => {
                    self.token_line = self.line;
                    let start = self.pos;
                    let mut i = start;
                    while let Some(&c) = bytes.get(i) {
                        match c {
                            b'\\' => i += 1 + escaped_len(input, i + 1),
                            b' ' | b'\t' | b'\r' | b'\n' | b';' | b'(' | b')' | b'"' => break,
                            _ => i += 1,
                        }
                    }
                    self.pos = i;
                    return Ok(Token::Word(&input[start..i]));
                }
            }
        }
    }

    /// Returns the next word or quoted string.
    pub fn get_quoted_or_word(&mut self) -> Result<&'a str> {
        match self.get()? {
            Token::Word(s) | Token::Quoted(s) => Ok(s),
            _ => Err(self.error("expected a string")),
        }
    }

    /// Returns the next unquoted word.
    pub fn get_word(&mut self) -> Result<&'a str> {
        match self.get()? {
            Token::Word(s) => Ok(s),
            Token::Quoted(_) => Err(self.error("unexpected quoted string")),
            _ => Err(self.error("unexpected end of line")),
        }
    }

    fn get_number<T: std::str::FromStr>(&mut self, what: &str) -> Result<T> {
        let word = self.get_word()?;
        word.parse()
            .map_err(|_| self.error(format!("invalid {what} \"{word}\"")))
    }

    /// Returns the next word as a u8.
    pub fn get_u8(&mut self) -> Result<u8> {
        self.get_number("8-bit value")
    }

    /// Returns the next word as a u16.
    pub fn get_u16(&mut self) -> Result<u16> {
        self.get_number("16-bit value")
    }

    /// Returns the next word as a u32.
    pub fn get_u32(&mut self) -> Result<u32> {
        self.get_number("32-bit value")
    }

    /// Returns the next word as a TTL, accepting `1h30m` style units.
    pub fn get_ttl(&mut self) -> Result<u32> {
        let word = self.get_word()?;
        parse_ttl(word).ok_or_else(|| self.error(format!("invalid TTL \"{word}\"")))
    }

    /// Returns the next word as a domain name relative to `origin`.
    pub fn get_name(&mut self, origin: Option<&Name>) -> Result<Name> {
        let word = self.get_word()?;
        let name = Name::parse(word, origin).map_err(|e| self.error(e.to_string()))?;
        if !name.is_absolute() {
            return Err(self.error(format!("relative name \"{word}\" without an origin")));
        }
        Ok(name)
    }

    /// Returns the next word or quoted string as a character-string with
    /// escapes decoded.
    pub fn get_character_string(&mut self) -> Result<Vec<u8>> {
        let raw = self.get_quoted_or_word()?;
        let bytes = self.unescape(raw)?;
        if bytes.len() > 255 {
            return Err(self.error(format!(
                "character string of {} bytes exceeds 255",
                bytes.len()
            )));
        }
        Ok(bytes)
    }

    /// Decodes `\X` and `\DDD` escapes.
    pub fn unescape(&self, raw: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(raw.len());
        let mut bytes = raw.bytes();

        while let Some(byte) = bytes.next() {
            if byte != b'\\' {
                out.push(byte);
                continue;
            }
            let first = bytes
                .next()
                .ok_or_else(|| self.error("dangling escape"))?;
            if !first.is_ascii_digit() {
                out.push(first);
                continue;
            }
            let mut value = u32::from(first - b'0');
            for _ in 0..2 {
                match bytes.next() {
                    Some(d) if d.is_ascii_digit() => value = value * 10 + u32::from(d - b'0'),
                    _ => return Err(self.error("bad \\DDD escape")),
                }
            }
            out.push(u8::try_from(value).map_err(|_| self.error("escape value above 255"))?);
        }

        Ok(out)
    }

    /// Collects the words up to the end of the line.
    pub fn get_remaining_words(&mut self) -> Result<Vec<&'a str>> {
        let mut words = Vec::new();
        loop {
            match self.get()? {
                Token::Word(s) | Token::Quoted(s) => words.push(s),
                token => {
                    self.unget(token);
                    return Ok(words);
                }
            }
        }
    }

    /// Joins the rest of the line and decodes it as base64.
    pub fn get_remaining_base64(&mut self) -> Result<Vec<u8>> {
        let joined = self.get_remaining_words()?.concat();
        if joined.is_empty() {
            return Err(self.error("expected base64 data"));
        }
        BASE64
            .decode(joined.as_bytes())
            .map_err(|e| self.error(format!("invalid base64: {e}")))
    }

    /// Joins the rest of the line and decodes it as hex.
    pub fn get_remaining_hex(&mut self) -> Result<Vec<u8>> {
        let joined = self.get_remaining_words()?.concat();
        if joined.is_empty() {
            return Err(self.error("expected hex data"));
        }
        self.decode_hex(&joined)
    }

    /// Decodes a single hex word.
    pub fn decode_hex(&self, text: &str) -> Result<Vec<u8>> {
        HEXUPPER_PERMISSIVE
            .decode(text.as_bytes())
            .map_err(|e| self.error(format!("invalid hex: {e}")))
    }

    /// Fails unless the next token ends the line.
    pub fn expect_eol(&mut self) -> Result<()> {
        match self.get()? {
            Token::Eol | Token::Eof => Ok(()),
            Token::Word(s) | Token::Quoted(s) => {
                Err(self.error(format!("unexpected trailing data \"{s}\"")))
            }
        }
    }

    /// Returns true if the next token ends the line, without consuming it.
    pub fn at_eol(&mut self) -> Result<bool> {
        let token = self.get()?;
        self.unget(token);
        Ok(token.is_eol())
    }
}

/// Byte length of the character at `at`, or zero at the end of input.
fn escaped_len(input: &str, at: usize) -> usize {
    input
        .get(at..)
        .and_then(|rest| rest.chars().next())
        .map_or(0, char::len_utf8)
}

/// Parses a TTL: plain seconds or a sequence like `1w2d3h4m5s`.
pub fn parse_ttl(text: &str) -> Option<u32> {
    if text.is_empty() {
        return None;
    }

    let mut total = 0u64;
    let mut current = 0u64;
    let mut digits = false;

    for c in text.chars() {
        if let Some(digit) = c.to_digit(10) {
            current = current * 10 + u64::from(digit);
            digits = true;
            if current > u64::from(u32::MAX) {
                return None;
            }
            continue;
        }

        let multiplier = match c.to_ascii_lowercase() {
            's' => 1,
            'm' => 60,
            'h' => 3_600,
            'd' => 86_400,
            'w' => 604_800,
            _ => return None,
        };
        if !digits {
            return None;
        }
        total += current * multiplier;
        current = 0;
        digits = false;
    }

    u32::try_from(total + current).ok()
}
