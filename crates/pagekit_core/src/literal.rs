//! Parser for JavaScript data literals.
//!
//! Accepts the subset of expression syntax that describes plain data: array and
//! object literals, strings, template strings without substitutions, numbers,
//! `true`/`false`/`null`/`undefined`, plus comments and trailing commas. Anything
//! that would need evaluation (identifiers, calls, spreads, JSX, `${}`) is an
//! error. Values follow `JSON.stringify` conventions: `undefined` properties are
//! dropped, `undefined` array items and non-finite numbers become `null`.

use serde_json::{Map, Number, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LiteralError {
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEnd { offset: usize },
    #[error("unexpected character `{found}` at byte {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("unsupported expression `{text}` at byte {offset}")]
    Unsupported { text: String, offset: usize },
    #[error("unterminated string starting at byte {offset}")]
    UnterminatedString { offset: usize },
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("invalid escape sequence at byte {offset}")]
    InvalidEscape { offset: usize },
    #[error("invalid number `{text}` at byte {offset}")]
    InvalidNumber { text: String, offset: usize },
    #[error("nesting deeper than {limit} levels at byte {offset}")]
    TooDeep { limit: usize, offset: usize },
    #[error("trailing input after literal at byte {offset}")]
    TrailingInput { offset: usize },
}

const MAX_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLiteral {
    pub value: Value,
    /// Byte offset just past the literal's closing token.
    pub end: usize,
}

/// Parse a single literal that begins at `start` (leading whitespace and
/// comments allowed) and report where it ends. Text after the literal is left
/// untouched.
pub fn parse_literal_at(source: &str, start: usize) -> Result<ParsedLiteral, LiteralError> {
    let mut parser = Parser::new(source, start);
    let value = parser.parse_top()?;
    Ok(ParsedLiteral {
        value,
        end: parser.pos,
    })
}

/// Parse `text` as exactly one literal, optionally followed by `;`.
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let mut parser = Parser::new(text, 0);
    let value = parser.parse_top()?;
    parser.skip_trivia()?;
    if parser.peek() == Some(b';') {
        parser.pos += 1;
        parser.skip_trivia()?;
    }
    if parser.pos < parser.bytes.len() {
        return Err(LiteralError::TrailingInput { offset: parser.pos });
    }
    Ok(value)
}

enum Parsed {
    Value(Value),
    Undefined,
}

impl Parsed {
    fn into_array_item(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::Undefined => Value::Null,
        }
    }
}

struct Parser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, start: usize) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: start.min(src.len()),
            depth: 0,
        }
    }

    fn parse_top(&mut self) -> Result<Value, LiteralError> {
        Ok(self.parse_value()?.into_array_item())
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn current_char(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn at_ident_start(&self) -> bool {
        self.current_char().is_some_and(is_ident_start)
    }

    fn unexpected(&self) -> LiteralError {
        match self.current_char() {
            Some(found) => LiteralError::UnexpectedChar {
                found,
                offset: self.pos,
            },
            None => LiteralError::UnexpectedEnd { offset: self.pos },
        }
    }

    fn skip_trivia(&mut self) -> Result<(), LiteralError> {
        loop {
            match self.peek() {
                Some(byte) if byte.is_ascii_whitespace() => self.pos += 1,
                Some(b'/') if self.peek_at(1) == Some(b'/') => {
                    while let Some(byte) = self.peek() {
                        if byte == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_at(1) == Some(b'*') => {
                    let start = self.pos;
                    match self.src[self.pos + 2..].find("*/") {
                        Some(index) => self.pos += 2 + index + 2,
                        None => return Err(LiteralError::UnterminatedComment { offset: start }),
                    }
                }
                Some(_) => {
                    // Non-ASCII whitespace such as NBSP or U+2028.
                    match self.current_char() {
                        Some(ch) if ch.is_whitespace() => self.pos += ch.len_utf8(),
                        _ => return Ok(()),
                    }
                }
                None => return Ok(()),
            }
        }
    }

    fn parse_value(&mut self) -> Result<Parsed, LiteralError> {
        self.skip_trivia()?;
        let Some(byte) = self.peek() else {
            return Err(LiteralError::UnexpectedEnd { offset: self.pos });
        };
        match byte {
            b'[' => self.nested(Self::parse_array).map(Parsed::Value),
            b'{' => self.nested(Self::parse_object).map(Parsed::Value),
            b'"' | b'\'' => self.parse_string(byte).map(|s| Parsed::Value(Value::String(s))),
            b'`' => self.parse_template().map(|s| Parsed::Value(Value::String(s))),
            b'.' if self.src[self.pos..].starts_with("...") => Err(self.unsupported(3)),
            b'-' | b'+' | b'.' | b'0'..=b'9' => self.parse_signed_number(),
            _ if self.at_ident_start() => self.parse_keyword(),
            _ => Err(self.unexpected()),
        }
    }

    fn nested(
        &mut self,
        parse: fn(&mut Self) -> Result<Value, LiteralError>,
    ) -> Result<Value, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(LiteralError::TooDeep {
                limit: MAX_DEPTH,
                offset: self.pos,
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_array(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1; // '['
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Value::Array(items));
                }
                Some(b',') => {
                    // Elision (`[1,,2]`) serializes as null.
                    self.pos += 1;
                    items.push(Value::Null);
                    continue;
                }
                Some(b'.') if self.src[self.pos..].starts_with("...") => {
                    return Err(self.unsupported(3));
                }
                None => return Err(LiteralError::UnexpectedEnd { offset: self.pos }),
                Some(_) => {}
            }

            items.push(self.parse_value()?.into_array_item());

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_object(&mut self) -> Result<Value, LiteralError> {
        self.pos += 1; // '{'
        let mut map = Map::new();
        loop {
            self.skip_trivia()?;
            let key_offset = self.pos;
            let key = match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Value::Object(map));
                }
                Some(quote @ (b'"' | b'\'')) => self.parse_string(quote)?,
                Some(b'.') if self.src[self.pos..].starts_with("...") => {
                    return Err(self.unsupported(3));
                }
                Some(b'0'..=b'9' | b'.') => number_key(&self.parse_number_token()?),
                Some(b'[') => return Err(self.unsupported_until(b']')),
                Some(_) if self.at_ident_start() => self.parse_identifier().to_string(),
                None => return Err(LiteralError::UnexpectedEnd { offset: self.pos }),
                Some(_) => return Err(self.unexpected()),
            };

            self.skip_trivia()?;
            match self.peek() {
                Some(b':') => self.pos += 1,
                // Shorthand `{ name }` and methods `{ name() {} }` refer to code.
                Some(b',' | b'}' | b'(') => {
                    return Err(LiteralError::Unsupported {
                        text: key,
                        offset: key_offset,
                    });
                }
                _ => return Err(self.unexpected()),
            }

            match self.parse_value()? {
                Parsed::Value(value) => {
                    // Duplicate keys: the later one wins but keeps the first slot,
                    // matching JavaScript property order.
                    map.insert(key, value);
                }
                Parsed::Undefined => {
                    map.shift_remove(&key);
                }
            }

            self.skip_trivia()?;
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.unexpected()),
            }
        }
    }

    fn parse_keyword(&mut self) -> Result<Parsed, LiteralError> {
        let offset = self.pos;
        let ident = self.parse_identifier();
        let parsed = match ident {
            "true" => Parsed::Value(Value::Bool(true)),
            "false" => Parsed::Value(Value::Bool(false)),
            "null" | "NaN" | "Infinity" => Parsed::Value(Value::Null),
            "undefined" => Parsed::Undefined,
            other => {
                return Err(LiteralError::Unsupported {
                    text: other.to_string(),
                    offset,
                });
            }
        };
        Ok(parsed)
    }

    fn parse_identifier(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(ch) = self.current_char() {
            if is_ident_continue(ch) {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
        &self.src[start..self.pos]
    }

    fn parse_string(&mut self, quote: u8) -> Result<String, LiteralError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                return Err(LiteralError::UnterminatedString { offset: start });
            };
            match ch {
                '\\' => self.parse_escape(&mut out)?,
                '\n' | '\r' => return Err(LiteralError::UnterminatedString { offset: start }),
                _ if ch as u32 == u32::from(quote) => {
                    self.pos += 1;
                    return Ok(out);
                }
                _ => {
                    out.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    fn parse_template(&mut self) -> Result<String, LiteralError> {
        let start = self.pos;
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(ch) = self.current_char() else {
                return Err(LiteralError::UnterminatedString { offset: start });
            };
            match ch {
                '`' => {
                    self.pos += 1;
                    return Ok(out);
                }
                '\\' => self.parse_escape(&mut out)?,
                '$' if self.peek_at(1) == Some(b'{') => {
                    return Err(self.unsupported_until(b'}'));
                }
                '\r' => {
                    // Template literals normalize CRLF and CR to LF.
                    self.pos += 1;
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                    out.push('\n');
                }
                _ => {
                    out.push(ch);
                    self.pos += ch.len_utf8();
                }
            }
        }
    }

    fn parse_escape(&mut self, out: &mut String) -> Result<(), LiteralError> {
        let offset = self.pos;
        self.pos += 1; // '\'
        let Some(ch) = self.current_char() else {
            return Err(LiteralError::InvalidEscape { offset });
        };
        self.pos += ch.len_utf8();
        match ch {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            '0' if !self.peek().is_some_and(|byte| byte.is_ascii_digit()) => out.push('\0'),
            'x' => {
                let code = self.read_hex(2, offset)?;
                out.push(char::from_u32(code).ok_or(LiteralError::InvalidEscape { offset })?);
            }
            'u' => {
                let code = self.read_unicode_escape(offset)?;
                out.push(self.combine_surrogates(code, offset)?);
            }
            // Line continuation.
            '\n' | '\u{2028}' | '\u{2029}' => {}
            '\r' => {
                if self.peek() == Some(b'\n') {
                    self.pos += 1;
                }
            }
            // Legacy octal escapes are a syntax error in strict mode.
            '0'..='9' => return Err(LiteralError::InvalidEscape { offset }),
            other => out.push(other),
        }
        Ok(())
    }

    fn read_unicode_escape(&mut self, offset: usize) -> Result<u32, LiteralError> {
        if self.peek() == Some(b'{') {
            self.pos += 1;
            let start = self.pos;
            while self.peek().is_some_and(|byte| byte.is_ascii_hexdigit()) {
                self.pos += 1;
            }
            if self.pos == start || self.peek() != Some(b'}') {
                return Err(LiteralError::InvalidEscape { offset });
            }
            let code = u32::from_str_radix(&self.src[start..self.pos], 16)
                .map_err(|_| LiteralError::InvalidEscape { offset })?;
            self.pos += 1;
            if code > 0x10FFFF {
                return Err(LiteralError::InvalidEscape { offset });
            }
            return Ok(code);
        }
        self.read_hex(4, offset)
    }

    /// Join `😀`-style pairs; lone surrogates become U+FFFD.
    fn combine_surrogates(&mut self, code: u32, offset: usize) -> Result<char, LiteralError> {
        if (0xD800..0xDC00).contains(&code) && self.src[self.pos..].starts_with("\\u") {
            let resume = self.pos;
            self.pos += 2;
            let low = self.read_unicode_escape(offset)?;
            if (0xDC00..0xE000).contains(&low) {
                let combined = 0x10000 + ((code - 0xD800) << 10) + (low - 0xDC00);
                return Ok(char::from_u32(combined).unwrap_or(char::REPLACEMENT_CHARACTER));
            }
            self.pos = resume;
        }
        Ok(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn read_hex(&mut self, digits: usize, offset: usize) -> Result<u32, LiteralError> {
        let end = self.pos + digits;
        let Some(text) = self.src.get(self.pos..end) else {
            return Err(LiteralError::InvalidEscape { offset });
        };
        if !text.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(LiteralError::InvalidEscape { offset });
        }
        let code =
            u32::from_str_radix(text, 16).map_err(|_| LiteralError::InvalidEscape { offset })?;
        self.pos = end;
        Ok(code)
    }

    fn parse_signed_number(&mut self) -> Result<Parsed, LiteralError> {
        let (signed, negative) = match self.peek() {
            Some(b'-') => (true, true),
            Some(b'+') => (true, false),
            _ => (false, false),
        };
        if signed {
            self.pos += 1;
            self.skip_trivia()?;
            if self.at_ident_start() {
                let offset = self.pos;
                return match self.parse_identifier() {
                    "Infinity" | "NaN" => Ok(Parsed::Value(Value::Null)),
                    other => Err(LiteralError::Unsupported {
                        text: other.to_string(),
                        offset,
                    }),
                };
            }
        }
        let number = self.parse_number_token()?;
        let value = match number {
            NumberToken::Int(value) if negative => {
                if value == 0 {
                    // -0 serializes as 0.
                    Value::Number(Number::from(0))
                } else {
                    match i64::try_from(value) {
                        Ok(value) => Value::Number(Number::from(-value)),
                        Err(_) => float_value(-(value as f64)),
                    }
                }
            }
            NumberToken::Int(value) => Value::Number(Number::from(value)),
            NumberToken::Float(value) if negative => float_value(-value),
            NumberToken::Float(value) => float_value(value),
        };
        Ok(Parsed::Value(value))
    }

    fn parse_number_token(&mut self) -> Result<NumberToken, LiteralError> {
        let start = self.pos;
        let invalid = |parser: &Self| LiteralError::InvalidNumber {
            text: parser.src[start..parser.pos].to_string(),
            offset: start,
        };

        let radix = match (self.peek(), self.peek_at(1)) {
            (Some(b'0'), Some(b'x' | b'X')) => Some(16),
            (Some(b'0'), Some(b'o' | b'O')) => Some(8),
            (Some(b'0'), Some(b'b' | b'B')) => Some(2),
            _ => None,
        };
        if let Some(radix) = radix {
            self.pos += 2;
            let digits_start = self.pos;
            while self
                .peek()
                .is_some_and(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
            {
                self.pos += 1;
            }
            let digits: String = self.src[digits_start..self.pos]
                .chars()
                .filter(|ch| *ch != '_')
                .collect();
            if digits.is_empty() {
                return Err(invalid(self));
            }
            return u64::from_str_radix(&digits, radix)
                .map(NumberToken::Int)
                .map_err(|_| invalid(self));
        }

        let mut is_float = false;
        self.consume_digits();
        if self.peek() == Some(b'.') {
            is_float = true;
            self.pos += 1;
            self.consume_digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            is_float = true;
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            self.consume_digits();
        }
        if self.peek() == Some(b'n') {
            // BigInt literals have no JSON form.
            self.pos += 1;
            return Err(LiteralError::Unsupported {
                text: self.src[start..self.pos].to_string(),
                offset: start,
            });
        }
        if let Some(ch) = self.current_char().filter(|ch| is_ident_continue(*ch)) {
            self.pos += ch.len_utf8();
            return Err(invalid(self));
        }

        let text: String = self.src[start..self.pos]
            .chars()
            .filter(|ch| *ch != '_')
            .collect();
        if !text.bytes().any(|byte| byte.is_ascii_digit()) {
            return Err(invalid(self));
        }
        if !is_float && let Ok(value) = text.parse::<u64>() {
            return Ok(NumberToken::Int(value));
        }
        text.parse::<f64>()
            .map(NumberToken::Float)
            .map_err(|_| invalid(self))
    }

    fn consume_digits(&mut self) {
        while self
            .peek()
            .is_some_and(|byte| byte.is_ascii_digit() || byte == b'_')
        {
            self.pos += 1;
        }
    }

    fn unsupported(&self, len: usize) -> LiteralError {
        let end = (self.pos + len).min(self.src.len());
        LiteralError::Unsupported {
            text: self.src[self.pos..end].to_string(),
            offset: self.pos,
        }
    }

    /// Unsupported construct, quoting up to and including `close` on the same line.
    fn unsupported_until(&self, close: u8) -> LiteralError {
        let rest = &self.bytes[self.pos..];
        let len = rest
            .iter()
            .position(|byte| *byte == close || *byte == b'\n')
            .map_or(rest.len(), |index| index + 1);
        let end = self.pos + len;
        LiteralError::Unsupported {
            text: String::from_utf8_lossy(&self.bytes[self.pos..end])
                .trim_end()
                .to_string(),
            offset: self.pos,
        }
    }
}

enum NumberToken {
    Int(u64),
    Float(f64),
}

fn float_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9_007_199_254_740_992.0 {
        // Integral floats (`1.0`, `1e3`) print as integers, like JavaScript.
        return Value::Number(Number::from(value as i64));
    }
    Number::from_f64(value).map_or(Value::Null, Value::Number)
}

fn number_key(token: &NumberToken) -> String {
    match token {
        NumberToken::Int(value) => value.to_string(),
        NumberToken::Float(value) => match float_value(*value) {
            Value::Number(number) => number.to_string(),
            _ => "null".to_string(),
        },
    }
}

// Close enough to ID_Start / ID_Continue for object keys.
fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '\u{200c}' || ch == '\u{200d}'
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{LiteralError, parse_literal, parse_literal_at};

    #[test]
    fn parses_product_records() {
        let value = parse_literal(
            r#"[
                { id: 1, name: "Fern", price: 24.5, tags: ['indoor', "low-light"], inStock: true },
                { id: 2, name: 'Monstera', price: 48, tags: [], inStock: false, badge: null },
            ]"#,
        )
        .expect("parse");
        assert_eq!(
            value,
            json!([
                {"id": 1, "name": "Fern", "price": 24.5, "tags": ["indoor", "low-light"], "inStock": true},
                {"id": 2, "name": "Monstera", "price": 48, "tags": [], "inStock": false, "badge": null},
            ])
        );
    }

    #[test]
    fn keeps_property_order() {
        let value = parse_literal("{ zeta: 1, alpha: 2, mid: 3 }").expect("parse");
        let keys: Vec<&str> = value
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn skips_comments_and_accepts_quoted_and_numeric_keys() {
        let value = parse_literal(
            "{\n  // primary\n  'data-id': 7, /* inline */ \"q\": 'a',\n  10: 'ten', 1.5: 'x'\n}",
        )
        .expect("parse");
        assert_eq!(value, json!({"data-id": 7, "q": "a", "10": "ten", "1.5": "x"}));
    }

    #[test]
    fn accepts_unicode_identifier_keys() {
        let value = parse_literal("[{ café: 1, naïve_ñ: 'sí', $größe2: true }]").expect("parse");
        assert_eq!(value, json!([{"café": 1, "naïve_ñ": "sí", "$größe2": true}]));

        let err = parse_literal("[12é]").expect_err("must fail");
        assert_eq!(
            err,
            LiteralError::InvalidNumber {
                text: "12é".to_string(),
                offset: 1,
            }
        );
    }

    #[test]
    fn decodes_escapes() {
        let value = parse_literal(
            r#"["it\'s", "tab\there", "\x41B\u{43}", "\uD83C\uDF3F", 'line\
continued']"#,
        )
        .expect("parse");
        assert_eq!(
            value,
            json!(["it's", "tab\there", "ABC", "\u{1F33F}", "linecontinued"])
        );
    }

    #[test]
    fn templates_without_substitutions_are_strings() {
        let value = parse_literal("[`Free shipping\non orders over $50`]").expect("parse");
        assert_eq!(value, json!(["Free shipping\non orders over $50"]));
    }

    #[test]
    fn template_substitution_is_rejected() {
        let err = parse_literal("[`Hello ${user.name}`]").expect_err("must fail");
        assert_eq!(
            err,
            LiteralError::Unsupported {
                text: "${user.name}".to_string(),
                offset: 8,
            }
        );
    }

    #[test]
    fn numbers_follow_javascript_rules() {
        let value =
            parse_literal("[-3, +4, .5, 1e3, 0x1F, 0b101, 0o17, 1_000, 2.50, -0, Infinity, -NaN]")
                .expect("parse");
        assert_eq!(
            value,
            json!([-3, 4, 0.5, 1000, 31, 5, 15, 1000, 2.5, 0, null, null])
        );
    }

    #[test]
    fn undefined_follows_json_stringify() {
        let value = parse_literal("[{ a: 1, b: undefined }, undefined, , 2]").expect("parse");
        assert_eq!(value, json!([{"a": 1}, null, null, 2]));
    }

    #[test]
    fn identifiers_are_rejected() {
        let err = parse_literal("[{ icon: StarIcon }]").expect_err("must fail");
        assert_eq!(
            err,
            LiteralError::Unsupported {
                text: "StarIcon".to_string(),
                offset: 9,
            }
        );
    }

    #[test]
    fn shorthand_and_spread_are_rejected() {
        assert!(matches!(
            parse_literal("[{ name }]"),
            Err(LiteralError::Unsupported { text, .. }) if text == "name"
        ));
        assert!(matches!(
            parse_literal("[...base, 1]"),
            Err(LiteralError::Unsupported { text, .. }) if text == "..."
        ));
        assert!(matches!(
            parse_literal("{ ...base }"),
            Err(LiteralError::Unsupported { text, .. }) if text == "..."
        ));
        assert!(matches!(
            parse_literal("{ [key]: 1 }"),
            Err(LiteralError::Unsupported { text, .. }) if text == "[key]"
        ));
    }

    #[test]
    fn jsx_values_are_rejected() {
        let err = parse_literal("[{ icon: <Truck className=\"w-4\" /> }]").expect_err("must fail");
        assert_eq!(
            err,
            LiteralError::UnexpectedChar {
                found: '<',
                offset: 9,
            }
        );
    }

    #[test]
    fn unbalanced_input_reports_end() {
        assert_eq!(
            parse_literal("[{ q: 'a' }, { q: 'b' }"),
            Err(LiteralError::UnexpectedEnd { offset: 23 })
        );
        assert!(matches!(
            parse_literal("['open"),
            Err(LiteralError::UnterminatedString { offset: 1 })
        ));
        assert!(matches!(
            parse_literal("[1 /* never closed"),
            Err(LiteralError::UnterminatedComment { offset: 3 })
        ));
    }

    #[test]
    fn parse_literal_rejects_trailing_code() {
        assert!(parse_literal("[1];").is_ok());
        assert_eq!(
            parse_literal("[1].map(f)"),
            Err(LiteralError::TrailingInput { offset: 3 })
        );
    }

    #[test]
    fn parse_at_reports_end_offset() {
        let source = "const faqs = [{ q: 'a]' }]; // ]";
        let start = source.find('[').expect("bracket");
        let parsed = parse_literal_at(source, start).expect("parse");
        assert_eq!(parsed.value, json!([{"q": "a]"}]));
        assert_eq!(&source[parsed.end..], "; // ]");
    }

    #[test]
    fn depth_is_bounded() {
        let deep = format!("{}{}", "[".repeat(200), "]".repeat(200));
        assert!(matches!(
            parse_literal(&deep),
            Err(LiteralError::TooDeep { limit: 128, .. })
        ));
    }

    #[test]
    fn invalid_numbers_and_bigints_fail() {
        assert!(matches!(
            parse_literal("[12px]"),
            Err(LiteralError::InvalidNumber { .. })
        ));
        assert!(matches!(
            parse_literal("[10n]"),
            Err(LiteralError::Unsupported { text, .. }) if text == "10n"
        ));
        assert!(matches!(
            parse_literal("[0x]"),
            Err(LiteralError::InvalidNumber { .. })
        ));
    }
}
