//! Compilers for both path dialects.
//!
//! JSONPath grammar accepted here:
//!
//! ```text
//! path      = ("$" | "@") step*
//! step      = "." name | "." name "(" literals ")" | ".*" | ".." (name | "*" | bracket) | bracket
//! bracket   = "[" ( "*" | "-" | "?" filter | member ("," member)* ) "]"
//! member    = quoted | int | [int] ":" [int] [":" [int]]
//! filter    = or;  or = and ("||" and)*;  and = unary ("&&" unary)*
//! unary     = "!" unary | "(" or ")" | operand [cmp operand | "=~" regex]
//! operand   = path | literal | name "(" operands ")"
//! ```

use jsonkit_json_pointer::{is_valid_index, parse_json_pointer};
use jsonkit_node::{JsonError, JsonValue, Result};
use regex::RegexBuilder;

use crate::types::*;
use crate::JsonPath;

/// Recursive-descent JSONPath parser.
pub(crate) struct JsonPathParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> JsonPathParser<'a> {
    pub fn parse(input: &'a str) -> Result<JsonPath> {
        let mut parser = Self { input, pos: 0 };
        let path = parser.parse_path()?;
        if !parser.is_at_end() {
            return Err(parser.error("unexpected character", parser.pos));
        }
        Ok(path)
    }

    fn parse_path(&mut self) -> Result<JsonPath> {
        let head = match self.peek() {
            Some('$') => PathToken::Root,
            Some('@') => PathToken::Current,
            _ => return Err(self.error("expected '$' or '@'", self.pos)),
        };
        self.advance();
        let mut tokens = vec![head];
        self.parse_steps(&mut tokens)?;
        Ok(JsonPath::from_tokens_unchecked(tokens))
    }

    // Stops at the first character that cannot start a step, which is what
    // ends a path operand inside a filter.
    fn parse_steps(&mut self, tokens: &mut Vec<PathToken>) -> Result<()> {
        loop {
            if !matches!(self.peek(), Some('.') | Some('[')) {
                return Ok(());
            }
            match tokens.last() {
                Some(PathToken::Function { .. }) => {
                    return Err(self.error("nothing may follow a function call", self.pos))
                }
                Some(PathToken::Append) => {
                    return Err(self.error("'[-]' must be the last step", self.pos))
                }
                _ => {}
            }

            let start = self.pos;
            if self.peek() == Some('[') {
                tokens.push(self.parse_bracket()?);
                continue;
            }
            self.advance();

            if self.peek() == Some('.') {
                self.advance();
                tokens.push(PathToken::Descendant);
                match self.peek() {
                    Some('*') => {
                        self.advance();
                        tokens.push(PathToken::Wildcard);
                    }
                    Some('[') => tokens.push(self.parse_bracket()?),
                    Some(c) if is_name_char(c) => {
                        let name = self.parse_identifier();
                        if self.peek() == Some('(') {
                            return Err(self.error("a function call cannot follow '..'", start));
                        }
                        tokens.push(PathToken::Name(name));
                    }
                    _ => {
                        return Err(
                            self.error("'..' must be followed by a name, '*' or '['", start)
                        )
                    }
                }
            } else if self.peek() == Some('*') {
                self.advance();
                tokens.push(PathToken::Wildcard);
            } else if matches!(self.peek(), Some(c) if is_name_char(c)) {
                let name = self.parse_identifier();
                if self.peek() == Some('(') {
                    let args = self.parse_function_args()?;
                    tokens.push(PathToken::Function { name, args });
                } else {
                    tokens.push(PathToken::Name(name));
                }
            } else {
                return Err(self.error("expected a member name after '.'", start));
            }
        }
    }

    // ── Brackets ───────────────────────────────────────────────────────

    fn parse_bracket(&mut self) -> Result<PathToken> {
        let start = self.pos;
        self.expect('[')?;
        self.skip_whitespace();

        let token = match self.peek() {
            Some('?') => {
                self.advance();
                PathToken::Filter(self.parse_filter()?)
            }
            Some('*') => {
                self.advance();
                PathToken::Wildcard
            }
            Some('-') if self.peek_append() => {
                self.advance();
                PathToken::Append
            }
            _ => {
                let mut members = Vec::new();
                loop {
                    self.skip_whitespace();
                    members.push(self.parse_member(start)?);
                    self.skip_whitespace();
                    if self.peek() == Some(',') {
                        self.advance();
                    } else {
                        break;
                    }
                }
                if members.len() == 1 {
                    members.remove(0)
                } else {
                    PathToken::Union(members)
                }
            }
        };

        self.skip_whitespace();
        match self.peek() {
            Some(']') => {
                self.advance();
                Ok(token)
            }
            None => Err(self.error("unterminated '['", start)),
            Some(_) => Err(self.error("expected ']'", self.pos)),
        }
    }

    fn parse_member(&mut self, bracket_start: usize) -> Result<PathToken> {
        match self.peek() {
            Some('\'') | Some('"') => Ok(PathToken::Name(self.parse_string()?)),
            Some('-') | Some(':') | Some('0'..='9') => self.parse_index_or_slice(),
            Some('*') => Err(self.error(
                "'*' cannot be combined with other selectors",
                self.pos,
            )),
            None => Err(self.error("unterminated '['", bracket_start)),
            Some(_) => Err(self.error(
                "expected a quoted name, an index or a slice",
                self.pos,
            )),
        }
    }

    fn parse_index_or_slice(&mut self) -> Result<PathToken> {
        let start = self.pos;
        let first = self.parse_optional_int()?;
        self.skip_whitespace();
        if self.peek() != Some(':') {
            return first
                .map(PathToken::Index)
                .ok_or_else(|| self.error("expected an index", start));
        }
        self.advance();
        let end = self.parse_optional_int()?;
        self.skip_whitespace();
        let mut step = 1;
        if self.peek() == Some(':') {
            self.advance();
            if let Some(value) = self.parse_optional_int()? {
                step = value;
            }
        }
        if step == 0 {
            return Err(self.error("slice step cannot be zero", start));
        }
        Ok(PathToken::Slice(Slice::new(first, end, step)))
    }

    fn parse_optional_int(&mut self) -> Result<Option<i64>> {
        self.skip_whitespace();
        if matches!(self.peek(), Some('0'..='9') | Some('-')) {
            Ok(Some(self.parse_int()?))
        } else {
            Ok(None)
        }
    }

    fn parse_int(&mut self) -> Result<i64> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        let digits = self.pos;
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        if self.pos == digits {
            return Err(self.error("expected digits", start));
        }
        self.input[start..self.pos]
            .parse::<i64>()
            .map_err(|_| self.error("integer out of range", start))
    }

    // ── Literals ───────────────────────────────────────────────────────

    fn parse_function_args(&mut self) -> Result<Vec<JsonValue>> {
        let start = self.pos;
        self.expect('(')?;
        let mut args = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.advance();
            return Ok(args);
        }
        loop {
            self.skip_whitespace();
            args.push(self.parse_literal()?);
            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.advance(),
                Some(')') => {
                    self.advance();
                    return Ok(args);
                }
                None => return Err(self.error("unterminated '('", start)),
                Some(_) => return Err(self.error("expected ',' or ')'", self.pos)),
            }
        }
    }

    fn parse_literal(&mut self) -> Result<JsonValue> {
        if let Some((word, value)) = self.peek_keyword() {
            self.advance_by(word.len());
            return Ok(value);
        }
        match self.peek() {
            Some('\'') | Some('"') => Ok(JsonValue::String(self.parse_string()?)),
            Some('-') | Some('0'..='9') => self.parse_number(),
            _ => Err(self.error("expected a literal", self.pos)),
        }
    }

    fn peek_keyword(&self) -> Option<(&'static str, JsonValue)> {
        let candidates = [
            ("true", JsonValue::Bool(true)),
            ("false", JsonValue::Bool(false)),
            ("null", JsonValue::Null),
        ];
        candidates.into_iter().find(|(word, _)| {
            self.peek_str(word)
                && !self.input[self.pos + word.len()..]
                    .chars()
                    .next()
                    .is_some_and(is_name_char)
        })
    }

    fn parse_number(&mut self) -> Result<JsonValue> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.advance();
        }
        if !matches!(self.peek(), Some('0'..='9')) {
            return Err(self.error("invalid number", start));
        }
        while matches!(self.peek(), Some('0'..='9')) {
            self.advance();
        }
        let mut is_float = false;
        if self.peek() == Some('.') {
            self.advance();
            is_float = true;
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(self.error("invalid number", start));
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }
        if matches!(self.peek(), Some('e') | Some('E')) {
            self.advance();
            is_float = true;
            if matches!(self.peek(), Some('+') | Some('-')) {
                self.advance();
            }
            if !matches!(self.peek(), Some('0'..='9')) {
                return Err(self.error("invalid number", start));
            }
            while matches!(self.peek(), Some('0'..='9')) {
                self.advance();
            }
        }

        let text = &self.input[start..self.pos];
        if !is_float {
            if let Ok(value) = text.parse::<i64>() {
                return Ok(JsonValue::from(value));
            }
        }
        text.parse::<f64>()
            .map(JsonValue::from)
            .map_err(|_| self.error("invalid number", start))
    }

    fn parse_string(&mut self) -> Result<String> {
        let start = self.pos;
        let quote = match self.peek() {
            Some(c @ ('\'' | '"')) => c,
            _ => return Err(self.error("expected a quoted string", start)),
        };
        self.advance();

        let mut result = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated string", start)),
                Some(c) if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                Some('\\') => {
                    let escape = self.pos;
                    self.advance();
                    match self.peek() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('b') => result.push('\u{8}'),
                        Some('f') => result.push('\u{c}'),
                        Some(c @ ('\\' | '\'' | '"' | '/')) => result.push(c),
                        Some('u') => {
                            self.advance();
                            result.push(self.parse_unicode_escape(escape)?);
                            continue;
                        }
                        _ => return Err(self.error("invalid escape sequence", escape)),
                    }
                    self.advance();
                }
                Some(c) => {
                    result.push(c);
                    self.advance();
                }
            }
        }
    }

    fn parse_unicode_escape(&mut self, escape: usize) -> Result<char> {
        let hex = self
            .input
            .get(self.pos..self.pos + 4)
            .filter(|hex| hex.chars().all(|c| c.is_ascii_hexdigit()))
            .ok_or_else(|| self.error("invalid unicode escape", escape))?;
        let code = u32::from_str_radix(hex, 16)
            .map_err(|_| self.error("invalid unicode escape", escape))?;
        self.advance_by(4);
        char::from_u32(code).ok_or_else(|| self.error("invalid unicode escape", escape))
    }

    // ── Filters ────────────────────────────────────────────────────────

    fn parse_filter(&mut self) -> Result<FilterExpr> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<FilterExpr> {
        let mut left = self.parse_and()?;
        loop {
            self.skip_whitespace();
            if !self.peek_str("||") {
                return Ok(left);
            }
            self.advance_by(2);
            let right = self.parse_and()?;
            left = FilterExpr::Or(Box::new(left), Box::new(right));
        }
    }

    fn parse_and(&mut self) -> Result<FilterExpr> {
        let mut left = self.parse_unary()?;
        loop {
            self.skip_whitespace();
            if !self.peek_str("&&") {
                return Ok(left);
            }
            self.advance_by(2);
            let right = self.parse_unary()?;
            left = FilterExpr::And(Box::new(left), Box::new(right));
        }
    }

    fn parse_unary(&mut self) -> Result<FilterExpr> {
        self.skip_whitespace();
        let start = self.pos;
        if self.peek() == Some('!') && !self.peek_str("!=") {
            self.advance();
            return Ok(FilterExpr::Not(Box::new(self.parse_unary()?)));
        }
        if self.peek() == Some('(') {
            self.advance();
            let inner = self.parse_or()?;
            self.skip_whitespace();
            return match self.peek() {
                Some(')') => {
                    self.advance();
                    Ok(FilterExpr::Group(Box::new(inner)))
                }
                None => Err(self.error("unterminated '('", start)),
                Some(_) => Err(self.error("expected ')'", self.pos)),
            };
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<FilterExpr> {
        let left = self.parse_operand()?;
        self.skip_whitespace();

        if self.peek_str("=~") {
            self.advance_by(2);
            self.skip_whitespace();
            let regex = self.parse_regex()?;
            return Ok(FilterExpr::Match { left, regex });
        }
        if let Some((op, len)) = self.peek_compare_op() {
            self.advance_by(len);
            let right = self.parse_operand()?;
            return Ok(FilterExpr::Compare { op, left, right });
        }
        Ok(FilterExpr::Truthy(left))
    }

    fn peek_compare_op(&self) -> Option<(CompareOp, usize)> {
        [
            ("==", CompareOp::Eq),
            ("!=", CompareOp::Ne),
            ("<=", CompareOp::Le),
            (">=", CompareOp::Ge),
            ("<", CompareOp::Lt),
            (">", CompareOp::Gt),
        ]
        .into_iter()
        .find(|(text, _)| self.peek_str(text))
        .map(|(text, op)| (op, text.len()))
    }

    fn parse_operand(&mut self) -> Result<Operand> {
        self.skip_whitespace();
        match self.peek() {
            Some('@') | Some('$') => Ok(Operand::Path(self.parse_path()?)),
            Some('\'') | Some('"') | Some('-') | Some('0'..='9') => {
                Ok(Operand::Literal(self.parse_literal()?))
            }
            Some(c) if c.is_alphabetic() => {
                if self.peek_keyword().is_some() {
                    return Ok(Operand::Literal(self.parse_literal()?));
                }
                let start = self.pos;
                let name = self.parse_identifier();
                self.skip_whitespace();
                if self.peek() != Some('(') {
                    return Err(self.error("expected '(' after function name", start));
                }
                self.advance();
                let mut args = Vec::new();
                self.skip_whitespace();
                if self.peek() == Some(')') {
                    self.advance();
                    return Ok(Operand::Call { name, args });
                }
                loop {
                    args.push(self.parse_operand()?);
                    self.skip_whitespace();
                    match self.peek() {
                        Some(',') => self.advance(),
                        Some(')') => {
                            self.advance();
                            return Ok(Operand::Call { name, args });
                        }
                        None => return Err(self.error("unterminated '('", start)),
                        Some(_) => return Err(self.error("expected ',' or ')'", self.pos)),
                    }
                }
            }
            None => Err(self.error("unexpected end of filter", self.pos)),
            Some(_) => Err(self.error("expected an operand", self.pos)),
        }
    }

    fn parse_regex(&mut self) -> Result<RegexLiteral> {
        let start = self.pos;
        if self.peek() != Some('/') {
            return Err(self.error("expected '/' to open a regular expression", start));
        }
        self.advance();

        let mut pattern = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated regular expression", start)),
                Some('/') => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    match self.peek() {
                        Some('/') => pattern.push('/'),
                        Some(c) => {
                            pattern.push('\\');
                            pattern.push(c);
                        }
                        None => {
                            return Err(self.error("unterminated regular expression", start))
                        }
                    }
                    self.advance();
                }
                Some(c) => {
                    pattern.push(c);
                    self.advance();
                }
            }
        }

        let flags_start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphabetic()) {
            self.advance();
        }
        let flags = self.input[flags_start..self.pos].to_string();

        let mut builder = RegexBuilder::new(&pattern);
        for flag in flags.chars() {
            match flag {
                'i' => {
                    builder.case_insensitive(true);
                }
                'm' => {
                    builder.multi_line(true);
                }
                's' => {
                    builder.dot_matches_new_line(true);
                }
                'x' => {
                    builder.ignore_whitespace(true);
                }
                'u' => {}
                other => {
                    return Err(self.error(format!("unknown regex flag '{other}'"), start))
                }
            }
        }
        let regex = builder
            .build()
            .map_err(|err| self.error(format!("invalid regular expression: {err}"), start))?;
        Ok(RegexLiteral::new(pattern, flags, regex))
    }

    // ── Scanning helpers ───────────────────────────────────────────────

    fn parse_identifier(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if is_name_char(c)) {
            self.advance();
        }
        self.input[start..self.pos].to_string()
    }

    fn peek_append(&self) -> bool {
        self.input[self.pos..]
            .strip_prefix('-')
            .is_some_and(|rest| rest.trim_start().starts_with(']'))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_str(&self, s: &str) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn advance_by(&mut self, n: usize) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.peek() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!("expected '{expected}'"), self.pos))
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    /// Malformed-expression error covering `input[start..pos]`, or the
    /// single character at `start` when nothing was consumed yet.
    fn error(&self, message: impl Into<String>, start: usize) -> JsonError {
        let start = start.min(self.input.len());
        let mut end = self.pos.max(start);
        if end == start {
            end += self.input[start..].chars().next().map_or(0, char::len_utf8);
        }
        JsonError::malformed(message, &self.input[start..end], start)
    }
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-'
}

/// Compiles JSON Pointer text. Canonical non-negative integers become
/// [`PathToken::Index`] and a final `-` becomes [`PathToken::Append`];
/// every other reference token is a member name.
pub(crate) fn compile_pointer(expr: &str) -> Result<JsonPath> {
    let components = parse_json_pointer(expr).map_err(|err| {
        let position = err.position().min(expr.len());
        JsonError::malformed(err.to_string(), pointer_fragment(expr, position), position)
    })?;

    let last = components.len().saturating_sub(1);
    let mut tokens = Vec::with_capacity(components.len() + 1);
    tokens.push(PathToken::Root);
    for (i, component) in components.into_iter().enumerate() {
        let token = if i == last && component == "-" {
            PathToken::Append
        } else if is_valid_index(&component) {
            match component.parse::<i64>() {
                Ok(index) => PathToken::Index(index),
                Err(_) => PathToken::Name(component),
            }
        } else {
            PathToken::Name(component)
        };
        tokens.push(token);
    }
    Ok(JsonPath::from_tokens_unchecked(tokens))
}

fn pointer_fragment(expr: &str, position: usize) -> &str {
    let rest = expr.get(position..).unwrap_or("");
    match rest.char_indices().skip(1).find(|(_, c)| *c == '/') {
        Some((end, _)) => &rest[..end],
        None => rest,
    }
}
