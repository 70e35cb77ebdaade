// ABOUTME: Reader module converting source text into Values using nom combinators

use nom::{
    branch::alt,
    bytes::complete::{escaped, tag, tag_no_case, take_while, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0,
    sequence::delimited,
    IResult, Parser,
};

use crate::error::LispError;
use crate::value::Value;
use std::collections::HashMap;
use std::rc::Rc;

pub type ReadMacroFn = Rc<dyn Fn(&str, Vec<Value>) -> Value>;

/// Converts source text into `Value`s, honoring a host-registered table of
/// read-time macros invoked through `#(NAME datum*)` syntax.
pub struct Reader {
    read_macros: HashMap<String, ReadMacroFn>,
}

impl Default for Reader {
    fn default() -> Self {
        Self::new()
    }
}

impl Reader {
    pub fn new() -> Self {
        Reader {
            read_macros: HashMap::new(),
        }
    }

    pub fn register_macro(&mut self, name: &str, transform: ReadMacroFn) -> Result<(), LispError> {
        if self.read_macros.contains_key(name) {
            return Err(LispError::DuplicateMacro(name.to_string()));
        }
        self.read_macros.insert(name.to_string(), transform);
        Ok(())
    }

    /// Reads every top-level datum in `input`.
    pub fn read_all(&self, input: &str) -> Result<Vec<Value>, LispError> {
        let mut remaining = input;
        let mut forms = Vec::new();
        loop {
            let (rest, _) = ws_and_comments(remaining)
                .map_err(|e| LispError::ReadError(e.to_string()))?;
            if rest.is_empty() {
                break;
            }
            let (rest, value) = self
                .parse_datum(rest)
                .map_err(|e| LispError::ReadError(e.to_string()))?;
            forms.push(value);
            remaining = rest;
        }
        Ok(forms)
    }

    /// Reads a single leading datum, returning it with the unconsumed rest.
    pub fn read_one<'a>(&self, input: &'a str) -> Result<(Value, &'a str), LispError> {
        let (rest, _) =
            ws_and_comments(input).map_err(|e| LispError::ReadError(e.to_string()))?;
        self.parse_datum(rest)
            .map(|(rest, value)| (value, rest))
            .map_err(|e| LispError::ReadError(e.to_string()))
    }

    fn parse_datum<'a>(&self, input: &'a str) -> IResult<&'a str, Value> {
        delimited(
            ws_and_comments,
            |i| self.parse_datum_no_ws(i),
            ws_and_comments,
        )
        .parse(input)
    }

    fn parse_datum_no_ws<'a>(&self, input: &'a str) -> IResult<&'a str, Value> {
        alt((
            parse_boolean,
            parse_number,
            parse_string,
            |i| self.parse_quoted(i),
            |i| self.parse_read_macro(i),
            |i| self.parse_list(i),
            parse_symbol,
        ))
        .parse(input)
    }

    fn parse_quoted<'a>(&self, input: &'a str) -> IResult<&'a str, Value> {
        let (input, _) = char('\'').parse(input)?;
        let (input, datum) = self.parse_datum(input)?;
        Ok((
            input,
            Value::list(vec![Value::symbol("quote"), datum]),
        ))
    }

    fn parse_list<'a>(&self, input: &'a str) -> IResult<&'a str, Value> {
        let (input, _) = char('(').parse(input)?;
        let (input, _) = ws_and_comments(input)?;
        let mut items = Vec::new();
        let mut rest = input;
        loop {
            if let Ok((r, _)) = char::<_, nom::error::Error<_>>(')').parse(rest) {
                return Ok((r, Value::list(items)));
            }
            let (r, item) = self.parse_datum_no_ws(rest)?;
            items.push(item);
            let (r, _) = ws_and_comments(r)?;
            rest = r;
        }
    }

    fn parse_read_macro<'a>(&self, input: &'a str) -> IResult<&'a str, Value> {
        let (input, _) = tag("#(").parse(input)?;
        let (input, _) = ws_and_comments(input)?;
        let (input, name) = take_while1(|c: char| !c.is_whitespace() && c != '(' && c != ')')
            .parse(input)?;
        let (mut rest, _) = ws_and_comments(input)?;
        let mut datums = Vec::new();
        loop {
            if let Ok((r, _)) = char::<_, nom::error::Error<_>>(')').parse(rest) {
                rest = r;
                break;
            }
            let (r, item) = self.parse_datum_no_ws(rest)?;
            datums.push(item);
            let (r, _) = ws_and_comments(r)?;
            rest = r;
        }

        match self.read_macros.get(name) {
            Some(transform) => Ok((rest, transform(name, datums))),
            None => Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            ))),
        }
    }
}

fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((
        value((), multispace1),
        value((), line_comment),
    )))
    .map(|_| ())
    .parse(input)
}

fn line_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';').parse(input)?;
    let (input, _) = take_while(|c| c != '\n').parse(input)?;
    Ok((input, ()))
}

fn parse_boolean(input: &str) -> IResult<&str, Value> {
    alt((
        value(Value::Boolean(true), tag_no_case("#true")),
        value(Value::Boolean(false), tag_no_case("#false")),
    ))
    .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Value> {
    map(
        recognize((opt(char('-')), digit1)),
        |text: &str| Value::Number(text.parse::<i64>().expect("digit1 guarantees a valid integer")),
    )
    .parse(input)
}

/// Symbol text excludes `"`, whitespace, `(`, `)`, and `#`; purely numeric
/// text is claimed by `parse_number` first via `alt`'s ordering.
fn parse_symbol(input: &str) -> IResult<&str, Value> {
    map(
        take_while1(|c: char| !c.is_whitespace() && !"\"()#".contains(c)),
        Value::symbol,
    )
    .parse(input)
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"').parse(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"').parse(input) {
        return Ok((input, Value::string("")));
    }
    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\n")).parse(input)?;
    let (input, _) = char('"').parse(input)?;

    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => out.push(other),
                None => {}
            }
        } else {
            out.push(c);
        }
    }
    Ok((input, Value::string(out)))
}

/// Three-state balance check: only top-level paren depth outside string
/// literals counts. Over-accepts trailing garbage after depth reaches zero
/// by design — this is a continuation hint for a host REPL, not a validator.
pub fn balance(text: &str) -> Result<bool, LispError> {
    #[derive(PartialEq)]
    enum State {
        Normal,
        InString,
        Escape,
    }

    let mut state = State::Normal;
    let mut depth: i64 = 0;

    for c in text.chars() {
        match state {
            State::Normal => match c {
                '"' => state = State::InString,
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            },
            State::InString => match c {
                '\\' => state = State::Escape,
                '"' => state = State::Normal,
                '\n' => return Err(LispError::UnterminatedString),
                _ => {}
            },
            State::Escape => state = State::InString,
        }
    }

    if state == State::InString {
        return Err(LispError::UnterminatedString);
    }

    Ok(depth <= 0)
}
