use std::fmt;

use crate::config::TraceFlags;
use crate::error::CommandError;

/// An argument value in command text.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
}

impl Arg {
    pub fn is_undefined(&self) -> bool {
        matches!(self, Arg::Undefined)
    }

    /// Integer view of the argument; `None` for `undefined`, `null` and
    /// anything that is not numeric.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Arg::Number(n) if n.is_finite() => Some(n.trunc() as i64),
            Arg::Bool(b) => Some(i64::from(*b)),
            Arg::Str(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Undefined => write!(f, "undefined"),
            Arg::Null => write!(f, "null"),
            Arg::Bool(b) => write!(f, "{b}"),
            Arg::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Arg::Number(n) => write!(f, "{n}"),
            Arg::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A single `name(args)` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub name: String,
    pub args: Vec<Arg>,
    /// Character offset of the statement in the command text.
    pub offset: usize,
}

/// Parse command text such as `locals(1);evaluate('x', 2);resume('step_over')`.
///
/// Statements are separated by `;` (the trailing one is optional). Quote
/// handling follows JavaScript string literals closely enough for test
/// annotations; `;` inside quotes does not split.
pub fn parse_script(text: &str) -> Result<Vec<Invocation>, CommandError> {
    let mut cursor = Cursor::new(text);
    let mut invocations = Vec::new();

    loop {
        cursor.skip_ws();
        match cursor.peek() {
            None => break,
            Some(';') => {
                cursor.bump();
                continue;
            }
            Some(_) => {}
        }

        let offset = cursor.pos;
        let name = cursor.ident()?;
        cursor.skip_ws();
        cursor.expect('(')?;
        let args = cursor.args()?;
        cursor.expect(')')?;
        invocations.push(Invocation { name, args, offset });

        cursor.skip_ws();
        match cursor.peek() {
            None => break,
            Some(';') => cursor.bump(),
            Some(ch) => return Err(cursor.error(format!("expected ';', found '{ch}'"))),
        }
    }

    Ok(invocations)
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) {
        self.pos += 1;
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        Some(ch)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn error(&self, message: String) -> CommandError {
        CommandError::Syntax {
            offset: self.pos,
            message,
        }
    }

    fn expect(&mut self, wanted: char) -> Result<(), CommandError> {
        self.skip_ws();
        match self.peek() {
            Some(ch) if ch == wanted => {
                self.bump();
                Ok(())
            }
            Some(ch) => Err(self.error(format!("expected '{wanted}', found '{ch}'"))),
            None => Err(self.error(format!("expected '{wanted}', found end of text"))),
        }
    }

    fn ident(&mut self) -> Result<String, CommandError> {
        let start = self.pos;
        match self.peek() {
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' || ch == '$' => self.bump(),
            Some(ch) => return Err(self.error(format!("unexpected '{ch}'"))),
            None => return Err(self.error("unexpected end of text".to_string())),
        }
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
        {
            self.bump();
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn args(&mut self) -> Result<Vec<Arg>, CommandError> {
        let mut args = Vec::new();
        self.skip_ws();
        if self.peek() == Some(')') {
            return Ok(args);
        }
        loop {
            args.push(self.expr()?);
            self.skip_ws();
            if self.peek() == Some(',') {
                self.bump();
                continue;
            }
            return Ok(args);
        }
    }

    /// `term ('|' term)*`; `|` only combines numbers.
    fn expr(&mut self) -> Result<Arg, CommandError> {
        let mut value = self.term()?;
        loop {
            self.skip_ws();
            if self.peek() != Some('|') {
                return Ok(value);
            }
            self.bump();
            let rhs = self.term()?;
            value = match (value, rhs) {
                (Arg::Number(a), Arg::Number(b)) => Arg::Number(((a as u64) | (b as u64)) as f64),
                _ => return Err(self.error("'|' needs numeric operands".to_string())),
            };
        }
    }

    fn term(&mut self) -> Result<Arg, CommandError> {
        self.skip_ws();
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.bump();
                self.string(quote)
            }
            Some(ch) if ch.is_ascii_digit() || ch == '-' || ch == '.' => self.number(),
            Some(_) => {
                let ident = self.ident()?;
                constant(&ident).ok_or_else(|| self.error(format!("unknown identifier '{ident}'")))
            }
            None => Err(self.error("expected an argument".to_string())),
        }
    }

    fn string(&mut self, quote: char) -> Result<Arg, CommandError> {
        let mut out = String::new();
        loop {
            let Some(ch) = self.next() else {
                return Err(self.error("unterminated string".to_string()));
            };
            match ch {
                '\\' => {
                    let Some(escaped) = self.next() else {
                        return Err(self.error("unterminated string".to_string()));
                    };
                    out.push(match escaped {
                        'n' => '\n',
                        't' => '\t',
                        'r' => '\r',
                        '0' => '\0',
                        other => other,
                    });
                }
                ch if ch == quote => return Ok(Arg::Str(out)),
                ch => out.push(ch),
            }
        }
    }

    fn number(&mut self) -> Result<Arg, CommandError> {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        while self
            .peek()
            .is_some_and(|ch| ch.is_ascii_digit() || ch == '.' || ch == 'e' || ch == 'E')
        {
            self.bump();
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        text.parse::<f64>()
            .map(Arg::Number)
            .map_err(|_| self.error(format!("invalid number '{text}'")))
    }
}

fn constant(ident: &str) -> Option<Arg> {
    match ident {
        "undefined" => Some(Arg::Undefined),
        "null" => Some(Arg::Null),
        "true" => Some(Arg::Bool(true)),
        "false" => Some(Arg::Bool(false)),
        other => TraceFlags::constant(other).map(|flags| Arg::Number(f64::from(flags.bits()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_statements() {
        let script = parse_script("locals();stack();").unwrap();
        let names: Vec<_> = script.iter().map(|inv| inv.name.as_str()).collect();
        assert_eq!(names, ["locals", "stack"]);
    }

    #[test]
    fn parses_argument_kinds() {
        let script = parse_script(r#"evaluate('a;b', 2, undefined); log("it\"s")"#).unwrap();
        assert_eq!(
            script[0].args,
            vec![Arg::Str("a;b".to_string()), Arg::Number(2.0), Arg::Undefined]
        );
        assert_eq!(script[1].args, vec![Arg::Str("it\"s".to_string())]);
    }

    #[test]
    fn trace_constants_combine() {
        let script = parse_script("trace(TRACE_COMMANDS | TRACE_DEBUG_EVENTS)").unwrap();
        assert_eq!(script[0].args, vec![Arg::Number(9.0)]);
    }

    #[test]
    fn reports_syntax_errors() {
        assert!(matches!(
            parse_script("locals(;"),
            Err(CommandError::Syntax { .. })
        ));
        assert!(matches!(
            parse_script("log('open)"),
            Err(CommandError::Syntax { .. })
        ));
        assert!(matches!(
            parse_script("stack() stack()"),
            Err(CommandError::Syntax { .. })
        ));
    }

    #[test]
    fn formats_arguments_like_script_values() {
        assert_eq!(Arg::Number(3.0).to_string(), "3");
        assert_eq!(Arg::Number(1.5).to_string(), "1.5");
        assert_eq!(Arg::Undefined.to_string(), "undefined");
    }
}
