use super::quotes::inside_string;
use super::types::{Directive, DirectiveKind, Scan};
use crate::engine::ExceptionMode;
use crate::error::ParseError;

const START: &str = "/**";
const END: &str = "**/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Bp,
    Loc,
    Exception,
    OnAsyncBreak,
}

const TOKENS: [(&str, Token); 4] = [
    ("/**bp", Token::Bp),
    ("/**loc", Token::Loc),
    ("/**exception", Token::Exception),
    ("/**onasyncbreak", Token::OnAsyncBreak),
];

/// Scan source text for breakpoint annotations.
///
/// Supported forms:
///
/// ```text
/// /**bp**/                 /**bp(name)**/           /**bp(columnOffset)**/
/// /**bp:locals();stack()**/  /**bp(name):locals()**/
/// /**loc(name)**/          /**loc(name):cmds**/
/// /**exception(none|uncaught|all)**/   /**onasyncbreak:cmds**/
/// ```
///
/// A directive may span lines; the following lines are appended until `**/`
/// shows up. A line containing another `/**` ends the search and the
/// directive is unterminated. The first error stops the scan.
pub fn scan(text: &str) -> Scan {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut scan = Scan::default();
    let mut i = 0usize;

    while i < lines.len() {
        let line = lines[i];
        let line_no = to_line(i);
        let mut last_consumed = i;

        for (token, kind) in TOKENS {
            let mut from = 0usize;
            while let Some(found) = line[from..].find(token) {
                let start = from + found;
                from = start + 1;
                let body_start = start + token.len();

                let mut gathered = line.to_string();
                let mut next = i + 1;
                let mut end = find_end(&gathered, body_start);
                while end.is_none() && next < lines.len() && !lines[next].contains(START) {
                    gathered.push_str(lines[next]);
                    next += 1;
                    end = find_end(&gathered, body_start);
                }
                last_consumed = last_consumed.max(next - 1);

                let Some(end) = end else {
                    scan.error = Some(ParseError::Unterminated { line: line_no });
                    return scan;
                };

                // Inside a string literal (an eval, usually). The eval's own
                // compile event gets the annotation parsed.
                if inside_string(&gathered[..start]) {
                    continue;
                }

                match parse_body(kind, &gathered[body_start..end], line_no, line) {
                    Ok(directive) => scan.directives.push(directive),
                    Err(err) => {
                        scan.error = Some(err);
                        return scan;
                    }
                }
            }
        }

        i = last_consumed + 1;
    }

    scan
}

fn find_end(gathered: &str, body_start: usize) -> Option<usize> {
    gathered[body_start..]
        .find(END)
        .map(|offset| body_start + offset)
}

fn parse_body(
    token: Token,
    body: &str,
    line: u32,
    line_text: &str,
) -> Result<Directive, ParseError> {
    let mut rest = body;
    let mut param = None;

    if let Some(after_open) = rest.strip_prefix('(') {
        let invalid = || ParseError::InvalidParameter {
            line,
            text: body.to_string(),
        };
        let close = after_open.find(')').ok_or_else(invalid)?;
        let text = &after_open[..close];
        if text.is_empty()
            || !text
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ',')
        {
            return Err(invalid());
        }
        param = Some(text);
        rest = &after_open[close + 1..];
    }

    // The parameter is overloaded: leading digits make it a column offset.
    let column_offset = param
        .and_then(leading_integer)
        .map(|offset| clamp_column(offset, line_text));
    let mut name = match column_offset {
        Some(_) => None,
        None => param.map(str::to_string),
    };

    let kind = match token {
        Token::Bp => DirectiveKind::Breakpoint,
        Token::Loc if name.is_none() => return Err(ParseError::MissingLocationName { line }),
        Token::Loc => DirectiveKind::Location,
        Token::Exception => {
            let text = param.unwrap_or_default();
            let mode =
                ExceptionMode::from_name(text).ok_or_else(|| ParseError::InvalidExceptionMode {
                    line,
                    text: text.to_string(),
                })?;
            name = None;
            DirectiveKind::Exception(mode)
        }
        Token::OnAsyncBreak => DirectiveKind::OnAsyncBreak,
    };

    let command_text = match rest.strip_prefix(':') {
        Some(commands) => Some(commands.to_string()),
        None if rest.is_empty() => None,
        None => {
            return Err(ParseError::InvalidDirective {
                line,
                text: body.to_string(),
            })
        }
    };

    Ok(Directive {
        kind,
        name,
        column_offset,
        command_text,
        line,
    })
}

fn leading_integer(param: &str) -> Option<u64> {
    let digits: String = param.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

fn clamp_column(offset: u64, line_text: &str) -> u32 {
    let visible = line_text.trim_end_matches('\r');
    let max = visible.chars().count().saturating_sub(1) as u64;
    u32::try_from(offset.min(max)).unwrap_or(u32::MAX)
}

fn to_line(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}
