use crate::engine::ExceptionMode;
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// `/**bp**/`: a live breakpoint.
    Breakpoint,
    /// `/**loc(name)**/`: a named site, enabled later with `enableBp`.
    Location,
    /// `/**exception(mode)**/`
    Exception(ExceptionMode),
    /// `/**onasyncbreak:cmds**/`
    OnAsyncBreak,
}

/// One annotation found in source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub kind: DirectiveKind,
    pub name: Option<String>,
    pub column_offset: Option<u32>,
    pub command_text: Option<String>,
    /// Zero-based line of the start token.
    pub line: u32,
}

/// Output of scanning one source unit.
///
/// `directives` holds everything found before `error`, if any; scanning
/// stops at the first error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scan {
    pub directives: Vec<Directive>,
    pub error: Option<ParseError>,
}
