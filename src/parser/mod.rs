mod annotations;
mod commands;
mod quotes;
mod types;

pub use annotations::scan;
pub use commands::{parse_script, Arg, Invocation};
pub use quotes::inside_string;
pub use types::{Directive, DirectiveKind, Scan};
