mod baseline;
mod event_log;
mod summarize;

pub use baseline::{Baseline, Mismatch, Verdict};
pub use event_log::{EventLog, FILTERED_NAMES};
pub use summarize::ObjectSummarizer;

/// File name without its directory, for output that must not depend on
/// where the tests were checked out. Both `\` and `/` separate.
pub fn file_basename(path: &str) -> &str {
    path.rfind(['\\', '/']).map_or(path, |index| &path[index + 1..])
}
