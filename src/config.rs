use serde::{Deserialize, Serialize};

bitflags::bitflags! {
    /// Internal trace categories toggled by the `trace(flag)` command.
    ///
    /// They only gate diagnostic output; the event log never depends on them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TraceFlags: u32 {
        /// Every command popped from the queue.
        const COMMANDS = 0x001;
        /// Results returned by engine calls.
        const DIAG_OUTPUT = 0x002;
        /// Breakpoint table and pause handler internals.
        const INTERNAL_FUNCTIONS = 0x004;
        /// Incoming debug events.
        const DEBUG_EVENTS = 0x008;
        const ALL = Self::COMMANDS.bits()
            | Self::DIAG_OUTPUT.bits()
            | Self::INTERNAL_FUNCTIONS.bits()
            | Self::DEBUG_EVENTS.bits();
    }
}

impl TraceFlags {
    /// Names usable as constants inside command text, e.g. `trace(TRACE_COMMANDS)`.
    pub fn constant(name: &str) -> Option<TraceFlags> {
        match name {
            "TRACE_COMMANDS" => Some(TraceFlags::COMMANDS),
            "TRACE_DIAG_OUTPUT" => Some(TraceFlags::DIAG_OUTPUT),
            "TRACE_INTERNAL_FUNCTIONS" => Some(TraceFlags::INTERNAL_FUNCTIONS),
            "TRACE_DEBUG_EVENTS" => Some(TraceFlags::DEBUG_EVENTS),
            "TRACE_ALL" => Some(TraceFlags::ALL),
            _ => None,
        }
    }
}

pub const DEFAULT_INSPECT_MAX_STRING_LENGTH: usize = 16;
pub const DEFAULT_PROPERTY_PAGE_SIZE: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ControllerConfig {
    /// Strings longer than this render as `<large string>`.
    pub inspect_max_string_length: usize,
    /// How many child properties are requested per expanded object.
    pub property_page_size: u32,
    /// Raw [`TraceFlags`] bits enabled before any `trace()` command runs.
    pub trace: u32,
}

impl ControllerConfig {
    pub fn trace_flags(&self) -> TraceFlags {
        TraceFlags::from_bits_truncate(self.trace)
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            inspect_max_string_length: DEFAULT_INSPECT_MAX_STRING_LENGTH,
            property_page_size: DEFAULT_PROPERTY_PAGE_SIZE,
            trace: 0,
        }
    }
}
