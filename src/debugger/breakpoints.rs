use std::collections::BTreeMap;
use std::fmt;

use crate::engine::{DebugEngine, ScriptId};
use crate::error::BreakpointError;

/// Key of a tracked breakpoint.
///
/// Engine ids come from the engine and are only valid while the breakpoint is
/// live. Placeholder ids are handed out locally for breakpoints that exist in
/// the table but not in the engine (`loc` sites, disabled breakpoints).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BreakpointId {
    Engine(u32),
    Placeholder(u32),
}

impl fmt::Display for BreakpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakpointId::Engine(id) => write!(f, "{id}"),
            BreakpointId::Placeholder(id) => write!(f, "placeholder {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointRecord {
    pub id: BreakpointId,
    pub script_id: ScriptId,
    pub name: Option<String>,
    pub line: u32,
    pub column: u32,
    pub command_text: Option<String>,
    pub enabled: bool,
}

/// Everything needed to (re)create a breakpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointRequest {
    pub name: Option<String>,
    pub script_id: ScriptId,
    pub line: u32,
    pub column: u32,
    pub command_text: Option<String>,
}

impl From<&BreakpointRecord> for BreakpointRequest {
    fn from(record: &BreakpointRecord) -> Self {
        Self {
            name: record.name.clone(),
            script_id: record.script_id,
            line: record.line,
            column: record.column,
            command_text: record.command_text.clone(),
        }
    }
}

/// Owns breakpoint identity. Engine calls go through the engine passed in.
#[derive(Debug)]
pub struct BreakpointTable {
    records: BTreeMap<BreakpointId, BreakpointRecord>,
    next_placeholder: u32,
}

impl Default for BreakpointTable {
    fn default() -> Self {
        Self::new()
    }
}

impl BreakpointTable {
    pub fn new() -> Self {
        Self {
            records: BTreeMap::new(),
            next_placeholder: 1,
        }
    }

    /// Creates a live breakpoint. Line and column are the engine's answer,
    /// which may differ from the request.
    pub fn set<E: DebugEngine>(
        &mut self,
        engine: &mut E,
        request: BreakpointRequest,
    ) -> Result<BreakpointId, BreakpointError> {
        let created = engine.set_breakpoint(request.script_id, request.line, request.column)?;
        let id = BreakpointId::Engine(created.breakpoint_id);
        tracing::debug!(%id, line = created.line, column = created.column, "breakpoint set");
        self.records.insert(
            id,
            BreakpointRecord {
                id,
                script_id: request.script_id,
                name: request.name,
                line: created.line,
                column: created.column,
                command_text: request.command_text,
                enabled: true,
            },
        );
        Ok(id)
    }

    /// Tracks a disabled breakpoint without telling the engine.
    pub fn set_location(&mut self, request: BreakpointRequest) -> BreakpointId {
        let id = self.placeholder();
        self.records.insert(
            id,
            BreakpointRecord {
                id,
                script_id: request.script_id,
                name: request.name,
                line: request.line,
                column: request.column,
                command_text: request.command_text,
                enabled: false,
            },
        );
        id
    }

    /// Materializes a named breakpoint in the engine. The id changes.
    pub fn enable<E: DebugEngine>(
        &mut self,
        engine: &mut E,
        name: &str,
    ) -> Result<BreakpointId, BreakpointError> {
        let record = self.find_by_name(name)?;
        if record.enabled {
            return Ok(record.id);
        }
        let old_id = record.id;
        let request = BreakpointRequest::from(record);
        let id = self.set(engine, request)?;
        self.records.remove(&old_id);
        tracing::debug!(name, %old_id, %id, "breakpoint enabled");
        Ok(id)
    }

    /// Removes a named breakpoint from the engine but keeps it re-enableable.
    pub fn disable<E: DebugEngine>(
        &mut self,
        engine: &mut E,
        name: &str,
    ) -> Result<(), BreakpointError> {
        let record = self.find_by_name(name)?;
        if !record.enabled {
            return Ok(());
        }
        let old_id = record.id;
        if let BreakpointId::Engine(engine_id) = old_id {
            engine.remove_breakpoint(engine_id)?;
        }
        if let Some(mut record) = self.records.remove(&old_id) {
            let id = self.placeholder();
            record.id = id;
            record.enabled = false;
            self.records.insert(id, record);
        }
        tracing::debug!(name, %old_id, "breakpoint disabled");
        Ok(())
    }

    /// Removes a named breakpoint from the engine and forgets it.
    pub fn delete<E: DebugEngine>(
        &mut self,
        engine: &mut E,
        name: &str,
    ) -> Result<(), BreakpointError> {
        let record = self.find_by_name(name)?;
        let id = record.id;
        if let (true, BreakpointId::Engine(engine_id)) = (record.enabled, id) {
            engine.remove_breakpoint(engine_id)?;
        }
        self.records.remove(&id);
        tracing::debug!(name, %id, "breakpoint deleted");
        Ok(())
    }

    /// First record with this name, in key order.
    pub fn find_by_name(&self, name: &str) -> Result<&BreakpointRecord, BreakpointError> {
        self.records
            .values()
            .find(|record| record.name.as_deref() == Some(name))
            .ok_or_else(|| BreakpointError::NotFound(name.to_string()))
    }

    pub fn get(&self, id: BreakpointId) -> Option<&BreakpointRecord> {
        self.records.get(&id)
    }

    pub fn command_text(&self, id: BreakpointId) -> Result<Option<&str>, BreakpointError> {
        self.records
            .get(&id)
            .map(|record| record.command_text.as_deref())
            .ok_or(BreakpointError::UnknownId(id))
    }

    pub fn set_command_text(
        &mut self,
        id: BreakpointId,
        text: Option<String>,
    ) -> Result<(), BreakpointError> {
        let record = self
            .records
            .get_mut(&id)
            .ok_or(BreakpointError::UnknownId(id))?;
        record.command_text = text;
        Ok(())
    }

    pub fn clear_all(&mut self) {
        self.records.clear();
        self.next_placeholder = 1;
    }

    pub fn iter(&self) -> impl Iterator<Item = &BreakpointRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn placeholder(&mut self) -> BreakpointId {
        let id = BreakpointId::Placeholder(self.next_placeholder);
        self.next_placeholder += 1;
        id
    }
}
