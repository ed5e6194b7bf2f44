//! Dependency-injected diagnostics sink, replacing a logger singleton.
//!
//! `Encoder`/`Decoder` take a `&dyn Diagnostics` rather than reaching for a
//! global logging framework, so this crate carries no logging dependency of
//! its own and a caller can wire it to whatever they already use (e.g. a
//! `tracing::Subscriber` adapter) or to `CollectingDiagnostics` in tests.

use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

pub trait Diagnostics {
    fn emit(&self, level: DiagLevel, message: &str);
}

/// Discards everything. The default for callers who don't care.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDiagnostics;

impl Diagnostics for NullDiagnostics {
    fn emit(&self, _level: DiagLevel, _message: &str) {}
}

/// Stores every emitted record, in order. Used by tests that want to assert
/// on *why* a candidate was skipped, and by the CLI demo's verbose mode.
#[derive(Debug, Default)]
pub struct CollectingDiagnostics {
    records: Mutex<Vec<(DiagLevel, String)>>,
}

impl CollectingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<(DiagLevel, String)> {
        self.records.lock().expect("diagnostics mutex poisoned").clone()
    }
}

impl Diagnostics for CollectingDiagnostics {
    fn emit(&self, level: DiagLevel, message: &str) {
        self.records
            .lock()
            .expect("diagnostics mutex poisoned")
            .push((level, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collecting_diagnostics_preserves_order() {
        let d = CollectingDiagnostics::new();
        d.emit(DiagLevel::Info, "first");
        d.emit(DiagLevel::Warn, "second");
        let records = d.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], (DiagLevel::Info, "first".to_string()));
        assert_eq!(records[1], (DiagLevel::Warn, "second".to_string()));
    }

    #[test]
    fn null_diagnostics_drops_everything() {
        NullDiagnostics.emit(DiagLevel::Error, "ignored");
    }
}
