//! Diagnostic reporting
//!
//! Skipped documents are never fatal. Each one produces a [`Diagnostic`] that
//! is handed to a [`DiagnosticSink`] chosen by the caller.

use serde::Serialize;
use std::cell::RefCell;
use std::fmt;

/// One skipped document and the reason it was skipped
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Name of the offending document
    pub document: String,
    /// Human-readable reason
    pub reason: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skipping {}: {}", self.document, self.reason)
    }
}

/// Receiver for pipeline diagnostics
pub trait DiagnosticSink {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Emits each diagnostic as a `tracing` warning
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        tracing::warn!(
            document = %diagnostic.document,
            reason = %diagnostic.reason,
            "skipping document"
        );
    }
}

/// Keeps diagnostics in memory, in the order they were reported
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.borrow().is_empty()
    }

    pub fn into_inner(self) -> Vec<Diagnostic> {
        self.diagnostics.into_inner()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        assert!(sink.is_empty());

        for name in ["a.json", "b.json"] {
            sink.report(&Diagnostic {
                document: name.to_string(),
                reason: "missing data".to_string(),
            });
        }

        assert_eq!(sink.len(), 2);
        let collected = sink.into_inner();
        assert_eq!(collected[0].document, "a.json");
        assert_eq!(collected[1].to_string(), "Skipping b.json: missing data");
    }
}
