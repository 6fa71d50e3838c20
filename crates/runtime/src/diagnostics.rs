/// One recoverable-condition record.
///
/// `kind` is a stable short tag ("geometry", "navigation", ...); the message
/// is free text for operators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: &'static str,
    pub message: String,
}

/// Ordered record of the recoverable conditions a widget ran into.
///
/// Skipped records, navigation resets and similar degradations land here so
/// hosts and tests can inspect them; nothing in the bus is user-facing.
#[derive(Debug, Default)]
pub struct DiagnosticsBus {
    events: Vec<Diagnostic>,
}

impl DiagnosticsBus {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, kind: &'static str, message: impl Into<String>) {
        self.events.push(Diagnostic {
            kind,
            message: message.into(),
        });
    }

    pub fn events(&self) -> &[Diagnostic] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.events)
    }
}
