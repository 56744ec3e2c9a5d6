//! Emission diagnostics.
//!
//! The emitter never fails fast across classes: recoverable and per-class
//! fatal conditions alike are accumulated in a [`DiagnosticSink`] and
//! reported as a full set at the end of the pass.

use serde::Serialize;

use crate::span::Span;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
pub enum DiagnosticCategory {
    Warning,
    Error,
    Message,
}

/// Stable diagnostic codes. Downstream tooling matches on these.
pub mod diagnostic_codes {
    /// A referenced qualified name is absent from the symbol table.
    pub const UNRESOLVED_DEPENDENCY: u32 = 1101;
    /// Two implemented interfaces declare the same member with
    /// incompatible signatures.
    pub const AMBIGUOUS_OVERRIDE: u32 = 1102;
    /// A super-dispatch call site references a member absent from the
    /// resolved superclass chain.
    pub const MISSING_SUPER_MEMBER: u32 = 1103;
    /// A declarative node references an unresolvable class or a property
    /// absent from its target's members.
    pub const MALFORMED_COMPONENT_TREE: u32 = 1104;
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub category: DiagnosticCategory,
    pub code: u32,
    pub file: String,
    pub span: Span,
    pub message_text: String,
}

impl Diagnostic {
    pub fn error(file: impl Into<String>, span: Span, message: impl Into<String>, code: u32) -> Self {
        Self {
            category: DiagnosticCategory::Error,
            code,
            file: file.into(),
            span,
            message_text: message.into(),
        }
    }

    pub fn warning(
        file: impl Into<String>,
        span: Span,
        message: impl Into<String>,
        code: u32,
    ) -> Self {
        Self {
            category: DiagnosticCategory::Warning,
            code,
            file: file.into(),
            span,
            message_text: message.into(),
        }
    }
}

/// Ordered accumulator for a pass's diagnostics.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn extend(&mut self, other: Self) {
        self.diagnostics.extend(other.diagnostics);
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.category == DiagnosticCategory::Error)
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
