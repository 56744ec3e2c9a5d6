//! Common types and utilities for the asjs cross-compiler.
//!
//! This crate provides foundational types used across all asjs crates:
//! - Structured qualified names (`QName`) and the output rendering policy
//! - Source spans (`Span`) for diagnostics
//! - Diagnostics (`Diagnostic`, `DiagnosticSink`, stable code table)
//! - Per-unit emitter configuration (`EmitOptions`)

// Structured qualified names - never pre-joined strings inside the pipeline
pub mod qname;
pub use qname::{QName, QNamePolicy};

// Span - source location tracking (byte offsets)
pub mod span;
pub use span::Span;

// Diagnostics - accumulated per pass, never fail-fast across classes
pub mod diagnostics;
pub use diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSink, diagnostic_codes};

// Per-compilation-unit emitter configuration
pub mod options;
pub use options::{BackingFieldStyle, EmitOptions};
