//! Per-compilation-unit emitter configuration.

use crate::qname::QNamePolicy;

/// Naming convention for synthesized accessor backing fields.
///
/// One choice per compilation unit; it never varies per class.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BackingFieldStyle {
    /// `_name`
    #[default]
    UnderscorePrefix,
    /// `name_`
    UnderscoreSuffix,
}

impl BackingFieldStyle {
    pub fn backing_name(&self, accessor_name: &str) -> String {
        match self {
            Self::UnderscorePrefix => format!("_{accessor_name}"),
            Self::UnderscoreSuffix => format!("{accessor_name}_"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct EmitOptions {
    pub backing_field_style: BackingFieldStyle,
    pub qname_policy: QNamePolicy,
    /// Indentation unit for emitted output.
    pub indent: String,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            backing_field_style: BackingFieldStyle::default(),
            qname_policy: QNamePolicy::default(),
            indent: "  ".to_string(),
        }
    }
}
