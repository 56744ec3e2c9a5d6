//! Unit assembly.
//!
//! Fans per-class emission out over a rayon pool (the symbol table is
//! read-only for the whole pass) and joins the fragments back in
//! source-declaration order, regardless of completion order. Synthesized
//! component-id numbering bases are assigned sequentially before the
//! parallel phase, so output is byte-identical across runs and thread
//! counts. Per-class diagnostics accumulate into the unit sink in class
//! order; emission never fails fast across classes.

use asjs_common::{DiagnosticSink, EmitOptions};
use asjs_model::{ClassDef, SymbolTable};
use rayon::prelude::*;
use tracing::{debug, info_span};

use crate::class_emitter::{ClassEmitter, ClassFragment};
use crate::descriptor::count_synthesized_ids;

/// Assembled output for one compilation unit.
#[derive(Clone, Debug)]
pub struct UnitOutput {
    /// Fragments in source-declaration order, separated by one blank line.
    pub code: String,
    pub fragments: Vec<ClassFragment>,
}

pub struct OutputAssembler<'a> {
    symbols: &'a SymbolTable,
    options: &'a EmitOptions,
}

impl<'a> OutputAssembler<'a> {
    pub fn new(symbols: &'a SymbolTable, options: &'a EmitOptions) -> Self {
        Self { symbols, options }
    }

    pub fn emit_unit(&self, classes: &[ClassDef], sink: &mut DiagnosticSink) -> UnitOutput {
        let _span = info_span!("emit_unit", classes = classes.len()).entered();

        // Source-order numbering bases, fixed before the parallel phase.
        let mut id_bases = Vec::with_capacity(classes.len());
        let mut next_id = 0usize;
        for class in classes {
            id_bases.push(next_id);
            if let Some(component) = &class.component {
                next_id += count_synthesized_ids(component);
            }
        }

        let results: Vec<(Option<ClassFragment>, DiagnosticSink)> = classes
            .par_iter()
            .zip(id_bases.par_iter())
            .map(|(class, id_base)| {
                let mut class_sink = DiagnosticSink::new();
                let fragment = ClassEmitter::new(class, self.symbols, self.options, *id_base)
                    .emit(&mut class_sink);
                debug!(class = %class.qname, diagnostics = class_sink.len(), "emitted class");
                (fragment, class_sink)
            })
            .collect();

        let mut fragments = Vec::with_capacity(results.len());
        for (fragment, class_sink) in results {
            sink.extend(class_sink);
            if let Some(fragment) = fragment {
                fragments.push(fragment);
            }
        }

        let code = fragments
            .iter()
            .map(|f| f.code.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        UnitOutput { code, fragments }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asjs_common::QName;
    use asjs_model::{ClassKind, ComponentNode, Member};

    fn unit() -> (Vec<ClassDef>, SymbolTable) {
        let mut symbols = SymbolTable::new();
        let mut classes = Vec::new();

        let base = ClassDef::new(QName::parse("ui.UIBase"), ClassKind::Class);
        symbols.insert_class(&base);
        classes.push(base);

        for name in ["app.First", "app.Second", "app.Third"] {
            let mut class = ClassDef::new(QName::parse(name), ClassKind::Class);
            class.superclass = Some(QName::parse("ui.UIBase"));
            class
                .members
                .push(Member::field("label", QName::parse("String"), None));
            class.component = Some(ComponentNode::new(QName::parse("ui.UIBase")));
            symbols.insert_class(&class);
            classes.push(class);
        }
        (classes, symbols)
    }

    #[test]
    fn test_fragments_in_source_order() {
        let (classes, symbols) = unit();
        let options = EmitOptions::default();
        let mut sink = DiagnosticSink::new();
        let output = OutputAssembler::new(&symbols, &options).emit_unit(&classes, &mut sink);

        assert!(sink.is_empty(), "{:?}", sink.diagnostics());
        let names: Vec<String> = output.fragments.iter().map(|f| f.qname.to_string()).collect();
        assert_eq!(names, vec!["ui.UIBase", "app.First", "app.Second", "app.Third"]);

        let first = output.code.find("asjs.provide('app.First');").unwrap();
        let second = output.code.find("asjs.provide('app.Second');").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_reemission_is_byte_identical() {
        let (classes, symbols) = unit();
        let options = EmitOptions::default();
        let assembler = OutputAssembler::new(&symbols, &options);

        let mut sink = DiagnosticSink::new();
        let first = assembler.emit_unit(&classes, &mut sink);
        let second = assembler.emit_unit(&classes, &mut sink);
        assert_eq!(first.code, second.code);
    }

    #[test]
    fn test_synthesized_ids_scoped_per_unit() {
        let (classes, symbols) = unit();
        let options = EmitOptions::default();
        let mut sink = DiagnosticSink::new();
        let output = OutputAssembler::new(&symbols, &options).emit_unit(&classes, &mut sink);

        // One id-less root node per component class, numbered across the unit.
        assert!(output.fragments[1].code.contains("'$ID_0'"));
        assert!(output.fragments[2].code.contains("'$ID_1'"));
        assert!(output.fragments[3].code.contains("'$ID_2'"));
    }

    #[test]
    fn test_diagnostics_accumulate_across_classes() {
        let (mut classes, symbols) = unit();
        // Two classes referencing unknown types; both must be reported.
        classes[1]
            .members
            .push(Member::field("a", QName::parse("missing.A"), None));
        classes[2]
            .members
            .push(Member::field("b", QName::parse("missing.B"), None));

        let options = EmitOptions::default();
        let mut sink = DiagnosticSink::new();
        let output = OutputAssembler::new(&symbols, &options).emit_unit(&classes, &mut sink);

        assert_eq!(sink.len(), 2);
        // Degraded classes still emit.
        assert_eq!(output.fragments.len(), 4);
    }
}
