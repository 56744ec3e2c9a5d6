//! Per-class emission.
//!
//! Assembles one class's output fragment in a fixed order: header
//! (provide/require), constructor, inheritance linkage, statics, field
//! prototype defaults, accessor functions plus their combined property
//! binding, methods, reflection metadata. Emission is pure text production
//! against the read-only symbol table, so classes can be emitted
//! concurrently.

use asjs_common::{Diagnostic, DiagnosticSink, EmitOptions, QName, diagnostic_codes};
use asjs_model::{
    ClassDef, ClassKind, Expr, MemberSig, ModifierFlags, Parameter, Stmt, SuperTarget, SymbolTable,
    Visibility,
};
use indexmap::IndexSet;

use crate::deps::DependencyCollector;
use crate::descriptor::{ClassDescriptor, descriptor_getter_ir};
use crate::expr_to_ir::ExprToIr;
use crate::ir::{IRAccessorBinding, IRNode, IRParam};
use crate::members::{LoweredClass, LoweredField, LoweredMethod, MemberLowerer};
use crate::printer::IRPrinter;
use crate::reflection::{ReflectionInfo, class_info_ir, reflection_info_ir};
use crate::super_dispatch::implicit_constructor_dispatch;

/// One class's finished output plus the metadata the assembler needs.
#[derive(Clone, Debug)]
pub struct ClassFragment {
    pub qname: QName,
    pub code: String,
    pub dependencies: IndexSet<QName>,
}

pub struct ClassEmitter<'a> {
    class: &'a ClassDef,
    symbols: &'a SymbolTable,
    options: &'a EmitOptions,
    /// Numbering base for synthesized component ids, assigned in source
    /// order before the parallel phase.
    id_base: usize,
}

impl<'a> ClassEmitter<'a> {
    pub fn new(
        class: &'a ClassDef,
        symbols: &'a SymbolTable,
        options: &'a EmitOptions,
        id_base: usize,
    ) -> Self {
        Self {
            class,
            symbols,
            options,
            id_base,
        }
    }

    /// Emit the class. Returns `None` when an unrecoverable per-class
    /// diagnostic (ambiguous interface contract without a local resolution)
    /// suppresses the fragment.
    pub fn emit(&self, sink: &mut DiagnosticSink) -> Option<ClassFragment> {
        if !self.check_interface_contracts(sink) {
            return None;
        }

        let dependencies = DependencyCollector::new(self.class, self.symbols).collect(sink);

        let mut nodes: Vec<IRNode> = Vec::new();
        self.emit_header(&dependencies, &mut nodes);

        if self.class.kind == ClassKind::Interface {
            self.emit_interface_body(&mut nodes);
        } else {
            self.emit_class_body(&mut nodes, sink);
        }

        nodes.push(IRNode::BlankLine);
        nodes.push(IRNode::jsdoc(&["Prevent renaming of class. Needed for reflection.", "@export"]));
        nodes.push(class_info_ir(self.class));
        nodes.push(IRNode::BlankLine);
        nodes.push(IRNode::jsdoc(&[
            "Reflection",
            "",
            "@return {Object.<string, Function>}",
        ]));
        nodes.push(reflection_info_ir(
            self.class,
            &ReflectionInfo::build(self.class),
        ));

        Some(ClassFragment {
            qname: self.class.qname.clone(),
            code: IRPrinter::emit_fragment(&nodes, self.options),
            dependencies,
        })
    }

    /// Pairwise interface check: two implemented interfaces declaring the
    /// same member with incompatible signatures is an ambiguous contract.
    /// A declaration on the class itself resolves it (warning); otherwise
    /// the class is suppressed.
    fn check_interface_contracts(&self, sink: &mut DiagnosticSink) -> bool {
        let resolved: Vec<_> = self
            .class
            .interfaces
            .iter()
            .filter_map(|q| self.symbols.resolve(q))
            .collect();

        let mut ok = true;
        for (i, first) in resolved.iter().enumerate() {
            for second in &resolved[i + 1..] {
                for sig in &first.members {
                    let Some(other) = second.member(&sig.name) else {
                        continue;
                    };
                    if compatible(sig, other) {
                        continue;
                    }
                    let locally_declared =
                        self.class.members.iter().any(|m| m.name == sig.name);
                    let message = format!(
                        "class '{}' implements '{}' and '{}', which declare '{}' with incompatible signatures",
                        self.class.qname, first.qname, second.qname, sig.name
                    );
                    if locally_declared {
                        sink.push(Diagnostic::warning(
                            self.class.file.clone(),
                            self.class.span,
                            message,
                            diagnostic_codes::AMBIGUOUS_OVERRIDE,
                        ));
                    } else {
                        sink.push(Diagnostic::error(
                            self.class.file.clone(),
                            self.class.span,
                            message,
                            diagnostic_codes::AMBIGUOUS_OVERRIDE,
                        ));
                        ok = false;
                    }
                }
            }
        }
        ok
    }

    fn emit_header(&self, dependencies: &IndexSet<QName>, nodes: &mut Vec<IRNode>) {
        let rendered = self.class.qname.render(self.options.qname_policy);
        nodes.push(IRNode::jsdoc(&[
            &rendered,
            "",
            "@fileoverview",
            "@suppress {checkTypes|accessControls|const}",
        ]));
        nodes.push(IRNode::ProvideStatement(self.class.qname.clone()));
        if !dependencies.is_empty() {
            nodes.push(IRNode::BlankLine);
            for dep in dependencies {
                nodes.push(IRNode::RequireStatement(dep.clone()));
            }
        }
        nodes.push(IRNode::BlankLine);
    }

    fn emit_interface_body(&self, nodes: &mut Vec<IRNode>) {
        nodes.push(IRNode::jsdoc(&["@interface"]));
        nodes.push(IRNode::ConstructorAssignment {
            class: self.class.qname.clone(),
            function: Box::new(IRNode::func_expr(Vec::new(), Vec::new())),
        });
    }

    fn emit_class_body(&self, nodes: &mut Vec<IRNode>, sink: &mut DiagnosticSink) {
        let lowered = MemberLowerer::new(self.class, self.symbols, self.options).lower(sink);

        let descriptor = ClassDescriptor::new(self.class, self.symbols, self.id_base);
        let descriptor_values = descriptor.flattened(sink).map(<[_]>::to_vec);

        self.emit_constructor(&lowered, descriptor_values.is_some(), nodes, sink);

        if let Some(superclass) = &self.class.superclass {
            nodes.push(IRNode::InheritsStatement {
                class: self.class.qname.clone(),
                superclass: superclass.clone(),
            });
        }

        for static_field in &lowered.statics {
            nodes.push(IRNode::BlankLine);
            let mut lines = vec![visibility_tag(static_field.visibility).to_string()];
            if static_field.is_const {
                lines.push("@const".to_string());
            }
            lines.push(format!("@type {{{}}}", jsdoc_type(&static_field.ty)));
            nodes.push(jsdoc_owned(&lines));
            nodes.push(IRNode::StaticAssignment {
                class: self.class.qname.clone(),
                name: static_field.name.clone(),
                value: Box::new(static_field.value.clone()),
            });
        }
        for method in &lowered.static_methods {
            nodes.push(IRNode::BlankLine);
            nodes.push(jsdoc_owned(&method_jsdoc_lines(method)));
            nodes.push(IRNode::StaticAssignment {
                class: self.class.qname.clone(),
                name: method.name.clone(),
                value: Box::new(method.function.clone()),
            });
        }

        for field in &lowered.fields {
            self.emit_field_default(field, nodes);
        }

        if !lowered.accessors.is_empty() || descriptor_values.is_some() {
            self.emit_accessors(&lowered, descriptor_values.as_deref(), nodes);
        }

        for method in &lowered.methods {
            nodes.push(IRNode::BlankLine);
            nodes.push(jsdoc_owned(&method_jsdoc_lines(method)));
            nodes.push(IRNode::PrototypeAssignment {
                class: self.class.qname.clone(),
                name: method.name.clone(),
                value: Box::new(method.function.clone()),
            });
        }
    }

    fn emit_constructor(
        &self,
        lowered: &LoweredClass,
        has_descriptor: bool,
        nodes: &mut Vec<IRNode>,
        sink: &mut DiagnosticSink,
    ) {
        let mut lines = vec!["@constructor".to_string()];
        if let Some(superclass) = &self.class.superclass {
            lines.push(format!(
                "@extends {{{}}}",
                superclass.render(self.options.qname_policy)
            ));
        }
        for interface in &self.class.interfaces {
            lines.push(format!(
                "@implements {{{}}}",
                interface.render(self.options.qname_policy)
            ));
        }
        nodes.push(jsdoc_owned(&lines));

        let converter = ExprToIr::new(self.class, self.symbols);
        let mut body: Vec<IRNode> = Vec::new();
        let mut params: Vec<IRParam> = Vec::new();
        let mut remaining: &[Stmt] = &[];
        let mut explicit_dispatch = None;

        if let Some(ctor) = &self.class.constructor {
            params = parameter_irs(&ctor.parameters);
            remaining = &ctor.body;
            if let Some(Stmt::Expr(Expr::Super(site))) = ctor.body.first() {
                if site.target == SuperTarget::Constructor {
                    match converter.convert_stmt(&ctor.body[0]) {
                        Ok(node) => {
                            explicit_dispatch = Some(node);
                            remaining = &ctor.body[1..];
                        }
                        Err(diag) => sink.push(diag),
                    }
                }
            }
        }

        // Dispatch first, always, then per-construction field state.
        match explicit_dispatch {
            Some(node) => body.push(node),
            None => {
                // A dispatch site past the first statement still counts as
                // explicit; exactly one dispatch per constructor.
                let dispatches_later = remaining.iter().any(|stmt| {
                    matches!(stmt, Stmt::Expr(Expr::Super(site))
                        if site.target == SuperTarget::Constructor)
                });
                if self.class.superclass.is_some() && !dispatches_later {
                    body.push(IRNode::expr_stmt(implicit_constructor_dispatch(
                        &self.class.qname,
                    )));
                }
            }
        }
        body.extend(lowered.ctor_field_inits.iter().cloned());

        match converter.convert_stmts(remaining) {
            Ok(rest) => body.extend(rest),
            Err(diag) => sink.push(diag),
        }

        if has_descriptor {
            body.push(IRNode::expr_stmt(IRNode::call(
                IRNode::this_prop("attachDescriptor"),
                vec![IRNode::this_prop("descriptor")],
            )));
        }

        nodes.push(IRNode::ConstructorAssignment {
            class: self.class.qname.clone(),
            function: Box::new(IRNode::FunctionExpr {
                name: None,
                parameters: params,
                body,
            }),
        });
    }

    fn emit_field_default(&self, field: &LoweredField, nodes: &mut Vec<IRNode>) {
        nodes.push(IRNode::BlankLine);
        let lines = vec![
            visibility_tag(field.visibility).to_string(),
            format!("@type {{{}}}", jsdoc_type(&field.ty)),
        ];
        nodes.push(jsdoc_owned(&lines));
        nodes.push(IRNode::PrototypeAssignment {
            class: self.class.qname.clone(),
            name: field.name.clone(),
            value: Box::new(field.default.clone()),
        });
    }

    /// Logical accessor functions, their backing fields, and the single
    /// combined property binding covering every accessor this class
    /// declares or overrides.
    fn emit_accessors(
        &self,
        lowered: &LoweredClass,
        descriptor_values: Option<&[crate::descriptor::DescriptorValue]>,
        nodes: &mut Vec<IRNode>,
    ) {
        let mut bindings: Vec<IRAccessorBinding> = Vec::new();

        for accessor in &lowered.accessors {
            if let Some(backing) = &accessor.backing {
                self.emit_field_default(backing, nodes);
            }
            if let Some(getter) = &accessor.getter {
                nodes.push(IRNode::BlankLine);
                nodes.push(IRNode::PrototypeAssignment {
                    class: self.class.qname.clone(),
                    name: format!("get__{}", accessor.name),
                    value: Box::new(getter.clone()),
                });
            }
            if let Some(setter) = &accessor.setter {
                nodes.push(IRNode::BlankLine);
                nodes.push(IRNode::PrototypeAssignment {
                    class: self.class.qname.clone(),
                    name: format!("set__{}", accessor.name),
                    value: Box::new(setter.clone()),
                });
            }
            bindings.push(IRAccessorBinding {
                name: accessor.name.clone(),
                jsdoc: Some(accessor_jsdoc(accessor.visibility, &accessor.ty)),
                getter: accessor
                    .getter
                    .as_ref()
                    .map(|_| self.prototype_ref(&format!("get__{}", accessor.name))),
                setter: accessor
                    .setter
                    .as_ref()
                    .map(|_| self.prototype_ref(&format!("set__{}", accessor.name))),
            });
        }

        if let Some(values) = descriptor_values {
            // Inflation cache slot plus the memoized descriptor accessor.
            self.emit_field_default(
                &LoweredField {
                    name: "dd_".to_string(),
                    ty: QName::parse("Array"),
                    visibility: Visibility::Private,
                    default: IRNode::NullLiteral,
                },
                nodes,
            );
            nodes.push(IRNode::BlankLine);
            nodes.push(IRNode::PrototypeAssignment {
                class: self.class.qname.clone(),
                name: "get__descriptor".to_string(),
                value: Box::new(descriptor_getter_ir(self.class, self.symbols, values)),
            });
            bindings.push(IRAccessorBinding {
                name: "descriptor".to_string(),
                jsdoc: Some(accessor_jsdoc(Visibility::Public, &QName::parse("Array"))),
                getter: Some(self.prototype_ref("get__descriptor")),
                setter: None,
            });
        }

        if !bindings.is_empty() {
            nodes.push(IRNode::BlankLine);
            nodes.push(IRNode::DefinePropertiesBlock {
                class: self.class.qname.clone(),
                entries: bindings,
            });
        }
    }

    fn prototype_ref(&self, name: &str) -> IRNode {
        IRNode::prop(
            IRNode::prop(IRNode::qref(self.class.qname.clone()), "prototype"),
            name,
        )
    }
}

/// Signature compatibility for the pairwise interface check.
fn compatible(a: &MemberSig, b: &MemberSig) -> bool {
    a.kind == b.kind
}

fn parameter_irs(parameters: &[Parameter]) -> Vec<IRParam> {
    parameters
        .iter()
        .map(|p| {
            if p.rest {
                IRParam::rest(p.name.clone())
            } else {
                IRParam::new(p.name.clone())
            }
        })
        .collect()
}

fn jsdoc_owned(lines: &[String]) -> IRNode {
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    IRNode::jsdoc(&refs)
}

fn method_jsdoc_lines(method: &LoweredMethod) -> Vec<String> {
    let mut lines = vec![visibility_tag(method.visibility).to_string()];
    if method.modifiers.contains(ModifierFlags::OVERRIDE) {
        lines.push("@override".to_string());
    }
    for param in &method.parameters {
        let ty = jsdoc_type(&param.ty);
        let rendered = if param.optional {
            format!("@param {{{ty}=}} {}", param.name)
        } else if param.rest {
            format!("@param {{...{ty}}} {}", param.name)
        } else {
            format!("@param {{{ty}}} {}", param.name)
        };
        lines.push(rendered);
    }
    let ret = jsdoc_type(&method.return_type);
    if ret != "void" {
        lines.push(format!("@return {{{ret}}}"));
    }
    lines
}

fn accessor_jsdoc(visibility: Visibility, ty: &QName) -> String {
    format!(
        "/**\n * {}\n * @type {{{}}}\n */",
        visibility_tag(visibility),
        jsdoc_type(ty)
    )
}

const fn visibility_tag(visibility: Visibility) -> &'static str {
    match visibility {
        Visibility::Public => "@export",
        Visibility::Private => "@private",
        Visibility::Protected => "@protected",
        Visibility::Internal => "@package",
    }
}

/// Closure-style type annotation for a declared type.
pub(crate) fn jsdoc_type(ty: &QName) -> String {
    match ty.to_string().as_str() {
        "String" => "string".to_string(),
        "Number" | "int" | "uint" => "number".to_string(),
        "Boolean" => "boolean".to_string(),
        "*" => "*".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use asjs_model::{
        AccessorDef, ClassOrigin, ClassSymbol, Constructor, Member, MemberSigKind, MethodDef,
        SuperCallSite, SymbolTable,
    };

    fn emit(class: &ClassDef, symbols: &SymbolTable) -> (Option<ClassFragment>, DiagnosticSink) {
        let options = EmitOptions::default();
        let mut sink = DiagnosticSink::new();
        let fragment = ClassEmitter::new(class, symbols, &options, 0).emit(&mut sink);
        (fragment, sink)
    }

    fn base_and_button() -> (ClassDef, SymbolTable) {
        let mut symbols = SymbolTable::new();
        let mut base = ClassDef::new(QName::parse("ui.UIBase"), ClassKind::Class);
        base.members.push(Member::method(
            "addedToParent",
            MethodDef {
                parameters: vec![],
                return_type: QName::parse("void"),
                body: vec![],
            },
        ));
        symbols.insert_class(&base);

        let mut class = ClassDef::new(QName::parse("ui.Button"), ClassKind::Class);
        class.superclass = Some(QName::parse("ui.UIBase"));
        class.members.push(Member::field(
            "listeners",
            QName::parse("Array"),
            Some(Expr::ArrayLit(vec![])),
        ));
        class.members.push(Member::accessor(
            "label",
            AccessorDef::synthesized(QName::parse("String")),
        ));
        class.constructor = Some(Constructor {
            parameters: vec![],
            body: vec![Stmt::Expr(Expr::Super(SuperCallSite::constructor(
                vec![],
                asjs_common::Span::default(),
            )))],
        });
        symbols.insert_class(&class);
        (class, symbols)
    }

    #[test]
    fn test_emission_order() {
        let (class, symbols) = base_and_button();
        let (fragment, sink) = emit(&class, &symbols);
        assert!(sink.is_empty(), "{:?}", sink.diagnostics());
        let code = fragment.unwrap().code;

        let positions: Vec<usize> = [
            "asjs.provide('ui.Button');",
            "asjs.require('ui.UIBase');",
            "ui.Button = function() {",
            "asjs.inherits(ui.Button, ui.UIBase);",
            "ui.Button.prototype.listeners = null;",
            "ui.Button.prototype.get__label = function() {",
            "Object.defineProperties(ui.Button.prototype,",
            "ui.Button.prototype.ASJS_CLASS_INFO",
            "ui.Button.prototype.ASJS_REFLECTION_INFO",
        ]
        .iter()
        .map(|needle| code.find(needle).unwrap_or_else(|| panic!("missing: {needle}\n{code}")))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{code}");
    }

    #[test]
    fn test_super_dispatch_precedes_field_inits() {
        let (class, symbols) = base_and_button();
        let (fragment, _) = emit(&class, &symbols);
        let code = fragment.unwrap().code;

        let dispatch = code.find("ui.Button.base(this, 'constructor');").unwrap();
        let init = code.find("this.listeners = [];").unwrap();
        assert!(dispatch < init);
    }

    #[test]
    fn test_implicit_dispatch_synthesized() {
        let (mut class, symbols) = base_and_button();
        class.constructor = None;
        let (fragment, _) = emit(&class, &symbols);
        assert!(
            fragment
                .unwrap()
                .code
                .contains("ui.Button.base(this, 'constructor');")
        );
    }

    #[test]
    fn test_late_super_dispatch_not_doubled() {
        let (mut class, symbols) = base_and_button();
        class.constructor = Some(Constructor {
            parameters: vec![],
            body: vec![
                Stmt::VarDecl {
                    name: "count".to_string(),
                    ty: Some(QName::parse("Number")),
                    init: Some(Expr::Num("0".to_string())),
                },
                Stmt::Expr(Expr::Super(SuperCallSite::constructor(
                    vec![],
                    asjs_common::Span::default(),
                ))),
            ],
        });
        let (fragment, sink) = emit(&class, &symbols);
        assert!(sink.is_empty(), "{:?}", sink.diagnostics());
        let code = fragment.unwrap().code;
        assert_eq!(
            code.matches("ui.Button.base(this, 'constructor');").count(),
            1,
            "{code}"
        );
    }

    #[test]
    fn test_interface_emission() {
        let mut symbols = SymbolTable::new();
        let class = ClassDef::new(QName::parse("ui.IControl"), ClassKind::Interface);
        symbols.insert_class(&class);

        let (fragment, sink) = emit(&class, &symbols);
        assert!(sink.is_empty());
        let code = fragment.unwrap().code;
        assert!(code.contains("@interface"));
        assert!(code.contains("ui.IControl = function() {\n};"));
        assert!(!code.contains("asjs.inherits"));
        assert!(code.contains("kind: 'interface'"));
    }

    #[test]
    fn test_ambiguous_interface_contract_suppresses_class() {
        let mut symbols = SymbolTable::new();
        for (name, ty) in [("ui.IA", "String"), ("ui.IB", "Number")] {
            symbols.insert(ClassSymbol {
                qname: QName::parse(name),
                kind: ClassKind::Interface,
                origin: ClassOrigin::Pipeline,
                superclass: None,
                interfaces: Vec::new(),
                members: vec![MemberSig {
                    name: "value".to_string(),
                    kind: MemberSigKind::Variable {
                        ty: QName::parse(ty),
                    },
                    is_static: false,
                }],
                has_component: false,
            });
        }
        let mut class = ClassDef::new(QName::parse("ui.C"), ClassKind::Class);
        class.interfaces = vec![QName::parse("ui.IA"), QName::parse("ui.IB")];
        symbols.insert_class(&class);

        let (fragment, sink) = emit(&class, &symbols);
        assert!(fragment.is_none());
        assert_eq!(sink.diagnostics()[0].code, diagnostic_codes::AMBIGUOUS_OVERRIDE);

        // A local declaration resolves the ambiguity.
        class
            .members
            .push(Member::field("value", QName::parse("String"), None));
        let (fragment, sink) = emit(&class, &symbols);
        assert!(fragment.is_some());
        assert!(!sink.has_errors());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn test_descriptor_attachment_in_constructor() {
        let (mut class, mut symbols) = base_and_button();
        class.component = Some(asjs_model::ComponentNode::new(QName::parse("ui.UIBase")));
        symbols.insert_class(&class);

        let (fragment, sink) = emit(&class, &symbols);
        assert!(sink.is_empty(), "{:?}", sink.diagnostics());
        let code = fragment.unwrap().code;
        assert!(code.contains("this.attachDescriptor(this.descriptor);"));
        assert!(code.contains("ui.Button.prototype.get__descriptor = function() {"));
        assert!(code.contains("descriptor: {"));
        assert!(code.contains("ui.Button.prototype.dd_ = null;"));
    }
}
