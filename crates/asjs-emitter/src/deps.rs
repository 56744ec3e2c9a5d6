//! Dependency collection.
//!
//! Walks a class's resolved declaration and records every external
//! qualified name the first time it is seen. Insertion order is an
//! emitted-output invariant: downstream consumers diff require lists, so
//! the walk order is fixed (superclass, interfaces, members in declaration
//! order, constructor, component tree pre-order) and deterministic across
//! recompiles.

use asjs_common::{Diagnostic, DiagnosticSink, QName, diagnostic_codes};
use asjs_model::{
    ClassDef, ComponentNode, ComponentValue, Expr, MemberKind, Stmt, SymbolTable,
};
use indexmap::IndexSet;
use rustc_hash::FxHashSet;

pub struct DependencyCollector<'a> {
    class: &'a ClassDef,
    symbols: &'a SymbolTable,
    deps: IndexSet<QName>,
    /// Names already reported unresolved, so each is diagnosed once.
    unresolved: FxHashSet<QName>,
}

impl<'a> DependencyCollector<'a> {
    pub fn new(class: &'a ClassDef, symbols: &'a SymbolTable) -> Self {
        Self {
            class,
            symbols,
            deps: IndexSet::new(),
            unresolved: FxHashSet::default(),
        }
    }

    /// Walk the whole declaration and return the ordered dependency set.
    pub fn collect(mut self, sink: &mut DiagnosticSink) -> IndexSet<QName> {
        if let Some(superclass) = &self.class.superclass {
            self.record(superclass, sink);
        }
        for interface in &self.class.interfaces {
            self.record(interface, sink);
        }
        for member in &self.class.members {
            match &member.kind {
                MemberKind::Field { ty, initializer }
                | MemberKind::StaticField { ty, initializer } => {
                    self.record(ty, sink);
                    if let Some(init) = initializer {
                        self.walk_expr(init, sink);
                    }
                }
                MemberKind::Constant { ty, initializer } => {
                    self.record(ty, sink);
                    self.walk_expr(initializer, sink);
                }
                MemberKind::Method(def) | MemberKind::StaticMethod(def) => {
                    for param in &def.parameters {
                        self.record(&param.ty, sink);
                    }
                    self.record(&def.return_type, sink);
                    self.walk_stmts(&def.body, sink);
                }
                MemberKind::Accessor(def) => {
                    self.record(&def.ty, sink);
                    if let Some(body) = &def.getter_body {
                        self.walk_stmts(body, sink);
                    }
                    if let Some(body) = &def.setter_body {
                        self.walk_stmts(body, sink);
                    }
                    self.walk_stmts(&def.setter_side_effects, sink);
                    if let Some(default) = &def.default_value {
                        self.walk_expr(default, sink);
                    }
                }
            }
        }
        if let Some(ctor) = &self.class.constructor {
            for param in &ctor.parameters {
                self.record(&param.ty, sink);
            }
            self.walk_stmts(&ctor.body, sink);
        }
        if let Some(component) = &self.class.component {
            self.walk_component(component, sink);
        }
        self.deps
    }

    /// Record one qualified name. Self-references and built-ins are
    /// excluded; unresolved names are diagnosed once and excluded so the
    /// rest of the class still emits.
    fn record(&mut self, qname: &QName, sink: &mut DiagnosticSink) {
        if qname == &self.class.qname || qname.is_builtin() {
            return;
        }
        if !self.symbols.contains(qname) {
            if self.unresolved.insert(qname.clone()) {
                sink.push(Diagnostic::error(
                    self.class.file.clone(),
                    self.class.span,
                    format!(
                        "unresolved reference '{qname}' in class '{}'",
                        self.class.qname
                    ),
                    diagnostic_codes::UNRESOLVED_DEPENDENCY,
                ));
            }
            return;
        }
        self.deps.insert(qname.clone());
    }

    fn walk_stmts(&mut self, stmts: &[Stmt], sink: &mut DiagnosticSink) {
        for stmt in stmts {
            match stmt {
                Stmt::Expr(e) => self.walk_expr(e, sink),
                Stmt::VarDecl { ty, init, .. } => {
                    if let Some(ty) = ty {
                        self.record(ty, sink);
                    }
                    if let Some(init) = init {
                        self.walk_expr(init, sink);
                    }
                }
                Stmt::Return(e) => {
                    if let Some(e) = e {
                        self.walk_expr(e, sink);
                    }
                }
                Stmt::If {
                    condition,
                    then_branch,
                    else_branch,
                } => {
                    self.walk_expr(condition, sink);
                    self.walk_stmts(then_branch, sink);
                    if let Some(else_branch) = else_branch {
                        self.walk_stmts(else_branch, sink);
                    }
                }
            }
        }
    }

    fn walk_expr(&mut self, expr: &Expr, sink: &mut DiagnosticSink) {
        match expr {
            Expr::QualifiedRef(q) => self.record(q, sink),
            Expr::Prop { object, .. } => self.walk_expr(object, sink),
            Expr::Elem { object, index } => {
                self.walk_expr(object, sink);
                self.walk_expr(index, sink);
            }
            Expr::Call { callee, arguments } | Expr::New { callee, arguments } => {
                self.walk_expr(callee, sink);
                for arg in arguments {
                    self.walk_expr(arg, sink);
                }
            }
            Expr::Binary { left, right, .. } => {
                self.walk_expr(left, sink);
                self.walk_expr(right, sink);
            }
            Expr::Unary { operand, .. } => self.walk_expr(operand, sink),
            Expr::Conditional {
                condition,
                when_true,
                when_false,
            } => {
                self.walk_expr(condition, sink);
                self.walk_expr(when_true, sink);
                self.walk_expr(when_false, sink);
            }
            Expr::Paren(inner) => self.walk_expr(inner, sink),
            Expr::ArrayLit(elements) => {
                for e in elements {
                    self.walk_expr(e, sink);
                }
            }
            Expr::ObjectLit(props) => {
                for (_, v) in props {
                    self.walk_expr(v, sink);
                }
            }
            Expr::Func { body, .. } => self.walk_stmts(body, sink),
            Expr::Super(site) => {
                for arg in &site.arguments {
                    self.walk_expr(arg, sink);
                }
            }
            Expr::Null
            | Expr::Undefined
            | Expr::Bool(_)
            | Expr::Num(_)
            | Expr::Str(_)
            | Expr::Ident(_)
            | Expr::This => {}
        }
    }

    fn walk_component(&mut self, node: &ComponentNode, sink: &mut DiagnosticSink) {
        self.record(&node.class_ref, sink);
        for prop in &node.properties {
            match &prop.value {
                ComponentValue::Literal(e) => self.walk_expr(e, sink),
                ComponentValue::Node(nested) => self.walk_component(nested, sink),
            }
        }
        for child in &node.children {
            self.walk_component(child, sink);
        }
    }
}
