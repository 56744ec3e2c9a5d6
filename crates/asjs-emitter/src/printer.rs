//! IR printer.
//!
//! Walks [`IRNode`] trees and emits output text. All formatting decisions
//! (indentation, quoting, qualified-name flattening) live here; lowering
//! stages never concatenate output strings themselves.

use std::fmt::Write as _;

use asjs_common::{EmitOptions, QName, QNamePolicy};

use crate::ir::{IRAccessorBinding, IRNode, IRParam, IRProperty};

pub struct IRPrinter<'a> {
    output: String,
    indent_level: usize,
    indent_str: &'a str,
    policy: QNamePolicy,
}

impl<'a> IRPrinter<'a> {
    pub fn new(options: &'a EmitOptions) -> Self {
        Self {
            output: String::new(),
            indent_level: 0,
            indent_str: &options.indent,
            policy: options.qname_policy,
        }
    }

    /// Print a single node to a string with the given options.
    pub fn emit_to_string(node: &IRNode, options: &'a EmitOptions) -> String {
        let mut printer = Self::new(options);
        printer.emit_node(node);
        printer.finish()
    }

    /// Print a top-level fragment: each node on its own line.
    pub fn emit_fragment(nodes: &[IRNode], options: &'a EmitOptions) -> String {
        let mut printer = Self::new(options);
        for node in nodes {
            if matches!(node, IRNode::BlankLine) {
                printer.write_line();
                continue;
            }
            printer.emit_node(node);
            printer.write_line();
        }
        printer.finish()
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn render_qname(&self, q: &QName) -> String {
        q.render(self.policy)
    }

    pub fn emit_node(&mut self, node: &IRNode) {
        match node {
            IRNode::NumericLiteral(n) => self.write(n),
            IRNode::StringLiteral(s) => {
                self.write("'");
                self.write_escaped(s);
                self.write("'");
            }
            IRNode::BooleanLiteral(b) => self.write(if *b { "true" } else { "false" }),
            IRNode::NullLiteral => self.write("null"),
            IRNode::Undefined => self.write("undefined"),
            IRNode::Identifier(name) => self.write(name),
            IRNode::QualifiedRef(q) => {
                let rendered = self.render_qname(q);
                self.write(&rendered);
            }
            IRNode::This => self.write("this"),

            IRNode::BinaryExpr {
                left,
                operator,
                right,
            } => {
                self.emit_node(left);
                self.write(" ");
                self.write(operator);
                self.write(" ");
                self.emit_node(right);
            }
            IRNode::PrefixUnaryExpr { operator, operand } => {
                self.write(operator);
                self.emit_node(operand);
            }
            IRNode::CallExpr { callee, arguments } => {
                self.emit_node(callee);
                self.write("(");
                self.emit_comma_separated(arguments);
                self.write(")");
            }
            IRNode::NewExpr { callee, arguments } => {
                self.write("new ");
                self.emit_node(callee);
                self.write("(");
                self.emit_comma_separated(arguments);
                self.write(")");
            }
            IRNode::PropertyAccess { object, property } => {
                self.emit_node(object);
                self.write(".");
                self.write(property);
            }
            IRNode::ElementAccess { object, index } => {
                self.emit_node(object);
                self.write("[");
                self.emit_node(index);
                self.write("]");
            }
            IRNode::ConditionalExpr {
                condition,
                when_true,
                when_false,
            } => {
                self.emit_node(condition);
                self.write(" ? ");
                self.emit_node(when_true);
                self.write(" : ");
                self.emit_node(when_false);
            }
            IRNode::Parenthesized(inner) => {
                self.write("(");
                self.emit_node(inner);
                self.write(")");
            }
            IRNode::ArrayLiteral(elements) => {
                self.write("[");
                self.emit_comma_separated(elements);
                self.write("]");
            }
            IRNode::ArrayLiteralMultiline(elements) => {
                self.emit_array_multiline(elements);
            }
            IRNode::ObjectLiteral(properties) => {
                self.emit_object_single_line(properties);
            }
            IRNode::ObjectLiteralMultiline(properties) => {
                self.emit_object_multiline(properties);
            }
            IRNode::FunctionExpr {
                name,
                parameters,
                body,
            } => {
                self.write("function");
                if let Some(name) = name {
                    self.write(" ");
                    self.write(name);
                }
                self.write("(");
                self.emit_parameters(parameters);
                self.write(") ");
                self.emit_statement_block(body);
            }

            IRNode::VarDecl { name, initializer } => {
                self.write("var ");
                self.write(name);
                if let Some(init) = initializer {
                    self.write(" = ");
                    self.emit_node(init);
                }
                self.write(";");
            }
            IRNode::ExpressionStatement(expr) => {
                self.emit_node(expr);
                self.write(";");
            }
            IRNode::ReturnStatement(expr) => {
                self.write("return");
                if let Some(expr) = expr {
                    self.write(" ");
                    self.emit_node(expr);
                }
                self.write(";");
            }
            IRNode::IfStatement {
                condition,
                then_branch,
                else_branch,
            } => {
                self.write("if (");
                self.emit_node(condition);
                self.write(") ");
                self.emit_statement_block(then_branch);
                if let Some(else_branch) = else_branch {
                    self.write(" else ");
                    self.emit_statement_block(else_branch);
                }
            }
            IRNode::Comment(text) => {
                self.emit_multiline_comment(text);
            }
            IRNode::BlankLine => {}

            IRNode::ProvideStatement(q) => {
                let rendered = self.render_qname(q);
                self.write("asjs.provide('");
                self.write(&rendered);
                self.write("');");
            }
            IRNode::RequireStatement(q) => {
                let rendered = self.render_qname(q);
                self.write("asjs.require('");
                self.write(&rendered);
                self.write("');");
            }
            IRNode::ConstructorAssignment { class, function } => {
                let rendered = self.render_qname(class);
                self.write(&rendered);
                self.write(" = ");
                self.emit_node(function);
                self.write(";");
            }
            IRNode::InheritsStatement { class, superclass } => {
                let class = self.render_qname(class);
                let superclass = self.render_qname(superclass);
                self.write("asjs.inherits(");
                self.write(&class);
                self.write(", ");
                self.write(&superclass);
                self.write(");");
            }
            IRNode::PrototypeAssignment { class, name, value } => {
                let class = self.render_qname(class);
                self.write(&class);
                self.write(".prototype.");
                self.write(name);
                self.write(" = ");
                self.emit_node(value);
                self.write(";");
            }
            IRNode::StaticAssignment { class, name, value } => {
                let class = self.render_qname(class);
                self.write(&class);
                self.write(".");
                self.write(name);
                self.write(" = ");
                self.emit_node(value);
                self.write(";");
            }
            IRNode::DefinePropertiesBlock { class, entries } => {
                self.emit_define_properties(class, entries);
            }
        }
    }

    fn emit_define_properties(&mut self, class: &QName, entries: &[IRAccessorBinding]) {
        let class = self.render_qname(class);
        self.write("Object.defineProperties(");
        self.write(&class);
        self.write(".prototype, /** @lends {");
        self.write(&class);
        self.write(".prototype} */ {");
        self.write_line();
        self.increase_indent();
        for (i, entry) in entries.iter().enumerate() {
            if let Some(jsdoc) = &entry.jsdoc {
                self.write_indent();
                self.emit_multiline_comment(jsdoc);
                self.write_line();
            }
            self.write_indent();
            self.write(&entry.name);
            self.write(": {");
            self.write_line();
            self.increase_indent();
            let mut first = true;
            if let Some(getter) = &entry.getter {
                self.write_indent();
                self.write("get: ");
                self.emit_node(getter);
                first = false;
            }
            if let Some(setter) = &entry.setter {
                if !first {
                    self.write(",");
                    self.write_line();
                }
                self.write_indent();
                self.write("set: ");
                self.emit_node(setter);
            }
            self.write_line();
            self.decrease_indent();
            self.write_indent();
            self.write("}");
            if i < entries.len() - 1 {
                self.write(",");
            }
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("});");
    }

    fn emit_statement_block(&mut self, body: &[IRNode]) {
        if body.is_empty() {
            self.write("{");
            self.write_line();
            self.write_indent();
            self.write("}");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        for stmt in body {
            if matches!(stmt, IRNode::BlankLine) {
                self.write_line();
                continue;
            }
            self.write_indent();
            self.emit_node(stmt);
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn emit_array_multiline(&mut self, elements: &[IRNode]) {
        if elements.is_empty() {
            self.write("[]");
            return;
        }
        self.write("[");
        self.write_line();
        self.increase_indent();
        for (i, element) in elements.iter().enumerate() {
            self.write_indent();
            self.emit_node(element);
            if i < elements.len() - 1 {
                self.write(",");
            }
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("]");
    }

    fn emit_object_single_line(&mut self, properties: &[IRProperty]) {
        if properties.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{ ");
        for (i, prop) in properties.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_property(prop);
        }
        self.write(" }");
    }

    pub(crate) fn emit_object_multiline(&mut self, properties: &[IRProperty]) {
        if properties.is_empty() {
            self.write("{}");
            return;
        }
        self.write("{");
        self.write_line();
        self.increase_indent();
        for (i, prop) in properties.iter().enumerate() {
            self.write_indent();
            self.emit_property(prop);
            if i < properties.len() - 1 {
                self.write(",");
            }
            self.write_line();
        }
        self.decrease_indent();
        self.write_indent();
        self.write("}");
    }

    fn emit_property(&mut self, prop: &IRProperty) {
        if prop.quoted {
            self.write("'");
            self.write_escaped(&prop.key);
            self.write("'");
        } else {
            self.write(&prop.key);
        }
        self.write(": ");
        self.emit_node(&prop.value);
    }

    fn emit_parameters(&mut self, params: &[IRParam]) {
        for (i, param) in params.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            if param.rest {
                self.write("...");
            }
            self.write(&param.name);
        }
    }

    fn emit_comma_separated(&mut self, nodes: &[IRNode]) {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                self.write(", ");
            }
            self.emit_node(node);
        }
    }

    /// Emit a multiline comment with each line re-indented to the current
    /// level.
    fn emit_multiline_comment(&mut self, comment: &str) {
        let mut first = true;
        for line in comment.split('\n') {
            if !first {
                self.write_line();
                self.write_indent();
            }
            let trimmed = line.trim_start();
            if !first && (trimmed.starts_with('*') || trimmed.starts_with('/')) {
                self.write(" ");
            }
            self.write(trimmed.trim_end());
            first = false;
        }
    }

    fn write(&mut self, s: &str) {
        self.output.push_str(s);
    }

    fn write_escaped(&mut self, s: &str) {
        for c in s.chars() {
            match c {
                '\'' => self.output.push_str("\\'"),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\t' => self.output.push_str("\\t"),
                c if (c as u32) < 0x20 || c == '\x7F' => {
                    write!(self.output, "\\u{:04X}", c as u32).unwrap();
                }
                _ => self.output.push(c),
            }
        }
    }

    fn write_line(&mut self) {
        self.output.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push_str(self.indent_str);
        }
    }

    fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    fn decrease_indent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::IRNode;

    fn print(node: &IRNode) -> String {
        IRPrinter::emit_to_string(node, &EmitOptions::default())
    }

    #[test]
    fn test_emit_literals() {
        assert_eq!(print(&IRNode::number("42")), "42");
        assert_eq!(print(&IRNode::string("hello")), "'hello'");
        assert_eq!(print(&IRNode::BooleanLiteral(true)), "true");
        assert_eq!(print(&IRNode::NullLiteral), "null");
        assert_eq!(print(&IRNode::Undefined), "undefined");
    }

    #[test]
    fn test_emit_string_escaping() {
        assert_eq!(print(&IRNode::string("Let's go")), "'Let\\'s go'");
        assert_eq!(print(&IRNode::string("a\nb")), "'a\\nb'");
    }

    #[test]
    fn test_emit_qualified_ref_policies() {
        let q = IRNode::qref(QName::parse("org.example.Button"));
        assert_eq!(print(&q), "org.example.Button");

        let options = EmitOptions {
            qname_policy: QNamePolicy::UnderscoreJoined,
            ..EmitOptions::default()
        };
        assert_eq!(
            IRPrinter::emit_to_string(&q, &options),
            "org_example_Button"
        );
    }

    #[test]
    fn test_emit_call_and_prop() {
        let call = IRNode::call(
            IRNode::prop(IRNode::this(), "dispatchEvent"),
            vec![IRNode::string("change")],
        );
        assert_eq!(print(&call), "this.dispatchEvent('change')");
    }

    #[test]
    fn test_emit_prototype_assignment() {
        let node = IRNode::PrototypeAssignment {
            class: QName::parse("org.example.Button"),
            name: "count".to_string(),
            value: Box::new(IRNode::number("0")),
        };
        assert_eq!(print(&node), "org.example.Button.prototype.count = 0;");
    }

    #[test]
    fn test_emit_inherits() {
        let node = IRNode::InheritsStatement {
            class: QName::parse("a.B"),
            superclass: QName::parse("a.A"),
        };
        assert_eq!(print(&node), "asjs.inherits(a.B, a.A);");
    }

    #[test]
    fn test_emit_function_expr() {
        let func = IRNode::func_expr(
            vec![IRParam::new("value")],
            vec![IRNode::ret(Some(IRNode::id("value")))],
        );
        assert_eq!(print(&func), "function(value) {\n  return value;\n}");
    }

    #[test]
    fn test_emit_rest_parameter() {
        let func = IRNode::func_expr(vec![IRParam::new("a"), IRParam::rest("rest")], vec![]);
        assert!(print(&func).starts_with("function(a, ...rest)"));
    }

    #[test]
    fn test_emit_if_statement() {
        let node = IRNode::IfStatement {
            condition: Box::new(IRNode::binary(IRNode::id("a"), "!=", IRNode::id("b"))),
            then_branch: vec![IRNode::expr_stmt(IRNode::assign(
                IRNode::id("a"),
                IRNode::id("b"),
            ))],
            else_branch: None,
        };
        assert_eq!(print(&node), "if (a != b) {\n  a = b;\n}");
    }

    #[test]
    fn test_emit_multiline_array() {
        let node = IRNode::ArrayLiteralMultiline(vec![IRNode::number("1"), IRNode::number("2")]);
        assert_eq!(print(&node), "[\n  1,\n  2\n]");
    }

    #[test]
    fn test_emit_define_properties() {
        let node = IRNode::DefinePropertiesBlock {
            class: QName::parse("a.B"),
            entries: vec![IRAccessorBinding {
                name: "label".to_string(),
                jsdoc: None,
                getter: Some(IRNode::prop(
                    IRNode::prop(IRNode::qref(QName::parse("a.B")), "prototype"),
                    "get__label",
                )),
                setter: Some(IRNode::prop(
                    IRNode::prop(IRNode::qref(QName::parse("a.B")), "prototype"),
                    "set__label",
                )),
            }],
        };
        let out = print(&node);
        assert!(out.starts_with("Object.defineProperties(a.B.prototype, /** @lends {a.B.prototype} */ {"));
        assert!(out.contains("get: a.B.prototype.get__label,"));
        assert!(out.contains("set: a.B.prototype.set__label"));
        assert!(out.ends_with("});"));
    }
}
