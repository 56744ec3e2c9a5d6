//! Model-to-IR conversion.
//!
//! Desugared `Expr`/`Stmt` trees from the front end map 1:1 onto output IR,
//! with a single rewrite: super-call sites are resolved to a dispatch idiom
//! against the symbol table. A failed dispatch resolution aborts conversion
//! of the enclosing body; the caller drops that member and reports the
//! diagnostic, and the rest of the class still emits.

use asjs_common::Diagnostic;
use asjs_model::{ClassDef, Expr, Stmt, SymbolTable};

use crate::ir::{IRNode, IRParam, IRProperty};
use crate::super_dispatch;

pub struct ExprToIr<'a> {
    class: &'a ClassDef,
    symbols: &'a SymbolTable,
}

impl<'a> ExprToIr<'a> {
    pub fn new(class: &'a ClassDef, symbols: &'a SymbolTable) -> Self {
        Self { class, symbols }
    }

    pub fn convert_expr(&self, expr: &Expr) -> Result<IRNode, Diagnostic> {
        Ok(match expr {
            Expr::Null => IRNode::NullLiteral,
            Expr::Undefined => IRNode::Undefined,
            Expr::Bool(b) => IRNode::BooleanLiteral(*b),
            Expr::Num(n) => IRNode::NumericLiteral(n.clone()),
            Expr::Str(s) => IRNode::StringLiteral(s.clone()),
            Expr::Ident(name) => IRNode::Identifier(name.clone()),
            Expr::QualifiedRef(q) => IRNode::QualifiedRef(q.clone()),
            Expr::This => IRNode::This,
            Expr::Prop { object, property } => IRNode::PropertyAccess {
                object: Box::new(self.convert_expr(object)?),
                property: property.clone(),
            },
            Expr::Elem { object, index } => IRNode::ElementAccess {
                object: Box::new(self.convert_expr(object)?),
                index: Box::new(self.convert_expr(index)?),
            },
            Expr::Call { callee, arguments } => IRNode::CallExpr {
                callee: Box::new(self.convert_expr(callee)?),
                arguments: self.convert_exprs(arguments)?,
            },
            Expr::New { callee, arguments } => IRNode::NewExpr {
                callee: Box::new(self.convert_expr(callee)?),
                arguments: self.convert_exprs(arguments)?,
            },
            Expr::Binary {
                left,
                operator,
                right,
            } => IRNode::BinaryExpr {
                left: Box::new(self.convert_expr(left)?),
                operator: operator.clone(),
                right: Box::new(self.convert_expr(right)?),
            },
            Expr::Unary { operator, operand } => IRNode::PrefixUnaryExpr {
                operator: operator.clone(),
                operand: Box::new(self.convert_expr(operand)?),
            },
            Expr::Conditional {
                condition,
                when_true,
                when_false,
            } => IRNode::ConditionalExpr {
                condition: Box::new(self.convert_expr(condition)?),
                when_true: Box::new(self.convert_expr(when_true)?),
                when_false: Box::new(self.convert_expr(when_false)?),
            },
            Expr::Paren(inner) => IRNode::Parenthesized(Box::new(self.convert_expr(inner)?)),
            Expr::ArrayLit(elements) => IRNode::ArrayLiteral(self.convert_exprs(elements)?),
            Expr::ObjectLit(props) => IRNode::ObjectLiteral(
                props
                    .iter()
                    .map(|(k, v)| Ok(IRProperty::init(k.clone(), self.convert_expr(v)?)))
                    .collect::<Result<Vec<_>, Diagnostic>>()?,
            ),
            Expr::Func { parameters, body } => IRNode::FunctionExpr {
                name: None,
                parameters: parameters.iter().map(IRParam::new).collect(),
                body: self.convert_stmts(body)?,
            },
            Expr::Super(site) => {
                let arguments = self.convert_exprs(&site.arguments)?;
                super_dispatch::lower_super_call(self.class, self.symbols, site, arguments)?
            }
        })
    }

    fn convert_exprs(&self, exprs: &[Expr]) -> Result<Vec<IRNode>, Diagnostic> {
        exprs.iter().map(|e| self.convert_expr(e)).collect()
    }

    pub fn convert_stmt(&self, stmt: &Stmt) -> Result<IRNode, Diagnostic> {
        Ok(match stmt {
            Stmt::Expr(e) => IRNode::expr_stmt(self.convert_expr(e)?),
            Stmt::VarDecl { name, init, .. } => IRNode::VarDecl {
                name: name.clone(),
                initializer: init
                    .as_ref()
                    .map(|e| self.convert_expr(e).map(Box::new))
                    .transpose()?,
            },
            Stmt::Return(e) => {
                IRNode::ReturnStatement(e.as_ref().map(|e| self.convert_expr(e).map(Box::new)).transpose()?)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => IRNode::IfStatement {
                condition: Box::new(self.convert_expr(condition)?),
                then_branch: self.convert_stmts(then_branch)?,
                else_branch: else_branch
                    .as_ref()
                    .map(|stmts| self.convert_stmts(stmts))
                    .transpose()?,
            },
        })
    }

    pub fn convert_stmts(&self, stmts: &[Stmt]) -> Result<Vec<IRNode>, Diagnostic> {
        stmts.iter().map(|s| self.convert_stmt(s)).collect()
    }
}
