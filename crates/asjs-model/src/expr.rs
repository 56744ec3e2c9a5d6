//! Desugared expression and statement trees.
//!
//! Upstream stages lower source-language sugar (string concatenation, casts,
//! closures, event-dispatch side effects) into these target-evaluable trees.
//! The only construct the emitter rewrites is [`Expr::Super`]: super-dispatch
//! call sites stay explicit so the dispatch style can be resolved against the
//! symbol table at emission time.

use asjs_common::{QName, Span};

/// A desugared, target-evaluable expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// `null`
    Null,
    /// `undefined`
    Undefined,
    Bool(bool),
    /// Numeric literal, kept as written for byte-stable output.
    Num(String),
    Str(String),
    /// Local identifier: parameter or local variable.
    Ident(String),
    /// Resolved reference to a top-level class/interface/function.
    QualifiedRef(QName),
    This,
    /// `object.property`
    Prop { object: Box<Expr>, property: String },
    /// `object[index]`
    Elem { object: Box<Expr>, index: Box<Expr> },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    New {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
    },
    Binary {
        left: Box<Expr>,
        operator: String,
        right: Box<Expr>,
    },
    Unary {
        operator: String,
        operand: Box<Expr>,
    },
    Conditional {
        condition: Box<Expr>,
        when_true: Box<Expr>,
        when_false: Box<Expr>,
    },
    Paren(Box<Expr>),
    ArrayLit(Vec<Expr>),
    ObjectLit(Vec<(String, Expr)>),
    /// Closure, already lowered by the front end.
    Func {
        parameters: Vec<String>,
        body: Vec<Stmt>,
    },
    /// Super-dispatch call site; rewritten by the emitter per dispatch style.
    Super(SuperCallSite),
}

impl Expr {
    pub fn prop(object: Expr, property: impl Into<String>) -> Self {
        Self::Prop {
            object: Box::new(object),
            property: property.into(),
        }
    }

    pub fn call(callee: Expr, arguments: Vec<Expr>) -> Self {
        Self::Call {
            callee: Box::new(callee),
            arguments,
        }
    }

    pub fn binary(left: Expr, operator: impl Into<String>, right: Expr) -> Self {
        Self::Binary {
            left: Box::new(left),
            operator: operator.into(),
            right: Box::new(right),
        }
    }

    pub fn num(n: impl Into<String>) -> Self {
        Self::Num(n.into())
    }

    pub fn str(s: impl Into<String>) -> Self {
        Self::Str(s.into())
    }

    /// A default value that allocates fresh mutable state per evaluation.
    /// Such defaults must not live on the prototype, or instances would
    /// share one allocation.
    pub fn is_fresh_mutable(&self) -> bool {
        matches!(self, Self::ArrayLit(_) | Self::ObjectLit(_) | Self::New { .. })
    }

    /// Statically-known literal, foldable into a prototype default or a
    /// descriptor entry without construction-time evaluation.
    pub fn is_static_literal(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Undefined | Self::Bool(_) | Self::Num(_) | Self::Str(_)
        )
    }
}

/// A desugared statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    VarDecl {
        name: String,
        /// Declared type, for output annotations. `None` for untyped locals.
        ty: Option<QName>,
        init: Option<Expr>,
    },
    Return(Option<Expr>),
    If {
        condition: Expr,
        then_branch: Vec<Stmt>,
        else_branch: Option<Vec<Stmt>>,
    },
}

/// Which inherited thing a super-call site targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SuperTarget {
    Constructor,
    Method(String),
    Getter(String),
    Setter(String),
}

/// A call to a superclass constructor, method, or accessor.
///
/// The dispatch style is not stored here: it is resolved per site during
/// emission from the superclass's origin in the symbol table.
#[derive(Clone, Debug, PartialEq)]
pub struct SuperCallSite {
    pub target: SuperTarget,
    pub arguments: Vec<Expr>,
    pub span: Span,
}

impl SuperCallSite {
    pub fn constructor(arguments: Vec<Expr>, span: Span) -> Self {
        Self {
            target: SuperTarget::Constructor,
            arguments,
            span,
        }
    }

    pub fn method(name: impl Into<String>, arguments: Vec<Expr>, span: Span) -> Self {
        Self {
            target: SuperTarget::Method(name.into()),
            arguments,
            span,
        }
    }
}
