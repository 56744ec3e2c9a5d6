//! Lowered IR for emitted JavaScript-style output.
//!
//! The lowering stages (member lowerer, super-dispatch resolver, reflection
//! builder, tree flattener) produce trees of `IRNode` instead of strings.
//! The printer then walks these trees and emits output text.
//!
//! Benefits:
//! - Clean separation between lowering logic and string emission
//! - IR is testable independently
//! - Qualified-name rendering stays a printer concern ([`IRNode::QualifiedRef`]
//!   holds structured names until the very end)

use asjs_common::QName;

/// IR node for one emitted JavaScript construct.
#[derive(Debug, Clone, PartialEq)]
pub enum IRNode {
    // =========================================================================
    // Literals
    // =========================================================================
    /// Numeric literal: `42`, `3.14`
    NumericLiteral(String),

    /// String literal: `'hello'`
    StringLiteral(String),

    /// Boolean literal: `true`, `false`
    BooleanLiteral(bool),

    /// Null literal: `null`
    NullLiteral,

    /// Undefined: `undefined`
    Undefined,

    // =========================================================================
    // Identifiers
    // =========================================================================
    /// Local identifier: `value`, `arr`
    Identifier(String),

    /// Structured qualified reference: `org.example.Button` (rendered per
    /// the unit's naming policy)
    QualifiedRef(QName),

    /// This keyword
    This,

    // =========================================================================
    // Expressions
    // =========================================================================
    /// Binary expression: `left op right`
    BinaryExpr {
        left: Box<Self>,
        operator: String,
        right: Box<Self>,
    },

    /// Unary prefix expression: `!x`, `-x`
    PrefixUnaryExpr {
        operator: String,
        operand: Box<Self>,
    },

    /// Call expression: `callee(args)`
    CallExpr {
        callee: Box<Self>,
        arguments: Vec<Self>,
    },

    /// New expression: `new Callee(args)`
    NewExpr {
        callee: Box<Self>,
        arguments: Vec<Self>,
    },

    /// Property access: `object.property`
    PropertyAccess { object: Box<Self>, property: String },

    /// Element access: `object[index]`
    ElementAccess { object: Box<Self>, index: Box<Self> },

    /// Conditional expression: `cond ? then : else`
    ConditionalExpr {
        condition: Box<Self>,
        when_true: Box<Self>,
        when_false: Box<Self>,
    },

    /// Parenthesized expression: `(expr)`
    Parenthesized(Box<Self>),

    /// Array literal: `[a, b, c]`
    ArrayLiteral(Vec<Self>),

    /// Multiline array literal, one element per line (descriptor arrays)
    ArrayLiteralMultiline(Vec<Self>),

    /// Object literal: `{ key: value, ... }`
    ObjectLiteral(Vec<IRProperty>),

    /// Multiline object literal, one property per line (reflection records)
    ObjectLiteralMultiline(Vec<IRProperty>),

    /// Function expression: `function(params) { body }`
    FunctionExpr {
        name: Option<String>,
        parameters: Vec<IRParam>,
        body: Vec<Self>,
    },

    // =========================================================================
    // Statements
    // =========================================================================
    /// Variable declaration: `var x = value;`
    VarDecl {
        name: String,
        initializer: Option<Box<Self>>,
    },

    /// Expression statement: `expr;`
    ExpressionStatement(Box<Self>),

    /// Return statement: `return expr;`
    ReturnStatement(Option<Box<Self>>),

    /// If statement: `if (cond) { then } else { else }`
    IfStatement {
        condition: Box<Self>,
        then_branch: Vec<Self>,
        else_branch: Option<Vec<Self>>,
    },

    /// Block comment; multiline comments are re-indented by the printer
    Comment(String),

    /// Blank separator line between emitted sections
    BlankLine,

    // =========================================================================
    // Class Emission Specific
    // =========================================================================
    /// `asjs.provide('org.example.Button');`
    ProvideStatement(QName),

    /// `asjs.require('org.example.UIBase');`
    RequireStatement(QName),

    /// Constructor function assignment:
    /// `org.example.Button = function(params) { body };`
    ConstructorAssignment {
        class: QName,
        function: Box<Self>,
    },

    /// Chain linkage: `asjs.inherits(org.example.Button, org.example.UIBase);`
    InheritsStatement { class: QName, superclass: QName },

    /// Prototype member assignment:
    /// `org.example.Button.prototype.name = value;`
    PrototypeAssignment {
        class: QName,
        name: String,
        value: Box<Self>,
    },

    /// Static member assignment: `org.example.Button.name = value;`
    StaticAssignment {
        class: QName,
        name: String,
        value: Box<Self>,
    },

    /// Combined accessor binding:
    /// `Object.defineProperties(Cls.prototype, /** @lends {Cls.prototype} */ { ... });`
    DefinePropertiesBlock {
        class: QName,
        entries: Vec<IRAccessorBinding>,
    },
}

/// Property in an object literal.
#[derive(Debug, Clone, PartialEq)]
pub struct IRProperty {
    pub key: String,
    /// Quoted string key (`'name': ...`) vs. bare identifier key
    pub quoted: bool,
    pub value: IRNode,
}

impl IRProperty {
    pub fn init(key: impl Into<String>, value: IRNode) -> Self {
        Self {
            key: key.into(),
            quoted: false,
            value,
        }
    }

    pub fn init_quoted(key: impl Into<String>, value: IRNode) -> Self {
        Self {
            key: key.into(),
            quoted: true,
            value,
        }
    }
}

/// Function parameter. A rest parameter prints as a single trailing
/// collector: `...args`.
#[derive(Debug, Clone, PartialEq)]
pub struct IRParam {
    pub name: String,
    pub rest: bool,
}

impl IRParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rest: false,
        }
    }

    pub fn rest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rest: true,
        }
    }
}

/// One accessor entry inside a `DefinePropertiesBlock`.
#[derive(Debug, Clone, PartialEq)]
pub struct IRAccessorBinding {
    pub name: String,
    /// JSDoc block emitted above the entry (`@export`, `@type {...}`)
    pub jsdoc: Option<String>,
    pub getter: Option<IRNode>,
    pub setter: Option<IRNode>,
}

// =========================================================================
// Builder helpers for IR construction
// =========================================================================

impl IRNode {
    /// Create an identifier node
    pub fn id(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Create a string literal
    pub fn string(s: impl Into<String>) -> Self {
        Self::StringLiteral(s.into())
    }

    /// Create a numeric literal
    pub fn number(n: impl Into<String>) -> Self {
        Self::NumericLiteral(n.into())
    }

    /// Create a qualified reference
    pub fn qref(q: QName) -> Self {
        Self::QualifiedRef(q)
    }

    /// Create a call expression
    pub fn call(callee: Self, args: Vec<Self>) -> Self {
        Self::CallExpr {
            callee: Box::new(callee),
            arguments: args,
        }
    }

    /// Create a property access
    pub fn prop(object: Self, property: impl Into<String>) -> Self {
        Self::PropertyAccess {
            object: Box::new(object),
            property: property.into(),
        }
    }

    /// Create a binary expression
    pub fn binary(left: Self, op: impl Into<String>, right: Self) -> Self {
        Self::BinaryExpr {
            left: Box::new(left),
            operator: op.into(),
            right: Box::new(right),
        }
    }

    /// Create an assignment expression
    pub fn assign(target: Self, value: Self) -> Self {
        Self::BinaryExpr {
            left: Box::new(target),
            operator: "=".to_string(),
            right: Box::new(value),
        }
    }

    /// Create a return statement
    pub fn ret(expr: Option<Self>) -> Self {
        Self::ReturnStatement(expr.map(Box::new))
    }

    /// Create a function expression
    pub fn func_expr(params: Vec<IRParam>, body: Vec<Self>) -> Self {
        Self::FunctionExpr {
            name: None,
            parameters: params,
            body,
        }
    }

    /// Create an expression statement
    pub fn expr_stmt(expr: Self) -> Self {
        Self::ExpressionStatement(Box::new(expr))
    }

    /// Create `this` reference
    pub const fn this() -> Self {
        Self::This
    }

    /// Create an object literal
    pub const fn object(props: Vec<IRProperty>) -> Self {
        Self::ObjectLiteral(props)
    }

    /// Create an array literal
    pub const fn array(elements: Vec<Self>) -> Self {
        Self::ArrayLiteral(elements)
    }

    /// Create a JSDoc block comment from annotation lines
    pub fn jsdoc(lines: &[&str]) -> Self {
        let mut text = String::from("/**\n");
        for line in lines {
            if line.is_empty() {
                text.push_str(" *\n");
            } else {
                text.push_str(" * ");
                text.push_str(line);
                text.push('\n');
            }
        }
        text.push_str(" */");
        Self::Comment(text)
    }

    /// `this.property` accesses appear throughout lowered member bodies
    pub fn this_prop(property: impl Into<String>) -> Self {
        Self::prop(Self::This, property)
    }
}
