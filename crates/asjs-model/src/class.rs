//! Class and member declarations as resolved by the front end.

use asjs_common::{QName, Span};
use bitflags::bitflags;

use crate::component::ComponentNode;
use crate::expr::{Expr, Stmt};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClassKind {
    Class,
    Interface,
}

impl ClassKind {
    /// Kind tag as it appears in emitted class-info metadata.
    pub const fn metadata_tag(&self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
}

bitflags! {
    /// Declaration modifiers orthogonal to the member tag.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
    pub struct ModifierFlags: u8 {
        const OVERRIDE = 1 << 0;
        const FINAL = 1 << 1;
        const DYNAMIC = 1 << 2;
    }
}

/// One top-level class or interface in a compilation unit.
///
/// Immutable once built by the front end; the emitter consumes it, never
/// mutates it.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub qname: QName,
    pub kind: ClassKind,
    pub superclass: Option<QName>,
    pub interfaces: Vec<QName>,
    pub members: Vec<Member>,
    pub constructor: Option<Constructor>,
    /// Root of the declarative component tree, when the class was defined
    /// by markup.
    pub component: Option<ComponentNode>,
    pub modifiers: ModifierFlags,
    /// Source file, carried into diagnostics.
    pub file: String,
    pub span: Span,
}

impl ClassDef {
    pub fn new(qname: impl Into<QName>, kind: ClassKind) -> Self {
        Self {
            qname: qname.into(),
            kind,
            superclass: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            constructor: None,
            component: None,
            modifiers: ModifierFlags::default(),
            file: String::new(),
            span: Span::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Member {
    pub name: String,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
    pub kind: MemberKind,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum MemberKind {
    Field {
        ty: QName,
        initializer: Option<Expr>,
    },
    Constant {
        ty: QName,
        initializer: Expr,
    },
    StaticField {
        ty: QName,
        initializer: Option<Expr>,
    },
    Method(MethodDef),
    StaticMethod(MethodDef),
    Accessor(AccessorDef),
}

impl Member {
    pub fn field(name: impl Into<String>, ty: QName, initializer: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            modifiers: ModifierFlags::default(),
            kind: MemberKind::Field { ty, initializer },
            span: Span::default(),
        }
    }

    pub fn method(name: impl Into<String>, def: MethodDef) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            modifiers: ModifierFlags::default(),
            kind: MemberKind::Method(def),
            span: Span::default(),
        }
    }

    pub fn accessor(name: impl Into<String>, def: AccessorDef) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            modifiers: ModifierFlags::default(),
            kind: MemberKind::Accessor(def),
            span: Span::default(),
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_modifiers(mut self, modifiers: ModifierFlags) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Declared type for metadata purposes: field/accessor type, or a
    /// method's return type.
    pub fn declared_type(&self) -> &QName {
        match &self.kind {
            MemberKind::Field { ty, .. }
            | MemberKind::Constant { ty, .. }
            | MemberKind::StaticField { ty, .. } => ty,
            MemberKind::Method(def) | MemberKind::StaticMethod(def) => &def.return_type,
            MemberKind::Accessor(def) => &def.ty,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub ty: QName,
    pub optional: bool,
    pub rest: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: QName) -> Self {
        Self {
            name: name.into(),
            ty,
            optional: false,
            rest: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn rest(mut self) -> Self {
        self.rest = true;
        self
    }
}

#[derive(Clone, Debug)]
pub struct MethodDef {
    pub parameters: Vec<Parameter>,
    pub return_type: QName,
    pub body: Vec<Stmt>,
}

/// A getter/setter pair presented to source callers as a plain field.
#[derive(Clone, Debug)]
pub struct AccessorDef {
    pub ty: QName,
    pub has_getter: bool,
    pub has_setter: bool,
    /// User-supplied getter body, already desugared. `None` means the
    /// synthesized backing-field read.
    pub getter_body: Option<Vec<Stmt>>,
    /// User-supplied setter body, already desugared (including any change
    /// gate the source had). `None` means the synthesized check-then-set.
    pub setter_body: Option<Vec<Stmt>>,
    /// Desugared side effects to run inside the synthesized change gate
    /// after the backing-field mutation (e.g. change-event dispatch).
    pub setter_side_effects: Vec<Stmt>,
    /// Getter's folded default when statically known; seeds the backing
    /// field's initial value.
    pub default_value: Option<Expr>,
}

impl AccessorDef {
    /// Plain synthesized pair: backing-field read, check-then-set write.
    pub fn synthesized(ty: QName) -> Self {
        Self {
            ty,
            has_getter: true,
            has_setter: true,
            getter_body: None,
            setter_body: None,
            setter_side_effects: Vec::new(),
            default_value: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Constructor {
    pub parameters: Vec<Parameter>,
    /// Body statements. An explicit super-constructor call, when present,
    /// is the first statement; the emitter synthesizes one otherwise.
    pub body: Vec<Stmt>,
}
