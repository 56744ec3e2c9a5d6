//! Resolved, typed input model for the asjs emitter.
//!
//! The front end (lexer, parser, type checker) is a separate collaborator;
//! this crate is the contract between it and the emitter. Everything here is
//! fully resolved and already desugared into target-evaluable form: the
//! emitter consumes these structures, it never mutates them and never
//! re-implements expression lowering.

pub mod class;
pub mod component;
pub mod expr;
pub mod symbols;

pub use class::{
    AccessorDef, ClassDef, ClassKind, Constructor, Member, MemberKind, MethodDef, ModifierFlags,
    Parameter, Visibility,
};
pub use component::{ComponentNode, ComponentProperty, ComponentValue, EventWiring};
pub use expr::{Expr, Stmt, SuperCallSite, SuperTarget};
pub use symbols::{ClassOrigin, ClassSymbol, MemberLookup, MemberSig, MemberSigKind, SymbolTable};
