//! Global symbol table.
//!
//! Built by the front end before emission starts, then read-only for the
//! whole pass: per-class emission may run concurrently against it without
//! locking.

use asjs_common::QName;
use rustc_hash::FxHashMap;

use crate::class::{ClassDef, ClassKind, MemberKind, Visibility};

/// Whether a class is compiled by this pipeline or only declared ambiently.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ClassOrigin {
    /// Compiled by this pass; its lowered shape (accessor functions,
    /// `superClass_` linkage) is known and name-stable.
    Pipeline,
    /// Externally declared; internal representation is opaque, so dispatch
    /// must go through the string-named helper.
    External,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberSigKind {
    Variable { ty: QName },
    Method { parameters: Vec<QName>, return_type: QName },
    Accessor { ty: QName },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSig {
    pub name: String,
    pub kind: MemberSigKind,
    pub is_static: bool,
}

#[derive(Clone, Debug)]
pub struct ClassSymbol {
    pub qname: QName,
    pub kind: ClassKind,
    pub origin: ClassOrigin,
    pub superclass: Option<QName>,
    pub interfaces: Vec<QName>,
    pub members: Vec<MemberSig>,
    /// Whether the class owns a declarative component tree (and therefore
    /// contributes a descriptor that subclasses concatenate onto).
    pub has_component: bool,
}

impl ClassSymbol {
    pub fn member(&self, name: &str) -> Option<&MemberSig> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// Resolved class hierarchy and member signatures for the whole program,
/// pipeline-compiled and ambient alike.
#[derive(Debug, Default)]
pub struct SymbolTable {
    classes: FxHashMap<QName, ClassSymbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: ClassSymbol) {
        self.classes.insert(symbol.qname.clone(), symbol);
    }

    /// Register a pipeline-compiled class, deriving its signature entries
    /// from the declaration.
    pub fn insert_class(&mut self, class: &ClassDef) {
        let members = class
            .members
            .iter()
            .filter(|m| m.visibility != Visibility::Private)
            .map(|m| {
                let (kind, is_static) = match &m.kind {
                    MemberKind::Field { ty, .. } => {
                        (MemberSigKind::Variable { ty: ty.clone() }, false)
                    }
                    MemberKind::Constant { ty, .. } | MemberKind::StaticField { ty, .. } => {
                        (MemberSigKind::Variable { ty: ty.clone() }, true)
                    }
                    MemberKind::Method(def) => (
                        MemberSigKind::Method {
                            parameters: def.parameters.iter().map(|p| p.ty.clone()).collect(),
                            return_type: def.return_type.clone(),
                        },
                        false,
                    ),
                    MemberKind::StaticMethod(def) => (
                        MemberSigKind::Method {
                            parameters: def.parameters.iter().map(|p| p.ty.clone()).collect(),
                            return_type: def.return_type.clone(),
                        },
                        true,
                    ),
                    MemberKind::Accessor(def) => {
                        (MemberSigKind::Accessor { ty: def.ty.clone() }, false)
                    }
                };
                MemberSig {
                    name: m.name.clone(),
                    kind,
                    is_static,
                }
            })
            .collect();

        self.insert(ClassSymbol {
            qname: class.qname.clone(),
            kind: class.kind,
            origin: ClassOrigin::Pipeline,
            superclass: class.superclass.clone(),
            interfaces: class.interfaces.clone(),
            members,
            has_component: class.component.is_some(),
        });
    }

    pub fn resolve(&self, qname: &QName) -> Option<&ClassSymbol> {
        self.classes.get(qname)
    }

    pub fn contains(&self, qname: &QName) -> bool {
        self.classes.contains_key(qname)
    }

    /// Origin of a class, when known.
    pub fn origin(&self, qname: &QName) -> Option<ClassOrigin> {
        self.resolve(qname).map(|c| c.origin)
    }

    /// Whether any pipeline class on the chain starting at `qname` owns a
    /// component tree. External classes are assumed descriptor-free.
    pub fn chain_has_component(&self, qname: &QName) -> bool {
        let mut current = Some(qname.clone());
        while let Some(q) = current {
            let Some(symbol) = self.resolve(&q) else {
                return false;
            };
            if symbol.has_component {
                return true;
            }
            if symbol.origin == ClassOrigin::External {
                return false;
            }
            current = symbol.superclass.clone();
        }
        false
    }

    /// Look up a member by walking the superclass chain starting at `qname`.
    /// Stops at the first external class: ambient internals are opaque and
    /// assumed to satisfy the reference.
    pub fn resolve_member(&self, qname: &QName, member: &str) -> MemberLookup<'_> {
        let mut current = Some(qname.clone());
        while let Some(q) = current {
            let Some(symbol) = self.resolve(&q) else {
                return MemberLookup::UnknownClass;
            };
            if let Some(sig) = symbol.member(member) {
                return MemberLookup::Found(sig);
            }
            if symbol.origin == ClassOrigin::External {
                return MemberLookup::Opaque;
            }
            current = symbol.superclass.clone();
        }
        MemberLookup::Missing
    }
}

/// Result of a chain-walking member lookup.
#[derive(Debug, PartialEq, Eq)]
pub enum MemberLookup<'a> {
    Found(&'a MemberSig),
    /// Chain reached an external class without finding the member; it may
    /// exist in the opaque portion.
    Opaque,
    /// Chain fully walked within pipeline classes; the member does not exist.
    Missing,
    /// A class on the chain is absent from the table.
    UnknownClass,
}
