//! Reflection-metadata construction.
//!
//! Two metadata surfaces hang off every emitted prototype:
//!
//! - `ASJS_CLASS_INFO`: eagerly-evaluated identity record (simple name,
//!   qualified name, kind tag, implemented interfaces).
//! - `ASJS_REFLECTION_INFO`: a factory function returning category tables
//!   (`variables`, `accessors`, `methods`), themselves factories. The double
//!   deferral keeps per-member records off the startup path; they are only
//!   materialized when reflection is actually used.
//!
//! Every non-private member lands in exactly one category. Type names and
//! `declaredBy` are always dotted source-form names, independent of the
//! unit's output naming policy: reflection keys are a lookup surface, not
//! emitted identifiers.

use asjs_common::QName;
use asjs_model::{ClassDef, Member, MemberKind, Parameter, Visibility};

use crate::ir::{IRNode, IRProperty};

/// How an accessor can be used, as advertised to reflection callers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessorAccess {
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl AccessorAccess {
    const fn label(self) -> &'static str {
        match self {
            Self::ReadOnly => "readonly",
            Self::WriteOnly => "writeonly",
            Self::ReadWrite => "readwrite",
        }
    }
}

/// One reflected member record.
#[derive(Clone, Debug)]
pub struct ReflectionEntry {
    pub name: String,
    pub ty: QName,
    pub declared_by: QName,
    /// Set for accessor entries only.
    pub access: Option<AccessorAccess>,
    /// Set for method entries with parameters.
    pub parameters: Vec<ReflectionParam>,
}

#[derive(Clone, Debug)]
pub struct ReflectionParam {
    pub ty: QName,
    pub optional: bool,
}

/// Structured reflection tables for one class, pre-categorized.
#[derive(Clone, Debug, Default)]
pub struct ReflectionInfo {
    pub variables: Vec<ReflectionEntry>,
    pub accessors: Vec<ReflectionEntry>,
    pub methods: Vec<ReflectionEntry>,
}

impl ReflectionInfo {
    /// Categorize a class's own non-private members. Inherited members are
    /// not repeated; callers walk `superClass_` chains at runtime.
    pub fn build(class: &ClassDef) -> Self {
        let mut info = Self::default();
        for member in &class.members {
            if member.visibility == Visibility::Private {
                continue;
            }
            match &member.kind {
                MemberKind::Field { ty, .. }
                | MemberKind::Constant { ty, .. }
                | MemberKind::StaticField { ty, .. } => {
                    info.variables.push(entry(class, member, ty, None, &[]));
                }
                MemberKind::Method(def) | MemberKind::StaticMethod(def) => {
                    info.methods.push(entry(
                        class,
                        member,
                        &def.return_type,
                        None,
                        &def.parameters,
                    ));
                }
                MemberKind::Accessor(def) => {
                    let access = match (def.has_getter, def.has_setter) {
                        (true, false) => AccessorAccess::ReadOnly,
                        (false, true) => AccessorAccess::WriteOnly,
                        _ => AccessorAccess::ReadWrite,
                    };
                    info.accessors
                        .push(entry(class, member, &def.ty, Some(access), &[]));
                }
            }
        }
        info
    }
}

fn entry(
    class: &ClassDef,
    member: &Member,
    ty: &QName,
    access: Option<AccessorAccess>,
    parameters: &[Parameter],
) -> ReflectionEntry {
    ReflectionEntry {
        name: member.name.clone(),
        ty: ty.clone(),
        declared_by: class.qname.clone(),
        access,
        parameters: parameters
            .iter()
            .map(|p| ReflectionParam {
                ty: p.ty.clone(),
                optional: p.optional,
            })
            .collect(),
    }
}

/// `Cls.prototype.ASJS_CLASS_INFO = { names: [{ name, qName, kind }], … };`
pub fn class_info_ir(class: &ClassDef) -> IRNode {
    let name_record = IRNode::object(vec![
        IRProperty::init("name", IRNode::string(class.qname.simple_name())),
        IRProperty::init("qName", IRNode::string(class.qname.to_string())),
        IRProperty::init("kind", IRNode::string(class.kind.metadata_tag())),
    ]);

    let mut props = vec![IRProperty::init(
        "names",
        IRNode::array(vec![name_record]),
    )];
    if !class.interfaces.is_empty() {
        props.push(IRProperty::init(
            "interfaces",
            IRNode::array(
                class
                    .interfaces
                    .iter()
                    .map(|i| IRNode::qref(i.clone()))
                    .collect(),
            ),
        ));
    }

    IRNode::PrototypeAssignment {
        class: class.qname.clone(),
        name: "ASJS_CLASS_INFO".to_string(),
        value: Box::new(IRNode::object(props)),
    }
}

/// `Cls.prototype.ASJS_REFLECTION_INFO = function() { return { … }; };`
pub fn reflection_info_ir(class: &ClassDef, info: &ReflectionInfo) -> IRNode {
    let categories = IRNode::ObjectLiteralMultiline(vec![
        IRProperty::init("variables", category_factory(&info.variables)),
        IRProperty::init("accessors", category_factory(&info.accessors)),
        IRProperty::init("methods", category_factory(&info.methods)),
    ]);

    IRNode::PrototypeAssignment {
        class: class.qname.clone(),
        name: "ASJS_REFLECTION_INFO".to_string(),
        value: Box::new(IRNode::func_expr(
            Vec::new(),
            vec![IRNode::ret(Some(categories))],
        )),
    }
}

/// `function() { return { 'name': { … }, … }; }`
fn category_factory(entries: &[ReflectionEntry]) -> IRNode {
    let records = entries
        .iter()
        .map(|e| IRProperty::init_quoted(e.name.clone(), entry_record(e)))
        .collect();
    IRNode::func_expr(
        Vec::new(),
        vec![IRNode::ret(Some(IRNode::ObjectLiteralMultiline(records)))],
    )
}

fn entry_record(entry: &ReflectionEntry) -> IRNode {
    let mut props = vec![IRProperty::init(
        "type",
        IRNode::string(entry.ty.to_string()),
    )];
    if let Some(access) = entry.access {
        props.push(IRProperty::init("access", IRNode::string(access.label())));
    }
    props.push(IRProperty::init(
        "declaredBy",
        IRNode::string(entry.declared_by.to_string()),
    ));
    if !entry.parameters.is_empty() {
        let params = entry
            .parameters
            .iter()
            .map(|p| {
                IRNode::object(vec![
                    IRProperty::init("type", IRNode::string(p.ty.to_string())),
                    IRProperty::init("optional", IRNode::BooleanLiteral(p.optional)),
                ])
            })
            .collect();
        props.push(IRProperty::init(
            "parameters",
            IRNode::func_expr(Vec::new(), vec![IRNode::ret(Some(IRNode::array(params)))]),
        ));
    }
    IRNode::object(props)
}

#[cfg(test)]
mod tests {
    use super::*;
    use asjs_common::EmitOptions;
    use asjs_model::{AccessorDef, ClassKind, Member, MethodDef};

    use crate::printer::IRPrinter;

    fn print(node: &IRNode) -> String {
        IRPrinter::emit_to_string(node, &EmitOptions::default())
    }

    fn sample_class() -> ClassDef {
        let mut class = ClassDef::new(QName::parse("org.example.Button"), ClassKind::Class);
        class.interfaces.push(QName::parse("org.example.IControl"));
        class
            .members
            .push(Member::field("count", QName::parse("int"), None));
        class.members.push(Member::accessor("label", {
            let mut def = AccessorDef::synthesized(QName::parse("String"));
            def.has_setter = false;
            def
        }));
        class.members.push(Member::method(
            "press",
            MethodDef {
                parameters: vec![
                    asjs_model::Parameter::new("times", QName::parse("int")).optional(),
                ],
                return_type: QName::parse("void"),
                body: vec![],
            },
        ));
        class.members.push(
            Member::field("secret", QName::parse("String"), None)
                .with_visibility(Visibility::Private),
        );
        class
    }

    #[test]
    fn test_every_public_member_in_exactly_one_category() {
        let class = sample_class();
        let info = ReflectionInfo::build(&class);
        assert_eq!(info.variables.len(), 1);
        assert_eq!(info.accessors.len(), 1);
        assert_eq!(info.methods.len(), 1);

        let all: Vec<&str> = info
            .variables
            .iter()
            .chain(&info.accessors)
            .chain(&info.methods)
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(all, vec!["count", "label", "press"]);
        assert!(!all.contains(&"secret"));
    }

    #[test]
    fn test_declared_by_and_access() {
        let class = sample_class();
        let info = ReflectionInfo::build(&class);
        assert_eq!(info.accessors[0].declared_by.to_string(), "org.example.Button");
        assert_eq!(info.accessors[0].access, Some(AccessorAccess::ReadOnly));
    }

    #[test]
    fn test_class_info_shape() {
        let class = sample_class();
        let printed = print(&class_info_ir(&class));
        assert_eq!(
            printed,
            "org.example.Button.prototype.ASJS_CLASS_INFO = { names: [{ name: 'Button', \
             qName: 'org.example.Button', kind: 'class' }], interfaces: [org.example.IControl] };"
        );
    }

    #[test]
    fn test_reflection_info_records() {
        let class = sample_class();
        let info = ReflectionInfo::build(&class);
        let printed = print(&reflection_info_ir(&class, &info));
        assert!(printed.starts_with(
            "org.example.Button.prototype.ASJS_REFLECTION_INFO = function() {"
        ));
        assert!(printed.contains("'count': { type: 'int', declaredBy: 'org.example.Button' }"));
        assert!(printed.contains(
            "'label': { type: 'String', access: 'readonly', declaredBy: 'org.example.Button' }"
        ));
        assert!(printed.contains("'press': { type: 'void', declaredBy: 'org.example.Button', parameters: function() {"));
        assert!(printed.contains("return [{ type: 'int', optional: true }];"));
    }
}
