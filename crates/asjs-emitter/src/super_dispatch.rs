//! Super-dispatch resolution.
//!
//! Every super-call site is rewritten into one of three target idioms,
//! selected by the superclass's origin in the symbol table. The idioms are
//! centralized here: historically, divergent per-call-site emission of
//! super calls was a source of drift, so all of them funnel through
//! [`lower_super_call`].
//!
//! - Constructor dispatch (always):
//!   `Cls.base(this, 'constructor', args…)`
//! - Own dispatch (superclass compiled by this pipeline, name-stable):
//!   `Cls.superClass_.method.apply(this, [args…])`
//! - Generic dispatch (superclass externally declared, opaque layout):
//!   `Cls.base(this, 'method', args…)` — the runtime helper resolves the
//!   member by name.
//!
//! Accessor super-calls route through the logical `get__`/`set__`
//! functions, never the backing field: the backing field belongs to the
//! superclass's private lowering and is not visible to the subclass.

use asjs_common::{Diagnostic, QName, diagnostic_codes};
use asjs_model::{
    ClassDef, ClassOrigin, MemberLookup, SuperCallSite, SuperTarget, SymbolTable,
};

use crate::ir::IRNode;

/// Terminal dispatch style for one call site.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchStyle {
    Constructor,
    Own,
    Generic,
}

/// Resolve the dispatch style for a call site in `class`.
///
/// A missing member on a fully pipeline-resolved chain is
/// `MissingSuperMember` — fatal for the enclosing method only.
pub fn resolve_style(
    class: &ClassDef,
    symbols: &SymbolTable,
    site: &SuperCallSite,
) -> Result<DispatchStyle, Diagnostic> {
    let Some(superclass) = &class.superclass else {
        return Err(missing_super(class, site, "class has no superclass"));
    };

    if site.target == SuperTarget::Constructor {
        return Ok(DispatchStyle::Constructor);
    }

    let member_name = match &site.target {
        SuperTarget::Constructor => unreachable!(),
        SuperTarget::Method(name) | SuperTarget::Getter(name) | SuperTarget::Setter(name) => name,
    };

    match symbols.resolve_member(superclass, member_name) {
        MemberLookup::Missing => Err(missing_super(
            class,
            site,
            &format!("member '{member_name}' not found on superclass '{superclass}'"),
        )),
        // Ambient internals are opaque; the named helper resolves at runtime.
        MemberLookup::Opaque | MemberLookup::UnknownClass => Ok(DispatchStyle::Generic),
        MemberLookup::Found(_) => match symbols.origin(superclass) {
            Some(ClassOrigin::Pipeline) => Ok(DispatchStyle::Own),
            _ => Ok(DispatchStyle::Generic),
        },
    }
}

/// Rewrite a super-call site into the dispatch idiom, given
/// already-converted argument IR.
pub fn lower_super_call(
    class: &ClassDef,
    symbols: &SymbolTable,
    site: &SuperCallSite,
    arguments: Vec<IRNode>,
) -> Result<IRNode, Diagnostic> {
    let style = resolve_style(class, symbols, site)?;
    let class_ref = IRNode::qref(class.qname.clone());

    Ok(match (&site.target, style) {
        (SuperTarget::Constructor, _) => {
            let mut args = vec![IRNode::this(), IRNode::string("constructor")];
            args.extend(arguments);
            IRNode::call(IRNode::prop(class_ref, "base"), args)
        }
        (SuperTarget::Method(name), DispatchStyle::Own) => apply_via_super_class(
            class_ref,
            name.clone(),
            arguments,
        ),
        (SuperTarget::Getter(name), DispatchStyle::Own) => apply_via_super_class(
            class_ref,
            format!("get__{name}"),
            Vec::new(),
        ),
        (SuperTarget::Setter(name), DispatchStyle::Own) => apply_via_super_class(
            class_ref,
            format!("set__{name}"),
            arguments,
        ),
        (SuperTarget::Method(name), _) => base_call(class_ref, name.clone(), arguments),
        (SuperTarget::Getter(name), _) => base_call(class_ref, format!("get__{name}"), Vec::new()),
        (SuperTarget::Setter(name), _) => base_call(class_ref, format!("set__{name}"), arguments),
    })
}

/// `Cls.superClass_.member.apply(this, [args…])` — or `apply(this)` with no
/// arguments.
fn apply_via_super_class(class_ref: IRNode, member: String, arguments: Vec<IRNode>) -> IRNode {
    let target = IRNode::prop(IRNode::prop(class_ref, "superClass_"), member);
    let mut args = vec![IRNode::this()];
    if !arguments.is_empty() {
        args.push(IRNode::array(arguments));
    }
    IRNode::call(IRNode::prop(target, "apply"), args)
}

/// `Cls.base(this, 'member', args…)`
fn base_call(class_ref: IRNode, member: String, arguments: Vec<IRNode>) -> IRNode {
    let mut args = vec![IRNode::this(), IRNode::string(member)];
    args.extend(arguments);
    IRNode::call(IRNode::prop(class_ref, "base"), args)
}

fn missing_super(class: &ClassDef, site: &SuperCallSite, detail: &str) -> Diagnostic {
    Diagnostic::error(
        class.file.clone(),
        site.span,
        format!("invalid super-dispatch in '{}': {detail}", class.qname),
        diagnostic_codes::MISSING_SUPER_MEMBER,
    )
}

/// The implicit parameterless super-constructor dispatch synthesized when a
/// subclass constructor omits the explicit call.
pub fn implicit_constructor_dispatch(class_qname: &QName) -> IRNode {
    IRNode::call(
        IRNode::prop(IRNode::qref(class_qname.clone()), "base"),
        vec![IRNode::this(), IRNode::string("constructor")],
    )
}
