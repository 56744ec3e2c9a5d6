//! Member lowering.
//!
//! Flattens class-model members into prototype-shaped pieces: plain fields
//! become prototype defaults (with construction-time re-initialization where
//! the default allocates), methods become prototype function assignments,
//! accessors split into logical `get__`/`set__` functions plus a combined
//! property binding, and statics become class-object assignments.
//!
//! Placement rule for field defaults:
//! - statically-known literal: folded onto the prototype
//! - no initializer: null sentinel on the prototype
//! - fresh-mutable or computed initializer: null sentinel on the prototype
//!   plus a `this.name = …` statement re-run in every constructor call, so
//!   instances never share one allocation
//!
//! A member whose body fails to lower (an invalid super-dispatch site) is
//! dropped with a diagnostic; the rest of the class still emits.

use asjs_common::{DiagnosticSink, EmitOptions, QName};
use asjs_model::{
    AccessorDef, ClassDef, Expr, Member, MemberKind, MethodDef, ModifierFlags, Parameter,
    SymbolTable, Visibility,
};

use crate::expr_to_ir::ExprToIr;
use crate::ir::{IRNode, IRParam};

/// Instance field lowered to a prototype default.
pub struct LoweredField {
    pub name: String,
    pub ty: QName,
    pub visibility: Visibility,
    /// Prototype default: the folded literal, or a null sentinel.
    pub default: IRNode,
}

/// Method lowered to a prototype (or class-object) function assignment.
pub struct LoweredMethod {
    pub name: String,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
    pub parameters: Vec<Parameter>,
    pub return_type: QName,
    pub function: IRNode,
}

/// Static field or constant lowered to a class-object assignment.
pub struct LoweredStatic {
    pub name: String,
    pub ty: QName,
    pub visibility: Visibility,
    pub is_const: bool,
    pub value: IRNode,
}

/// Accessor pair lowered to logical functions plus a property binding.
pub struct LoweredAccessor {
    pub name: String,
    pub ty: QName,
    pub visibility: Visibility,
    pub modifiers: ModifierFlags,
    /// `get__name` function, when a getter exists.
    pub getter: Option<IRNode>,
    /// `set__name` function, when a setter exists.
    pub setter: Option<IRNode>,
    /// Synthesized backing-field slot and its prototype default, for
    /// accessors with a generated read or write path.
    pub backing: Option<LoweredField>,
}

/// All members of one class, lowered and grouped for emission.
pub struct LoweredClass {
    pub fields: Vec<LoweredField>,
    /// `this.name = …;` statements re-run per construction, in member
    /// declaration order. Spliced in after the super-constructor dispatch.
    pub ctor_field_inits: Vec<IRNode>,
    pub methods: Vec<LoweredMethod>,
    pub static_methods: Vec<LoweredMethod>,
    pub statics: Vec<LoweredStatic>,
    pub accessors: Vec<LoweredAccessor>,
}

pub struct MemberLowerer<'a> {
    class: &'a ClassDef,
    symbols: &'a SymbolTable,
    options: &'a EmitOptions,
}

impl<'a> MemberLowerer<'a> {
    pub fn new(class: &'a ClassDef, symbols: &'a SymbolTable, options: &'a EmitOptions) -> Self {
        Self {
            class,
            symbols,
            options,
        }
    }

    pub fn lower(&self, sink: &mut DiagnosticSink) -> LoweredClass {
        let mut lowered = LoweredClass {
            fields: Vec::new(),
            ctor_field_inits: Vec::new(),
            methods: Vec::new(),
            static_methods: Vec::new(),
            statics: Vec::new(),
            accessors: Vec::new(),
        };
        let converter = ExprToIr::new(self.class, self.symbols);

        for member in &self.class.members {
            match &member.kind {
                MemberKind::Field { ty, initializer } => {
                    self.lower_field(member, ty, initializer.as_ref(), &converter, &mut lowered, sink);
                }
                // Constants live on the class object, not the instance.
                MemberKind::Constant { ty, initializer } => {
                    match converter.convert_expr(initializer) {
                        Ok(value) => lowered.statics.push(LoweredStatic {
                            name: member.name.clone(),
                            ty: ty.clone(),
                            visibility: member.visibility,
                            is_const: true,
                            value,
                        }),
                        Err(diag) => sink.push(diag),
                    }
                }
                MemberKind::StaticField { ty, initializer } => {
                    let value = match initializer {
                        Some(init) => match converter.convert_expr(init) {
                            Ok(ir) => ir,
                            Err(diag) => {
                                sink.push(diag);
                                continue;
                            }
                        },
                        None => IRNode::NullLiteral,
                    };
                    lowered.statics.push(LoweredStatic {
                        name: member.name.clone(),
                        ty: ty.clone(),
                        visibility: member.visibility,
                        is_const: false,
                        value,
                    });
                }
                MemberKind::Method(def) => {
                    if let Some(method) = self.lower_method(member, def, &converter, sink) {
                        lowered.methods.push(method);
                    }
                }
                MemberKind::StaticMethod(def) => {
                    if let Some(method) = self.lower_method(member, def, &converter, sink) {
                        lowered.static_methods.push(method);
                    }
                }
                MemberKind::Accessor(def) => {
                    if let Some(accessor) =
                        self.lower_accessor(member, def, &converter, &mut lowered.ctor_field_inits, sink)
                    {
                        lowered.accessors.push(accessor);
                    }
                }
            }
        }

        lowered
    }

    fn lower_field(
        &self,
        member: &Member,
        ty: &QName,
        initializer: Option<&Expr>,
        converter: &ExprToIr<'_>,
        lowered: &mut LoweredClass,
        sink: &mut DiagnosticSink,
    ) {
        let default = match initializer {
            Some(init) if init.is_static_literal() => match converter.convert_expr(init) {
                Ok(ir) => ir,
                Err(diag) => {
                    sink.push(diag);
                    return;
                }
            },
            Some(init) => {
                // Re-initialized per construction; prototype carries a
                // placeholder so the slot still reflects.
                match converter.convert_expr(init) {
                    Ok(ir) => {
                        lowered.ctor_field_inits.push(IRNode::expr_stmt(IRNode::assign(
                            IRNode::this_prop(member.name.clone()),
                            ir,
                        )));
                    }
                    Err(diag) => sink.push(diag),
                }
                IRNode::NullLiteral
            }
            None => IRNode::NullLiteral,
        };
        lowered.fields.push(LoweredField {
            name: member.name.clone(),
            ty: ty.clone(),
            visibility: member.visibility,
            default,
        });
    }

    fn lower_method(
        &self,
        member: &Member,
        def: &MethodDef,
        converter: &ExprToIr<'_>,
        sink: &mut DiagnosticSink,
    ) -> Option<LoweredMethod> {
        let body = match converter.convert_stmts(&def.body) {
            Ok(body) => body,
            Err(diag) => {
                sink.push(diag);
                return None;
            }
        };
        Some(LoweredMethod {
            name: member.name.clone(),
            visibility: member.visibility,
            modifiers: member.modifiers,
            parameters: def.parameters.clone(),
            return_type: def.return_type.clone(),
            function: IRNode::func_expr(parameter_irs(&def.parameters), body),
        })
    }

    fn lower_accessor(
        &self,
        member: &Member,
        def: &AccessorDef,
        converter: &ExprToIr<'_>,
        ctor_field_inits: &mut Vec<IRNode>,
        sink: &mut DiagnosticSink,
    ) -> Option<LoweredAccessor> {
        let backing_name = self.options.backing_field_style.backing_name(&member.name);
        let needs_backing = (def.has_getter && def.getter_body.is_none())
            || (def.has_setter && def.setter_body.is_none());

        let getter = if def.has_getter {
            match &def.getter_body {
                Some(body) => match converter.convert_stmts(body) {
                    Ok(body) => Some(IRNode::func_expr(Vec::new(), body)),
                    Err(diag) => {
                        sink.push(diag);
                        None
                    }
                },
                None => Some(IRNode::func_expr(
                    Vec::new(),
                    vec![IRNode::ret(Some(IRNode::this_prop(backing_name.clone())))],
                )),
            }
        } else {
            None
        };

        let setter = if def.has_setter {
            match &def.setter_body {
                Some(body) => match converter.convert_stmts(body) {
                    Ok(body) => Some(IRNode::func_expr(vec![IRParam::new("value")], body)),
                    Err(diag) => {
                        sink.push(diag);
                        None
                    }
                },
                None => match converter.convert_stmts(&def.setter_side_effects) {
                    Ok(side_effects) => Some(self.change_gate_setter(&backing_name, side_effects)),
                    Err(diag) => {
                        sink.push(diag);
                        None
                    }
                },
            }
        } else {
            None
        };

        if getter.is_none() && setter.is_none() {
            return None;
        }

        let backing = if needs_backing {
            let default = match &def.default_value {
                Some(value) if value.is_static_literal() => match converter.convert_expr(value) {
                    Ok(ir) => ir,
                    Err(diag) => {
                        sink.push(diag);
                        IRNode::NullLiteral
                    }
                },
                Some(value) => {
                    match converter.convert_expr(value) {
                        Ok(ir) => ctor_field_inits.push(IRNode::expr_stmt(IRNode::assign(
                            IRNode::this_prop(backing_name.clone()),
                            ir,
                        ))),
                        Err(diag) => sink.push(diag),
                    }
                    IRNode::NullLiteral
                }
                None => IRNode::NullLiteral,
            };
            Some(LoweredField {
                name: backing_name,
                ty: def.ty.clone(),
                visibility: Visibility::Private,
                default,
            })
        } else {
            None
        };

        Some(LoweredAccessor {
            name: member.name.clone(),
            ty: def.ty.clone(),
            visibility: member.visibility,
            modifiers: member.modifiers,
            getter,
            setter,
            backing,
        })
    }

    /// Synthesized setter with the change gate: the backing field is only
    /// written (and side effects only run) when the incoming value differs.
    fn change_gate_setter(&self, backing_name: &str, side_effects: Vec<IRNode>) -> IRNode {
        let mut gated = vec![IRNode::expr_stmt(IRNode::assign(
            IRNode::this_prop(backing_name),
            IRNode::id("value"),
        ))];
        gated.extend(side_effects);

        IRNode::func_expr(
            vec![IRParam::new("value")],
            vec![IRNode::IfStatement {
                condition: Box::new(IRNode::binary(
                    IRNode::id("value"),
                    "!=",
                    IRNode::this_prop(backing_name),
                )),
                then_branch: gated,
                else_branch: None,
            }],
        )
    }
}

fn parameter_irs(parameters: &[Parameter]) -> Vec<IRParam> {
    parameters
        .iter()
        .map(|p| {
            if p.rest {
                IRParam::rest(p.name.clone())
            } else {
                IRParam::new(p.name.clone())
            }
        })
        .collect()
}
