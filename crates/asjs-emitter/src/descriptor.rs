//! Declarative-tree flattening.
//!
//! A component tree lowers to one flat descriptor array the runtime inflates
//! at construction time. Per node, the slot sequence is:
//!
//! `[classRef, propertyCount, (propName, isLiteral, propValue)*,`
//! ` childCountOrNull, eventNameOrZero, eventHandlerRefOrNull, child*…]`
//!
//! - The id is an ordinary literal property, always first: explicit ids
//!   under the key `id`, synthesized positional ids under `_id` with values
//!   `$ID_<n>` numbered sequentially in pre-order across the compilation
//!   unit. The numbering base is handed in per class so parallel emission
//!   stays deterministic.
//! - Literal properties precede nested-component properties. The boolean
//!   `isLiteral` slot is the sole discriminator: `true` is followed by a
//!   literal value, `false` by the nested node's own sequence as an array.
//! - Child sequences are spliced in flat after the event slots; the count
//!   slot (null when the node is a leaf) declares how many.
//!
//! Flattening validates as it goes: an unresolvable class reference or a
//! property with no counterpart on the target class is
//! `MalformedComponentTree`, fatal for this descriptor only. The flattened
//! sequence is populated once per class and re-reads are byte-identical.

use asjs_common::{Diagnostic, DiagnosticSink, QName, diagnostic_codes};
use asjs_model::{ClassDef, ComponentNode, ComponentValue, MemberLookup, SymbolTable};
use once_cell::sync::OnceCell;

use crate::expr_to_ir::ExprToIr;
use crate::ir::IRNode;

/// One slot in a flattened descriptor sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum DescriptorValue {
    /// Component class reference.
    ClassRef(QName),
    /// Property or child count.
    Count(u32),
    /// Property or event name.
    Name(String),
    /// Property discriminator: literal vs. nested sequence.
    LiteralFlag(bool),
    /// Literal property value or event-handler reference, already lowered.
    Literal(IRNode),
    /// A nested component's sequence, emitted as a nested array.
    Nested(Vec<DescriptorValue>),
    /// Empty child-count or absent event-handler slot.
    Null,
    /// Absent event-name slot.
    Zero,
}

impl DescriptorValue {
    pub fn to_ir(&self) -> IRNode {
        match self {
            Self::ClassRef(q) => IRNode::qref(q.clone()),
            Self::Count(n) => IRNode::number(n.to_string()),
            Self::Name(name) => IRNode::string(name.clone()),
            Self::LiteralFlag(flag) => IRNode::BooleanLiteral(*flag),
            Self::Literal(ir) => ir.clone(),
            Self::Nested(values) => {
                IRNode::array(values.iter().map(DescriptorValue::to_ir).collect())
            }
            Self::Null => IRNode::NullLiteral,
            Self::Zero => IRNode::number("0"),
        }
    }
}

/// Count of nodes needing a synthesized id, pre-order. The assembler sums
/// these across classes in source order to hand each flattener its
/// numbering base.
pub fn count_synthesized_ids(node: &ComponentNode) -> usize {
    let mut count = usize::from(node.id.is_none());
    for prop in &node.properties {
        if let ComponentValue::Node(nested) = &prop.value {
            count += count_synthesized_ids(nested);
        }
    }
    for child in &node.children {
        count += count_synthesized_ids(child);
    }
    count
}

pub struct TreeFlattener<'a> {
    class: &'a ClassDef,
    symbols: &'a SymbolTable,
    next_id: usize,
}

impl<'a> TreeFlattener<'a> {
    pub fn new(class: &'a ClassDef, symbols: &'a SymbolTable, id_base: usize) -> Self {
        Self {
            class,
            symbols,
            next_id: id_base,
        }
    }

    /// Flatten the class's component tree. Returns `None` (after reporting)
    /// when the tree is malformed.
    pub fn flatten(mut self, sink: &mut DiagnosticSink) -> Option<Vec<DescriptorValue>> {
        let root = self.class.component.as_ref()?;
        match self.flatten_node(root) {
            Ok(values) => Some(values),
            Err(diag) => {
                sink.push(diag);
                None
            }
        }
    }

    fn flatten_node(&mut self, node: &ComponentNode) -> Result<Vec<DescriptorValue>, Diagnostic> {
        if !self.symbols.contains(&node.class_ref) {
            return Err(self.malformed(node, &format!("unknown component class '{}'", node.class_ref)));
        }

        let converter = ExprToIr::new(self.class, self.symbols);
        let mut out = vec![DescriptorValue::ClassRef(node.class_ref.clone())];

        // Id first, then literal properties, then nested ones.
        let mut literals: Vec<DescriptorValue> = Vec::new();
        let mut nested: Vec<DescriptorValue> = Vec::new();
        let mut count: u32 = 0;

        match &node.id {
            Some(id) => {
                literals.push(DescriptorValue::Name("id".to_string()));
                literals.push(DescriptorValue::LiteralFlag(true));
                literals.push(DescriptorValue::Literal(IRNode::string(id.clone())));
            }
            None => {
                let id = format!("$ID_{}", self.next_id);
                self.next_id += 1;
                literals.push(DescriptorValue::Name("_id".to_string()));
                literals.push(DescriptorValue::LiteralFlag(true));
                literals.push(DescriptorValue::Literal(IRNode::string(id)));
            }
        }
        count += 1;

        for prop in &node.properties {
            self.check_property(node, &prop.name)?;
            count += 1;
            match &prop.value {
                ComponentValue::Literal(expr) => {
                    let ir = converter.convert_expr(expr).map_err(|d| {
                        self.malformed(node, &format!("bad literal for property '{}': {}", prop.name, d.message_text))
                    })?;
                    literals.push(DescriptorValue::Name(prop.name.clone()));
                    literals.push(DescriptorValue::LiteralFlag(true));
                    literals.push(DescriptorValue::Literal(ir));
                }
                ComponentValue::Node(child) => {
                    let sequence = self.flatten_node(child)?;
                    nested.push(DescriptorValue::Name(prop.name.clone()));
                    nested.push(DescriptorValue::LiteralFlag(false));
                    nested.push(DescriptorValue::Nested(sequence));
                }
            }
        }

        out.push(DescriptorValue::Count(count));
        out.extend(literals);
        out.extend(nested);

        if node.children.is_empty() {
            out.push(DescriptorValue::Null);
        } else {
            out.push(DescriptorValue::Count(node.children.len() as u32));
        }

        match &node.event {
            Some(wiring) => {
                self.check_handler(node, &wiring.handler)?;
                out.push(DescriptorValue::Name(wiring.name.clone()));
                out.push(DescriptorValue::Literal(IRNode::this_prop(
                    wiring.handler.clone(),
                )));
            }
            None => {
                out.push(DescriptorValue::Zero);
                out.push(DescriptorValue::Null);
            }
        }

        for child in &node.children {
            out.extend(self.flatten_node(child)?);
        }

        Ok(out)
    }

    /// A wired property must exist on the target component class. Chains
    /// reaching an external class are assumed to satisfy the reference.
    fn check_property(&self, node: &ComponentNode, name: &str) -> Result<(), Diagnostic> {
        match self.symbols.resolve_member(&node.class_ref, name) {
            MemberLookup::Found(_) | MemberLookup::Opaque => Ok(()),
            MemberLookup::Missing | MemberLookup::UnknownClass => Err(self.malformed(
                node,
                &format!("component class '{}' has no property '{name}'", node.class_ref),
            )),
        }
    }

    /// An event handler must be a member of the owning document class.
    fn check_handler(&self, node: &ComponentNode, handler: &str) -> Result<(), Diagnostic> {
        match self.symbols.resolve_member(&self.class.qname, handler) {
            MemberLookup::Found(_) | MemberLookup::Opaque => Ok(()),
            MemberLookup::Missing | MemberLookup::UnknownClass => Err(self.malformed(
                node,
                &format!("event handler '{handler}' is not a member of '{}'", self.class.qname),
            )),
        }
    }

    fn malformed(&self, node: &ComponentNode, detail: &str) -> Diagnostic {
        Diagnostic::error(
            self.class.file.clone(),
            node.span,
            format!("malformed component tree in '{}': {detail}", self.class.qname),
            diagnostic_codes::MALFORMED_COMPONENT_TREE,
        )
    }
}

/// Per-class descriptor, flattened once and cached. Re-reads return the
/// same sequence, so re-emission is byte-identical.
pub struct ClassDescriptor<'a> {
    class: &'a ClassDef,
    symbols: &'a SymbolTable,
    id_base: usize,
    cache: OnceCell<Option<Vec<DescriptorValue>>>,
}

impl<'a> ClassDescriptor<'a> {
    pub fn new(class: &'a ClassDef, symbols: &'a SymbolTable, id_base: usize) -> Self {
        Self {
            class,
            symbols,
            id_base,
            cache: OnceCell::new(),
        }
    }

    /// Flattened sequence, populated on first access. Diagnostics are
    /// reported only by the populating call.
    pub fn flattened(&self, sink: &mut DiagnosticSink) -> Option<&[DescriptorValue]> {
        self.cache
            .get_or_init(|| TreeFlattener::new(self.class, self.symbols, self.id_base).flatten(sink))
            .as_deref()
    }
}

/// The memoized `get__descriptor` function body:
///
/// ```text
/// if (this.dd_ == null) {
///   this.dd_ = [ … ];                                  // root document
///   this.dd_ = Cls.superClass_.get__descriptor
///       .apply(this).concat([ … ]);                    // subclassed document
/// }
/// return this.dd_;
/// ```
pub fn descriptor_getter_ir(
    class: &ClassDef,
    symbols: &SymbolTable,
    values: &[DescriptorValue],
) -> IRNode {
    let array = IRNode::ArrayLiteralMultiline(values.iter().map(DescriptorValue::to_ir).collect());

    let inherits_descriptor = class
        .superclass
        .as_ref()
        .is_some_and(|sup| symbols.chain_has_component(sup));

    let data = if inherits_descriptor {
        let super_descriptor = IRNode::call(
            IRNode::prop(
                IRNode::prop(
                    IRNode::prop(IRNode::qref(class.qname.clone()), "superClass_"),
                    "get__descriptor",
                ),
                "apply",
            ),
            vec![IRNode::this()],
        );
        IRNode::call(IRNode::prop(super_descriptor, "concat"), vec![array])
    } else {
        array
    };

    IRNode::func_expr(
        Vec::new(),
        vec![
            IRNode::IfStatement {
                condition: Box::new(IRNode::binary(
                    IRNode::this_prop("dd_"),
                    "==",
                    IRNode::NullLiteral,
                )),
                then_branch: vec![IRNode::expr_stmt(IRNode::assign(
                    IRNode::this_prop("dd_"),
                    data,
                ))],
                else_branch: None,
            },
            IRNode::ret(Some(IRNode::this_prop("dd_"))),
        ],
    )
}
