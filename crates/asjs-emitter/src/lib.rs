//! Code emission for the asjs pipeline: lowers resolved class-model
//! declarations into prototype-based JavaScript-style source text.
//!
//! The pass is split into lowering stages that build [`ir::IRNode`] trees
//! (member lowerer, super-dispatch resolver, reflection builder, tree
//! flattener) and a single [`printer::IRPrinter`] that turns those trees
//! into text. [`assembler::OutputAssembler`] drives the whole unit,
//! emitting classes concurrently and joining fragments in source order.

pub mod assembler;
pub mod class_emitter;
pub mod deps;
pub mod descriptor;
pub mod expr_to_ir;
pub mod ir;
pub mod members;
pub mod printer;
pub mod reflection;
pub mod super_dispatch;

pub use assembler::{OutputAssembler, UnitOutput};
pub use class_emitter::{ClassEmitter, ClassFragment};
pub use deps::DependencyCollector;
pub use descriptor::{ClassDescriptor, DescriptorValue, TreeFlattener, count_synthesized_ids};
pub use expr_to_ir::ExprToIr;
pub use ir::{IRAccessorBinding, IRNode, IRParam, IRProperty};
pub use members::{LoweredClass, MemberLowerer};
pub use printer::IRPrinter;
pub use reflection::{ReflectionInfo, class_info_ir, reflection_info_ir};
pub use super_dispatch::{DispatchStyle, lower_super_call, resolve_style};
