use rescomp_tree::ResourceNode;

use crate::context::{EmitContext, IndentStyle};
use crate::options::{EmitOptions, Target};

/// Target-specific renderer of the static resource tree.
///
/// The generator calls the hooks in a fixed order: `emit_preamble`, then
/// `begin_data`, `emit_node` once per node in increasing index order,
/// `emit_root_accessor` and finally `end_data`. Each `emit_node` may only
/// refer to records of nodes with a smaller index.
pub trait TargetEmitter {
    /// Which target this emitter renders.
    fn target(&self) -> Target;

    /// Type declarations and the root accessor declaration, visible whether
    /// or not the data section is compiled in.
    fn emit_preamble(&self, opts: &EmitOptions, ctx: &mut EmitContext);

    /// Open the conditionally compiled data section.
    fn begin_data(&self, opts: &EmitOptions, ctx: &mut EmitContext);

    /// Path record, child-list or payload record, and aggregate record of one node.
    fn emit_node(&self, node: &ResourceNode, opts: &EmitOptions, ctx: &mut EmitContext);

    /// Accessor implementation returning the root aggregate.
    fn emit_root_accessor(&self, root: &ResourceNode, opts: &EmitOptions, ctx: &mut EmitContext);

    /// Close the data section.
    fn end_data(&self, opts: &EmitOptions, ctx: &mut EmitContext);

    /// Indentation style for this target.
    fn indent_style(&self) -> IndentStyle {
        IndentStyle::Spaces(4)
    }
}
