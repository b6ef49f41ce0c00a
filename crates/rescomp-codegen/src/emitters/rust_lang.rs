use rescomp_tree::{NodeKind, ResourceNode};

use crate::context::EmitContext;
use crate::escape::{byte_rows, rust_string_literal};
use crate::options::{EmitOptions, Target};
use crate::traits::TargetEmitter;

/// Rust emitter: a module with `Resource` statics, the data section gated by
/// `#[cfg(feature = "<guard>")]`.
pub struct RustEmitter;

impl TargetEmitter for RustEmitter {
    fn target(&self) -> Target {
        Target::Rust
    }

    fn emit_preamble(&self, opts: &EmitOptions, ctx: &mut EmitContext) {
        ctx.line("// Generated by resource_compiler. Do not edit.");
        ctx.line("#[allow(dead_code)]");
        ctx.line(format!("pub mod {} {{", opts.namespace));
        ctx.push_indent();

        ctx.line("#[derive(Debug, Clone, Copy, PartialEq, Eq)]");
        ctx.line("pub enum ResourceType {");
        ctx.push_indent();
        ctx.line("Directory,");
        ctx.line("File,");
        ctx.pop_indent();
        ctx.line("}");
        ctx.blank();

        ctx.line("#[derive(Debug)]");
        ctx.line("pub struct Resource {");
        ctx.push_indent();
        for field in [
            "pub kind: ResourceType,",
            "pub path: &'static str,",
            "pub basename_offset: usize,",
            "pub size: usize,",
            "pub entries: &'static [&'static Resource],",
            "pub data: &'static [u8],",
        ] {
            ctx.line(field);
        }
        ctx.pop_indent();
        ctx.line("}");
        ctx.blank();

        ctx.line("impl Resource {");
        ctx.push_indent();
        ctx.line("pub fn basename(&self) -> &'static str {");
        ctx.push_indent();
        ctx.line("&self.path[self.basename_offset..]");
        ctx.pop_indent();
        ctx.line("}");
        ctx.pop_indent();
        ctx.line("}");
        ctx.blank();

        // Always available, even when the data section is compiled out.
        ctx.line(format!("#[cfg(not(feature = \"{}\"))]", opts.guard));
        ctx.line("pub fn get_root() -> Option<&'static Resource> {");
        ctx.push_indent();
        ctx.line("None");
        ctx.pop_indent();
        ctx.line("}");
        ctx.blank();
    }

    fn begin_data(&self, opts: &EmitOptions, ctx: &mut EmitContext) {
        ctx.line(format!("#[cfg(feature = \"{}\")]", opts.guard));
        ctx.line("mod data {");
        ctx.push_indent();
        ctx.line("use super::{Resource, ResourceType};");
        ctx.blank();
    }

    fn emit_node(&self, node: &ResourceNode, opts: &EmitOptions, ctx: &mut EmitContext) {
        let i = node.index;
        ctx.line(format!(
            "const ENTRY_{i}_PATH: &str = {};",
            rust_string_literal(&node.path)
        ));

        let (kind, filled, unused) = match &node.kind {
            NodeKind::Directory { children } => {
                if !children.is_empty() {
                    ctx.line(format!(
                        "static ENTRY_{i}_ENTRIES: [&Resource; {}] = [",
                        children.len()
                    ));
                    ctx.push_indent();
                    for child in children {
                        ctx.line(format!("&ENTRY_{child},"));
                    }
                    ctx.pop_indent();
                    ctx.line("];");
                }
                ("Directory", "entries", "data")
            }
            NodeKind::File { payload } => {
                if !payload.is_empty() {
                    ctx.line(format!("static ENTRY_{i}_DATA: [u8; {}] = [", payload.len()));
                    ctx.push_indent();
                    for row in byte_rows(payload, opts.row_width) {
                        ctx.line(row);
                    }
                    ctx.pop_indent();
                    ctx.line("];");
                }
                ("File", "data", "entries")
            }
        };

        ctx.line(format!("pub(super) static ENTRY_{i}: Resource = Resource {{"));
        ctx.push_indent();
        ctx.line(format!("kind: ResourceType::{kind},"));
        ctx.line(format!("path: ENTRY_{i}_PATH,"));
        ctx.line(format!("basename_offset: {},", node.basename_offset()));
        ctx.line(format!("size: {},", node.size()));
        if node.size() == 0 {
            ctx.line(format!("{filled}: &[],"));
        } else {
            ctx.line(format!("{filled}: &ENTRY_{i}_{},", filled.to_uppercase()));
        }
        ctx.line(format!("{unused}: &[],"));
        ctx.pop_indent();
        ctx.line("};");
        ctx.blank();
    }

    fn emit_root_accessor(&self, root: &ResourceNode, opts: &EmitOptions, ctx: &mut EmitContext) {
        ctx.pop_indent();
        ctx.line("}");
        ctx.blank();
        ctx.line(format!("#[cfg(feature = \"{}\")]", opts.guard));
        ctx.line("pub fn get_root() -> Option<&'static Resource> {");
        ctx.push_indent();
        ctx.line(format!("Some(&data::ENTRY_{})", root.index));
        ctx.pop_indent();
        ctx.line("}");
    }

    fn end_data(&self, _opts: &EmitOptions, ctx: &mut EmitContext) {
        ctx.pop_indent();
        ctx.line("}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::IndentStyle;
    use pretty_assertions::assert_eq;
    use rescomp_tree::NodeIndex;
    use std::path::PathBuf;

    fn render(node: &ResourceNode) -> String {
        let mut ctx = EmitContext::new(IndentStyle::Spaces(4));
        RustEmitter.emit_node(node, &EmitOptions::default(), &mut ctx);
        ctx.finish()
    }

    #[test]
    fn test_file_node() {
        let node = ResourceNode::file(NodeIndex(1), "b/c.txt".into(), PathBuf::from("b/c.txt"), b"hi".to_vec());
        assert_eq!(
            render(&node),
            "const ENTRY_1_PATH: &str = \"b/c.txt\";\n\
             static ENTRY_1_DATA: [u8; 2] = [\n\
             \x20   104, 105,\n\
             ];\n\
             pub(super) static ENTRY_1: Resource = Resource {\n\
             \x20   kind: ResourceType::File,\n\
             \x20   path: ENTRY_1_PATH,\n\
             \x20   basename_offset: 2,\n\
             \x20   size: 2,\n\
             \x20   data: &ENTRY_1_DATA,\n\
             \x20   entries: &[],\n\
             };\n\n"
        );
    }

    #[test]
    fn test_directory_node() {
        let node = ResourceNode::directory(
            NodeIndex(2),
            "b".into(),
            PathBuf::from("b"),
            vec![NodeIndex(0), NodeIndex(1)],
        );
        let out = render(&node);
        assert!(out.contains("static ENTRY_2_ENTRIES: [&Resource; 2] = [\n    &ENTRY_0,\n    &ENTRY_1,\n];\n"));
        assert!(out.contains("entries: &ENTRY_2_ENTRIES,"));
        assert!(out.contains("data: &[],"));
    }

    #[test]
    fn test_empty_nodes_use_empty_slices() {
        let dir = ResourceNode::directory(NodeIndex(0), "e".into(), PathBuf::from("e"), Vec::new());
        let out = render(&dir);
        assert!(!out.contains("ENTRY_0_ENTRIES"));
        assert!(out.contains("size: 0,\n    entries: &[],\n    data: &[],\n"));

        let file = ResourceNode::file(NodeIndex(1), "f".into(), PathBuf::from("f"), Vec::new());
        let out = render(&file);
        assert!(!out.contains("ENTRY_1_DATA"));
        assert!(out.contains("size: 0,\n    data: &[],\n    entries: &[],\n"));
    }
}
