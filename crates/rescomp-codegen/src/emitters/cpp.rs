use rescomp_tree::{NodeKind, ResourceNode};

use crate::context::EmitContext;
use crate::escape::{byte_rows, cpp_string_literal};
use crate::options::{EmitOptions, Target};
use crate::traits::TargetEmitter;

/// C++17 emitter: one `entry_<index>` aggregate per node inside a namespace,
/// with the data section behind `#if defined(<guard>)`.
pub struct CppEmitter;

impl TargetEmitter for CppEmitter {
    fn target(&self) -> Target {
        Target::Cpp
    }

    fn emit_preamble(&self, opts: &EmitOptions, ctx: &mut EmitContext) {
        ctx.line("// Generated by resource_compiler. Do not edit.");
        ctx.line("#include <stddef.h>");
        ctx.blank();
        ctx.line(format!("namespace {} {{", opts.namespace));
        ctx.blank();

        block(ctx, "enum class ResourceType {", "};", &["DIRECTORY_RESOURCE,", "FILE_RESOURCE"]);
        ctx.blank();
        block(
            ctx,
            "struct BaseResource {",
            "};",
            &[
                "ResourceType type;",
                "char const *path;",
                "char const *basename;",
                "size_t size;",
            ],
        );
        ctx.blank();
        block(
            ctx,
            "struct DirectoryResource : BaseResource {",
            "};",
            &["BaseResource const *const *entries;"],
        );
        ctx.blank();
        block(
            ctx,
            "struct FileResource : BaseResource {",
            "};",
            &["unsigned char const *data;"],
        );
        ctx.blank();
        ctx.line("BaseResource const *get_root() noexcept;");
        ctx.blank();
        ctx.line(format!("}} // namespace {}", opts.namespace));
        ctx.blank();
    }

    fn begin_data(&self, opts: &EmitOptions, ctx: &mut EmitContext) {
        ctx.line(format!("#if defined({})", opts.guard));
        ctx.blank();
        ctx.line(format!("namespace {} {{", opts.namespace));
        ctx.blank();
    }

    fn emit_node(&self, node: &ResourceNode, opts: &EmitOptions, ctx: &mut EmitContext) {
        let i = node.index;
        ctx.line(format!(
            "static char const entry_{i}_path[] = {};",
            cpp_string_literal(&node.path)
        ));

        let (struct_name, type_tag) = match &node.kind {
            NodeKind::Directory { children } => {
                if !children.is_empty() {
                    let refs: Vec<String> =
                        children.iter().map(|c| format!("&entry_{c},")).collect();
                    block_owned(
                        ctx,
                        format!("static BaseResource const *const entry_{i}_data[] = {{"),
                        &refs,
                    );
                }
                ("DirectoryResource", "DIRECTORY_RESOURCE")
            }
            NodeKind::File { payload } => {
                if !payload.is_empty() {
                    block_owned(
                        ctx,
                        format!("static unsigned char const entry_{i}_data[] = {{"),
                        &byte_rows(payload, opts.row_width),
                    );
                }
                ("FileResource", "FILE_RESOURCE")
            }
        };

        let (size, data) = match (&node.kind, node.size()) {
            (_, 0) => ("0,".to_string(), "nullptr,".to_string()),
            (NodeKind::Directory { .. }, _) => (
                format!("sizeof(entry_{i}_data) / sizeof(entry_{i}_data[0]),"),
                format!("&entry_{i}_data[0],"),
            ),
            (NodeKind::File { .. }, _) => (
                format!("sizeof(entry_{i}_data),"),
                format!("&entry_{i}_data[0],"),
            ),
        };

        block_owned(
            ctx,
            format!("static {struct_name} const entry_{i} = {{"),
            &[
                format!("ResourceType::{type_tag},"),
                format!("&entry_{i}_path[0],"),
                format!("&entry_{i}_path[{}],", node.basename_offset()),
                size,
                data,
            ],
        );
        ctx.blank();
    }

    fn emit_root_accessor(&self, root: &ResourceNode, _opts: &EmitOptions, ctx: &mut EmitContext) {
        ctx.line("BaseResource const *get_root() noexcept");
        ctx.line("{");
        ctx.push_indent();
        ctx.line(format!("return &entry_{};", root.index));
        ctx.pop_indent();
        ctx.line("}");
        ctx.blank();
    }

    fn end_data(&self, opts: &EmitOptions, ctx: &mut EmitContext) {
        ctx.line(format!("}} // namespace {}", opts.namespace));
        ctx.blank();
        ctx.line(format!("#endif // defined({})", opts.guard));
    }
}

fn block(ctx: &mut EmitContext, open: &str, close: &str, body: &[&str]) {
    ctx.line(open);
    ctx.push_indent();
    for line in body {
        ctx.line(line);
    }
    ctx.pop_indent();
    ctx.line(close);
}

/// `open`, indented `body`, then `};`.
fn block_owned(ctx: &mut EmitContext, open: String, body: &[String]) {
    ctx.line(open);
    ctx.push_indent();
    for line in body {
        ctx.line(line);
    }
    ctx.pop_indent();
    ctx.line("};");
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
        CppEmitter.emit_node(node, &EmitOptions::default(), &mut ctx);
        ctx.finish()
    }

    #[test]
    fn test_file_node() {
        let node = ResourceNode::file(NodeIndex(1), "b/c.txt".into(), PathBuf::from("b/c.txt"), b"hi".to_vec());
        assert_eq!(
            render(&node),
            "static char const entry_1_path[] = \"b/c.txt\";\n\
             static unsigned char const entry_1_data[] = {\n\
             \x20   104, 105,\n\
             };\n\
             static FileResource const entry_1 = {\n\
             \x20   ResourceType::FILE_RESOURCE,\n\
             \x20   &entry_1_path[0],\n\
             \x20   &entry_1_path[2],\n\
             \x20   sizeof(entry_1_data),\n\
             \x20   &entry_1_data[0],\n\
             };\n\n"
        );
    }

    #[test]
    fn test_empty_file_has_null_payload() {
        let node = ResourceNode::file(NodeIndex(0), "empty".into(), PathBuf::from("empty"), Vec::new());
        let out = render(&node);
        assert!(!out.contains("entry_0_data"));
        assert!(out.contains("    0,\n    nullptr,\n"));
    }

    #[test]
    fn test_directory_node() {
        let node = ResourceNode::directory(NodeIndex(2), "b".into(), PathBuf::from("b"), vec![NodeIndex(1)]);
        let out = render(&node);
        assert!(out.contains("static BaseResource const *const entry_2_data[] = {\n    &entry_1,\n};\n"));
        assert!(out.contains("ResourceType::DIRECTORY_RESOURCE,"));
        assert!(out.contains("sizeof(entry_2_data) / sizeof(entry_2_data[0]),"));
    }

    #[test]
    fn test_empty_directory_has_null_children() {
        let node = ResourceNode::directory(NodeIndex(0), "e".into(), PathBuf::from("e"), Vec::new());
        let out = render(&node);
        assert!(!out.contains("entry_0_data"));
        assert!(out.contains("    0,\n    nullptr,\n"));
    }

    #[test]
    fn test_root_node_renders_slash() {
        let node = ResourceNode::root(NodeIndex(0), PathBuf::from("."), Vec::new());
        let out = render(&node);
        assert!(out.contains("static char const entry_0_path[] = \"/\";"));
        assert!(out.contains("&entry_0_path[0],\n    &entry_0_path[0],"));
    }
}
