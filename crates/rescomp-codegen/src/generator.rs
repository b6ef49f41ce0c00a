use rescomp_tree::{ResourceNode, ResourceTree};

use crate::context::EmitContext;
use crate::emitters;
use crate::error::CodegenError;
use crate::options::EmitOptions;
use crate::traits::TargetEmitter;

/// Renders a post-order node sequence into a single artifact, in one pass.
pub struct CodeGenerator {
    emitter: Box<dyn TargetEmitter>,
    options: EmitOptions,
}

impl std::fmt::Debug for CodeGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodeGenerator")
            .field("target", &self.emitter.target())
            .field("options", &self.options)
            .finish()
    }
}

impl CodeGenerator {
    /// Create a generator for the target named in `options`.
    pub fn new(options: EmitOptions) -> Result<Self, CodegenError> {
        options.validate()?;
        let emitter = emitters::create_emitter(options.target);
        Ok(Self { emitter, options })
    }

    /// Render a whole tree.
    pub fn generate(&self, tree: &ResourceTree) -> Result<String, CodegenError> {
        self.render(tree.iter())
    }

    /// Render nodes given in emission order.
    ///
    /// The sequence must be indexed `0..n` in order, reference only children
    /// already rendered, and end with the root. Nothing is returned unless the
    /// whole sequence was rendered.
    pub fn render<'a, I>(&self, nodes: I) -> Result<String, CodegenError>
    where
        I: IntoIterator<Item = &'a ResourceNode>,
    {
        let opts = &self.options;
        let mut ctx = EmitContext::new(self.emitter.indent_style());

        self.emitter.emit_preamble(opts, &mut ctx);
        self.emitter.begin_data(opts, &mut ctx);

        let mut last: Option<&ResourceNode> = None;
        for (expected, node) in nodes.into_iter().enumerate() {
            if node.index.get() != expected {
                return Err(CodegenError::OutOfOrder {
                    path: node.path.clone(),
                    expected,
                    found: node.index.get(),
                });
            }
            if let Some(child) = node.children().iter().find(|c| c.get() >= expected) {
                return Err(CodegenError::ForwardReference {
                    path: node.path.clone(),
                    child: child.get(),
                });
            }
            self.emitter.emit_node(node, opts, &mut ctx);
            last = Some(node);
        }

        let root = match last {
            Some(node) if node.is_root() => node,
            _ => return Err(CodegenError::MissingRoot),
        };
        self.emitter.emit_root_accessor(root, opts, &mut ctx);
        self.emitter.end_data(opts, &mut ctx);

        Ok(ctx.finish())
    }

    /// Access the target emitter.
    pub fn emitter(&self) -> &dyn TargetEmitter {
        self.emitter.as_ref()
    }

    pub fn options(&self) -> &EmitOptions {
        &self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::Target;
    use rescomp_tree::NodeIndex;
    use std::path::PathBuf;

    fn file(i: usize, path: &str) -> ResourceNode {
        ResourceNode::file(NodeIndex(i), path.into(), PathBuf::from(path), b"x".to_vec())
    }

    #[test]
    fn test_invalid_options_rejected() {
        let result = CodeGenerator::new(EmitOptions {
            namespace: "1abc".into(),
            ..EmitOptions::default()
        });
        assert!(matches!(result, Err(CodegenError::InvalidIdentifier { .. })));
    }

    #[test]
    fn test_target_selection() {
        let gen = CodeGenerator::new(EmitOptions {
            target: Target::Rust,
            ..EmitOptions::default()
        })
        .unwrap();
        assert_eq!(gen.emitter().target(), Target::Rust);
    }

    #[test]
    fn test_out_of_order_rejected() {
        let gen = CodeGenerator::new(EmitOptions::default()).unwrap();
        let nodes = [file(1, "a"), ResourceNode::root(NodeIndex(0), PathBuf::from("."), vec![])];
        let err = gen.render(nodes.iter()).unwrap_err();
        assert!(matches!(err, CodegenError::OutOfOrder { expected: 0, found: 1, .. }));
    }

    #[test]
    fn test_forward_reference_rejected() {
        let gen = CodeGenerator::new(EmitOptions::default()).unwrap();
        let nodes = [
            ResourceNode::directory(NodeIndex(0), "b".into(), PathBuf::from("b"), vec![NodeIndex(1)]),
            file(1, "b/c"),
        ];
        let err = gen.render(nodes.iter()).unwrap_err();
        assert!(matches!(err, CodegenError::ForwardReference { child: 1, .. }));
    }

    #[test]
    fn test_missing_root_rejected() {
        let gen = CodeGenerator::new(EmitOptions::default()).unwrap();
        let nodes = [file(0, "a")];
        assert!(matches!(gen.render(nodes.iter()), Err(CodegenError::MissingRoot)));
        assert!(matches!(gen.render(std::iter::empty()), Err(CodegenError::MissingRoot)));
    }
}
