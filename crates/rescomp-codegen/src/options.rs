use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodegenError;

pub const DEFAULT_NAMESPACE: &str = "resources";
pub const DEFAULT_CPP_GUARD: &str = "COMPILE_RESOURCES";
pub const DEFAULT_RUST_GUARD: &str = "compile-resources";
pub const DEFAULT_ROW_WIDTH: usize = 16;

/// Language of the emitted artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    #[default]
    Cpp,
    Rust,
}

impl FromStr for Target {
    type Err = CodegenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cpp" | "c++" => Ok(Target::Cpp),
            "rust" | "rs" => Ok(Target::Rust),
            other => Err(CodegenError::UnsupportedTarget(other.to_string())),
        }
    }
}

impl Target {
    /// Guard used when none is configured: a macro for C++, a cargo feature for Rust.
    pub fn default_guard(self) -> &'static str {
        match self {
            Target::Cpp => DEFAULT_CPP_GUARD,
            Target::Rust => DEFAULT_RUST_GUARD,
        }
    }

    fn is_keyword(self, name: &str) -> bool {
        match self {
            Target::Cpp => CPP_KEYWORDS.contains(&name),
            Target::Rust => RUST_KEYWORDS.contains(&name),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Cpp => write!(f, "cpp"),
            Target::Rust => write!(f, "rust"),
        }
    }
}

/// Knobs of the emitted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    pub target: Target,
    /// C++ namespace or Rust module wrapping everything
    pub namespace: String,
    /// Preprocessor macro (C++) or cargo feature (Rust) gating the data section
    pub guard: String,
    /// Payload bytes per output row
    pub row_width: usize,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self::for_target(Target::default())
    }
}

impl EmitOptions {
    /// Defaults for `target`, including its guard.
    pub fn for_target(target: Target) -> Self {
        Self {
            target,
            namespace: DEFAULT_NAMESPACE.to_string(),
            guard: target.default_guard().to_string(),
            row_width: DEFAULT_ROW_WIDTH,
        }
    }

    pub fn validate(&self) -> Result<(), CodegenError> {
        if !is_identifier(&self.namespace) || self.target.is_keyword(&self.namespace) {
            return Err(CodegenError::InvalidIdentifier {
                what: "namespace",
                value: self.namespace.clone(),
            });
        }
        let guard_ok = match self.target {
            Target::Cpp => is_identifier(&self.guard) && !self.target.is_keyword(&self.guard),
            // cargo feature names may contain `-`
            Target::Rust => {
                !self.guard.is_empty()
                    && !self.guard.contains('"')
                    && !self.guard.contains('\\')
            }
        };
        if !guard_ok {
            return Err(CodegenError::InvalidIdentifier {
                what: "guard",
                value: self.guard.clone(),
            });
        }
        if self.row_width == 0 {
            return Err(CodegenError::InvalidRowWidth);
        }
        Ok(())
    }
}

/// C++17 keywords and alternative operator spellings.
const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char16_t", "char32_t", "class", "compl", "const", "const_cast",
    "constexpr", "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "return", "short", "signed", "sizeof", "static", "static_assert",
    "static_cast", "struct", "switch", "template", "this", "thread_local", "throw", "true",
    "try", "typedef", "typeid", "typename", "union", "unsigned", "using", "virtual", "void",
    "volatile", "wchar_t", "while", "xor", "xor_eq",
];

/// Strict and reserved Rust keywords, plus `_`.
const RUST_KEYWORDS: &[&str] = &[
    "_", "Self", "abstract", "as", "async", "await", "become", "box", "break", "const",
    "continue", "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for",
    "gen", "if", "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut",
    "override", "priv", "pub", "ref", "return", "self", "static", "struct", "super", "trait",
    "true", "try", "type", "typeof", "unsafe", "unsized", "use", "virtual", "where", "while",
    "yield",
];

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
