/// Tracks state during emission: indentation and the output buffer.
#[derive(Debug, Clone)]
pub struct EmitContext {
    /// Current indentation level
    indent_level: usize,
    /// Characters per indent (e.g., 4 spaces)
    indent_width: usize,
    /// Whether to use tabs
    use_tabs: bool,
    /// Rendered text so far
    out: String,
}

/// Indentation style configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndentStyle {
    Spaces(usize),
    Tabs,
}

impl EmitContext {
    pub fn new(style: IndentStyle) -> Self {
        let (use_tabs, indent_width) = match style {
            IndentStyle::Spaces(n) => (false, n),
            IndentStyle::Tabs => (true, 1),
        };
        Self {
            indent_level: 0,
            indent_width,
            use_tabs,
            out: String::new(),
        }
    }

    /// Get the current indentation string.
    pub fn indent(&self) -> String {
        let unit = if self.use_tabs { "\t" } else { " " };
        unit.repeat(self.indent_level * self.indent_width)
    }

    /// Increase indentation by one level.
    pub fn push_indent(&mut self) {
        self.indent_level += 1;
    }

    /// Decrease indentation by one level.
    pub fn pop_indent(&mut self) {
        self.indent_level = self.indent_level.saturating_sub(1);
    }

    /// Append one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            let indent = self.indent();
            self.out.push_str(&indent);
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Consume the context and return the rendered text.
    pub fn finish(self) -> String {
        self.out
    }
}
