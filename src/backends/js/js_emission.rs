//! Emission Assembler
//!
//! Lowering produces ordered lines tagged with a nesting depth.
//! Assembly only applies the indentation step and joins them; nothing else is rewritten.

const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsLine {
    pub depth: usize,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JsLines {
    lines: Vec<JsLine>,
}

impl JsLines {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(text: impl Into<String>) -> Self {
        let mut lines = Self::new();
        lines.line(text);
        lines
    }

    pub fn line(&mut self, text: impl Into<String>) {
        self.lines.push(JsLine {
            depth: 0,
            text: text.into(),
        });
    }

    /// Appends a block one level deeper than the current lines.
    pub fn nested(&mut self, block: JsLines) {
        self.lines
            .extend(block.lines.into_iter().map(|line| JsLine {
                depth: line.depth + 1,
                text: line.text,
            }));
    }

    pub fn extend(&mut self, other: JsLines) {
        self.lines.extend(other.lines);
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &JsLine> {
        self.lines.iter()
    }

    /// Collapses the block onto one line so it can be embedded in an expression.
    pub fn into_single_line(self) -> String {
        self.lines
            .into_iter()
            .map(|line| line.text)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Joins lines with newlines. Pretty output indents each line by its depth;
/// blank lines never carry indentation.
pub fn assemble(lines: &JsLines, pretty: bool) -> String {
    let mut out = String::new();

    for (index, line) in lines.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }

        if pretty && !line.text.is_empty() {
            for _ in 0..line.depth {
                out.push_str(INDENT);
            }
        }

        out.push_str(&line.text);
    }

    out
}
