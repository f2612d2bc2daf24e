/// Represents an open document in the LSP server
#[derive(Clone, Debug)]
pub struct Document {
    /// The current text content of the document
    text: String,
    /// Lines of the document (cached for position calculations)
    lines: Vec<String>,
    /// Version supplied by the editor
    version: i32,
}

impl Document {
    pub fn new(text: String, version: i32) -> Self {
        Self {
            lines: split_lines(&text),
            text,
            version,
        }
    }

    pub fn update_text(&mut self, new_text: String, version: i32) {
        self.lines = split_lines(&new_text);
        self.text = new_text;
        self.version = version;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    /// Text of `line` up to (not including) `character`
    pub fn line_prefix(&self, line: u32, character: u32) -> Option<String> {
        let line_text = self.lines.get(line as usize)?;
        Some(line_text.chars().take(character as usize).collect())
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines().map(|s| s.to_string()).collect()
}
