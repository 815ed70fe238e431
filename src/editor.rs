use runner_core::languages;

/// The editing surface a session reads source text from
pub trait Editor {
    fn value(&self) -> String;
    fn set_value(&mut self, source: String);
    /// Switch syntax highlighting; ids without a mode fall back to javascript
    fn set_mode(&mut self, language_id: &str);
}

/// Plain in-memory editor
#[derive(Debug, Clone)]
pub struct SourceBuffer {
    text: String,
    mode: &'static str,
}

impl SourceBuffer {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            mode: languages::editor_mode(""),
        }
    }

    pub fn mode(&self) -> &'static str {
        self.mode
    }
}

impl Default for SourceBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Editor for SourceBuffer {
    fn value(&self) -> String {
        self.text.clone()
    }

    fn set_value(&mut self, source: String) {
        self.text = source;
    }

    fn set_mode(&mut self, language_id: &str) {
        self.mode = languages::editor_mode(language_id);
    }
}
