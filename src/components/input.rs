use crate::models::GenerationInput;

/// Owns the book and character text fields.
#[derive(Debug, Default)]
pub struct InputCollector {
    input: GenerationInput,
}

impl InputCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_book(&mut self, text: &str) {
        self.input.book = text.to_string();
    }

    pub fn set_character(&mut self, text: &str) {
        self.input.character = text.to_string();
    }

    pub fn input(&self) -> &GenerationInput {
        &self.input
    }

    pub fn can_submit(&self) -> bool {
        self.input.is_complete()
    }

    /// A copy of the current input, or `None` while either field is blank.
    pub fn submit(&self) -> Option<GenerationInput> {
        if !self.can_submit() {
            tracing::debug!("Submit ignored: book and character are both required");
            return None;
        }
        Some(self.input.clone())
    }
}
