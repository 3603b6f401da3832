/// Holds the editable description draft between the two stages.
#[derive(Debug, Default)]
pub struct PromptEditor {
    draft: String,
    edited: bool,
}

impl PromptEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the draft with a fresh description. Unsent edits are lost.
    pub fn on_upstream_result(&mut self, text: &str) {
        if self.edited {
            tracing::info!("New description replaces edited draft");
        }
        self.draft = text.to_string();
        self.edited = false;
    }

    pub fn edit(&mut self, text: &str) {
        self.draft = text.to_string();
        self.edited = true;
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Whether the user changed the draft since it was last seeded.
    pub fn is_edited(&self) -> bool {
        self.edited
    }
}
