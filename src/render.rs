//! Pure projection of session state into terminal panels
//!
//! Every lifecycle state maps to exactly one panel, so a failed request can
//! never leave a spinner on screen.

use crate::components::{InputCollector, PortraitGenerator, PromptEditor, PromptGenerator};
use crate::image::{decode_portrait, detect_image_mime};
use crate::lifecycle::Lifecycle;
use std::fmt;

const DATA_URI_PREVIEW: usize = 48;

/// Display data for one generated portrait.
#[derive(Debug, Clone, PartialEq)]
pub struct PortraitView {
    pub index: usize,
    pub mime: &'static str,
    pub byte_len: usize,
    pub dimensions: Option<(u32, u32)>,
    pub data_uri: String,
    pub valid: bool,
}

impl PortraitView {
    pub fn from_payload(index: usize, payload: &str) -> Self {
        match decode_portrait(payload) {
            Ok(decoded) => {
                let mime = decoded
                    .kind
                    .map(|kind| kind.mime())
                    .unwrap_or_else(|| detect_image_mime(&decoded.bytes));
                Self {
                    index,
                    mime,
                    byte_len: decoded.bytes.len(),
                    dimensions: decoded.dimensions,
                    data_uri: data_uri(mime, payload),
                    valid: decoded.dimensions.is_some(),
                }
            }
            Err(e) => {
                tracing::warn!("Portrait {} is not valid base64: {}", index, e);
                Self {
                    index,
                    mime: "image/png",
                    byte_len: 0,
                    dimensions: None,
                    data_uri: data_uri("image/png", payload),
                    valid: false,
                }
            }
        }
    }
}

fn data_uri(mime: &str, payload: &str) -> String {
    if payload.starts_with("data:") {
        payload.to_string()
    } else {
        format!("data:{};base64,{}", mime, payload)
    }
}

/// What one stage contributes to the screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Hidden,
    Spinner { label: &'static str },
    Description { draft: String, edited: bool },
    Portraits(Vec<PortraitView>),
    Failed { label: &'static str, cause: String },
}

impl Panel {
    pub fn is_spinner(&self) -> bool {
        matches!(self, Panel::Spinner { .. })
    }
}

pub fn render_description(state: &Lifecycle<String>, editor: &PromptEditor) -> Panel {
    match state {
        Lifecycle::Idle => Panel::Hidden,
        Lifecycle::Loading => Panel::Spinner {
            label: "description",
        },
        Lifecycle::Success(_) => Panel::Description {
            draft: editor.draft().to_string(),
            edited: editor.is_edited(),
        },
        Lifecycle::Error(err) => Panel::Failed {
            label: "description",
            cause: err.to_string(),
        },
    }
}

pub fn render_portraits(state: &Lifecycle<Vec<String>>) -> Panel {
    match state {
        Lifecycle::Idle => Panel::Hidden,
        Lifecycle::Loading => Panel::Spinner { label: "portraits" },
        Lifecycle::Success(images) => Panel::Portraits(
            images
                .iter()
                .enumerate()
                .map(|(i, payload)| PortraitView::from_payload(i + 1, payload))
                .collect(),
        ),
        Lifecycle::Error(err) => Panel::Failed {
            label: "portraits",
            cause: err.to_string(),
        },
    }
}

/// Whole-session view.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub book: String,
    pub character: String,
    pub can_submit: bool,
    pub description: Panel,
    pub portraits: Panel,
}

pub fn render(
    input: &InputCollector,
    prompt: &PromptGenerator,
    editor: &PromptEditor,
    portrait: &PortraitGenerator,
) -> Screen {
    Screen {
        book: input.input().book.clone(),
        character: input.input().character.clone(),
        can_submit: input.can_submit(),
        description: render_description(prompt.state(), editor),
        portraits: render_portraits(portrait.state()),
    }
}

impl fmt::Display for PortraitView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] ", self.index)?;
        if !self.valid {
            write!(f, "(unreadable image) ")?;
        }
        write!(f, "{}", self.mime)?;
        if let Some((width, height)) = self.dimensions {
            write!(f, " {}x{}", width, height)?;
        }
        write!(f, ", {:.1} KB", self.byte_len as f64 / 1024.0)?;

        let preview: String = self.data_uri.chars().take(DATA_URI_PREVIEW).collect();
        if preview.len() < self.data_uri.len() {
            write!(f, "  {}…", preview)
        } else {
            write!(f, "  {}", preview)
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Panel::Hidden => Ok(()),
            Panel::Spinner { label } => writeln!(f, "… generating {}", label),
            Panel::Description { draft, edited } => {
                let marker = if *edited { " (edited)" } else { "" };
                writeln!(f, "Character description{}:", marker)?;
                writeln!(f, "  {}", draft)
            }
            Panel::Portraits(views) if views.is_empty() => {
                writeln!(f, "The image service returned no portraits.")
            }
            Panel::Portraits(views) => {
                writeln!(f, "Portraits ({}):", views.len())?;
                for view in views {
                    writeln!(f, "  {}", view)?;
                }
                Ok(())
            }
            Panel::Failed { label, cause } => {
                writeln!(f, "✗ {} failed: {}", label, cause)?;
                writeln!(f, "  type `retry` to try again")
            }
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Book: {}", self.book)?;
        writeln!(f, "Character: {}", self.character)?;
        if !self.can_submit {
            writeln!(f, "(enter a book and a character to generate)")?;
        }
        write!(f, "{}", self.description)?;
        write!(f, "{}", self.portraits)
    }
}
