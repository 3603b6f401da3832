use super::PendingCall;
use crate::ai::{DescriptionService, RemoteCall};
use crate::lifecycle::{Lifecycle, Stage, Ticket};
use crate::models::GenerationInput;
use crate::Result;
use std::sync::Arc;

/// First stage: turns a (book, character) pair into a description.
pub struct PromptGenerator {
    service: Arc<dyn DescriptionService>,
    stage: Stage<String>,
    last_input: Option<GenerationInput>,
}

impl PromptGenerator {
    pub fn new(service: Arc<dyn DescriptionService>) -> Self {
        Self {
            service,
            stage: Stage::new("description"),
            last_input: None,
        }
    }

    pub fn state(&self) -> &Lifecycle<String> {
        self.stage.state()
    }

    /// Input of the most recent request.
    pub fn last_input(&self) -> Option<&GenerationInput> {
        self.last_input.as_ref()
    }

    /// Start a description request. Returns `None` while one is in flight.
    pub fn generate(&mut self, input: GenerationInput) -> Option<PendingCall<String>> {
        let ticket = self.stage.begin()?;
        tracing::info!(
            "Requesting description of '{}' from '{}'",
            input.character,
            input.book
        );
        self.last_input = Some(input.clone());

        let service = Arc::clone(&self.service);
        let call: RemoteCall<String> = Box::pin(async move { service.describe(&input).await });
        Some(PendingCall { ticket, call })
    }

    /// Re-issue the last request after a failure.
    pub fn retry(&mut self) -> Option<PendingCall<String>> {
        if !self.stage.state().is_error() {
            return None;
        }
        let input = self.last_input.clone()?;
        self.generate(input)
    }

    /// Apply the outcome of `ticket`. On an accepted success the description
    /// is returned so the editor can be reseeded.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<String>) -> Option<String> {
        if !self.stage.finish(ticket, outcome) {
            return None;
        }
        self.stage.state().success().cloned()
    }
}
