use super::PendingCall;
use crate::ai::{PortraitService, RemoteCall};
use crate::lifecycle::{Lifecycle, Stage, Ticket};
use crate::models::{GenerationParams, PortraitRequest};
use crate::{prompts, Result};
use std::sync::Arc;

/// Second stage: paints portraits from the edited description.
pub struct PortraitGenerator {
    service: Arc<dyn PortraitService>,
    params: GenerationParams,
    template: String,
    stage: Stage<Vec<String>>,
    last_request: Option<PortraitRequest>,
}

impl PortraitGenerator {
    pub fn new(service: Arc<dyn PortraitService>) -> Self {
        Self {
            service,
            params: GenerationParams::default(),
            template: prompts::PORTRAIT_TEMPLATE.to_string(),
            stage: Stage::new("portrait"),
            last_request: None,
        }
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_template(mut self, template: String) -> Self {
        self.template = template;
        self
    }

    pub fn state(&self) -> &Lifecycle<Vec<String>> {
        self.stage.state()
    }

    /// Images from the last successful request, in service order.
    pub fn images(&self) -> &[String] {
        self.stage.state().success().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Request body for `draft`, or `None` when the draft is blank.
    pub fn build_request(&self, draft: &str) -> Option<PortraitRequest> {
        if draft.trim().is_empty() {
            return None;
        }
        let prompt = prompts::portrait_prompt(&self.template, draft);
        Some(PortraitRequest::new(prompt, self.params))
    }

    /// Start an image request. Returns `None` for a blank draft or while a
    /// request is in flight.
    pub fn generate(&mut self, draft: &str) -> Option<PendingCall<Vec<String>>> {
        let Some(request) = self.build_request(draft) else {
            tracing::debug!("Portrait request ignored: draft is empty");
            return None;
        };
        self.issue(request)
    }

    /// Re-issue the last request after a failure.
    pub fn retry(&mut self) -> Option<PendingCall<Vec<String>>> {
        if !self.stage.state().is_error() {
            return None;
        }
        let request = self.last_request.clone()?;
        self.issue(request)
    }

    fn issue(&mut self, request: PortraitRequest) -> Option<PendingCall<Vec<String>>> {
        let ticket = self.stage.begin()?;
        tracing::info!("Requesting portraits for prompt: {}", request.prompt);
        self.last_request = Some(request.clone());

        let service = Arc::clone(&self.service);
        let call: RemoteCall<Vec<String>> =
            Box::pin(async move { service.generate_portraits(&request).await });
        Some(PendingCall { ticket, call })
    }

    /// Drop the current portraits and orphan any request still in flight.
    pub fn discard(&mut self) {
        if let Some(ticket) = self.stage.in_flight() {
            tracing::info!("Discarding portrait request {} for an outdated draft", ticket.id());
        }
        self.stage.reset();
        self.last_request = None;
    }

    /// Apply the outcome of `ticket`; `false` if it was stale.
    pub fn complete(&mut self, ticket: Ticket, outcome: Result<Vec<String>>) -> bool {
        self.stage.finish(ticket, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockPortraitClient;
    use pretty_assertions::assert_eq;

    fn generator(mock: &MockPortraitClient) -> PortraitGenerator {
        PortraitGenerator::new(Arc::new(mock.clone()))
    }

    #[test]
    fn test_build_request_wraps_draft_in_template() {
        let portrait = generator(&MockPortraitClient::new());
        let request = portrait.build_request("tall, stern, grey eyes").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "prompt": "Portrait of tall, stern, grey eyes, by Greg Rutkowski, digital painting",
                "samples": 1,
                "steps": 50,
                "batch_size": 1
            })
        );
    }

    #[test]
    fn test_blank_draft_is_a_no_op() {
        let mock = MockPortraitClient::new();
        let mut portrait = generator(&mock);
        assert!(portrait.generate("   ").is_none());
        assert!(portrait.state().is_idle());
        assert_eq!(mock.get_call_count(), 0);
    }

    #[test]
    fn test_configured_params_and_template() {
        let portrait = generator(&MockPortraitClient::new())
            .with_params(GenerationParams {
                batch_size: 3,
                ..GenerationParams::default()
            })
            .with_template("{{description}}, oil on canvas".to_string());
        let request = portrait.build_request("a pale knight").unwrap();
        assert_eq!(request.prompt, "a pale knight, oil on canvas");
        assert_eq!(request.batch_size, 3);
    }

    #[tokio::test]
    async fn test_generate_fans_out_images_in_order() {
        let mock = MockPortraitClient::new().with_images(vec![
            "a".to_string(),
            "b".to_string(),
            "c".to_string(),
        ]);
        let mut portrait = generator(&mock);

        let pending = portrait.generate("tall, stern, grey eyes").unwrap();
        assert!(portrait.state().is_loading());
        assert!(portrait.generate("something else").is_none());

        let outcome = pending.call.await;
        assert!(portrait.complete(pending.ticket, outcome));
        assert_eq!(portrait.images(), ["a", "b", "c"]);
        assert_eq!(mock.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_failure_is_error_not_loading() {
        let mock = MockPortraitClient::new().with_failure("status 503");
        let mut portrait = generator(&mock);

        let pending = portrait.generate("grey eyes").unwrap();
        let outcome = pending.call.await;
        portrait.complete(pending.ticket, outcome);

        assert!(portrait.state().is_error());
        assert!(portrait.images().is_empty());

        let retry = portrait.retry().unwrap();
        assert!(portrait.state().is_loading());
        let outcome = retry.call.await;
        portrait.complete(retry.ticket, outcome);
        assert_eq!(mock.get_requests()[0], mock.get_requests()[1]);
    }

    #[tokio::test]
    async fn test_discard_drops_in_flight_completion() {
        let mock = MockPortraitClient::new().with_images(vec!["old".to_string()]);
        let mut portrait = generator(&mock);

        let pending = portrait.generate("first draft").unwrap();
        portrait.discard();
        assert!(portrait.state().is_idle());

        let outcome = pending.call.await;
        assert!(!portrait.complete(pending.ticket, outcome));
        assert!(portrait.state().is_idle());
        assert!(portrait.images().is_empty());
        assert!(portrait.retry().is_none());
    }
}
