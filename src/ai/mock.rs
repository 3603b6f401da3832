use super::{DescriptionService, PortraitService};
use crate::error::Endpoint;
use crate::models::{GenerationInput, PortraitRequest};
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Scripted response for one mock call.
#[derive(Debug, Clone)]
enum Scripted<T> {
    Reply(T),
    Fail(String),
}

impl<T: Clone> Scripted<T> {
    fn resolve(&self, endpoint: Endpoint) -> Result<T> {
        match self {
            Scripted::Reply(value) => Ok(value.clone()),
            Scripted::Fail(reason) => Err(Error::remote(endpoint, reason.clone())),
        }
    }
}

#[derive(Clone)]
pub struct MockDescriptionClient {
    responses: Arc<Mutex<Vec<Scripted<String>>>>,
    requests: Arc<Mutex<Vec<GenerationInput>>>,
    delay: Option<Duration>,
}

impl MockDescriptionClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn with_description(self, description: String) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::Reply(description));
        self
    }

    pub fn with_failure(self, reason: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::Fail(reason.to_string()));
        self
    }

    /// Hold every call open for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<GenerationInput> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockDescriptionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DescriptionService for MockDescriptionClient {
    async fn describe(&self, input: &GenerationInput) -> Result<String> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(input.clone());
            requests.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // Default mock response
            Ok(format!("{} from {}, in plain clothes", input.character, input.book))
        } else {
            let index = (count - 1) % responses.len();
            responses[index].resolve(Endpoint::Description)
        }
    }
}

#[derive(Clone)]
pub struct MockPortraitClient {
    responses: Arc<Mutex<Vec<Scripted<Vec<String>>>>>,
    requests: Arc<Mutex<Vec<PortraitRequest>>>,
    delay: Option<Duration>,
}

impl MockPortraitClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    pub fn with_images(self, images: Vec<String>) -> Self {
        self.responses.lock().unwrap().push(Scripted::Reply(images));
        self
    }

    pub fn with_failure(self, reason: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::Fail(reason.to_string()));
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn get_requests(&self) -> Vec<PortraitRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockPortraitClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PortraitService for MockPortraitClient {
    async fn generate_portraits(&self, request: &PortraitRequest) -> Result<Vec<String>> {
        let count = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            // One tiny PNG per requested image
            let total = request.batch_size.saturating_mul(request.sample_count) as usize;
            Ok(vec![TINY_PNG_BASE64.to_string(); total])
        } else {
            let index = (count - 1) % responses.len();
            responses[index].resolve(Endpoint::Portrait)
        }
    }
}

/// A valid 1x1 PNG, base64-encoded.
pub const TINY_PNG_BASE64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";
