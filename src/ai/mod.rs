//! Remote generation service integration
//!
//! Two opaque HTTP endpoints back the tool: a text-generation service that
//! describes a character, and an image-generation service that paints
//! portraits from a prompt. Each has a trait so the session can run against
//! the real HTTP clients or the in-memory mocks.

pub mod client;
pub mod description;
pub mod mock;
pub mod portrait;

pub use client::HttpEndpoint;
pub use description::{normalize_description, DescriptionClient};
pub use mock::{MockDescriptionClient, MockPortraitClient};
pub use portrait::{normalize_portraits, PortraitClient};

use crate::models::{GenerationInput, PortraitRequest};
use crate::Result;
use async_trait::async_trait;
use std::future::Future;
use std::pin::Pin;

/// A remote call that has been prepared but not yet awaited.
pub type RemoteCall<T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'static>>;

#[async_trait]
pub trait DescriptionService: Send + Sync {
    /// Ask the text-generation service to describe `input.character` from
    /// `input.book`.
    async fn describe(&self, input: &GenerationInput) -> Result<String>;
}

#[async_trait]
pub trait PortraitService: Send + Sync {
    /// Render portraits; always returns the canonical list of base64 payloads.
    async fn generate_portraits(&self, request: &PortraitRequest) -> Result<Vec<String>>;
}
