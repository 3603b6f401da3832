//! Data models and structures
//!
//! Defines the user input, the image-generation request body, the fixed
//! generation parameters and the environment-driven configuration.

use crate::{prompts, Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The (book, character) pair typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationInput {
    pub book: String,
    pub character: String,
}

impl GenerationInput {
    pub fn new(book: impl Into<String>, character: impl Into<String>) -> Self {
        Self {
            book: book.into(),
            character: character.into(),
        }
    }

    /// Both fields must contain something other than whitespace.
    pub fn is_complete(&self) -> bool {
        !self.book.trim().is_empty() && !self.character.trim().is_empty()
    }
}

/// Per-deployment knobs sent alongside every portrait prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationParams {
    pub samples: u32,
    pub steps: u32,
    pub batch_size: u32,
}

impl GenerationParams {
    pub const DEFAULT_SAMPLES: u32 = 1;
    pub const DEFAULT_STEPS: u32 = 50;
    pub const DEFAULT_BATCH_SIZE: u32 = 1;
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            samples: Self::DEFAULT_SAMPLES,
            steps: Self::DEFAULT_STEPS,
            batch_size: Self::DEFAULT_BATCH_SIZE,
        }
    }
}

/// Body of the image-generation POST.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortraitRequest {
    pub prompt: String,
    #[serde(rename = "samples")]
    pub sample_count: u32,
    pub steps: u32,
    pub batch_size: u32,
}

impl PortraitRequest {
    pub fn new(prompt: String, params: GenerationParams) -> Self {
        Self {
            prompt,
            sample_count: params.samples,
            steps: params.steps,
            batch_size: params.batch_size,
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub description_url: String,
    pub portrait_url: String,
    pub params: GenerationParams,
    pub portrait_template: String,
    pub request_timeout: Option<Duration>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("{} not set", key)))
        };
        let count = |key: &str, default: u32| -> Result<u32> {
            match lookup(key) {
                None => Ok(default),
                Some(raw) => match raw.trim().parse::<u32>() {
                    Ok(0) | Err(_) => Err(Error::Config(format!(
                        "{} must be a positive integer, got '{}'",
                        key, raw
                    ))),
                    Ok(value) => Ok(value),
                },
            }
        };

        let portrait_template =
            lookup("PORTRAIT_TEMPLATE").unwrap_or_else(|| prompts::PORTRAIT_TEMPLATE.to_string());
        prompts::validate_portrait_template(&portrait_template)?;

        let request_timeout = match lookup("REQUEST_TIMEOUT_SECS") {
            None => None,
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    Error::Config(format!("REQUEST_TIMEOUT_SECS is not a number: '{}'", raw))
                })?;
                Some(Duration::from_secs(secs))
            }
        };

        Ok(Self {
            description_url: required("DESCRIPTION_ENDPOINT_URL")?,
            portrait_url: required("PORTRAIT_ENDPOINT_URL")?,
            params: GenerationParams {
                samples: count("PORTRAIT_SAMPLES", GenerationParams::DEFAULT_SAMPLES)?,
                steps: count("PORTRAIT_STEPS", GenerationParams::DEFAULT_STEPS)?,
                batch_size: count("PORTRAIT_BATCH_SIZE", GenerationParams::DEFAULT_BATCH_SIZE)?,
            },
            portrait_template,
            request_timeout,
        })
    }
}
