//! Character portrait generator
//!
//! Turns a (book, character) pair into painted portraits by chaining two
//! remote services: a text-generation endpoint that describes the character
//! and an image-generation endpoint that renders the edited description.

pub mod ai;
pub mod app;
pub mod components;
pub mod error;
pub mod image;
pub mod lifecycle;
pub mod models;
pub mod prompts;
pub mod render;

pub use error::{Error, Result};
