use super::ImageService;
use crate::Result;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Records export calls instead of touching the filesystem.
#[derive(Clone)]
pub struct MockPortraitExporter {
    exports: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    should_fail: Arc<Mutex<bool>>,
}

impl MockPortraitExporter {
    pub fn new() -> Self {
        Self {
            exports: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_failure(self, should_fail: bool) -> Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// `(base_name, payloads)` for every export call so far.
    pub fn get_exports(&self) -> Vec<(String, Vec<String>)> {
        self.exports.lock().unwrap().clone()
    }
}

impl Default for MockPortraitExporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageService for MockPortraitExporter {
    async fn export_portraits(
        &self,
        portraits: &[String],
        base_name: &str,
    ) -> Result<Vec<PathBuf>> {
        if *self.should_fail.lock().unwrap() {
            return Err(crate::Error::Io(std::io::Error::other("Mock failure")));
        }

        self.exports
            .lock()
            .unwrap()
            .push((base_name.to_string(), portraits.to_vec()));

        Ok((1..=portraits.len())
            .map(|index| PathBuf::from(format!("/tmp/{}_{}.png", base_name, index)))
            .collect())
    }
}
