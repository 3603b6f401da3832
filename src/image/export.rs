use super::{decode_portrait, ImageService};
use crate::{Error, Result};
use ::image::ImageFormat;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes decoded portraits into one output directory as PNG files.
pub struct PortraitExporter {
    output_dir: PathBuf,
}

impl PortraitExporter {
    pub fn new(output_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(output_dir)?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
        })
    }

    fn save_png_sync(bytes: Vec<u8>, path: PathBuf) -> Result<()> {
        // Re-encode so whatever the service sent ends up as a valid PNG.
        let image = ::image::load_from_memory(&bytes)?;
        image.save_with_format(path, ImageFormat::Png)?;
        Ok(())
    }

    async fn save_png(&self, bytes: Vec<u8>, path: &Path) -> Result<()> {
        tokio::task::spawn_blocking({
            let path = path.to_path_buf();
            move || Self::save_png_sync(bytes, path)
        })
        .await
        .map_err(|e| Error::Generic(format!("Image export task join error: {}", e)))?
    }
}

#[async_trait]
impl ImageService for PortraitExporter {
    async fn export_portraits(
        &self,
        portraits: &[String],
        base_name: &str,
    ) -> Result<Vec<PathBuf>> {
        let mut paths = Vec::with_capacity(portraits.len());

        for (index, payload) in portraits.iter().enumerate() {
            let decoded = decode_portrait(payload)?;

            let filename = format!("{}_{}_{}.png", base_name, index + 1, Uuid::new_v4());
            let path = self.output_dir.join(filename);

            self.save_png(decoded.bytes, &path).await?;
            tracing::info!("Saved portrait {} to {}", index + 1, path.display());
            paths.push(path);
        }

        Ok(paths)
    }
}
