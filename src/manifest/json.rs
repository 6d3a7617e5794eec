use super::{ManifestWriter, DEFAULT_MANIFEST_FILE_NAME};
use crate::core::{Manifest, ScanError, ScanResult};
use anyhow::Context;
use async_trait::async_trait;
use std::path::PathBuf;

/// JSON配列としてディレクトリ直下に書き込む実装
#[derive(Debug, Clone)]
pub struct JsonManifestWriter {
    file_name: String,
    pretty: bool,
}

impl Default for JsonManifestWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonManifestWriter {
    pub fn new() -> Self {
        Self {
            file_name: DEFAULT_MANIFEST_FILE_NAME.to_string(),
            pretty: false,
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = file_name.into();
        self
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[async_trait]
impl ManifestWriter for JsonManifestWriter {
    async fn write(&self, manifest: &Manifest) -> ScanResult<PathBuf> {
        let output_path = manifest.directory().join(&self.file_name);

        let serialized = if self.pretty {
            serde_json::to_vec_pretty(manifest.records())
        } else {
            serde_json::to_vec(manifest.records())
        }
        .context("Failed to serialize manifest")
        .map_err(|e| ScanError::manifest_write(&output_path, e))?;

        tokio::fs::write(&output_path, serialized)
            .await
            .with_context(|| format!("Failed to write manifest: {}", output_path.display()))
            .map_err(|e| ScanError::manifest_write(&output_path, e))?;

        Ok(output_path)
    }
}
