use super::{ManifestWriter, DEFAULT_MANIFEST_FILE_NAME};
use crate::core::{Manifest, ScanResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// メモリ内保存のマニフェスト実装（テスト用および開発用）
#[derive(Debug, Clone, Default)]
pub struct MemoryManifestWriter {
    manifests: Arc<Mutex<HashMap<PathBuf, Manifest>>>,
    write_count: Arc<Mutex<usize>>,
}

impl MemoryManifestWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// テスト用：ディレクトリのマニフェストを取得
    pub fn manifest_for(&self, directory: &Path) -> Option<Manifest> {
        self.manifests.lock().unwrap().get(directory).cloned()
    }

    /// テスト用：保存されたマニフェスト数を取得
    pub fn stored_count(&self) -> usize {
        self.manifests.lock().unwrap().len()
    }

    /// テスト用：書き込み回数を取得
    pub fn write_count(&self) -> usize {
        *self.write_count.lock().unwrap()
    }
}

#[async_trait]
impl ManifestWriter for MemoryManifestWriter {
    async fn write(&self, manifest: &Manifest) -> ScanResult<PathBuf> {
        self.manifests
            .lock()
            .unwrap()
            .insert(manifest.directory().to_path_buf(), manifest.clone());
        *self.write_count.lock().unwrap() += 1;
        Ok(manifest.directory().join(DEFAULT_MANIFEST_FILE_NAME))
    }
}
