use super::{StorageBackend, StorageItem};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// ローカルファイルシステム用のストレージバックエンド
#[derive(Clone, Debug, Default)]
pub struct LocalStorageBackend;

impl LocalStorageBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl StorageBackend for LocalStorageBackend {
    async fn list_entries(&self, dir: &Path) -> Result<Vec<StorageItem>> {
        let mut items = Vec::new();

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .with_context(|| format!("Failed to read entry in: {}", dir.display()))?
        {
            // DirEntry::file_typeはシンボリックリンクを辿らない（lstat相当）
            let file_type = entry
                .file_type()
                .await
                .with_context(|| format!("Failed to get file type for: {}", entry.path().display()))?;

            items.push(StorageItem {
                path: entry.path(),
                name: entry.file_name().to_string_lossy().to_string(),
                is_directory: file_type.is_dir(),
            });
        }

        // 一貫した順序で処理
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn read_prefix(&self, path: &Path, len: usize) -> Result<Vec<u8>> {
        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open file: {}", path.display()))?;

        let mut buffer = Vec::with_capacity(len);
        file.take(len as u64)
            .read_to_end(&mut buffer)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))?;

        Ok(buffer)
    }
}
