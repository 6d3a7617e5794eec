use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::path::{Path, PathBuf};

pub mod local;

/// ストレージ内のアイテムを表す構造体
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageItem {
    /// アイテムのパス
    pub path: PathBuf,
    /// アイテム名（ファイル名）
    pub name: String,
    /// アイテムがディレクトリかどうか（シンボリックリンクは辿らない）
    pub is_directory: bool,
}

impl StorageItem {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::from_path(path.into(), false)
    }

    pub fn directory(path: impl Into<PathBuf>) -> Self {
        Self::from_path(path.into(), true)
    }

    fn from_path(path: PathBuf, is_directory: bool) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        Self {
            path,
            name,
            is_directory,
        }
    }
}

/// ストレージバックエンドのトレイト
#[automock]
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// ディレクトリ直下のアイテムをファイル名順でリストする
    async fn list_entries(&self, dir: &Path) -> Result<Vec<StorageItem>>;

    /// ファイル先頭の最大`len`バイトを読み込む
    async fn read_prefix(&self, path: &Path, len: usize) -> Result<Vec<u8>>;
}

// StorageBackend for Box<dyn StorageBackend>
#[async_trait]
impl StorageBackend for Box<dyn StorageBackend> {
    async fn list_entries(&self, dir: &Path) -> Result<Vec<StorageItem>> {
        self.as_ref().list_entries(dir).await
    }

    async fn read_prefix(&self, path: &Path, len: usize) -> Result<Vec<u8>> {
        self.as_ref().read_prefix(path, len).await
    }
}
