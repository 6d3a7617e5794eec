// マニフェストの永続化
//
// 1ディレクトリにつき1回だけ書き込まれ、追記はしない。

use crate::core::{Manifest, ScanResult};
use async_trait::async_trait;
use mockall::automock;
use std::path::PathBuf;

pub mod json;
pub mod memory;

pub use json::JsonManifestWriter;
pub use memory::MemoryManifestWriter;

/// デフォルトのマニフェストファイル名
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "output.json";

/// マニフェスト書き込みの抽象化トレイト
#[automock]
#[async_trait]
pub trait ManifestWriter: Send + Sync {
    /// マニフェストを書き込み、書き込み先を返す（既存の文書は上書き）
    async fn write(&self, manifest: &Manifest) -> ScanResult<PathBuf>;
}

// ManifestWriter for Box<dyn ManifestWriter>
#[async_trait]
impl ManifestWriter for Box<dyn ManifestWriter> {
    async fn write(&self, manifest: &Manifest) -> ScanResult<PathBuf> {
        self.as_ref().write(manifest).await
    }
}
