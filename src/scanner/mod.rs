// ディレクトリツリーの走査と末端ディレクトリの収集
//
// 各ディレクトリの走査は子ディレクトリの走査futureを全て待ってから完了する。
// どの階層で一覧取得に失敗しても走査全体を中断し、途中結果は破棄する。

use crate::core::{LeafDirectory, ScanError, ScanResult};
use crate::storage::{StorageBackend, StorageItem};
use futures::future::{try_join_all, BoxFuture, FutureExt};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// 一覧取得の同時実行数の既定値
pub const DEFAULT_LISTING_LIMIT: usize = 16;

/// 走査中にのみ存在するディレクトリノード
#[derive(Debug, Clone)]
pub struct DirectoryNode {
    pub path: PathBuf,
    pub files: Vec<StorageItem>,
    pub subdirectories: Vec<StorageItem>,
}

impl DirectoryNode {
    /// 直下のエントリをファイルとサブディレクトリに分割
    pub fn from_entries(path: impl Into<PathBuf>, entries: Vec<StorageItem>) -> Self {
        let (subdirectories, files): (Vec<StorageItem>, Vec<StorageItem>) =
            entries.into_iter().partition(|item| item.is_directory);
        Self {
            path: path.into(),
            files,
            subdirectories,
        }
    }

    /// サブディレクトリを持たない（空ディレクトリを含む）
    pub fn is_leaf(&self) -> bool {
        self.subdirectories.is_empty()
    }
}

/// 末端ディレクトリ探索器
///
/// 一覧取得は`listing_limit`個までしか同時に走らない。
/// 許可は一覧取得の間だけ保持し、子ディレクトリの走査を待つ間は手放す。
pub struct TreeScanner<S> {
    storage: Arc<S>,
    listing_limit: Arc<Semaphore>,
}

impl<S> Clone for TreeScanner<S> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            listing_limit: self.listing_limit.clone(),
        }
    }
}

impl<S> TreeScanner<S>
where
    S: StorageBackend + 'static,
{
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            listing_limit: Arc::new(Semaphore::new(DEFAULT_LISTING_LIMIT)),
        }
    }

    /// 一覧取得の同時実行数を変更（0は1として扱う）
    pub fn with_listing_limit(mut self, limit: usize) -> Self {
        self.listing_limit = Arc::new(Semaphore::new(limit.max(1)));
        self
    }

    /// ルート以下の末端ディレクトリ集合を返す
    pub async fn scan(&self, root: &Path) -> ScanResult<BTreeSet<LeafDirectory>> {
        let leaves = self.scan_directory(root.to_path_buf()).await?;
        Ok(leaves.into_iter().collect())
    }

    fn scan_directory(&self, dir: PathBuf) -> BoxFuture<'_, ScanResult<Vec<LeafDirectory>>> {
        async move {
            let entries = async {
                let _permit = self
                    .listing_limit
                    .acquire()
                    .await
                    .map_err(|e| anyhow::anyhow!("Semaphore error: {}", e))?;
                self.storage.list_entries(&dir).await
            }
            .await
            .map_err(|e| ScanError::directory_list(&dir, e))?;

            let node = DirectoryNode::from_entries(dir, entries);
            if node.is_leaf() {
                tracing::debug!(directory = %node.path.display(), files = node.files.len(), "leaf directory");
                return Ok(vec![LeafDirectory::new(node.path)]);
            }

            // 混在ディレクトリ自身とその直下のファイルは対象外
            if !node.files.is_empty() {
                tracing::debug!(
                    directory = %node.path.display(),
                    ignored_files = node.files.len(),
                    "mixed directory, direct files are not processed"
                );
            }

            let children = node
                .subdirectories
                .into_iter()
                .map(|sub| self.scan_directory(sub.path));

            let nested = try_join_all(children).await?;
            Ok(nested.into_iter().flatten().collect())
        }
        .boxed()
    }
}
