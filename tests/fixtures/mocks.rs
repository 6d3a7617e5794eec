// 遅延・失敗・呼び出し記録を注入するラッパー実装
// 本物のバックエンドに委譲しつつ、テストで観測したい点だけを差し込む

use anyhow::Result;
use async_trait::async_trait;
use leaf_histogram::core::{Manifest, ScanResult};
use leaf_histogram::extractor::standard::ImageFeatureExtractor;
use leaf_histogram::extractor::{BrightestPoint, ColorHistogram, FeatureExtractor};
use leaf_histogram::manifest::{JsonManifestWriter, ManifestWriter};
use leaf_histogram::storage::local::LocalStorageBackend;
use leaf_histogram::storage::{StorageBackend, StorageItem};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// 呼び出しを記録し、指定ディレクトリの一覧取得を失敗させるストレージ
#[derive(Clone, Default)]
pub struct RecordingStorage {
    inner: LocalStorageBackend,
    failing_dir: Option<PathBuf>,
    listed: Arc<Mutex<Vec<PathBuf>>>,
    read: Arc<Mutex<Vec<PathBuf>>>,
    in_flight: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl RecordingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(dir: impl Into<PathBuf>) -> Self {
        Self {
            failing_dir: Some(dir.into()),
            ..Self::default()
        }
    }

    pub fn listed_dirs(&self) -> Vec<PathBuf> {
        self.listed.lock().unwrap().clone()
    }

    pub fn read_files(&self) -> Vec<PathBuf> {
        self.read.lock().unwrap().clone()
    }

    /// 同時に実行中だったストレージ呼び出し数の最大値
    pub fn peak_concurrent(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageBackend for RecordingStorage {
    async fn list_entries(&self, dir: &Path) -> Result<Vec<StorageItem>> {
        self.listed.lock().unwrap().push(dir.to_path_buf());
        if self.failing_dir.as_deref() == Some(dir) {
            anyhow::bail!("injected listing failure: {}", dir.display());
        }
        self.enter();
        let entries = self.inner.list_entries(dir).await;
        self.leave();
        entries
    }

    async fn read_prefix(&self, path: &Path, len: usize) -> Result<Vec<u8>> {
        self.read.lock().unwrap().push(path.to_path_buf());
        self.enter();
        tokio::task::yield_now().await;
        let prefix = self.inner.read_prefix(path, len).await;
        self.leave();
        prefix
    }
}

/// ファイル名ごとに遅延を注入し、ヒストグラム抽出の完了数を数える抽出器
#[derive(Clone, Default)]
pub struct DelayedExtractor {
    inner: ImageFeatureExtractor,
    histogram_delays: HashMap<String, Duration>,
    orientation_delays: HashMap<String, Duration>,
    settled: Arc<AtomicUsize>,
}

impl DelayedExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_histogram_delay(mut self, name: &str, delay: Duration) -> Self {
        self.histogram_delays.insert(name.to_string(), delay);
        self
    }

    pub fn with_orientation_delay(mut self, name: &str, delay: Duration) -> Self {
        self.orientation_delays.insert(name.to_string(), delay);
        self
    }

    /// 完了したヒストグラム抽出の数（共有カウンタ）
    pub fn settled_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.settled)
    }
}

#[async_trait]
impl FeatureExtractor for DelayedExtractor {
    fn sniff_mime(&self, prefix: &[u8]) -> Option<&'static str> {
        self.inner.sniff_mime(prefix)
    }

    async fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        self.inner.dimensions(path).await
    }

    async fn color_histogram(&self, path: &Path) -> Result<ColorHistogram> {
        if let Some(delay) = self.histogram_delays.get(&file_name(path)) {
            tokio::time::sleep(*delay).await;
        }
        let histogram = self.inner.color_histogram(path).await;
        self.settled.fetch_add(1, Ordering::SeqCst);
        histogram
    }

    async fn brightest_point(&self, path: &Path) -> Result<BrightestPoint> {
        if let Some(delay) = self.orientation_delays.get(&file_name(path)) {
            tokio::time::sleep(*delay).await;
        }
        self.inner.brightest_point(path).await
    }

    fn strategy_name(&self) -> &'static str {
        "delayed"
    }
}

/// 書き込み時点での抽出完了数を記録するマニフェスト書き込み
#[derive(Clone)]
pub struct SnapshotManifestWriter {
    inner: JsonManifestWriter,
    settled: Arc<AtomicUsize>,
    snapshots: Arc<Mutex<Vec<(PathBuf, usize, usize)>>>,
}

impl SnapshotManifestWriter {
    pub fn new(settled: Arc<AtomicUsize>) -> Self {
        Self {
            inner: JsonManifestWriter::new(),
            settled,
            snapshots: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// (ディレクトリ, 書き込み時点の完了数, レコード数)
    pub fn snapshots(&self) -> Vec<(PathBuf, usize, usize)> {
        self.snapshots.lock().unwrap().clone()
    }
}

#[async_trait]
impl ManifestWriter for SnapshotManifestWriter {
    async fn write(&self, manifest: &Manifest) -> ScanResult<PathBuf> {
        self.snapshots.lock().unwrap().push((
            manifest.directory().to_path_buf(),
            self.settled.load(Ordering::SeqCst),
            manifest.len(),
        ));
        self.inner.write(manifest).await
    }
}
