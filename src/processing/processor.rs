// リーフディレクトリ単位の処理（ファンアウト・ファンイン）

use super::config::ProcessingConfig;
use super::reporting::ProgressReporter;
use crate::chart::ChartRenderer;
use crate::core::{
    DirectoryReport, FeatureRecord, FileOutcome, LeafDirectory, Manifest, ScanError, ScanResult,
    Side,
};
use crate::extractor::orientation::SideMapping;
use crate::extractor::FeatureExtractor;
use crate::manifest::ManifestWriter;
use crate::storage::{StorageBackend, StorageItem};
use futures::future::join_all;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Semaphore, SemaphorePermit};

/// 設定から取り出した、ファイル処理に必要な値
#[derive(Debug, Clone)]
struct FileTaskSettings {
    extraction_timeout: Duration,
    max_colors: usize,
    side_mapping: SideMapping,
    render_charts: bool,
}

/// リーフディレクトリ1つ分の画像を並列処理し、マニフェストを1回だけ書き込む
///
/// セマフォは全ディレクトリで共有する。一覧取得、先頭バイトの読み込み、
/// 特徴抽出、マニフェスト書き込みのいずれも許可を取ってから行うため、
/// 同時に開かれるファイル数は実行全体で`max_concurrent_tasks`以下になる。
/// 許可を保持したまま別の許可を待つことはない。
pub struct DirectoryProcessor<S, E, G, W, R> {
    storage: Arc<S>,
    extractor: Arc<E>,
    charts: Arc<G>,
    writer: Arc<W>,
    reporter: Arc<R>,
    semaphore: Arc<Semaphore>,
    sniff_prefix_len: usize,
    allowed_mime_types: Vec<String>,
    settings: FileTaskSettings,
}

impl<S, E, G, W, R> DirectoryProcessor<S, E, G, W, R>
where
    S: StorageBackend + 'static,
    E: FeatureExtractor + 'static,
    G: ChartRenderer + 'static,
    W: ManifestWriter + 'static,
    R: ProgressReporter + 'static,
{
    pub fn new<C: ProcessingConfig>(
        storage: Arc<S>,
        extractor: Arc<E>,
        charts: Arc<G>,
        writer: Arc<W>,
        reporter: Arc<R>,
        config: &C,
    ) -> ScanResult<Self> {
        config.validate()?;

        Ok(Self {
            storage,
            extractor,
            charts,
            writer,
            reporter,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_tasks())),
            sniff_prefix_len: config.sniff_prefix_len(),
            allowed_mime_types: config.allowed_mime_types().to_vec(),
            settings: FileTaskSettings {
                extraction_timeout: config.extraction_timeout(),
                max_colors: config.max_colors(),
                side_mapping: config.side_mapping(),
                render_charts: config.render_charts(),
            },
        })
    }

    /// リーフディレクトリを処理してマニフェストを書き込む
    ///
    /// ファイル単位の失敗はレポートに数えるだけで、エラーになるのは
    /// 一覧取得とマニフェスト書き込みの失敗のみ。
    pub async fn process(&self, leaf: &LeafDirectory) -> ScanResult<DirectoryReport> {
        let directory = leaf.path();

        let entries = async {
            let _permit = self.permit().await?;
            self.storage.list_entries(directory).await
        }
        .await
        .map_err(|e| ScanError::directory_list(directory, e))?;

        let (candidates, unreadable_files) = self.select_candidates(entries).await;
        let total = candidates.len();
        self.reporter.report_started(directory, total).await;
        tracing::debug!(directory = %directory.display(), total, "processing leaf directory");

        let settled = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = candidates
            .iter()
            .map(|item| {
                let job = FileJob {
                    file: item.clone(),
                    directory: directory.to_path_buf(),
                    extractor: Arc::clone(&self.extractor),
                    charts: Arc::clone(&self.charts),
                    reporter: Arc::clone(&self.reporter),
                    semaphore: Arc::clone(&self.semaphore),
                    settled: Arc::clone(&settled),
                    total,
                    settings: self.settings.clone(),
                };
                tokio::spawn(job.run())
            })
            .collect();

        // 全ファイルの結果が確定するまで待つ（順序は一覧の順序）
        let results = join_all(handles).await;

        let mut records = Vec::with_capacity(total);
        let mut skipped_files = 0;
        let mut failed_files = unreadable_files;
        let mut chart_failures = 0;

        for (item, result) in candidates.iter().zip(results) {
            match result {
                Ok(FileOutcome::Included {
                    record,
                    chart_error,
                }) => {
                    if chart_error.is_some() {
                        chart_failures += 1;
                    }
                    records.push(record);
                }
                Ok(FileOutcome::Skipped { .. }) => skipped_files += 1,
                Ok(FileOutcome::Failed { .. }) => failed_files += 1,
                Err(join_error) => {
                    let error = ScanError::task(join_error);
                    tracing::error!(file = %item.path.display(), %error, "file task aborted");
                    self.reporter.report_error(&item.path, &error.to_string()).await;
                    failed_files += 1;
                }
            }
        }

        let manifest = Manifest::new(directory, records);
        let manifest_path = {
            let _permit = self
                .permit()
                .await
                .map_err(|e| ScanError::manifest_write(directory, e))?;
            self.writer.write(&manifest).await?
        };
        self.reporter
            .report_completed(directory, manifest.len(), total)
            .await;
        tracing::info!(
            manifest = %manifest_path.display(),
            records = manifest.len(),
            skipped_files,
            failed_files,
            "manifest written"
        );

        Ok(DirectoryReport {
            directory: directory.to_path_buf(),
            manifest_path,
            candidate_files: total,
            included_files: manifest.len(),
            skipped_files,
            failed_files,
            chart_failures,
        })
    }

    /// 共有セマフォの許可を取る
    async fn permit(&self) -> anyhow::Result<SemaphorePermit<'_>> {
        self.semaphore
            .acquire()
            .await
            .map_err(|e| anyhow::anyhow!("Semaphore error: {}", e))
    }

    /// 先頭バイトから種別を判定し、対象MIMEタイプのファイルだけを残す
    ///
    /// 読めなかったファイルは候補から外し、その数を返す。
    async fn select_candidates(&self, entries: Vec<StorageItem>) -> (Vec<StorageItem>, usize) {
        let files: Vec<StorageItem> = entries.into_iter().filter(|e| !e.is_directory).collect();

        let prefixes = join_all(files.iter().map(|item| async move {
            let _permit = self.permit().await?;
            self.storage
                .read_prefix(&item.path, self.sniff_prefix_len)
                .await
        }))
        .await;

        let mut candidates = Vec::with_capacity(files.len());
        let mut unreadable = 0;
        for (item, prefix) in files.into_iter().zip(prefixes) {
            let prefix = match prefix {
                Ok(prefix) => prefix,
                Err(e) => {
                    let error = ScanError::file_read(&item.path, e);
                    tracing::warn!(%error, "skipping unreadable file");
                    self.reporter.report_error(&item.path, &error.to_string()).await;
                    unreadable += 1;
                    continue;
                }
            };

            match self.extractor.sniff_mime(&prefix) {
                Some(mime) if self.allowed_mime_types.iter().any(|m| m == mime) => {
                    candidates.push(item)
                }
                detected => {
                    tracing::trace!(file = %item.path.display(), ?detected, "not a target image");
                }
            }
        }
        (candidates, unreadable)
    }
}

/// 1ファイル分のタスク（`tokio::spawn`に渡すため所有権を持つ）
struct FileJob<E, G, R> {
    file: StorageItem,
    directory: PathBuf,
    extractor: Arc<E>,
    charts: Arc<G>,
    reporter: Arc<R>,
    semaphore: Arc<Semaphore>,
    settled: Arc<AtomicUsize>,
    total: usize,
    settings: FileTaskSettings,
}

impl<E, G, R> FileJob<E, G, R>
where
    E: FeatureExtractor + 'static,
    G: ChartRenderer + 'static,
    R: ProgressReporter + 'static,
{
    async fn run(self) -> FileOutcome {
        let outcome = match Arc::clone(&self.semaphore).acquire_owned().await {
            Ok(_permit) => self.extract().await,
            Err(e) => FileOutcome::Failed {
                file_path: self.file.path.clone(),
                error: format!("Semaphore error: {e}"),
            },
        };

        if let FileOutcome::Failed { file_path, error } = &outcome {
            self.reporter.report_error(file_path, error).await;
        }

        // 進捗表示専用のカウンタ（マニフェストの確定には使わない）
        let completed = self.settled.fetch_add(1, Ordering::SeqCst) + 1;
        self.reporter
            .report_progress(&self.directory, completed, self.total)
            .await;

        outcome
    }

    async fn extract(&self) -> FileOutcome {
        let path = self.file.path.as_path();
        let limit = self.settings.extraction_timeout;

        let features = async {
            let histogram = self
                .extractor
                .color_histogram(path)
                .await
                .map_err(|e| ScanError::extraction(path, "histogram", e))?;
            let size = self
                .extractor
                .dimensions(path)
                .await
                .map_err(|e| ScanError::extraction(path, "dimensions", e))?;
            Ok::<_, ScanError>((histogram, size))
        };
        let orientation = async {
            self.extractor
                .brightest_point(path)
                .await
                .map_err(|e| ScanError::extraction(path, "orientation", e))
        };

        let (features, orientation) = tokio::join!(
            with_timeout(limit, path, "histogram", features),
            with_timeout(limit, path, "orientation", orientation),
        );

        let side = match orientation {
            Ok(point) => self.settings.side_mapping.classify(&point),
            Err(error) => {
                tracing::warn!(%error, "orientation unavailable, recording side as unknown");
                Side::Unknown
            }
        };

        let (histogram, (width, height)) = match features {
            Ok(features) => features,
            Err(error) => {
                tracing::warn!(%error, "excluding file from manifest");
                return FileOutcome::Failed {
                    file_path: path.to_path_buf(),
                    error: error.to_string(),
                };
            }
        };

        if histogram.distinct_colors > self.settings.max_colors {
            tracing::debug!(
                file = %path.display(),
                distinct_colors = histogram.distinct_colors,
                "too many colors, skipping"
            );
            return FileOutcome::Skipped {
                file_path: path.to_path_buf(),
                distinct_colors: histogram.distinct_colors,
            };
        }

        let Some(normalized) = histogram.normalized_intensity(width as u64 * height as u64) else {
            return FileOutcome::Failed {
                file_path: path.to_path_buf(),
                error: ScanError::extraction(path, "histogram", anyhow::anyhow!("image has no pixels"))
                    .to_string(),
            };
        };

        let chart_error = if self.settings.render_charts {
            match self
                .charts
                .render(&normalized, &self.file.name, &self.directory)
                .await
            {
                Ok(chart_path) => {
                    tracing::trace!(chart = %chart_path.display(), "chart rendered");
                    None
                }
                Err(e) => {
                    let error = ScanError::chart_render(&self.file.name, e);
                    tracing::warn!(%error, "chart rendering failed");
                    Some(error.to_string())
                }
            }
        } else {
            None
        };

        FileOutcome::Included {
            record: FeatureRecord::new(
                &self.directory,
                &self.file.name,
                side,
                normalized,
                (width, height),
            ),
            chart_error,
        }
    }
}

/// 抽出処理にタイムアウトを付ける（超過はエラー扱い）
async fn with_timeout<T>(
    limit: Duration,
    path: &Path,
    operation: &'static str,
    future: impl Future<Output = ScanResult<T>>,
) -> ScanResult<T> {
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| ScanError::extraction_timeout(path, operation, limit))?
}
