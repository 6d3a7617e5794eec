pub mod chart;
pub mod cli;
pub mod core;
pub mod extractor;
pub mod manifest;
pub mod processing;
pub mod scanner;
pub mod storage;

use crate::chart::ChartRenderer;
use crate::core::{DirectoryFailure, RunSummary, ScanResult};
use crate::extractor::FeatureExtractor;
use crate::manifest::ManifestWriter;
use crate::processing::{DirectoryProcessor, ProcessingConfig, ProgressReporter};
use crate::scanner::TreeScanner;
use crate::storage::StorageBackend;
use futures::future::join_all;
use std::path::Path;
use std::sync::Arc;

// DIコンテナの役割を果たすジェネリックなApp構造体
// 依存関係はArcで保持し、走査器とディレクトリ処理器で共有する
// ストレージへの同時アクセス数は走査・処理ともに`max_concurrent_tasks`で制限される
pub struct App<S, E, G, W, R> {
    scanner: TreeScanner<S>,
    processor: DirectoryProcessor<S, E, G, W, R>,
    reporter: Arc<R>,
}

impl<S, E, G, W, R> App<S, E, G, W, R>
where
    S: StorageBackend + 'static,
    E: FeatureExtractor + 'static,
    G: ChartRenderer + 'static,
    W: ManifestWriter + 'static,
    R: ProgressReporter + 'static,
{
    /// 新しいAppインスタンスを作成（コンストラクタインジェクション）
    ///
    /// 設定が不正な場合はここで失敗し、ファイルシステムには一切触れない。
    pub fn new<C: ProcessingConfig>(
        storage: S,
        extractor: E,
        charts: G,
        writer: W,
        reporter: R,
        config: &C,
    ) -> ScanResult<Self> {
        let storage = Arc::new(storage);
        let reporter = Arc::new(reporter);

        let processor = DirectoryProcessor::new(
            Arc::clone(&storage),
            Arc::new(extractor),
            Arc::new(charts),
            Arc::new(writer),
            Arc::clone(&reporter),
            config,
        )?;

        Ok(Self {
            scanner: TreeScanner::new(storage).with_listing_limit(config.max_concurrent_tasks()),
            processor,
            reporter,
        })
    }

    /// ルート以下のリーフディレクトリを検出し、それぞれにマニフェストを書き込む
    ///
    /// 走査中のエラーはマニフェストを1つも書かずに全体を失敗させる。
    /// 走査後のディレクトリ単位のエラーはサマリーに記録し、他のディレクトリの処理は続ける。
    pub async fn run(&self, root: &Path) -> ScanResult<RunSummary> {
        let leaves = self.scanner.scan(root).await?;
        self.reporter.report_scan_completed(leaves.len()).await;
        tracing::info!(root = %root.display(), leaves = leaves.len(), "scan completed");

        let outcomes = join_all(leaves.iter().map(|leaf| async move {
            let outcome = self.processor.process(leaf).await;
            (leaf, outcome)
        }))
        .await;

        let mut summary = RunSummary {
            leaf_directories: leaves.len(),
            ..RunSummary::default()
        };
        for (leaf, outcome) in outcomes {
            match outcome {
                Ok(report) => summary.reports.push(report),
                Err(error) => {
                    tracing::error!(
                        directory = %leaf.path().display(),
                        %error,
                        "leaf directory failed"
                    );
                    self.reporter
                        .report_error(error.path().unwrap_or(leaf.path()), &error.to_string())
                        .await;
                    summary.failures.push(DirectoryFailure {
                        directory: leaf.path().to_path_buf(),
                        reason: error.to_string(),
                    });
                }
            }
        }

        self.reporter.report_summary(&summary).await;
        Ok(summary)
    }
}
