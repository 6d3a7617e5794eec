// 進捗報告と最終サマリー

use crate::core::RunSummary;
use async_trait::async_trait;
use std::path::Path;

/// 進捗報告を抽象化するトレイト
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    /// 走査完了時の報告
    async fn report_scan_completed(&self, leaf_directories: usize);

    /// ディレクトリ処理開始時の報告
    async fn report_started(&self, directory: &Path, total_files: usize);

    /// ファイル1件の処理が確定するたびの報告
    async fn report_progress(&self, directory: &Path, completed: usize, total: usize);

    /// エラー発生時の報告
    async fn report_error(&self, path: &Path, error: &str);

    /// ディレクトリ処理完了時の報告
    async fn report_completed(&self, directory: &Path, included: usize, total: usize);

    /// 実行全体の最終報告
    async fn report_summary(&self, summary: &RunSummary);
}

/// コンソール出力による進捗報告実装
#[derive(Debug, Default, Clone)]
pub struct ConsoleProgressReporter {
    quiet: bool,
}

impl ConsoleProgressReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl ProgressReporter for ConsoleProgressReporter {
    async fn report_scan_completed(&self, leaf_directories: usize) {
        if !self.quiet {
            println!("🔍 Found {leaf_directories} leaf directories");
        }
    }

    async fn report_started(&self, directory: &Path, total_files: usize) {
        if !self.quiet {
            println!("🚀 {}: processing {total_files} images...", directory.display());
        }
    }

    async fn report_progress(&self, directory: &Path, completed: usize, total: usize) {
        if !self.quiet {
            let percentage = (completed as f64 / total.max(1) as f64) * 100.0;
            println!(
                "📊 {}: {completed}/{total} ({percentage:.1}%)",
                directory.display()
            );
        }
    }

    async fn report_error(&self, path: &Path, error: &str) {
        if !self.quiet {
            eprintln!("❌ Error processing {}: {error}", path.display());
        }
    }

    async fn report_completed(&self, directory: &Path, included: usize, total: usize) {
        if !self.quiet {
            println!(
                "✅ {}: {included}/{total} images written to manifest",
                directory.display()
            );
        }
    }

    async fn report_summary(&self, summary: &RunSummary) {
        // 最終サマリーはquietでも出力する
        println!("\nAll leaf directories have been processed.");
        println!("📄 Manifests written: {}", summary.reports.len());
        for report in &summary.reports {
            println!(
                "   - {} ({} records)",
                report.manifest_path.display(),
                report.included_files
            );
        }
        if summary.has_failures() {
            eprintln!("⚠️  Failed directories: {}", summary.failures.len());
            for failure in &summary.failures {
                eprintln!("   - {}: {}", failure.directory.display(), failure.reason);
            }
        }
    }
}

/// 何もしない進捗報告実装（テスト・バックグラウンド処理用）
#[derive(Debug, Default, Clone)]
pub struct NoOpProgressReporter;

impl NoOpProgressReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProgressReporter for NoOpProgressReporter {
    async fn report_scan_completed(&self, _leaf_directories: usize) {}

    async fn report_started(&self, _directory: &Path, _total_files: usize) {}

    async fn report_progress(&self, _directory: &Path, _completed: usize, _total: usize) {}

    async fn report_error(&self, _path: &Path, _error: &str) {}

    async fn report_completed(&self, _directory: &Path, _included: usize, _total: usize) {}

    async fn report_summary(&self, _summary: &RunSummary) {}
}
