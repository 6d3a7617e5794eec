use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::path::{Path, PathBuf};

pub mod svg;

/// チャート画像のファイル名（元ファイル名から決まる）
pub fn chart_file_name(source_name: &str) -> String {
    format!("histogram_{source_name}.png")
}

/// ヒストグラムチャート描画の抽象化トレイト
#[automock]
#[async_trait]
pub trait ChartRenderer: Send + Sync {
    /// 正規化ヒストグラムの折れ線グラフを`output_dir`に保存し、そのパスを返す
    async fn render(&self, histogram: &[f64], label: &str, output_dir: &Path) -> Result<PathBuf>;
}

/// 何も描画しないチャート実装（`--no-charts`用）
#[derive(Debug, Clone, Default)]
pub struct NoOpChartRenderer;

impl NoOpChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ChartRenderer for NoOpChartRenderer {
    async fn render(&self, _histogram: &[f64], label: &str, output_dir: &Path) -> Result<PathBuf> {
        Ok(output_dir.join(chart_file_name(label)))
    }
}

// ChartRenderer for Box<dyn ChartRenderer>
#[async_trait]
impl ChartRenderer for Box<dyn ChartRenderer> {
    async fn render(&self, histogram: &[f64], label: &str, output_dir: &Path) -> Result<PathBuf> {
        self.as_ref().render(histogram, label, output_dir).await
    }
}
