// 処理設定の管理

use crate::core::{ScanError, ScanResult};
use crate::extractor::orientation::SideMapping;
use std::time::Duration;

/// 処理対象とするMIMEタイプ（現状はJPEGのみ）
pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &["image/jpeg"];

/// 種別判定のために読み込む先頭バイト数
pub const DEFAULT_SNIFF_PREFIX_LEN: usize = 4100;

/// マニフェストに含める画像の最大色数
pub const DEFAULT_MAX_COLORS: usize = 256;

/// 処理設定を抽象化するトレイト
pub trait ProcessingConfig: Send + Sync {
    /// 最大同時実行ファイル数を取得
    fn max_concurrent_tasks(&self) -> usize;

    /// 抽出処理1回あたりのタイムアウト
    fn extraction_timeout(&self) -> Duration;

    /// マニフェストに含める画像の最大色数
    fn max_colors(&self) -> usize;

    /// 種別判定のために読み込む先頭バイト数
    fn sniff_prefix_len(&self) -> usize;

    /// 処理対象とするMIMEタイプ
    fn allowed_mime_types(&self) -> &[String];

    /// 向き判定の対応付け
    fn side_mapping(&self) -> SideMapping;

    /// チャートを描画するかどうか
    fn render_charts(&self) -> bool;

    /// 設定値の検証
    fn validate(&self) -> ScanResult<()> {
        if self.max_concurrent_tasks() == 0 {
            return Err(ScanError::configuration("並列タスク数は1以上である必要があります"));
        }
        if self.extraction_timeout().is_zero() {
            return Err(ScanError::configuration("タイムアウトは0より大きい必要があります"));
        }
        if self.sniff_prefix_len() == 0 {
            return Err(ScanError::configuration("先頭バイト数は1以上である必要があります"));
        }
        if self.allowed_mime_types().is_empty() {
            return Err(ScanError::configuration("対象MIMEタイプが指定されていません"));
        }
        Ok(())
    }
}

/// デフォルト設定実装
#[derive(Debug, Clone)]
pub struct DefaultProcessingConfig {
    max_concurrent: usize,
    extraction_timeout: Duration,
    max_colors: usize,
    sniff_prefix_len: usize,
    allowed_mime_types: Vec<String>,
    side_mapping: SideMapping,
    render_charts: bool,
}

impl DefaultProcessingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent;
        self
    }

    pub fn with_extraction_timeout(mut self, timeout: Duration) -> Self {
        self.extraction_timeout = timeout;
        self
    }

    pub fn with_max_colors(mut self, max_colors: usize) -> Self {
        self.max_colors = max_colors;
        self
    }

    pub fn with_sniff_prefix_len(mut self, len: usize) -> Self {
        self.sniff_prefix_len = len;
        self
    }

    pub fn with_allowed_mime_types<I, T>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.allowed_mime_types = mime_types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_side_mapping(mut self, side_mapping: SideMapping) -> Self {
        self.side_mapping = side_mapping;
        self
    }

    pub fn with_chart_rendering(mut self, enable: bool) -> Self {
        self.render_charts = enable;
        self
    }
}

impl Default for DefaultProcessingConfig {
    fn default() -> Self {
        Self {
            max_concurrent: num_cpus::get().max(1) * 2,
            extraction_timeout: Duration::from_secs(30),
            max_colors: DEFAULT_MAX_COLORS,
            sniff_prefix_len: DEFAULT_SNIFF_PREFIX_LEN,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|m| m.to_string())
                .collect(),
            side_mapping: SideMapping::default(),
            render_charts: true,
        }
    }
}

impl ProcessingConfig for DefaultProcessingConfig {
    fn max_concurrent_tasks(&self) -> usize {
        self.max_concurrent
    }

    fn extraction_timeout(&self) -> Duration {
        self.extraction_timeout
    }

    fn max_colors(&self) -> usize {
        self.max_colors
    }

    fn sniff_prefix_len(&self) -> usize {
        self.sniff_prefix_len
    }

    fn allowed_mime_types(&self) -> &[String] {
        &self.allowed_mime_types
    }

    fn side_mapping(&self) -> SideMapping {
        self.side_mapping
    }

    fn render_charts(&self) -> bool {
        self.render_charts
    }
}
