use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::path::Path;

pub mod orientation;
pub mod standard;

/// 8bitチャンネルのビン数
pub const CHANNEL_BINS: usize = 256;

/// チャンネル別ヒストグラムと色数
#[derive(Debug, Clone, PartialEq)]
pub struct ColorHistogram {
    pub red: Vec<u64>,
    pub green: Vec<u64>,
    pub blue: Vec<u64>,
    /// RGBAで数えた異なる色の数
    pub distinct_colors: usize,
}

impl ColorHistogram {
    /// ビン数を指定して空のヒストグラムを作成
    pub fn empty(bins: usize) -> Self {
        Self {
            red: vec![0; bins],
            green: vec![0; bins],
            blue: vec![0; bins],
            distinct_colors: 0,
        }
    }

    pub fn bins(&self) -> usize {
        self.red.len()
    }

    /// 輝度チャンネル（赤）のビンを画素数で正規化
    ///
    /// グレースケール画像ではRGBの各チャンネルは同一になる。
    pub fn normalized_intensity(&self, pixel_count: u64) -> Option<Vec<f64>> {
        if pixel_count == 0 {
            return None;
        }
        Some(
            self.red
                .iter()
                .map(|&count| count as f64 / pixel_count as f64)
                .collect(),
        )
    }
}

/// ぼかし後の最も明るい点
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrightestPoint {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// 画像特徴抽出バックエンドのトレイト
#[automock]
#[async_trait]
pub trait FeatureExtractor: Send + Sync {
    /// 先頭バイト列からMIMEタイプを判定する（判定できなければNone）
    fn sniff_mime(&self, prefix: &[u8]) -> Option<&'static str>;

    /// 画像サイズ（幅, 高さ）を取得
    async fn dimensions(&self, path: &Path) -> Result<(u32, u32)>;

    /// チャンネル別ヒストグラムと色数を取得
    async fn color_histogram(&self, path: &Path) -> Result<ColorHistogram>;

    /// グレースケール化・ぼかし後の最も明るい点を取得
    async fn brightest_point(&self, path: &Path) -> Result<BrightestPoint>;

    /// 抽出戦略の名前
    fn strategy_name(&self) -> &'static str;
}

// FeatureExtractor for Box<dyn FeatureExtractor>
#[async_trait]
impl FeatureExtractor for Box<dyn FeatureExtractor> {
    fn sniff_mime(&self, prefix: &[u8]) -> Option<&'static str> {
        self.as_ref().sniff_mime(prefix)
    }

    async fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        self.as_ref().dimensions(path).await
    }

    async fn color_histogram(&self, path: &Path) -> Result<ColorHistogram> {
        self.as_ref().color_histogram(path).await
    }

    async fn brightest_point(&self, path: &Path) -> Result<BrightestPoint> {
        self.as_ref().brightest_point(path).await
    }

    fn strategy_name(&self) -> &'static str {
        self.as_ref().strategy_name()
    }
}
