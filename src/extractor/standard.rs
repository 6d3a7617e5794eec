use super::{BrightestPoint, ColorHistogram, FeatureExtractor, CHANNEL_BINS};
use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{GrayImage, RgbaImage};
use std::collections::HashSet;
use std::path::Path;

/// 向き判定に使うガウスぼかしのシグマ
pub const DEFAULT_BLUR_SIGMA: f32 = 5.0;

/// imageクレートによる特徴抽出実装
#[derive(Clone, Debug)]
pub struct ImageFeatureExtractor {
    blur_sigma: f32,
}

impl Default for ImageFeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageFeatureExtractor {
    pub fn new() -> Self {
        Self {
            blur_sigma: DEFAULT_BLUR_SIGMA,
        }
    }

    /// ぼかしの強さを指定して作成
    pub fn with_blur_sigma(blur_sigma: f32) -> Self {
        Self { blur_sigma }
    }

    pub fn blur_sigma(&self) -> f32 {
        self.blur_sigma
    }
}

/// RGBA画像からチャンネル別ヒストグラムと色数を計算
pub fn compute_color_histogram(image: &RgbaImage) -> ColorHistogram {
    let mut histogram = ColorHistogram::empty(CHANNEL_BINS);
    let mut colors = HashSet::new();

    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        histogram.red[r as usize] += 1;
        histogram.green[g as usize] += 1;
        histogram.blue[b as usize] += 1;
        colors.insert([r, g, b, a]);
    }

    histogram.distinct_colors = colors.len();
    histogram
}

/// グレースケール画像をぼかして最も明るい点を探す
///
/// 同じ明るさの点が複数あれば行優先で最初のものを返す。
pub fn locate_brightest(image: &GrayImage, blur_sigma: f32) -> Option<BrightestPoint> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }

    let blurred = if blur_sigma > 0.0 {
        image::imageops::blur(image, blur_sigma)
    } else {
        image.clone()
    };

    let mut best: Option<(u32, u32, u8)> = None;
    for (x, y, pixel) in blurred.enumerate_pixels() {
        let value = pixel.0[0];
        if best.map_or(true, |(_, _, v)| value > v) {
            best = Some((x, y, value));
        }
    }

    best.map(|(x, y, _)| BrightestPoint {
        x,
        y,
        width: image.width(),
        height: image.height(),
    })
}

#[async_trait]
impl FeatureExtractor for ImageFeatureExtractor {
    fn sniff_mime(&self, prefix: &[u8]) -> Option<&'static str> {
        image::guess_format(prefix)
            .ok()
            .map(|format| format.to_mime_type())
    }

    async fn dimensions(&self, path: &Path) -> Result<(u32, u32)> {
        tokio::task::spawn_blocking({
            let path = path.to_path_buf();
            move || image::image_dimensions(&path)
        })
        .await
        .context("Failed to spawn blocking task for dimension reading")?
        .with_context(|| format!("Failed to read image dimensions: {}", path.display()))
    }

    async fn color_histogram(&self, path: &Path) -> Result<ColorHistogram> {
        let image = tokio::task::spawn_blocking({
            let path = path.to_path_buf();
            move || image::open(&path).map(|image| image.to_rgba8())
        })
        .await
        .context("Failed to spawn blocking task for histogram extraction")?
        .with_context(|| format!("Failed to load image from path: {}", path.display()))?;

        Ok(compute_color_histogram(&image))
    }

    async fn brightest_point(&self, path: &Path) -> Result<BrightestPoint> {
        let blur_sigma = self.blur_sigma;

        tokio::task::spawn_blocking({
            let path = path.to_path_buf();
            move || -> Result<BrightestPoint> {
                let gray = image::open(&path)
                    .with_context(|| format!("Failed to load image from path: {}", path.display()))?
                    .to_luma8();
                locate_brightest(&gray, blur_sigma)
                    .with_context(|| format!("Image has no pixels: {}", path.display()))
            }
        })
        .await
        .context("Failed to spawn blocking task for orientation detection")?
    }

    fn strategy_name(&self) -> &'static str {
        "image"
    }
}
