// SVGで折れ線グラフを組み立て、resvgでPNGに変換するチャート実装

use super::{chart_file_name, ChartRenderer};
use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{ImageFormat, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::fontdb::Database;
use resvg::usvg::{Options, Tree};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const LINE_COLOR: &str = "rgb(75,192,192)";
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 40.0;
const MARGIN_TOP: f64 = 80.0;
const MARGIN_BOTTOM: f64 = 70.0;
const Y_TICKS: usize = 5;
const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";

/// SVG + resvgによるチャート描画実装
///
/// フォントは作成時にシステムから一度だけ読み込み、描画ごとに共有する。
/// フォントが1つも見つからない環境では文字のないチャートになる。
#[derive(Debug, Clone)]
pub struct SvgChartRenderer {
    width: u32,
    height: u32,
    fonts: Arc<Database>,
}

impl Default for SvgChartRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SvgChartRenderer {
    pub fn new() -> Self {
        Self::with_size(1920, 1080)
    }

    /// 出力サイズを指定して作成
    pub fn with_size(width: u32, height: u32) -> Self {
        let mut fonts = Database::new();
        fonts.load_system_fonts();
        if fonts.is_empty() {
            tracing::warn!("no system fonts found, chart text will not be drawn");
        } else {
            tracing::debug!(faces = fonts.len(), "loaded system fonts for charts");
        }
        Self {
            width,
            height,
            fonts: Arc::new(fonts),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 読み込まれているフォントフェイスの数
    pub fn font_faces(&self) -> usize {
        self.fonts.len()
    }

    /// 折れ線グラフのSVG文書を組み立てる
    ///
    /// x軸はビン番号（"0".."N-1"）、y軸は正規化頻度。
    pub fn build_svg(&self, histogram: &[f64], label: &str) -> String {
        let width = self.width as f64;
        let height = self.height as f64;
        let plot_width = (width - MARGIN_LEFT - MARGIN_RIGHT).max(1.0);
        let plot_height = (height - MARGIN_TOP - MARGIN_BOTTOM).max(1.0);
        let bottom = MARGIN_TOP + plot_height;

        let y_max = histogram
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(0.0_f64, f64::max);
        let y_max = if y_max > 0.0 { y_max } else { 1.0 };
        let x_step = if histogram.len() > 1 {
            plot_width / (histogram.len() - 1) as f64
        } else {
            0.0
        };

        let mut svg = String::new();
        svg.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        ));
        svg.push_str(&format!(r#"<rect width="{width}" height="{height}" fill="white"/>"#));
        svg.push_str(&format!(
            r#"<text x="{x}" y="{y}" font-family="{FONT_FAMILY}" font-size="28" text-anchor="middle">{title}</text>"#,
            x = width / 2.0,
            y = MARGIN_TOP / 2.0,
            title = escape_xml(label)
        ));

        // 軸
        svg.push_str(&format!(
            r#"<path d="M {l} {t} L {l} {b} L {r} {b}" fill="none" stroke="rgb(102,102,102)" stroke-width="2"/>"#,
            l = MARGIN_LEFT,
            t = MARGIN_TOP,
            b = bottom,
            r = MARGIN_LEFT + plot_width
        ));

        // y軸の目盛り
        for tick in 0..=Y_TICKS {
            let value = y_max * tick as f64 / Y_TICKS as f64;
            let y = bottom - plot_height * tick as f64 / Y_TICKS as f64;
            svg.push_str(&format!(
                r#"<line x1="{l}" y1="{y}" x2="{r}" y2="{y}" stroke="rgb(230,230,230)" stroke-width="1"/><text x="{tx}" y="{y}" font-family="{FONT_FAMILY}" font-size="14" text-anchor="end">{value:.4}</text>"#,
                l = MARGIN_LEFT,
                r = MARGIN_LEFT + plot_width,
                tx = MARGIN_LEFT - 8.0
            ));
        }

        // x軸のラベル（全ビン分、文字が重ならないよう間引いて表示）
        let label_every = (histogram.len() / 32).max(1);
        for bin in 0..histogram.len() {
            let x = MARGIN_LEFT + x_step * bin as f64;
            let opacity = if bin % label_every == 0 { 1 } else { 0 };
            svg.push_str(&format!(
                r#"<text x="{x}" y="{y}" font-family="{FONT_FAMILY}" font-size="12" text-anchor="middle" fill-opacity="{opacity}">{bin}</text>"#,
                y = bottom + 20.0
            ));
        }

        // 折れ線
        let points = histogram
            .iter()
            .enumerate()
            .map(|(bin, value)| {
                let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
                let x = MARGIN_LEFT + x_step * bin as f64;
                let y = bottom - plot_height * (value / y_max);
                format!("{x:.2},{y:.2}")
            })
            .collect::<Vec<_>>()
            .join(" ");
        svg.push_str(&format!(
            r#"<polyline points="{points}" fill="none" stroke="{LINE_COLOR}" stroke-width="2" stroke-linejoin="miter"/>"#
        ));

        svg.push_str("</svg>");
        svg
    }

    /// SVG文書をPNGのバイト列に変換
    fn rasterize(svg: &str, width: u32, height: u32, fonts: Arc<Database>) -> Result<Vec<u8>> {
        let options = Options {
            fontdb: fonts,
            ..Options::default()
        };
        let tree = Tree::from_str(svg, &options).context("Failed to parse chart SVG")?;

        let mut pixmap = Pixmap::new(width, height).context("Failed to create pixmap")?;
        resvg::render(&tree, Transform::default(), &mut pixmap.as_mut());

        let image = RgbaImage::from_raw(width, height, pixmap.data().to_vec())
            .context("Failed to create image from pixmap")?;

        let mut buffer = std::io::Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .context("Failed to encode chart as PNG")?;

        Ok(buffer.into_inner())
    }
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[async_trait]
impl ChartRenderer for SvgChartRenderer {
    async fn render(&self, histogram: &[f64], label: &str, output_dir: &Path) -> Result<PathBuf> {
        let svg = self.build_svg(histogram, label);
        let (width, height) = self.size();
        let fonts = Arc::clone(&self.fonts);

        let png = tokio::task::spawn_blocking(move || Self::rasterize(&svg, width, height, fonts))
            .await
            .context("Failed to spawn blocking task for chart rendering")??;

        let output_path = output_dir.join(chart_file_name(label));
        tokio::fs::write(&output_path, png)
            .await
            .with_context(|| format!("Failed to write chart: {}", output_path.display()))?;

        Ok(output_path)
    }
}
