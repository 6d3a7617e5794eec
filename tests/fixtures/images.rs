// テスト用画像の生成

use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, Luma, Rgb, RgbImage};
use std::fs::{self, File};
use std::path::Path;

/// 暗い背景に明るい正方形を1つ置いたグレースケール画像
pub fn spot_image(width: u32, height: u32, spot_x: u32, spot_y: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        if x.abs_diff(spot_x) <= 3 && y.abs_diff(spot_y) <= 3 {
            Luma([250])
        } else {
            Luma([20 + ((x + y) % 8) as u8])
        }
    })
}

/// グレースケールJPEG（色数は常に256以下）
pub fn write_gray_jpeg(path: &Path, width: u32, height: u32, spot_x: u32) {
    let image = spot_image(width, height, spot_x, height / 2);
    let file = File::create(path).unwrap();
    JpegEncoder::new_with_quality(file, 90)
        .encode_image(&image)
        .unwrap();
}

/// 256色を大きく超えるカラーJPEG
pub fn write_colorful_jpeg(path: &Path, width: u32, height: u32) {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 5 % 256) as u8,
            (y * 5 % 256) as u8,
            ((x * y) % 256) as u8,
        ])
    });
    let file = File::create(path).unwrap();
    JpegEncoder::new_with_quality(file, 90)
        .encode_image(&image)
        .unwrap();
}

/// JPEGの先頭バイトだけを持つ壊れたファイル
pub fn write_truncated_jpeg(path: &Path) {
    fs::write(path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F']).unwrap();
}

/// マニフェストを読み込んでJSON配列として返す
pub fn read_manifest(dir: &Path) -> Vec<serde_json::Value> {
    let content = fs::read_to_string(dir.join("output.json")).unwrap();
    serde_json::from_str::<serde_json::Value>(&content)
        .unwrap()
        .as_array()
        .unwrap()
        .clone()
}

/// マニフェスト内のファイル名一覧
pub fn manifest_names(dir: &Path) -> Vec<String> {
    read_manifest(dir)
        .iter()
        .map(|record| record["name"].as_str().unwrap().to_string())
        .collect()
}
