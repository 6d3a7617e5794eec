// 最も明るい点と縦の中心線の比較による向き判定

use super::BrightestPoint;
use crate::core::Side;

/// 中心線のどちら側を`Left`とみなすかの対応付け
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SideMapping {
    /// 中心線より左にあれば`Left`
    #[default]
    Direct,
    /// 中心線より左にあれば`Right`
    Mirrored,
}

impl SideMapping {
    /// 明るい点の画素中心（x + 0.5）を中心線（width / 2）と比較する
    ///
    /// ちょうど中心線上の場合は`Unknown`。
    pub fn classify(self, point: &BrightestPoint) -> Side {
        // 2倍して整数のまま比較
        let center = 2 * point.x as u64 + 1;
        let midline = point.width as u64;

        let left_of_midline = match center.cmp(&midline) {
            std::cmp::Ordering::Less => true,
            std::cmp::Ordering::Greater => false,
            std::cmp::Ordering::Equal => return Side::Unknown,
        };

        match (self, left_of_midline) {
            (Self::Direct, true) | (Self::Mirrored, false) => Side::Left,
            (Self::Direct, false) | (Self::Mirrored, true) => Side::Right,
        }
    }
}
