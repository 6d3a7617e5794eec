// テストユーティリティとモック実装
// 画像生成ヘルパーと、遅延・失敗を注入するラッパー

pub mod images;
pub mod mocks;

// 公開API
pub use images::*;
pub use mocks::*;
