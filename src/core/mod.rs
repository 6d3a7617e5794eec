// コアモジュール - エラー型とデータ構造定義

pub mod error;
pub mod types;

pub use error::{ScanError, ScanResult};
pub use types::*;
