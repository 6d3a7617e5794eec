// リーフディレクトリ処理のモジュール
//
// config: 処理設定、reporting: 進捗報告、processor: ファンアウト・ファンイン

pub mod config;
pub mod processor;
pub mod reporting;

pub use config::{DefaultProcessingConfig, ProcessingConfig};
pub use processor::DirectoryProcessor;
pub use reporting::{ConsoleProgressReporter, NoOpProgressReporter, ProgressReporter};
