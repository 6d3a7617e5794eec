// スキャン・集計処理専用のカスタムエラー型定義

use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// スキャンパイプライン固有のエラー型
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("ディレクトリ一覧取得エラー: {} - {source}", .path.display())]
    DirectoryListError {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("ファイル読み込みエラー: {} - {source}", .path.display())]
    FileReadError {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("特徴抽出エラー: {} ({operation}) - {source}", .path.display())]
    ExtractionError {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: anyhow::Error,
    },

    #[error("特徴抽出タイムアウト: {} ({operation}, {}ms)", .path.display(), .timeout.as_millis())]
    ExtractionTimeout {
        path: PathBuf,
        operation: &'static str,
        timeout: Duration,
    },

    #[error("マニフェスト書き込みエラー: {} - {source}", .path.display())]
    ManifestWriteError {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("チャート描画エラー: {label} - {source}")]
    ChartRenderError {
        label: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },
}

impl ScanError {
    /// ディレクトリ一覧取得エラーの作成
    pub fn directory_list(path: impl AsRef<Path>, source: anyhow::Error) -> Self {
        Self::DirectoryListError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// ファイル読み込みエラーの作成
    pub fn file_read(path: impl AsRef<Path>, source: anyhow::Error) -> Self {
        Self::FileReadError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// 特徴抽出エラーの作成
    pub fn extraction(path: impl AsRef<Path>, operation: &'static str, source: anyhow::Error) -> Self {
        Self::ExtractionError {
            path: path.as_ref().to_path_buf(),
            operation,
            source,
        }
    }

    /// 特徴抽出タイムアウトの作成
    pub fn extraction_timeout(path: impl AsRef<Path>, operation: &'static str, timeout: Duration) -> Self {
        Self::ExtractionTimeout {
            path: path.as_ref().to_path_buf(),
            operation,
            timeout,
        }
    }

    /// マニフェスト書き込みエラーの作成
    pub fn manifest_write(path: impl AsRef<Path>, source: anyhow::Error) -> Self {
        Self::ManifestWriteError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// チャート描画エラーの作成
    pub fn chart_render(label: impl Into<String>, source: anyhow::Error) -> Self {
        Self::ChartRenderError {
            label: label.into(),
            source,
        }
    }

    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// タスクエラーの作成
    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    /// エラーに関連するパス（あれば）
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::DirectoryListError { path, .. }
            | Self::FileReadError { path, .. }
            | Self::ExtractionError { path, .. }
            | Self::ExtractionTimeout { path, .. }
            | Self::ManifestWriteError { path, .. } => Some(path),
            Self::ChartRenderError { .. }
            | Self::ConfigurationError { .. }
            | Self::TaskError { .. } => None,
        }
    }
}

/// スキャン処理の結果型
pub type ScanResult<T> = Result<T, ScanError>;
