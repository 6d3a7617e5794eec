// スキャン・集計に関連するデータ型定義

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 子ディレクトリを持たないディレクトリ（処理単位）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafDirectory(PathBuf);

impl LeafDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    pub fn into_path(self) -> PathBuf {
        self.0
    }
}

impl AsRef<Path> for LeafDirectory {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// 画像の向き（最も明るい点が中心線のどちら側にあるか）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    Unknown,
}

/// 位相（予約フィールド、未実装）
///
/// 値を持たない型なので、レコードの`phase`は常に`None`（JSONでは`null`）になる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {}

/// 1画像分の特徴レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub dir: String,
    pub name: String,
    pub side: Side,
    pub phase: Option<Phase>,
    /// 輝度ビンごとの正規化頻度（画素数で割った値）
    pub histogram: Vec<f64>,
    /// (幅, 高さ)
    pub size: (u32, u32),
}

impl FeatureRecord {
    pub fn new(
        directory: &Path,
        name: impl Into<String>,
        side: Side,
        histogram: Vec<f64>,
        size: (u32, u32),
    ) -> Self {
        Self {
            dir: directory.display().to_string(),
            name: name.into(),
            side,
            phase: None,
            histogram,
            size,
        }
    }

    pub fn pixel_count(&self) -> u64 {
        self.size.0 as u64 * self.size.1 as u64
    }
}

/// 1ディレクトリ分の集計結果（ディレクトリ一覧の順序を保持）
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    directory: PathBuf,
    records: Vec<FeatureRecord>,
}

impl Manifest {
    pub fn new(directory: impl Into<PathBuf>, records: Vec<FeatureRecord>) -> Self {
        Self {
            directory: directory.into(),
            records,
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn records(&self) -> &[FeatureRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// 個別ファイルの処理結果
#[derive(Debug)]
pub enum FileOutcome {
    /// マニフェストに含まれる（チャート描画の失敗は記録のみ）
    Included {
        record: FeatureRecord,
        chart_error: Option<String>,
    },
    /// 色数が上限を超えたため除外（エラーではない）
    Skipped { file_path: PathBuf, distinct_colors: usize },
    /// 読み込み・抽出に失敗したため除外
    Failed { file_path: PathBuf, error: String },
}

/// 1ディレクトリ分の処理サマリー
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryReport {
    pub directory: PathBuf,
    pub manifest_path: PathBuf,
    pub candidate_files: usize,
    pub included_files: usize,
    pub skipped_files: usize,
    pub failed_files: usize,
    pub chart_failures: usize,
}

/// 失敗したディレクトリとその理由
#[derive(Debug, Clone, PartialEq)]
pub struct DirectoryFailure {
    pub directory: PathBuf,
    pub reason: String,
}

/// 実行全体のサマリー
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunSummary {
    pub leaf_directories: usize,
    pub reports: Vec<DirectoryReport>,
    pub failures: Vec<DirectoryFailure>,
}

impl RunSummary {
    /// 書き込まれたマニフェストのパス一覧
    pub fn written_manifests(&self) -> Vec<&Path> {
        self.reports.iter().map(|r| r.manifest_path.as_path()).collect()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}
