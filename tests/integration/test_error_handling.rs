// エラーハンドリング統合テスト
use crate::fixtures::*;
use leaf_histogram::chart::NoOpChartRenderer;
use leaf_histogram::core::ScanError;
use leaf_histogram::extractor::standard::ImageFeatureExtractor;
use leaf_histogram::manifest::JsonManifestWriter;
use leaf_histogram::processing::{DefaultProcessingConfig, NoOpProgressReporter};
use leaf_histogram::App;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[tokio::test]
async fn test_listing_error_during_scan_writes_no_manifest() {
    let temp_dir = TempDir::new().unwrap();
    let dir_a = temp_dir.path().join("A");
    let dir_b = temp_dir.path().join("B");
    fs::create_dir_all(&dir_a).unwrap();
    fs::create_dir_all(&dir_b).unwrap();
    write_gray_jpeg(&dir_a.join("a.jpg"), 16, 16, 2);

    let storage = RecordingStorage::failing_on(&dir_b);
    let app = App::new(
        storage.clone(),
        ImageFeatureExtractor::new(),
        NoOpChartRenderer::new(),
        JsonManifestWriter::new(),
        NoOpProgressReporter::new(),
        &DefaultProcessingConfig::default(),
    )
    .unwrap();

    let result = app.run(temp_dir.path()).await;

    assert!(matches!(result, Err(ScanError::DirectoryListError { .. })));
    assert!(!dir_a.join("output.json").exists());
    assert!(storage.read_files().is_empty());
}

#[tokio::test]
async fn test_nonexistent_root_fails() {
    let temp_dir = TempDir::new().unwrap();
    let app = App::new(
        RecordingStorage::new(),
        ImageFeatureExtractor::new(),
        NoOpChartRenderer::new(),
        JsonManifestWriter::new(),
        NoOpProgressReporter::new(),
        &DefaultProcessingConfig::default(),
    )
    .unwrap();

    let result = app.run(&temp_dir.path().join("missing")).await;

    assert!(matches!(result, Err(ScanError::DirectoryListError { .. })));
}

#[tokio::test]
async fn test_corrupt_image_is_excluded_and_others_kept() {
    let temp_dir = TempDir::new().unwrap();
    write_truncated_jpeg(&temp_dir.path().join("broken.jpg"));
    write_gray_jpeg(&temp_dir.path().join("good.jpg"), 20, 20, 3);
    fs::write(temp_dir.path().join("readme.txt"), "not an image").unwrap();

    let app = App::new(
        RecordingStorage::new(),
        ImageFeatureExtractor::new(),
        NoOpChartRenderer::new(),
        JsonManifestWriter::new(),
        NoOpProgressReporter::new(),
        &DefaultProcessingConfig::default(),
    )
    .unwrap();

    let summary = app.run(temp_dir.path()).await.unwrap();

    let report = &summary.reports[0];
    assert_eq!(report.candidate_files, 2);
    assert_eq!(report.failed_files, 1);
    assert_eq!(manifest_names(temp_dir.path()), vec!["good.jpg"]);
}

#[tokio::test]
async fn test_histogram_timeout_excludes_only_that_file() {
    let temp_dir = TempDir::new().unwrap();
    write_gray_jpeg(&temp_dir.path().join("fast.jpg"), 20, 20, 3);
    write_gray_jpeg(&temp_dir.path().join("slow.jpg"), 20, 20, 3);

    let extractor =
        DelayedExtractor::new().with_histogram_delay("slow.jpg", Duration::from_secs(10));
    let app = App::new(
        RecordingStorage::new(),
        extractor,
        NoOpChartRenderer::new(),
        JsonManifestWriter::new(),
        NoOpProgressReporter::new(),
        &DefaultProcessingConfig::default().with_extraction_timeout(Duration::from_millis(500)),
    )
    .unwrap();

    let summary = app.run(temp_dir.path()).await.unwrap();

    assert_eq!(summary.reports[0].failed_files, 1);
    assert_eq!(manifest_names(temp_dir.path()), vec!["fast.jpg"]);
}

#[tokio::test]
async fn test_orientation_timeout_degrades_to_unknown() {
    let temp_dir = TempDir::new().unwrap();
    write_gray_jpeg(&temp_dir.path().join("a.jpg"), 20, 20, 3);

    let extractor =
        DelayedExtractor::new().with_orientation_delay("a.jpg", Duration::from_secs(10));
    let app = App::new(
        RecordingStorage::new(),
        extractor,
        NoOpChartRenderer::new(),
        JsonManifestWriter::new(),
        NoOpProgressReporter::new(),
        &DefaultProcessingConfig::default().with_extraction_timeout(Duration::from_millis(500)),
    )
    .unwrap();

    app.run(temp_dir.path()).await.unwrap();

    let records = read_manifest(temp_dir.path());
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["side"], "unknown");
    assert_eq!(records[0]["size"], serde_json::json!([20, 20]));
}

#[tokio::test]
async fn test_leaf_without_images_gets_empty_manifest() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("notes.txt"), "nothing to see").unwrap();

    let app = App::new(
        RecordingStorage::new(),
        ImageFeatureExtractor::new(),
        NoOpChartRenderer::new(),
        JsonManifestWriter::new(),
        NoOpProgressReporter::new(),
        &DefaultProcessingConfig::default(),
    )
    .unwrap();

    let summary = app.run(temp_dir.path()).await.unwrap();

    assert_eq!(summary.reports[0].candidate_files, 0);
    assert!(read_manifest(temp_dir.path()).is_empty());
}
