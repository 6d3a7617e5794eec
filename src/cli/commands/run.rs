use crate::chart::svg::SvgChartRenderer;
use crate::chart::{ChartRenderer, NoOpChartRenderer};
use crate::cli::Cli;
use crate::core::RunSummary;
use crate::extractor::standard::ImageFeatureExtractor;
use crate::extractor::FeatureExtractor;
use crate::manifest::JsonManifestWriter;
use crate::processing::{
    ConsoleProgressReporter, DefaultProcessingConfig, ProcessingConfig,
};
use crate::storage::local::LocalStorageBackend;
use crate::App;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// コマンドライン引数から組み立てた実行設定
pub struct RunConfig {
    pub root: PathBuf,
    pub processing: DefaultProcessingConfig,
    pub quiet: bool,
}

impl RunConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let mut processing = DefaultProcessingConfig::default()
            .with_extraction_timeout(Duration::from_secs(cli.timeout_secs))
            .with_max_colors(cli.max_colors)
            .with_side_mapping(cli.side_mapping)
            .with_chart_rendering(!cli.no_charts);

        if let Some(threads) = cli.threads {
            processing = processing.with_max_concurrent(threads);
        }

        Self {
            root: cli.dir.clone(),
            processing,
            quiet: cli.quiet,
        }
    }
}

/// ルートディレクトリ以下を処理してマニフェストとチャートを書き込む
pub async fn execute_run(config: RunConfig) -> Result<RunSummary> {
    // Validate target directory
    if !config.root.exists() {
        anyhow::bail!("Target directory does not exist: {}", config.root.display());
    }

    if !config.root.is_dir() {
        anyhow::bail!("Target path is not a directory: {}", config.root.display());
    }

    if !config.quiet {
        println!("🔍 リーフディレクトリ処理開始");
        println!("   - 対象ディレクトリ: {}", config.root.display());
        println!(
            "   - 並行処理数: {}",
            config.processing.max_concurrent_tasks()
        );
        println!(
            "   - タイムアウト: {}s",
            config.processing.extraction_timeout().as_secs()
        );
        println!("   - 最大色数: {}", config.processing.max_colors());
    }

    if config.processing.render_charts() {
        run_with_charts(config, SvgChartRenderer::new()).await
    } else {
        run_with_charts(config, NoOpChartRenderer::new()).await
    }
}

async fn run_with_charts<G>(config: RunConfig, charts: G) -> Result<RunSummary>
where
    G: ChartRenderer + 'static,
{
    let reporter = if config.quiet {
        ConsoleProgressReporter::quiet()
    } else {
        ConsoleProgressReporter::new()
    };

    let extractor = ImageFeatureExtractor::new();
    tracing::debug!(
        extractor = extractor.strategy_name(),
        blur_sigma = extractor.blur_sigma(),
        "feature extractor ready"
    );

    let app = App::new(
        LocalStorageBackend::new(),
        extractor,
        charts,
        JsonManifestWriter::new(),
        reporter,
        &config.processing,
    )?;

    let summary = app.run(&config.root).await?;
    Ok(summary)
}
