use crate::component::{PreviewGenerator, ThumbnailGenerator};
use crate::config::Config;
use crate::tools::{
    BatchSummary, CommandRunner, LibraryScanner, SystemCommandRunner, WorkItem,
    ensure_directory_exists, validate_directory_exists,
};
use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{Duration, Instant};

/// 前處理流程結果
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub scanned_items: usize,
    pub previews: Option<BatchSummary>,
    pub thumbnails: Option<BatchSummary>,
    pub elapsed: Duration,
}

impl PipelineReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.batches().map(|b| b.succeeded).sum()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.batches().map(|b| b.total).sum()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.batches().map(|b| b.failed).sum()
    }

    fn batches(&self) -> impl Iterator<Item = &BatchSummary> {
        self.previews.iter().chain(self.thumbnails.iter())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stages {
    All,
    ThumbnailsOnly,
    PreviewsOnly,
}

/// 一次性的前處理流程：掃描 → 預覽片段 → 縮圖
///
/// 不保留跨次執行的狀態，待處理項目每次都由檔案系統推得
pub struct MediaPipeline {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    shutdown_signal: Arc<AtomicBool>,
    show_progress: bool,
}

impl MediaPipeline {
    pub fn new(
        config: Config,
        runner: Arc<dyn CommandRunner>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            runner,
            shutdown_signal,
            show_progress: false,
        }
    }

    /// 使用實際的 ffmpeg/ffprobe 與設定的逾時
    pub fn with_system_tools(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        let runner = Arc::new(SystemCommandRunner::new(config.settings.tools.timeout()));
        Self::new(config, runner, shutdown_signal)
    }

    #[must_use]
    pub const fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn run(&self) -> Result<PipelineReport> {
        self.run_stages(Stages::All)
    }

    pub fn run_thumbnails(&self) -> Result<PipelineReport> {
        self.run_stages(Stages::ThumbnailsOnly)
    }

    pub fn run_previews(&self) -> Result<PipelineReport> {
        self.run_stages(Stages::PreviewsOnly)
    }

    fn media_root(&self) -> Result<PathBuf> {
        self.config
            .settings
            .media_root
            .clone()
            .context("尚未設定媒體根目錄")
    }

    fn run_stages(&self, stages: Stages) -> Result<PipelineReport> {
        let started = Instant::now();
        let root = self.media_root()?;
        validate_directory_exists(&root)?;
        info!("開始媒體前處理: {}", root.display());

        let items = self.scan(&root)?;
        let mut report = PipelineReport {
            scanned_items: items.len(),
            ..PipelineReport::default()
        };

        if stages != Stages::ThumbnailsOnly {
            let generator = PreviewGenerator::new(
                self.config.clone(),
                Arc::clone(&self.runner),
                Arc::clone(&self.shutdown_signal),
            );
            report.previews = Some(generator.run(&items, self.show_progress)?);
        }

        if stages != Stages::PreviewsOnly {
            let generator = ThumbnailGenerator::new(
                self.config.clone(),
                Arc::clone(&self.runner),
                Arc::clone(&self.shutdown_signal),
            );
            report.thumbnails = Some(generator.run(&items, self.show_progress)?);
        }

        report.elapsed = started.elapsed();
        info!(
            "前處理完成 - 成功: {}/{}，失敗: {}，耗時: {:.2} 秒",
            report.succeeded(),
            report.total(),
            report.failed(),
            report.elapsed.as_secs_f64()
        );
        Ok(report)
    }

    fn scan(&self, root: &Path) -> Result<Vec<WorkItem>> {
        let settings = &self.config.settings;
        ensure_directory_exists(&settings.thumbnail_dir)?;
        ensure_directory_exists(&settings.preview_dir)?;
        LibraryScanner::new(&self.config).scan(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UserSettings;
    use tempfile::TempDir;

    #[test]
    fn test_missing_media_root_is_error() {
        let output = TempDir::new().unwrap();
        let settings = UserSettings {
            thumbnail_dir: output.path().join("thumbnails"),
            preview_dir: output.path().join("previews"),
            ..UserSettings::default()
        };
        let pipeline = MediaPipeline::with_system_tools(
            Config::with_settings(settings).unwrap(),
            Arc::new(AtomicBool::new(false)),
        );
        assert!(pipeline.run().is_err());
    }

    #[test]
    fn test_empty_library_runs_cleanly() {
        let media = TempDir::new().unwrap();
        let output = TempDir::new().unwrap();
        let settings = UserSettings {
            media_root: Some(media.path().to_path_buf()),
            thumbnail_dir: output.path().join("thumbnails"),
            preview_dir: output.path().join("previews"),
            ..UserSettings::default()
        };
        let pipeline = MediaPipeline::with_system_tools(
            Config::with_settings(settings).unwrap(),
            Arc::new(AtomicBool::new(false)),
        );

        let report = pipeline.run().unwrap();
        assert_eq!(report.scanned_items, 0);
        assert_eq!(report.total(), 0);
        assert!(output.path().join("thumbnails").is_dir());
        assert!(output.path().join("previews").is_dir());
    }

    #[test]
    fn test_report_totals() {
        let report = PipelineReport {
            scanned_items: 5,
            previews: Some(BatchSummary {
                total: 2,
                succeeded: 1,
                failed: 1,
                ..BatchSummary::default()
            }),
            thumbnails: Some(BatchSummary {
                total: 3,
                succeeded: 3,
                ..BatchSummary::default()
            }),
            elapsed: Duration::ZERO,
        };
        assert_eq!(report.total(), 5);
        assert_eq!(report.succeeded(), 4);
        assert_eq!(report.failed(), 1);
    }
}
