use super::synthesizer::{PreviewSynthesizer, SynthesisReport};
use crate::config::Config;
use crate::tools::{
    AssetKind, BatchExecutor, BatchSummary, CommandRunner, ItemOutcome, MediaClassifier,
    MediaKind, PREVIEW_SUFFIX, WorkItem, ensure_directory_exists,
};
use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 預覽片段產生器
pub struct PreviewGenerator {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    shutdown_signal: Arc<AtomicBool>,
}

impl PreviewGenerator {
    pub fn new(
        config: Config,
        runner: Arc<dyn CommandRunner>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            config,
            runner,
            shutdown_signal,
        }
    }

    /// 處理所有預覽任務，其他種類的任務略過
    pub fn run(&self, items: &[WorkItem], show_progress: bool) -> Result<BatchSummary> {
        let settings = &self.config.settings;
        ensure_directory_exists(&settings.preview_dir)?;

        let previews: Vec<WorkItem> = items
            .iter()
            .filter(|item| item.kind == AssetKind::Preview)
            .cloned()
            .collect();

        BatchExecutor::new(
            "預覽片段",
            settings.preview.workers,
            Arc::clone(&self.shutdown_signal),
        )
        .with_progress_bar(show_progress)
        .run(&previews, |item| self.generate(item))
    }

    /// 預覽檔已存在就不重新產生（即使來源較新），刪除預覽檔即可強制重建
    pub fn generate(&self, item: &WorkItem) -> Result<ItemOutcome> {
        if item.target.exists() {
            debug!("略過已存在的預覽檔: {}", item.target.display());
            return Ok(ItemOutcome::UpToDate);
        }

        let settings = &self.config.settings;
        PreviewSynthesizer::new(self.runner.as_ref(), &settings.tools, &settings.preview)
            .synthesize(
                &item.source.path,
                &item.target,
                &settings.preview_dir,
                &mut rand::rng(),
            )?;

        Ok(ItemOutcome::Generated)
    }

    /// 為單一影片產生預覽檔，輸出到指定位置
    ///
    /// `output` 若是既有資料夾，檔名為 `<來源檔名>_preview.mp4`；
    /// 既有的輸出檔會被覆蓋。回傳實際寫入的路徑。
    pub fn preview_single(&self, source: &Path, output: &Path) -> Result<(PathBuf, SynthesisReport)> {
        if !source.is_file() {
            bail!("來源不是檔案: {}", source.display());
        }
        let file_name = source
            .file_name()
            .with_context(|| format!("來源沒有檔名: {}", source.display()))?;
        let classifier = MediaClassifier::new(&self.config.media_type_table);
        if classifier.classify(&file_name.to_string_lossy()) != Some(MediaKind::Video) {
            bail!("不是支援的影片格式: {}", source.display());
        }

        let target = if output.is_dir() {
            let mut name = file_name.to_os_string();
            name.push(PREVIEW_SUFFIX);
            output.join(name)
        } else {
            output.to_path_buf()
        };
        let parent = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        ensure_directory_exists(&parent)?;

        let settings = &self.config.settings;
        let report =
            PreviewSynthesizer::new(self.runner.as_ref(), &settings.tools, &settings.preview)
                .synthesize(source, &target, &parent, &mut rand::rng())?;

        info!("單一預覽完成: {} -> {}", source.display(), target.display());
        Ok((target, report))
    }
}
