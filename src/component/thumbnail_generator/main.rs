use super::image_thumbnail::generate_image_thumbnail;
use super::video_thumbnail::generate_video_thumbnail;
use crate::config::Config;
use crate::tools::{
    AssetKind, BatchExecutor, BatchSummary, CommandRunner, ItemOutcome, MediaKind, WorkItem,
    ensure_directory_exists, needs_regeneration,
};
use anyhow::Result;
use log::debug;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// 縮圖產生器
///
/// 只在縮圖不存在或比來源舊時重新產生
pub struct ThumbnailGenerator {
    config: Config,
    runner: Arc<dyn CommandRunner>,
    shutdown_signal: Arc<AtomicBool>,
}

impl ThumbnailGenerator {
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

    /// 處理所有縮圖任務，其他種類的任務略過
    pub fn run(&self, items: &[WorkItem], show_progress: bool) -> Result<BatchSummary> {
        let settings = &self.config.settings;
        ensure_directory_exists(&settings.thumbnail_dir)?;

        let thumbnails: Vec<WorkItem> = items
            .iter()
            .filter(|item| item.kind == AssetKind::Thumbnail)
            .cloned()
            .collect();

        BatchExecutor::new(
            "縮圖",
            settings.thumbnail.workers,
            Arc::clone(&self.shutdown_signal),
        )
        .with_progress_bar(show_progress)
        .run(&thumbnails, |item| self.generate(item))
    }

    pub fn generate(&self, item: &WorkItem) -> Result<ItemOutcome> {
        if !needs_regeneration(&item.source.path, &item.target) {
            debug!("縮圖已是最新: {}", item.target.display());
            return Ok(ItemOutcome::UpToDate);
        }

        let settings = &self.config.settings;
        match item.source.kind {
            MediaKind::Video => generate_video_thumbnail(
                self.runner.as_ref(),
                &settings.tools,
                &settings.thumbnail,
                &item.source.path,
                &item.target,
                &mut rand::rng(),
            )?,
            MediaKind::Image => {
                generate_image_thumbnail(&settings.thumbnail, &item.source.path, &item.target)?;
            }
        }

        debug!("縮圖完成: {}", item.target.display());
        Ok(ItemOutcome::Generated)
    }
}
