use crate::config::{ThumbnailSettings, ToolSettings};
use crate::tools::{CommandRunner, FfmpegCommand, probe_duration};
use anyhow::{Context, Result, bail};
use log::{debug, warn};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// 隨機選取截圖時間點：`[1, max(2, duration - 1)]` 秒
#[must_use]
pub fn pick_seek_offset<R: Rng>(duration: f64, rng: &mut R) -> f64 {
    let upper = (duration - 1.0).max(2.0);
    rng.random_range(1.0..=upper)
}

/// 擷取影片中的一個畫格作為縮圖
///
/// 無法取得長度時改用預設長度決定時間點；
/// 若隨機時間點沒有擷取到畫格，再從第 0 秒重試一次。
pub fn generate_video_thumbnail<R: Rng>(
    runner: &dyn CommandRunner,
    tools: &ToolSettings,
    settings: &ThumbnailSettings,
    source: &Path,
    target: &Path,
    rng: &mut R,
) -> Result<()> {
    let duration = probe_duration(runner, tools, source).unwrap_or_else(|e| {
        warn!(
            "使用預設長度 {} 秒: {}: {e:#}",
            settings.fallback_duration_secs,
            source.display()
        );
        settings.fallback_duration_secs
    });

    let seek = pick_seek_offset(duration, rng);
    let partial = partial_path(target);

    let result = extract_frame(runner, tools, settings, source, seek, &partial).or_else(|e| {
        debug!("從第 0 秒重試 {}: {e:#}", source.display());
        extract_frame(runner, tools, settings, source, 0.0, &partial)
    });

    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, target)
        .with_context(|| format!("無法移動縮圖至: {}", target.display()))
}

fn extract_frame(
    runner: &dyn CommandRunner,
    tools: &ToolSettings,
    settings: &ThumbnailSettings,
    source: &Path,
    seek: f64,
    output: &Path,
) -> Result<()> {
    let command = FfmpegCommand::extract_frame(
        tools,
        source,
        seek,
        (settings.width, settings.height),
        output,
    );
    runner.run(&command)?;

    match fs::metadata(output) {
        Ok(meta) if meta.len() > 0 => Ok(()),
        _ => bail!("在 {seek:.2} 秒未擷取到畫格: {}", source.display()),
    }
}

/// 寫入完成前使用的暫存檔路徑（同目錄的隱藏檔）
pub(super) fn partial_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map_or_else(|| "thumbnail".to_string(), |n| n.to_string_lossy().to_string());
    target.with_file_name(format!(".{name}.partial.jpg"))
}
