use crate::config::{PreviewSettings, ToolSettings};
use crate::tools::{
    ClipSpec, CommandRunner, FfmpegCommand, ScratchDir, probe_duration, select_clips,
};
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use rand::Rng;
use std::fs;
use std::path::{Path, PathBuf};

/// 預覽片段合成結果
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisReport {
    /// 實際放進預覽的片段（依來源時間排序）
    pub clips: Vec<ClipSpec>,
    pub transitions: usize,
}

/// 預覽片段合成器
///
/// 流程：
/// A. ffprobe 取得影片長度
/// B. 選取互不重疊的子片段（依時間排序）
/// C. 串流複製擷取每個子片段
/// D. 相鄰片段間產生淡入淡出轉場（失敗則改為直接切換）
/// E. 依序合併並重新編碼，驗證大小後移入輸出位置
///
/// 中間檔案都放在暫存目錄，不論成功或失敗都會清除
pub struct PreviewSynthesizer<'a> {
    runner: &'a dyn CommandRunner,
    tools: &'a ToolSettings,
    settings: &'a PreviewSettings,
}

impl<'a> PreviewSynthesizer<'a> {
    #[must_use]
    pub fn new(
        runner: &'a dyn CommandRunner,
        tools: &'a ToolSettings,
        settings: &'a PreviewSettings,
    ) -> Self {
        Self {
            runner,
            tools,
            settings,
        }
    }

    pub fn synthesize<R: Rng>(
        &self,
        source: &Path,
        output: &Path,
        scratch_parent: &Path,
        rng: &mut R,
    ) -> Result<SynthesisReport> {
        // A
        let duration = probe_duration(self.runner, self.tools, source)
            .with_context(|| format!("無法讀取影片，略過預覽: {}", source.display()))?;

        // B
        let clips = select_clips(
            duration,
            self.settings.clip_count,
            self.settings.clip_duration_secs,
            self.settings.sampling_attempts,
            rng,
        );
        if clips.is_empty() {
            bail!("沒有可用的片段: {} ({duration:.2}s)", source.display());
        }
        debug!(
            "選取 {} 段片段 {}: {:?}",
            clips.len(),
            source.display(),
            clips.iter().map(|c| c.start).collect::<Vec<_>>()
        );

        let label = output
            .file_stem()
            .map_or_else(|| "preview".to_string(), |s| s.to_string_lossy().to_string());
        let scratch = ScratchDir::create(scratch_parent, &label)?;

        // C
        let extracted = self.extract_clips(source, &clips, &scratch);
        if extracted.is_empty() {
            bail!("所有片段擷取失敗: {}", source.display());
        }

        // D
        let (segments, transitions) = self.interleave_transitions(&extracted, &scratch);

        // E
        let staged = scratch.join("preview.mp4");
        self.runner
            .run(&FfmpegCommand::concat(self.tools, &segments, &staged))
            .with_context(|| format!("預覽串接失敗: {}", source.display()))?;
        verify_output(&staged, self.settings.min_output_bytes)?;

        fs::rename(&staged, output)
            .with_context(|| format!("無法移動預覽檔至: {}", output.display()))?;

        info!(
            "預覽完成: {}（{} 段片段，{} 個轉場）",
            output.display(),
            extracted.len(),
            transitions
        );

        Ok(SynthesisReport {
            clips: extracted.into_iter().map(|(clip, _)| clip).collect(),
            transitions,
        })
    }

    fn extract_clips(
        &self,
        source: &Path,
        clips: &[ClipSpec],
        scratch: &ScratchDir,
    ) -> Vec<(ClipSpec, PathBuf)> {
        clips
            .iter()
            .enumerate()
            .filter_map(|(i, clip)| {
                let path = scratch.join(&format!("clip_{i:03}.mkv"));
                let result = self
                    .runner
                    .run(&FfmpegCommand::extract_clip(self.tools, source, *clip, &path))
                    .and_then(|_| verify_output(&path, 0));

                match result {
                    Ok(()) => Some((*clip, path)),
                    Err(e) => {
                        warn!("略過第 {i} 段片段 {}: {e:#}", source.display());
                        None
                    }
                }
            })
            .collect()
    }

    /// 產生 `[clip0, transition0, clip1, ...]`；轉場失敗時直接切換
    fn interleave_transitions(
        &self,
        extracted: &[(ClipSpec, PathBuf)],
        scratch: &ScratchDir,
    ) -> (Vec<PathBuf>, usize) {
        let mut segments = Vec::with_capacity(extracted.len() * 2);
        let mut transitions = 0;

        if let Some((_, first)) = extracted.first() {
            segments.push(first.clone());
        }

        for (i, pair) in extracted.windows(2).enumerate() {
            let ((from_clip, from), (to_clip, to)) = (&pair[0], &pair[1]);
            let duration = self
                .settings
                .transition_duration_secs
                .min(from_clip.duration)
                .min(to_clip.duration);

            if duration > 0.0 {
                let path = scratch.join(&format!("transition_{i:03}.mp4"));
                let result = self
                    .runner
                    .run(&FfmpegCommand::transition(self.tools, from, to, duration, &path))
                    .and_then(|_| verify_output(&path, 0));

                match result {
                    Ok(()) => {
                        segments.push(path);
                        transitions += 1;
                    }
                    Err(e) => warn!("第 {i} 個轉場失敗，改為直接切換: {e:#}"),
                }
            }

            segments.push(to.clone());
        }

        (segments, transitions)
    }
}

/// 確認輸出檔案存在且大於 `min_bytes`
fn verify_output(path: &Path, min_bytes: u64) -> Result<()> {
    let size = fs::metadata(path)
        .with_context(|| format!("輸出檔案未產生: {}", path.display()))?
        .len();
    if size <= min_bytes {
        bail!(
            "輸出檔案過小（{size} 位元組，需大於 {min_bytes}）: {}",
            path.display()
        );
    }
    Ok(())
}
