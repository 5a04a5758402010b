use crate::config::ToolSettings;
use crate::tools::{CommandRunner, FfmpegCommand};
use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use std::path::Path;

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    duration: Option<String>,
}

/// 使用 ffprobe 取得影片長度（秒）
pub fn probe_duration(runner: &dyn CommandRunner, tools: &ToolSettings, path: &Path) -> Result<f64> {
    let command = FfmpegCommand::probe(tools, path);
    let output = runner
        .run(&command)
        .with_context(|| format!("ffprobe 執行失敗: {}", path.display()))?;

    let duration = parse_duration(&output.stdout)
        .with_context(|| format!("無法解析影片資訊: {}", path.display()))?;

    if !duration.is_finite() || duration <= 0.0 {
        bail!("影片長度無效 ({duration}): {}", path.display());
    }
    Ok(duration)
}

/// 依序取容器長度、第一個影像串流長度、任一串流長度
fn parse_duration(json: &str) -> Result<f64> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("無法解析 ffprobe 輸出")?;

    let from_format = probe.format.as_ref().and_then(|f| parse_seconds(f.duration.as_deref()));
    if let Some(duration) = from_format {
        return Ok(duration);
    }

    let streams = probe.streams.unwrap_or_default();
    streams
        .iter()
        .filter(|s| s.codec_type.as_deref() == Some("video"))
        .chain(streams.iter())
        .find_map(|s| parse_seconds(s.duration.as_deref()))
        .ok_or_else(|| anyhow!("ffprobe 輸出中沒有影片長度"))
}

fn parse_seconds(value: Option<&str>) -> Option<f64> {
    value.and_then(|v| v.trim().parse::<f64>().ok())
}
