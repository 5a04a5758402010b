use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

pub const MAX_RECENT_PATHS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
    #[serde(rename = "IMAGE_FILE")]
    pub image_file: Vec<String>,
}

impl MediaTypeTable {
    /// 回傳同時出現在影片與圖片清單中的副檔名（不分大小寫，忽略前後空白）
    #[must_use]
    pub fn overlapping_extensions(&self) -> Vec<String> {
        let images: Vec<String> = self.image_file.iter().map(|e| e.trim().to_lowercase()).collect();
        self.video_file
            .iter()
            .map(|ext| ext.trim().to_lowercase())
            .filter(|ext| images.contains(ext))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThumbnailSettings {
    pub workers: usize,
    pub width: u32,
    pub height: u32,
    pub jpeg_quality: u8,
    /// 無法取得影片長度時使用的預設值（秒）
    pub fallback_duration_secs: f64,
}

impl Default for ThumbnailSettings {
    fn default() -> Self {
        Self {
            workers: 6,
            width: 400,
            height: 225,
            jpeg_quality: 80,
            fallback_duration_secs: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PreviewSettings {
    pub workers: usize,
    pub clip_count: usize,
    pub clip_duration_secs: f64,
    pub transition_duration_secs: f64,
    pub min_output_bytes: u64,
    pub sampling_attempts: usize,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            workers: 4,
            clip_count: 4,
            clip_duration_secs: 5.0,
            transition_duration_secs: 1.0,
            min_output_bytes: 1024,
            sampling_attempts: 1000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg: String,
    pub ffprobe: String,
    /// 單次呼叫的逾時秒數，0 表示不限制
    pub timeout_secs: u64,
}

impl ToolSettings {
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        if self.timeout_secs == 0 {
            None
        } else {
            Some(Duration::from_secs(self.timeout_secs))
        }
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            ffmpeg: "ffmpeg".to_string(),
            ffprobe: "ffprobe".to_string(),
            timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserSettings {
    pub media_root: Option<PathBuf>,
    pub recent_paths: Vec<String>,
    pub thumbnail_dir: PathBuf,
    pub preview_dir: PathBuf,
    pub excluded_dirs: Vec<String>,
    pub thumbnail: ThumbnailSettings,
    pub preview: PreviewSettings,
    pub tools: ToolSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            media_root: None,
            recent_paths: Vec::new(),
            thumbnail_dir: PathBuf::from("thumbnails"),
            preview_dir: PathBuf::from("previews"),
            excluded_dirs: vec![
                "$RECYCLE.BIN".to_string(),
                "System Volume Information".to_string(),
            ],
            thumbnail: ThumbnailSettings::default(),
            preview: PreviewSettings::default(),
            tools: ToolSettings::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub media_type_table: MediaTypeTable,
    pub settings: UserSettings,
}
