use crate::config::types::{Config, MediaTypeTable, UserSettings};
use anyhow::{Context, Result, bail};
use log::warn;
use std::fs;
use std::path::Path;

/// 編譯時嵌入的媒體類型設定（不需要外部檔案）
const MEDIA_TYPE_TABLE_JSON: &str = include_str!("data/media_type_table.json");

pub const SETTINGS_FILE: &str = "settings.json";

impl Config {
    pub fn new() -> Result<Self> {
        let settings = match Self::load_settings(Path::new(SETTINGS_FILE)) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("改用預設設定: {e:#}");
                UserSettings::default()
            }
        };
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: UserSettings) -> Result<Self> {
        let media_type_table = Self::load_embedded_media_type_table()?;
        Self::from_parts(media_type_table, settings)
    }

    pub fn from_parts(media_type_table: MediaTypeTable, settings: UserSettings) -> Result<Self> {
        let overlap = media_type_table.overlapping_extensions();
        if !overlap.is_empty() {
            bail!(
                "副檔名同時列為影片與圖片: {}",
                overlap.join(", ")
            );
        }
        if settings.preview.clip_count == 0 {
            bail!("預覽片段數至少為 1");
        }
        if settings.preview.clip_duration_secs <= 0.0 {
            bail!("預覽片段長度必須大於 0");
        }

        Ok(Self {
            media_type_table,
            settings,
        })
    }

    pub fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析設定檔: {}", path.display()))
    }

    fn load_embedded_media_type_table() -> Result<MediaTypeTable> {
        serde_json::from_str(MEDIA_TYPE_TABLE_JSON).context("無法解析內建的媒體類型表")
    }
}
