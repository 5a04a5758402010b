use crate::config::Config;
use crate::tools::{MediaClassifier, MediaKind, preview_file_name, thumbnail_file_name, validate_directory_exists};
use anyhow::Result;
use log::{info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Instant, SystemTime};
use walkdir::{DirEntry, WalkDir};

/// 媒體根目錄下的一個原始檔案
#[derive(Debug, Clone)]
pub struct SourceAsset {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub kind: MediaKind,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Thumbnail,
    Preview,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thumbnail => write!(f, "縮圖"),
            Self::Preview => write!(f, "預覽片段"),
        }
    }
}

/// 一個待處理的衍生檔產生任務
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub source: SourceAsset,
    pub target: PathBuf,
    pub kind: AssetKind,
}

pub struct LibraryScanner {
    classifier: MediaClassifier,
    excluded_dirs: Vec<String>,
    thumbnail_dir: PathBuf,
    preview_dir: PathBuf,
}

impl LibraryScanner {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: MediaClassifier::new(&config.media_type_table),
            excluded_dirs: config
                .settings
                .excluded_dirs
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            thumbnail_dir: config.settings.thumbnail_dir.clone(),
            preview_dir: config.settings.preview_dir.clone(),
        }
    }

    /// 掃描整個媒體目錄，回傳所有縮圖與預覽任務
    ///
    /// 每個媒體檔產生一個縮圖任務，影片另外產生一個預覽任務；結果依路徑排序
    pub fn scan(&self, root: &Path) -> Result<Vec<WorkItem>> {
        validate_directory_exists(root)?;
        let started = Instant::now();

        let output_dirs: Vec<PathBuf> = [&self.thumbnail_dir, &self.preview_dir]
            .into_iter()
            .filter_map(|dir| dir.canonicalize().ok())
            .collect();

        let mut items = Vec::new();
        let mut video_count = 0usize;
        let mut image_count = 0usize;

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry, &output_dirs));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("無法存取: {e}");
                    continue;
                }
            };
            // 檔案捷徑要處理，資料夾捷徑不展開
            if !entry.path().is_file() {
                continue;
            }

            let Some(source) = self.source_asset(root, &entry) else {
                continue;
            };

            match source.kind {
                MediaKind::Video => video_count += 1,
                MediaKind::Image => image_count += 1,
            }

            if source.kind == MediaKind::Video {
                items.push(WorkItem {
                    target: self.preview_dir.join(preview_file_name(&source.relative_path)),
                    kind: AssetKind::Preview,
                    source: source.clone(),
                });
            }
            items.push(WorkItem {
                target: self.thumbnail_dir.join(thumbnail_file_name(&source.relative_path)),
                kind: AssetKind::Thumbnail,
                source,
            });
        }

        info!(
            "掃描完成：{} 個媒體檔（影片 {video_count}、圖片 {image_count}），耗時 {:.1} 秒",
            video_count + image_count,
            started.elapsed().as_secs_f64()
        );
        Ok(items)
    }

    fn source_asset(&self, root: &Path, entry: &DirEntry) -> Option<SourceAsset> {
        let file_name = entry.file_name().to_string_lossy();
        let kind = self.classifier.classify(&file_name)?;
        let relative_path = entry.path().strip_prefix(root).ok()?.to_path_buf();
        let modified = fs::metadata(entry.path())
            .and_then(|m| m.modified())
            .ok();

        Some(SourceAsset {
            path: entry.path().to_path_buf(),
            relative_path,
            kind,
            modified,
        })
    }

    fn is_excluded(&self, entry: &DirEntry, output_dirs: &[PathBuf]) -> bool {
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            return false;
        }
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if self.excluded_dirs.contains(&name) {
            return true;
        }
        entry
            .path()
            .canonicalize()
            .is_ok_and(|path| output_dirs.contains(&path))
    }
}
