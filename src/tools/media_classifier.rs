use crate::config::MediaTypeTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Image,
}

/// 依副檔名判斷媒體類型（不分大小寫，依設定順序比對）
#[derive(Debug, Clone)]
pub struct MediaClassifier {
    video_suffixes: Vec<String>,
    image_suffixes: Vec<String>,
}

impl MediaClassifier {
    #[must_use]
    pub fn new(table: &MediaTypeTable) -> Self {
        Self {
            video_suffixes: normalize(&table.video_file),
            image_suffixes: normalize(&table.image_file),
        }
    }

    /// 非影片也非圖片時回傳 `None`
    #[must_use]
    pub fn classify(&self, file_name: &str) -> Option<MediaKind> {
        let lower = file_name.to_lowercase();
        if self.video_suffixes.iter().any(|s| lower.ends_with(s.as_str())) {
            Some(MediaKind::Video)
        } else if self.image_suffixes.iter().any(|s| lower.ends_with(s.as_str())) {
            Some(MediaKind::Image)
        } else {
            None
        }
    }
}

fn normalize(suffixes: &[String]) -> Vec<String> {
    suffixes
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
