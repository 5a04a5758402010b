use anyhow::{Context, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 暫存目錄名稱中標籤的最大長度（位元組）
pub const MAX_LABEL_LEN: usize = 48;

/// 暫存目錄，離開作用域時自動清理
///
/// 名稱為截短後的標籤加上隨機 UUID，平行任務不會共用目錄，
/// 標籤再長名稱也不會超過檔案系統限制。
#[derive(Debug)]
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn create(parent: &Path, label: &str) -> Result<Self> {
        let label = truncate_label(label);
        let path = parent.join(format!(".tmp_{label}_{}", Uuid::new_v4().simple()));
        fs::create_dir_all(&path)
            .with_context(|| format!("無法建立暫存目錄: {}", path.display()))?;
        debug!("建立暫存目錄: {}", path.display());
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn join(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

fn truncate_label(label: &str) -> &str {
    if label.len() <= MAX_LABEL_LEN {
        return label;
    }
    let mut end = MAX_LABEL_LEN;
    while !label.is_char_boundary(end) {
        end -= 1;
    }
    &label[..end]
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if self.path.exists() && fs::remove_dir_all(&self.path).is_err() {
            warn!("暫存目錄清理失敗: {}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scratch_dir_removed_on_drop() {
        let temp_dir = TempDir::new().unwrap();
        let path = {
            let scratch = ScratchDir::create(temp_dir.path(), "clip").unwrap();
            fs::write(scratch.join("clip_000.mkv"), b"data").unwrap();
            assert!(scratch.path().is_dir());
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_scratch_dir_removed_on_early_return() {
        fn failing_step(parent: &Path) -> Result<PathBuf> {
            let scratch = ScratchDir::create(parent, "clip")?;
            fs::write(scratch.join("partial.mp4"), b"x")?;
            let path = scratch.path().to_path_buf();
            anyhow::bail!("step failed in {}", path.display())
        }

        let temp_dir = TempDir::new().unwrap();
        assert!(failing_step(temp_dir.path()).is_err());
        assert_eq!(fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_scratch_dirs_are_unique() {
        let temp_dir = TempDir::new().unwrap();
        let a = ScratchDir::create(temp_dir.path(), "same").unwrap();
        let b = ScratchDir::create(temp_dir.path(), "same").unwrap();
        assert_ne!(a.path(), b.path());
        assert!(a.path().file_name().unwrap().to_string_lossy().starts_with(".tmp_same_"));
    }

    #[test]
    fn test_long_label_is_truncated() {
        let temp_dir = TempDir::new().unwrap();
        let label = "%E5%BD%B1".repeat(30);
        let scratch = ScratchDir::create(temp_dir.path(), &label).unwrap();

        let name = scratch.path().file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with(&format!(".tmp_{}", &label[..MAX_LABEL_LEN])));
        assert_eq!(name.len(), ".tmp_".len() + MAX_LABEL_LEN + 1 + 32);
    }

    #[test]
    fn test_truncate_label_respects_char_boundaries() {
        let label = "影".repeat(20);
        let cut = truncate_label(&label);
        assert!(cut.len() <= MAX_LABEL_LEN);
        assert_eq!(cut, "影".repeat(16));
        assert_eq!(truncate_label("short"), "short");
    }
}
