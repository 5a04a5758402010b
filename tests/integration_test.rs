//! 整合測試 - 以模擬的轉檔工具驗證整個前處理流程
//!
//! 影片交給 `FakeTranscoder`（每個輸出寫入假資料），圖片使用真正的解碼器

use std::collections::HashSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use anyhow::{Result, anyhow};
use image::{Rgb, RgbImage};
use librify::component::{MediaPipeline, ThumbnailGenerator};
use librify::config::{Config, UserSettings};
use librify::tools::{
    AssetKind, CommandRunner, FfmpegCommand, LibraryScanner, ToolOperation, ToolOutput,
    derive_name,
};
use tempfile::TempDir;

struct FakeTranscoder {
    duration: f64,
    commands: Mutex<Vec<ToolOperation>>,
}

impl FakeTranscoder {
    fn new(duration: f64) -> Arc<Self> {
        Arc::new(Self {
            duration,
            commands: Mutex::new(Vec::new()),
        })
    }

    fn command_count(&self) -> usize {
        self.commands.lock().unwrap().len()
    }
}

impl CommandRunner for FakeTranscoder {
    fn run(&self, command: &FfmpegCommand) -> Result<ToolOutput> {
        self.commands
            .lock()
            .unwrap()
            .push(command.operation().clone());

        if *command.operation() == ToolOperation::Probe {
            return Ok(ToolOutput {
                stdout: format!(r#"{{"format": {{"duration": "{}"}}}}"#, self.duration),
                stderr: String::new(),
            });
        }

        let output = command
            .output_path()
            .ok_or_else(|| anyhow!("命令沒有輸出路徑"))?;
        fs::write(output, vec![7u8; 4096])?;
        Ok(ToolOutput::default())
    }
}

struct Library {
    media: TempDir,
    output: TempDir,
}

impl Library {
    fn new() -> Self {
        Self {
            media: TempDir::new().unwrap(),
            output: TempDir::new().unwrap(),
        }
    }

    fn config(&self) -> Config {
        Config::with_settings(UserSettings {
            media_root: Some(self.media.path().to_path_buf()),
            thumbnail_dir: self.thumbnail_dir(),
            preview_dir: self.preview_dir(),
            ..UserSettings::default()
        })
        .unwrap()
    }

    fn thumbnail_dir(&self) -> PathBuf {
        self.output.path().join("thumbnails")
    }

    fn preview_dir(&self) -> PathBuf {
        self.output.path().join("previews")
    }

    fn add_video(&self, relative: &str) -> PathBuf {
        let path = self.media.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, b"not really a video").unwrap();
        path
    }

    fn add_image(&self, relative: &str) -> PathBuf {
        let path = self.media.path().join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        RgbImage::from_pixel(320, 240, Rgb([40, 90, 160]))
            .save_with_format(&path, image::ImageFormat::Jpeg)
            .unwrap();
        path
    }

    fn pipeline(&self, runner: Arc<FakeTranscoder>) -> MediaPipeline {
        MediaPipeline::new(self.config(), runner, Arc::new(AtomicBool::new(false)))
    }
}

fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path).unwrap().modified().unwrap()
}

fn set_mtime(path: &Path, time: SystemTime) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(time)
        .unwrap();
}

/// 測試 1: 一部影片加一張圖片產生三個衍生檔
#[test]
fn test_video_and_image_produce_assets() {
    let library = Library::new();
    library.add_video("a.mp4");
    library.add_image("b.jpg");

    let runner = FakeTranscoder::new(30.0);
    let report = library.pipeline(Arc::clone(&runner)).run().unwrap();

    assert_eq!(report.scanned_items, 3);
    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.failed(), 0);

    let preview = library.preview_dir().join("a.mp4_preview.mp4");
    assert!(fs::metadata(&preview).unwrap().len() > 1024);
    assert!(library.thumbnail_dir().join("a.mp4.jpg").exists());

    let image_thumbnail = image::open(library.thumbnail_dir().join("b.jpg.jpg")).unwrap();
    assert_eq!((image_thumbnail.width(), image_thumbnail.height()), (400, 225));

    let leftovers: Vec<String> = fs::read_dir(library.preview_dir())
        .unwrap()
        .chain(fs::read_dir(library.thumbnail_dir()).unwrap())
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with('.'))
        .collect();
    assert!(leftovers.is_empty(), "殘留暫存檔: {leftovers:?}");

    println!("✓ 衍生檔產生測試通過");
}

/// 測試 2: 第二次執行不寫入任何檔案也不呼叫工具
#[test]
fn test_second_run_is_a_no_op() {
    let library = Library::new();
    library.add_video("clips/a.mp4");
    library.add_image("b.jpg");

    library.pipeline(FakeTranscoder::new(30.0)).run().unwrap();

    let outputs = [
        library.preview_dir().join("clips_a.mp4_preview.mp4"),
        library.thumbnail_dir().join("clips_a.mp4.jpg"),
        library.thumbnail_dir().join("b.jpg.jpg"),
    ];
    let before: Vec<SystemTime> = outputs.iter().map(|p| mtime(p)).collect();

    let runner = FakeTranscoder::new(30.0);
    let report = library.pipeline(Arc::clone(&runner)).run().unwrap();

    assert_eq!(runner.command_count(), 0);
    assert_eq!(report.succeeded(), 3);
    let generated: usize = [&report.previews, &report.thumbnails]
        .into_iter()
        .flatten()
        .map(|b| b.generated)
        .sum();
    assert_eq!(generated, 0);

    let after: Vec<SystemTime> = outputs.iter().map(|p| mtime(p)).collect();
    assert_eq!(before, after);

    println!("✓ 重複執行測試通過");
}

/// 測試 3: 只有被修改過的來源會重新產生縮圖
#[test]
fn test_touched_source_is_regenerated_once() {
    let library = Library::new();
    library.add_video("a.mp4");
    let image = library.add_image("b.jpg");

    library.pipeline(FakeTranscoder::new(30.0)).run().unwrap();
    set_mtime(&image, SystemTime::now() + Duration::from_secs(3600));

    let report = library.pipeline(FakeTranscoder::new(30.0)).run().unwrap();
    let thumbnails = report.thumbnails.unwrap();
    let previews = report.previews.unwrap();

    assert_eq!(thumbnails.generated, 1);
    assert_eq!(thumbnails.skipped, 1);
    assert_eq!(previews.generated, 0);
    assert_eq!(previews.skipped, 1);

    println!("✓ 過期判斷測試通過");
}

/// 測試 4: 預覽檔只要存在就不會重新產生
#[test]
fn test_existing_preview_is_kept_even_if_source_changes() {
    let library = Library::new();
    let video = library.add_video("a.mp4");

    library.pipeline(FakeTranscoder::new(30.0)).run_previews().unwrap();
    let preview = library.preview_dir().join("a.mp4_preview.mp4");
    let before = fs::read(&preview).unwrap();

    set_mtime(&video, SystemTime::now() + Duration::from_secs(3600));
    let runner = FakeTranscoder::new(30.0);
    let report = library.pipeline(Arc::clone(&runner)).run_previews().unwrap();

    assert_eq!(runner.command_count(), 0);
    assert_eq!(report.previews.unwrap().skipped, 1);
    assert!(report.thumbnails.is_none());
    assert_eq!(fs::read(&preview).unwrap(), before);
}

/// 測試 5: 單一檔案失敗不影響其他檔案
#[test]
fn test_corrupt_image_fails_alone() {
    let library = Library::new();
    library.add_image("good_1.png");
    library.add_image("good_2.jpg");
    fs::write(library.media.path().join("broken.jpg"), b"garbage").unwrap();

    let report = library
        .pipeline(FakeTranscoder::new(30.0))
        .run_thumbnails()
        .unwrap();
    let thumbnails = report.thumbnails.unwrap();

    assert_eq!(thumbnails.total, 3);
    assert_eq!(thumbnails.succeeded, 2);
    assert_eq!(thumbnails.failed, 1);
    assert!(report.previews.is_none());
    assert!(!library.thumbnail_dir().join("broken.jpg.jpg").exists());
    assert!(library.thumbnail_dir().join("good_1.png.jpg").exists());
}

/// 測試 6: 掃描後被刪除的來源只讓自己的任務失敗
#[test]
fn test_source_deleted_after_scan_fails_alone() {
    let library = Library::new();
    let sources: Vec<PathBuf> = (0..5)
        .map(|i| library.add_image(&format!("album/{i}.jpg")))
        .collect();

    let config = library.config();
    fs::create_dir_all(library.thumbnail_dir()).unwrap();
    let items = LibraryScanner::new(&config)
        .scan(library.media.path())
        .unwrap();
    fs::remove_file(&sources[2]).unwrap();

    let generator = ThumbnailGenerator::new(
        config,
        FakeTranscoder::new(30.0),
        Arc::new(AtomicBool::new(false)),
    );
    let summary = generator.run(&items, false).unwrap();

    assert_eq!(summary.total, 5);
    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.failed, 1);
}

/// 測試 7: 路徑相似的檔案不會共用衍生檔名稱
#[test]
fn test_derived_names_are_unique_across_tree() {
    let library = Library::new();
    for relative in [
        "a_b/c.jpg",
        "a/b_c.jpg",
        "a/b/c.jpg",
        "a b/c.jpg",
        "a%20b/c.jpg",
        ".hidden.jpg",
        "_hidden.jpg",
    ] {
        library.add_image(relative);
    }

    let items = LibraryScanner::new(&library.config())
        .scan(library.media.path())
        .unwrap();
    assert_eq!(items.len(), 7);
    assert!(items.iter().all(|item| item.kind == AssetKind::Thumbnail));

    let names: HashSet<String> = items
        .iter()
        .map(|item| derive_name(&item.source.relative_path))
        .collect();
    assert_eq!(names.len(), 7);

    let targets: HashSet<&PathBuf> = items.iter().map(|item| &item.target).collect();
    assert_eq!(targets.len(), 7);
}

/// 測試 8: 輸出目錄位於媒體目錄內時不會被重新掃描
#[test]
fn test_output_inside_library_is_not_rescanned() {
    let media = TempDir::new().unwrap();
    fs::write(media.path().join("a.mp4"), b"video").unwrap();
    let config = Config::with_settings(UserSettings {
        media_root: Some(media.path().to_path_buf()),
        thumbnail_dir: media.path().join("thumbnails"),
        preview_dir: media.path().join("previews"),
        ..UserSettings::default()
    })
    .unwrap();

    let run = || {
        MediaPipeline::new(
            config.clone(),
            FakeTranscoder::new(30.0),
            Arc::new(AtomicBool::new(false)),
        )
        .run()
        .unwrap()
    };

    assert_eq!(run().scanned_items, 2);
    assert_eq!(run().scanned_items, 2);
}
