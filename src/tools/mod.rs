mod asset_namer;
mod batch_executor;
mod clip_selector;
mod command_runner;
mod ffmpeg_command;
mod ffprobe_info;
mod library_scanner;
mod media_classifier;
mod path_validator;
mod scratch_dir;
mod staleness;

pub use asset_namer::{
    PREVIEW_SUFFIX, SEPARATOR_FILLER, THUMBNAIL_SUFFIX, derive_name, preview_file_name,
    thumbnail_file_name,
};
pub use batch_executor::{BatchExecutor, BatchSummary, ItemOutcome, PROGRESS_INTERVAL};
pub use clip_selector::{ClipSpec, select_clips};
pub use command_runner::{CommandRunner, SystemCommandRunner, ToolOutput};
pub use ffmpeg_command::{FfmpegCommand, PREVIEW_FPS, ToolOperation};
pub use ffprobe_info::probe_duration;
pub use library_scanner::{AssetKind, LibraryScanner, SourceAsset, WorkItem};
pub use media_classifier::{MediaClassifier, MediaKind};
pub use path_validator::{ensure_directory_exists, validate_directory_exists};
pub use scratch_dir::ScratchDir;
pub use staleness::needs_regeneration;
