pub mod load;
pub mod save;
pub mod types;

pub use load::SETTINGS_FILE;
pub use types::{
    Config, MAX_RECENT_PATHS, MediaTypeTable, PreviewSettings, ThumbnailSettings, ToolSettings,
    UserSettings,
};
