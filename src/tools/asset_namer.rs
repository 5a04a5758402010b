//! 衍生檔命名
//!
//! 縮圖與預覽檔名是與提供輸出目錄的服務之間的對應規則，
//! 兩邊都必須呼叫這裡的函式，不可自行組合檔名。

use std::fmt::Write as _;
use std::ffi::OsStr;
use std::path::{Component, Path};

/// 連接相對路徑各層的字元
pub const SEPARATOR_FILLER: char = '_';
pub const THUMBNAIL_SUFFIX: &str = ".jpg";
pub const PREVIEW_SUFFIX: &str = "_preview.mp4";

/// 由相對路徑產生唯一且安全的檔名（不含副檔名後綴）
///
/// 各層以 [`SEPARATOR_FILLER`] 連接；每層中 `[A-Za-z0-9.-]` 以外的位元組
/// （包含連接字元本身）以百分比編碼，開頭的點也會編碼，結果不會是隱藏檔。
/// 編碼依據路徑原始位元組，非 UTF-8 的檔名也不會互相衝突。
#[must_use]
pub fn derive_name(relative_path: &Path) -> String {
    let mut name = String::new();
    for component in relative_path.components() {
        let part = match component {
            Component::Normal(part) => part,
            Component::ParentDir => OsStr::new(".."),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => continue,
        };
        if !name.is_empty() {
            name.push(SEPARATOR_FILLER);
        }
        encode_component(part, &mut name);
    }
    name
}

#[must_use]
pub fn thumbnail_file_name(relative_path: &Path) -> String {
    format!("{}{THUMBNAIL_SUFFIX}", derive_name(relative_path))
}

#[must_use]
pub fn preview_file_name(relative_path: &Path) -> String {
    format!("{}{PREVIEW_SUFFIX}", derive_name(relative_path))
}

fn encode_component(part: &OsStr, out: &mut String) {
    for (i, &byte) in part.as_encoded_bytes().iter().enumerate() {
        let safe = byte.is_ascii_alphanumeric() || byte == b'-' || (byte == b'.' && i > 0);
        if safe {
            out.push(char::from(byte));
        } else {
            let _ = write!(out, "%{byte:02X}");
        }
    }
}
