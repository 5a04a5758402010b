use std::fs;
use std::path::Path;

/// 判斷衍生檔是否需要重新產生
///
/// 衍生檔不存在，或來源修改時間晚於衍生檔時回傳 true。
/// 來源無法讀取也視為需要重新產生，由產生器回報實際錯誤。
#[must_use]
pub fn needs_regeneration(source: &Path, target: &Path) -> bool {
    let Ok(target_meta) = fs::metadata(target) else {
        return true;
    };
    let Ok(target_modified) = target_meta.modified() else {
        return true;
    };

    match fs::metadata(source).and_then(|meta| meta.modified()) {
        Ok(source_modified) => source_modified > target_modified,
        Err(_) => true,
    }
}
