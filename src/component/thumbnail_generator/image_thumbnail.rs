use super::video_thumbnail::partial_path;
use crate::config::ThumbnailSettings;
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// 將圖片裁切縮放為固定尺寸的 JPEG 縮圖
///
/// 透明與調色盤圖片先轉為 RGB，結果填滿整個畫面（置中裁切，不留黑邊）
pub fn generate_image_thumbnail(
    settings: &ThumbnailSettings,
    source: &Path,
    target: &Path,
) -> Result<()> {
    let image = ImageReader::open(source)
        .with_context(|| format!("無法開啟圖片: {}", source.display()))?
        .with_guessed_format()
        .with_context(|| format!("無法讀取圖片: {}", source.display()))?
        .decode()
        .with_context(|| format!("無法解碼圖片: {}", source.display()))?;

    let thumbnail = flatten(image)
        .resize_to_fill(settings.width, settings.height, FilterType::Lanczos3)
        .to_rgb8();

    let partial = partial_path(target);
    let written = write_jpeg(&thumbnail, &partial, settings.jpeg_quality);
    if let Err(e) = written {
        let _ = fs::remove_file(&partial);
        return Err(e);
    }

    fs::rename(&partial, target)
        .with_context(|| format!("無法移動縮圖至: {}", target.display()))
}

fn flatten(image: DynamicImage) -> DynamicImage {
    if image.color().has_alpha() {
        DynamicImage::ImageRgb8(image.to_rgb8())
    } else {
        image
    }
}

fn write_jpeg(image: &image::RgbImage, path: &Path, quality: u8) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("無法建立檔案: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(image)
        .with_context(|| format!("JPEG 編碼失敗: {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
