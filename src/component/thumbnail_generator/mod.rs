//! 縮圖產生元件
//!
//! 影片：ffprobe 取得長度，隨機時間點擷取單一畫格
//! 圖片：解碼、去除透明度、裁切縮放為固定尺寸 JPEG

mod image_thumbnail;
mod main;
mod video_thumbnail;

pub use image_thumbnail::generate_image_thumbnail;
pub use main::ThumbnailGenerator;
pub use video_thumbnail::{generate_video_thumbnail, pick_seek_offset};
