//! 影片預覽片段產生元件
//!
//! 從影片中取出數段不重疊的子片段，以淡入淡出轉場串接成一支短片。
//! 已存在的預覽檔一律跳過（不比對修改時間）。

mod main;
mod synthesizer;

pub use main::PreviewGenerator;
pub use synthesizer::{PreviewSynthesizer, SynthesisReport};
