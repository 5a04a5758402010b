//! 媒體前處理流程
//!
//! 掃描媒體目錄一次，依序產生預覽片段與縮圖。

mod main;

pub use main::{MediaPipeline, PipelineReport};
