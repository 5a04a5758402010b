use crate::config::save::save_settings;
use crate::config::Config;
use crate::menu::handlers::{PipelineStage, choose_media_root, preview_single_video, run_pipeline};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style("=== Librify 媒體前處理 ===").cyan().bold());
    let root = config
        .settings
        .media_root
        .as_ref()
        .map_or_else(|| "（未設定）".to_string(), |p| p.display().to_string());
    println!("{} {}", style("媒體根目錄:").dim(), root);
    println!("{}", style("按 ESC 離開").dim());

    let options = [
        "產生預覽片段與縮圖",
        "只產生縮圖",
        "只產生預覽片段",
        "單一影片預覽",
        "選擇媒體根目錄",
        "設定",
        "離開",
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("請選擇功能")
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => run_pipeline(term, shutdown_signal, config, PipelineStage::All)?,
        Some(1) => run_pipeline(term, shutdown_signal, config, PipelineStage::Thumbnails)?,
        Some(2) => run_pipeline(term, shutdown_signal, config, PipelineStage::Previews)?,
        Some(3) => preview_single_video(term, shutdown_signal, config)?,
        Some(4) => {
            choose_media_root(term, config)?;
        }
        Some(5) => show_settings_menu(term, config)?,
        Some(6) | None => return Ok(false),
        _ => unreachable!(),
    }

    Ok(true)
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;
        println!("{}", style("=== 設定 ===").cyan().bold());

        let settings = &config.settings;
        let options = [
            format!("縮圖工作執行緒: {}", settings.thumbnail.workers),
            format!("預覽工作執行緒: {}", settings.preview.workers),
            format!("每支預覽的片段數: {}", settings.preview.clip_count),
            format!("片段長度: {} 秒", settings.preview.clip_duration_secs),
            format!("轉場長度: {} 秒", settings.preview.transition_duration_secs),
            format!("工具逾時: {} 秒（0 = 不限）", settings.tools.timeout_secs),
            "返回".to_string(),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("請選擇設定項目")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        let settings = &mut config.settings;
        match selection {
            Some(0) => settings.thumbnail.workers = prompt_count("縮圖工作執行緒", settings.thumbnail.workers)?,
            Some(1) => settings.preview.workers = prompt_count("預覽工作執行緒", settings.preview.workers)?,
            Some(2) => settings.preview.clip_count = prompt_count("每支預覽的片段數", settings.preview.clip_count)?,
            Some(3) => {
                settings.preview.clip_duration_secs =
                    prompt_seconds("片段長度（秒）", settings.preview.clip_duration_secs)?;
            }
            Some(4) => {
                settings.preview.transition_duration_secs =
                    prompt_seconds("轉場長度（秒）", settings.preview.transition_duration_secs)?;
            }
            Some(5) => {
                settings.tools.timeout_secs = Input::with_theme(&ColorfulTheme::default())
                    .with_prompt("工具逾時（秒）")
                    .default(settings.tools.timeout_secs)
                    .interact_text()?;
            }
            Some(6) | None => break,
            _ => unreachable!(),
        }

        save_settings(&config.settings)?;
    }

    Ok(())
}

fn prompt_count(prompt: &str, current: usize) -> Result<usize> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(current)
        .validate_with(|value: &usize| if *value == 0 { Err("至少為 1") } else { Ok(()) })
        .interact_text()?)
}

fn prompt_seconds(prompt: &str, current: f64) -> Result<f64> {
    Ok(Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(current)
        .validate_with(|value: &f64| {
            if value.is_finite() && *value > 0.0 {
                Ok(())
            } else {
                Err("必須是正數")
            }
        })
        .interact_text()?)
}
