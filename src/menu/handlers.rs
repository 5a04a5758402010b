use crate::component::{MediaPipeline, PipelineReport, PreviewGenerator};
use crate::config::Config;
use crate::config::save::{add_recent_path, save_settings};
use crate::pause;
use crate::tools::{BatchSummary, PREVIEW_SUFFIX, SystemCommandRunner, validate_directory_exists};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::warn;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

#[derive(Debug, Clone, Copy)]
pub enum PipelineStage {
    All,
    Thumbnails,
    Previews,
}

pub fn run_pipeline(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
    stage: PipelineStage,
) -> Result<()> {
    if config.settings.media_root.is_none() && !choose_media_root(term, config)? {
        return Ok(());
    }

    let pipeline = MediaPipeline::with_system_tools(config.clone(), Arc::clone(shutdown_signal))
        .with_progress(true);

    let result = match stage {
        PipelineStage::All => pipeline.run(),
        PipelineStage::Thumbnails => pipeline.run_thumbnails(),
        PipelineStage::Previews => pipeline.run_previews(),
    };

    match result {
        Ok(report) => print_summary(&report),
        Err(e) => eprintln!("{} {:#}", style("錯誤:").red().bold(), e),
    }

    pause(term)?;
    Ok(())
}

/// 為單一影片產生預覽檔，輸出位置由使用者指定
pub fn preview_single_video(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let source = prompt_path("影片檔案路徑", None)?;
    if source.is_empty() {
        return Ok(());
    }
    let default_output = format!("{source}{PREVIEW_SUFFIX}");
    let output = prompt_path("預覽輸出路徑（檔案或資料夾）", Some(default_output))?;
    if output.is_empty() {
        return Ok(());
    }

    let runner = Arc::new(SystemCommandRunner::new(config.settings.tools.timeout()));
    let generator = PreviewGenerator::new(config.clone(), runner, Arc::clone(shutdown_signal));

    match generator.preview_single(&PathBuf::from(&source), &PathBuf::from(&output)) {
        Ok((written, report)) => {
            println!(
                "{} {}（{} 段片段、{} 個轉場）",
                style("預覽完成:").green().bold(),
                written.display(),
                report.clips.len(),
                report.transitions
            );
        }
        Err(e) => eprintln!("{} {:#}", style("錯誤:").red().bold(), e),
    }

    pause(term)?;
    Ok(())
}

/// 選擇媒體根目錄（最近使用或手動輸入），回傳是否已設定
pub fn choose_media_root(term: &Term, config: &mut Config) -> Result<bool> {
    let recent = config.settings.recent_paths.clone();
    let manual = "輸入新路徑...".to_string();

    let path = if recent.is_empty() {
        prompt_path("媒體庫路徑", None)?
    } else {
        let mut options = recent.clone();
        options.push(manual);

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("媒體根目錄")
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(i) if i < recent.len() => recent[i].clone(),
            Some(_) => prompt_path("媒體庫路徑", None)?,
            None => return Ok(false),
        }
    };

    if path.is_empty() {
        return Ok(false);
    }

    let root = PathBuf::from(&path);
    if let Err(e) = validate_directory_exists(&root) {
        eprintln!("{} {}", style("錯誤:").red().bold(), e);
        pause(term)?;
        return Ok(false);
    }

    config.settings.media_root = Some(root);
    add_recent_path(&mut config.settings, &path);
    if let Err(e) = save_settings(&config.settings) {
        warn!("設定檔儲存失敗: {e:#}");
    }
    Ok(true)
}

fn prompt_path(prompt: &str, default: Option<String>) -> Result<String> {
    let theme = ColorfulTheme::default();
    let mut input = Input::<String>::with_theme(&theme)
        .with_prompt(prompt)
        .allow_empty(true);
    if let Some(default) = default {
        input = input.default(default);
    }
    let path = input.interact_text()?;
    Ok(path.trim().to_string())
}

fn print_summary(report: &PipelineReport) {
    println!();
    println!("{}", style("=== 前處理結果 ===").cyan().bold());
    println!("  任務數: {}", report.scanned_items);

    if let Some(previews) = &report.previews {
        print_batch("預覽片段", previews);
    }
    if let Some(thumbnails) = &report.thumbnails {
        print_batch("縮圖", thumbnails);
    }

    println!(
        "  成功: {}/{}，耗時 {:.2} 秒",
        style(report.succeeded()).green(),
        report.total(),
        report.elapsed.as_secs_f64()
    );
}

fn print_batch(label: &str, summary: &BatchSummary) {
    println!(
        "  {label}: 新產生 {}，已是最新 {}",
        style(summary.generated).green(),
        summary.skipped
    );
    if summary.failed > 0 {
        println!("    失敗: {}", style(summary.failed).red());
    }
    if summary.cancelled > 0 {
        println!("    已取消: {}", style(summary.cancelled).yellow());
    }
}
