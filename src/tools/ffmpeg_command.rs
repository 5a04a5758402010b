use crate::config::ToolSettings;
use crate::tools::ClipSpec;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// 預覽片段統一的幀率
pub const PREVIEW_FPS: u32 = 30;

/// 每段輸入在 xfade/concat 前的統一處理（幀率、像素格式、時間基準）
fn normalize_filter() -> String {
    format!("fps={PREVIEW_FPS},format=yuv420p,setsar=1,settb=AVTB,setpts=PTS-STARTPTS")
}

#[derive(Debug, Clone, PartialEq)]
pub enum ToolOperation {
    Probe,
    ExtractFrame { seek: f64 },
    ExtractClip(ClipSpec),
    Transition { duration: f64 },
    Concat { inputs: usize },
}

impl fmt::Display for ToolOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Probe => write!(f, "探測"),
            Self::ExtractFrame { seek } => write!(f, "擷取畫格 {seek:.2}s"),
            Self::ExtractClip(clip) => write!(
                f,
                "擷取片段 {:.2}s+{:.2}s",
                clip.start, clip.duration
            ),
            Self::Transition { duration } => write!(f, "轉場 ({duration:.2}s)"),
            Self::Concat { inputs } => write!(f, "串接 {inputs} 段"),
        }
    }
}

/// 外部轉檔工具的一次呼叫（程式、參數與輸出位置）
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    program: String,
    args: Vec<OsString>,
    operation: ToolOperation,
    output: Option<PathBuf>,
}

impl FfmpegCommand {
    /// 以 JSON 輸出容器與串流資訊
    #[must_use]
    pub fn probe(tools: &ToolSettings, source: &Path) -> Self {
        let mut args = strings(&[
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_format",
            "-show_streams",
        ]);
        args.push(file_url(source));

        Self {
            program: tools.ffprobe.clone(),
            args,
            operation: ToolOperation::Probe,
            output: None,
        }
    }

    /// 在 `seek` 擷取一個畫格，裁切填滿 `width`x`height`
    #[must_use]
    pub fn extract_frame(
        tools: &ToolSettings,
        source: &Path,
        seek: f64,
        (width, height): (u32, u32),
        output: &Path,
    ) -> Self {
        let filter = format!(
            "scale={width}:{height}:force_original_aspect_ratio=increase,crop={width}:{height}"
        );

        let mut args = base_args();
        push_option(&mut args, "-ss", format!("{seek:.3}"));
        push_option(&mut args, "-i", file_url(source));
        args.extend(strings(&["-frames:v", "1", "-an", "-sn", "-dn", "-vf"]));
        args.push(filter.into());
        args.extend(strings(&["-q:v", "2", "-update", "1", "-y"]));
        args.push(file_url(output));

        Self {
            program: tools.ffmpeg.clone(),
            args,
            operation: ToolOperation::ExtractFrame { seek },
            output: Some(output.to_path_buf()),
        }
    }

    /// 串流複製 `clip`，不重新編碼
    #[must_use]
    pub fn extract_clip(tools: &ToolSettings, source: &Path, clip: ClipSpec, output: &Path) -> Self {
        let mut args = base_args();
        push_option(&mut args, "-ss", format!("{:.3}", clip.start));
        push_option(&mut args, "-i", file_url(source));
        push_option(&mut args, "-t", format!("{:.3}", clip.duration));
        args.extend(strings(&[
            "-map",
            "0:v:0",
            "-an",
            "-sn",
            "-dn",
            "-c",
            "copy",
            "-avoid_negative_ts",
            "make_zero",
            "-y",
        ]));
        args.push(file_url(output));

        Self {
            program: tools.ffmpeg.clone(),
            args,
            operation: ToolOperation::ExtractClip(clip),
            output: Some(output.to_path_buf()),
        }
    }

    /// `from` 的最後 `duration` 秒淡入 `to` 的前 `duration` 秒
    #[must_use]
    pub fn transition(
        tools: &ToolSettings,
        from: &Path,
        to: &Path,
        duration: f64,
        output: &Path,
    ) -> Self {
        let normalize = normalize_filter();
        let filter = format!(
            "[0:v]{normalize}[a];[1:v]{normalize}[b];[a][b]xfade=transition=fade:duration={duration:.3}:offset=0[v]"
        );

        let mut args = base_args();
        push_option(&mut args, "-sseof", format!("-{duration:.3}"));
        push_option(&mut args, "-i", file_url(from));
        push_option(&mut args, "-t", format!("{duration:.3}"));
        push_option(&mut args, "-i", file_url(to));
        push_option(&mut args, "-filter_complex", filter);
        args.extend(strings(&[
            "-map",
            "[v]",
            "-an",
            "-c:v",
            "libx264",
            "-preset",
            "ultrafast",
            "-pix_fmt",
            "yuv420p",
            "-y",
        ]));
        args.push(file_url(output));

        Self {
            program: tools.ffmpeg.clone(),
            args,
            operation: ToolOperation::Transition { duration },
            output: Some(output.to_path_buf()),
        }
    }

    /// 依序串接 `inputs`，只重新編碼一次
    #[must_use]
    pub fn concat(tools: &ToolSettings, inputs: &[PathBuf], output: &Path) -> Self {
        let normalize = normalize_filter();
        let mut args = base_args();
        let mut filter = String::new();
        let mut labels = String::new();

        for (i, input) in inputs.iter().enumerate() {
            push_option(&mut args, "-i", file_url(input));
            filter.push_str(&format!("[{i}:v]{normalize}[v{i}];"));
            labels.push_str(&format!("[v{i}]"));
        }
        filter.push_str(&format!("{labels}concat=n={}:v=1:a=0[v]", inputs.len()));

        push_option(&mut args, "-filter_complex", filter);
        args.extend(strings(&[
            "-map",
            "[v]",
            "-an",
            "-c:v",
            "libx264",
            "-preset",
            "ultrafast",
            "-crf",
            "23",
            "-pix_fmt",
            "yuv420p",
            "-movflags",
            "+faststart",
            "-y",
        ]));
        args.push(file_url(output));

        Self {
            program: tools.ffmpeg.clone(),
            args,
            operation: ToolOperation::Concat {
                inputs: inputs.len(),
            },
            output: Some(output.to_path_buf()),
        }
    }

    #[cfg(test)]
    pub(crate) fn raw(program: &str, args: &[&str], operation: ToolOperation) -> Self {
        Self {
            program: program.to_string(),
            args: strings(args),
            operation,
            output: None,
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    #[must_use]
    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    #[must_use]
    pub const fn operation(&self) -> &ToolOperation {
        &self.operation
    }

    #[must_use]
    pub fn output_path(&self) -> Option<&Path> {
        self.output.as_deref()
    }

    #[must_use]
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

fn base_args() -> Vec<OsString> {
    strings(&["-hide_banner", "-nostdin", "-loglevel", "error"])
}

fn strings(args: &[&str]) -> Vec<OsString> {
    args.iter().map(|s| OsString::from(*s)).collect()
}

fn push_option(args: &mut Vec<OsString>, flag: &str, value: impl Into<OsString>) {
    args.push(flag.into());
    args.push(value.into());
}

/// 加上 `file:` 前綴，避免檔名中的冒號被當成通訊協定
///
/// 非 UTF-8 的路徑則原樣傳入（以 `/` 或 `./` 開頭，不會被當成通訊協定）
fn file_url(path: &Path) -> OsString {
    if let Some(path) = path.to_str() {
        return format!("file:{path}").into();
    }
    if path.is_absolute() {
        return path.as_os_str().to_owned();
    }
    let mut url = OsString::from("./");
    url.push(path.as_os_str());
    url
}
