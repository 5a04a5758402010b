use crate::tools::WorkItem;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// 每完成多少個任務記錄一次進度
pub const PROGRESS_INTERVAL: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Generated,
    /// 衍生檔已存在且為最新
    UpToDate,
}

/// 批次執行結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub generated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub cancelled: usize,
    pub elapsed: Duration,
}

#[derive(Default)]
struct Counters {
    completed: AtomicUsize,
    generated: AtomicUsize,
    skipped: AtomicUsize,
    failed: AtomicUsize,
    cancelled: AtomicUsize,
}

/// 以固定大小的執行緒池平行處理任務，單一任務失敗不影響其他任務
pub struct BatchExecutor {
    label: String,
    max_workers: usize,
    shutdown_signal: Arc<AtomicBool>,
    show_progress_bar: bool,
}

impl BatchExecutor {
    #[must_use]
    pub fn new(label: &str, max_workers: usize, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            label: label.to_string(),
            max_workers: max_workers.max(1),
            shutdown_signal,
            show_progress_bar: false,
        }
    }

    #[must_use]
    pub const fn with_progress_bar(mut self, show: bool) -> Self {
        self.show_progress_bar = show;
        self
    }

    /// 等待所有任務完成；`process` 的錯誤與 panic 只記錄並計數，不會傳給呼叫者
    pub fn run<F>(&self, items: &[WorkItem], process: F) -> Result<BatchSummary>
    where
        F: Fn(&WorkItem) -> Result<ItemOutcome> + Sync,
    {
        let started = Instant::now();
        let total = items.len();
        info!(
            "開始{}任務：共 {total} 個，{} 個工作執行緒",
            self.label, self.max_workers
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_workers)
            .thread_name({
                let label = self.label.clone();
                move |i| format!("{label}-{i}")
            })
            .build()
            .with_context(|| format!("無法建立{}執行緒池", self.label))?;

        let progress_bar = self.progress_bar(total);
        let counters = Counters::default();

        pool.install(|| {
            items.par_iter().for_each(|item| {
                self.process_item(item, &process, &counters);
                progress_bar.inc(1);

                let completed = counters.completed.fetch_add(1, Ordering::SeqCst) + 1;
                if completed % PROGRESS_INTERVAL == 0 {
                    info!("{}進度: {completed}/{total}", self.label);
                }
            });
        });
        progress_bar.finish_and_clear();

        let generated = counters.generated.load(Ordering::SeqCst);
        let skipped = counters.skipped.load(Ordering::SeqCst);
        let summary = BatchSummary {
            total,
            succeeded: generated + skipped,
            generated,
            skipped,
            failed: counters.failed.load(Ordering::SeqCst),
            cancelled: counters.cancelled.load(Ordering::SeqCst),
            elapsed: started.elapsed(),
        };

        info!(
            "{}任務完成，耗時 {:.2} 秒 - 成功: {}/{}（新產生: {}，已是最新: {}，失敗: {}，已取消: {}）",
            self.label,
            summary.elapsed.as_secs_f64(),
            summary.succeeded,
            summary.total,
            summary.generated,
            summary.skipped,
            summary.failed,
            summary.cancelled
        );

        Ok(summary)
    }

    fn process_item<F>(&self, item: &WorkItem, process: &F, counters: &Counters)
    where
        F: Fn(&WorkItem) -> Result<ItemOutcome> + Sync,
    {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            counters.cancelled.fetch_add(1, Ordering::SeqCst);
            return;
        }

        match panic::catch_unwind(AssertUnwindSafe(|| process(item))) {
            Ok(Ok(ItemOutcome::Generated)) => {
                counters.generated.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Ok(ItemOutcome::UpToDate)) => {
                counters.skipped.fetch_add(1, Ordering::SeqCst);
            }
            Ok(Err(e)) => {
                error!(
                    "{}產生失敗 {}: {e:#}",
                    item.kind,
                    item.source.path.display()
                );
                counters.failed.fetch_add(1, Ordering::SeqCst);
            }
            Err(payload) => {
                error!(
                    "{}產生時發生 panic {}: {}",
                    item.kind,
                    item.source.path.display(),
                    panic_message(payload.as_ref())
                );
                counters.failed.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress_bar {
            return ProgressBar::hidden();
        }

        let progress_bar = ProgressBar::new(total as u64);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            Ok(style) => progress_bar.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("進度條樣式無效: {e}"),
        }
        progress_bar.set_message(self.label.clone());
        progress_bar
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "未知的 panic".to_string())
}
