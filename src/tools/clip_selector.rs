use log::debug;
use rand::Rng;

/// 影片中的一段子片段（起點與長度，單位：秒）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipSpec {
    pub start: f64,
    pub duration: f64,
}

impl ClipSpec {
    #[must_use]
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// 從影片中選取互不重疊的子片段
///
/// 策略：
/// 1. 影片長度不超過單一片段長度：整部影片即為唯一片段
/// 2. 空間不足以放下所需片段數：縮短片段長度為 `max_start / count`
/// 3. 在 `[0, max_start]` 內隨機取樣起點，拒絕與已接受起點距離小於片段長度者
/// 4. 超過嘗試次數仍未完成：改用等距起點
/// 5. 依起點由小到大排序
#[must_use]
pub fn select_clips<R: Rng>(
    duration: f64,
    count: usize,
    clip_duration: f64,
    max_attempts: usize,
    rng: &mut R,
) -> Vec<ClipSpec> {
    if duration <= 0.0 || count == 0 || clip_duration <= 0.0 {
        return Vec::new();
    }

    if duration <= clip_duration {
        return vec![ClipSpec {
            start: 0.0,
            duration,
        }];
    }

    let max_start = duration - clip_duration;
    let mut clip_duration = clip_duration;
    if count as f64 * clip_duration > max_start {
        clip_duration = max_start / count as f64;
        debug!("片段長度縮短為 {clip_duration:.3} 秒以放入 {count} 段");
    }

    let mut starts = sample_starts(max_start, count, clip_duration, max_attempts, rng)
        .unwrap_or_else(|| {
            debug!("隨機取樣未收斂，改用等距起點");
            evenly_spaced_starts(max_start, count)
        });
    starts.sort_by(f64::total_cmp);

    starts
        .into_iter()
        .map(|start| ClipSpec {
            start,
            duration: clip_duration,
        })
        .collect()
}

fn sample_starts<R: Rng>(
    max_start: f64,
    count: usize,
    clip_duration: f64,
    max_attempts: usize,
    rng: &mut R,
) -> Option<Vec<f64>> {
    let mut accepted: Vec<f64> = Vec::with_capacity(count);
    for _ in 0..max_attempts {
        let candidate = rng.random_range(0.0..=max_start);
        if accepted
            .iter()
            .all(|start| (candidate - start).abs() >= clip_duration)
        {
            accepted.push(candidate);
            if accepted.len() == count {
                return Some(accepted);
            }
        }
    }
    None
}

/// 等距起點：`start_i = i * max_start / (count - 1)`
fn evenly_spaced_starts(max_start: f64, count: usize) -> Vec<f64> {
    if count <= 1 {
        return vec![0.0];
    }
    let step = max_start / (count - 1) as f64;
    (0..count).map(|i| i as f64 * step).collect()
}
