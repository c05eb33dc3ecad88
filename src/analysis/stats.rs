//! Summary statistics over duration buckets

use serde::Serialize;

/// Summary statistics for one duration bucket, in milliseconds
#[derive(Debug, Clone, Serialize)]
pub struct BucketStats {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// 5th percentile
    pub p5: f64,
    /// 95th percentile
    pub p95: f64,
}

impl BucketStats {
    /// Compute statistics over durations given in seconds.
    ///
    /// Returns `None` for an empty bucket ("no data"), never a division or
    /// index fault.
    pub fn from_secs(durations: &[f64]) -> Option<Self> {
        let ms: Vec<f64> = durations.iter().map(|d| d * 1000.0).collect();
        Self::from_ms(&ms)
    }

    /// Compute statistics over durations already in milliseconds.
    pub fn from_ms(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let variance = sorted
            .iter()
            .map(|v| {
                let diff = v - mean;
                diff * diff
            })
            .sum::<f64>()
            / count as f64;

        Some(Self {
            count,
            mean,
            std_dev: variance.sqrt(),
            min: sorted[0],
            max: sorted[count - 1],
            p5: percentile(&sorted, 0.05),
            p95: percentile(&sorted, 0.95),
        })
    }
}

/// Percentile by rank index over a sorted slice: `sorted[floor(len * p)]`.
///
/// Must not be called with an empty slice; `BucketStats` guards that.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let index = ((sorted.len() as f64 * p) as usize).min(sorted.len() - 1);
    sorted[index]
}
