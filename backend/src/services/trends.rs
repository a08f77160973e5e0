//! Trend classification over time-ordered samples.

use std::collections::VecDeque;

use crate::config::TrendSettings;
use crate::models::Trend;

const DEFAULT_WINDOW: usize = 3;
const DEFAULT_CHANGE_THRESHOLD: f64 = 0.10;

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Classify a time-ordered series using a 3-sample window and a 10% threshold.
///
/// See [`classify_trend_with`].
pub fn classify_trend(samples: &[f64]) -> Trend {
    classify_trend_with(samples, DEFAULT_WINDOW, DEFAULT_CHANGE_THRESHOLD)
}

/// Classify a time-ordered series as increasing, decreasing or stable.
///
/// The last `window` samples form the recent window and up to `window`
/// samples before them the older window. The relative change of the window
/// means, `(recent - older) / |older|`, is compared against `threshold`.
/// Series too short to have an older window are stable. A zero older mean is
/// increasing when the recent mean is positive and stable otherwise.
pub fn classify_trend_with(samples: &[f64], window: usize, threshold: f64) -> Trend {
    if samples.len() < 2 || window == 0 {
        return Trend::Stable;
    }

    let split = samples.len().saturating_sub(window);
    let recent = &samples[split..];
    let older = &samples[split.saturating_sub(window)..split];

    if older.is_empty() {
        return Trend::Stable;
    }

    let recent_mean = mean(recent);
    let older_mean = mean(older);

    if older_mean == 0.0 {
        return if recent_mean > 0.0 {
            Trend::Increasing
        } else {
            Trend::Stable
        };
    }

    let change = (recent_mean - older_mean) / older_mean.abs();
    if change > threshold {
        Trend::Increasing
    } else if change < -threshold {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

/// Bounded history of health-score samples, oldest first.
#[derive(Debug, Clone)]
pub struct HealthHistory {
    samples: VecDeque<f64>,
    capacity: usize,
    window: usize,
    threshold: f64,
}

impl HealthHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_CHANGE_THRESHOLD,
        }
    }

    pub fn from_settings(settings: &TrendSettings) -> Self {
        Self {
            window: settings.window,
            threshold: settings.change_threshold,
            ..Self::new(settings.history_capacity)
        }
    }

    /// Append a sample, evicting the oldest one once full.
    pub fn record(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    pub fn samples(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn trend(&self) -> Trend {
        let (front, back) = self.samples.as_slices();
        if back.is_empty() {
            classify_trend_with(front, self.window, self.threshold)
        } else {
            classify_trend_with(&self.samples(), self.window, self.threshold)
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for HealthHistory {
    fn default() -> Self {
        Self::from_settings(&TrendSettings::default())
    }
}
