//! Heuristic rejection of screen captures.
//!
//! Contributors sometimes paste a screenshot of their change instead of a
//! cutie. Captures of terminals, editors, and web pages are dominated by one
//! flat background colour, which photographs and drawings almost never are.

use std::collections::HashMap;

use image::{DynamicImage, GenericImageView};

/// Share of sampled pixels, in percent, that one exact colour must reach.
pub const DEFAULT_THRESHOLD_PERCENT: u64 = 40;

const DEFAULT_SAMPLE_BUDGET: u64 = 10_000;

/// Decides whether an image looks like a screenshot.
#[cfg_attr(test, mockall::automock)]
pub trait ScreenshotDetector: Send + Sync {
    /// Returns true when `image` should not be posted.
    fn is_screenshot(&self, image: &DynamicImage) -> bool;
}

/// Flags images whose sampled pixels are dominated by a single colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformBackgroundDetector {
    threshold_percent: u64,
    sample_budget: u64,
}

impl Default for UniformBackgroundDetector {
    fn default() -> Self {
        Self {
            threshold_percent: DEFAULT_THRESHOLD_PERCENT,
            sample_budget: DEFAULT_SAMPLE_BUDGET,
        }
    }
}

impl UniformBackgroundDetector {
    /// Creates a detector with a custom dominance threshold.
    #[must_use]
    pub const fn with_threshold(threshold_percent: u64) -> Self {
        Self {
            threshold_percent,
            sample_budget: DEFAULT_SAMPLE_BUDGET,
        }
    }
}

impl ScreenshotDetector for UniformBackgroundDetector {
    fn is_screenshot(&self, image: &DynamicImage) -> bool {
        let total = u64::from(image.width()).saturating_mul(u64::from(image.height()));
        if total == 0 {
            return false;
        }
        let stride = total.div_ceil(self.sample_budget.max(1)).max(1);
        let step = usize::try_from(stride).unwrap_or(usize::MAX);

        let mut counts: HashMap<[u8; 4], u64> = HashMap::new();
        let mut sampled = 0_u64;
        for (_, _, pixel) in image.pixels().step_by(step) {
            *counts.entry(pixel.0).or_default() += 1;
            sampled += 1;
        }

        let dominant = counts.values().copied().max().unwrap_or_default();
        dominant.saturating_mul(100) >= self.threshold_percent.saturating_mul(sampled)
    }
}
