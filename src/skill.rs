use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Characters per "word" in the usual typing convention.
pub const CHARS_PER_WORD: f64 = 5.0;
pub const DEFAULT_MEAN_WPM: f64 = 40.0;
pub const DEFAULT_STD_DEV_WPM: f64 = 15.0;
pub const MIN_PERCENTILE: f64 = 0.01;
pub const MAX_PERCENTILE: f64 = 99.9;

// Abramowitz & Stegun 7.1.26
const A1: f64 = 0.254_829_592;
const A2: f64 = -0.284_496_736;
const A3: f64 = 1.421_413_741;
const A4: f64 = -1.453_152_027;
const A5: f64 = 1.061_405_429;
const P: f64 = 0.327_591_1;

/// Error function, max absolute error around 1.5e-7.
pub fn erf(x: f64) -> f64 {
    let sign = if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t + A3) * t + A2) * t + A1) * t) * (-x * x).exp();
    sign * y
}

pub fn normal_cdf(x: f64, mean: f64, std_dev: f64) -> f64 {
    0.5 * (1.0 + erf((x - mean) / (std_dev * std::f64::consts::SQRT_2)))
}

pub fn words_per_minute(characters: usize, elapsed_secs: f64) -> Result<f64, DomainError> {
    if !elapsed_secs.is_finite() {
        return Err(DomainError::NonFinite("elapsed time"));
    }
    if elapsed_secs <= 0.0 {
        return Err(DomainError::NonPositiveElapsed(elapsed_secs));
    }
    Ok((characters as f64 / CHARS_PER_WORD) / (elapsed_secs / 60.0))
}

/// Outcome of ranking one attempt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub wpm: f64,
    /// "Top N%": lower is better.
    pub percentile: f64,
}

/// Fixed normal model of typing speed across the population.
///
/// The calibration has no empirical backing, so it is kept configurable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkillModel {
    pub mean_wpm: f64,
    pub std_dev_wpm: f64,
}

impl Default for SkillModel {
    fn default() -> Self {
        Self {
            mean_wpm: DEFAULT_MEAN_WPM,
            std_dev_wpm: DEFAULT_STD_DEV_WPM,
        }
    }
}

impl SkillModel {
    pub fn new(mean_wpm: f64, std_dev_wpm: f64) -> Self {
        Self {
            mean_wpm,
            std_dev_wpm,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.mean_wpm.is_finite() && self.std_dev_wpm.is_finite() && self.std_dev_wpm > 0.0
    }

    /// Falls back to the default calibration when either parameter is unusable.
    pub fn sanitized(self) -> Self {
        if self.is_valid() {
            self
        } else {
            Self::default()
        }
    }

    pub fn percentile_for_wpm(&self, wpm: f64) -> Result<f64, DomainError> {
        if !self.is_valid() {
            return Err(DomainError::InvalidModel {
                mean_wpm: self.mean_wpm,
                std_dev_wpm: self.std_dev_wpm,
            });
        }
        if !wpm.is_finite() {
            return Err(DomainError::NonFinite("wpm"));
        }
        let cdf = normal_cdf(wpm, self.mean_wpm, self.std_dev_wpm);
        let percentile = (1.0 - cdf) * 100.0;
        if !percentile.is_finite() {
            return Err(DomainError::NonFinite("percentile"));
        }
        Ok(percentile.clamp(MIN_PERCENTILE, MAX_PERCENTILE))
    }

    pub fn percentile_for(&self, characters: usize, elapsed_secs: f64) -> Result<Score, DomainError> {
        let wpm = words_per_minute(characters, elapsed_secs)?;
        let percentile = self.percentile_for_wpm(wpm)?;
        Ok(Score { wpm, percentile })
    }
}
