//! Coverage counters

use serde::Deserialize;

use crate::error::{ConvertError, Result};

pub const INSTRUCTION: &str = "INSTRUCTION";
pub const BRANCH: &str = "BRANCH";

/// Cell rendered for a metric the scope has no counter for
pub const NOT_APPLICABLE: &str = "n/a";

/// How a coverage percentage is written into a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverageStyle {
    /// Truncated integer with a percent sign: `66%`
    #[default]
    Percent,
    /// One decimal place, no sign: `66.7`
    Decimal,
}

/// Missed/covered counts for one metric type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Counter {
    metric: String,
    missed: u64,
    covered: u64,
}

impl Counter {
    pub fn new(metric: impl Into<String>, missed: u64, covered: u64) -> Self {
        Counter {
            metric: metric.into(),
            missed,
            covered,
        }
    }

    pub fn metric(&self) -> &str {
        &self.metric
    }

    pub fn missed(&self) -> u64 {
        self.missed
    }

    pub fn covered(&self) -> u64 {
        self.covered
    }

    /// Widened so two `u64` counts can neither overflow nor wrap
    pub fn total(&self) -> u128 {
        self.missed as u128 + self.covered as u128
    }

    /// Covered share of all samples, 0.0 to 100.0
    pub fn coverage(&self) -> Result<f64> {
        if self.total() == 0 {
            return Err(self.undefined());
        }
        Ok(self.covered as f64 / self.total() as f64 * 100.0)
    }

    /// `floor(100 * covered / total)` followed by `%`.
    ///
    /// Integer arithmetic avoids float truncation errors such as
    /// 29/100 landing on 28.999...
    pub fn coverage_percent(&self) -> Result<String> {
        if self.total() == 0 {
            return Err(self.undefined());
        }
        Ok(format!("{}%", self.covered as u128 * 100 / self.total()))
    }

    pub fn render(&self, style: CoverageStyle) -> Result<String> {
        match style {
            CoverageStyle::Percent => self.coverage_percent(),
            CoverageStyle::Decimal => Ok(format!("{:.1}", self.coverage()?)),
        }
    }

    fn undefined(&self) -> ConvertError {
        ConvertError::UndefinedCoverage {
            metric: self.metric.clone(),
        }
    }
}
