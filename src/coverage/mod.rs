//! Coverage module
//!
//! Provides:
//! - JaCoCo XML streaming conversion
//! - Method descriptor decoding
//! - Counters and the scopes that own them

mod context;
mod counter;
mod descriptor;
mod jacoco;
mod scope;

pub use context::*;
pub use counter::*;
pub use descriptor::*;
pub use jacoco::*;
pub use scope::*;

/// Totals gathered over one conversion
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub packages: usize,
    pub classes: usize,
    pub source_files: usize,
    pub methods: usize,
    pub counters: usize,
    /// Counters seen while no scope was open
    pub dropped_counters: usize,
}
