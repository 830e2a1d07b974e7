//! jacoco2csv - JaCoCo XML to CSV
//!
//! Streams a JaCoCo coverage report and writes one CSV row per method:
//! - Event-driven parsing, the document tree is never built
//! - Counters attached to the innermost open package, class, source file or method
//! - JVM method descriptors decoded into readable signatures
//! - Instruction and branch coverage per method

pub mod config;
pub mod coverage;
pub mod error;
pub mod logging;
pub mod report;

pub use config::Config;
pub use coverage::{convert, convert_file, convert_str, ConversionSummary, CoverageStyle};
pub use error::{ConvertError, Result};
pub use report::RowWriter;
