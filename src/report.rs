//! CSV row emitter
//!
//! Fields are written as-is: no quoting, no escaping. A name containing a
//! comma would shift the columns of its row.

use std::io::Write;

use crate::coverage::{CoverageStyle, Measurable, MethodRow, BRANCH, INSTRUCTION};
use crate::error::Result;

pub const HEADER: [&str; 5] = ["package", "class", "method", "instruction", "branch"];

pub struct RowWriter<W: Write> {
    out: W,
    style: CoverageStyle,
    header_written: bool,
    rows: usize,
}

impl<W: Write> RowWriter<W> {
    pub fn new(out: W, style: CoverageStyle) -> Self {
        RowWriter {
            out,
            style,
            header_written: false,
            rows: 0,
        }
    }

    /// Write the column titles; later calls do nothing
    pub fn write_header(&mut self) -> Result<()> {
        if !self.header_written {
            writeln!(self.out, "{}", HEADER.join(","))?;
            self.header_written = true;
        }
        Ok(())
    }

    pub fn write_row(&mut self, row: &MethodRow) -> Result<()> {
        self.write_header()?;

        // Render both cells before writing so a failure leaves no half line
        let instruction = row.method.coverage_cell(INSTRUCTION, self.style)?;
        let branch = row.method.coverage_cell(BRANCH, self.style)?;

        writeln!(
            self.out,
            "{},{},{},{},{}",
            row.package,
            row.class,
            row.method.signature(),
            instruction,
            branch
        )?;
        self.rows += 1;
        Ok(())
    }

    /// Data rows written so far, header excluded
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
