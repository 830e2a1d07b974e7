//! Report scopes that own counters
//!
//! Package, class, source file and method each hold their own counter map
//! and share lookup and rendering through [`Measurable`].

use std::collections::HashMap;

use super::counter::{Counter, CoverageStyle, NOT_APPLICABLE};
use super::descriptor::{parse_descriptor, MethodSignature};
use crate::error::Result;

/// Something that owns counters keyed by metric type
pub trait Measurable {
    fn counters(&self) -> &HashMap<String, Counter>;

    fn counters_mut(&mut self) -> &mut HashMap<String, Counter>;

    /// Store a counter. A counter of the same metric type is replaced and
    /// returned.
    fn add_counter(&mut self, counter: Counter) -> Option<Counter> {
        self.counters_mut()
            .insert(counter.metric().to_string(), counter)
    }

    fn counter(&self, metric: &str) -> Option<&Counter> {
        self.counters().get(metric)
    }

    fn coverage_percent(&self, metric: &str) -> Result<String> {
        self.coverage_cell(metric, CoverageStyle::Percent)
    }

    /// Rendered cell for `metric`, `"n/a"` when absent
    fn coverage_cell(&self, metric: &str, style: CoverageStyle) -> Result<String> {
        match self.counter(metric) {
            Some(counter) => counter.render(style),
            None => Ok(NOT_APPLICABLE.to_string()),
        }
    }
}

/// `com/example/Foo` → `com.example.Foo`
pub fn display_name(raw: &str) -> String {
    raw.replace('/', ".")
}

#[derive(Debug, Clone)]
pub struct Package {
    raw_name: String,
    counters: HashMap<String, Counter>,
}

impl Package {
    pub fn new(raw_name: impl Into<String>) -> Self {
        Package {
            raw_name: raw_name.into(),
            counters: HashMap::new(),
        }
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn name(&self) -> String {
        display_name(&self.raw_name)
    }
}

impl Measurable for Package {
    fn counters(&self) -> &HashMap<String, Counter> {
        &self.counters
    }

    fn counters_mut(&mut self) -> &mut HashMap<String, Counter> {
        &mut self.counters
    }
}

#[derive(Debug, Clone)]
pub struct Class {
    raw_name: String,
    source_file: Option<String>,
    counters: HashMap<String, Counter>,
}

impl Class {
    pub fn new(raw_name: impl Into<String>, source_file: Option<String>) -> Self {
        Class {
            raw_name: raw_name.into(),
            source_file,
            counters: HashMap::new(),
        }
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    pub fn name(&self) -> String {
        display_name(&self.raw_name)
    }

    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }
}

impl Measurable for Class {
    fn counters(&self) -> &HashMap<String, Counter> {
        &self.counters
    }

    fn counters_mut(&mut self) -> &mut HashMap<String, Counter> {
        &mut self.counters
    }
}

#[derive(Debug, Clone)]
pub struct SourceFile {
    name: String,
    counters: HashMap<String, Counter>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>) -> Self {
        SourceFile {
            name: name.into(),
            counters: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Measurable for SourceFile {
    fn counters(&self) -> &HashMap<String, Counter> {
        &self.counters
    }

    fn counters_mut(&mut self) -> &mut HashMap<String, Counter> {
        &mut self.counters
    }
}

/// A method with its descriptor already decoded
#[derive(Debug, Clone)]
pub struct Method {
    name: String,
    descriptor: String,
    parsed: MethodSignature,
    counters: HashMap<String, Counter>,
}

impl Method {
    /// Fails when `descriptor` does not decode.
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Result<Self> {
        let descriptor = descriptor.into();
        let parsed = parse_descriptor(&descriptor)?;
        Ok(Method {
            name: name.into(),
            descriptor,
            parsed,
            counters: HashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Readable signature, e.g. `void run(int)`
    pub fn signature(&self) -> String {
        self.parsed.render(&self.name)
    }
}

impl Measurable for Method {
    fn counters(&self) -> &HashMap<String, Counter> {
        &self.counters
    }

    fn counters_mut(&mut self) -> &mut HashMap<String, Counter> {
        &mut self.counters
    }
}
