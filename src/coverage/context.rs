//! Open-scope tracking for the streaming converter
//!
//! The stack holds at most one package, class, source file and method at a
//! time, in that nesting order. Every open/close is checked against the
//! current state; anything out of order is a structural violation.

use std::fmt;

use tracing::{debug, warn};

use super::counter::Counter;
use super::scope::{Class, Measurable, Method, Package, SourceFile};
use super::ConversionSummary;
use crate::error::{ConvertError, Result};

/// Report elements the converter reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Package,
    Class,
    SourceFile,
    Method,
    Counter,
}

impl Element {
    pub fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"package" => Some(Element::Package),
            b"class" => Some(Element::Class),
            b"sourcefile" => Some(Element::SourceFile),
            b"method" => Some(Element::Method),
            b"counter" => Some(Element::Counter),
            _ => None,
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Element::Package => "package",
            Element::Class => "class",
            Element::SourceFile => "sourcefile",
            Element::Method => "method",
            Element::Counter => "counter",
        }
    }
}

/// An element opening, with its attributes already extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Open {
    Package { name: String },
    Class { name: String, source_file: Option<String> },
    SourceFile { name: String },
    Method { name: String, descriptor: String },
    Counter(Counter),
}

impl Open {
    pub fn element(&self) -> Element {
        match self {
            Open::Package { .. } => Element::Package,
            Open::Class { .. } => Element::Class,
            Open::SourceFile { .. } => Element::SourceFile,
            Open::Method { .. } => Element::Method,
            Open::Counter(_) => Element::Counter,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    InPackage,
    InClass,
    InSourceFile,
    InMethod,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            State::Idle => "outside any package",
            State::InPackage => "in a package",
            State::InClass => "in a class",
            State::InSourceFile => "in a source file",
            State::InMethod => "in a method",
        };
        f.write_str(text)
    }
}

/// One open scope
#[derive(Debug, Clone)]
pub enum Scope {
    Package(Package),
    Class(Class),
    SourceFile(SourceFile),
    Method(Method),
}

impl Scope {
    fn measurable_mut(&mut self) -> &mut dyn Measurable {
        match self {
            Scope::Package(p) => p,
            Scope::Class(c) => c,
            Scope::SourceFile(s) => s,
            Scope::Method(m) => m,
        }
    }

    fn describe(&self) -> String {
        match self {
            Scope::Package(p) => format!("package {}", p.name()),
            Scope::Class(c) => format!("class {}", c.name()),
            Scope::SourceFile(s) => format!("source file {}", s.name()),
            Scope::Method(m) => format!("method {}", m.signature()),
        }
    }
}

/// Everything the emitter needs for one output line
#[derive(Debug, Clone)]
pub struct MethodRow {
    pub package: String,
    pub class: String,
    pub method: Method,
}

#[derive(Debug, Default)]
pub struct ContextStack {
    frames: Vec<Scope>,
    summary: ConversionSummary,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        match self.frames.last() {
            None => State::Idle,
            Some(Scope::Package(_)) => State::InPackage,
            Some(Scope::Class(_)) => State::InClass,
            Some(Scope::SourceFile(_)) => State::InSourceFile,
            Some(Scope::Method(_)) => State::InMethod,
        }
    }

    pub fn open(&mut self, event: Open) -> Result<()> {
        match (event, self.state()) {
            (Open::Counter(counter), _) => self.route(counter),
            (Open::Package { name }, State::Idle) => {
                debug!(package = %name, "package opened");
                self.summary.packages += 1;
                self.frames.push(Scope::Package(Package::new(name)));
            }
            (Open::Class { name, source_file }, State::InPackage) => {
                self.summary.classes += 1;
                self.frames.push(Scope::Class(Class::new(name, source_file)));
            }
            (Open::Method { name, descriptor }, State::InClass) => {
                let method = Method::new(name, descriptor)?;
                self.frames.push(Scope::Method(method));
            }
            // Under a class per the nominal layout, under a package in
            // reports JaCoCo actually writes.
            (Open::SourceFile { name }, State::InClass | State::InPackage) => {
                self.summary.source_files += 1;
                self.frames.push(Scope::SourceFile(SourceFile::new(name)));
            }
            (event, state) => {
                return Err(ConvertError::structural(
                    format!("<{}>", event.element().tag()),
                    state.to_string(),
                ))
            }
        }
        Ok(())
    }

    /// Close the innermost scope. Returns a row when it was a method.
    pub fn close(&mut self, element: Element) -> Result<Option<MethodRow>> {
        let state = self.state();
        match (element, state) {
            (Element::Counter, _) => Ok(None),
            (Element::Method, State::InMethod) => self.close_method(),
            (Element::SourceFile, State::InSourceFile)
            | (Element::Class, State::InClass)
            | (Element::Package, State::InPackage) => {
                self.frames.pop();
                Ok(None)
            }
            (element, state) => Err(ConvertError::structural(
                format!("</{}>", element.tag()),
                state.to_string(),
            )),
        }
    }

    /// Check that nothing is left open and hand back the totals
    pub fn finish(self) -> Result<ConversionSummary> {
        if !self.frames.is_empty() {
            return Err(ConvertError::structural(
                "end of document",
                self.state().to_string(),
            ));
        }
        Ok(self.summary)
    }

    fn close_method(&mut self) -> Result<Option<MethodRow>> {
        let method = match self.frames.pop() {
            Some(Scope::Method(method)) => method,
            _ => return Err(ConvertError::structural("</method>", State::InMethod.to_string())),
        };

        let class = self.frames.iter().rev().find_map(|scope| match scope {
            Scope::Class(c) => Some(c.name()),
            _ => None,
        });
        let package = self.frames.iter().rev().find_map(|scope| match scope {
            Scope::Package(p) => Some(p.name()),
            _ => None,
        });

        match (package, class) {
            (Some(package), Some(class)) => {
                self.summary.methods += 1;
                Ok(Some(MethodRow {
                    package,
                    class,
                    method,
                }))
            }
            _ => Err(ConvertError::structural("</method>", self.state().to_string())),
        }
    }

    /// Counters go to the top of the stack. For a source file nested in a
    /// class that is the source file, not the class; neither scope's
    /// counters reach a row.
    fn route(&mut self, counter: Counter) {
        self.summary.counters += 1;
        match self.frames.last_mut() {
            Some(scope) => {
                let metric = counter.metric().to_string();
                if scope.measurable_mut().add_counter(counter).is_some() {
                    warn!(%metric, scope = %scope.describe(), "repeated counter type, keeping the last one");
                }
            }
            None => {
                self.summary.dropped_counters += 1;
                debug!(metric = counter.metric(), "dropping counter outside any package");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coverage::counter::{BRANCH, INSTRUCTION};

    fn package(name: &str) -> Open {
        Open::Package {
            name: name.to_string(),
        }
    }

    fn class(name: &str) -> Open {
        Open::Class {
            name: name.to_string(),
            source_file: Some("Foo.java".to_string()),
        }
    }

    fn method(name: &str, descriptor: &str) -> Open {
        Open::Method {
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        }
    }

    fn counter(metric: &str, missed: u64, covered: u64) -> Open {
        Open::Counter(Counter::new(metric, missed, covered))
    }

    #[test]
    fn test_states_follow_nesting() {
        let mut stack = ContextStack::new();
        assert_eq!(stack.state(), State::Idle);
        stack.open(package("com/example")).unwrap();
        assert_eq!(stack.state(), State::InPackage);
        stack.open(class("com/example/Foo")).unwrap();
        assert_eq!(stack.state(), State::InClass);
        stack.open(method("run", "()V")).unwrap();
        assert_eq!(stack.state(), State::InMethod);

        assert!(stack.close(Element::Method).unwrap().is_some());
        assert_eq!(stack.state(), State::InClass);
        stack.open(Open::SourceFile { name: "Foo.java".to_string() }).unwrap();
        assert_eq!(stack.state(), State::InSourceFile);
        assert!(stack.close(Element::SourceFile).unwrap().is_none());
        assert!(stack.close(Element::Class).unwrap().is_none());
        assert!(stack.close(Element::Package).unwrap().is_none());
        assert_eq!(stack.state(), State::Idle);

        let summary = stack.finish().unwrap();
        assert_eq!(summary.packages, 1);
        assert_eq!(summary.classes, 1);
        assert_eq!(summary.methods, 1);
        assert_eq!(summary.source_files, 1);
    }

    #[test]
    fn test_method_close_yields_row_with_counters() {
        let mut stack = ContextStack::new();
        stack.open(package("com/example")).unwrap();
        stack.open(class("com/example/Foo")).unwrap();
        stack.open(method("isSet", "(I)Z")).unwrap();
        stack.open(counter(INSTRUCTION, 1, 3)).unwrap();
        stack.close(Element::Counter).unwrap();
        stack.open(counter(BRANCH, 1, 1)).unwrap();

        let row = stack.close(Element::Method).unwrap().unwrap();
        assert_eq!(row.package, "com.example");
        assert_eq!(row.class, "com.example.Foo");
        assert_eq!(row.method.signature(), "boolean isSet(int)");
        assert_eq!(row.method.coverage_percent(INSTRUCTION).unwrap(), "75%");
        assert_eq!(row.method.coverage_percent(BRANCH).unwrap(), "50%");
    }

    #[test]
    fn test_counters_go_to_innermost_scope() {
        let mut stack = ContextStack::new();
        stack.open(package("p")).unwrap();
        stack.open(class("p/C")).unwrap();
        stack.open(method("m", "()V")).unwrap();
        stack.open(counter(INSTRUCTION, 0, 4)).unwrap();
        let row = stack.close(Element::Method).unwrap().unwrap();
        assert_eq!(row.method.counters().len(), 1);

        // Class-level counter after the method must not leak into the next
        // method.
        stack.open(counter(INSTRUCTION, 4, 0)).unwrap();
        stack.open(method("n", "()V")).unwrap();
        let row = stack.close(Element::Method).unwrap().unwrap();
        assert_eq!(row.method.coverage_percent(INSTRUCTION).unwrap(), "n/a");
    }

    #[test]
    fn test_sourcefile_in_class_takes_its_own_counters() {
        let mut stack = ContextStack::new();
        stack.open(package("p")).unwrap();
        stack.open(class("p/C")).unwrap();
        stack.open(counter(INSTRUCTION, 1, 1)).unwrap();
        stack.open(Open::SourceFile { name: "C.java".to_string() }).unwrap();
        stack.open(counter(INSTRUCTION, 0, 5)).unwrap();

        match stack.frames.as_slice() {
            [Scope::Package(_), Scope::Class(c), Scope::SourceFile(s)] => {
                assert_eq!(c.counter(INSTRUCTION), Some(&Counter::new(INSTRUCTION, 1, 1)));
                assert_eq!(s.counter(INSTRUCTION), Some(&Counter::new(INSTRUCTION, 0, 5)));
            }
            other => panic!("unexpected frames: {other:?}"),
        }
    }

    #[test]
    fn test_counter_outside_package_is_dropped() {
        let mut stack = ContextStack::new();
        stack.open(counter(INSTRUCTION, 1, 1)).unwrap();
        stack.close(Element::Counter).unwrap();
        assert_eq!(stack.state(), State::Idle);
        let summary = stack.finish().unwrap();
        assert_eq!(summary.counters, 1);
        assert_eq!(summary.dropped_counters, 1);
        assert_eq!(summary.methods, 0);
    }

    #[test]
    fn test_close_method_without_open_method() {
        let mut stack = ContextStack::new();
        stack.open(package("p")).unwrap();
        stack.open(class("p/C")).unwrap();
        let err = stack.close(Element::Method).unwrap_err();
        match err {
            ConvertError::StructuralViolation { event, state } => {
                assert_eq!(event, "</method>");
                assert_eq!(state, "in a class");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_illegal_opens() {
        let mut stack = ContextStack::new();
        assert!(matches!(
            stack.open(class("C")),
            Err(ConvertError::StructuralViolation { .. })
        ));
        stack.open(package("p")).unwrap();
        assert!(matches!(
            stack.open(package("q")),
            Err(ConvertError::StructuralViolation { .. })
        ));
        assert!(matches!(
            stack.open(method("m", "()V")),
            Err(ConvertError::StructuralViolation { .. })
        ));
        stack.open(class("p/C")).unwrap();
        stack.open(method("m", "()V")).unwrap();
        assert!(matches!(
            stack.open(method("n", "()V")),
            Err(ConvertError::StructuralViolation { .. })
        ));
        assert!(matches!(
            stack.open(Open::SourceFile { name: "C.java".to_string() }),
            Err(ConvertError::StructuralViolation { .. })
        ));
    }

    #[test]
    fn test_mismatched_close() {
        let mut stack = ContextStack::new();
        stack.open(package("p")).unwrap();
        stack.open(class("p/C")).unwrap();
        assert!(matches!(
            stack.close(Element::Package),
            Err(ConvertError::StructuralViolation { .. })
        ));
    }

    #[test]
    fn test_sourcefile_directly_in_package() {
        let mut stack = ContextStack::new();
        stack.open(package("p")).unwrap();
        stack.open(Open::SourceFile { name: "C.java".to_string() }).unwrap();
        stack.open(counter("LINE", 2, 2)).unwrap();
        assert_eq!(stack.state(), State::InSourceFile);
        stack.close(Element::SourceFile).unwrap();
        assert_eq!(stack.state(), State::InPackage);
    }

    #[test]
    fn test_bad_descriptor_fails_on_open() {
        let mut stack = ContextStack::new();
        stack.open(package("p")).unwrap();
        stack.open(class("p/C")).unwrap();
        assert!(matches!(
            stack.open(method("m", "(K)V")),
            Err(ConvertError::MalformedDescriptor { .. })
        ));
        assert_eq!(stack.state(), State::InClass);
    }

    #[test]
    fn test_finish_with_open_scopes() {
        let mut stack = ContextStack::new();
        stack.open(package("p")).unwrap();
        match stack.finish().unwrap_err() {
            ConvertError::StructuralViolation { event, .. } => {
                assert_eq!(event, "end of document")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
