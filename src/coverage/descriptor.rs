//! JVM method descriptor decoding
//!
//! Turns a compact descriptor such as `(ILjava/lang/String;)[J` into a typed
//! [`MethodSignature`], which renders as `long[] name(int;java.lang.String)`.
//!
//! Arrays of any dimension render with a single `[]` suffix, so `[[I` and
//! `[I` both become `int[]`.

use std::fmt;

use crate::error::{ConvertError, Result};

/// Primitive type codes of the descriptor grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl Primitive {
    pub fn from_code(code: char) -> Option<Self> {
        match code {
            'Z' => Some(Primitive::Boolean),
            'B' => Some(Primitive::Byte),
            'C' => Some(Primitive::Char),
            'S' => Some(Primitive::Short),
            'I' => Some(Primitive::Int),
            'J' => Some(Primitive::Long),
            'F' => Some(Primitive::Float),
            'D' => Some(Primitive::Double),
            'V' => Some(Primitive::Void),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Boolean => "boolean",
            Primitive::Byte => "byte",
            Primitive::Char => "char",
            Primitive::Short => "short",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Void => "void",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseType {
    Primitive(Primitive),
    /// Dotted class name, e.g. `java.lang.String`
    Object(String),
}

/// One decoded type; `array` is set for any number of `[` prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaType {
    pub base: BaseType,
    pub array: bool,
}

impl JavaType {
    pub fn primitive(primitive: Primitive) -> Self {
        JavaType {
            base: BaseType::Primitive(primitive),
            array: false,
        }
    }

    pub fn object(name: impl Into<String>) -> Self {
        JavaType {
            base: BaseType::Object(name.into()),
            array: false,
        }
    }

    pub fn into_array(mut self) -> Self {
        self.array = true;
        self
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.base {
            BaseType::Primitive(p) => f.write_str(p.name())?,
            BaseType::Object(name) => f.write_str(name)?,
        }
        if self.array {
            f.write_str("[]")?;
        }
        Ok(())
    }
}

/// Decoded descriptor: return type and ordered argument types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    pub return_type: JavaType,
    pub arguments: Vec<JavaType>,
}

impl MethodSignature {
    /// Render as `<return> <name>(<arg>;<arg>;...)`.
    ///
    /// Arguments are separated by `;` rather than `,` so the signature can
    /// sit in a single CSV field.
    pub fn render(&self, name: &str) -> String {
        let arguments: Vec<String> = self.arguments.iter().map(|a| a.to_string()).collect();
        format!("{} {}({})", self.return_type, name, arguments.join(";"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Start,
    Arguments,
    Return,
}

struct Scanner<'a> {
    descriptor: &'a str,
    mode: Mode,
    object: Option<String>,
    array: bool,
    arguments: Vec<JavaType>,
    return_type: Option<JavaType>,
}

impl<'a> Scanner<'a> {
    fn new(descriptor: &'a str) -> Self {
        Scanner {
            descriptor,
            mode: Mode::Start,
            object: None,
            array: false,
            arguments: Vec::new(),
            return_type: None,
        }
    }

    fn step(&mut self, position: usize, c: char) -> Result<()> {
        if let Some(mut name) = self.object.take() {
            if c == ';' {
                let base = BaseType::Object(name.replace('/', "."));
                return self.complete(base, position, c);
            }
            name.push(c);
            self.object = Some(name);
            return Ok(());
        }

        match c {
            '(' if self.mode == Mode::Start => self.mode = Mode::Arguments,
            ')' if self.mode == Mode::Arguments && !self.array => self.mode = Mode::Return,
            '[' if self.mode != Mode::Start => self.array = true,
            'L' if self.mode != Mode::Start => self.object = Some(String::new()),
            _ => match Primitive::from_code(c) {
                Some(p) => self.complete(BaseType::Primitive(p), position, c)?,
                None => return Err(self.malformed(position, c)),
            },
        }
        Ok(())
    }

    fn complete(&mut self, base: BaseType, position: usize, c: char) -> Result<()> {
        let ty = JavaType {
            base,
            array: std::mem::take(&mut self.array),
        };
        match self.mode {
            Mode::Arguments => self.arguments.push(ty),
            Mode::Return if self.return_type.is_none() => self.return_type = Some(ty),
            _ => return Err(self.malformed(position, c)),
        }
        Ok(())
    }

    fn finish(self) -> Result<MethodSignature> {
        let truncated = || ConvertError::TruncatedDescriptor {
            descriptor: self.descriptor.to_string(),
        };
        if self.object.is_some() || self.array {
            return Err(truncated());
        }
        match self.return_type {
            Some(return_type) => Ok(MethodSignature {
                return_type,
                arguments: self.arguments,
            }),
            None => Err(truncated()),
        }
    }

    fn malformed(&self, position: usize, character: char) -> ConvertError {
        ConvertError::MalformedDescriptor {
            descriptor: self.descriptor.to_string(),
            character,
            position,
        }
    }
}

/// Decode a method descriptor into its typed signature
pub fn parse_descriptor(descriptor: &str) -> Result<MethodSignature> {
    let mut scanner = Scanner::new(descriptor);
    for (position, c) in descriptor.chars().enumerate() {
        scanner.step(position, c)?;
    }
    scanner.finish()
}

/// Decode `descriptor` and render it with the method `name`
pub fn decode_signature(name: &str, descriptor: &str) -> Result<String> {
    Ok(parse_descriptor(descriptor)?.render(name))
}
