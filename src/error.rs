//! Error types for report conversion
//!
//! Every error is fatal for the current conversion: the driver stops reading
//! on the first one and rows already written stay written.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    /// Unrecognized character in a method type descriptor.
    #[error("malformed descriptor {descriptor:?}: unexpected {character:?} at position {position}")]
    MalformedDescriptor {
        descriptor: String,
        character: char,
        position: usize,
    },

    /// Descriptor ended inside an object name or before its return type.
    #[error("truncated descriptor {descriptor:?}")]
    TruncatedDescriptor { descriptor: String },

    /// An open/close event arrived in a state that does not permit it.
    #[error("unexpected {event} while {state}")]
    StructuralViolation { event: String, state: String },

    #[error("<{element}> is missing required attribute '{attribute}'")]
    MissingAttribute {
        element: &'static str,
        attribute: &'static str,
    },

    #[error("<{element}> attribute '{attribute}' is not a count: {value:?}")]
    InvalidCount {
        element: &'static str,
        attribute: &'static str,
        value: String,
    },

    /// Counter with neither missed nor covered samples.
    #[error("coverage for {metric} is undefined: counter has no samples")]
    UndefinedCoverage { metric: String },

    #[error("XML error at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConvertError {
    pub(crate) fn structural(event: impl Into<String>, state: impl Into<String>) -> Self {
        ConvertError::StructuralViolation {
            event: event.into(),
            state: state.into(),
        }
    }
}
