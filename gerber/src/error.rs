//! Error taxonomy shared by the Gerber and Excellon parsers/emitters.

use thiserror::Error;

/// Errors raised while parsing or emitting a Gerber layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GerberError {
    #[error("line {line}: unknown command {command:?}")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: malformed format specification {text:?}")]
    BadFormat { line: usize, text: String },

    #[error("line {line}: malformed coordinate payload {text:?}")]
    BadCoordinate { line: usize, text: String },

    #[error("line {line}: operation requires a current aperture")]
    NoAperture { line: usize },

    #[error("line {line}: unknown aperture shape {shape:?}")]
    UnknownApertureShape { line: usize, shape: String },

    #[error("macro {macro_name:?} expected {expected} value(s), got {got}")]
    ArityMismatch {
        macro_name: String,
        expected: usize,
        got: usize,
    },

    #[error("malformed macro primitive: {reason}")]
    MalformedMacro { reason: String },

    #[error("{primitive} is not implemented")]
    Unimplemented { primitive: &'static str },

    #[error("coordinate {value} overflows {digits} integer digit(s)")]
    Overflow { value: f64, digits: u32 },

    #[error("unknown builder configuration option {option:?}")]
    UnknownConfigOption { option: String },

    #[error("unknown layer file extension {extension:?}")]
    UnknownFileExtension { extension: String },
}

/// Errors raised while parsing or emitting an Excellon (NC-Drill) layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrillError {
    #[error("line {line}: unknown command {command:?}")]
    UnknownCommand { line: usize, command: String },

    #[error("line {line}: malformed coordinate payload {text:?}")]
    BadCoordinate { line: usize, text: String },

    #[error("line {line}: rout segment emitted with the tool up")]
    ToolUp { line: usize },

    #[error("line {line}: drill hit emitted outside drill mode")]
    NotInDrillMode { line: usize },

    #[error("line {line}: tool {index} was never declared in the header")]
    UnknownTool { line: usize, index: u32 },
}

pub type GerberResult<T> = Result<T, GerberError>;
pub type DrillResult<T> = Result<T, DrillError>;
